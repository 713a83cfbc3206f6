pub mod acf;
pub mod client;
pub mod content;
pub mod dataset;
pub mod images;
pub mod uploader;

pub use client::{HttpImageSource, WordPressClient};
pub use uploader::Uploader;
