pub mod browser;
pub mod http;
pub mod sites;
pub mod traits;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use traits::PageFetcher;
