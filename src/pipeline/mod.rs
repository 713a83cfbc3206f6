pub mod detail;
pub mod pool;
pub mod run;
pub mod search;
pub mod site;

pub use run::RunOrchestrator;
