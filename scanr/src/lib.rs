pub mod config;
pub mod errors;
pub mod filters;
pub mod search;

pub use config::ScanConfig;
pub use errors::{ScanError, ScanResult};
pub use search::{scan, ScanSummary};
