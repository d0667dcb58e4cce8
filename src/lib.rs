pub mod amounts;
pub mod browser;
pub mod change_detector;
pub mod checker;
pub mod config;
pub mod markup;
pub mod models;
pub mod notify;
pub mod price_chooser;
pub mod rate_resolver;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use checker::{CheckOutcome, PageContent, PriceChecker};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
