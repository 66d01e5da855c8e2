pub mod browser;
pub mod checker;
pub mod config;
pub mod models;
pub mod notifiers;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use checker::{AvailabilityChecker, PassReport};
pub use crate::config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
