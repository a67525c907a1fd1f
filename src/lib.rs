pub mod config;
pub mod error;
pub mod share;
pub mod slack;
pub mod vault;

pub use crate::config::AppConfig;
pub use crate::error::{AppError, AppResult};
