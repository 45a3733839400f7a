pub mod api;
pub mod config;
pub mod error;
pub mod ml;
pub mod state;

pub use error::{AppError, Result};
