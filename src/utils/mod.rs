pub mod date;
pub mod error;
pub mod logging;
pub mod path;

pub use error::{AppError, AppResult};
