//! LoveDiary - dagbok för par
//!
//! Dagräknare, humördagbok, vanor med incheckningar, nedräkningar och
//! backup, ovanpå en lokal SQLite-databas.

pub mod app;
pub mod db;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports
pub use app::LoveDiaryApp;
pub use db::Database;
pub use models::*;
pub use utils::logging::init_logging;
pub use utils::{AppError, AppResult};
