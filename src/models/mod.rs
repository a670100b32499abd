pub mod checkin;
pub mod config;
pub mod countdown;
pub mod habit;
pub mod mood;

pub use checkin::*;
pub use config::*;
pub use countdown::*;
pub use habit::*;
pub use mood::*;
