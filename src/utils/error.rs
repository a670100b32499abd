//! Fel som dagboken kan ge tillbaka till anroparen

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Dagboksdatabasen svarade med fel: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Fil- eller katalogfel: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ogiltig post: {0}")]
    Validation(String),

    #[error("{0} finns inte")]
    NotFound(String),

    #[error("{0} finns redan")]
    AlreadyExists(String),

    #[error("Säkerhetskopian kan inte läsas: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    pub fn habit_not_found(id: i64) -> Self {
        Self::NotFound(format!("Vana {}", id))
    }

    pub fn check_in_config_not_found(id: i64) -> Self {
        Self::NotFound(format!("Incheckning {}", id))
    }

    pub fn mood_not_found(date: NaiveDate) -> Self {
        Self::NotFound(format!("Humörpost för {}", date))
    }

    pub fn mood_id_not_found(id: i64) -> Self {
        Self::NotFound(format!("Humörpost {}", id))
    }

    /// Aktiv vana med samma namn
    pub fn duplicate_habit(name: &str) -> Self {
        Self::AlreadyExists(format!("Vanan '{}'", name))
    }

    pub fn duplicate_check_in(name: &str) -> Self {
        Self::AlreadyExists(format!("Incheckningen '{}'", name))
    }

    pub fn unsupported_backup_version(found: u32, supported: u32) -> Self {
        Self::UnsupportedFormat(format!(
            "formatversion {} (högsta som stöds är {})",
            found, supported
        ))
    }

    pub fn missing_archive_entry(entry: &str) -> Self {
        Self::UnsupportedFormat(format!("{} saknas i arkivet", entry))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
