pub mod checkin_repo;
pub mod config_repo;
pub mod habit_repo;
pub mod migrations;
pub mod mood_repo;
pub mod schema;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::utils::{AppError, AppResult};

pub use checkin_repo::UnifiedCheckInRepository;
pub use config_repo::ConfigRepository;
pub use habit_repo::HabitRepository;
pub use mood_repo::MoodRepository;

/// Lås anslutningen. Ett förgiftat lås blir ett fel i stället för panik.
pub(crate) fn lock(conn: &Mutex<Connection>) -> AppResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| AppError::other("Databasanslutningen är låst av en kraschad tråd"))
}

/// Huvuddatabas-wrapper med thread-safe access
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Öppna eller skapa databas
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
            ",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Öppna in-memory databas (för tester)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Kör databasmigrationer
    pub fn migrate(&self) -> Result<()> {
        let conn = lock(&self.conn)?;
        migrations::run_migrations(&conn)
    }

    /// Hämta config-repository
    pub fn config(&self) -> ConfigRepository {
        ConfigRepository::new(Arc::clone(&self.conn))
    }

    /// Hämta humör-repository
    pub fn moods(&self) -> MoodRepository {
        MoodRepository::new(Arc::clone(&self.conn))
    }

    /// Hämta vane-repository
    pub fn habits(&self) -> HabitRepository {
        HabitRepository::new(Arc::clone(&self.conn))
    }

    /// Hämta repository för enhetliga incheckningar
    pub fn check_ins(&self) -> UnifiedCheckInRepository {
        UnifiedCheckInRepository::new(Arc::clone(&self.conn))
    }

    /// Direkt tillgång till connection (för avancerade operationer)
    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = lock(&self.conn)?;
        f(&conn)
    }

    /// Kör `f` i en transaktion; committas endast om `f` lyckas
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Radera all data (enda stället där rader tas bort fysiskt)
    pub fn reset_all_data(&self) -> Result<()> {
        self.with_transaction(|tx| {
            clear_data_tables(tx)?;
            Ok(())
        })?;
        info!("All data raderad");
        Ok(())
    }
}

/// Töm alla datatabeller
pub(crate) fn clear_data_tables(conn: &Connection) -> Result<()> {
    for table in schema::DATA_TABLES {
        conn.execute(&format!("DELETE FROM {}", table), [])?;
    }
    Ok(())
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyMood, Habit, MoodType};
    use chrono::NaiveDate;

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("lovediary.db");

        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert!(path.exists());

        // Öppna igen, migrationen ska vara idempotent
        let db = Database::open(&path).unwrap();
        db.migrate().unwrap();
        assert_eq!(db.config().get().unwrap().id, 1);
    }

    #[test]
    fn test_reset_all_data() {
        let db = Database::open_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        db.moods().save(&mut DailyMood::new(date, MoodType::Happy)).unwrap();
        let mut habit = Habit::new("喝水");
        db.habits().create(&mut habit).unwrap();
        db.habits().check_in(habit.id.unwrap(), date, None).unwrap();

        db.reset_all_data().unwrap();

        assert_eq!(db.moods().count().unwrap(), 0);
        assert!(db.habits().find_all().unwrap().is_empty());
        assert!(db.check_ins().list_configs(true).unwrap().is_empty());
    }
}
