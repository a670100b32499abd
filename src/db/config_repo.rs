use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

use super::lock;
use crate::models::{AppConfig, DarkMode};

pub struct ConfigRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Hämta konfiguration (skapar default om den inte finns)
    pub fn get(&self) -> Result<AppConfig> {
        let existing = {
            let conn = lock(&self.conn)?;
            find_config(&conn)?
        };

        match existing {
            Some(config) => Ok(config),
            None => {
                let default_config = AppConfig::default();
                self.save(&default_config)?;
                Ok(default_config)
            }
        }
    }

    /// Spara konfiguration
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let conn = lock(&self.conn)?;
        save_config(&conn, config)
    }

    /// Sätt startdatum för relationen
    pub fn set_start_date(&self, date: NaiveDate) -> Result<AppConfig> {
        let mut config = self.get()?;
        config.start_date = Some(date);
        self.save(&config)?;
        Ok(config)
    }

    /// Kontrollera om initial setup är klar (startdatum satt)
    pub fn is_setup_complete(&self) -> Result<bool> {
        let conn = lock(&self.conn)?;
        Ok(find_config(&conn)?
            .map(|config| config.is_setup_complete())
            .unwrap_or(false))
    }
}

pub(crate) fn find_config(conn: &Connection) -> Result<Option<AppConfig>> {
    let config = conn
        .query_row(
            "SELECT id, start_date, my_name, partner_name, show_day_counter, show_mood_streak,
                    show_anniversary_banner, reminder_enabled, reminder_time, dark_mode,
                    created_at, updated_at
             FROM app_config WHERE id = 1",
            [],
            row_to_config,
        )
        .optional()?;
    Ok(config)
}

/// Skriv konfigurationen; created_at behålls om den redan finns
pub(crate) fn save_config(conn: &Connection, config: &AppConfig) -> Result<()> {
    conn.execute(
        "INSERT INTO app_config (id, start_date, my_name, partner_name, show_day_counter,
                                 show_mood_streak, show_anniversary_banner, reminder_enabled,
                                 reminder_time, dark_mode, created_at, updated_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, COALESCE(?10, datetime('now')), datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
            start_date = excluded.start_date,
            my_name = excluded.my_name,
            partner_name = excluded.partner_name,
            show_day_counter = excluded.show_day_counter,
            show_mood_streak = excluded.show_mood_streak,
            show_anniversary_banner = excluded.show_anniversary_banner,
            reminder_enabled = excluded.reminder_enabled,
            reminder_time = excluded.reminder_time,
            dark_mode = excluded.dark_mode,
            updated_at = excluded.updated_at",
        params![
            config.start_date,
            config.my_name,
            config.partner_name,
            config.show_day_counter,
            config.show_mood_streak,
            config.show_anniversary_banner,
            config.reminder_enabled,
            config.reminder_time,
            config.dark_mode.to_string(),
            config.created_at,
        ],
    )?;

    Ok(())
}

fn row_to_config(row: &Row) -> rusqlite::Result<AppConfig> {
    let dark_mode: String = row.get(9)?;
    Ok(AppConfig {
        id: row.get(0)?,
        start_date: row.get(1)?,
        my_name: row.get(2)?,
        partner_name: row.get(3)?,
        show_day_counter: row.get(4)?,
        show_mood_streak: row.get(5)?,
        show_anniversary_banner: row.get(6)?,
        reminder_enabled: row.get(7)?,
        reminder_time: row.get(8)?,
        dark_mode: DarkMode::from_db_str(&dark_mode),
        created_at: row.get(10).ok(),
        updated_at: row.get(11).ok(),
    })
}
