//! Repository för enhetliga incheckningar och deras konfiguration

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::lock;
use crate::models::{
    CheckInType, CountdownMode, CountdownProgress, MoodType, UnifiedCheckIn, UnifiedCheckInConfig,
};
use crate::utils::AppError;

const SELECT_CONFIG: &str =
    "SELECT id, name, check_in_type, icon, color, countdown_mode, start_date, target_date,
            target_count, progress, reminder_time, is_active, created_at
     FROM unified_checkin_configs";

const SELECT_CHECK_IN: &str =
    "SELECT id, config_id, name, check_in_type, date, mood, score, note, image_path,
            is_completed, count, created_at
     FROM unified_checkins";

pub struct UnifiedCheckInRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UnifiedCheckInRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Skapa ny konfiguration. Namnet måste vara unikt.
    pub fn create_config(&self, config: &mut UnifiedCheckInConfig) -> Result<i64> {
        if config.name.trim().is_empty() {
            return Err(AppError::validation("Incheckningen måste ha ett namn").into());
        }

        let conn = lock(&self.conn)?;
        if find_config_by_name(&conn, &config.name)?.is_some() {
            return Err(AppError::duplicate_check_in(&config.name).into());
        }

        let id = insert_config(&conn, config)?;
        info!("Skapade incheckning '{}' ({})", config.name, config.check_in_type);
        Ok(id)
    }

    /// Uppdatera konfiguration
    pub fn update_config(&self, config: &UnifiedCheckInConfig) -> Result<()> {
        let conn = lock(&self.conn)?;
        update_config_row(&conn, config)
    }

    pub fn find_config_by_id(&self, id: i64) -> Result<Option<UnifiedCheckInConfig>> {
        let conn = lock(&self.conn)?;
        find_config_by_id(&conn, id)
    }

    pub fn find_config_by_name(&self, name: &str) -> Result<Option<UnifiedCheckInConfig>> {
        let conn = lock(&self.conn)?;
        find_config_by_name(&conn, name)
    }

    /// Lista konfigurationer sorterade på namn
    pub fn list_configs(&self, include_inactive: bool) -> Result<Vec<UnifiedCheckInConfig>> {
        let conn = lock(&self.conn)?;
        let mut sql = String::from(SELECT_CONFIG);
        if !include_inactive {
            sql.push_str(" WHERE is_active = 1");
        }
        sql.push_str(" ORDER BY name");

        let mut stmt = conn.prepare(&sql)?;
        let configs = stmt
            .query_map([], row_to_config)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(configs)
    }

    /// Aktiva nedräkningar
    pub fn list_countdowns(&self) -> Result<Vec<UnifiedCheckInConfig>> {
        Ok(self
            .list_configs(false)?
            .into_iter()
            .filter(|c| c.is_countdown())
            .collect())
    }

    /// Mjuk borttagning: historiken behålls
    pub fn deactivate_config(&self, id: i64) -> Result<()> {
        let conn = lock(&self.conn)?;
        set_config_active(&conn, id, false)
    }

    /// Checka in. Returnerar false (utan att skriva) om det redan finns en
    /// incheckning för namnet och datumet.
    pub fn check_in(&self, check_in: &mut UnifiedCheckIn) -> Result<bool> {
        let conn = lock(&self.conn)?;

        if has_check_in(&conn, &check_in.name, check_in.date)? {
            debug!("'{}' redan incheckad {}", check_in.name, check_in.date);
            return Ok(false);
        }

        insert_check_in(&conn, check_in)?;
        Ok(true)
    }

    /// Avancera en incheckningsbaserad nedräkning ett steg.
    ///
    /// Returnerar false om nedräkningen redan avancerats idag.
    pub fn advance_countdown(&self, config_id: i64, date: NaiveDate) -> Result<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let config = find_config_by_id(&tx, config_id)?
            .ok_or_else(|| AppError::check_in_config_not_found(config_id))?;

        if config.countdown_mode != Some(CountdownMode::CheckInBased) {
            return Err(AppError::validation(format!(
                "'{}' är inte en incheckningsbaserad nedräkning",
                config.name
            ))
            .into());
        }

        if !config.is_active || has_check_in(&tx, &config.name, date)? {
            return Ok(false);
        }

        let progress = config.progress.saturating_add(1);
        tx.execute(
            "UPDATE unified_checkin_configs SET progress = ?1 WHERE id = ?2",
            params![progress, config_id],
        )?;

        let mut check_in = UnifiedCheckIn::for_config(&config, date);
        check_in.count = Some(progress);
        insert_check_in(&tx, &mut check_in)?;

        tx.commit()?;
        debug!("Nedräkning '{}' avancerad till {}", config.name, progress);
        Ok(true)
    }

    /// Framsteg för en nedräkning
    pub fn countdown_progress(
        &self,
        config_id: i64,
        today: NaiveDate,
    ) -> Result<Option<CountdownProgress>> {
        Ok(self
            .find_config_by_id(config_id)?
            .and_then(|config| config.countdown_progress(today)))
    }

    pub fn find_by_name_and_date(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> Result<Option<UnifiedCheckIn>> {
        let conn = lock(&self.conn)?;
        let check_in = conn
            .query_row(
                &format!("{} WHERE name = ?1 AND date = ?2", SELECT_CHECK_IN),
                params![name, date],
                row_to_check_in,
            )
            .optional()?;
        Ok(check_in)
    }

    /// Alla incheckningar för en ström, nyast först
    pub fn find_by_name(&self, name: &str) -> Result<Vec<UnifiedCheckIn>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE name = ? ORDER BY date DESC",
            SELECT_CHECK_IN
        ))?;

        let check_ins = stmt
            .query_map([name], row_to_check_in)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(check_ins)
    }

    /// Datum med genomförd incheckning från och med `from`
    pub fn dates_for_name_since(&self, name: &str, from: NaiveDate) -> Result<HashSet<NaiveDate>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT date FROM unified_checkins
             WHERE name = ?1 AND date >= ?2 AND is_completed = 1",
        )?;

        let dates = stmt
            .query_map(params![name, from], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<NaiveDate>>>()?;

        Ok(dates)
    }

    pub fn count_for_name(&self, name: &str) -> Result<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM unified_checkins WHERE name = ? AND is_completed = 1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Antal incheckningar (alla strömmar) ett visst datum
    pub fn count_on(&self, date: NaiveDate) -> Result<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM unified_checkins WHERE date = ? AND is_completed = 1",
            [date],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

pub(crate) fn find_config_by_id(conn: &Connection, id: i64) -> Result<Option<UnifiedCheckInConfig>> {
    let config = conn
        .query_row(&format!("{} WHERE id = ?", SELECT_CONFIG), [id], row_to_config)
        .optional()?;
    Ok(config)
}

pub(crate) fn find_config_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<UnifiedCheckInConfig>> {
    let config = conn
        .query_row(&format!("{} WHERE name = ?", SELECT_CONFIG), [name], row_to_config)
        .optional()?;
    Ok(config)
}

pub(crate) fn insert_config(conn: &Connection, config: &mut UnifiedCheckInConfig) -> Result<i64> {
    conn.execute(
        "INSERT INTO unified_checkin_configs
         (name, check_in_type, icon, color, countdown_mode, start_date, target_date,
          target_count, progress, reminder_time, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            config.name,
            config.check_in_type.to_string(),
            config.icon,
            config.color,
            config.countdown_mode.map(|m| m.to_string()),
            config.start_date,
            config.target_date,
            config.target_count,
            config.progress,
            config.reminder_time,
            config.is_active,
        ],
    )?;

    let id = conn.last_insert_rowid();
    config.id = Some(id);
    Ok(id)
}

pub(crate) fn update_config_row(conn: &Connection, config: &UnifiedCheckInConfig) -> Result<()> {
    let id = config
        .id
        .ok_or_else(|| anyhow!("Incheckningskonfiguration har inget ID"))?;

    let rows = conn.execute(
        "UPDATE unified_checkin_configs SET
            name = ?1, check_in_type = ?2, icon = ?3, color = ?4, countdown_mode = ?5,
            start_date = ?6, target_date = ?7, target_count = ?8, progress = ?9,
            reminder_time = ?10, is_active = ?11
         WHERE id = ?12",
        params![
            config.name,
            config.check_in_type.to_string(),
            config.icon,
            config.color,
            config.countdown_mode.map(|m| m.to_string()),
            config.start_date,
            config.target_date,
            config.target_count,
            config.progress,
            config.reminder_time,
            config.is_active,
            id,
        ],
    )?;

    if rows == 0 {
        return Err(AppError::check_in_config_not_found(id).into());
    }

    Ok(())
}

pub(crate) fn set_config_active(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let rows = conn.execute(
        "UPDATE unified_checkin_configs SET is_active = ?1 WHERE id = ?2",
        params![active, id],
    )?;

    if rows == 0 {
        return Err(AppError::check_in_config_not_found(id).into());
    }

    Ok(())
}

pub(crate) fn has_check_in(conn: &Connection, name: &str, date: NaiveDate) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM unified_checkins WHERE name = ?1 AND date = ?2)",
        params![name, date],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub(crate) fn insert_check_in(conn: &Connection, check_in: &mut UnifiedCheckIn) -> Result<i64> {
    conn.execute(
        "INSERT INTO unified_checkins
         (config_id, name, check_in_type, date, mood, score, note, image_path, is_completed, count)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            check_in.config_id,
            check_in.name,
            check_in.check_in_type.to_string(),
            check_in.date,
            check_in.mood.map(|m| m.code()),
            check_in.score,
            check_in.note,
            check_in.image_path,
            check_in.is_completed,
            check_in.count,
        ],
    )?;

    let id = conn.last_insert_rowid();
    check_in.id = Some(id);
    Ok(id)
}

pub(crate) fn delete_check_in(conn: &Connection, name: &str, date: NaiveDate) -> Result<usize> {
    let rows = conn.execute(
        "DELETE FROM unified_checkins WHERE name = ?1 AND date = ?2",
        params![name, date],
    )?;
    Ok(rows)
}

pub(crate) fn find_all_configs(conn: &Connection) -> Result<Vec<UnifiedCheckInConfig>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_CONFIG))?;
    let configs = stmt
        .query_map([], row_to_config)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(configs)
}

pub(crate) fn find_all_check_ins(conn: &Connection) -> Result<Vec<UnifiedCheckIn>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_CHECK_IN))?;
    let check_ins = stmt
        .query_map([], row_to_check_in)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(check_ins)
}

/// Infoga med bevarat ID (används vid import)
pub(crate) fn insert_config_with_id(conn: &Connection, config: &UnifiedCheckInConfig) -> Result<()> {
    conn.execute(
        "INSERT INTO unified_checkin_configs
         (id, name, check_in_type, icon, color, countdown_mode, start_date, target_date,
          target_count, progress, reminder_time, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, COALESCE(?13, datetime('now')))",
        params![
            config.id,
            config.name,
            config.check_in_type.to_string(),
            config.icon,
            config.color,
            config.countdown_mode.map(|m| m.to_string()),
            config.start_date,
            config.target_date,
            config.target_count,
            config.progress,
            config.reminder_time,
            config.is_active,
            config.created_at,
        ],
    )?;
    Ok(())
}

/// Infoga med bevarat ID (används vid import)
pub(crate) fn insert_check_in_with_id(conn: &Connection, check_in: &UnifiedCheckIn) -> Result<()> {
    conn.execute(
        "INSERT INTO unified_checkins
         (id, config_id, name, check_in_type, date, mood, score, note, image_path,
          is_completed, count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, COALESCE(?12, datetime('now')))",
        params![
            check_in.id,
            check_in.config_id,
            check_in.name,
            check_in.check_in_type.to_string(),
            check_in.date,
            check_in.mood.map(|m| m.code()),
            check_in.score,
            check_in.note,
            check_in.image_path,
            check_in.is_completed,
            check_in.count,
            check_in.created_at,
        ],
    )?;
    Ok(())
}

fn row_to_config(row: &Row) -> rusqlite::Result<UnifiedCheckInConfig> {
    let check_in_type: String = row.get(2)?;
    let countdown_mode: Option<String> = row.get(5)?;
    Ok(UnifiedCheckInConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        check_in_type: CheckInType::from_db_str(&check_in_type),
        icon: row.get(3)?,
        color: row.get(4)?,
        countdown_mode: countdown_mode.as_deref().and_then(CountdownMode::from_db_str),
        start_date: row.get(6)?,
        target_date: row.get(7)?,
        target_count: row.get(8)?,
        progress: row.get(9)?,
        reminder_time: row.get(10)?,
        is_active: row.get(11)?,
        created_at: row.get(12).ok(),
    })
}

fn row_to_check_in(row: &Row) -> rusqlite::Result<UnifiedCheckIn> {
    let check_in_type: String = row.get(3)?;
    let mood: Option<String> = row.get(5)?;
    Ok(UnifiedCheckIn {
        id: row.get(0)?,
        config_id: row.get(1)?,
        name: row.get(2)?,
        check_in_type: CheckInType::from_db_str(&check_in_type),
        date: row.get(4)?,
        mood: mood.as_deref().and_then(MoodType::from_code),
        score: row.get(6)?,
        note: row.get(7)?,
        image_path: row.get(8)?,
        is_completed: row.get(9)?,
        count: row.get(10)?,
        created_at: row.get(11).ok(),
    })
}
