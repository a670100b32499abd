//! Repository för vanor.
//!
//! Vanor lagras både i den äldre `habits`/`habit_records`-modellen och i
//! `unified_checkin_configs`/`unified_checkins`. Varje ändring skriver till
//! båda inom samma transaktion så att modellerna aldrig glider isär.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::checkin_repo;
use super::lock;
use crate::models::{
    CountdownMode, Habit, HabitRecord, HabitType, UnifiedCheckIn, UnifiedCheckInConfig,
};
use crate::utils::AppError;

const SELECT_HABIT: &str =
    "SELECT id, name, description, icon, color, habit_type, target_count, target_date,
            current_count, total_check_ins, last_check_in_date, unified_config_id,
            is_active, created_at, updated_at
     FROM habits";

const SELECT_RECORD: &str =
    "SELECT id, habit_id, date, count, note, created_at FROM habit_records";

pub struct HabitRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HabitRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Skapa vana och tillhörande incheckningskonfiguration.
    ///
    /// En befintlig konfiguration med samma namn återanvänds (och
    /// återaktiveras om den var inaktiv). Finns en inaktiv vana med samma
    /// namn återaktiveras den i stället, med historik och räknare kvar.
    pub fn create(&self, habit: &mut Habit) -> Result<i64> {
        habit
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let duplicate: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM habits WHERE name = ? AND is_active = 1)",
            [&habit.name],
            |row| row.get(0),
        )?;
        if duplicate {
            return Err(AppError::duplicate_habit(&habit.name).into());
        }

        if let Some(inactive) = find_inactive_by_name(&tx, &habit.name)? {
            let id = reactivate(&tx, habit, inactive)?;
            tx.commit()?;
            info!("Återaktiverade vana '{}' ({})", habit.name, habit.habit_type);
            return Ok(id);
        }

        // Samma tidsstämpel för vanan och nedräkningens startdatum
        let created_at: String = tx.query_row("SELECT datetime('now')", [], |row| row.get(0))?;
        habit.created_at = Some(created_at);

        let config = match checkin_repo::find_config_by_name(&tx, &habit.name)? {
            Some(existing) => {
                debug!("Återanvänder incheckningskonfiguration '{}'", habit.name);
                existing
            }
            None => UnifiedCheckInConfig::new(habit.name.clone(), habit.habit_type.check_in_type()),
        };
        habit.unified_config_id = Some(save_mirrored_config(&tx, habit, config)?);

        tx.execute(
            "INSERT INTO habits
             (name, description, icon, color, habit_type, target_count, target_date,
              current_count, total_check_ins, last_check_in_date, unified_config_id, is_active,
              created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            params![
                habit.name,
                habit.description,
                habit.icon,
                habit.color,
                habit.habit_type.to_string(),
                habit.target_count,
                habit.target_date,
                habit.current_count,
                habit.total_check_ins,
                habit.last_check_in_date,
                habit.unified_config_id,
                habit.is_active,
                habit.created_at,
            ],
        )?;

        let id = tx.last_insert_rowid();
        tx.commit()?;

        habit.id = Some(id);
        info!("Skapade vana '{}' ({})", habit.name, habit.habit_type);
        Ok(id)
    }

    /// Uppdatera vanans inställningar och spegla dem till konfigurationen.
    ///
    /// Räknarna (current_count m.fl.) ägs av incheckningarna och skrivs inte här.
    pub fn update(&self, habit: &Habit) -> Result<()> {
        let id = habit.id.ok_or_else(|| anyhow!("Vanan har inget ID"))?;
        habit
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let previous = find_habit(&tx, id)?
            .ok_or_else(|| AppError::habit_not_found(id))?;

        tx.execute(
            "UPDATE habits SET
                name = ?1, description = ?2, icon = ?3, color = ?4, habit_type = ?5,
                target_count = ?6, target_date = ?7, updated_at = datetime('now')
             WHERE id = ?8",
            params![
                habit.name,
                habit.description,
                habit.icon,
                habit.color,
                habit.habit_type.to_string(),
                habit.target_count,
                habit.target_date,
                id,
            ],
        )?;

        if let Some(config_id) = previous.unified_config_id {
            if let Some(existing) = checkin_repo::find_config_by_id(&tx, config_id)? {
                let mirrored = Habit {
                    created_at: previous.created_at.clone(),
                    ..habit.clone()
                };
                save_mirrored_config(&tx, &mirrored, existing)?;
            }

            if previous.name != habit.name {
                tx.execute(
                    "UPDATE unified_checkins SET name = ?1 WHERE config_id = ?2",
                    params![habit.name, config_id],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Checka in en vana.
    ///
    /// Returnerar false utan att skriva något om vanan redan är incheckad
    /// för datumet eller är inaktiv.
    pub fn check_in(&self, habit_id: i64, date: NaiveDate, note: Option<String>) -> Result<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let habit = find_habit(&tx, habit_id)?
            .ok_or_else(|| AppError::habit_not_found(habit_id))?;

        if !habit.is_active {
            debug!("Vana '{}' är inaktiv, ingen incheckning", habit.name);
            return Ok(false);
        }

        if has_record(&tx, habit_id, date)? || checkin_repo::has_check_in(&tx, &habit.name, date)? {
            debug!("Vana '{}' redan incheckad {}", habit.name, date);
            return Ok(false);
        }

        let count = habit.count_after_check_in(date);

        tx.execute(
            "INSERT INTO habit_records (habit_id, date, count, note) VALUES (?1, ?2, ?3, ?4)",
            params![habit_id, date, count, note],
        )?;

        let mut check_in = UnifiedCheckIn::new(habit.name.clone(), habit.habit_type.check_in_type(), date);
        check_in.config_id = habit.unified_config_id;
        check_in.count = Some(count);
        check_in.note = note;
        checkin_repo::insert_check_in(&tx, &mut check_in)?;

        let last_date = habit
            .last_check_in_date
            .map_or(date, |last| last.max(date));

        tx.execute(
            "UPDATE habits SET
                current_count = ?1,
                total_check_ins = total_check_ins + 1,
                last_check_in_date = ?2,
                updated_at = datetime('now')
             WHERE id = ?3",
            params![count, last_date, habit_id],
        )?;

        tx.commit()?;
        debug!("Vana '{}' incheckad {} (räknare {})", habit.name, date, count);
        Ok(true)
    }

    /// Ångra en incheckning i båda modellerna och räkna om cachade räknare.
    ///
    /// Returnerar false om det inte fanns någon incheckning för datumet.
    pub fn undo_check_in(&self, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let habit = find_habit(&tx, habit_id)?
            .ok_or_else(|| AppError::habit_not_found(habit_id))?;

        let removed = tx.execute(
            "DELETE FROM habit_records WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
        )?;
        if removed == 0 {
            return Ok(false);
        }

        checkin_repo::delete_check_in(&tx, &habit.name, date)?;
        sync_counters(&tx, habit_id)?;

        tx.commit()?;
        debug!("Ångrade incheckning för '{}' {}", habit.name, date);
        Ok(true)
    }

    /// Mjuk borttagning av vana och konfiguration
    pub fn delete(&self, habit_id: i64) -> Result<()> {
        let mut conn = lock(&self.conn)?;
        let tx = conn.transaction()?;

        let habit = find_habit(&tx, habit_id)?
            .ok_or_else(|| AppError::habit_not_found(habit_id))?;

        tx.execute(
            "UPDATE habits SET is_active = 0, updated_at = datetime('now') WHERE id = ?",
            [habit_id],
        )?;

        if let Some(config_id) = habit.unified_config_id {
            checkin_repo::set_config_active(&tx, config_id, false)?;
        }

        tx.commit()?;
        info!("Inaktiverade vana '{}'", habit.name);
        Ok(())
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Habit>> {
        let conn = lock(&self.conn)?;
        find_habit(&conn, id)
    }

    /// Aktiva vanor i skapandeordning
    pub fn find_active(&self) -> Result<Vec<Habit>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{} WHERE is_active = 1 ORDER BY id", SELECT_HABIT))?;
        let habits = stmt
            .query_map([], row_to_habit)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(habits)
    }

    /// Alla vanor inklusive inaktiva
    pub fn find_all(&self) -> Result<Vec<Habit>> {
        let conn = lock(&self.conn)?;
        find_all_habits(&conn)
    }

    /// Incheckningar för en vana, nyast först
    pub fn records_for(&self, habit_id: i64) -> Result<Vec<HabitRecord>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE habit_id = ? ORDER BY date DESC",
            SELECT_RECORD
        ))?;
        let records = stmt
            .query_map([habit_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Senast skrivna incheckning
    pub fn latest_record(&self, habit_id: i64) -> Result<Option<HabitRecord>> {
        let conn = lock(&self.conn)?;
        latest_record(&conn, habit_id)
    }

    /// Datum med incheckning från och med `from`
    pub fn record_dates_since(&self, habit_id: i64, from: NaiveDate) -> Result<HashSet<NaiveDate>> {
        let conn = lock(&self.conn)?;
        let mut stmt =
            conn.prepare("SELECT date FROM habit_records WHERE habit_id = ?1 AND date >= ?2")?;
        let dates = stmt
            .query_map(params![habit_id, from], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<NaiveDate>>>()?;
        Ok(dates)
    }

    pub fn has_checked_in(&self, habit_id: i64, date: NaiveDate) -> Result<bool> {
        let conn = lock(&self.conn)?;
        has_record(&conn, habit_id, date)
    }
}

/// Kopiera vanans inställningar till en incheckningskonfiguration
fn mirror_into_config(habit: &Habit, mut config: UnifiedCheckInConfig) -> UnifiedCheckInConfig {
    config.name = habit.name.clone();
    config.check_in_type = habit.habit_type.check_in_type();
    config.icon = habit.icon.clone();
    config.color = habit.color.clone();
    config.is_active = true;

    match habit.habit_type {
        HabitType::Countdown => {
            config.countdown_mode = Some(CountdownMode::DayBased);
            config.target_date = habit.target_date;
            config.target_count = None;
        }
        HabitType::Positive => {
            config.countdown_mode = None;
            config.target_date = None;
            config.target_count = (habit.target_count > 0).then_some(habit.target_count);
        }
    }

    config
}

/// Spegla vanan till konfigurationen och spara den. Returnerar dess ID.
fn save_mirrored_config(
    conn: &Connection,
    habit: &Habit,
    config: UnifiedCheckInConfig,
) -> Result<i64> {
    let mut config = mirror_into_config(habit, config);
    if habit.habit_type == HabitType::Countdown {
        config.start_date = habit.created_on();
    }

    match config.id {
        Some(id) => {
            checkin_repo::update_config_row(conn, &config)?;
            Ok(id)
        }
        None => checkin_repo::insert_config(conn, &mut config),
    }
}

fn find_inactive_by_name(conn: &Connection, name: &str) -> Result<Option<Habit>> {
    let habit = conn
        .query_row(
            &format!("{} WHERE name = ? AND is_active = 0 ORDER BY id DESC LIMIT 1", SELECT_HABIT),
            [name],
            row_to_habit,
        )
        .optional()?;
    Ok(habit)
}

/// Väck en inaktiv vana med nya inställningar. Räknare och historik behålls.
fn reactivate(conn: &Connection, habit: &mut Habit, inactive: Habit) -> Result<i64> {
    let id = inactive.id.ok_or_else(|| anyhow!("Vanan har inget ID"))?;

    habit.id = Some(id);
    habit.current_count = inactive.current_count;
    habit.total_check_ins = inactive.total_check_ins;
    habit.last_check_in_date = inactive.last_check_in_date;
    habit.created_at = inactive.created_at;
    habit.is_active = true;

    let config = match inactive.unified_config_id {
        Some(config_id) => checkin_repo::find_config_by_id(conn, config_id)?,
        None => None,
    };
    let config = match config {
        Some(config) => config,
        None => match checkin_repo::find_config_by_name(conn, &habit.name)? {
            Some(existing) => existing,
            None => UnifiedCheckInConfig::new(habit.name.clone(), habit.habit_type.check_in_type()),
        },
    };
    habit.unified_config_id = Some(save_mirrored_config(conn, habit, config)?);

    conn.execute(
        "UPDATE habits SET
            description = ?1, icon = ?2, color = ?3, habit_type = ?4, target_count = ?5,
            target_date = ?6, unified_config_id = ?7, is_active = 1, updated_at = datetime('now')
         WHERE id = ?8",
        params![
            habit.description,
            habit.icon,
            habit.color,
            habit.habit_type.to_string(),
            habit.target_count,
            habit.target_date,
            habit.unified_config_id,
            id,
        ],
    )?;

    Ok(id)
}

/// Räkna om cachade räknare från kvarvarande incheckningar
fn sync_counters(conn: &Connection, habit_id: i64) -> Result<()> {
    let latest = latest_record(conn, habit_id)?;
    let (total, last_date): (i32, Option<NaiveDate>) = conn.query_row(
        "SELECT COUNT(*), MAX(date) FROM habit_records WHERE habit_id = ?",
        [habit_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    conn.execute(
        "UPDATE habits SET
            current_count = ?1, total_check_ins = ?2, last_check_in_date = ?3,
            updated_at = datetime('now')
         WHERE id = ?4",
        params![latest.map_or(0, |r| r.count), total, last_date, habit_id],
    )?;

    Ok(())
}

pub(crate) fn find_habit(conn: &Connection, id: i64) -> Result<Option<Habit>> {
    let habit = conn
        .query_row(&format!("{} WHERE id = ?", SELECT_HABIT), [id], row_to_habit)
        .optional()?;
    Ok(habit)
}

fn has_record(conn: &Connection, habit_id: i64, date: NaiveDate) -> Result<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM habit_records WHERE habit_id = ?1 AND date = ?2)",
        params![habit_id, date],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn latest_record(conn: &Connection, habit_id: i64) -> Result<Option<HabitRecord>> {
    let record = conn
        .query_row(
            &format!("{} WHERE habit_id = ? ORDER BY id DESC LIMIT 1", SELECT_RECORD),
            [habit_id],
            row_to_record,
        )
        .optional()?;
    Ok(record)
}

pub(crate) fn find_all_habits(conn: &Connection) -> Result<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_HABIT))?;
    let habits = stmt
        .query_map([], row_to_habit)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(habits)
}

pub(crate) fn find_all_records(conn: &Connection) -> Result<Vec<HabitRecord>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY id", SELECT_RECORD))?;
    let records = stmt
        .query_map([], row_to_record)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

/// Infoga med bevarat ID (används vid import)
pub(crate) fn insert_habit_with_id(conn: &Connection, habit: &Habit) -> Result<()> {
    conn.execute(
        "INSERT INTO habits
         (id, name, description, icon, color, habit_type, target_count, target_date,
          current_count, total_check_ins, last_check_in_date, unified_config_id, is_active,
          created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                 COALESCE(?14, datetime('now')), COALESCE(?15, datetime('now')))",
        params![
            habit.id,
            habit.name,
            habit.description,
            habit.icon,
            habit.color,
            habit.habit_type.to_string(),
            habit.target_count,
            habit.target_date,
            habit.current_count,
            habit.total_check_ins,
            habit.last_check_in_date,
            habit.unified_config_id,
            habit.is_active,
            habit.created_at,
            habit.updated_at,
        ],
    )?;
    Ok(())
}

/// Infoga med bevarat ID (används vid import)
pub(crate) fn insert_record_with_id(conn: &Connection, record: &HabitRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO habit_records (id, habit_id, date, count, note, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, datetime('now')))",
        params![
            record.id,
            record.habit_id,
            record.date,
            record.count,
            record.note,
            record.created_at,
        ],
    )?;
    Ok(())
}

fn row_to_habit(row: &Row) -> rusqlite::Result<Habit> {
    let habit_type: String = row.get(5)?;
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        color: row.get(4)?,
        habit_type: HabitType::from_db_str(&habit_type),
        target_count: row.get(6)?,
        target_date: row.get(7)?,
        current_count: row.get(8)?,
        total_check_ins: row.get(9)?,
        last_check_in_date: row.get(10)?,
        unified_config_id: row.get(11)?,
        is_active: row.get(12)?,
        created_at: row.get(13).ok(),
        updated_at: row.get(14).ok(),
    })
}

fn row_to_record(row: &Row) -> rusqlite::Result<HabitRecord> {
    Ok(HabitRecord {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: row.get(2)?,
        count: row.get(3)?,
        note: row.get(4)?,
        created_at: row.get(5).ok(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::CheckInType;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn create_habit(db: &Database, name: &str) -> i64 {
        let mut habit = Habit::new(name);
        db.habits().create(&mut habit).unwrap()
    }

    #[test]
    fn test_create_writes_both_models() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "早睡");

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        let config_id = habit.unified_config_id.unwrap();

        let config = db.check_ins().find_config_by_id(config_id).unwrap().unwrap();
        assert_eq!(config.name, "早睡");
        assert_eq!(config.check_in_type, CheckInType::Habit);
        assert!(config.is_active);
    }

    #[test]
    fn test_create_reuses_config_by_name() {
        let db = Database::open_in_memory().unwrap();
        let mut existing = UnifiedCheckInConfig::new("跑步", CheckInType::Custom);
        let config_id = db.check_ins().create_config(&mut existing).unwrap();
        db.check_ins().deactivate_config(config_id).unwrap();

        let id = create_habit(&db, "跑步");
        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.unified_config_id, Some(config_id));

        let config = db.check_ins().find_config_by_id(config_id).unwrap().unwrap();
        assert!(config.is_active);
        assert_eq!(config.check_in_type, CheckInType::Habit);
        assert_eq!(db.check_ins().list_configs(true).unwrap().len(), 1);
    }

    #[test]
    fn test_create_validates() {
        let db = Database::open_in_memory().unwrap();

        let mut nameless = Habit::new("");
        assert!(db.habits().create(&mut nameless).is_err());

        create_habit(&db, "喝水");
        let mut duplicate = Habit::new("喝水");
        let err = db.habits().create(&mut duplicate).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_check_in_writes_both_models() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "背单词");
        let date = d(2026, 10, 16);

        assert!(db.habits().check_in(id, date, Some("50个".into())).unwrap());

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.current_count, 1);
        assert_eq!(habit.total_check_ins, 1);
        assert_eq!(habit.last_check_in_date, Some(date));

        let records = db.habits().records_for(id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].count, 1);
        assert_eq!(records[0].note.as_deref(), Some("50个"));

        let unified = db.check_ins().find_by_name_and_date("背单词", date).unwrap().unwrap();
        assert_eq!(unified.count, Some(1));
        assert_eq!(unified.config_id, habit.unified_config_id);
        assert!(unified.is_completed);
    }

    #[test]
    fn test_second_check_in_same_day_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "冥想");
        let date = d(2026, 10, 16);

        assert!(db.habits().check_in(id, date, None).unwrap());
        assert!(!db.habits().check_in(id, date, None).unwrap());

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.current_count, 1);
        assert_eq!(habit.total_check_ins, 1);
        assert_eq!(db.habits().records_for(id).unwrap().len(), 1);
        assert_eq!(db.check_ins().count_for_name("冥想").unwrap(), 1);
    }

    #[test]
    fn test_current_count_matches_latest_record() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "拥抱");
        let start = d(2026, 10, 1);

        for i in 0..5 {
            db.habits().check_in(id, start + Duration::days(i), None).unwrap();
            let habit = db.habits().find_by_id(id).unwrap().unwrap();
            let latest = db.habits().latest_record(id).unwrap().unwrap();
            assert_eq!(habit.current_count, latest.count);
        }

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.current_count, 5);
    }

    #[test]
    fn test_countdown_check_in_uses_days_remaining() {
        let db = Database::open_in_memory().unwrap();
        let mut habit = Habit::countdown("旅行", d(2026, 10, 26));
        let id = db.habits().create(&mut habit).unwrap();

        db.habits().check_in(id, d(2026, 10, 16), None).unwrap();
        assert_eq!(db.habits().find_by_id(id).unwrap().unwrap().current_count, 10);

        db.habits().check_in(id, d(2026, 10, 20), None).unwrap();
        assert_eq!(db.habits().find_by_id(id).unwrap().unwrap().current_count, 6);

        // Efter måldatum blir det aldrig negativt
        db.habits().check_in(id, d(2026, 11, 2), None).unwrap();
        assert_eq!(db.habits().find_by_id(id).unwrap().unwrap().current_count, 0);

        let unified = db.check_ins().find_by_name_and_date("旅行", d(2026, 10, 20)).unwrap().unwrap();
        assert_eq!(unified.check_in_type, CheckInType::Countdown);
        assert_eq!(unified.count, Some(6));

        let config = db.check_ins().find_config_by_name("旅行").unwrap().unwrap();
        assert_eq!(config.countdown_mode, Some(CountdownMode::DayBased));
        assert_eq!(config.target_date, Some(d(2026, 10, 26)));
    }

    #[test]
    fn test_undo_check_in_restores_counters() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "运动");

        db.habits().check_in(id, d(2026, 10, 15), None).unwrap();
        db.habits().check_in(id, d(2026, 10, 16), None).unwrap();

        assert!(db.habits().undo_check_in(id, d(2026, 10, 16)).unwrap());
        assert!(!db.habits().undo_check_in(id, d(2026, 10, 16)).unwrap());

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.current_count, 1);
        assert_eq!(habit.total_check_ins, 1);
        assert_eq!(habit.last_check_in_date, Some(d(2026, 10, 15)));
        assert!(db
            .check_ins()
            .find_by_name_and_date("运动", d(2026, 10, 16))
            .unwrap()
            .is_none());

        // Samma dag kan checkas in igen efter ångring
        assert!(db.habits().check_in(id, d(2026, 10, 16), None).unwrap());
    }

    #[test]
    fn test_update_mirrors_config_and_renames_history() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "看书");
        db.habits().check_in(id, d(2026, 10, 16), None).unwrap();

        let mut habit = db.habits().find_by_id(id).unwrap().unwrap();
        habit.name = "读书".into();
        habit.icon = "📚".into();
        habit.target_count = 30;
        db.habits().update(&habit).unwrap();

        let config = db
            .check_ins()
            .find_config_by_id(habit.unified_config_id.unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(config.name, "读书");
        assert_eq!(config.icon, "📚");
        assert_eq!(config.target_count, Some(30));
        assert_eq!(db.check_ins().count_for_name("读书").unwrap(), 1);

        // Räknare påverkas inte av update
        let reloaded = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(reloaded.current_count, 1);
    }

    #[test]
    fn test_delete_is_soft_in_both_models() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "护肤");
        db.habits().check_in(id, d(2026, 10, 16), None).unwrap();

        db.habits().delete(id).unwrap();

        assert!(db.habits().find_active().unwrap().is_empty());
        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert!(!habit.is_active);
        assert!(db.check_ins().list_configs(false).unwrap().is_empty());

        // Historiken finns kvar
        assert_eq!(db.habits().records_for(id).unwrap().len(), 1);
        assert_eq!(db.check_ins().count_for_name("护肤").unwrap(), 1);

        // Inaktiv vana kan inte checkas in
        assert!(!db.habits().check_in(id, d(2026, 10, 17), None).unwrap());
        assert!(db.habits().delete(9999).is_err());
    }

    #[test]
    fn test_recreate_deleted_habit_reactivates_it() {
        let db = Database::open_in_memory().unwrap();
        let date = d(2026, 10, 16);

        let id = create_habit(&db, "跑步");
        assert!(db.habits().check_in(id, date, None).unwrap());
        db.habits().delete(id).unwrap();

        let mut again = Habit::new("跑步");
        again.icon = "🏃".into();
        let again_id = db.habits().create(&mut again).unwrap();

        // Samma vana väcks, ingen andra vana över samma ström
        assert_eq!(again_id, id);
        assert_eq!(db.habits().find_all().unwrap().len(), 1);
        assert_eq!(db.check_ins().list_configs(true).unwrap().len(), 1);

        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert!(habit.is_active);
        assert_eq!(habit.icon, "🏃");
        assert_eq!(habit.total_check_ins, 1);
        let config = db.check_ins().find_config_by_id(habit.unified_config_id.unwrap()).unwrap().unwrap();
        assert!(config.is_active);
        assert_eq!(config.icon, "🏃");

        // Dagens post tillhör vanan, så en ny incheckning avvisas
        assert!(!db.habits().check_in(id, date, None).unwrap());
        assert_eq!(db.habits().records_for(id).unwrap().len(), 1);

        assert!(db.habits().check_in(id, d(2026, 10, 17), None).unwrap());
        let habit = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(habit.current_count, 2);
        assert_eq!(db.check_ins().count_for_name("跑步").unwrap(), 2);
    }

    #[test]
    fn test_countdown_config_starts_on_creation_date() {
        let db = Database::open_in_memory().unwrap();

        // En befintlig ström utan startdatum återanvänds
        let mut existing = UnifiedCheckInConfig::new("考试", CheckInType::Custom);
        db.check_ins().create_config(&mut existing).unwrap();

        let mut habit = Habit::countdown("考试", d(2027, 6, 7));
        let id = db.habits().create(&mut habit).unwrap();

        let stored = db.habits().find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.created_at, habit.created_at);
        let created_on = stored.created_on().unwrap();

        let config = db.check_ins().find_config_by_name("考试").unwrap().unwrap();
        assert_eq!(config.start_date, Some(created_on));
        assert_eq!(
            config.countdown_progress(created_on),
            stored.countdown_progress(created_on)
        );
    }

    #[test]
    fn test_record_dates_since() {
        let db = Database::open_in_memory().unwrap();
        let id = create_habit(&db, "散步");
        let today = d(2026, 10, 16);

        for i in 0..4 {
            db.habits().check_in(id, today - Duration::days(i), None).unwrap();
        }

        let dates = db.habits().record_dates_since(id, today - Duration::days(1)).unwrap();
        assert_eq!(dates.len(), 2);
        assert!(db.habits().has_checked_in(id, today).unwrap());
        assert!(!db.habits().has_checked_in(id, today + Duration::days(1)).unwrap());
    }
}
