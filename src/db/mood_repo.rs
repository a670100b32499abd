//! Repository för humördagboken

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::lock;
use crate::models::{DailyMood, MoodType};
use crate::utils::AppError;

const SELECT_MOOD: &str =
    "SELECT id, date, mood, score, note, image_path, created_at FROM daily_moods";

pub struct MoodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MoodRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Spara dagens humör. Finns redan en post för datumet ersätts den.
    pub fn save(&self, mood: &mut DailyMood) -> Result<i64> {
        let conn = lock(&self.conn)?;

        let id: i64 = conn.query_row(
            "INSERT INTO daily_moods (date, mood, score, note, image_path)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(date) DO UPDATE SET
                mood = excluded.mood,
                score = excluded.score,
                note = excluded.note,
                image_path = excluded.image_path
             RETURNING id",
            params![
                mood.date,
                mood.mood.code(),
                mood.clamped_score(),
                mood.note,
                mood.image_path,
            ],
            |row| row.get(0),
        )?;

        debug!("Sparade humör {} för {}", mood.mood, mood.date);
        mood.id = Some(id);
        Ok(id)
    }

    /// Hämta humör för ett datum
    pub fn find_by_date(&self, date: NaiveDate) -> Result<Option<DailyMood>> {
        let conn = lock(&self.conn)?;
        let mood = conn
            .query_row(
                &format!("{} WHERE date = ?", SELECT_MOOD),
                [date],
                row_to_mood,
            )
            .optional()?;
        Ok(mood)
    }

    /// Hämta humör i ett datumintervall (inklusive), äldst först
    pub fn find_range(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyMood>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE date >= ?1 AND date <= ?2 ORDER BY date",
            SELECT_MOOD
        ))?;

        let moods = stmt
            .query_map(params![from, to], row_to_mood)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(moods)
    }

    /// Senaste posterna, nyast först
    pub fn find_recent(&self, limit: usize) -> Result<Vec<DailyMood>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC LIMIT ?", SELECT_MOOD))?;

        let moods = stmt
            .query_map([limit as i64], row_to_mood)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(moods)
    }

    /// Alla poster, äldst först
    pub fn find_all(&self) -> Result<Vec<DailyMood>> {
        let conn = lock(&self.conn)?;
        find_all_moods(&conn)
    }

    /// Datum med humörpost från och med `from`
    pub fn dates_since(&self, from: NaiveDate) -> Result<HashSet<NaiveDate>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn.prepare("SELECT date FROM daily_moods WHERE date >= ?")?;

        let dates = stmt
            .query_map([from], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<NaiveDate>>>()?;

        Ok(dates)
    }

    /// Ta bort en humörpost
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = lock(&self.conn)?;
        let rows = conn.execute("DELETE FROM daily_moods WHERE id = ?", [id])?;

        if rows == 0 {
            return Err(AppError::mood_id_not_found(id).into());
        }

        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = lock(&self.conn)?;
        let count = conn.query_row("SELECT COUNT(*) FROM daily_moods", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub(crate) fn find_all_moods(conn: &Connection) -> Result<Vec<DailyMood>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY date", SELECT_MOOD))?;
    let moods = stmt
        .query_map([], row_to_mood)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(moods)
}

/// Infoga med bevarat ID (används vid import)
pub(crate) fn insert_mood_with_id(conn: &Connection, mood: &DailyMood) -> Result<()> {
    conn.execute(
        "INSERT INTO daily_moods (id, date, mood, score, note, image_path, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, datetime('now')))",
        params![
            mood.id,
            mood.date,
            mood.mood.code(),
            mood.score,
            mood.note,
            mood.image_path,
            mood.created_at,
        ],
    )?;
    Ok(())
}

fn row_to_mood(row: &Row) -> rusqlite::Result<DailyMood> {
    let code: String = row.get(2)?;
    Ok(DailyMood {
        id: row.get(0)?,
        date: row.get(1)?,
        mood: MoodType::from_code(&code).unwrap_or_default(),
        score: row.get(3)?,
        note: row.get(4)?,
        image_path: row.get(5)?,
        created_at: row.get(6).ok(),
    })
}
