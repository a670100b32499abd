//! Statistik över humör och vanor

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::models::MoodType;
use crate::utils::date::{self, LONG_STREAK_LOOKBACK_DAYS, STREAK_LOOKBACK_DAYS};
use crate::utils::AppError;

/// Andel för en humörtyp
#[derive(Debug, Clone, PartialEq)]
pub struct MoodShare {
    pub mood: MoodType,
    pub count: usize,
    /// Procent av alla poster i intervallet
    pub percent: f32,
}

/// Fördelning av humör under en period
#[derive(Debug, Clone, PartialEq)]
pub struct MoodDistribution {
    pub total: usize,
    /// En rad per humörtyp, i samma ordning som `MoodType::all()`
    pub shares: Vec<MoodShare>,
    /// None om perioden saknar poster
    pub average_score: Option<f32>,
}

impl MoodDistribution {
    /// Vanligaste humöret, None om perioden saknar poster
    pub fn dominant(&self) -> Option<MoodType> {
        self.shares
            .iter()
            .filter(|s| s.count > 0)
            .max_by_key(|s| s.count)
            .map(|s| s.mood)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HabitStats {
    pub habit_id: i64,
    pub total_check_ins: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Andel av de senaste 30 dagarna med incheckning
    pub completion_rate: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverallStats {
    pub mood_entries: i64,
    pub active_habits: usize,
    pub check_ins_today: i64,
}

pub struct StatisticsService<'a> {
    db: &'a Database,
}

impl<'a> StatisticsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn mood_distribution(&self, from: NaiveDate, to: NaiveDate) -> Result<MoodDistribution> {
        let moods = self.db.moods().find_range(from, to)?;
        let total = moods.len();

        let mut counts: HashMap<MoodType, usize> = HashMap::new();
        let mut score_sum = 0i64;
        for mood in &moods {
            *counts.entry(mood.mood).or_default() += 1;
            score_sum += i64::from(mood.clamped_score());
        }

        let shares = MoodType::all()
            .iter()
            .map(|&mood| {
                let count = counts.get(&mood).copied().unwrap_or(0);
                MoodShare {
                    mood,
                    count,
                    percent: percentage(count, total),
                }
            })
            .collect();

        Ok(MoodDistribution {
            total,
            shares,
            average_score: (total > 0).then(|| score_sum as f32 / total as f32),
        })
    }

    /// Procent av de senaste `days` dagarna (till och med `today`) med incheckning
    pub fn habit_completion_rate(&self, habit_id: i64, days: u32, today: NaiveDate) -> Result<f32> {
        if days == 0 {
            return Ok(0.0);
        }

        let from = date::window_start(today, days);
        let dates = self.db.habits().record_dates_since(habit_id, from)?;
        let in_window = dates.iter().filter(|d| **d <= today).count();

        Ok(percentage(in_window, days as usize))
    }

    pub fn habit_stats(&self, habit_id: i64, today: NaiveDate) -> Result<HabitStats> {
        let repo = self.db.habits();
        repo.find_by_id(habit_id)?
            .ok_or_else(|| AppError::habit_not_found(habit_id))?;

        let all_dates: HashSet<NaiveDate> =
            repo.records_for(habit_id)?.into_iter().map(|r| r.date).collect();

        Ok(HabitStats {
            habit_id,
            total_check_ins: all_dates.len(),
            current_streak: date::count_streak(&all_dates, today, LONG_STREAK_LOOKBACK_DAYS),
            longest_streak: date::longest_streak(&all_dates),
            completion_rate: self.habit_completion_rate(habit_id, STREAK_LOOKBACK_DAYS, today)?,
        })
    }

    pub fn overall(&self, today: NaiveDate) -> Result<OverallStats> {
        Ok(OverallStats {
            mood_entries: self.db.moods().count()?,
            active_habits: self.db.habits().find_active()?.len(),
            check_ins_today: self.db.check_ins().count_on(today)?,
        })
    }
}

/// Andel i procent, begränsad till [0, 100]
fn percentage(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        return 0.0;
    }
    (part as f32 * 100.0 / whole as f32).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyMood, Habit};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_mood_distribution() {
        let db = Database::open_in_memory().unwrap();
        let service = StatisticsService::new(&db);

        let empty = service.mood_distribution(d(2026, 10, 1), d(2026, 10, 31)).unwrap();
        assert_eq!(empty.total, 0);
        assert!(empty.shares.iter().all(|s| s.percent == 0.0));
        assert_eq!(empty.average_score, None);
        assert_eq!(empty.dominant(), None);

        let entries = [
            (1, MoodType::Happy),
            (2, MoodType::Happy),
            (3, MoodType::Happy),
            (4, MoodType::Sad),
        ];
        for (day, mood) in entries {
            db.moods().save(&mut DailyMood::new(d(2026, 10, day), mood)).unwrap();
        }
        // Utanför intervallet
        db.moods()
            .save(&mut DailyMood::new(d(2026, 9, 30), MoodType::Angry))
            .unwrap();

        let dist = service.mood_distribution(d(2026, 10, 1), d(2026, 10, 31)).unwrap();
        assert_eq!(dist.total, 4);
        assert_eq!(dist.shares.len(), MoodType::all().len());
        assert_eq!(dist.dominant(), Some(MoodType::Happy));

        let happy = dist.shares.iter().find(|s| s.mood == MoodType::Happy).unwrap();
        assert_eq!(happy.count, 3);
        assert_eq!(happy.percent, 75.0);
        let angry = dist.shares.iter().find(|s| s.mood == MoodType::Angry).unwrap();
        assert_eq!(angry.count, 0);

        let expected = (3 * MoodType::Happy.default_score() + MoodType::Sad.default_score()) as f32 / 4.0;
        assert_eq!(dist.average_score, Some(expected));
    }

    #[test]
    fn test_habit_completion_rate() {
        let db = Database::open_in_memory().unwrap();
        let id = db.habits().create(&mut Habit::new("跑步")).unwrap();
        let today = d(2026, 10, 16);

        for day in [7, 10, 15, 16] {
            db.habits().check_in(id, d(2026, 10, day), None).unwrap();
        }

        let service = StatisticsService::new(&db);
        assert_eq!(service.habit_completion_rate(id, 10, today).unwrap(), 30.0);
        assert_eq!(service.habit_completion_rate(id, 2, today).unwrap(), 100.0);
        assert_eq!(service.habit_completion_rate(id, 0, today).unwrap(), 0.0);
        // Incheckningar efter `today` räknas inte
        assert_eq!(service.habit_completion_rate(id, 1, d(2026, 10, 15)).unwrap(), 100.0);
        assert_eq!(service.habit_completion_rate(id, 4, d(2026, 10, 12)).unwrap(), 25.0);

        // Ett fönster längre än kalendern ger en låg andel, ingen panik
        let rate = service.habit_completion_rate(id, u32::MAX, today).unwrap();
        assert!(rate > 0.0 && rate < 0.001);
    }

    #[test]
    fn test_habit_stats() {
        let db = Database::open_in_memory().unwrap();
        let id = db.habits().create(&mut Habit::new("读书")).unwrap();
        for day in [1, 2, 3, 4, 10, 15, 16] {
            db.habits().check_in(id, d(2026, 10, day), None).unwrap();
        }

        let service = StatisticsService::new(&db);
        let stats = service.habit_stats(id, d(2026, 10, 16)).unwrap();
        assert_eq!(stats.total_check_ins, 7);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 4);
        assert!((stats.completion_rate - 7.0 / 30.0 * 100.0).abs() < 0.001);

        let err = service.habit_stats(999, d(2026, 10, 16)).unwrap_err();
        assert!(err.downcast_ref::<AppError>().unwrap().is_not_found());
    }

    #[test]
    fn test_overall() {
        let db = Database::open_in_memory().unwrap();
        let today = d(2026, 10, 16);
        let service = StatisticsService::new(&db);
        assert_eq!(service.overall(today).unwrap(), OverallStats::default());

        db.moods().save(&mut DailyMood::new(today, MoodType::Calm)).unwrap();
        let a = db.habits().create(&mut Habit::new("喝水")).unwrap();
        let b = db.habits().create(&mut Habit::new("早睡")).unwrap();
        db.habits().check_in(a, today, None).unwrap();
        db.habits().check_in(b, d(2026, 10, 15), None).unwrap();
        db.habits().delete(b).unwrap();

        let overall = service.overall(today).unwrap();
        assert_eq!(overall.mood_entries, 1);
        assert_eq!(overall.active_habits, 1);
        assert_eq!(overall.check_ins_today, 1);
    }
}
