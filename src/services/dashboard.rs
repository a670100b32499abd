//! Översikt för startsidan: dagräknare, humör, vanor och nedräkningar

use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::db::Database;
use crate::models::{CountdownProgress, DailyMood, HabitType};
use crate::utils::date::{self, Anniversary, LONG_STREAK_LOOKBACK_DAYS, STREAK_LOOKBACK_DAYS};

/// Dagräknare sedan relationens start
#[derive(Debug, Clone, PartialEq)]
pub struct DayCounter {
    pub start_date: NaiveDate,
    /// Startdagen är dag 1
    pub day_index: i64,
    /// T.ex. "3个月10天"
    pub span_text: String,
    pub is_anniversary: bool,
    pub next_anniversary: Anniversary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HabitSummary {
    pub habit_id: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub habit_type: HabitType,
    pub checked_in_today: bool,
    pub current_count: i32,
    pub streak: u32,
    /// Endast för nedräkningsvanor
    pub countdown: Option<CountdownProgress>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSummary {
    pub config_id: i64,
    pub name: String,
    pub icon: String,
    pub progress: CountdownProgress,
}

/// Allt startsidan visar, beräknat för en given dag
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub couple_name: String,
    pub day_counter: Option<DayCounter>,
    pub today_mood: Option<DailyMood>,
    pub mood_streak: u32,
    pub habits: Vec<HabitSummary>,
    pub countdowns: Vec<CountdownSummary>,
}

pub struct DashboardService<'a> {
    db: &'a Database,
    lookback: u32,
}

impl<'a> DashboardService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            lookback: STREAK_LOOKBACK_DAYS,
        }
    }

    /// Använd en annan bakåtblick för streaks (se AppSettings).
    /// Begränsas till 1..=365 dagar.
    pub fn with_lookback(mut self, lookback: u32) -> Self {
        self.lookback = lookback.clamp(1, LONG_STREAK_LOOKBACK_DAYS);
        self
    }

    /// Dagräknare, None innan startdatum har angetts
    pub fn day_counter(&self, today: NaiveDate) -> Result<Option<DayCounter>> {
        let config = self.db.config().get()?;
        Ok(config.start_date.map(|start| build_day_counter(start, today)))
    }

    /// Antal dagar i följd med humörpost, till och med idag
    pub fn mood_streak(&self, today: NaiveDate) -> Result<u32> {
        let dates = self.db.moods().dates_since(self.window_start(today))?;
        Ok(date::count_streak(&dates, today, self.lookback))
    }

    pub fn snapshot(&self, today: NaiveDate) -> Result<DashboardSummary> {
        let config = self.db.config().get()?;

        let habits = self.habit_summaries(today)?;
        let linked: HashSet<i64> = self
            .db
            .habits()
            .find_all()?
            .into_iter()
            .filter_map(|h| h.unified_config_id)
            .collect();

        let countdowns = self
            .db
            .check_ins()
            .list_countdowns()?
            .into_iter()
            .filter(|c| c.id.map_or(false, |id| !linked.contains(&id)))
            .filter_map(|c| {
                let progress = c.countdown_progress(today)?;
                Some(CountdownSummary {
                    config_id: c.id?,
                    name: c.name,
                    icon: c.icon,
                    progress,
                })
            })
            .collect();

        let summary = DashboardSummary {
            couple_name: config.couple_display_name(),
            day_counter: config.start_date.map(|start| build_day_counter(start, today)),
            today_mood: self.db.moods().find_by_date(today)?,
            mood_streak: self.mood_streak(today)?,
            habits,
            countdowns,
        };

        debug!(
            "Dashboard {}: {} vanor, {} nedräkningar",
            today,
            summary.habits.len(),
            summary.countdowns.len()
        );
        Ok(summary)
    }

    fn habit_summaries(&self, today: NaiveDate) -> Result<Vec<HabitSummary>> {
        let repo = self.db.habits();
        let from = self.window_start(today);
        let mut summaries = Vec::new();

        for habit in repo.find_active()? {
            let Some(habit_id) = habit.id else {
                continue;
            };
            let dates = repo.record_dates_since(habit_id, from)?;

            summaries.push(HabitSummary {
                habit_id,
                checked_in_today: dates.contains(&today),
                streak: date::count_streak(&dates, today, self.lookback),
                countdown: habit.countdown_progress(today),
                current_count: habit.current_count,
                habit_type: habit.habit_type,
                name: habit.name,
                icon: habit.icon,
                color: habit.color,
            });
        }

        Ok(summaries)
    }

    fn window_start(&self, today: NaiveDate) -> NaiveDate {
        date::window_start(today, self.lookback)
    }
}

fn build_day_counter(start: NaiveDate, today: NaiveDate) -> DayCounter {
    let day_index = date::day_index(start, today);
    DayCounter {
        start_date: start,
        day_index,
        span_text: date::format_day_span(day_index),
        is_anniversary: date::is_anniversary(day_index),
        next_anniversary: date::next_anniversary(start, today),
    }
}
