use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::checkin::CheckInType;
use super::countdown::CountdownProgress;
use crate::utils::date::days_between;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HabitType {
    /// Räknar upp vid varje incheckning
    #[default]
    Positive,
    /// Räknar ned mot ett måldatum
    Countdown,
}

impl HabitType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Positive => "打卡",
            Self::Countdown => "倒计时",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "countdown" => Self::Countdown,
            _ => Self::Positive,
        }
    }

    /// Motsvarande typ i den enhetliga incheckningsmodellen
    pub fn check_in_type(&self) -> CheckInType {
        match self {
            Self::Positive => CheckInType::Habit,
            Self::Countdown => CheckInType::Countdown,
        }
    }
}

impl fmt::Display for HabitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Countdown => write!(f, "countdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
    pub habit_type: HabitType,
    pub target_count: i32,
    pub target_date: Option<NaiveDate>,
    /// Samma värde som senaste HabitRecord.count
    pub current_count: i32,
    pub total_check_ins: i32,
    pub last_check_in_date: Option<NaiveDate>,
    pub unified_config_id: Option<i64>,
    pub is_active: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Default for Habit {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: None,
            icon: "✅".to_string(),
            color: "#FF6B81".to_string(),
            habit_type: HabitType::default(),
            target_count: 0,
            target_date: None,
            current_count: 0,
            total_check_ins: 0,
            last_check_in_date: None,
            unified_config_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Habit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn countdown(name: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            habit_type: HabitType::Countdown,
            target_date: Some(target_date),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::MissingName);
        }

        if self.target_count < 0 {
            return Err(HabitValidationError::NegativeTarget);
        }

        if self.habit_type == HabitType::Countdown && self.target_date.is_none() {
            return Err(HabitValidationError::MissingTargetDate);
        }

        Ok(())
    }

    /// Räknare efter en incheckning på `date`.
    ///
    /// Nedräkningar räknar om dagar kvar till måldatum i stället för att
    /// öka räknaren.
    pub fn count_after_check_in(&self, date: NaiveDate) -> i32 {
        match (self.habit_type, self.target_date) {
            (HabitType::Countdown, Some(target)) => {
                let remaining = days_between(date, target).max(0);
                i32::try_from(remaining).unwrap_or(i32::MAX)
            }
            _ => self.current_count.saturating_add(1),
        }
    }

    pub fn is_checked_in_on(&self, date: NaiveDate) -> bool {
        self.last_check_in_date == Some(date)
    }

    /// Dagbaserat framsteg för nedräkningsvanor
    pub fn countdown_progress(&self, today: NaiveDate) -> Option<CountdownProgress> {
        if self.habit_type != HabitType::Countdown {
            return None;
        }
        let target = self.target_date?;
        let start = self.created_on().unwrap_or(today);
        Some(CountdownProgress::day_based(start, target, today))
    }

    /// Datumdelen av `created_at`, startdag för nedräkningar
    pub fn created_on(&self) -> Option<NaiveDate> {
        self.created_at
            .as_deref()
            .and_then(|s| s.get(..10))
            .and_then(crate::utils::date::parse_date)
    }
}

/// En incheckning för en vana
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: Option<i64>,
    pub habit_id: i64,
    pub date: NaiveDate,
    /// Räknaren efter denna incheckning
    pub count: i32,
    pub note: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum HabitValidationError {
    #[error("Vanan måste ha ett namn")]
    MissingName,
    #[error("Målet kan inte vara negativt")]
    NegativeTarget,
    #[error("Nedräkning kräver ett måldatum")]
    MissingTargetDate,
}
