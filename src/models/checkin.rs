use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::countdown::CountdownProgress;
use super::mood::MoodType;

/// Typ av incheckningsström
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckInType {
    Mood,
    #[default]
    Habit,
    Countdown,
    Custom,
}

impl CheckInType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mood => "心情",
            Self::Habit => "习惯",
            Self::Countdown => "倒计时",
            Self::Custom => "自定义",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        match s {
            "mood" => Self::Mood,
            "countdown" => Self::Countdown,
            "custom" => Self::Custom,
            _ => Self::Habit,
        }
    }
}

impl fmt::Display for CheckInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mood => write!(f, "mood"),
            Self::Habit => write!(f, "habit"),
            Self::Countdown => write!(f, "countdown"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Hur en nedräkning avancerar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CountdownMode {
    /// Följer kalendern, kräver ingen åtgärd
    #[default]
    DayBased,
    /// Avancerar endast vid incheckning
    CheckInBased,
}

impl CountdownMode {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "day_based" => Some(Self::DayBased),
            "check_in_based" => Some(Self::CheckInBased),
            _ => None,
        }
    }
}

impl fmt::Display for CountdownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayBased => write!(f, "day_based"),
            Self::CheckInBased => write!(f, "check_in_based"),
        }
    }
}

/// Konfiguration för en godtycklig incheckningsström
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCheckInConfig {
    pub id: Option<i64>,
    pub name: String,
    pub check_in_type: CheckInType,
    pub icon: String,
    pub color: String,
    pub countdown_mode: Option<CountdownMode>,
    pub start_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub target_count: Option<i32>,
    /// Framsteg för incheckningsbaserad nedräkning
    pub progress: i32,
    pub reminder_time: Option<NaiveTime>,
    pub is_active: bool,
    pub created_at: Option<String>,
}

impl UnifiedCheckInConfig {
    pub fn new(name: impl Into<String>, check_in_type: CheckInType) -> Self {
        Self {
            id: None,
            name: name.into(),
            check_in_type,
            icon: "⭐".to_string(),
            color: "#FF6B81".to_string(),
            countdown_mode: None,
            start_date: None,
            target_date: None,
            target_count: None,
            progress: 0,
            reminder_time: None,
            is_active: true,
            created_at: None,
        }
    }

    /// Dagbaserad nedräkning mellan två datum
    pub fn day_countdown(name: impl Into<String>, start: NaiveDate, target: NaiveDate) -> Self {
        Self {
            countdown_mode: Some(CountdownMode::DayBased),
            start_date: Some(start),
            target_date: Some(target),
            ..Self::new(name, CheckInType::Countdown)
        }
    }

    /// Incheckningsbaserad nedräkning mot ett mål
    pub fn check_in_countdown(name: impl Into<String>, target_count: i32) -> Self {
        Self {
            countdown_mode: Some(CountdownMode::CheckInBased),
            target_count: Some(target_count),
            ..Self::new(name, CheckInType::Countdown)
        }
    }

    pub fn is_countdown(&self) -> bool {
        self.check_in_type == CheckInType::Countdown && self.countdown_mode.is_some()
    }

    /// Framsteg för nedräkning, None om konfigurationen saknar mål
    pub fn countdown_progress(&self, today: NaiveDate) -> Option<CountdownProgress> {
        match self.countdown_mode? {
            CountdownMode::DayBased => {
                let target = self.target_date?;
                let start = self.start_date.unwrap_or(today);
                Some(CountdownProgress::day_based(start, target, today))
            }
            CountdownMode::CheckInBased => {
                let target = self.target_count?;
                Some(CountdownProgress::check_in_based(self.progress, target))
            }
        }
    }
}

/// En incheckning i en namngiven ström, högst en per dag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedCheckIn {
    pub id: Option<i64>,
    pub config_id: Option<i64>,
    pub name: String,
    pub check_in_type: CheckInType,
    pub date: NaiveDate,
    pub mood: Option<MoodType>,
    pub score: Option<i32>,
    pub note: Option<String>,
    pub image_path: Option<String>,
    pub is_completed: bool,
    pub count: Option<i32>,
    pub created_at: Option<String>,
}

impl UnifiedCheckIn {
    pub fn new(name: impl Into<String>, check_in_type: CheckInType, date: NaiveDate) -> Self {
        Self {
            id: None,
            config_id: None,
            name: name.into(),
            check_in_type,
            date,
            mood: None,
            score: None,
            note: None,
            image_path: None,
            is_completed: true,
            count: None,
            created_at: None,
        }
    }

    pub fn for_config(config: &UnifiedCheckInConfig, date: NaiveDate) -> Self {
        Self {
            config_id: config.id,
            ..Self::new(config.name.clone(), config.check_in_type, date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_type_db_roundtrip() {
        for t in [CheckInType::Mood, CheckInType::Habit, CheckInType::Countdown, CheckInType::Custom] {
            assert_eq!(CheckInType::from_db_str(&t.to_string()), t);
        }
        for m in [CountdownMode::DayBased, CountdownMode::CheckInBased] {
            assert_eq!(CountdownMode::from_db_str(&m.to_string()), Some(m));
        }
        assert_eq!(CountdownMode::from_db_str(""), None);
    }

    #[test]
    fn test_countdown_progress_from_config() {
        let config = UnifiedCheckInConfig::day_countdown("见面", d(2026, 10, 1), d(2026, 10, 11));
        let progress = config.countdown_progress(d(2026, 10, 6)).unwrap();
        assert_eq!(progress.remaining, 5);
        assert_eq!(progress.percent, 50.0);

        let mut config = UnifiedCheckInConfig::check_in_countdown("跑步", 4);
        config.progress = 1;
        let progress = config.countdown_progress(d(2026, 10, 6)).unwrap();
        assert_eq!(progress.remaining, 3);
        assert_eq!(progress.percent, 25.0);

        let plain = UnifiedCheckInConfig::new("喝水", CheckInType::Habit);
        assert!(plain.countdown_progress(d(2026, 10, 6)).is_none());
    }
}
