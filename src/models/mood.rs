use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum MoodType {
    #[default]
    Happy,
    Loved,
    Calm,
    Tired,
    Sad,
    Angry,
    Anxious,
}

impl MoodType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Happy => "开心",
            Self::Loved => "甜蜜",
            Self::Calm => "平静",
            Self::Tired => "疲惫",
            Self::Sad => "难过",
            Self::Angry => "生气",
            Self::Anxious => "焦虑",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Loved => "🥰",
            Self::Calm => "😌",
            Self::Tired => "😪",
            Self::Sad => "😢",
            Self::Angry => "😠",
            Self::Anxious => "😟",
        }
    }

    /// Standardpoäng 1-5 för humöret
    pub fn default_score(&self) -> i32 {
        match self {
            Self::Happy | Self::Loved => 5,
            Self::Calm => 4,
            Self::Tired => 3,
            Self::Anxious => 2,
            Self::Sad | Self::Angry => 1,
        }
    }

    /// Kod som lagras i databasen
    pub fn code(&self) -> &'static str {
        match self {
            Self::Happy => "HAPPY",
            Self::Loved => "LOVED",
            Self::Calm => "CALM",
            Self::Tired => "TIRED",
            Self::Sad => "SAD",
            Self::Angry => "ANGRY",
            Self::Anxious => "ANXIOUS",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "HAPPY" => Some(Self::Happy),
            "LOVED" => Some(Self::Loved),
            "CALM" => Some(Self::Calm),
            "TIRED" => Some(Self::Tired),
            "SAD" => Some(Self::Sad),
            "ANGRY" => Some(Self::Angry),
            "ANXIOUS" => Some(Self::Anxious),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Happy,
            Self::Loved,
            Self::Calm,
            Self::Tired,
            Self::Sad,
            Self::Angry,
            Self::Anxious,
        ]
    }
}

impl fmt::Display for MoodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

pub const MIN_MOOD_SCORE: i32 = 1;
pub const MAX_MOOD_SCORE: i32 = 5;

/// Humörpost, en per dag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMood {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub mood: MoodType,
    pub score: i32,
    pub note: Option<String>,
    pub image_path: Option<String>,
    pub created_at: Option<String>,
}

impl DailyMood {
    pub fn new(date: NaiveDate, mood: MoodType) -> Self {
        Self {
            id: None,
            date,
            mood,
            score: mood.default_score(),
            note: None,
            image_path: None,
            created_at: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Poäng begränsad till 1-5
    pub fn clamped_score(&self) -> i32 {
        self.score.clamp(MIN_MOOD_SCORE, MAX_MOOD_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_code_roundtrip() {
        for mood in MoodType::all() {
            assert_eq!(MoodType::from_code(mood.code()), Some(*mood));
        }
        assert_eq!(MoodType::from_code("happy"), None);
    }

    #[test]
    fn test_new_uses_default_score() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let mood = DailyMood::new(date, MoodType::Sad);
        assert_eq!(mood.score, 1);

        let mood = DailyMood { score: 9, ..DailyMood::new(date, MoodType::Happy) };
        assert_eq!(mood.clamped_score(), 5);
    }
}
