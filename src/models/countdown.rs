use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::checkin::CountdownMode;
use crate::utils::date::days_between;

/// Framsteg för en nedräkning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownProgress {
    pub mode: CountdownMode,
    /// Förflutna dagar eller antal incheckningar
    pub current: i64,
    /// Totalt antal dagar eller mål
    pub total: i64,
    /// Kvar, aldrig negativt
    pub remaining: i64,
    /// Procent i intervallet [0, 100]
    pub percent: f32,
}

impl CountdownProgress {
    /// Dagbaserad: förflutna/totala kalenderdagar
    pub fn day_based(start: NaiveDate, target: NaiveDate, today: NaiveDate) -> Self {
        let total = days_between(start, target).max(0);
        let current = days_between(start, today).clamp(0, total);
        let remaining = days_between(today, target).max(0);

        Self {
            mode: CountdownMode::DayBased,
            current,
            total,
            remaining,
            percent: percent_of(current, total, remaining == 0),
        }
    }

    /// Incheckningsbaserad: framsteg/mål
    pub fn check_in_based(progress: i32, target: i32) -> Self {
        let current = i64::from(progress.max(0));
        let total = i64::from(target.max(0));
        let remaining = (total - current).max(0);

        Self {
            mode: CountdownMode::CheckInBased,
            current,
            total,
            remaining,
            percent: percent_of(current, total, remaining == 0),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Procent avrundad till heltal för visning
    pub fn percent_display(&self) -> String {
        format!("{:.0}%", self.percent)
    }
}

fn percent_of(current: i64, total: i64, finished: bool) -> f32 {
    if total <= 0 {
        return if finished { 100.0 } else { 0.0 };
    }
    let raw = current as f64 / total as f64 * 100.0;
    raw.clamp(0.0, 100.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_based_progress() {
        let start = d(2026, 1, 1);
        let target = d(2026, 1, 11);

        let p = CountdownProgress::day_based(start, target, start);
        assert_eq!(p.current, 0);
        assert_eq!(p.remaining, 10);
        assert_eq!(p.percent, 0.0);

        let p = CountdownProgress::day_based(start, target, d(2026, 1, 4));
        assert_eq!(p.current, 3);
        assert_eq!(p.remaining, 7);
        assert!((p.percent - 30.0).abs() < 0.001);
        assert_eq!(p.percent_display(), "30%");
    }

    #[test]
    fn test_day_based_clamps_outside_range() {
        let start = d(2026, 1, 1);
        let target = d(2026, 1, 11);

        let before = CountdownProgress::day_based(start, target, d(2025, 12, 1));
        assert_eq!(before.current, 0);
        assert_eq!(before.percent, 0.0);

        let after = CountdownProgress::day_based(start, target, d(2026, 3, 1));
        assert_eq!(after.current, 10);
        assert_eq!(after.remaining, 0);
        assert_eq!(after.percent, 100.0);
        assert!(after.is_finished());
    }

    #[test]
    fn test_day_based_same_start_and_target() {
        let day = d(2026, 1, 1);
        assert_eq!(CountdownProgress::day_based(day, day, day).percent, 100.0);
        assert_eq!(CountdownProgress::day_based(day, day, d(2025, 12, 30)).percent, 0.0);
    }

    #[test]
    fn test_check_in_based_progress() {
        let p = CountdownProgress::check_in_based(3, 10);
        assert_eq!(p.remaining, 7);
        assert!((p.percent - 30.0).abs() < 0.001);
        assert!(!p.is_finished());
    }

    #[test]
    fn test_percent_always_within_bounds() {
        for (progress, target) in [(0, 0), (5, 0), (15, 10), (-3, 10), (1, 1_000_000), (i32::MAX, 1)] {
            let p = CountdownProgress::check_in_based(progress, target);
            assert!((0.0..=100.0).contains(&p.percent), "{progress}/{target}");
            assert!(p.remaining >= 0);
        }

        let over = CountdownProgress::check_in_based(15, 10);
        assert_eq!(over.percent, 100.0);
        assert_eq!(over.remaining, 0);
    }
}
