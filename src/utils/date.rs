use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Bakåtblick för streak på dashboard
pub const STREAK_LOOKBACK_DAYS: u32 = 30;

/// Bakåtblick för streak i statistik
pub const LONG_STREAK_LOOKBACK_DAYS: u32 = 365;

/// Var hundrade dag räknas som jubileum
pub const ANNIVERSARY_INTERVAL: i64 = 100;

/// Dagens datum i lokal tidszon
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse ett datum från en sträng (flexibelt format)
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%Y/%m/%d", // 2024/01/15
        "%Y.%m.%d", // 2024.01.15
        "%Y%m%d",   // 20240115
    ];

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    None
}

/// Formatera ett datum för lagring och visning
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Antal kalenderdagar från `start` till `end` (negativt om end < start)
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Dagindex: startdagen är dag 1.
///
/// Värden <= 0 betyder att startdatumet ligger i framtiden.
pub fn day_index(start: NaiveDate, today: NaiveDate) -> i64 {
    days_between(start, today) + 1
}

/// Är dagindex ett jubileum (positiv multipel av 100)?
pub fn is_anniversary(day_index: i64) -> bool {
    day_index > 0 && day_index % ANNIVERSARY_INTERVAL == 0
}

/// Dela upp ett dagindex i år/månader/dagar.
///
/// Använder fasta divisorer (365 dagar per år, 30 per månad), inte
/// kalenderexakt. Visningen ska stämma med tidigare versioner av appen.
pub fn split_day_span(day_index: i64) -> (i64, i64, i64) {
    let d = day_index.max(0);
    let years = d / 365;
    let rest = d % 365;
    (years, rest / 30, rest % 30)
}

/// Visningstext för ett dagindex, t.ex. "1年2个月3天"
pub fn format_day_span(day_index: i64) -> String {
    let (years, months, days) = split_day_span(day_index);

    let mut text = String::new();
    if years > 0 {
        text.push_str(&format!("{}年", years));
    }
    if months > 0 {
        text.push_str(&format!("{}个月", months));
    }
    if days > 0 || text.is_empty() {
        text.push_str(&format!("{}天", days));
    }
    text
}

/// Nästa jubileum relativt ett datum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anniversary {
    /// Dagindex för jubileet (multipel av 100)
    pub day_index: i64,
    /// Kalenderdatum då jubileet infaller
    pub date: NaiveDate,
    /// Dagar kvar (0 om det är idag)
    pub days_until: i64,
}

/// Hitta nästa jubileum. Om idag är ett jubileum returneras idag.
pub fn next_anniversary(start: NaiveDate, today: NaiveDate) -> Anniversary {
    let current = day_index(start, today);
    let next = if current <= ANNIVERSARY_INTERVAL {
        ANNIVERSARY_INTERVAL
    } else {
        // Avrunda uppåt till närmaste hundratal
        ((current + ANNIVERSARY_INTERVAL - 1) / ANNIVERSARY_INTERVAL) * ANNIVERSARY_INTERVAL
    };

    let date = start + Duration::days(next - 1);
    Anniversary {
        day_index: next,
        date,
        days_until: days_between(today, date),
    }
}

/// Första dagen i ett fönster om `days` dagar som slutar med `today`.
///
/// Fönster som sträcker sig före det minsta datumet börjar där.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let back = Duration::days(i64::from(days.max(1)) - 1);
    today.checked_sub_signed(back).unwrap_or(NaiveDate::MIN)
}

/// Räkna streak bakåt från `today` (inklusive).
///
/// Stannar vid första dagen utan post och räknar aldrig längre än `lookback`.
pub fn count_streak(dates: &HashSet<NaiveDate>, today: NaiveDate, lookback: u32) -> u32 {
    let mut streak = 0;
    let mut day = today;

    while streak < lookback && dates.contains(&day) {
        streak += 1;
        day = match day.pred_opt() {
            Some(prev) => prev,
            None => break,
        };
    }

    streak
}

/// Längsta sammanhängande serie av datum
pub fn longest_streak(dates: &HashSet<NaiveDate>) -> u32 {
    let mut sorted: Vec<NaiveDate> = dates.iter().copied().collect();
    sorted.sort();

    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for date in sorted {
        current = match previous {
            Some(prev) if days_between(prev, date) == 1 => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(date);
    }

    longest
}
