use chrono::{Datelike, NaiveDate};

pub(crate) fn today_local() -> NaiveDate {
    // Use system local timezone (browser runtime).
    let d = js_sys::Date::new_0();
    let y = d.get_full_year() as i32;
    let m = d.get_month() as u32 + 1;
    let day = d.get_date() as u32;
    NaiveDate::from_ymd_opt(y, m, day).unwrap_or(NaiveDate::MIN)
}

/// Boundary parser for `YYYY-MM-DD` strings. Malformed input is rejected
/// here so downstream date math never sees an invalid date.
#[allow(dead_code)]
pub(crate) fn parse_ymd(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn format_ymd(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d.format("%B %Y").to_string(),
        None => format!("{year}-{month:02}"),
    }
}

pub(crate) fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub(crate) fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(ny, nm, 1),
    ) {
        (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
        _ => 0,
    }
}

/// Monday-first month grid. Leading and trailing pad cells are `None` so the
/// result is always a whole number of weeks.
pub(crate) fn month_grid(year: i32, month: u32) -> Vec<Option<NaiveDate>> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return vec![];
    };

    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];

    for day in 1..=days_in_month(year, month) {
        cells.push(NaiveDate::from_ymd_opt(year, month, day));
    }

    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    cells
}

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
    }

    #[test]
    fn test_parse_ymd_accepts_valid_dates() {
        assert_eq!(parse_ymd("2026-08-07"), Some(d(2026, 8, 7)));
        assert_eq!(parse_ymd(" 2026-01-31 "), Some(d(2026, 1, 31)));
    }

    #[test]
    fn test_parse_ymd_rejects_malformed_input() {
        assert_eq!(parse_ymd(""), None);
        assert_eq!(parse_ymd("2026-13-01"), None);
        assert_eq!(parse_ymd("2026-02-30"), None);
        assert_eq!(parse_ymd("07/08/2026"), None);
        assert_eq!(parse_ymd("not a date"), None);
    }

    #[test]
    fn test_format_ymd_roundtrip() {
        let date = d(2026, 8, 7);
        assert_eq!(parse_ymd(&format_ymd(date)), Some(date));
    }

    #[test]
    fn test_month_wrapping() {
        assert_eq!(prev_month(2026, 1), (2025, 12));
        assert_eq!(prev_month(2026, 8), (2026, 7));
        assert_eq!(next_month(2026, 12), (2027, 1));
        assert_eq!(next_month(2026, 8), (2026, 9));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 8), 31);
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_month_grid_august_2026() {
        // Aug 1st 2026 is a Saturday: five leading pad cells in a Monday-first week.
        let cells = month_grid(2026, 8);
        assert_eq!(cells.len(), 42);
        assert!(cells[..5].iter().all(|c| c.is_none()));
        assert_eq!(cells[5], Some(d(2026, 8, 1)));
        assert_eq!(cells[35], Some(d(2026, 8, 31)));
        assert!(cells[36..].iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_month_grid_is_whole_weeks() {
        for month in 1..=12 {
            assert_eq!(month_grid(2026, month).len() % 7, 0);
        }
    }

    #[test]
    fn test_month_grid_invalid_month_is_empty() {
        assert!(month_grid(2026, 0).is_empty());
        assert!(month_grid(2026, 13).is_empty());
    }
}
