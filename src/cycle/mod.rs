//! Cycle tracking: day logs keyed by calendar date and the phase estimate
//! derived from them.
//!
//! The calculator is pure and never fails: missing data resolves to
//! [`Phase::Unknown`] rather than an error, because the result is advisory
//! and must never block rendering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CycleConfig {
    pub cycle_length_days: u32,
    pub period_length_days: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        // Textbook averages; users tune these in settings.
        Self {
            cycle_length_days: 28,
            period_length_days: 5,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PeriodMarker {
    Start,
    Flow,
    End,
}

/// One day's log. A date with an all-empty log is never retained; see
/// [`upsert_entry`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct DayLog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodMarker>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symptoms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DayLog {
    pub fn is_empty(&self) -> bool {
        self.period.is_none()
            && self.symptoms.is_empty()
            && self.mood.is_none()
            && self.notes.as_deref().map(str::trim).unwrap_or("").is_empty()
    }
}

/// Later writes for the same date overwrite earlier ones.
pub(crate) type CycleLog = BTreeMap<NaiveDate, DayLog>;

/// Insert or overwrite the entry for `date`. Submitting an empty entry
/// deletes the date instead of storing a blank record.
pub(crate) fn upsert_entry(log: &mut CycleLog, date: NaiveDate, entry: DayLog) {
    if entry.is_empty() {
        log.remove(&date);
    } else {
        log.insert(date, entry);
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Phase {
    Menstruation,
    Follicular,
    Ovulation,
    Luteal,
    Unknown,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Menstruation => "Menstruation",
            Phase::Follicular => "Follicular",
            Phase::Ovulation => "Ovulation",
            Phase::Luteal => "Luteal",
            Phase::Unknown => "No estimate",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PhaseInfo {
    pub phase: Phase,
    /// 1-indexed day count since the anchoring period start. `None` when no
    /// anchor exists.
    pub day_of_cycle: Option<u32>,
}

impl PhaseInfo {
    fn unknown() -> Self {
        Self {
            phase: Phase::Unknown,
            day_of_cycle: None,
        }
    }
}

/// Estimate the cycle phase for `target`.
///
/// The anchor is the most recent logged `start` on or before the target
/// date; without one there is nothing to count from and the result is
/// `unknown`. An explicit period marker on the target date always wins over
/// the day-count estimate, since logged data beats statistical inference.
pub(crate) fn compute_phase(target: NaiveDate, config: &CycleConfig, log: &CycleLog) -> PhaseInfo {
    let anchor = log
        .range(..=target)
        .rev()
        .find(|(_, entry)| entry.period == Some(PeriodMarker::Start))
        .map(|(date, _)| *date);

    let Some(anchor) = anchor else {
        return PhaseInfo::unknown();
    };

    let day_of_cycle = (target - anchor).num_days() + 1;
    if day_of_cycle <= 0 {
        return PhaseInfo::unknown();
    }
    let day_of_cycle = day_of_cycle as u32;

    if log.get(&target).is_some_and(|e| e.period.is_some()) {
        return PhaseInfo {
            phase: Phase::Menstruation,
            day_of_cycle: Some(day_of_cycle),
        };
    }

    let mid = config.cycle_length_days.div_ceil(2);
    let ovulation_start = mid.saturating_sub(2);
    let ovulation_end = mid + 2;

    let phase = if day_of_cycle <= config.period_length_days {
        Phase::Menstruation
    } else if day_of_cycle <= ovulation_start {
        Phase::Follicular
    } else if day_of_cycle <= ovulation_end {
        Phase::Ovulation
    } else if day_of_cycle <= config.cycle_length_days {
        Phase::Luteal
    } else {
        // Cycle overran the configured length with no new start logged.
        Phase::Unknown
    };

    PhaseInfo {
        phase,
        day_of_cycle: Some(day_of_cycle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
    }

    fn start_entry() -> DayLog {
        DayLog {
            period: Some(PeriodMarker::Start),
            ..Default::default()
        }
    }

    fn config_28_5() -> CycleConfig {
        CycleConfig {
            cycle_length_days: 28,
            period_length_days: 5,
        }
    }

    #[test]
    fn test_empty_log_is_unknown() {
        let info = compute_phase(d(2026, 8, 7), &config_28_5(), &CycleLog::new());
        assert_eq!(info.phase, Phase::Unknown);
        assert_eq!(info.day_of_cycle, None);
    }

    #[test]
    fn test_log_without_start_marker_is_unknown() {
        let mut log = CycleLog::new();
        log.insert(
            d(2026, 8, 1),
            DayLog {
                period: Some(PeriodMarker::Flow),
                ..Default::default()
            },
        );
        log.insert(
            d(2026, 8, 2),
            DayLog {
                mood: Some("calm".to_string()),
                ..Default::default()
            },
        );

        let info = compute_phase(d(2026, 8, 7), &config_28_5(), &log);
        assert_eq!(info.phase, Phase::Unknown);
        assert_eq!(info.day_of_cycle, None);
    }

    #[test]
    fn test_target_before_any_start_is_unknown() {
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 10), start_entry());

        let info = compute_phase(d(2026, 8, 5), &config_28_5(), &log);
        assert_eq!(info.phase, Phase::Unknown);
        assert_eq!(info.day_of_cycle, None);
    }

    #[test]
    fn test_anchor_is_most_recent_start_on_or_before_target() {
        let mut log = CycleLog::new();
        log.insert(d(2026, 6, 15), start_entry());
        log.insert(d(2026, 7, 13), start_entry());
        // A later start must not affect dates before it.
        log.insert(d(2026, 9, 10), start_entry());

        let info = compute_phase(d(2026, 7, 20), &config_28_5(), &log);
        assert_eq!(info.day_of_cycle, Some(8));
        assert_eq!(info.phase, Phase::Follicular);
    }

    #[test]
    fn test_day_one_is_the_start_date_itself() {
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());

        let info = compute_phase(d(2026, 8, 1), &config_28_5(), &log);
        assert_eq!(info.day_of_cycle, Some(1));
        assert_eq!(info.phase, Phase::Menstruation);
    }

    #[test]
    fn test_threshold_walk_through_default_config() {
        // 28/5: menstruation 1-5, follicular 6-12, ovulation 13-16,
        // luteal 17-28, unknown beyond.
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());
        let config = config_28_5();

        let expect = [
            (5, Phase::Menstruation),
            (6, Phase::Follicular),
            (12, Phase::Follicular),
            (13, Phase::Ovulation),
            (16, Phase::Ovulation),
            (17, Phase::Luteal),
            (28, Phase::Luteal),
        ];
        for (day, phase) in expect {
            let target = d(2026, 8, 1) + chrono::Duration::days(day as i64 - 1);
            let info = compute_phase(target, &config, &log);
            assert_eq!(info.phase, phase, "day {day}");
            assert_eq!(info.day_of_cycle, Some(day));
        }
    }

    #[test]
    fn test_boundary_day_eleven_is_follicular() {
        // Start 10 days before target: day 11, ovulation opens at day 12.
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());

        let info = compute_phase(d(2026, 8, 11), &config_28_5(), &log);
        assert_eq!(info.day_of_cycle, Some(11));
        assert_eq!(info.phase, Phase::Follicular);
    }

    #[test]
    fn test_odd_cycle_length_rounds_midpoint_up() {
        // 29 days: mid rounds to 15, so ovulation spans days 14-17.
        let config = CycleConfig {
            cycle_length_days: 29,
            period_length_days: 5,
        };
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());

        assert_eq!(
            compute_phase(d(2026, 8, 13), &config, &log).phase,
            Phase::Follicular
        );
        assert_eq!(
            compute_phase(d(2026, 8, 14), &config, &log).phase,
            Phase::Ovulation
        );
        assert_eq!(
            compute_phase(d(2026, 8, 17), &config, &log).phase,
            Phase::Ovulation
        );
        assert_eq!(
            compute_phase(d(2026, 8, 18), &config, &log).phase,
            Phase::Luteal
        );
    }

    #[test]
    fn test_overrun_keeps_day_count_but_drops_phase() {
        // Start 40 days before target with nothing since: day 41 > 28.
        let mut log = CycleLog::new();
        log.insert(d(2026, 7, 1), start_entry());

        let info = compute_phase(d(2026, 8, 10), &config_28_5(), &log);
        assert_eq!(info.day_of_cycle, Some(41));
        assert_eq!(info.phase, Phase::Unknown);
    }

    #[test]
    fn test_explicit_marker_overrides_estimate() {
        // Day 20 would be luteal, but the user logged flow that day.
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());
        log.insert(
            d(2026, 8, 20),
            DayLog {
                period: Some(PeriodMarker::Flow),
                ..Default::default()
            },
        );

        let info = compute_phase(d(2026, 8, 20), &config_28_5(), &log);
        assert_eq!(info.phase, Phase::Menstruation);
        assert_eq!(info.day_of_cycle, Some(20));
    }

    #[test]
    fn test_explicit_end_marker_also_counts_as_menstruation() {
        let mut log = CycleLog::new();
        log.insert(d(2026, 8, 1), start_entry());
        log.insert(
            d(2026, 8, 30),
            DayLog {
                period: Some(PeriodMarker::End),
                ..Default::default()
            },
        );

        // Even past the configured cycle length the explicit log wins.
        let info = compute_phase(d(2026, 8, 30), &config_28_5(), &log);
        assert_eq!(info.phase, Phase::Menstruation);
        assert_eq!(info.day_of_cycle, Some(30));
    }

    #[test]
    fn test_upsert_overwrites_same_date() {
        let mut log = CycleLog::new();
        upsert_entry(&mut log, d(2026, 8, 1), start_entry());
        upsert_entry(
            &mut log,
            d(2026, 8, 1),
            DayLog {
                period: Some(PeriodMarker::Flow),
                mood: Some("tired".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(log.len(), 1);
        assert_eq!(
            log.get(&d(2026, 8, 1)).and_then(|e| e.period),
            Some(PeriodMarker::Flow)
        );
    }

    #[test]
    fn test_upsert_empty_entry_removes_date() {
        let mut log = CycleLog::new();
        upsert_entry(&mut log, d(2026, 8, 1), start_entry());
        upsert_entry(&mut log, d(2026, 8, 1), DayLog::default());
        assert!(log.is_empty());
    }

    #[test]
    fn test_whitespace_notes_count_as_empty() {
        let entry = DayLog {
            notes: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(entry.is_empty());

        let mut log = CycleLog::new();
        upsert_entry(&mut log, d(2026, 8, 1), entry);
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_serializes_with_date_keys() {
        let mut log = CycleLog::new();
        log.insert(
            d(2026, 8, 1),
            DayLog {
                period: Some(PeriodMarker::Start),
                symptoms: vec!["cramps".to_string()],
                ..Default::default()
            },
        );

        let json = serde_json::to_string(&log).expect("log should serialize");
        assert!(json.contains("\"2026-08-01\""));
        assert!(json.contains("\"start\""));

        let parsed: CycleLog = serde_json::from_str(&json).expect("log should parse");
        assert_eq!(parsed, log);
    }

    #[test]
    fn test_phase_display_names_are_lowercase() {
        assert_eq!(Phase::Menstruation.to_string(), "menstruation");
        assert_eq!(Phase::Unknown.to_string(), "unknown");
        assert_eq!("luteal".parse::<Phase>(), Ok(Phase::Luteal));
    }
}
