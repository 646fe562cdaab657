use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::{SetpointLimits, TempScale};
use crate::error::ControlError;

pub const WEEK_MINUTES: u32 = 7 * 24 * 60;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn index(self) -> u32 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }

    pub fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }

    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    Heat,
    Cool,
}

/// Stored schedule document: per mode, per weekday, an ordered list of
/// `["HH:MM", setTemp]` pairs. Replaced wholesale on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleDoc {
    #[serde(default)]
    pub heat: BTreeMap<Weekday, Vec<(String, f32)>>,
    #[serde(default)]
    pub cool: BTreeMap<Weekday, Vec<(String, f32)>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub day: Weekday,
    pub minutes: u16,
    pub set_temp: f32,
}

impl ScheduleEntry {
    fn abs_minute(&self) -> u32 {
        self.day.index() * 24 * 60 + u32::from(self.minutes)
    }
}

/// A validated weekly table for one mode, sorted chronologically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleTable {
    entries: Vec<ScheduleEntry>,
}

fn parse_hhmm(value: &str) -> Result<u16, ControlError> {
    let (hours, minutes) = value
        .split_once(':')
        .ok_or_else(|| ControlError::validation(format!("malformed schedule time {value:?}")))?;
    let hours: u16 = hours
        .parse()
        .map_err(|_| ControlError::validation(format!("malformed schedule time {value:?}")))?;
    let minutes: u16 = minutes
        .parse()
        .map_err(|_| ControlError::validation(format!("malformed schedule time {value:?}")))?;
    if hours >= 24 || minutes >= 60 {
        return Err(ControlError::validation(format!(
            "schedule time {value:?} out of range"
        )));
    }
    Ok(hours * 60 + minutes)
}

impl ScheduleTable {
    /// Builds the active table for one mode from the stored document.
    ///
    /// Duplicate weekday+time entries are rejected rather than resolved by
    /// registration order, and entry setpoints must fall inside the slider
    /// limits.
    pub fn from_doc(
        doc: &ScheduleDoc,
        mode: ScheduleMode,
        limits: &SetpointLimits,
    ) -> Result<Self, ControlError> {
        let table = match mode {
            ScheduleMode::Heat => &doc.heat,
            ScheduleMode::Cool => &doc.cool,
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (&day, day_entries) in table {
            for (time, set_temp) in day_entries {
                let minutes = parse_hhmm(time)?;
                if !seen.insert((day, minutes)) {
                    return Err(ControlError::validation(format!(
                        "duplicate schedule entry {day:?} {time}"
                    )));
                }
                if !set_temp.is_finite()
                    || *set_temp < limits.min_temp
                    || *set_temp > limits.max_temp
                {
                    return Err(ControlError::validation(format!(
                        "schedule setpoint {set_temp} outside [{}, {}]",
                        limits.min_temp, limits.max_temp
                    )));
                }
                entries.push(ScheduleEntry {
                    day,
                    minutes,
                    set_temp: *set_temp,
                });
            }
        }

        entries.sort_by_key(ScheduleEntry::abs_minute);
        Ok(Self { entries })
    }

    /// Synthetic validation table: one entry per minute of the week,
    /// alternating between two setpoints with a small per-day offset.
    /// Never persisted.
    pub fn synthetic(scale: TempScale) -> Self {
        let (low, high) = match scale {
            TempScale::Metric => (19.0, 22.0),
            TempScale::Imperial => (68.0, 72.0),
        };

        let mut entries = Vec::with_capacity(WEEK_MINUTES as usize);
        for day in Weekday::ALL {
            for minute in 0..(24 * 60) {
                let base = if minute % 2 == 1 { low } else { high };
                entries.push(ScheduleEntry {
                    day,
                    minutes: minute as u16,
                    set_temp: (day.index() + 1) as f32 / 10.0 + base,
                });
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn minute_of_week(now: DateTime<FixedOffset>) -> u32 {
    Weekday::from_chrono(now.weekday()).index() * 24 * 60 + now.hour() * 60 + now.minute()
}

/// Tracks schedule firing against wall-clock minutes.
///
/// `install` replaces the entire active table (clear-then-load); entries from
/// a replaced table can never fire afterwards. Firing is primed by the first
/// poll after an install, then `due` returns every entry whose time point was
/// crossed since the previous poll, in chronological order.
#[derive(Debug, Default)]
pub struct ScheduleRunner {
    table: Option<ScheduleTable>,
    last_minute: Option<u32>,
}

impl ScheduleRunner {
    pub fn install(&mut self, table: Option<ScheduleTable>) {
        self.table = table;
        self.last_minute = None;
    }

    pub fn is_active(&self) -> bool {
        self.table.is_some()
    }

    pub fn due(&mut self, now_minute: u32) -> Vec<ScheduleEntry> {
        let last = self.last_minute.replace(now_minute);
        let Some(table) = &self.table else {
            return Vec::new();
        };
        let Some(last) = last else {
            return Vec::new();
        };
        if last == now_minute {
            return Vec::new();
        }

        let span = (now_minute + WEEK_MINUTES - last) % WEEK_MINUTES;
        let mut fired: Vec<(u32, ScheduleEntry)> = table
            .entries
            .iter()
            .filter_map(|entry| {
                let offset = (entry.abs_minute() + WEEK_MINUTES - last) % WEEK_MINUTES;
                (offset != 0 && offset <= span).then_some((offset, *entry))
            })
            .collect();
        fired.sort_by_key(|(offset, _)| *offset);
        fired.into_iter().map(|(_, entry)| entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn limits() -> SetpointLimits {
        SetpointLimits {
            min_temp: 15.0,
            max_temp: 30.0,
            temp_step: 0.5,
        }
    }

    fn doc_from_json(json: &str) -> ScheduleDoc {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_stored_document_format() {
        let doc = doc_from_json(
            r#"{
                "heat": {
                    "monday": [["06:30", 21.0], ["22:00", 18.0]],
                    "saturday": [["08:00", 21.5]]
                },
                "cool": {
                    "monday": [["12:00", 24.0]]
                }
            }"#,
        );

        let heat = ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).unwrap();
        assert_eq!(heat.len(), 3);
        let cool = ScheduleTable::from_doc(&doc, ScheduleMode::Cool, &limits()).unwrap();
        assert_eq!(cool.len(), 1);
    }

    #[test]
    fn malformed_time_is_rejected() {
        let doc = doc_from_json(r#"{"heat": {"monday": [["25:99", 21.0]]}}"#);
        let err = ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).unwrap_err();
        assert!(matches!(err, ControlError::Validation(_)));

        let doc = doc_from_json(r#"{"heat": {"monday": [["0630", 21.0]]}}"#);
        assert!(ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).is_err());
    }

    #[test]
    fn duplicate_day_and_time_is_rejected() {
        let doc = doc_from_json(r#"{"heat": {"monday": [["06:30", 21.0], ["06:30", 19.0]]}}"#);
        let err = ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).unwrap_err();
        assert!(matches!(err, ControlError::Validation(_)));
    }

    #[test]
    fn out_of_range_setpoint_is_rejected() {
        let doc = doc_from_json(r#"{"heat": {"monday": [["06:30", 55.0]]}}"#);
        assert!(ScheduleTable::from_doc(&doc, ScheduleMode::Heat, &limits()).is_err());
    }

    fn table(entries: &[(Weekday, u16, f32)]) -> ScheduleTable {
        ScheduleTable {
            entries: entries
                .iter()
                .map(|&(day, minutes, set_temp)| ScheduleEntry {
                    day,
                    minutes,
                    set_temp,
                })
                .collect(),
        }
    }

    #[test]
    fn fires_entries_crossed_since_last_poll_in_order() {
        let mut runner = ScheduleRunner::default();
        runner.install(Some(table(&[
            (Weekday::Monday, 6 * 60 + 30, 21.0),
            (Weekday::Monday, 6 * 60, 19.0),
        ])));

        // Prime at Monday 05:00.
        assert!(runner.due(5 * 60).is_empty());

        let fired = runner.due(7 * 60);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].set_temp, 19.0);
        assert_eq!(fired[1].set_temp, 21.0);

        // Nothing new on the next poll.
        assert!(runner.due(7 * 60 + 1).is_empty());
    }

    #[test]
    fn entry_at_poll_minute_fires_exactly_once() {
        let mut runner = ScheduleRunner::default();
        runner.install(Some(table(&[(Weekday::Monday, 6 * 60, 21.0)])));

        assert!(runner.due(6 * 60 - 1).is_empty());
        assert_eq!(runner.due(6 * 60).len(), 1);
        assert!(runner.due(6 * 60).is_empty());
    }

    #[test]
    fn wraps_across_the_week_boundary() {
        let mut runner = ScheduleRunner::default();
        runner.install(Some(table(&[(Weekday::Monday, 0, 20.0)])));

        // Sunday 23:59 -> Monday 00:01.
        let sunday_late = 6 * 24 * 60 + 23 * 60 + 59;
        assert!(runner.due(sunday_late).is_empty());
        let fired = runner.due(1);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].set_temp, 20.0);
    }

    #[test]
    fn install_clears_previous_table() {
        let mut runner = ScheduleRunner::default();
        runner.install(Some(table(&[(Weekday::Monday, 6 * 60, 21.0)])));
        assert!(runner.due(5 * 60).is_empty());

        // Mode switch: the heat entry must never fire.
        runner.install(Some(table(&[(Weekday::Monday, 8 * 60, 25.0)])));
        assert!(runner.due(7 * 60).is_empty());
        let fired = runner.due(9 * 60);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].set_temp, 25.0);
    }

    #[test]
    fn install_none_deactivates() {
        let mut runner = ScheduleRunner::default();
        runner.install(Some(table(&[(Weekday::Monday, 6 * 60, 21.0)])));
        runner.install(None);
        assert!(!runner.is_active());
        assert!(runner.due(5 * 60).is_empty());
        assert!(runner.due(7 * 60).is_empty());
    }

    #[test]
    fn synthetic_table_covers_every_minute() {
        let table = ScheduleTable::synthetic(TempScale::Metric);
        assert_eq!(table.len(), WEEK_MINUTES as usize);
        assert_eq!(table.entries[0].set_temp, 22.1);
        assert_eq!(table.entries[1].set_temp, 19.1);
    }

    #[test]
    fn minute_of_week_counts_from_monday() {
        use chrono::TimeZone;
        // 2026-01-05 is a Monday.
        let now = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 1, 5, 6, 30, 0)
            .unwrap();
        assert_eq!(minute_of_week(now), 6 * 60 + 30);
    }
}
