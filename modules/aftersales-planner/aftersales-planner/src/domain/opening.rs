//! Validation of the opening-hours structure.

use std::collections::BTreeMap;

use aftersales_planner_sdk::{OpeningHours, TimeInterval, Weekday, parse_iso_date};
use serde_json::Value;

use super::error::Issues;
use super::fields::{SettingsFields, parse_hhmm};

const HOLIDAYS: &str = "holidays";

/// Turn loosely typed input into [`OpeningHours`], reporting every bad field.
///
/// A JSON string is decoded first (form posts carry `opening` stringified).
/// Weekdays that are missing are treated as closed.
pub fn parse_opening(value: &Value, issues: &mut Issues) -> Option<OpeningHours> {
    let decoded;
    let value = match value {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(v) => {
                decoded = v;
                &decoded
            }
            Err(_) => {
                issues.push(SettingsFields::OPENING, "must be a JSON object");
                return None;
            }
        },
        other => other,
    };

    let Some(object) = value.as_object() else {
        issues.push(SettingsFields::OPENING, "must be an object");
        return None;
    };

    let before = issues.len();
    let mut days: BTreeMap<Weekday, Vec<TimeInterval>> =
        Weekday::ALL.into_iter().map(|d| (d, Vec::new())).collect();
    let mut holidays = Vec::new();

    for (key, entry) in object {
        let path = format!("{}.{key}", SettingsFields::OPENING);
        if key == HOLIDAYS {
            holidays = parse_holidays(entry, &path, issues);
            continue;
        }
        let Ok(day) = key.parse::<Weekday>() else {
            issues.push(path, "unknown weekday (expected mon..sun or holidays)");
            continue;
        };
        days.insert(day, parse_intervals(entry, &path, issues));
    }

    (issues.len() == before).then_some(OpeningHours { days, holidays })
}

fn parse_intervals(value: &Value, path: &str, issues: &mut Issues) -> Vec<TimeInterval> {
    let Some(list) = value.as_array() else {
        issues.push(path, "must be a list of {start, end} intervals");
        return Vec::new();
    };

    let mut out = Vec::with_capacity(list.len());
    for (idx, item) in list.iter().enumerate() {
        let item_path = format!("{path}[{idx}]");
        let start = item.get("start").and_then(Value::as_str);
        let end = item.get("end").and_then(Value::as_str);
        let (Some(start), Some(end)) = (start, end) else {
            issues.push(item_path, "start and end are required");
            continue;
        };
        match (parse_hhmm(start), parse_hhmm(end)) {
            (Some(s), Some(e)) if s < e => out.push(TimeInterval::new(start, end)),
            (Some(_), Some(_)) => issues.push(item_path, "start must be before end"),
            _ => issues.push(item_path, "times must be HH:MM"),
        }
    }
    out
}

fn parse_holidays(value: &Value, path: &str, issues: &mut Issues) -> Vec<String> {
    let Some(list) = value.as_array() else {
        issues.push(path, "must be a list of dates");
        return Vec::new();
    };

    let mut out: Vec<String> = Vec::with_capacity(list.len());
    for (idx, item) in list.iter().enumerate() {
        match item.as_str().map(|s| (s, parse_iso_date(s))) {
            Some((s, Ok(_))) => {
                if !out.iter().any(|d| d == s) {
                    out.push(s.to_owned());
                }
            }
            _ => issues.push(format!("{path}[{idx}]"), "must be a YYYY-MM-DD date"),
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: &Value) -> Result<OpeningHours, Issues> {
        let mut issues = Issues::new();
        match parse_opening(value, &mut issues) {
            Some(o) if issues.is_empty() => Ok(o),
            _ => Err(issues),
        }
    }

    #[test]
    fn accepts_weekly_schedule_with_holidays() {
        let opening = parse(&json!({
            "mon": [{"start": "07:30", "end": "12:00"}, {"start": "13:00", "end": "17:00"}],
            "sat": [],
            "holidays": ["2025-12-26", "2025-12-24", "2025-12-24"]
        }))
        .unwrap();
        assert_eq!(opening.days[&Weekday::Mon].len(), 2);
        assert!(opening.days[&Weekday::Tue].is_empty());
        assert_eq!(opening.holidays, vec!["2025-12-24", "2025-12-26"]);
    }

    #[test]
    fn decodes_stringified_json_first() {
        let raw = json!(r#"{"fri":[{"start":"08:00","end":"14:00"}]}"#);
        let opening = parse(&raw).unwrap();
        assert_eq!(opening.days[&Weekday::Fri][0].end, "14:00");
    }

    #[test]
    fn reports_each_bad_field() {
        let issues = parse(&json!({
            "mon": [{"start": "17:00", "end": "07:30"}],
            "tue": [{"start": "7:30", "end": "17:00"}],
            "funday": [],
            "holidays": ["24.12.2025"]
        }))
        .unwrap_err();
        let mut fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        fields.sort_unstable();
        assert_eq!(
            fields,
            vec!["opening.funday", "opening.holidays[0]", "opening.mon[0]", "opening.tue[0]"]
        );
    }

    #[test]
    fn rejects_non_objects() {
        assert!(parse(&json!([1, 2])).is_err());
        assert!(parse(&json!("not json")).is_err());
    }
}
