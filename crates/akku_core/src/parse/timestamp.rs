//! Org-style timestamp extraction.
//!
//! Recognises active `<2020-03-04 Wed 10:20>` and inactive `[2020-03-04]`
//! timestamps. Two timestamps joined by `--` count as one range and yield
//! its start.

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"([<\[])",
        r"([0-9]{4})-([0-9]{2})-([0-9]{2})",
        r"(?:[ \t]+[^\s0-9\]>+-]+)?",
        r"(?:[ \t]+([0-9]{1,2}):([0-9]{2})(?:-[0-9]{1,2}:[0-9]{2})?)?",
        r"(?:[ \t]+[.+]?\+[0-9]+[hdwmy])?",
        r"(?:[ \t]+--?[0-9]+[hdwmy])?",
        r"([>\]])",
    ))
    .expect("valid timestamp regex")
});

/// Start of one timestamp found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgTimestamp {
    pub date: NaiveDate,
    /// Present only when the timestamp carries `HH:MM`.
    pub time: Option<NaiveTime>,
    pub active: bool,
}

/// Extracts all timestamps from `text` in order of appearance.
///
/// Bracket pairs must match and dates must be valid calendar dates;
/// anything else is ignored.
pub fn extract_timestamps(text: &str) -> Vec<OrgTimestamp> {
    let mut found = Vec::new();
    let mut range_end: Option<usize> = None;

    for caps in TIMESTAMP_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let Some(parsed) = timestamp_from_captures(&caps) else {
            continue;
        };

        let joins_previous = range_end
            .map(|end| text.get(end..whole.start()) == Some("--"))
            .unwrap_or(false);
        range_end = Some(whole.end());
        if !joins_previous {
            found.push(parsed);
        }
    }

    found
}

fn timestamp_from_captures(caps: &regex::Captures<'_>) -> Option<OrgTimestamp> {
    let active = match (&caps[1], &caps[7]) {
        ("<", ">") => true,
        ("[", "]") => false,
        _ => return None,
    };

    let date = NaiveDate::from_ymd_opt(
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
        caps[4].parse().ok()?,
    )?;

    let time = match (caps.get(5), caps.get(6)) {
        (Some(hour), Some(minute)) => Some(NaiveTime::from_hms_opt(
            hour.as_str().parse().ok()?,
            minute.as_str().parse().ok()?,
            0,
        )?),
        _ => None,
    };

    Some(OrgTimestamp { date, time, active })
}

#[cfg(test)]
mod tests {
    use super::extract_timestamps;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn inactive_timestamp_with_time() {
        let found = extract_timestamps("[2020-03-04 Wed 10:20]");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, NaiveDate::from_ymd_opt(2020, 3, 4).unwrap());
        assert_eq!(found[0].time, NaiveTime::from_hms_opt(10, 20, 0));
        assert!(!found[0].active);
    }

    #[test]
    fn date_only_timestamp_has_no_time() {
        let found = extract_timestamps("<2019-12-31>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].time, None);
        assert!(found[0].active);
    }

    #[test]
    fn range_counts_as_one_timestamp() {
        let found = extract_timestamps("<2020-01-01 Wed 09:00>--<2020-01-02 Thu 10:00>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    }

    #[test]
    fn separate_timestamps_are_all_returned() {
        let found = extract_timestamps("[2020-01-01 Wed] and [2020-01-02 Thu 08:15]");
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn time_range_and_repeater_are_accepted() {
        let found = extract_timestamps("<2020-05-06 Wed 10:00-11:30 +1w>");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].time, NaiveTime::from_hms_opt(10, 0, 0));
    }

    #[test]
    fn mismatched_brackets_and_bad_dates_are_ignored() {
        assert!(extract_timestamps("[2020-01-01 Wed>").is_empty());
        assert!(extract_timestamps("[2020-02-30]").is_empty());
        assert!(extract_timestamps("[ ] buy milk").is_empty());
    }
}
