//! Tracker/person/context scanners.
//!
//! The three sigils are distinct prefixes, so each category is scanned
//! independently. There is no escaping: a sigil directly followed by word
//! characters always starts an annotation.

use crate::model::entry::{Context, Person, Tracker};
use once_cell::sync::Lazy;
use regex::Regex;

static TRACKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#([a-zA-Z0-9-]+)(?:\((-?[0-9]+)\))?").expect("valid tracker regex")
});
static PERSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([a-zA-Z0-9-]+)").expect("valid person regex"));
static CONTEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+([a-zA-Z0-9-]+)").expect("valid context regex"));

/// All annotations found in one body of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub trackers: Vec<Tracker>,
    pub people: Vec<Person>,
    pub contexts: Vec<Context>,
}

/// Scans all three annotation categories.
pub fn scan_annotations(text: &str) -> Annotations {
    Annotations {
        trackers: scan_trackers(text),
        people: scan_people(text),
        contexts: scan_contexts(text),
    }
}

/// Scans `#name` and `#name(n)` trackers.
///
/// Only integer values are supported. A value that does not fit `i64` is
/// dropped and the tracker is kept as a boolean one.
pub fn scan_trackers(text: &str) -> Vec<Tracker> {
    TRACKER_RE
        .captures_iter(text)
        .map(|caps| {
            let value = caps
                .get(2)
                .and_then(|value| value.as_str().parse::<i64>().ok());
            Tracker::new(&caps[1], value)
        })
        .collect()
}

/// Scans `@name` mentions.
pub fn scan_people(text: &str) -> Vec<Person> {
    PERSON_RE
        .captures_iter(text)
        .map(|caps| Person::new(&caps[1]))
        .collect()
}

/// Scans `+name` contexts.
pub fn scan_contexts(text: &str) -> Vec<Context> {
    CONTEXT_RE
        .captures_iter(text)
        .map(|caps| Context::new(&caps[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_has_no_annotations() {
        assert_eq!(scan_annotations("hello"), Annotations::default());
    }

    #[test]
    fn tracker_with_negative_value() {
        assert_eq!(
            scan_trackers("feeling very rejected today #mood(-2)"),
            vec![Tracker::new("mood", Some(-2))]
        );
    }

    #[test]
    fn tracker_without_value_is_boolean() {
        assert_eq!(
            scan_trackers("got an #attack today"),
            vec![Tracker::flag("attack")]
        );
    }

    #[test]
    fn malformed_value_suffix_leaves_boolean_tracker() {
        assert_eq!(
            scan_trackers("#sleep(lots) #mood(+1)"),
            vec![Tracker::flag("sleep"), Tracker::flag("mood")]
        );
    }

    #[test]
    fn overflowing_value_is_dropped() {
        assert_eq!(
            scan_trackers("#steps(99999999999999999999)"),
            vec![Tracker::flag("steps")]
        );
    }

    #[test]
    fn people_keep_order_and_hyphens() {
        assert_eq!(
            scan_people("i talked to @person-a today"),
            vec![Person::new("person-a")]
        );
        assert_eq!(
            scan_people("@a got annoyed on me. @b wasn't around and i felt sad."),
            vec![Person::new("a"), Person::new("b")]
        );
    }

    #[test]
    fn contexts_keep_order() {
        assert_eq!(
            scan_contexts("today this happened ... +vacation"),
            vec![Context::new("vacation")]
        );
        assert_eq!(
            scan_contexts("i wasn't happy at +work today. i also got +sick."),
            vec![Context::new("work"), Context::new("sick")]
        );
    }

    #[test]
    fn duplicates_are_retained() {
        assert_eq!(
            scan_people("@kim and @kim again"),
            vec![Person::new("kim"), Person::new("kim")]
        );
    }

    #[test]
    fn sigils_do_not_cross_categories() {
        let found = scan_annotations("#a @b +c");
        assert_eq!(found.trackers, vec![Tracker::flag("a")]);
        assert_eq!(found.people, vec![Person::new("b")]);
        assert_eq!(found.contexts, vec![Context::new("c")]);
    }

    #[test]
    fn sigil_inside_words_still_matches() {
        assert_eq!(scan_people("mail me@home"), vec![Person::new("home")]);
    }
}
