//! Named `format` checkers layered on top of the base type check.
//!
//! The table is built once on first use and never changes afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::simple_type::SimpleType;

/// A format's content check and the schema types it may be declared on.
#[derive(Clone, Copy)]
pub struct FormatChecker {
    check: fn(&Value) -> bool,
    compatible: fn(SimpleType) -> bool,
}

impl FormatChecker {
    pub fn is_valid(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    pub fn is_compatible_type(&self, simple_type: SimpleType) -> bool {
        (self.compatible)(simple_type)
    }
}

static FORMAT_CHECKERS: OnceLock<HashMap<&'static str, FormatChecker>> = OnceLock::new();

fn format_checkers() -> &'static HashMap<&'static str, FormatChecker> {
    FORMAT_CHECKERS.get_or_init(|| {
        let string_only: fn(SimpleType) -> bool = |t| t == SimpleType::String;

        HashMap::from([
            (
                "date-time",
                FormatChecker {
                    check: |v| with_str(v, is_date_time),
                    compatible: string_only,
                },
            ),
            (
                "date",
                FormatChecker {
                    check: |v| with_str(v, |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
                    compatible: string_only,
                },
            ),
            (
                "time",
                FormatChecker {
                    check: |v| with_str(v, is_time),
                    compatible: string_only,
                },
            ),
            (
                "regex",
                FormatChecker {
                    check: |v| with_str(v, |s| Regex::new(s).is_ok()),
                    compatible: string_only,
                },
            ),
            (
                "uri",
                FormatChecker {
                    check: |v| with_str(v, is_uri),
                    compatible: string_only,
                },
            ),
            (
                "utc-millisec",
                FormatChecker {
                    check: |_| true,
                    compatible: SimpleType::is_numeric,
                },
            ),
        ])
    })
}

/// Look up a registered format. Unknown names yield `None` and are ignored by
/// callers.
pub fn lookup(name: &str) -> Option<&'static FormatChecker> {
    format_checkers().get(name)
}

fn with_str(value: &Value, check: impl Fn(&str) -> bool) -> bool {
    value.as_str().is_some_and(check)
}

fn is_date_time(s: &str) -> bool {
    if DateTime::parse_from_rfc3339(s).is_ok() {
        return true;
    }
    // seconds may be omitted
    let normalized = match s.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };
    DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z").is_ok()
}

fn is_time(s: &str) -> bool {
    ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"]
        .iter()
        .any(|pattern| NaiveTime::parse_from_str(s, pattern).is_ok())
}

fn is_uri(s: &str) -> bool {
    const ILLEGAL: &[char] = &[' ', '"', '<', '>', '\\', '^', '`', '{', '|', '}'];

    if s.chars().any(|c| c.is_control() || ILLEGAL.contains(&c)) {
        return false;
    }
    if Url::parse(s).is_ok() {
        return true;
    }
    // A relative reference may only contain a colon after its first path,
    // query or fragment delimiter.
    match (s.find(':'), s.find(['/', '?', '#'])) {
        (None, _) => true,
        (Some(colon), Some(delimiter)) => delimiter < colon,
        (Some(_), None) => false,
    }
}
