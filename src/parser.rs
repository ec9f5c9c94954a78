use crate::error::LogError;
use crate::models::{AuthRecord, ParseFailure};
use chrono::NaiveDateTime;
use regex::Regex;

/// Default line shape: `<date> <host> sshd[<pid>]: <event>`
pub const DEFAULT_LINE_PATTERN: &str =
    r"^(?P<date>\w+\s+\d{2}\s+\d{2}:\d{2}:\d{2})\s+(?P<host>\w+)\s+sshd\[(?P<pid>\d+)\]:\s+(?P<event>.*)";

/// Default date shape: `Jul 14 22:10:05`
pub const DEFAULT_DATE_FORMAT: &str = "%b %d %H:%M:%S";

// Year supplied for formats that do not capture one. Syslog-style
// timestamps carry no year; pinning one keeps every record in a
// collection comparable. 1900 is not a leap year, so `Feb 29` never
// parses under the default format.
const BASE_YEAR: i32 = 1900;

const REQUIRED_GROUPS: [&str; 4] = ["date", "host", "pid", "event"];

/// Converts raw auth log lines into [`AuthRecord`]s using one compiled
/// pattern with `date`, `host`, `pid`, and `event` named capture
/// groups, plus a date format string for the `date` group.
#[derive(Debug, Clone)]
pub struct RecordParser {
    line_pattern: Regex,
    date_format: String,
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            line_pattern: Regex::new(DEFAULT_LINE_PATTERN).unwrap(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }

    /// Build a parser around a custom line pattern and date format. The
    /// pattern must compile and carry all four named capture groups.
    pub fn with_pattern(pattern: &str, date_format: &str) -> Result<Self, LogError> {
        let line_pattern = Regex::new(pattern).map_err(|e| LogError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        for group in REQUIRED_GROUPS {
            if !line_pattern.capture_names().flatten().any(|name| name == group) {
                return Err(LogError::Pattern {
                    pattern: pattern.to_string(),
                    message: format!("missing named capture group '{}'", group),
                });
            }
        }
        Ok(Self {
            line_pattern,
            date_format: date_format.to_string(),
        })
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Cheap shape pre-check without building a record. A line can pass
    /// this and still parse invalid when its date does not survive the
    /// date format.
    pub fn matches(&self, line: &str) -> bool {
        self.line_pattern.is_match(line)
    }

    /// Parse one line. Always produces a record: a line that does not
    /// match the pattern, or matches with an unparseable date, comes
    /// back as an invalid record rather than an error.
    pub fn parse(&self, line: &str) -> AuthRecord {
        let captures = match self.line_pattern.captures(line) {
            Some(captures) => captures,
            None => {
                return AuthRecord::invalid(
                    line.to_string(),
                    self.date_format.clone(),
                    ParseFailure::PatternMismatch,
                )
            }
        };

        let date_str = captures.name("date").map_or("", |m| m.as_str());
        let timestamp = match self.parse_date(date_str) {
            Some(timestamp) => timestamp,
            None => {
                return AuthRecord::invalid(
                    line.to_string(),
                    self.date_format.clone(),
                    ParseFailure::BadTimestamp,
                )
            }
        };

        AuthRecord::valid(
            line.to_string(),
            self.date_format.clone(),
            timestamp,
            captures.name("host").map_or("", |m| m.as_str()).to_string(),
            captures.name("pid").map_or("", |m| m.as_str()).to_string(),
            captures.name("event").map_or("", |m| m.as_str()).to_string(),
        )
    }

    /// Parse a date string under the configured format. Formats that do
    /// not capture a year (the default) get a fixed base year supplied
    /// on a second attempt.
    pub fn parse_date(&self, s: &str) -> Option<NaiveDateTime> {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(s, &self.date_format) {
            return Some(timestamp);
        }
        let with_year = format!("{} {}", s, BASE_YEAR);
        let format_with_year = format!("{} %Y", self.date_format);
        NaiveDateTime::parse_from_str(&with_year, &format_with_year).ok()
    }

    /// Render a timestamp back through the configured date format
    pub fn format_date(&self, timestamp: NaiveDateTime) -> String {
        timestamp.format(&self.date_format).to_string()
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}
