use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Substrings that look like an IPv4 address: four dot-separated groups
/// of 1-3 digits. No range validation; `999.999.999.999` matches.
pub const IPV4_PATTERN: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

/// Why a line could not be turned into a valid record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailure {
    /// The line does not match the expected log shape
    PatternMismatch,
    /// The line matched structurally but its date portion did not parse
    BadTimestamp,
}

/// Structured fields of a record, or the reason there are none.
///
/// A record is either fully valid or fully invalid; partial parses do
/// not occur because the single pattern match either binds every named
/// group or fails entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordFields {
    Valid {
        timestamp: NaiveDateTime,
        host: String,
        pid: String,
        event: String,
    },
    Invalid {
        reason: ParseFailure,
    },
}

/// One line of an SSH authentication log.
///
/// The raw line is preserved byte-for-byte and serves as the identity
/// key for collection lookups. Field accessors return `None` on the
/// invalid side so placeholder text can never be mistaken for data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRecord {
    /// Original unparsed line
    pub raw: String,
    /// Parse outcome
    pub fields: RecordFields,
    /// Format the date portion was parsed with, kept so the timestamp
    /// can be re-rendered the same way
    #[serde(skip)]
    pub(crate) date_format: String,
}

impl AuthRecord {
    pub(crate) fn valid(
        raw: String,
        date_format: String,
        timestamp: NaiveDateTime,
        host: String,
        pid: String,
        event: String,
    ) -> Self {
        Self {
            raw,
            fields: RecordFields::Valid { timestamp, host, pid, event },
            date_format,
        }
    }

    pub(crate) fn invalid(raw: String, date_format: String, reason: ParseFailure) -> Self {
        Self {
            raw,
            fields: RecordFields::Invalid { reason },
            date_format,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.fields, RecordFields::Valid { .. })
    }

    /// The reason this record is invalid, if it is
    pub fn failure(&self) -> Option<ParseFailure> {
        match &self.fields {
            RecordFields::Invalid { reason } => Some(*reason),
            RecordFields::Valid { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match &self.fields {
            RecordFields::Valid { timestamp, .. } => Some(*timestamp),
            RecordFields::Invalid { .. } => None,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match &self.fields {
            RecordFields::Valid { host, .. } => Some(host),
            RecordFields::Invalid { .. } => None,
        }
    }

    pub fn pid(&self) -> Option<&str> {
        match &self.fields {
            RecordFields::Valid { pid, .. } => Some(pid),
            RecordFields::Invalid { .. } => None,
        }
    }

    pub fn event(&self) -> Option<&str> {
        match &self.fields {
            RecordFields::Valid { event, .. } => Some(event),
            RecordFields::Invalid { .. } => None,
        }
    }

    /// The timestamp re-rendered through the same format it was parsed
    /// with. Format-stable, not content-stable: the default format
    /// carries no year, so the true year is never recovered.
    pub fn formatted_date(&self) -> Option<String> {
        self.timestamp().map(|ts| ts.format(&self.date_format).to_string())
    }

    /// Every IPv4-looking substring of the raw line, deduplicated.
    /// Computed per query; lines are short and this is called rarely.
    pub fn ip_addresses(&self) -> HashSet<String> {
        Regex::new(IPV4_PATTERN)
            .unwrap()
            .find_iter(&self.raw)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RecordParser;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn prop_parse_preserves_raw(line: String) -> bool {
        RecordParser::new().parse(&line).raw == line
    }

    #[quickcheck]
    fn prop_record_is_all_or_nothing(line: String) -> bool {
        let record = RecordParser::new().parse(&line);
        if record.is_valid() {
            record.timestamp().is_some()
                && record.host().is_some()
                && record.pid().is_some()
                && record.event().is_some()
                && record.formatted_date().is_some()
                && record.failure().is_none()
        } else {
            record.timestamp().is_none()
                && record.host().is_none()
                && record.pid().is_none()
                && record.event().is_none()
                && record.formatted_date().is_none()
                && record.failure().is_some()
        }
    }

    #[test]
    fn test_ip_addresses_deduplicated() {
        let record = RecordParser::new().parse(
            "Jul 14 22:10:05 server1 sshd[99]: Disconnected from 10.0.0.5; last seen 10.0.0.5",
        );
        let ips = record.ip_addresses();
        assert_eq!(ips.len(), 1);
        assert!(ips.contains("10.0.0.5"));
    }

    #[test]
    fn test_ip_addresses_no_range_validation() {
        let record = RecordParser::new().parse(
            "Jul 14 22:10:05 server1 sshd[99]: bogus peer 999.999.999.999 seen",
        );
        assert!(record.ip_addresses().contains("999.999.999.999"));
    }

    #[test]
    fn test_ip_addresses_found_on_invalid_records_too() {
        // derivation works on the raw line, not the parsed fields
        let record = RecordParser::new().parse("no shape here, just 192.168.1.10");
        assert!(!record.is_valid());
        assert!(record.ip_addresses().contains("192.168.1.10"));
    }

    #[test]
    fn test_ip_addresses_empty_when_none_present() {
        let record = RecordParser::new()
            .parse("Jul 14 22:10:05 server1 sshd[99]: session opened for user root");
        assert!(record.ip_addresses().is_empty());
    }

    #[test]
    fn test_formatted_date_is_format_stable() {
        let parser = RecordParser::new();
        let record = parser.parse(
            "Jul 14 22:10:05 server1 sshd[1234]: Failed password for root from 192.168.1.10 port 4444 ssh2",
        );
        let rendered = record.formatted_date().unwrap();
        assert_eq!(rendered, "Jul 14 22:10:05");

        // re-parsing the rendered date and rendering again is stable
        let reparsed = parser.parse_date(&rendered).unwrap();
        assert_eq!(parser.format_date(reparsed), rendered);
    }
}
