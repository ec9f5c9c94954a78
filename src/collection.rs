use crate::error::LogError;
use crate::models::AuthRecord;
use crate::parser::RecordParser;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Conjunction of optional record predicates.
///
/// Date strings are interpreted under the owning collection's date
/// format; a string that does not parse, or is empty, imposes no
/// constraint. The IP predicate is exact set membership against
/// [`AuthRecord::ip_addresses`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    ip: Option<String>,
}

impl FilterQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records with `timestamp >= start`
    pub fn from_date(mut self, start: impl Into<String>) -> Self {
        self.start_date = Some(start.into());
        self
    }

    /// Keep records with `timestamp <= end`
    pub fn to_date(mut self, end: impl Into<String>) -> Self {
        self.end_date = Some(end.into());
        self
    }

    /// Keep records whose IP set contains exactly `ip`
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    /// True when every predicate is absent or empty
    pub fn is_empty(&self) -> bool {
        [&self.start_date, &self.end_date, &self.ip]
            .iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}

/// Ordered, append-only collection of records bulk-loaded from auth
/// log files.
///
/// Insertion order is file order and duplicates are allowed. Every
/// held record is fully valid: [`LogCollection::load`] drops lines
/// that do not parse, unlike direct [`RecordParser::parse`], which
/// always materializes a record. Callers wanting a fresh view
/// construct a new collection; there is no delete.
pub struct LogCollection {
    parser: RecordParser,
    records: Vec<AuthRecord>,
}

impl LogCollection {
    pub fn new() -> Self {
        Self::with_parser(RecordParser::new())
    }

    pub fn with_parser(parser: RecordParser) -> Self {
        Self {
            parser,
            records: Vec::new(),
        }
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    /// Read `path` line by line in file order and append one record per
    /// fully valid line; everything else is silently dropped. Returns
    /// the number of records appended. A failed load leaves the
    /// collection untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, LogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LogError::Io {
            operation: "open".to_string(),
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let mut batch = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| LogError::Io {
                operation: "read".to_string(),
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let record = self.parser.parse(&line);
            if record.is_valid() {
                batch.push(record);
            }
        }

        let appended = batch.len();
        self.records.extend(batch);
        Ok(appended)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AuthRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuthRecord> {
        self.records.iter()
    }

    /// Raw text of every record, insertion order
    pub fn raw_lines(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.raw.as_str()).collect()
    }

    /// Exact, case-sensitive raw-line membership
    pub fn contains(&self, raw: &str) -> bool {
        self.records.iter().any(|r| r.raw == raw)
    }

    /// Position of the first record with this raw line
    pub fn index_of(&self, raw: &str) -> Option<usize> {
        self.records.iter().position(|r| r.raw == raw)
    }

    /// First record with this raw line
    pub fn record_of(&self, raw: &str) -> Option<&AuthRecord> {
        self.records.iter().find(|r| r.raw == raw)
    }

    /// Records satisfying every supplied predicate, insertion order
    pub fn filter_records(&self, query: &FilterQuery) -> Vec<&AuthRecord> {
        let start = query
            .start_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| self.parser.parse_date(s));
        let end = query
            .end_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| self.parser.parse_date(s));
        let ip = query.ip.as_deref().filter(|s| !s.is_empty());

        self.records
            .iter()
            .filter(|r| in_bounds(r.timestamp(), start, end))
            .filter(|r| ip.map_or(true, |addr| r.ip_addresses().contains(addr)))
            .collect()
    }

    /// Raw text of records satisfying every supplied predicate
    pub fn filter(&self, query: &FilterQuery) -> Vec<String> {
        self.filter_records(query)
            .into_iter()
            .map(|r| r.raw.clone())
            .collect()
    }
}

impl Default for LogCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a LogCollection {
    type Item = &'a AuthRecord;
    type IntoIter = std::slice::Iter<'a, AuthRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn in_bounds(
    timestamp: Option<NaiveDateTime>,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> bool {
    let Some(timestamp) = timestamp else {
        // a record without a timestamp only survives an unconstrained range
        return start.is_none() && end.is_none();
    };
    start.map_or(true, |s| timestamp >= s) && end.map_or(true, |e| timestamp <= e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LINES: [&str; 6] = [
        "Jul 14 22:10:05 server1 sshd[1234]: Failed password for root from 192.168.1.10 port 4444 ssh2",
        "Jul 14 22:11:12 server1 sshd[1301]: Accepted password for deploy from 10.0.0.5 port 50122 ssh2",
        "not a log line at all",
        "Feb 31 09:00:00 server3 sshd[111]: Failed password for invalid user test from 172.16.0.9",
        "Jul 15 00:13:31 server2 sshd[912]: Connection closed by 203.0.113.7 port 40112 [preauth]",
        "Jul 16 09:15:59 server3 sshd[3001]: Accepted publickey for deploy from 10.0.0.5 port 51000 ssh2",
    ];

    fn write_log(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn loaded() -> LogCollection {
        let file = write_log(&LINES);
        let mut collection = LogCollection::new();
        collection.load(file.path()).unwrap();
        collection
    }

    #[test]
    fn test_load_keeps_only_fully_valid_lines() {
        let collection = loaded();
        // the garbage line and the Feb 31 line are dropped
        assert_eq!(collection.len(), 4);
        assert!(collection.iter().all(AuthRecord::is_valid));
    }

    #[test]
    fn test_load_returns_appended_count() {
        let file = write_log(&LINES);
        let mut collection = LogCollection::new();
        assert_eq!(collection.load(file.path()).unwrap(), 4);
    }

    #[test]
    fn test_second_load_appends() {
        let first = write_log(&LINES[..2]);
        let second = write_log(&LINES[4..]);
        let mut collection = LogCollection::new();
        collection.load(first.path()).unwrap();
        collection.load(second.path()).unwrap();
        assert_eq!(collection.len(), 4);
        // insertion order spans both loads
        assert_eq!(collection.raw_lines(), vec![LINES[0], LINES[1], LINES[4], LINES[5]]);
    }

    #[test]
    fn test_missing_file_errors_and_preserves_records() {
        let mut collection = loaded();
        let err = collection.load("/no/such/path.log").unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
        assert_eq!(collection.len(), 4);
    }

    #[test]
    fn test_duplicate_lines_are_distinct_entries() {
        let file = write_log(&[LINES[0], LINES[0]]);
        let mut collection = LogCollection::new();
        collection.load(file.path()).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.index_of(LINES[0]), Some(0));
    }

    #[test]
    fn test_lookup_by_raw_line() {
        let collection = loaded();
        assert!(collection.contains(LINES[1]));
        assert!(!collection.contains("never loaded"));
        assert!(!collection.contains(LINES[2]));

        assert_eq!(collection.index_of(LINES[4]), Some(2));
        assert_eq!(collection.index_of("never loaded"), None);

        let record = collection.record_of(LINES[1]).unwrap();
        assert_eq!(record.host(), Some("server1"));
        assert_eq!(record.pid(), Some("1301"));
        assert!(collection.record_of("never loaded").is_none());
    }

    #[test]
    fn test_filter_with_no_predicates_returns_all_in_order() {
        let collection = loaded();
        let query = FilterQuery::new();
        assert!(query.is_empty());
        assert_eq!(collection.filter(&query), collection.raw_lines());
    }

    #[test]
    fn test_filter_empty_strings_impose_no_constraint() {
        let collection = loaded();
        let query = FilterQuery::new().from_date("").to_date("").ip("");
        assert!(query.is_empty());
        assert_eq!(collection.filter(&query).len(), 4);
    }

    #[test]
    fn test_filter_by_ip_membership() {
        let collection = loaded();
        let matched = collection.filter(&FilterQuery::new().ip("10.0.0.5"));
        assert_eq!(matched, vec![LINES[1].to_string(), LINES[5].to_string()]);
    }

    #[test]
    fn test_filter_by_date_range() {
        let collection = loaded();
        let matched = collection.filter(
            &FilterQuery::new()
                .from_date("Jul 15 00:00:00")
                .to_date("Jul 15 23:59:59"),
        );
        assert_eq!(matched, vec![LINES[4].to_string()]);
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let collection = loaded();
        let matched = collection.filter(
            &FilterQuery::new()
                .from_date("Jul 14 22:10:05")
                .to_date("Jul 14 22:11:12"),
        );
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_filter_inverted_range_is_empty_not_an_error() {
        let collection = loaded();
        let matched = collection.filter(
            &FilterQuery::new()
                .from_date("Jul 15 00:00:00")
                .to_date("Jul 14 00:00:00"),
        );
        assert!(matched.is_empty());
    }

    #[test]
    fn test_filter_unparseable_date_predicate_is_skipped() {
        let collection = loaded();
        // the bad date is dropped; the IP predicate still applies
        let matched = collection.filter(&FilterQuery::new().from_date("not a date").ip("10.0.0.5"));
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn test_filter_predicates_are_conjunctive() {
        let collection = loaded();
        let matched = collection.filter(
            &FilterQuery::new().from_date("Jul 15 00:00:00").ip("10.0.0.5"),
        );
        assert_eq!(matched, vec![LINES[5].to_string()]);
    }

    #[test]
    fn test_iteration_yields_records_in_order() {
        let collection = loaded();
        let hosts: Vec<&str> = collection.iter().filter_map(AuthRecord::host).collect();
        assert_eq!(hosts, vec!["server1", "server1", "server2", "server3"]);
    }
}
