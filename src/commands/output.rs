use crate::cli::OutputFormat;
use crate::models::{AuthRecord, ParseFailure};
use colored::*;
use std::io::{self, Write};

pub struct OutputFormatter {
    format: OutputFormat,
    highlight_pattern: Option<regex::Regex>,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            highlight_pattern: None,
        }
    }

    /// Highlight literal occurrences of `needle` in table output
    pub fn with_highlight(mut self, needle: Option<&str>) -> Self {
        if let Some(n) = needle {
            if !n.is_empty() {
                self.highlight_pattern = regex::Regex::new(&regex::escape(n)).ok();
            }
        }
        self
    }

    pub fn print_header(&self, writer: &mut impl Write) -> io::Result<()> {
        match self.format {
            OutputFormat::Csv => {
                writeln!(writer, "date,host,pid,event,ips")?;
            }
            OutputFormat::Table => {
                writeln!(writer, "{}", "─".repeat(100).dimmed())?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn format_record(&self, record: &AuthRecord) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(record),
            OutputFormat::Json => self.format_json(record),
            OutputFormat::Csv => self.format_csv(record),
            OutputFormat::Raw => record.raw.clone(),
        }
    }

    fn format_table(&self, record: &AuthRecord) -> String {
        let mut output = String::new();

        let date = record.formatted_date().unwrap_or_else(|| "Invalid".to_string());
        output.push_str(&format!("{} ", date.cyan()));

        match (record.host(), record.pid()) {
            (Some(host), Some(pid)) => {
                output.push_str(&format!("{} {} ", host.green(), format!("[{}]", pid).dimmed()));
            }
            _ => {
                output.push_str(&format!("{} ", "Invalid".red()));
            }
        }

        // invalid records have no event field; show the raw line instead
        let event = record.event().unwrap_or(record.raw.as_str());
        let event = if let Some(ref pattern) = self.highlight_pattern {
            pattern
                .replace_all(event, |caps: &regex::Captures| {
                    caps[0].to_string().on_yellow().black().to_string()
                })
                .to_string()
        } else {
            event.to_string()
        };
        output.push_str(&event);

        output
    }

    fn format_json(&self, record: &AuthRecord) -> String {
        serde_json::to_string(&self.record_to_json(record)).unwrap_or_default()
    }

    fn record_to_json(&self, record: &AuthRecord) -> serde_json::Value {
        let mut obj = serde_json::Map::new();

        match record.failure() {
            None => {
                obj.insert(
                    "date".to_string(),
                    serde_json::Value::String(record.formatted_date().unwrap_or_default()),
                );
                obj.insert(
                    "host".to_string(),
                    serde_json::Value::String(record.host().unwrap_or_default().to_string()),
                );
                obj.insert(
                    "pid".to_string(),
                    serde_json::Value::String(record.pid().unwrap_or_default().to_string()),
                );
                obj.insert(
                    "event".to_string(),
                    serde_json::Value::String(record.event().unwrap_or_default().to_string()),
                );
            }
            Some(reason) => {
                obj.insert(
                    "invalid".to_string(),
                    serde_json::Value::String(reason_name(reason).to_string()),
                );
            }
        }

        let ips = sorted_ips(record);
        if !ips.is_empty() {
            obj.insert(
                "ips".to_string(),
                serde_json::Value::Array(ips.into_iter().map(serde_json::Value::String).collect()),
            );
        }

        obj.insert("raw".to_string(), serde_json::Value::String(record.raw.clone()));

        serde_json::Value::Object(obj)
    }

    fn format_csv(&self, record: &AuthRecord) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        let row = [
            record.formatted_date().unwrap_or_default(),
            record.host().unwrap_or_default().to_string(),
            record.pid().unwrap_or_default().to_string(),
            record.event().unwrap_or_default().to_string(),
            sorted_ips(record).join(" "),
        ];
        let _ = writer.write_record(&row);
        let bytes = writer.into_inner().unwrap_or_default();
        String::from_utf8(bytes).unwrap_or_default().trim_end().to_string()
    }
}

/// IP set in a stable order for display
pub fn sorted_ips(record: &AuthRecord) -> Vec<String> {
    let mut ips: Vec<String> = record.ip_addresses().into_iter().collect();
    ips.sort();
    ips
}

pub fn reason_name(reason: ParseFailure) -> &'static str {
    match reason {
        ParseFailure::PatternMismatch => "pattern mismatch",
        ParseFailure::BadTimestamp => "bad timestamp",
    }
}

pub fn print_parse_summary(total: usize, valid: usize, invalid: usize) {
    println!("\n{}", "═".repeat(50).cyan());
    println!("{}", "SUMMARY".cyan().bold());
    println!("{}", "═".repeat(50).cyan());
    println!("Total lines:   {}", total.to_string().white().bold());
    if total > 0 {
        println!(
            "Valid:         {} ({:.1}%)",
            valid.to_string().green(),
            (valid as f64 / total as f64) * 100.0
        );
        println!(
            "Invalid:       {} ({:.1}%)",
            invalid.to_string().red(),
            (invalid as f64 / total as f64) * 100.0
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::RecordParser;

    const LINE: &str =
        "Jul 14 22:10:05 server1 sshd[1234]: Failed password for root from 192.168.1.10 port 4444 ssh2";

    #[test]
    fn test_raw_output_is_the_line_itself() {
        let record = RecordParser::new().parse(LINE);
        let formatter = OutputFormatter::new(OutputFormat::Raw);
        assert_eq!(formatter.format_record(&record), LINE);
    }

    #[test]
    fn test_json_output_carries_parsed_fields() {
        let record = RecordParser::new().parse(LINE);
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_record(&record)).unwrap();
        assert_eq!(value["date"], "Jul 14 22:10:05");
        assert_eq!(value["host"], "server1");
        assert_eq!(value["pid"], "1234");
        assert_eq!(value["ips"][0], "192.168.1.10");
        assert_eq!(value["raw"], LINE);
    }

    #[test]
    fn test_json_output_tags_invalid_records() {
        let record = RecordParser::new().parse("nothing to see");
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let value: serde_json::Value =
            serde_json::from_str(&formatter.format_record(&record)).unwrap();
        assert_eq!(value["invalid"], "pattern mismatch");
        assert!(value.get("host").is_none());
    }

    #[test]
    fn test_csv_output_quotes_fields_with_commas() {
        let record = RecordParser::new()
            .parse("Jul 14 22:10:05 server1 sshd[7]: error: maximum authentication attempts, kicked");
        let formatter = OutputFormatter::new(OutputFormat::Csv);
        let row = formatter.format_record(&record);
        assert!(row.starts_with("Jul 14 22:10:05,server1,7,"));
        assert!(row.contains("\"error: maximum authentication attempts, kicked\""));
    }
}
