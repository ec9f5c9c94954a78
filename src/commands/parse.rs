use crate::cli::ParseArgs;
use crate::collection::LogCollection;
use crate::commands::output::{print_parse_summary, OutputFormatter};
use crate::parser::RecordParser;
use glob::glob;
use std::fs::File;
use std::io::{stdout, BufRead, BufReader, Write};
use std::path::PathBuf;

pub fn run_parse(args: ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let parser = RecordParser::new();
    let formatter = OutputFormatter::new(args.output);

    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let mut output: Box<dyn Write> = Box::new(stdout());
    formatter.print_header(&mut output)?;

    let mut total = 0;
    let mut valid = 0;
    let mut printed = 0;

    'files: for file_path in &files {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            total += 1;
            let record = parser.parse(&line);
            if record.is_valid() {
                valid += 1;
                if args.invalid_only {
                    continue;
                }
            }

            if let Some(limit) = args.limit {
                if printed >= limit {
                    break 'files;
                }
            }

            writeln!(output, "{}", formatter.format_record(&record))?;
            printed += 1;
        }
    }

    print_parse_summary(total, valid, total - valid);
    Ok(())
}

pub fn expand_globs(patterns: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let pattern_str = pattern.to_string_lossy();
        if pattern_str.contains('*') || pattern_str.contains('?') {
            for entry in glob(&pattern_str)? {
                files.push(entry?);
            }
        } else {
            files.push(pattern.clone());
        }
    }
    Ok(files)
}

/// Bulk-load every file into one collection, appending in argument order
pub fn load_collection(files: &[PathBuf]) -> Result<LogCollection, Box<dyn std::error::Error>> {
    let mut collection = LogCollection::new();
    for file_path in files {
        collection.load(file_path)?;
    }
    Ok(collection)
}
