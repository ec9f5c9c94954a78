use crate::cli::InspectArgs;
use crate::collection::FilterQuery;
use crate::commands::output::sorted_ips;
use crate::commands::parse::{expand_globs, load_collection};
use crate::cursor::Cursor;
use colored::*;

pub fn run_inspect(args: InspectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let collection = load_collection(&files)?;

    let mut query = FilterQuery::new();
    if let Some(from) = args.from {
        query = query.from_date(from);
    }
    if let Some(to) = args.to {
        query = query.to_date(to);
    }
    if let Some(ip) = args.ip {
        query = query.ip(ip);
    }
    let view = collection.filter_records(&query);

    let mut cursor = Cursor::new(view.len());
    let position = match args.line {
        Some(ref raw) => {
            let Some(index) = view.iter().position(|r| &r.raw == raw) else {
                eprintln!("No record in the view matches the given line");
                return Ok(());
            };
            cursor.jump(index)
        }
        None => cursor.jump(args.index),
    };
    let Some(position) = position else {
        eprintln!(
            "No record at position {} (the view holds {} records)",
            args.index,
            view.len()
        );
        return Ok(());
    };

    let record = view[position];

    println!("{} {} of {}", "Record".cyan().bold(), position + 1, view.len());
    println!("{}{}", "Date:  ".cyan(), record.formatted_date().unwrap_or_else(|| "Invalid".to_string()));
    println!("{}{}", "Host:  ".cyan(), record.host().unwrap_or("Invalid"));
    println!("{}{}", "PID:   ".cyan(), record.pid().unwrap_or("Invalid"));
    println!("{}{}", "Event: ".cyan(), record.event().unwrap_or("Invalid"));

    println!("{}", "IP addresses:".cyan());
    let ips = sorted_ips(record);
    if ips.is_empty() {
        println!("  {}", "(none)".dimmed());
    } else {
        for ip in &ips {
            println!("  {}", ip);
        }
    }

    let prev = if cursor.at_start() { "no".dimmed() } else { "yes".green() };
    let next = if cursor.at_end() { "no".dimmed() } else { "yes".green() };
    println!("\nprev: {}  next: {}", prev, next);

    Ok(())
}
