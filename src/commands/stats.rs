use crate::cli::StatsArgs;
use crate::commands::parse::{expand_globs, load_collection};
use chrono::NaiveDateTime;
use colored::*;
use std::collections::HashMap;

pub fn run_stats(args: StatsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let collection = load_collection(&files)?;

    if collection.is_empty() {
        eprintln!("No records loaded");
        return Ok(());
    }

    let mut host_counts: HashMap<String, usize> = HashMap::new();
    let mut ip_counts: HashMap<String, usize> = HashMap::new();
    let mut first: Option<NaiveDateTime> = None;
    let mut last: Option<NaiveDateTime> = None;

    for record in &collection {
        if let Some(host) = record.host() {
            *host_counts.entry(host.to_string()).or_insert(0) += 1;
        }
        for ip in record.ip_addresses() {
            *ip_counts.entry(ip).or_insert(0) += 1;
        }
        if let Some(ts) = record.timestamp() {
            first = Some(first.map_or(ts, |f| f.min(ts)));
            last = Some(last.map_or(ts, |l| l.max(ts)));
        }
    }

    let total = collection.len();
    println!("{}", "═".repeat(50).cyan());
    println!("{}", "AUTH LOG SUMMARY".cyan().bold());
    println!("{}", "═".repeat(50).cyan());
    println!("Records:    {}", total.to_string().white().bold());
    if let (Some(first), Some(last)) = (first, last) {
        println!(
            "Time span:  {} .. {}",
            collection.parser().format_date(first).cyan(),
            collection.parser().format_date(last).cyan()
        );
    }

    print_distribution("Hosts", host_counts, total, args.top);
    print_distribution("Source IPs", ip_counts, total, args.top);

    Ok(())
}

fn print_distribution(title: &str, counts: HashMap<String, usize>, total: usize, top: usize) {
    if counts.is_empty() {
        return;
    }
    println!("\n{}:", title.cyan().bold());
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (value, count) in sorted.iter().take(top) {
        let bar_len = (*count as f64 / total as f64 * 40.0) as usize;
        let bar = "█".repeat(bar_len);
        println!(
            "  {:20} {:>6} ({:5.1}%) {}",
            value,
            count,
            (*count as f64 / total as f64) * 100.0,
            bar.green()
        );
    }
}
