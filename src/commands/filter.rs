use crate::cli::FilterArgs;
use crate::collection::FilterQuery;
use crate::commands::output::OutputFormatter;
use crate::commands::parse::{expand_globs, load_collection};
use std::io::{stdout, Write};

pub fn run_filter(args: FilterArgs) -> Result<(), Box<dyn std::error::Error>> {
    let files = expand_globs(&args.files)?;

    if files.is_empty() {
        eprintln!("No files matched the given patterns");
        return Ok(());
    }

    let collection = load_collection(&files)?;

    // the collection skips unparseable date predicates silently;
    // surface a hint here so the user learns the expected shape
    for supplied in [&args.from, &args.to].into_iter().flatten() {
        if !supplied.is_empty() && collection.parser().parse_date(supplied).is_none() {
            eprintln!(
                "note: '{}' does not match the date format (e.g. 'Jul 14 22:10:05'); predicate skipped",
                supplied
            );
        }
    }

    let mut query = FilterQuery::new();
    if let Some(from) = args.from {
        query = query.from_date(from);
    }
    if let Some(to) = args.to {
        query = query.to_date(to);
    }
    if let Some(ip) = args.ip.clone() {
        query = query.ip(ip);
    }

    let formatter = OutputFormatter::new(args.output).with_highlight(args.ip.as_deref());

    let mut output: Box<dyn Write> = Box::new(stdout());
    formatter.print_header(&mut output)?;

    let records = collection.filter_records(&query);
    let shown = match args.limit {
        Some(limit) => &records[..records.len().min(limit)],
        None => &records[..],
    };
    for record in shown {
        writeln!(output, "{}", formatter.format_record(record))?;
    }

    eprintln!("\n{} of {} records matched", records.len(), collection.len());
    Ok(())
}
