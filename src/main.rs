use authlens::cli::{Cli, Commands};
use authlens::commands::{run_filter, run_inspect, run_parse, run_stats};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse(args) => run_parse(args),
        Commands::Filter(args) => run_filter(args),
        Commands::Inspect(args) => run_inspect(args),
        Commands::Stats(args) => run_stats(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
