use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use tracing::{error, info};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align the sequences of a FASTA file by simulated annealing
    Align(cmd::align::AlignArgs),
    /// Check that an aligned FASTA preserves the original sequences
    Verify(cmd::verify::VerifyArgs),
}

fn main() {
    tracing_subscriber::fmt::init();

    // Raw matches tell typed flags apart from defaults when merging a config file.
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    let Some((_, sub_matches)) = matches.subcommand() else {
        error!("❌ No subcommand given");
        process::exit(2);
    };

    info!("🚀 Initializing msasa {}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Align(args) => cmd::align::run(args, sub_matches),
        Commands::Verify(args) => cmd::verify::run(args),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
