//! CLI for rafflepick — run a live giveaway draw in your terminal.

mod commands;
mod tui;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rafflepick")]
#[command(about = "rafflepick — live giveaway draws with countdown, rolling names and reveal")]
#[command(version = rafflepick_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive draw (TUI): add participants, configure, draw live, export
    Live {
        /// Preload participants from a .csv/.txt file
        #[arg(long)]
        file: Option<String>,

        /// Preselect the number of winners (1-5)
        #[arg(long, default_value = "1")]
        winners: usize,

        /// Start with the countdown switched off
        #[arg(long)]
        no_countdown: bool,

        /// Length of one time unit in milliseconds (countdown tick = 1 unit)
        #[arg(long, default_value = "1000")]
        unit_ms: u64,

        /// Seed for winner selection (reproducible draws)
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for CSV downloads
        #[arg(long, default_value = ".")]
        export_dir: String,
    },

    /// Headless draw: prints the countdown and reveals to stdout, then the results
    Draw {
        /// Participants file (.csv/.txt), separated by newlines, commas or semicolons
        #[arg(long)]
        file: Option<String>,

        /// Participants inline, e.g. "a@x.com,b@x.com"
        #[arg(long)]
        emails: Option<String>,

        /// Number of winners (1-5, at most the number of participants)
        #[arg(long, default_value = "1")]
        winners: usize,

        /// Skip the 3-2-1 countdown before each roll
        #[arg(long)]
        no_countdown: bool,

        /// Length of one time unit in milliseconds (0 = no waiting)
        #[arg(long, default_value = "1000")]
        unit_ms: u64,

        /// Seed for winner selection (reproducible draws)
        #[arg(long)]
        seed: Option<u64>,

        /// Write results as CSV (file path, or directory for the default name)
        #[arg(long)]
        csv: Option<String>,

        /// Write results as a JSON report
        #[arg(long)]
        json: Option<String>,
    },

    /// Normalize a participant list and print it with the count
    Parse {
        /// Participants file (.csv/.txt)
        #[arg(long)]
        file: Option<String>,

        /// Participants inline
        #[arg(long)]
        emails: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Live {
            file,
            winners,
            no_countdown,
            unit_ms,
            seed,
            export_dir,
        } => commands::live::run(commands::live::LiveCommandConfig {
            file: file.as_deref(),
            winners,
            use_countdown: !no_countdown,
            unit_ms,
            seed,
            export_dir: &export_dir,
        }),
        Commands::Draw {
            file,
            emails,
            winners,
            no_countdown,
            unit_ms,
            seed,
            csv,
            json,
        } => commands::draw::run(commands::draw::DrawCommandConfig {
            file: file.as_deref(),
            emails: emails.as_deref(),
            winners,
            use_countdown: !no_countdown,
            unit_ms,
            seed,
            csv_path: csv.as_deref(),
            json_path: json.as_deref(),
        }),
        Commands::Parse { file, emails } => commands::parse::run(file.as_deref(), emails.as_deref()),
    }
}
