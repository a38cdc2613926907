use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{cpm::execute_cpm, expand::execute_expand, schedule::execute_schedule};

#[derive(Parser)]
#[command(name = "formwork")]
#[command(about = "Construction project scheduling: task expansion, resource-constrained scheduling, and CPM analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand base task templates into per-floor, per-zone task instances
    Expand {
        /// Path to a RON project input file
        project: PathBuf,
        /// Write the expanded task set to this RON file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run the resource-constrained scheduler and print a Gantt-style summary
    Schedule {
        /// Path to a RON project input file
        project: PathBuf,
        /// Write the committed schedule to this RON file
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run Critical Path Method analysis (nominal durations, independent of resource contention)
    Cpm {
        /// Path to a RON project input file
        project: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Expand { project, out } => execute_expand(&project, out.as_deref()),
        Commands::Schedule { project, out } => execute_schedule(&project, out.as_deref()),
        Commands::Cpm { project } => execute_cpm(&project),
    }
}
