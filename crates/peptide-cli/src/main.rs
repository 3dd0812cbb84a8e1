// crates/peptide-cli/src/main.rs

use clap::{Parser, Subcommand};

mod cmd;
mod io;

#[derive(Parser)]
#[command(name = "peptide")]
#[command(about = "Peptide data-storage codec/ECC pipeline CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a file into RS-protected peptides.
    Encode(cmd::encode::EncodeArgs),

    /// Decode a directory of peptides back to the original file.
    Decode(cmd::decode::DecodeArgs),

    /// Run one full encode -> channel -> decode scenario and report metrics.
    Run(cmd::run::RunArgs),

    /// Sweep a grid of RS/Fountain profiles and error probabilities.
    Sweep(cmd::sweep::SweepArgs),

    /// List the named RS and Fountain profiles.
    Profiles(cmd::profiles::ProfilesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Encode(args) => cmd::encode::run(args),
        Commands::Decode(args) => cmd::decode::run(args),
        Commands::Run(args) => cmd::run::run(args),
        Commands::Sweep(args) => cmd::sweep::run(args),
        Commands::Profiles(args) => cmd::profiles::run(args),
    }
}
