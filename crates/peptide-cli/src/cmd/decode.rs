// crates/peptide-cli/src/cmd/decode.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::io::persist;

#[derive(Args)]
pub struct DecodeArgs {
    /// Input directory produced by `peptide encode`.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Output file to write the decoded bytes to.
    #[arg(long = "out")]
    pub output: PathBuf,
}

pub fn run(args: DecodeArgs) -> Result<()> {
    let (peptides, encoded) = persist::load(&args.input)?;
    let decoded = peptide_core::decode(&peptides, &encoded).context("decode pipeline failed")?;
    std::fs::write(&args.output, &decoded)
        .with_context(|| format!("write output file {}", args.output.display()))?;
    println!("decoded {} peptides into {} bytes -> {}", peptides.len(), decoded.len(), args.output.display());
    Ok(())
}
