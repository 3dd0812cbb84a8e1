// crates/peptide-cli/src/cmd/encode.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use peptide_core::EncodeConfig;

use crate::cmd::EncoderArg;
use crate::io::persist;

#[derive(Args)]
pub struct EncodeArgs {
    /// Input file to encode.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Output directory (will contain peptides.txt + meta.json).
    #[arg(long = "out")]
    pub output: PathBuf,

    /// Source codec.
    #[arg(long, value_enum, default_value = "huffman")]
    pub encoder: EncoderArg,

    /// Named RS profile (see `peptide profiles`).
    #[arg(long = "rs-profile", default_value = "none")]
    pub rs_profile: String,

    /// Total peptide length (residues), including any index prefix.
    #[arg(long = "peptide-length", default_value_t = 18)]
    pub peptide_length: usize,

    /// Index prefix length (residues); 0 disables indexing.
    #[arg(long = "index-aa-length", default_value_t = 0)]
    pub index_aa_length: usize,

    /// Named Fountain overhead profile, used only when `--encoder fountain`.
    #[arg(long = "fountain-profile", default_value = "fnt20")]
    pub fountain_profile: String,

    /// Fountain PRNG seed, used only when `--encoder fountain`.
    #[arg(long = "fountain-seed", default_value_t = 1)]
    pub fountain_seed: u64,
}

pub fn run(args: EncodeArgs) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("read input file {}", args.input.display()))?;

    let cfg = EncodeConfig {
        encoder: args.encoder.into(),
        peptide_length: args.peptide_length,
        index_aa_length: args.index_aa_length,
        rs_profile: args.rs_profile.clone(),
        fountain_profile: args.fountain_profile,
        fountain_seed: args.fountain_seed,
        ..EncodeConfig::default()
    };

    let (peptides, encoded) =
        peptide_core::encode(&data, &cfg).context("encode pipeline failed")?;

    persist::save(&args.output, &encoded, &args.rs_profile)?;

    println!(
        "encoded {} bytes into {} peptides ({} data + {} parity units) -> {}",
        data.len(),
        peptides.len(),
        encoded.rs.metadata.iter().filter(|m| !m.is_parity).count(),
        encoded.rs.metadata.iter().filter(|m| m.is_parity).count(),
        args.output.display(),
    );
    Ok(())
}
