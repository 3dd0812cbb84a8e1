// crates/peptide-cli/src/cmd/run.rs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use peptide_core::channel::{ChannelConfig, LossMode};
use peptide_core::EncodeConfig;

use crate::cmd::EncoderArg;
use crate::io::report::{self, MetricsRecord};

#[derive(Args)]
pub struct RunArgs {
    /// Input file to run the scenario against.
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Source codec.
    #[arg(long, value_enum, default_value = "huffman")]
    pub encoder: EncoderArg,

    /// Named RS profile (see `peptide profiles`).
    #[arg(long = "rs-profile", default_value = "none")]
    pub rs_profile: String,

    #[arg(long = "peptide-length", default_value_t = 18)]
    pub peptide_length: usize,

    #[arg(long = "index-aa-length", default_value_t = 0)]
    pub index_aa_length: usize,

    #[arg(long = "loss-prob", default_value_t = 0.0)]
    pub loss_prob: f64,

    #[arg(long = "mutation-prob", default_value_t = 0.0)]
    pub mutation_prob: f64,

    #[arg(long = "insertion-prob", default_value_t = 0.0)]
    pub insertion_prob: f64,

    #[arg(long = "shuffle-prob", default_value_t = 0.0)]
    pub shuffle_prob: f64,

    /// `peptide` or `amino-acid` (default: `amino-acid` for RS-protected
    /// runs, `peptide` for Fountain runs, matching the pipeline driver's
    /// default dispatch).
    #[arg(long = "loss-mode")]
    pub loss_mode: Option<String>,

    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,

    /// Optional path to write the metrics as JSON or CSV (by extension).
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("read input file {}", args.input.display()))?;

    let is_fountain = matches!(args.encoder, EncoderArg::Fountain);
    let loss_mode = match args.loss_mode.as_deref() {
        Some("peptide") => LossMode::Peptide,
        Some("amino-acid") => LossMode::AminoAcid,
        Some(other) => anyhow::bail!("unknown loss mode '{other}', expected peptide|amino-acid"),
        None if is_fountain => LossMode::Peptide,
        None => LossMode::AminoAcid,
    };

    let cfg = EncodeConfig {
        encoder: args.encoder.into(),
        peptide_length: args.peptide_length,
        index_aa_length: args.index_aa_length,
        rs_profile: args.rs_profile,
        channel: ChannelConfig {
            loss_prob: args.loss_prob,
            mutation_prob: args.mutation_prob,
            insertion_prob: args.insertion_prob,
            shuffle_prob: args.shuffle_prob,
            drop_empty: !(is_fountain && args.index_aa_length == 0),
            loss_mode,
            seed: args.seed,
            ..ChannelConfig::default()
        },
        ..EncodeConfig::default()
    };

    let (_, _, _, metrics) = peptide_core::encode_and_decode(&data, &cfg)?;

    println!(
        "success={} byte_errors={} bit_errors={} bit_error_rate={:.6} data_units={} parity_units={}",
        metrics.success,
        metrics.byte_errors,
        metrics.bit_errors,
        metrics.bit_error_rate,
        metrics.data_units,
        metrics.parity_units,
    );

    if let Some(report_path) = args.report {
        let record = MetricsRecord::from_metrics("run", &metrics);
        match report_path.extension().and_then(|e| e.to_str()) {
            Some("csv") => report::write_csv(&report_path, &[record])?,
            _ => report::write_json(&report_path, &[record])?,
        }
    }

    Ok(())
}
