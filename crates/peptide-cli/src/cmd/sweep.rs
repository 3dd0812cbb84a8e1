// crates/peptide-cli/src/cmd/sweep.rs
//
// Scenario-grid runner: combine a list of RS/Fountain profiles with a list
// of channel loss probabilities, either pairwise (`equal`, same length lists
// zipped) or as a full cartesian product (`grid`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use peptide_core::channel::ChannelConfig;
use peptide_core::EncodeConfig;

use crate::cmd::EncoderArg;
use crate::io::report::{self, MetricsRecord};

#[derive(Clone, Copy, ValueEnum)]
pub enum SweepMode {
    Equal,
    Grid,
}

#[derive(Args)]
pub struct SweepArgs {
    #[arg(long = "in")]
    pub input: PathBuf,

    /// Comma-separated RS profile names (see `peptide profiles`).
    #[arg(long = "profiles")]
    pub profiles: String,

    /// Comma-separated channel loss probabilities.
    #[arg(long = "prob-values")]
    pub prob_values: String,

    #[arg(long, value_enum, default_value = "grid")]
    pub mode: SweepMode,

    #[arg(long, value_enum, default_value = "huffman")]
    pub encoder: EncoderArg,

    #[arg(long = "peptide-length", default_value_t = 18)]
    pub peptide_length: usize,

    #[arg(long = "index-aa-length", default_value_t = 0)]
    pub index_aa_length: usize,

    #[arg(long = "seed", default_value_t = 0)]
    pub seed: u64,

    /// Output report path (JSON or CSV by extension).
    #[arg(long = "out")]
    pub out: PathBuf,
}

fn build_scenarios(
    profiles: &[String],
    probs: &[f64],
    mode: SweepMode,
) -> Result<Vec<(String, f64)>> {
    match mode {
        SweepMode::Grid => Ok(profiles
            .iter()
            .flat_map(|p| probs.iter().map(move |&v| (p.clone(), v)))
            .collect()),
        SweepMode::Equal => {
            if profiles.len() != probs.len() {
                anyhow::bail!(
                    "equal mode requires matching lengths: {} profiles vs {} prob values",
                    profiles.len(),
                    probs.len()
                );
            }
            Ok(profiles.iter().cloned().zip(probs.iter().copied()).collect())
        }
    }
}

pub fn run(args: SweepArgs) -> Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("read input file {}", args.input.display()))?;

    let profiles: Vec<String> = args.profiles.split(',').map(|s| s.trim().to_string()).collect();
    let probs: Vec<f64> = args
        .prob_values
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .context("failed to parse --prob-values as floats")?;

    let scenarios = build_scenarios(&profiles, &probs, args.mode)?;

    let configs: Vec<EncodeConfig> = scenarios
        .iter()
        .map(|(profile, prob)| EncodeConfig {
            encoder: args.encoder.into(),
            peptide_length: args.peptide_length,
            index_aa_length: args.index_aa_length,
            rs_profile: profile.clone(),
            channel: ChannelConfig {
                loss_prob: *prob,
                seed: args.seed,
                ..ChannelConfig::default()
            },
            ..EncodeConfig::default()
        })
        .collect();

    let results = peptide_core::sweep(&data, &configs);

    let mut records = Vec::with_capacity(results.len());
    for ((profile, prob), result) in scenarios.iter().zip(results.into_iter()) {
        let label = format!("{profile}@{prob}");
        match result {
            Ok(metrics) => records.push(MetricsRecord::from_metrics(label, &metrics)),
            Err(e) => {
                eprintln!("scenario {label} failed: {e}");
            }
        }
    }

    match args.out.extension().and_then(|e| e.to_str()) {
        Some("csv") => report::write_csv(&args.out, &records)?,
        _ => report::write_json(&args.out, &records)?,
    }

    let summary = report::summarize(&records);
    println!(
        "{}/{} scenarios succeeded, mean bit_error_rate={:.6}, median={:.6} -> {}",
        summary.successes,
        summary.runs,
        summary.mean_bit_error_rate,
        summary.median_bit_error_rate,
        args.out.display(),
    );

    Ok(())
}
