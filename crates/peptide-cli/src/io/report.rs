// crates/peptide-cli/src/io/report.rs
//
// CSV/JSON writers for `RunMetrics`.

use anyhow::{Context, Result};
use serde::Serialize;

use peptide_core::RunMetrics;

#[derive(Serialize)]
pub struct MetricsRecord {
    pub scenario: String,
    pub original_size: usize,
    pub decoded_size: usize,
    pub success: bool,
    pub byte_errors: usize,
    pub bit_errors: usize,
    pub bit_error_rate: f64,
    pub encode_time_ms: f64,
    pub decode_time_ms: f64,
    pub data_units: usize,
    pub parity_units: usize,
    pub tx_units: usize,
    pub tx_residues_total: usize,
    pub payload_bit_capacity: usize,
    pub payload_bit_usefulness: f64,
}

impl MetricsRecord {
    pub fn from_metrics(scenario: impl Into<String>, m: &RunMetrics) -> Self {
        MetricsRecord {
            scenario: scenario.into(),
            original_size: m.original_size,
            decoded_size: m.decoded_size,
            success: m.success,
            byte_errors: m.byte_errors,
            bit_errors: m.bit_errors,
            bit_error_rate: m.bit_error_rate,
            encode_time_ms: m.encode_time.as_secs_f64() * 1000.0,
            decode_time_ms: m.decode_time.as_secs_f64() * 1000.0,
            data_units: m.data_units,
            parity_units: m.parity_units,
            tx_units: m.tx_units,
            tx_residues_total: m.tx_residues_total,
            payload_bit_capacity: m.payload_bit_capacity,
            payload_bit_usefulness: m.payload_bit_usefulness,
        }
    }
}

pub fn write_json(path: &std::path::Path, records: &[MetricsRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))
}

pub fn write_csv(path: &std::path::Path, records: &[MetricsRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("open {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Summary statistics over a batch of runs: success rate, mean/median
/// bit-error-rate.
pub struct SweepSummary {
    pub runs: usize,
    pub successes: usize,
    pub mean_bit_error_rate: f64,
    pub median_bit_error_rate: f64,
}

pub fn summarize(records: &[MetricsRecord]) -> SweepSummary {
    let runs = records.len();
    let successes = records.iter().filter(|r| r.success).count();
    let mut rates: Vec<f64> = records.iter().map(|r| r.bit_error_rate).collect();
    rates.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mean = if rates.is_empty() {
        0.0
    } else {
        rates.iter().sum::<f64>() / rates.len() as f64
    };
    let median = if rates.is_empty() {
        0.0
    } else if rates.len() % 2 == 1 {
        rates[rates.len() / 2]
    } else {
        (rates[rates.len() / 2 - 1] + rates[rates.len() / 2]) / 2.0
    };
    SweepSummary {
        runs,
        successes,
        mean_bit_error_rate: mean,
        median_bit_error_rate: median,
    }
}
