// crates/peptide-core/src/pipeline.rs
//
// Top-level driver: dispatches on the chosen source codec, wires the
// ternary residue mapping, the peptide-level RS outer code, and the error
// channel together, and reports byte/bit-error metrics for a run or a sweep
// of runs.

use std::time::{Duration, Instant};

use crate::channel::{self, ChannelConfig};
use crate::codec::fountain::{self, FountainEncoded, FountainParams};
use crate::codec::huffman::{self, HuffmanEncoded};
use crate::codec::yin_yang::{self, YinYangEncoded};
use crate::error::{PeptideError, Result};
use crate::mapping::{self, PeptideMapping};
use crate::rs::peptide_rs::{
    self, deinterleave_sequence, interleave_sequence, RSEncodedPeptides, DEFAULT_DATA_BLOCK_SIZE,
};

/// Named Reed-Solomon profiles: (parity_symbols, interleave_depth).
pub const RS_PROFILES: &[(&str, usize, usize)] = &[
    ("none", 0, 1),
    ("rs4", 4, 1),
    ("rs8", 8, 1),
    ("rs16", 16, 1),
    ("rs32", 32, 1),
    ("rs64", 64, 1),
    ("rs64_int4", 64, 4),
    ("rs128", 128, 1),
    ("rs200", 200, 1),
    ("rs201", 201, 1),
    ("rs8_int4", 8, 4),
];

/// Named Fountain overhead profiles (fractional overhead above baseline).
pub const FOUNTAIN_PROFILES: &[(&str, f64)] = &[
    ("fnt05", 0.5),
    ("fnt10", 1.0),
    ("fnt20", 2.0),
    ("fnt30", 3.0),
    ("fnt50", 5.0),
    ("fnt75", 7.5),
    ("fnt100", 10.0),
    ("fnt150", 15.0),
    ("fnt200", 20.0),
];

pub fn rs_profile(name: &str) -> Result<(usize, usize)> {
    RS_PROFILES
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|(_, r, d)| (*r, *d))
        .ok_or_else(|| PeptideError::Config(format!("unknown RS profile '{name}'")))
}

pub fn fountain_overhead(name: &str) -> Result<f64> {
    FOUNTAIN_PROFILES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, o)| *o)
        .ok_or_else(|| PeptideError::Config(format!("unknown Fountain profile '{name}'")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceEncoder {
    Huffman,
    YinYang,
    Fountain,
}

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub encoder: SourceEncoder,
    pub peptide_length: usize,
    pub index_aa_length: usize,
    pub rs_profile: String,
    pub data_block_size: usize,
    pub fountain_symbol_size: usize,
    pub fountain_seed: u64,
    pub fountain_c: f64,
    pub fountain_delta: f64,
    pub fountain_profile: String,
    pub fountain_max_bytes: usize,
    pub fountain_seed_bytes: usize,
    pub fountain_degree_bytes: usize,
    pub fountain_crc_bytes: usize,
    pub channel: ChannelConfig,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        EncodeConfig {
            encoder: SourceEncoder::Huffman,
            peptide_length: 18,
            index_aa_length: 0,
            rs_profile: "none".into(),
            data_block_size: DEFAULT_DATA_BLOCK_SIZE,
            fountain_symbol_size: 4,
            fountain_seed: 1,
            fountain_c: 0.1,
            fountain_delta: 0.5,
            fountain_profile: "fnt20".into(),
            fountain_max_bytes: 1 << 20,
            fountain_seed_bytes: 4,
            fountain_degree_bytes: 1,
            fountain_crc_bytes: 4,
            channel: ChannelConfig::default(),
        }
    }
}

/// Source-codec-specific side information needed to invert the mapping back
/// to bytes once the RS/channel round-trip is done.
#[derive(Clone, Debug)]
pub enum SourceMeta {
    Huffman(HuffmanEncoded),
    YinYang { original_size_bytes: usize },
    Fountain {
        droplet_size_bytes: usize,
        droplet_count: usize,
        symbol_size: usize,
        pad_bytes: usize,
        k: usize,
        original_size: usize,
        seed_bytes: usize,
        degree_bytes: usize,
        crc_bytes: usize,
    },
}

#[derive(Clone, Debug)]
pub struct EncodedPipeline {
    pub rs: RSEncodedPeptides,
    pub source: SourceMeta,
}

fn encode_source(data: &[u8], cfg: &EncodeConfig) -> Result<(PeptideMapping, SourceMeta)> {
    match cfg.encoder {
        SourceEncoder::Huffman => {
            let encoded = huffman::huffman_encode(data);
            let mapping = mapping::bits_to_peptides(
                &encoded.bits,
                cfg.peptide_length,
                cfg.index_aa_length,
                true,
            )?;
            Ok((mapping, SourceMeta::Huffman(encoded)))
        }
        SourceEncoder::YinYang => {
            let encoded =
                yin_yang::yin_yang_encode(data, cfg.peptide_length, cfg.index_aa_length)?;
            let mapping = PeptideMapping {
                peptides: encoded.peptides,
                pad_bits: encoded.pad_bits,
                peptide_length: encoded.peptide_length,
                index_aa_length: encoded.index_aa_length,
            };
            Ok((
                mapping,
                SourceMeta::YinYang {
                    original_size_bytes: encoded.original_size_bytes,
                },
            ))
        }
        SourceEncoder::Fountain => {
            let params = FountainParams {
                peptide_length: cfg.peptide_length,
                index_aa_length: cfg.index_aa_length,
                max_bytes: cfg.fountain_max_bytes,
                seed_bytes: cfg.fountain_seed_bytes,
                degree_bytes: cfg.fountain_degree_bytes,
                crc_bytes: cfg.fountain_crc_bytes,
                symbol_size: cfg.fountain_symbol_size,
                c: cfg.fountain_c,
                delta: cfg.fountain_delta,
                overhead: fountain_overhead(&cfg.fountain_profile)?,
                seed: cfg.fountain_seed,
            };
            let encoded = fountain::fountain_encode(data, &params)?;
            let mapping = mapping::bits_to_peptides(
                &encoded.bits,
                cfg.peptide_length,
                cfg.index_aa_length,
                true,
            )?;
            Ok((
                mapping,
                SourceMeta::Fountain {
                    droplet_size_bytes: encoded.droplet_size_bytes,
                    droplet_count: encoded.droplet_count,
                    symbol_size: encoded.symbol_size,
                    pad_bytes: encoded.pad_bytes,
                    k: encoded.k,
                    original_size: encoded.original_size,
                    seed_bytes: encoded.seed_bytes,
                    degree_bytes: encoded.degree_bytes,
                    crc_bytes: encoded.crc_bytes,
                },
            ))
        }
    }
}

/// Encode `data` into RS-protected peptides. Returns the peptide sequence
/// (what would be "transmitted") and the metadata needed to decode it.
pub fn encode(data: &[u8], cfg: &EncodeConfig) -> Result<(Vec<String>, EncodedPipeline)> {
    let (mapping, source) = encode_source(data, cfg)?;
    let (parity_symbols, depth) = rs_profile(&cfg.rs_profile)?;

    if cfg.data_block_size + parity_symbols > 255 {
        return Err(PeptideError::Config(format!(
            "RS block would need {} symbols (K+r), exceeding the GF(256) limit of 255",
            cfg.data_block_size + parity_symbols
        )));
    }

    let interleaved_peptides = interleave_sequence(&mapping.peptides, depth);
    let interleaved_mapping = PeptideMapping {
        peptides: interleaved_peptides,
        ..mapping
    };

    let mut rs = peptide_rs::rs_encode_peptides(&interleaved_mapping, parity_symbols, cfg.data_block_size);
    rs.interleave_depth = depth;

    let peptides = rs.peptides.clone();
    Ok((peptides, EncodedPipeline { rs, source }))
}

fn decode_source(mapping: PeptideMapping, source: &SourceMeta) -> Vec<u8> {
    match source {
        SourceMeta::Huffman(template) => {
            let total = template.bits.len();
            let bits = mapping::peptides_to_bits_fixed(
                &mapping.peptides,
                mapping.peptide_length,
                mapping.index_aa_length,
                div_round_up(total, bits_per_peptide(mapping.peptide_length, mapping.index_aa_length)),
                mapping.pad_bits,
            )
            .unwrap_or_default();
            let bits = if bits.len() >= total {
                bits[..total].to_string()
            } else {
                let mut b = bits;
                b.push_str(&"0".repeat(total - b.len()));
                b
            };
            let encoded = HuffmanEncoded {
                bits,
                table: template.table.clone(),
            };
            huffman::huffman_decode(&encoded).unwrap_or_default()
        }
        SourceMeta::YinYang { original_size_bytes } => {
            let encoded = YinYangEncoded {
                peptides: mapping.peptides,
                pad_bits: mapping.pad_bits,
                peptide_length: mapping.peptide_length,
                index_aa_length: mapping.index_aa_length,
                original_size_bytes: *original_size_bytes,
                scheme_id: "yy_pairs_v1",
            };
            yin_yang::yin_yang_decode(&encoded).unwrap_or_default()
        }
        SourceMeta::Fountain {
            droplet_size_bytes,
            droplet_count,
            symbol_size,
            pad_bytes,
            k,
            original_size,
            seed_bytes,
            degree_bytes,
            crc_bytes,
        } => {
            let total_bits = droplet_size_bytes * droplet_count * 8;
            let total_peptides = div_round_up(
                total_bits,
                bits_per_peptide(mapping.peptide_length, mapping.index_aa_length),
            );
            let bits = mapping::peptides_to_bits_fixed(
                &mapping.peptides,
                mapping.peptide_length,
                mapping.index_aa_length,
                total_peptides,
                mapping.pad_bits,
            )
            .unwrap_or_default();
            let encoded = FountainEncoded {
                bits,
                droplet_size_bytes: *droplet_size_bytes,
                droplet_count: *droplet_count,
                symbol_size: *symbol_size,
                pad_bytes: *pad_bytes,
                k: *k,
                original_size: *original_size,
                seed_bytes: *seed_bytes,
                degree_bytes: *degree_bytes,
                crc_bytes: *crc_bytes,
            };
            fountain::fountain_decode(&encoded).ok().flatten().unwrap_or_default()
        }
    }
}

fn bits_per_peptide(peptide_length: usize, index_aa_length: usize) -> usize {
    (peptide_length - index_aa_length) * 3
}

fn div_round_up(a: usize, b: usize) -> usize {
    if b == 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

/// Decode RS-protected (possibly corrupted/reordered) peptides back to bytes.
/// Never fails past this boundary: an unrecoverable payload decodes to an
/// empty or mismatched byte vector, reflected by the caller's metrics rather
/// than a propagated error.
pub fn decode(received_peptides: &[String], encoded: &EncodedPipeline) -> Result<Vec<u8>> {
    let rs_recovered = peptide_rs::rs_decode_peptides(received_peptides, &encoded.rs)?;
    let mapping = if encoded.rs.interleave_depth > 1 {
        PeptideMapping {
            peptides: deinterleave_sequence(&rs_recovered.peptides, encoded.rs.interleave_depth),
            ..rs_recovered
        }
    } else {
        rs_recovered
    };
    Ok(decode_source(mapping, &encoded.source))
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunMetrics {
    pub original_size: usize,
    pub decoded_size: usize,
    pub success: bool,
    pub byte_errors: usize,
    pub bit_errors: usize,
    pub bit_error_rate: f64,
    pub encode_time: Duration,
    pub decode_time: Duration,
    pub data_units: usize,
    pub parity_units: usize,
    pub tx_units: usize,
    pub tx_residues_total: usize,
    pub payload_bit_capacity: usize,
    pub payload_bit_usefulness: f64,
}

fn byte_and_bit_errors(original: &[u8], decoded: &[u8]) -> (usize, usize) {
    let common = original.len().min(decoded.len());
    let mut byte_errors = 0usize;
    let mut bit_errors = 0usize;
    for i in 0..common {
        if original[i] != decoded[i] {
            byte_errors += 1;
            bit_errors += (original[i] ^ decoded[i]).count_ones() as usize;
        }
    }
    let mismatched_len = original.len().abs_diff(decoded.len());
    byte_errors += mismatched_len;
    bit_errors += mismatched_len * 8;
    (byte_errors, bit_errors)
}

/// Run one full encode -> channel -> decode round-trip, returning the
/// original peptides, the post-channel peptides, the decoded bytes, and
/// the computed metrics.
pub fn encode_and_decode(
    data: &[u8],
    cfg: &EncodeConfig,
) -> Result<(Vec<String>, Vec<String>, Vec<u8>, RunMetrics)> {
    let encode_start = Instant::now();
    let (original_peptides, encoded) = encode(data, cfg)?;
    let encode_time = encode_start.elapsed();

    let corrupted_peptides = channel::apply_peptide_errors(&original_peptides, &cfg.channel);

    let decode_start = Instant::now();
    let decoded = decode(&corrupted_peptides, &encoded)?;
    let decode_time = decode_start.elapsed();

    let (byte_errors, bit_errors) = byte_and_bit_errors(data, &decoded);
    let bit_error_rate = if data.is_empty() {
        0.0
    } else {
        bit_errors as f64 / (data.len() as f64 * 8.0)
    };

    let data_units = encoded
        .rs
        .metadata
        .iter()
        .filter(|m| !m.is_parity)
        .count();
    let parity_units = encoded.rs.metadata.iter().filter(|m| m.is_parity).count();
    let tx_units = original_peptides.len();
    let tx_residues_total: usize = original_peptides.iter().map(|p| p.chars().count()).sum();
    let payload_bit_capacity = data_units * bits_per_peptide(cfg.peptide_length, cfg.index_aa_length);
    let payload_bit_usefulness = if payload_bit_capacity == 0 {
        0.0
    } else {
        (data.len() * 8) as f64 / payload_bit_capacity as f64
    };

    let metrics = RunMetrics {
        original_size: data.len(),
        decoded_size: decoded.len(),
        success: decoded == data,
        byte_errors,
        bit_errors,
        bit_error_rate,
        encode_time,
        decode_time,
        data_units,
        parity_units,
        tx_units,
        tx_residues_total,
        payload_bit_capacity,
        payload_bit_usefulness,
    };

    Ok((original_peptides, corrupted_peptides, decoded, metrics))
}

/// Run a sequence of scenarios (each a full config) against the same payload
/// and collect one `RunMetrics` per scenario, in order.
pub fn sweep(data: &[u8], scenarios: &[EncodeConfig]) -> Vec<Result<RunMetrics>> {
    scenarios
        .iter()
        .map(|cfg| encode_and_decode(data, cfg).map(|(_, _, _, metrics)| metrics))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_for(encoder: SourceEncoder, profile: &str) -> EncodeConfig {
        EncodeConfig {
            encoder,
            peptide_length: 18,
            index_aa_length: 3,
            rs_profile: profile.into(),
            channel: ChannelConfig {
                loss_prob: 0.0,
                mutation_prob: 0.0,
                insertion_prob: 0.0,
                shuffle_prob: 0.0,
                ..ChannelConfig::default()
            },
            ..EncodeConfig::default()
        }
    }

    #[test]
    fn huffman_noiseless_roundtrip() {
        let data = b"hello peptide!";
        let cfg = cfg_for(SourceEncoder::Huffman, "none");
        let (_, _, decoded, metrics) = encode_and_decode(data, &cfg).unwrap();
        assert_eq!(decoded, data);
        assert!(metrics.success);
        assert_eq!(metrics.bit_error_rate, 0.0);
    }

    #[test]
    fn yin_yang_noiseless_roundtrip() {
        let data = b"hello peptide!";
        let cfg = cfg_for(SourceEncoder::YinYang, "none");
        let (_, _, decoded, metrics) = encode_and_decode(data, &cfg).unwrap();
        assert_eq!(decoded, data);
        assert!(metrics.success);
    }

    #[test]
    fn fountain_noiseless_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
        let mut cfg = cfg_for(SourceEncoder::Fountain, "none");
        cfg.index_aa_length = 0;
        cfg.fountain_profile = "fnt20".into();
        cfg.fountain_seed = 2024;
        let (_, _, decoded, metrics) = encode_and_decode(&data, &cfg).unwrap();
        assert_eq!(decoded, data);
        assert!(metrics.success);
    }

    #[test]
    fn rs_corrects_a_full_peptide_flip() {
        let data = b"peptide-rs-symbol";
        let mut cfg = cfg_for(SourceEncoder::Huffman, "rs4");
        cfg.peptide_length = 6;
        cfg.index_aa_length = 0;
        let (original_peptides, encoded) = encode(data, &cfg).unwrap();
        let mut corrupted = original_peptides.clone();
        // flip residue 0 of peptide 0 to something else in the alphabet.
        let mut chars: Vec<char> = corrupted[0].chars().collect();
        chars[0] = if chars[0] == 'A' { 'V' } else { 'A' };
        corrupted[0] = chars.into_iter().collect();
        let decoded = decode(&corrupted, &encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn channel_is_idempotent_at_zero_probability() {
        let data: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
        let cfg = cfg_for(SourceEncoder::Huffman, "rs8");
        let (original_peptides, corrupted_peptides, decoded, _) =
            encode_and_decode(&data, &cfg).unwrap();
        assert_eq!(original_peptides, corrupted_peptides);
        assert_eq!(decoded, data);
    }

    #[test]
    fn unknown_rs_profile_is_a_config_error() {
        let cfg = cfg_for(SourceEncoder::Huffman, "rs9000");
        assert!(encode(b"x", &cfg).is_err());
    }

    #[test]
    fn sweep_runs_each_scenario_independently() {
        let data = b"sweep payload";
        let scenarios = vec![
            cfg_for(SourceEncoder::Huffman, "none"),
            cfg_for(SourceEncoder::Huffman, "rs4"),
            cfg_for(SourceEncoder::YinYang, "rs8"),
        ];
        let results = sweep(data, &scenarios);
        assert_eq!(results.len(), 3);
        for r in results {
            assert!(r.unwrap().success);
        }
    }
}
