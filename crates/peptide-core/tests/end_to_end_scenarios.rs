// End-to-end pipeline scenarios: each mirrors a literal encoder/profile/channel
// combination a caller would actually configure, not a synthetic unit probe.

use peptide_core::channel::{ChannelConfig, LossMode};
use peptide_core::{encode, encode_and_decode, EncodeConfig, SourceEncoder};

fn zero_noise_channel() -> ChannelConfig {
    ChannelConfig {
        loss_prob: 0.0,
        mutation_prob: 0.0,
        insertion_prob: 0.0,
        shuffle_prob: 0.0,
        ..ChannelConfig::default()
    }
}

#[test]
fn huffman_noiseless_roundtrip() {
    let data = b"hello peptide!";
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Huffman,
        peptide_length: 18,
        index_aa_length: 0,
        rs_profile: "none".into(),
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (_, _, decoded, metrics) = encode_and_decode(data, &cfg).unwrap();
    assert_eq!(decoded, data);
    assert!(metrics.success);
    assert_eq!(metrics.bit_error_rate, 0.0);
}

#[test]
fn yin_yang_noiseless_roundtrip_respects_caps() {
    let data = b"hello peptide!";
    let cfg = EncodeConfig {
        encoder: SourceEncoder::YinYang,
        peptide_length: 18,
        index_aa_length: 0,
        rs_profile: "none".into(),
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (peptides, _, decoded, metrics) = encode_and_decode(data, &cfg).unwrap();
    assert_eq!(decoded, data);
    assert!(metrics.success);
    for pep in &peptides {
        let aromatic_or_e = pep.chars().filter(|c| matches!(c, 'F' | 'Y' | 'E')).count();
        assert!(aromatic_or_e * 2 <= pep.chars().count() + 1, "cap exceeded in {pep}");
        let mut run = 1usize;
        let chars: Vec<char> = pep.chars().collect();
        for w in chars.windows(2) {
            if w[0] == w[1] {
                run += 1;
                assert!(run <= 2, "run > 2 in {pep}");
            } else {
                run = 1;
            }
        }
    }
}

#[test]
fn fountain_noiseless_roundtrip_on_varied_payload() {
    let data: Vec<u8> = (0..4096u32).map(|i| (i % 256) as u8).collect();
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Fountain,
        peptide_length: 18,
        index_aa_length: 0,
        rs_profile: "none".into(),
        fountain_profile: "fnt20".into(),
        fountain_seed: 2024,
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (_, _, decoded, metrics) = encode_and_decode(&data, &cfg).unwrap();
    assert_eq!(decoded, data);
    assert!(metrics.success);
}

#[test]
fn rs_corrects_a_full_peptide_flip() {
    let data = b"peptide-rs-symbol";
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Huffman,
        peptide_length: 6,
        index_aa_length: 0,
        rs_profile: "rs4".into(),
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (original_peptides, encoded) = encode(data.as_slice(), &cfg).unwrap();
    let mut corrupted = original_peptides.clone();
    let mut chars: Vec<char> = corrupted[0].chars().collect();
    chars[0] = if chars[0] == 'A' { 'E' } else { 'A' };
    corrupted[0] = chars.into_iter().collect();

    let decoded = peptide_core::pipeline::decode(&corrupted, &encoded).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn rs_preserves_misaligned_symbol_padding() {
    // peptide_length=5 -> 15 bits/peptide, not byte-aligned: the RS parity
    // column's trailing padding bits carry real information and must survive
    // a full-peptide substitution.
    let data = b"pad-bit-coverage";
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Huffman,
        peptide_length: 5,
        index_aa_length: 0,
        rs_profile: "rs4".into(),
        data_block_size: 1,
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (original_peptides, encoded) = encode(data.as_slice(), &cfg).unwrap();
    let mut corrupted = original_peptides.clone();
    let mut chars: Vec<char> = corrupted[0].chars().collect();
    chars[0] = if chars[0] == 'A' { 'E' } else { 'A' };
    corrupted[0] = chars.into_iter().collect();

    let decoded = peptide_core::pipeline::decode(&corrupted, &encoded).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn indexed_interleaved_rs_roundtrips_on_a_clean_channel() {
    // index_aa_length > 0 together with an interleaved RS profile (d=4):
    // the index prefix only identifies logical position pre-interleave, so
    // decode must fall back to positional placement rather than re-sorting
    // by index, matching spec's "index prefix usable only when d=1" rule.
    let data = b"indexed and interleaved peptide payload for regression coverage";
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Huffman,
        peptide_length: 18,
        index_aa_length: 3,
        rs_profile: "rs8_int4".into(),
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (_, _, decoded, metrics) = encode_and_decode(data, &cfg).unwrap();
    assert_eq!(decoded, data);
    assert!(metrics.success);
}

#[test]
fn channel_idempotence_at_zero_probability() {
    let data: Vec<u8> = (0..1024u32).map(|i| (i * 37 % 256) as u8).collect();
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Huffman,
        peptide_length: 18,
        index_aa_length: 3,
        rs_profile: "rs8".into(),
        channel: zero_noise_channel(),
        ..EncodeConfig::default()
    };
    let (original_peptides, corrupted_peptides, decoded, metrics) =
        encode_and_decode(&data, &cfg).unwrap();
    assert_eq!(original_peptides, corrupted_peptides);
    assert_eq!(decoded, data);
    assert!(metrics.success);
}

#[test]
fn fountain_survives_a_peptide_erasure_channel() {
    let data: Vec<u8> = (0..2048u32).map(|i| (i * 7 % 256) as u8).collect();
    let cfg = EncodeConfig {
        encoder: SourceEncoder::Fountain,
        peptide_length: 18,
        index_aa_length: 0,
        rs_profile: "none".into(),
        fountain_profile: "fnt100".into(),
        fountain_seed: 7,
        channel: ChannelConfig {
            loss_prob: 0.2,
            mutation_prob: 0.0,
            insertion_prob: 0.0,
            shuffle_prob: 0.0,
            loss_mode: LossMode::Peptide,
            drop_empty: false,
            seed: 42,
            ..ChannelConfig::default()
        },
        ..EncodeConfig::default()
    };
    let (_, _, decoded, metrics) = encode_and_decode(&data, &cfg).unwrap();
    assert_eq!(decoded, data);
    assert!(metrics.success);
}
