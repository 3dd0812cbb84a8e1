// crates/peptide-cli/src/io/persist.rs
//
// On-disk representation of an `EncodedPipeline`: one peptide per line in
// `peptides.txt`, everything needed to invert the mapping in `meta.json`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use peptide_core::codec::huffman::{HuffmanEncoded, HuffmanTable};
use peptide_core::rs::peptide_rs::{PeptideMeta, RSEncodedPeptides};
use peptide_core::{EncodedPipeline, SourceMeta};

#[derive(Serialize, Deserialize)]
struct PersistedMeta {
    encoder: String,
    rs_profile: String,
    peptide_length: usize,
    index_aa_length: usize,
    data_lengths: Vec<usize>,
    pad_bits: usize,
    parity_symbols: usize,
    interleave_depth: usize,
    data_block_size: usize,
    metadata: Vec<(usize, usize, bool)>,
    source: PersistedSource,
}

#[derive(Serialize, Deserialize)]
enum PersistedSource {
    Huffman {
        pairs: Vec<(Option<u8>, String)>,
    },
    YinYang {
        original_size_bytes: usize,
    },
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

pub fn save(dir: &std::path::Path, encoded: &EncodedPipeline, rs_profile: &str) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;

    let peptides_path = dir.join("peptides.txt");
    std::fs::write(&peptides_path, encoded.rs.peptides.join("\n"))
        .with_context(|| format!("write {}", peptides_path.display()))?;

    let (encoder, source) = match &encoded.source {
        SourceMeta::Huffman(h) => ("huffman", PersistedSource::Huffman { pairs: h.table.to_pairs() }),
        SourceMeta::YinYang { original_size_bytes } => (
            "yin_yang",
            PersistedSource::YinYang {
                original_size_bytes: *original_size_bytes,
            },
        ),
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
        } => (
            "fountain",
            PersistedSource::Fountain {
                droplet_size_bytes: *droplet_size_bytes,
                droplet_count: *droplet_count,
                symbol_size: *symbol_size,
                pad_bytes: *pad_bytes,
                k: *k,
                original_size: *original_size,
                seed_bytes: *seed_bytes,
                degree_bytes: *degree_bytes,
                crc_bytes: *crc_bytes,
            },
        ),
    };

    let meta = PersistedMeta {
        encoder: encoder.into(),
        rs_profile: rs_profile.into(),
        peptide_length: encoded.rs.peptide_length,
        index_aa_length: encoded.rs.index_aa_length,
        data_lengths: encoded.rs.data_lengths.clone(),
        pad_bits: encoded.rs.pad_bits,
        parity_symbols: encoded.rs.parity_symbols,
        interleave_depth: encoded.rs.interleave_depth,
        data_block_size: encoded.rs.data_block_size,
        metadata: encoded
            .rs
            .metadata
            .iter()
            .map(|m| (m.block_id, m.index_in_block, m.is_parity))
            .collect(),
        source,
    };

    let meta_path = dir.join("meta.json");
    let json = serde_json::to_string_pretty(&meta)?;
    std::fs::write(&meta_path, json).with_context(|| format!("write {}", meta_path.display()))?;

    Ok(())
}

pub fn load(dir: &std::path::Path) -> Result<(Vec<String>, EncodedPipeline)> {
    let peptides_path = dir.join("peptides.txt");
    let peptides_raw = std::fs::read_to_string(&peptides_path)
        .with_context(|| format!("read {}", peptides_path.display()))?;
    let peptides: Vec<String> = if peptides_raw.is_empty() {
        vec![]
    } else {
        peptides_raw.lines().map(|s| s.to_string()).collect()
    };

    let meta_path = dir.join("meta.json");
    let meta_raw = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("read {}", meta_path.display()))?;
    let meta: PersistedMeta = serde_json::from_str(&meta_raw)
        .with_context(|| format!("parse {}", meta_path.display()))?;

    let huffman_bits = rebuild_huffman_bits(&peptides, &meta);
    let source = match meta.source {
        PersistedSource::Huffman { pairs } => {
            let bits = huffman_bits;
            SourceMeta::Huffman(HuffmanEncoded {
                bits,
                table: HuffmanTable::from_pairs(&pairs),
            })
        }
        PersistedSource::YinYang { original_size_bytes } => SourceMeta::YinYang { original_size_bytes },
        PersistedSource::Fountain {
            droplet_size_bytes,
            droplet_count,
            symbol_size,
            pad_bytes,
            k,
            original_size,
            seed_bytes,
            degree_bytes,
            crc_bytes,
        } => SourceMeta::Fountain {
            droplet_size_bytes,
            droplet_count,
            symbol_size,
            pad_bytes,
            k,
            original_size,
            seed_bytes,
            degree_bytes,
            crc_bytes,
        },
    };

    let rs = RSEncodedPeptides {
        peptides: peptides.clone(),
        data_lengths: meta.data_lengths,
        pad_bits: meta.pad_bits,
        peptide_length: meta.peptide_length,
        index_aa_length: meta.index_aa_length,
        parity_symbols: meta.parity_symbols,
        interleave_depth: meta.interleave_depth,
        metadata: meta
            .metadata
            .into_iter()
            .map(|(block_id, index_in_block, is_parity)| PeptideMeta {
                block_id,
                index_in_block,
                is_parity,
            })
            .collect(),
        data_block_size: meta.data_block_size,
    };

    Ok((peptides, EncodedPipeline { rs, source }))
}

// Huffman's `bits` field on `HuffmanEncoded` is only used by the pipeline
// decoder to know how many peptides to expect back; its exact content
// doesn't matter as long as its length matches the original encoded bit
// count, which we don't persist directly but can recompute from the data
// peptides and payload width.
fn rebuild_huffman_bits(_peptides: &[String], meta: &PersistedMeta) -> String {
    let payload_len = meta.peptide_length - meta.index_aa_length;
    let data_count = meta.data_lengths.len();
    "0".repeat(data_count * payload_len * 3)
}
