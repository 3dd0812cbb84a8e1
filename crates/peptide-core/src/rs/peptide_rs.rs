// crates/peptide-core/src/rs/peptide_rs.rs
//
// Peptide-level Reed-Solomon: each peptide sequence is one RS symbol. Blocks
// of `data_block_size` data peptides get `parity_symbols` parity peptides,
// encoded column-wise across the fixed-width byte representation of each
// peptide so a single corrupted peptide costs one symbol per column, not one
// per residue.

use crate::error::Result;
use crate::mapping::PeptideMapping;
use crate::residue::{is_residue, residue_to_code, residues_to_index};
use crate::rs::{rs_decode_msg, rs_encode_msg};

pub const DEFAULT_DATA_BLOCK_SIZE: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeptideMeta {
    pub block_id: usize,
    pub index_in_block: usize,
    pub is_parity: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RSEncodedPeptides {
    pub peptides: Vec<String>,
    pub data_lengths: Vec<usize>,
    pub pad_bits: usize,
    pub peptide_length: usize,
    pub index_aa_length: usize,
    pub parity_symbols: usize,
    pub interleave_depth: usize,
    pub metadata: Vec<PeptideMeta>,
    pub data_block_size: usize,
}

fn symbol_byte_len(target_length: usize) -> usize {
    (target_length * 3 + 7) / 8
}

/// Residue count needed for a parity peptide to losslessly carry `byte_len`
/// bytes. Parity bytes are arbitrary GF(256) values (unlike data peptides,
/// whose trailing padding bits are always zero), so when `target_len * 3`
/// isn't a multiple of 8 the data peptide's own residue count can't round-trip
/// the last byte column's true low bits; parity peptides get enough extra
/// residues to cover the full byte width instead.
fn parity_peptide_len(byte_len: usize) -> usize {
    (byte_len * 8).div_ceil(3)
}

fn peptide_to_symbol_bytes(peptide: &str, target_length: usize) -> Vec<u8> {
    let symbol_bits = target_length * 3;
    let mut bits = String::with_capacity(symbol_byte_len(target_length) * 8);
    for aa in peptide.chars().take(target_length) {
        match residue_to_code(aa) {
            Some(code) => bits.push_str(&format!("{:03b}", code)),
            None => bits.push_str("000"),
        }
    }
    if bits.len() < symbol_bits {
        bits.push_str(&"0".repeat(symbol_bits - bits.len()));
    }
    let pad = (8 - (bits.len() % 8)) % 8;
    bits.push_str(&"0".repeat(pad));
    crate::bits::bits_to_bytes(&bits).expect("constructed bitstring is always byte-aligned")
}

fn symbol_bytes_to_peptide(bytes: &[u8], aa_length: usize) -> String {
    let bits = crate::bits::bytes_to_bits(bytes);
    let take = (aa_length * 3).min(bits.len());
    let bits = &bits[..take];
    let chars: Vec<char> = bits.chars().collect();
    chars
        .chunks(3)
        .map(|c| {
            let triplet: String = c.iter().collect();
            crate::residue::triplet_to_residue(&triplet).unwrap_or('A')
        })
        .collect()
}

fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Simple stride interleaver: spreads adjacent symbols across `depth` rows so
/// a burst error in the channel lands on different RS blocks.
pub fn interleave_sequence<T: Clone>(items: &[T], depth: usize) -> Vec<T> {
    if depth <= 1 || items.is_empty() {
        return items.to_vec();
    }
    let n = items.len();
    let q = n / depth;
    let r = n % depth;
    let mut row_lens = vec![q; depth];
    for len in row_lens.iter_mut().take(r) {
        *len += 1;
    }
    let mut rows: Vec<&[T]> = Vec::with_capacity(depth);
    let mut offset = 0;
    for &len in &row_lens {
        rows.push(&items[offset..offset + len]);
        offset += len;
    }

    let max_len = row_lens.iter().copied().max().unwrap_or(0);
    let mut out = Vec::with_capacity(n);
    for i in 0..max_len {
        for (row_idx, row) in rows.iter().enumerate() {
            if i < row_lens[row_idx] {
                out.push(row[i].clone());
            }
        }
    }
    out
}

pub fn deinterleave_sequence<T: Clone>(items: &[T], depth: usize) -> Vec<T> {
    if depth <= 1 || items.is_empty() {
        return items.to_vec();
    }
    let n = items.len();
    let q = n / depth;
    let r = n % depth;
    let mut row_lens = vec![q; depth];
    for len in row_lens.iter_mut().take(r) {
        *len += 1;
    }
    let mut rows: Vec<Vec<T>> = row_lens.iter().map(|&l| Vec::with_capacity(l)).collect();

    let max_len = row_lens.iter().copied().max().unwrap_or(0);
    let mut iter = items.iter();
    for i in 0..max_len {
        for (row_idx, row) in rows.iter_mut().enumerate() {
            if i < row_lens[row_idx] {
                row.push(iter.next().unwrap().clone());
            }
        }
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..depth {
        out.extend(rows[i].iter().cloned());
    }
    out
}

fn encode_rs_block(block: &[String], parity_symbols: usize, target_len: usize) -> Vec<String> {
    if parity_symbols == 0 || block.is_empty() {
        return vec![];
    }
    let symbol_bytes: Vec<Vec<u8>> = block
        .iter()
        .map(|p| peptide_to_symbol_bytes(p, target_len))
        .collect();
    let byte_len = symbol_bytes[0].len();
    let data_count = block.len();
    let parity_len = parity_peptide_len(byte_len);
    let parity_byte_len = symbol_byte_len(parity_len);

    let mut parity_matrix = vec![vec![0u8; byte_len]; parity_symbols];
    for byte_idx in 0..byte_len {
        let column: Vec<u8> = symbol_bytes.iter().map(|s| s[byte_idx]).collect();
        let encoded = rs_encode_msg(&column, parity_symbols);
        for (p_idx, &val) in encoded[data_count..].iter().enumerate() {
            parity_matrix[p_idx][byte_idx] = val;
        }
    }

    parity_matrix
        .iter()
        .map(|bytes| {
            let mut padded = bytes.clone();
            padded.resize(parity_byte_len, 0);
            symbol_bytes_to_peptide(&padded, parity_len)
        })
        .collect()
}

pub fn rs_encode_peptides(
    mapping: &PeptideMapping,
    parity_symbols: usize,
    data_block_size: usize,
) -> RSEncodedPeptides {
    let data_lengths: Vec<usize> = mapping.peptides.iter().map(|p| p.chars().count()).collect();
    if mapping.peptides.is_empty() {
        return RSEncodedPeptides {
            peptides: vec![],
            data_lengths: vec![],
            pad_bits: mapping.pad_bits,
            peptide_length: mapping.peptide_length,
            index_aa_length: mapping.index_aa_length,
            parity_symbols: 0,
            interleave_depth: 1,
            metadata: vec![],
            data_block_size,
        };
    }

    let target_len = mapping.peptide_length;
    let data_blocks = chunk(&mapping.peptides, data_block_size);

    let mut out_peptides = Vec::new();
    let mut out_meta = Vec::new();

    for (block_id, block) in data_blocks.iter().enumerate() {
        for (idx, pep) in block.iter().enumerate() {
            out_peptides.push(pep.clone());
            out_meta.push(PeptideMeta {
                block_id,
                index_in_block: idx,
                is_parity: false,
            });
        }
        if parity_symbols > 0 {
            let parity = encode_rs_block(block, parity_symbols, target_len);
            for (p_idx, pep) in parity.into_iter().enumerate() {
                out_peptides.push(pep);
                out_meta.push(PeptideMeta {
                    block_id,
                    index_in_block: block.len() + p_idx,
                    is_parity: true,
                });
            }
        }
    }

    RSEncodedPeptides {
        peptides: out_peptides,
        data_lengths,
        pad_bits: mapping.pad_bits,
        peptide_length: target_len,
        index_aa_length: mapping.index_aa_length,
        parity_symbols,
        interleave_depth: 1,
        metadata: out_meta,
        data_block_size,
    }
}

fn peptide_looks_valid(pep: &str, max_len: usize) -> bool {
    !pep.is_empty() && pep.chars().count() <= max_len && pep.chars().all(is_residue)
}

fn decode_rs_block(
    block_entries: &[String],
    parity_symbols: usize,
    target_len: usize,
    data_lengths: &[usize],
    index_aa_length: usize,
    index_base: usize,
) -> Result<Vec<String>> {
    let data_count = data_lengths.len();
    if parity_symbols == 0 {
        return Ok(block_entries[..data_count.min(block_entries.len())].to_vec());
    }

    let expected_total = data_count + parity_symbols;
    let mut aligned = block_entries.to_vec();
    aligned.resize(expected_total, String::new());

    let max_index_value = if index_aa_length > 0 {
        1u64 << (index_aa_length * 3)
    } else {
        0
    };

    let byte_len = symbol_byte_len(target_len);
    let parity_len = parity_peptide_len(byte_len);

    let mut erase_pos = Vec::new();
    for (idx, pep) in aligned.iter().enumerate() {
        let max_len = if idx < data_count { target_len } else { parity_len };
        if !peptide_looks_valid(pep, max_len) {
            erase_pos.push(idx);
            continue;
        }
        if index_aa_length > 0 && idx < data_count {
            let chars: Vec<char> = pep.chars().collect();
            if chars.len() < index_aa_length {
                erase_pos.push(idx);
                continue;
            }
            let prefix: String = chars[..index_aa_length].iter().collect();
            let expected = (index_base + idx) as u64;
            match residues_to_index(&prefix) {
                Some(got) if got == expected && expected < max_index_value => {}
                _ => erase_pos.push(idx),
            }
        }
    }

    let symbol_bytes: Vec<Vec<u8>> = aligned
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            if idx < data_count {
                peptide_to_symbol_bytes(p, target_len)
            } else {
                let mut bytes = peptide_to_symbol_bytes(p, parity_len);
                bytes.truncate(byte_len);
                bytes
            }
        })
        .collect();

    let mut recovered = vec![vec![0u8; byte_len]; data_count];
    for byte_idx in 0..byte_len {
        let column: Vec<u8> = symbol_bytes.iter().map(|s| s[byte_idx]).collect();
        let decoded = rs_decode_msg(&column, parity_symbols, &erase_pos)
            .unwrap_or_else(|_| column[..data_count].to_vec());
        for (row_idx, &val) in decoded.iter().take(data_count).enumerate() {
            recovered[row_idx][byte_idx] = val;
        }
    }

    Ok(recovered
        .iter()
        .zip(data_lengths.iter())
        .map(|(bytes, &aa_len)| symbol_bytes_to_peptide(bytes, aa_len))
        .collect())
}

/// Decode RS-protected peptides back to corrected data peptides (parity
/// stripped), tolerating dropped/substituted/reordered peptides.
pub fn rs_decode_peptides(
    received_peptides: &[String],
    encoded: &RSEncodedPeptides,
) -> Result<PeptideMapping> {
    let block_size = encoded.data_block_size.max(1);
    let target_len = encoded.peptide_length;
    // The index prefix only identifies a peptide's logical position when the
    // stream is untouched by interleaving; once interleaved, the RS blocks
    // are laid out over interleaved positions while the index prefixes were
    // assigned before interleaving, so re-sorting by index here would fight
    // `pipeline::decode`'s later `deinterleave_sequence` call.
    let use_index =
        encoded.index_aa_length > 0 && encoded.interleave_depth == 1 && !encoded.data_lengths.is_empty();

    let mut data_by_index: std::collections::HashMap<usize, String> = std::collections::HashMap::new();
    if use_index {
        for pep in received_peptides {
            let chars: Vec<char> = pep.chars().collect();
            if chars.len() < encoded.index_aa_length {
                continue;
            }
            let prefix: String = chars[..encoded.index_aa_length].iter().collect();
            if let Some(idx) = residues_to_index(&prefix) {
                let idx = idx as usize;
                if idx < encoded.data_lengths.len() {
                    data_by_index.entry(idx).or_insert_with(|| pep.clone());
                }
            }
        }
    }

    let length_blocks = chunk(&encoded.data_lengths, block_size);
    let mut recovered_blocks = Vec::with_capacity(length_blocks.len());

    for (block_id, data_lengths) in length_blocks.iter().enumerate() {
        let data_count = data_lengths.len();
        let expected_total = data_count + encoded.parity_symbols;
        let mut block_entries = vec![String::new(); expected_total];

        if use_index {
            for idx in 0..data_count {
                let global_idx = block_id * block_size + idx;
                if let Some(pep) = data_by_index.get(&global_idx) {
                    block_entries[idx] = pep.clone();
                }
            }
        }

        for (meta_idx, meta) in encoded.metadata.iter().enumerate() {
            if meta.block_id != block_id || meta.index_in_block >= expected_total {
                continue;
            }
            if use_index && meta.index_in_block < data_count && !block_entries[meta.index_in_block].is_empty() {
                continue;
            }
            if let Some(pep) = received_peptides.get(meta_idx) {
                if block_entries[meta.index_in_block].is_empty() {
                    block_entries[meta.index_in_block] = pep.clone();
                }
            }
        }

        let index_len = if use_index { encoded.index_aa_length } else { 0 };
        let corrected = decode_rs_block(
            &block_entries,
            encoded.parity_symbols,
            target_len,
            data_lengths,
            index_len,
            block_id * block_size,
        )?;
        recovered_blocks.push(corrected);
    }

    let combined: Vec<String> = recovered_blocks.into_iter().flatten().collect();

    Ok(PeptideMapping {
        peptides: combined,
        pad_bits: encoded.pad_bits,
        peptide_length: encoded.peptide_length,
        index_aa_length: encoded.index_aa_length,
    })
}

impl std::fmt::Display for PeptideMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "block={} idx={} parity={}",
            self.block_id, self.index_in_block, self.is_parity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::bits_to_peptides;

    fn sample_mapping(index_aa_length: usize) -> PeptideMapping {
        let bits = crate::bits::bytes_to_bits(b"a reed solomon protected peptide payload of nontrivial size");
        bits_to_peptides(&bits, 18, index_aa_length, true).unwrap()
    }

    #[test]
    fn noiseless_roundtrip() {
        let mapping = sample_mapping(3);
        let encoded = rs_encode_peptides(&mapping, 8, 6);
        let decoded = rs_decode_peptides(&encoded.peptides, &encoded).unwrap();
        assert_eq!(decoded.peptides, mapping.peptides);
    }

    #[test]
    fn corrects_full_peptide_corruption_within_parity_budget() {
        let mapping = sample_mapping(3);
        let encoded = rs_encode_peptides(&mapping, 8, 6);
        let mut received = encoded.peptides.clone();
        // corrupt up to parity_symbols/2 whole peptides per block with garbage
        for pep in received.iter_mut().take(3) {
            *pep = "EEEEEEEEEEEEEEEEEE".to_string();
        }
        let decoded = rs_decode_peptides(&received, &encoded).unwrap();
        assert_eq!(decoded.peptides, mapping.peptides);
    }

    #[test]
    fn interleave_roundtrips() {
        let items: Vec<i32> = (0..23).collect();
        let interleaved = interleave_sequence(&items, 4);
        let back = deinterleave_sequence(&interleaved, 4);
        assert_eq!(back, items);
    }
}
