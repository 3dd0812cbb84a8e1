// crates/peptide-core/src/mapping.rs
//
// bits <-> peptides: chunking a residue bitstream into fixed-length peptides,
// with an optional big-endian index-residue prefix for out-of-order recovery.

use crate::error::{PeptideError, Result};
use crate::residue::{index_to_residues, residue_to_code, residues_to_index};

/// Result of mapping a bitstring to peptide sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeptideMapping {
    pub peptides: Vec<String>,
    pub pad_bits: usize,
    pub peptide_length: usize,
    pub index_aa_length: usize,
}

fn chunk_string(s: &str, size: usize) -> Vec<String> {
    if size == 0 {
        return vec![];
    }
    let chars: Vec<char> = s.chars().collect();
    chars
        .chunks(size)
        .map(|c| c.iter().collect())
        .collect()
}

/// Map a bitstring to peptide sequences per spec: pad to a multiple of 3,
/// translate to residues, optionally pad to a whole number of peptides, then
/// chunk into peptides with an optional index-residue prefix.
pub fn bits_to_peptides(
    bits: &str,
    peptide_length: usize,
    index_aa_length: usize,
    pad_to_full_peptide: bool,
) -> Result<PeptideMapping> {
    if !bits.chars().all(|c| c == '0' || c == '1') {
        return Err(PeptideError::InvalidLength(
            "bits_to_peptides expects a bitstring containing only '0' and '1'".into(),
        ));
    }
    if index_aa_length > peptide_length {
        return Err(PeptideError::Config(
            "index_aa_length must be between 0 and peptide_length".into(),
        ));
    }

    let payload_len = peptide_length
        .checked_sub(index_aa_length)
        .filter(|&p| p > 0)
        .ok_or_else(|| {
            PeptideError::Config("peptide_length must be greater than index_aa_length".into())
        })?;

    // Step 1: pad bits to a multiple of 3.
    let mut bits = bits.to_string();
    let remainder = bits.len() % 3;
    let mut pad_bits = (3 - remainder) % 3;
    bits.push_str(&"0".repeat(pad_bits));

    // Step 2: bits -> residues.
    let mut aa_string = String::with_capacity(bits.len() / 3);
    let triplets: Vec<char> = bits.chars().collect();
    for chunk in triplets.chunks(3) {
        let triplet: String = chunk.iter().collect();
        aa_string.push(crate::residue::triplet_to_residue(&triplet)?);
    }

    // Step 3: optional padding to a whole number of peptides.
    if pad_to_full_peptide && !aa_string.is_empty() {
        let remainder = aa_string.len() % payload_len;
        if remainder != 0 {
            let pad_aas = payload_len - remainder;
            aa_string.push_str(&"A".repeat(pad_aas));
            pad_bits += pad_aas * 3;
        }
    }

    // Step 4: chunk into peptides, optionally prefixed with a base-8 index.
    let payload_chunks = chunk_string(&aa_string, payload_len);

    let peptides = if index_aa_length > 0 {
        let index_bits_len = index_aa_length * 3;
        if index_bits_len < 64 && payload_chunks.len() > (1usize << index_bits_len) {
            return Err(PeptideError::IndexOverflow(
                "index_aa_length is too small for the number of peptides".into(),
            ));
        }
        payload_chunks
            .iter()
            .enumerate()
            .map(|(idx, chunk)| {
                let prefix = index_to_residues(idx as u64, index_aa_length)?;
                Ok(prefix + chunk)
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        payload_chunks
    };

    Ok(PeptideMapping {
        peptides,
        pad_bits,
        peptide_length,
        index_aa_length,
    })
}

/// Reverse mapping: peptide sequences -> original bitstring. Assumes the full
/// peptide set is present, in order (no missing/misaligned peptides - use
/// `peptides_to_bits_fixed` for that case).
pub fn peptides_to_bits(mapping: &PeptideMapping) -> Result<String> {
    let mut aa_string = String::new();
    for pep in &mapping.peptides {
        if mapping.index_aa_length > 0 {
            let chars: Vec<char> = pep.chars().collect();
            if chars.len() >= mapping.index_aa_length {
                aa_string.extend(&chars[mapping.index_aa_length..]);
            }
        } else {
            aa_string.push_str(pep);
        }
    }

    let mut bits = String::with_capacity(aa_string.len() * 3);
    for aa in aa_string.chars() {
        bits.push_str(&crate::residue::residue_to_triplet(aa)?);
    }

    if mapping.pad_bits > 0 {
        let new_len = bits.len().saturating_sub(mapping.pad_bits);
        bits.truncate(new_len);
    }
    Ok(bits)
}

/// Positional reconstruction used when peptides may be missing or
/// out-of-order (e.g. after the error channel). Missing slots are zero-filled
/// to preserve bit alignment.
pub fn peptides_to_bits_fixed(
    peptides: &[String],
    peptide_length: usize,
    index_aa_length: usize,
    total_peptides: usize,
    pad_bits: usize,
) -> Result<String> {
    let payload_len = peptide_length
        .checked_sub(index_aa_length)
        .filter(|&p| p > 0)
        .ok_or_else(|| {
            PeptideError::Config("peptide_length must be greater than index_aa_length".into())
        })?;
    let payload_bits_per_peptide = payload_len * 3;

    let mut chunks: Vec<String> = vec!["0".repeat(payload_bits_per_peptide); total_peptides];
    let mut seen = vec![false; total_peptides];

    for (pos, pep) in peptides.iter().enumerate() {
        let chars: Vec<char> = pep.chars().collect();

        let (idx, payload_chars): (usize, &[char]) = if index_aa_length > 0 {
            if chars.len() < index_aa_length {
                continue;
            }
            let prefix: String = chars[..index_aa_length].iter().collect();
            let Some(idx) = residues_to_index(&prefix) else {
                continue;
            };
            let idx = idx as usize;
            if idx >= total_peptides || seen[idx] {
                continue;
            }
            (idx, &chars[index_aa_length..])
        } else {
            if pos >= total_peptides || seen[pos] {
                continue;
            }
            (pos, &chars[..])
        };

        let mut payload_bits = String::with_capacity(payload_bits_per_peptide);
        for &aa in payload_chars {
            match residue_to_code(aa) {
                Some(code) => payload_bits.push_str(&format!("{:03b}", code)),
                None => payload_bits.push_str("000"),
            }
        }
        if payload_bits.len() < payload_bits_per_peptide {
            payload_bits.push_str(&"0".repeat(payload_bits_per_peptide - payload_bits.len()));
        } else {
            payload_bits.truncate(payload_bits_per_peptide);
        }

        chunks[idx] = payload_bits;
        seen[idx] = true;
    }

    let mut bitstream = chunks.concat();
    if pad_bits > 0 {
        let new_len = bitstream.len().saturating_sub(pad_bits);
        bitstream.truncate(new_len);
    }
    Ok(bitstream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::bytes_to_bits;

    #[test]
    fn roundtrip_without_index() {
        let bits = bytes_to_bits(b"hello peptide!");
        let mapping = bits_to_peptides(&bits, 18, 0, false).unwrap();
        let back = peptides_to_bits(&mapping).unwrap();
        assert_eq!(back, bits);
    }

    #[test]
    fn roundtrip_with_index() {
        let bits = bytes_to_bits(b"some longer payload to chunk across several peptides");
        let mapping = bits_to_peptides(&bits, 12, 3, false).unwrap();
        for (i, pep) in mapping.peptides.iter().enumerate() {
            let prefix: String = pep.chars().take(3).collect();
            assert_eq!(residues_to_index(&prefix), Some(i as u64));
        }
        let back = peptides_to_bits(&mapping).unwrap();
        assert_eq!(back, bits);
    }

    #[test]
    fn payload_le_index_is_a_config_error() {
        assert!(bits_to_peptides("000", 3, 3, false).is_err());
    }

    #[test]
    fn fixed_reconstruction_zero_fills_missing_peptides() {
        let bits = bytes_to_bits(b"peptide-rs-test-payload");
        let mapping = bits_to_peptides(&bits, 9, 3, true).unwrap();
        let total = mapping.peptides.len();

        // drop the second peptide
        let mut received = mapping.peptides.clone();
        received.remove(1);

        let recovered =
            peptides_to_bits_fixed(&received, 9, 3, total, mapping.pad_bits).unwrap();
        assert_eq!(recovered.len(), bits.len());
        // the dropped peptide's slot must be zero, everything else intact
        assert_ne!(recovered, bits);
    }
}
