// crates/peptide-core/src/residue.rs
//
// The fixed 8-letter residue alphabet and its bijection with 3-bit groups.
// Order is significant: position in ALPHABET is the 3-bit binary code
// (A=000 .. E=111).

use crate::error::{PeptideError, Result};

pub const ALPHABET: [char; 8] = ['A', 'V', 'L', 'S', 'T', 'F', 'Y', 'E'];

/// Residues considered "strongly hydrophobic" for the Yin-Yang rule engine.
pub const STRONG_HYDROPHOBIC: [char; 4] = ['V', 'L', 'F', 'Y'];
/// Aromatic residues for the Yin-Yang rule engine.
pub const AROMATIC: [char; 2] = ['F', 'Y'];

#[inline]
pub fn is_residue(c: char) -> bool {
    ALPHABET.contains(&c)
}

/// Map a residue to its 3-bit code (0..8).
#[inline]
pub fn residue_to_code(c: char) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == c).map(|i| i as u8)
}

/// Map a 3-bit code (0..8) to its residue.
#[inline]
pub fn code_to_residue(code: u8) -> char {
    ALPHABET[(code & 0x07) as usize]
}

/// Translate a 3-character bitstring ("0".."1") triplet into a residue.
pub fn triplet_to_residue(triplet: &str) -> Result<char> {
    if triplet.len() != 3 {
        return Err(PeptideError::InvalidLength(format!(
            "expected a 3-bit triplet, got length {}",
            triplet.len()
        )));
    }
    let mut code = 0u8;
    for c in triplet.chars() {
        code <<= 1;
        match c {
            '1' => code |= 1,
            '0' => {}
            _ => {
                return Err(PeptideError::InvalidLength(format!(
                    "triplet contains non-binary character '{c}'"
                )))
            }
        }
    }
    Ok(code_to_residue(code))
}

/// Translate a residue into its 3-bit ("0"/"1") string, big-endian.
pub fn residue_to_triplet(c: char) -> Result<String> {
    let code = residue_to_code(c)
        .ok_or_else(|| PeptideError::UnknownResidue(format!("'{c}' is not in the alphabet")))?;
    Ok(format!("{:03b}", code))
}

/// Map every residue of a string to 3-bit groups, concatenated. Unknown
/// residues map to "000" (used by the RS symbol packer, which treats
/// corrupted/erased peptides as zero-filled rather than failing).
pub fn residues_to_bits_lossy(residues: &str) -> String {
    let mut out = String::with_capacity(residues.len() * 3);
    for c in residues.chars() {
        match residue_to_code(c) {
            Some(code) => out.push_str(&format!("{:03b}", code)),
            None => out.push_str("000"),
        }
    }
    out
}

/// Map every residue of a string to 3-bit groups, failing on the first
/// residue outside the alphabet.
pub fn residues_to_bits(residues: &str) -> Result<String> {
    let mut out = String::with_capacity(residues.len() * 3);
    for c in residues.chars() {
        out.push_str(&residue_to_triplet(c)?);
    }
    Ok(out)
}

/// Encode a big-endian index as `index_aa_length` residues (base-8 digits,
/// most significant residue first).
pub fn index_to_residues(idx: u64, index_aa_length: usize) -> Result<String> {
    let bits_len = index_aa_length * 3;
    if bits_len < 64 && idx >= (1u64 << bits_len) {
        return Err(PeptideError::IndexOverflow(format!(
            "index {idx} does not fit in {index_aa_length} residues"
        )));
    }
    let mut out = String::with_capacity(index_aa_length);
    for i in (0..index_aa_length).rev() {
        let code = ((idx >> (i * 3)) & 0x07) as u8;
        out.push(code_to_residue(code));
    }
    Ok(out)
}

/// Decode an index prefix of residues into an integer, big-endian. Returns
/// `None` if any residue is not in the alphabet.
pub fn residues_to_index(prefix: &str) -> Option<u64> {
    let mut idx: u64 = 0;
    for c in prefix.chars() {
        let code = residue_to_code(c)?;
        idx = (idx << 3) | code as u64;
    }
    Some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_is_a_bijection_with_3_bits() {
        for code in 0u8..8 {
            let r = code_to_residue(code);
            assert_eq!(residue_to_code(r), Some(code));
        }
    }

    #[test]
    fn known_codes_match_spec() {
        assert_eq!(residue_to_triplet('A').unwrap(), "000");
        assert_eq!(residue_to_triplet('V').unwrap(), "001");
        assert_eq!(residue_to_triplet('L').unwrap(), "010");
        assert_eq!(residue_to_triplet('S').unwrap(), "011");
        assert_eq!(residue_to_triplet('T').unwrap(), "100");
        assert_eq!(residue_to_triplet('F').unwrap(), "101");
        assert_eq!(residue_to_triplet('Y').unwrap(), "110");
        assert_eq!(residue_to_triplet('E').unwrap(), "111");
    }

    #[test]
    fn index_roundtrip() {
        let residues = index_to_residues(42, 3).unwrap();
        assert_eq!(residues_to_index(&residues), Some(42));
    }

    #[test]
    fn index_overflow_is_rejected() {
        assert!(index_to_residues(8, 1).is_err());
        assert!(index_to_residues(7, 1).is_ok());
    }
}
