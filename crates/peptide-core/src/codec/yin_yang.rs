// crates/peptide-core/src/codec/yin_yang.rs
//
// Rule-guided 2-bit-per-residue redundant mapping. Every 2-bit symbol maps to
// a pair of amino acids; the encoder is free to pick either member of the
// pair, so an offline rule engine steers the choice toward biochemically
// friendlier sequences (run-length limits, composition caps) while the
// decoder only needs the symbol->pair table to invert the mapping.

use crate::error::{PeptideError, Result};
use crate::residue::index_to_residues;

pub const YY_PAIRS: [(&str, char, char); 4] = [
    ("00", 'F', 'E'),
    ("01", 'Y', 'S'),
    ("10", 'V', 'T'),
    ("11", 'L', 'A'),
];

fn pair_for_symbol(symbol: &str) -> Option<(char, char)> {
    YY_PAIRS
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|(_, a, b)| (*a, *b))
}

fn bits_for_aa(aa: char) -> Option<&'static str> {
    YY_PAIRS
        .iter()
        .find(|(_, a, b)| *a == aa || *b == aa)
        .map(|(s, _, _)| *s)
}

const AROMATIC: [char; 2] = ['F', 'Y'];
const STRONG_HYDROPHOBIC: [char; 4] = ['V', 'L', 'F', 'Y'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YinYangEncoded {
    pub peptides: Vec<String>,
    pub pad_bits: usize,
    pub peptide_length: usize,
    pub index_aa_length: usize,
    pub original_size_bytes: usize,
    pub scheme_id: &'static str,
}

fn suffix_run_len(current: &[char], predicate: impl Fn(char) -> bool, candidate: char) -> usize {
    if !predicate(candidate) {
        return 0;
    }
    let mut run = 1;
    for &ch in current.iter().rev() {
        if predicate(ch) {
            run += 1;
        } else {
            break;
        }
    }
    run
}

fn suffix_same_len(current: &[char], candidate: char) -> usize {
    let mut run = 1;
    for &ch in current.iter().rev() {
        if ch == candidate {
            run += 1;
        } else {
            break;
        }
    }
    run
}

fn penalty(current_payload: &[char], payload_len: usize, aa: char) -> f64 {
    let aro_cap = (payload_len / 6).clamp(1, 3) as i64;
    let e_cap = (payload_len / 3).clamp(2, 6) as i64;

    let mut pen = 0.0f64;

    if suffix_same_len(current_payload, aa) > 2 {
        pen += 1000.0;
    }
    if suffix_run_len(current_payload, |x| STRONG_HYDROPHOBIC.contains(&x), aa) > 2 {
        pen += 1000.0;
    }
    if suffix_run_len(current_payload, |x| x == 'E', aa) > 2 {
        pen += 1000.0;
    }

    let aro_count = current_payload.iter().filter(|c| AROMATIC.contains(c)).count() as i64
        + if AROMATIC.contains(&aa) { 1 } else { 0 };
    if aro_count > aro_cap {
        pen += 1000.0;
    }

    let e_count = current_payload.iter().filter(|&&c| c == 'E').count() as i64
        + if aa == 'E' { 1 } else { 0 };
    if e_count > e_cap {
        pen += 1000.0;
    }

    if STRONG_HYDROPHOBIC.contains(&aa) {
        pen += 1.0;
    }
    if AROMATIC.contains(&aa) {
        pen += 0.5;
    }
    if aa == 'E' {
        pen += 0.2;
    }
    if aa == 'S' || aa == 'T' {
        pen -= 0.2;
    }

    if let Some(&last) = current_payload.last() {
        if aa == last {
            pen += 0.8;
        }
    }

    pen
}

fn choose_variant(candidates: (char, char), current_payload: &[char], payload_len: usize) -> char {
    let (a0, a1) = candidates;
    let p0 = penalty(current_payload, payload_len, a0);
    let p1 = penalty(current_payload, payload_len, a1);
    if p0 <= p1 {
        a0
    } else {
        a1
    }
}

pub fn yin_yang_encode(
    data: &[u8],
    peptide_length: usize,
    index_aa_length: usize,
) -> Result<YinYangEncoded> {
    let mut bits = crate::bits::bytes_to_bits(data);
    let original_size = data.len();

    let pad_bits = (2 - (bits.len() % 2)) % 2;
    if pad_bits > 0 {
        bits.push_str(&"0".repeat(pad_bits));
    }

    let payload_len = peptide_length
        .checked_sub(index_aa_length)
        .filter(|&p| p > 0)
        .ok_or_else(|| {
            PeptideError::Config("peptide_length must be greater than index_aa_length".into())
        })?;

    let mut payload_peptides: Vec<String> = Vec::new();
    let mut current_payload: Vec<char> = Vec::new();
    let bit_chars: Vec<char> = bits.chars().collect();

    for chunk in bit_chars.chunks(2) {
        let symbol: String = chunk.iter().collect();
        let candidates = pair_for_symbol(&symbol).ok_or_else(|| {
            PeptideError::CodecFailure(format!("no Yin-Yang pair for symbol '{symbol}'"))
        })?;
        let aa = choose_variant(candidates, &current_payload, payload_len);
        current_payload.push(aa);
        if current_payload.len() >= payload_len {
            payload_peptides.push(current_payload.iter().collect());
            current_payload.clear();
        }
    }
    if !current_payload.is_empty() {
        payload_peptides.push(current_payload.iter().collect());
    }

    let peptides = if index_aa_length > 0 {
        let index_bits_len = index_aa_length * 3;
        if index_bits_len < 64 && payload_peptides.len() > (1usize << index_bits_len) {
            return Err(PeptideError::IndexOverflow(
                "index_aa_length is too small for the number of peptides".into(),
            ));
        }
        payload_peptides
            .iter()
            .enumerate()
            .map(|(i, p)| Ok(index_to_residues(i as u64, index_aa_length)? + p))
            .collect::<Result<Vec<_>>>()?
    } else {
        payload_peptides
    };

    Ok(YinYangEncoded {
        peptides,
        pad_bits,
        peptide_length,
        index_aa_length,
        original_size_bytes: original_size,
        scheme_id: "yy_pairs_v1",
    })
}

pub fn yin_yang_decode(encoded: &YinYangEncoded) -> Result<Vec<u8>> {
    let mut payload = String::new();
    for pep in &encoded.peptides {
        if encoded.index_aa_length > 0 {
            let chars: Vec<char> = pep.chars().collect();
            if chars.len() >= encoded.index_aa_length {
                payload.extend(&chars[encoded.index_aa_length..]);
            }
        } else {
            payload.push_str(pep);
        }
    }

    let mut bits = String::with_capacity(payload.len() * 2);
    for aa in payload.chars() {
        let symbol = bits_for_aa(aa)
            .ok_or_else(|| PeptideError::UnknownResidue(format!("'{aa}' is not a Yin-Yang residue")))?;
        bits.push_str(symbol);
    }

    if encoded.pad_bits > 0 {
        let new_len = bits.len().saturating_sub(encoded.pad_bits);
        bits.truncate(new_len);
    }

    let mut decoded = crate::bits::bits_to_bytes(&bits)?;
    decoded.truncate(encoded.original_size_bytes);
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_arbitrary_bytes() {
        let data = b"a peptide payload, with some repeats: aaaaaaa!!";
        let encoded = yin_yang_encode(data, 18, 3).unwrap();
        let decoded = yin_yang_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn roundtrips_without_index() {
        let data = b"no index here";
        let encoded = yin_yang_encode(data, 18, 0).unwrap();
        let decoded = yin_yang_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn avoids_runs_longer_than_two_when_alternative_exists() {
        // repeated zero bits would naively pick the same residue every time;
        // the rule engine should break up the run.
        let data = vec![0u8; 8];
        let encoded = yin_yang_encode(&data, 32, 0).unwrap();
        for pep in &encoded.peptides {
            let chars: Vec<char> = pep.chars().collect();
            for w in chars.windows(3) {
                assert!(!(w[0] == w[1] && w[1] == w[2]), "run of 3 identical residues in {pep}");
            }
        }
    }
}
