// crates/peptide-core/src/codec/huffman.rs
//
// Byte-oriented Huffman coding with a synthetic end-of-stream symbol, so a
// single bitstring can be encoded/decoded without needing a separate length
// side channel. The symbol table is carried alongside the bitstring rather
// than serialized, mirroring a codec object that knows how to decode its own
// output.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::error::{PeptideError, Result};

/// `Symbol` is either a literal byte or the synthetic end-of-stream marker.
/// The marker always exists in the tree so even single-distinct-byte and
/// empty inputs get a valid (length >= 1) code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Symbol {
    Byte(u8),
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanTable {
    codes: HashMap<Symbol, String>,
    decode: HashMap<String, Symbol>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HuffmanEncoded {
    pub bits: String,
    pub table: HuffmanTable,
}

enum Tree {
    Leaf(Symbol),
    Node(Box<Tree>, Box<Tree>),
}

struct HeapEntry {
    freq: u64,
    // insertion order, used as a tiebreaker so the tree is deterministic.
    seq: u64,
    tree: Tree,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.freq == other.freq && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .freq
            .cmp(&self.freq)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn build_tree(frequencies: &[(Symbol, u64)]) -> Tree {
    let mut heap = BinaryHeap::new();
    let mut seq = 0u64;
    for &(sym, freq) in frequencies {
        heap.push(HeapEntry {
            freq: freq.max(1),
            seq,
            tree: Tree::Leaf(sym),
        });
        seq += 1;
    }

    if heap.len() == 1 {
        // A single symbol still needs a 1-bit code; pair it with an
        // unreachable dummy leaf so the tree has depth 1.
        let only = heap.pop().unwrap();
        return Tree::Node(
            Box::new(only.tree),
            Box::new(Tree::Leaf(Symbol::Byte(0))),
        );
    }

    while heap.len() > 1 {
        let a = heap.pop().unwrap();
        let b = heap.pop().unwrap();
        heap.push(HeapEntry {
            freq: a.freq + b.freq,
            seq,
            tree: Tree::Node(Box::new(a.tree), Box::new(b.tree)),
        });
        seq += 1;
    }

    heap.pop().unwrap().tree
}

fn assign_codes(tree: &Tree, prefix: &mut String, codes: &mut HashMap<Symbol, String>) {
    match tree {
        Tree::Leaf(sym) => {
            codes.insert(*sym, if prefix.is_empty() { "0".into() } else { prefix.clone() });
        }
        Tree::Node(l, r) => {
            prefix.push('0');
            assign_codes(l, prefix, codes);
            prefix.pop();
            prefix.push('1');
            assign_codes(r, prefix, codes);
            prefix.pop();
        }
    }
}

fn build_table(data: &[u8]) -> HuffmanTable {
    let mut freq: HashMap<Symbol, u64> = HashMap::new();
    for &b in data {
        *freq.entry(Symbol::Byte(b)).or_insert(0) += 1;
    }
    freq.insert(Symbol::Eof, 1);

    let mut frequencies: Vec<(Symbol, u64)> = freq.into_iter().collect();
    frequencies.sort_by_key(|(sym, _)| match sym {
        Symbol::Byte(b) => *b as u16,
        Symbol::Eof => 256,
    });

    let tree = build_tree(&frequencies);
    let mut codes = HashMap::new();
    assign_codes(&tree, &mut String::new(), &mut codes);

    let decode = codes
        .iter()
        .map(|(sym, code)| (code.clone(), *sym))
        .collect();

    HuffmanTable { codes, decode }
}

impl HuffmanTable {
    /// Exposes the table as `(byte, code)` pairs (`byte = None` marks the
    /// end-of-stream code) so a caller outside this module can persist and
    /// reconstruct it without reaching into the private `Symbol` type.
    pub fn to_pairs(&self) -> Vec<(Option<u8>, String)> {
        self.codes
            .iter()
            .map(|(sym, code)| {
                let byte = match sym {
                    Symbol::Byte(b) => Some(*b),
                    Symbol::Eof => None,
                };
                (byte, code.clone())
            })
            .collect()
    }

    pub fn from_pairs(pairs: &[(Option<u8>, String)]) -> Self {
        let mut codes = HashMap::new();
        let mut decode = HashMap::new();
        for (byte, code) in pairs {
            let sym = match byte {
                Some(b) => Symbol::Byte(*b),
                None => Symbol::Eof,
            };
            codes.insert(sym, code.clone());
            decode.insert(code.clone(), sym);
        }
        HuffmanTable { codes, decode }
    }
}

/// Build a table from `data` and encode it, appending the end-of-stream code.
pub fn huffman_encode(data: &[u8]) -> HuffmanEncoded {
    let table = build_table(data);
    let mut bits = String::with_capacity(data.len() * 4);
    for &b in data {
        bits.push_str(&table.codes[&Symbol::Byte(b)]);
    }
    bits.push_str(&table.codes[&Symbol::Eof]);
    HuffmanEncoded { bits, table }
}

/// Decode a Huffman bitstring against its table, stopping at the
/// end-of-stream code (any trailing padding bits are ignored).
pub fn huffman_decode(encoded: &HuffmanEncoded) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut code = String::new();
    for bit in encoded.bits.chars() {
        code.push(bit);
        if let Some(sym) = encoded.table.decode.get(&code) {
            match sym {
                Symbol::Byte(b) => out.push(*b),
                Symbol::Eof => return Ok(out),
            }
            code.clear();
        }
    }
    Err(PeptideError::CodecFailure(
        "Huffman bitstream ended before the end-of-stream code".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_typical_data() {
        let data = b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly.";
        let encoded = huffman_encode(data);
        let decoded = huffman_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn roundtrips_empty_input() {
        let encoded = huffman_encode(&[]);
        let decoded = huffman_decode(&encoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn roundtrips_single_distinct_byte() {
        let data = vec![42u8; 50];
        let encoded = huffman_encode(&data);
        let decoded = huffman_decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn table_roundtrips_through_pairs() {
        let data = b"rebuild this table from its serialized pairs";
        let encoded = huffman_encode(data);
        let rebuilt_table = HuffmanTable::from_pairs(&encoded.table.to_pairs());
        let rebuilt = HuffmanEncoded {
            bits: encoded.bits.clone(),
            table: rebuilt_table,
        };
        assert_eq!(huffman_decode(&rebuilt).unwrap(), data);
    }

    #[test]
    fn compresses_skewed_distributions() {
        let mut data = vec![0u8; 900];
        data.extend(1..=100u8);
        let encoded = huffman_encode(&data);
        assert!(encoded.bits.len() < data.len() * 8);
    }
}
