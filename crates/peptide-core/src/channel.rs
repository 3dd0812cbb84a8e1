// crates/peptide-core/src/channel.rs
//
// Simulated channel noise: amino-acid/peptide loss, substitution, insertion,
// and local-shuffle operators, in basic (fixed-probability) or scored
// (per-peptide probability derived from an external score) modes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::residue::ALPHABET;

pub const DEFAULT_ALPHABET: [char; 8] = ALPHABET;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LossMode {
    AminoAcid,
    Peptide,
}

#[derive(Clone, Debug)]
pub struct ChannelConfig {
    pub loss_prob: f64,
    pub mutation_prob: f64,
    pub insertion_prob: f64,
    pub shuffle_prob: f64,
    pub shuffle_passes: usize,
    pub drop_empty: bool,
    pub loss_mode: LossMode,
    pub seed: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            loss_prob: 0.10,
            mutation_prob: 0.02,
            insertion_prob: 0.02,
            shuffle_prob: 0.0,
            shuffle_passes: 1,
            drop_empty: true,
            loss_mode: LossMode::AminoAcid,
            seed: 0,
        }
    }
}

fn drop_peptides(peptides: &[String], loss_prob: f64, rng: &mut StdRng, drop_empty: bool) -> Vec<String> {
    if loss_prob <= 0.0 {
        return peptides.to_vec();
    }
    let mut out = Vec::new();
    for p in peptides {
        if rng.gen::<f64>() < loss_prob {
            if !drop_empty {
                out.push(String::new());
            }
            continue;
        }
        out.push(p.clone());
    }
    out
}

fn drop_amino_acids(peptides: &[String], loss_prob: f64, rng: &mut StdRng, drop_empty: bool) -> Vec<String> {
    if loss_prob <= 0.0 {
        return peptides.to_vec();
    }
    let mut out = Vec::new();
    for p in peptides {
        let kept: String = p.chars().filter(|_| rng.gen::<f64>() >= loss_prob).collect();
        if !kept.is_empty() || !drop_empty {
            out.push(kept);
        }
    }
    out
}

fn mutate_peptides(peptides: &[String], mutation_prob: f64, alphabet: &[char], rng: &mut StdRng) -> Vec<String> {
    peptides
        .iter()
        .map(|p| {
            p.chars()
                .map(|aa| {
                    if rng.gen::<f64>() < mutation_prob {
                        let choices: Vec<char> = alphabet.iter().copied().filter(|&x| x != aa).collect();
                        if !choices.is_empty() {
                            return *choices.choose(rng).unwrap();
                        }
                    }
                    aa
                })
                .collect()
        })
        .collect()
}

fn insert_aa_random_position(
    peptides: &[String],
    insertion_prob: f64,
    alphabet: &[char],
    rng: &mut StdRng,
) -> Vec<String> {
    if insertion_prob <= 0.0 || alphabet.is_empty() {
        return peptides.to_vec();
    }
    peptides
        .iter()
        .map(|p| {
            let chars: Vec<char> = p.chars().collect();
            if chars.is_empty() {
                return p.clone();
            }
            let mut out = String::with_capacity(chars.len() + 2);
            for aa in chars {
                if rng.gen::<f64>() < insertion_prob {
                    let ins_aa = *alphabet.choose(rng).unwrap();
                    if rng.gen::<f64>() < 0.5 {
                        out.push(ins_aa);
                        out.push(aa);
                    } else {
                        out.push(aa);
                        out.push(ins_aa);
                    }
                } else {
                    out.push(aa);
                }
            }
            out
        })
        .collect()
}

fn shuffle_amino_acids(peptides: &[String], shuffle_prob: f64, rng: &mut StdRng, passes: usize) -> Vec<String> {
    peptides
        .iter()
        .map(|p| {
            let mut chars: Vec<char> = p.chars().collect();
            let n = chars.len();
            if n <= 1 || shuffle_prob <= 0.0 || passes == 0 {
                return p.clone();
            }
            for _ in 0..passes {
                for i in 0..n - 1 {
                    if rng.gen::<f64>() < shuffle_prob {
                        chars.swap(i, i + 1);
                    }
                }
            }
            chars.into_iter().collect()
        })
        .collect()
}

/// Apply loss/mutation/insertion/shuffle to peptide sequences with fixed
/// per-event probabilities, in that order (matching the layered imperfection
/// model of a real synthesis+sequencing round-trip).
pub fn apply_peptide_errors(peptides: &[String], cfg: &ChannelConfig) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let after_loss = if cfg.loss_prob > 0.0 {
        match cfg.loss_mode {
            LossMode::Peptide => drop_peptides(peptides, cfg.loss_prob, &mut rng, cfg.drop_empty),
            LossMode::AminoAcid => drop_amino_acids(peptides, cfg.loss_prob, &mut rng, cfg.drop_empty),
        }
    } else {
        peptides.to_vec()
    };
    if after_loss.is_empty() {
        return after_loss;
    }

    let after_mutation = if cfg.mutation_prob > 0.0 {
        mutate_peptides(&after_loss, cfg.mutation_prob, &DEFAULT_ALPHABET, &mut rng)
    } else {
        after_loss
    };

    let after_insertion = if cfg.insertion_prob > 0.0 {
        insert_aa_random_position(&after_mutation, cfg.insertion_prob, &DEFAULT_ALPHABET, &mut rng)
    } else {
        after_mutation
    };

    if cfg.shuffle_prob > 0.0 {
        shuffle_amino_acids(&after_insertion, cfg.shuffle_prob, &mut rng, cfg.shuffle_passes)
    } else {
        after_insertion
    }
}

/// Abstracts away how a per-peptide "quality" score in `[0, 1]` is obtained.
/// The production system scrapes a third-party scoring tool over HTTP; here
/// we only need the interface, with an in-memory implementation for tests
/// and offline sweeps.
pub trait ScoreProvider {
    fn get_scores(&self, peptides: &[String]) -> Vec<f64>;
}

/// Deterministic in-memory score provider: every peptide maps to a quality
/// in `[0, 1]` via a lookup table, defaulting to a fixed score for misses.
pub struct FixedScoreProvider {
    pub scores: std::collections::HashMap<String, f64>,
    pub default_score: f64,
}

impl FixedScoreProvider {
    pub fn new(default_score: f64) -> Self {
        FixedScoreProvider {
            scores: std::collections::HashMap::new(),
            default_score,
        }
    }

    pub fn with_score(mut self, peptide: impl Into<String>, score: f64) -> Self {
        self.scores.insert(peptide.into(), score);
        self
    }
}

impl ScoreProvider for FixedScoreProvider {
    fn get_scores(&self, peptides: &[String]) -> Vec<f64> {
        peptides
            .iter()
            .map(|p| *self.scores.get(p).unwrap_or(&self.default_score))
            .collect()
    }
}

/// Score-driven channel: per-peptide probability `p(Q) = (1 - Q) * 0.02`,
/// applied as the loss probability with mutation/insertion/shuffle each at
/// `p(Q) / 2`.
pub fn apply_peptide_errors_scored(
    peptides: &[String],
    provider: &dyn ScoreProvider,
    loss_mode: LossMode,
    drop_empty: bool,
    shuffle_passes: usize,
    seed: u64,
) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();

    let nonempty: Vec<String> = peptides.iter().filter(|p| !p.is_empty()).cloned().collect();
    if nonempty.is_empty() {
        return out;
    }
    let scores = provider.get_scores(&nonempty);
    let mut score_iter = scores.into_iter();

    for peptide in peptides {
        if peptide.is_empty() {
            if !drop_empty {
                out.push(peptide.clone());
            }
            continue;
        }
        let q = score_iter.next().unwrap_or(0.0);
        let p_val = (1.0 - q) * 0.02;
        let other_prob = p_val / 2.0;

        let mut current = vec![peptide.clone()];
        if p_val > 0.0 {
            current = match loss_mode {
                LossMode::Peptide => drop_peptides(&current, p_val, &mut rng, drop_empty),
                LossMode::AminoAcid => drop_amino_acids(&current, p_val, &mut rng, drop_empty),
            };
        }
        if current.is_empty() {
            continue;
        }
        if other_prob > 0.0 {
            current = mutate_peptides(&current, other_prob, &DEFAULT_ALPHABET, &mut rng);
            current = insert_aa_random_position(&current, other_prob, &DEFAULT_ALPHABET, &mut rng);
            current = shuffle_amino_acids(&current, other_prob, &mut rng, shuffle_passes);
        }
        out.extend(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_probability_channel_is_identity() {
        let peptides = vec!["AVL".to_string(), "STF".to_string()];
        let cfg = ChannelConfig {
            loss_prob: 0.0,
            mutation_prob: 0.0,
            insertion_prob: 0.0,
            shuffle_prob: 0.0,
            ..ChannelConfig::default()
        };
        assert_eq!(apply_peptide_errors(&peptides, &cfg), peptides);
    }

    #[test]
    fn full_loss_drops_everything() {
        let peptides = vec!["AVL".to_string(), "STF".to_string()];
        let cfg = ChannelConfig {
            loss_prob: 1.0,
            mutation_prob: 0.0,
            insertion_prob: 0.0,
            shuffle_prob: 0.0,
            loss_mode: LossMode::Peptide,
            ..ChannelConfig::default()
        };
        assert!(apply_peptide_errors(&peptides, &cfg).is_empty());
    }

    #[test]
    fn scored_channel_with_perfect_scores_is_near_identity() {
        let peptides: Vec<String> = (0..20).map(|i| format!("AVLSTFYE{i:02}").replace(char::is_numeric, "A")).collect();
        let provider = FixedScoreProvider::new(1.0);
        let out = apply_peptide_errors_scored(&peptides, &provider, LossMode::AminoAcid, true, 1, 7);
        // Q=1.0 => p=0, so every peptide should survive unchanged.
        assert_eq!(out, peptides);
    }
}
