// crates/peptide-cli/src/cmd/profiles.rs

use anyhow::Result;
use clap::Args;

use peptide_core::{FOUNTAIN_PROFILES, RS_PROFILES};

#[derive(Args)]
pub struct ProfilesArgs {}

pub fn run(_args: ProfilesArgs) -> Result<()> {
    println!("RS profiles (name, parity_symbols, interleave_depth):");
    for (name, parity, depth) in RS_PROFILES {
        println!("  {name:<12} parity={parity:<4} interleave_depth={depth}");
    }
    println!("Fountain profiles (name, overhead fraction):");
    for (name, overhead) in FOUNTAIN_PROFILES {
        println!("  {name:<12} overhead={overhead}");
    }
    Ok(())
}
