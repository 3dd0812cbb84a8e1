// crates/peptide-core/src/lib.rs

pub mod bits;
pub mod channel;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod residue;
pub mod rs;

pub use crate::error::{PeptideError, Result};
pub use crate::mapping::PeptideMapping;
pub use crate::pipeline::{
    decode, encode, encode_and_decode, sweep, EncodeConfig, EncodedPipeline, RunMetrics,
    SourceEncoder, SourceMeta, FOUNTAIN_PROFILES, RS_PROFILES,
};
