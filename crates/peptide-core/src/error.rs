use thiserror::Error;

pub type Result<T> = std::result::Result<T, PeptideError>;

/// Error taxonomy for the codec/ECC core.
///
/// `UnknownResidue` and `IndexOverflow` are only ever produced internally by
/// the mapping/RS layers, where they are caught and converted into erasures
/// or corrected payloads; callers of the public encode/decode entry points
/// should not expect to see them surface except from the primitive helpers
/// in `bits`/`mapping` that are documented to return them directly.
#[derive(Debug, Error)]
pub enum PeptideError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid length: {0}")]
    InvalidLength(String),

    #[error("unknown residue: {0}")]
    UnknownResidue(String),

    #[error("index overflow: {0}")]
    IndexOverflow(String),

    #[error("codec failure: {0}")]
    CodecFailure(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
