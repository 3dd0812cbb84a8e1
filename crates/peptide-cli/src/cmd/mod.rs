// crates/peptide-cli/src/cmd/mod.rs

pub mod decode;
pub mod encode;
pub mod profiles;
pub mod run;
pub mod sweep;

/// Shared clap value enum for the three source codecs.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum EncoderArg {
    Huffman,
    YinYang,
    Fountain,
}

impl From<EncoderArg> for peptide_core::SourceEncoder {
    fn from(value: EncoderArg) -> Self {
        match value {
            EncoderArg::Huffman => peptide_core::SourceEncoder::Huffman,
            EncoderArg::YinYang => peptide_core::SourceEncoder::YinYang,
            EncoderArg::Fountain => peptide_core::SourceEncoder::Fountain,
        }
    }
}
