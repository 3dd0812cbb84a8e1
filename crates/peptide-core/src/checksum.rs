/// CRC-32 checksum, used by the Fountain codec to validate each droplet.
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut h = crc32fast::Hasher::new();
    h.update(bytes);
    h.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_is_stable_and_sensitive_to_bit_flips() {
        let a = crc32(b"peptide payload");
        let b = crc32(b"peptide payloae");
        assert_ne!(a, b);
        assert_eq!(a, crc32(b"peptide payload"));
    }
}
