use md5::{Digest, Md5};

/// number of hex characters stored for the checksum
pub const CHECKSUM_LEN: usize = 8;

/// Digest over the JSON payload bytes, rendered as `CHECKSUM_LEN` hex characters.
///
/// This only detects corruption, it does not authenticate a card.
pub trait Checksum: Send + Sync {
    fn checksum(&self, payload: &[u8]) -> String;
}

/// MD5 truncated to the first 8 lowercase hex characters
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Checksum;

impl Checksum for Md5Checksum {
    fn checksum(&self, payload: &[u8]) -> String {
        let mut hex = format!("{:x}", Md5::digest(payload));
        hex.truncate(CHECKSUM_LEN);

        hex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_truncate_md5_to_8_lowercase_hex_chars() {
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(Md5Checksum.checksum(b""), "d41d8cd9");
        // md5("{}") = 99914b932bd37a50b983c5e7c90ae93b
        assert_eq!(Md5Checksum.checksum(b"{}"), "99914b93");
    }
}
