//! Legacy password digest.
//!
//! Account passwords are stored as the lowercase-hex MD5 digest of the raw
//! password bytes, matching the records this system inherits. MD5 is kept for
//! compatibility with the existing user table, not as a recommendation.

use md5::{Digest, Md5};

/// Lowercase-hex MD5 digest of `input`.
pub fn md5_hex(input: &str) -> String {
    hex::encode(Md5::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex() {
        // Known vector: md5("admin")
        assert_eq!(md5_hex("admin"), "21232f297a57a5a743894a0e4a801fc3");
    }

    #[test]
    fn digest_of_empty_string() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
    }
}
