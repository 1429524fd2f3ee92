//! Checksums tying a compiled model to the specification text it came with

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 checksum of specification text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum of a text
    pub fn from_text(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check that a specification text is the one this checksum was taken from
    pub fn verify(&self, content: &str) -> bool {
        *self == Self::from_text(content)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let spec = "module Sapling {\n};\n";
        assert_eq!(Checksum::from_text(spec), Checksum::from_text(spec));
        assert_eq!(Checksum::from_text(spec).as_str().len(), 64);
    }

    #[test]
    fn test_checksum_verification() {
        let spec = "module Sapling {\n};\n";
        let checksum = Checksum::from_text(spec);
        assert!(checksum.verify(spec));
        assert!(!checksum.verify("module Other {\n};\n"));
    }
}
