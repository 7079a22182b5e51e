//! Sigil version helpers.
//!
//! Centralizes version parsing and validation for sigil strings. Parsing is
//! intentionally strict: unknown tags fail with `UnsupportedVersion` so a
//! forward-incompatible sigil is never partially decoded.

use crate::errors::{SigilError, SigilResult};

/// Known sigil format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigilVersion {
    V1,
}

impl SigilVersion {
    /// Parse a version tag (e.g. "v1").
    pub fn parse(s: &str) -> SigilResult<Self> {
        match s {
            "v1" => Ok(Self::V1),
            _ => Err(SigilError::unsupported_version(s)),
        }
    }

    /// Return the canonical string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_v1() {
        assert_eq!(SigilVersion::parse("v1").unwrap(), SigilVersion::V1);
    }

    #[test]
    fn parse_unknown() {
        let e = SigilVersion::parse("v9").unwrap_err();
        assert_matches!(e, SigilError::UnsupportedVersion(_));
    }
}
