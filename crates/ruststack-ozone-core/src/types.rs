//! Store and resource kinds shared by addresses and descriptors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShellError;

// ---------------------------------------------------------------------------
// StoreKind
// ---------------------------------------------------------------------------

/// The namespace a resource lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoreKind {
    /// The native volume/bucket namespace (`o3://`).
    #[default]
    Native,
    /// The S3-compatible namespace (`s3://`).
    S3,
}

impl StoreKind {
    /// Canonical token, as accepted by `--store`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "OZONE",
            Self::S3 => "S3",
        }
    }

    /// Locator scheme for this store.
    #[must_use]
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Native => "o3",
            Self::S3 => "s3",
        }
    }

    /// Map a locator scheme back to its store kind.
    #[must_use]
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "o3" => Some(Self::Native),
            "s3" => Some(Self::S3),
            _ => None,
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ShellError;

    /// Parse a `--store` token. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OZONE" | "NATIVE" => Ok(Self::Native),
            "S3" => Ok(Self::S3),
            _ => Err(ShellError::UnknownStoreKind {
                token: s.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// How specific a resolved address is. Ordered from least to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// The store root, naming no volume.
    Root,
    /// A volume.
    Volume,
    /// A bucket inside a volume.
    Bucket,
    /// A key inside a bucket.
    Key,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Root => "store root",
            Self::Volume => "volume",
            Self::Bucket => "bucket",
            Self::Key => "key",
        })
    }
}

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// The resource types an ACL can be replaced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// Volume ACL.
    Volume,
    /// Bucket ACL.
    Bucket,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Volume => "VOLUME",
            Self::Bucket => "BUCKET",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_store_tokens_case_sensitively() {
        assert_eq!("OZONE".parse::<StoreKind>().ok(), Some(StoreKind::Native));
        assert_eq!("NATIVE".parse::<StoreKind>().ok(), Some(StoreKind::Native));
        assert_eq!("S3".parse::<StoreKind>().ok(), Some(StoreKind::S3));
        assert!(matches!(
            "s3".parse::<StoreKind>(),
            Err(ShellError::UnknownStoreKind { token }) if token == "s3"
        ));
        assert!("ozone".parse::<StoreKind>().is_err());
    }

    #[test]
    fn test_should_map_schemes() {
        assert_eq!(StoreKind::from_scheme("o3"), Some(StoreKind::Native));
        assert_eq!(StoreKind::from_scheme("s3"), Some(StoreKind::S3));
        assert_eq!(StoreKind::from_scheme("http"), None);
        assert_eq!(StoreKind::S3.scheme(), "s3");
    }

    #[test]
    fn test_should_order_resource_kinds_by_specificity() {
        assert!(ResourceKind::Root < ResourceKind::Volume);
        assert!(ResourceKind::Volume < ResourceKind::Bucket);
        assert!(ResourceKind::Bucket < ResourceKind::Key);
    }
}
