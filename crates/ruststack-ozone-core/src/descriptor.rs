//! Server-addressable identity of the resource whose ACL is replaced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::ResourceAddress;
use crate::error::{ShellError, ShellResult};
use crate::types::{ResourceKind, ResourceType, StoreKind};

/// The object an ACL request targets.
///
/// Constructed through [`ResourceDescriptor::new`] or
/// [`ResourceDescriptor::from_address`], both of which reject empty names.
/// The resource type follows from whether a bucket is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    store_kind: StoreKind,
    resource_type: ResourceType,
    volume_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bucket_name: Option<String>,
}

impl ResourceDescriptor {
    /// Create a descriptor for a volume or, when `bucket_name` is given, a
    /// bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::MalformedAddress`] if the volume name or a given
    /// bucket name is empty.
    pub fn new(
        store_kind: StoreKind,
        volume_name: impl Into<String>,
        bucket_name: Option<String>,
    ) -> ShellResult<Self> {
        let volume_name = volume_name.into();
        if volume_name.is_empty() {
            return Err(ShellError::malformed_address(
                &volume_name,
                "volume name is required",
            ));
        }
        if bucket_name.as_deref() == Some("") {
            return Err(ShellError::malformed_address(
                &volume_name,
                "bucket name is empty",
            ));
        }
        let resource_type = if bucket_name.is_some() {
            ResourceType::Bucket
        } else {
            ResourceType::Volume
        };
        Ok(Self {
            store_kind,
            resource_type,
            volume_name,
            bucket_name,
        })
    }

    /// Build a descriptor from a resolved address and the effective store
    /// kind.
    ///
    /// # Errors
    ///
    /// - [`ShellError::InsufficientAddress`] for the store root.
    /// - [`ShellError::MalformedAddress`] for key addresses, which have no
    ///   container ACL to replace.
    pub fn from_address(address: &ResourceAddress, store_kind: StoreKind) -> ShellResult<Self> {
        address.ensure_at_least(ResourceKind::Volume)?;
        if address.resource_kind() == ResourceKind::Key {
            return Err(ShellError::malformed_address(
                &address.to_string(),
                "expected a volume or bucket address, not a key",
            ));
        }
        Self::new(
            store_kind,
            address.volume_name().unwrap_or_default(),
            address.bucket_name().map(ToOwned::to_owned),
        )
    }

    /// The store namespace.
    #[must_use]
    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    /// Volume or bucket.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// The volume name.
    #[must_use]
    pub fn volume_name(&self) -> &str {
        &self.volume_name
    }

    /// The bucket name, present iff the resource type is `Bucket`.
    #[must_use]
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    /// Stable path used as the storage key, e.g. `/vol1/bucket1`.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.bucket_name {
            Some(bucket) => format!("/{}/{bucket}", self.volume_name),
            None => format!("/{}", self.volume_name),
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.store_kind,
            self.resource_type,
            self.path()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::resolve;

    #[test]
    fn test_should_derive_volume_descriptor() {
        let addr = resolve("/vol1").expect("test resolve");
        let desc = ResourceDescriptor::from_address(&addr, StoreKind::Native).expect("test desc");
        assert_eq!(desc.resource_type(), ResourceType::Volume);
        assert_eq!(desc.volume_name(), "vol1");
        assert_eq!(desc.bucket_name(), None);
        assert_eq!(desc.path(), "/vol1");
    }

    #[test]
    fn test_should_derive_bucket_descriptor() {
        let addr = resolve("/vol1/bucket1").expect("test resolve");
        let desc = ResourceDescriptor::from_address(&addr, StoreKind::S3).expect("test desc");
        assert_eq!(desc.resource_type(), ResourceType::Bucket);
        assert_eq!(desc.store_kind(), StoreKind::S3);
        assert_eq!(desc.path(), "/vol1/bucket1");
        assert_eq!(desc.to_string(), "S3 BUCKET /vol1/bucket1");
    }

    #[test]
    fn test_should_reject_key_address() {
        let addr = resolve("/vol1/bucket1/key1").expect("test resolve");
        assert!(matches!(
            ResourceDescriptor::from_address(&addr, StoreKind::Native),
            Err(ShellError::MalformedAddress { .. })
        ));
    }

    #[test]
    fn test_should_reject_store_root() {
        let addr = resolve("o3://om1/").expect("test resolve");
        assert!(matches!(
            ResourceDescriptor::from_address(&addr, StoreKind::Native),
            Err(ShellError::InsufficientAddress { .. })
        ));
    }

    #[test]
    fn test_should_validate_names_on_construction() {
        assert!(ResourceDescriptor::new(StoreKind::Native, "", None).is_err());
        assert!(ResourceDescriptor::new(StoreKind::Native, "v", Some(String::new())).is_err());
        assert!(ResourceDescriptor::new(StoreKind::Native, "v", Some("b".to_owned())).is_ok());
    }
}
