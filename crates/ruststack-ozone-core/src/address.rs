//! Resolution of user-supplied resource locators.
//!
//! A locator names the store root, or a volume and optionally a bucket and
//! key inside it:
//!
//! ```text
//! [scheme "://" [host [":" port]]] ["/"] [volume ["/" bucket ["/" key]]]
//! ```
//!
//! `o3` (or no scheme) records the native store, `s3` the S3 namespace. The
//! scheme only shapes the address; requests pick their store kind from an
//! explicit override and are native otherwise. The host segment picks which
//! store service to talk to; when absent the configured default service is
//! used.
//!
//! Resolution never invents missing segments. Commands that need a minimum
//! specificity assert it with [`ResourceAddress::ensure_at_least`] or
//! [`resolve_at_least`].
//!
//! # Examples
//!
//! ```
//! use ruststack_ozone_core::address::resolve;
//! use ruststack_ozone_core::types::{ResourceKind, StoreKind};
//!
//! let addr = resolve("o3://om1:9862/vol1/bucket1").unwrap();
//! assert_eq!(addr.store_kind(), StoreKind::Native);
//! assert_eq!(addr.service_id(), Some("om1:9862"));
//! assert_eq!(addr.volume_name(), Some("vol1"));
//! assert_eq!(addr.bucket_name(), Some("bucket1"));
//! assert_eq!(addr.resource_kind(), ResourceKind::Bucket);
//! ```

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ShellError, ShellResult};
use crate::types::{ResourceKind, StoreKind};

/// Separator between scheme and the rest of the locator.
const SCHEME_SEPARATOR: &str = "://";

/// Separator between path segments.
const PATH_SEPARATOR: char = '/';

/// A resolved, immutable resource identity.
///
/// A volume is present for every address except the store root, and is
/// never empty. A bucket is present for bucket and key addresses; a key only
/// for key addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    store_kind: StoreKind,
    service_id: Option<String>,
    volume_name: Option<String>,
    bucket_name: Option<String>,
    key_name: Option<String>,
}

impl ResourceAddress {
    /// The store namespace selected by the scheme.
    #[must_use]
    pub fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    /// The `host[:port]` segment, if the locator named one.
    #[must_use]
    pub fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    /// The volume name, absent for the store root.
    #[must_use]
    pub fn volume_name(&self) -> Option<&str> {
        self.volume_name.as_deref()
    }

    /// The bucket name, if any.
    #[must_use]
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket_name.as_deref()
    }

    /// The key name, if any.
    #[must_use]
    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    /// The most specific resource this address names.
    #[must_use]
    pub fn resource_kind(&self) -> ResourceKind {
        match (&self.volume_name, &self.bucket_name, &self.key_name) {
            (_, _, Some(_)) => ResourceKind::Key,
            (_, Some(_), None) => ResourceKind::Bucket,
            (Some(_), None, None) => ResourceKind::Volume,
            (None, None, None) => ResourceKind::Root,
        }
    }

    /// Require that this address names at least a `required` resource.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::InsufficientAddress`] if the address is less
    /// specific than `required`.
    pub fn ensure_at_least(&self, required: ResourceKind) -> ShellResult<()> {
        let actual = self.resource_kind();
        if actual < required {
            return Err(ShellError::InsufficientAddress {
                address: self.to_string(),
                required,
                actual,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SCHEME_SEPARATOR}{}/",
            self.store_kind.scheme(),
            self.service_id.as_deref().unwrap_or_default(),
        )?;
        if let Some(volume) = &self.volume_name {
            f.write_str(volume)?;
        }
        if let Some(bucket) = &self.bucket_name {
            write!(f, "/{bucket}")?;
        }
        if let Some(key) = &self.key_name {
            write!(f, "/{key}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourceAddress {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

/// Resolve a locator string into a [`ResourceAddress`].
///
/// # Errors
///
/// Returns [`ShellError::MalformedAddress`] if the scheme is unsupported,
/// the host or port is invalid, or a volume, bucket or key segment is
/// empty while a later segment is present. A locator with no path segments
/// resolves to the store root.
pub fn resolve(raw: &str) -> ShellResult<ResourceAddress> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShellError::malformed_address(raw, "address is empty"));
    }

    let (store_kind, service_id, path) = match trimmed.split_once(SCHEME_SEPARATOR) {
        Some((scheme, rest)) => {
            let store_kind = StoreKind::from_scheme(scheme).ok_or_else(|| {
                ShellError::malformed_address(
                    raw,
                    format!("unsupported scheme '{scheme}', expected o3 or s3"),
                )
            })?;
            let (authority, path) = rest
                .find(PATH_SEPARATOR)
                .map_or((rest, ""), |i| rest.split_at(i));
            validate_authority(raw, authority)?;
            let service_id = (!authority.is_empty()).then(|| authority.to_owned());
            (store_kind, service_id, path)
        }
        None => (StoreKind::Native, None, trimmed),
    };

    let path = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
    let path = path.strip_suffix(PATH_SEPARATOR).unwrap_or(path);

    let (volume_name, bucket_name, key_name) = if path.is_empty() {
        (None, None, None)
    } else {
        let mut segments = path.splitn(3, PATH_SEPARATOR);
        (
            non_empty_segment(raw, segments.next(), "volume")?,
            non_empty_segment(raw, segments.next(), "bucket")?,
            non_empty_segment(raw, segments.next(), "key")?,
        )
    };

    let address = ResourceAddress {
        store_kind,
        service_id,
        volume_name,
        bucket_name,
        key_name,
    };
    debug!(
        address = %address,
        kind = %address.resource_kind(),
        "resolved address"
    );
    Ok(address)
}

/// Resolve a locator and require a minimum specificity.
///
/// # Errors
///
/// Any error of [`resolve`], or [`ShellError::InsufficientAddress`] if the
/// locator names less than `required`.
pub fn resolve_at_least(raw: &str, required: ResourceKind) -> ShellResult<ResourceAddress> {
    let address = resolve(raw)?;
    address.ensure_at_least(required)?;
    Ok(address)
}

/// Validate an optional `host[:port]` authority.
fn validate_authority(raw: &str, authority: &str) -> ShellResult<()> {
    let host = match authority.rsplit_once(':') {
        Some((host, port)) => {
            if host.is_empty() {
                return Err(ShellError::malformed_address(raw, "service host is empty"));
            }
            if port.parse::<u16>().is_err() {
                return Err(ShellError::malformed_address(
                    raw,
                    format!("invalid service port '{port}'"),
                ));
            }
            host
        }
        None => authority,
    };
    if !host.is_empty() && host.chars().all(|c| c == '.') {
        return Err(ShellError::malformed_address(
            raw,
            format!("invalid service host '{host}'"),
        ));
    }
    Ok(())
}

fn non_empty_segment(
    raw: &str,
    segment: Option<&str>,
    what: &str,
) -> ShellResult<Option<String>> {
    match segment {
        Some("") => Err(ShellError::malformed_address(
            raw,
            format!("{what} name is empty"),
        )),
        Some(s) => Ok(Some(s.to_owned())),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_resolve_volume_without_scheme() {
        for raw in ["vol1", "/vol1", "/vol1/"] {
            let addr = resolve(raw).expect("test resolve");
            assert_eq!(addr.store_kind(), StoreKind::Native, "{raw}");
            assert_eq!(addr.service_id(), None);
            assert_eq!(addr.volume_name(), Some("vol1"));
            assert_eq!(addr.bucket_name(), None);
            assert_eq!(addr.resource_kind(), ResourceKind::Volume);
        }
    }

    #[test]
    fn test_should_resolve_bucket_with_service() {
        let addr = resolve("o3://om-host:9862/vol1/bucket1").expect("test resolve");
        assert_eq!(addr.service_id(), Some("om-host:9862"));
        assert_eq!(addr.volume_name(), Some("vol1"));
        assert_eq!(addr.bucket_name(), Some("bucket1"));
        assert_eq!(addr.key_name(), None);
        assert_eq!(addr.resource_kind(), ResourceKind::Bucket);
    }

    #[test]
    fn test_should_resolve_s3_scheme() {
        let addr = resolve("s3:///s3v/photos").expect("test resolve");
        assert_eq!(addr.store_kind(), StoreKind::S3);
        assert_eq!(addr.service_id(), None);
        assert_eq!(addr.bucket_name(), Some("photos"));
    }

    #[test]
    fn test_should_keep_slashes_inside_key() {
        let addr = resolve("/vol1/bucket1/dir/file.txt").expect("test resolve");
        assert_eq!(addr.key_name(), Some("dir/file.txt"));
        assert_eq!(addr.resource_kind(), ResourceKind::Key);
    }

    #[test]
    fn test_should_reject_empty_address() {
        for raw in ["", "  "] {
            assert!(
                matches!(resolve(raw), Err(ShellError::MalformedAddress { .. })),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_should_resolve_store_root() {
        for raw in ["/", "o3://om-host/", "o3://", "s3:///"] {
            let addr = resolve(raw).expect("test resolve");
            assert_eq!(addr.resource_kind(), ResourceKind::Root, "{raw}");
            assert_eq!(addr.volume_name(), None);
        }
    }

    #[test]
    fn test_should_require_volume_for_store_root() {
        let err = resolve_at_least("o3://om1/", ResourceKind::Volume).expect_err("test resolve");
        assert!(matches!(
            err,
            ShellError::InsufficientAddress {
                required: ResourceKind::Volume,
                actual: ResourceKind::Root,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "address 'o3://om1/' names a store root, but a volume is required"
        );
    }

    #[test]
    fn test_should_reject_dot_only_hosts() {
        for raw in ["o3://../vol1", "o3://./vol1", "o3://..:9862/vol1"] {
            assert!(
                matches!(resolve(raw), Err(ShellError::MalformedAddress { .. })),
                "{raw:?} should be malformed"
            );
        }
        assert!(resolve("o3://om.example.com/vol1").is_ok());
    }

    #[test]
    fn test_should_reject_unsupported_scheme() {
        let err = resolve("http://host/vol1").expect_err("test resolve");
        assert!(err.to_string().contains("unsupported scheme 'http'"));
    }

    #[test]
    fn test_should_reject_bad_port() {
        assert!(matches!(
            resolve("o3://host:port/vol1"),
            Err(ShellError::MalformedAddress { .. })
        ));
        assert!(matches!(
            resolve("o3://:9862/vol1"),
            Err(ShellError::MalformedAddress { .. })
        ));
    }

    #[test]
    fn test_should_reject_empty_interior_segment() {
        for raw in ["/vol1//key", "o3://h//b"] {
            assert!(
                matches!(resolve(raw), Err(ShellError::MalformedAddress { .. })),
                "{raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_should_enforce_minimum_kind() {
        let addr = resolve("/vol1").expect("test resolve");
        assert!(addr.ensure_at_least(ResourceKind::Volume).is_ok());
        assert!(matches!(
            addr.ensure_at_least(ResourceKind::Bucket),
            Err(ShellError::InsufficientAddress {
                required: ResourceKind::Bucket,
                actual: ResourceKind::Volume,
                ..
            })
        ));
        assert!(resolve_at_least("/vol1/b1", ResourceKind::Bucket).is_ok());
        assert!(resolve_at_least("/vol1", ResourceKind::Key).is_err());
    }

    #[test]
    fn test_should_round_trip_through_display() {
        for raw in [
            "o3:///vol1",
            "o3://om1/",
            "o3://om1:9862/vol1/bucket1",
            "s3:///s3v/bucket1/a/b",
        ] {
            let addr = resolve(raw).expect("test resolve");
            assert_eq!(addr.to_string(), raw);
            assert_eq!(resolve(&addr.to_string()).expect("test reparse"), addr);
        }
        let bare = resolve("/vol1/bucket1").expect("test resolve");
        assert_eq!(bare.to_string(), "o3:///vol1/bucket1");
        assert_eq!(bare.to_string().parse::<ResourceAddress>().ok(), Some(bare));
    }
}
