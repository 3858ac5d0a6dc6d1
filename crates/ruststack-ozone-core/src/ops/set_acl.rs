//! Replace the full ACL set of a volume or bucket.
//!
//! The operation is a single request: build the descriptor, open a
//! connection, submit the new set, report whether it changed anything. It
//! never retries, because "changed" and "already set" are only meaningful
//! for one attempt. A failed call leaves the resource as it was; there is no
//! compensating action on the client side.

use std::fmt;

use tracing::{debug, info, warn};

use crate::acl::AclSpec;
use crate::address::ResourceAddress;
use crate::client::{Endpoint, ObjectStoreClient};
use crate::descriptor::ResourceDescriptor;
use crate::error::{ShellError, ShellResult};
use crate::types::StoreKind;

/// Result of a successful replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOutcome {
    /// Whether the stored ACL set differs from before the call.
    pub changed: bool,
}

impl ReplaceOutcome {
    /// The line reported to the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        if self.changed {
            "ACL(s) set successfully."
        } else {
            "ACL(s) already set."
        }
    }
}

impl fmt::Display for ReplaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Submits complete ACL sets through an [`ObjectStoreClient`].
///
/// # Examples
///
/// ```
/// use ruststack_ozone_core::acl_spec::parse;
/// use ruststack_ozone_core::address::resolve;
/// use ruststack_ozone_core::client::Endpoint;
/// use ruststack_ozone_core::ops::AclReplaceOperation;
/// use ruststack_ozone_core::store::InMemoryObjectStore;
///
/// # tokio_test::block_on(async {
/// let op = AclReplaceOperation::new(InMemoryObjectStore::new(), Endpoint::new("om1"));
/// let address = resolve("/vol1").unwrap();
/// let spec = parse("user:bob:rw").unwrap();
///
/// let first = op.execute(&address, &spec, None).await.unwrap();
/// let second = op.execute(&address, &spec, None).await.unwrap();
/// assert!(first.changed);
/// assert!(!second.changed);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct AclReplaceOperation<C> {
    client: C,
    default_endpoint: Endpoint,
}

impl<C: ObjectStoreClient> AclReplaceOperation<C> {
    /// Create an operation using `client`, connecting to `default_endpoint`
    /// when an address names no service.
    #[must_use]
    pub fn new(client: C, default_endpoint: Endpoint) -> Self {
        Self {
            client,
            default_endpoint,
        }
    }

    /// The underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Build the request descriptor.
    ///
    /// The address is authoritative for names and resource type only. The
    /// store kind is `store_override` if given, otherwise native, whatever
    /// scheme the locator used.
    ///
    /// # Errors
    ///
    /// - [`ShellError::UnknownStoreKind`] if `store_override` is not a
    ///   recognized token.
    /// - [`ShellError::InsufficientAddress`] if the address names no volume.
    /// - [`ShellError::MalformedAddress`] if the address names a key.
    pub fn descriptor(
        &self,
        address: &ResourceAddress,
        store_override: Option<&str>,
    ) -> ShellResult<ResourceDescriptor> {
        let store_kind = match store_override {
            Some(token) => token.parse::<StoreKind>()?,
            None => StoreKind::Native,
        };
        ResourceDescriptor::from_address(address, store_kind)
    }

    /// The endpoint an address is served by.
    #[must_use]
    pub fn endpoint(&self, address: &ResourceAddress) -> Endpoint {
        address
            .service_id()
            .map_or_else(|| self.default_endpoint.clone(), Endpoint::new)
    }

    /// Replace the ACL set of the addressed resource with `spec`.
    ///
    /// Validation happens before any connection is opened. The connection
    /// is dropped, and so released, on every return path.
    ///
    /// # Errors
    ///
    /// - Any error of [`descriptor`](Self::descriptor), raised before
    ///   connecting.
    /// - [`ShellError::RemoteCallFailed`] if connecting or the replace call
    ///   fails.
    pub async fn execute(
        &self,
        address: &ResourceAddress,
        spec: &AclSpec,
        store_override: Option<&str>,
    ) -> ShellResult<ReplaceOutcome> {
        let descriptor = self.descriptor(address, store_override)?;
        let endpoint = self.endpoint(address);

        debug!(
            service_id = %endpoint,
            resource = %descriptor,
            entries = spec.len(),
            "submitting ACL replacement"
        );

        let mut conn = self.client.connect(&endpoint).await.map_err(|cause| {
            warn!(service_id = %endpoint, error = %cause, "connect failed");
            ShellError::RemoteCallFailed { cause }
        })?;

        let changed = conn
            .replace_acl(&descriptor, spec)
            .await
            .map_err(|cause| {
                warn!(resource = %descriptor, error = %cause, "replace ACL failed");
                ShellError::RemoteCallFailed { cause }
            })?;

        info!(resource = %descriptor, changed, "ACL replaced");
        Ok(ReplaceOutcome { changed })
    }
}
