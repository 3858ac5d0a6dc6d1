//! Object store client collaborator.
//!
//! This is the boundary between the shell's command logic and whatever
//! transport reaches the store service. The core only needs two calls:
//! open a connection, and replace the ACL set of one resource on it.
//!
//! # Connection lifetime
//!
//! A [`StoreConnection`] is released when it is dropped. Implementations
//! close sockets, flush state or release locks in `Drop`, so every exit path
//! of a caller releases the connection without explicit cleanup.
//!
//! # Object safety
//!
//! Both traits use `#[async_trait]` so they can be used as
//! `Arc<dyn ObjectStoreClient>` and `Box<dyn StoreConnection>`.

use std::fmt;

use async_trait::async_trait;

use crate::acl::AclSpec;
use crate::descriptor::ResourceDescriptor;
use crate::error::ClientError;

/// Which store service instance to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Service identifier, typically `host[:port]` or a service id.
    pub service_id: String,
}

impl Endpoint {
    /// Create an endpoint.
    #[must_use]
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.service_id)
    }
}

/// Factory for connections to a store service.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync + fmt::Debug {
    /// Open a connection to `endpoint`.
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn StoreConnection>, ClientError>;
}

/// An open connection to a store service.
#[async_trait]
pub trait StoreConnection: Send + fmt::Debug {
    /// Replace the complete ACL set of `descriptor` with `entries`.
    ///
    /// Returns `true` if the stored set changed and `false` if it already
    /// equalled `entries`. The replacement is applied atomically or not at
    /// all.
    async fn replace_acl(
        &mut self,
        descriptor: &ResourceDescriptor,
        entries: &AclSpec,
    ) -> Result<bool, ClientError>;
}
