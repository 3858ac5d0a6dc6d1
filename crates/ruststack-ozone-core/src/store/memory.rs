//! In-memory object store client.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use tracing::debug;

use crate::acl::{AclEntry, AclSpec};
use crate::client::{Endpoint, ObjectStoreClient, StoreConnection};
use crate::descriptor::ResourceDescriptor;
use crate::error::ClientError;
use crate::types::StoreKind;

/// Storage key: service, namespace, resource path.
type ResourceKey = (String, StoreKind, String);

/// Shared state behind every clone of an [`InMemoryObjectStore`].
#[derive(Debug, Default)]
struct MemoryState {
    acls: DashMap<ResourceKey, BTreeSet<AclEntry>>,
    registered: DashSet<ResourceKey>,
    strict: bool,
    open_connections: AtomicUsize,
    replace_calls: AtomicUsize,
    connect_fault: Mutex<Option<ClientError>>,
    replace_fault: Mutex<Option<ClientError>>,
}

/// A store client that keeps ACL sets in memory.
///
/// Clones share state, so a test can hand one clone to the code under test
/// and inspect the other.
///
/// # Examples
///
/// ```
/// use ruststack_ozone_core::store::InMemoryObjectStore;
///
/// let store = InMemoryObjectStore::new();
/// assert_eq!(store.open_connections(), 0);
/// assert_eq!(store.replace_calls(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<MemoryState>,
}

impl InMemoryObjectStore {
    /// Create a store that accepts ACLs for any resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that only knows resources added with
    /// [`register`](Self::register); others fail with
    /// [`ClientError::NotFound`].
    #[must_use]
    pub fn strict() -> Self {
        Self {
            state: Arc::new(MemoryState {
                strict: true,
                ..MemoryState::default()
            }),
        }
    }

    /// Make a resource known to a strict store.
    pub fn register(&self, endpoint: &Endpoint, descriptor: &ResourceDescriptor) {
        self.state.registered.insert(key(endpoint, descriptor));
    }

    /// The stored ACL set of a resource, in canonical order.
    #[must_use]
    pub fn acl(
        &self,
        endpoint: &Endpoint,
        descriptor: &ResourceDescriptor,
    ) -> Option<Vec<AclEntry>> {
        self.state
            .acls
            .get(&key(endpoint, descriptor))
            .map(|set| set.iter().cloned().collect())
    }

    /// Number of connections currently open.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.state.open_connections.load(Ordering::SeqCst)
    }

    /// Number of `replace_acl` calls received, successful or not.
    #[must_use]
    pub fn replace_calls(&self) -> usize {
        self.state.replace_calls.load(Ordering::SeqCst)
    }

    /// Fail the next `connect` with `err`.
    pub fn fail_next_connect(&self, err: ClientError) {
        *self.state.connect_fault.lock() = Some(err);
    }

    /// Fail the next `replace_acl` with `err`, leaving stored state as is.
    pub fn fail_next_replace(&self, err: ClientError) {
        *self.state.replace_fault.lock() = Some(err);
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn StoreConnection>, ClientError> {
        if let Some(err) = self.state.connect_fault.lock().take() {
            return Err(err);
        }
        self.state.open_connections.fetch_add(1, Ordering::SeqCst);
        debug!(service_id = %endpoint, "opened in-memory connection");
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
            endpoint: endpoint.clone(),
        }))
    }
}

/// A connection to an [`InMemoryObjectStore`].
#[derive(Debug)]
struct MemoryConnection {
    state: Arc<MemoryState>,
    endpoint: Endpoint,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn replace_acl(
        &mut self,
        descriptor: &ResourceDescriptor,
        entries: &AclSpec,
    ) -> Result<bool, ClientError> {
        self.state.replace_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.state.replace_fault.lock().take() {
            return Err(err);
        }

        let key = key(&self.endpoint, descriptor);
        if self.state.strict && !self.state.registered.contains(&key) {
            return Err(ClientError::NotFound {
                resource: descriptor.path(),
            });
        }

        // An absent resource holds the empty set.
        let submitted = entries.to_set();
        let changed = match self.state.acls.entry(key) {
            Entry::Occupied(mut stored) => {
                if *stored.get() == submitted {
                    false
                } else {
                    stored.insert(submitted);
                    true
                }
            }
            Entry::Vacant(slot) => {
                if submitted.is_empty() {
                    false
                } else {
                    slot.insert(submitted);
                    true
                }
            }
        };
        Ok(changed)
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.state.open_connections.fetch_sub(1, Ordering::SeqCst);
        debug!(service_id = %self.endpoint, "closed in-memory connection");
    }
}

fn key(endpoint: &Endpoint, descriptor: &ResourceDescriptor) -> ResourceKey {
    (
        endpoint.service_id.clone(),
        descriptor.store_kind(),
        descriptor.path(),
    )
}
