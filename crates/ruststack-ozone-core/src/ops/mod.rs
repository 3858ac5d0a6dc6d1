//! Shell operations.
//!
//! Each submodule implements one command against an
//! [`ObjectStoreClient`](crate::client::ObjectStoreClient).

pub mod set_acl;

pub use set_acl::{AclReplaceOperation, ReplaceOutcome};
