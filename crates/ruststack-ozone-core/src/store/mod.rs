//! Object store client implementations.
//!
//! - [`InMemoryObjectStore`]: process-local store, shared across clones.
//!   Supports fault injection and connection accounting for tests.
//! - [`LocalObjectStore`]: file-backed store under a data directory, one
//!   JSON document per service.
//!
//! Both apply the same server semantics: the stored ACL set of a resource is
//! replaced wholesale, and a replace reports "changed" unless the submitted
//! entries already equal the stored ones as a set.

mod local;
mod memory;

pub use local::LocalObjectStore;
pub use memory::InMemoryObjectStore;
