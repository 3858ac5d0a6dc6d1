//! ACL administration core for Ozone-style object stores.
//!
//! This crate holds everything the `ozone-sh` binary needs to replace the
//! ACL set of a volume or bucket: the locator grammar, the compact ACL grant
//! grammar, the request descriptor, the store client boundary and the
//! replace operation itself.
//!
//! # Architecture
//!
//! ```text
//!   locator string          ACL string
//!        |                      |
//!        v                      v
//!  address::resolve      acl_spec::parse
//!        |                      |
//!        +----------+-----------+
//!                   v
//!        ops::AclReplaceOperation
//!                   |
//!                   v
//!   client::ObjectStoreClient (store::*)
//! ```

pub mod acl;
pub mod acl_spec;
pub mod address;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ops;
pub mod store;
pub mod types;

pub use acl::{AclEntry, AclScope, AclSpec, Principal, PrincipalKind, Right, Rights};
pub use address::ResourceAddress;
pub use config::ShellConfig;
pub use descriptor::ResourceDescriptor;
pub use error::{ClientError, ShellError, ShellResult};
pub use ops::{AclReplaceOperation, ReplaceOutcome};
pub use types::{ResourceKind, ResourceType, StoreKind};
