//! Error types for the Ozone shell core.
//!
//! [`ShellError`] covers every way a single ACL command can fail. None of the
//! variants are recovered from internally; each aborts the invocation and is
//! reported to the caller with the offending input fragment.
//!
//! [`ClientError`] is what a [`crate::client::ObjectStoreClient`] raises. It
//! is wrapped, never flattened, by [`ShellError::RemoteCallFailed`].
//!
//! # Usage
//!
//! ```
//! use ruststack_ozone_core::error::ShellError;
//!
//! let err = ShellError::EmptyAclSpec;
//! assert_eq!(err.to_string(), "at least one ACL must be specified");
//! ```

use crate::types::ResourceKind;

/// Error raised while resolving, parsing or submitting an ACL command.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    // -----------------------------------------------------------------------
    // Address errors
    // -----------------------------------------------------------------------
    /// The locator string does not match the address grammar.
    #[error("invalid address '{address}': {reason}")]
    MalformedAddress {
        /// The raw locator string.
        address: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The locator is well formed but names less than the command requires.
    #[error("address '{address}' names a {actual}, but a {required} is required")]
    InsufficientAddress {
        /// The raw locator string.
        address: String,
        /// The minimum kind the caller asked for.
        required: ResourceKind,
        /// The kind the locator actually resolved to.
        actual: ResourceKind,
    },

    // -----------------------------------------------------------------------
    // ACL grammar errors
    // -----------------------------------------------------------------------
    /// No ACL clause was supplied.
    #[error("at least one ACL must be specified")]
    EmptyAclSpec,

    /// A clause has the wrong shape.
    #[error("invalid ACL '{clause}': {reason}")]
    MalformedAclClause {
        /// The offending clause.
        clause: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `a` or `n` was combined with other right codes.
    #[error("invalid ACL '{clause}': right '{shorthand}' cannot be combined with other rights")]
    ConflictingRightShorthand {
        /// The offending clause.
        clause: String,
        /// The shorthand letter as written.
        shorthand: char,
    },

    /// The rights token contains a letter that is not a right code.
    #[error(
        "invalid ACL '{clause}': unknown right code '{code}' (expected one of r, w, c, d, l, a, n, x, y)"
    )]
    UnrecognizedRightCode {
        /// The offending clause.
        clause: String,
        /// The unknown character.
        code: char,
    },

    /// The principal kind is not `user`, `group`, `world` or `anonymous`.
    #[error(
        "invalid ACL '{clause}': unknown principal type '{kind}' (expected user, group, world or anonymous)"
    )]
    UnrecognizedPrincipalKind {
        /// The offending clause.
        clause: String,
        /// The unknown principal token.
        kind: String,
    },

    // -----------------------------------------------------------------------
    // Request errors
    // -----------------------------------------------------------------------
    /// The `--store` override is not a known store kind.
    #[error("unknown store type '{token}' (expected one of OZONE, NATIVE, S3)")]
    UnknownStoreKind {
        /// The token as given.
        token: String,
    },

    /// The store client failed while connecting or serving the request.
    #[error("remote call failed: {cause}")]
    RemoteCallFailed {
        /// The underlying client failure.
        #[source]
        cause: ClientError,
    },
}

impl ShellError {
    pub(crate) fn malformed_address(address: &str, reason: impl Into<String>) -> Self {
        Self::MalformedAddress {
            address: address.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_clause(clause: &str, reason: impl Into<String>) -> Self {
        Self::MalformedAclClause {
            clause: clause.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<ClientError> for ShellError {
    fn from(cause: ClientError) -> Self {
        Self::RemoteCallFailed { cause }
    }
}

/// Error raised by an object store client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The service could not be reached.
    #[error("cannot connect to service '{service_id}': {message}")]
    Connect {
        /// The service that was dialed.
        service_id: String,
        /// Transport-level detail.
        message: String,
    },

    /// The caller is not allowed to perform the operation.
    #[error("permission denied: {message}")]
    Authentication {
        /// Server-provided detail.
        message: String,
    },

    /// The addressed resource does not exist.
    #[error("resource not found: {resource}")]
    NotFound {
        /// Path of the missing resource.
        resource: String,
    },

    /// The server rejected the request.
    #[error("server error {code}: {message}")]
    Server {
        /// Server result code.
        code: String,
        /// Server-provided detail.
        message: String,
    },

    /// Local I/O failure in a store backend.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Stored state could not be encoded or decoded.
    #[error("corrupt ACL state: {0}")]
    Codec(#[from] serde_json::Error),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;
