//! ACL data model: rights, principals, entries and ordered ACL sets.
//!
//! Every type here renders back to the textual grammar accepted by
//! [`crate::acl_spec::parse`], so `entry.to_string()` re-parses to an equal
//! entry.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShellError;

// ---------------------------------------------------------------------------
// Right
// ---------------------------------------------------------------------------

/// A single permitted operation class.
///
/// The `a` (all) and `n` (none) shorthands are not rights of their own; they
/// expand to [`Rights::all`] and [`Rights::none`] when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Right {
    /// Read data.
    Read,
    /// Write data.
    Write,
    /// Create children.
    Create,
    /// Delete the resource or its children.
    Delete,
    /// List children.
    List,
    /// Read the ACL.
    ReadAcl,
    /// Modify the ACL.
    WriteAcl,
}

impl Right {
    /// Every right, in canonical rendering order.
    pub const ALL: [Self; 7] = [
        Self::Read,
        Self::Write,
        Self::Create,
        Self::Delete,
        Self::List,
        Self::ReadAcl,
        Self::WriteAcl,
    ];

    /// The lowercase single-letter code.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Read => 'r',
            Self::Write => 'w',
            Self::Create => 'c',
            Self::Delete => 'd',
            Self::List => 'l',
            Self::ReadAcl => 'x',
            Self::WriteAcl => 'y',
        }
    }

    /// Look up a right by its code, ignoring ASCII case.
    #[must_use]
    pub fn from_code(code: char) -> Option<Self> {
        match code.to_ascii_lowercase() {
            'r' => Some(Self::Read),
            'w' => Some(Self::Write),
            'c' => Some(Self::Create),
            'd' => Some(Self::Delete),
            'l' => Some(Self::List),
            'x' => Some(Self::ReadAcl),
            'y' => Some(Self::WriteAcl),
            _ => None,
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::List => "LIST",
            Self::ReadAcl => "READ_ACL",
            Self::WriteAcl => "WRITE_ACL",
        })
    }
}

// ---------------------------------------------------------------------------
// Rights
// ---------------------------------------------------------------------------

/// The expanded set of rights of one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rights(BTreeSet<Right>);

impl Rights {
    /// The full right set (`a`).
    #[must_use]
    pub fn all() -> Self {
        Self(Right::ALL.into_iter().collect())
    }

    /// The empty right set (`n`).
    #[must_use]
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Whether `right` is granted.
    #[must_use]
    pub fn contains(&self, right: Right) -> bool {
        self.0.contains(&right)
    }

    /// Whether every right is granted.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.0.len() == Right::ALL.len()
    }

    /// Whether no right is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Granted rights in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Right> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Right> for Rights {
    fn from_iter<I: IntoIterator<Item = Right>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return f.write_str("a");
        }
        if self.is_empty() {
            return f.write_str("n");
        }
        for right in self.iter() {
            write!(f, "{}", right.code())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// The kind of subject an entry grants rights to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrincipalKind {
    /// A named user.
    User,
    /// A named group.
    Group,
    /// Every authenticated caller.
    World,
    /// Unauthenticated callers.
    Anonymous,
}

impl PrincipalKind {
    /// The lowercase token used in ACL clauses.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::World => "world",
            Self::Anonymous => "anonymous",
        }
    }

    /// Look up a kind by token, ignoring ASCII case.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        [Self::User, Self::Group, Self::World, Self::Anonymous]
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(token))
    }

    /// Whether clauses of this kind carry a principal name.
    #[must_use]
    pub fn requires_name(&self) -> bool {
        matches!(self, Self::User | Self::Group)
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subject of a grant.
///
/// Named kinds always carry a non-empty name; `World` and `Anonymous` never
/// carry one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "name")]
pub enum Principal {
    /// A named user.
    User(String),
    /// A named group.
    Group(String),
    /// Every authenticated caller.
    World,
    /// Unauthenticated callers.
    Anonymous,
}

impl Principal {
    /// The principal's kind.
    #[must_use]
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Self::User(_) => PrincipalKind::User,
            Self::Group(_) => PrincipalKind::Group,
            Self::World => PrincipalKind::World,
            Self::Anonymous => PrincipalKind::Anonymous,
        }
    }

    /// The principal's name, absent for `World` and `Anonymous`.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::User(name) | Self::Group(name) => Some(name),
            Self::World | Self::Anonymous => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AclScope
// ---------------------------------------------------------------------------

/// Whether an entry applies to the resource itself or is inherited by
/// resources created beneath it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclScope {
    /// Applies to the resource (default).
    #[default]
    Access,
    /// Inherited by children created after the ACL is set.
    Default,
}

impl AclScope {
    /// The bracketed token name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Default => "DEFAULT",
        }
    }

    /// Look up a scope by token, ignoring ASCII case.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        [Self::Access, Self::Default]
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(token))
    }
}

// ---------------------------------------------------------------------------
// AclEntry
// ---------------------------------------------------------------------------

/// One grant: a principal, its expanded rights, and the grant scope.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclEntry {
    /// Who the grant applies to.
    pub principal: Principal,
    /// What they may do.
    pub rights: Rights,
    /// Where the grant applies.
    #[serde(default)]
    pub scope: AclScope,
}

impl AclEntry {
    /// Create an access-scoped entry.
    #[must_use]
    pub fn new(principal: Principal, rights: Rights) -> Self {
        Self {
            principal,
            rights,
            scope: AclScope::Access,
        }
    }

    /// Set the scope.
    #[must_use]
    pub fn with_scope(mut self, scope: AclScope) -> Self {
        self.scope = scope;
        self
    }
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.principal.kind(),
            self.principal.name().unwrap_or_default(),
            self.rights
        )?;
        if self.scope != AclScope::Access {
            write!(f, "[{}]", self.scope.as_str())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AclSpec
// ---------------------------------------------------------------------------

/// An ordered list of entries, one per clause, in input order.
///
/// Duplicate principals are kept as given; merging is the server's call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AclSpec(Vec<AclEntry>);

impl AclSpec {
    /// Wrap a list of entries.
    #[must_use]
    pub fn new(entries: Vec<AclEntry>) -> Self {
        Self(entries)
    }

    /// The entries in input order.
    #[must_use]
    pub fn entries(&self) -> &[AclEntry] {
        &self.0
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the entries in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, AclEntry> {
        self.0.iter()
    }

    /// The entries as an unordered set, for server-side equality checks.
    #[must_use]
    pub fn to_set(&self) -> BTreeSet<AclEntry> {
        self.0.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for &'a AclSpec {
    type Item = &'a AclEntry;
    type IntoIter = std::slice::Iter<'a, AclEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AclSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl FromStr for AclSpec {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::acl_spec::parse(s)
    }
}
