//! Parser for the compact ACL grant grammar.
//!
//! ```text
//! spec    = clause *( "," clause )
//! clause  = kind ":" name ":" rights [ "[" scope "]" ]
//!         | kind ":" rights [ "[" scope "]" ]          ; world / anonymous only
//! kind    = "user" | "group" | "world" | "anonymous"   ; case-insensitive
//! rights  = 1*( "r" | "w" | "c" | "d" | "l" | "x" | "y" ) | "a" | "n"
//! scope   = "ACCESS" | "DEFAULT"                       ; case-insensitive
//! ```
//!
//! Whitespace around clauses is ignored. An empty spec is rejected so that
//! a missing value can never clear every ACL on a resource.
//!
//! # Examples
//!
//! ```
//! use ruststack_ozone_core::acl::{Principal, Rights};
//! use ruststack_ozone_core::acl_spec::parse;
//!
//! let spec = parse("user:user1:rw,group:hadoop:a").unwrap();
//! assert_eq!(spec.len(), 2);
//! assert_eq!(spec.entries()[1].principal, Principal::Group("hadoop".into()));
//! assert_eq!(spec.entries()[1].rights, Rights::all());
//! ```

use tracing::debug;

use crate::acl::{AclEntry, AclScope, AclSpec, Principal, PrincipalKind, Right, Rights};
use crate::error::{ShellError, ShellResult};

/// Separator between clauses.
const CLAUSE_DELIMITER: char = ',';

/// Separator between the fields of one clause.
const FIELD_DELIMITER: char = ':';

/// Shorthand for the full right set.
const ALL_CODE: char = 'a';

/// Shorthand for the empty right set.
const NONE_CODE: char = 'n';

/// Parse a comma-separated list of ACL clauses.
///
/// Entries are returned in input order; duplicates are kept.
///
/// # Errors
///
/// - [`ShellError::EmptyAclSpec`] if `raw` is empty or blank.
/// - [`ShellError::MalformedAclClause`] for a wrong field count, a missing
///   name, an empty rights token or a bad scope suffix.
/// - [`ShellError::UnrecognizedPrincipalKind`] for an unknown principal type.
/// - [`ShellError::UnrecognizedRightCode`] for an unknown right letter.
/// - [`ShellError::ConflictingRightShorthand`] when `a` or `n` is combined
///   with other letters.
pub fn parse(raw: &str) -> ShellResult<AclSpec> {
    if raw.trim().is_empty() {
        return Err(ShellError::EmptyAclSpec);
    }

    let entries = raw
        .split(CLAUSE_DELIMITER)
        .map(|clause| parse_clause(clause.trim()))
        .collect::<ShellResult<Vec<_>>>()?;

    debug!(entries = entries.len(), "parsed ACL spec");
    Ok(AclSpec::new(entries))
}

/// Parse a single clause, e.g. `user:bob:rw` or `world::r[DEFAULT]`.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_clause(clause: &str) -> ShellResult<AclEntry> {
    if clause.is_empty() {
        return Err(ShellError::malformed_clause(clause, "empty ACL clause"));
    }

    let fields: Vec<&str> = clause.split(FIELD_DELIMITER).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(ShellError::malformed_clause(
            clause,
            "expected 'type:name:rights'",
        ));
    }

    let kind_token = fields[0].trim();
    let kind = PrincipalKind::from_token(kind_token).ok_or_else(|| {
        ShellError::UnrecognizedPrincipalKind {
            clause: clause.to_owned(),
            kind: kind_token.to_owned(),
        }
    })?;

    let (name, rights_field) = match fields[..] {
        [_, name, rights] => (Some(name.trim()), rights),
        _ => (None, fields[1]),
    };

    let principal = parse_principal(clause, kind, name)?;
    let (rights, scope) = parse_rights_field(clause, rights_field.trim())?;

    Ok(AclEntry::new(principal, rights).with_scope(scope))
}

/// Build the principal for `kind`, validating the name field.
fn parse_principal(
    clause: &str,
    kind: PrincipalKind,
    name: Option<&str>,
) -> ShellResult<Principal> {
    if kind.requires_name() {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_owned(),
            Some(_) => {
                return Err(ShellError::malformed_clause(
                    clause,
                    format!("a {kind} ACL requires a name"),
                ));
            }
            None => {
                return Err(ShellError::malformed_clause(
                    clause,
                    format!("a {kind} ACL must have the form '{kind}:name:rights'"),
                ));
            }
        };
        return Ok(match kind {
            PrincipalKind::User => Principal::User(name),
            _ => Principal::Group(name),
        });
    }

    // A world/anonymous clause may spell its own kind as the name.
    if let Some(n) = name {
        if !n.is_empty() && !n.eq_ignore_ascii_case(kind.as_str()) {
            return Err(ShellError::malformed_clause(
                clause,
                format!("a {kind} ACL takes no name, got '{n}'"),
            ));
        }
    }

    Ok(match kind {
        PrincipalKind::World => Principal::World,
        _ => Principal::Anonymous,
    })
}

/// Split a rights field into its rights token and optional scope suffix.
fn parse_rights_field(clause: &str, field: &str) -> ShellResult<(Rights, AclScope)> {
    let (token, scope) = match field.find('[') {
        Some(open) => {
            let Some(inner) = field[open + 1..].strip_suffix(']') else {
                return Err(ShellError::malformed_clause(
                    clause,
                    "unterminated ACL scope, expected '[ACCESS]' or '[DEFAULT]'",
                ));
            };
            let scope = AclScope::from_token(inner).ok_or_else(|| {
                ShellError::malformed_clause(
                    clause,
                    format!("unknown ACL scope '{inner}', expected ACCESS or DEFAULT"),
                )
            })?;
            (&field[..open], scope)
        }
        None => (field, AclScope::Access),
    };

    Ok((parse_rights(clause, token)?, scope))
}

/// Expand a rights token character by character.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_rights(clause: &str, token: &str) -> ShellResult<Rights> {
    if token.is_empty() {
        return Err(ShellError::malformed_clause(clause, "no rights specified"));
    }

    let mut rights = Vec::with_capacity(token.len());
    let mut shorthand = None;
    for code in token.chars() {
        let lower = code.to_ascii_lowercase();
        if lower == ALL_CODE || lower == NONE_CODE {
            shorthand = Some(code);
            continue;
        }
        match Right::from_code(code) {
            Some(right) => rights.push(right),
            None => {
                return Err(ShellError::UnrecognizedRightCode {
                    clause: clause.to_owned(),
                    code,
                });
            }
        }
    }

    match shorthand {
        None => Ok(rights.into_iter().collect()),
        Some(code) if token.chars().count() > 1 => Err(ShellError::ConflictingRightShorthand {
            clause: clause.to_owned(),
            shorthand: code,
        }),
        Some(code) if code.eq_ignore_ascii_case(&ALL_CODE) => Ok(Rights::all()),
        Some(_) => Ok(Rights::none()),
    }
}
