//! Command handlers bridging the CLI to the core operations.

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use ruststack_ozone_core::address::resolve_at_least;
use ruststack_ozone_core::client::ObjectStoreClient;
use ruststack_ozone_core::{AclReplaceOperation, ResourceKind, acl_spec};

use crate::cli::{Cli, Command, SetAclArgs, VolumeCommand};

/// Run a parsed command, writing user-facing output to `out`.
pub async fn run<C: ObjectStoreClient>(
    cli: Cli,
    op: &AclReplaceOperation<C>,
    out: &mut impl Write,
) -> Result<()> {
    match cli.command {
        Command::Volume(VolumeCommand::SetAcl(args)) => set_acl(op, &args, cli.verbose, out).await,
    }
}

/// `volume setacl`: replace the ACL set of a volume or bucket.
///
/// All input is validated before anything is printed, so a rejected
/// invocation produces no output.
async fn set_acl<C: ObjectStoreClient>(
    op: &AclReplaceOperation<C>,
    args: &SetAclArgs,
    verbose: bool,
    out: &mut impl Write,
) -> Result<()> {
    let address = resolve_at_least(&args.uri, ResourceKind::Volume)?;
    let spec = acl_spec::parse(&args.acls)?;
    let descriptor = op.descriptor(&address, args.store.as_deref())?;
    debug!(resource = %descriptor, acls = %spec, "setacl validated");

    if verbose {
        writeln!(
            out,
            "Volume Name : {}",
            address.volume_name().unwrap_or_default()
        )?;
        writeln!(
            out,
            "Bucket Name : {}",
            address.bucket_name().unwrap_or_default()
        )?;
    }

    let outcome = op.execute(&address, &spec, args.store.as_deref()).await?;
    writeln!(out, "{outcome}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use ruststack_ozone_core::client::Endpoint;
    use ruststack_ozone_core::store::InMemoryObjectStore;
    use ruststack_ozone_core::{ClientError, ShellError};

    use super::*;

    fn setacl(uri: &str, acls: &str, store: Option<&str>, verbose: bool) -> Cli {
        Cli {
            verbose,
            command: Command::Volume(VolumeCommand::SetAcl(SetAclArgs {
                uri: uri.to_owned(),
                acls: acls.to_owned(),
                store: store.map(ToOwned::to_owned),
            })),
        }
    }

    fn operation() -> (AclReplaceOperation<InMemoryObjectStore>, InMemoryObjectStore) {
        let store = InMemoryObjectStore::new();
        (
            AclReplaceOperation::new(store.clone(), Endpoint::new("localhost")),
            store,
        )
    }

    async fn output(
        cli: Cli,
        op: &AclReplaceOperation<InMemoryObjectStore>,
    ) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(cli, op, &mut out).await;
        (result, String::from_utf8(out).expect("test utf8"))
    }

    #[tokio::test]
    async fn test_should_print_single_result_line() {
        let (op, _store) = operation();
        let cli = setacl("/vol1", "user:user1:rw,user:user2:a,group:hadoop:a", None, false);
        let (result, out) = output(cli, &op).await;
        result.expect("test run");
        assert_eq!(out, "ACL(s) set successfully.\n");

        let cli = setacl("/vol1", "group:hadoop:a,user:user2:a,user:user1:rw", None, false);
        let (result, out) = output(cli, &op).await;
        result.expect("test run");
        assert_eq!(out, "ACL(s) already set.\n");
    }

    #[tokio::test]
    async fn test_should_print_names_when_verbose() {
        let (op, _store) = operation();
        let (result, out) = output(setacl("/vol1/bucket1", "world::r", None, true), &op).await;
        result.expect("test run");
        assert_eq!(
            out,
            "Volume Name : vol1\nBucket Name : bucket1\nACL(s) set successfully.\n"
        );

        let (_, out) = output(setacl("/vol2", "world::r", None, true), &op).await;
        assert!(out.starts_with("Volume Name : vol2\nBucket Name : \n"));
    }

    #[tokio::test]
    async fn test_should_print_nothing_on_validation_failure() {
        let (op, store) = operation();
        for cli in [
            setacl("/vol1", "", None, true),
            setacl("/vol1", "user:bob:ax", None, true),
            setacl("/vol1", "user:bob:r", Some("HDFS"), true),
            setacl("o3://host/", "user:bob:r", None, true),
        ] {
            let (result, out) = output(cli, &op).await;
            assert!(result.is_err());
            assert!(out.is_empty(), "unexpected output: {out}");
        }
        assert_eq!(store.open_connections(), 0);
        assert_eq!(store.replace_calls(), 0);
    }

    #[tokio::test]
    async fn test_should_require_volume_in_locator() {
        let (op, store) = operation();
        for uri in ["o3://host/", "/"] {
            let (result, out) = output(setacl(uri, "user:bob:r", None, true), &op).await;
            let err = result.expect_err("test run");
            assert!(
                matches!(
                    err.downcast_ref::<ShellError>(),
                    Some(ShellError::InsufficientAddress { .. })
                ),
                "{uri}: {err}"
            );
            assert!(out.is_empty());
        }
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn test_should_keep_error_kind_through_anyhow() {
        let (op, store) = operation();
        store.fail_next_replace(ClientError::Server {
            code: "VOLUME_NOT_FOUND".to_owned(),
            message: "vol1".to_owned(),
        });
        let (result, out) = output(setacl("/vol1", "user:bob:r", None, false), &op).await;
        let err = result.expect_err("test run");
        assert!(matches!(
            err.downcast_ref::<ShellError>(),
            Some(ShellError::RemoteCallFailed { .. })
        ));
        assert!(out.is_empty());
    }
}
