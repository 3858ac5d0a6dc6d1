//! RustStack Ozone shell - ACL administration for Ozone-style object stores.
//!
//! # Usage
//!
//! ```text
//! ozone-sh [--verbose] volume setacl <URI> --acls <ACLS> [--store <STORE>]
//! ozone-sh volume setacl o3://om1:9862/vol1 -al user:user1:rw,group:hadoop:a
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OZONE_SERVICE_ID` | `localhost` | Service used when the URI names no host |
//! | `OZONE_DATA_DIR` | `/var/lib/ruststack-ozone` | Local store data directory |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod cli;
mod handler;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ruststack_ozone_core::client::Endpoint;
use ruststack_ozone_core::store::LocalObjectStore;
use ruststack_ozone_core::{AclReplaceOperation, ShellConfig};

use crate::cli::{Cli, normalize_args};

/// Initialize the tracing subscriber, logging to stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let config = ShellConfig::from_env();

    init_tracing(&config.log_level)?;

    debug!(
        service_id = %config.service_id,
        data_dir = %config.data_dir.display(),
        "starting ozone shell"
    );

    let store = LocalObjectStore::new(&config.data_dir);
    let op = AclReplaceOperation::new(store, Endpoint::new(config.service_id.clone()));

    handler::run(cli, &op, &mut std::io::stdout()).await
}
