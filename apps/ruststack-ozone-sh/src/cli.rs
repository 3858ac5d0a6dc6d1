//! Command-line surface.

use std::ffi::OsString;

use clap::{Args, Parser, Subcommand};

/// Ozone object store shell.
#[derive(Debug, Parser)]
#[command(name = "ozone-sh", version, about, arg_required_else_help = true)]
pub struct Cli {
    /// Print resolved resource names before calling the service.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level command groups.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Volume commands.
    #[command(subcommand)]
    Volume(VolumeCommand),
}

/// Volume commands.
#[derive(Debug, Subcommand)]
pub enum VolumeCommand {
    /// Set one or more ACLs, replacing the existing ones.
    #[command(name = "setacl")]
    SetAcl(SetAclArgs),
}

/// Arguments of `volume setacl`.
#[derive(Debug, Args)]
pub struct SetAclArgs {
    /// URI of the volume, optionally with a bucket: [o3://host[:port]]/volume[/bucket]
    pub uri: String,

    /// A comma separated list of ACLs to be set.
    ///
    /// Ex: user:user1:rw,user:user2:a,group:hadoop:a
    ///
    /// r = READ, w = WRITE, c = CREATE, d = DELETE, l = LIST, a = ALL,
    /// n = NONE, x = READ_ACL, y = WRITE_ACL. Append [DEFAULT] to a clause
    /// to set an inherited ACL. Also accepted as -al.
    #[arg(long = "acls", value_name = "ACLS")]
    pub acls: String,

    /// Store type, i.e. OZONE or S3.
    #[arg(short = 's', long = "store", value_name = "STORE")]
    pub store: Option<String>,
}

/// Option spellings clap cannot express natively, with their long form.
const LEGACY_ALIASES: &[(&str, &str)] = &[("-al", "--acls")];

/// Rewrite multi-letter single-dash options (`-al`, `-al=v`) to their long
/// form. Arguments after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            for (short, long) in LEGACY_ALIASES {
                if text == *short {
                    return OsString::from(*long);
                }
                if let Some(value) = text.strip_prefix(short).and_then(|v| v.strip_prefix('=')) {
                    return OsString::from(format!("{long}={value}"));
                }
            }
            arg
        })
        .collect()
}
