//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// config-center - get and set configuration items
#[derive(Parser, Debug)]
#[command(name = "confctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Working prefix directory (re-roots schema and state paths)
    #[arg(short = 'p', long, global = true)]
    pub prefix: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Coordinates shared by every operation.
///
/// The resource id defaults to the appid's value when unset, and the uid
/// defaults to the invoking user.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// appid of the application; empty for application-independent
    /// configuration
    #[arg(short = 'a', long = "appid")]
    pub appid: Option<String>,

    /// Resource id (configure name); defaults to the appid's value
    #[arg(short = 'r', long = "resource")]
    pub resource: Option<String>,

    /// Subpath selecting a secondary configure install
    #[arg(short = 's', long = "subpath", default_value = "")]
    pub subpath: String,

    /// User id the configuration belongs to; defaults to the invoking user
    #[arg(short = 'u', long = "uid")]
    pub uid: Option<u32>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List appids, resources for an appid, or subpaths for a resource
    List {
        /// appid to list resources for
        #[arg(short = 'a', long = "appid")]
        appid: Option<String>,

        /// Resource to list subpaths for, or a pattern to match resources
        /// across every app when -a is unset
        #[arg(short = 'r', long = "resource")]
        resource: Option<String>,
    },

    /// Query configure content: all keys, a value, or key metadata
    ///
    /// Without -k, prints the key list. With -k, prints the value, or the
    /// metadata field selected by -m (name, description, visibility,
    /// permissions, version, is-default).
    Get {
        #[command(flatten)]
        target: TargetArgs,

        /// Configure item's key
        #[arg(short = 'k', long = "key")]
        key: Option<String>,

        /// Method for the configure item
        #[arg(short = 'm', long = "method", default_value = "value")]
        method: String,
    },

    /// Set a configure item's value
    Set {
        #[command(flatten)]
        target: TargetArgs,

        /// Configure item's key
        #[arg(short = 'k', long = "key")]
        key: String,

        /// New value for the configure item
        #[arg(short = 'v', long = "value")]
        value: String,
    },

    /// Reset configure items to their defaults
    ///
    /// With -k, resets one key; without, resets every item in the scope.
    Reset {
        #[command(flatten)]
        target: TargetArgs,

        /// Configure item's key
        #[arg(short = 'k', long = "key")]
        key: Option<String>,
    },

    /// Watch value changes for configure items
    Watch {
        #[command(flatten)]
        target: TargetArgs,

        /// Only report keys matching this regular expression
        #[arg(short = 'k', long = "key")]
        key: Option<String>,
    },

    /// Export effective configuration as CSV rows
    Export {
        #[command(flatten)]
        target: TargetArgs,
    },
}
