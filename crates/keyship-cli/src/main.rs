//! keyship — generate an SSH key pair and install it on a remote account.
//!
//! Creates `~/.ssh/id_<name>_ed25519` with `ssh-keygen` (unless it already
//! exists), installs the public key with `ssh-copy-id` or a plain `ssh`
//! append, and prints the command to log in with it.

mod config;
mod provision;

use clap::{CommandFactory, Parser};
use keyship_core::KeyshipError;
use std::path::PathBuf;

/// keyship — provision an SSH key and install it on a remote host
#[derive(Parser, Debug)]
#[command(
    name = "keyship",
    version,
    about = "Generate an SSH key pair and install it on a remote account",
    after_help = "The key is written to ~/.ssh/id_<name>_ed25519 (public half: .pub).\n\
                  Keys named ~/.ssh/id_<name>_rsa are not reused; rename them to keep them.\n\
                  Example: keyship -n work -H example.com -u alice -P 2222"
)]
pub struct Cli {
    /// Key name, used to derive the key file names
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Remote host name or IP address
    #[arg(short = 'H', long = "hostname")]
    pub host: Option<String>,

    /// Remote user account
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,

    /// Remote SSH port (default: whatever ssh uses)
    #[arg(short = 'P', long = "port")]
    pub port: Option<u16>,

    /// Config file path
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() {
    // No arguments at all behaves like --help.
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().print_help();
        std::process::exit(0);
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize tracing.
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("keyship=debug,keyship_core=debug")
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("keyship=warn,keyship_core=warn")
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = provision::run(&cli) {
        eprintln!("keyship: {e:#}");
        let core = e.downcast_ref::<KeyshipError>();
        if core.is_some_and(KeyshipError::is_usage) {
            eprintln!("Run `keyship --help` for usage.");
        }
        std::process::exit(core.map_or(1, KeyshipError::exit_code));
    }
}
