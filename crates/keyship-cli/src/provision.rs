//! The provisioning pipeline: validate, generate, install, report.

use anyhow::{Context, Result};
use keyship_core::{
    default_comment, login_hint, missing_options, CommandRunner, DryRunRunner, InstallMethod,
    InstallRequest, KeyPaths, KeyProvisioner, KeyStatus, KeyshipError, RemoteInstaller,
    SystemRunner, KEY_ALGORITHM,
};
use tracing::{debug, info};

use crate::config::Config;
use crate::Cli;

/// Run one provisioning pass for the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    let cfg = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => match Config::load(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                // Missing options still win over a broken config file.
                let missing =
                    missing_options(cli.name.as_deref(), cli.host.as_deref(), cli.user.as_deref());
                if missing.is_empty() {
                    return Err(e);
                }
                eprintln!("warning: {e:#}");
                return Err(KeyshipError::MissingOptions(missing).into());
            }
        },
        None => Config::default(),
    };

    // CLI flags override config values.
    let request = InstallRequest::from_parts(
        cli.name.clone(),
        cli.host.clone(),
        cli.user.clone().or(cfg.default.user),
        cli.port.or(cfg.default.port),
    )?;
    info!(name = %request.name, target = %request.target(), port = ?request.port, "provisioning");

    let paths = KeyPaths::for_home(&request.name)?;
    debug!(private_key = %paths.private_key.display(), "derived key paths");

    if let Some(legacy) = paths.stranded_legacy_key() {
        eprintln!(
            "warning: found {} but keyship uses {}; rename it to reuse that key",
            legacy.display(),
            paths.private_key.display()
        );
    }

    let runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner)
    } else {
        Box::new(SystemRunner)
    };

    let status = KeyProvisioner::new(runner.as_ref())
        .provision(&paths, &default_comment())
        .with_context(|| format!("failed to provision key '{}'", request.name))?;

    match status {
        KeyStatus::Existing => {
            eprintln!(
                "warning: key {} already exists, skipping generation",
                paths.private_key.display()
            );
        }
        KeyStatus::Generated if !cli.dry_run => {
            println!("Generated {KEY_ALGORITHM} key pair '{}'", request.name);
            println!("  Private key: {}", paths.private_key.display());
            println!("  Public key:  {}", paths.public_key.display());
        }
        KeyStatus::Generated => {}
    }

    let method = RemoteInstaller::new(runner.as_ref())
        .install(&request, &paths)
        .with_context(|| format!("failed to install public key on {}", request.target()))?;

    if !cli.dry_run {
        match method {
            InstallMethod::CopyId => {
                println!("Installed public key on {} with ssh-copy-id", request.target());
            }
            InstallMethod::RemoteAppend => {
                println!(
                    "ssh-copy-id not found; appended public key to {}:~/.ssh/authorized_keys",
                    request.target()
                );
            }
        }
    }

    println!("Log in with: {}", login_hint(&request, &paths));
    Ok(())
}
