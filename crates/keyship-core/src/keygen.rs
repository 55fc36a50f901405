//! Local key pair provisioning through `ssh-keygen`.
//!
//! The key directory is created if needed and always tightened to 0700.
//! An existing private key is never overwritten: generation is skipped and the
//! caller is told so through [`KeyStatus::Existing`].

use std::fs;

use tracing::{debug, info};

use crate::error::KeyshipResult;
use crate::paths::{KeyPaths, KEY_ALGORITHM, KEY_KDF_ROUNDS};
use crate::runner::{CommandRunner, ExternalCommand};

/// Key generation primitive.
pub const KEYGEN_PROGRAM: &str = "ssh-keygen";

/// Outcome of [`KeyProvisioner::provision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// A new key pair was generated.
    Generated,
    /// A key already existed at the derived path and was left alone.
    Existing,
}

/// Creates the key directory and key pair.
pub struct KeyProvisioner<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> KeyProvisioner<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Ensure the key directory exists with owner-only permissions.
    pub fn ensure_key_dir(&self, paths: &KeyPaths) -> KeyshipResult<()> {
        if self.runner.is_dry_run() {
            let dir = paths.key_dir.display();
            println!("[dry-run] mkdir -p {dir} && chmod 700 {dir}");
            return Ok(());
        }

        fs::create_dir_all(&paths.key_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&paths.key_dir, fs::Permissions::from_mode(0o700))?;
        }
        debug!(dir = %paths.key_dir.display(), "key directory ready");
        Ok(())
    }

    /// Generate the key pair unless one already exists.
    pub fn provision(&self, paths: &KeyPaths, comment: &str) -> KeyshipResult<KeyStatus> {
        self.ensure_key_dir(paths)?;

        // Any entry counts, including a dangling symlink.
        if fs::symlink_metadata(&paths.private_key).is_ok() {
            info!(path = %paths.private_key.display(), "key already exists, skipping generation");
            return Ok(KeyStatus::Existing);
        }

        self.runner.run(&keygen_command(paths, comment))?;
        info!(path = %paths.private_key.display(), "key pair generated");
        Ok(KeyStatus::Generated)
    }
}

/// `ssh-keygen -t ed25519 -a 100 -f <key> -N "" -C <comment>`
pub fn keygen_command(paths: &KeyPaths, comment: &str) -> ExternalCommand {
    ExternalCommand::new(KEYGEN_PROGRAM)
        .args(["-t", KEY_ALGORITHM])
        .args(["-a".to_string(), KEY_KDF_ROUNDS.to_string()])
        .arg("-f")
        .arg(paths.private_key.to_string_lossy())
        .args(["-N", ""])
        .arg("-C")
        .arg(comment)
}

/// Key comment in the form `<local-user>@<local-host>-<YYYY-MM-DD>`.
pub fn default_comment() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".into());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "localhost".into());
    let date = chrono::Local::now().format("%Y-%m-%d");
    format!("{user}@{host}-{date}")
}
