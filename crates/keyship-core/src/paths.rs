//! Key file locations.
//!
//! Keys live in `~/.ssh/` as `id_<name>_<algorithm>` with the public half
//! next to it under the same name plus `.pub`.

use std::path::{Path, PathBuf};

use crate::error::{KeyshipError, KeyshipResult};

/// Name of the SSH directory in the user's home folder.
pub const SSH_DIR_NAME: &str = ".ssh";

/// Algorithm handed to `ssh-keygen -t`. Also the key file suffix.
pub const KEY_ALGORITHM: &str = "ed25519";

/// KDF rounds handed to `ssh-keygen -a`.
pub const KEY_KDF_ROUNDS: u32 = 100;

/// Prefix of every generated key file name.
pub const KEY_FILE_PREFIX: &str = "id_";

/// Suffix older provisioning scripts used regardless of algorithm.
pub const LEGACY_KEY_SUFFIX: &str = "rsa";

/// Derived locations for one named key pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    /// Directory holding the key pair.
    pub key_dir: PathBuf,
    /// Private key file.
    pub private_key: PathBuf,
    /// Public key file, as written by `ssh-keygen`.
    pub public_key: PathBuf,
}

impl KeyPaths {
    /// Paths for `name` inside an explicit key directory.
    pub fn in_dir(key_dir: impl Into<PathBuf>, name: &str) -> Self {
        let key_dir = key_dir.into();
        let file_name = key_file_name(name);
        let private_key = key_dir.join(&file_name);
        let public_key = key_dir.join(format!("{file_name}.pub"));
        Self {
            key_dir,
            private_key,
            public_key,
        }
    }

    /// Paths for `name` inside `~/.ssh`.
    pub fn for_home(name: &str) -> KeyshipResult<Self> {
        let home = dirs::home_dir().ok_or(KeyshipError::HomeDirUnavailable)?;
        Ok(Self::in_home(&home, name))
    }

    /// Paths for `name` inside `<home>/.ssh`.
    pub fn in_home(home: &Path, name: &str) -> Self {
        Self::in_dir(home.join(SSH_DIR_NAME), name)
    }

    /// A key for the same name under the old `id_<name>_rsa` file name, when
    /// it exists and the current key does not. Such a key is not reused.
    pub fn stranded_legacy_key(&self) -> Option<PathBuf> {
        if entry_exists(&self.private_key) {
            return None;
        }
        let file_name = self.private_key.file_name()?.to_string_lossy();
        let stem = file_name.strip_suffix(KEY_ALGORITHM)?;
        let legacy = self.key_dir.join(format!("{stem}{LEGACY_KEY_SUFFIX}"));
        entry_exists(&legacy).then_some(legacy)
    }
}

fn entry_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// File name of the private key for `name`, e.g. `id_work_ed25519`.
pub fn key_file_name(name: &str) -> String {
    format!("{KEY_FILE_PREFIX}{name}_{KEY_ALGORITHM}")
}
