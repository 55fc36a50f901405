//! keyship-core: key provisioning and remote installation for keyship.
//!
//! Derives key paths from a validated [`InstallRequest`], drives `ssh-keygen`
//! to create the key pair, and installs the public half on the remote account
//! through `ssh-copy-id` or a plain `ssh` append. All process spawning goes
//! through the [`CommandRunner`] trait.

pub mod error;
pub mod install;
pub mod keygen;
pub mod paths;
pub mod report;
pub mod request;
pub mod runner;

// Re-export commonly used items at crate root.
pub use error::{KeyshipError, KeyshipResult};
pub use install::{InstallMethod, RemoteInstaller, COPY_ID_PROGRAM, SSH_PROGRAM};
pub use keygen::{default_comment, KeyProvisioner, KeyStatus, KEYGEN_PROGRAM};
pub use paths::{KeyPaths, KEY_ALGORITHM, KEY_KDF_ROUNDS};
pub use report::login_hint;
pub use request::{missing_options, port_args, InstallRequest};
pub use runner::{CommandRunner, DryRunRunner, ExternalCommand, SystemRunner};
