//! Remote installation of the public key.
//!
//! `ssh-copy-id` is preferred when it is on `PATH`. Without it the key is
//! streamed over a plain `ssh` session into a short shell script that creates
//! `~/.ssh`, appends to `authorized_keys`, and tightens both. The method is
//! chosen once per run; a failure in either path is final.

use tracing::{debug, info};

use crate::error::{KeyshipError, KeyshipResult};
use crate::paths::KeyPaths;
use crate::request::{port_args, InstallRequest};
use crate::runner::{CommandRunner, ExternalCommand};

/// Identity-copy utility.
pub const COPY_ID_PROGRAM: &str = "ssh-copy-id";

/// Remote command execution primitive.
pub const SSH_PROGRAM: &str = "ssh";

/// Script run on the remote side by the fallback path. Reads the key on stdin.
///
/// A non-empty `authorized_keys` without a trailing newline gets one first so
/// the new key lands on its own line.
pub const REMOTE_APPEND_SCRIPT: &str = "mkdir -p ~/.ssh && chmod 700 ~/.ssh && \
{ [ ! -s ~/.ssh/authorized_keys ] || [ -z \"$(tail -c1 ~/.ssh/authorized_keys)\" ] || \
echo >> ~/.ssh/authorized_keys; } && \
cat >> ~/.ssh/authorized_keys && chmod 600 ~/.ssh/authorized_keys";

/// How the public key reaches the remote account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallMethod {
    /// `ssh-copy-id` handled it.
    CopyId,
    /// Manual append over `ssh`.
    RemoteAppend,
}

/// Installs a public key into a remote `authorized_keys`.
pub struct RemoteInstaller<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> RemoteInstaller<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Pick the install method for this system.
    pub fn select_method(&self) -> InstallMethod {
        if self.runner.is_available(COPY_ID_PROGRAM) {
            InstallMethod::CopyId
        } else {
            InstallMethod::RemoteAppend
        }
    }

    /// Install `paths.public_key` for `request.user` on `request.host`.
    pub fn install(
        &self,
        request: &InstallRequest,
        paths: &KeyPaths,
    ) -> KeyshipResult<InstallMethod> {
        if !self.runner.is_dry_run() && !paths.public_key.is_file() {
            return Err(KeyshipError::NotAFile(paths.public_key.clone()));
        }

        let method = self.select_method();
        debug!(?method, target = %request.target(), "installing public key");

        let cmd = match method {
            InstallMethod::CopyId => copy_id_command(request, paths),
            InstallMethod::RemoteAppend => remote_append_command(request, paths),
        };
        self.runner.run(&cmd)?;

        info!(?method, target = %request.target(), "public key installed");
        Ok(method)
    }
}

/// `ssh-copy-id -i <pub> [-p <port>] user@host`
pub fn copy_id_command(request: &InstallRequest, paths: &KeyPaths) -> ExternalCommand {
    ExternalCommand::new(COPY_ID_PROGRAM)
        .arg("-i")
        .arg(paths.public_key.to_string_lossy())
        .args(port_args(request.port))
        .arg(request.target())
}

/// `ssh [-p <port>] user@host '<append script>' < <pub>`
pub fn remote_append_command(request: &InstallRequest, paths: &KeyPaths) -> ExternalCommand {
    ExternalCommand::new(SSH_PROGRAM)
        .args(port_args(request.port))
        .arg(request.target())
        .arg(REMOTE_APPEND_SCRIPT)
        .stdin_file(&paths.public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::RecordingRunner;
    use std::fs;

    fn request(port: Option<u16>) -> InstallRequest {
        InstallRequest {
            name: "work".into(),
            host: "example.com".into(),
            user: "alice".into(),
            port,
        }
    }

    fn key_on_disk() -> (tempfile::TempDir, KeyPaths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = KeyPaths::in_home(tmp.path(), "work");
        fs::create_dir_all(&paths.key_dir).unwrap();
        fs::write(&paths.public_key, "ssh-ed25519 AAAA test\n").unwrap();
        (tmp, paths)
    }

    #[test]
    fn prefers_copy_id_when_available() {
        let (_tmp, paths) = key_on_disk();
        let runner = RecordingRunner::with_available(&[COPY_ID_PROGRAM]);

        let method = RemoteInstaller::new(&runner).install(&request(None), &paths).unwrap();

        assert_eq!(method, InstallMethod::CopyId);
        let commands = runner.commands.borrow();
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].args,
            vec![
                "-i".to_string(),
                paths.public_key.to_string_lossy().to_string(),
                "alice@example.com".to_string(),
            ]
        );
    }

    #[test]
    fn falls_back_to_ssh_append() {
        let (_tmp, paths) = key_on_disk();
        let runner = RecordingRunner::default();

        let method = RemoteInstaller::new(&runner).install(&request(None), &paths).unwrap();

        assert_eq!(method, InstallMethod::RemoteAppend);
        let commands = runner.commands.borrow();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, SSH_PROGRAM);
        assert_eq!(commands[0].args, vec!["alice@example.com", REMOTE_APPEND_SCRIPT]);
        assert_eq!(commands[0].stdin_file.as_deref(), Some(paths.public_key.as_path()));
    }

    #[test]
    fn port_reaches_both_methods() {
        let paths = KeyPaths::in_dir("/k", "work");
        let copy = copy_id_command(&request(Some(2222)), &paths);
        assert!(copy.args.windows(2).any(|w| w == ["-p", "2222"]));
        let append = remote_append_command(&request(Some(2222)), &paths);
        assert_eq!(&append.args[..2], ["-p", "2222"]);

        let copy = copy_id_command(&request(None), &paths);
        assert!(!copy.args.contains(&"-p".to_string()));
        let append = remote_append_command(&request(None), &paths);
        assert!(!append.args.contains(&"-p".to_string()));
    }

    #[test]
    fn copy_id_failure_does_not_fall_back() {
        let (_tmp, paths) = key_on_disk();
        let mut runner = RecordingRunner::with_available(&[COPY_ID_PROGRAM]);
        runner.fail_program = Some((COPY_ID_PROGRAM.to_string(), 1));

        let err = RemoteInstaller::new(&runner)
            .install(&request(None), &paths)
            .unwrap_err();

        assert!(matches!(err, KeyshipError::CommandFailed { .. }));
        assert_eq!(runner.programs(), vec![COPY_ID_PROGRAM]);
    }

    #[test]
    fn missing_public_key_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = KeyPaths::in_home(tmp.path(), "work");
        let runner = RecordingRunner::default();

        let err = RemoteInstaller::new(&runner)
            .install(&request(None), &paths)
            .unwrap_err();

        assert!(matches!(err, KeyshipError::NotAFile(_)));
        assert!(runner.commands.borrow().is_empty());
    }

    #[test]
    fn append_script_sets_permissions() {
        assert!(REMOTE_APPEND_SCRIPT.contains("chmod 700 ~/.ssh"));
        assert!(REMOTE_APPEND_SCRIPT.contains("cat >> ~/.ssh/authorized_keys"));
        assert!(REMOTE_APPEND_SCRIPT.contains("tail -c1 ~/.ssh/authorized_keys"));
        assert!(REMOTE_APPEND_SCRIPT.ends_with("chmod 600 ~/.ssh/authorized_keys"));
    }
}
