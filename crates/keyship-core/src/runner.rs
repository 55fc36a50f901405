//! Process execution seam.
//!
//! Pipeline code builds [`ExternalCommand`] values and hands them to a
//! [`CommandRunner`]. [`SystemRunner`] spawns real processes, [`DryRunRunner`]
//! only prints what would run.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{KeyshipError, KeyshipResult};

/// A fully built external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    /// File streamed to the command's standard input.
    pub stdin_file: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdin_file: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdin_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdin_file = Some(path.into());
        self
    }
}

impl fmt::Display for ExternalCommand {
    /// Shell-like rendering used for logs and dry runs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        if let Some(path) = &self.stdin_file {
            write!(f, " < {}", quote(&path.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./@:=~+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Runs external commands on behalf of the pipeline.
pub trait CommandRunner {
    /// Run `cmd` to completion. A non-zero exit is an error.
    fn run(&self, cmd: &ExternalCommand) -> KeyshipResult<()>;

    /// Whether `program` can be found on this system.
    fn is_available(&self, program: &str) -> bool;

    /// Whether this runner skips side effects.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Spawns real processes with inherited stdout/stderr, so interactive
/// password prompts from the ssh tools reach the user.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ExternalCommand) -> KeyshipResult<()> {
        debug!(command = %cmd, "running");

        let mut process = Command::new(&cmd.program);
        process.args(&cmd.args);
        if let Some(path) = &cmd.stdin_file {
            let file = File::open(path).map_err(|source| KeyshipError::OpenFile {
                path: path.clone(),
                source,
            })?;
            process.stdin(Stdio::from(file));
        }

        let status = process.status().map_err(|source| KeyshipError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(KeyshipError::CommandFailed {
                program: cmd.program.clone(),
                code: status.code().unwrap_or(1),
            });
        }

        Ok(())
    }

    fn is_available(&self, program: &str) -> bool {
        find_in_path(program).is_some()
    }
}

/// Prints each command instead of running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&self, cmd: &ExternalCommand) -> KeyshipResult<()> {
        println!("[dry-run] {cmd}");
        Ok(())
    }

    fn is_available(&self, program: &str) -> bool {
        find_in_path(program).is_some()
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}

/// Locate an executable named `program` on `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
