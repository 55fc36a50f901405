use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the keyship pipeline.
#[derive(Debug, Error)]
pub enum KeyshipError {
    #[error("missing required option(s): {}", .0.join(", "))]
    MissingOptions(Vec<&'static str>),

    #[error("invalid key name '{0}': must be a plain file name that does not start with '-'")]
    InvalidName(String),

    #[error("invalid remote target '{0}': must not start with '-' or contain whitespace or '@'")]
    InvalidTarget(String),

    #[error("cannot determine home directory")]
    HomeDirUnavailable,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    CommandFailed { program: String, code: i32 },

    #[error("failed to open {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KeyshipError {
    /// Whether this error came from bad user input rather than the environment.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            KeyshipError::MissingOptions(_)
                | KeyshipError::InvalidName(_)
                | KeyshipError::InvalidTarget(_)
        )
    }

    /// Process exit status to report for this error.
    ///
    /// A failing external command propagates its own status; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            KeyshipError::CommandFailed { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type KeyshipResult<T> = Result<T, KeyshipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_options_lists_every_flag() {
        let err = KeyshipError::MissingOptions(vec!["--name (-n)", "--user (-u)"]);
        assert_eq!(
            err.to_string(),
            "missing required option(s): --name (-n), --user (-u)"
        );
        assert!(err.is_usage());
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn command_failure_propagates_status() {
        let err = KeyshipError::CommandFailed {
            program: "ssh-copy-id".into(),
            code: 255,
        };
        assert_eq!(err.exit_code(), 255);
        assert!(!err.is_usage());
    }

    #[test]
    fn spawn_failure_exits_one() {
        let err = KeyshipError::Spawn {
            program: "ssh".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), 1);
    }
}
