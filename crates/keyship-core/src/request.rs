//! The validated request that drives one provisioning run.

use crate::error::{KeyshipError, KeyshipResult};

/// Everything one run needs: which key, and where to install it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// Logical key name; drives the key file names.
    pub name: String,
    /// Remote host name or address.
    pub host: String,
    /// Remote account name.
    pub user: String,
    /// Remote SSH port. `None` leaves the choice to the ssh tools.
    pub port: Option<u16>,
}

impl InstallRequest {
    /// Build a request from optional parsed inputs.
    ///
    /// Every missing or blank required field is reported in one error so the
    /// user can fix them all at once.
    pub fn from_parts(
        name: Option<String>,
        host: Option<String>,
        user: Option<String>,
        port: Option<u16>,
    ) -> KeyshipResult<Self> {
        let name = non_blank(name);
        let host = non_blank(host);
        let user = non_blank(user);

        let missing = missing_options(name.as_deref(), host.as_deref(), user.as_deref());

        match (name, host, user) {
            (Some(name), Some(host), Some(user)) => {
                let request = Self {
                    name,
                    host,
                    user,
                    port,
                };
                request.check()?;
                Ok(request)
            }
            _ => Err(KeyshipError::MissingOptions(missing)),
        }
    }

    /// The `user@host` destination passed to the ssh tools.
    pub fn target(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    fn check(&self) -> KeyshipResult<()> {
        let name = self.name.as_str();
        if name == "."
            || name == ".."
            || name.starts_with('-')
            || name.contains(&['/', '\\'][..])
        {
            return Err(KeyshipError::InvalidName(self.name.clone()));
        }

        for part in [&self.user, &self.host] {
            if part.starts_with('-') || part.contains('@') || part.contains(char::is_whitespace) {
                return Err(KeyshipError::InvalidTarget(self.target()));
            }
        }

        Ok(())
    }
}

/// Flags for every required value that is absent or blank.
pub fn missing_options(
    name: Option<&str>,
    host: Option<&str>,
    user: Option<&str>,
) -> Vec<&'static str> {
    [
        (name, "--name (-n)"),
        (host, "--hostname (-H)"),
        (user, "--user (-u)"),
    ]
    .into_iter()
    .filter(|(value, _)| value.map_or(true, |v| v.trim().is_empty()))
    .map(|(_, flag)| flag)
    .collect()
}

/// The `-p <port>` fragment shared by `ssh`, `ssh-copy-id`, and the login hint.
///
/// Empty when no port was given.
pub fn port_args(port: Option<u16>) -> Vec<String> {
    match port {
        Some(port) => vec!["-p".to_string(), port.to_string()],
        None => Vec::new(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
