//! Final login hint.

use crate::paths::KeyPaths;
use crate::request::{port_args, InstallRequest};

/// The `ssh` invocation that logs in with the freshly installed key.
pub fn login_hint(request: &InstallRequest, paths: &KeyPaths) -> String {
    let mut parts = vec!["ssh".to_string()];
    parts.extend(port_args(request.port));
    parts.push("-i".to_string());
    parts.push(paths.private_key.display().to_string());
    parts.push(request.target());
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(port: Option<u16>) -> InstallRequest {
        InstallRequest {
            name: "work".into(),
            host: "10.0.0.5".into(),
            user: "deploy".into(),
            port,
        }
    }

    #[test]
    fn hint_with_port() {
        let paths = KeyPaths::in_dir("/home/a/.ssh", "work");
        assert_eq!(
            login_hint(&request(Some(2222)), &paths),
            "ssh -p 2222 -i /home/a/.ssh/id_work_ed25519 deploy@10.0.0.5"
        );
    }

    #[test]
    fn hint_without_port() {
        let paths = KeyPaths::in_dir("/home/a/.ssh", "work");
        assert_eq!(
            login_hint(&request(None), &paths),
            "ssh -i /home/a/.ssh/id_work_ed25519 deploy@10.0.0.5"
        );
    }
}
