//! Composes the runner's command line and environment (§4.7).

use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Invocation {
    pub binary: PathBuf,
    pub script_path: String,
    pub profile: String,
    pub network_url: String,
    pub env: BTreeMap<String, String>,
    pub dry_run: bool,
    pub debug: bool,
    pub debug_json: bool,
}

impl Invocation {
    pub fn into_command(self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.binary);
        command.arg("run").arg(&self.script_path);
        command.env("FOUNDRY_PROFILE", &self.profile);
        command.env("TREB_NETWORK_URL", &self.network_url);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        if self.dry_run {
            command.arg("--dry-run");
        }
        if self.debug {
            command.arg("--debug");
        }
        if self.debug_json {
            command.arg("--debug-json");
        }
        command.stdout(std::process::Stdio::piped());
        command.stderr(std::process::Stdio::piped());
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_debug_and_debug_json_are_independent_flags() {
        let invocation = Invocation {
            binary: "forge".into(),
            script_path: "script/Deploy.s.sol".to_string(),
            profile: "staging".to_string(),
            network_url: "http://localhost:8545".to_string(),
            env: BTreeMap::new(),
            dry_run: true,
            debug: false,
            debug_json: true,
        };
        let command = invocation.into_command();
        let args: Vec<String> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert!(args.contains(&"--dry-run".to_string()));
        assert!(!args.contains(&"--debug".to_string()));
        assert!(args.contains(&"--debug-json".to_string()));
    }
}
