//! Runtime detection for Node.js and the package managers

use crate::options::PackageManager;
use anyhow::Result;
use std::process::Command;

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    pub version: Option<String>,
    pub available: bool,
}

/// Probe a binary by asking it for its version
fn probe(name: &'static str, bin: &str) -> RuntimeInfo {
    let output = Command::new(bin).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            RuntimeInfo {
                name,
                version: Some(version),
                available: true,
            }
        }
        _ => RuntimeInfo {
            name,
            version: None,
            available: false,
        },
    }
}

/// Check if Node.js is available
pub fn check_node() -> RuntimeInfo {
    probe("Node.js", "node")
}

/// Check if the chosen package manager is available
pub fn check_package_manager(pm: PackageManager) -> RuntimeInfo {
    probe(pm.bin(), pm.bin())
}

/// Check the runtimes needed before installing dependencies. A missing
/// package manager is fatal; a missing Node.js is reported but advisory
/// (the install may still work, the dev server will not).
pub fn check_runtimes(pm: PackageManager) -> Result<Vec<RuntimeInfo>> {
    let node = check_node();
    let manager = check_package_manager(pm);

    if !manager.available {
        anyhow::bail!(
            "{} is not installed (install from {})",
            pm.bin(),
            pm.install_url()
        );
    }

    Ok(vec![node, manager])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_binary() {
        let info = probe("definitely-missing", "create-preact-no-such-binary");
        assert!(!info.available);
        assert!(info.version.is_none());
    }
}
