//! Dependency installation through the user's package manager

use crate::options::{PackageManager, ProjectOptions};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Extra packages implied by the chosen options, beyond what the template's
/// package.json already lists. Returns (dependencies, dev_dependencies).
fn extra_packages(opts: &ProjectOptions) -> (Vec<&'static str>, Vec<&'static str>) {
    let mut dependencies = Vec::new();
    let mut dev_dependencies = Vec::new();

    if opts.use_router {
        dependencies.push("preact-iso");
    }
    if opts.use_prerender {
        for package in ["preact-iso", "preact-render-to-string"] {
            if !dependencies.contains(&package) {
                dependencies.push(package);
            }
        }
    }

    if opts.typescript() {
        dev_dependencies.push("typescript");
    }
    if opts.use_eslint {
        dev_dependencies.extend(["eslint", "eslint-config-preact"]);
    }

    (dependencies, dev_dependencies)
}

/// Install the template's own dependencies plus the option-implied extras.
/// The first pass always runs, even with nothing extra to add: it installs
/// what the scaffolded package.json lists.
pub async fn install_dependencies(project_dir: &Path, opts: &ProjectOptions) -> Result<()> {
    let (dependencies, dev_dependencies) = extra_packages(opts);

    install_packages(project_dir, opts.package_manager, &dependencies, false).await?;
    if !dev_dependencies.is_empty() {
        install_packages(project_dir, opts.package_manager, &dev_dependencies, true).await?;
    }

    Ok(())
}

async fn install_packages(
    project_dir: &Path,
    pm: PackageManager,
    packages: &[&str],
    dev: bool,
) -> Result<()> {
    let mut command = Command::new(pm.bin());

    match pm {
        // `yarn add` fails with an empty package list; bare `yarn` installs the manifest
        PackageManager::Yarn => {
            if !packages.is_empty() {
                command.arg("add");
            }
        }
        PackageManager::Npm | PackageManager::Pnpm => {
            command.arg("install");
        }
    }

    if dev {
        command.arg("-D");
    }

    let status = command
        .args(packages)
        .current_dir(project_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .with_context(|| format!("Failed to launch {}", pm.bin()))?;

    if !status.success() {
        anyhow::bail!(
            "{} exited with code {}",
            pm.bin(),
            status.code().unwrap_or(-1)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Language;

    fn options() -> ProjectOptions {
        ProjectOptions {
            package_manager: PackageManager::Npm,
            language: Language::JavaScript,
            use_router: false,
            use_prerender: false,
            use_eslint: false,
        }
    }

    #[test]
    fn test_no_extras_for_defaults() {
        let (deps, dev_deps) = extra_packages(&options());
        assert!(deps.is_empty());
        assert!(dev_deps.is_empty());
    }

    #[test]
    fn test_router_needs_iso() {
        let mut opts = options();
        opts.use_router = true;
        let (deps, dev_deps) = extra_packages(&opts);
        assert_eq!(deps, vec!["preact-iso"]);
        assert!(dev_deps.is_empty());
    }

    #[test]
    fn test_prerender_needs_iso_and_renderer() {
        let mut opts = options();
        opts.use_prerender = true;
        let (deps, _) = extra_packages(&opts);
        assert_eq!(deps, vec!["preact-iso", "preact-render-to-string"]);
    }

    #[test]
    fn test_router_and_prerender_deduplicate_iso() {
        let mut opts = options();
        opts.use_router = true;
        opts.use_prerender = true;
        let (deps, _) = extra_packages(&opts);
        assert_eq!(deps, vec!["preact-iso", "preact-render-to-string"]);
    }

    #[test]
    fn test_dev_extras() {
        let mut opts = options();
        opts.language = Language::TypeScript;
        opts.use_eslint = true;
        let (_, dev_deps) = extra_packages(&opts);
        assert_eq!(dev_deps, vec!["typescript", "eslint", "eslint-config-preact"]);
    }
}
