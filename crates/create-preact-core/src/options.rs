//! Project options gathered from prompts or CLI flags

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Package managers the scaffolder knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

#[derive(Debug, Error)]
#[error("unknown package manager '{0}', expected npm, yarn or pnpm")]
pub struct UnknownPackageManager(String);

impl PackageManager {
    /// Detect the manager that launched us from `npm_config_user_agent`
    /// (set by npm/yarn/pnpm when running `npm init preact` and friends)
    pub fn detect() -> Self {
        let user_agent = std::env::var("npm_config_user_agent").unwrap_or_default();
        Self::from_user_agent(&user_agent)
    }

    /// Parse the leading product token of an npm user agent string,
    /// e.g. `yarn/1.22.19 npm/? node/v20.11.0 linux x64`
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.starts_with("yarn") {
            PackageManager::Yarn
        } else if user_agent.starts_with("pnpm") {
            PackageManager::Pnpm
        } else {
            PackageManager::Npm
        }
    }

    /// Name of the executable to invoke
    pub fn bin(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Prefix for running package.json scripts ("npm run dev" vs "yarn dev")
    pub fn run_prefix(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm run",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    /// Where to get the manager if it is missing
    pub fn install_url(&self) -> &'static str {
        match self {
            PackageManager::Npm => "https://nodejs.org",
            PackageManager::Yarn => "https://yarnpkg.com",
            PackageManager::Pnpm => "https://pnpm.io",
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bin())
    }
}

impl FromStr for PackageManager {
    type Err = UnknownPackageManager;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "npm" => Ok(PackageManager::Npm),
            "yarn" => Ok(PackageManager::Yarn),
            "pnpm" => Ok(PackageManager::Pnpm),
            _ => Err(UnknownPackageManager(s.to_string())),
        }
    }
}

/// Project language choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
}

#[derive(Debug, Error)]
#[error("unknown language '{0}', expected js or ts")]
pub struct UnknownLanguage(String);

impl Language {
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, Language::TypeScript)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "js" | "javascript" => Ok(Language::JavaScript),
            "ts" | "typescript" => Ok(Language::TypeScript),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

/// Everything the scaffolder needs to know, gathered in a single pass
/// from prompts or flags
#[derive(Debug, Clone)]
pub struct ProjectOptions {
    pub package_manager: PackageManager,
    pub language: Language,
    pub use_router: bool,
    pub use_prerender: bool,
    pub use_eslint: bool,
}

impl ProjectOptions {
    pub fn typescript(&self) -> bool {
        self.language.is_typescript()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_user_agent() {
        assert_eq!(
            PackageManager::from_user_agent("yarn/1.22.19 npm/? node/v20.11.0 linux x64"),
            PackageManager::Yarn
        );
        assert_eq!(
            PackageManager::from_user_agent("pnpm/8.15.1 npm/? node/v20.11.0 linux x64"),
            PackageManager::Pnpm
        );
        assert_eq!(
            PackageManager::from_user_agent("npm/10.2.4 node/v20.11.0 linux x64"),
            PackageManager::Npm
        );
        // Anything unrecognized falls back to npm
        assert_eq!(PackageManager::from_user_agent(""), PackageManager::Npm);
        assert_eq!(
            PackageManager::from_user_agent("bun/1.0.25"),
            PackageManager::Npm
        );
    }

    #[test]
    fn test_package_manager_from_str() {
        assert_eq!("npm".parse::<PackageManager>().unwrap(), PackageManager::Npm);
        assert_eq!("Yarn".parse::<PackageManager>().unwrap(), PackageManager::Yarn);
        assert_eq!("pnpm".parse::<PackageManager>().unwrap(), PackageManager::Pnpm);
        assert!("cargo".parse::<PackageManager>().is_err());
    }

    #[test]
    fn test_run_prefix() {
        assert_eq!(PackageManager::Npm.run_prefix(), "npm run");
        assert_eq!(PackageManager::Yarn.run_prefix(), "yarn");
        assert_eq!(PackageManager::Pnpm.run_prefix(), "pnpm");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("js".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("TypeScript".parse::<Language>().unwrap(), Language::TypeScript);
        assert!("rust".parse::<Language>().is_err());
    }
}
