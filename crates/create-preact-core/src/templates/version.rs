//! CLI / template version compatibility

use semver::Version;

/// Outcome of comparing the CLI version against a template's declared version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// CLI is recent enough, or the versions could not be compared
    Ok,
    /// The template expects a newer CLI
    CliOutdated { cli: Version, template: Version },
}

/// Compare the CLI version against the version a template declares.
/// Unparseable versions never warn.
pub fn check(cli_version: &str, template_version: &str) -> Compatibility {
    let (Ok(cli), Ok(template)) = (
        Version::parse(cli_version),
        Version::parse(template_version),
    ) else {
        return Compatibility::Ok;
    };

    if cli < template {
        Compatibility::CliOutdated { cli, template }
    } else {
        Compatibility::Ok
    }
}
