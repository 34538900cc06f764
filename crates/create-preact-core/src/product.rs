//! Product configuration trait for CLI binaries
//!
//! The interactive flow is product-agnostic so that wrapping initializers
//! (a meta-CLI embedding this one) can rebrand it. Each binary implements
//! this trait to define its identity, template source, and closing hints.

use crate::options::PackageManager;
use colored::{ColoredString, Colorize};
use std::path::Path;

/// Configuration trait for scaffolding CLI products
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars, user agent)
    fn name(&self) -> &'static str;

    /// One-line tagline shown in the intro banner
    fn tagline(&self) -> &'static str;

    /// RGB used to tint the intro banner
    fn brand_color(&self) -> (u8, u8, u8);

    /// Default URL for fetching templates
    fn default_template_url(&self) -> &'static str;

    /// Environment variable name for overriding the template URL
    fn template_url_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// Generate the "Getting Started" lines after project creation
    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Tagline tinted with the brand color, ready for the intro banner
    fn banner(&self) -> ColoredString {
        let (r, g, b) = self.brand_color();
        self.tagline().truecolor(r, g, b)
    }
}
