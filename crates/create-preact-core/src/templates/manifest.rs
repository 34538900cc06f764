//! Template manifest types and parsing

use serde::{Deserialize, Serialize};

/// A shared file from the root templates directory that gets bundled into
/// every template, with optional renaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedFile {
    /// Source path relative to templates/ directory
    pub source: String,

    /// Destination path in each template (defaults to source if not specified)
    #[serde(default)]
    pub dest: Option<String>,
}

impl SharedFile {
    /// Get the destination path (falls back to source if dest not specified)
    pub fn destination(&self) -> &str {
        self.dest.as_deref().unwrap_or(&self.source)
    }
}

/// Root template manifest (templates/template.yaml)
/// Lists the selectable template directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootManifest {
    /// List of template directory names
    pub templates: Vec<String>,

    /// Shared files from the root templates/ directory to include in every
    /// template, with source/dest renaming (used for `_gitignore`)
    #[serde(default)]
    pub shared_files: Vec<SharedFile>,
}

/// A feature overlay: extra files copied on top of the base tree when the
/// user opts into a feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    /// Directory holding the overlay files, relative to templates/
    pub source: String,

    /// Project subdirectory the overlay lands in (project root if absent)
    #[serde(default)]
    pub dest: Option<String>,
}

/// Overlay table; an absent entry means the feature is not offered for
/// this template and its prompt is skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overlays {
    #[serde(default)]
    pub router: Option<Overlay>,

    #[serde(default)]
    pub prerender: Option<Overlay>,

    /// Used instead of `prerender` when the router is also selected
    #[serde(default, rename = "prerender-router")]
    pub prerender_router: Option<Overlay>,
}

/// Per-template manifest (templates/<name>/template.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    pub description: String,

    /// Semver version for CLI compatibility checking
    pub version: String,

    #[serde(default)]
    pub overlays: Overlays,
}

impl TemplateManifest {
    pub fn supports_router(&self) -> bool {
        self.overlays.router.is_some()
    }

    pub fn supports_prerender(&self) -> bool {
        self.overlays.prerender.is_some()
    }

    /// Overlay for the chosen feature combination; the router-aware variant
    /// wins when both the router and prerendering were selected
    pub fn prerender_overlay(&self, use_router: bool) -> Option<&Overlay> {
        if use_router {
            self.overlays
                .prerender_router
                .as_ref()
                .or(self.overlays.prerender.as_ref())
        } else {
            self.overlays.prerender.as_ref()
        }
    }

    /// Overlay source directories referenced by this template, deduplicated,
    /// in declaration order (used when bundling zips)
    pub fn overlay_sources(&self) -> Vec<&str> {
        let mut sources = Vec::new();
        for overlay in [
            self.overlays.router.as_ref(),
            self.overlays.prerender.as_ref(),
            self.overlays.prerender_router.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            if !sources.contains(&overlay.source.as_str()) {
                sources.push(overlay.source.as_str());
            }
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
name: Vite
description: Vite + Preact starter
version: 0.1.0

overlays:
  router:
    source: config/router
    dest: src
  prerender:
    source: config/prerender
  prerender-router:
    source: config/prerender-router
";

    #[test]
    fn test_parse_template_manifest() {
        let manifest: TemplateManifest = serde_yaml::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.name, "Vite");
        assert!(manifest.supports_router());
        assert!(manifest.supports_prerender());
        assert_eq!(
            manifest.overlays.router.as_ref().unwrap().dest.as_deref(),
            Some("src")
        );
    }

    #[test]
    fn test_manifest_without_overlays() {
        let manifest: TemplateManifest =
            serde_yaml::from_str("name: SSR\ndescription: Vike SSR\nversion: 0.1.0\n").unwrap();
        assert!(!manifest.supports_router());
        assert!(!manifest.supports_prerender());
        assert!(manifest.prerender_overlay(false).is_none());
        assert!(manifest.overlay_sources().is_empty());
    }

    #[test]
    fn test_prerender_overlay_selection() {
        let manifest: TemplateManifest = serde_yaml::from_str(MANIFEST).unwrap();
        assert_eq!(
            manifest.prerender_overlay(false).unwrap().source,
            "config/prerender"
        );
        assert_eq!(
            manifest.prerender_overlay(true).unwrap().source,
            "config/prerender-router"
        );
    }

    #[test]
    fn test_overlay_sources_deduplicated() {
        let manifest: TemplateManifest = serde_yaml::from_str(
            "name: T\ndescription: D\nversion: 0.1.0\noverlays:\n  router:\n    source: config/router\n  prerender:\n    source: config/router\n",
        )
        .unwrap();
        assert_eq!(manifest.overlay_sources(), vec!["config/router"]);
    }

    #[test]
    fn test_shared_file_destination() {
        let shared = SharedFile {
            source: "_gitignore".to_string(),
            dest: None,
        };
        assert_eq!(shared.destination(), "_gitignore");

        let renamed = SharedFile {
            source: "gitignore-template".to_string(),
            dest: Some("_gitignore".to_string()),
        };
        assert_eq!(renamed.destination(), "_gitignore");
    }

    #[test]
    fn test_parse_root_manifest() {
        let root: RootManifest = serde_yaml::from_str(
            "templates:\n  - base\n  - ssr\nshared_files:\n  - source: _gitignore\n",
        )
        .unwrap();
        assert_eq!(root.templates, vec!["base", "ssr"]);
        assert_eq!(root.shared_files.len(), 1);
    }
}
