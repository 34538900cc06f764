//! Template fetching from remote (GitHub) or local directory
//!
//! Both remote and local templates use zip files for consistency:
//! - Remote: Fetches pre-built zips from URL
//! - Local: Automatically builds zips from template folders, then uses them
//!
//! This ensures identical behavior between development and production.

use super::manifest::{RootManifest, SharedFile, TemplateManifest};
use crate::product::ProductConfig;
use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use url::Url;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Template source - either remote URL or local directory
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a remote template source from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let url_str = std::env::var(config.template_url_env())
            .unwrap_or_else(|_| config.default_template_url().to_string());
        let url =
            Url::parse(&url_str).with_context(|| format!("Invalid template URL: {}", url_str))?;
        Ok(Self::Remote(url))
    }

    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }
}

/// Cached template data extracted from zip
#[derive(Debug, Clone)]
struct TemplateCache {
    manifest: TemplateManifest,
    files: HashMap<String, Vec<u8>>,
}

/// Template fetcher - handles retrieving templates from remote or local sources
pub struct TemplateFetcher {
    source: TemplateSource,
    client: reqwest::Client,
    /// Cache of downloaded/built and extracted templates
    template_cache: HashMap<String, TemplateCache>,
}

impl TemplateFetcher {
    /// Create a new fetcher with a custom user agent
    pub fn new(source: TemplateSource, user_agent: &str) -> Self {
        Self {
            source,
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            template_cache: HashMap::new(),
        }
    }

    /// Create a fetcher from a product config
    pub fn from_config<C: ProductConfig>(config: &C) -> Result<Self> {
        let source = TemplateSource::from_config(config)?;
        Ok(Self::new(source, config.user_agent()))
    }

    /// Create a fetcher for local templates
    pub fn from_local(path: PathBuf, user_agent: &str) -> Self {
        Self::new(TemplateSource::local(path), user_agent)
    }

    /// Build a URL by appending a path segment, preserving query parameters
    fn build_url(base: &Url, path_segment: &str) -> Result<Url> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", base))?
            .pop_if_empty()
            .push(path_segment);
        Ok(url)
    }

    /// Fetch the root manifest listing available templates
    pub async fn fetch_root_manifest(&self) -> Result<RootManifest> {
        match &self.source {
            TemplateSource::Remote(base_url) => {
                let url = Self::build_url(base_url, "template.yaml")?;
                let response = self.client.get(url.clone()).send().await.with_context(|| {
                    format!("Failed to fetch root template manifest from {}", url)
                })?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch root manifest from {}: HTTP {}",
                        url,
                        response.status()
                    );
                }

                let content = response.text().await?;
                serde_yaml::from_str(&content).context("Failed to parse root manifest")
            }
            TemplateSource::Local(path) => {
                let manifest_path = path.join("template.yaml");
                let content = fs::read_to_string(&manifest_path)
                    .await
                    .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
                serde_yaml::from_str(&content).context("Failed to parse root manifest")
            }
        }
    }

    /// Build a zip file for a local template by walking its directory tree.
    /// Bundles shared files from the root templates directory (with optional
    /// renaming) and the overlay directories the template's manifest refers to.
    pub fn build_local_zip(
        template_dir: &Path,
        template_name: &str,
        shared_files: &[SharedFile],
    ) -> Result<Vec<u8>> {
        let template_path = template_dir.join(template_name);
        let manifest_path = template_path.join("template.yaml");

        let manifest_content = std::fs::read_to_string(&manifest_path)
            .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
        let manifest: TemplateManifest = serde_yaml::from_str(&manifest_content)
            .with_context(|| format!("Failed to parse template '{}' manifest", template_name))?;

        let mut zip_buffer = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut zip_buffer));
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

            // Shared files first; the template's own tree never overrides them
            let mut shared_dests: HashSet<String> = HashSet::new();
            for shared in shared_files {
                let source_path = template_dir.join(&shared.source);
                let dest_name = shared.destination();

                if source_path.exists() {
                    let content = std::fs::read(&source_path).with_context(|| {
                        format!("Failed to read shared file {}", source_path.display())
                    })?;
                    let zip_path = format!("{}/{}", template_name, dest_name);
                    zip.start_file(zip_path.as_str(), options)?;
                    zip.write_all(&content)?;
                    shared_dests.insert(dest_name.to_string());
                } else {
                    eprintln!(
                        "Warning: Shared file '{}' not found in {}",
                        shared.source,
                        template_dir.display()
                    );
                }
            }

            // The template's own tree, template.yaml included
            Self::zip_dir(&mut zip, options, &template_path, template_name, |rel| {
                shared_dests.contains(rel)
            })?;

            // Overlay directories referenced by the manifest, under their own paths
            for source in manifest.overlay_sources() {
                let overlay_path = template_dir.join(source);
                if !overlay_path.is_dir() {
                    eprintln!(
                        "Warning: Overlay directory '{}' not found in {}",
                        source,
                        template_dir.display()
                    );
                    continue;
                }
                Self::zip_dir(&mut zip, options, &overlay_path, source, |_| false)?;
            }

            zip.finish()?;
        }

        Ok(zip_buffer)
    }

    /// Add every file under `dir` to the zip, prefixed with `prefix/`
    fn zip_dir(
        zip: &mut ZipWriter<Cursor<&mut Vec<u8>>>,
        options: SimpleFileOptions,
        dir: &Path,
        prefix: &str,
        skip: impl Fn(&str) -> bool,
    ) -> Result<()> {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(dir)?;
            let rel = zip_rel_path(relative);
            if skip(&rel) {
                continue;
            }
            let content = std::fs::read(entry.path())
                .with_context(|| format!("Failed to read {}", entry.path().display()))?;
            let zip_path = format!("{}/{}", prefix, rel);
            zip.start_file(zip_path.as_str(), options)?;
            zip.write_all(&content)?;
        }
        Ok(())
    }

    /// Extract a zip into the template cache
    fn extract_zip_to_cache(zip_bytes: &[u8], template_name: &str) -> Result<TemplateCache> {
        let cursor = Cursor::new(zip_bytes);
        let mut archive = ZipArchive::new(cursor).with_context(|| {
            format!(
                "Failed to read zip archive for template '{}'",
                template_name
            )
        })?;

        let mut files: HashMap<String, Vec<u8>> = HashMap::new();
        let mut manifest: Option<TemplateManifest> = None;
        let manifest_entry = format!("{}/template.yaml", template_name);

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let path = file.name().to_string();

            // Skip directories
            if file.is_dir() {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;

            if path == manifest_entry {
                let content_str = String::from_utf8_lossy(&contents);
                manifest = Some(serde_yaml::from_str(&content_str).with_context(|| {
                    format!("Failed to parse template '{}' manifest", template_name)
                })?);
            }

            files.insert(path, contents);
        }

        let manifest = manifest.ok_or_else(|| {
            anyhow::anyhow!("Template '{}' zip missing template.yaml", template_name)
        })?;

        Ok(TemplateCache { manifest, files })
    }

    /// Fetch/build, extract, and cache a template's zip file
    pub async fn ensure_cached(&mut self, template_name: &str) -> Result<()> {
        if self.template_cache.contains_key(template_name) {
            return Ok(());
        }

        let zip_bytes = match &self.source {
            TemplateSource::Remote(base_url) => {
                let zip_url = Self::build_url(base_url, &format!("{}.zip", template_name))?;
                let response = self
                    .client
                    .get(zip_url.clone())
                    .send()
                    .await
                    .with_context(|| format!("Failed to fetch template zip: {}", template_name))?;

                if !response.status().is_success() {
                    anyhow::bail!(
                        "Failed to fetch template '{}' zip from {}: HTTP {}",
                        template_name,
                        zip_url,
                        response.status()
                    );
                }

                response.bytes().await?.to_vec()
            }
            TemplateSource::Local(path) => {
                // The root manifest carries the shared file list
                let root_manifest = self.fetch_root_manifest().await?;
                Self::build_local_zip(path, template_name, &root_manifest.shared_files)?
            }
        };

        let cache = Self::extract_zip_to_cache(&zip_bytes, template_name)?;
        self.template_cache.insert(template_name.to_string(), cache);

        Ok(())
    }

    /// Fetch a specific template's manifest
    pub async fn fetch_template_manifest(
        &mut self,
        template_name: &str,
    ) -> Result<TemplateManifest> {
        self.ensure_cached(template_name).await?;
        let cache = self
            .template_cache
            .get(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found in cache", template_name))?;
        Ok(cache.manifest.clone())
    }

    /// All cached files of a template, keyed by zip path
    /// (`<template>/...` for the base tree, `config/...` for overlays).
    /// Call [`ensure_cached`](Self::ensure_cached) first.
    pub fn cached_files(&self, template_name: &str) -> Result<&HashMap<String, Vec<u8>>> {
        self.template_cache
            .get(template_name)
            .map(|cache| &cache.files)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found in cache", template_name))
    }

    /// Get the template source
    #[allow(dead_code)]
    pub fn source(&self) -> &TemplateSource {
        &self.source
    }
}

/// Forward-slash path for zip entries, independent of the host separator
fn zip_rel_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
