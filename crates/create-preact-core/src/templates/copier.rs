//! Template tree copying with the scaffolder's text substitutions

use crate::options::{PackageManager, ProjectOptions};
use crate::templates::fetcher::TemplateFetcher;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Copy every cached file under `prefix` into the target directory,
/// applying the per-file renames and substitutions. Returns the relative
/// paths written.
pub async fn copy_tree(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    prefix: &str,
    target_dir: &Path,
    opts: &ProjectOptions,
) -> Result<Vec<String>> {
    fs::create_dir_all(target_dir)
        .await
        .context("Failed to create target directory")?;

    fetcher.ensure_cached(template_name).await?;

    // Collect up front; the cache borrow must not outlive the writes
    let entries: Vec<(String, Vec<u8>)> = fetcher
        .cached_files(template_name)?
        .iter()
        .filter(|(path, _)| path.starts_with(prefix))
        .map(|(path, content)| (path[prefix.len()..].to_string(), content.clone()))
        .collect();

    let mut copied_files = Vec::new();

    for (relative, content) in entries {
        // The manifest is metadata, not project content
        if relative == "template.yaml" {
            continue;
        }

        let destination = destination_path(&relative, opts.typescript());
        let content = rewrite_contents(&destination, content, opts.package_manager);

        let target_path = target_dir.join(&destination);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(&target_path, &content)
            .await
            .with_context(|| format!("Failed to write file: {}", target_path.display()))?;

        copied_files.push(destination);
    }

    Ok(copied_files)
}

/// Where a template file lands in the project, after renames
fn destination_path(relative: &str, typescript: bool) -> String {
    let (dir, name) = match relative.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, relative),
    };

    let renamed = rename_file(name, typescript);

    match dir {
        Some(dir) => format!("{}/{}", dir, renamed),
        None => renamed,
    }
}

/// Per-file renames: `_gitignore` becomes `.gitignore` (the underscore keeps
/// template gitignores from applying to this repository), and TypeScript
/// projects get `.ts`/`.tsx` sources
fn rename_file(name: &str, typescript: bool) -> String {
    if name == "_gitignore" {
        return ".gitignore".to_string();
    }

    if typescript {
        if let Some(stem) = name.strip_suffix(".jsx") {
            return format!("{}.tsx", stem);
        }
        if let Some(stem) = name.strip_suffix(".js") {
            return format!("{}.ts", stem);
        }
    }

    name.to_string()
}

/// Content substitutions: README run commands are rewritten for the chosen
/// package manager. Everything else is copied verbatim.
fn rewrite_contents(destination: &str, content: Vec<u8>, pm: PackageManager) -> Vec<u8> {
    let is_readme = destination == "README.md" || destination.ends_with("/README.md");
    if !is_readme || pm == PackageManager::Npm {
        return content;
    }

    match String::from_utf8(content) {
        Ok(text) => text.replace("npm run", pm.bin()).into_bytes(),
        Err(err) => err.into_bytes(),
    }
}
