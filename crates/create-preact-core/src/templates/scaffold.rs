//! Project scaffolding: base template, feature overlays, post-copy patches

use crate::options::ProjectOptions;
use crate::templates::copier;
use crate::templates::fetcher::TemplateFetcher;
use crate::templates::manifest::{Overlay, TemplateManifest};
use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Copy the selected template into `target_dir`, layer the overlays the
/// options ask for on top, and apply the post-copy patches. Returns the
/// relative paths written.
pub async fn scaffold(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    manifest: &TemplateManifest,
    target_dir: &Path,
    opts: &ProjectOptions,
) -> Result<Vec<String>> {
    let base_prefix = format!("{}/", template_name);
    let mut written =
        copier::copy_tree(fetcher, template_name, &base_prefix, target_dir, opts).await?;

    if opts.use_router {
        if let Some(overlay) = &manifest.overlays.router {
            written.extend(apply_overlay(fetcher, template_name, overlay, target_dir, opts).await?);
        }
    }

    if opts.use_prerender {
        if let Some(overlay) = manifest.prerender_overlay(opts.use_router) {
            written.extend(apply_overlay(fetcher, template_name, overlay, target_dir, opts).await?);
            mark_prerender_script(target_dir).await?;
        }
    }

    if opts.typescript() {
        switch_to_typescript(target_dir).await?;
    }

    if opts.use_eslint {
        add_eslint_config(&target_dir.join("package.json")).await?;
    }

    Ok(written)
}

async fn apply_overlay(
    fetcher: &mut TemplateFetcher,
    template_name: &str,
    overlay: &Overlay,
    target_dir: &Path,
    opts: &ProjectOptions,
) -> Result<Vec<String>> {
    let prefix = format!("{}/", overlay.source);
    let dest = overlay_dest(target_dir, overlay);
    copier::copy_tree(fetcher, template_name, &prefix, &dest, opts).await
}

fn overlay_dest(target_dir: &Path, overlay: &Overlay) -> PathBuf {
    match overlay.dest.as_deref() {
        Some(sub) if !sub.is_empty() => target_dir.join(sub),
        _ => target_dir.to_path_buf(),
    }
}

/// Tag the entry script so the build prerenders the app. Only the first
/// script tag is the entry point.
async fn mark_prerender_script(target_dir: &Path) -> Result<()> {
    let path = target_dir.join("index.html");
    let html = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    fs::write(&path, html.replacen("<script", "<script prerender", 1))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Rename `jsconfig.json` to `tsconfig.json` and point the entry HTML at the
/// renamed entry module. Templates that manage their own entry HTML (the SSR
/// template) carry neither file and are left alone.
async fn switch_to_typescript(target_dir: &Path) -> Result<()> {
    let jsconfig = target_dir.join("jsconfig.json");
    if fs::try_exists(&jsconfig).await? {
        let tsconfig = target_dir.join("tsconfig.json");
        fs::rename(&jsconfig, &tsconfig)
            .await
            .with_context(|| format!("Failed to rename {}", jsconfig.display()))?;
    }

    let html_path = target_dir.join("index.html");
    if fs::try_exists(&html_path).await? {
        let html = fs::read_to_string(&html_path)
            .await
            .with_context(|| format!("Failed to read {}", html_path.display()))?;
        fs::write(&html_path, html.replacen("index.jsx", "index.tsx", 1))
            .await
            .with_context(|| format!("Failed to write {}", html_path.display()))?;
    }

    Ok(())
}

/// Point ESLint at the shared preact config via package.json
async fn add_eslint_config(pkg_path: &Path) -> Result<()> {
    let raw = fs::read_to_string(pkg_path)
        .await
        .with_context(|| format!("Failed to read {}", pkg_path.display()))?;
    let mut pkg: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", pkg_path.display()))?;

    let object = pkg
        .as_object_mut()
        .with_context(|| format!("{} is not a JSON object", pkg_path.display()))?;
    object.insert("eslintConfig".to_string(), json!({ "extends": "preact" }));

    fs::write(pkg_path, to_tab_indented_json(&pkg)?)
        .await
        .with_context(|| format!("Failed to write {}", pkg_path.display()))?;
    Ok(())
}

/// package.json files in the templates are tab-indented; keep them that way
fn to_tab_indented_json(value: &serde_json::Value) -> Result<Vec<u8>> {
    use serde::Serialize;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Language, PackageManager};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// A miniature template directory exercising every substitution
    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "template.yaml",
            "templates:\n  - base\nshared_files:\n  - source: _gitignore\n",
        );
        write(root, "_gitignore", "node_modules\ndist\n");
        write(
            root,
            "base/template.yaml",
            concat!(
                "name: Vite\n",
                "description: Vite + Preact starter\n",
                "version: 0.1.0\n",
                "overlays:\n",
                "  router:\n",
                "    source: config/router\n",
                "    dest: src\n",
                "  prerender:\n",
                "    source: config/prerender\n",
                "  prerender-router:\n",
                "    source: config/prerender-router\n",
            ),
        );
        write(
            root,
            "base/index.html",
            "<body>\n<script type=\"module\" src=\"/src/index.jsx\"></script>\n</body>\n",
        );
        write(
            root,
            "base/package.json",
            "{\n\t\"private\": true,\n\t\"dependencies\": {\n\t\t\"preact\": \"^10.22.1\"\n\t}\n}",
        );
        write(root, "base/jsconfig.json", "{}\n");
        write(root, "base/README.md", "- `npm run dev` starts a dev server\n");
        write(root, "base/src/index.jsx", "render(<App />);\n");
        write(root, "base/src/style.css", "body {}\n");
        write(root, "config/router/pages/_404.jsx", "export const NotFound = 1;\n");
        write(root, "config/router/index.jsx", "router entry\n");
        write(root, "config/prerender/src/index.jsx", "prerender entry\n");
        write(
            root,
            "config/prerender-router/src/index.jsx",
            "prerender router entry\n",
        );
        dir
    }

    fn options(language: Language) -> ProjectOptions {
        ProjectOptions {
            package_manager: PackageManager::Npm,
            language,
            use_router: false,
            use_prerender: false,
            use_eslint: false,
        }
    }

    async fn run_scaffold(templates: &Path, target: &Path, opts: &ProjectOptions) -> Vec<String> {
        let mut fetcher = TemplateFetcher::from_local(templates.to_path_buf(), "test");
        let manifest = fetcher.fetch_template_manifest("base").await.unwrap();
        scaffold(&mut fetcher, "base", &manifest, target, opts)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_plain_javascript_scaffold() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        let written = run_scaffold(templates.path(), &target, &options(Language::JavaScript)).await;

        assert!(target.join("index.html").exists());
        assert!(target.join(".gitignore").exists());
        assert!(target.join("jsconfig.json").exists());
        assert!(target.join("src/index.jsx").exists());
        // The manifest never lands in the project
        assert!(!target.join("template.yaml").exists());
        assert!(written.contains(&".gitignore".to_string()));
    }

    #[tokio::test]
    async fn test_typescript_scaffold_renames_and_patches() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        run_scaffold(templates.path(), &target, &options(Language::TypeScript)).await;

        assert!(target.join("src/index.tsx").exists());
        assert!(!target.join("src/index.jsx").exists());
        assert!(target.join("tsconfig.json").exists());
        assert!(!target.join("jsconfig.json").exists());

        let html = std::fs::read_to_string(target.join("index.html")).unwrap();
        assert!(html.contains("src/index.tsx"), "Got:\n{}", html);
    }

    #[tokio::test]
    async fn test_router_overlay_lands_in_src() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        let mut opts = options(Language::JavaScript);
        opts.use_router = true;
        run_scaffold(templates.path(), &target, &opts).await;

        assert!(target.join("src/pages/_404.jsx").exists());
        let entry = std::fs::read_to_string(target.join("src/index.jsx")).unwrap();
        assert_eq!(entry, "router entry\n");
    }

    #[tokio::test]
    async fn test_prerender_marks_entry_script() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        let mut opts = options(Language::JavaScript);
        opts.use_prerender = true;
        run_scaffold(templates.path(), &target, &opts).await;

        let html = std::fs::read_to_string(target.join("index.html")).unwrap();
        assert!(html.contains("<script prerender"), "Got:\n{}", html);
        let entry = std::fs::read_to_string(target.join("src/index.jsx")).unwrap();
        assert_eq!(entry, "prerender entry\n");
    }

    #[tokio::test]
    async fn test_router_and_prerender_pick_combined_overlay() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        let mut opts = options(Language::JavaScript);
        opts.use_router = true;
        opts.use_prerender = true;
        run_scaffold(templates.path(), &target, &opts).await;

        let entry = std::fs::read_to_string(target.join("src/index.jsx")).unwrap();
        assert_eq!(entry, "prerender router entry\n");
    }

    #[tokio::test]
    async fn test_eslint_config_injected_with_tabs() {
        let templates = fixture();
        let out = TempDir::new().unwrap();
        let target = out.path().join("app");

        let mut opts = options(Language::JavaScript);
        opts.use_eslint = true;
        run_scaffold(templates.path(), &target, &opts).await;

        let pkg = std::fs::read_to_string(target.join("package.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&pkg).unwrap();
        assert_eq!(value["eslintConfig"]["extends"], "preact");
        assert!(pkg.contains("\t\"eslintConfig\""), "Got:\n{}", pkg);
    }
}
