//! Charm-style CLI prompts using cliclack

use crate::options::{Language, PackageManager, ProjectOptions};
use crate::product::ProductConfig;
use crate::runtime::{check, install};
use crate::templates::manifest::TemplateManifest;
use crate::templates::{fetcher::TemplateFetcher, scaffold, version};
use anyhow::Result;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// CLI arguments for the create command
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Local directory to use for templates instead of fetching from remote
    pub template_dir: Option<PathBuf>,

    /// Template name to use
    pub template: Option<String>,

    /// Project directory to create
    pub directory: Option<PathBuf>,

    /// Project language
    pub language: Option<Language>,

    /// Package manager override (detected from the environment when absent)
    pub package_manager: Option<PackageManager>,

    /// Pre-answer the router prompt with yes
    pub router: bool,

    /// Pre-answer the prerender prompt with yes
    pub prerender: bool,

    /// Pre-answer the ESLint prompt with yes
    pub eslint: bool,

    /// Skip dependency installation
    pub skip_install: bool,

    /// Suppress the Getting Started note (for wrapping initializers)
    pub skip_hints: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Run the CLI with interactive prompts
pub async fn run<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    match run_flow(config, args, cli_version).await {
        Err(err) if is_cancel(&err) => {
            cliclack::outro_cancel("Cancelled".yellow())?;
            std::process::exit(0);
        }
        other => other,
    }
}

async fn run_flow<C: ProductConfig>(config: &C, args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro(config.banner())?;

    let package_manager = args.package_manager.unwrap_or_else(PackageManager::detect);

    // Step 1: Setup template fetcher
    let mut fetcher = setup_fetcher(config, &args.template_dir)?;

    // Step 2: Select template
    let (template_name, manifest) = select_template(&mut fetcher, args.template.as_deref()).await?;

    // Check version compatibility
    if let version::Compatibility::CliOutdated { template, .. } =
        version::check(cli_version, &manifest.version)
    {
        cliclack::log::warning(format!(
            "This template expects CLI {} or newer (you are on {}). Consider updating: {}",
            template,
            cli_version,
            config.upgrade_command()
        ))?;
    }

    // Step 3: Select directory
    let project_dir = select_directory(&args)?;

    // Step 4: Gather the remaining options
    let opts = select_options(&manifest, &args, package_manager)?;

    // Step 5: Create project
    let spinner = cliclack::spinner();
    spinner.start("Setting up your project directory...");
    let written = scaffold::scaffold(&mut fetcher, &template_name, &manifest, &project_dir, &opts)
        .await?;
    spinner.stop(format!("Set up project directory ({} files)", written.len()));

    // Step 6: Install dependencies
    if args.skip_install {
        cliclack::log::info("Skipping dependency installation")?;
    } else {
        check_runtimes(&opts)?;

        let spinner = cliclack::spinner();
        spinner.start("Installing project dependencies...");
        install::install_dependencies(&project_dir, &opts).await?;
        spinner.stop("Installed project dependencies");
    }

    // Step 7: Show next steps
    if !args.skip_hints {
        print_getting_started(config, &project_dir, &opts)?;
    }

    cliclack::outro("You're all set!".green())?;

    Ok(())
}

/// True when the error is a prompt cancellation (Esc or Ctrl-C inside a prompt)
fn is_cancel(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::Interrupted)
}

fn setup_fetcher<C: ProductConfig>(
    config: &C,
    template_dir: &Option<PathBuf>,
) -> Result<TemplateFetcher> {
    let fetcher = match template_dir {
        Some(path) => {
            cliclack::log::info(format!("Using local templates from {}", path.display()))?;
            TemplateFetcher::from_local(path.clone(), config.user_agent())
        }
        None => TemplateFetcher::from_config(config)?,
    };

    Ok(fetcher)
}

async fn select_template(
    fetcher: &mut TemplateFetcher,
    specified_template: Option<&str>,
) -> Result<(String, TemplateManifest)> {
    let spinner = cliclack::spinner();
    spinner.start("Loading templates...");

    let root_manifest = fetcher.fetch_root_manifest().await?;

    // If a template was specified via --template flag, use it directly
    if let Some(template_name) = specified_template {
        if !root_manifest.templates.contains(&template_name.to_string()) {
            spinner.stop("Failed to load templates");
            let available = root_manifest.templates.join(", ");
            anyhow::bail!(
                "Template '{}' not found. Available templates: {}",
                template_name,
                available
            );
        }

        let manifest = fetcher.fetch_template_manifest(template_name).await?;
        spinner.stop(format!(
            "Template: {} - {}",
            manifest.name, manifest.description
        ));
        return Ok((template_name.to_string(), manifest));
    }

    let mut templates: Vec<(String, TemplateManifest)> = Vec::new();
    for template_name in &root_manifest.templates {
        let manifest = fetcher.fetch_template_manifest(template_name).await?;
        templates.push((template_name.clone(), manifest));
    }

    spinner.stop("Templates loaded");

    if templates.is_empty() {
        anyhow::bail!("No templates found.");
    }

    // If only one template, use it automatically
    if templates.len() == 1 {
        let (name, manifest) = templates.into_iter().next().unwrap();
        cliclack::log::info(format!(
            "Using template: {} - {}",
            manifest.name, manifest.description
        ))?;
        return Ok((name, manifest));
    }

    // Build select prompt - use indices to avoid borrow issues
    let mut select = cliclack::select("Select a template");
    for (idx, (_, manifest)) in templates.iter().enumerate() {
        select = select.item(idx, &manifest.name, &manifest.description);
    }

    let selected_idx: usize = select.interact()?;
    let (name, manifest) = templates.into_iter().nth(selected_idx).unwrap();

    Ok((name, manifest))
}

fn select_directory(args: &CreateArgs) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Use --directory flag if provided, keeping the no-overwrite rule
    if let Some(dir) = &args.directory {
        let path = if dir.is_absolute() {
            dir.clone()
        } else {
            current_dir.join(dir)
        };
        if path.exists() {
            anyhow::bail!(
                "Refusing to overwrite existing directory or file: {}",
                path.display()
            );
        }
        cliclack::log::info(format!("Using directory: {}", path.display()))?;
        return Ok(path);
    }

    let input: String = cliclack::input("Project directory:")
        .placeholder("my-preact-app")
        .validate(|value: &String| {
            if value.is_empty() {
                Err("Directory name is required!")
            } else if Path::new(value).exists() {
                Err("Refusing to overwrite existing directory or file! Please provide a non-clashing name.")
            } else {
                Ok(())
            }
        })
        .interact()?;

    let path = PathBuf::from(&input);
    Ok(if path.is_absolute() {
        path
    } else {
        current_dir.join(path)
    })
}

fn select_options(
    manifest: &TemplateManifest,
    args: &CreateArgs,
    package_manager: PackageManager,
) -> Result<ProjectOptions> {
    let language = match args.language {
        Some(language) => language,
        None if args.yes => Language::JavaScript,
        None => cliclack::select("Project language:")
            .item(Language::JavaScript, "JavaScript", "")
            .item(Language::TypeScript, "TypeScript", "")
            .interact()?,
    };

    let use_router = confirm_feature(manifest.supports_router(), args.router, args.yes, || {
        cliclack::confirm("Use router?").initial_value(false).interact()
    })?;

    let use_prerender =
        confirm_feature(manifest.supports_prerender(), args.prerender, args.yes, || {
            cliclack::confirm("Prerender app (SSG)?")
                .initial_value(false)
                .interact()
        })?;

    let use_eslint = confirm_feature(true, args.eslint, args.yes, || {
        cliclack::confirm("Use ESLint?").initial_value(false).interact()
    })?;

    let opts = ProjectOptions {
        package_manager,
        language,
        use_router,
        use_prerender,
        use_eslint,
    };

    cliclack::log::success(format!(
        "Scaffolding a {} project ({})",
        opts.language.display_name(),
        opts.package_manager
    ))?;

    Ok(opts)
}

/// Resolve a feature toggle: unsupported templates never ask, a flag
/// pre-answers with yes, `--yes` takes the default, otherwise prompt
fn confirm_feature(
    supported: bool,
    flag: bool,
    yes: bool,
    prompt: impl FnOnce() -> std::io::Result<bool>,
) -> Result<bool> {
    if !supported {
        return Ok(false);
    }
    if flag {
        return Ok(true);
    }
    if yes {
        return Ok(false);
    }
    Ok(prompt()?)
}

fn check_runtimes(opts: &ProjectOptions) -> Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Checking runtimes...");

    match check::check_runtimes(opts.package_manager) {
        Ok(runtimes) => {
            let runtime_info: Vec<String> = runtimes
                .iter()
                .map(|r| {
                    if r.available {
                        format!("{} ({})", r.name, r.version.as_deref().unwrap_or("unknown"))
                    } else {
                        format!("{} (not installed)", r.name)
                    }
                })
                .collect();
            spinner.stop(format!("Detected runtimes: {}", runtime_info.join(", ")));

            if let Some(missing) = runtimes.iter().find(|r| !r.available) {
                cliclack::log::warning(format!(
                    "{} was not found; the dev server will need it",
                    missing.name
                ))?;
            }
            Ok(())
        }
        Err(e) => {
            spinner.stop("Missing runtimes");
            cliclack::log::error(format!("{}", e))?;
            anyhow::bail!("Please install the missing runtimes and try again.");
        }
    }
}

fn print_getting_started<C: ProductConfig>(
    config: &C,
    project_dir: &Path,
    opts: &ProjectOptions,
) -> Result<()> {
    let steps = config.next_steps(project_dir, opts.package_manager);
    let body = steps
        .iter()
        .map(|step| format!("{} {}", "$".dimmed(), step.bright_blue()))
        .collect::<Vec<_>>()
        .join("\n");

    cliclack::note("Getting Started", body)?;

    Ok(())
}
