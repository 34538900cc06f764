//! create-preact - Preact project scaffolding CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use create_preact_core::options::{Language, PackageManager};
use create_preact_core::tui::CreateArgs;
use create_preact_core::ProductConfig;
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Preact product configuration
#[derive(Clone)]
pub struct PreactConfig;

impl ProductConfig for PreactConfig {
    fn name(&self) -> &'static str {
        "create-preact"
    }

    fn tagline(&self) -> &'static str {
        "Preact - Fast 3kB alternative to React with the same modern API"
    }

    fn brand_color(&self) -> (u8, u8, u8) {
        (174, 128, 255)
    }

    fn default_template_url(&self) -> &'static str {
        "https://preactjs.github.io/create-preact/templates"
    }

    fn template_url_env(&self) -> &'static str {
        "CREATE_PREACT_TEMPLATE_URL"
    }

    fn docs_url(&self) -> &'static str {
        "https://preactjs.com"
    }

    fn cli_description(&self) -> &'static str {
        "Scaffold a new Preact project"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install create-preact --force"
    }

    fn next_steps(&self, dir: &Path, package_manager: PackageManager) -> Vec<String> {
        // Show the path relative to where the user is, when possible
        let display_dir = std::env::current_dir()
            .ok()
            .and_then(|cwd| dir.strip_prefix(cwd).ok().map(Path::to_path_buf))
            .unwrap_or_else(|| dir.to_path_buf());

        vec![
            format!("cd {}", display_dir.display()),
            format!("{} dev", package_manager.run_prefix()),
        ]
    }
}

#[derive(Parser, Debug)]
#[command(name = "create-preact")]
#[command(about = "Scaffold a new Preact project")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Preact project
    Create(CliCreateArgs),
    /// Build zip files for all templates in the template directory (for development use)
    BuildZips(BuildZipsArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// Project directory to create
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Template name to use
    #[arg(short, long)]
    pub template: Option<String>,

    /// Local directory to use for templates instead of fetching from remote (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// Project language (js or ts)
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Package manager to install with (npm, yarn or pnpm; detected when omitted)
    #[arg(long = "package-manager")]
    pub package_manager: Option<PackageManager>,

    /// Set up preact-iso routing
    #[arg(long)]
    pub router: bool,

    /// Prerender the app to static HTML (SSG)
    #[arg(long)]
    pub prerender: bool,

    /// Add ESLint with the preact config
    #[arg(long)]
    pub eslint: bool,

    /// Skip dependency installation
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Suppress the Getting Started hint (for wrapping initializers)
    #[arg(long = "skip-hints")]
    pub skip_hints: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            template_dir: args.template_dir,
            template: args.template,
            directory: args.directory,
            language: args.language,
            package_manager: args.package_manager,
            router: args.router,
            prerender: args.prerender,
            eslint: args.eslint,
            skip_install: args.skip_install,
            skip_hints: args.skip_hints,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct BuildZipsArgs {
    /// Local directory containing templates to build zips from (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = PreactConfig;

    match args.command {
        Some(Command::Create(create_args)) => {
            let result = create_preact_core::run(&config, create_args.into(), CLI_VERSION).await;

            // Ensure cursor is visible on normal exit
            let _ = console::Term::stderr().show_cursor();

            result
        }
        Some(Command::BuildZips(build_args)) => {
            create_preact_core::templates::build_zips(&config, &build_args.template_dir).await
        }
        None => {
            // No subcommand provided, default to create behavior (interactive mode)
            let result =
                create_preact_core::run(&config, CreateArgs::default(), CLI_VERSION).await;

            let _ = console::Term::stderr().show_cursor();

            result
        }
    }
}
