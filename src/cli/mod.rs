//! Command-line interface for the render profiler.
//!
//! # Commands
//!
//! - `profile` - Render components through the render service and report sizes
//! - `locate` - Show which package owns a component, and how it was determined
//! - `resolve` - Show a package's transitive dependencies in load order
//!
//! # Global Options
//!
//! Connection options (`--host`, `--render-origin`, `--timeout`, `--secret`,
//! `--dev`) override the config file and fall back to `RENDER_PROFILE_*`
//! environment variables.
//!
//! # Examples
//!
//! ```bash
//! # Profile two components concurrently, second fixture instance
//! render-profile profile --seed 1 \
//!     javascript/content-library-package/components/concept-thumbnail.jsx \
//!     javascript/video-package/player.jsx=fixtures/player.json
//!
//! # Which package owns a component on production?
//! render-profile --host https://www.khanacademy.org locate \
//!     javascript/content-library-package/components/concept-thumbnail.jsx
//!
//! # Load order for a package
//! render-profile resolve content-library.js --format json
//! ```

mod common;
mod locate;
mod profile;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use common::ConnectionArgs;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter for the tracing subscriber; `None` disables logging.
    pub log_level: Option<String>,

    /// Hide progress indicators.
    pub no_progress: bool,
}

/// Main CLI structure for the render profiler.
#[derive(Parser, Debug)]
#[command(
    name = "render-profile",
    about = "Profile how components render through a render service",
    version,
    long_about = "Resolves a component's package and its transitive dependencies from the host \
                  application's manifest, then asks the render service to render it and reports \
                  the size of the output."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress logging and progress output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Hide progress indicators
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render components and report the size of their output
    Profile(profile::ProfileCommand),

    /// Show which package owns a component
    Locate(locate::LocateCommand),

    /// Show a package's dependencies in load order
    Resolve(resolve::ResolveCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        init_logging(config.log_level.as_deref());
        self.execute_with_config(config).await
    }

    /// Derive runtime settings from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
        }
    }

    /// Execute with explicit runtime settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let settings = self.connection.load().await?;

        match self.command {
            Commands::Profile(cmd) => cmd.execute(&settings, &config).await,
            Commands::Locate(cmd) => cmd.execute(&settings).await,
            Commands::Resolve(cmd) => cmd.execute(&settings, &config).await,
        }
    }
}

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if let Some(level) = level {
        EnvFilter::new(format!("render_profiler={level},render_profile={level}"))
    } else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
