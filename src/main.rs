//! render-profile CLI entry point
//!
//! Parses arguments, runs the selected command, and turns any error that
//! aborts the command into a colored, user-friendly report.

use anyhow::Result;
use clap::Parser;
use render_profiler::cli;
use render_profiler::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
