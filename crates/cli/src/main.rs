//! webp-static CLI
//!
//! Installs the prebuilt libwebp tools for every supported platform and
//! reports where the current platform's tools live.

// CLI binary needs to output to stdout/stderr - this is intentional
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;
mod commands;
mod logging;

use cli::{EXIT_FAILURE, EXIT_OK, render_error};
use logging::TracingConfig;

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let tracing_config = TracingConfig {
        format: cli.log_format,
        level: cli.level.into(),
        ..Default::default()
    };
    // Ignore error if tracing already initialized (e.g., in tests)
    let _ = logging::init_tracing(tracing_config);

    let exit_code = match commands::execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            EXIT_OK
        }
        Err(err) => {
            render_error(err, cli.json);
            EXIT_FAILURE
        }
    };
    std::process::exit(exit_code);
}
