//! Top-level wiring: logging, signal handling, argument parsing, menu loop.

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::cli::CliArgs;

pub struct App {
    cli: CliArgs,
}

impl App {
    pub fn init() -> Result<Self> {
        let cli = CliArgs::parse();

        let level = if cli.unsafe_debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
        tracing_subscriber::fmt().with_max_level(level).with_target(false).init();

        crate::signal::install()?;
        crate::signal::prevent_coredump();

        if cli.unsafe_debug {
            crate::ui::log::log_w("running with --unsafe-debug: log output may contain secret material");
        }
        if cli.unsafe_decrypt {
            crate::ui::log::log_w("running with --unsafe-decrypt: MAC failures will not abort decryption");
        }

        Ok(Self { cli })
    }

    pub fn execute(self) -> Result<()> {
        crate::ui::menu::run_menu(&self.cli)
    }
}
