//! Command-line argument parsing.
//!
//! There are no subcommands: the only entry point is the interactive menu.
//! Flags only adjust its behavior.

use clap::Parser;

/// purbox - offline file encryption producing padded, uniform, random-looking cryptoblobs.
#[derive(Parser, Debug)]
#[command(name = "purbox", version, about)]
pub struct CliArgs {
    /// Verbose debug logging, including secret material in `D:` lines.
    #[arg(long)]
    pub unsafe_debug: bool,

    /// Release unverified plaintext on MAC failure instead of aborting.
    #[arg(long)]
    pub unsafe_decrypt: bool,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
