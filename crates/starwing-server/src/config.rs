//! Command-line surface.
//!
//! `-p <port> -h <hostname> -g <RType|flappyByte>`, all required. Any
//! missing or invalid flag prints usage and exits with code 84.

use clap::Parser;
use starwing_engine::prelude::GameMode;

/// Exit code for argument errors.
pub const EXIT_USAGE: i32 = 84;

const USAGE: &str = "USAGE: ./starwing-server -p <port> -h <hostname> -g <RType|flappyByte>";

/// Parsed server arguments.
#[derive(Debug, Parser)]
#[command(name = "starwing-server", disable_help_flag = true)]
pub struct Args {
    /// UDP port to bind, 1..65535.
    #[arg(short = 'p')]
    pub port: u16,

    /// Hostname or address to bind.
    #[arg(short = 'h')]
    pub hostname: String,

    /// Game mode, `RType` or `flappyByte`.
    #[arg(short = 'g')]
    pub game: GameMode,
}

impl Args {
    /// Validation beyond what clap's types give us.
    fn is_valid(&self) -> bool {
        self.port != 0 && !self.hostname.is_empty()
    }
}

/// Parse `std::env::args`, printing usage and exiting 84 on any failure.
pub fn parse_or_exit() -> Args {
    match Args::try_parse() {
        Ok(args) if args.is_valid() => args,
        Ok(_) => {
            eprintln!("{USAGE}");
            std::process::exit(EXIT_USAGE);
        }
        Err(err) => {
            tracing::debug!(%err, "argument parsing failed");
            eprintln!("{USAGE}");
            std::process::exit(EXIT_USAGE);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
