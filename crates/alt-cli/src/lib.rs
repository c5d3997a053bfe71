//! Alt CLI - the `alttext` command
//!
//! - `alttext scan PAGE [--json] [--annotate OUT] [--fail-on-missing]`
//! - `alttext edit PAGE --image N|SRC --alt TEXT [--endpoint URL --nonce N] [--out FILE]`
//! - `alttext serve [--bind ADDR]`
//!
//! All subcommands accept `--config FILE` (TOML, see [`config`]). The log
//! filter comes from `ALTTEXT_LOG`, falling back to `log.filter`.

#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod logging;

pub use cli::{command, run};
pub use config::AppConfig;
pub use context::AppContext;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
