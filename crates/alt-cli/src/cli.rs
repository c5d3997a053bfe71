//! Command line definition and dispatch

use crate::commands::{self, EditOptions, ImageSelector, ScanOptions};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::logging;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Exit code when `scan --fail-on-missing` finds images without alt text
pub const EXIT_MISSING_ALT: i32 = 3;

/// Build the `alttext` command
#[must_use]
pub fn command() -> Command {
    Command::new("alttext")
        .version(crate::VERSION)
        .about("Audit images for missing alt text and edit it in place")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("scan")
                .about("Report images missing alt text")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Rendered HTML page"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("annotate")
                        .long("annotate")
                        .value_name("OUT")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the page with badges and edit buttons to OUT"),
                )
                .arg(
                    Arg::new("fail-on-missing")
                        .long("fail-on-missing")
                        .action(ArgAction::SetTrue)
                        .help("Exit with status 3 if any image lacks alt text"),
                ),
        )
        .subcommand(
            Command::new("edit")
                .about("Write alt text for one image and print the updated page")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Rendered HTML page"),
                )
                .arg(
                    Arg::new("image")
                        .long("image")
                        .required(true)
                        .value_parser(value_parser!(ImageSelector))
                        .help("Image index as printed by scan, or text contained in its src"),
                )
                .arg(
                    Arg::new("alt")
                        .long("alt")
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("New alt text; empty clears it"),
                )
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help("Remote endpoint URL; the configured store is used when omitted"),
                )
                .arg(Arg::new("nonce").long("nonce").help("Request token for the endpoint"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the updated page here instead of stdout"),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the alt text endpoint")
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Listen address, overriding the configuration"),
                ),
        )
}

/// Parse `args`, run the chosen subcommand and return the exit code
///
/// # Errors
/// Propagates configuration and command failures.
pub async fn run<I, T>(args: I) -> anyhow::Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(error) => {
            error.print().context("failed to print usage")?;
            return Ok(error.exit_code());
        }
    };

    let config = AppConfig::load_or_default(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    logging::init(&config.log)?;
    let ctx = AppContext::new(config)?;

    match matches.subcommand() {
        Some(("scan", args)) => run_scan(&ctx, args),
        Some(("edit", args)) => run_edit(&ctx, args).await,
        Some(("serve", args)) => run_serve(&ctx, args).await,
        _ => Ok(2),
    }
}

fn required<'a, T>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .with_context(|| format!("missing argument --{name}"))
}

fn run_scan(ctx: &AppContext, args: &ArgMatches) -> anyhow::Result<i32> {
    let options = ScanOptions {
        input: required::<PathBuf>(args, "file")?.clone(),
        json: args.get_flag("json"),
        annotate: args.get_one::<PathBuf>("annotate").cloned(),
    };
    let summary = commands::scan(ctx, &options, &mut std::io::stdout().lock())?;
    if args.get_flag("fail-on-missing") && summary.missing > 0 {
        return Ok(EXIT_MISSING_ALT);
    }
    Ok(0)
}

async fn run_edit(ctx: &AppContext, args: &ArgMatches) -> anyhow::Result<i32> {
    let options = EditOptions {
        input: required::<PathBuf>(args, "file")?.clone(),
        image: required::<ImageSelector>(args, "image")?.clone(),
        alt: required::<String>(args, "alt")?.clone(),
        endpoint: args.get_one::<String>("endpoint").cloned(),
        nonce: args.get_one::<String>("nonce").cloned(),
        output: args.get_one::<PathBuf>("out").cloned(),
    };
    let mut stdout = std::io::stdout();
    commands::edit(ctx, &options, &mut stdout).await?;
    Ok(0)
}

async fn run_serve(ctx: &AppContext, args: &ArgMatches) -> anyhow::Result<i32> {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        alt_http::wait_for_shutdown_signal().await;
        tracing::info!("shutdown requested");
        trigger.cancel();
    });
    commands::serve(ctx, args.get_one::<SocketAddr>("bind").copied(), shutdown).await?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn edit_arguments() {
        let matches = command()
            .try_get_matches_from([
                "alttext", "edit", "page.html", "--image", "bicycle", "--alt", "-", "--config", "c.toml",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "edit");
        assert_eq!(
            args.get_one::<ImageSelector>("image"),
            Some(&ImageSelector::Src("bicycle".into()))
        );
        assert_eq!(args.get_one::<String>("alt").map(String::as_str), Some("-"));
        assert_eq!(
            args.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("c.toml"))
        );
    }

    #[test]
    fn bind_must_be_an_address() {
        assert!(command()
            .try_get_matches_from(["alttext", "serve", "--bind", "localhost"])
            .is_err());
    }

    #[tokio::test]
    async fn usage_errors_map_to_exit_codes() {
        assert_eq!(run(["alttext", "--bogus"]).await.unwrap(), 2);
        assert_eq!(run(["alttext", "--help"]).await.unwrap(), 0);
    }
}
