use clap::ArgMatches;
use colored::Colorize;
use commands::command_argument_builder;
use fibertrace::config::{CliOverrides, Config, Settings};
use fibertrace::handlers::*;
use fibertrace_core::DistanceUnit;
use std::path::PathBuf;
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let Some((name, sub_matches)) = matches.subcommand() else {
        return;
    };

    init_tracing(sub_matches.get_count("verbose"));

    if let Err(e) = run(name, sub_matches).await {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn settings_from(args: &ArgMatches) -> anyhow::Result<Settings> {
    let config = Config::load_from(args.get_one::<String>("config").map(String::as_str))?;

    // Only some subcommands define these, so look them up fallibly
    let text = |id: &str| -> Option<String> {
        args.try_get_one::<String>(id).ok().flatten().cloned()
    };
    let overrides = CliOverrides {
        source: text("source"),
        network: text("network"),
        unit: text("unit").as_deref().and_then(DistanceUnit::from_str),
        redirects: args.try_get_one::<PathBuf>("redirects").ok().flatten().cloned(),
    };

    Ok(Settings::resolve(overrides, config))
}

async fn run(name: &str, args: &ArgMatches) -> anyhow::Result<()> {
    let settings = settings_from(args)?;
    let quiet = args.get_flag("quiet");

    match name {
        "trace" => handle_trace(args, &settings, quiet).await,
        "table" => handle_table(args, &settings, quiet).await,
        "export" => handle_export(args, &settings, quiet).await,
        "summary" => handle_summary(&settings, quiet).await,
        "validate" => handle_validate(&settings, quiet).await,
        "search" => handle_search(args, &settings, quiet).await,
        "measure" => handle_measure(args, &settings),
        "fault" => handle_fault(args, &settings, quiet).await,
        "probe" => handle_probe(&settings, quiet).await,
        "watch" => handle_watch(args, &settings, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
