// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, anyhow};
use config::Config;
use quickbill_app::{AppState, BillHeader};
use std::env;
use std::path::PathBuf;
use time::{Date, OffsetDateTime};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `quickbill --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;
    logging::init(&config)?;

    let catalog = config.catalog()?;
    let header = BillHeader::new(options.order_number, local_today())?;
    tracing::info!(
        config = %options.config_path.display(),
        catalog_items = catalog.len(),
        order = header.order_number,
        "startup checks passed"
    );
    if options.check_only {
        return Ok(());
    }

    let mut state = AppState::with_catalog(catalog);
    quickbill_tui::run_app(&mut state, &header, &config.ui_options())
}

fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    order_number: u64,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        order_number: 1,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--order" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--order requires an order number"))?;
                options.order_number = parse_order_number(value.as_ref())?;
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn parse_order_number(raw: &str) -> Result<u64> {
    let order: u64 = raw
        .parse()
        .with_context(|| format!("--order expects a positive whole number, got {raw:?}"))?;
    if order == 0 {
        return Err(anyhow!("--order must be at least 1"));
    }
    Ok(order)
}

fn print_help() {
    println!("quickbill");
    println!("  --config <path>          Use a specific config path");
    println!("  --order <n>              Order number shown in the header (default 1)");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config + catalog and exit");
    println!("  --help                   Show this help");
}
