//! oxicc: inspect ICC profiles and manage device profile assignments

mod args;
mod commands;
mod store;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use oxicc_core::{ProfileContext, SearchPaths};

use args::{Cli, Commands};
use commands::Output;
use store::JsonSettings;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn context(profile_dirs: &[PathBuf]) -> ProfileContext {
    let mut paths = SearchPaths::new(profile_dirs.to_vec());
    for dir in SearchPaths::from_env().dirs() {
        paths.push(dir.clone());
    }
    ProfileContext::new(paths)
}

fn run(cli: Cli) -> anyhow::Result<Output> {
    let ctx = context(&cli.profile_dirs);
    let settings_path = cli
        .settings
        .or_else(store::default_path)
        .context("no settings file location")?;
    let mut settings = JsonSettings::open(&settings_path)
        .with_context(|| format!("cannot open {}", settings_path.display()))?;

    match cli.command {
        Commands::Info { profile } => commands::info(&ctx, &profile),
        Commands::List { device } => commands::list(&ctx, &settings, &device),
        Commands::Assign { device, profile } => {
            commands::assign(&ctx, &mut settings, &device, &profile)
        }
        Commands::Unassign { device } => commands::unassign(&mut settings, &device),
        Commands::Setup { device, profile } => {
            commands::setup(&ctx, &mut settings, &device, profile.as_deref())
        }
        Commands::Dump {
            kind,
            device,
            output,
        } => {
            let out = commands::dump(&ctx, &settings, &device, kind)?;
            match output {
                Some(path) => {
                    let bytes = match out {
                        Output::Text(text) => text.into_bytes(),
                        Output::Bytes(bytes) => bytes,
                    };
                    std::fs::write(&path, bytes)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    Ok(Output::Text(String::new()))
                }
                None => Ok(out),
            }
        }
        Commands::FixId { profile } => commands::fix_id(&ctx, &profile),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = match run(cli) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("oxicc: {err:#}");
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout().lock();
    let written = match output {
        Output::Text(text) => stdout.write_all(text.as_bytes()),
        Output::Bytes(bytes) => stdout.write_all(&bytes),
    };
    if let Err(err) = written.and_then(|()| stdout.flush()) {
        eprintln!("oxicc: {err}");
        std::process::exit(1);
    }
}
