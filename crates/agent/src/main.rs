// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bytehotd — thin binary wrapper around `bh_agent::attach`.
//!
//! Sets up `tracing`, loads `bytehot.toml`, builds the host capabilities, and
//! runs until SIGINT/SIGTERM. All real behavior lives in the library crates;
//! this binary is plumbing (§2.1: "analogue of the teacher's `oj-daemon`,
//! minus the Unix-socket RPC protocol").

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::path::PathBuf;

use bh_agent::{Capabilities, RunningEngine};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("bytehotd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" => {}
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: bytehotd [--config <path>]");
                std::process::exit(1);
            }
        }
    }

    setup_logging();

    let config_path = config_path_from_args();
    let config = bh_agent::config::Config::load(&config_path)?;
    info!(path = %config_path.display(), "loaded configuration");

    let capabilities = build_capabilities()?;

    let RunningEngine { engine: _engine, .. } = bh_agent::attach(&config, capabilities)?;
    info!(root = %config.watch.root.display(), "attached, watching for class changes");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    Ok(())
}

fn config_path_from_args() -> PathBuf {
    let args: Vec<String> = std::env::args().collect();
    parse_config_path(&args)
}

fn parse_config_path(args: &[String]) -> PathBuf {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--config" {
            if let Some(path) = rest.next() {
                return PathBuf::from(path);
            }
        }
    }
    PathBuf::from("bytehot.toml")
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn print_help() {
    println!("bytehotd {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Runtime class-redefinition agent.");
    println!();
    println!("USAGE:");
    println!("    bytehotd [--config <path>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <path>  Path to bytehot.toml (default: ./bytehot.toml)");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

#[cfg(feature = "demo")]
fn build_capabilities() -> Result<Capabilities, Box<dyn std::error::Error>> {
    use bh_adapters::test_support::{FakeInstanceRegistry, FakeVm};
    use bh_adapters::NoOpFrameworkAdapter;
    use std::sync::Arc;

    tracing::warn!(
        "running with the in-process fake VM instrumentation (demo feature); \
         no real class redefinitions will occur"
    );

    Ok(Capabilities {
        vm: Arc::new(FakeVm::new()),
        registry: Arc::new(FakeInstanceRegistry::new()),
        adapters: vec![Box::new(NoOpFrameworkAdapter)],
    })
}

/// Production builds have no bundled VM instrumentation: JVMTI-style
/// redefinition and instance enumeration are host-specific and, per spec
/// §1, out of scope as external collaborators. Embed `bh-agent` as a library
/// and supply real `VmInstrumentation`/`InstanceRegistry` impls instead of
/// running this binary directly, or rebuild with `--features demo`.
#[cfg(not(feature = "demo"))]
fn build_capabilities() -> Result<Capabilities, Box<dyn std::error::Error>> {
    Err("no VM instrumentation capability configured; bytehotd needs to be \
         linked against a host-specific VmInstrumentation/InstanceRegistry, \
         or rebuilt with `--features demo` for local experimentation"
        .into())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
