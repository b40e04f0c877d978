//! `contract-binding-codegen`: render typed bindings from contract artifacts.
//!
//! ```text
//! contract-binding-codegen --config codegen.toml
//! contract-binding-codegen artifacts/Test.json artifacts/Yo.json --out-dir src/bindings
//! contract-binding-codegen artifacts/Yo.json --stdout
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use contract_binding_codegen::{generate, render_all, CodegenConfig, ContractEntry};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "contract-binding-codegen", version, about = "Generate typed Rust bindings from contract artifacts")]
struct Cli {
    /// Artifact JSON files. When empty, contracts come from the config file.
    artifacts: Vec<PathBuf>,

    /// Config file (TOML). Defaults to ./codegen.toml when no artifacts are given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides the config file).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Directory `include_str!` paths are relative to (the generated crate's root).
    #[arg(long)]
    manifest_dir: Option<PathBuf>,

    /// Crate path the generated code imports.
    #[arg(long)]
    binding_crate: Option<String>,

    /// Network whose ABI to read.
    #[arg(long)]
    network: Option<String>,

    /// Custom Handlebars template for contract modules.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Print the rendered modules instead of writing files.
    #[arg(long)]
    stdout: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn resolve_config(cli: Cli) -> Result<(CodegenConfig, bool)> {
    let mut cfg = if cli.artifacts.is_empty() {
        let path = cli.config.clone().unwrap_or_else(|| PathBuf::from("codegen.toml"));
        if !path.exists() {
            bail!("no artifacts given and {} not found", path.display());
        }
        CodegenConfig::load(&path)?
    } else {
        let cwd = std::env::current_dir().context("current directory")?;
        let mut cfg = CodegenConfig::new(cwd.join("bindings"));
        cfg.manifest_dir = Some(cwd.clone());
        cfg.contracts = cli
            .artifacts
            .iter()
            .map(|a| ContractEntry { artifact: cwd.join(a), module: None })
            .collect();
        cfg
    };

    if let Some(out) = cli.out_dir {
        cfg.out_dir = out;
    }
    if let Some(dir) = cli.manifest_dir {
        cfg.manifest_dir = Some(std::fs::canonicalize(&dir).unwrap_or(dir));
    }
    if let Some(name) = cli.binding_crate {
        cfg.binding_crate = name;
    }
    if cli.network.is_some() {
        cfg.network = cli.network;
    }
    if cli.template.is_some() {
        cfg.template = cli.template;
    }
    Ok((cfg, cli.stdout))
}

fn main() -> Result<()> {
    init_tracing();
    let (cfg, to_stdout) = resolve_config(Cli::parse())?;

    if to_stdout {
        for (name, src) in render_all(&cfg)? {
            if name == "mod.rs" {
                continue;
            }
            println!("// ---- {name} ----");
            print!("{src}");
        }
        return Ok(());
    }

    let written = generate(&cfg)?;
    eprintln!("wrote {} file(s) to {}", written.len(), cfg.out_dir.display());
    Ok(())
}
