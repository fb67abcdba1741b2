//! Streamboard - Streaming Dashboard Renderer
//!
//! Command line front end: lists tabs, renders a tab to chart JSON, or checks
//! that every configured dataset loads.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Command};
use streamboard::config::DashboardConfig;
use streamboard::data::DataLoader;
use streamboard::tabs::{Selection, TabRenderer};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = DashboardConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    match args.command {
        Command::Tabs => {
            for title in config.tab_titles() {
                println!("{title}");
            }
        }
        Command::Render {
            tab,
            select,
            only,
            pretty,
            output,
        } => {
            let loader = DataLoader::new()?;
            let selection = Selection::from_args(select, only);
            let view = TabRenderer::new(&config, &loader).render(&tab, &selection)?;
            let json = if pretty {
                serde_json::to_string_pretty(&view)?
            } else {
                serde_json::to_string(&view)?
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    info!(path = %path.display(), "wrote tab");
                }
                None => println!("{json}"),
            }
        }
        Command::Check => {
            let loader = DataLoader::new()?;
            let mut failures = 0;
            for ds in &config.datasets {
                match loader.load(&ds.id, &config.source_of(ds), &ds.contract()) {
                    Ok(loaded) => info!(dataset = %ds.id, rows = loaded.row_count(), "ok"),
                    Err(err) => {
                        error!(dataset = %ds.id, error = %err, "failed");
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} of {} datasets failed to load", config.datasets.len());
            }
        }
    }

    Ok(())
}
