use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "streamboard")]
pub struct Args {
    /// Dashboard config file
    #[arg(long = "config", short = 'c', default_value = "dashboard.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tab titles in sidebar order
    Tabs,
    /// Render one tab to JSON chart specs
    Render {
        /// Tab title
        tab: String,

        /// Series to show in picker charts: `col` for every picker, `chart=col` for one (repeatable)
        #[arg(long = "select", short = 's')]
        select: Vec<String>,

        /// Build only the charts with these titles (repeatable)
        #[arg(long = "only")]
        only: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long = "pretty", action)]
        pretty: bool,

        /// Write to a file instead of stdout
        #[arg(long = "output", short = 'o')]
        output: Option<PathBuf>,
    },
    /// Load every dataset once and report failures
    Check,
}
