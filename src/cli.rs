use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lay out clustered graphs with a cluster-separation force.
#[derive(Parser, Debug)]
#[command(name = "clusterforce")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Layout config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Viewport width the layout is centered in
    #[arg(long, global = true, default_value_t = 960.0)]
    pub width: f64,

    /// Viewport height the layout is centered in
    #[arg(long, global = true, default_value_t = 600.0)]
    pub height: f64,

    /// Stop after this many ticks even if the layout has not converged
    #[arg(long, global = true)]
    pub max_ticks: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the layout to convergence and write the final positions
    Layout {
        /// Input dataset (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output layout file (.json, .yaml or .yml)
        #[arg(short, long, default_value = "layout.json")]
        output: PathBuf,
    },
    /// Stream one JSON line per tick
    Frames {
        /// Input dataset (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; frames go to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a dataset and config without running the layout
    Check {
        /// Input dataset (.json, .yaml or .yml)
        #[arg(short, long)]
        input: PathBuf,
    },
}
