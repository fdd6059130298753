//! Command-line arguments for the sandbox

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gizmo_sandbox")]
#[command(about = "Drive the transform gizmos through a scripted editing session", long_about = None)]
pub struct Args {
    /// Colored console output with thread ids and targets
    #[arg(short, long)]
    pub verbose: bool,

    /// Load gizmo settings from a RON file
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}
