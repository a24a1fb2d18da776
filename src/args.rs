use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Control the mouse pointer with your eyes", long_about = None)]
pub struct Args {
    /// Camera index, overrides the config file
    #[arg(short, long)]
    pub cam_index: Option<u32>,

    /// Path to the JSON configuration file
    #[arg(long, default_value = crate::config::DEFAULT_PATH)]
    pub config: PathBuf,

    /// List available cameras and exit
    #[arg(long)]
    pub list: bool,

    /// Use a simulated face instead of the ONNX models
    #[arg(long)]
    pub simulate: bool,

    /// Log pointer actions instead of performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Session time limit in seconds, overrides the config file
    #[arg(long)]
    pub time_limit: Option<u64>,
}
