//! Prints the inputs and outputs of the configured ONNX models so a wrong
//! mesh export (468 points, no iris) is caught before a session starts.

use anyhow::Result;
use colored::*;
use ort::session::Session;
use std::env;
use std::path::{Path, PathBuf};

use eye_mouse::config::{AppConfig, DEFAULT_PATH};
use eye_mouse::types::landmark;

fn inspect(label: &str, path: &Path) -> Result<()> {
    println!("\n--- {} ({}) ---", label, path.display());
    if !path.exists() {
        println!("{}", "missing".red());
        return Ok(());
    }

    let session = Session::builder()?.commit_from_file(path)?;
    for (i, input) in session.inputs.iter().enumerate() {
        println!("in  #{}: {} {:?}", i, input.name, input.input_type);
    }
    for (i, output) in session.outputs.iter().enumerate() {
        println!("out #{}: {} {:?}", i, output.name, output.output_type);
    }
    Ok(())
}

fn main() -> Result<()> {
    let config_path = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));
    let config = AppConfig::load(&config_path)?;

    inspect("face detection", &config.models.face_detection)?;
    inspect("face mesh", &config.models.face_mesh)?;

    println!(
        "\nThe mesh output must hold at least {} floats ({} points x 3) at input {}x{}.",
        landmark::MESH_POINTS * 3,
        landmark::MESH_POINTS,
        config.models.mesh_input_size,
        config.models.mesh_input_size
    );
    Ok(())
}
