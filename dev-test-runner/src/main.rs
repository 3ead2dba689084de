//! Decode every Swagger declaration under a fixture directory, re-encode it,
//! decode it again and check both passes agree.
//!
//! usage: dev-test-runner [FIXTURE_DIR]   (default: fixtures)
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::Value;
use swagger_gen::swagger;

fn check_file(path: &Path) -> Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw = serde_json::from_str::<Value>(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let first = swagger::decode_definition(&raw).context("first decode")?;
    let second = swagger::decode_definition(&first.to_json()).context("second decode")?;
    anyhow::ensure!(first == second, "decode is not idempotent");
    Ok(())
}

fn main() -> Result<()> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| "fixtures".to_string());
    let pattern = format!("{dir}/**/*.json");

    let mut passed = 0usize;
    let mut failed = 0usize;
    for entry in glob::glob(&pattern)? {
        let path = entry?;
        match check_file(&path) {
            Ok(()) => {
                passed += 1;
                eprintln!("{} {}", "✅".green(), path.display());
            }
            Err(error) => {
                failed += 1;
                eprintln!("{} {}: {error:#}", "❌".red(), path.display());
            }
        }
    }

    eprintln!("{passed} passed, {failed} failed");
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
