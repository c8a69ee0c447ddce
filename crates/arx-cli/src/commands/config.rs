//! Config command: inspect the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use arx_config::{Config, ShowFormat, loader};

use crate::theme::Theme;

/// Print the resolved configuration with source annotations.
pub(crate) fn show(explicit: Option<&Path>, format: &str) -> Result<()> {
    let format = match format {
        "toml" => ShowFormat::Toml,
        "json" => ShowFormat::Json,
        other => bail!("unknown format '{other}', expected toml or json"),
    };
    let resolved = Config::load(explicit)?;
    let rendered = resolved
        .show(format)
        .map_err(|_| anyhow::anyhow!("failed to render configuration"))?;
    print!("{rendered}");
    Ok(())
}

/// Load and validate, reporting the first problem.
pub(crate) fn validate(explicit: Option<&Path>) -> Result<()> {
    match Config::load(explicit) {
        Ok(resolved) => {
            println!("{}", Theme::success("Configuration is valid."));
            for path in &resolved.loaded_files {
                println!("{}", Theme::kv("Loaded", path));
            }
            Ok(())
        },
        Err(e) => {
            println!("{}", Theme::error(&e.to_string()));
            Err(e.into())
        },
    }
}

/// List the files that are searched, marking the ones that exist.
pub(crate) fn paths(explicit: Option<&Path>) -> Result<()> {
    let home: PathBuf = match std::env::var_os(arx_config::env::ARX_HOME_VAR) {
        Some(dir) => dir.into(),
        None => loader::default_arx_home()?,
    };

    println!("{}", Theme::header("Configuration files (lowest to highest precedence)"));
    println!("{}", Theme::kv("defaults", "<embedded>"));
    print_path("user", &home.join("config.toml"));
    if let Some(path) = explicit {
        print_path("--config", path);
    }
    println!();
    println!(
        "{}",
        Theme::dimmed("ARX_* environment variables fill fields no file sets.")
    );
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() { "found" } else { "missing" };
    println!(
        "{}  {}",
        Theme::kv(label, &path.display().to_string()),
        Theme::dimmed(state)
    );
}
