use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
    });
}

/// Prepare a fresh data-file slot: create the parent directory if missing and
/// remove any previous file of the same name. Each mining run rewrites the
/// table from scratch.
pub fn recreate_data_file(dir: &Path, file_name: &str) -> Result<PathBuf> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("create data dir {}", dir.display()))?;
        tracing::info!("Data folder created at {}", dir.display());
    }
    let path = dir.join(file_name);
    if path.exists() {
        tracing::info!("Removing already existing {} file", file_name);
        fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
    } else {
        tracing::info!("{} does not exist yet, it will be downloaded", file_name);
    }
    Ok(path)
}

/// Create an output directory (idempotent), returning its path.
pub fn ensure_output_dir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("create output dir {}", dir.display()))?;
    Ok(dir)
}
