// FICHIER : src-engine/src/utils/fs.rs

use crate::utils::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use tracing::instrument;

// --- RE-EXPORTS (Isolation de la couche OS) ---
pub use std::path::{Path, PathBuf};

/// Crée le dossier (et ses parents) s'il n'existe pas.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lit un fichier JSON et le désérialise.
#[instrument(skip(path), fields(path = ?path))]
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_existing(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Lit un document de configuration : YAML (`.yaml`/`.yml`) ou JSON (tout le reste).
#[instrument(skip(path), fields(path = ?path))]
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = read_existing(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    if is_yaml {
        Ok(serde_yaml::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(&content)?)
    }
}

fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(AppError::Config(format!("Fichier introuvable : {:?}", path)));
    }
    Ok(fs::read_to_string(path)?)
}

// --- ÉCRITURE ATOMIQUE ---

/// Écrit via un fichier temporaire puis renomme, pour ne jamais laisser de fichier tronqué.
#[instrument(skip(content, path), fields(path = ?path))]
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &content)
}
