// FICHIER : src-engine/src/utils/mod.rs

// =========================================================================
//  GREENWAVE UTILS - Foundation Layer
// =========================================================================

// --- 1. MODULES INTERNES ---
pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod logger;
pub mod macros;
pub mod os;

// --- 2. FAÇADES SÉMANTIQUES ---

/// **Core Foundation** : Types de base et Erreurs.
pub mod core {
    pub use super::error::{AppError, Result};
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}

/// **System Operations**
pub mod sys {
    pub use super::os::{exec_command, CommandOutput};
}

/// **Physical Layer (I/O)** : Accès disque atomique.
pub mod io {
    pub use super::fs::{
        ensure_dir, read_document, read_json, write_atomic, write_json_atomic, Path, PathBuf,
    };
}

/// **Application Context** : Accès global Config/Log/Env.
pub mod context {
    pub use super::config::{OptimizerConfig, ScenarioConfig};
    pub use super::env::{get, get_or, is_enabled};
    pub use super::logger::init_logging;
}

/// **Le Prélude** : À utiliser via `use crate::utils::prelude::*;`
pub mod prelude {
    pub use super::core::{AppError, Result, Utc, Uuid};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{json, Value};
    pub use tracing::{debug, error, info, instrument, warn};
}

// --- 3. EXPORTS DIRECTS ---
pub use config::OptimizerConfig;
pub use error::{AppError, Result};
pub use logger::init_logging;
