// FICHIER : src-engine/src/utils/error.rs

use serde::Serialize;
use std::io;

// --- RE-EXPORTS ANYHOW (Pour la flexibilité du CLI) ---
pub use anyhow::{anyhow, Context};
// On renomme le Result de anyhow pour ne pas qu'il écrase le nôtre
pub use anyhow::Result as AnyResult;

/// Type de résultat standard du moteur.
pub type Result<T> = std::result::Result<T, AppError>;

/// Enumération centrale des erreurs.
///
/// Les quatre premières variantes forment la taxonomie métier :
/// - `OutOfRange` et `IncompatibleMovement` sont absorbées par la réparation pendant un run,
///   mais restent fatales lorsqu'elles sortent d'une validation directe.
/// - `Evaluation` n'interrompt jamais une génération (fitness sentinelle).
/// - `Config` est fatale au démarrage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Durée hors bornes [{tls_id}] : {field} = {value} (attendu {min}..={max})")]
    OutOfRange {
        tls_id: String,
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Mouvements incompatibles [{tls_id}] : {approaches:?} actifs simultanément")]
    IncompatibleMovement {
        tls_id: String,
        approaches: Vec<String>,
    },

    #[error("Échec d'évaluation : {0}")]
    Evaluation(String),

    #[error("Erreur de configuration : {0}")]
    Config(String),

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] io::Error),

    #[error("Erreur de sérialisation : {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Erreur YAML : {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Erreur Système : {0}")]
    System(#[from] anyhow::Error),
}

impl AppError {
    /// Vrai pour les erreurs que la réparation sait absorber.
    pub fn is_repairable(&self) -> bool {
        matches!(
            self,
            AppError::OutOfRange { .. } | AppError::IncompatibleMovement { .. }
        )
    }
}

// Les rapports de run embarquent les erreurs sous forme de chaîne simple.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

// Permet de faire : return Err("Mon erreur".into());
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::System(anyhow::anyhow!(s))
    }
}

impl From<&str> for AppError {
    fn from(s: &str) -> Self {
        AppError::System(anyhow::anyhow!(s.to_string()))
    }
}
