// FICHIER : src-engine/src/utils/logger.rs

use crate::utils::config::LoggingConfig;
use std::sync::Once;
use tracing_appender::rolling;
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

// Sécurité pour éviter la double initialisation (crash fréquent en tests)
static INIT: Once = Once::new();

pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        // =========================================================================
        // LAYER 1 : CONSOLE (Pour l'Humain)
        // =========================================================================
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

        // Les macros user_* affichent déjà leur message sur le terminal
        let anti_double_filter =
            filter_fn(|metadata| !metadata.fields().iter().any(|f| f.name() == "event"));

        let console_layer = fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .with_filter(anti_double_filter);

        // =========================================================================
        // LAYER 2 : FICHIER JSON (Optionnel, pour rejouer un run)
        // =========================================================================
        let file_layer = config.log_dir.as_ref().and_then(|log_dir| {
            if let Err(e) = std::fs::create_dir_all(log_dir) {
                eprintln!("⚠️ [Logger] Dossier de logs inutilisable {:?} : {}", log_dir, e);
                return None;
            }
            let file_appender = rolling::daily(log_dir, "greenwave.log");
            Some(
                fmt::layer()
                    .json()
                    .with_writer(file_appender)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
        });

        let registry = tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer);

        if registry.try_init().is_err() {
            tracing::warn!(
                "⚠️ [Logger] Tentative de ré-initialisation ignorée (Global subscriber déjà actif)."
            );
            return;
        }

        tracing::info!(log_dir = ?config.log_dir, "🚀 Logger initialisé.");
    });
}
