// FICHIER : src-engine/src/utils/os.rs

use crate::utils::error::{AppError, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

/// Intervalle de scrutation du processus enfant.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Sortie capturée d'une commande terminée avec succès.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Exécute une commande système avec un délai maximal et capture sa sortie.
///
/// Code de sortie non nul, binaire introuvable ou délai dépassé deviennent tous
/// une `AppError::Evaluation` : pour l'optimiseur, ce sont des échecs de simulation.
///
/// # Arguments
/// * `cmd` - Le binaire à lancer
/// * `args` - Liste des arguments
/// * `cwd` - Dossier d'exécution optionnel
/// * `timeout` - Délai maximal, `None` pour attendre indéfiniment
#[instrument(skip(args), fields(cmd = cmd, cwd = ?cwd))]
pub fn exec_command(
    cmd: &str,
    args: &[String],
    cwd: Option<&Path>,
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    debug!("🚀 Exécution commande système : {} {:?}", cmd, args);

    let mut command = Command::new(cmd);
    command.args(args);

    if let Some(dir) = cwd {
        if !dir.exists() {
            return Err(AppError::Evaluation(format!(
                "Dossier d'exécution introuvable: {:?}",
                dir
            )));
        }
        command.current_dir(dir);
    }

    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let start = Instant::now();
    let mut child = command.spawn().map_err(|e| {
        error!("❌ Impossible de lancer la commande '{}': {}", cmd, e);
        AppError::Evaluation(format!("Impossible de lancer '{}': {}", cmd, e))
    })?;

    // Les flux sont vidés dans des threads dédiés : un enfant bavard ne doit pas
    // bloquer sur un pipe plein pendant qu'on attend sa fin.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if let Some(limit) = timeout {
            if start.elapsed() >= limit {
                warn!("⏱️ Délai dépassé pour '{}' ({:?}), arrêt du processus", cmd, limit);
                let _ = child.kill();
                let _ = child.wait();
                return Err(AppError::Evaluation(format!(
                    "Délai dépassé pour '{}' après {:?}",
                    cmd, limit
                )));
            }
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);

    if status.success() {
        debug!("✅ Commande réussie en {:?}", start.elapsed());
        Ok(CommandOutput {
            stdout,
            stderr,
            elapsed: start.elapsed(),
        })
    } else {
        warn!("⚠️ Commande échouée (code {:?})", status.code());
        debug!("Stderr: {}", stderr);
        Err(AppError::Evaluation(format!(
            "Echec commande '{}' (code {:?}): {}",
            cmd,
            status.code(),
            stderr.trim()
        )))
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = source.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
