use clap::{Parser, Subcommand};

mod commands;

use greenwave::{user_error, utils::prelude::*};

#[derive(Parser)]
#[command(name = "greenwave-cli")]
#[command(about = "Optimisation génétique des plans de feux", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Lance l'algorithme génétique sur un scénario
    Optimize(commands::optimize::OptimizeArgs),

    /// Valide un plan sans le réparer (code de sortie non nul à la première violation)
    Check(commands::plan::CheckArgs),

    /// Répare un plan et affiche le nombre de violations corrigées
    Repair(commands::plan::RepairArgs),

    /// Déroule le programme d'états d'un carrefour
    Expand(commands::plan::ExpandArgs),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = execute_command(cli.command) {
        user_error!("CMD_FAIL", "{}", e);
        std::process::exit(1);
    }

    tracing::debug!("Fin de l'exécution du CLI");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Optimize(args) => commands::optimize::handle(args),
        Commands::Check(args) => commands::plan::handle_check(args),
        Commands::Repair(args) => commands::plan::handle_repair(args),
        Commands::Expand(args) => commands::plan::handle_expand(args),
    }
}
