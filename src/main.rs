use clap::Parser;
use log::{error, info, warn};

use name_reconcile::cli::Cli;
use name_reconcile::logging::init_logging;
use name_reconcile::orchestrator::{self, RunOutcome};
use name_reconcile::util::envfile::{load_dotenv_if_present, write_env_template};

fn main() {
    if let Err(e) = load_dotenv_if_present() {
        eprintln!("Warning: could not load .env: {}", e);
    }
    init_logging();

    let cli = Cli::parse();
    if let Some(path) = &cli.write_env_template {
        match write_env_template(path) {
            Ok(()) => {
                info!("Wrote env template to {}", path);
                return;
            }
            Err(e) => {
                error!("Failed to write env template {}: {:#}", path, e);
                std::process::exit(1);
            }
        }
    }

    let cfg = match cli.to_app_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };
    info!(
        "Reconciling {} text file(s) against {} reference file(s); marker {:?}, unmatched {}",
        cfg.input.text_files.len(),
        cfg.input.reference_files.len(),
        cfg.matching.marker,
        cfg.matching.unmatched_policy
    );

    match orchestrator::run(&cfg) {
        Ok(report) => {
            if let RunOutcome::Waiting {
                missing_text,
                missing_reference,
            } = report.output.outcome
            {
                if missing_text {
                    warn!("No names could be extracted; provide at least one usable text file");
                }
                if missing_reference {
                    warn!("No reference table could be loaded; provide at least one usable HTML file");
                }
            }
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
