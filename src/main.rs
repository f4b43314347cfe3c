use anyhow::Context;
use clap::Parser;
use sbc_solver::cli::{self, Cli, Commands, OutputMode};
use sbc_solver::domain::Formation;
use sbc_solver::error::{Result, SolverError};
use sbc_solver::services::{SolveRequest, SolverService};
use tracing::{error, info};

mod main_runtime;

use main_runtime::{build_cache, init_logging, init_logging_simple, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Solve {
            request,
            seed,
            max_attempts,
            json,
        } => {
            let mut config = load_config(&cli.config)?;
            init_logging(&config.logging);
            if seed.is_some() {
                config.solver.seed = *seed;
            }
            if let Some(n) = max_attempts {
                config.solver.max_attempts = (*n).max(1);
            }

            let raw = tokio::fs::read_to_string(request)
                .await
                .with_context(|| format!("reading request file {}", request.display()))?;
            let request: SolveRequest = serde_json::from_str(&raw)
                .with_context(|| format!("parsing request file {}", request.display()))?;
            let cache = build_cache(&config)?;
            let service = SolverService::new(config, cache);

            info!("Solving {} segments", request.segments.len());
            let response = service.solve(request).await?;
            cli::print_solve_response(&response, OutputMode::from_json_flag(*json))
        }
        Commands::Prices {
            ids,
            concurrency,
            json,
        } => {
            let config = load_config(&cli.config)?;
            init_logging_simple();
            let cache = build_cache(&config)?;
            let concurrency = concurrency.unwrap_or(config.cache.refresh_concurrency);
            let deadline = match config.cache.refresh_timeout_ms {
                0 => None,
                ms => Some(std::time::Duration::from_millis(ms)),
            };

            let report = cache.refresh_batch_until(ids, concurrency, deadline).await;
            cli::print_prices(ids, &report, OutputMode::from_json_flag(*json))
        }
        Commands::Formation { name } => {
            init_logging_simple();
            let formation: Formation = name.parse().map_err(SolverError::InputValidation)?;
            cli::print_formation(formation);
            Ok(())
        }
    };

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
    }
    result
}
