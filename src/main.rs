//! heart-predict entry point

use clap::Parser;
use heart_predict::cli::{cmd_predict, cmd_serve, cmd_train, train_config, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heart_predict=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            target,
            test_size,
            split_seed,
            model_seed,
            artifacts,
            tracking,
            experiment,
            full_dataset_imputation,
        } => {
            let config = train_config(
                data,
                target,
                test_size,
                split_seed,
                model_seed,
                artifacts,
                tracking,
                experiment,
                full_dataset_imputation,
            );
            // Training is CPU bound and uses rayon; keep it off the async workers
            tokio::task::spawn_blocking(move || cmd_train(config)).await??;
        }
        Commands::Predict { input, artifacts } => {
            cmd_predict(&input, &artifacts)?;
        }
        Commands::Serve { port, host, artifacts } => {
            cmd_serve(&host, port, artifacts).await?;
        }
    }

    Ok(())
}
