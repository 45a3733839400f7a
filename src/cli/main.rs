use anyhow::Context;
use clap::{Parser, Subcommand};
use salary_predictor::{
    config::Config,
    ml::{validate, DatasetSource, ModelRegistry, RawRecord, TrainingService},
    state::create_artifact_store,
};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "salary-cli")]
#[command(about = "Salary predictor operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrain the model and print evaluation metrics
    Train {
        /// Labeled CSV, defaults to training.dataset_path
        #[arg(short, long)]
        dataset: Option<PathBuf>,
    },

    /// Predict the salary of one record
    Predict {
        /// Record as a JSON object
        #[arg(short, long)]
        json: String,
    },

    /// Print the metrics of the last retrain
    Metrics,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "salary_predictor=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = create_artifact_store(&config.model);

    match cli.command {
        Commands::Train { dataset } => {
            let trainer = TrainingService::new(store, config.training.clone());
            let source = DatasetSource::CsvFile(
                dataset.unwrap_or_else(|| config.training.dataset_path.clone()),
            );

            let metrics = trainer.retrain(&source).context("Retrain failed")?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }

        Commands::Predict { json } => {
            let raw = RawRecord::from_json(&json).context("Record must be a JSON object")?;

            let clean = match validate(&raw) {
                Ok(clean) => clean,
                Err(errors) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "errors": errors.messages() }))?
                    );
                    std::process::exit(1);
                }
            };

            let registry = ModelRegistry::new(store);
            let model = registry.get();
            let estimate = model.predict_one(&clean);

            let response = json!({
                "predicted_salary_inr": estimate as i64,
                "currency": "INR",
                "model_version": config.model.version,
                "model_source": model.source(),
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }

        Commands::Metrics => match store.load_metrics()? {
            Some(metrics) => println!("{}", serde_json::to_string_pretty(&metrics)?),
            None => {
                eprintln!("No metrics recorded yet, run `salary-cli train` first");
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
