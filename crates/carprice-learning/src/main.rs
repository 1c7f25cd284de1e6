//! CLI entry point for training and querying the price model.

use anyhow::{Context, Result, anyhow};
use carprice_learning::{
    DEFAULT_ARTIFACT_PATH, PriceInput, Predictor, ProgressUpdate, TrainedPipeline, Trainer,
    TrainingConfig, TrainingResult,
};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Used-vehicle price prediction",
    long_about = "Train a price model from a listings CSV and query it.\n\n\
                  EXAMPLES:\n  \
                  # Train with defaults (data/vehicles.csv)\n  \
                  carprice train\n\n  \
                  # Train from a config file and print the JSON result\n  \
                  carprice train --config training.json --json\n\n  \
                  # Estimate a price\n  \
                  carprice predict --model saved_pipeline/price_prediction_pipeline.json \\\n    \
                  --odometer 100000 --condition good --fuel gas --vehicle-age 10"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train the pipeline and write the artifact
    Train(TrainArgs),
    /// Predict one price from raw values
    Predict(PredictArgs),
    /// Show what a saved artifact expects and how it scored
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON training configuration; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listings CSV, overrides the config file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Artifact path, overrides the config file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the training result as JSON instead of a summary
    ///
    /// Disables progress output so stdout only holds the JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Saved pipeline artifact
    #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
    model: PathBuf,

    #[arg(long)]
    odometer: Option<f64>,

    #[arg(long)]
    condition: Option<String>,

    #[arg(long)]
    fuel: Option<String>,

    #[arg(long)]
    transmission: Option<String>,

    #[arg(long)]
    drive: Option<String>,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    vehicle_age: Option<f64>,

    /// Raw values as a JSON object; flags given alongside take precedence
    ///
    /// Keys the artifact does not expect are ignored with a warning.
    #[arg(long)]
    input: Option<String>,
}

impl PredictArgs {
    fn price_input(&self) -> PriceInput {
        PriceInput {
            odometer: self.odometer,
            condition: self.condition.clone(),
            fuel: self.fuel.clone(),
            transmission: self.transmission.clone(),
            drive: self.drive.clone(),
            state: self.state.clone(),
            vehicle_age: self.vehicle_age,
        }
    }
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Saved pipeline artifact
    #[arg(short, long, default_value = DEFAULT_ARTIFACT_PATH)]
    model: PathBuf,

    /// Print the artifact metadata as JSON
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Logging is disabled entirely for JSON output so stdout stays parseable.
fn init_logging(level: &str, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = match &cli.command {
        Command::Train(args) => args.json,
        Command::Inspect(args) => args.json,
        Command::Predict(_) => false,
    };
    init_logging(&cli.log_level, json_output);

    dotenv().ok();

    match cli.command {
        Command::Train(args) => run_train(args),
        Command::Predict(args) => run_predict(args),
        Command::Inspect(args) => run_inspect(args),
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    if let Some(data) = args.data {
        config.data_path = data;
    }
    if let Some(output) = args.output {
        config.artifact_path = output;
    }

    let mut builder = Trainer::builder().config(config);
    if !args.json {
        builder = builder.on_progress(|u: ProgressUpdate| {
            info!(
                "[{:>3.0}%] {}: {}",
                u.progress * 100.0,
                u.stage.display_name(),
                u.message
            );
        });
    }
    let trainer = builder.build()?;

    let result = trainer.run()?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

/// User-facing summary; printed regardless of log level.
fn print_summary(result: &TrainingResult) {
    println!("\n{}", "=".repeat(60));
    println!("TRAINING COMPLETE");
    println!("{}", "=".repeat(60));
    println!(
        "  Rows:        {} train / {} test ({} loaded)",
        result.train_rows, result.test_rows, result.preparation.rows_before
    );
    println!("  Inputs:      {}", result.feature_names_in.join(", "));
    println!("  Test R²:     {:.4}", result.metrics.r2);
    println!("  Test RMSE:   {:.2}", result.metrics.rmse);
    println!("  Test MAE:    {:.2}", result.metrics.mae);
    println!("  Train R²:    {:.4}", result.metrics.train_r2);
    println!("  Time:        {:.1}s", result.training_time_seconds);
    if let Some(path) = &result.artifact_path {
        println!("  Artifact:    {}", path);
    }

    if !result.feature_importance.is_empty() {
        println!("\nTOP FEATURES");
        println!("{}", "-".repeat(40));
        for (name, importance) in result.feature_importance.iter().take(10) {
            println!("  {:<30} {:.4}", name, importance);
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWARNINGS");
        println!("{}", "-".repeat(40));
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }
}

fn run_predict(args: PredictArgs) -> Result<()> {
    let predictor = Predictor::from_path(&args.model);

    let price = match &args.input {
        Some(raw) => {
            let pipeline = predictor.pipeline().ok_or_else(|| {
                anyhow!(
                    "Prediction model is unavailable: {}",
                    predictor.unavailable_reason().unwrap_or("unknown error")
                )
            })?;
            let mut instance: serde_json::Value =
                serde_json::from_str(raw).context("--input is not valid JSON")?;
            let object = instance
                .as_object_mut()
                .ok_or_else(|| anyhow!("--input must be a JSON object"))?;
            let overrides = serde_json::to_value(args.price_input())?;
            if let Some(fields) = overrides.as_object() {
                for (key, value) in fields {
                    if !value.is_null() {
                        object.insert(key.clone(), value.clone());
                    }
                }
            }
            pipeline.predict_json(&instance)?
        }
        None => predictor.predict(&args.price_input())?,
    };

    println!("{:.2}", price);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let pipeline = TrainedPipeline::load(&args.model)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(pipeline.metadata())?);
        return Ok(());
    }

    let info = pipeline.info();
    println!("\n{}", "=".repeat(60));
    println!("PRICE PIPELINE: {}", args.model.display());
    println!("{}", "=".repeat(60));
    println!("  Model:           {} ({} trees)", info.model_name, info.n_trees);
    println!("  Trained at:      {}", info.trained_at);
    println!("  Target:          {}", info.target_column);
    println!("  Reference year:  {}", info.reference_year);
    println!("  Encoded width:   {}", info.n_features_out);
    println!("  Test R²:         {:.4}", info.metrics.r2);
    println!("  Test RMSE:       {:.2}", info.metrics.rmse);

    println!("\nEXPECTED INPUT COLUMNS");
    println!("{}", "-".repeat(40));
    for name in &info.feature_names_in {
        let role = if info.numeric_columns.contains(name) {
            "numeric"
        } else {
            "categorical"
        };
        println!("  {:<20} {}", name, role);
    }
    Ok(())
}
