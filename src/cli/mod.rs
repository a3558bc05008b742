//! Command-line interface for training, serving, and one-off predictions.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::artifacts::ArtifactStore;
use crate::inference::PredictionService;
use crate::preprocessing::ImputationScope;
use crate::schema::PatientRecord;
use crate::training::{PipelineConfig, TrainingPipeline, TrainingReport};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "heart-predict")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heart disease classifier: training pipeline and prediction API")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train all candidate models and persist the best one
    Train {
        /// Heart disease CSV file
        #[arg(short, long)]
        data: PathBuf,

        /// Severity column, binarized into the label
        #[arg(short, long, default_value = "num")]
        target: String,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.3")]
        test_size: f64,

        /// Seed of the stratified split
        #[arg(long, default_value = "4")]
        split_seed: u64,

        /// Seed of the random forest
        #[arg(long, default_value = "42")]
        model_seed: u64,

        /// Directory receiving model.bin and scaler.bin
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,

        /// Experiment tracking directory
        #[arg(long, default_value = "mlruns")]
        tracking: PathBuf,

        /// Experiment name
        #[arg(long, default_value = "Heart Disease Prediction")]
        experiment: String,

        /// Compute imputation modes over the whole file instead of the training split
        #[arg(long)]
        full_dataset_imputation: bool,
    },

    /// Score one patient record stored as JSON
    Predict {
        /// JSON file holding a single patient record
        #[arg(short, long)]
        input: PathBuf,

        /// Directory holding model.bin and scaler.bin
        #[arg(short, long, default_value = "artifacts")]
        artifacts: PathBuf,
    },

    /// Start the prediction API
    Serve {
        /// Server port
        #[arg(short, long, env = "API_PORT", default_value = "8000")]
        port: u16,

        /// Server host
        #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Directory holding model.bin and scaler.bin
        #[arg(short, long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
        artifacts: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_train(config: PipelineConfig) -> anyhow::Result<TrainingReport> {
    section("Train");
    println!("  {:<16} {}", muted("Data"), config.data_path.display().to_string().white());
    println!("  {:<16} {}", muted("Experiment"), config.experiment_name.white());
    println!();

    step_run("Training candidates");
    let start = Instant::now();
    let report = TrainingPipeline::new(config).run()?;
    step_done(&format!(
        "{} train / {} test rows in {:?}",
        report.train_rows,
        report.test_rows,
        start.elapsed()
    ));

    println!();
    println!(
        "  {:<22} {:>9} {:>9} {:>9} {:>9} {:>9}",
        muted("Model"),
        muted("Accuracy"),
        muted("Precision"),
        muted("Recall"),
        muted("F1"),
        muted("ROC AUC"),
    );
    for candidate in &report.candidates {
        let m = &candidate.metrics;
        let name = if candidate.label == report.selected {
            candidate.label.as_str().white().bold()
        } else {
            candidate.label.as_str().white()
        };
        println!(
            "  {:<22} {:>9.4} {:>9.4} {:>9.4} {:>9.4} {:>9.4}",
            name, m.accuracy, m.precision, m.recall, m.f1_score, m.roc_auc
        );
    }

    println!();
    println!(
        "  {} {} {}",
        ok("✓"),
        report.selected.as_str().white().bold(),
        dim(&format!("selected (ROC AUC {:.4})", report.selected_auc))
    );
    println!("  {:<16} {}", muted("Model"), report.model_path.display().to_string().white());
    println!("  {:<16} {}", muted("Scaler"), report.scaler_path.display().to_string().white());
    println!();

    Ok(report)
}

/// Build the pipeline configuration from `train` arguments
#[allow(clippy::too_many_arguments)]
pub fn train_config(
    data: PathBuf,
    target: String,
    test_size: f64,
    split_seed: u64,
    model_seed: u64,
    artifacts: PathBuf,
    tracking: PathBuf,
    experiment: String,
    full_dataset_imputation: bool,
) -> PipelineConfig {
    let scope = if full_dataset_imputation {
        ImputationScope::FullDataset
    } else {
        ImputationScope::TrainingSplit
    };
    PipelineConfig::new(data)
        .with_target_column(target)
        .with_test_size(test_size)
        .with_split_seed(split_seed)
        .with_model_seed(model_seed)
        .with_artifact_dir(artifacts)
        .with_tracking_dir(tracking)
        .with_experiment_name(experiment)
        .with_imputation_scope(scope)
}

pub fn cmd_predict(input: &Path, artifacts: &Path) -> anyhow::Result<()> {
    section("Predict");

    let raw = std::fs::read_to_string(input)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let record = match PatientRecord::from_json(&value) {
        Ok(record) => record,
        Err(violations) => {
            for v in &violations {
                let field = v.field.as_deref().unwrap_or("body");
                println!("  {} {} {}", "✗".red(), field.white(), dim(&v.message));
            }
            anyhow::bail!("{} invalid field(s) in {}", violations.len(), input.display());
        }
    };

    let pair = ArtifactStore::new(artifacts).load()?;
    let service = PredictionService::from_artifacts(pair);
    let prediction = service.predict(&record)?;

    let verdict = if prediction.predicted_class == 1 {
        "heart disease".red().bold()
    } else {
        "no heart disease".green().bold()
    };
    println!("  {:<16} {}", muted("Model"), service.model_label().white());
    println!("  {:<16} {} {}", muted("Class"), prediction.predicted_class.to_string().white(), verdict);
    println!("  {:<16} {}", muted("Probability"), format!("{:.4}", prediction.probability).white());
    println!("  {:<16} {}", muted("Latency"), format!("{:.6}s", prediction.latency_seconds).white());
    println!();
    println!("{}", serde_json::to_string(&prediction)?);

    Ok(())
}

// ─── Serve ─────────────────────────────────────────────────────────────────────

pub async fn cmd_serve(host: &str, port: u16, artifacts: PathBuf) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Heart Disease Prediction API".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Health ", &format!("http://{}:{}/", host, port)));
    line_box(&kv("Predict", &format!("http://{}:{}/predict", host, port)));
    line_box(&kv("Metrics", &format!("http://{}:{}/metrics", host, port)));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    let config = ServerConfig {
        host: host.to_string(),
        port,
        artifacts_dir: artifacts,
    };

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        let colored = format!("{}", "x".red());
        assert_eq!(strip_ansi(&colored), "x");
    }

    #[test]
    fn test_parse_train_defaults() {
        let cli = Cli::try_parse_from(["heart-predict", "train", "--data", "heart.csv"]).unwrap();
        match cli.command {
            Commands::Train { target, test_size, split_seed, model_seed, full_dataset_imputation, .. } => {
                assert_eq!(target, "num");
                assert_eq!(test_size, 0.3);
                assert_eq!(split_seed, 4);
                assert_eq!(model_seed, 42);
                assert!(!full_dataset_imputation);
            }
            _ => panic!("expected train"),
        }
    }

    #[test]
    fn test_train_config_scope() {
        let config = train_config(
            "d.csv".into(),
            "num".into(),
            0.3,
            4,
            42,
            "a".into(),
            "t".into(),
            "e".into(),
            true,
        );
        assert_eq!(config.imputation_scope, ImputationScope::FullDataset);
        assert_eq!(config.artifact_dir, PathBuf::from("a"));
    }
}
