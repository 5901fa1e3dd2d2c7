//! Census pipeline CLI module
//!
//! Command-line interface for cleaning, training, slice scoring, single-record
//! prediction and serving.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use crate::artifacts::ArtifactStore;
use crate::config::PipelineConfig;
use crate::inference::{CensusRecord, Predictor};
use crate::pipeline::{self, Action};
use crate::server::{run_server, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

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

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "census")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Census income pipeline: clean, train, score slices and serve predictions")]
#[command(long_about = None)]
pub struct Cli {
    /// Raw census CSV
    #[arg(long, global = true)]
    pub raw_data: Option<PathBuf>,

    /// Clean census CSV
    #[arg(long, global = true)]
    pub clean_data: Option<PathBuf>,

    /// Directory of the model, encoder and binarizer artifacts
    #[arg(long, global = true)]
    pub model_dir: Option<PathBuf>,

    /// Slice metrics output file
    #[arg(long, global = true)]
    pub slice_report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run pipeline stages (basic_cleaning, training, inference or combo)
    Run {
        #[arg(short, long, default_value = "combo")]
        action: Action,
    },

    /// Clean the raw data
    Clean,

    /// Train the model and save its artifacts
    Train {
        /// Comma separated cross-validation scorings
        #[arg(long, default_value = "accuracy,roc_auc,f1")]
        scoring: String,
    },

    /// Score the saved model on every slice of the validation split
    Evaluate,

    /// Predict the label of one record given as JSON
    Predict {
        /// Record JSON, e.g. '{"workclass": "Private", ..., "hours_per_week": 40}'
        #[arg(short, long)]
        record: String,
    },

    /// Start the prediction server
    Serve {
        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Server host
        #[arg(long)]
        host: Option<String>,
    },
}

impl Cli {
    /// Environment-derived defaults overridden by the path flags
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        if let Some(path) = &self.raw_data {
            config = config.with_raw_data(path);
        }
        if let Some(path) = &self.clean_data {
            config = config.with_clean_data(path);
        }
        if let Some(path) = &self.model_dir {
            config = config.with_model_dir(path);
        }
        if let Some(path) = &self.slice_report {
            config = config.with_slice_report(path);
        }
        config
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(action: Action, config: &PipelineConfig) -> anyhow::Result<()> {
    section(&format!("Pipeline: {}", action));

    step_run("Running");
    let start = Instant::now();
    pipeline::execute(action, config)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    Ok(())
}

pub fn cmd_clean(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Clean");

    step_run(&format!("Cleaning {}", config.raw_data.display()));
    let start = Instant::now();
    let clean = pipeline::run_cleaning(config)?;
    step_done(&format!("{} rows × {} cols in {:?}", clean.height(), clean.width(), start.elapsed()));

    kv("Output", &config.clean_data.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_train(config: &PipelineConfig, scoring: &str) -> anyhow::Result<()> {
    section("Train");

    let config = config.clone().with_scorings(scoring)?;
    let scorings: Vec<String> = config.scorings.iter().map(|s| s.to_string()).collect();

    step_run(&format!("Training random forest ({})", scorings.join(", ").cyan()));
    let start = Instant::now();
    let artifacts = pipeline::run_training(&config)?;
    step_done(&format!("{:?}", start.elapsed()));

    kv("Trees", &artifacts.model.n_trees().to_string());
    kv("Features", &artifacts.model.n_features().to_string());
    kv("Classes", &artifacts.binarizer.classes().join(", "));
    kv("Artifacts", &config.model_dir.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_evaluate(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Evaluate");

    step_run("Scoring slices");
    let start = Instant::now();
    let slices = pipeline::run_inference(config)?;
    step_done(&format!("{} slices in {:?}", slices.len(), start.elapsed()));

    for slice in &slices {
        println!("  {}", dim(&slice.to_string()));
    }
    kv("Report", &config.slice_report.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_predict(config: &PipelineConfig, record_json: &str) -> anyhow::Result<()> {
    section("Predict");

    let record: CensusRecord = serde_json::from_str(record_json)?;

    step_run("Loading artifacts");
    let predictor = Predictor::from_store(&ArtifactStore::new(&config.model_dir))?;
    step_done(&config.model_dir.display().to_string());

    let prediction = predictor.predict_one(&record)?;
    kv("Prediction", &prediction.bold().to_string());
    println!();
    Ok(())
}

pub async fn cmd_serve(config: &PipelineConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut server_config = ServerConfig {
        model_dir: config.model_dir.clone(),
        ..ServerConfig::default()
    };
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }

    section("Serve");
    kv("Address", &format!("http://{}:{}", server_config.host, server_config.port));
    kv("Artifacts", &server_config.model_dir.display().to_string());
    println!();

    run_server(server_config).await
}
