//! CLI entry point for attrition prediction.

use anyhow::{Context, Result, anyhow, bail};
use attrition_inference::{
    DEFAULT_DECISION_THRESHOLD, EncodingMode, Prediction, Predictor, PredictorConfig,
};
use attrition_processing::{
    EmployeeForm, EmployeeRecord, FeaturePipeline, ProcessingConfig, ReferenceDataset, Widget,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenv::dotenv;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    author = "Attrition Team",
    version,
    about = "Employee attrition prediction",
    long_about = "Predicts whether an employee is likely to leave from 31 HR attributes.\n\n\
                  ENVIRONMENT VARIABLES (also read from .env):\n  \
                  ATTRITION_MODEL       Path to the tree ensemble JSON export\n  \
                  ATTRITION_PIPELINE    Path to the fitted feature pipeline\n  \
                  ATTRITION_REFERENCE   Path to the reference (training) CSV\n\n\
                  EXAMPLES:\n  \
                  # Fit encoders once against the training data\n  \
                  attrition fit --reference employee_data_cleaned.csv -o pipeline.json\n\n  \
                  # Predict from form values\n  \
                  attrition predict --model model.json --pipeline pipeline.json \\\n    \
                  --set Age=29 --set OverTime=yes --set JobRole=\"Sales Representative\"\n\n  \
                  # Reproduce per-request refitting\n  \
                  attrition predict --model model.json --reference data.csv --refit --record employee.json"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable text
    ///
    /// Disables all logs so stdout only carries the JSON document.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit encoders on the reference dataset and write the pipeline file
    Fit {
        /// Reference CSV with a header row
        #[arg(long, env = "ATTRITION_REFERENCE")]
        reference: PathBuf,

        /// Destination of the fitted pipeline JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Clamp scaled values of out-of-range inputs into [0, 1]
        #[arg(long)]
        clip: bool,

        /// Fail on reference rows with missing values instead of dropping them
        #[arg(long)]
        strict: bool,
    },

    /// Predict attrition for one or more employee records
    Predict(PredictArgs),

    /// Print the form description (fields, widgets, options, defaults)
    Form,

    /// Print the per-column encodings of a fitted pipeline
    Inspect {
        /// Fitted pipeline JSON
        #[arg(long, env = "ATTRITION_PIPELINE")]
        pipeline: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct PredictArgs {
    /// Tree ensemble JSON export
    #[arg(long, env = "ATTRITION_MODEL")]
    model: PathBuf,

    /// Fitted pipeline JSON (fitted encoding)
    #[arg(long, env = "ATTRITION_PIPELINE")]
    pipeline: Option<PathBuf>,

    /// Reference CSV (required with --refit)
    #[arg(long, env = "ATTRITION_REFERENCE")]
    reference: Option<PathBuf>,

    /// Refit encoders over the reference rows plus each record
    #[arg(long)]
    refit: bool,

    /// JSON file holding one record object
    #[arg(long, conflicts_with_all = ["records", "set"])]
    record: Option<PathBuf>,

    /// JSON file holding an array of record objects
    #[arg(long, conflicts_with = "set")]
    records: Option<PathBuf>,

    /// Form value as Column=value; unset fields take the form default
    #[arg(long = "set", value_name = "COLUMN=VALUE", value_parser = parse_key_value)]
    set: Vec<(String, String)>,

    /// Probability of attrition above which "Yes" is predicted
    #[arg(long, default_value_t = DEFAULT_DECISION_THRESHOLD)]
    threshold: f64,
}

fn parse_key_value(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", raw))
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// carries only the JSON document.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // .env must be loaded before parsing so it can supply env-backed flags
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    match args.command {
        Command::Fit {
            reference,
            output,
            clip,
            strict,
        } => run_fit(&reference, &output, clip, strict, args.json),
        Command::Predict(predict) => run_predict(predict, args.json),
        Command::Form => run_form(args.json),
        Command::Inspect { pipeline } => run_inspect(&pipeline, args.json),
    }
}

fn run_fit(reference: &Path, output: &Path, clip: bool, strict: bool, json: bool) -> Result<()> {
    let config = ProcessingConfig::builder()
        .clip_scaled(clip)
        .drop_incomplete_rows(!strict)
        .build()?;

    let dataset = ReferenceDataset::load(reference, &config)?;
    let pipeline = FeaturePipeline::fit(&dataset, &config)?;
    pipeline.save(output)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "output": output.display().to_string(),
                "reference_rows": pipeline.reference_rows(),
                "dropped_rows": dataset.dropped_rows(),
                "clip": pipeline.clip(),
            }))?
        );
    } else {
        println!(
            "Fitted {} columns on {} rows ({} dropped) → {}",
            pipeline.columns().len(),
            pipeline.reference_rows(),
            dataset.dropped_rows(),
            output.display()
        );
    }
    Ok(())
}

fn run_predict(args: PredictArgs, json: bool) -> Result<()> {
    let mut builder = PredictorConfig::builder()
        .model_path(&args.model)
        .decision_threshold(args.threshold);
    if let Some(path) = &args.pipeline {
        builder = builder.pipeline_path(path);
    }
    if let Some(path) = &args.reference {
        builder = builder.reference_path(path);
    }
    if args.refit {
        builder = builder.encoding_mode(EncodingMode::RefitPerRequest);
    }
    let predictor = Predictor::from_config(&builder.build()?)?;

    let records = read_records(&args)?;
    info!("Scoring {} record(s)", records.len());
    let predictions = predictor.predict_batch(&records)?;

    if json {
        let output = if predictions.len() == 1 && args.records.is_none() {
            serde_json::to_string_pretty(&predictions[0])?
        } else {
            serde_json::to_string_pretty(&predictions)?
        };
        println!("{}", output);
    } else {
        for prediction in &predictions {
            print_prediction(prediction);
        }
    }
    Ok(())
}

fn read_records(args: &PredictArgs) -> Result<Vec<EmployeeRecord>> {
    let records: Vec<EmployeeRecord> = if let Some(path) = &args.record {
        let record: EmployeeRecord = serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("Parsing record from {}", path.display()))?;
        vec![record]
    } else if let Some(path) = &args.records {
        serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("Parsing records from {}", path.display()))?
    } else if !args.set.is_empty() {
        debug!("Parsing {} form value(s)", args.set.len());
        vec![EmployeeForm::new().parse(args.set.iter().cloned())?]
    } else {
        bail!("no input: pass --record, --records or at least one --set COLUMN=VALUE");
    };

    if records.is_empty() {
        return Err(anyhow!("no records to score"));
    }
    for (idx, record) in records.iter().enumerate() {
        record
            .validate()
            .with_context(|| format!("Record {} is invalid", idx))?;
    }
    Ok(records)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))
}

fn print_prediction(prediction: &Prediction) {
    println!("{}", prediction);
    println!("  probability: {:.3}", prediction.probability);
}

fn run_form(json: bool) -> Result<()> {
    let form = EmployeeForm::new();
    if json {
        println!("{}", serde_json::to_string_pretty(form.fields())?);
        return Ok(());
    }

    for field in form.fields() {
        let input = match &field.widget {
            Widget::Number { min, max, step } => format!(
                "number [{}..{}] step {}",
                min.map_or_else(|| "-".to_string(), |v| v.to_string()),
                max.map_or_else(|| "-".to_string(), |v| v.to_string()),
                step
            ),
            Widget::Select { options } => format!("select: {}", options.join(" | ")),
            Widget::Radio { options } => format!("radio: {}", options.join(" | ")),
            Widget::Slider { options } => format!("slider: {}", options.join(" | ")),
            Widget::Checkbox => "checkbox".to_string(),
        };
        println!(
            "{:<26} {:<28} {} (default: {})",
            field.column, field.label, input, field.default
        );
    }
    Ok(())
}

fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let pipeline = FeaturePipeline::load(path)?;
    let summaries = pipeline.summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "Pipeline fitted {} on {} rows (clip: {})",
        pipeline.fitted_at().to_rfc3339(),
        pipeline.reference_rows(),
        pipeline.clip()
    );
    for summary in summaries {
        match (&summary.classes, summary.range) {
            (Some(classes), _) => {
                let codes: Vec<String> = classes
                    .iter()
                    .enumerate()
                    .map(|(code, class)| format!("{}={}", code, class))
                    .collect();
                println!("{:<26} label    {}", summary.column, codes.join(", "));
            }
            (None, Some((min, max))) => {
                println!("{:<26} min_max  [{}, {}]", summary.column, min, max);
            }
            (None, None) => println!("{:<26} {}", summary.column, summary.kind),
        }
    }
    Ok(())
}
