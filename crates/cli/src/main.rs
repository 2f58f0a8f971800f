use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use symcheck_core::advisory::MEDICAL_DISCLAIMER;
use symcheck_core::config::{path_from_env_value, seed_from_env_value};
use symcheck_core::constants::{DEFAULT_DATASET_PATH, DEFAULT_MODEL_DIR};
use symcheck_core::presets::{BAD_EXAMPLES, GOOD_EXAMPLES, INPUT_TIP};
use symcheck_core::{
    load_or_train, train_from_csv, ArtifactPaths, ClassificationEngine, CoreConfig, CoreError,
    Diagnosis, ModelSummary, PredictionPipeline, PredictionResult, StartupOutcome,
    TrainingParams,
};

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "symcheck")]
#[command(about = "Symptom checker: validate, triage and classify symptom descriptions")]
struct Cli {
    /// Directory holding the model artifact (default: $SYMCHECK_MODEL_DIR or "model")
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,
    /// Training CSV (default: $SYMCHECK_DATASET or "dataset_improved.csv")
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from the dataset and save it
    Train {
        /// Training seed (default: $SYMCHECK_SEED or 42)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check one symptom description
    Predict {
        /// Symptoms, e.g. "fever, cough, headache"
        #[arg(required = true, num_args = 1..)]
        symptoms: Vec<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read symptom descriptions from stdin until "quit"
    Interactive,
    /// Show statistics of the saved model
    Info,
}

fn config(cli: &Cli, seed: Option<u64>) -> Result<CoreConfig, Box<dyn std::error::Error>> {
    let model_dir = cli.model_dir.clone().unwrap_or_else(|| {
        path_from_env_value(std::env::var("SYMCHECK_MODEL_DIR").ok(), DEFAULT_MODEL_DIR)
    });
    let dataset = cli.dataset.clone().unwrap_or_else(|| {
        path_from_env_value(std::env::var("SYMCHECK_DATASET").ok(), DEFAULT_DATASET_PATH)
    });
    let seed = match seed {
        Some(seed) => seed,
        None => seed_from_env_value(std::env::var("SYMCHECK_SEED").ok())?,
    };
    Ok(CoreConfig::new(
        model_dir,
        dataset,
        TrainingParams::default().with_seed(seed),
    )?)
}

fn pipeline(cfg: &CoreConfig) -> Result<PredictionPipeline, Box<dyn std::error::Error>> {
    let (engine, outcome) = load_or_train(cfg)?;
    if let StartupOutcome::Trained { reason } = outcome {
        eprintln!("Trained a new model ({reason})");
    }
    Ok(PredictionPipeline::new(engine))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("symcheck_core=warn".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Train { seed }) => {
            let cfg = config(&cli, *seed)?;
            println!("Loading dataset {}...", cfg.dataset_path().display());
            let artifact = train_from_csv(cfg.dataset_path(), cfg.training())?;
            artifact.save(&cfg.artifact_paths())?;

            let engine = ClassificationEngine::from_artifact(artifact);
            if let Some(summary) = engine.summary() {
                print_summary(summary);
            }
            println!("Model saved to {}", cfg.model_dir().display());
        }
        Some(Commands::Predict { symptoms, json }) => {
            let cfg = config(&cli, None)?;
            let pipeline = pipeline(&cfg)?;
            let result = pipeline.predict(&symptoms.join(" "))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        Some(Commands::Interactive) => {
            let cfg = config(&cli, None)?;
            let pipeline = pipeline(&cfg)?;
            interactive(&pipeline)?;
        }
        Some(Commands::Info) => {
            let cfg = config(&cli, None)?;
            print_summary(&saved_model_summary(&cfg.artifact_paths())?);
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Summary of the model saved at `paths`, without training one.
fn saved_model_summary(paths: &ArtifactPaths) -> Result<ModelSummary, CoreError> {
    let mut engine = ClassificationEngine::new();
    engine.load(paths)?;
    engine.summary().cloned().ok_or(CoreError::ModelNotReady)
}

/// One REPL line: `None` ends the session, anything else goes to the pipeline as typed.
fn interactive_input(line: &str) -> Option<&str> {
    let input = line.trim();
    if input.eq_ignore_ascii_case("quit") {
        None
    } else {
        Some(input)
    }
}

fn interactive(pipeline: &PredictionPipeline) -> io::Result<()> {
    println!("{RULE}");
    println!("SYMCHECK - symptom checker");
    println!("{RULE}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nEnter symptoms (or 'quit' to exit): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let Some(input) = interactive_input(&line) else {
            break;
        };

        match pipeline.predict(input) {
            Ok(result) => print_result(&result),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    Ok(())
}

fn print_result(result: &PredictionResult) {
    match result {
        PredictionResult::InvalidInput { message, .. } => {
            println!("\n{message}");
            println!("\nExamples:");
            for example in GOOD_EXAMPLES {
                println!("   ok  '{example}'");
            }
            for (example, why) in BAD_EXAMPLES {
                println!("   bad '{example}' ({why})");
            }
            println!("\nTip: {INPUT_TIP}");
        }
        PredictionResult::Emergency {
            message, contacts, ..
        } => {
            let banner = "!".repeat(RULE.len());
            println!("\n{banner}");
            println!("{message}");
            let numbers: Vec<String> = contacts
                .iter()
                .map(|(region, number)| format!("{number} ({region})"))
                .collect();
            println!("CALL {} IMMEDIATELY!", numbers.join(" / "));
            println!("{banner}");
        }
        PredictionResult::Diagnosis(diagnosis) => print_diagnosis(diagnosis),
    }
}

fn print_diagnosis(diagnosis: &Diagnosis) {
    println!("\n{RULE}");
    println!("Disease: {}", diagnosis.label);
    println!(
        "Confidence: {}% ({})",
        diagnosis.confidence_percent, diagnosis.confidence_tier
    );
    println!("Severity: {}", diagnosis.severity);
    println!("{RULE}");
    println!("\n{}", diagnosis.advisory.description);
    println!("\nHome Remedies:");
    for remedy in diagnosis.advisory.home_remedies.iter().take(3) {
        println!("   - {remedy}");
    }
    println!("\n{}", diagnosis.doctor_advice.headline);
    println!("Action: {}", diagnosis.doctor_advice.action);
    println!("\n{MEDICAL_DISCLAIMER}");
}

fn print_summary(summary: &ModelSummary) {
    let meta = &summary.metadata;
    println!("\n{RULE}");
    println!("Trees:            {}", summary.trees);
    println!("Vocabulary size:  {}", summary.vocabulary_size);
    println!("Diseases:         {}", summary.labels.len());
    println!(
        "Records:          {} ({} train / {} test)",
        meta.n_records, meta.n_train, meta.n_test
    );
    println!("Accuracy:         {:.2}%", meta.accuracy * 100.0);
    if let Some(oob) = meta.oob_score {
        println!("OOB score:        {:.2}%", oob * 100.0);
    }
    println!("Trained at:       {}", meta.trained_at.to_rfc3339());
    println!("{RULE}");
}
