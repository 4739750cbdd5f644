use clap::{Parser, Subcommand};
use face_lens_lib::commands::{acquisition, view};
use face_lens_lib::services::camera::NoCameraPlatform;
use face_lens_lib::{AnalyzerConfig, AppError, AppState, SessionState};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Face Lens - age, gender and emotion analysis for a single face image
#[derive(Parser)]
#[command(name = "face-lens")]
#[command(about = "Analyze a face image with a remote inference service", long_about = None)]
struct Cli {
    /// JSON config file (defaults are used for missing fields)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Inference service base URL (overrides config and FACE_LENS_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and print the predictions
    Analyze {
        #[arg(value_name = "FILE")]
        image: PathBuf,

        /// Print the full view state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate and print the effective configuration
    Check,
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = AnalyzerConfig::load(path)?;
            config.apply_env()?;
            config
        }
        None => AnalyzerConfig::from_env()?,
    };
    if let Some(url) = &cli.endpoint {
        config.api_base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<bool, AppError> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Check => {
            let pretty = serde_json::to_string_pretty(&config)
                .map_err(|e| AppError::Config(format!("Failed to render config: {}", e)))?;
            println!("{}", pretty);
            println!("predict endpoint: {}", config.predict_url());
            Ok(true)
        }
        Commands::Analyze { image, json } => {
            let state = AppState::new(config, Arc::new(NoCameraPlatform))?;
            let generation = acquisition::select_file(&state, &image).await?;
            let snapshot = view::wait_for_result(&state, generation).await;

            if json {
                let rendered = serde_json::to_string_pretty(&view::get_view(&state))
                    .map_err(|e| AppError::Config(format!("Failed to render view: {}", e)))?;
                println!("{}", rendered);
            }

            match snapshot.state {
                SessionState::Succeeded(result) => {
                    if !json {
                        println!("Emotion: {}", result.emotion.predicted_emotion);
                        println!(
                            "Gender:  {} ({}%)",
                            result.gender.gender,
                            result.confidence_percent()
                        );
                        println!("Age:     {}", result.age.predicted_age);
                    }
                    Ok(true)
                }
                SessionState::Failed(err) => {
                    eprintln!("{}", err.user_message());
                    Ok(false)
                }
                other => {
                    eprintln!("Analysis did not finish: {:?}", other);
                    Ok(false)
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    face_lens_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "face-lens failed");
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
