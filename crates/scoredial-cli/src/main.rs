//! scoredial CLI: predict a student's exam score and show it on an animated gauge.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod record;
mod render;

#[derive(Parser)]
#[command(
    name = "scoredial",
    version,
    about = "Student exam score predictor with an animated gauge"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a student profile to the scoring service
    Predict {
        /// Profile file (.toml or .json) with the form fields
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Extra or overriding form fields (e.g. --field sleep_hours=7.5)
        #[arg(long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// Scoring service endpoint, overrides config
        #[arg(long)]
        endpoint: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print only the final reading instead of animating
        #[arg(long)]
        no_animate: bool,

        /// Print the prediction record as JSON
        #[arg(long)]
        json: bool,

        /// Directory to save the prediction record in
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Animate a known score on the gauge without calling the service
    Gauge {
        /// Score to display
        #[arg(long, allow_hyphen_values = true)]
        score: f64,

        /// Print only the final reading instead of animating
        #[arg(long)]
        no_animate: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Redraw a saved prediction record
    Show {
        /// Record file written by `predict --save`
        record: PathBuf,
    },

    /// Create a starter config and example profile
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scoredial=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Predict {
            profile,
            fields,
            endpoint,
            config,
            no_animate,
            json,
            save,
        } => {
            commands::predict::execute(commands::predict::PredictArgs {
                profile,
                fields,
                endpoint,
                config,
                no_animate,
                json,
                save,
            })
            .await
        }
        Commands::Gauge {
            score,
            no_animate,
            config,
        } => commands::gauge::execute(score, no_animate, config).await,
        Commands::Show { record } => commands::show::execute(&record),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
