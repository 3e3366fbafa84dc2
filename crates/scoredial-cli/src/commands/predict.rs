//! The `scoredial predict` command.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use scoredial_client::config::{create_service, load_config_from, ServiceConfig};
use scoredial_core::gauge::{DialGeometry, IntervalClock, ScoreGauge};
use scoredial_core::view::{follow, PredictionView};
use scoredial_core::workflow::WorkflowController;
use scoredial_core::{FormSnapshot, PredictionState, ScoringService, StudentProfile};

use crate::record::PredictionRecord;
use crate::render::{final_reading, until_interrupted, use_color, TerminalRenderer};

pub struct PredictArgs {
    pub profile: Option<PathBuf>,
    pub fields: Vec<String>,
    pub endpoint: Option<String>,
    pub config: Option<PathBuf>,
    pub no_animate: bool,
    pub json: bool,
    pub save: Option<PathBuf>,
}

pub async fn execute(args: PredictArgs) -> Result<()> {
    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.service = match config.service {
            ServiceConfig::Http { timeout_secs, .. } => ServiceConfig::Http {
                endpoint,
                timeout_secs,
            },
            ServiceConfig::Mock { .. } => ServiceConfig::http(endpoint),
        };
    }

    let snapshot = build_snapshot(args.profile.as_deref(), &args.fields)?;
    let service: Arc<dyn ScoringService> = Arc::from(create_service(&config.service)?);
    let controller = WorkflowController::new(service).with_race_policy(config.race_policy);
    let color = !args.json && use_color(config.display.color);

    tracing::debug!(service = %config.service.describe(), fields = snapshot.len(), "predicting");

    let state = if args.json || args.no_animate {
        let state =
            until_interrupted(async { Ok(controller.submit(snapshot.clone()).await.state) })
                .await?;
        if !args.json {
            let reading = state.score().and_then(final_reading);
            TerminalRenderer::new(color).draw(PredictionView::of(&state, reading));
        }
        state
    } else {
        until_interrupted(async {
            let mut states = controller.subscribe();
            let mut gauge = ScoreGauge::new();
            let mut clock = IntervalClock::new(config.display.frame_interval());
            let mut renderer = TerminalRenderer::new(color);

            let submission = controller.begin(snapshot.clone());
            renderer.draw(PredictionView::of(&controller.state(), None));
            let (resolution, _) = tokio::join!(
                submission.resolve(),
                follow(&mut states, &mut gauge, &mut clock, |view| renderer
                    .draw(view)),
            );
            renderer.close_line();
            Ok(resolution.state)
        })
        .await?
    };

    let record = PredictionRecord::new(
        config.service.describe(),
        snapshot,
        state,
        DialGeometry::new(config.display.dial_size),
    );

    if args.json {
        println!("{}", record.to_json()?);
    }

    if let Some(dir) = &args.save {
        let path = record.save_json(dir)?;
        eprintln!("Saved prediction to {}", path.display());
    }

    match record.outcome {
        PredictionState::Failed { message } => anyhow::bail!("prediction failed: {message}"),
        _ => Ok(()),
    }
}

/// Collect the form from an optional profile file plus `NAME=VALUE` overrides.
pub fn build_snapshot(profile: Option<&Path>, fields: &[String]) -> Result<FormSnapshot> {
    let profile = match profile {
        Some(path) => load_profile(path)?,
        None => StudentProfile::default(),
    };
    let mut snapshot = FormSnapshot::from(&profile);

    for field in fields {
        let (name, value) = field
            .split_once('=')
            .with_context(|| format!("invalid field '{field}', expected NAME=VALUE"))?;
        let name = name.trim();
        anyhow::ensure!(!name.is_empty(), "invalid field '{field}', name is empty");
        snapshot.insert(name, value);
    }

    Ok(snapshot)
}

/// Load a profile from a `.json` or `.toml` file.
pub fn load_profile(path: &Path) -> Result<StudentProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse profile: {}", path.display()))
    }
}
