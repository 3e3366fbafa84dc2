//! The `scoredial gauge` command.

use std::path::PathBuf;

use anyhow::Result;

use scoredial_client::config::load_config_from;
use scoredial_core::gauge::{animate, AnimationOutcome, IntervalClock, ScoreGauge};
use scoredial_core::view::PredictionView;
use scoredial_core::Score;

use crate::render::{final_reading, until_interrupted, use_color, TerminalRenderer};

pub async fn execute(score: f64, no_animate: bool, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    let mut renderer = TerminalRenderer::new(use_color(config.display.color));
    let score = Score(score);

    if no_animate {
        if let Some(reading) = final_reading(score) {
            renderer.draw(PredictionView::Result {
                reading,
                suggestions: &[],
            });
        }
        return Ok(());
    }

    let mut gauge = ScoreGauge::new();
    gauge.set_target(score);
    let mut clock = IntervalClock::new(config.display.frame_interval());

    let outcome = until_interrupted(async {
        Ok(animate(&mut gauge, &mut clock, |reading| {
            renderer.draw(PredictionView::Result {
                reading: *reading,
                suggestions: &[],
            })
        })
        .await)
    })
    .await;
    renderer.close_line();

    if outcome? == AnimationOutcome::TornDown {
        tracing::debug!("gauge animation ended early");
    }
    Ok(())
}
