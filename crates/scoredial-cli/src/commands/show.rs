//! The `scoredial show` command.

use std::path::Path;

use anyhow::Result;

use scoredial_core::view::PredictionView;

use crate::record::PredictionRecord;
use crate::render::{final_reading, use_color, TerminalRenderer};

pub fn execute(path: &Path) -> Result<()> {
    let record = PredictionRecord::load_json(path)?;

    println!(
        "Prediction {} ({}, {})",
        record.id,
        record.service,
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let reading = record.outcome.score().and_then(final_reading);
    TerminalRenderer::new(use_color(true)).draw(PredictionView::of(&record.outcome, reading));
    Ok(())
}
