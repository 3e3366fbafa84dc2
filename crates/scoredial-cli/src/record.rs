//! Saved prediction records.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scoredial_core::gauge::{DialGeometry, GaugeReading};
use scoredial_core::{FormSnapshot, PerformanceTier, PredictionState};

use crate::render::final_reading;

/// One submission and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Endpoint or service kind the prediction came from.
    pub service: String,
    pub profile: FormSnapshot,
    pub outcome: PredictionState,
    /// Present when the outcome carries a score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge: Option<GaugeSummary>,
}

/// The gauge at rest, for consumers that draw their own dial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeSummary {
    pub display_score: f64,
    pub rounded: i64,
    pub tier: PerformanceTier,
    pub label: String,
    pub color: String,
    pub dial_size: f64,
    pub circumference: f64,
    pub dash_offset: f64,
}

impl GaugeSummary {
    pub fn new(reading: &GaugeReading, dial: DialGeometry) -> Self {
        Self {
            display_score: reading.display_score,
            rounded: reading.rounded(),
            tier: reading.tier,
            label: reading.label().to_string(),
            color: reading.color().hex.to_string(),
            dial_size: dial.size,
            circumference: dial.circumference(),
            dash_offset: dial.dash_offset(reading.display_score),
        }
    }
}

impl PredictionRecord {
    pub fn new(
        service: String,
        profile: FormSnapshot,
        outcome: PredictionState,
        dial: DialGeometry,
    ) -> Self {
        let gauge = outcome
            .score()
            .and_then(final_reading)
            .map(|reading| GaugeSummary::new(&reading, dial));
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            service,
            profile,
            outcome,
            gauge,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize prediction record")
    }

    /// Save into `dir` as `prediction-<timestamp>.json` and return the path.
    pub fn save_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let timestamp = self.created_at.format("%Y-%m-%dT%H%M%S");
        let short_id = &self.id.simple().to_string()[..8];
        let path = dir.join(format!("prediction-{timestamp}-{short_id}.json"));
        std::fs::write(&path, self.to_json()?)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(path)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse prediction record JSON")
    }
}
