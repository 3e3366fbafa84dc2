//! Core data model types for scoredial.
//!
//! These are the values that flow between the prediction workflow, the
//! scoring service, and the gauge: the submitted form snapshot, the score
//! that comes back, and the tier derived from it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Score and tiers
// ---------------------------------------------------------------------------

/// A predicted exam score.
///
/// Documented as 0–100 by the scoring service but never clamped here:
/// out-of-range values are passed through and rendered as-is.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(pub f64);

impl Score {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    /// The qualitative tier for this score.
    pub fn tier(self) -> PerformanceTier {
        PerformanceTier::from_score(self.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Qualitative label derived from a score via the fixed 60/80 thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    /// score >= 80
    Excellent,
    /// 60 <= score < 80
    Good,
    /// score < 60, and any non-finite score
    NeedsImprovement,
}

impl PerformanceTier {
    pub const EXCELLENT_THRESHOLD: f64 = 80.0;
    pub const GOOD_THRESHOLD: f64 = 60.0;

    /// Classify a raw score. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if !score.is_finite() {
            return PerformanceTier::NeedsImprovement;
        }
        if score >= Self::EXCELLENT_THRESHOLD {
            PerformanceTier::Excellent
        } else if score >= Self::GOOD_THRESHOLD {
            PerformanceTier::Good
        } else {
            PerformanceTier::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::NeedsImprovement => "Needs Improvement",
        }
    }

    pub fn color(self) -> TierColor {
        match self {
            PerformanceTier::Excellent => TierColor::GREEN,
            PerformanceTier::Good => TierColor::AMBER,
            PerformanceTier::NeedsImprovement => TierColor::RED,
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display colour for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierColor {
    /// CSS hex colour, e.g. `#10b981`.
    pub hex: &'static str,
    /// Nearest xterm-256 colour index.
    pub ansi256: u8,
}

impl TierColor {
    pub const GREEN: TierColor = TierColor {
        hex: "#10b981",
        ansi256: 36,
    };
    pub const AMBER: TierColor = TierColor {
        hex: "#f59e0b",
        ansi256: 214,
    };
    pub const RED: TierColor = TierColor {
        hex: "#ef4444",
        ansi256: 203,
    };

    /// Wrap `text` in the ANSI escape for this colour.
    pub fn paint(self, text: &str) -> String {
        format!("\x1b[38;5;{}m{text}\x1b[0m", self.ansi256)
    }
}

// ---------------------------------------------------------------------------
// Form snapshot
// ---------------------------------------------------------------------------

/// A single form field value as the form holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

/// The form's current values keyed by field name.
///
/// Serializes as a flat JSON object with exactly these keys; this is the
/// request body sent to the scoring service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot(BTreeMap<String, FieldValue>);

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

/// The student attributes collected by the form.
///
/// Values are kept exactly as entered; field-level validation belongs to
/// the form, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub age: FieldValue,
    #[serde(default = "default_gender")]
    pub gender: String,
    #[serde(default)]
    pub study_hours_per_day: FieldValue,
    #[serde(default)]
    pub social_media_hours: FieldValue,
    #[serde(default = "default_no")]
    pub part_time_job: String,
    #[serde(default)]
    pub attendance_percentage: FieldValue,
    #[serde(default)]
    pub sleep_hours: FieldValue,
    #[serde(default = "default_average")]
    pub diet_quality: String,
    #[serde(default)]
    pub exercise_frequency: FieldValue,
    #[serde(default = "default_parental_education")]
    pub parental_education_level: String,
    #[serde(rename = "internet_Resource_accessibility", default = "default_average")]
    pub internet_resource_accessibility: String,
    #[serde(default = "default_no")]
    pub extracurricular_participation: String,
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

fn default_gender() -> String {
    "Male".to_string()
}
fn default_no() -> String {
    "No".to_string()
}
fn default_average() -> String {
    "Average".to_string()
}
fn default_parental_education() -> String {
    "High School".to_string()
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            age: FieldValue::default(),
            gender: default_gender(),
            study_hours_per_day: FieldValue::default(),
            social_media_hours: FieldValue::default(),
            part_time_job: default_no(),
            attendance_percentage: FieldValue::default(),
            sleep_hours: FieldValue::default(),
            diet_quality: default_average(),
            exercise_frequency: FieldValue::default(),
            parental_education_level: default_parental_education(),
            internet_resource_accessibility: default_average(),
            extracurricular_participation: default_no(),
        }
    }
}

impl From<&StudentProfile> for FormSnapshot {
    fn from(p: &StudentProfile) -> Self {
        FormSnapshot::new()
            .with("age", p.age.clone())
            .with("gender", p.gender.as_str())
            .with("study_hours_per_day", p.study_hours_per_day.clone())
            .with("social_media_hours", p.social_media_hours.clone())
            .with("part_time_job", p.part_time_job.as_str())
            .with("attendance_percentage", p.attendance_percentage.clone())
            .with("sleep_hours", p.sleep_hours.clone())
            .with("diet_quality", p.diet_quality.as_str())
            .with("exercise_frequency", p.exercise_frequency.clone())
            .with("parental_education_level", p.parental_education_level.as_str())
            .with(
                "internet_Resource_accessibility",
                p.internet_resource_accessibility.as_str(),
            )
            .with(
                "extracurricular_participation",
                p.extracurricular_participation.as_str(),
            )
    }
}

// ---------------------------------------------------------------------------
// Wire response
// ---------------------------------------------------------------------------

/// Response payload returned by the scoring service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResponse {
    pub fn succeeded(prediction: f64, suggestions: Vec<String>) -> Self {
        Self {
            success: true,
            prediction: Some(prediction),
            suggestions: Some(suggestions),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow state
// ---------------------------------------------------------------------------

/// The lifecycle state of the current prediction request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PredictionState {
    #[default]
    Idle,
    Submitting,
    Succeeded {
        score: Score,
        suggestions: Vec<String>,
    },
    Failed {
        message: String,
    },
}

impl PredictionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, PredictionState::Submitting)
    }

    /// True for `Succeeded` and `Failed`.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            PredictionState::Succeeded { .. } | PredictionState::Failed { .. }
        )
    }

    pub fn score(&self) -> Option<Score> {
        match self {
            PredictionState::Succeeded { score, .. } => Some(*score),
            _ => None,
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match self {
            PredictionState::Succeeded { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PredictionState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        let cases = [
            (0.0, PerformanceTier::NeedsImprovement),
            (59.9, PerformanceTier::NeedsImprovement),
            (60.0, PerformanceTier::Good),
            (79.9, PerformanceTier::Good),
            (80.0, PerformanceTier::Excellent),
            (100.0, PerformanceTier::Excellent),
        ];
        for (score, expected) in cases {
            assert_eq!(PerformanceTier::from_score(score), expected, "score {score}");
        }
    }

    #[test]
    fn tier_out_of_range_scores_still_classified() {
        assert_eq!(Score(140.0).tier(), PerformanceTier::Excellent);
        assert_eq!(Score(-12.0).tier(), PerformanceTier::NeedsImprovement);
    }

    #[test]
    fn tier_non_finite_is_needs_improvement() {
        assert_eq!(Score(f64::NAN).tier(), PerformanceTier::NeedsImprovement);
        assert_eq!(Score(f64::INFINITY).tier(), PerformanceTier::NeedsImprovement);
        assert_eq!(
            Score(f64::NEG_INFINITY).tier(),
            PerformanceTier::NeedsImprovement
        );
    }

    #[test]
    fn tier_labels_and_colors() {
        assert_eq!(PerformanceTier::Excellent.label(), "Excellent");
        assert_eq!(PerformanceTier::NeedsImprovement.label(), "Needs Improvement");
        assert_eq!(PerformanceTier::Good.color().hex, "#f59e0b");
        assert_eq!(PerformanceTier::Excellent.color().hex, "#10b981");
        assert_eq!(PerformanceTier::NeedsImprovement.color().hex, "#ef4444");
    }

    #[test]
    fn snapshot_serializes_every_field_by_name() {
        let snapshot = FormSnapshot::new()
            .with("age", "20")
            .with("study_hours_per_day", 5.5)
            .with("internet_Resource_accessibility", "Good");

        let json = serde_json::to_value(&snapshot).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), snapshot.len());
        assert_eq!(object["age"], "20");
        assert_eq!(object["study_hours_per_day"], 5.5);
        assert_eq!(object["internet_Resource_accessibility"], "Good");
    }

    #[test]
    fn profile_defaults_match_initial_form() {
        let snapshot = FormSnapshot::from(&StudentProfile::default());
        assert_eq!(snapshot.len(), 12);
        assert_eq!(snapshot.get("gender"), Some(&FieldValue::from("Male")));
        assert_eq!(
            snapshot.get("parental_education_level"),
            Some(&FieldValue::from("High School"))
        );
        assert_eq!(snapshot.get("age"), Some(&FieldValue::from("")));
    }

    #[test]
    fn profile_parses_from_toml_with_wire_names() {
        let toml_str = r#"
age = 20
gender = "Female"
study_hours_per_day = 5.5
social_media_hours = "2.0"
attendance_percentage = 90
sleep_hours = 7.5
exercise_frequency = 3
internet_Resource_accessibility = "Good"
"#;
        let profile: StudentProfile = toml::from_str(toml_str).unwrap();
        assert_eq!(profile.age, FieldValue::Number(20.0));
        assert_eq!(profile.social_media_hours, FieldValue::from("2.0"));
        assert_eq!(profile.internet_resource_accessibility, "Good");
        assert_eq!(profile.diet_quality, "Average");
    }

    #[test]
    fn response_optional_fields_default() {
        let resp: PredictionResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.prediction, None);
        assert_eq!(resp.suggestions, None);

        let resp: PredictionResponse =
            serde_json::from_str(r#"{"success": false, "error": "bad", "extra": 1}"#).unwrap();
        assert_eq!(resp.error.as_deref(), Some("bad"));
    }

    #[test]
    fn state_accessors() {
        let state = PredictionState::Succeeded {
            score: Score(78.5),
            suggestions: vec!["Study more".into()],
        };
        assert_eq!(state.score(), Some(Score(78.5)));
        assert_eq!(state.suggestions().len(), 1);
        assert!(state.is_resolved());
        assert!(!state.is_loading());
        assert!(PredictionState::Submitting.is_loading());
        assert_eq!(
            PredictionState::Failed {
                message: "x".into()
            }
            .error_message(),
            Some("x")
        );
        assert_eq!(PredictionState::default(), PredictionState::Idle);
    }
}
