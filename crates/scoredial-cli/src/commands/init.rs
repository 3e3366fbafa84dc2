//! The `scoredial init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("scoredial.toml").exists() {
        println!("scoredial.toml already exists, skipping.");
    } else {
        std::fs::write("scoredial.toml", SAMPLE_CONFIG)?;
        println!("Created scoredial.toml");
    }

    if std::path::Path::new("profile.toml").exists() {
        println!("profile.toml already exists, skipping.");
    } else {
        std::fs::write("profile.toml", EXAMPLE_PROFILE)?;
        println!("Created profile.toml");
    }

    println!("\nNext steps:");
    println!("  1. Point scoredial.toml at your scoring service");
    println!("  2. Edit profile.toml with the student's details");
    println!("  3. Run: scoredial predict --profile profile.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# scoredial configuration

race_policy = "latest-issued-wins"

[service]
type = "http"
endpoint = "http://127.0.0.1:5000/api/predict"
# timeout_secs = 30

# Canned answers without a running service:
# [service]
# type = "mock"
# prediction = 78.5
# suggestions = ["Increase study hours", "Sleep at least 7 hours"]

[display]
frame_interval_ms = 16
dial_size = 220.0
color = true
"#;

const EXAMPLE_PROFILE: &str = r#"# Student profile submitted by `scoredial predict --profile profile.toml`

age = 20
gender = "Female"
study_hours_per_day = 4.5
social_media_hours = 2.0
part_time_job = "No"
attendance_percentage = 92.0
sleep_hours = 7.5
diet_quality = "Good"
exercise_frequency = 3
parental_education_level = "Bachelor"
internet_Resource_accessibility = "Good"
extracurricular_participation = "Yes"
"#;
