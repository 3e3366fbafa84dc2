//! Terminal rendering of prediction views.

use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use scoredial_core::gauge::{GaugeReading, ScoreGauge};
use scoredial_core::view::PredictionView;
use scoredial_core::Score;

const BAR_WIDTH: usize = 30;

/// Colour only when configured, `NO_COLOR` is unset, and stdout is a terminal.
pub fn use_color(configured: bool) -> bool {
    configured && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

/// The reading a gauge shows once it has landed on `score`.
pub fn final_reading(score: Score) -> Option<GaugeReading> {
    let mut gauge = ScoreGauge::with_duration(Duration::ZERO);
    gauge.set_target(score);
    gauge.tick(Duration::ZERO)
}

/// Number of bar cells to fill for `percent`.
pub fn filled_cells(percent: f64, width: usize) -> usize {
    if !percent.is_finite() {
        return 0;
    }
    ((percent / 100.0).clamp(0.0, 1.0) * width as f64).round() as usize
}

/// One line of the gauge: rounded score, fill bar, tier label.
pub fn gauge_line(reading: &GaugeReading, color: bool) -> String {
    let filled = filled_cells(reading.fill_percent(), BAR_WIDTH);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
    let number = format!("{:>3}", reading.rounded());
    let label = reading.label();

    if color {
        let c = reading.color();
        format!("{} / 100  [{}]  {}", c.paint(&number), c.paint(&bar), c.paint(label))
    } else {
        format!("{number} / 100  [{bar}]  {label}")
    }
}

pub fn suggestions_table(suggestions: &[String]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Improvement Suggestions"]);
    for (i, suggestion) in suggestions.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(suggestion)]);
    }
    table
}

/// Draws views to stdout, redrawing the gauge line in place.
pub struct TerminalRenderer {
    color: bool,
    loading_shown: bool,
    line_open: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            loading_shown: false,
            line_open: false,
        }
    }

    pub fn draw(&mut self, view: PredictionView<'_>) {
        match view {
            PredictionView::Placeholder => {
                self.close_line();
                println!("Ready to Predict");
            }
            PredictionView::Loading => {
                if !self.loading_shown {
                    print!("Predicting...");
                    flush();
                    self.loading_shown = true;
                    self.line_open = true;
                }
            }
            PredictionView::Error(message) => {
                self.close_line();
                println!("Prediction Error: {message}");
            }
            PredictionView::Result {
                reading,
                suggestions,
            } => {
                self.draw_reading(&reading);
                if reading.is_final {
                    self.summary(&reading, suggestions);
                }
            }
        }
    }

    pub fn draw_reading(&mut self, reading: &GaugeReading) {
        let line = gauge_line(reading, self.color);
        if self.color {
            print!("\r\x1b[2K{line}");
        } else if self.line_open {
            print!("\r{line}");
        } else {
            print!("{line}");
        }
        flush();
        self.line_open = true;
        if reading.is_final {
            self.close_line();
        }
    }

    fn summary(&mut self, reading: &GaugeReading, suggestions: &[String]) {
        println!("Performance Level: {}", reading.label());
        println!("Score Breakdown: {:.1}%", reading.display_score);
        if !suggestions.is_empty() {
            println!("\n{}", suggestions_table(suggestions));
        }
    }

    /// Finish any partially drawn line.
    pub fn close_line(&mut self) {
        if self.line_open {
            println!();
            self.line_open = false;
        }
    }
}

fn flush() {
    // Nothing useful to do if stdout is gone.
    let _ = io::stdout().flush();
}

/// Run `work`, abandoning it on Ctrl-C. Dropping the future stops any
/// in-flight request and further frame scheduling.
pub async fn until_interrupted<T>(work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::pin!(work);
    tokio::select! {
        result = &mut work => result,
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => anyhow::bail!("interrupted"),
            Err(e) => {
                tracing::warn!("cannot listen for Ctrl-C: {e}");
                work.await
            }
        },
    }
}
