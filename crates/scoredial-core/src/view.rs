//! Rendering surface.
//!
//! Maps the workflow state plus the gauge's current reading onto what a
//! page shell shows: a placeholder, a loading indicator, an error, or the
//! animated result.

use crate::gauge::{FrameClock, GaugeReading, ScoreGauge};
use crate::model::PredictionState;
use crate::workflow::StateReceiver;

/// What to show for the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionView<'a> {
    /// Nothing submitted yet.
    Placeholder,
    Loading,
    Error(&'a str),
    Result {
        reading: GaugeReading,
        suggestions: &'a [String],
    },
}

impl<'a> PredictionView<'a> {
    /// Build the view for `state`. A `Succeeded` state without a reading
    /// (gauge not yet targeted) renders as the placeholder.
    pub fn of(state: &'a PredictionState, reading: Option<GaugeReading>) -> Self {
        match state {
            PredictionState::Idle => PredictionView::Placeholder,
            PredictionState::Submitting => PredictionView::Loading,
            PredictionState::Failed { message } => PredictionView::Error(message),
            PredictionState::Succeeded { suggestions, .. } => match reading {
                Some(reading) => PredictionView::Result {
                    reading,
                    suggestions,
                },
                None => PredictionView::Placeholder,
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PredictionView::Loading)
    }

    pub fn error(&self) -> Option<&'a str> {
        match self {
            PredictionView::Error(message) => Some(*message),
            _ => None,
        }
    }

    pub fn reading(&self) -> Option<&GaugeReading> {
        match self {
            PredictionView::Result { reading, .. } => Some(reading),
            _ => None,
        }
    }
}

/// Render the workflow until it comes to rest.
///
/// Calls `render` on every state change and on every gauge frame. A
/// `Succeeded` state restarts the gauge from zero; a state change during the
/// animation abandons it. Returns the last state seen once the prediction is
/// resolved and the gauge has landed, when the controller goes away, or when
/// the clock ends.
pub async fn follow<C, F>(
    states: &mut StateReceiver,
    gauge: &mut ScoreGauge,
    clock: &mut C,
    mut render: F,
) -> PredictionState
where
    C: FrameClock + ?Sized,
    F: FnMut(PredictionView<'_>),
{
    let mut open = true;
    loop {
        let state = states.borrow_and_update().clone();

        let Some(score) = state.score() else {
            render(PredictionView::of(&state, None));
            if state.is_resolved() || !open || states.changed().await.is_err() {
                return state;
            }
            continue;
        };

        let generation = gauge.set_target(score);
        render(PredictionView::of(&state, gauge.reading()));

        let mut superseded = false;
        while gauge.is_animating() {
            tokio::select! {
                changed = states.changed(), if open => match changed {
                    Ok(()) => {
                        superseded = true;
                        break;
                    }
                    Err(_) => open = false,
                },
                now = clock.next_frame() => match now {
                    Some(now) => {
                        if let Some(reading) = gauge.tick_for(generation, now) {
                            render(PredictionView::of(&state, Some(reading)));
                        }
                    }
                    None => {
                        gauge.teardown();
                        return state;
                    }
                },
            }
        }

        if !superseded {
            return state;
        }
    }
}
