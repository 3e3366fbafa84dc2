//! Animated score gauge.
//!
//! Eases a resolved score from zero up to its final value over a fixed
//! window. Every step is computed from the elapsed wall-clock time handed
//! in by a [`FrameClock`], never from a frame counter, so tests can drive
//! the animation with synthetic timestamps.
//!
//! The qualitative tier, label and colour are taken from the *target*
//! score once, when the target is set, so they do not flicker while the
//! number rises.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::model::{PerformanceTier, Score, TierColor};

/// Length of one full rise from zero to the target.
pub const ANIMATION_DURATION: Duration = Duration::from_millis(1500);

/// Default spacing between frames (~60 fps).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Cubic ease-out: fast start, gentle landing. Monotonic on `[0, 1]`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(3)
}

/// One sample of the animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    /// Linear time progress in `[0, 1]`.
    pub elapsed_ratio: f64,
    /// The value to display for this frame.
    pub display_score: f64,
    /// Set on the single frame that lands exactly on the target.
    pub is_final: bool,
}

// ---------------------------------------------------------------------------
// Single animation
// ---------------------------------------------------------------------------

/// A single rise towards one target score.
///
/// The first call to [`tick`](Self::tick) fixes the start time. Once time
/// progress reaches 1 the animation emits one final frame equal to the target
/// and then stays finished.
#[derive(Debug, Clone)]
pub struct GaugeAnimation {
    target: f64,
    duration: Duration,
    started_at: Option<Duration>,
    last_elapsed: Duration,
    finished: bool,
}

impl GaugeAnimation {
    /// An animation over the standard [`ANIMATION_DURATION`].
    pub fn new(target: Score) -> Self {
        Self::with_duration(target, ANIMATION_DURATION)
    }

    /// Non-finite targets animate towards 0.
    pub fn with_duration(target: Score, duration: Duration) -> Self {
        let target = if target.is_finite() { target.value() } else { 0.0 };
        Self {
            target,
            duration,
            started_at: None,
            last_elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// The value the animation settles on.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// True once the final frame has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `now` and produce the frame for it, or `None` once the
    /// final frame has been emitted.
    pub fn tick(&mut self, now: Duration) -> Option<AnimationFrame> {
        if self.finished {
            return None;
        }

        let start = *self.started_at.get_or_insert(now);
        // A clock that steps backwards must not make the gauge fall.
        let elapsed = now.saturating_sub(start).max(self.last_elapsed);
        self.last_elapsed = elapsed;

        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        if progress < 1.0 {
            return Some(AnimationFrame {
                elapsed_ratio: progress,
                display_score: ease_out_cubic(progress) * self.target,
                is_final: false,
            });
        }

        // Land on the authoritative value, not the eased approximation.
        self.finished = true;
        Some(AnimationFrame {
            elapsed_ratio: 1.0,
            display_score: self.target,
            is_final: true,
        })
    }

    /// Lazily turn a timestamp sequence into frames, stopping after the
    /// final frame.
    pub fn frames<I>(self, timestamps: I) -> Frames<I::IntoIter>
    where
        I: IntoIterator<Item = Duration>,
    {
        Frames {
            animation: self,
            timestamps: timestamps.into_iter(),
        }
    }
}

/// Iterator returned by [`GaugeAnimation::frames`].
#[derive(Debug)]
pub struct Frames<I> {
    animation: GaugeAnimation,
    timestamps: I,
}

impl<I> Iterator for Frames<I>
where
    I: Iterator<Item = Duration>,
{
    type Item = AnimationFrame;

    fn next(&mut self) -> Option<AnimationFrame> {
        if self.animation.is_finished() {
            return None;
        }
        let now = self.timestamps.next()?;
        self.animation.tick(now)
    }
}

// ---------------------------------------------------------------------------
// Display surface
// ---------------------------------------------------------------------------

/// What the renderer needs for one frame of the dial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeReading {
    /// Unrounded animated value.
    pub display_score: f64,
    /// The authoritative score the gauge is rising towards.
    pub target: Score,
    /// Tier of `target`, fixed for the whole animation.
    pub tier: PerformanceTier,
    pub elapsed_ratio: f64,
    pub is_final: bool,
}

impl GaugeReading {
    /// Numeric label: nearest integer, halves rounding up.
    pub fn rounded(&self) -> i64 {
        (self.display_score + 0.5).floor() as i64
    }

    /// Fill of the ring or bar, in percent of a 0–100 scale. Not clamped.
    pub fn fill_percent(&self) -> f64 {
        self.display_score
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }

    pub fn color(&self) -> TierColor {
        self.tier.color()
    }
}

/// The gauge a renderer draws from.
///
/// Owns at most one [`GaugeAnimation`]. Setting a target always restarts
/// from zero and bumps the generation, so frame callbacks scheduled for an
/// earlier target are ignored instead of stacking.
#[derive(Debug, Clone)]
pub struct ScoreGauge {
    duration: Duration,
    generation: u64,
    animation: Option<GaugeAnimation>,
    current: Option<GaugeReading>,
}

impl Default for ScoreGauge {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoreGauge {
    /// An empty gauge using the standard animation length.
    pub fn new() -> Self {
        Self::with_duration(ANIMATION_DURATION)
    }

    /// An empty gauge whose rises take `duration`.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            generation: 0,
            animation: None,
            current: None,
        }
    }

    /// Start a new rise towards `score` and return its generation.
    pub fn set_target(&mut self, score: Score) -> u64 {
        self.generation += 1;
        self.animation = Some(GaugeAnimation::with_duration(score, self.duration));
        self.current = Some(GaugeReading {
            display_score: 0.0,
            target: score,
            tier: score.tier(),
            elapsed_ratio: 0.0,
            is_final: false,
        });
        self.generation
    }

    /// Generation of the current target.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while a rise is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(|a| !a.is_finished())
    }

    /// The last rendered reading, if a target is set.
    pub fn reading(&self) -> Option<GaugeReading> {
        self.current
    }

    /// Advance the current animation to `now`.
    pub fn tick(&mut self, now: Duration) -> Option<GaugeReading> {
        self.tick_for(self.generation, now)
    }

    /// Advance only if `generation` is still the current one.
    pub fn tick_for(&mut self, generation: u64, now: Duration) -> Option<GaugeReading> {
        if generation != self.generation {
            tracing::trace!(generation, current = self.generation, "dropping stale frame");
            return None;
        }
        let frame = self.animation.as_mut()?.tick(now)?;
        let reading = self.current.as_mut()?;
        reading.display_score = frame.display_score;
        reading.elapsed_ratio = frame.elapsed_ratio;
        reading.is_final = frame.is_final;
        Some(*reading)
    }

    /// Release the display surface. No further frames are produced until
    /// the next [`set_target`](Self::set_target).
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.animation = None;
        self.current = None;
    }
}

/// Ring geometry of the dial, in the same units as `size`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DialGeometry {
    pub size: f64,
}

impl DialGeometry {
    pub const STROKE_WIDTH: f64 = 12.0;

    pub fn new(size: f64) -> Self {
        Self { size }
    }

    pub fn radius(&self) -> f64 {
        self.size / 2.0 - 20.0
    }

    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius()
    }

    /// Stroke dash offset that leaves `display_score` percent of the ring drawn.
    pub fn dash_offset(&self, display_score: f64) -> f64 {
        let circumference = self.circumference();
        circumference - (display_score / 100.0) * circumference
    }
}

// ---------------------------------------------------------------------------
// Frame pacing
// ---------------------------------------------------------------------------

/// A cooperative per-frame scheduler.
#[async_trait]
pub trait FrameClock: Send {
    /// Wait for the next repaint and return its timestamp. `None` means the
    /// display surface is gone and no more frames should be scheduled.
    async fn next_frame(&mut self) -> Option<Duration>;
}

/// Frame clock backed by `tokio::time::interval`.
pub struct IntervalClock {
    interval: Interval,
    origin: Instant,
    teardown: Option<oneshot::Receiver<()>>,
    closed: bool,
}

impl IntervalClock {
    /// Tick every `period`. A zero period falls back to [`DEFAULT_FRAME_INTERVAL`].
    pub fn new(period: Duration) -> Self {
        let period = if period.is_zero() {
            DEFAULT_FRAME_INTERVAL
        } else {
            period
        };
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            origin: Instant::now(),
            teardown: None,
            closed: false,
        }
    }

    /// Stop producing frames once `signal` fires or its sender is dropped.
    pub fn until(mut self, signal: oneshot::Receiver<()>) -> Self {
        self.teardown = Some(signal);
        self
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) -> Option<Duration> {
        if self.closed {
            return None;
        }
        match self.teardown.as_mut() {
            Some(signal) => {
                tokio::select! {
                    biased;
                    _ = signal => {
                        self.closed = true;
                        None
                    }
                    tick = self.interval.tick() => Some(tick.duration_since(self.origin)),
                }
            }
            None => {
                let tick = self.interval.tick().await;
                Some(tick.duration_since(self.origin))
            }
        }
    }
}

/// How an [`animate`] run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The final frame was rendered.
    Completed,
    /// The clock ended first; the gauge has been torn down.
    TornDown,
}

/// Drive the gauge's current animation to rest, calling `render` once per
/// frame.
pub async fn animate<C, F>(gauge: &mut ScoreGauge, clock: &mut C, mut render: F) -> AnimationOutcome
where
    C: FrameClock + ?Sized,
    F: FnMut(&GaugeReading),
{
    let generation = gauge.generation();
    while gauge.is_animating() {
        let Some(now) = clock.next_frame().await else {
            gauge.teardown();
            return AnimationOutcome::TornDown;
        };
        match gauge.tick_for(generation, now) {
            Some(reading) => render(&reading),
            None => break,
        }
    }
    AnimationOutcome::Completed
}
