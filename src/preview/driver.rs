//! Timer-driven preview loops.
//!
//! The frame loop samples [`PreviewRenderer::frame_at`] on a fixed tick and
//! publishes the result on a `watch` channel. Cover-flow additionally gets
//! a step loop that advances the slide controller every `step_ms` and
//! settles it once the transition has had `step_ms` to run. The period is
//! re-read each step, so a settings change applies without a restart. Each loop lives
//! in a [`TaskSlot`], so starting one always stops its predecessor.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::{PreviewRenderer, VisualFrame};
use crate::settings::Variant;
use crate::slides::{ResizeOutcome, StepOutcome};

/// Default sampling period of the frame loop (~60 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Holds at most one running task.
#[derive(Debug, Default)]
pub struct TaskSlot {
    handle: Option<JoinHandle<()>>,
}

impl TaskSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort whatever is running, then take ownership of `handle`.
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.abort();
        self.handle = Some(handle);
    }

    pub fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.abort();
    }
}

pub type SharedRenderer = Arc<Mutex<PreviewRenderer>>;

pub struct PreviewDriver {
    renderer: SharedRenderer,
    frames: watch::Sender<Option<VisualFrame>>,
    frame_interval: Duration,
    frame_task: TaskSlot,
    step_task: TaskSlot,
}

impl PreviewDriver {
    pub fn new(renderer: SharedRenderer) -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            renderer,
            frames,
            frame_interval: FRAME_INTERVAL,
            frame_task: TaskSlot::new(),
            step_task: TaskSlot::new(),
        }
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<VisualFrame>> {
        self.frames.subscribe()
    }

    /// Start (or restart) every loop the current variant needs.
    pub fn start(&mut self) {
        self.frame_task.replace(tokio::spawn(frame_loop(
            Arc::clone(&self.renderer),
            self.frames.clone(),
            self.frame_interval,
        )));
        self.restart_steps();
    }

    pub fn stop(&mut self) {
        self.frame_task.abort();
        self.step_task.abort();
    }

    pub fn is_running(&self) -> bool {
        self.frame_task.is_active()
    }

    /// Forward a viewport measurement. A rebuild of the slide controller
    /// tears the step loop down and starts a fresh one.
    pub fn resize(&mut self, width: f64) -> ResizeOutcome {
        let outcome = match self.renderer.lock() {
            Ok(mut renderer) => renderer.set_viewport(width),
            Err(e) => {
                tracing::warn!("preview renderer lock poisoned: {e}");
                return ResizeOutcome::Ignored;
            }
        };
        if outcome == ResizeOutcome::Rebuilt {
            tracing::debug!(width, "slide controller rebuilt, restarting step loop");
            self.restart_steps();
        }
        outcome
    }

    /// Call after the renderer was rebuilt with a new image set.
    pub fn restart_steps(&mut self) {
        if current_step(&self.renderer).is_some() {
            self.step_task
                .replace(tokio::spawn(step_loop(Arc::clone(&self.renderer))));
        } else {
            self.step_task.abort();
        }
    }
}

/// The cover-flow step period, read fresh so settings changes apply to the
/// running loop. `None` once there is nothing to step.
fn current_step(renderer: &SharedRenderer) -> Option<Duration> {
    let renderer = renderer.lock().ok()?;
    if renderer.variant() != Variant::CoverFlow {
        return None;
    }
    renderer
        .slides()
        .map(|slides| Duration::from_millis(slides.step_ms() as u64))
}

async fn frame_loop(
    renderer: SharedRenderer,
    frames: watch::Sender<Option<VisualFrame>>,
    period: Duration,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut epoch = None;
    let mut started = Instant::now();

    loop {
        ticker.tick().await;
        let visual = {
            let Ok(renderer) = renderer.lock() else {
                tracing::warn!("preview renderer lock poisoned, stopping frame loop");
                return;
            };
            if epoch != Some(renderer.epoch()) {
                epoch = Some(renderer.epoch());
                started = Instant::now();
            }
            renderer.frame_at(started.elapsed())
        };
        tracing::trace!(?visual, "frame");
        frames.send_replace(visual);
    }
}

async fn step_loop(renderer: SharedRenderer) {
    let Some(step) = current_step(&renderer) else {
        return;
    };
    time::sleep(step).await;

    loop {
        let advanced = {
            let Ok(mut renderer) = renderer.lock() else {
                return;
            };
            let width = renderer.viewport_width();
            match renderer.slides_mut().map(|slides| slides.next_slide(width)) {
                Some(StepOutcome::Advanced { current_index, extension_scheduled }) => {
                    tracing::debug!(current_index, extension_scheduled, "cover-flow step");
                    true
                }
                Some(_) => false,
                None => return,
            }
        };

        // the transition runs for one step; the next step starts as it settles
        let Some(step) = current_step(&renderer) else {
            return;
        };
        time::sleep(step).await;
        if !advanced {
            continue;
        }

        let Ok(mut renderer) = renderer.lock() else {
            return;
        };
        if let Some(slides) = renderer.slides_mut() {
            let outcome = slides.finish_transition();
            if outcome.extended {
                tracing::debug!(slide_count = slides.slide_count(), "appended slide batch");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageRef;
    use crate::preview::PreviewChange;
    use crate::settings::{AnimationSettings, SettingsPatch};
    use crate::store::CarouselState;
    use url::Url;

    fn cover_flow_renderer(n: usize) -> SharedRenderer {
        cover_flow_with_state(n).0
    }

    fn cover_flow_with_state(n: usize) -> (SharedRenderer, CarouselState) {
        let mut renderer = PreviewRenderer::new(Variant::CoverFlow);
        let state = CarouselState {
            images: (0..n)
                .map(|i| ImageRef::new(Url::parse(&format!("https://example.com/{i}.jpg")).unwrap()))
                .collect(),
            settings: AnimationSettings::for_variant(Variant::CoverFlow),
            is_loading: false,
            error: None,
        };
        renderer.sync(&state);
        (Arc::new(Mutex::new(renderer)), state)
    }

    #[tokio::test(start_paused = true)]
    async fn task_slot_aborts_previous_task() {
        let mut slot = TaskSlot::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        slot.replace(tokio::spawn(async move {
            let _tx = tx;
            time::sleep(Duration::from_secs(60)).await;
        }));
        slot.replace(tokio::spawn(async { time::sleep(Duration::from_secs(60)).await }));
        // the sender is dropped only when the first task is torn down
        assert!(rx.await.is_err());
        assert!(slot.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cover_flow_steps_on_schedule() {
        let renderer = cover_flow_renderer(3);
        let mut driver = PreviewDriver::new(Arc::clone(&renderer));
        assert_eq!(driver.resize(1000.0), ResizeOutcome::Rebuilt);
        driver.start();

        // steps fire at 3000, 6000, ... 18000 ms; the sixth is still in flight
        time::sleep(Duration::from_millis(20_000)).await;
        {
            let renderer = renderer.lock().unwrap();
            let slides = renderer.slides().unwrap();
            assert_eq!(slides.current_index(), 9);
            assert_eq!(slides.slide_count(), 12);
        }
        driver.stop();
        assert!(!driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn step_change_reaches_running_loop() {
        let (renderer, mut state) = cover_flow_with_state(3);
        let mut driver = PreviewDriver::new(Arc::clone(&renderer));
        driver.resize(1000.0);
        driver.start();
        // let the loop pick up the 3000 ms step before it changes
        time::sleep(Duration::from_millis(1)).await;

        let faster = SettingsPatch {
            step_ms: Some(500),
            ..SettingsPatch::default()
        };
        state.settings.apply(&faster).unwrap();
        assert_eq!(renderer.lock().unwrap().sync(&state), PreviewChange::Restyled);

        // first step at 3000 ms, then every 500 ms: 3000, 3500, ... 5500
        time::sleep(Duration::from_millis(5_900)).await;
        {
            let renderer = renderer.lock().unwrap();
            let slides = renderer.slides().unwrap();
            assert_eq!(slides.step_ms(), 500);
            let index = slides.current_index();
            assert!((8..=10).contains(&index), "index {index}");
        }
        driver.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn frames_are_published() {
        let renderer = cover_flow_renderer(3);
        let mut driver = PreviewDriver::new(Arc::clone(&renderer))
            .with_frame_interval(Duration::from_millis(100));
        driver.resize(1000.0);
        let mut rx = driver.subscribe();
        driver.start();

        rx.changed().await.unwrap();
        let visual = rx.borrow_and_update().clone();
        assert!(matches!(visual, Some(VisualFrame::CoverFlow { current_index: 3, .. })));
    }
}
