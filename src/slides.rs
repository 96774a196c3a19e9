//! Seamless-loop slide controller for the cover-flow variant.
//!
//! The window of slides only ever moves forward. Three copies of the
//! originals are laid out at start (lead, original, trail) and the view is
//! centered on the first original. Whenever the index gets close to the last
//! resident slide another batch is appended ahead of it, so the loop boundary
//! is never crossed by jumping back. Growth is bounded by re-homing: once
//! more than [`RESIDENT_BATCHES`] batches are resident the leading batch is
//! dropped and the track offset compensated, leaving every remaining slide
//! exactly where it was on screen.
//!
//! The controller is pure state. Timers belong to the caller
//! (`preview::driver` natively, the generated script in the embed).

use std::collections::VecDeque;

use serde::Serialize;

/// An extension is scheduled when `current + LOOKAHEAD >= slide_count`.
pub const LOOKAHEAD: usize = 2;

/// Resident slides are capped at this many batches of originals.
pub const RESIDENT_BATCHES: usize = 5;

/// Slide widths closer than this are treated as unchanged on resize.
pub const RESIZE_TOLERANCE_PX: f64 = 1.0;

/// Width of one slide (including its side margins) for a container width.
pub fn slide_width_for(container_width: f64) -> f64 {
    container_width / 1.4 + (3.0 * container_width) / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideState {
    Idle,
    Settled,
    Transitioning,
}

/// Which copy of the originals a slide belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    Lead,
    Original,
    Trail,
    Extension,
}

impl Section {
    pub fn name(self) -> &'static str {
        match self {
            Section::Lead => "lead",
            Section::Original => "original",
            Section::Trail => "trail",
            Section::Extension => "extension",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlideEntry {
    /// Position in the ever-growing logical sequence.
    pub logical_index: usize,
    /// Which original image this slide shows.
    pub original_index: usize,
    pub section: Section,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// No originals: nothing to animate, no timer should be started.
    NoSlides,
    /// The container has no width yet; call `start` again later.
    AwaitingLayout,
    Started,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    NotRunning,
    /// A transition is still in flight.
    Busy,
    /// The container measured zero width; this cycle is skipped.
    NoLayout,
    Advanced {
        current_index: usize,
        extension_scheduled: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishOutcome {
    pub extended: bool,
    pub rehomed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    Ignored,
    /// Slide width within tolerance; only the centering offset moved.
    Kept,
    /// Slide width changed; the controller was reset and restarted.
    Rebuilt,
}

#[derive(Debug, Clone)]
pub struct SlideController {
    original_count: usize,
    step_ms: u32,
    state: SlideState,
    running: bool,
    current_index: usize,
    slide_count: usize,
    base: usize,
    resident: VecDeque<SlideEntry>,
    container_width: f64,
    slide_width: f64,
    offset: f64,
    extension_pending: bool,
}

impl SlideController {
    pub fn new(original_count: usize, step_ms: u32) -> Self {
        Self {
            original_count,
            step_ms,
            state: SlideState::Idle,
            running: false,
            current_index: 0,
            slide_count: 0,
            base: 0,
            resident: VecDeque::new(),
            container_width: 0.0,
            slide_width: 0.0,
            offset: 0.0,
            extension_pending: false,
        }
    }

    pub fn start(&mut self, container_width: f64) -> StartOutcome {
        let n = self.original_count;
        if n == 0 {
            return StartOutcome::NoSlides;
        }
        if container_width <= 0.0 {
            tracing::warn!("cover-flow container has no width yet, waiting for layout");
            return StartOutcome::AwaitingLayout;
        }

        self.resident.clear();
        for (section_no, section) in [Section::Lead, Section::Original, Section::Trail]
            .into_iter()
            .enumerate()
        {
            for original_index in 0..n {
                self.resident.push_back(SlideEntry {
                    logical_index: section_no * n + original_index,
                    original_index,
                    section,
                });
            }
        }
        self.base = 0;
        self.slide_count = 3 * n;
        self.current_index = n;
        self.extension_pending = false;
        self.container_width = container_width;
        self.slide_width = slide_width_for(container_width);
        self.state = SlideState::Settled;
        self.running = true;
        self.recenter();
        StartOutcome::Started
    }

    /// Stop stepping. The resident slides stay where they are.
    pub fn stop(&mut self) {
        self.running = false;
        self.state = SlideState::Idle;
        self.extension_pending = false;
    }

    pub fn next_slide(&mut self, container_width: f64) -> StepOutcome {
        if !self.running {
            return StepOutcome::NotRunning;
        }
        if self.state == SlideState::Transitioning {
            return StepOutcome::Busy;
        }
        if container_width <= 0.0 {
            tracing::warn!("cover-flow container measured zero width, skipping step");
            return StepOutcome::NoLayout;
        }

        self.container_width = container_width;
        self.current_index += 1;
        self.extension_pending = self.current_index + LOOKAHEAD >= self.slide_count;
        self.state = SlideState::Transitioning;
        self.recenter();
        StepOutcome::Advanced {
            current_index: self.current_index,
            extension_scheduled: self.extension_pending,
        }
    }

    /// Called once the visual transition has run its course. Appends the
    /// scheduled batch, then re-homes if the resident buffer is over its cap.
    pub fn finish_transition(&mut self) -> FinishOutcome {
        if self.state != SlideState::Transitioning {
            return FinishOutcome::default();
        }
        self.state = SlideState::Settled;

        let extended = std::mem::take(&mut self.extension_pending);
        if extended {
            self.append_batch();
        }
        let rehomed = self.rehome();
        FinishOutcome { extended, rehomed }
    }

    /// Drop the leading batch when more than the cap is resident. Only runs
    /// between transitions. Every remaining slide keeps its on-screen x.
    pub fn rehome(&mut self) -> bool {
        if self.state == SlideState::Transitioning {
            return false;
        }
        let n = self.original_count;
        if n == 0 || self.resident.len() <= RESIDENT_BATCHES * n {
            return false;
        }
        self.resident.drain(..n);
        self.base += n;
        self.recenter();
        tracing::debug!(base = self.base, resident = self.resident.len(), "re-homed slides");
        true
    }

    pub fn resize(&mut self, container_width: f64) -> ResizeOutcome {
        if container_width <= 0.0 {
            return ResizeOutcome::Ignored;
        }
        let width = slide_width_for(container_width);
        if self.running && (width - self.slide_width).abs() <= RESIZE_TOLERANCE_PX {
            self.container_width = container_width;
            self.recenter();
            return ResizeOutcome::Kept;
        }

        let (n, step) = (self.original_count, self.step_ms);
        *self = SlideController::new(n, step);
        match self.start(container_width) {
            StartOutcome::Started => ResizeOutcome::Rebuilt,
            _ => ResizeOutcome::Ignored,
        }
    }

    fn append_batch(&mut self) {
        let start = self.slide_count;
        for original_index in 0..self.original_count {
            self.resident.push_back(SlideEntry {
                logical_index: start + original_index,
                original_index,
                section: Section::Extension,
            });
        }
        self.slide_count += self.original_count;
    }

    fn recenter(&mut self) {
        let position = (self.current_index - self.base) as f64;
        self.offset = (self.container_width - self.slide_width) / 2.0 - position * self.slide_width;
    }

    /// On-screen x of a resident slide's left edge, or `None` once it has
    /// been re-homed away.
    pub fn slide_x(&self, logical_index: usize) -> Option<f64> {
        if logical_index < self.base || logical_index >= self.base + self.resident.len() {
            return None;
        }
        Some(self.offset + (logical_index - self.base) as f64 * self.slide_width)
    }

    /// The original image under the center of the view.
    pub fn active_original(&self) -> Option<usize> {
        if self.original_count == 0 || self.resident.is_empty() {
            return None;
        }
        Some(self.current_index % self.original_count)
    }

    pub fn state(&self) -> SlideState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn base_index(&self) -> usize {
        self.base
    }

    pub fn resident(&self) -> &VecDeque<SlideEntry> {
        &self.resident
    }

    pub fn original_count(&self) -> usize {
        self.original_count
    }

    pub fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// Takes effect from the next step; the window is left alone.
    pub fn set_step_ms(&mut self, step_ms: u32) {
        self.step_ms = step_ms;
    }

    pub fn slide_width(&self) -> f64 {
        self.slide_width
    }

    /// Track translation relative to the first resident slide.
    pub fn offset(&self) -> f64 {
        self.offset
    }
}
