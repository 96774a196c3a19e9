//! Live preview renderer.
//!
//! Holds one [`PreviewSnapshot`] computed from a [`CarouselState`]: timing,
//! CSS custom properties and the embed code are derived together and stored
//! in a single assignment, so the preview and the copyable embed can never
//! disagree. A settings-only change restyles the running preview; a change
//! to the image set rebuilds it.

pub mod frame;

#[cfg(not(target_arch = "wasm32"))]
pub mod driver;

use std::time::Duration;

use serde::Serialize;

use crate::embed;
use crate::image::{ImageId, ImageRef};
use crate::settings::{AnimationSettings, Variant};
use crate::slides::{ResizeOutcome, SlideController, StartOutcome};
use crate::store::CarouselState;
use crate::timing::{derive_timing, DerivedTiming};

/// Everything one preview frame is computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewSnapshot {
    pub variant: Variant,
    pub images: Vec<ImageRef>,
    pub settings: AnimationSettings,
    pub timing: DerivedTiming,
    pub css_vars: Vec<(&'static str, String)>,
    pub embed: String,
}

impl PreviewSnapshot {
    fn compute(variant: Variant, images: &[ImageRef], settings: &AnimationSettings) -> Self {
        let timing = derive_timing(variant, settings);
        Self {
            variant,
            images: images.to_vec(),
            settings: settings.clone(),
            css_vars: css_vars(variant, settings, &timing),
            embed: embed::synthesize(variant, images, settings, &timing),
            timing,
        }
    }

    /// The custom properties as an inline `style` value.
    pub fn style_attribute(&self) -> String {
        self.css_vars
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn image_ids(&self) -> impl Iterator<Item = &ImageId> {
        self.images.iter().map(|img| &img.id)
    }
}

fn css_vars(
    variant: Variant,
    settings: &AnimationSettings,
    timing: &DerivedTiming,
) -> Vec<(&'static str, String)> {
    let mut vars = vec![("--cycle-duration", format!("{}ms", timing.cycle_duration_ms))];
    match variant {
        Variant::Loop => {
            vars.push(("--frame-width", format!("{}px", settings.width)));
            vars.push(("--frame-height", format!("{}px", settings.height)));
            vars.push(("--item-width", format!("{}px", settings.width)));
        }
        Variant::Rotation => {
            vars.push(("--frame-width", format!("{}px", settings.width)));
            vars.push(("--frame-height", format!("{}px", settings.width)));
        }
        Variant::FallingLine => {
            vars.push(("--line-thickness", format!("{}px", settings.line_thickness)));
            vars.push(("--line-length", format!("{}px", settings.line_length)));
            vars.push(("--line-color", settings.color.to_string()));
            vars.push(("--hold-fraction", format!("{:.3}", timing.hold_fraction)));
        }
        Variant::Slideshow => {
            vars.push(("--frame-width", format!("{}px", settings.width)));
            vars.push(("--frame-height", format!("{}px", settings.height)));
            vars.push(("--transition-duration", format!("{}ms", settings.transition_ms)));
        }
        Variant::CoverFlow => {
            vars.push(("--frame-width", format!("{}px", settings.width)));
            vars.push(("--frame-height", format!("{}px", settings.height)));
            vars.push(("--step-duration", format!("{}ms", settings.step_ms)));
        }
    }
    vars
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewChange {
    /// Below the variant's image floor; nothing is shown.
    Hidden,
    /// Built from scratch: new epoch, fresh slide state.
    Built,
    /// Same images, new settings: timing and embed replaced in place.
    Restyled,
    Unchanged,
}

/// Visual state of one preview frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VisualFrame {
    Loop { translate_x: f64 },
    Rotation { degrees: f64 },
    FallingLine { y: f64, height: f64 },
    Slideshow { active: usize },
    CoverFlow {
        offset: f64,
        current_index: usize,
        active_original: Option<usize>,
        transitioning: bool,
    },
}

#[derive(Debug)]
pub struct PreviewRenderer {
    variant: Variant,
    snapshot: Option<PreviewSnapshot>,
    epoch: u64,
    viewport_width: f64,
    slides: Option<SlideController>,
}

impl PreviewRenderer {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            snapshot: None,
            epoch: 0,
            viewport_width: 0.0,
            slides: None,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn snapshot(&self) -> Option<&PreviewSnapshot> {
        self.snapshot.as_ref()
    }

    /// Bumped on every rebuild. Frame loops restart their clock on change.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn slides(&self) -> Option<&SlideController> {
        self.slides.as_ref()
    }

    pub fn slides_mut(&mut self) -> Option<&mut SlideController> {
        self.slides.as_mut()
    }

    pub fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    /// Bring the preview in line with `state`.
    pub fn sync(&mut self, state: &CarouselState) -> PreviewChange {
        let variant = self.variant;
        if state.images.len() < variant.min_images() {
            let was_shown = self.snapshot.take().is_some();
            self.slides = None;
            if was_shown {
                tracing::debug!(%variant, images = state.images.len(), "preview hidden below image floor");
            }
            return PreviewChange::Hidden;
        }

        let same_images = self.snapshot.as_ref().is_some_and(|snap| {
            snap.images.len() == state.images.len()
                && snap.image_ids().zip(state.images.iter()).all(|(a, b)| *a == b.id)
        });

        if same_images {
            if let Some(snap) = &self.snapshot {
                if snap.settings == state.settings {
                    return PreviewChange::Unchanged;
                }
            }
            self.snapshot = Some(PreviewSnapshot::compute(variant, &state.images, &state.settings));
            if let Some(slides) = self.slides.as_mut() {
                slides.set_step_ms(state.settings.step_ms);
            }
            tracing::debug!(%variant, "preview restyled");
            return PreviewChange::Restyled;
        }

        self.snapshot = Some(PreviewSnapshot::compute(variant, &state.images, &state.settings));
        self.epoch += 1;
        self.slides = match variant {
            Variant::CoverFlow => {
                let mut slides = SlideController::new(state.images.len(), state.settings.step_ms);
                if self.viewport_width > 0.0 {
                    slides.start(self.viewport_width);
                }
                Some(slides)
            }
            _ => None,
        };
        tracing::debug!(%variant, epoch = self.epoch, images = state.images.len(), "preview built");
        PreviewChange::Built
    }

    /// Record the measured viewport width. Starts a cover-flow controller
    /// that was waiting for layout, or rebuilds it on a real size change.
    pub fn set_viewport(&mut self, width: f64) -> ResizeOutcome {
        if width <= 0.0 {
            return ResizeOutcome::Ignored;
        }
        self.viewport_width = width;
        match self.slides.as_mut() {
            Some(slides) if !slides.is_running() => match slides.start(width) {
                StartOutcome::Started => ResizeOutcome::Rebuilt,
                _ => ResizeOutcome::Ignored,
            },
            Some(slides) => slides.resize(width),
            None => ResizeOutcome::Ignored,
        }
    }

    /// Visual state `elapsed` after the last rebuild. `None` while hidden.
    pub fn frame_at(&self, elapsed: Duration) -> Option<VisualFrame> {
        let snap = self.snapshot.as_ref()?;
        let ms = elapsed.as_secs_f64() * 1000.0;
        let cycle = snap.timing.cycle_duration_ms;

        let visual = match snap.variant {
            Variant::Loop => VisualFrame::Loop {
                translate_x: frame::loop_translate(ms, cycle, snap.settings.width),
            },
            Variant::Rotation => VisualFrame::Rotation {
                degrees: frame::rotation_degrees(ms, cycle),
            },
            Variant::FallingLine => {
                let (y, height) =
                    frame::falling_line(ms, cycle, snap.timing.hold_fraction, snap.settings.line_length);
                VisualFrame::FallingLine { y, height }
            }
            Variant::Slideshow => VisualFrame::Slideshow {
                active: frame::slideshow_active(ms, cycle, snap.images.len()),
            },
            Variant::CoverFlow => {
                let slides = self.slides.as_ref()?;
                VisualFrame::CoverFlow {
                    offset: slides.offset(),
                    current_index: slides.current_index(),
                    active_original: slides.active_original(),
                    transitioning: slides.state() == crate::slides::SlideState::Transitioning,
                }
            }
        };
        Some(visual)
    }
}
