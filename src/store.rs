//! Carousel state store: the image list, the settings, the loading flag and
//! the single user-visible error, plus every operation that changes them.
//!
//! Probe-loads are split in two so the caller decides where the await
//! happens: [`CarouselStore::begin_load`] validates and hands out a ticket,
//! [`CarouselStore::finish_load`] applies the outcome. Tickets are ordered;
//! an outcome that arrives after a newer load was already accepted is
//! dropped as stale.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::embed;
use crate::error::{LoadFailure, LoopError, Result};
use crate::image::{parse_image_url, ImageId, ImageRef};
use crate::preview::{PreviewChange, PreviewRenderer};
use crate::settings::{AnimationSettings, SettingsPatch, Variant};
use crate::timing::{derive_timing, DerivedTiming, Locale};

/// How long a probe may take before it counts as failed.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CarouselState {
    pub images: Vec<ImageRef>,
    pub settings: AnimationSettings,
    /// True only while the most recently issued probe is in flight.
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Proof that a URL passed validation, ordered by issue time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    seq: u64,
    url: Url,
}

impl ProbeTicket {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadResolution {
    Accepted(ImageId),
    Rejected(LoopError),
    /// A newer load already landed; this outcome changed nothing.
    Stale,
}

#[derive(Debug)]
pub struct CarouselStore {
    variant: Variant,
    state: CarouselState,
    last_issued: u64,
    last_accepted: u64,
}

impl CarouselStore {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            state: CarouselState {
                settings: AnimationSettings::for_variant(variant),
                ..CarouselState::default()
            },
            last_issued: 0,
            last_accepted: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn state(&self) -> &CarouselState {
        &self.state
    }

    pub fn timing(&self) -> DerivedTiming {
        derive_timing(self.variant, &self.state.settings)
    }

    pub fn speed_label(&self, locale: Locale) -> &'static str {
        self.timing().label.text(locale)
    }

    /// Validate `raw` and mark a probe as in flight.
    pub fn begin_load(&mut self, raw: &str) -> Result<ProbeTicket> {
        let url = self.admit(raw).map_err(|e| self.fail(e))?;
        self.last_issued += 1;
        self.state.is_loading = true;
        self.state.error = None;
        tracing::debug!(%url, ticket = self.last_issued, "probe started");
        Ok(ProbeTicket {
            seq: self.last_issued,
            url,
        })
    }

    /// Apply a probe outcome.
    pub fn finish_load(
        &mut self,
        ticket: ProbeTicket,
        outcome: std::result::Result<(), LoadFailure>,
    ) -> LoadResolution {
        if ticket.seq == self.last_issued {
            self.state.is_loading = false;
        }
        if ticket.seq < self.last_accepted {
            tracing::warn!(url = %ticket.url, ticket = ticket.seq, "ignoring stale probe outcome");
            return LoadResolution::Stale;
        }
        let superseded = ticket.seq < self.last_issued;

        if let Err(failure) = outcome {
            let err = LoopError::ImageLoadFailure(failure);
            tracing::warn!(url = %ticket.url, "{err}");
            if !superseded {
                self.state.error = Some(err.to_string());
            }
            return LoadResolution::Rejected(err);
        }

        // the list may have filled up while the probe was in flight
        if let Err(err) = self.check_capacity(&ticket.url) {
            if superseded {
                tracing::warn!(url = %ticket.url, "{err}");
                return LoadResolution::Rejected(err);
            }
            return LoadResolution::Rejected(self.fail(err));
        }

        self.last_accepted = ticket.seq;
        let id = self.insert(ticket.url);
        LoadResolution::Accepted(id)
    }

    /// Probe `raw` and add it on success. The probe is raced against
    /// [`PROBE_TIMEOUT`]. Returns whether the image was added.
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn load_image_from_url<P>(&mut self, raw: &str, probe: &P) -> bool
    where
        P: crate::probe::ImageProbe + ?Sized,
    {
        let ticket = match self.begin_load(raw) {
            Ok(ticket) => ticket,
            Err(_) => return false,
        };
        let outcome = crate::probe::probe_with_timeout(probe, ticket.url(), PROBE_TIMEOUT).await;
        matches!(self.finish_load(ticket, outcome), LoadResolution::Accepted(_))
    }

    /// Add an image without probing it, e.g. one listed in a project file.
    pub fn insert_trusted(&mut self, raw: &str) -> Result<ImageId> {
        let url = self.admit(raw).map_err(|e| self.fail(e))?;
        Ok(self.insert(url))
    }

    pub fn remove_image(&mut self, id: &ImageId) -> bool {
        let before = self.state.images.len();
        self.state.images.retain(|img| img.id != *id);
        let removed = self.state.images.len() != before;
        if removed {
            self.state.error = None;
            tracing::info!(%id, remaining = self.state.images.len(), "image removed");
        }
        removed
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<()> {
        match self.state.settings.apply(patch) {
            Ok(()) => {
                self.state.error = None;
                let timing = self.timing();
                tracing::debug!(
                    cycle_ms = timing.cycle_duration_ms,
                    hold = timing.hold_fraction,
                    label = %timing.label,
                    "settings updated"
                );
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    /// Bring `renderer` in line with the current state.
    pub fn start_animation(&self, renderer: &mut PreviewRenderer) -> PreviewChange {
        renderer.sync(&self.state)
    }

    /// The embed code for the current state, or `None` while the variant
    /// has fewer images than it needs.
    pub fn generate_embed_code(&self) -> Option<String> {
        if self.state.images.len() < self.variant.min_images() {
            return None;
        }
        let timing = self.timing();
        Some(embed::synthesize(
            self.variant,
            &self.state.images,
            &self.state.settings,
            &timing,
        ))
    }

    fn admit(&self, raw: &str) -> Result<Url> {
        let url = parse_image_url(raw)?;
        self.check_capacity(&url)?;
        Ok(url)
    }

    fn check_capacity(&self, url: &Url) -> Result<()> {
        let variant = self.variant;
        if !variant.uses_images() {
            return Err(LoopError::CountLimitExceeded { max: 0 });
        }
        if variant.replaces_on_load() {
            return Ok(());
        }
        if self.state.images.len() >= variant.max_images() {
            return Err(LoopError::CountLimitExceeded {
                max: variant.max_images(),
            });
        }
        if self.state.images.iter().any(|img| img.source_url == *url) {
            return Err(LoopError::DuplicateImage);
        }
        Ok(())
    }

    fn insert(&mut self, url: Url) -> ImageId {
        let image = ImageRef::new(url);
        let id = image.id.clone();
        tracing::info!(%id, name = %image.display_name, url = %image.source_url, "image accepted");
        if self.variant.replaces_on_load() {
            self.state.images = vec![image];
        } else {
            self.state.images.push(image);
        }
        self.state.error = None;
        id
    }

    fn fail(&mut self, err: LoopError) -> LoopError {
        tracing::warn!("{err}");
        self.state.error = Some(err.to_string());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(i: usize) -> String {
        format!("https://example.com/{i}.jpg")
    }

    #[test]
    fn empty_input_adds_nothing() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        assert_eq!(store.begin_load("   ").unwrap_err(), LoopError::EmptyInput);
        assert!(store.state().images.is_empty());
        assert!(!store.state().is_loading);
        assert_eq!(store.state().error.as_deref(), Some("please enter an image URL"));
    }

    #[test]
    fn seventh_image_is_refused() {
        let mut store = CarouselStore::new(Variant::CoverFlow);
        for i in 0..6 {
            store.insert_trusted(&url(i)).unwrap();
        }
        let err = store.begin_load(&url(6)).unwrap_err();
        assert_eq!(err, LoopError::CountLimitExceeded { max: 6 });
        assert_eq!(store.state().images.len(), 6);
        assert!(!store.state().is_loading);
    }

    #[test]
    fn duplicates_are_refused_for_lists() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        store.insert_trusted(&url(1)).unwrap();
        assert_eq!(store.begin_load(&url(1)).unwrap_err(), LoopError::DuplicateImage);
    }

    #[test]
    fn single_image_variants_replace() {
        let mut store = CarouselStore::new(Variant::Rotation);
        let ticket = store.begin_load(&url(1)).unwrap();
        assert!(store.state().is_loading);
        assert!(matches!(store.finish_load(ticket, Ok(())), LoadResolution::Accepted(_)));
        let ticket = store.begin_load(&url(2)).unwrap();
        store.finish_load(ticket, Ok(()));
        assert_eq!(store.state().images.len(), 1);
        assert_eq!(store.state().images[0].src(), url(2));
        assert!(!store.state().is_loading);
    }

    #[test]
    fn falling_line_takes_no_images() {
        let mut store = CarouselStore::new(Variant::FallingLine);
        assert_eq!(
            store.begin_load(&url(1)).unwrap_err(),
            LoopError::CountLimitExceeded { max: 0 }
        );
        assert!(store.generate_embed_code().is_some());
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut store = CarouselStore::new(Variant::Loop);
        let older = store.begin_load(&url(1)).unwrap();
        let newer = store.begin_load(&url(2)).unwrap();
        assert!(matches!(store.finish_load(newer, Ok(())), LoadResolution::Accepted(_)));
        assert!(!store.state().is_loading);
        assert_eq!(store.finish_load(older, Ok(())), LoadResolution::Stale);
        assert_eq!(store.state().images[0].src(), url(2));
    }

    #[test]
    fn loading_tracks_the_newest_ticket() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        let first = store.begin_load(&url(1)).unwrap();
        let second = store.begin_load(&url(2)).unwrap();
        store.finish_load(first, Err(LoadFailure::Decode("bad".into())));
        assert!(store.state().is_loading);
        // a superseded failure does not surface
        assert!(store.state().error.is_none());
        store.finish_load(second, Ok(()));
        assert!(!store.state().is_loading);
        assert_eq!(store.state().images.len(), 1);
    }

    #[test]
    fn load_failure_keeps_images() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        store.insert_trusted(&url(1)).unwrap();
        let ticket = store.begin_load(&url(2)).unwrap();
        let resolution = store.finish_load(ticket, Err(LoadFailure::Decode("not an image".into())));
        assert!(matches!(resolution, LoadResolution::Rejected(ref e) if e.is_load_failure()));
        assert_eq!(store.state().images.len(), 1);
        assert!(store.state().error.as_deref().unwrap().starts_with("failed to load image"));
        assert!(!store.state().is_loading);
    }

    #[test]
    fn list_filled_during_probe() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        for i in 0..5 {
            store.insert_trusted(&url(i)).unwrap();
        }
        let a = store.begin_load(&url(10)).unwrap();
        let b = store.begin_load(&url(11)).unwrap();
        assert!(matches!(store.finish_load(a, Ok(())), LoadResolution::Accepted(_)));
        assert_eq!(
            store.finish_load(b, Ok(())),
            LoadResolution::Rejected(LoopError::CountLimitExceeded { max: 6 })
        );
        assert_eq!(store.state().images.len(), 6);
        assert!(!store.state().is_loading);
    }

    #[test]
    fn superseded_capacity_refusal_stays_quiet() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        for i in 0..5 {
            store.insert_trusted(&url(i)).unwrap();
        }
        let older = store.begin_load(&url(10)).unwrap();
        let newer = store.begin_load(&url(11)).unwrap();
        store.insert_trusted(&url(5)).unwrap();

        assert_eq!(
            store.finish_load(older, Ok(())),
            LoadResolution::Rejected(LoopError::CountLimitExceeded { max: 6 })
        );
        assert!(store.state().error.is_none());
        assert!(store.state().is_loading);

        assert_eq!(
            store.finish_load(newer, Ok(())),
            LoadResolution::Rejected(LoopError::CountLimitExceeded { max: 6 })
        );
        assert!(store.state().error.is_some());
        assert!(!store.state().is_loading);
        assert_eq!(store.state().images.len(), 6);
    }

    #[test]
    fn remove_and_settings_clear_error() {
        let mut store = CarouselStore::new(Variant::Slideshow);
        let id = store.insert_trusted(&url(1)).unwrap();
        let _ = store.begin_load("");
        assert!(store.state().error.is_some());
        assert!(store.remove_image(&id));
        assert!(store.state().error.is_none());
        assert!(!store.remove_image(&id));

        let bad = SettingsPatch {
            width: Some(5),
            ..SettingsPatch::default()
        };
        assert!(store.update_settings(&bad).is_err());
        assert!(store.state().error.as_deref().unwrap().starts_with("width:"));
        store.update_settings(&SettingsPatch::speed(1)).unwrap();
        assert!(store.state().error.is_none());
        // slideshow cycles on interval plus transition, whatever the speed
        assert_eq!(store.timing().cycle_duration_ms, 2600);
        assert_eq!(store.speed_label(Locale::En), "extremely slow");
    }

    #[test]
    fn embed_needs_the_floor() {
        let mut store = CarouselStore::new(Variant::CoverFlow);
        store.insert_trusted(&url(1)).unwrap();
        store.insert_trusted(&url(2)).unwrap();
        assert!(store.generate_embed_code().is_none());
        store.insert_trusted(&url(3)).unwrap();
        let code = store.generate_embed_code().unwrap();
        assert!(code.starts_with("<iframe"));

        let mut renderer = PreviewRenderer::new(Variant::CoverFlow);
        assert_eq!(store.start_animation(&mut renderer), PreviewChange::Built);
        assert_eq!(renderer.snapshot().unwrap().embed, code);
    }
}
