//! YAML project files.
//!
//! ```yaml
//! variant: cover-flow
//! locale: en
//! images:
//!   - https://example.com/a.jpg
//! settings:
//!   speed: 30
//!   step_ms: 3000
//! ```

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::image::parse_image_url;
use crate::settings::{AnimationSettings, SettingsPatch, Variant};
use crate::store::CarouselStore;
use crate::timing::Locale;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    pub variant: Variant,
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub settings: SettingsPatch,
}

impl Project {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            locale: Locale::default(),
            images: Vec::new(),
            settings: SettingsPatch::default(),
        }
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading project file {}", path.display()))?;
        Self::from_yaml_str(&source).with_context(|| format!("parsing {}", path.display()))
    }

    /// Check everything a store would refuse, without building one.
    pub fn validate(&self) -> Result<()> {
        let variant = self.variant;
        let max = variant.max_images();
        ensure!(
            self.images.len() <= max,
            "{variant} takes at most {max} image(s), {} listed",
            self.images.len()
        );
        ensure!(
            self.images.len() >= variant.min_images(),
            "{variant} needs at least {} image(s) to render, {} listed",
            variant.min_images(),
            self.images.len()
        );

        let mut seen = Vec::with_capacity(self.images.len());
        for (i, raw) in self.images.iter().enumerate() {
            let url = parse_image_url(raw).with_context(|| format!("images[{i}]"))?;
            ensure!(!seen.contains(&url), "images[{i}]: {url} is listed twice");
            seen.push(url);
        }

        AnimationSettings::for_variant(variant)
            .apply(&self.settings)
            .context("settings")?;
        Ok(())
    }

    /// A store holding this project's images and settings.
    pub fn into_store(self) -> Result<CarouselStore> {
        let mut store = CarouselStore::new(self.variant);
        store.update_settings(&self.settings).context("settings")?;
        for (i, raw) in self.images.iter().enumerate() {
            store
                .insert_trusted(raw)
                .with_context(|| format!("images[{i}]"))?;
        }
        Ok(store)
    }
}
