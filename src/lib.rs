pub mod config;
pub mod embed;
pub mod error;
pub mod image;
pub mod preview;
pub mod settings;
pub mod slides;
pub mod store;
pub mod timing;

#[cfg(not(target_arch = "wasm32"))]
pub mod probe;
#[cfg(not(target_arch = "wasm32"))]
pub mod server;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::Project;
pub use embed::synthesize;
pub use error::{LoadFailure, LoopError};
pub use preview::PreviewRenderer;
pub use settings::{AnimationSettings, SettingsPatch, Variant};
pub use slides::SlideController;
pub use store::CarouselStore;
pub use timing::derive_timing;

/// Build a store from `project` and synthesize its embed code.
///
/// Fails when the project is invalid or has fewer images than its variant
/// needs to render.
pub fn render_project(project: &Project) -> anyhow::Result<String> {
    project.validate()?;
    let store = project.clone().into_store()?;
    store.generate_embed_code().ok_or_else(|| {
        anyhow::anyhow!(
            "{} needs at least {} image(s)",
            project.variant,
            project.variant.min_images()
        )
    })
}

/// One-line timing summary, e.g. for `loopreel check`.
pub fn describe_timing(variant: Variant, settings: &AnimationSettings, locale: timing::Locale) -> String {
    let timing = derive_timing(variant, settings);
    let mut line = format!(
        "{variant}: cycle {} ms, speed {} ({})",
        timing.cycle_duration_ms,
        settings.speed.get(),
        timing.label.text(locale),
    );
    if timing.hold_fraction < 1.0 {
        line.push_str(&format!(", hold fraction {:.3}", timing.hold_fraction));
    }
    line
}
