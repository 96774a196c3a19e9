//! WASM bindings for the embed generator.
//!
//! Exposes rendering and timing to a browser-side authoring form.
//! Build with: `wasm-pack build --target web --features wasm`

use wasm_bindgen::prelude::*;

use crate::settings::{AnimationSettings, SettingsPatch, Variant};
use crate::timing::{derive_timing, Locale, Speed};

fn parse_variant(variant: &str) -> Result<Variant, JsError> {
    variant.parse::<Variant>().map_err(|e| JsError::new(&e.to_string()))
}

fn parse_locale(locale: &str) -> Locale {
    match locale {
        "ja" => Locale::Ja,
        _ => Locale::En,
    }
}

/// Render the embed code for a project given as JSON (same shape as the
/// YAML project file).
///
/// Returns the markup on success, or throws a JS error on failure.
#[wasm_bindgen]
pub fn render_embed(project_json: &str) -> Result<String, JsError> {
    let project: crate::Project =
        serde_json::from_str(project_json).map_err(|e| JsError::new(&e.to_string()))?;
    crate::render_project(&project).map_err(|e| JsError::new(&format!("{e:#}")))
}

/// The label shown next to the speed slider.
#[wasm_bindgen]
pub fn speed_label(speed: i32, variant: &str, locale: &str) -> Result<String, JsError> {
    let variant = parse_variant(variant)?;
    let label = crate::timing::LabelBands::for_variant(variant).label(Speed::clamped(speed as i64));
    Ok(label.text(parse_locale(locale)).to_string())
}

/// Timing for a speed value.
///
/// Returns a JSON object with:
/// - `cycleDurationMs`: number
/// - `holdFraction`: number (1 unless the variant holds)
/// - `label`: string
#[wasm_bindgen]
pub fn describe_timing(speed: i32, variant: &str) -> Result<JsValue, JsError> {
    let variant = parse_variant(variant)?;
    let mut settings = AnimationSettings::for_variant(variant);
    settings
        .apply(&SettingsPatch::speed(speed as i64))
        .map_err(|e| JsError::new(&e.to_string()))?;
    let timing = derive_timing(variant, &settings);

    let obj = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &obj,
        &"cycleDurationMs".into(),
        &JsValue::from_f64(timing.cycle_duration_ms as f64),
    );
    let _ = js_sys::Reflect::set(
        &obj,
        &"holdFraction".into(),
        &JsValue::from_f64(timing.hold_fraction),
    );
    let _ = js_sys::Reflect::set(&obj, &"label".into(), &JsValue::from_str(timing.label.as_str()));
    Ok(obj.into())
}
