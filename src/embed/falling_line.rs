use crate::settings::AnimationSettings;
use crate::timing::DerivedTiming;

use super::escape::escape_html;

/// `keyTimes` for the shrink-then-hold timeline.
pub(crate) fn key_times(timing: &DerivedTiming) -> String {
    format!("0;{:.3};1", timing.hold_fraction)
}

/// Cycle length as an SMIL `dur` value.
pub(crate) fn smil_duration(timing: &DerivedTiming) -> String {
    format!("{:.3}s", timing.cycle_duration_ms as f64 / 1000.0)
}

/// The falling-line SVG on its own, shared by the embed document and the
/// dev preview.
pub(crate) fn falling_line_svg(settings: &AnimationSettings, timing: &DerivedTiming) -> String {
    let thickness = settings.line_thickness;
    let length = settings.line_length;
    let key_times = key_times(timing);
    let dur = smil_duration(timing);

    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="100%" height="100%" viewBox="0 0 {thickness} {length}" preserveAspectRatio="xMidYMax meet"><rect x="0" y="0" width="{thickness}" height="{length}" fill="{color}"><animate attributeName="height" values="{length};0;0" keyTimes="{key_times}" dur="{dur}" repeatCount="indefinite" /><animate attributeName="y" values="0;{length};{length}" keyTimes="{key_times}" dur="{dur}" repeatCount="indefinite" /></rect></svg>"#,
        color = escape_html(settings.color.as_str()),
    )
}

/// The line shrinks from full length to zero while its top edge moves down,
/// reaching zero at the hold fraction, then holds empty until the cycle
/// restarts. Declarative only, so it runs in a sandboxed frame without
/// scripts.
pub fn falling_line_document(settings: &AnimationSettings, timing: &DerivedTiming) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"></head><body style="margin:0;background:transparent">{svg}</body></html>"#,
        svg = falling_line_svg(settings, timing),
    )
}
