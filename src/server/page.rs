use std::ops::RangeInclusive;

use crate::embed::escape::escape_html;
use crate::settings::{
    Variant, INTERVAL_RANGE, LINE_LENGTH_RANGE, LINE_THICKNESS_RANGE, PAUSE_RANGE, SIZE_RANGE,
    STEP_RANGE, TRANSITION_RANGE,
};

use super::css::build_css;
use super::inline_js::EDITOR_JS;
use super::StateView;

pub(super) fn build_authoring_page(view: &StateView) -> String {
    let css = build_css();
    let variant = view.variant;
    let loading_class = if view.state.is_loading { "loading on" } else { "loading" };
    let error_bar = match &view.state.error {
        Some(error) => format!(
            r#"<div class="error-bar" id="error-bar"><span id="error-text">{}</span><button id="error-dismiss">dismiss</button></div>"#,
            escape_html(error)
        ),
        None => r#"<div class="error-bar" id="error-bar" style="display:none"><span id="error-text"></span><button id="error-dismiss">dismiss</button></div>"#.to_string(),
    };
    let images = if variant.uses_images() {
        build_image_section(view)
    } else {
        String::new()
    };
    let controls = build_settings_section(view);
    let embed = match &view.embed {
        Some(code) => format!(
            r#"<textarea class="embed-code" id="embed-code" readonly>{}</textarea>
    <button id="copy-embed">copy</button>"#,
            escape_html(code)
        ),
        None => format!(r#"<div class="floor">{}</div>"#, floor_hint(view)),
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>loopreel: {variant}</title>
<style>
  {css}
</style>
</head>
<body>
<div class="toolbar">
  <span class="label">loopreel</span>
  <span class="tag">{variant}</span>
  <span class="sep">|</span>
  <span class="badge">{cycle} ms</span>
  <span class="badge">{label}</span>
  <span class="{loading_class}" id="loading">loading image...</span>
</div>
{error_bar}
<div class="split">
  <div class="panel preview-pane">
    <div class="panel-label">preview</div>
    <iframe id="preview" src="/preview.html" title="preview"></iframe>
  </div>
  <div class="divider"></div>
  <div class="panel">
    {images}
    {controls}
    <div class="section">
      <div class="panel-label">embed code</div>
      {embed}
    </div>
  </div>
</div>
{EDITOR_JS}
</body>
</html>"##,
        variant = variant,
        css = css,
        cycle = view.timing.cycle_duration_ms,
        label = escape_html(view.speed_label),
        loading_class = loading_class,
        error_bar = error_bar,
        images = images,
        controls = controls,
        embed = embed,
    )
}

fn build_image_section(view: &StateView) -> String {
    let items: String = view
        .state
        .images
        .iter()
        .map(|img| {
            let src = escape_html(img.src());
            let name = escape_html(&img.display_name);
            let id = escape_html(img.id.as_str());
            format!(
                r#"<li><img src="{src}" alt="{name}"><span class="name" title="{src}">{name}</span><button data-remove="{id}">remove</button></li>"#
            )
        })
        .collect();
    let floor = if view.state.images.len() < view.min_images {
        format!(r#"<div class="floor">{}</div>"#, floor_hint(view))
    } else {
        String::new()
    };
    format!(
        r#"<div class="section">
      <div class="panel-label">images <span class="count">{count}/{max}</span></div>
      <form class="row" id="add-image">
        <input type="text" id="image-url" placeholder="https://example.com/image.jpg">
        <button type="submit">add</button>
      </form>
      <ul class="image-list">{items}</ul>
      {floor}
    </div>"#,
        count = view.state.images.len(),
        max = view.max_images,
    )
}

fn floor_hint(view: &StateView) -> String {
    let missing = view.min_images.saturating_sub(view.state.images.len());
    format!("add {missing} more image(s) to generate an embed code")
}

fn build_settings_section(view: &StateView) -> String {
    let s = &view.state.settings;
    let mut rows = Vec::new();
    let speed_row = format!(
        r#"<div class="row"><label for="speed">speed</label><input type="range" id="speed" data-setting="speed" min="1" max="50" value="{speed}"><span class="hint" id="speed-value">{speed}</span><span class="hint">{label}</span></div>"#,
        speed = s.speed.get(),
        label = escape_html(view.speed_label),
    );
    let width = number_row("width", "width (px)", s.width, &SIZE_RANGE);
    let height = number_row("height", "height (px)", s.height, &SIZE_RANGE);

    match view.variant {
        Variant::Loop => {
            rows.push(speed_row);
            rows.push(width);
            rows.push(height);
        }
        Variant::Rotation => {
            rows.push(speed_row);
            rows.push(width);
        }
        Variant::FallingLine => {
            rows.push(speed_row);
            rows.push(number_row("pause_ms", "pause (ms)", s.pause_ms, &PAUSE_RANGE));
            rows.push(format!(
                r#"<div class="row"><label for="line_thickness">thickness</label><input type="number" id="line_thickness" data-setting="line_thickness" min="{}" max="{}" step="0.1" value="{}"></div>"#,
                LINE_THICKNESS_RANGE.start(),
                LINE_THICKNESS_RANGE.end(),
                s.line_thickness
            ));
            rows.push(number_row("line_length", "length (px)", s.line_length, &LINE_LENGTH_RANGE));
            rows.push(format!(
                r#"<div class="row"><label for="color">color</label><input type="color" id="color" data-setting="color" value="{}"></div>"#,
                escape_html(s.color.as_str())
            ));
        }
        Variant::Slideshow => {
            rows.push(width);
            rows.push(height);
            rows.push(number_row("interval_ms", "interval (ms)", s.interval_ms, &INTERVAL_RANGE));
            rows.push(number_row("transition_ms", "fade (ms)", s.transition_ms, &TRANSITION_RANGE));
        }
        Variant::CoverFlow => {
            rows.push(width);
            rows.push(height);
            rows.push(number_row("step_ms", "step (ms)", s.step_ms, &STEP_RANGE));
        }
    }

    format!(
        r#"<div class="section">
      <div class="panel-label">settings</div>
      {}
    </div>"#,
        rows.join("\n      ")
    )
}

fn number_row(key: &str, label: &str, value: u32, range: &RangeInclusive<u32>) -> String {
    format!(
        r#"<div class="row"><label for="{key}">{label}</label><input type="number" id="{key}" data-setting="{key}" min="{min}" max="{max}" value="{value}"></div>"#,
        min = range.start(),
        max = range.end(),
    )
}

/// The document `/preview.html` serves: the live embed on a neutral page,
/// or the floor hint when nothing can render yet.
pub(super) fn build_preview_frame(view: &StateView) -> String {
    let body = match &view.embed {
        Some(code) => code.clone(),
        None => format!(r#"<p class="floor">{}</p>"#, floor_hint(view)),
    };
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>loopreel preview</title>
<style>
  html, body {{ margin: 0; min-height: 100%; background: #141414; }}
  body {{ display: flex; align-items: center; justify-content: center; padding: 16px;
    box-sizing: border-box; }}
  .stage {{ {style} }}
  .floor {{ color: #F59E0B; font: 12px 'JetBrains Mono', monospace; }}
</style>
</head>
<body>
<div class="stage">
{body}
</div>
</body>
</html>"##,
        style = view.preview_style,
        body = body,
    )
}

pub(super) fn build_error_page(error: &str) -> String {
    let escaped = escape_html(error);
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>loopreel: error</title>
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  html, body {{ width: 100%; height: 100%; background: #0A0A0A; color: #A0A0A0;
    font-family: 'JetBrains Mono', monospace; }}
  .error-container {{
    max-width: 640px; margin: 80px auto; padding: 32px;
    border: 1px solid #3F1818; border-radius: 8px;
    background: rgba(239,68,68,0.04);
  }}
  .error-header {{ margin-bottom: 20px; font-size: 13px; color: #EF4444; }}
  .error-message {{
    font-size: 12px; color: #EF4444; line-height: 1.7;
    white-space: pre-wrap; word-break: break-word;
    padding: 16px; background: #141414; border-radius: 4px;
    border-left: 3px solid #EF4444;
  }}
</style>
</head>
<body>
<div class="error-container">
  <div class="error-header">loopreel dev: server error</div>
  <div class="error-message">{escaped}</div>
</div>
</body>
</html>"##,
        escaped = escaped,
    )
}
