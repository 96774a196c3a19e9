use crate::image::ImageRef;
use crate::settings::AnimationSettings;
use crate::timing::DerivedTiming;

use super::escape::{css_string, escape_html};

/// Copies of the image laid side by side; enough to cover any reasonable
/// frame width without a gap while the track slides one item.
pub const LOOP_REPEAT: usize = 20;

/// Continuous horizontal loop: the track slides exactly one item width per
/// cycle, linearly and forever, so the seam is never visible.
pub fn loop_document(
    image: Option<&ImageRef>,
    settings: &AnimationSettings,
    timing: &DerivedTiming,
) -> String {
    let src = image.map(|img| img.src()).unwrap_or("");
    let alt = image.map(|img| img.display_name.as_str()).unwrap_or("");
    let width = settings.width;
    let duration = timing.cycle_duration_ms;
    let items = r#"<div class="item"></div>"#.repeat(LOOP_REPEAT);

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
:root {{ --image-url: url({src}); }}
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
html, body {{ width: 100%; height: 100%; background: transparent; overflow: hidden; }}
.carousel {{ width: 100%; height: 100%; display: flex; align-items: center; overflow: hidden; }}
.track {{ display: flex; height: 100%; animation: slide {duration}ms linear infinite; }}
.item {{ flex-shrink: 0; height: 100%; width: {width}px; background-image: var(--image-url); background-size: contain; background-repeat: no-repeat; background-position: center; }}
@keyframes slide {{ 0% {{ transform: translateX(0); }} 100% {{ transform: translateX(-{width}px); }} }}
</style>
</head>
<body>
<div class="carousel" role="img" aria-label="{alt}">
<div class="track">{items}</div>
</div>
</body>
</html>"##,
        src = css_string(src),
        alt = escape_html(alt),
        duration = duration,
        width = width,
        items = items,
    )
}
