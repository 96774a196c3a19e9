use crate::image::ImageRef;
use crate::timing::DerivedTiming;

use super::escape::escape_html;

/// A single image turning a full 360° per cycle, linear, forever.
pub fn rotation_document(image: Option<&ImageRef>, timing: &DerivedTiming) -> String {
    let src = image.map(|img| img.src()).unwrap_or("");
    let alt = image.map(|img| img.display_name.as_str()).unwrap_or("");

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
html, body {{ height: 100%; margin: 0; background: transparent; }}
.wrap {{ width: 100%; height: 100%; display: flex; align-items: center; justify-content: center; overflow: hidden; background: transparent; }}
img {{ width: 100%; height: 100%; object-fit: contain; transform-origin: center center; animation: spin {duration}ms linear infinite; }}
@keyframes spin {{ from {{ transform: rotate(0deg); }} to {{ transform: rotate(360deg); }} }}
</style>
</head>
<body>
<div class="wrap"><img src="{src}" alt="{alt}"></div>
</body>
</html>"##,
        duration = timing.cycle_duration_ms,
        src = escape_html(src),
        alt = escape_html(alt),
    )
}
