use crate::image::ImageRef;
use crate::settings::AnimationSettings;

use super::escape::escape_html;

/// Inline cross-fade fragment: absolutely stacked images, the first one
/// visible, advanced by a small script every `interval + transition` ms.
pub fn slideshow_fragment(images: &[ImageRef], settings: &AnimationSettings) -> String {
    let transition = settings.transition_ms;
    let period = settings.interval_ms + settings.transition_ms;

    let slides: Vec<String> = images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            let opacity = if i == 0 { 1 } else { 0 };
            format!(
                r#"  <img src="{src}" alt="{alt}" style="position: absolute; inset: 0; width: 100%; height: 100%; object-fit: cover; opacity: {opacity}; transition: opacity {transition}ms ease-in-out;">"#,
                src = escape_html(img.src()),
                alt = escape_html(&img.display_name),
            )
        })
        .collect();

    format!(
        r#"<div style="width: {width}px; height: {height}px; position: relative; overflow: hidden;">
{slides}
  <script>
    (function() {{
      var slides = document.currentScript.parentElement.querySelectorAll('img');
      var current = 0;
      if (slides.length > 1) {{
        setInterval(function() {{
          slides[current].style.opacity = '0';
          current = (current + 1) % slides.length;
          slides[current].style.opacity = '1';
        }}, {period});
      }}
    }})();
  </script>
</div>"#,
        width = settings.width,
        height = settings.height,
        slides = slides.join("\n"),
        period = period,
    )
}
