//! Cover-flow document: three copies of the image set (lead duplicates,
//! originals, trail duplicates) and a script that mirrors
//! [`crate::slides::SlideController`]: start on the first original, step
//! forward forever, append a fresh batch ahead of the window instead of
//! jumping back, and drop a leading batch once too many slides are resident.

use crate::image::ImageRef;
use crate::settings::AnimationSettings;
use crate::slides::{self, Section};

use super::escape::{escape_html, js_string_array};

/// An extension is scheduled when the index comes this close to the last
/// resident slide, so a right-hand neighbor always exists.
pub const COVER_FLOW_LOOKAHEAD: usize = slides::LOOKAHEAD;

/// Resident slides are capped at this many batches of originals.
pub const COVER_FLOW_RESIDENT_BATCHES: usize = slides::RESIDENT_BATCHES;

/// Step logic shared by every cover-flow embed. Expects `ORIGINALS`,
/// `STEP_MS`, `LOOKAHEAD`, `MAX_RESIDENT`, `SOURCES` and `ALTS` in scope.
const COVER_FLOW_SCRIPT_JS: &str = r#"  var viewport = document.querySelector('.reel');
  var track = document.querySelector('.reel-track');
  var initialSlides = track.innerHTML;
  var slideWidth = 0;
  var current = ORIGINALS;
  var busy = false;
  var generation = 0;
  var stepTimer = null;
  var pollTimer = null;

  function widthFor(containerWidth) {
    return containerWidth / 1.4 + (3 * containerWidth) / 100;
  }

  function place(animate) {
    var containerWidth = viewport.clientWidth;
    if (containerWidth === 0) return false;
    var slides = track.children;
    for (var i = 0; i < slides.length; i++) {
      slides[i].classList.toggle('is-active', i === current);
    }
    var offset = (containerWidth - slideWidth) / 2 - current * slideWidth;
    track.style.transition = animate ? 'transform ' + STEP_MS + 'ms ease' : 'none';
    track.style.transform = 'translateX(' + offset + 'px)';
    return true;
  }

  function appendBatch() {
    for (var i = 0; i < ORIGINALS; i++) {
      var slide = document.createElement('div');
      slide.className = 'reel-slide';
      slide.setAttribute('data-section', 'extension');
      slide.setAttribute('data-original-index', String(i));
      var img = document.createElement('img');
      img.src = SOURCES[i];
      img.alt = ALTS[i];
      slide.appendChild(img);
      track.appendChild(slide);
    }
  }

  function rehome() {
    if (track.children.length <= MAX_RESIDENT) return;
    for (var i = 0; i < ORIGINALS; i++) {
      track.removeChild(track.firstElementChild);
    }
    current -= ORIGINALS;
    place(false);
  }

  function settle(issued, extend) {
    if (issued !== generation) return;
    if (extend) {
      appendBatch();
      rehome();
    }
    busy = false;
    advance();
  }

  function advance() {
    stepTimer = null;
    if (busy) return;
    if (viewport.clientWidth === 0) {
      stepTimer = setTimeout(advance, STEP_MS);
      return;
    }
    busy = true;
    current += 1;
    var extend = current + LOOKAHEAD >= track.children.length;
    place(true);
    var issued = generation;
    stepTimer = setTimeout(function() { settle(issued, extend); }, STEP_MS);
  }

  function stop() {
    generation += 1;
    if (stepTimer !== null) {
      clearTimeout(stepTimer);
      stepTimer = null;
    }
    if (pollTimer !== null) {
      clearTimeout(pollTimer);
      pollTimer = null;
    }
    busy = false;
  }

  function start() {
    stop();
    if (ORIGINALS === 0) return;
    var containerWidth = viewport.clientWidth;
    if (containerWidth === 0) {
      pollTimer = setTimeout(start, 100);
      return;
    }
    track.innerHTML = initialSlides;
    slideWidth = widthFor(containerWidth);
    current = ORIGINALS;
    place(false);
    stepTimer = setTimeout(advance, STEP_MS);
  }

  function onResize() {
    var containerWidth = viewport.clientWidth;
    if (containerWidth === 0) return;
    if (Math.abs(widthFor(containerWidth) - slideWidth) > 1) {
      start();
    }
  }

  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', start);
  } else {
    start();
  }
  if (window.ResizeObserver) {
    new ResizeObserver(onResize).observe(viewport);
  } else {
    window.addEventListener('resize', onResize);
  }"#;

fn slide_markup(images: &[ImageRef], section: Section) -> Vec<String> {
    images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            format!(
                r#"      <div class="reel-slide" data-section="{section}" data-original-index="{i}"><img src="{src}" alt="{alt}"></div>"#,
                section = section.name(),
                src = escape_html(img.src()),
                alt = escape_html(&img.display_name),
            )
        })
        .collect()
}

/// Full cover-flow document for `images`, stepping every `step_ms`.
pub fn cover_flow_document(images: &[ImageRef], settings: &AnimationSettings) -> String {
    let step = settings.step_ms;
    let originals = images.len();

    let mut markup = slide_markup(images, Section::Lead);
    markup.extend(slide_markup(images, Section::Original));
    markup.extend(slide_markup(images, Section::Trail));

    let sources = js_string_array(images.iter().map(|img| img.src()));
    let alts = js_string_array(images.iter().map(|img| img.display_name.as_str()));

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<style>
  * {{ margin: 0; padding: 0; box-sizing: border-box; }}
  html, body {{ width: 100%; height: 100%; overflow: hidden; background: transparent; }}
  .reel {{ width: 100vw; height: 100%; overflow: hidden; position: relative; display: flex; align-items: center; }}
  .reel-track {{ display: flex; align-items: center; will-change: transform; transition: none; }}
  .reel-slide {{ flex-shrink: 0; width: 71.43vw; margin: 0 1.5vw; display: flex; align-items: center; justify-content: center; }}
  .reel-slide img {{ width: 100%; height: auto; transform: scale(0.85); transition: transform {step}ms ease; }}
  .reel-slide.is-active img {{ transform: scale(1); }}
</style>
</head>
<body>
  <div class="reel">
    <div class="reel-track">
{slides}
    </div>
  </div>
<script>
(function() {{
  var ORIGINALS = {originals};
  var STEP_MS = {step};
  var LOOKAHEAD = {lookahead};
  var MAX_RESIDENT = ORIGINALS * {resident_batches};
  var SOURCES = {sources};
  var ALTS = {alts};
{script}
}})();
</script>
</body>
</html>"##,
        step = step,
        slides = markup.join("\n"),
        originals = originals,
        lookahead = COVER_FLOW_LOOKAHEAD,
        resident_batches = COVER_FLOW_RESIDENT_BATCHES,
        sources = sources,
        alts = alts,
        script = COVER_FLOW_SCRIPT_JS,
    )
}
