//! Generates the self-contained embed code for each animation variant.
//! Zero runtime dependencies in the output: plain HTML, CSS, SVG and a few
//! lines of inline script where a variant needs discrete steps.
//!
//! This module is split into:
//! - `escape`: two-layer encoding (inner document values, outer srcdoc)
//! - `loop_track`: continuous horizontal loop
//! - `rotation`: spinning image
//! - `falling_line`: SVG SMIL shrink-and-hold line
//! - `slideshow`: inline cross-fade fragment
//! - `cover_flow`: center-focus carousel with seamless extension

pub mod escape;

mod cover_flow;
mod falling_line;
mod loop_track;
mod rotation;
mod slideshow;

#[cfg(test)]
mod tests;

use crate::image::ImageRef;
use crate::settings::{AnimationSettings, Variant};
use crate::timing::DerivedTiming;

pub use cover_flow::{cover_flow_document, COVER_FLOW_LOOKAHEAD, COVER_FLOW_RESIDENT_BATCHES};
pub use falling_line::falling_line_document;
pub use loop_track::{loop_document, LOOP_REPEAT};
pub use rotation::rotation_document;
pub use slideshow::slideshow_fragment;

/// Synthesize the embed code for `variant`.
///
/// Pure: identical inputs give byte-identical output. The caller decides
/// whether enough images are present; see [`Variant::min_images`].
pub fn synthesize(
    variant: Variant,
    images: &[ImageRef],
    settings: &AnimationSettings,
    timing: &DerivedTiming,
) -> String {
    match variant {
        Variant::Loop => {
            let doc = loop_document(images.first(), settings, timing);
            IframeEmbed::new(settings.width, settings.height)
                .title(title_for(images, "Looping image"))
                .render(&doc)
        }
        Variant::Rotation => {
            let doc = rotation_document(images.first(), timing);
            IframeEmbed::new(settings.width, settings.width)
                .title(title_for(images, "Rotating image"))
                .render(&doc)
        }
        Variant::FallingLine => {
            let doc = falling_line_document(settings, timing);
            let attr_w = (settings.line_thickness.round() as u32).max(1);
            let attr_h = settings.line_length.max(1);
            IframeEmbed::new(attr_w, attr_h)
                .style(format!(
                    "border:0; overflow:hidden; display:block; width:{}px; height:{}px;",
                    settings.line_thickness, settings.line_length
                ))
                .title("Falling line".to_string())
                .render(&doc)
        }
        Variant::Slideshow => slideshow_fragment(images, settings),
        Variant::CoverFlow => {
            let doc = cover_flow_document(images, settings);
            IframeEmbed::new(settings.width, settings.height)
                .title("Image carousel".to_string())
                .render(&doc)
        }
    }
}

fn title_for(images: &[ImageRef], fallback: &str) -> String {
    images
        .first()
        .map(|img| img.display_name.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// The `<iframe>` host element around a synthesized document.
#[derive(Debug, Clone)]
pub struct IframeEmbed {
    pub width: u32,
    pub height: u32,
    pub style: String,
    pub title: String,
}

impl IframeEmbed {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            style: "border:0; overflow:hidden; display:block;".to_string(),
            title: String::new(),
        }
    }

    pub fn style(mut self, style: String) -> Self {
        self.style = style;
        self
    }

    pub fn title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    pub fn render(&self, doc: &str) -> String {
        format!(
            r#"<iframe width="{width}" height="{height}" style="{style}" loading="lazy" referrerpolicy="no-referrer" title="{title}" srcdoc="{srcdoc}"></iframe>"#,
            width = self.width,
            height = self.height,
            style = escape::escape_html(&self.style),
            title = escape::escape_html(&self.title),
            srcdoc = escape::srcdoc_attr(doc),
        )
    }
}

/// Read an integer attribute back out of rendered markup, e.g. the iframe
/// `width`. Returns the first occurrence.
pub fn attribute_value<'a>(markup: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!(" {name}=\"");
    let start = markup.find(&needle)? + needle.len();
    let len = markup[start..].find('"')?;
    Some(&markup[start..start + len])
}

/// Recover the inner document from an iframe embed.
pub fn extract_srcdoc(markup: &str) -> Option<String> {
    attribute_value(markup, "srcdoc").map(escape::decode_srcdoc_attr)
}
