use super::*;
use crate::settings::SettingsPatch;
use crate::timing::derive_timing;
use url::Url;

fn image(url: &str) -> ImageRef {
    ImageRef::new(Url::parse(url).unwrap())
}

fn images(n: usize) -> Vec<ImageRef> {
    (0..n)
        .map(|i| image(&format!("https://example.com/photos/pic{i}.jpg")))
        .collect()
}

fn render(variant: Variant, images: &[ImageRef], settings: &AnimationSettings) -> String {
    let timing = derive_timing(variant, settings);
    synthesize(variant, images, settings, &timing)
}

#[test]
fn loop_iframe_matches_settings() {
    let mut settings = AnimationSettings::for_variant(Variant::Loop);
    settings
        .apply(&SettingsPatch {
            width: Some(420),
            height: Some(180),
            ..SettingsPatch::default()
        })
        .unwrap();
    let out = render(Variant::Loop, &images(1), &settings);

    assert!(out.starts_with("<iframe "));
    assert_eq!(attribute_value(&out, "width"), Some("420"));
    assert_eq!(attribute_value(&out, "height"), Some("180"));
    assert!(out.contains(r#"loading="lazy""#));
    assert!(out.contains(r#"referrerpolicy="no-referrer""#));
    assert!(out.contains(r#"title="pic0""#));
}

#[test]
fn loop_document_slides_one_item_per_cycle() {
    let settings = AnimationSettings::for_variant(Variant::Loop);
    let timing = derive_timing(Variant::Loop, &settings);
    let out = render(Variant::Loop, &images(1), &settings);
    let doc = extract_srcdoc(&out).unwrap();

    assert!(doc.contains(&format!("animation: slide {}ms linear infinite", timing.cycle_duration_ms)));
    assert!(doc.contains("translateX(-300px)"));
    assert!(doc.contains(r#"--image-url: url("https://example.com/photos/pic0.jpg")"#));
    assert_eq!(doc.matches(r#"<div class="item"></div>"#).count(), LOOP_REPEAT);
}

#[test]
fn rotation_is_square_and_spins() {
    let settings = AnimationSettings::for_variant(Variant::Rotation);
    let out = render(Variant::Rotation, &images(1), &settings);
    assert_eq!(attribute_value(&out, "width"), Some("300"));
    assert_eq!(attribute_value(&out, "height"), Some("300"));

    let doc = extract_srcdoc(&out).unwrap();
    assert!(doc.contains("rotate(0deg)"));
    assert!(doc.contains("rotate(360deg)"));
    assert!(doc.contains("animation: spin 51069ms linear infinite"));
}

#[test]
fn falling_line_is_declarative() {
    let mut settings = AnimationSettings::for_variant(Variant::FallingLine);
    settings
        .apply(&SettingsPatch {
            speed: Some(50),
            pause_ms: Some(100),
            line_thickness: Some(3.4),
            line_length: Some(200.0),
            color: Some("#f00".into()),
            ..SettingsPatch::default()
        })
        .unwrap();
    let out = render(Variant::FallingLine, &[], &settings);

    assert_eq!(attribute_value(&out, "width"), Some("3"));
    assert_eq!(attribute_value(&out, "height"), Some("200"));
    assert!(out.contains("width:3.4px; height:200px;"));

    let doc = extract_srcdoc(&out).unwrap();
    assert!(!doc.contains("<script"));
    assert!(doc.contains(r#"keyTimes="0;0.145;1""#));
    assert!(doc.contains(r#"dur="0.117s""#));
    assert!(doc.contains(r#"values="200;0;0""#));
    assert!(doc.contains(r#"values="0;200;200""#));
    assert!(doc.contains(r##"fill="#f00""##));
    assert!(doc.contains(r#"repeatCount="indefinite""#));
}

#[test]
fn thin_falling_line_keeps_a_visible_frame() {
    let mut settings = AnimationSettings::for_variant(Variant::FallingLine);
    settings
        .apply(&SettingsPatch {
            line_thickness: Some(0.5),
            ..SettingsPatch::default()
        })
        .unwrap();
    let out = render(Variant::FallingLine, &[], &settings);
    assert_eq!(attribute_value(&out, "width"), Some("1"));
    assert!(out.contains("width:0.5px;"));
}

#[test]
fn slideshow_fragment_cross_fades() {
    let settings = AnimationSettings::for_variant(Variant::Slideshow);
    let out = render(Variant::Slideshow, &images(3), &settings);

    assert!(out.starts_with("<div "));
    assert!(!out.contains("<iframe"));
    assert!(out.contains("width: 800px; height: 450px;"));
    assert_eq!(out.matches("<img ").count(), 3);
    assert_eq!(out.matches("opacity: 1;").count(), 1);
    assert!(out.contains("transition: opacity 600ms ease-in-out"));
    assert!(out.contains("}, 2600);"));
}

#[test]
fn cover_flow_lays_out_three_sections() {
    let settings = AnimationSettings::for_variant(Variant::CoverFlow);
    let out = render(Variant::CoverFlow, &images(3), &settings);
    assert_eq!(attribute_value(&out, "width"), Some("800"));
    assert_eq!(attribute_value(&out, "height"), Some("450"));

    let doc = extract_srcdoc(&out).unwrap();
    assert_eq!(doc.matches(r#"data-section="lead""#).count(), 3);
    assert_eq!(doc.matches(r#"data-section="original""#).count(), 3);
    assert_eq!(doc.matches(r#"data-section="trail""#).count(), 3);
    assert!(doc.contains("var ORIGINALS = 3;"));
    assert!(doc.contains("var STEP_MS = 3000;"));
    assert!(doc.contains(&format!("var LOOKAHEAD = {COVER_FLOW_LOOKAHEAD};")));
    assert!(doc.contains(&format!("ORIGINALS * {COVER_FLOW_RESIDENT_BATCHES};")));
    assert!(doc.contains(r#""https://example.com/photos/pic2.jpg""#));
    // appends ahead instead of jumping back to the start
    assert!(doc.contains("appendBatch();"));
    assert!(doc.contains("setTimeout(start, 100)"));
}

#[test]
fn cover_flow_steps_on_one_chained_timer() {
    let settings = AnimationSettings::for_variant(Variant::CoverFlow);
    let doc = extract_srcdoc(&render(Variant::CoverFlow, &images(3), &settings)).unwrap();
    // the next step is only armed once the previous one settled
    assert!(!doc.contains("setInterval"));
    assert!(doc.contains("stepTimer = setTimeout(advance, STEP_MS);"));
    assert!(doc.contains("stepTimer = setTimeout(function() { settle(issued, extend); }, STEP_MS);"));
    let settle = doc.find("function settle").unwrap();
    let rearm = doc[settle..].find("advance();").unwrap();
    let release = doc[settle..].find("busy = false;").unwrap();
    assert!(release < rearm);
}

#[test]
fn synthesis_is_idempotent() {
    let imgs = images(4);
    for variant in Variant::ALL {
        let settings = AnimationSettings::for_variant(variant);
        let used = &imgs[..variant.max_images().min(imgs.len())];
        assert_eq!(
            render(variant, used, &settings),
            render(variant, used, &settings),
            "{variant} output differs between runs"
        );
    }
}

#[test]
fn hostile_urls_stay_inside_their_attribute() {
    let nasty = image(r#"https://example.com/a.png?x="><script>alert(1)</script>"#);
    for variant in [Variant::Loop, Variant::Rotation, Variant::Slideshow, Variant::CoverFlow] {
        let settings = AnimationSettings::for_variant(variant);
        let out = render(variant, std::slice::from_ref(&nasty), &settings);
        assert!(!out.contains("<script>alert"), "{variant} leaked markup");
        if variant != Variant::Slideshow {
            let doc = extract_srcdoc(&out).unwrap();
            assert!(!doc.contains("<script>alert"), "{variant} leaked into srcdoc");
        }
    }
}
