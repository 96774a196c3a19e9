use std::fs;
use std::path::Path;

use loopreel::embed::{attribute_value, extract_srcdoc};
use loopreel::{Project, Variant};

fn render_all_in_dir(dir: &Path) -> usize {
    assert!(dir.is_dir(), "{} is not a directory", dir.display());

    let entries: Vec<_> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", dir.display()))
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "yaml")
                .unwrap_or(false)
        })
        .collect();

    assert!(!entries.is_empty(), "no .yaml files found in {}", dir.display());

    for entry in &entries {
        let path = entry.path();
        let project = Project::from_yaml_file(&path)
            .unwrap_or_else(|e| panic!("{} failed to parse: {e:#}", path.display()));
        project
            .validate()
            .unwrap_or_else(|e| panic!("{} failed to validate: {e:#}", path.display()));

        let embed = loopreel::render_project(&project)
            .unwrap_or_else(|e| panic!("{} failed to render: {e:#}", path.display()));
        assert!(!embed.is_empty(), "{} produced an empty embed", path.display());

        match project.variant {
            Variant::Slideshow => assert!(
                embed.starts_with("<div"),
                "{} slideshow should be an inline fragment",
                path.display()
            ),
            _ => assert!(
                extract_srcdoc(&embed).is_some(),
                "{} should be a srcdoc iframe",
                path.display()
            ),
        }
    }

    eprintln!("  rendered {} projects from {}", entries.len(), dir.display());
    entries.len()
}

#[test]
fn all_demos_render() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    assert_eq!(render_all_in_dir(&dir), 5);
}

#[test]
fn demo_settings_reach_the_markup() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    let banner = Project::from_yaml_file(dir.join("banner-loop.yaml")).unwrap();
    let embed = loopreel::render_project(&banner).unwrap();
    assert_eq!(attribute_value(&embed, "width"), Some("640"));
    assert_eq!(attribute_value(&embed, "height"), Some("120"));

    let badge = Project::from_yaml_file(dir.join("spinning-badge.yaml")).unwrap();
    let embed = loopreel::render_project(&badge).unwrap();
    assert_eq!(attribute_value(&embed, "width"), Some("200"));
    assert_eq!(attribute_value(&embed, "height"), Some("200"));

    let line = Project::from_yaml_file(dir.join("falling-line.yaml")).unwrap();
    let doc = extract_srcdoc(&loopreel::render_project(&line).unwrap()).unwrap();
    assert!(doc.contains(r##"fill="#d4af37""##));
    assert!(doc.contains("repeatCount=\"indefinite\""));

    let slideshow = Project::from_yaml_file(dir.join("gallery-slideshow.yaml")).unwrap();
    let embed = loopreel::render_project(&slideshow).unwrap();
    assert_eq!(embed.matches("<img ").count(), 3);
    assert!(embed.contains("}, 3800);"));

    let flow = Project::from_yaml_file(dir.join("cover-flow.yaml")).unwrap();
    let doc = extract_srcdoc(&loopreel::render_project(&flow).unwrap()).unwrap();
    assert!(doc.contains("var ORIGINALS = 4;"));
    assert!(doc.contains("var STEP_MS = 2500;"));
}

#[test]
fn broken_projects_are_refused() {
    let over = Project::from_yaml_str(
        "variant: rotation\nimages:\n  - https://example.com/a.png\n  - https://example.com/b.png\n",
    )
    .unwrap();
    let err = loopreel::render_project(&over).unwrap_err();
    assert!(err.to_string().contains("at most 1"));

    let line_with_images =
        Project::from_yaml_str("variant: falling-line\nimages: [\"https://example.com/a.png\"]\n").unwrap();
    assert!(loopreel::render_project(&line_with_images).is_err());

    let bad_color = Project::from_yaml_str("variant: falling-line\nsettings:\n  color: red\n").unwrap();
    assert!(loopreel::render_project(&bad_color).is_err());
}
