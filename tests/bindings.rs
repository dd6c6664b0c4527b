// tests/bindings.rs

mod common;
use crate::common::ConfigFileBuilder;

use std::path::{Path, PathBuf};

use assetdag::watch::{build_bindings, matching_bindings, triggers_for_paths, WatchBinding};

fn names(bindings: Vec<&WatchBinding>) -> Vec<&str> {
    bindings.into_iter().map(WatchBinding::name).collect()
}

#[test]
fn default_bindings_route_changes_to_their_tasks() {
    let bindings = build_bindings(&ConfigFileBuilder::new().build()).unwrap();

    assert_eq!(names(matching_bindings(&bindings, "src/sass/partials/_nav.scss")), vec!["styles"]);
    assert_eq!(names(matching_bindings(&bindings, "src/js/bundle.js")), vec!["scripts"]);
    assert_eq!(names(matching_bindings(&bindings, "src/images/logo.png")), vec!["images"]);
    assert_eq!(names(matching_bindings(&bindings, "src/fonts/a.woff")), vec!["other"]);
    // Templates are also copied, so both bindings fire.
    assert_eq!(
        names(matching_bindings(&bindings, "src/header.php")),
        vec!["templates", "other"]
    );
    assert!(matching_bindings(&bindings, "README.md").is_empty());
}

#[test]
fn binding_tasks_and_reload_flags() {
    let bindings = build_bindings(&ConfigFileBuilder::new().build()).unwrap();
    let by_name = |n: &str| bindings.iter().find(|b| b.name() == n).unwrap();

    assert_eq!(by_name("styles").tasks(), ["styles".to_string()]);
    assert!(!by_name("styles").reload());
    assert!(by_name("scripts").reload());
    assert!(by_name("templates").tasks().is_empty());
    assert!(by_name("images").reload());
    assert_eq!(by_name("other").tasks(), ["copy".to_string()]);
}

#[test]
fn reload_after_copy_can_be_disabled() {
    let cfg = ConfigFileBuilder::new().reload_after_copy(false).build();
    let bindings = build_bindings(&cfg).unwrap();

    for b in &bindings {
        let expect = matches!(b.name(), "scripts" | "templates");
        assert_eq!(b.reload(), expect, "{}", b.name());
    }
}

#[test]
fn one_event_fires_each_binding_once() {
    let bindings = build_bindings(&ConfigFileBuilder::new().build()).unwrap();
    let root = Path::new("/project");
    let paths: Vec<PathBuf> = [
        "/project/src/js/a.js",
        "/project/src/js/b.js",
        "/project/src/sass/main.scss",
        "/elsewhere/src/js/c.js",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    let triggers = triggers_for_paths(root, &paths, &bindings);

    assert_eq!(
        triggers,
        vec![
            ("styles".to_string(), "src/sass/main.scss".to_string()),
            ("scripts".to_string(), "src/js/a.js".to_string()),
        ]
    );
}
