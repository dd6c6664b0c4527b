// tests/transforms.rs

mod common;
use crate::common::{init_tracing, pipeline, snapshot_tree, with_timeout, write_file, ConfigFileBuilder};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use assetdag::dag::CompositeRegistry;
use assetdag::errors::AssetdagError;
use assetdag::exec::TaskExecutor;
use assetdag::fs::mock::MockFileSystem;
use assetdag::fs::{FileSystem, RealFileSystem};
use assetdag::task::clean::contains_path;
use assetdag::task::styles::{finish_stylesheet, strip_source_map_comments};
use assetdag::types::Mode;

const STYLESHEET: &str = "/* site styles */\n.nav {\n  color: #ff0000;\n  margin: 0px 0px 0px 0px;\n}\n\n.nav a {\n  display: block;\n}\n/*# sourceMappingURL=data:application/json;base64,e30= */\n";

fn mock_project() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./src/images/logo.png", vec![0x89, b'P', b'N', b'G']);
    fs.add_file("./src/images/icons/menu.svg", "<svg/>");
    fs.add_file("./src/images/notes.txt", "not an image");
    fs.add_file("./src/fonts/body.woff", "woff");
    fs.add_file("./src/header.php", "<?php // header");
    fs.add_file("./src/js/bundle.js", "console.log(1)");
    fs.add_file("./src/sass/main.scss", ".a{}");
    fs
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

/// Config whose external commands only need a POSIX shell.
fn shell_config() -> ConfigFileBuilder {
    ConfigFileBuilder::new()
        .styles_cmd("cat {input}", "cat {input}")
        .scripts_cmd(
            "cp {input} {output} && echo '{}' > {output}.map",
            "cp {input} {output}",
        )
}

fn real_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(root, "src/sass/main.scss", STYLESHEET);
    write_file(root, "src/js/bundle.js", "console.log('hi');\n");
    write_file(root, "src/images/logo.png", [0x89, b'P', b'N', b'G']);
    write_file(root, "src/header.php", "<?php get_header(); ?>\n");
    write_file(root, "src/fonts/body.woff", "woff");
    dir
}

#[tokio::test]
async fn images_copies_only_its_path_set_preserving_structure() {
    init_tracing();
    let fs = mock_project();
    let p = pipeline(ConfigFileBuilder::new().build(), Mode::Development, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("images")).await.unwrap();

    let out: Vec<PathBuf> = fs
        .file_paths()
        .into_iter()
        .filter(|p| p.starts_with("./dist"))
        .collect();
    assert_eq!(
        out,
        paths(&["./dist/images/icons/menu.svg", "./dist/images/logo.png"])
    );
    assert_eq!(
        fs.read(Path::new("./dist/images/logo.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
}

#[tokio::test]
async fn copy_flattens_everything_else_under_dist() {
    init_tracing();
    let fs = mock_project();
    let p = pipeline(ConfigFileBuilder::new().build(), Mode::Development, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("copy")).await.unwrap();

    let out: Vec<PathBuf> = fs
        .file_paths()
        .into_iter()
        .filter(|p| p.starts_with("./dist"))
        .collect();
    assert_eq!(out, paths(&["./dist/fonts/body.woff", "./dist/header.php"]));
}

#[tokio::test]
async fn clean_removes_output_root_and_tolerates_absence() {
    init_tracing();
    let fs = mock_project();
    fs.add_file("./dist/css/old.css", "old");
    let p = pipeline(ConfigFileBuilder::new().build(), Mode::Development, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("clean")).await.unwrap();
    assert!(!fs.exists(Path::new("./dist")));
    assert!(fs.exists(Path::new("./src/header.php")));

    // Second run: nothing to delete.
    with_timeout(p.run_task("clean")).await.unwrap();
}

#[tokio::test]
async fn clean_refuses_to_remove_the_project_root() {
    init_tracing();
    let fs = mock_project();
    let cfg = ConfigFileBuilder::new()
        .with(|raw| raw.clean.target = ".".into())
        .build();
    let p = pipeline(cfg, Mode::Development, ".", Arc::new(fs.clone()));

    let err = with_timeout(p.run_task("clean")).await.unwrap_err();
    assert!(matches!(err, AssetdagError::ConfigError(_)));
    assert!(fs.exists(Path::new("./src/header.php")));
}

#[tokio::test]
async fn clean_refuses_a_parent_target_that_holds_the_project() {
    init_tracing();
    let outer = tempfile::tempdir().unwrap();
    let root = outer.path().join("theme");
    write_file(&root, "src/header.php", "<?php get_header(); ?>\n");
    let cfg = ConfigFileBuilder::new()
        .with(|raw| raw.clean.target = "..".into())
        .build();
    let p = pipeline(cfg, Mode::Development, &root, Arc::new(RealFileSystem));

    let err = with_timeout(p.run_task("clean")).await.unwrap_err();
    assert!(matches!(err, AssetdagError::ConfigError(_)));
    assert!(root.join("src/header.php").exists());
}

#[test]
fn clean_guard_folds_dot_segments() {
    assert!(contains_path(Path::new("/site/theme/.."), Path::new("/site/theme")));
    assert!(contains_path(Path::new("/site/theme/./"), Path::new("/site/theme")));
    assert!(contains_path(Path::new("/site/theme/dist/../.."), Path::new("/site/theme")));
    assert!(contains_path(Path::new("./."), Path::new(".")));

    assert!(!contains_path(Path::new("/site/theme/dist"), Path::new("/site/theme")));
    assert!(!contains_path(Path::new("/site/theme/../other"), Path::new("/site/theme")));
    assert!(!contains_path(Path::new("./dist"), Path::new(".")));
}

#[tokio::test]
async fn unknown_leaf_is_task_not_found() {
    let p = pipeline(
        ConfigFileBuilder::new().build(),
        Mode::Development,
        ".",
        Arc::new(MockFileSystem::new()),
    );
    let err = p.run_task("fonts").await.unwrap_err();
    assert!(matches!(err, AssetdagError::TaskNotFound(_)));
}

#[tokio::test]
async fn styles_dev_keeps_source_map_and_prod_minifies() {
    init_tracing();
    let dir = real_project();
    let root = dir.path();
    let css_path = root.join("dist/css/main.css");

    let dev = pipeline(shell_config().build(), Mode::Development, root, Arc::new(RealFileSystem));
    with_timeout(dev.run_task("styles")).await.unwrap();
    let dev_css = std::fs::read_to_string(&css_path).unwrap();
    assert_eq!(dev_css, STYLESHEET);
    assert!(dev_css.contains("sourceMappingURL"));

    let prod = pipeline(shell_config().build(), Mode::Production, root, Arc::new(RealFileSystem));
    with_timeout(prod.run_task("styles")).await.unwrap();
    let prod_css = std::fs::read_to_string(&css_path).unwrap();
    assert!(!prod_css.contains("sourceMappingURL"));
    assert!(!prod_css.contains('\n'));
    assert!(!prod_css.contains("site styles"));
    assert!(prod_css.contains(".nav{"));
    assert!(prod_css.len() <= dev_css.len());
}

#[tokio::test]
async fn styles_compile_failure_is_logged_not_fatal() {
    init_tracing();
    let dir = real_project();
    let root = dir.path();
    let cfg = ConfigFileBuilder::new()
        .styles_cmd("echo 'Error: expected \"}\"' >&2; exit 65", "exit 65")
        .build();

    let p = pipeline(cfg, Mode::Development, root, Arc::new(RealFileSystem));
    with_timeout(p.run_task("styles")).await.unwrap();

    assert!(!root.join("dist/css/main.css").exists());
}

#[tokio::test]
async fn scripts_failure_propagates_with_stderr() {
    init_tracing();
    let dir = real_project();
    let cfg = ConfigFileBuilder::new()
        .scripts_cmd("echo 'unexpected token' >&2; exit 2", "exit 2")
        .build();

    let p = pipeline(cfg, Mode::Development, dir.path(), Arc::new(RealFileSystem));
    let err = with_timeout(p.run_task("scripts")).await.unwrap_err();

    match err {
        AssetdagError::TaskFailed { task, reason } => {
            assert_eq!(task, "scripts");
            assert!(reason.contains("unexpected token"), "{reason}");
        }
        other => panic!("expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn production_scripts_drop_stale_source_map() {
    init_tracing();
    let dir = real_project();
    let root = dir.path();

    let dev = pipeline(shell_config().build(), Mode::Development, root, Arc::new(RealFileSystem));
    with_timeout(dev.run_task("scripts")).await.unwrap();
    assert!(root.join("dist/js/bundle.js").exists());
    assert!(root.join("dist/js/bundle.js.map").exists());

    let prod = pipeline(shell_config().build(), Mode::Production, root, Arc::new(RealFileSystem));
    with_timeout(prod.run_task("scripts")).await.unwrap();
    assert!(root.join("dist/js/bundle.js").exists());
    assert!(!root.join("dist/js/bundle.js.map").exists());
}

#[tokio::test]
async fn build_twice_gives_identical_output() {
    init_tracing();
    let dir = real_project();
    let root = dir.path();
    let cfg = shell_config().build();
    let plan = CompositeRegistry::from_config(&cfg).resolve("build").unwrap();
    let p = pipeline(cfg, Mode::Production, root, Arc::new(RealFileSystem));

    with_timeout(plan.run(&p)).await.unwrap();
    let first = snapshot_tree(&root.join("dist"));
    with_timeout(plan.run(&p)).await.unwrap();
    let second = snapshot_tree(&root.join("dist"));

    assert_eq!(first, second);
    let names: Vec<&str> = first.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "css/main.css",
            "fonts/body.woff",
            "header.php",
            "images/logo.png",
            "js/bundle.js",
        ]
    );
}

#[test]
fn source_map_comments_are_stripped() {
    let css = ".a{}\n/*# sourceMappingURL=main.css.map */\n//# sourceMappingURL=x\n.b{}";
    let out = strip_source_map_comments(css);
    assert!(!out.contains("sourceMappingURL"));
    assert!(out.contains(".a{}") && out.contains(".b{}"));
}

#[test]
fn development_stylesheet_passes_through() {
    assert_eq!(finish_stylesheet(STYLESHEET, Mode::Development).unwrap(), STYLESHEET);
}
