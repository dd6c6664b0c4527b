// tests/package.rs

mod common;
use crate::common::{init_tracing, pipeline, with_timeout, ConfigFileBuilder};

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use assetdag::config::ProjectSection;
use assetdag::errors::AssetdagError;
use assetdag::exec::TaskExecutor;
use assetdag::fs::mock::MockFileSystem;
use assetdag::fs::FileSystem;
use assetdag::project::ProjectDescriptor;
use assetdag::task::package::{substitute_placeholders, write_archive};
use assetdag::types::Mode;

const BINARY: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, b'_', b'v', b'e', b'r', b's', b'i', b'o', b'n'];

fn theme() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("./package.json", r#"{ "name": "foo", "version": "1.2.3", "private": true }"#);
    fs.add_file("./style.css", "/*\nTheme Name: _themename\nVersion: _version\n*/\n");
    fs.add_file("./functions.php", "<?php function _themename_setup() {}\n");
    fs.add_file("./dist/images/photo.jpg", BINARY.to_vec());
    fs.add_file("./src/sass/main.scss", "_themename");
    fs.add_file("./node_modules/dep/index.js", "x");
    fs.add_file("./.git/HEAD", "ref");
    fs.add_file("./Assetdag.toml", "");
    fs
}

fn read_archive(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        out.push((file.name().to_string(), contents));
    }
    out
}

#[tokio::test]
async fn package_substitutes_placeholders_and_names_archive() {
    init_tracing();
    let fs = theme();
    let p = pipeline(ConfigFileBuilder::new().build(), Mode::Production, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("package")).await.unwrap();

    let archive = fs.read(Path::new("./packaged/foo.zip")).unwrap();
    let entries = read_archive(archive);
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["dist/images/photo.jpg", "functions.php", "style.css"]);

    let text = |name: &str| {
        let (_, bytes) = entries.iter().find(|(n, _)| n == name).unwrap();
        String::from_utf8(bytes.clone()).unwrap()
    };
    assert_eq!(text("style.css"), "/*\nTheme Name: foo\nVersion: 1.2.3\n*/\n");
    assert_eq!(text("functions.php"), "<?php function foo_setup() {}\n");

    let (_, photo) = entries.iter().find(|(n, _)| n == "dist/images/photo.jpg").unwrap();
    assert_eq!(photo.as_slice(), BINARY, "binary files pass through");
}

#[tokio::test]
async fn packaging_twice_is_byte_identical() {
    init_tracing();
    let fs = theme();
    let p = pipeline(ConfigFileBuilder::new().build(), Mode::Production, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("package")).await.unwrap();
    let first = fs.read(Path::new("./packaged/foo.zip")).unwrap();
    with_timeout(p.run_task("package")).await.unwrap();
    let second = fs.read(Path::new("./packaged/foo.zip")).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn config_overrides_win_over_descriptor() {
    init_tracing();
    let fs = theme();
    let cfg = ConfigFileBuilder::new().project("bar", "2.0.0").build();
    let p = pipeline(cfg, Mode::Production, ".", Arc::new(fs.clone()));

    with_timeout(p.run_task("package")).await.unwrap();

    assert!(fs.exists(Path::new("./packaged/bar.zip")));
    assert!(!fs.exists(Path::new("./packaged/foo.zip")));
}

#[test]
fn descriptor_without_version_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file("./package.json", r#"{ "name": "foo" }"#);

    let err = ProjectDescriptor::load(&fs, Path::new("."), &ProjectSection::default()).unwrap_err();
    assert!(matches!(err, AssetdagError::DescriptorError(msg) if msg.contains("version")));
}

#[test]
fn missing_descriptor_is_rejected() {
    let fs = MockFileSystem::new();
    let err = ProjectDescriptor::load(&fs, Path::new("."), &ProjectSection::default()).unwrap_err();
    assert!(matches!(err, AssetdagError::DescriptorError(_)));
}

#[test]
fn substitution_replaces_every_occurrence_verbatim() {
    let out = substitute_placeholders(
        b"_themename-_themename v_version".to_vec(),
        &[("_themename", "foo"), ("_version", "1.2.3")],
    );
    assert_eq!(out, b"foo-foo v1.2.3");
}

#[test]
fn archive_entries_are_sorted() {
    let bytes = write_archive(vec![
        ("b.txt".into(), b"b".to_vec()),
        ("a/z.txt".into(), b"z".to_vec()),
    ])
    .unwrap();
    let names: Vec<String> = read_archive(bytes).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["a/z.txt", "b.txt"]);
}

#[test]
fn duplicate_entry_names_are_an_archive_error() {
    let err = write_archive(vec![
        ("style.css".into(), b"a".to_vec()),
        ("style.css".into(), b"b".to_vec()),
    ])
    .unwrap_err();
    assert!(matches!(err, AssetdagError::ArchiveError(_)), "got {err:?}");
}
