// src/task/package.rs

//! Theme packaging: placeholder substitution plus a reproducible zip.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::errors::Result;
use crate::exec::TaskFuture;
use crate::pathset::collect_matching_files;
use crate::project::ProjectDescriptor;
use crate::task::{blocking, Pipeline, Task};

pub struct PackageTask;

impl Task for PackageTask {
    fn name(&self) -> &'static str {
        "package"
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let cfg = ctx.config();
            let fs = pipeline.fs();

            let descriptor = ProjectDescriptor::load(fs.as_ref(), ctx.root(), cfg.project())?;
            let section = cfg.package().clone();
            let paths = cfg.package_paths();
            let matcher = paths.compile()?;
            let root = ctx.root().to_path_buf();
            let staging = ctx.resolve(&paths.destination);
            let archive = archive_path(&staging, &descriptor);

            info!(name = %descriptor.name, version = %descriptor.version, "packaging theme");

            let target = archive.clone();
            let entries = blocking(move || {
                let files = collect_matching_files(fs.as_ref(), &root, &matcher)?;
                let mut entries = Vec::with_capacity(files.len());
                for file in files {
                    // An earlier archive must not end up inside the next one.
                    if file.source.starts_with(&staging) {
                        continue;
                    }
                    let contents = fs.read(&file.source)?;
                    let staged = substitute_placeholders(
                        contents,
                        &[
                            (section.name_placeholder.as_str(), descriptor.name.as_str()),
                            (section.version_placeholder.as_str(), descriptor.version.as_str()),
                        ],
                    );
                    entries.push((entry_name(&file.relative), staged));
                }

                let count = entries.len();
                let bytes = write_archive(entries)?;
                fs.write(&target, &bytes)?;
                Ok(count)
            })
            .await?;

            info!(archive = ?archive, entries, "theme packaged");
            Ok(())
        })
    }
}

/// Replace each `(placeholder, value)` pair in UTF-8 text, in order.
///
/// Anything that is not valid UTF-8 is treated as binary and returned
/// untouched.
pub fn substitute_placeholders(contents: Vec<u8>, replacements: &[(&str, &str)]) -> Vec<u8> {
    match String::from_utf8(contents) {
        Ok(mut text) => {
            for (placeholder, value) in replacements {
                if !placeholder.is_empty() {
                    text = text.replace(placeholder, value);
                }
            }
            text.into_bytes()
        }
        Err(err) => err.into_bytes(),
    }
}

fn entry_name(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

/// Build a zip in memory. Entries are sorted and carry a fixed timestamp so
/// identical inputs give identical archives.
///
/// Zip failures, such as two entries with the same name, surface as
/// [`crate::errors::AssetdagError::ArchiveError`].
pub fn write_archive(mut entries: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>> {
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in &entries {
        debug!(entry = %name, bytes = contents.len(), "adding archive entry");
        writer.start_file(name.as_str(), options)?;
        writer.write_all(contents)?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Archive path for a descriptor: `<staging>/<name>.zip`.
pub fn archive_path(staging: &Path, descriptor: &ProjectDescriptor) -> PathBuf {
    staging.join(format!("{}.zip", descriptor.name))
}
