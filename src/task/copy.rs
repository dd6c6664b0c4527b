// src/task/copy.rs

use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::exec::TaskFuture;
use crate::pathset::{collect_matching_files, PathSet};
use crate::task::{blocking, Pipeline, Task};

/// Identity copy of one Path Set into its destination.
///
/// Backs both `images` and `copy`; they differ only in which section of the
/// config supplies the Path Set.
pub struct CopyTask {
    name: &'static str,
    paths: fn(&ConfigFile) -> PathSet,
}

impl CopyTask {
    pub fn images() -> Self {
        Self {
            name: "images",
            paths: ConfigFile::images,
        }
    }

    pub fn copy() -> Self {
        Self {
            name: "copy",
            paths: ConfigFile::copy,
        }
    }
}

impl Task for CopyTask {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run<'a>(&'a self, pipeline: &'a Pipeline) -> TaskFuture<'a> {
        Box::pin(async move {
            let ctx = pipeline.context();
            let paths = (self.paths)(ctx.config());
            let matcher = paths.compile()?;
            let root = ctx.root().to_path_buf();
            let dest = ctx.resolve(&paths.destination);
            let fs = pipeline.fs();
            let task = self.name;

            let copied = blocking(move || {
                let files = collect_matching_files(fs.as_ref(), &root, &matcher)?;
                for file in &files {
                    let target = dest.join(&file.relative);
                    debug!(task = task, from = ?file.source, to = ?target, "copying");
                    fs.copy_file(&file.source, &target)?;
                }
                Ok(files.len())
            })
            .await?;

            info!(task = self.name, files = copied, "copied");
            Ok(())
        })
    }
}
