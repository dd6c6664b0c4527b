#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use assetdag::config::ConfigFile;
use assetdag::fs::FileSystem;
use assetdag::task::Pipeline;
use assetdag::types::{BuildContext, Mode};

pub use assetdag_test_utils::builders::ConfigFileBuilder;
pub use assetdag_test_utils::recording_executor::{Call, RecordingExecutor};
pub use assetdag_test_utils::{init_tracing, wait_until, with_timeout};

/// Pipeline over an arbitrary filesystem rooted at `root`.
pub fn pipeline(
    cfg: ConfigFile,
    mode: Mode,
    root: impl AsRef<Path>,
    fs: Arc<dyn FileSystem>,
) -> Pipeline {
    let ctx = BuildContext::new(mode, root.as_ref(), cfg);
    Pipeline::new(ctx, fs, CancellationToken::new())
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Every file under `dir` as `(relative path, bytes)`, sorted.
pub fn snapshot_tree(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut out = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        for entry in std::fs::read_dir(&d).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path
                    .strip_prefix(dir)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                out.push((rel, std::fs::read(&path).unwrap()));
            }
        }
    }
    out.sort();
    out
}
