use std::path::{Path, PathBuf};

/// A discovered input file and where its output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path of the input file.
    pub source: PathBuf,
    /// Path of the input file relative to the input root.
    pub relative: PathBuf,
    /// Path of the output file: the relative path mirrored under the output root.
    pub target: PathBuf,
}

/// Enumerates the files a batch run processes.
pub trait SourceWalker {
    /// List the files under `input_root` whose extension is `extension`,
    /// paired with their mirrored location under `output_root`.
    fn walk(&self, input_root: &Path, output_root: &Path, extension: &str) -> Vec<WalkEntry>;
}

/// Recursive directory walker backed by `walkdir`.
///
/// Entries are sorted by path. Unreadable entries are logged and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkdirWalker;

impl SourceWalker for WalkdirWalker {
    fn walk(&self, input_root: &Path, output_root: &Path, extension: &str) -> Vec<WalkEntry> {
        walkdir::WalkDir::new(input_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping unreadable entry: {err}");
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == extension)
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(input_root).ok()?.to_path_buf();
                Some(WalkEntry {
                    source: entry.path().to_path_buf(),
                    target: output_root.join(&relative),
                    relative,
                })
            })
            .collect()
    }
}
