use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use geopcd_io::{decode_points, encode_points, parse_header, RecordLayout};
use geopcd_linalg::RigidTransform;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::CorrespondenceSet;
use crate::error::{BatchError, FileError};
use crate::transform::transform_points;
use crate::walker::{SourceWalker, WalkEntry, WalkdirWalker};

/// The stages a file goes through; a failure keeps the last stage reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileStage {
    /// Listed by the walker.
    Discovered,
    /// Header parsed and record layout resolved.
    HeaderParsed,
    /// Data section decoded into points.
    Decoded,
    /// Spatial fields mapped through the transform.
    Transformed,
    /// Output file written.
    Written,
}

/// A file that could not be transformed.
#[derive(Debug)]
pub struct FileFailure {
    /// Path relative to the input root.
    pub relative_path: PathBuf,
    /// The last stage the file reached.
    pub stage: FileStage,
    /// Why it failed.
    pub reason: FileError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of files discovered and attempted.
    pub attempted: usize,
    /// Number of files written.
    pub succeeded: usize,
    /// One record per failed file, in processing order.
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    /// Number of failed files.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully transformed {}/{} files.",
            self.succeeded, self.attempted
        )
    }
}

/// Transforms every PCD file under an input root into a mirrored tree under
/// an output root.
///
/// Files are processed one after the other. A failing file is recorded in the
/// [`BatchReport`] and the run moves on; only a missing input root or an
/// unusable correspondence set stops the run.
#[derive(Debug, Clone)]
pub struct BatchPipeline<W = WalkdirWalker> {
    walker: W,
    extension: String,
    show_progress: bool,
}

impl Default for BatchPipeline<WalkdirWalker> {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchPipeline<WalkdirWalker> {
    /// A pipeline walking the input root recursively for `.pcd` files.
    pub fn new() -> Self {
        Self {
            walker: WalkdirWalker,
            extension: "pcd".to_string(),
            show_progress: false,
        }
    }
}

impl<W: SourceWalker> BatchPipeline<W> {
    /// Replace the directory walker.
    pub fn with_walker<V: SourceWalker>(self, walker: V) -> BatchPipeline<V> {
        BatchPipeline {
            walker,
            extension: self.extension,
            show_progress: self.show_progress,
        }
    }

    /// Set the file extension (without the dot) of input files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Draw a progress bar on stderr while processing.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Estimate the transform from `correspondences` and run the batch.
    ///
    /// A degenerate correspondence set is fatal: no file is touched.
    pub fn run(
        &self,
        input_root: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        correspondences: &CorrespondenceSet,
    ) -> Result<BatchReport, BatchError> {
        let transform = correspondences.estimate()?;
        log_transform(&transform, correspondences);
        self.run_with_transform(input_root, output_root, &transform)
    }

    /// Run the batch with an already estimated transform.
    pub fn run_with_transform(
        &self,
        input_root: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        transform: &RigidTransform,
    ) -> Result<BatchReport, BatchError> {
        let input_root = input_root.as_ref();
        let output_root = output_root.as_ref();

        if !input_root.is_dir() {
            return Err(BatchError::InputRootNotFound(input_root.to_path_buf()));
        }

        let entries = self.walker.walk(input_root, output_root, &self.extension);
        log::info!(
            "Found {} .{} files under {}",
            entries.len(),
            self.extension,
            input_root.display()
        );

        let pb = self.progress_bar(entries.len());
        let mut report = BatchReport::default();

        for entry in &entries {
            report.attempted += 1;

            let mut stage = FileStage::Discovered;
            match process_file(entry, transform, &mut stage) {
                Ok(()) => report.succeeded += 1,
                Err(reason) => {
                    log::warn!(
                        "{} failed after stage {:?}: {}",
                        entry.source.display(),
                        stage,
                        reason
                    );
                    report.failures.push(FileFailure {
                        relative_path: entry.relative.clone(),
                        stage,
                        reason,
                    });
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        log::info!("{report}");

        Ok(report)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} ({eta}) {msg}")
        {
            pb.set_style(style.progress_chars("##>-"));
        }
        pb.set_message("Transforming PCD files");
        pb
    }
}

/// Transform every PCD file under `input_root` into `output_root` using the
/// rigid transform estimated from `correspondences`.
///
/// Example:
///
/// ```no_run
/// use geopcd_batch::{run_batch, CorrespondenceSet};
///
/// let pairs = CorrespondenceSet::from_json_file("correspondences.json").unwrap();
/// let report = run_batch("scans", "scans_utm", &pairs).unwrap();
/// println!("{report}");
/// ```
pub fn run_batch(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    correspondences: &CorrespondenceSet,
) -> Result<BatchReport, BatchError> {
    BatchPipeline::new().run(input_root, output_root, correspondences)
}

/// Decode, transform, re-encode and write one file.
///
/// `stage` is advanced as each step completes, so on error it names the last
/// stage the file reached. Nothing is written unless every earlier stage
/// succeeded.
pub fn process_file(
    entry: &WalkEntry,
    transform: &RigidTransform,
    stage: &mut FileStage,
) -> Result<(), FileError> {
    let bytes = fs::read(&entry.source)?;

    let (header, header_len) = parse_header(&bytes)?;
    let layout = RecordLayout::from_header(&header)?;
    *stage = FileStage::HeaderParsed;

    let data = &bytes[header_len..];
    let mut points = decode_points(data, &layout, header.num_points())?;
    let used = layout.record_size() * header.num_points();
    if data.len() > used {
        log::warn!(
            "{}: dropping {} bytes after the last record",
            entry.source.display(),
            data.len() - used
        );
    }
    *stage = FileStage::Decoded;

    transform_points(transform, &layout, &mut points)?;
    *stage = FileStage::Transformed;

    let encoded = encode_points(&points, &layout)?;

    if let Some(parent) = entry.target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = std::io::BufWriter::new(fs::File::create(&entry.target)?);
    writer.write_all(header.as_bytes())?;
    writer.write_all(&encoded)?;
    writer.flush()?;
    *stage = FileStage::Written;

    log::debug!(
        "{} -> {} ({} points)",
        entry.source.display(),
        entry.target.display(),
        points.len()
    );

    Ok(())
}

fn log_transform(transform: &RigidTransform, correspondences: &CorrespondenceSet) {
    let r = transform.rotation();
    let euler = transform.euler_angles_xyz();
    log::info!("Transformation: Kabsch 3D rigid (no scaling)");
    log::info!("Rotation matrix (R): {:?} {:?} {:?}", r[0], r[1], r[2]);
    log::info!(
        "Euler angles (xyz): {:?} rad, {:?} deg",
        euler,
        euler.map(f64::to_degrees)
    );
    log::info!("Translation vector (t): {:?}", transform.translation());
    if let Ok(rmse) = correspondences.rmse(transform) {
        log::info!(
            "Residual RMSE over {} correspondences: {rmse:.4}",
            correspondences.local.len()
        );
    }
}
