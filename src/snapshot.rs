use crate::projector::ChartFrame;
use crate::render::ChartRenderer;
use crate::utils;

use rayon::prelude::*;

/// File name suffix of exported chart frames.
pub const SNAPSHOT_SUFFIX: &str = ".chart.bin";

/// Derives the snapshot path for an input file: `<output_dir>/<stem>.chart.bin`.
pub fn snapshot_path<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    output_dir: P,
    input: Q,
) -> std::path::PathBuf {
    let stem = input
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    output_dir.as_ref().join(format!("{}{}", stem, SNAPSHOT_SUFFIX))
}

/// Renderer that persists each frame it receives as a bincode snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: std::path::PathBuf,
}

impl SnapshotWriter {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Self {
        SnapshotWriter {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl ChartRenderer for SnapshotWriter {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()> {
        let data = bincode::serialize(frame)?;
        std::fs::write(&self.path, data)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", self.path.display(), e))?;
        tracing::debug!(path = %self.path.display(), "snapshot written");
        anyhow::Ok(())
    }
}

/// Loads a snapshot through a read-only memory map.
///
/// # Errors
/// * If the file can't be opened or mapped.
/// * If the contents are not a bincode-encoded `ChartFrame`.
pub fn load_snapshot<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<ChartFrame> {
    let file = std::fs::File::open(&path)?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };
    let frame = bincode::deserialize(&mmap)
        .map_err(|e| anyhow::anyhow!("Failed to decode {}: {}", path.as_ref().display(), e))?;
    anyhow::Ok(frame)
}

/// Reads every snapshot in `output_dir` and prints its first `count` candles.
///
/// Files are decoded in parallel on the current Rayon pool.
pub fn read_snapshots<P: AsRef<std::path::Path> + Send + Sync>(
    output_dir: P,
    count: usize,
) -> anyhow::Result<()> {
    let paths = std::fs::read_dir(output_dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(SNAPSHOT_SUFFIX))
        })
        .collect::<Vec<_>>();

    paths.par_iter().try_for_each(|path| {
        let frame = load_snapshot(path)?;
        let mut text = format!(
            "📄 {}: {} candles, {} indicator points\n",
            path.display(),
            frame.len(),
            frame.indicator.as_ref().map_or(0, |s| s.points.len()),
        );
        text.push_str(&utils::format_candles(&frame.candles, count)?);
        print!("{}", text);
        anyhow::Ok(())
    })?;

    anyhow::Ok(())
}
