use crate::column_store::{self, ColumnStore};
use crate::log_sink::LogSink;
use crate::projector::{self, ChartFrame, SeriesProjector};
use crate::render::ChartRenderer;

/// Result of one open-and-render action.
#[derive(Debug)]
pub enum OpenOutcome {
    Rendered {
        rows: usize,
        indicator_points: usize,
    },
    /// The action was aborted; the error has already been written to the log sink.
    Failed(anyhow::Error),
}

impl OpenOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, OpenOutcome::Rendered { .. })
    }
}

/// Load → project → render for one chart.
///
/// Owns its column store exclusively; `open_file` takes `&mut self`, so a second load
/// can't start while one is running on the same pipeline. The last frame every renderer
/// accepted is kept, and a failed open leaves it untouched.
#[derive(Debug, Default)]
pub struct Pipeline {
    store: ColumnStore,
    projector: SeriesProjector,
    frame: Option<ChartFrame>,
}

impl Pipeline {
    pub fn new(projector: SeriesProjector) -> Self {
        Pipeline {
            store: ColumnStore::new(),
            projector,
            frame: None,
        }
    }

    /// Opens `path`, rebuilds the store, projects it and hands the frame to `renderer`.
    ///
    /// Never panics on bad input: every failure is reported to `sink` as
    /// `Caught error: ...` and returned as [`OpenOutcome::Failed`].
    pub fn open_file<P: AsRef<std::path::Path>>(
        &mut self,
        path: P,
        sink: &mut dyn LogSink,
        renderer: &mut dyn ChartRenderer,
    ) -> OpenOutcome {
        match self.try_open(path.as_ref(), sink, renderer) {
            Ok(frame) => {
                let outcome = OpenOutcome::Rendered {
                    rows: frame.len(),
                    indicator_points: frame.indicator.as_ref().map_or(0, |s| s.points.len()),
                };
                self.frame = Some(frame);
                outcome
            }
            Err(e) => {
                tracing::warn!(path = %path.as_ref().display(), error = %e, "open aborted");
                sink.append_emphasized(&format!("Caught error: {}\n", e));
                OpenOutcome::Failed(e)
            }
        }
    }

    fn try_open(
        &mut self,
        path: &std::path::Path,
        sink: &mut dyn LogSink,
        renderer: &mut dyn ChartRenderer,
    ) -> anyhow::Result<ChartFrame> {
        self.store.clear();
        let raw = column_store::read_table_text(path)?;
        sink.append_emphasized(&format!("Opening {}\n", path.display()));

        self.store.load(&raw)?;
        sink.append("Found csv keys: ");
        for name in self.store.column_names() {
            sink.append_emphasized(&format!("{}, ", name));
        }
        sink.append("\n");

        let timestamps = self.store.get(projector::TIMESTAMP)?.len();
        sink.append_emphasized(&format!("{} timestamps read\n", timestamps));

        let frame = self.projector.project(&self.store)?;

        renderer.render(&frame)?;
        Ok(frame)
    }

    /// Last successfully rendered frame.
    pub fn frame(&self) -> Option<&ChartFrame> {
        self.frame.as_ref()
    }

    pub fn store(&self) -> &ColumnStore {
        &self.store
    }
}

/// Fans a frame out to several renderers in order, stopping at the first failure.
#[derive(Default)]
pub struct RenderTargets<'a> {
    targets: Vec<Box<dyn ChartRenderer + Send + 'a>>,
}

impl<'a> RenderTargets<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<R: ChartRenderer + Send + 'a>(&mut self, renderer: R) {
        self.targets.push(Box::new(renderer));
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl ChartRenderer for RenderTargets<'_> {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()> {
        for target in &mut self.targets {
            target.render(frame)?;
        }
        anyhow::Ok(())
    }
}
