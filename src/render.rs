use crate::projector::ChartFrame;
use crate::utils;

/// Consumer of a fully projected frame.
///
/// Renderers only ever see complete frames; a failed load or projection never
/// reaches them.
pub trait ChartRenderer {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()>;
}

/// Describes a frame as text: legend, axis range, bounds and the hover tooltips of
/// the first rows. Output accumulates until [`ConsolePreview::take_output`].
#[derive(Debug, Clone)]
pub struct ConsolePreview {
    rows: usize,
    output: String,
}

impl ConsolePreview {
    pub fn new(rows: usize) -> Self {
        ConsolePreview {
            rows,
            output: String::new(),
        }
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl ChartRenderer for ConsolePreview {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()> {
        let mut text = format!("📊 Legend: {}\n", legend(frame).join(", "));

        if let (Some(first), Some(last)) = (frame.candles.first(), frame.candles.last()) {
            text.push_str(&format!(
                "🕒 Range: {} .. {} (bar width {})\n",
                utils::format_axis_tick(first.timestamp)?.replace('\n', " "),
                utils::format_axis_tick(last.timestamp)?.replace('\n', " "),
                frame.bar_width,
            ));
        }

        if !frame.bounds.is_unset() {
            let b = frame.bounds;
            text.push_str(&format!(
                "📐 Bounds: x [{:.0}, {:.0}], y [{:.2}, {:.2}]\n",
                b.min_x, b.max_x, b.min_y, b.max_y
            ));
        }

        text.push_str(&utils::format_candles(&frame.candles, self.rows)?);
        self.output.push_str(&text);
        anyhow::Ok(())
    }
}

/// Forwarding impl so a renderer can be lent to a [`crate::pipeline::RenderTargets`]
/// and read back afterwards.
impl<R: ChartRenderer + ?Sized> ChartRenderer for &mut R {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()> {
        (**self).render(frame)
    }
}

/// Legend entries in draw order.
pub fn legend(frame: &ChartFrame) -> Vec<&str> {
    let mut names = vec!["Candles", "Volume"];
    if let Some(indicator) = &frame.indicator {
        names.push(indicator.name.as_str());
    }
    names
}

/// Records every frame it is given. Used to observe the render feed in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<ChartFrame>,
    pub fail: bool,
}

#[cfg(test)]
impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, frame: &ChartFrame) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow::anyhow!("renderer rejected frame"));
        }
        self.frames.push(frame.clone());
        Ok(())
    }
}
