//! Text bar chart for the hourly statistics tab.

use std::fmt::Write;

use pidns_core::statistics::{ChartId, ChartRenderer, HourlyChart};

const BAR_WIDTH: u64 = 40;

/// Keeps the most recently drawn chart as text.
#[derive(Debug, Default)]
pub struct TextChart {
    next: u64,
    current: Option<(ChartId, String)>,
}

impl TextChart {
    /// Text of the live chart, if one is drawn.
    pub fn rendered(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, text)| text.as_str())
    }
}

fn bar(value: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let len = usize::try_from(value.saturating_mul(BAR_WIDTH) / max).unwrap_or_default();
    "█".repeat(len)
}

pub fn render(chart: &HourlyChart) -> String {
    let mut out = String::new();
    let max = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .max()
        .unwrap_or(0);
    let label_width = chart.labels.iter().map(String::len).max().unwrap_or(0);

    for series in &chart.series {
        let _ = writeln!(out, "{}", series.label);
        for (label, value) in chart.labels.iter().zip(&series.values) {
            let _ = writeln!(out, "  {label:>label_width$} │{} {value}", bar(*value, max));
        }
    }
    out.trim_end().to_owned()
}

impl ChartRenderer for TextChart {
    fn draw(&mut self, chart: &HourlyChart) -> ChartId {
        self.next += 1;
        let id = ChartId(self.next);
        self.current = Some((id, render(chart)));
        id
    }

    fn dispose(&mut self, id: ChartId) {
        if self.current.as_ref().is_some_and(|(live, _)| *live == id) {
            self.current = None;
        }
    }
}
