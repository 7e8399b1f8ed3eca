//! Base stat bars.

use catchdex::model::stats;
use catchdex::model::stats::StatTier;
use catchdex::model::BaseStats;

use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::widgets::Widget;

use crate::ui::color;

/// A bar per base stat, followed by their total.
///
/// Each line looks like this:
/// ```text
/// HP   35 ///////////
/// Atk  55 /////////////////
/// ...
/// Tot 320
/// ```
#[derive(Clone, Debug)]
pub struct StatBars<'a> {
  stats: &'a BaseStats,
  style: Style,
}

impl<'a> StatBars<'a> {
  pub fn new(stats: &'a BaseStats) -> Self {
    Self {
      stats,
      style: Style::default(),
    }
  }

  pub fn style(mut self, style: Style) -> Self {
    self.style = style;
    self
  }

  /// Returns the lines this widget draws, given `bar_width` columns for the
  /// bars themselves.
  pub fn lines(&self, bar_width: u16) -> Vec<Spans<'static>> {
    let mut lines = self
      .stats
      .iter()
      .map(|(stat, value)| {
        let filled =
          bar_width as usize * stats::bar_percent(value) as usize / 100;
        let tier = self.style.fg(color(StatTier::of(value).color()));
        let label = format!("{:3} {:3} ", stat.short_label(), value);
        Spans::from(vec![
          Span::styled(label, self.style),
          Span::styled("/".repeat(filled), tier),
          Span::styled(" ".repeat(bar_width as usize - filled), self.style),
        ])
      })
      .collect::<Vec<_>>();

    lines.push(Spans::from(Span::styled(
      format!("Tot {:3}", self.stats.total()),
      self.style,
    )));
    lines
  }
}

impl Widget for StatBars<'_> {
  fn render(self, rect: Rect, buf: &mut Buffer) {
    // The label and number take up eight columns.
    let bar_width = rect.width.saturating_sub(8);
    for (y, line) in self.lines(bar_width).iter().enumerate() {
      let y = y as u16;
      if y >= rect.height {
        return;
      }
      buf.set_spans(rect.x, rect.y + y, line, rect.width);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;

  fn text(line: &Spans) -> String {
    line.0.iter().map(|s| s.content.as_ref()).collect()
  }

  #[test]
  fn bars_scale_and_saturate() {
    let stats = BaseStats {
      hp: 50,
      attack: 150,
      defense: 0,
      special_attack: 100,
      special_defense: 25,
      speed: 10,
    };
    let lines = StatBars::new(&stats).lines(10);
    let lines = lines.iter().map(text).collect::<Vec<_>>();
    assert_eq!(
      lines,
      vec![
        "HP   50 /////     ",
        "Atk 150 //////////",
        "Def   0           ",
        "SpA 100 //////////",
        "SpD  25 //        ",
        "Spe  10 /         ",
        "Tot 335",
      ]
    );
  }

  #[test]
  fn bars_are_colored_by_tier() {
    let stats = BaseStats {
      hp: 10,
      speed: 130,
      ..BaseStats::default()
    };
    let lines = StatBars::new(&stats).lines(4);
    assert_eq!(
      lines[0].0[1].style.fg,
      Some(color(StatTier::Poor.color()))
    );
    assert_eq!(
      lines[5].0[1].style.fg,
      Some(color(StatTier::Excellent.color()))
    );
  }
}
