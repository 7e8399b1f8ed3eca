//! Small custom widgets.

use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::widgets::Widget;

/// A spinner for indicating that something is loading.
#[derive(Clone, Debug)]
pub struct Spinner<'a> {
  frame_number: usize,
  label: Option<Spans<'a>>,
  style: Style,
  frequency: usize,
}

impl<'a> Spinner<'a> {
  pub fn new(frame_number: usize) -> Self {
    Self {
      frame_number,
      label: None,
      style: Style::default(),
      frequency: 5,
    }
  }

  pub fn label(mut self, label: impl Into<Spans<'a>>) -> Self {
    self.label = Some(label.into());
    self
  }

  pub fn style(mut self, style: Style) -> Self {
    self.style = style;
    self
  }

  pub fn into_spans(self) -> Spans<'a> {
    let icon = match self.frame_number / self.frequency % 4 {
      0 => "-",
      1 => "/",
      2 => "|",
      _ => "\\",
    };

    let mut spans = self.label.unwrap_or_default();
    for span in &mut spans.0 {
      span.style = self.style.patch(span.style);
    }

    if !spans.0.iter().all(|s| s.content.is_empty()) {
      spans.0.push(Span::styled(" ", self.style));
    }
    spans.0.push(Span::styled(icon, self.style));

    spans
  }
}

impl Widget for Spinner<'_> {
  fn render(self, rect: Rect, buf: &mut Buffer) {
    if rect.width == 0 || rect.height == 0 {
      return;
    }
    buf.set_spans(rect.x, rect.y, &self.into_spans(), rect.width);
  }
}

/// A one-column scroll bar drawn along the right edge of a rectangle.
#[derive(Clone, Debug)]
pub struct ScrollBar {
  ratio: f64,
  style: Style,
  pip_style: Style,
}

impl ScrollBar {
  /// Creates a scroll bar whose pip sits `ratio` of the way down.
  pub fn new(ratio: f64) -> Self {
    Self {
      ratio,
      style: Style::default(),
      pip_style: Style::default(),
    }
  }

  pub fn style(mut self, style: Style) -> Self {
    self.style = style;
    self
  }

  pub fn pip_style(mut self, style: Style) -> Self {
    self.pip_style = style;
    self
  }
}

impl Widget for ScrollBar {
  fn render(self, rect: Rect, buf: &mut Buffer) {
    let height = rect.height;
    if height == 0 || rect.width == 0 {
      return;
    }

    let ratio = if self.ratio.is_nan() {
      0.0
    } else {
      self.ratio.clamp(0.0, 1.0)
    };

    let selected = ((height - 1) as f64 * ratio) as u16;
    let x = rect.x + rect.width - 1;
    for i in 0..height {
      let (symbol, style) = match i {
        _ if i == selected => (
          if i == 0 {
            "▄"
          } else if i == height - 1 {
            "▀"
          } else {
            "█"
          },
          self.style.patch(self.pip_style),
        ),
        0 => ("┬", self.style),
        _ if i == height - 1 => ("┴", self.style),
        _ => ("│", self.style),
      };

      let cell = buf.get_mut(x, rect.y + i);
      cell.set_symbol(symbol);
      cell.set_style(style);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;

  #[test]
  fn spinner_spins() {
    let text = |n| {
      Spinner::new(n)
        .label("Loading")
        .into_spans()
        .0
        .iter()
        .map(|s| s.content.to_string())
        .collect::<String>()
    };
    assert_eq!(text(0), "Loading -");
    assert_eq!(text(5), "Loading /");
    assert_eq!(text(15), "Loading \\");
    assert_eq!(text(20), "Loading -");
  }

  #[test]
  fn scroll_bar_pip() {
    let rect = Rect::new(0, 0, 1, 5);
    let mut buf = Buffer::empty(rect);
    ScrollBar::new(1.0).render(rect, &mut buf);
    let column = (0..5)
      .map(|y| buf.get(0, y).symbol.clone())
      .collect::<Vec<_>>();
    assert_eq!(column, vec!["┬", "│", "│", "│", "▀"]);
  }
}
