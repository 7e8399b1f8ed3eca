//! Type badges and the type defense grid.

use catchdex::effectiveness::Cell;
use catchdex::Effectiveness;
use catchdex::TypeName;

use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Color;
use tui::style::Modifier;
use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::widgets::Widget;

use crate::ui::band_style;
use crate::ui::color;

/// The width of one grid cell, e.g. `FIR 1/2x `.
const CELL_WIDTH: usize = 9;

/// Returns a badge for a type, drawn in its color.
pub fn badge(ty: TypeName) -> Span<'static> {
  Span::styled(
    format!(" {} ", ty.name()),
    Style::default()
      .bg(color(ty.color()))
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )
}

/// A grid of how much damage each attacking type deals.
#[derive(Clone, Debug)]
pub struct TypeGrid<'a> {
  effectiveness: &'a Effectiveness,
}

impl<'a> TypeGrid<'a> {
  pub fn new(effectiveness: &'a Effectiveness) -> Self {
    Self { effectiveness }
  }

  /// Returns the text of one grid cell.
  pub fn cell_text(ty: TypeName, cell: &Cell) -> String {
    format!("{} {:<w$}", ty.abbreviation(), cell.label(), w = CELL_WIDTH - 4)
  }

  /// Lays the grid out in `columns` columns, in type order.
  pub fn lines(&self, columns: usize) -> Vec<Spans<'static>> {
    let cells = self.effectiveness.cells().collect::<Vec<_>>();
    cells
      .chunks(columns.max(1))
      .map(|row| {
        Spans::from(
          row
            .iter()
            .flat_map(|(ty, cell)| {
              vec![
                Span::styled(
                  Self::cell_text(*ty, cell),
                  band_style(cell.style()),
                ),
                Span::raw(" "),
              ]
            })
            .collect::<Vec<_>>(),
        )
      })
      .collect()
  }
}

impl Widget for TypeGrid<'_> {
  fn render(self, rect: Rect, buf: &mut Buffer) {
    let columns = (rect.width as usize / (CELL_WIDTH + 1)).clamp(1, 6);
    for (y, line) in self.lines(columns).iter().enumerate() {
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

  use catchdex::effectiveness::Band;
  use catchdex::Multiplier;
  use catchdex::Resolver;
  use catchdex::TypeChart;

  use pretty_assertions::assert_eq;

  #[test]
  fn cells_are_fixed_width() {
    let known = Cell::Known(Band::Quarter);
    assert_eq!(TypeGrid::cell_text(TypeName::Fire, &known), "FIR 1/4x ");
    let unknown = Cell::Unknown(Multiplier::pow2(3));
    assert_eq!(TypeGrid::cell_text(TypeName::Water, &unknown), "WAT 8x   ");
  }

  #[test]
  fn grid_rows() {
    let chart = TypeChart::standard();
    let eff = Resolver::new(&chart)
      .resolve(TypeName::Water, Some(TypeName::Ground));

    let lines = TypeGrid::new(&eff).lines(4);
    assert_eq!(lines.len(), 5);

    let grass = lines
      .iter()
      .flat_map(|l| l.0.iter())
      .find(|s| s.content.starts_with("GRA"))
      .unwrap();
    assert_eq!(grass.content, "GRA 4x   ");
    assert_eq!(grass.style, band_style(Band::Quadruple.style()));
  }
}
