//! Scrolling list of search results.

use crossterm::event::KeyCode;
use crossterm::event::KeyModifiers;

use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::widgets::Widget;

use catchdex::model::Creature;

use crate::ui::color;
use crate::ui::widgets::ScrollBar;
use crate::ui::widgets::Spinner;
use crate::ui::Component;
use crate::ui::EventArgs;
use crate::ui::RenderArgs;
use crate::util::SelectedVec;

/// A list of creatures with one of them selected.
#[derive(Clone, Debug, Default)]
pub struct CreatureList {
  items: Option<SelectedVec<Creature>>,
  offset: usize,
  height: usize,
}

impl CreatureList {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces the list's contents, keeping the selected creature selected
  /// if it is still present.
  pub fn set(&mut self, creatures: Vec<Creature>) {
    match &mut self.items {
      Some(items) => items.replace(creatures, |a, b| a.id == b.id),
      None => self.items = Some(creatures.into()),
    }
  }

  /// Marks the list as waiting for new contents.
  pub fn clear(&mut self) {
    self.items = None;
    self.offset = 0;
  }

  pub fn is_loading(&self) -> bool {
    self.items.is_none()
  }

  pub fn selected(&self) -> Option<&Creature> {
    self.items.as_ref()?.selected()
  }

  /// Formats a single row.
  pub fn row(creature: &Creature) -> Spans<'static> {
    let mut spans = vec![Span::raw(format!(
      "#{:04} {} ",
      creature.national_dex, creature
    ))];
    for ty in creature.types() {
      spans.push(Span::styled(
        ty.abbreviation(),
        Style::default().fg(color(ty.color())),
      ));
      spans.push(Span::raw(" "));
    }
    spans.pop();
    Spans::from(spans)
  }

  /// Moves the viewport so that the selection is visible.
  fn scroll_to_selection(&mut self, selection: usize) {
    if self.height == 0 {
      return;
    }
    if selection < self.offset {
      self.offset = selection;
    } else if selection >= self.offset + self.height {
      self.offset = selection + 1 - self.height;
    }
  }
}

impl Component for CreatureList {
  fn process_key(&mut self, args: &mut EventArgs) {
    let items = match &mut self.items {
      Some(items) => items,
      None => return,
    };

    let page = self.height.max(1) as isize;
    let m = args.key.modifiers;
    let delta = match args.key.code {
      KeyCode::Up => -1,
      KeyCode::Down => 1,
      KeyCode::PageUp => -page,
      KeyCode::PageDown => page,
      KeyCode::Char('u') if m == KeyModifiers::CONTROL => -page,
      KeyCode::Char('d') if m == KeyModifiers::CONTROL => page,
      _ => return,
    };

    args.claimed = true;
    if items.shift(delta) {
      let selection = items.selection();
      self.scroll_to_selection(selection);
    }
  }

  fn render(&mut self, args: &mut RenderArgs) {
    if args.rect.width == 0 || args.rect.height == 0 {
      return;
    }

    let style = if args.is_focused {
      args.style_sheet.focused
    } else {
      args.style_sheet.unfocused
    };

    self.height = args.rect.height as usize;
    let items = match &self.items {
      Some(items) => items,
      None => {
        Spinner::new(args.frame_number)
          .style(style)
          .label("Searching...")
          .render(args.rect, args.output);
        return;
      }
    };

    if items.is_empty() {
      args.output.set_stringn(
        args.rect.x,
        args.rect.y,
        "No results",
        args.rect.width as usize,
        style,
      );
      return;
    }

    let selection = items.selection();
    let selected_style = style.patch(args.style_sheet.selected);
    self.offset = self.offset.min(selection);
    if selection >= self.offset + self.height {
      self.offset = selection + 1 - self.height;
    }

    // Leave a column for the scroll bar.
    let width = args.rect.width.saturating_sub(3);
    for (y, (i, creature)) in items
      .iter()
      .enumerate()
      .skip(self.offset)
      .take(self.height)
      .enumerate()
    {
      let y = args.rect.y + y as u16;
      let (symbol, style) = if i == selection {
        ("> ", selected_style)
      } else {
        ("  ", style)
      };
      args.output.set_stringn(
        args.rect.x,
        y,
        symbol,
        args.rect.width as usize,
        style,
      );

      let mut line = Self::row(creature);
      for span in &mut line.0 {
        span.style = style.patch(span.style);
      }
      args.output.set_spans(args.rect.x + 2, y, &line, width);
    }

    let ratio = selection as f64 / items.len().saturating_sub(1) as f64;
    ScrollBar::new(ratio)
      .style(style)
      .render(args.rect, args.output);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::testing::squirtle;

  use pretty_assertions::assert_eq;

  fn numbered(n: u32) -> Vec<Creature> {
    (1..=n)
      .map(|id| Creature {
        id,
        national_dex: id,
        ..squirtle()
      })
      .collect()
  }

  #[test]
  fn rows() {
    let row = CreatureList::row(&squirtle());
    let text = row.0.iter().map(|s| s.content.as_ref()).collect::<String>();
    assert_eq!(text, "#0007 Squirtle WAT");
  }

  #[test]
  fn scrolling_follows_the_selection() {
    let mut list = CreatureList::new();
    assert!(list.is_loading());
    list.set(numbered(20));
    list.height = 5;

    list.items.as_mut().unwrap().shift(7);
    list.scroll_to_selection(7);
    assert_eq!(list.offset, 3);

    list.items.as_mut().unwrap().shift(-6);
    list.scroll_to_selection(1);
    assert_eq!(list.offset, 1);
  }

  #[test]
  fn new_results_keep_the_selection() {
    let mut list = CreatureList::new();
    list.set(numbered(5));
    list.items.as_mut().unwrap().shift(2);
    assert_eq!(list.selected().map(|c| c.id), Some(3));

    list.set(numbered(10).into_iter().skip(1).collect());
    assert_eq!(list.selected().map(|c| c.id), Some(3));
  }
}
