//! The root UI type.

use crossbeam::channel::Receiver;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;

use tui::backend::Backend;
use tui::buffer::Buffer;
use tui::layout::Constraint;
use tui::layout::Direction;
use tui::layout::Layout;
use tui::layout::Rect;
use tui::text::Span;
use tui::widgets::Block;
use tui::widgets::Borders;
use tui::widgets::Widget;
use tui::Frame;

use catchdex::api;

use crate::dex::Dex;
use crate::ui::detail::DetailView;
use crate::ui::list::CreatureList;
use crate::ui::Component;
use crate::ui::EventArgs;
use crate::ui::RenderArgs;
use crate::ui::StyleSheet;

/// The root browser type.
pub struct Browser {
  query: String,
  /// The search term the list is waiting on, if any.
  pending: Option<String>,
  list: CreatureList,
  detail: Option<DetailView>,

  errors: Receiver<api::Error>,
  status: Option<String>,

  style_sheet: StyleSheet,
  frame_number: usize,
  done: bool,
}

impl Browser {
  /// Creates a browser that starts out listing the whole Pokédex, and which
  /// reports background failures from `errors`.
  pub fn new(errors: Receiver<api::Error>) -> Self {
    Self {
      query: String::new(),
      pending: Some(String::new()),
      list: CreatureList::new(),
      detail: None,
      errors,
      status: None,
      style_sheet: StyleSheet::default(),
      frame_number: 0,
      done: false,
    }
  }

  /// Returns whether the user has asked to quit.
  pub fn is_done(&self) -> bool {
    self.done
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  fn edit_query(&mut self, f: impl FnOnce(&mut String)) {
    f(&mut self.query);
    let term = self.query.trim().to_lowercase();
    if self.pending.as_deref() != Some(term.as_str()) {
      self.list.clear();
      self.pending = Some(term);
    }
  }

  /// Propagates a key press down to the components.
  ///
  /// The detail pane sees the key first, then the result list; anything
  /// left over edits the search box.
  pub fn process_key(&mut self, key: KeyEvent, dex: &Dex) {
    let m = key.modifiers;
    match key.code {
      KeyCode::Esc => {
        self.done = true;
        return;
      }
      KeyCode::Char('c') if m == KeyModifiers::CONTROL => {
        self.done = true;
        return;
      }
      _ => {}
    }

    let mut args = EventArgs {
      key,
      dex,
      claimed: false,
    };
    if let Some(detail) = &mut self.detail {
      detail.process_key(&mut args);
    }
    if !args.claimed {
      self.list.process_key(&mut args);
    }
    if args.claimed {
      return;
    }

    let plain = !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
      KeyCode::Char('u') if m == KeyModifiers::CONTROL => {
        self.edit_query(String::clear)
      }
      KeyCode::Char(c) if plain => self.edit_query(|q| q.push(c)),
      KeyCode::Backspace => self.edit_query(|q| {
        q.pop();
      }),
      _ => {}
    }
  }

  /// Pulls in results and errors that arrived since the last frame.
  ///
  /// A failed search stays pending; the [`Dex`] fetches it again after a
  /// short delay, so logging in from another shell unsticks it.
  fn poll(&mut self, dex: &Dex) {
    if let Some(term) = &self.pending {
      if let Some(results) = dex.search(term) {
        tracing::debug!(%term, count = results.len(), "search finished");
        self.list.set(results.to_vec());
        self.pending = None;
        self.status = None;
      }
    }

    while let Ok(e) = self.errors.try_recv() {
      tracing::error!("{}", e);
      self.status = Some(match e {
        api::Error::Unauthenticated => {
          "searching needs a session; run `cdex login` first".to_string()
        }
        e => e.to_string(),
      });
    }

    let selected = self.list.selected().map(|c| c.id);
    match selected {
      Some(id) if self.detail.as_ref().map(DetailView::id) != Some(id) => {
        self.detail = Some(DetailView::new(id))
      }
      Some(_) => {}
      None => self.detail = None,
    }
  }

  /// Draws every component into `buf`.
  pub fn draw(&mut self, dex: &Dex, rect: Rect, buf: &mut Buffer) {
    self.poll(dex);

    let rows = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(rect);
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(vec![Constraint::Percentage(35), Constraint::Percentage(65)])
      .split(rows[1]);

    let search = Block::default().borders(Borders::ALL).title("Search");
    let inner = search.inner(rows[0]);
    search.render(rows[0], buf);
    buf.set_stringn(
      inner.x,
      inner.y,
      format!("{}_", self.query),
      inner.width as usize,
      self.style_sheet.focused,
    );

    let style_sheet = self.style_sheet;
    self.list.render(&mut RenderArgs {
      is_focused: true,
      dex,
      rect: columns[0],
      output: &mut *buf,
      frame_number: self.frame_number,
      style_sheet,
    });
    if let Some(detail) = &mut self.detail {
      detail.render(&mut RenderArgs {
        is_focused: true,
        dex,
        rect: Rect {
          x: columns[1].x + 1,
          width: columns[1].width.saturating_sub(1),
          ..columns[1]
        },
        output: &mut *buf,
        frame_number: self.frame_number,
        style_sheet,
      });
    }

    let status = match &self.status {
      Some(status) => Span::styled(status.as_str(), style_sheet.error),
      None => Span::styled(
        "type to search  ↑↓ select  alt-s shiny  esc quit",
        style_sheet.unfocused,
      ),
    };
    buf.set_span(rows[2].x, rows[2].y, &status, rows[2].width);
  }

  /// Renders the UI onto a `Frame`.
  pub fn render<B: Backend>(&mut self, dex: &Dex, f: &mut Frame<B>) {
    struct BrowserAsWidget<'a> {
      b: &'a mut Browser,
      dex: &'a Dex,
    }
    impl Widget for BrowserAsWidget<'_> {
      fn render(self, rect: Rect, buf: &mut Buffer) {
        self.b.draw(self.dex, rect, buf);
      }
    }

    let size = f.size();
    f.render_widget(BrowserAsWidget { b: self, dex }, size);
    self.frame_number += 1;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use crossbeam::channel;

  use tui::backend::TestBackend;
  use tui::Terminal;

  use pretty_assertions::assert_eq;

  use crate::testing::offline_api;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn row(buf: &Buffer, y: u16) -> String {
    (0..buf.area.width).map(|x| buf.get(x, y).symbol.as_str()).collect()
  }

  #[test]
  fn typing_edits_the_query() {
    let (sink, errors) = channel::unbounded();
    let dex = Dex::new(offline_api(), sink);
    let mut browser = Browser::new(errors);

    for c in "Pika".chars() {
      browser.process_key(key(KeyCode::Char(c)), &dex);
    }
    browser.process_key(key(KeyCode::Backspace), &dex);
    assert_eq!(browser.query(), "Pik");
    assert_eq!(browser.pending.as_deref(), Some("pik"));
    assert!(browser.list.is_loading());

    browser.process_key(
      KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL),
      &dex,
    );
    assert_eq!(browser.query(), "");
    assert!(!browser.is_done());

    browser.process_key(key(KeyCode::Esc), &dex);
    assert!(browser.is_done());
  }

  #[test]
  fn draws_search_box_and_status() {
    let (sink, errors) = channel::unbounded();
    let dex = Dex::new(offline_api(), sink.clone());
    let mut browser = Browser::new(errors);
    browser.process_key(key(KeyCode::Char('x')), &dex);

    // Errors from background fetches land on the status line.
    sink.send(api::Error::Unauthenticated).unwrap();

    let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
    terminal.draw(|f| browser.render(&dex, f)).unwrap();

    let buf = terminal.backend().buffer();
    assert!(row(buf, 1).contains("x_"));
    assert!(row(buf, 11).contains("cdex login"));

    // The search is still waiting on its retry.
    assert_eq!(browser.pending.as_deref(), Some("x"));
    assert!(browser.list.is_loading());
  }
}
