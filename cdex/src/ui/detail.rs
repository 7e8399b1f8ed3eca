//! The detail pane for a single creature.

use crossterm::event::KeyCode;
use crossterm::event::KeyModifiers;

use tui::layout::Constraint;
use tui::layout::Direction;
use tui::layout::Layout;
use tui::layout::Rect;
use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::widgets::Widget;

use catchdex::effectiveness::Cell;
use catchdex::model::CreatureDetail;

use crate::ui::band_style;
use crate::ui::sprite::Sprite;
use crate::ui::stats::StatBars;
use crate::ui::types::badge;
use crate::ui::types::TypeGrid;
use crate::ui::widgets::Spinner;
use crate::ui::Component;
use crate::ui::EventArgs;
use crate::ui::RenderArgs;

/// Everything known about one creature: sprite, stats and type defenses.
#[derive(Clone, Debug)]
pub struct DetailView {
  id: u32,
  shiny: bool,
  sprite: Option<Sprite>,
}

impl DetailView {
  pub fn new(id: u32) -> Self {
    Self {
      id,
      shiny: false,
      sprite: None,
    }
  }

  pub fn id(&self) -> u32 {
    self.id
  }

  /// Formats the title line.
  pub fn header(detail: &CreatureDetail) -> Spans<'static> {
    let creature = &detail.creature;
    let mut spans = vec![Span::raw(format!(
      "#{:04} {}  Gen {} ",
      creature.national_dex, creature, creature.generation
    ))];
    for ty in creature.types() {
      spans.push(Span::raw(" "));
      spans.push(badge(ty));
    }
    Spans::from(spans)
  }

  /// Formats a warning line for every type the backend disagreed about.
  pub fn disagreements(
    detail: &CreatureDetail,
    error: Style,
  ) -> Vec<Spans<'static>> {
    detail
      .disagreements
      .iter()
      .map(|&(ty, remote)| {
        let local = detail.effectiveness.get(ty);
        Spans::from(vec![
          Span::styled(format!("! {} is ", ty), error),
          Span::styled(
            Cell::of(local).label(),
            band_style(Cell::of(local).style()),
          ),
          Span::styled(format!(", server says {}x", remote), error),
        ])
      })
      .collect()
  }
}

impl Component for DetailView {
  fn process_key(&mut self, args: &mut EventArgs) {
    if args.key.code == KeyCode::Char('s')
      && args.key.modifiers == KeyModifiers::ALT
    {
      self.shiny = !self.shiny;
      self.sprite = None;
      args.claimed = true;
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

    let detail = match args.dex.detail(self.id) {
      Some(detail) => detail,
      None => {
        Spinner::new(args.frame_number)
          .style(style)
          .label("Loading...")
          .render(args.rect, args.output);
        return;
      }
    };

    let warnings = Self::disagreements(&detail, args.style_sheet.error);
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Length(2),
        Constraint::Min(7),
        Constraint::Length(6),
        Constraint::Length(warnings.len() as u16),
      ])
      .split(args.rect);

    let header = Self::header(&detail);
    args
      .output
      .set_spans(chunks[0].x, chunks[0].y, &header, chunks[0].width);

    let body = Layout::default()
      .direction(Direction::Horizontal)
      .constraints(vec![Constraint::Percentage(40), Constraint::Percentage(60)])
      .split(chunks[1]);

    if self.sprite.is_none() {
      self.sprite = args
        .dex
        .api()
        .image_url(&detail.creature, self.shiny)
        .map(Sprite::new);
    }
    match &mut self.sprite {
      Some(sprite) => sprite.render(&mut RenderArgs {
        is_focused: args.is_focused,
        dex: args.dex,
        rect: body[0],
        output: &mut *args.output,
        frame_number: args.frame_number,
        style_sheet: args.style_sheet,
      }),
      None => {
        args.output.set_stringn(
          body[0].x,
          body[0].y,
          "(no image)",
          body[0].width as usize,
          style,
        );
      }
    }

    let stats = Rect {
      x: body[1].x + 1,
      width: body[1].width.saturating_sub(1),
      ..body[1]
    };
    StatBars::new(&detail.creature.stats)
      .style(style)
      .render(stats, args.output);

    TypeGrid::new(&detail.effectiveness).render(chunks[2], args.output);

    for (i, line) in warnings.iter().enumerate() {
      let y = chunks[3].y + i as u16;
      if y >= chunks[3].y + chunks[3].height {
        break;
      }
      args
        .output
        .set_spans(chunks[3].x, y, line, chunks[3].width);
    }
  }
}
