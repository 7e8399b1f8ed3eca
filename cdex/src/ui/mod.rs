//! The cdex UI.
//!
//! The UI is a Pokédex browser over the backend. The screen is split into a
//! search box and result list on the left and a detail pane on the right,
//! with a status line along the bottom.
//!
//! Each piece of the screen is a [`Component`], which supports two
//! operations:
//! - Process input.
//! - Render.
//!
//! Keys are routed through the [`browser::Browser`], which owns the
//! components and decides which of them sees each key. Rendering is done
//! every frame; anything that needs the network is requested through the
//! [`Dex`] and simply drawn as loading until it arrives.

use crossterm::event::KeyEvent;

use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::Color;
use tui::style::Modifier;
use tui::style::Style;

use catchdex::effectiveness::BandStyle;
use catchdex::model::ty::Rgb;

use crate::dex::Dex;

pub mod browser;
pub mod detail;
pub mod list;
pub mod sprite;
pub mod stats;
pub mod types;
pub mod widgets;

#[derive(Copy, Clone, Debug)]
pub struct StyleSheet {
  pub focused: Style,
  pub unfocused: Style,
  pub selected: Style,
  pub error: Style,
  /// The height of a terminal cell relative to its width.
  pub font_height: f64,
}

impl Default for StyleSheet {
  fn default() -> Self {
    StyleSheet {
      focused: Style::default().fg(Color::White),
      unfocused: Style::default().fg(Color::Gray),
      selected: Style::default().add_modifier(Modifier::BOLD),
      error: Style::default()
        .fg(Color::LightRed)
        .add_modifier(Modifier::BOLD),
      font_height: 2.0,
    }
  }
}

/// Converts a model color into a terminal color.
pub fn color(rgb: Rgb) -> Color {
  Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Converts an effectiveness band style into a terminal style.
pub fn band_style(style: BandStyle) -> Style {
  Style::default()
    .bg(color(style.background))
    .fg(color(style.foreground))
}

/// Arguments for [`Component::process_key()`].
pub struct EventArgs<'browser> {
  pub key: KeyEvent,
  pub dex: &'browser Dex,
  /// Set by a component that has consumed the key.
  pub claimed: bool,
}

/// Arguments for [`Component::render()`].
pub struct RenderArgs<'browser> {
  pub is_focused: bool,
  pub dex: &'browser Dex,
  pub rect: Rect,
  pub output: &'browser mut Buffer,
  pub frame_number: usize,
  pub style_sheet: StyleSheet,
}

/// A component, which is like a [`tui::widgets::Widget`] but which can
/// process input and access the [`Dex`].
pub trait Component {
  /// Processes a key press, mutating own state.
  fn process_key(&mut self, args: &mut EventArgs) {
    let _ = args;
  }

  /// Renders this component.
  fn render(&mut self, args: &mut RenderArgs);
}
