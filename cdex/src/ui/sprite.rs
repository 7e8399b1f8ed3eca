//! Creature sprites, rasterized into colored text.

use image::imageops;
use image::imageops::FilterType;
use image::Rgba;
use image::RgbaImage;

use tui::layout::Alignment;
use tui::layout::Rect;
use tui::style::Color;
use tui::style::Modifier;
use tui::style::Style;
use tui::text::Span;
use tui::text::Spans;
use tui::text::Text;
use tui::widgets::Paragraph;
use tui::widgets::Widget;

use crate::ui::Component;
use crate::ui::RenderArgs;

/// A sprite loaded from a URL.
#[derive(Clone, Debug)]
pub struct Sprite {
  url: String,
  cache: Option<(Rect, Text<'static>)>,
}

impl Sprite {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      cache: None,
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }
}

/// Computes the size, in cells, that an image should be scaled to in order to
/// fit inside `rect` without distortion.
fn fit(rect: Rect, width: u32, height: u32, font_height: f64) -> (u32, u32) {
  let rect_aspect = rect.height as f64 / rect.width as f64;
  let image_aspect = height as f64 / width as f64;

  // Cells are taller than they are wide, so a "square" on screen is
  // `font_height` columns per row.
  if rect_aspect * font_height < image_aspect {
    let width = width as f64 * rect.height as f64 / height as f64;
    ((width * font_height) as u32, rect.height as u32)
  } else {
    let height = height as f64 * rect.width as f64 / width as f64;
    (rect.width as u32, (height / font_height) as u32)
  }
}

/// Rasterizes `image` into `width` by `height` cells of `@`s.
fn rasterize(image: &RgbaImage, width: u32, height: u32) -> Text<'static> {
  // Blacken fully transparent pixels so they don't bleed white into the
  // edges when filtering.
  let mut image = image.clone();
  for Rgba([r, g, b, a]) in image.pixels_mut() {
    if *a == 0 {
      *r = 0;
      *g = 0;
      *b = 0;
    }
  }

  // The nearest-neighbor resize only supplies the alpha mask.
  let mask = imageops::resize(&image, width, height, FilterType::Nearest);
  let mut resized =
    imageops::resize(&image, width, height, FilterType::Triangle);
  for (Rgba([_, _, _, a]), Rgba([_, _, _, out])) in
    mask.pixels().zip(resized.pixels_mut())
  {
    *out = *a;
  }

  let lines = resized
    .rows()
    .map(|row| {
      Spans::from(
        row
          .map(|&Rgba([r, g, b, a])| {
            Span::styled(
              if a != 0 { "@" } else { " " },
              Style::default()
                .fg(Color::Rgb(r, g, b))
                .add_modifier(Modifier::BOLD),
            )
          })
          .collect::<Vec<_>>(),
      )
    })
    .collect::<Vec<_>>();
  Text::from(lines)
}

impl Component for Sprite {
  fn render(&mut self, args: &mut RenderArgs) {
    if args.rect.height == 0 || args.rect.width == 0 {
      return;
    }

    let stale = match &self.cache {
      Some((rect, _)) => {
        rect.width != args.rect.width || rect.height != args.rect.height
      }
      None => true,
    };
    if stale {
      let image = match args.dex.load_png(&self.url) {
        Some(image) => image,
        None => return,
      };
      let (width, height) = fit(
        args.rect,
        image.width(),
        image.height(),
        args.style_sheet.font_height,
      );
      self.cache = Some((args.rect, rasterize(&image, width, height)));
    }

    let text = match &self.cache {
      Some((_, text)) => text,
      None => return,
    };

    let lines = (text.lines.len() as u16).min(args.rect.height);
    let dy = (args.rect.height - lines) / 2;
    let rect = Rect::new(args.rect.x, args.rect.y + dy, args.rect.width, lines);
    Paragraph::new(text.clone())
      .alignment(Alignment::Center)
      .render(rect, args.output);
  }
}
