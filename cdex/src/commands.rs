//! One-shot subcommands, which print to stdout and exit.

use std::fmt::Write as _;
use std::io;
use std::io::BufRead as _;
use std::io::Write as _;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use tui::text::Spans;

use catchdex::effectiveness::Cell;
use catchdex::model::event;
use catchdex::model::CaptureSummary;
use catchdex::model::CreatureDetail;
use catchdex::model::Event;
use catchdex::model::Game;
use catchdex::model::Player;
use catchdex::model::PlayerStats;
use catchdex::Api;
use catchdex::Effectiveness;
use catchdex::TypeChart;
use catchdex::TypeName;

use crate::ui::stats::StatBars;
use crate::ui::types::TypeGrid;

/// Width of the bars printed by `show`.
const BAR_WIDTH: u16 = 30;

fn plain(line: &Spans) -> String {
  line.0.iter().map(|s| s.content.as_ref()).collect()
}

fn password(given: Option<String>) -> Result<String> {
  if let Some(password) = given {
    return Ok(password);
  }

  print!("password: ");
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("could not read password")?;
  Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

/// Log in and remember the session
#[derive(Parser)]
pub struct Login {
  /// Account email
  email: String,

  /// Account password; read from stdin when not given
  #[arg(long, env = "CATCHDEX_PASSWORD", hide_env_values = true)]
  password: Option<String>,
}

impl Login {
  pub fn execute(self, api: &Api) -> Result<()> {
    let password = password(self.password)?;
    api.login(&self.email, &password)?;
    println!("logged in as {}", self.email);
    Ok(())
  }
}

/// Create an account
#[derive(Parser)]
pub struct Signup {
  /// Account email
  email: String,

  /// Account password; read from stdin when not given
  #[arg(long, env = "CATCHDEX_PASSWORD", hide_env_values = true)]
  password: Option<String>,
}

impl Signup {
  pub fn execute(self, api: &Api) -> Result<()> {
    let password = password(self.password)?;
    if api.signup(&self.email, &password)? {
      println!("signed up and logged in as {}", self.email);
    } else {
      println!(
        "signed up as {}; run `cdex login` to start a session",
        self.email
      );
    }
    Ok(())
  }
}

pub fn logout(api: &Api) -> Result<()> {
  api.logout()?;
  println!("logged out");
  Ok(())
}

pub fn format_games(games: &[Game]) -> String {
  let mut out = String::new();
  for game in games {
    let _ = writeln!(
      out,
      "{:>4}  {} ({} players)",
      game.id, game.name, game.player_count
    );
  }
  out
}

pub fn format_players(players: &[Player]) -> String {
  let mut out = String::new();
  for player in players {
    let _ = write!(out, "{:>4}  {}", player.id, player.name);
    if let Some(fav) = &player.pokemon {
      let _ = write!(out, "  ♥ {}", fav.name);
    }
    out.push('\n');
  }
  out
}

/// Formats events grouped by player.
pub fn format_events(events: &[Event]) -> String {
  let mut out = String::new();
  for (_, group) in event::by_player(events) {
    let _ = writeln!(out, "{}:", group[0].player.name);
    for e in group {
      let mut flags = String::new();
      if e.is_shiny {
        flags.push_str(" ✦");
      }
      if e.is_champ {
        flags.push_str(" ★");
      }
      let _ = writeln!(
        out,
        "  {:>4}  {:<12} {:<12} {:<16} {}{}",
        e.id, e.pokemon.name, e.nickname, e.route, e.status, flags
      );
    }
  }
  out
}

pub fn format_stats(
  stats: &PlayerStats,
  captures: &[CaptureSummary],
) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", stats.player_name);
  let _ = writeln!(
    out,
    "  {} encounters: {} caught, {} ran away, {} defeated, {} shiny",
    stats.encounters(),
    stats.caught,
    stats.runaway,
    stats.defeated,
    stats.shiny
  );

  let top = stats
    .top_types()
    .into_iter()
    .take(3)
    .map(|(ty, n)| format!("{} x{}", ty, n))
    .collect::<Vec<_>>();
  if !top.is_empty() {
    let _ = writeln!(out, "  favourite types: {}", top.join(", "));
  }

  for c in captures {
    let name = match &c.form {
      Some(form) => format!("{} ({})", c.name, form),
      None => c.name.clone(),
    };
    let _ = writeln!(
      out,
      "  {:<20} x{}{}",
      name,
      c.times_captured,
      if c.shiny_capture { " ✦" } else { "" }
    );
  }
  out
}

/// Formats a creature's record: its header, stat bars and type defenses.
pub fn format_creature(detail: &CreatureDetail) -> String {
  let creature = &detail.creature;
  let mut out = String::new();
  let types = creature
    .types()
    .map(TypeName::name)
    .collect::<Vec<_>>()
    .join("/");
  let _ = writeln!(
    out,
    "#{:04} {}  [{}]  Gen {}",
    creature.national_dex, creature, types, creature.generation
  );
  if let Err(e) = creature.check_total() {
    let _ = writeln!(out, "warning: {}", e);
  }

  out.push('\n');
  for line in StatBars::new(&creature.stats).lines(BAR_WIDTH) {
    let _ = writeln!(out, "{}", plain(&line).trim_end());
  }

  out.push('\n');
  out.push_str(&format_matchup(&detail.effectiveness));
  for &(ty, remote) in &detail.disagreements {
    let _ = writeln!(out, "warning: server says {} deals {}x", ty, remote);
  }
  out
}

/// Formats an effectiveness mapping as a four-column grid.
pub fn format_matchup(effectiveness: &Effectiveness) -> String {
  let mut out = String::new();
  for line in TypeGrid::new(effectiveness).lines(4) {
    let _ = writeln!(out, "{}", plain(&line).trim_end());
  }
  out
}

/// Formats a whole chart, attacking types down the side and defending types
/// across the top. Neutral entries are left as dots.
pub fn format_chart(chart: &TypeChart) -> String {
  let mut out = String::from("atk\\def");
  for ty in TypeName::ALL {
    let _ = write!(out, " {:>4}", ty.abbreviation());
  }
  out.push('\n');

  for &attacking in TypeName::ALL {
    let _ = write!(out, "{:<7}", attacking.abbreviation());
    for &defending in TypeName::ALL {
      let m = chart.get(attacking, defending);
      let label = if m == catchdex::Multiplier::NEUTRAL {
        ".".to_string()
      } else {
        Cell::of(m).label()
      };
      let _ = write!(out, " {:>4}", label);
    }
    out.push('\n');
  }
  out
}

/// List the games you can see
pub fn games(api: &Api) -> Result<()> {
  print!("{}", format_games(&api.games()?));
  Ok(())
}

/// List every player
pub fn players(api: &Api) -> Result<()> {
  print!("{}", format_players(&api.players()?));
  Ok(())
}

/// List a game's encounters
#[derive(Parser)]
pub struct Events {
  /// The game's ID
  #[arg(value_name = "GAME")]
  game_id: u32,
}

impl Events {
  pub fn execute(self, api: &Api) -> Result<()> {
    print!("{}", format_events(&api.events(self.game_id)?));
    Ok(())
  }
}

/// Show a player's tallies
#[derive(Parser)]
pub struct Stats {
  /// The player's ID
  #[arg(value_name = "PLAYER")]
  player_id: u32,
}

impl Stats {
  pub fn execute(self, api: &Api) -> Result<()> {
    let stats = api.player_stats(self.player_id)?;
    let captures = api.player_captures(self.player_id)?;
    print!("{}", format_stats(&stats, &captures));
    Ok(())
  }
}

/// Show one creature
#[derive(Parser)]
pub struct Show {
  /// The creature's ID
  #[arg(value_name = "ID")]
  id: u32,
}

impl Show {
  pub fn execute(self, api: &Api) -> Result<()> {
    let detail = api
      .creature(self.id)
      .with_context(|| format!("could not fetch creature {}", self.id))?;
    print!("{}", format_creature(&detail));
    Ok(())
  }
}

/// Show what every type deals to a type combination
#[derive(Parser)]
pub struct Matchup {
  /// The defender's primary type
  type1: String,
  /// The defender's secondary type
  type2: Option<String>,
}

impl Matchup {
  pub fn execute(self, api: &Api) -> Result<()> {
    let effectiveness = api
      .resolver()
      .resolve_names(&self.type1, self.type2.as_deref())?;
    print!("{}", format_matchup(&effectiveness));
    Ok(())
  }
}

/// Print the type chart in use
pub fn chart(api: &Api) -> Result<()> {
  print!("{}", format_chart(api.chart()));
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  use catchdex::model::EventFlags;
  use catchdex::model::Status;
  use catchdex::Resolver;

  use pretty_assertions::assert_eq;

  use crate::testing::squirtle;

  #[test]
  fn creature_sheet() {
    let detail = CreatureDetail::new(squirtle(), &Resolver::default());
    let text = format_creature(&detail);
    let lines = text.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "#0007 Squirtle  [Water]  Gen 1");
    assert_eq!(lines[2], "HP   44 /////////////");
    assert_eq!(lines[8], "Tot 314");
    assert!(text.contains("GRA 2x"));
    assert!(text.contains("FIR 1/2x"));
    assert!(!text.contains("warning"));
  }

  #[test]
  fn creature_sheet_warns_on_bad_totals() {
    let mut creature = squirtle();
    creature.total = 999;
    let text = format_creature(&CreatureDetail::new(creature, &Resolver::default()));
    assert!(text.contains("warning: "));
  }

  #[test]
  fn chart_rows() {
    let text = format_chart(&TypeChart::standard());
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 1 + TypeName::COUNT);
    assert!(lines[0].starts_with("atk\\def  NOR  FIR"));

    // Normal deals nothing to Ghost and half to Rock and Steel.
    let normal = lines[1].split_whitespace().collect::<Vec<_>>();
    assert_eq!(normal[0], "NOR");
    assert_eq!(normal[TypeName::Ghost.index() + 1], "0x");
    assert_eq!(normal[TypeName::Rock.index() + 1], "1/2x");
    assert_eq!(normal[TypeName::Normal.index() + 1], ".");
  }

  #[test]
  fn events_are_grouped() {
    let event = |id, player_id, name: &str| Event {
      id,
      pokemon_id: 7,
      pokemon: event::EventCreature {
        name: "Squirtle".into(),
        form: None,
        type1: TypeName::Water,
        type2: None,
        total: 314,
        image: None,
      },
      player: Player {
        id: player_id,
        name: name.into(),
        pokemon_id: None,
        pokemon: None,
        user_id: None,
      },
      route: "Route 1".into(),
      nickname: "Shelly".into(),
      status: Status::Caught,
      is_shiny: id == 2,
      is_champ: false,
      game_id: 1,
      pokemon_image: None,
    };

    let events = vec![event(1, 2, "Blue"), event(2, 1, "Red"), event(3, 2, "Blue")];
    assert_eq!(events[1].flags(), EventFlags { is_shiny: true, is_champ: false });

    let text = format_events(&events);
    let headers = text
      .lines()
      .filter(|l| !l.starts_with(' '))
      .collect::<Vec<_>>();
    assert_eq!(headers, vec!["Red:", "Blue:"]);
    assert!(text.contains("Caught ✦"));
  }

  #[test]
  fn player_tallies() {
    let stats = PlayerStats {
      player_name: "Red".into(),
      caught: 4,
      runaway: 1,
      defeated: 2,
      shiny: 1,
      type_counts: [(TypeName::Water, 1), (TypeName::Fire, 3)]
        .into_iter()
        .collect(),
    };
    let captures = vec![CaptureSummary {
      id: 52,
      name: "Meowth".into(),
      form: Some("Alola".into()),
      image: None,
      shiny_image: None,
      times_captured: 2,
      shiny_capture: true,
      type1: TypeName::Dark,
      type2: None,
    }];

    let text = format_stats(&stats, &captures);
    assert_eq!(
      text.lines().collect::<Vec<_>>(),
      vec![
        "Red",
        "  7 encounters: 4 caught, 1 ran away, 2 defeated, 1 shiny",
        "  favourite types: Fire x3, Water x1",
        "  Meowth (Alola)       x2 ✦",
      ]
    );
  }

  #[test]
  fn games_and_players() {
    let games = vec![Game {
      id: 3,
      name: "Nuzlocke".into(),
      player_count: 2,
    }];
    assert_eq!(format_games(&games), "   3  Nuzlocke (2 players)\n");

    let players = vec![Player {
      id: 1,
      name: "Red".into(),
      pokemon_id: Some(25),
      pokemon: Some(catchdex::model::game::Favourite {
        name: "Pikachu".into(),
        image: None,
      }),
      user_id: None,
    }];
    assert_eq!(format_players(&players), "   1  Red  ♥ Pikachu\n");
  }
}
