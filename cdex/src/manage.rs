//! Subcommands that change what the backend stores: games, players,
//! encounters and Pokédex entries.

use std::fmt::Write as _;
use std::io;
use std::io::BufRead as _;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use catchdex::api::Upload;
use catchdex::model::Creature;
use catchdex::model::EventFlags;
use catchdex::model::NewCreature;
use catchdex::model::NewEvent;
use catchdex::model::NewGame;
use catchdex::model::NewPlayer;
use catchdex::model::PlayerGame;
use catchdex::model::Status;
use catchdex::Api;
use catchdex::TypeName;

/// Game management commands
#[derive(Parser)]
pub enum GameCommand {
  New(NewGameCmd),
  Rm(RmGame),
  Players(GamePlayers),
}

impl GameCommand {
  pub fn execute(self, api: &Api) -> Result<()> {
    match self {
      Self::New(cmd) => cmd.execute(api),
      Self::Rm(cmd) => cmd.execute(api),
      Self::Players(cmd) => cmd.execute(api),
    }
  }
}

/// Player management commands
#[derive(Parser)]
pub enum PlayerCommand {
  New(NewPlayerCmd),
}

impl PlayerCommand {
  pub fn execute(self, api: &Api) -> Result<()> {
    match self {
      Self::New(cmd) => cmd.execute(api),
    }
  }
}

/// Encounter commands
#[derive(Parser)]
pub enum EventCommand {
  Add(AddEvent),
  Status(SetStatus),
  Flag(SetFlags),
  Rm(RmEvent),
}

impl EventCommand {
  pub fn execute(self, api: &Api) -> Result<()> {
    match self {
      Self::Add(cmd) => cmd.execute(api),
      Self::Status(cmd) => cmd.execute(api),
      Self::Flag(cmd) => cmd.execute(api),
      Self::Rm(cmd) => cmd.execute(api),
    }
  }
}

/// Pokédex entry commands
#[derive(Parser)]
pub enum DexCommand {
  Add(AddCreature),
  Edit(EditCreature),
  Search(SearchEncounters),
}

impl DexCommand {
  pub fn execute(self, api: &Api) -> Result<()> {
    match self {
      Self::Add(cmd) => cmd.execute(api),
      Self::Edit(cmd) => cmd.execute(api),
      Self::Search(cmd) => cmd.execute(api),
    }
  }
}

/// Asks before deleting something.
fn confirm(what: &str) -> Result<bool> {
  print!("delete {}? [y/N] ", what);
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("could not read confirmation")?;
  Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Start a game with some players
#[derive(Parser)]
pub struct NewGameCmd {
  /// The game's name
  name: String,

  /// ID of a player taking part; repeat for each player
  #[arg(short, long = "player", value_name = "PLAYER", required = true)]
  players: Vec<u32>,
}

impl NewGameCmd {
  pub fn execute(self, api: &Api) -> Result<()> {
    let game = api.create_game(&NewGame {
      name: self.name,
      players: self.players,
    })?;
    println!("created game {} ({})", game.id, game.name);
    Ok(())
  }
}

/// Delete a game
#[derive(Parser)]
pub struct RmGame {
  /// The game's ID
  #[arg(value_name = "GAME")]
  id: u32,

  /// Skip the confirmation prompt
  #[arg(short = 'y', long)]
  yes: bool,
}

impl RmGame {
  pub fn execute(self, api: &Api) -> Result<()> {
    if !self.yes && !confirm(&format!("game {}", self.id))? {
      println!("cancelled");
      return Ok(());
    }
    api.delete_game(self.id)?;
    println!("deleted game {}", self.id);
    Ok(())
  }
}

/// List the players of a game
#[derive(Parser)]
pub struct GamePlayers {
  /// The game's ID
  #[arg(value_name = "GAME")]
  id: u32,
}

impl GamePlayers {
  pub fn execute(self, api: &Api) -> Result<()> {
    print!("{}", format_game_players(&api.game_players(self.id)?));
    Ok(())
  }
}

pub fn format_game_players(links: &[PlayerGame]) -> String {
  let mut out = String::new();
  for link in links {
    let _ = writeln!(out, "{:>4}  {}", link.player_id, link.player.name);
  }
  out
}

/// Add a player
#[derive(Parser)]
pub struct NewPlayerCmd {
  /// The player's name
  name: String,

  /// ID of the player's favourite creature
  #[arg(long, value_name = "ID")]
  pokemon: u32,
}

impl NewPlayerCmd {
  pub fn execute(self, api: &Api) -> Result<()> {
    api.create_player(&NewPlayer {
      name: self.name,
      pokemon_id: self.pokemon,
    })?;
    println!("player added");
    Ok(())
  }
}

/// How an encounter ended, as typed on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum StatusArg {
  Caught,
  RunAway,
  Defeated,
}

impl From<StatusArg> for Status {
  fn from(arg: StatusArg) -> Self {
    match arg {
      StatusArg::Caught => Status::Caught,
      StatusArg::RunAway => Status::RunAway,
      StatusArg::Defeated => Status::Defeated,
    }
  }
}

/// Picks the creature `term` names out of encounter search results.
///
/// An exact, case-insensitive name match wins; otherwise the results must
/// contain exactly one creature.
pub fn pick_creature<'a>(
  term: &str,
  candidates: &'a [Creature],
) -> Result<&'a Creature> {
  let term = term.trim();
  let exact = candidates
    .iter()
    .filter(|c| c.name.eq_ignore_ascii_case(term))
    .collect::<Vec<_>>();
  match (exact.as_slice(), candidates) {
    ([only], _) => Ok(*only),
    ([], [only]) => Ok(only),
    ([], []) => anyhow::bail!("no creature matches {:?}", term),
    _ => {
      let names = candidates
        .iter()
        .map(|c| format!("{} (#{})", c, c.id))
        .collect::<Vec<_>>();
      anyhow::bail!(
        "{:?} is ambiguous; pick one by ID: {}",
        term,
        names.join(", ")
      )
    }
  }
}

/// Record an encounter
#[derive(Parser)]
pub struct AddEvent {
  /// The game the encounter happened in
  #[arg(short, long, value_name = "GAME")]
  game: u32,

  /// The player who had the encounter
  #[arg(short, long, value_name = "PLAYER")]
  player: u32,

  /// The creature met, by ID or by name
  #[arg(long, value_name = "CREATURE")]
  pokemon: String,

  /// The route or zone
  #[arg(short, long)]
  route: String,

  /// The nickname given to the creature
  #[arg(short, long)]
  nickname: String,

  /// How the encounter ended
  #[arg(short, long, value_enum, default_value = "caught")]
  status: StatusArg,
}

impl AddEvent {
  pub fn execute(self, api: &Api) -> Result<()> {
    let creature = match self.pokemon.trim().parse::<u32>() {
      Ok(id) => api.creature(id)?.creature,
      Err(_) => {
        let candidates = api.search_encounters(&self.pokemon)?;
        pick_creature(&self.pokemon, &candidates)?.clone()
      }
    };

    let event = self.into_event(&creature);
    api.create_event(&event)?;
    println!(
      "recorded {} \"{}\" on {}: {}",
      creature, event.nickname, event.route, event.status
    );
    Ok(())
  }

  fn into_event(self, creature: &Creature) -> NewEvent {
    NewEvent {
      pokemon_id: creature.id,
      pokemon_image: creature.image.clone(),
      route: self.route.trim().to_string(),
      nickname: self.nickname.trim().to_string(),
      player_id: self.player,
      status: self.status.into(),
      game_id: self.game,
    }
  }
}

/// Change how an encounter ended
#[derive(Parser)]
pub struct SetStatus {
  /// The encounter's ID
  #[arg(value_name = "EVENT")]
  id: u32,

  #[arg(value_enum)]
  status: StatusArg,
}

impl SetStatus {
  pub fn execute(self, api: &Api) -> Result<()> {
    let status = Status::from(self.status);
    api.set_event_status(self.id, status)?;
    println!("event {} is now {}", self.id, status);
    Ok(())
  }
}

/// Set an encounter's shiny and champion flags; flags not given are cleared
#[derive(Parser)]
pub struct SetFlags {
  /// The encounter's ID
  #[arg(value_name = "EVENT")]
  id: u32,

  /// The creature was shiny
  #[arg(long)]
  shiny: bool,

  /// The creature became the player's champion
  #[arg(long)]
  champ: bool,
}

impl SetFlags {
  pub fn execute(self, api: &Api) -> Result<()> {
    api.set_event_flags(
      self.id,
      EventFlags {
        is_shiny: self.shiny,
        is_champ: self.champ,
      },
    )?;
    println!(
      "event {}: shiny {}, champion {}",
      self.id,
      if self.shiny { "yes" } else { "no" },
      if self.champ { "yes" } else { "no" }
    );
    Ok(())
  }
}

/// Delete an encounter
#[derive(Parser)]
pub struct RmEvent {
  /// The encounter's ID
  #[arg(value_name = "EVENT")]
  id: u32,

  /// Skip the confirmation prompt
  #[arg(short = 'y', long)]
  yes: bool,
}

impl RmEvent {
  pub fn execute(self, api: &Api) -> Result<()> {
    if !self.yes && !confirm(&format!("event {}", self.id))? {
      println!("cancelled");
      return Ok(());
    }
    api.delete_event(self.id)?;
    println!("deleted event {}", self.id);
    Ok(())
  }
}

/// Add a creature to the Pokédex
#[derive(Parser)]
pub struct AddCreature {
  /// National Pokédex number
  #[arg(long = "dex", value_name = "N")]
  national_dex: u32,
  #[arg(long)]
  name: String,
  /// Regional or alternate form
  #[arg(long)]
  form: Option<String>,
  #[arg(long)]
  type1: TypeName,
  #[arg(long)]
  type2: Option<String>,
  #[arg(long)]
  hp: u32,
  #[arg(long)]
  attack: u32,
  #[arg(long)]
  defense: u32,
  #[arg(long = "sp-attack")]
  special_attack: u32,
  #[arg(long = "sp-defense")]
  special_defense: u32,
  #[arg(long)]
  speed: u32,
  #[arg(long)]
  generation: u32,
  /// A PNG sprite to upload
  #[arg(long, value_name = "PATH")]
  image: Option<PathBuf>,
}

impl AddCreature {
  fn draft(&self) -> Result<NewCreature> {
    Ok(NewCreature {
      national_dex: self.national_dex,
      name: self.name.clone(),
      form: self.form.clone().filter(|f| !f.trim().is_empty()),
      type1: self.type1,
      type2: TypeName::parse_optional(self.type2.as_deref())?,
      stats: catchdex::model::BaseStats {
        hp: self.hp,
        attack: self.attack,
        defense: self.defense,
        special_attack: self.special_attack,
        special_defense: self.special_defense,
        speed: self.speed,
      },
      generation: self.generation,
    })
  }

  pub fn execute(self, api: &Api) -> Result<()> {
    let draft = self.draft()?;
    let image = self.image.map(Upload::from_path).transpose()?;
    let created = api.create_creature(&draft, image)?;
    println!(
      "added #{} {} (total {})",
      created.id,
      created,
      draft.total()
    );
    Ok(())
  }
}

/// Edit a Pokédex entry; fields not given keep their current value
#[derive(Parser)]
pub struct EditCreature {
  /// The creature's ID
  #[arg(value_name = "ID")]
  id: u32,
  #[arg(long = "dex", value_name = "N")]
  national_dex: Option<u32>,
  #[arg(long)]
  name: Option<String>,
  /// Regional or alternate form; pass "" to clear it
  #[arg(long)]
  form: Option<String>,
  #[arg(long)]
  type1: Option<TypeName>,
  /// Second type; pass "" to clear it
  #[arg(long)]
  type2: Option<String>,
  #[arg(long)]
  hp: Option<u32>,
  #[arg(long)]
  attack: Option<u32>,
  #[arg(long)]
  defense: Option<u32>,
  #[arg(long = "sp-attack")]
  special_attack: Option<u32>,
  #[arg(long = "sp-defense")]
  special_defense: Option<u32>,
  #[arg(long)]
  speed: Option<u32>,
  #[arg(long)]
  generation: Option<u32>,
  /// A PNG sprite to upload
  #[arg(long, value_name = "PATH")]
  image: Option<PathBuf>,
}

impl EditCreature {
  /// Applies the given fields on top of `draft`.
  fn apply(&self, draft: &mut NewCreature) -> Result<()> {
    let s = &mut draft.stats;
    let stats = [
      (&mut s.hp, self.hp),
      (&mut s.attack, self.attack),
      (&mut s.defense, self.defense),
      (&mut s.special_attack, self.special_attack),
      (&mut s.special_defense, self.special_defense),
      (&mut s.speed, self.speed),
    ];
    for (stat, given) in stats {
      if let Some(v) = given {
        *stat = v;
      }
    }

    if let Some(n) = self.national_dex {
      draft.national_dex = n;
    }
    if let Some(name) = &self.name {
      draft.name = name.clone();
    }
    if let Some(form) = &self.form {
      draft.form = Some(form.trim().to_string()).filter(|f| !f.is_empty());
    }
    if let Some(ty) = self.type1 {
      draft.type1 = ty;
    }
    if let Some(ty) = &self.type2 {
      draft.type2 = TypeName::parse_optional(Some(ty.as_str()))?;
    }
    if let Some(g) = self.generation {
      draft.generation = g;
    }
    Ok(())
  }

  pub fn execute(self, api: &Api) -> Result<()> {
    let current = api
      .creature(self.id)
      .with_context(|| format!("could not fetch creature {}", self.id))?
      .creature;
    let mut draft = NewCreature::from_creature(&current);
    self.apply(&mut draft)?;

    let image = self.image.map(Upload::from_path).transpose()?;
    let updated = api.update_creature(self.id, &draft, image)?;
    println!(
      "updated #{} {} (total {})",
      updated.id,
      updated,
      draft.total()
    );
    Ok(())
  }
}

/// Find creatures to record an encounter with
#[derive(Parser)]
pub struct SearchEncounters {
  /// At least three letters of the creature's name
  term: String,
}

impl SearchEncounters {
  pub fn execute(self, api: &Api) -> Result<()> {
    let found = api.search_encounters(&self.term)?;
    if found.is_empty() {
      println!("no matches (searches need at least three letters)");
    }
    for c in &found {
      println!("{:>4}  #{:04} {}", c.id, c.national_dex, c);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use catchdex::model::Player;

  use pretty_assertions::assert_eq;

  use crate::testing::squirtle;

  #[test]
  fn game_player_listing() {
    let links = [PlayerGame {
      id: 3,
      player_id: 9,
      game_id: 1,
      player: Player {
        id: 9,
        name: "Ash".to_string(),
        pokemon_id: Some(25),
        pokemon: None,
        user_id: None,
      },
    }];
    assert_eq!(format_game_players(&links), "   9  Ash\n");
  }

  #[test]
  fn picking_creatures_by_name() {
    let mut wartortle = squirtle();
    wartortle.id = 8;
    wartortle.name = "Wartortle".to_string();
    let both = vec![squirtle(), wartortle];

    assert_eq!(pick_creature(" squirtle", &both).unwrap().id, 7);
    assert_eq!(pick_creature("tle", &both[1..]).unwrap().id, 8);

    let err = pick_creature("tle", &both).unwrap_err().to_string();
    assert!(err.contains("Squirtle (#7)"), "{}", err);
    assert!(pick_creature("mew", &[]).is_err());
  }

  #[test]
  fn event_arguments() {
    let cmd = AddEvent::try_parse_from([
      "add",
      "--game",
      "1",
      "--player",
      "9",
      "--pokemon",
      "squirtle",
      "--route",
      " Route 1 ",
      "--nickname",
      "Shelly",
      "--status",
      "run-away",
    ])
    .unwrap();
    let event = cmd.into_event(&squirtle());
    assert_eq!(
      event,
      NewEvent {
        pokemon_id: 7,
        pokemon_image: Some("squirtle".to_string()),
        route: "Route 1".to_string(),
        nickname: "Shelly".to_string(),
        player_id: 9,
        status: Status::RunAway,
        game_id: 1,
      }
    );

    let cmd = SetFlags::try_parse_from(["flag", "4", "--shiny"]).unwrap();
    assert!(cmd.shiny && !cmd.champ);
    assert!(NewGameCmd::try_parse_from(["new", "Run"]).is_err());
  }

  #[test]
  fn new_creatures_get_a_computed_total() {
    let cmd = AddCreature::try_parse_from([
      "add", "--dex", "7", "--name", "Squirtle", "--type1", "water",
      "--type2", "", "--hp", "44", "--attack", "48", "--defense", "65",
      "--sp-attack", "50", "--sp-defense", "64", "--speed", "43",
      "--generation", "1",
    ])
    .unwrap();
    let draft = cmd.draft().unwrap();
    assert_eq!(draft, NewCreature::from_creature(&squirtle()));
    assert_eq!(draft.total(), 314);
    assert_eq!(draft.fields().last().unwrap(), &("total", "314".to_string()));

    assert!(AddCreature::try_parse_from([
      "add", "--dex", "7", "--name", "X", "--type1", "shadow", "--hp", "1",
      "--attack", "1", "--defense", "1", "--sp-attack", "1",
      "--sp-defense", "1", "--speed", "1", "--generation", "1",
    ])
    .is_err());
  }

  #[test]
  fn edits_keep_unset_fields() {
    let cmd = EditCreature::try_parse_from([
      "edit", "7", "--hp", "50", "--type2", "ice", "--form", "Gigantamax",
    ])
    .unwrap();
    let mut draft = NewCreature::from_creature(&squirtle());
    cmd.apply(&mut draft).unwrap();
    assert_eq!(draft.stats.hp, 50);
    assert_eq!(draft.stats.attack, 48);
    assert_eq!(draft.type2, Some(TypeName::Ice));
    assert_eq!(draft.form.as_deref(), Some("Gigantamax"));
    assert_eq!(draft.name, "Squirtle");
    assert_eq!(draft.total(), 320);

    let cmd =
      EditCreature::try_parse_from(["edit", "7", "--type2", "", "--form", ""])
        .unwrap();
    cmd.apply(&mut draft).unwrap();
    assert_eq!(draft.type2, None);
    assert_eq!(draft.form, None);

    let cmd = EditCreature::try_parse_from(["edit", "7", "--type2", "nope"])
      .unwrap();
    assert!(cmd.apply(&mut draft).is_err());
  }
}
