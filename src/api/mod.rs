//! A client for the companion backend.

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::multipart::Part;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use reqwest::Method;
use reqwest::StatusCode;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::chart::ChartError;
use crate::chart::TypeChart;
use crate::effectiveness;
use crate::effectiveness::Effectiveness;
use crate::effectiveness::Resolver;
use crate::model::CaptureSummary;
use crate::model::Creature;
use crate::model::CreatureDetail;
use crate::model::Event;
use crate::model::EventFlags;
use crate::model::Game;
use crate::model::Invalid;
use crate::model::NewCreature;
use crate::model::NewEvent;
use crate::model::NewGame;
use crate::model::NewPlayer;
use crate::model::Player;
use crate::model::PlayerGame;
use crate::model::PlayerStats;
use crate::model::Status;

pub mod session;
pub use session::Session;

/// The backend URL used when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:3000";

/// Encounter searches shorter than this are not sent to the backend.
pub const MIN_ENCOUNTER_SEARCH: usize = 3;

/// An API client.
///
/// This type is the entrypoint for talking to the backend. It is safe to share
/// between threads; the login session is guarded internally.
pub struct Api {
  base_url: String,
  asset_url: String,
  client: Client,
  session: Mutex<Session>,
  chart: Arc<TypeChart>,
}

/// Options for constructing an [`Api`].
pub struct Options {
  /// The base URL to point the client at.
  pub base_url: String,
  /// The base URL sprites are served from; defaults to `base_url`.
  pub asset_url: Option<String>,
  /// Where the login session is kept.
  pub session: Session,
  /// The type chart used to compute effectiveness.
  pub chart: Arc<TypeChart>,
}

impl Options {
  /// Creates options for the backend at `base_url`, with the session in its
  /// default location and the canonical type chart.
  pub fn new(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Self {
      session: Session::new(&base_url),
      base_url,
      asset_url: None,
      chart: Arc::new(TypeChart::standard()),
    }
  }

  /// Construct options from process environment variables.
  ///
  /// Environment variables:
  /// - `CATCHDEX_API_URL` - Backend URL (default: `http://localhost:3000`)
  /// - `CATCHDEX_ASSET_URL` - Sprite server URL (default: the backend URL)
  /// - `CATCHDEX_SESSION_DIR` - Session directory (default: `~/.catchdex`)
  /// - `CATCHDEX_TYPE_CHART` - Alternate type chart JSON file (default: the
  ///   canonical chart)
  pub fn from_env() -> Result<Self, Error> {
    let base_url = read_env("CATCHDEX_API_URL")
      .map(|url| url.trim_end_matches('/').to_string())
      .unwrap_or_else(|| DEFAULT_URL.to_string());

    let mut opts = match read_env("CATCHDEX_SESSION_DIR") {
      Some(dir) => Self {
        session: Session::with_dir(&base_url, PathBuf::from(dir)),
        ..Self::new(base_url.clone())
      },
      None => Self::new(base_url),
    };

    opts.asset_url = read_env("CATCHDEX_ASSET_URL")
      .map(|url| url.trim_end_matches('/').to_string());

    if let Some(path) = read_env("CATCHDEX_TYPE_CHART") {
      tracing::info!(%path, "loading type chart");
      opts.chart = Arc::new(TypeChart::load(path)?);
    }

    Ok(opts)
  }
}

impl Default for Options {
  fn default() -> Self {
    Self::new(DEFAULT_URL)
  }
}

fn read_env(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// An [`Api`] client error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
  #[error(transparent)]
  Io(#[from] io::Error),

  #[error(transparent)]
  Http(#[from] reqwest::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// There is no login session; no request was made.
  #[error("not logged in")]
  Unauthenticated,

  /// The backend rejected the session's token.
  #[error("the backend rejected the login session")]
  Unauthorized,

  /// The backend answered with an unexpected status.
  #[error("the backend answered {code}: {message}")]
  Status { code: u16, message: String },

  #[error(transparent)]
  Effectiveness(#[from] effectiveness::Error),

  #[error(transparent)]
  Invalid(#[from] Invalid),

  #[error(transparent)]
  Chart(#[from] ChartError),
}

impl Error {
  /// Builds the error for a non-success response.
  ///
  /// The backend reports failures as `{ "message": ... }`; any other body is
  /// used verbatim.
  fn from_status(code: u16, body: &str) -> Self {
    #[derive(Deserialize)]
    struct Message {
      message: Option<String>,
    }

    if code == StatusCode::UNAUTHORIZED.as_u16()
      || code == StatusCode::FORBIDDEN.as_u16()
    {
      return Self::Unauthorized;
    }

    let message = serde_json::from_str::<Message>(body)
      .ok()
      .and_then(|m| m.message)
      .unwrap_or_else(|| body.trim().to_string());
    Self::Status { code, message }
  }
}

/// An image attached to a creature when creating or updating it.
#[derive(Clone, Debug)]
pub struct Upload {
  /// The name the file is uploaded under.
  pub file_name: String,
  /// The file's contents.
  pub bytes: Vec<u8>,
}

impl Upload {
  /// Reads an upload from disk.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
    let path = path.as_ref();
    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| "image.png".to_string());
    Ok(Self {
      file_name,
      bytes: fs::read(path)?,
    })
  }
}

/// A listing the backend sends either bare or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
  Bare(Vec<T>),
  Pokemons { pokemons: Vec<T> },
  Players { players: Vec<T> },
  Events { events: Vec<T> },
  Games { games: Vec<T> },
}

impl<T> Listing<T> {
  fn into_vec(self) -> Vec<T> {
    match self {
      Self::Bare(v)
      | Self::Pokemons { pokemons: v }
      | Self::Players { players: v }
      | Self::Events { events: v }
      | Self::Games { games: v } => v,
    }
  }
}

#[derive(Deserialize)]
struct TokenResponse {
  token: Option<String>,
}

#[derive(Deserialize)]
struct GameResponse {
  game: Game,
}

#[derive(Deserialize)]
struct CreatureResponse {
  pokemon: Creature,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailResponse {
  pokemon: Creature,
  #[serde(default)]
  type_effectiveness: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct Credentials<'a> {
  email: &'a str,
  password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameBody<'a> {
  name: &'a str,
  player_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerGameBody {
  player_id: u32,
  game_id: u32,
}

#[derive(Serialize)]
struct StatusBody {
  status: Status,
}

impl Api {
  /// Creates a new [`Api`] with the default options.
  pub fn new() -> Self {
    Self::with_options(Options::default())
  }

  /// Creates a new [`Api`] with the given options.
  pub fn with_options(opts: Options) -> Self {
    let asset_url = opts.asset_url.unwrap_or_else(|| opts.base_url.clone());
    Self {
      base_url: opts.base_url,
      asset_url,
      client: Client::new(),
      session: Mutex::new(opts.session),
      chart: opts.chart,
    }
  }

  /// Returns the backend URL.
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Returns the type chart this client computes effectiveness with.
  pub fn chart(&self) -> &TypeChart {
    &self.chart
  }

  /// Returns a [`Resolver`] over this client's type chart.
  pub fn resolver(&self) -> Resolver<'_> {
    Resolver::new(&self.chart)
  }

  fn session(&self) -> MutexGuard<'_, Session> {
    self.session.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Returns the current session token.
  ///
  /// Fails with [`Error::Unauthenticated`] when logged out; every
  /// authenticated call goes through here before touching the network.
  pub fn token(&self) -> Result<String, Error> {
    self
      .session()
      .token()
      .map(str::to_string)
      .ok_or(Error::Unauthenticated)
  }

  /// Returns whether there is a login session.
  pub fn is_logged_in(&self) -> bool {
    self.session().token().is_some()
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    let url = format!("{}{}", self.base_url, path);
    tracing::debug!(%method, %url, "sending request");
    self.client.request(method, url)
  }

  fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
    let token = self.token()?;
    Ok(self.request(method, path).bearer_auth(token))
  }

  fn send(req: RequestBuilder) -> Result<Response, Error> {
    let resp = req.send()?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    let body = resp.text().unwrap_or_default();
    tracing::debug!(%status, %body, "request failed");
    Err(Error::from_status(status.as_u16(), &body))
  }

  fn json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, Error> {
    let bytes = Self::send(req)?.bytes()?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  fn list<T: DeserializeOwned>(req: RequestBuilder) -> Result<Vec<T>, Error> {
    Ok(Self::json::<Listing<T>>(req)?.into_vec())
  }

  fn start_session(&self, resp: TokenResponse) -> Result<bool, Error> {
    match resp.token {
      Some(token) => {
        self.session().set(token)?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Logs in, storing the session token.
  pub fn login(&self, email: &str, password: &str) -> Result<(), Error> {
    let req = self
      .request(Method::POST, "/auth/login")
      .json(&Credentials { email, password });
    if !self.start_session(Self::json(req)?)? {
      return Err(Error::Status {
        code: StatusCode::OK.as_u16(),
        message: "login response had no token".to_string(),
      });
    }
    Ok(())
  }

  /// Creates an account.
  ///
  /// If the backend answers with a token, the new account is also logged in;
  /// returns whether that happened.
  pub fn signup(&self, email: &str, password: &str) -> Result<bool, Error> {
    let req = self
      .request(Method::POST, "/signup")
      .json(&Credentials { email, password });
    self.start_session(Self::json(req)?)
  }

  /// Logs out.
  pub fn logout(&self) -> Result<(), Error> {
    self.session().clear()
  }

  /// Lists every game.
  pub fn games(&self) -> Result<Vec<Game>, Error> {
    Self::list(self.authed(Method::GET, "/games/games")?)
  }

  /// Creates a game and links its players to it.
  pub fn create_game(&self, game: &NewGame) -> Result<Game, Error> {
    game.validate()?;
    let token = self.token()?;

    let req = self.create_game_request(&token, game);
    let created = Self::json::<GameResponse>(req)?.game;

    for &player_id in &game.players {
      Self::send(self.link_player_request(&token, player_id, created.id))?;
    }

    tracing::info!(id = created.id, name = %created.name, "created game");
    Ok(created)
  }

  fn create_game_request(&self, token: &str, game: &NewGame) -> RequestBuilder {
    self
      .request(Method::POST, "/games")
      .bearer_auth(token)
      .json(&GameBody {
        name: game.name.trim(),
        player_count: game.players.len(),
      })
  }

  fn link_player_request(
    &self,
    token: &str,
    player_id: u32,
    game_id: u32,
  ) -> RequestBuilder {
    self
      .request(Method::POST, "/api/player-games")
      .bearer_auth(token)
      .json(&PlayerGameBody { player_id, game_id })
  }

  /// Deletes a game.
  pub fn delete_game(&self, id: u32) -> Result<(), Error> {
    Self::send(self.authed(Method::DELETE, &format!("/games/{}", id))?)?;
    Ok(())
  }

  /// Lists every player.
  pub fn players(&self) -> Result<Vec<Player>, Error> {
    Self::list(self.authed(Method::GET, "/players")?)
  }

  /// Creates a player.
  pub fn create_player(&self, player: &NewPlayer) -> Result<(), Error> {
    Self::send(self.create_player_request(player)?)?;
    tracing::info!(name = %player.name.trim(), "created player");
    Ok(())
  }

  fn create_player_request(
    &self,
    player: &NewPlayer,
  ) -> Result<RequestBuilder, Error> {
    player.validate()?;
    Ok(self.authed(Method::POST, "/players")?.json(&NewPlayer {
      name: player.name.trim().to_string(),
      ..player.clone()
    }))
  }

  /// Lists the players taking part in a game.
  pub fn game_players(&self, game_id: u32) -> Result<Vec<PlayerGame>, Error> {
    Self::list(
      self.authed(Method::GET, &format!("/api/player-games/{}", game_id))?,
    )
  }

  /// Lists the events of a game.
  pub fn events(&self, game_id: u32) -> Result<Vec<Event>, Error> {
    Self::list(
      self
        .authed(Method::GET, "/events/events")?
        .query(&[("gameId", game_id)]),
    )
  }

  /// Records an event.
  pub fn create_event(&self, event: &NewEvent) -> Result<(), Error> {
    Self::send(self.create_event_request(event)?)?;
    Ok(())
  }

  fn create_event_request(
    &self,
    event: &NewEvent,
  ) -> Result<RequestBuilder, Error> {
    event.validate()?;
    Ok(self.authed(Method::POST, "/events/event")?.json(event))
  }

  /// Changes how an event ended.
  pub fn set_event_status(&self, id: u32, status: Status) -> Result<(), Error> {
    Self::send(self.event_status_request(id, status)?)?;
    Ok(())
  }

  fn event_status_request(
    &self,
    id: u32,
    status: Status,
  ) -> Result<RequestBuilder, Error> {
    let path = format!("/events/event/{}/status", id);
    Ok(self.authed(Method::PATCH, &path)?.json(&StatusBody { status }))
  }

  /// Changes an event's shiny and champion flags.
  pub fn set_event_flags(&self, id: u32, flags: EventFlags) -> Result<(), Error> {
    Self::send(self.event_flags_request(id, flags)?)?;
    Ok(())
  }

  fn event_flags_request(
    &self,
    id: u32,
    flags: EventFlags,
  ) -> Result<RequestBuilder, Error> {
    let path = format!("/events/events/{}/attributes", id);
    Ok(self.authed(Method::PUT, &path)?.json(&flags))
  }

  /// Deletes an event.
  pub fn delete_event(&self, id: u32) -> Result<(), Error> {
    Self::send(self.authed(Method::DELETE, &format!("/events/{}", id))?)?;
    Ok(())
  }

  /// Returns a player's tallies.
  pub fn player_stats(&self, player_id: u32) -> Result<PlayerStats, Error> {
    Self::json(
      self.authed(Method::GET, &format!("/players/stats/{}", player_id))?,
    )
  }

  /// Returns how often a player captured each creature.
  pub fn player_captures(
    &self,
    player_id: u32,
  ) -> Result<Vec<CaptureSummary>, Error> {
    Self::list(self.authed(
      Method::GET,
      &format!("/players/stats/pokemon/{}", player_id),
    )?)
  }

  /// Lists the whole Pokédex.
  pub fn creatures(&self) -> Result<Vec<Creature>, Error> {
    Self::list(self.request(Method::GET, "/pokemons/pokemon"))
  }

  /// Searches the Pokédex; a blank term lists all of it.
  pub fn search_creatures(&self, term: &str) -> Result<Vec<Creature>, Error> {
    let term = term.trim();
    if term.is_empty() {
      return self.creatures();
    }

    Self::list(
      self
        .authed(Method::GET, "/pokemons/pokemon/search")?
        .query(&[("searchTerm", term)]),
    )
  }

  /// Searches for creatures to record an encounter with.
  ///
  /// Terms shorter than [`MIN_ENCOUNTER_SEARCH`] characters yield nothing,
  /// without a request.
  pub fn search_encounters(&self, term: &str) -> Result<Vec<Creature>, Error> {
    let term = term.trim();
    if term.chars().count() < MIN_ENCOUNTER_SEARCH {
      return Ok(Vec::new());
    }

    Self::list(
      self
        .authed(Method::GET, "/events/pokemon/search")?
        .query(&[("searchTerm", term)]),
    )
  }

  /// Fetches a creature along with its type defenses.
  ///
  /// Effectiveness is always computed locally with this client's chart. If
  /// the backend sends its own, any disagreement is logged and recorded in
  /// [`CreatureDetail::disagreements`].
  pub fn creature(&self, id: u32) -> Result<CreatureDetail, Error> {
    let req = self.request(Method::GET, &format!("/pokemons/pokemon/{}", id));
    let resp = Self::json::<DetailResponse>(req)?;
    Ok(self.detail(resp))
  }

  fn detail(&self, resp: DetailResponse) -> CreatureDetail {
    let detail = CreatureDetail::new(resp.pokemon, &self.resolver());
    match resp.type_effectiveness.map(serde_json::from_value::<Effectiveness>) {
      Some(Ok(remote)) => detail.reconcile(&remote),
      Some(Err(e)) => {
        tracing::warn!(
          id = detail.creature.id,
          "ignoring malformed backend effectiveness: {}",
          e
        );
        detail
      }
      None => detail,
    }
  }

  fn creature_form(
    creature: &NewCreature,
    image: Option<Upload>,
  ) -> Result<Form, Error> {
    creature.validate()?;

    let mut form = Form::new();
    for (name, value) in creature.fields() {
      form = form.text(name, value);
    }
    if let Some(image) = image {
      let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str("image/png")?;
      form = form.part("image", part);
    }
    Ok(form)
  }

  fn creature_request(
    &self,
    method: Method,
    path: &str,
    creature: &NewCreature,
    image: Option<Upload>,
  ) -> Result<RequestBuilder, Error> {
    let form = Self::creature_form(creature, image)?;
    Ok(self.authed(method, path)?.multipart(form))
  }

  /// Adds a creature to the Pokédex.
  pub fn create_creature(
    &self,
    creature: &NewCreature,
    image: Option<Upload>,
  ) -> Result<Creature, Error> {
    let resp = Self::send(self.creature_request(
      Method::POST,
      "/pokemons/pokemon",
      creature,
      image,
    )?)?;

    let status = resp.status();
    let body = resp.bytes()?;
    if status != StatusCode::CREATED {
      return Err(Error::from_status(
        status.as_u16(),
        &String::from_utf8_lossy(&body),
      ));
    }

    let created = serde_json::from_slice::<CreatureResponse>(&body)?.pokemon;
    tracing::info!(id = created.id, name = %created.name, "created creature");
    Ok(created)
  }

  /// Replaces a creature's record.
  pub fn update_creature(
    &self,
    id: u32,
    creature: &NewCreature,
    image: Option<Upload>,
  ) -> Result<Creature, Error> {
    let path = format!("/pokemons/pokemon/{}", id);
    let req = self.creature_request(Method::PUT, &path, creature, image)?;
    let updated = Self::json::<CreatureResponse>(req)?.pokemon;
    tracing::info!(id = updated.id, name = %updated.name, "updated creature");
    Ok(updated)
  }

  /// Returns the URL of a creature's sprite, if it has one.
  pub fn image_url(&self, creature: &Creature, shiny: bool) -> Option<String> {
    let image = if shiny {
      creature.shiny_image.as_ref()
    } else {
      creature.image.as_ref()
    }?;
    Some(format!("{}/public/PokemonImages/{}.png", self.asset_url, image))
  }

  /// Downloads the raw bytes at `url`.
  pub fn image(&self, url: &str) -> Result<Vec<u8>, Error> {
    tracing::debug!(%url, "fetching image");
    Ok(Self::send(self.client.get(url))?.bytes()?.to_vec())
  }
}

impl Default for Api {
  fn default() -> Self {
    Self::new()
  }
}
