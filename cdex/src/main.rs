//! `cdex`, a terminal client for the catchdex backend.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;

use crossbeam::channel;

use crossterm::event::Event;
use crossterm::execute;
use crossterm::terminal;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tui::backend::CrosstermBackend;
use tui::Terminal;

use catchdex::api::Options;
use catchdex::Api;

mod commands;
mod dex;
mod manage;
mod ui;
mod util;

#[cfg(test)]
mod testing;

/// Browse and manage a catchdex Pokédex from the terminal
#[derive(Parser)]
#[command(name = "cdex", version)]
struct Cli {
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Parser)]
enum Command {
  /// Browse the Pokédex interactively (the default)
  Browse,
  Login(commands::Login),
  Signup(commands::Signup),
  /// End the current session
  Logout,
  /// List the games you can see
  Games,
  /// List every player
  Players,
  Events(commands::Events),
  Stats(commands::Stats),
  Show(commands::Show),
  Matchup(commands::Matchup),
  /// Print the type chart in use
  Chart,

  /// Create and delete games
  #[command(subcommand)]
  Game(manage::GameCommand),
  /// Add players
  #[command(subcommand)]
  Player(manage::PlayerCommand),
  /// Record and update encounters
  #[command(subcommand)]
  Event(manage::EventCommand),
  /// Add and edit Pokédex entries
  #[command(subcommand)]
  Dex(manage::DexCommand),
}

fn main() -> Result<()> {
  // A missing .env is fine.
  let _ = dotenvy::dotenv();
  let _guard = setup_logging()?;

  let cli = Cli::parse();
  let opts = Options::from_env().context("invalid configuration")?;
  let api = Arc::new(Api::with_options(opts));
  tracing::info!(url = api.base_url(), "starting");

  match cli.command.unwrap_or(Command::Browse) {
    Command::Browse => browse(api),
    Command::Login(cmd) => cmd.execute(&api),
    Command::Signup(cmd) => cmd.execute(&api),
    Command::Logout => commands::logout(&api),
    Command::Games => commands::games(&api),
    Command::Players => commands::players(&api),
    Command::Events(cmd) => cmd.execute(&api),
    Command::Stats(cmd) => cmd.execute(&api),
    Command::Show(cmd) => cmd.execute(&api),
    Command::Matchup(cmd) => cmd.execute(&api),
    Command::Chart => commands::chart(&api),
    Command::Game(cmd) => cmd.execute(&api),
    Command::Player(cmd) => cmd.execute(&api),
    Command::Event(cmd) => cmd.execute(&api),
    Command::Dex(cmd) => cmd.execute(&api),
  }
}

/// Sends logs to a file, since the terminal belongs to the UI.
fn setup_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = log_directory();
  std::fs::create_dir_all(&log_dir)
    .with_context(|| format!("could not create {}", log_dir.display()))?;

  let file_appender = tracing_appender::rolling::never(&log_dir, "cdex.log");
  let (writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::from_default_env())
    .with(
      tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false),
    )
    .init();

  tracing::debug!(dir = %log_dir.display(), "logging initialized");
  Ok(guard)
}

fn log_directory() -> PathBuf {
  dirs::cache_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("catchdex")
    .join("logs")
}

/// Runs the interactive browser until the user quits.
fn browse(api: Arc<Api>) -> Result<()> {
  let (error_sink, errors) = channel::unbounded();
  let dex = dex::Dex::new(api, error_sink);
  let mut browser = ui::browser::Browser::new(errors);

  let (key_sink, keys) = channel::unbounded();
  thread::spawn(move || loop {
    match crossterm::event::read() {
      Ok(Event::Key(k)) => {
        if key_sink.send(k).is_err() {
          return;
        }
      }
      Ok(_) => {}
      Err(e) => {
        tracing::error!("could not read terminal input: {}", e);
        return;
      }
    }
  });

  terminal::enable_raw_mode()?;
  execute!(io::stdout(), terminal::EnterAlternateScreen)?;
  let result = draw_loop(&mut browser, &dex, &keys);
  execute!(io::stdout(), terminal::LeaveAlternateScreen)?;
  terminal::disable_raw_mode()?;
  result
}

fn draw_loop(
  browser: &mut ui::browser::Browser,
  dex: &dex::Dex,
  keys: &channel::Receiver<crossterm::event::KeyEvent>,
) -> Result<()> {
  let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
  terminal.hide_cursor()?;
  terminal.clear()?;

  while !browser.is_done() {
    terminal.draw(|f| browser.render(dex, f))?;

    // Wait a frame for input, then drain whatever else arrived.
    if let Ok(k) = keys.recv_timeout(Duration::from_millis(30)) {
      browser.process_key(k, dex);
      while let Ok(k) = keys.try_recv() {
        browser.process_key(k, dex);
      }
    }
  }

  terminal.show_cursor()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn write_commands_are_reachable() {
    let cli = Cli::try_parse_from([
      "cdex", "event", "status", "4", "defeated",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Some(Command::Event(manage::EventCommand::Status(_)))
    ));

    let cli =
      Cli::try_parse_from(["cdex", "game", "new", "Run", "-p", "9", "-p", "10"])
        .unwrap();
    assert!(matches!(
      cli.command,
      Some(Command::Game(manage::GameCommand::New(_)))
    ));

    let cli = Cli::try_parse_from(["cdex", "dex", "edit", "7", "--hp", "50"])
      .unwrap();
    assert!(matches!(
      cli.command,
      Some(Command::Dex(manage::DexCommand::Edit(_)))
    ));

    assert!(Cli::try_parse_from(["cdex", "event", "frobnicate"]).is_err());
    assert!(Cli::try_parse_from(["cdex"]).unwrap().command.is_none());
  }
}
