//! Games and the players taking part in them.

use serde::Deserialize;
use serde::Serialize;

use crate::model::creature::blank_as_none;
use crate::model::creature::Invalid;

/// A game: one play session, shared by a handful of players.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
  /// This game's ID.
  pub id: u32,
  /// This game's name.
  pub name: String,
  /// The number of players this game was created with.
  #[serde(default)]
  pub player_count: u32,
}

/// A player, who may take part in any number of games.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
  /// This player's ID.
  pub id: u32,
  /// This player's name.
  pub name: String,
  /// The ID of this player's favourite creature.
  #[serde(default)]
  pub pokemon_id: Option<u32>,
  /// This player's favourite creature, when the backend embeds it.
  #[serde(default)]
  pub pokemon: Option<Favourite>,
  /// The user account that owns this player.
  #[serde(default)]
  pub user_id: Option<u32>,
}

/// The embedded summary of a player's favourite creature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
  #[allow(missing_docs)]
  pub name: String,
  /// The sprite's file stem.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub image: Option<String>,
}

/// The link between a player and a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGame {
  /// This link's ID.
  pub id: u32,
  #[allow(missing_docs)]
  pub player_id: u32,
  #[allow(missing_docs)]
  pub game_id: u32,
  /// The linked player.
  pub player: Player,
}

/// A game about to be created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewGame {
  /// The game's name.
  pub name: String,
  /// IDs of the players taking part.
  pub players: Vec<u32>,
}

impl NewGame {
  /// Checks that this game can be created.
  pub fn validate(&self) -> Result<(), Invalid> {
    if self.name.trim().is_empty() {
      return Err(Invalid::EmptyName);
    }
    if self.players.is_empty() {
      return Err(Invalid::NoPlayers);
    }
    Ok(())
  }
}

/// A player about to be created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
  /// The player's name.
  pub name: String,
  /// The ID of the player's favourite creature.
  pub pokemon_id: u32,
}

impl NewPlayer {
  /// Checks that this player can be created.
  pub fn validate(&self) -> Result<(), Invalid> {
    if self.name.trim().is_empty() {
      return Err(Invalid::EmptyName);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;

  #[test]
  fn player_games() {
    let json = r#"{
      "players": [
        {
          "id": 3, "playerId": 9, "gameId": 1,
          "player": {
            "id": 9, "name": "Ash", "pokemonId": 25, "userId": 2,
            "pokemon": { "name": "Pikachu", "image": "pikachu" }
          }
        },
        {
          "id": 4, "playerId": 10, "gameId": 1,
          "player": { "id": 10, "name": "Misty", "userId": 2 }
        }
      ]
    }"#;

    #[derive(Deserialize)]
    struct Envelope {
      players: Vec<PlayerGame>,
    }

    let env: Envelope = serde_json::from_str(json).unwrap();
    assert_eq!(env.players.len(), 2);
    assert_eq!(env.players[0].player.pokemon_id, Some(25));
    assert_eq!(
      env.players[0].player.pokemon.as_ref().map(|p| p.name.as_str()),
      Some("Pikachu")
    );
    assert_eq!(env.players[1].player.pokemon, None);
  }

  #[test]
  fn new_game_validation() {
    let mut game = NewGame {
      name: "Nuzlocke".to_string(),
      players: vec![1, 2],
    };
    assert_eq!(game.validate(), Ok(()));

    game.players.clear();
    assert_eq!(game.validate(), Err(Invalid::NoPlayers));

    game.name = String::new();
    assert_eq!(game.validate(), Err(Invalid::EmptyName));
  }

  #[test]
  fn new_player_wire_form() {
    let player = NewPlayer {
      name: "Brock".to_string(),
      pokemon_id: 95,
    };
    assert_eq!(
      serde_json::to_value(&player).unwrap(),
      serde_json::json!({ "name": "Brock", "pokemonId": 95 })
    );
  }
}
