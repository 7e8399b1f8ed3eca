//! Capture events: a player meeting a creature on a route.

use std::collections::BTreeMap;
use std::fmt;

use serde::de;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;

use crate::model::creature::blank_as_none;
use crate::model::creature::Invalid;
use crate::model::game::Player;
use crate::model::ty;
use crate::model::TypeName;

/// How an encounter ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
  /// The creature was caught.
  #[serde(rename = "Catched")]
  Caught,
  /// The creature fled.
  #[serde(rename = "Run Away")]
  RunAway,
  /// The creature was defeated.
  #[serde(rename = "Defeated")]
  Defeated,
}

impl Status {
  /// Every status, in display order.
  pub const ALL: &'static [Self] = &[Self::Caught, Self::RunAway, Self::Defeated];

  /// Returns the backend's name for this status.
  pub fn name(self) -> &'static str {
    match self {
      Self::Caught => "Catched",
      Self::RunAway => "Run Away",
      Self::Defeated => "Defeated",
    }
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      Self::Caught => "Caught",
      Self::RunAway => "Ran away",
      Self::Defeated => "Defeated",
    })
  }
}

/// The creature summary embedded in an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreature {
  #[allow(missing_docs)]
  pub name: String,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "blank_as_none")]
  pub form: Option<String>,
  #[allow(missing_docs)]
  pub type1: TypeName,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "ty::deserialize_optional")]
  pub type2: Option<TypeName>,
  /// The stored stat total.
  #[serde(default)]
  pub total: u32,
  /// The sprite's file stem.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub image: Option<String>,
}

/// A recorded encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  /// This event's ID.
  pub id: u32,
  /// The ID of the creature encountered.
  pub pokemon_id: u32,
  /// The creature encountered.
  pub pokemon: EventCreature,
  /// The player who had the encounter.
  pub player: Player,
  /// The route or zone the encounter happened on.
  pub route: String,
  /// The nickname given to the creature.
  #[serde(default)]
  pub nickname: String,
  /// How the encounter ended.
  pub status: Status,
  /// Whether the creature was shiny.
  #[serde(with = "int_bool")]
  pub is_shiny: bool,
  /// Whether the creature became the player's champion.
  #[serde(with = "int_bool")]
  pub is_champ: bool,
  /// The game this event belongs to.
  pub game_id: u32,
  /// The sprite recorded with the event.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub pokemon_image: Option<String>,
}

impl Event {
  /// Returns the flags of this event.
  pub fn flags(&self) -> EventFlags {
    EventFlags {
      is_shiny: self.is_shiny,
      is_champ: self.is_champ,
    }
  }
}

/// Groups `events` by the ID of the player who had them, keeping their
/// original order within each group.
pub fn by_player(events: &[Event]) -> BTreeMap<u32, Vec<&Event>> {
  let mut groups = BTreeMap::<_, Vec<_>>::new();
  for event in events {
    groups.entry(event.player.id).or_default().push(event);
  }
  groups
}

/// An event about to be recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
  /// The ID of the creature encountered.
  pub pokemon_id: u32,
  /// The creature's sprite, copied from its Pokédex entry.
  pub pokemon_image: Option<String>,
  /// The route or zone.
  pub route: String,
  /// The nickname given to the creature.
  pub nickname: String,
  /// The player who had the encounter.
  pub player_id: u32,
  /// How the encounter ended.
  pub status: Status,
  /// The game this event belongs to.
  pub game_id: u32,
}

impl NewEvent {
  /// Checks that this event can be recorded.
  pub fn validate(&self) -> Result<(), Invalid> {
    if self.route.trim().is_empty() {
      return Err(Invalid::MissingField("route"));
    }
    if self.nickname.trim().is_empty() {
      return Err(Invalid::MissingField("nickname"));
    }
    Ok(())
  }
}

/// The toggleable flags of an [`Event`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFlags {
  #[allow(missing_docs)]
  #[serde(with = "int_bool")]
  pub is_shiny: bool,
  #[allow(missing_docs)]
  #[serde(with = "int_bool")]
  pub is_champ: bool,
}

/// Booleans which the backend stores as `0` and `1`.
mod int_bool {
  use super::*;

  pub fn serialize<S: Serializer>(b: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(*b as u8)
  }

  struct Visitor;

  impl<'de> de::Visitor<'de> for Visitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
      formatter.write_str("0, 1, or a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
      Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
      match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(de::Error::invalid_value(de::Unexpected::Unsigned(v), &self)),
      }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
      match v {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(de::Error::invalid_value(de::Unexpected::Signed(v), &self)),
      }
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
      Ok(false)
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    d.deserialize_any(Visitor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;
  use rstest::rstest;

  fn event(id: u32, player: u32) -> serde_json::Value {
    serde_json::json!({
      "id": id,
      "pokemonId": 4,
      "pokemon": {
        "name": "Charmander", "form": "", "type1": "Fire", "type2": null,
        "total": 309, "image": "charmander"
      },
      "player": { "id": player, "name": format!("player {}", player) },
      "route": "Route 1",
      "nickname": "Char",
      "status": "Run Away",
      "isShiny": 1,
      "isChamp": 0,
      "gameId": 1,
      "pokemonImage": "charmander"
    })
  }

  #[test]
  fn wire_form() {
    let e: Event = serde_json::from_value(event(1, 9)).unwrap();
    assert_eq!(e.status, Status::RunAway);
    assert!(e.is_shiny);
    assert!(!e.is_champ);
    assert_eq!(e.pokemon.form, None);
    assert_eq!(e.pokemon.type2, None);

    let json = serde_json::to_value(&e).unwrap();
    assert_eq!(json["isShiny"], serde_json::json!(1));
    assert_eq!(json["status"], serde_json::json!("Run Away"));
  }

  #[rstest]
  #[case(r#"{"isShiny": 0, "isChamp": 1}"#, false, true)]
  #[case(r#"{"isShiny": true, "isChamp": false}"#, true, false)]
  #[case(r#"{"isShiny": null, "isChamp": null}"#, false, false)]
  fn flags(#[case] json: &str, #[case] shiny: bool, #[case] champ: bool) {
    let flags: EventFlags = serde_json::from_str(json).unwrap();
    assert_eq!(
      flags,
      EventFlags {
        is_shiny: shiny,
        is_champ: champ,
      }
    );
  }

  #[test]
  fn flags_reject_other_numbers() {
    assert!(serde_json::from_str::<EventFlags>(r#"{"isShiny": 2, "isChamp": 0}"#).is_err());
  }

  #[test]
  fn statuses() {
    for &status in Status::ALL {
      let json = serde_json::to_string(&status).unwrap();
      assert_eq!(json, format!("\"{}\"", status.name()));
      assert_eq!(serde_json::from_str::<Status>(&json).unwrap(), status);
    }
    assert!(serde_json::from_str::<Status>("\"Caught\"").is_err());
  }

  #[test]
  fn grouping() {
    let events = vec![event(1, 9), event(2, 10), event(3, 9)]
      .into_iter()
      .map(|v| serde_json::from_value::<Event>(v).unwrap())
      .collect::<Vec<_>>();
    let groups = by_player(&events);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[&9].iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(groups[&10].iter().map(|e| e.id).collect::<Vec<_>>(), vec![2]);
  }

  #[test]
  fn new_event_validation() {
    let mut e = NewEvent {
      pokemon_id: 4,
      pokemon_image: None,
      route: "Route 1".to_string(),
      nickname: "Char".to_string(),
      player_id: 9,
      status: Status::Caught,
      game_id: 1,
    };
    assert_eq!(e.validate(), Ok(()));
    assert_eq!(serde_json::to_value(&e).unwrap()["status"], "Catched");

    e.nickname.clear();
    assert_eq!(e.validate(), Err(Invalid::MissingField("nickname")));
  }
}
