//! Per-player statistics.

use std::collections::BTreeMap;

use serde::de::Deserializer;
use serde::Deserialize;
use serde::Serialize;

use crate::model::creature::blank_as_none;
use crate::model::ty;
use crate::model::TypeName;

/// A player's tallies across every game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
  #[allow(missing_docs)]
  pub player_name: String,
  /// Creatures caught.
  pub caught: u32,
  /// Creatures that fled.
  pub runaway: u32,
  /// Creatures defeated.
  pub defeated: u32,
  /// Shiny creatures encountered.
  pub shiny: u32,
  /// How many caught creatures had each type.
  ///
  /// Keys the backend reports which are not types are dropped.
  #[serde(default, deserialize_with = "type_counts")]
  pub type_counts: BTreeMap<TypeName, u32>,
}

impl PlayerStats {
  /// Returns the total number of encounters.
  pub fn encounters(&self) -> u32 {
    self.caught + self.runaway + self.defeated
  }

  /// Returns type counts ordered from most to least common.
  pub fn top_types(&self) -> Vec<(TypeName, u32)> {
    let mut counts = self
      .type_counts
      .iter()
      .map(|(&ty, &n)| (ty, n))
      .collect::<Vec<_>>();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    counts
  }
}

fn type_counts<'de, D>(d: D) -> Result<BTreeMap<TypeName, u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<BTreeMap<String, u32>>::deserialize(d)?.unwrap_or_default();
  let mut counts = BTreeMap::new();
  for (name, n) in raw {
    match name.parse::<TypeName>() {
      Ok(ty) => *counts.entry(ty).or_insert(0) += n,
      Err(e) => tracing::warn!("dropping type count: {}", e),
    }
  }
  Ok(counts)
}

/// How many times a player has captured one particular creature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSummary {
  /// The creature's ID.
  pub id: u32,
  #[allow(missing_docs)]
  pub name: String,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "blank_as_none")]
  pub form: Option<String>,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "blank_as_none")]
  pub image: Option<String>,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "blank_as_none")]
  pub shiny_image: Option<String>,
  /// The number of times this creature was captured.
  pub times_captured: u32,
  /// Whether any of the captures was shiny.
  #[serde(with = "yes_no")]
  pub shiny_capture: bool,
  #[allow(missing_docs)]
  pub type1: TypeName,
  #[allow(missing_docs)]
  #[serde(default, deserialize_with = "ty::deserialize_optional")]
  pub type2: Option<TypeName>,
}

/// Booleans which the backend reports as `"yes"` and `"no"`.
mod yes_no {
  use serde::de;
  use serde::Deserialize;
  use serde::Deserializer;
  use serde::Serializer;

  pub fn serialize<S: Serializer>(b: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *b { "yes" } else { "no" })
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let s = String::deserialize(d)?;
    match s.to_ascii_lowercase().as_str() {
      "yes" => Ok(true),
      "no" => Ok(false),
      _ => Err(de::Error::invalid_value(
        de::Unexpected::Str(&s),
        &"\"yes\" or \"no\"",
      )),
    }
  }
}
