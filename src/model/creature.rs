//! Creature records, which make up the shared Pokédex.

use std::fmt;

use serde::de::Deserializer;
use serde::Deserialize;
use serde::Serialize;

use crate::chart::Multiplier;
use crate::effectiveness::Effectiveness;
use crate::effectiveness::Resolver;
use crate::model::stats::BaseStats;
use crate::model::ty;
use crate::model::TypeName;

/// A validation failure for a record, either one read from the backend or a
/// draft about to be sent to it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Invalid {
  /// The stored total disagrees with the sum of the six stats.
  #[error("stored stat total is {stored}, but the stats add up to {computed}")]
  StatTotalMismatch {
    /// The total the record carries.
    stored: u32,
    /// The sum of the record's stats.
    computed: u64,
  },

  /// A creature's second type repeats its first.
  #[error("second type repeats the first type, {0}")]
  DuplicateType(TypeName),

  /// A name was empty.
  #[error("name must not be empty")]
  EmptyName,

  /// A new game had no players.
  #[error("a game needs at least one player")]
  NoPlayers,

  /// A required field of a draft was left blank.
  #[error("{0} must not be empty")]
  MissingField(&'static str),
}

/// A creature in the Pokédex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creature {
  /// The backend's row ID for this creature.
  pub id: u32,
  /// This creature's National Pokédex number; alternate forms share it.
  pub national_dex: u32,
  /// This creature's name.
  pub name: String,
  /// This creature's form, e.g. `Alola`, if it is not the base form.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub form: Option<String>,

  /// This creature's primary type.
  pub type1: TypeName,
  /// This creature's secondary type, if it has one.
  #[serde(default, deserialize_with = "ty::deserialize_optional")]
  pub type2: Option<TypeName>,

  /// This creature's base stats.
  #[serde(flatten)]
  pub stats: BaseStats,
  /// The stat total as the backend stores it; see [`Creature::check_total()`].
  pub total: u32,

  /// The generation this creature was introduced in.
  pub generation: u32,
  /// The sprite's file stem.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub image: Option<String>,
  /// The shiny sprite's file stem.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub shiny_image: Option<String>,
}

impl Creature {
  /// Iterates over this creature's one or two types.
  pub fn types(&self) -> impl Iterator<Item = TypeName> {
    std::iter::once(self.type1).chain(self.type2)
  }

  /// Computes this creature's defensive effectiveness.
  pub fn effectiveness(&self, resolver: &Resolver) -> Effectiveness {
    resolver.resolve(self.type1, self.type2)
  }

  /// Checks the stored stat total against the stats themselves.
  pub fn check_total(&self) -> Result<(), Invalid> {
    let computed = self.stats.total();
    if computed != u64::from(self.total) {
      return Err(Invalid::StatTotalMismatch {
        stored: self.total,
        computed,
      });
    }
    Ok(())
  }
}

impl fmt::Display for Creature {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match &self.form {
      Some(form) => write!(f, "{} ({})", self.name, form),
      None => f.write_str(&self.name),
    }
  }
}

/// A creature together with its type defenses.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureDetail {
  /// The creature.
  pub creature: Creature,
  /// The creature's effectiveness, computed with the client's chart.
  pub effectiveness: Effectiveness,
  /// Attacking types for which the backend reported a different multiplier,
  /// along with the multiplier it reported.
  pub disagreements: Vec<(TypeName, Multiplier)>,
}

impl CreatureDetail {
  /// Computes the detail for `creature` with `resolver`.
  pub fn new(creature: Creature, resolver: &Resolver) -> Self {
    let effectiveness = creature.effectiveness(resolver);
    if let Err(e) = creature.check_total() {
      tracing::warn!(id = creature.id, name = %creature.name, "{}", e);
    }
    Self {
      creature,
      effectiveness,
      disagreements: Vec::new(),
    }
  }

  /// Compares the locally computed effectiveness against the one the backend
  /// sent, recording every type where they disagree.
  ///
  /// The local result always wins.
  pub fn reconcile(mut self, remote: &Effectiveness) -> Self {
    self.disagreements = self
      .effectiveness
      .iter()
      .filter(|&(ty, m)| remote.get(ty) != m)
      .map(|(ty, _)| (ty, remote.get(ty)))
      .collect();

    for &(ty, theirs) in &self.disagreements {
      tracing::warn!(
        id = self.creature.id,
        attacking = %ty,
        local = ?self.effectiveness.get(ty),
        remote = ?theirs,
        "backend effectiveness disagrees with the type chart"
      );
    }
    self
  }
}

/// A creature about to be created or updated.
///
/// Drafts never carry a stat total; one is computed from the stats when the
/// draft is submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCreature {
  /// See [`Creature::national_dex`].
  pub national_dex: u32,
  /// See [`Creature::name`].
  pub name: String,
  /// See [`Creature::form`].
  pub form: Option<String>,
  /// See [`Creature::type1`].
  pub type1: TypeName,
  /// See [`Creature::type2`].
  pub type2: Option<TypeName>,
  /// See [`Creature::stats`].
  pub stats: BaseStats,
  /// See [`Creature::generation`].
  pub generation: u32,
}

impl NewCreature {
  /// Creates a draft that edits `creature`.
  pub fn from_creature(creature: &Creature) -> Self {
    Self {
      national_dex: creature.national_dex,
      name: creature.name.clone(),
      form: creature.form.clone(),
      type1: creature.type1,
      type2: creature.type2,
      stats: creature.stats,
      generation: creature.generation,
    }
  }

  /// Returns the stat total this draft will be submitted with.
  pub fn total(&self) -> u64 {
    self.stats.total()
  }

  /// Checks that this draft can be submitted.
  pub fn validate(&self) -> Result<(), Invalid> {
    if self.name.trim().is_empty() {
      return Err(Invalid::EmptyName);
    }
    if self.type2 == Some(self.type1) {
      return Err(Invalid::DuplicateType(self.type1));
    }
    Ok(())
  }

  /// Returns the text fields of the multipart form this draft is submitted
  /// as, in the order the backend expects them.
  pub fn fields(&self) -> Vec<(&'static str, String)> {
    let s = &self.stats;
    vec![
      ("nationalDex", self.national_dex.to_string()),
      ("name", self.name.trim().to_string()),
      ("form", self.form.clone().unwrap_or_default()),
      ("type1", self.type1.name().to_string()),
      (
        "type2",
        self.type2.map(|t| t.name().to_string()).unwrap_or_default(),
      ),
      ("hp", s.hp.to_string()),
      ("attack", s.attack.to_string()),
      ("defense", s.defense.to_string()),
      ("specialAttack", s.special_attack.to_string()),
      ("specialDefense", s.special_defense.to_string()),
      ("speed", s.speed.to_string()),
      ("generation", self.generation.to_string()),
      ("total", self.total().to_string()),
    ]
  }
}

/// Deserializes an optional string, treating a blank one like `null`.
pub(crate) fn blank_as_none<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let s = Option::<String>::deserialize(d)?;
  Ok(s.filter(|s| !s.trim().is_empty()))
}
