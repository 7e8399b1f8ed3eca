//! Base statistics, which describe how powerful a creature is relative to
//! others.

use serde::Deserialize;
use serde::Serialize;

use crate::model::ty::Rgb;

/// A creature's six base stats, as stored by the backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
  /// Hit Points determine how much damage a creature can take in battle.
  pub hp: u32,
  /// Attack determines the power of physical moves.
  pub attack: u32,
  /// Defense determines the effectiveness of physical moves against it.
  pub defense: u32,
  /// Special Attack determines the power of special moves.
  pub special_attack: u32,
  /// Special Defense determines the effectiveness of special moves against
  /// it.
  pub special_defense: u32,
  /// Speed determines who moves first in a turn.
  pub speed: u32,
}

impl BaseStats {
  /// Returns the sum of all six stats.
  pub fn total(&self) -> u64 {
    total(
      self.hp,
      self.attack,
      self.defense,
      self.special_attack,
      self.special_defense,
      self.speed,
    )
  }

  /// Returns the value of `stat`.
  pub fn get(&self, stat: StatName) -> u32 {
    match stat {
      StatName::HitPoints => self.hp,
      StatName::Attack => self.attack,
      StatName::Defense => self.defense,
      StatName::SpAttack => self.special_attack,
      StatName::SpDefense => self.special_defense,
      StatName::Speed => self.speed,
    }
  }

  /// Iterates over every stat and its value, in display order.
  pub fn iter(&self) -> impl Iterator<Item = (StatName, u32)> + '_ {
    StatName::ALL.iter().map(move |&s| (s, self.get(s)))
  }
}

/// Sums six base stats.
///
/// The sum is widened so that no combination of stat values can overflow.
pub fn total(
  hp: u32,
  attack: u32,
  defense: u32,
  special_attack: u32,
  special_defense: u32,
  speed: u32,
) -> u64 {
  [hp, attack, defense, special_attack, special_defense, speed]
    .iter()
    .map(|&v| u64::from(v))
    .sum()
}

/// A name for one of the six base stats.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum StatName {
  HitPoints,
  Attack,
  Defense,
  SpAttack,
  SpDefense,
  Speed,
}

impl StatName {
  /// Every stat, in display order.
  pub const ALL: &'static [Self] = &[
    Self::HitPoints,
    Self::Attack,
    Self::Defense,
    Self::SpAttack,
    Self::SpDefense,
    Self::Speed,
  ];

  /// Returns the label this stat is displayed with.
  pub fn label(self) -> &'static str {
    match self {
      Self::HitPoints => "HP",
      Self::Attack => "Attack",
      Self::Defense => "Defense",
      Self::SpAttack => "Special Attack",
      Self::SpDefense => "Special Defense",
      Self::Speed => "Speed",
    }
  }

  /// Returns a short label, for narrow displays.
  pub fn short_label(self) -> &'static str {
    match self {
      Self::HitPoints => "HP",
      Self::Attack => "Atk",
      Self::Defense => "Def",
      Self::SpAttack => "SpA",
      Self::SpDefense => "SpD",
      Self::Speed => "Spe",
    }
  }
}

/// A coarse rating of a single stat value, which decides the color of its
/// bar.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum StatTier {
  Poor,
  Low,
  Average,
  High,
  Excellent,
}

impl StatTier {
  /// Rates `value`.
  pub fn of(value: u32) -> Self {
    match value {
      0..=39 => Self::Poor,
      40..=59 => Self::Low,
      60..=89 => Self::Average,
      90..=119 => Self::High,
      _ => Self::Excellent,
    }
  }

  /// Returns the color bars in this tier are drawn with.
  pub fn color(self) -> Rgb {
    match self {
      Self::Poor => Rgb::from_hex(0xDC2626),
      Self::Low => Rgb::from_hex(0xEA580C),
      Self::Average => Rgb::from_hex(0xFACC15),
      Self::High => Rgb::from_hex(0x22C55E),
      Self::Excellent => Rgb::from_hex(0x16A34A),
    }
  }
}

/// Returns how full a stat bar for `value` is, as a percentage.
///
/// Bars saturate at 100.
pub fn bar_percent(value: u32) -> u16 {
  value.min(100) as u16
}

#[cfg(test)]
mod tests {
  use super::*;

  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[test]
  fn total_is_a_plain_sum() {
    assert_eq!(total(35, 55, 40, 50, 50, 90), 320);
    assert_eq!(total(0, 0, 0, 0, 0, 0), 0);

    let stats = BaseStats {
      hp: 35,
      attack: 55,
      defense: 40,
      special_attack: 50,
      special_defense: 50,
      speed: 90,
    };
    assert_eq!(stats.total(), 320);
    assert_eq!(stats.get(StatName::Speed), 90);
    assert_eq!(stats.iter().map(|(_, v)| v).sum::<u32>(), 320);
  }

  #[test]
  fn total_does_not_overflow() {
    let max = u32::MAX;
    assert_eq!(total(max, max, max, max, max, max), 6 * u64::from(max));
  }

  #[rstest]
  #[case(0, StatTier::Poor)]
  #[case(39, StatTier::Poor)]
  #[case(40, StatTier::Low)]
  #[case(59, StatTier::Low)]
  #[case(60, StatTier::Average)]
  #[case(89, StatTier::Average)]
  #[case(90, StatTier::High)]
  #[case(119, StatTier::High)]
  #[case(120, StatTier::Excellent)]
  #[case(255, StatTier::Excellent)]
  fn tiers(#[case] value: u32, #[case] tier: StatTier) {
    assert_eq!(StatTier::of(value), tier);
  }

  #[test]
  fn bars_saturate() {
    assert_eq!(bar_percent(45), 45);
    assert_eq!(bar_percent(100), 100);
    assert_eq!(bar_percent(150), 100);
  }

  #[test]
  fn wire_form() {
    let stats: BaseStats = serde_json::from_str(
      r#"{ "hp": 45, "attack": 49, "defense": 49,
           "specialAttack": 65, "specialDefense": 65, "speed": 45 }"#,
    )
    .unwrap();
    assert_eq!(stats.special_attack, 65);
    assert_eq!(stats.total(), 318);
  }
}
