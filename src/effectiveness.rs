//! Type effectiveness: how much damage every attacking type deals to a
//! creature with one or two defending types.

use std::fmt;
use std::ops::Index;

use serde::de;
use serde::de::Deserializer;
use serde::ser::SerializeMap;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;

use crate::chart::Multiplier;
use crate::chart::TypeChart;
use crate::model::ty::Rgb;
use crate::model::TypeName;

/// An effectiveness error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// A type name was not one of the eighteen known types.
  #[error("{0:?} is not a type")]
  InvalidType(String),

  /// A multiplier fell outside of every display band.
  #[error("{0:?} is not a recognized effectiveness")]
  InvalidMultiplier(Multiplier),
}

/// Resolves [`Effectiveness`] mappings against a particular [`TypeChart`].
#[derive(Copy, Clone, Debug)]
pub struct Resolver<'c> {
  chart: &'c TypeChart,
}

impl<'c> Resolver<'c> {
  /// Creates a resolver reading from `chart`.
  pub fn new(chart: &'c TypeChart) -> Self {
    Self { chart }
  }

  /// Returns the chart this resolver reads from.
  pub fn chart(&self) -> &'c TypeChart {
    self.chart
  }

  /// Computes the multiplier every attacking type deals to a defender with
  /// types `type1` and, optionally, `type2`.
  ///
  /// Each entry is `chart[a][type1] * chart[a][type2]`, with a missing second
  /// type counting as neutral.
  pub fn resolve(
    &self,
    type1: TypeName,
    type2: Option<TypeName>,
  ) -> Effectiveness {
    let mut values = [Multiplier::NEUTRAL; TypeName::COUNT];
    for &attacking in TypeName::ALL {
      let first = self.chart.get(attacking, type1);
      let second = type2
        .map(|ty| self.chart.get(attacking, ty))
        .unwrap_or(Multiplier::NEUTRAL);
      values[attacking.index()] = first * second;
    }
    Effectiveness { values }
  }

  /// Like [`Resolver::resolve()`], but for type names as they come off the
  /// wire.
  ///
  /// A blank `type2` is the same as no second type.
  pub fn resolve_names(
    &self,
    type1: &str,
    type2: Option<&str>,
  ) -> Result<Effectiveness, Error> {
    let type1 = type1.parse()?;
    let type2 = TypeName::parse_optional(type2)?;
    Ok(self.resolve(type1, type2))
  }
}

impl Default for Resolver<'static> {
  fn default() -> Self {
    Self::new(TypeChart::shared())
  }
}

/// The multiplier each attacking type deals to a particular defender.
///
/// This is a derived value: it is recomputed from a creature's types whenever
/// it is needed.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Effectiveness {
  values: [Multiplier; TypeName::COUNT],
}

impl Effectiveness {
  /// Returns the multiplier `attacking` deals to the defender.
  #[inline]
  pub fn get(&self, attacking: TypeName) -> Multiplier {
    self.values[attacking.index()]
  }

  /// Iterates over every attacking type and its multiplier, in chart order.
  pub fn iter(&self) -> impl Iterator<Item = (TypeName, Multiplier)> + '_ {
    TypeName::ALL.iter().map(move |&ty| (ty, self.get(ty)))
  }

  /// Iterates over every attacking type along with its classification.
  pub fn cells(&self) -> impl Iterator<Item = (TypeName, Cell)> + '_ {
    self.iter().map(|(ty, m)| (ty, Cell::of(m)))
  }

  /// Attacking types that deal more than regular damage.
  pub fn weaknesses(&self) -> impl Iterator<Item = (TypeName, Multiplier)> + '_ {
    self.iter().filter(|&(_, m)| m > Multiplier::NEUTRAL)
  }

  /// Attacking types that deal some, but less than regular, damage.
  pub fn resistances(
    &self,
  ) -> impl Iterator<Item = (TypeName, Multiplier)> + '_ {
    self
      .iter()
      .filter(|&(_, m)| !m.is_immune() && m < Multiplier::NEUTRAL)
  }

  /// Attacking types that deal no damage at all.
  pub fn immunities(&self) -> impl Iterator<Item = TypeName> + '_ {
    self.iter().filter(|(_, m)| m.is_immune()).map(|(ty, _)| ty)
  }
}

impl Index<TypeName> for Effectiveness {
  type Output = Multiplier;

  fn index(&self, attacking: TypeName) -> &Multiplier {
    &self.values[attacking.index()]
  }
}

impl fmt::Debug for Effectiveness {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}

impl Serialize for Effectiveness {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    let mut map = s.serialize_map(Some(TypeName::COUNT))?;
    for (ty, m) in self.iter() {
      map.serialize_entry(&ty, &m)?;
    }
    map.end()
  }
}

struct EffectivenessVisitor;

impl<'de> de::Visitor<'de> for EffectivenessVisitor {
  type Value = Effectiveness;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.write_str("a multiplier for every type")
  }

  fn visit_map<A>(self, mut map: A) -> Result<Effectiveness, A::Error>
  where
    A: de::MapAccess<'de>,
  {
    let mut values = [None; TypeName::COUNT];
    while let Some((ty, m)) = map.next_entry::<TypeName, Multiplier>()? {
      let slot = &mut values[ty.index()];
      if slot.is_some() {
        return Err(de::Error::duplicate_field(ty.name()));
      }
      *slot = Some(m);
    }

    let mut out = [Multiplier::NEUTRAL; TypeName::COUNT];
    for &ty in TypeName::ALL {
      out[ty.index()] =
        values[ty.index()].ok_or_else(|| de::Error::missing_field(ty.name()))?;
    }
    Ok(Effectiveness { values: out })
  }
}

impl<'de> Deserialize<'de> for Effectiveness {
  fn deserialize<D>(d: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    d.deserialize_map(EffectivenessVisitor)
  }
}

/// A display band for an effectiveness [`Multiplier`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum Band {
  Immune,
  Quarter,
  Half,
  Normal,
  Double,
  Quadruple,
}

/// Colors for one effectiveness cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BandStyle {
  /// The cell's background.
  pub background: Rgb,
  /// The label's color.
  pub foreground: Rgb,
}

const WHITE: Rgb = Rgb::from_hex(0xFFFFFF);
const BLACK: Rgb = Rgb::from_hex(0x000000);

impl Band {
  /// Every band, from least to most damage.
  pub const ALL: &'static [Self] = &[
    Self::Immune,
    Self::Quarter,
    Self::Half,
    Self::Normal,
    Self::Double,
    Self::Quadruple,
  ];

  /// Returns the exact multiplier this band stands for.
  pub fn multiplier(self) -> Multiplier {
    match self {
      Self::Immune => Multiplier::IMMUNE,
      Self::Quarter => Multiplier::QUARTER,
      Self::Half => Multiplier::HALF,
      Self::Normal => Multiplier::NEUTRAL,
      Self::Double => Multiplier::DOUBLE,
      Self::Quadruple => Multiplier::QUADRUPLE,
    }
  }

  /// Returns the short label for this band, such as `1/2x`.
  pub fn label(self) -> &'static str {
    match self {
      Self::Immune => "0x",
      Self::Quarter => "1/4x",
      Self::Half => "1/2x",
      Self::Normal => "1x",
      Self::Double => "2x",
      Self::Quadruple => "4x",
    }
  }

  /// Returns the colors cells in this band are drawn with.
  pub fn style(self) -> BandStyle {
    let (background, foreground) = match self {
      Self::Immune => (BLACK, WHITE),
      Self::Quarter => (Rgb::from_hex(0x7F1D1D), WHITE),
      Self::Half => (Rgb::from_hex(0xDC2626), WHITE),
      Self::Normal => (Rgb::from_hex(0xD1D5DB), BLACK),
      Self::Double => (Rgb::from_hex(0x22C55E), WHITE),
      Self::Quadruple => (Rgb::from_hex(0x86EFAC), BLACK),
    };
    BandStyle {
      background,
      foreground,
    }
  }
}

impl fmt::Display for Band {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl TryFrom<Multiplier> for Band {
  type Error = Error;

  fn try_from(m: Multiplier) -> Result<Self, Error> {
    Self::ALL
      .iter()
      .copied()
      .find(|band| band.multiplier() == m)
      .ok_or(Error::InvalidMultiplier(m))
  }
}

/// Classifies `m` into a display band.
///
/// Multipliers outside of the six bands (e.g. 8x, which two stacked 4x
/// entries of a substituted chart can produce) are an error rather than being
/// folded into the nearest band.
pub fn classify(m: Multiplier) -> Result<Band, Error> {
  Band::try_from(m)
}

/// A classified multiplier, ready for display.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
  /// The multiplier falls into a known band.
  Known(Band),
  /// The multiplier falls outside of every band; it is displayed with its
  /// exact value and a distinct style.
  Unknown(Multiplier),
}

impl Cell {
  /// The style used for [`Cell::Unknown`].
  pub const UNKNOWN_STYLE: BandStyle = BandStyle {
    background: Rgb::from_hex(0xD946EF),
    foreground: WHITE,
  };

  /// Classifies `m`.
  pub fn of(m: Multiplier) -> Self {
    match classify(m) {
      Ok(band) => Self::Known(band),
      Err(_) => Self::Unknown(m),
    }
  }

  /// Returns this cell's label, e.g. `2x`, `1/4x`, or `8x` for an unknown
  /// multiplier.
  pub fn label(&self) -> String {
    match self {
      Self::Known(band) => band.label().to_string(),
      Self::Unknown(m) => format!("{}x", m),
    }
  }

  /// Returns this cell's colors.
  pub fn style(&self) -> BandStyle {
    match self {
      Self::Known(band) => band.style(),
      Self::Unknown(_) => Self::UNKNOWN_STYLE,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  use assert_matches::assert_matches;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  use crate::model::TypeName::*;

  fn resolver() -> Resolver<'static> {
    Resolver::default()
  }

  #[test]
  fn single_type_is_a_chart_lookup() {
    let chart = TypeChart::standard();
    let resolver = Resolver::new(&chart);
    for &defending in TypeName::ALL {
      let eff = resolver.resolve(defending, None);
      for &attacking in TypeName::ALL {
        assert_eq!(eff.get(attacking), chart.get(attacking, defending));
      }
    }
  }

  #[test]
  fn argument_order_does_not_matter() {
    let resolver = resolver();
    for &a in TypeName::ALL {
      for &b in TypeName::ALL {
        assert_eq!(
          resolver.resolve(a, Some(b)),
          resolver.resolve(b, Some(a)),
          "{} / {}",
          a,
          b
        );
      }
    }
  }

  #[test]
  fn every_pair_stays_in_the_reachable_set() {
    let reachable = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0];
    let resolver = resolver();
    for &a in TypeName::ALL {
      for &b in TypeName::ALL {
        for (_, m) in resolver.resolve(a, Some(b)).iter() {
          assert!(reachable.contains(&m.as_f64()), "{:?}", m);
        }
      }
    }
  }

  #[test]
  fn standard_chart_never_leaves_the_bands() {
    let resolver = resolver();
    for &a in TypeName::ALL {
      for &b in TypeName::ALL {
        for (ty, m) in resolver.resolve(a, Some(b)).iter() {
          assert!(classify(m).is_ok(), "{} vs {}/{}: {:?}", ty, a, b, m);
        }
      }
    }
  }

  #[test]
  fn water_ground_against_grass() {
    // With Ground taking regular damage from Grass, only Water's weakness
    // counts.
    let chart = TypeChart::standard()
      .with(Grass, Ground, Multiplier::NEUTRAL)
      .unwrap();
    let eff = Resolver::new(&chart).resolve(Water, Some(Ground));
    assert_eq!(eff[Grass], Multiplier::DOUBLE);
    assert_eq!(classify(eff[Grass]).unwrap(), Band::Double);

    // The canonical chart has Grass hit Ground hard as well.
    let eff = resolver().resolve(Water, Some(Ground));
    assert_eq!(eff[Grass], Multiplier::QUADRUPLE);
    assert_eq!(classify(eff[Grass]).unwrap(), Band::Quadruple);
    assert_eq!(eff[Electric], Multiplier::IMMUNE);
  }

  #[test]
  fn ghost_dark_against_normal() {
    let eff = resolver().resolve(Ghost, Some(Dark));
    assert_eq!(eff[Normal], Multiplier::IMMUNE);
    assert_eq!(classify(eff[Normal]).unwrap(), Band::Immune);

    // Zero absorbs even a super effective second factor.
    let chart = TypeChart::standard()
      .with(Normal, Dark, Multiplier::QUADRUPLE)
      .unwrap();
    let eff = Resolver::new(&chart).resolve(Ghost, Some(Dark));
    assert_eq!(eff[Normal], Multiplier::IMMUNE);
  }

  #[test]
  fn stacked_weaknesses_are_not_coerced() {
    let chart = TypeChart::neutral()
      .with(Fire, Grass, Multiplier::QUADRUPLE)
      .unwrap()
      .with(Fire, Bug, Multiplier::QUADRUPLE)
      .unwrap();
    let eff = Resolver::new(&chart).resolve(Grass, Some(Bug));
    assert_eq!(eff[Fire], Multiplier::pow2(4));
    assert_eq!(eff[Fire].as_f64(), 16.0);
    assert_matches!(classify(eff[Fire]), Err(Error::InvalidMultiplier(m)) if m == Multiplier::pow2(4));

    let eff = Resolver::new(&chart).resolve(Grass, None);
    assert_eq!(classify(eff[Fire]).unwrap(), Band::Quadruple);
  }

  #[rstest]
  #[case(Multiplier::IMMUNE, Band::Immune, "0x")]
  #[case(Multiplier::QUARTER, Band::Quarter, "1/4x")]
  #[case(Multiplier::HALF, Band::Half, "1/2x")]
  #[case(Multiplier::NEUTRAL, Band::Normal, "1x")]
  #[case(Multiplier::DOUBLE, Band::Double, "2x")]
  #[case(Multiplier::QUADRUPLE, Band::Quadruple, "4x")]
  fn classify_bands(
    #[case] m: Multiplier,
    #[case] band: Band,
    #[case] label: &str,
  ) {
    assert_eq!(classify(m).unwrap(), band);
    assert_eq!(band.multiplier(), m);
    assert_eq!(band.label(), label);
    assert_eq!(Cell::of(m).label(), label);
  }

  #[rstest]
  #[case(Multiplier::pow2(3), "8x")]
  #[case(Multiplier::pow2(4), "16x")]
  #[case(Multiplier::pow2(-3), "1/8x")]
  fn classify_rejects_the_rest(#[case] m: Multiplier, #[case] label: &str) {
    assert_eq!(classify(m), Err(Error::InvalidMultiplier(m)));
    let cell = Cell::of(m);
    assert_eq!(cell, Cell::Unknown(m));
    assert_eq!(cell.label(), label);
    assert_eq!(cell.style(), Cell::UNKNOWN_STYLE);
  }

  #[test]
  fn band_styles_are_distinct() {
    let mut backgrounds =
      Band::ALL.iter().map(|b| b.style().background).collect::<Vec<_>>();
    backgrounds.push(Cell::UNKNOWN_STYLE.background);
    let count = backgrounds.len();
    backgrounds.sort_by_key(|c| (c.0, c.1, c.2));
    backgrounds.dedup();
    assert_eq!(backgrounds.len(), count);
  }

  #[test]
  fn resolve_names() {
    let resolver = resolver();
    assert_eq!(
      resolver.resolve_names("Water", Some("ground")).unwrap(),
      resolver.resolve(Water, Some(Ground))
    );
    assert_eq!(
      resolver.resolve_names("Fire", Some("")).unwrap(),
      resolver.resolve(Fire, None)
    );
    assert_eq!(
      resolver.resolve_names("Fire", None).unwrap(),
      resolver.resolve(Fire, None)
    );
    assert_eq!(
      resolver.resolve_names("Flame", None),
      Err(Error::InvalidType("Flame".to_string()))
    );
    assert_eq!(
      resolver.resolve_names("Fire", Some("Sound")),
      Err(Error::InvalidType("Sound".to_string()))
    );
  }

  #[test]
  fn groupings() {
    let eff = resolver().resolve(Steel, Some(Flying));
    let immune = eff.immunities().collect::<Vec<_>>();
    assert_eq!(immune, vec![Poison, Ground]);

    let weak = eff.weaknesses().map(|(ty, _)| ty).collect::<Vec<_>>();
    assert_eq!(weak, vec![Fire, Electric]);

    assert!(eff.resistances().all(|(_, m)| m < Multiplier::NEUTRAL));
    assert!(eff
      .resistances()
      .any(|(ty, m)| ty == Grass && m == Multiplier::QUARTER));
  }

  #[test]
  fn json_mapping() {
    let eff = resolver().resolve(Fire, None);
    let json = serde_json::to_value(&eff).unwrap();
    let obj = json.as_object().unwrap();
    assert_eq!(obj.len(), 18);
    assert_eq!(obj["Water"], serde_json::json!(2));
    assert_eq!(obj["Grass"], serde_json::json!(0.5));
    assert_eq!(obj["Normal"], serde_json::json!(1));

    let back: Effectiveness = serde_json::from_value(json).unwrap();
    assert_eq!(back, eff);
  }

  #[test]
  fn json_mapping_must_be_complete() {
    let mut json = serde_json::to_value(resolver().resolve(Fire, None)).unwrap();
    json.as_object_mut().unwrap().remove("Fairy");
    assert!(serde_json::from_value::<Effectiveness>(json.clone()).is_err());

    json
      .as_object_mut()
      .unwrap()
      .insert("Shadow".to_string(), serde_json::json!(1));
    assert!(serde_json::from_value::<Effectiveness>(json).is_err());
  }
}
