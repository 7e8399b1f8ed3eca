//! The type chart, which describes how much damage each attacking type deals
//! to each defending type.
//!
//! Damage multipliers are always zero or a power of two, so [`Multiplier`]
//! stores them as an exponent rather than as floating-point. This keeps
//! composition exact: `0.5 * 0.5` is exactly the same value as the `0.25`
//! constant, and equality comparisons downstream never drift.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::ops::Mul;
use std::path::Path;
use std::sync::OnceLock;

use serde::de;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;

use crate::model::TypeName;

/// An exact damage multiplier.
///
/// A multiplier is either zero (an immunity) or `2^k` for a small integer
/// `k`. Products of multipliers stay exact, and a zero factor always absorbs
/// the product.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Multiplier {
  // `None` is an immunity; `Some(k)` is `2^k`.
  exp: Option<i8>,
}

impl Multiplier {
  /// No damage.
  pub const IMMUNE: Self = Self { exp: None };
  /// A quarter of the damage.
  pub const QUARTER: Self = Self::pow2(-2);
  /// Half of the damage.
  pub const HALF: Self = Self::pow2(-1);
  /// Regular damage.
  pub const NEUTRAL: Self = Self::pow2(0);
  /// Twice the damage.
  pub const DOUBLE: Self = Self::pow2(1);
  /// Four times the damage.
  pub const QUADRUPLE: Self = Self::pow2(2);

  /// The largest exponent a multiplier can carry, in either direction.
  pub const MAX_EXP: i8 = 16;

  /// Creates the multiplier `2^exp`.
  ///
  /// `exp` saturates at [`Multiplier::MAX_EXP`] in either direction, which
  /// no product of two chart entries comes near.
  pub const fn pow2(exp: i8) -> Self {
    let exp = if exp > Self::MAX_EXP {
      Self::MAX_EXP
    } else if exp < -Self::MAX_EXP {
      -Self::MAX_EXP
    } else {
      exp
    };
    Self { exp: Some(exp) }
  }

  /// Returns whether this multiplier is zero.
  pub fn is_immune(self) -> bool {
    self.exp.is_none()
  }

  /// Returns the power-of-two exponent of this multiplier, or `None` for an
  /// immunity.
  pub fn exponent(self) -> Option<i8> {
    self.exp
  }

  /// Returns whether this multiplier can appear as a single entry of a type
  /// chart, i.e. whether it is one of 0, 1/4, 1/2, 1, 2 or 4.
  pub fn is_chart_value(self) -> bool {
    match self.exp {
      None => true,
      Some(k) => (-2..=2).contains(&k),
    }
  }

  /// Converts an exact floating-point value into a multiplier.
  ///
  /// Returns `None` if `value` is not zero or a power of two between `2^-16`
  /// and `2^16`.
  pub fn from_f64(value: f64) -> Option<Self> {
    if value == 0.0 {
      return Some(Self::IMMUNE);
    }
    if !value.is_finite() || value < 0.0 {
      return None;
    }

    let exp = value.log2().round();
    if exp.abs() > Self::MAX_EXP as f64 || 2f64.powi(exp as i32) != value {
      return None;
    }
    Some(Self::pow2(exp as i8))
  }

  /// Converts this multiplier into floating-point. The conversion is exact.
  pub fn as_f64(self) -> f64 {
    match self.exp {
      None => 0.0,
      Some(k) => 2f64.powi(k as i32),
    }
  }

  /// Returns this multiplier as a `(numerator, denominator)` pair with a
  /// power-of-two denominator.
  pub fn as_fraction(self) -> (u32, u32) {
    match self.exp {
      None => (0, 1),
      Some(k) if k >= 0 => (1 << k, 1),
      Some(k) => (1, 1 << -k),
    }
  }
}

impl Mul for Multiplier {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    match (self.exp, rhs.exp) {
      (Some(a), Some(b)) => Self::pow2(a.saturating_add(b)),
      _ => Self::IMMUNE,
    }
  }
}

impl PartialOrd for Multiplier {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Multiplier {
  fn cmp(&self, other: &Self) -> Ordering {
    // `None < Some(_)`, which is exactly "zero is smaller than everything".
    self.exp.cmp(&other.exp)
  }
}

impl fmt::Display for Multiplier {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.as_fraction() {
      (n, 1) => write!(f, "{}", n),
      (n, d) => write!(f, "{}/{}", n, d),
    }
  }
}

impl fmt::Debug for Multiplier {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}x", self)
  }
}

impl Serialize for Multiplier {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    match self.as_fraction() {
      (n, 1) => s.serialize_u32(n),
      _ => s.serialize_f64(self.as_f64()),
    }
  }
}

struct MultiplierVisitor;

impl<'de> de::Visitor<'de> for MultiplierVisitor {
  type Value = Multiplier;

  fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
    formatter.write_str("zero or an exact power of two")
  }

  fn visit_u64<E: de::Error>(self, v: u64) -> Result<Multiplier, E> {
    self.visit_f64(v as f64)
  }

  fn visit_i64<E: de::Error>(self, v: i64) -> Result<Multiplier, E> {
    self.visit_f64(v as f64)
  }

  fn visit_f64<E: de::Error>(self, v: f64) -> Result<Multiplier, E> {
    Multiplier::from_f64(v)
      .ok_or_else(|| de::Error::invalid_value(de::Unexpected::Float(v), &self))
  }
}

impl<'de> Deserialize<'de> for Multiplier {
  fn deserialize<D>(d: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    d.deserialize_any(MultiplierVisitor)
  }
}

/// A [`TypeChart`] loading error.
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum ChartError {
  #[error(transparent)]
  Io(#[from] io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error("unknown type {0:?} in type chart")]
  UnknownType(String),

  #[error("{attacking} against {defending} is {value:?}, which is not a chart multiplier")]
  NotAChartValue {
    attacking: TypeName,
    defending: TypeName,
    value: Multiplier,
  },
}

/// The damage multiplier of every attacking type against every defending type.
///
/// A chart is total: every one of the 18x18 pairs has exactly one multiplier.
/// Charts are built once and then only read; a [`Resolver`] borrows one, so
/// alternate charts (e.g. for a game variant) can be substituted freely.
///
/// [`Resolver`]: crate::effectiveness::Resolver
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeChart {
  // Indexed as `cells[attacking][defending]`.
  cells: [[Multiplier; TypeName::COUNT]; TypeName::COUNT],
}

impl TypeChart {
  /// Returns a chart where every pair is neutral.
  pub fn neutral() -> Self {
    Self {
      cells: [[Multiplier::NEUTRAL; TypeName::COUNT]; TypeName::COUNT],
    }
  }

  /// Returns the canonical eighteen-type chart.
  pub fn standard() -> Self {
    let mut chart = Self::neutral();
    for &(attacking, strong, weak, none) in STANDARD {
      let row = &mut chart.cells[attacking.index()];
      for defending in strong {
        row[defending.index()] = Multiplier::DOUBLE;
      }
      for defending in weak {
        row[defending.index()] = Multiplier::HALF;
      }
      for defending in none {
        row[defending.index()] = Multiplier::IMMUNE;
      }
    }
    chart
  }

  /// Returns a process-wide copy of [`TypeChart::standard()`], built on first
  /// use.
  pub fn shared() -> &'static Self {
    static CHART: OnceLock<TypeChart> = OnceLock::new();
    CHART.get_or_init(Self::standard)
  }

  /// Returns this chart with the multiplier for one pair replaced.
  ///
  /// Fails if `value` is not one of 0, 1/4, 1/2, 1, 2 or 4.
  pub fn with(
    mut self,
    attacking: TypeName,
    defending: TypeName,
    value: Multiplier,
  ) -> Result<Self, ChartError> {
    if !value.is_chart_value() {
      return Err(ChartError::NotAChartValue {
        attacking,
        defending,
        value,
      });
    }
    self.cells[attacking.index()][defending.index()] = value;
    Ok(self)
  }

  /// Returns the multiplier `attacking` deals to `defending`.
  #[inline]
  pub fn get(&self, attacking: TypeName, defending: TypeName) -> Multiplier {
    self.cells[attacking.index()][defending.index()]
  }

  /// Returns every defending type along with the multiplier `attacking`
  /// deals to it.
  pub fn row(
    &self,
    attacking: TypeName,
  ) -> impl Iterator<Item = (TypeName, Multiplier)> + '_ {
    let row = &self.cells[attacking.index()];
    TypeName::ALL.iter().map(move |&ty| (ty, row[ty.index()]))
  }

  /// Parses a chart from JSON.
  ///
  /// The JSON is an object keyed by attacking type, whose values are objects
  /// keyed by defending type. Pairs which are absent are neutral.
  pub fn from_json(json: &str) -> Result<Self, ChartError> {
    let raw: RawChart = serde_json::from_str(json)?;
    Self::try_from(raw)
  }

  /// Loads a chart from a JSON file; see [`TypeChart::from_json()`].
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ChartError> {
    Self::from_json(&fs::read_to_string(path)?)
  }
}

impl Default for TypeChart {
  fn default() -> Self {
    Self::standard()
  }
}

impl fmt::Debug for TypeChart {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    let mut map = f.debug_map();
    for &attacking in TypeName::ALL {
      let row = self
        .row(attacking)
        .filter(|&(_, m)| m != Multiplier::NEUTRAL)
        .collect::<BTreeMap<_, _>>();
      map.entry(&attacking, &row);
    }
    map.finish()
  }
}

/// The on-disk form of a [`TypeChart`]; only non-neutral pairs are stored.
#[derive(Default, Serialize, Deserialize)]
#[serde(transparent)]
struct RawChart(BTreeMap<String, BTreeMap<String, Multiplier>>);

impl TryFrom<RawChart> for TypeChart {
  type Error = ChartError;

  fn try_from(raw: RawChart) -> Result<Self, ChartError> {
    let parse = |name: &str| {
      name
        .parse::<TypeName>()
        .map_err(|_| ChartError::UnknownType(name.to_string()))
    };

    let mut chart = Self::neutral();
    for (attacking, row) in &raw.0 {
      let attacking = parse(attacking.as_str())?;
      for (defending, &value) in row {
        chart = chart.with(attacking, parse(defending.as_str())?, value)?;
      }
    }
    Ok(chart)
  }
}

impl From<&TypeChart> for RawChart {
  fn from(chart: &TypeChart) -> Self {
    let mut raw = RawChart::default();
    for &attacking in TypeName::ALL {
      for (defending, value) in chart.row(attacking) {
        if value != Multiplier::NEUTRAL {
          raw
            .0
            .entry(attacking.name().to_string())
            .or_default()
            .insert(defending.name().to_string(), value);
        }
      }
    }
    raw
  }
}

impl Serialize for TypeChart {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    RawChart::from(self).serialize(s)
  }
}

impl<'de> Deserialize<'de> for TypeChart {
  fn deserialize<D>(d: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = RawChart::deserialize(d)?;
    Self::try_from(raw).map_err(de::Error::custom)
  }
}

/// Non-neutral relations of the canonical chart, as
/// `(attacking, super effective against, not very effective against, no
/// effect against)`.
#[rustfmt::skip]
const STANDARD: &[(TypeName, &[TypeName], &[TypeName], &[TypeName])] = {
  use crate::model::TypeName::*;
  &[
    (Normal, &[], &[Rock, Steel], &[Ghost]),
    (Fire, &[Grass, Ice, Bug, Steel], &[Fire, Water, Rock, Dragon], &[]),
    (Water, &[Fire, Ground, Rock], &[Water, Grass, Dragon], &[]),
    (Electric, &[Water, Flying], &[Electric, Grass, Dragon], &[Ground]),
    (Grass, &[Water, Ground, Rock], &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel], &[]),
    (Ice, &[Grass, Ground, Flying, Dragon], &[Fire, Water, Ice, Steel], &[]),
    (Fighting, &[Normal, Ice, Rock, Dark, Steel], &[Poison, Flying, Psychic, Bug, Fairy], &[Ghost]),
    (Poison, &[Grass, Fairy], &[Poison, Ground, Rock, Ghost], &[Steel]),
    (Ground, &[Fire, Electric, Poison, Rock, Steel], &[Grass, Bug], &[Flying]),
    (Flying, &[Grass, Fighting, Bug], &[Electric, Rock, Steel], &[]),
    (Psychic, &[Fighting, Poison], &[Psychic, Steel], &[Dark]),
    (Bug, &[Grass, Psychic, Dark], &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy], &[]),
    (Rock, &[Fire, Ice, Flying, Bug], &[Fighting, Ground, Steel], &[]),
    (Ghost, &[Psychic, Ghost], &[Dark], &[Normal]),
    (Dragon, &[Dragon], &[Steel], &[Fairy]),
    (Dark, &[Psychic, Ghost], &[Fighting, Dark, Fairy], &[]),
    (Steel, &[Ice, Rock, Fairy], &[Fire, Water, Electric, Steel], &[]),
    (Fairy, &[Fighting, Dragon, Dark], &[Fire, Poison, Steel], &[]),
  ]
};
