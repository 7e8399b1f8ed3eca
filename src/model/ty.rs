//! Pokemon types, which describe how different Pokemon are strong against
//! others in battle.

use std::fmt;
use std::str::FromStr;

use serde::de;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::Deserialize;
use serde::Serialize;

use crate::effectiveness::Error;

/// An RGB color used when displaying types and effectiveness bands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
  /// Creates a color out of a `0xRRGGBB` literal.
  pub const fn from_hex(hex: u32) -> Self {
    Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
  }
}

#[doc(hidden)]
macro_rules! type_names {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $($(#[$vmeta:meta])* $variant:ident => $color:literal,)*
    }
  ) => {
    $(#[$meta])*
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub enum $name {
      $($(#[$vmeta])* $variant,)*
    }

    impl $name {
      /// Every type, in chart order.
      pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

      /// The number of types.
      pub const COUNT: usize = Self::ALL.len();

      /// Returns this type's canonical name, which is also its wire form.
      pub fn name(self) -> &'static str {
        match self {
          $(Self::$variant => stringify!($variant),)*
        }
      }

      /// Returns the color this type is displayed with.
      pub fn color(self) -> Rgb {
        match self {
          $(Self::$variant => Rgb::from_hex($color),)*
        }
      }
    }
  };
}

type_names! {
  /// One of the eighteen elemental types.
  ///
  /// The declaration order is the order of rows and columns in a
  /// [`TypeChart`](crate::chart::TypeChart).
  #[allow(missing_docs)]
  pub enum TypeName {
    Normal => 0xA8A878,
    Fire => 0xF08030,
    Water => 0x6890F0,
    Electric => 0xF8D030,
    Grass => 0x78C850,
    Ice => 0x98D8D8,
    Fighting => 0xC03028,
    Poison => 0xA040A0,
    Ground => 0xE0C068,
    Flying => 0xA890F0,
    Psychic => 0xF85888,
    Bug => 0xA8B820,
    Rock => 0xB8A038,
    Ghost => 0x705898,
    Dragon => 0x6F35FC,
    Dark => 0x705848,
    Steel => 0xB8B8D0,
    Fairy => 0xF7A5D4,
  }
}

impl TypeName {
  /// Returns the position of this type in [`TypeName::ALL`].
  #[inline]
  pub fn index(self) -> usize {
    self as usize
  }

  /// Returns the three-letter, upper-case abbreviation used in compact
  /// displays, e.g. `FIR` for Fire.
  pub fn abbreviation(self) -> String {
    self.name()[..3].to_ascii_uppercase()
  }

  /// Parses an optional second type.
  ///
  /// The backend stores an unset second type either as `null` or as an empty
  /// string; both mean "no second type".
  pub fn parse_optional(s: Option<&str>) -> Result<Option<Self>, Error> {
    match s.map(str::trim) {
      None | Some("") => Ok(None),
      Some(s) => s.parse().map(Some),
    }
  }
}

impl fmt::Display for TypeName {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for TypeName {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    let trimmed = s.trim();
    Self::ALL
      .iter()
      .copied()
      .find(|ty| ty.name().eq_ignore_ascii_case(trimmed))
      .ok_or_else(|| Error::InvalidType(s.to_string()))
  }
}

impl Serialize for TypeName {
  fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(self.name())
  }
}

impl<'de> Deserialize<'de> for TypeName {
  fn deserialize<D>(d: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let name = String::deserialize(d)?;
    name.parse().map_err(de::Error::custom)
  }
}

/// Deserializes an optional second type, treating a blank string like `null`.
pub(crate) fn deserialize_optional<'de, D>(
  d: D,
) -> Result<Option<TypeName>, D::Error>
where
  D: Deserializer<'de>,
{
  let name = Option::<String>::deserialize(d)?;
  TypeName::parse_optional(name.as_deref()).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
  use super::*;

  use assert_matches::assert_matches;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[test]
  fn eighteen_types() {
    assert_eq!(TypeName::COUNT, 18);
    for (i, ty) in TypeName::ALL.iter().enumerate() {
      assert_eq!(ty.index(), i);
    }
  }

  #[rstest]
  #[case("Fire", TypeName::Fire)]
  #[case("fire", TypeName::Fire)]
  #[case("  FAIRY ", TypeName::Fairy)]
  #[case("psychic", TypeName::Psychic)]
  fn parses_case_insensitively(#[case] input: &str, #[case] ty: TypeName) {
    assert_eq!(input.parse::<TypeName>().unwrap(), ty);
  }

  #[rstest]
  #[case("")]
  #[case("Shadow")]
  #[case("Fire/Water")]
  fn rejects_unknown_names(#[case] input: &str) {
    assert_matches!(
      input.parse::<TypeName>(),
      Err(Error::InvalidType(s)) if s == input
    );
  }

  #[test]
  fn optional_second_type() {
    assert_eq!(TypeName::parse_optional(None).unwrap(), None);
    assert_eq!(TypeName::parse_optional(Some("")).unwrap(), None);
    assert_eq!(TypeName::parse_optional(Some("   ")).unwrap(), None);
    assert_eq!(
      TypeName::parse_optional(Some("Steel")).unwrap(),
      Some(TypeName::Steel)
    );
    assert!(TypeName::parse_optional(Some("Sound")).is_err());
  }

  #[test]
  fn abbreviations_and_colors() {
    assert_eq!(TypeName::Fire.abbreviation(), "FIR");
    assert_eq!(TypeName::Psychic.abbreviation(), "PSY");
    assert_eq!(TypeName::Water.color().to_string(), "#6890F0");
    assert_eq!(TypeName::Dragon.color(), Rgb(0x6F, 0x35, 0xFC));
  }

  #[test]
  fn wire_form() {
    let json = serde_json::to_string(&TypeName::Electric).unwrap();
    assert_eq!(json, "\"Electric\"");
    let ty: TypeName = serde_json::from_str("\"ground\"").unwrap();
    assert_eq!(ty, TypeName::Ground);
    assert!(serde_json::from_str::<TypeName>("\"Light\"").is_err());
  }
}
