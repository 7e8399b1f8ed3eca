//! Fixtures shared by unit tests.

use std::sync::Arc;

use catchdex::api::Options;
use catchdex::api::Session;
use catchdex::model::BaseStats;
use catchdex::model::Creature;
use catchdex::Api;
use catchdex::TypeName;

/// A client that is logged out and points at a port nothing listens on.
pub fn offline_api() -> Arc<Api> {
  Arc::new(Api::with_options(Options {
    session: Session::in_memory(),
    ..Options::new("http://127.0.0.1:9")
  }))
}

pub fn squirtle() -> Creature {
  Creature {
    id: 7,
    national_dex: 7,
    name: "Squirtle".into(),
    form: None,
    type1: TypeName::Water,
    type2: None,
    stats: BaseStats {
      hp: 44,
      attack: 48,
      defense: 65,
      special_attack: 50,
      special_defense: 64,
      speed: 43,
    },
    total: 314,
    generation: 1,
    image: Some("squirtle".into()),
    shiny_image: Some("squirtle_shiny".into()),
  }
}
