//! Structs describing the companion backend's data model.

pub mod creature;
pub mod event;
pub mod game;
pub mod report;
pub mod stats;
pub mod ty;

pub use creature::Creature;
pub use creature::CreatureDetail;
pub use creature::Invalid;
pub use creature::NewCreature;
pub use event::Event;
pub use event::EventFlags;
pub use event::NewEvent;
pub use event::Status;
pub use game::Game;
pub use game::NewGame;
pub use game::NewPlayer;
pub use game::Player;
pub use game::PlayerGame;
pub use report::CaptureSummary;
pub use report::PlayerStats;
pub use stats::BaseStats;
pub use stats::StatName;
pub use ty::TypeName;
