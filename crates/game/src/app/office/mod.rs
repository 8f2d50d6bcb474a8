//! Office floor simulation: roles, characters, selection and the scene that
//! drives them.

mod bubble;
mod character;
mod config;
mod desk;
mod profile;
mod rng;
mod roster;
mod scene;
mod selection;
mod simulation;

pub(crate) use config::SimConfig;
pub(crate) use roster::{default_roster, load_roster_file, Roster, RosterLoadError};
pub(crate) use scene::OfficeScene;
pub(crate) use simulation::Simulation;
