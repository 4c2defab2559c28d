//! Utility modules shared by the integrity pipeline.

pub mod html;
mod plural;

pub use plural::plural_count;
