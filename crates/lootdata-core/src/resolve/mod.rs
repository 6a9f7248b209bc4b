//! # Entity Resolvers
//!
//! Pure functions from the [`RowStore`](crate::rows::RowStore) to resolved
//! entities. Dependency order matters: encounters must be resolved before
//! the loot difficulty scheme, which looks up each item's instance through
//! its encounter.

pub mod difficulty;
pub mod encounters;
pub mod instances;
pub mod tiers;

pub use difficulty::{
    DifficultyScheme, InstanceDifficulties, LootMaskScheme, MapDifficultyScheme, loot_difficulties,
    resolve_difficulty_rows, resolve_map_difficulties, selectable_difficulties,
};
pub use encounters::{
    Encounters, encounter_loot, resolve_encounter_items, resolve_item_difficulties,
};
pub use instances::{resolve_instances, resolve_map_types};
pub use tiers::{TierLink, TierLinks, effective_tier, resolve_tiers};
