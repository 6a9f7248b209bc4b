//! # lootdata-core
//!
//! The deterministic static data compiler for lootdata - THE LOGIC.
//!
//! Turns raw encounter journal tables into resolved entities (tiers,
//! instances, encounters, loot, difficulties) and renders them in the two
//! forms the client loads:
//! - a compressed blob (`ns.CompressedData`), see [`emit::blob`]
//! - a literal nested table (`ns.StaticData`), see [`emit::literal`]
//!
//! ## Pipeline
//!
//! ```text
//! RawTables -> RowStore -> resolve::* -> compile::{LootDataset, StaticDataset} -> emit::*
//!     \-> freshness::ContentHash -> GateDecision
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O: callers fetch and write
//! - BTreeMap/BTreeSet only, no floats: identical input gives identical bytes
//! - Every lookup table is [`Policy`] data passed into the resolvers

// =============================================================================
// MODULES
// =============================================================================

pub mod compile;
pub mod emit;
pub mod freshness;
pub mod policy;
pub mod primitives;
pub mod resolve;
pub mod rows;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CompileError, DifficultyId, DifficultyInfo, DifficultyKind, DifficultyRecord, DifficultyRow,
    Encounter, EncounterId, EncounterItem, EncounterItemId, GearTrack, Instance, InstanceId,
    InstanceKind, ItemId, MapId, Tier, TierId,
};

// =============================================================================
// RE-EXPORTS: Rows & Policy
// =============================================================================

pub use policy::{DifficultyPolicy, Policy, TierPolicy};
pub use rows::{RawTables, Row, RowStore, Table};

// =============================================================================
// RE-EXPORTS: Compilation
// =============================================================================

pub use compile::{LootDataset, StaticDataset, Target, compile_loot, compile_static};
pub use resolve::{DifficultyScheme, InstanceDifficulties, LootMaskScheme, MapDifficultyScheme};

// =============================================================================
// RE-EXPORTS: Emitters & Gate
// =============================================================================

pub use emit::{CompressedBundle, lua_escape, render_static_lua};
pub use freshness::{ContentHash, Freshness, GateDecision, RunMode, stored_hash};
