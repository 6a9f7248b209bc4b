//! # Core Type Definitions
//!
//! This module contains all core types for the lootdata static data compiler:
//! - Journal identifiers (`TierId`, `InstanceId`, `EncounterId`, ...)
//! - Resolved entities (`Tier`, `Instance`, `Encounter`, `EncounterItem`)
//! - Difficulty descriptors (`DifficultyRow`, `DifficultyInfo`, `DifficultyRecord`)
//! - Error types (`CompileError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer fields only (no floating-point)
//! - Implement `Ord` where they are used as `BTreeMap`/`BTreeSet` keys
//! - Serialize identifiers transparently as plain integers

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// JOURNAL IDENTIFIERS
// =============================================================================

macro_rules! journal_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw identifier value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

journal_id!(
    /// Identifier of a journal tier (an expansion, or the rotating season).
    TierId
);
journal_id!(
    /// Identifier of a dungeon or raid.
    InstanceId
);
journal_id!(
    /// Identifier of a boss encounter.
    EncounterId
);
journal_id!(
    /// Identifier of an encounter loot row. Distinct from [`ItemId`]: the same
    /// item can drop from several rows.
    EncounterItemId
);
journal_id!(
    /// Identifier of a game item.
    ItemId
);
journal_id!(
    /// Identifier of a difficulty level.
    DifficultyId
);
journal_id!(
    /// Identifier of a world map.
    MapId
);

// =============================================================================
// INSTANCE KIND
// =============================================================================

/// Dungeon or raid, derived from the map's `InstanceType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    Dungeon,
    Raid,
}

impl InstanceKind {
    /// Classify a map `InstanceType`. Only `2` is a raid; anything else,
    /// including an unknown map, is a dungeon.
    #[must_use]
    pub fn from_map_type(instance_type: Option<i64>) -> Self {
        match instance_type {
            Some(crate::primitives::MAP_TYPE_RAID) => Self::Raid,
            _ => Self::Dungeon,
        }
    }

    #[must_use]
    pub fn is_raid(self) -> bool {
        matches!(self, Self::Raid)
    }
}

// =============================================================================
// RESOLVED ENTITIES
// =============================================================================

/// A content era grouping of instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub id: TierId,
    pub name: String,
    /// Expansion rank; higher is newer.
    pub expansion: i64,
}

/// A dungeon or raid after tier resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub name: String,
    /// The single effective tier chosen among all linked tiers.
    pub tier_id: TierId,
    pub kind: InstanceKind,
    /// False when the journal suppresses the difficulty selector.
    pub display_difficulty: bool,
    pub map_id: MapId,
    /// `OrderIndex` of the first tier link seen in source order.
    pub order: i64,
}

/// A boss encounter within an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: EncounterId,
    pub name: String,
    pub instance_id: InstanceId,
    pub order: i64,
}

/// A droppable item row as it appears in the encounter item table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterItem {
    /// Row identifier; rows without one cannot be joined to the
    /// item/difficulty junction table.
    pub id: Option<EncounterItemId>,
    pub encounter_id: EncounterId,
    pub item_id: Option<ItemId>,
    /// Raw difficulty mask (`-1` = all difficulties, `0` = see junction table).
    pub difficulty_mask: i64,
}

// =============================================================================
// DIFFICULTIES
// =============================================================================

/// A raw `Difficulty` table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyRow {
    pub id: DifficultyId,
    pub name: Option<String>,
    pub instance_type: Option<i64>,
    pub order: i64,
}

/// Which kind of instance a difficulty applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyKind {
    Dungeon,
    Raid,
}

impl DifficultyKind {
    /// Best-effort guess for difficulties missing from the known catalog.
    #[must_use]
    pub fn guess_from_name(name: &str) -> Self {
        if name.contains("Raid") || name.contains("Player") || name.contains("LFR") {
            Self::Raid
        } else {
            Self::Dungeon
        }
    }
}

/// Upgrade track of the gear a difficulty rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearTrack {
    Adventurer,
    Veteran,
    Champion,
    Hero,
    Myth,
}

/// Difficulty entry of the compressed loot dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DifficultyKind,
    pub track: GearTrack,
}

impl DifficultyInfo {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DifficultyKind, track: GearTrack) -> Self {
        Self {
            name: name.into(),
            kind,
            track,
        }
    }
}

/// Difficulty entry of the static literal dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyRecord {
    pub id: DifficultyId,
    pub name: String,
    /// Journal display order from the `Difficulty` table.
    pub order: i64,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while compiling static data.
///
/// - Rows missing an id or name are skipped, not reported
/// - A present but non-numeric numeric field is always an error
/// - The compiler never panics; all errors propagate to the caller
#[derive(Debug, Error)]
pub enum CompileError {
    /// A numeric column held a value that is not an integer.
    #[error("Parse error in {table}.{column} (row {row}): {value:?} is not an integer")]
    Parse {
        table: String,
        column: String,
        row: usize,
        value: String,
    },

    /// A table required by the target was not fetched.
    #[error("Missing table: {0}")]
    MissingTable(String),

    /// The CSV payload of a table could not be read.
    #[error("CSV error in {table}: {message}")]
    Csv { table: String, message: String },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Compressing or decompressing a payload failed.
    #[error("Compression error: {0}")]
    Compression(String),

    /// Fetching a table from the upstream provider failed.
    #[error("Fetch of {table} failed: {message}")]
    Fetch { table: String, message: String },

    /// The configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================
