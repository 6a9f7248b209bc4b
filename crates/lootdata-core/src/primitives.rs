//! # Innate Primitives
//!
//! Hardcoded constants of the upstream journal data model.
//!
//! These values are part of the contract with the data provider and are
//! compiled into the binary. Everything that is a *choice* rather than a
//! fact of the data model (sort ranks, default sets, exclusions) lives in
//! [`crate::policy`] instead, so it can be injected and overridden.

// =============================================================================
// TABLE NAMES
// =============================================================================

pub const TABLE_TIER: &str = "JournalTier";
pub const TABLE_INSTANCE: &str = "JournalInstance";
pub const TABLE_TIER_X_INSTANCE: &str = "JournalTierXInstance";
pub const TABLE_ENCOUNTER: &str = "JournalEncounter";
pub const TABLE_ENCOUNTER_ITEM: &str = "JournalEncounterItem";
pub const TABLE_ITEM_X_DIFFICULTY: &str = "JournalItemXDifficulty";
pub const TABLE_DIFFICULTY: &str = "Difficulty";
pub const TABLE_MAP: &str = "Map";
pub const TABLE_MAP_DIFFICULTY: &str = "MapDifficulty";

/// Tables consumed by the compressed loot target, in fetch and hash order.
pub const LOOT_TABLES: &[&str] = &[
    TABLE_TIER,
    TABLE_INSTANCE,
    TABLE_TIER_X_INSTANCE,
    TABLE_ENCOUNTER,
    TABLE_ENCOUNTER_ITEM,
    TABLE_ITEM_X_DIFFICULTY,
    TABLE_DIFFICULTY,
    TABLE_MAP,
];

/// Tables consumed by the static literal target, in fetch and hash order.
pub const STATIC_TABLES: &[&str] = &[
    TABLE_TIER,
    TABLE_TIER_X_INSTANCE,
    TABLE_INSTANCE,
    TABLE_ENCOUNTER,
    TABLE_MAP,
    TABLE_MAP_DIFFICULTY,
    TABLE_DIFFICULTY,
];

// =============================================================================
// DATA MODEL CONSTANTS
// =============================================================================

/// Map `InstanceType` of a dungeon.
pub const MAP_TYPE_DUNGEON: i64 = 1;

/// Map `InstanceType` of a raid.
pub const MAP_TYPE_RAID: i64 = 2;

/// `JournalInstance.Flags` bit that hides the difficulty selector.
pub const FLAG_HIDE_DIFFICULTY: i64 = 0x2;

/// `JournalEncounterItem.DifficultyMask` value meaning "every difficulty".
pub const DIFFICULTY_MASK_ALL: i64 = -1;

/// The "Current Season" journal tier.
pub const CURRENT_SEASON_TIER: i64 = 505;

/// Sort rank offset for difficulties missing from the priority table.
pub const UNRANKED_OFFSET: i64 = 100;
