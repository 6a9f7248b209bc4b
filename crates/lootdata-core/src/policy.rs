//! # Ordering & Filtering Policy
//!
//! Static lookup tables that decide canonical order and exclusion:
//! - Difficulty priority ranks (journal dropdown order)
//! - Default difficulty sets per instance kind
//! - Excluded pseudo-difficulties and tiers
//! - The known difficulty catalog of the loot dataset
//!
//! A [`Policy`] is plain data passed into every resolver. `Policy::default()`
//! carries the built-in tables; callers may override parts of it.

use crate::primitives::{CURRENT_SEASON_TIER, MAP_TYPE_DUNGEON, MAP_TYPE_RAID, UNRANKED_OFFSET};
use crate::types::{
    DifficultyId, DifficultyInfo, DifficultyKind, DifficultyRow, GearTrack, InstanceKind, TierId,
};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// BUILT-IN TABLES
// =============================================================================

/// `(difficulty, rank)` in journal dropdown order.
const PRIORITY: &[(i64, i64)] = &[
    // Dungeons: Normal, Heroic, Mythic, Mythic Keystone
    (1, 1),
    (2, 2),
    (23, 3),
    (8, 4),
    // Raids: LFR, Normal, Heroic, Mythic
    (17, 10),
    (14, 11),
    (15, 12),
    (16, 13),
    // Legacy player-count variants
    (3, 20),
    (4, 21),
    (5, 22),
    (6, 23),
    (7, 24),
    (9, 25),
    // Timewalking
    (24, 30),
    (33, 31),
];

const RAID_DEFAULTS: &[i64] = &[17, 14, 15, 16];

const DUNGEON_DEFAULTS: &[i64] = &[1, 2, 23, 8];

/// Event (18, 19, 20, 232), Follower (205), Quest (216), Story (220),
/// Lorewalking (236, 241).
const EXCLUDED_DIFFICULTIES: &[i64] = &[18, 19, 20, 232, 205, 216, 220, 236, 241];

/// Mythic Keystone is not selectable in the journal dropdown.
const JOURNAL_HIDDEN_DIFFICULTIES: &[i64] = &[8];

fn known_catalog() -> BTreeMap<DifficultyId, DifficultyInfo> {
    use DifficultyKind::{Dungeon, Raid};
    use GearTrack::{Adventurer, Champion, Hero, Myth, Veteran};

    [
        (1, "Normal", Dungeon, Adventurer),
        (2, "Heroic", Dungeon, Champion),
        (23, "Mythic", Dungeon, Champion),
        (8, "Mythic Keystone", Dungeon, Hero),
        (17, "LFR", Raid, Veteran),
        (14, "Normal", Raid, Champion),
        (15, "Heroic", Raid, Hero),
        (16, "Mythic", Raid, Myth),
        (3, "10 Player", Raid, Champion),
        (4, "25 Player", Raid, Champion),
        (5, "10 Player (Heroic)", Raid, Hero),
        (6, "25 Player (Heroic)", Raid, Hero),
        (7, "Legacy LFR", Raid, Veteran),
        (9, "40 Player", Raid, Champion),
        (24, "Timewalking", Dungeon, Adventurer),
        (33, "Timewalking", Raid, Champion),
    ]
    .into_iter()
    .map(|(id, name, kind, track)| (DifficultyId(id), DifficultyInfo::new(name, kind, track)))
    .collect()
}

fn ids<T: Ord>(raw: &[i64], wrap: fn(i64) -> T) -> BTreeSet<T> {
    raw.iter().copied().map(wrap).collect()
}

// =============================================================================
// TIER POLICY
// =============================================================================

/// Tier exclusion and the rotating-season sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    /// Tier that stands for "currently active rotating content". Used as an
    /// instance's tier only when it is the sole linked tier.
    pub current_season: TierId,
    /// Tiers dropped from every output.
    pub excluded: BTreeSet<TierId>,
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            current_season: TierId(CURRENT_SEASON_TIER),
            excluded: BTreeSet::new(),
        }
    }
}

impl TierPolicy {
    #[must_use]
    pub fn is_excluded(&self, tier: TierId) -> bool {
        self.excluded.contains(&tier)
    }
}

// =============================================================================
// DIFFICULTY POLICY
// =============================================================================

/// Ranking, defaults and filters for difficulties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifficultyPolicy {
    pub priority: BTreeMap<DifficultyId, i64>,
    pub unranked_offset: i64,
    pub raid_defaults: Vec<DifficultyId>,
    pub dungeon_defaults: Vec<DifficultyId>,
    /// Pseudo-difficulties never emitted by any target.
    pub excluded: BTreeSet<DifficultyId>,
    /// Additionally dropped by the map/difficulty scheme.
    pub journal_hidden: BTreeSet<DifficultyId>,
    /// Difficulty `InstanceType`s accepted by the map/difficulty scheme.
    pub valid_instance_types: BTreeSet<i64>,
    pub known: BTreeMap<DifficultyId, DifficultyInfo>,
}

impl Default for DifficultyPolicy {
    fn default() -> Self {
        Self {
            priority: PRIORITY
                .iter()
                .map(|&(id, rank)| (DifficultyId(id), rank))
                .collect(),
            unranked_offset: UNRANKED_OFFSET,
            raid_defaults: RAID_DEFAULTS.iter().copied().map(DifficultyId).collect(),
            dungeon_defaults: DUNGEON_DEFAULTS.iter().copied().map(DifficultyId).collect(),
            excluded: ids(EXCLUDED_DIFFICULTIES, DifficultyId),
            journal_hidden: ids(JOURNAL_HIDDEN_DIFFICULTIES, DifficultyId),
            valid_instance_types: [MAP_TYPE_DUNGEON, MAP_TYPE_RAID].into_iter().collect(),
            known: known_catalog(),
        }
    }
}

impl DifficultyPolicy {
    /// Sort rank of a difficulty. Unranked ids sort after every ranked one.
    #[must_use]
    pub fn rank(&self, id: DifficultyId) -> i64 {
        self.priority
            .get(&id)
            .copied()
            .unwrap_or_else(|| self.unranked_offset.saturating_add(id.value()))
    }

    /// Total sort key: rank first, id breaks ties.
    #[must_use]
    pub fn sort_key(&self, id: DifficultyId) -> (i64, i64) {
        (self.rank(id), id.value())
    }

    /// Order a set of difficulties for display.
    #[must_use]
    pub fn sorted(&self, ids: impl IntoIterator<Item = DifficultyId>) -> Vec<DifficultyId> {
        let mut out: Vec<_> = ids.into_iter().collect();
        out.sort_by_key(|id| self.sort_key(*id));
        out.dedup();
        out
    }

    /// Default set applied to mask-less loot of the given instance kind.
    #[must_use]
    pub fn defaults_for(&self, kind: InstanceKind) -> &[DifficultyId] {
        match kind {
            InstanceKind::Raid => &self.raid_defaults,
            InstanceKind::Dungeon => &self.dungeon_defaults,
        }
    }

    #[must_use]
    pub fn is_excluded(&self, id: DifficultyId) -> bool {
        self.excluded.contains(&id)
    }

    /// Whether a `Difficulty` row may appear in the journal dropdown.
    #[must_use]
    pub fn is_journal_selectable(&self, id: DifficultyId, instance_type: i64) -> bool {
        !self.is_excluded(id)
            && !self.journal_hidden.contains(&id)
            && self.valid_instance_types.contains(&instance_type)
    }

    /// Loot dataset entry for a difficulty row: the known catalog entry, or a
    /// guess from the row name. `None` when unknown and unnamed.
    #[must_use]
    pub fn describe(&self, row: &DifficultyRow) -> Option<DifficultyInfo> {
        if let Some(info) = self.known.get(&row.id) {
            return Some(info.clone());
        }
        let name = row.name.as_deref()?;
        Some(DifficultyInfo::new(
            name,
            DifficultyKind::guess_from_name(name),
            GearTrack::Champion,
        ))
    }
}

// =============================================================================
// POLICY
// =============================================================================

/// Everything the resolvers need besides the rows themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    pub tiers: TierPolicy,
    pub difficulties: DifficultyPolicy,
}

// =============================================================================
// TESTS
// =============================================================================
