//! # Difficulty Resolution
//!
//! Computes, for every instance, the difficulties a player can select.
//!
//! The upstream data models this twice, in two eras that do not agree on
//! shape, so there are two schemes behind one output type:
//!
//! | Scheme | Source tables | Used by |
//! |--------|---------------|---------|
//! | [`LootMaskScheme`] | encounter items, item <-> difficulty junction | loot target |
//! | [`MapDifficultyScheme`] | map <-> difficulty junction, `Difficulty` | static target |
//!
//! Both produce [`InstanceDifficulties`]: excluded pseudo-difficulties
//! removed, empty sets dropped, each list ordered by the priority table.

use crate::CompileError;
use crate::policy::DifficultyPolicy;
use crate::primitives::{DIFFICULTY_MASK_ALL, TABLE_DIFFICULTY, TABLE_MAP_DIFFICULTY};
use crate::rows::RowStore;
use crate::types::{
    DifficultyId, DifficultyInfo, DifficultyRecord, DifficultyRow, Encounter, EncounterId,
    EncounterItem, EncounterItemId, Instance, InstanceId, MapId,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// OUTPUT TYPE
// =============================================================================

/// Instance -> ordered selectable difficulties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceDifficulties(BTreeMap<InstanceId, Vec<DifficultyId>>);

impl InstanceDifficulties {
    /// Filter, drop empty sets and order each list.
    #[must_use]
    pub fn from_sets(
        sets: BTreeMap<InstanceId, BTreeSet<DifficultyId>>,
        policy: &DifficultyPolicy,
    ) -> Self {
        Self(
            sets.into_iter()
                .filter_map(|(instance, set)| {
                    let kept = set.into_iter().filter(|id| !policy.is_excluded(*id));
                    let sorted = policy.sorted(kept);
                    (!sorted.is_empty()).then_some((instance, sorted))
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn get(&self, instance: InstanceId) -> Option<&[DifficultyId]> {
        self.0.get(&instance).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &[DifficultyId])> {
        self.0.iter().map(|(id, list)| (*id, list.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A way of deriving per-instance difficulty sets from upstream rows.
pub trait DifficultyScheme {
    /// Raw, unordered contributions per instance.
    fn collect(&self, policy: &DifficultyPolicy) -> BTreeMap<InstanceId, BTreeSet<DifficultyId>>;

    /// Resolve to the common ordered output.
    fn resolve(&self, policy: &DifficultyPolicy) -> InstanceDifficulties {
        InstanceDifficulties::from_sets(self.collect(policy), policy)
    }
}

// =============================================================================
// SCHEME A: LOOT MASK + ITEM JUNCTION
// =============================================================================

/// Difficulties derived from each loot row's mask and explicit junction rows.
///
/// Per encounter item:
/// - mask `-1`, or mask `0` with no junction rows: the instance kind's
///   default set
/// - otherwise, if junction rows exist: exactly those
/// - otherwise: nothing
///
/// Contributions of every item of every encounter are unioned per instance.
#[derive(Debug, Clone, Copy)]
pub struct LootMaskScheme<'a> {
    pub items: &'a [EncounterItem],
    pub item_difficulties: &'a BTreeMap<EncounterItemId, BTreeSet<DifficultyId>>,
    pub encounters: &'a BTreeMap<EncounterId, &'a Encounter>,
    pub instances: &'a BTreeMap<InstanceId, Instance>,
}

impl DifficultyScheme for LootMaskScheme<'_> {
    fn collect(&self, policy: &DifficultyPolicy) -> BTreeMap<InstanceId, BTreeSet<DifficultyId>> {
        let empty = BTreeSet::new();

        // A repeated item row id keeps its last row.
        let items: BTreeMap<EncounterItemId, &EncounterItem> = self
            .items
            .iter()
            .filter_map(|item| item.id.map(|id| (id, item)))
            .collect();

        let mut out: BTreeMap<InstanceId, BTreeSet<DifficultyId>> = BTreeMap::new();
        for (item_id, item) in items {
            let Some(encounter) = self.encounters.get(&item.encounter_id) else {
                continue;
            };
            let instance_id = encounter.instance_id;
            let explicit = self.item_difficulties.get(&item_id).unwrap_or(&empty);
            let mask = item.difficulty_mask;

            if mask == DIFFICULTY_MASK_ALL || (mask == 0 && explicit.is_empty()) {
                if let Some(instance) = self.instances.get(&instance_id) {
                    out.entry(instance_id)
                        .or_default()
                        .extend(policy.defaults_for(instance.kind).iter().copied());
                }
            } else if !explicit.is_empty() {
                out.entry(instance_id)
                    .or_default()
                    .extend(explicit.iter().copied());
            }
        }
        out
    }
}

// =============================================================================
// SCHEME B: MAP <-> DIFFICULTY TABLE
// =============================================================================

/// Difficulties an instance's map declares, restricted to journal-selectable
/// difficulties.
#[derive(Debug, Clone, Copy)]
pub struct MapDifficultyScheme<'a> {
    pub map_difficulties: &'a [(MapId, DifficultyId)],
    pub instances: &'a BTreeMap<InstanceId, Instance>,
    pub selectable: &'a BTreeMap<DifficultyId, DifficultyRecord>,
}

impl DifficultyScheme for MapDifficultyScheme<'_> {
    fn collect(&self, _policy: &DifficultyPolicy) -> BTreeMap<InstanceId, BTreeSet<DifficultyId>> {
        let mut by_map: BTreeMap<MapId, BTreeSet<DifficultyId>> = BTreeMap::new();
        for &(map, difficulty) in self.map_difficulties {
            if self.selectable.contains_key(&difficulty) {
                by_map.entry(map).or_default().insert(difficulty);
            }
        }

        self.instances
            .values()
            .filter_map(|instance| {
                by_map
                    .get(&instance.map_id)
                    .map(|set| (instance.id, set.clone()))
            })
            .collect()
    }
}

/// All `(map, difficulty)` rows of the map junction table.
pub fn resolve_map_difficulties(
    store: &RowStore,
) -> Result<Vec<(MapId, DifficultyId)>, CompileError> {
    let mut out = Vec::new();
    for row in store.table(TABLE_MAP_DIFFICULTY)?.rows() {
        if let (Some(map), Some(id)) = (row.opt_i64("MapID")?, row.opt_i64("DifficultyID")?) {
            out.push((MapId(map), DifficultyId(id)));
        }
    }
    Ok(out)
}

// =============================================================================
// DIFFICULTY CATALOGS
// =============================================================================

/// Every `Difficulty` row with an id.
pub fn resolve_difficulty_rows(store: &RowStore) -> Result<Vec<DifficultyRow>, CompileError> {
    let mut out = Vec::new();
    for row in store.table(TABLE_DIFFICULTY)?.rows() {
        let Some(id) = row.opt_i64("ID")? else {
            continue;
        };
        out.push(DifficultyRow {
            id: DifficultyId(id),
            name: row.text("Name_lang").map(str::to_string),
            instance_type: row.opt_i64("InstanceType")?,
            order: row.i64_or("OrderIndex", 0)?,
        });
    }
    Ok(out)
}

/// Loot dataset catalog: every non-excluded difficulty the catalog knows or
/// can describe from its name.
#[must_use]
pub fn loot_difficulties(
    rows: &[DifficultyRow],
    policy: &DifficultyPolicy,
) -> BTreeMap<DifficultyId, DifficultyInfo> {
    rows.iter()
        .filter(|row| !policy.is_excluded(row.id))
        .filter_map(|row| policy.describe(row).map(|info| (row.id, info)))
        .collect()
}

/// Static dataset catalog: named dungeon/raid difficulties selectable in the
/// journal.
#[must_use]
pub fn selectable_difficulties(
    rows: &[DifficultyRow],
    policy: &DifficultyPolicy,
) -> BTreeMap<DifficultyId, DifficultyRecord> {
    rows.iter()
        .filter_map(|row| {
            let name = row.name.as_ref()?;
            if !policy.is_journal_selectable(row.id, row.instance_type?) {
                return None;
            }
            let record = DifficultyRecord {
                id: row.id,
                name: name.clone(),
                order: row.order,
            };
            Some((row.id, record))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InstanceKind, TierId};

    fn d(id: i64) -> DifficultyId {
        DifficultyId(id)
    }

    fn instance(id: i64, kind: InstanceKind, map: i64) -> Instance {
        Instance {
            id: InstanceId(id),
            name: format!("Instance {id}"),
            tier_id: TierId(499),
            kind,
            display_difficulty: true,
            map_id: MapId(map),
            order: 0,
        }
    }

    fn encounter(id: i64, instance: i64) -> Encounter {
        Encounter {
            id: EncounterId(id),
            name: format!("Boss {id}"),
            instance_id: InstanceId(instance),
            order: 0,
        }
    }

    fn item(id: i64, encounter: i64, mask: i64) -> EncounterItem {
        EncounterItem {
            id: Some(EncounterItemId(id)),
            encounter_id: EncounterId(encounter),
            item_id: Some(crate::types::ItemId(1000 + id)),
            difficulty_mask: mask,
        }
    }

    struct LootFixture {
        items: Vec<EncounterItem>,
        junction: BTreeMap<EncounterItemId, BTreeSet<DifficultyId>>,
        encounters: Vec<Encounter>,
        instances: BTreeMap<InstanceId, Instance>,
    }

    impl LootFixture {
        fn resolve(&self) -> InstanceDifficulties {
            let encounters = self.encounters.iter().map(|e| (e.id, e)).collect();
            LootMaskScheme {
                items: &self.items,
                item_difficulties: &self.junction,
                encounters: &encounters,
                instances: &self.instances,
            }
            .resolve(&DifficultyPolicy::default())
        }
    }

    fn set(ids: &[i64]) -> BTreeSet<DifficultyId> {
        ids.iter().copied().map(d).collect()
    }

    fn raid_fixture(items: Vec<EncounterItem>, junction: &[(i64, &[i64])]) -> LootFixture {
        LootFixture {
            items,
            junction: junction
                .iter()
                .map(|(item, ids)| (EncounterItemId(*item), set(ids)))
                .collect(),
            encounters: vec![encounter(1, 100)],
            instances: [(InstanceId(100), instance(100, InstanceKind::Raid, 1))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn mask_all_applies_raid_defaults() {
        let fixture = raid_fixture(vec![item(1, 1, -1)], &[]);
        assert_eq!(
            fixture.resolve().get(InstanceId(100)),
            Some(&[d(17), d(14), d(15), d(16)][..])
        );
    }

    #[test]
    fn mask_all_ignores_junction_rows() {
        let fixture = raid_fixture(vec![item(1, 1, -1)], &[(1, &[3])]);
        assert_eq!(
            fixture.resolve().get(InstanceId(100)),
            Some(&[d(17), d(14), d(15), d(16)][..])
        );
    }

    #[test]
    fn zero_mask_without_junction_applies_dungeon_defaults() {
        let mut fixture = raid_fixture(vec![item(1, 1, 0)], &[]);
        fixture.instances = [(InstanceId(100), instance(100, InstanceKind::Dungeon, 1))]
            .into_iter()
            .collect();
        assert_eq!(
            fixture.resolve().get(InstanceId(100)),
            Some(&[d(1), d(2), d(23), d(8)][..])
        );
    }

    #[test]
    fn explicit_entries_replace_defaults() {
        let fixture = raid_fixture(vec![item(1, 1, 0)], &[(1, &[5, 3])]);
        assert_eq!(
            fixture.resolve().get(InstanceId(100)),
            Some(&[d(3), d(5)][..])
        );
    }

    #[test]
    fn positive_mask_without_junction_contributes_nothing() {
        let fixture = raid_fixture(vec![item(1, 1, 4)], &[]);
        assert!(fixture.resolve().is_empty());
    }

    #[test]
    fn contributions_union_across_items() {
        let fixture = raid_fixture(
            vec![item(1, 1, 0), item(2, 1, 0)],
            &[(1, &[3]), (2, &[4, 3])],
        );
        assert_eq!(
            fixture.resolve().get(InstanceId(100)),
            Some(&[d(3), d(4)][..])
        );
    }

    #[test]
    fn explicit_event_difficulty_is_excluded() {
        let fixture = raid_fixture(vec![item(1, 1, 0)], &[(1, &[18, 14])]);
        assert_eq!(fixture.resolve().get(InstanceId(100)), Some(&[d(14)][..]));
    }

    #[test]
    fn defaults_need_a_resolved_instance() {
        let mut fixture = raid_fixture(vec![item(1, 1, -1)], &[]);
        fixture.instances.clear();
        assert!(fixture.resolve().is_empty());
    }

    #[test]
    fn map_scheme_uses_selectable_difficulties_only() {
        let rows = vec![
            DifficultyRow {
                id: d(14),
                name: Some("Normal".into()),
                instance_type: Some(2),
                order: 1,
            },
            DifficultyRow {
                id: d(16),
                name: Some("Mythic".into()),
                instance_type: Some(2),
                order: 3,
            },
            DifficultyRow {
                id: d(18),
                name: Some("Event".into()),
                instance_type: Some(2),
                order: 0,
            },
            DifficultyRow {
                id: d(12),
                name: Some("Normal Scenario".into()),
                instance_type: Some(3),
                order: 0,
            },
        ];
        let policy = DifficultyPolicy::default();
        let selectable = selectable_difficulties(&rows, &policy);
        assert_eq!(selectable.len(), 2);
        let mythic = DifficultyRecord {
            id: d(16),
            name: "Mythic".to_string(),
            order: 3,
        };
        assert_eq!(selectable.get(&d(16)), Some(&mythic));

        let instances = [(InstanceId(100), instance(100, InstanceKind::Raid, 2657))]
            .into_iter()
            .collect();
        let pairs = vec![
            (MapId(2657), d(16)),
            (MapId(2657), d(18)),
            (MapId(2657), d(14)),
            (MapId(2657), d(12)),
            (MapId(1), d(14)),
        ];

        let resolved = MapDifficultyScheme {
            map_difficulties: &pairs,
            instances: &instances,
            selectable: &selectable,
        }
        .resolve(&policy);

        assert_eq!(resolved.get(InstanceId(100)), Some(&[d(14), d(16)][..]));
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn loot_catalog_skips_excluded_and_unnamed() {
        let rows = vec![
            DifficultyRow {
                id: d(16),
                name: None,
                instance_type: None,
                order: 0,
            },
            DifficultyRow {
                id: d(19),
                name: Some("Event".into()),
                instance_type: None,
                order: 0,
            },
            DifficultyRow {
                id: d(150),
                name: None,
                instance_type: None,
                order: 0,
            },
            DifficultyRow {
                id: d(208),
                name: Some("Delves".into()),
                instance_type: None,
                order: 0,
            },
        ];

        let catalog = loot_difficulties(&rows, &DifficultyPolicy::default());
        let ids: Vec<_> = catalog.keys().copied().collect();
        assert_eq!(ids, vec![d(16), d(208)]);
        assert_eq!(catalog[&d(16)].name, "Mythic");
    }
}
