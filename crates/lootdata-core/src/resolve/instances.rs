//! # Instance Resolution
//!
//! Journal instances joined with their map type and effective tier.

use super::tiers::TierLinks;
use crate::CompileError;
use crate::policy::TierPolicy;
use crate::primitives::{FLAG_HIDE_DIFFICULTY, TABLE_INSTANCE, TABLE_MAP};
use crate::rows::RowStore;
use crate::types::{Instance, InstanceId, InstanceKind, MapId};
use std::collections::BTreeMap;

/// Map id -> `InstanceType`.
pub fn resolve_map_types(store: &RowStore) -> Result<BTreeMap<MapId, i64>, CompileError> {
    let mut out = BTreeMap::new();
    for row in store.table(TABLE_MAP)?.rows() {
        if let (Some(id), Some(kind)) = (row.opt_i64("ID")?, row.opt_i64("InstanceType")?) {
            out.insert(MapId(id), kind);
        }
    }
    Ok(out)
}

/// Resolve every instance that has an id, a name, and at least one
/// non-excluded tier link. Instances without a tier are dropped so that each
/// resolved instance carries exactly one tier.
pub fn resolve_instances(
    store: &RowStore,
    links: &TierLinks,
    map_types: &BTreeMap<MapId, i64>,
    policy: &TierPolicy,
) -> Result<BTreeMap<InstanceId, Instance>, CompileError> {
    let tiers = links.effective_tiers(policy);
    let orders = links.first_orders();

    let mut out = BTreeMap::new();
    for row in store.table(TABLE_INSTANCE)?.rows() {
        let (Some(id), Some(name)) = (row.opt_i64("ID")?, row.text("Name_lang")) else {
            continue;
        };
        let id = InstanceId(id);
        let Some(&tier_id) = tiers.get(&id) else {
            continue;
        };

        let map_id = MapId(row.i64_or("MapID", 0)?);
        let flags = row.i64_or("Flags", 0)?;

        out.insert(
            id,
            Instance {
                id,
                name: name.to_string(),
                tier_id,
                kind: InstanceKind::from_map_type(map_types.get(&map_id).copied()),
                display_difficulty: flags & FLAG_HIDE_DIFFICULTY == 0,
                map_id,
                order: orders.get(&id).copied().unwrap_or(0),
            },
        );
    }
    Ok(out)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::TABLE_TIER_X_INSTANCE;
    use crate::rows::Table;
    use crate::types::TierId;

    fn fixture() -> RowStore {
        let mut store = RowStore::new();
        for (name, text) in [
            (
                TABLE_INSTANCE,
                "ID,Name_lang,MapID,Flags\n1267,Priory,2649,0\n1273,Nerub-ar Palace,2657,0\n322,Pandaria,870,2\n9,Orphan,1,0\n",
            ),
            (
                TABLE_TIER_X_INSTANCE,
                "JournalTierID,JournalInstanceID,OrderIndex\n499,1267,3\n505,1267,0\n499,1273,1\n72,322,0\n",
            ),
            (TABLE_MAP, "ID,InstanceType\n2649,1\n2657,2\n870,0\n"),
        ] {
            store.insert(Table::from_csv(name, text).expect("csv"));
        }
        store
    }

    fn resolve(store: &RowStore) -> BTreeMap<InstanceId, Instance> {
        let policy = TierPolicy::default();
        let links = TierLinks::resolve(store, &policy).expect("links");
        let maps = resolve_map_types(store).expect("maps");
        resolve_instances(store, &links, &maps, &policy).expect("instances")
    }

    #[test]
    fn classifies_raid_by_map_type() {
        let instances = resolve(&fixture());
        assert!(instances[&InstanceId(1273)].kind.is_raid());
        assert!(!instances[&InstanceId(1267)].kind.is_raid());
    }

    #[test]
    fn picks_effective_tier_and_first_order() {
        let instances = resolve(&fixture());
        let priory = &instances[&InstanceId(1267)];
        assert_eq!(priory.tier_id, TierId(499));
        assert_eq!(priory.order, 3);
    }

    #[test]
    fn hide_flag_suppresses_difficulty_display() {
        let instances = resolve(&fixture());
        assert!(!instances[&InstanceId(322)].display_difficulty);
        assert!(instances[&InstanceId(1267)].display_difficulty);
    }

    #[test]
    fn untiered_instances_are_dropped() {
        let instances = resolve(&fixture());
        assert!(!instances.contains_key(&InstanceId(9)));
        assert_eq!(instances.len(), 3);
    }
}
