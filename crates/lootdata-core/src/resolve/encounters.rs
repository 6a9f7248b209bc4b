//! # Encounter & Loot Resolution
//!
//! - Encounters keep source order; grouped views sort by `OrderIndex`
//! - Loot lists keep source order and duplicates; item ids <= 0 are dropped

use crate::CompileError;
use crate::primitives::{TABLE_ENCOUNTER, TABLE_ENCOUNTER_ITEM, TABLE_ITEM_X_DIFFICULTY};
use crate::rows::RowStore;
use crate::types::{
    DifficultyId, Encounter, EncounterId, EncounterItem, EncounterItemId, InstanceId, ItemId,
};
use std::collections::{BTreeMap, BTreeSet};

/// Resolved encounters in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encounters {
    rows: Vec<Encounter>,
}

impl Encounters {
    /// Resolve every encounter with an id, a name and a parent instance.
    pub fn resolve(store: &RowStore) -> Result<Self, CompileError> {
        let mut rows = Vec::new();
        for row in store.table(TABLE_ENCOUNTER)?.rows() {
            let (Some(id), Some(name), Some(instance)) = (
                row.opt_i64("ID")?,
                row.text("Name_lang"),
                row.opt_i64("JournalInstanceID")?,
            ) else {
                continue;
            };
            rows.push(Encounter {
                id: EncounterId(id),
                name: name.to_string(),
                instance_id: InstanceId(instance),
                order: row.i64_or("OrderIndex", 0)?,
            });
        }
        Ok(Self { rows })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Encounters keyed by id. A repeated id keeps its last row.
    #[must_use]
    pub fn by_id(&self) -> BTreeMap<EncounterId, &Encounter> {
        self.rows.iter().map(|e| (e.id, e)).collect()
    }

    /// Encounters grouped by parent instance, each group sorted by order.
    #[must_use]
    pub fn by_instance(&self) -> BTreeMap<InstanceId, Vec<&Encounter>> {
        let mut out: BTreeMap<InstanceId, Vec<&Encounter>> = BTreeMap::new();
        for encounter in &self.rows {
            out.entry(encounter.instance_id)
                .or_default()
                .push(encounter);
        }
        for group in out.values_mut() {
            group.sort_by_key(|e| e.order);
        }
        out
    }
}

/// Every encounter item row that names its encounter.
pub fn resolve_encounter_items(store: &RowStore) -> Result<Vec<EncounterItem>, CompileError> {
    let mut out = Vec::new();
    for row in store.table(TABLE_ENCOUNTER_ITEM)?.rows() {
        let Some(encounter) = row.opt_i64("JournalEncounterID")? else {
            continue;
        };
        out.push(EncounterItem {
            id: row.opt_i64("ID")?.map(EncounterItemId),
            encounter_id: EncounterId(encounter),
            item_id: row.opt_i64("ItemID")?.map(ItemId),
            difficulty_mask: row.i64_or("DifficultyMask", 0)?,
        });
    }
    Ok(out)
}

/// Encounter -> droppable item ids, in source order, duplicates kept.
#[must_use]
pub fn encounter_loot(items: &[EncounterItem]) -> BTreeMap<EncounterId, Vec<ItemId>> {
    let mut out: BTreeMap<EncounterId, Vec<ItemId>> = BTreeMap::new();
    for item in items {
        if let Some(item_id) = item.item_id.filter(|id| id.value() > 0) {
            out.entry(item.encounter_id).or_default().push(item_id);
        }
    }
    out
}

/// Encounter item -> explicit difficulties from the junction table.
pub fn resolve_item_difficulties(
    store: &RowStore,
) -> Result<BTreeMap<EncounterItemId, BTreeSet<DifficultyId>>, CompileError> {
    let mut out: BTreeMap<EncounterItemId, BTreeSet<DifficultyId>> = BTreeMap::new();
    for row in store.table(TABLE_ITEM_X_DIFFICULTY)?.rows() {
        if let (Some(item), Some(difficulty)) = (
            row.opt_i64("JournalEncounterItemID")?,
            row.opt_i64("DifficultyID")?,
        ) {
            out.entry(EncounterItemId(item))
                .or_default()
                .insert(DifficultyId(difficulty));
        }
    }
    Ok(out)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::Table;

    fn store(name: &str, text: &str) -> RowStore {
        let mut store = RowStore::new();
        store.insert(Table::from_csv(name, text).expect("csv"));
        store
    }

    #[test]
    fn encounters_group_and_sort_by_order() {
        let store = store(
            TABLE_ENCOUNTER,
            "ID,Name_lang,JournalInstanceID,OrderIndex\n3,Third,10,2\n1,First,10,0\n2,Second,10,1\n9,Other,11,0\n8,,10,5\n",
        );

        let encounters = Encounters::resolve(&store).expect("encounters");
        assert_eq!(encounters.len(), 4);

        let grouped = encounters.by_instance();
        let names: Vec<_> = grouped[&InstanceId(10)].iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
        assert_eq!(grouped[&InstanceId(11)].len(), 1);
    }

    #[test]
    fn loot_keeps_order_and_duplicates_but_drops_invalid_items() {
        let store = store(
            TABLE_ENCOUNTER_ITEM,
            "ID,ItemID,JournalEncounterID,DifficultyMask\n1,500,7,-1\n2,0,7,0\n3,300,7,0\n4,500,7,0\n5,-4,7,0\n6,42,,0\n",
        );

        let items = resolve_encounter_items(&store).expect("items");
        assert_eq!(items.len(), 5);

        let loot = encounter_loot(&items);
        assert_eq!(
            loot[&EncounterId(7)],
            vec![ItemId(500), ItemId(300), ItemId(500)]
        );
        assert_eq!(loot.len(), 1);
    }

    #[test]
    fn item_difficulties_collect_per_item() {
        let store = store(
            TABLE_ITEM_X_DIFFICULTY,
            "ID,JournalEncounterItemID,DifficultyID\n1,40,3\n2,40,5\n3,41,3\n4,40,3\n",
        );

        let junction = resolve_item_difficulties(&store).expect("junction");
        let expected: BTreeSet<_> = [DifficultyId(3), DifficultyId(5)].into_iter().collect();
        assert_eq!(junction[&EncounterItemId(40)], expected);
        assert_eq!(junction[&EncounterItemId(41)].len(), 1);
    }
}
