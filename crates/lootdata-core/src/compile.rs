//! # Compilation Pipelines
//!
//! One pipeline per output target. Each is a pure function from a
//! [`RowStore`] and a [`Policy`] to a fully resolved dataset:
//!
//! ```text
//! RowStore -> tiers/links -> instances -> encounters -> difficulties -> dataset
//! ```
//!
//! No entity is ever resolved from emitter output.

use crate::CompileError;
use crate::policy::Policy;
use crate::primitives::{LOOT_TABLES, STATIC_TABLES};
use crate::resolve::{
    DifficultyScheme, Encounters, InstanceDifficulties, LootMaskScheme, MapDifficultyScheme,
    TierLinks, encounter_loot, loot_difficulties, resolve_difficulty_rows, resolve_encounter_items,
    resolve_instances, resolve_item_difficulties, resolve_map_difficulties, resolve_map_types,
    resolve_tiers, selectable_difficulties,
};
use crate::rows::RowStore;
use crate::types::{
    DifficultyId, DifficultyInfo, DifficultyRecord, EncounterId, Instance, InstanceId, ItemId,
    Tier, TierId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// TARGET
// =============================================================================

/// An output target and the tables it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Literal nested-table form with a hash sentinel.
    Static,
    /// Compressed blob form.
    Loot,
}

impl Target {
    /// Tables to fetch, in fetch and hash order.
    #[must_use]
    pub fn tables(self) -> &'static [&'static str] {
        match self {
            Target::Static => STATIC_TABLES,
            Target::Loot => LOOT_TABLES,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Target::Static => "static",
            Target::Loot => "loot",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// LOOT DATASET
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    pub name: String,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub name: String,
    #[serde(rename = "tierID")]
    pub tier_id: TierId,
    #[serde(rename = "isRaid")]
    pub is_raid: bool,
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub name: String,
    #[serde(rename = "instanceID")]
    pub instance_id: InstanceId,
    pub order: i64,
}

/// Everything the compressed blob carries, one field per named collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LootDataset {
    pub tiers: BTreeMap<TierId, TierSummary>,
    pub instances: BTreeMap<InstanceId, InstanceSummary>,
    pub encounters: BTreeMap<EncounterId, EncounterSummary>,
    pub encounter_loot: BTreeMap<EncounterId, Vec<ItemId>>,
    pub difficulties: BTreeMap<DifficultyId, DifficultyInfo>,
    pub instance_difficulties: InstanceDifficulties,
}

/// Resolve the loot target.
pub fn compile_loot(store: &RowStore, policy: &Policy) -> Result<LootDataset, CompileError> {
    let encounters = Encounters::resolve(store)?;

    let tiers = resolve_tiers(store, &policy.tiers)?
        .into_iter()
        .map(|tier| {
            (
                tier.id,
                TierSummary {
                    name: tier.name,
                    // Tier ids grow with release order.
                    order: tier.id.value(),
                },
            )
        })
        .collect();

    let links = TierLinks::resolve(store, &policy.tiers)?;
    let map_types = resolve_map_types(store)?;
    let instances = resolve_instances(store, &links, &map_types, &policy.tiers)?;

    let items = resolve_encounter_items(store)?;
    let item_difficulties = resolve_item_difficulties(store)?;
    let encounters_by_id = encounters.by_id();
    let instance_difficulties = LootMaskScheme {
        items: &items,
        item_difficulties: &item_difficulties,
        encounters: &encounters_by_id,
        instances: &instances,
    }
    .resolve(&policy.difficulties);

    let difficulty_rows = resolve_difficulty_rows(store)?;

    Ok(LootDataset {
        tiers,
        instances: instances
            .values()
            .map(|instance| {
                (
                    instance.id,
                    InstanceSummary {
                        name: instance.name.clone(),
                        tier_id: instance.tier_id,
                        is_raid: instance.kind.is_raid(),
                        order: instance.order,
                    },
                )
            })
            .collect(),
        encounters: encounters_by_id
            .values()
            .map(|encounter| {
                (
                    encounter.id,
                    EncounterSummary {
                        name: encounter.name.clone(),
                        instance_id: encounter.instance_id,
                        order: encounter.order,
                    },
                )
            })
            .collect(),
        encounter_loot: encounter_loot(&items),
        difficulties: loot_difficulties(&difficulty_rows, &policy.difficulties),
        instance_difficulties,
    })
}

// =============================================================================
// STATIC DATASET
// =============================================================================

/// An instance listed under one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierInstanceEntry {
    pub id: InstanceId,
    pub name: String,
    pub order: i64,
}

/// The instances a tier links to, split by kind, each sorted by order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierInstances {
    pub raid: Vec<TierInstanceEntry>,
    pub dungeon: Vec<TierInstanceEntry>,
}

/// An encounter listed under its instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncounterEntry {
    pub id: EncounterId,
    pub name: String,
    pub order: i64,
}

/// Everything the literal form carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDataset {
    /// Newest expansion first.
    pub tiers: Vec<Tier>,
    pub instances: BTreeMap<InstanceId, Instance>,
    /// Every tier link, not only the effective tier.
    pub tier_instances: BTreeMap<TierId, TierInstances>,
    pub instance_difficulties: InstanceDifficulties,
    pub encounters: BTreeMap<InstanceId, Vec<EncounterEntry>>,
    pub difficulties: BTreeMap<DifficultyId, DifficultyRecord>,
}

/// Resolve the static target.
pub fn compile_static(store: &RowStore, policy: &Policy) -> Result<StaticDataset, CompileError> {
    let tiers = resolve_tiers(store, &policy.tiers)?;
    let links = TierLinks::resolve(store, &policy.tiers)?;
    let map_types = resolve_map_types(store)?;
    let instances = resolve_instances(store, &links, &map_types, &policy.tiers)?;
    let encounters = Encounters::resolve(store)?;

    let difficulty_rows = resolve_difficulty_rows(store)?;
    let difficulties = selectable_difficulties(&difficulty_rows, &policy.difficulties);
    let map_difficulties = resolve_map_difficulties(store)?;
    let instance_difficulties = MapDifficultyScheme {
        map_difficulties: &map_difficulties,
        instances: &instances,
        selectable: &difficulties,
    }
    .resolve(&policy.difficulties);

    let mut tier_instances: BTreeMap<TierId, TierInstances> = BTreeMap::new();
    for link in links.iter() {
        let Some(instance) = instances.get(&link.instance_id) else {
            continue;
        };
        let group = tier_instances.entry(link.tier_id).or_default();
        let list = if instance.kind.is_raid() {
            &mut group.raid
        } else {
            &mut group.dungeon
        };
        list.push(TierInstanceEntry {
            id: instance.id,
            name: instance.name.clone(),
            order: link.order,
        });
    }
    for group in tier_instances.values_mut() {
        group.raid.sort_by_key(|entry| entry.order);
        group.dungeon.sort_by_key(|entry| entry.order);
    }

    let encounters = encounters
        .by_instance()
        .into_iter()
        .map(|(instance, group)| {
            let entries = group
                .into_iter()
                .map(|encounter| EncounterEntry {
                    id: encounter.id,
                    name: encounter.name.clone(),
                    order: encounter.order,
                })
                .collect();
            (instance, entries)
        })
        .collect();

    Ok(StaticDataset {
        tiers,
        instances,
        tier_instances,
        instance_difficulties,
        encounters,
        difficulties,
    })
}

// =============================================================================
// TESTS
// =============================================================================
