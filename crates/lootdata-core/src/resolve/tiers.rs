//! # Tier Resolution
//!
//! Canonical tier list and the (instance -> effective tier) mapping.

use crate::CompileError;
use crate::policy::TierPolicy;
use crate::primitives::{TABLE_TIER, TABLE_TIER_X_INSTANCE};
use crate::rows::RowStore;
use crate::types::{InstanceId, Tier, TierId};
use std::collections::{BTreeMap, BTreeSet};

/// Non-excluded tiers with an id and a name, newest expansion first.
///
/// The sort is stable: tiers of the same expansion keep source order.
pub fn resolve_tiers(store: &RowStore, policy: &TierPolicy) -> Result<Vec<Tier>, CompileError> {
    let mut tiers = Vec::new();
    for row in store.table(TABLE_TIER)?.rows() {
        let (Some(id), Some(name)) = (row.opt_i64("ID")?, row.text("Name_lang")) else {
            continue;
        };
        let id = TierId(id);
        if policy.is_excluded(id) {
            continue;
        }
        tiers.push(Tier {
            id,
            name: name.to_string(),
            expansion: row.i64_or("Expansion", 0)?,
        });
    }

    tiers.sort_by(|a, b| b.expansion.cmp(&a.expansion));
    Ok(tiers)
}

// =============================================================================
// TIER LINKS
// =============================================================================

/// One row of the tier <-> instance junction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLink {
    pub tier_id: TierId,
    pub instance_id: InstanceId,
    pub order: i64,
}

/// Junction rows in source order, excluded tiers already removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierLinks {
    links: Vec<TierLink>,
}

impl TierLinks {
    pub fn resolve(store: &RowStore, policy: &TierPolicy) -> Result<Self, CompileError> {
        let mut links = Vec::new();
        for row in store.table(TABLE_TIER_X_INSTANCE)?.rows() {
            let (Some(tier), Some(instance)) = (
                row.opt_i64("JournalTierID")?,
                row.opt_i64("JournalInstanceID")?,
            ) else {
                continue;
            };
            let tier_id = TierId(tier);
            if policy.is_excluded(tier_id) {
                continue;
            }
            links.push(TierLink {
                tier_id,
                instance_id: InstanceId(instance),
                order: row.i64_or("OrderIndex", 0)?,
            });
        }
        Ok(Self { links })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TierLink> {
        self.links.iter()
    }

    /// Every tier each instance is linked from.
    #[must_use]
    pub fn candidates(&self) -> BTreeMap<InstanceId, BTreeSet<TierId>> {
        let mut out: BTreeMap<InstanceId, BTreeSet<TierId>> = BTreeMap::new();
        for link in &self.links {
            out.entry(link.instance_id)
                .or_default()
                .insert(link.tier_id);
        }
        out
    }

    /// `OrderIndex` of the first link of each instance in source order.
    #[must_use]
    pub fn first_orders(&self) -> BTreeMap<InstanceId, i64> {
        let mut out = BTreeMap::new();
        for link in &self.links {
            out.entry(link.instance_id).or_insert(link.order);
        }
        out
    }

    /// The effective tier of every linked instance.
    #[must_use]
    pub fn effective_tiers(&self, policy: &TierPolicy) -> BTreeMap<InstanceId, TierId> {
        self.candidates()
            .into_iter()
            .filter_map(|(instance, tiers)| {
                effective_tier(&tiers, policy).map(|tier| (instance, tier))
            })
            .collect()
    }
}

/// Pick one tier among the tiers an instance is linked from.
///
/// The numerically highest non-season tier wins; this approximates "most
/// recent expansion" and is not a chronological guarantee. The season
/// sentinel is used only when it is the sole candidate.
#[must_use]
pub fn effective_tier(candidates: &BTreeSet<TierId>, policy: &TierPolicy) -> Option<TierId> {
    candidates
        .iter()
        .rev()
        .copied()
        .find(|tier| *tier != policy.current_season)
        .or_else(|| {
            candidates
                .contains(&policy.current_season)
                .then_some(policy.current_season)
        })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::Table;

    fn store(tables: &[(&str, &str)]) -> RowStore {
        let mut store = RowStore::new();
        for (name, text) in tables {
            store.insert(Table::from_csv(name, text).expect("csv"));
        }
        store
    }

    fn set(ids: &[i64]) -> BTreeSet<TierId> {
        ids.iter().copied().map(TierId).collect()
    }

    #[test]
    fn tiers_sorted_newest_first_and_skip_unnamed() {
        let store = store(&[(
            TABLE_TIER,
            "ID,Name_lang,Expansion\n68,Classic,0\n396,Dragonflight,9\n72,,1\n505,Current Season,10\n",
        )]);

        let tiers = resolve_tiers(&store, &TierPolicy::default()).expect("tiers");
        let ids: Vec<_> = tiers.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TierId(505), TierId(396), TierId(68)]);
    }

    #[test]
    fn excluded_tiers_are_dropped() {
        let store = store(&[(TABLE_TIER, "ID,Name_lang,Expansion\n1,A,0\n2,B,1\n")]);
        let policy = TierPolicy {
            excluded: set(&[2]),
            ..TierPolicy::default()
        };

        let tiers = resolve_tiers(&store, &policy).expect("tiers");
        assert_eq!(tiers.len(), 1);
        assert_eq!(tiers[0].id, TierId(1));
    }

    #[test]
    fn effective_tier_prefers_highest_non_season() {
        let policy = TierPolicy::default();
        assert_eq!(
            effective_tier(&set(&[505, 396, 499]), &policy),
            Some(TierId(499))
        );
    }

    #[test]
    fn effective_tier_falls_back_to_season() {
        let policy = TierPolicy::default();
        assert_eq!(effective_tier(&set(&[505]), &policy), Some(TierId(505)));
        assert_eq!(effective_tier(&set(&[]), &policy), None);
    }

    #[test]
    fn first_order_comes_from_first_link() {
        let store = store(&[(
            TABLE_TIER_X_INSTANCE,
            "JournalTierID,JournalInstanceID,OrderIndex\n505,1267,4\n499,1267,2\n",
        )]);

        let links = TierLinks::resolve(&store, &TierPolicy::default()).expect("links");
        assert_eq!(links.first_orders().get(&InstanceId(1267)), Some(&4));
        let effective = links.effective_tiers(&TierPolicy::default());
        assert_eq!(effective.get(&InstanceId(1267)), Some(&TierId(499)));
    }
}
