//! # Literal Nested-Table Form
//!
//! Renders a [`StaticDataset`] as an uncompressed `ns.StaticData` Lua table.
//! The first line records the content hash of the tables it was built from.

use crate::compile::StaticDataset;
use crate::freshness::ContentHash;
use crate::types::DifficultyId;

/// Escape a display string for a double-quoted Lua literal.
#[must_use]
pub fn lua_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

fn bool_literal(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// `{id = .., name = "..", order = ..}`
fn entry(id: i64, name: &str, order: i64) -> String {
    format!(
        "{{id = {id}, name = \"{}\", order = {order}}}",
        lua_escape(name)
    )
}

/// Render the full static data file.
#[must_use]
pub fn render_static_lua(dataset: &StaticDataset, hash: &ContentHash) -> String {
    let mut lines = vec![
        hash.sentinel_line(),
        "-- Generated by lootdata static - DO NOT EDIT".to_string(),
        String::new(),
        "local _, ns = ...".to_string(),
        String::new(),
        "ns.StaticData = {".to_string(),
    ];

    lines.push("    tiers = {".to_string());
    for tier in &dataset.tiers {
        lines.push(format!(
            "        {{name = \"{}\", journalTierID = {}}},",
            lua_escape(&tier.name),
            tier.id
        ));
    }
    lines.push("    },".to_string());

    lines.push("    instances = {".to_string());
    for (id, instance) in &dataset.instances {
        let flags = format!(
            "isRaid = {}, shouldDisplayDifficulty = {}",
            bool_literal(instance.kind.is_raid()),
            bool_literal(instance.display_difficulty)
        );
        lines.push(format!(
            "        [{id}] = {{name = \"{}\", tierID = {}, {flags}, mapID = {}}},",
            lua_escape(&instance.name),
            instance.tier_id,
            instance.map_id
        ));
    }
    lines.push("    },".to_string());

    // Tier-list order; links to tiers outside the list are not emitted.
    lines.push("    tierInstances = {".to_string());
    for tier in &dataset.tiers {
        let Some(group) = dataset.tier_instances.get(&tier.id) else {
            continue;
        };
        lines.push(format!("        [{}] = {{", tier.id));
        for (label, list) in [("raid", &group.raid), ("dungeon", &group.dungeon)] {
            lines.push(format!("            {label} = {{"));
            for item in list {
                lines.push(format!(
                    "                {},",
                    entry(item.id.value(), &item.name, item.order)
                ));
            }
            lines.push("            },".to_string());
        }
        lines.push("        },".to_string());
    }
    lines.push("    },".to_string());

    lines.push("    instanceDifficulties = {".to_string());
    for (instance, ids) in dataset.instance_difficulties.iter() {
        let entries: Vec<String> = ids
            .iter()
            .filter_map(|id| difficulty_entry(dataset, *id))
            .collect();
        if entries.is_empty() {
            continue;
        }
        lines.push(format!(
            "        [{instance}] = {{{}}},",
            entries.join(", ")
        ));
    }
    lines.push("    },".to_string());

    lines.push("    encounters = {".to_string());
    for (instance, encounters) in &dataset.encounters {
        let entries: Vec<String> = encounters
            .iter()
            .map(|e| entry(e.id.value(), &e.name, e.order))
            .collect();
        lines.push(format!(
            "        [{instance}] = {{{}}},",
            entries.join(", ")
        ));
    }
    lines.push("    },".to_string());

    lines.push("    difficulties = {".to_string());
    for (id, record) in &dataset.difficulties {
        lines.push(format!(
            "        [{id}] = {{name = \"{}\", order = {}}},",
            lua_escape(&record.name),
            record.order
        ));
    }
    lines.push("    },".to_string());

    lines.push("}".to_string());
    lines.push(String::new());
    lines.join("\n")
}

fn difficulty_entry(dataset: &StaticDataset, id: DifficultyId) -> Option<String> {
    dataset
        .difficulties
        .get(&id)
        .map(|record| entry(id.value(), &record.name, record.order))
}

// =============================================================================
// TESTS
// =============================================================================
