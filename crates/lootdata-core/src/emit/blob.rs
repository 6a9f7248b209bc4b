//! # Compressed Blob Form
//!
//! Each named collection is encoded as:
//!
//! ```text
//! minified JSON -> raw DEFLATE (no zlib header/trailer, level 9) -> base64
//! ```
//!
//! The client inflates headerless streams only, so the zlib and gzip
//! wrappers must never be used here.

use crate::CompileError;
use crate::compile::LootDataset;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

pub const KEY_TIERS: &str = "Tiers";
pub const KEY_INSTANCES: &str = "Instances";
pub const KEY_ENCOUNTERS: &str = "Encounters";
pub const KEY_ENCOUNTER_LOOT: &str = "EncounterLoot";
pub const KEY_DIFFICULTIES: &str = "Difficulties";
pub const KEY_INSTANCE_DIFFICULTIES: &str = "InstanceDifficulties";

// =============================================================================
// SINGLE COLLECTION
// =============================================================================

/// One encoded collection and its size before compression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCollection {
    pub key: &'static str,
    pub json_bytes: usize,
    pub encoded: String,
}

/// Encode one collection.
pub fn encode_collection<T: Serialize + ?Sized>(
    key: &'static str,
    value: &T,
) -> Result<EncodedCollection, CompileError> {
    let json =
        serde_json::to_vec(value).map_err(|e| CompileError::Serialization(e.to_string()))?;

    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .map_err(|e| CompileError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| CompileError::Compression(e.to_string()))?;

    Ok(EncodedCollection {
        key,
        json_bytes: json.len(),
        encoded: STANDARD.encode(compressed),
    })
}

/// Reverse [`encode_collection`].
pub fn decode_collection<T: DeserializeOwned>(encoded: &str) -> Result<T, CompileError> {
    let compressed = STANDARD
        .decode(encoded)
        .map_err(|e| CompileError::Serialization(format!("invalid base64: {e}")))?;

    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .map_err(|e| CompileError::Compression(e.to_string()))?;

    serde_json::from_slice(&json).map_err(|e| CompileError::Serialization(e.to_string()))
}

// =============================================================================
// BUNDLE
// =============================================================================

/// Every collection of a [`LootDataset`], in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBundle {
    entries: Vec<EncodedCollection>,
}

impl CompressedBundle {
    pub fn encode(dataset: &LootDataset) -> Result<Self, CompileError> {
        Ok(Self {
            entries: vec![
                encode_collection(KEY_TIERS, &dataset.tiers)?,
                encode_collection(KEY_INSTANCES, &dataset.instances)?,
                encode_collection(KEY_ENCOUNTERS, &dataset.encounters)?,
                encode_collection(KEY_ENCOUNTER_LOOT, &dataset.encounter_loot)?,
                encode_collection(KEY_DIFFICULTIES, &dataset.difficulties)?,
                encode_collection(KEY_INSTANCE_DIFFICULTIES, &dataset.instance_difficulties)?,
            ],
        })
    }

    /// Decode every collection back into a dataset.
    pub fn decode(&self) -> Result<LootDataset, CompileError> {
        Ok(LootDataset {
            tiers: decode_collection(self.require(KEY_TIERS)?)?,
            instances: decode_collection(self.require(KEY_INSTANCES)?)?,
            encounters: decode_collection(self.require(KEY_ENCOUNTERS)?)?,
            encounter_loot: decode_collection(self.require(KEY_ENCOUNTER_LOOT)?)?,
            difficulties: decode_collection(self.require(KEY_DIFFICULTIES)?)?,
            instance_difficulties: decode_collection(self.require(KEY_INSTANCE_DIFFICULTIES)?)?,
        })
    }

    pub fn entries(&self) -> &[EncodedCollection] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.encoded.as_str())
    }

    fn require(&self, key: &str) -> Result<&str, CompileError> {
        self.get(key)
            .ok_or_else(|| CompileError::Serialization(format!("missing collection {key}")))
    }

    /// Total minified JSON size.
    #[must_use]
    pub fn json_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.json_bytes).sum()
    }

    /// Total base64 size.
    #[must_use]
    pub fn encoded_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.encoded.len()).sum()
    }

    /// Encoded size per thousand JSON bytes (0 when there is no JSON).
    #[must_use]
    pub fn ratio_permille(&self) -> usize {
        let json = self.json_bytes();
        if json == 0 {
            return 0;
        }
        self.encoded_bytes().saturating_mul(1000) / json
    }

    /// Render the `ns.CompressedData` Lua file.
    #[must_use]
    pub fn render_lua(&self) -> String {
        let mut lines = vec![
            "-- LootWishlist Compressed Static Data".to_string(),
            "-- Generated by lootdata loot".to_string(),
            "-- DO NOT EDIT MANUALLY - regenerate with the tool".to_string(),
            String::new(),
            "local _, ns = ...".to_string(),
            "ns.CompressedData = {".to_string(),
        ];
        for entry in &self.entries {
            // base64 output never contains quotes or backslashes.
            lines.push(format!("    {} = \"{}\",", entry.key, entry.encoded));
        }
        lines.push("}".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

// =============================================================================
// TESTS
// =============================================================================
