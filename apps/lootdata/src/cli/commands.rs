//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command fetches its complete table set first; nothing is compiled
//! or written unless every fetch succeeded.

use crate::config::Config;
use crate::fetch::TableFetcher;
use lootdata_core::{
    CompileError, CompressedBundle, ContentHash, Freshness, GateDecision, Policy, RawTables,
    RowStore, RunMode, Target, compile_loot, compile_static, render_static_lua,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// =============================================================================
// RUN STATUS
// =============================================================================

/// Outcome of a command, mapped to the process exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// An output file was replaced.
    Written(PathBuf),
    /// The existing output matches the current tables.
    UpToDate,
    /// Check mode found the output out of date.
    Stale,
    /// Informational command finished.
    Reported,
}

impl RunStatus {
    /// 0 for fresh or updated, 1 when an update is required.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Stale => 1,
            Self::Written(_) | Self::UpToDate | Self::Reported => 0,
        }
    }
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Resolved configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub policy: Policy,
    pub fetcher: TableFetcher,
    pub json_mode: bool,
}

impl Context {
    pub fn new(
        config: Config,
        source_override: Option<&str>,
        json_mode: bool,
    ) -> Result<Self, CompileError> {
        let fetcher = TableFetcher::new(config.table_source(source_override))?;
        Ok(Self {
            policy: config.policy(),
            config,
            fetcher,
            json_mode,
        })
    }

    async fn fetch(&self, target: Target) -> Result<RawTables, CompileError> {
        info!(
            kind = %target,
            source = %self.fetcher.source().describe(),
            "Fetching {} tables",
            target.tables().len()
        );
        self.fetcher.fetch_all(target.tables()).await
    }
}

fn parse_tables(raw: &RawTables) -> Result<RowStore, CompileError> {
    let store = RowStore::from_raw(raw)?;
    for (table, rows) in store.counts() {
        info!(table, rows, "Parsed table");
    }
    Ok(store)
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// STATIC COMMAND
// =============================================================================

/// Regenerate the literal static data file behind the change-detection gate.
pub async fn cmd_static(
    ctx: &Context,
    output: Option<PathBuf>,
    mode: RunMode,
) -> Result<RunStatus, CompileError> {
    let path = output.unwrap_or_else(|| ctx.config.output.static_path.clone());

    let raw = ctx.fetch(Target::Static).await?;
    let hash = ContentHash::of(&raw);
    let previous = read_previous(&path);
    let freshness = Freshness::assess(previous.as_deref(), &hash);
    let decision = GateDecision::decide(mode, &freshness);
    debug!(?mode, ?decision, hash = %hash, "Gate");

    let stored = match &freshness {
        Freshness::Fresh => Some(hash.as_str().to_string()),
        Freshness::Stale { stored } => stored.as_ref().map(|h| h.as_str().to_string()),
    };

    let status = match decision {
        GateDecision::Skip | GateDecision::ReportFresh => {
            if !ctx.json_mode {
                println!("Static data is up to date (hash: {}...).", hash.short());
            }
            RunStatus::UpToDate
        }
        GateDecision::ReportStale => {
            if !ctx.json_mode {
                println!("Static data is STALE. Run without --check to regenerate.");
                println!(
                    "  Stored hash:  {}",
                    stored.as_deref().unwrap_or("(missing)")
                );
                println!("  Current hash: {}", hash);
            }
            RunStatus::Stale
        }
        GateDecision::Write => {
            let store = parse_tables(&raw)?;
            let dataset = compile_static(&store, &ctx.policy)?;
            let encounter_count: usize = dataset.encounters.values().map(Vec::len).sum();
            info!(
                tiers = dataset.tiers.len(),
                instances = dataset.instances.len(),
                encounters = encounter_count,
                difficulties = dataset.difficulties.len(),
                "Resolved static dataset"
            );

            write_whole_file(&path, &render_static_lua(&dataset, &hash))?;

            if !ctx.json_mode {
                println!("Written to {}", path.display());
                println!("  {} tiers", dataset.tiers.len());
                println!("  {} instances", dataset.instances.len());
                println!("  {} encounters", encounter_count);
                println!("  {} difficulties", dataset.difficulties.len());
            }
            RunStatus::Written(path.clone())
        }
    };

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "target": Target::Static.name(),
            "path": path.to_string_lossy(),
            "hash": hash.as_str(),
            "stored_hash": stored,
            "fresh": freshness.is_fresh(),
            "written": decision.writes(),
            "exit_code": status.exit_code(),
        }));
    }

    Ok(status)
}

/// Previous output text, or `None` when it cannot be read.
fn read_previous(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Cannot read previous output; treating as stale"
            );
            None
        }
    }
}

// =============================================================================
// LOOT COMMAND
// =============================================================================

/// Regenerate the compressed loot data file.
pub async fn cmd_loot(ctx: &Context, output: Option<PathBuf>) -> Result<RunStatus, CompileError> {
    let path = output.unwrap_or_else(|| ctx.config.output.loot_path.clone());

    let raw = ctx.fetch(Target::Loot).await?;
    let store = parse_tables(&raw)?;
    let dataset = compile_loot(&store, &ctx.policy)?;
    info!(
        tiers = dataset.tiers.len(),
        instances = dataset.instances.len(),
        encounters = dataset.encounters.len(),
        loot_tables = dataset.encounter_loot.len(),
        difficulties = dataset.difficulties.len(),
        instance_difficulties = dataset.instance_difficulties.len(),
        "Resolved loot dataset"
    );

    let bundle = CompressedBundle::encode(&dataset)?;
    let lua = bundle.render_lua();
    write_whole_file(&path, &lua)?;

    if ctx.json_mode {
        let collections: serde_json::Map<String, serde_json::Value> = bundle
            .entries()
            .iter()
            .map(|entry| {
                (
                    entry.key.to_string(),
                    serde_json::json!({
                        "json_bytes": entry.json_bytes,
                        "encoded_bytes": entry.encoded.len(),
                    }),
                )
            })
            .collect();
        print_json(&serde_json::json!({
            "target": Target::Loot.name(),
            "path": path.to_string_lossy(),
            "json_bytes": bundle.json_bytes(),
            "encoded_bytes": bundle.encoded_bytes(),
            "ratio_permille": bundle.ratio_permille(),
            "file_bytes": lua.len(),
            "collections": collections,
        }));
    } else {
        println!("Size summary:");
        println!("  Uncompressed JSON: {} bytes", bundle.json_bytes());
        println!("  Compressed+Base64: {} bytes", bundle.encoded_bytes());
        println!(
            "  Compression ratio: {} per thousand",
            bundle.ratio_permille()
        );
        println!();
        println!("Wrote {} ({} bytes)", path.display(), lua.len());
    }

    Ok(RunStatus::Written(path))
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the content hash of a target's tables.
pub async fn cmd_hash(ctx: &Context, target: Target) -> Result<RunStatus, CompileError> {
    let raw = ctx.fetch(target).await?;
    let hash = ContentHash::of(&raw);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "target": target.name(),
            "algorithm": "blake3",
            "tables": raw.len(),
            "hash": hash.as_str(),
        }));
    } else {
        println!("{}", hash);
    }

    Ok(RunStatus::Reported)
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Replace `path` with `contents` via a sibling temporary file and a rename,
/// so readers never observe a partially written file.
pub fn write_whole_file(path: &Path, contents: &str) -> Result<(), CompileError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| {
        CompileError::Io(format!(
            "Cannot create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        CompileError::Io(format!("Output path {} has no file name", path.display()))
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = parent.join(tmp_name);

    // Neither failure may leave the temporary file behind.
    std::fs::write(&tmp, contents).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CompileError::Io(format!("Write {}: {}", tmp.display(), e))
    })?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        CompileError::Io(format!("Replace {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(RunStatus::Written(PathBuf::from("x")).exit_code(), 0);
        assert_eq!(RunStatus::UpToDate.exit_code(), 0);
        assert_eq!(RunStatus::Reported.exit_code(), 0);
        assert_eq!(RunStatus::Stale.exit_code(), 1);
    }

    #[test]
    fn whole_file_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Data").join("StaticData.lua");

        write_whole_file(&path, "first").expect("write");
        write_whole_file(&path, "second").expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().expect("parent"))
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_removes_the_temporary_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("StaticData.lua");
        let tmp = dir.path().join(".StaticData.lua.tmp");
        // Writes through this link fail with ENOSPC after the open succeeds.
        std::os::unix::fs::symlink("/dev/full", &tmp).expect("symlink");

        let result = write_whole_file(&path, "contents");

        assert!(matches!(result, Err(CompileError::Io(_))));
        assert!(std::fs::symlink_metadata(&tmp).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn unreadable_previous_output_is_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_previous(&dir.path().join("missing.lua")), None);
        // A directory cannot be read as text.
        assert_eq!(read_previous(dir.path()), None);
    }
}
