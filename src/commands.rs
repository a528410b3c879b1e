use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use symtrail::config::WriterConfig;
use symtrail::db::StoreStats;
use symtrail::name::{NameElement, NameHierarchy};
use symtrail::types::{ReferenceKind, SymbolKind};
use symtrail::writer::{self, Writer};

fn load_config(path: Option<&str>) -> Result<WriterConfig> {
    match path {
        Some(path) => WriterConfig::from_file(path)
            .with_context(|| format!("Failed to load writer config from {path}")),
        None => Ok(WriterConfig::default()),
    }
}

fn open_writer(database: &str, config: WriterConfig) -> Result<Writer> {
    let mut writer = Writer::new(config);
    writer
        .open(database)
        .with_context(|| format!("Failed to open database {database}"))?;
    Ok(writer)
}

/// Print `data` as pretty JSON if `json` is true, otherwise call `human_fmt`.
fn output<T: Serialize>(data: &T, json: bool, human_fmt: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(data)?);
    } else {
        human_fmt(data);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: &'static str,
    supported_database_version: i64,
}

/// Show writer and supported database version.
pub fn cmd_version(json: bool) -> Result<()> {
    let info = VersionInfo {
        version: writer::version_string(),
        supported_database_version: writer::supported_database_version(),
    };
    output(&info, json, |info| {
        println!("symtrail version: {}", info.version);
        println!("Supported database version: {}", info.supported_database_version);
    })
}

/// Clear `database` and record the sample C++ facts for `source`.
pub fn cmd_demo(
    database: &str,
    source: &str,
    db_version: Option<i64>,
    config: Option<&str>,
    json: bool,
) -> Result<()> {
    let supported = writer::supported_database_version();
    if let Some(requested) = db_version {
        if requested != supported {
            bail!("binary only supports database version {supported}, requested {requested}");
        }
    }

    let source = source.replace('\\', "/");
    let config = load_config(config)?.clearing();
    Writer::session(database, config, |writer| record_sample(writer, &source))
        .with_context(|| format!("Failed to record sample into {database}"))?;

    let writer = open_writer(database, WriterConfig::default())?;
    let stats = writer.database()?.stats()?;
    output(&stats, json, |stats| {
        println!("Recorded sample facts for {source} into {database}");
        print_stats(stats);
    })
}

/// The classic walkthrough: a namespace with a class deriving from an
/// external base, a method with a parameter, a qualified call and an error.
fn record_sample(writer: &mut Writer, source: &str) -> Result<()> {
    let writer = &*writer;
    let file = writer.create_file(source)?.as_language("cpp")?;

    // block comment
    writer.record_atomic_source_range(&file.at(2, 1, 6, 3)?)?;

    let namespace = writer
        .create_symbol(NameHierarchy::with_delimiter(".", "api"))?
        .explicitly()?
        .of_type(SymbolKind::Namespace)?
        .at_location(file.at(8, 11, 8, 13)?)?
        .with_scope(file.at(8, 1, 24, 1)?)?;

    let class = namespace
        .create_child_symbol("MyType")?
        .explicitly()?
        .of_type(SymbolKind::Class)?
        .at_location(file.at(11, 7, 11, 12)?)?
        .with_scope(file.at(11, 1, 22, 1)?)?;

    writer
        .create_symbol(NameHierarchy::with_delimiter(".", "BaseType"))?
        .is_referenced_by(&class, ReferenceKind::Inheritance)?
        .at_location(file.at(12, 14, 12, 21)?)?;

    let method = class
        .create_child_symbol(NameElement::with_decoration("void", "my_method", "() const"))?
        .explicitly()?
        .of_type(SymbolKind::Method)?
        .at_location(file.at(15, 10, 15, 18)?)?
        .with_scope(file.at(15, 5, 21, 5)?)?
        .with_signature(file.at(15, 5, 15, 45)?)?;

    writer
        .create_symbol(NameHierarchy::with_delimiter(".", "bool"))?
        .is_referenced_by(&method, ReferenceKind::TypeUsage)?
        .at_location(file.at(15, 20, 15, 23)?)?;

    method
        .create_local_symbol("do_send_signal")?
        .at_location(file.at(15, 25, 15, 38)?)?
        .at_location(file.at(17, 13, 17, 26)?)?;

    let qualifier = writer
        .create_symbol(NameHierarchy::with_delimiter(".", "Client"))?
        .with_qualifier(file.at(19, 13, 19, 18)?)?;

    qualifier
        .create_child_symbol(NameElement::with_decoration("", "send_signal", "()"))?
        .of_type(SymbolKind::Function)?
        .is_referenced_by(&method, ReferenceKind::Call)?
        .at_location(file.at(19, 21, 19, 31)?)?;

    writer.record_error(
        "Really? You missed that \";\" again? (intentional error)",
        &file.at(22, 1, 22, 1)?,
    )?;
    Ok(())
}

/// Row counts of an existing database.
pub fn cmd_stats(database: &str, config: Option<&str>, json: bool) -> Result<()> {
    if !Path::new(database).exists() {
        bail!("Database {database} does not exist");
    }
    let writer = open_writer(database, load_config(config)?)?;
    let stats = writer.database()?.stats()?;
    output(&stats, json, print_stats)
}

fn print_stats(stats: &StoreStats) {
    println!("Database version: {}", stats.version);
    println!("Files:          {}", stats.num_files);
    println!("Symbols:        {}", stats.num_symbols);
    println!(
        "References:     {} ({} unsolved, {} ambiguous)",
        stats.num_references, stats.num_unsolved, stats.num_ambiguous
    );
    println!("Local symbols:  {}", stats.num_local_symbols);
    println!("Atomic ranges:  {}", stats.num_atomic_ranges);
    println!(
        "Errors:         {} ({} fatal)",
        stats.num_errors, stats.num_fatal_errors
    );
    if !stats.symbol_kinds.is_empty() {
        println!("Symbols by kind:");
        for (kind, count) in &stats.symbol_kinds {
            println!("  {kind}: {count}");
        }
    }
    if !stats.reference_kinds.is_empty() {
        println!("References by kind:");
        for (kind, count) in &stats.reference_kinds {
            println!("  {kind}: {count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_records_full_walkthrough() {
        let mut writer = Writer::default();
        writer.open_in_memory().unwrap();
        record_sample(&mut writer, "/src/api.cpp").unwrap();

        let stats = writer.database().unwrap().stats().unwrap();
        assert_eq!(stats.num_files, 1);
        assert_eq!(stats.num_symbols, 7);
        assert_eq!(stats.num_references, 3);
        assert_eq!(stats.num_unsolved, 0);
        assert_eq!(stats.num_local_symbols, 1);
        assert_eq!(stats.num_atomic_ranges, 1);
        assert_eq!(stats.num_errors, 1);
        assert_eq!(stats.num_fatal_errors, 0);
    }

    #[test]
    fn test_stats_refuses_missing_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");

        let err = cmd_stats(path.to_str().unwrap(), None, false).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(!path.exists());
    }
}
