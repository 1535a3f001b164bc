//! Command executor

use crate::core::version::Version;
use crate::db::{StoreStats, TemporalStore};
use crate::error::Result;
use crate::query::parser::{parse_script, Command};
use serde::Serialize;
use std::fmt;

/// Result of running one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "result", rename_all = "snake_case")]
pub enum CommandOutput {
    /// Unconditional writes
    Unit,
    /// Reads; `None` when the field is absent
    Value(Option<String>),
    /// Conditional writes; whether the write was applied
    Applied(bool),
    /// Scans, as `field(value)` strings
    Entries(Vec<String>),
    History(Vec<Version>),
    Keys(Vec<String>),
    Stats(StoreStats),
}

impl CommandOutput {
    /// Render as a single JSON line
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutput::Unit => write!(f, "ok"),
            CommandOutput::Value(Some(value)) => write!(f, "{value}"),
            CommandOutput::Value(None) => write!(f, "(nil)"),
            CommandOutput::Applied(applied) => write!(f, "{applied}"),
            CommandOutput::Entries(items) | CommandOutput::Keys(items) => {
                write!(f, "[{}]", items.join(", "))
            }
            CommandOutput::History(versions) => {
                let items: Vec<String> = versions.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            CommandOutput::Stats(stats) => write!(
                f,
                "keys={} fields={} versions={} tombstones={}",
                stats.keys, stats.fields, stats.versions, stats.tombstones
            ),
        }
    }
}

/// Execute a single command against the store
pub fn execute(store: &TemporalStore, command: &Command) -> CommandOutput {
    match command {
        Command::Set {
            ts,
            key,
            field,
            value,
        } => {
            store.set(*ts, key, field, value);
            CommandOutput::Unit
        }
        Command::Get { ts, key, field } => CommandOutput::Value(store.get(*ts, key, field)),
        Command::CompareAndSet {
            ts,
            key,
            field,
            expected,
            new_value,
        } => CommandOutput::Applied(store.compare_and_set(
            *ts,
            key,
            field,
            expected.as_deref(),
            new_value,
        )),
        Command::CompareAndDelete {
            ts,
            key,
            field,
            expected,
        } => CommandOutput::Applied(store.compare_and_delete(*ts, key, field, expected.as_deref())),
        Command::Scan { ts, key } => CommandOutput::Entries(store.scan(*ts, key)),
        Command::ScanByPrefix { ts, key, prefix } => {
            CommandOutput::Entries(store.scan_by_prefix(*ts, key, prefix))
        }
        Command::SetWithTtl {
            ts,
            key,
            field,
            value,
            ttl,
        } => {
            store.set_with_ttl(*ts, key, field, value, *ttl);
            CommandOutput::Unit
        }
        Command::CompareAndSetWithTtl {
            ts,
            key,
            field,
            expected,
            new_value,
            ttl,
        } => CommandOutput::Applied(store.compare_and_set_with_ttl(
            *ts,
            key,
            field,
            expected.as_deref(),
            new_value,
            *ttl,
        )),
        Command::SetAt {
            now,
            key,
            field,
            value,
            set_ts,
        } => {
            store.set_at(*now, key, field, value, *set_ts);
            CommandOutput::Unit
        }
        Command::GetAt {
            now,
            key,
            field,
            query_ts,
        } => CommandOutput::Value(store.get_at(*now, key, field, *query_ts)),
        Command::History { key, field } => CommandOutput::History(store.history(key, field)),
        Command::Keys => CommandOutput::Keys(store.keys()),
        Command::Stats => CommandOutput::Stats(store.stats()),
    }
}

/// Parse and run a script.
///
/// The whole script is parsed before anything executes, so a malformed
/// script leaves the store untouched.
pub fn run_script(store: &TemporalStore, script: &str) -> Result<Vec<CommandOutput>> {
    let commands = parse_script(script)?;
    tracing::debug!(commands = commands.len(), "running script");
    Ok(commands
        .iter()
        .map(|parsed| execute(store, &parsed.command))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_run_script() {
        let store = TemporalStore::new();
        let outputs = run_script(
            &store,
            "SET 100 u name A\n\
             SET 200 u name B\n\
             GET_AT 300 u name 150\n\
             GET_AT 300 u name 250\n\
             CAS 300 u age NULL 30\n\
             CAS 400 u age 29 31\n\
             SCAN 500 u\n",
        )
        .unwrap();

        let rendered: Vec<String> = outputs.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["ok", "ok", "A", "B", "true", "false", "[age(30), name(B)]"]
        );
    }

    #[test]
    fn test_malformed_script_does_not_execute() {
        let store = TemporalStore::new();
        let err = run_script(&store, "SET 1 k f v\nSET_TTL 2 k f v -3\n").unwrap_err();
        assert!(matches!(err, Error::InvalidTtl(_)));
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_render_absent_and_history() {
        let store = TemporalStore::new();
        let outputs = run_script(
            &store,
            "GET 1 k f\nSET_TTL 10 k f v 5\nCAD 12 k f v\nHISTORY k f\nKEYS\nSTATS\n",
        )
        .unwrap();
        let rendered: Vec<String> = outputs.iter().map(ToString::to_string).collect();
        assert_eq!(rendered[0], "(nil)");
        assert_eq!(rendered[3], "[10#1 v expires=15, 12#2 <tombstone>]");
        assert_eq!(rendered[4], "[k]");
        assert_eq!(rendered[5], "keys=1 fields=1 versions=2 tombstones=1");
    }

    #[test]
    fn test_delete_expecting_null() {
        let store = TemporalStore::new();
        let outputs = run_script(
            &store,
            "CAD 100 ghost f NULL\n\
             SET 100 u f v\n\
             CAD 200 u f NULL\n\
             CAD 200 u f \"NULL\"\n\
             GET 200 u f\n\
             KEYS\n\
             STATS\n",
        )
        .unwrap();
        let rendered: Vec<String> = outputs.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "true",
                "ok",
                "false",
                "false",
                "v",
                "[ghost, u]",
                "keys=2 fields=2 versions=2 tombstones=1",
            ]
        );
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(
            CommandOutput::Value(None).to_json().unwrap(),
            r#"{"type":"value","result":null}"#
        );
        assert_eq!(
            CommandOutput::Applied(true).to_json().unwrap(),
            r#"{"type":"applied","result":true}"#
        );
        assert_eq!(CommandOutput::Unit.to_json().unwrap(), r#"{"type":"unit"}"#);
        assert_eq!(
            CommandOutput::Entries(vec!["a(1)".to_string()]).to_json().unwrap(),
            r#"{"type":"entries","result":["a(1)"]}"#
        );
    }
}
