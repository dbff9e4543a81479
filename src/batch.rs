//! # Batch Loading and Ordering
//!
//! Parses delimited transaction files into typed records and produces the
//! single total order the engine replays. Each file carries one operation
//! kind, derived from the file name; rows are validated and dates widened
//! to full timestamps at parse time, so the engine never sees a malformed
//! record. Ordering is by composite transaction id: prefix and label sort
//! lexicographically, the trailing sequence numerically — a plain string
//! sort would misplace `tr_10` before `tr_2`.

use crate::error::{Error, Result};
use crate::model::{MinorKind, RelationName};
use crate::temporal::Timestamp;
use anyhow::Context;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Composite transaction identifier, e.g. `2153-12_tr_01`.
///
/// The leading segment doubles as the batch prefix for entity-id
/// derivation; the trailing segment is the numeric sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId {
    raw: String,
    prefix: String,
    label: String,
    seq: u32,
}

impl TransactionId {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let parts: Vec<&str> = trimmed.split('_').collect();
        if parts.len() < 2 {
            return Err(Error::invariant(format!(
                "transaction id '{}' must carry a prefix and a sequence",
                trimmed
            )));
        }
        let seq: u32 = parts[parts.len() - 1].parse().map_err(|_| {
            Error::invariant(format!(
                "transaction id '{}' has a non-numeric sequence component",
                trimmed
            ))
        })?;
        Ok(Self {
            raw: trimmed.to_string(),
            prefix: parts[0].to_string(),
            label: parts[1..parts.len() - 1].join("_"),
            seq,
        })
    }

    /// Leading segment, used as the batch prefix of derived entity ids.
    pub fn batch_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn sequence(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for TransactionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prefix
            .cmp(&other.prefix)
            .then_with(|| self.label.cmp(&other.label))
            .then_with(|| self.seq.cmp(&other.seq))
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for TransactionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Add a child entity under a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecord {
    pub id: TransactionId,
    pub parent: String,
    pub parent_kind: MinorKind,
    pub child: String,
    pub child_kind: MinorKind,
    pub rel: RelationName,
    pub date: Timestamp,
    pub president: Option<String>,
}

/// Terminate the active parent-child relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminateRecord {
    pub id: TransactionId,
    pub parent: String,
    pub parent_kind: MinorKind,
    pub child: String,
    pub child_kind: MinorKind,
    pub rel: RelationName,
    pub date: Timestamp,
    pub president: Option<String>,
}

/// Transfer a department to a minister active under the new president.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveDepartmentRecord {
    pub id: TransactionId,
    pub department: String,
    pub old_minister: String,
    pub new_minister: String,
    pub old_president: Option<String>,
    pub new_president: String,
    pub date: Timestamp,
}

/// Transfer an appointed person between ministers under one president.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePersonRecord {
    pub id: TransactionId,
    pub person: String,
    pub old_minister: String,
    pub new_minister: String,
    pub president: String,
    pub date: Timestamp,
}

/// Transfer a minister between presidents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMinisterRecord {
    pub id: TransactionId,
    pub minister: String,
    pub old_president: String,
    pub new_president: String,
    pub date: Timestamp,
}

/// Rename a minister or department: create the successor, transfer the
/// holdings, terminate the predecessor's hierarchy edge, link the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub id: TransactionId,
    pub old: String,
    pub new: String,
    pub president: String,
    pub date: Timestamp,
}

/// Merge several ministers into a freshly created one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRecord {
    pub id: TransactionId,
    pub old: Vec<String>,
    pub new: String,
    pub president: String,
    pub date: Timestamp,
}

/// One parsed transaction. The operation kind is part of the type, so the
/// engine dispatches without inspecting string fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Add(AddRecord),
    Terminate(TerminateRecord),
    MoveDepartment(MoveDepartmentRecord),
    MovePerson(MovePersonRecord),
    MoveMinister(MoveMinisterRecord),
    RenameMinister(RenameRecord),
    RenameDepartment(RenameRecord),
    Merge(MergeRecord),
}

impl Transaction {
    pub fn id(&self) -> &TransactionId {
        match self {
            Self::Add(record) => &record.id,
            Self::Terminate(record) => &record.id,
            Self::MoveDepartment(record) => &record.id,
            Self::MovePerson(record) => &record.id,
            Self::MoveMinister(record) => &record.id,
            Self::RenameMinister(record) | Self::RenameDepartment(record) => &record.id,
            Self::Merge(record) => &record.id,
        }
    }

    /// Short label for progress logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Terminate(_) => "terminate",
            Self::MoveDepartment(_) => "move-department",
            Self::MovePerson(_) => "move-person",
            Self::MoveMinister(_) => "move-minister",
            Self::RenameMinister(_) => "rename-minister",
            Self::RenameDepartment(_) => "rename-department",
            Self::Merge(_) => "merge",
        }
    }
}

/// Operation kind carried by a transaction file, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Add,
    Terminate,
    Move,
    Rename,
    Merge,
}

impl FileKind {
    /// `2403-38_TERMINATE.csv` -> `Terminate`; files with no recognized
    /// marker default to `Add`.
    pub fn from_file_name(name: &str) -> Self {
        let upper = name.to_uppercase();
        if upper.contains("TERMINATE") {
            Self::Terminate
        } else if upper.contains("MOVE") {
            Self::Move
        } else if upper.contains("MERGE") {
            Self::Merge
        } else if upper.contains("RENAME") {
            Self::Rename
        } else {
            Self::Add
        }
    }
}

/// Sort transactions into the replay order.
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.id().cmp(b.id()));
}

/// Load every `*.csv` file in `dir` and return the transactions in replay
/// order.
pub fn load_directory(dir: &Path) -> anyhow::Result<Vec<Transaction>> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut transactions = Vec::new();
    for path in &files {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        let kind = FileKind::from_file_name(name);
        let loaded = load_file(path, kind)
            .with_context(|| format!("failed to load transactions from {}", path.display()))?;
        debug!(file = %path.display(), count = loaded.len(), "loaded transaction file");
        transactions.extend(loaded);
    }
    sort_transactions(&mut transactions);
    Ok(transactions)
}

/// Load one transaction file of a known kind.
pub fn load_file(path: &Path, kind: FileKind) -> anyhow::Result<Vec<Transaction>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let mut transactions = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = Row {
            headers: &headers,
            record: &record,
        };
        let transaction = parse_row(kind, &row)
            .with_context(|| format!("row {} of {}", index + 2, path.display()))?;
        transactions.push(transaction);
    }
    Ok(transactions)
}

/// Header-addressed view over one CSV record.
struct Row<'r> {
    headers: &'r csv::StringRecord,
    record: &'r csv::StringRecord,
}

impl Row<'_> {
    fn get_opt(&self, column: &str) -> Option<&str> {
        let index = self
            .headers
            .iter()
            .position(|header| header.trim() == column)?;
        let value = self.record.get(index)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    fn get_any(&self, columns: &[&str]) -> Option<&str> {
        columns.iter().find_map(|column| self.get_opt(column))
    }

    fn get(&self, column: &str) -> Result<&str> {
        self.get_opt(column)
            .ok_or_else(|| Error::invariant(format!("missing required column '{}'", column)))
    }
}

/// Presidency is a role held by a citizen; legacy records still spell the
/// kind as `president`.
fn parse_minor(raw: &str) -> Result<MinorKind> {
    if raw.trim() == "president" {
        Ok(MinorKind::Citizen)
    } else {
        MinorKind::parse(raw)
    }
}

fn parse_row(kind: FileKind, row: &Row<'_>) -> Result<Transaction> {
    let id = TransactionId::parse(row.get("transaction_id")?)?;
    let date = Timestamp::from_day(row.get("date")?)?;

    match kind {
        FileKind::Add => {
            let record = AddRecord {
                id,
                parent: row.get("parent")?.to_string(),
                parent_kind: parse_minor(row.get("parent_type")?)?,
                child: row.get("child")?.to_string(),
                child_kind: parse_minor(row.get("child_type")?)?,
                rel: RelationName::parse(row.get("rel_type")?)?,
                date,
                president: row.get_opt("president").map(str::to_string),
            };
            if record.parent_kind == MinorKind::Minister && record.president.is_none() {
                return Err(Error::invariant(
                    "president is required when the parent is a minister",
                ));
            }
            Ok(Transaction::Add(record))
        }
        FileKind::Terminate => {
            let record = TerminateRecord {
                id,
                parent: row.get("parent")?.to_string(),
                parent_kind: parse_minor(row.get("parent_type")?)?,
                child: row.get("child")?.to_string(),
                child_kind: parse_minor(row.get("child_type")?)?,
                rel: RelationName::parse(row.get("rel_type")?)?,
                date,
                president: row.get_opt("president").map(str::to_string),
            };
            if (record.parent_kind == MinorKind::Minister
                || record.child_kind == MinorKind::Minister)
                && record.president.is_none()
            {
                return Err(Error::invariant(
                    "president is required when terminating minister relationships",
                ));
            }
            Ok(Transaction::Terminate(record))
        }
        FileKind::Move => match row.get_opt("type").unwrap_or("department") {
            "department" => Ok(Transaction::MoveDepartment(MoveDepartmentRecord {
                id,
                department: row.get("child")?.to_string(),
                old_minister: row.get("old_parent")?.to_string(),
                new_minister: row.get("new_parent")?.to_string(),
                old_president: row
                    .get_any(&["old_president", "old_parent_pres"])
                    .map(str::to_string),
                new_president: row
                    .get_any(&["new_president", "new_parent_pres"])
                    .ok_or_else(|| {
                        Error::invariant("new president is required when moving a department")
                    })?
                    .to_string(),
                date,
            })),
            "person" | "citizen" => Ok(Transaction::MovePerson(MovePersonRecord {
                id,
                person: row.get("child")?.to_string(),
                old_minister: row.get("old_parent")?.to_string(),
                new_minister: row.get("new_parent")?.to_string(),
                president: row.get("president")?.to_string(),
                date,
            })),
            "minister" => Ok(Transaction::MoveMinister(MoveMinisterRecord {
                id,
                minister: row.get("child")?.to_string(),
                old_president: row.get("old_parent")?.to_string(),
                new_president: row.get("new_parent")?.to_string(),
                date,
            })),
            other => Err(Error::invariant(format!("unknown move subject '{}'", other))),
        },
        FileKind::Rename => {
            let record = RenameRecord {
                id,
                old: row.get("old")?.to_string(),
                new: row.get("new")?.to_string(),
                president: row.get("president")?.to_string(),
                date,
            };
            match row.get_opt("type").unwrap_or("minister") {
                "minister" => Ok(Transaction::RenameMinister(record)),
                "department" => Ok(Transaction::RenameDepartment(record)),
                other => Err(Error::invariant(format!(
                    "unknown rename subject '{}'",
                    other
                ))),
            }
        }
        FileKind::Merge => Ok(Transaction::Merge(MergeRecord {
            id,
            old: parse_merge_list(row.get("old")?)?,
            new: row.get("new")?.to_string(),
            president: row.get("president")?.to_string(),
            date,
        })),
    }
}

/// Parse the bracketed old-minister list of a merge record.
///
/// Semicolon is the delimiter: portfolio names routinely contain commas
/// ("Minister of Finance, Economic and Policy Development"), so a comma
/// split is only attempted when no semicolon occurs in the cell.
fn parse_merge_list(raw: &str) -> Result<Vec<String>> {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let delimiter = if inner.contains(';') { ';' } else { ',' };
    let names: Vec<String> = inner
        .split(delimiter)
        .map(|name| name.trim().trim_matches('"').trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(Error::invariant(format!(
            "merge record has an empty old-minister list: '{}'",
            raw
        )));
    }
    Ok(names)
}
