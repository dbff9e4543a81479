//! # Document Linking
//!
//! Documents are append-only: they are never terminated and relate to
//! organisations, people, or each other purely through new edges. This
//! module loads document-link files (`parent,child,relationship,start_date`)
//! and appends one active edge per row. Rows fail independently: a link
//! whose endpoints do not resolve is logged and counted, not fatal, so one
//! bad row does not sink a whole gazette batch.

use crate::error::Result;
use crate::ids;
use crate::model::{EntityPatch, RelationName, Relationship};
use crate::resolver::Resolver;
use crate::store::EntityStore;
use crate::temporal::Timestamp;
use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

/// One document-to-document link row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub parent: String,
    pub child: String,
    pub relationship: RelationName,
    pub start_date: Timestamp,
}

/// Outcome of linking one file's rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    pub linked: usize,
    pub failed: usize,
}

/// Load the link rows of one CSV file.
pub fn load_links(path: &Path) -> anyhow::Result<Vec<DocumentLink>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut links = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = index + 2;
        if record.len() < 4 {
            anyhow::bail!(
                "row {} has insufficient columns (expected 4, got {})",
                row,
                record.len()
            );
        }
        links.push(DocumentLink {
            parent: required_field(&record, row, 0, "parent")?.to_string(),
            child: required_field(&record, row, 1, "child")?.to_string(),
            relationship: RelationName::parse(required_field(&record, row, 2, "relationship")?)?,
            start_date: Timestamp::from_day(required_field(&record, row, 3, "start_date")?)?,
        });
    }
    Ok(links)
}

fn required_field<'r>(
    record: &'r csv::StringRecord,
    row: usize,
    column: usize,
    name: &str,
) -> anyhow::Result<&'r str> {
    let value = record.get(column).unwrap_or_default().trim();
    if value.is_empty() {
        anyhow::bail!("row {} has an empty '{}' field", row, name);
    }
    Ok(value)
}

/// Link every row, continuing past per-row failures.
pub fn link_documents(store: &mut dyn EntityStore, links: &[DocumentLink]) -> LinkSummary {
    let mut summary = LinkSummary::default();
    for link in links {
        match link_one(store, link) {
            Ok(()) => summary.linked += 1,
            Err(err) => {
                warn!(
                    parent = %link.parent,
                    child = %link.child,
                    error = %err,
                    "failed to link documents"
                );
                summary.failed += 1;
            }
        }
    }
    info!(linked = summary.linked, failed = summary.failed, "processed document links");
    summary
}

fn link_one(store: &mut dyn EntityStore, link: &DocumentLink) -> Result<()> {
    let (parent, child) = {
        let resolver = Resolver::new(&*store);
        (
            resolver.resolve_document(&link.parent)?,
            resolver.resolve_document(&link.child)?,
        )
    };
    let edge = Relationship {
        id: ids::relationship_id(&parent.id, &child.id),
        name: link.relationship.clone(),
        related_entity_id: child.id.clone(),
        start_time: link.start_date,
        end_time: None,
    };
    store.update_entity(&parent.id, EntityPatch::create_relationship(edge))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "parent,child,relationship,start_date").unwrap();
        writeln!(file, "2403-53,2403-03,HAS_DOCUMENT,2024-09-27").unwrap();
        writeln!(file, "2403-53,2403-07,AMENDS,2024-10-01").unwrap();

        let links = load_links(&path).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].relationship, RelationName::HasDocument);
        assert_eq!(
            links[1].relationship,
            RelationName::Custom("AMENDS".to_string())
        );
    }

    #[test]
    fn test_load_links_rejects_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "parent,child,relationship,start_date").unwrap();
        writeln!(file, "2403-53,,HAS_DOCUMENT,2024-09-27").unwrap();

        assert!(load_links(&path).is_err());
    }
}
