//! # Remote Store Client
//!
//! Blocking REST implementation of the [`EntityStore`] contract over the
//! store's split services: the update service owns entity creation and
//! partial updates, the query service owns search and relationship
//! enumeration. Calls are strictly request/response — the engine never has
//! two mutations in flight — so a synchronous client is all that is needed.
//!
//! Endpoints:
//! - `POST   {update_url}` — create entity
//! - `PUT    {update_url}/{id}` — partial update (merge semantics)
//! - `POST   {query_url}/search` — search entities
//! - `POST   {query_url}/{id}/relations` — filtered relationship listing

use crate::error::{Error, Result};
use crate::model::{
    Entity, EntityId, EntityPatch, EntitySummary, Relationship, RelationshipFilter,
    RelationshipPatch, SearchCriteria, TimeBasedName,
};
use crate::store::EntityStore;
use crate::temporal::Timestamp;
use anyhow::{anyhow, Context};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// REST-backed entity store client.
pub struct RemoteStore {
    http: Client,
    update_url: String,
    query_url: String,
}

impl RemoteStore {
    pub fn new(update_url: &str, query_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            update_url: update_url.trim_end_matches('/').to_string(),
            query_url: query_url.trim_end_matches('/').to_string(),
        })
    }

    /// Probe the query service until it answers, with a bounded number of
    /// attempts. The store may still be starting when a batch run begins.
    pub fn wait_until_ready(&self, attempts: u32, delay: Duration) -> Result<()> {
        for attempt in 1..=attempts {
            match self.search_entities(&SearchCriteria::default()) {
                Ok(_) => {
                    info!(attempt, "entity store is ready");
                    return Ok(());
                }
                Err(err) if attempt < attempts => {
                    warn!(attempt, error = %err, "entity store not ready, retrying");
                    std::thread::sleep(delay);
                }
                Err(err) => return Err(err),
            }
        }
        Err(Error::Upstream(anyhow!(
            "entity store not ready after {} attempts",
            attempts
        )))
    }

    fn ensure_success(&self, response: Response, what: &str, name: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(what, name));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Upstream(anyhow!(
                "{} failed with status {}: {}",
                what,
                status,
                body
            )));
        }
        Ok(response)
    }
}

impl EntityStore for RemoteStore {
    fn create_entity(&mut self, entity: Entity) -> Result<Entity> {
        let response = self
            .http
            .post(&self.update_url)
            .json(&entity)
            .send()
            .with_context(|| format!("create entity {}", entity.id))?;
        let response = self.ensure_success(response, "create entity", entity.id.as_str())?;
        let created: Entity = response
            .json()
            .with_context(|| format!("decode created entity {}", entity.id))?;
        debug!(id = %created.id, "created entity");
        Ok(created)
    }

    fn search_entities(&self, criteria: &SearchCriteria) -> Result<Vec<EntitySummary>> {
        let url = format!("{}/search", self.query_url);
        let response = self
            .http
            .post(&url)
            .json(criteria)
            .send()
            .context("search entities")?;
        let response = self.ensure_success(response, "search entities", "")?;
        let matches: Vec<EntitySummary> = response.json().context("decode search results")?;
        Ok(matches)
    }

    fn update_entity(&mut self, id: &EntityId, patch: EntityPatch) -> Result<Entity> {
        let url = format!("{}/{}", self.update_url, id);
        let body = WirePatch::from_patch(id, &patch);
        let response = self
            .http
            .put(&url)
            .json(&body)
            .send()
            .with_context(|| format!("update entity {}", id))?;
        let response = self.ensure_success(response, "entity", id.as_str())?;
        let updated: Entity = response
            .json()
            .with_context(|| format!("decode updated entity {}", id))?;
        Ok(updated)
    }

    fn get_related_entities(
        &self,
        id: &EntityId,
        filter: &RelationshipFilter,
    ) -> Result<Vec<Relationship>> {
        let url = format!("{}/{}/relations", self.query_url, id);
        let response = self
            .http
            .post(&url)
            .json(filter)
            .send()
            .with_context(|| format!("list relationships of {}", id))?;
        let response = self.ensure_success(response, "entity", id.as_str())?;
        let relationships: Vec<Relationship> = response
            .json()
            .with_context(|| format!("decode relationships of {}", id))?;
        Ok(relationships)
    }
}

/// Wire form of a partial update. Relationship entries carry either the
/// full fields of a new edge or just the id and end time of a termination —
/// the two shapes the store's merge contract distinguishes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePatch<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a TimeBasedName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terminated: Option<Timestamp>,
    relationships: Vec<WireRelationshipEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct WireRelationshipEntry<'a> {
    key: &'a str,
    value: WireRelationshipPatch<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRelationshipPatch<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    related_entity_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<Timestamp>,
}

impl<'a> WirePatch<'a> {
    fn from_patch(id: &'a EntityId, patch: &'a EntityPatch) -> Self {
        let relationships = patch
            .relationships
            .iter()
            .map(|entry| match entry {
                RelationshipPatch::Create(relationship) => WireRelationshipEntry {
                    key: &relationship.id,
                    value: WireRelationshipPatch {
                        id: &relationship.id,
                        name: Some(relationship.name.as_str().to_string()),
                        related_entity_id: Some(relationship.related_entity_id.as_str()),
                        start_time: Some(relationship.start_time),
                        end_time: relationship.end_time,
                    },
                },
                RelationshipPatch::Terminate { id, end_time } => WireRelationshipEntry {
                    key: id,
                    value: WireRelationshipPatch {
                        id,
                        name: None,
                        related_entity_id: None,
                        start_time: None,
                        end_time: Some(*end_time),
                    },
                },
            })
            .collect();
        Self {
            id: id.as_str(),
            name: patch.name.as_ref(),
            terminated: patch.terminated,
            relationships,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RelationName;

    fn day(raw: &str) -> Timestamp {
        Timestamp::from_day(raw).unwrap()
    }

    #[test]
    fn test_terminate_patch_carries_only_id_and_end_time() {
        let id = EntityId::from("c1");
        let patch = EntityPatch::terminate_relationship("c1_m1_x", day("2024-01-01"));
        let wire = WirePatch::from_patch(&id, &patch);
        let json = serde_json::to_value(&wire).unwrap();

        let entry = &json["relationships"][0];
        assert_eq!(entry["key"], "c1_m1_x");
        assert_eq!(entry["value"]["id"], "c1_m1_x");
        assert_eq!(entry["value"]["endTime"], "2024-01-01T00:00:00Z");
        assert!(entry["value"].get("relatedEntityId").is_none());
        assert!(entry["value"].get("startTime").is_none());
        assert!(entry["value"].get("name").is_none());
    }

    #[test]
    fn test_create_patch_carries_full_fields() {
        let id = EntityId::from("c1");
        let patch = EntityPatch::create_relationship(Relationship {
            id: "c1_m1_x".to_string(),
            name: RelationName::AsMinister,
            related_entity_id: EntityId::from("m1"),
            start_time: day("2019-12-10"),
            end_time: None,
        });
        let wire = WirePatch::from_patch(&id, &patch);
        let json = serde_json::to_value(&wire).unwrap();

        let entry = &json["relationships"][0];
        assert_eq!(entry["value"]["name"], "AS_MINISTER");
        assert_eq!(entry["value"]["relatedEntityId"], "m1");
        assert_eq!(entry["value"]["startTime"], "2019-12-10T00:00:00Z");
        assert!(entry["value"].get("endTime").is_none());
    }
}
