//! Static mission records and the read-only catalog that serves them.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::constants::MISSIONS_PER_REALM;
use crate::error::{CatalogError, MissionError};

const EMBEDDED_CATALOG: &str = include_str!("../assets/missions.json");

/// A single learning unit: narrative content plus one interactive simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Registry tag selecting the simulation handler.
    pub simulation_type: String,
    /// Untyped parameter bag, parsed by the registry into typed params.
    #[serde(default)]
    pub simulation_data: serde_json::Value,
    #[serde(default)]
    pub reflection_question: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Mission {
    /// Realm number derived from the id. Display only.
    #[must_use]
    pub const fn realm(&self) -> u32 {
        self.id / MISSIONS_PER_REALM
    }

    /// Mission number within its realm. Display only.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.id % MISSIONS_PER_REALM
    }

    /// Reflection prompt, falling back to the supplied default.
    #[must_use]
    pub fn reflection_prompt<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.reflection_question
            .as_deref()
            .filter(|question| !question.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// Whether the mission authored its own reflection question.
    #[must_use]
    pub fn has_reflection_question(&self) -> bool {
        self.reflection_question
            .as_deref()
            .is_some_and(|question| !question.trim().is_empty())
    }
}

/// Narrative grouping of missions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    realms: Vec<Realm>,
    #[serde(default)]
    missions: Vec<Mission>,
}

/// Read-only mission store. Missions are shared by reference across sessions.
#[derive(Debug, Clone, Default)]
pub struct MissionCatalog {
    realms: Vec<Realm>,
    missions: Vec<Arc<Mission>>,
    index: HashMap<u32, usize>,
}

impl MissionCatalog {
    /// Build a catalog from realm and mission records.
    ///
    /// # Errors
    ///
    /// Returns an error if a mission or realm id is repeated.
    pub fn new(realms: Vec<Realm>, missions: Vec<Mission>) -> Result<Self, CatalogError> {
        let mut seen_realms = HashSet::with_capacity(realms.len());
        for realm in &realms {
            if !seen_realms.insert(realm.id) {
                return Err(CatalogError::DuplicateRealm { id: realm.id });
            }
        }

        let mut index = HashMap::with_capacity(missions.len());
        let mut shared = Vec::with_capacity(missions.len());
        for (position, mission) in missions.into_iter().enumerate() {
            if index.insert(mission.id, position).is_some() {
                return Err(CatalogError::DuplicateMission { id: mission.id });
            }
            shared.push(Arc::new(mission));
        }

        Ok(Self {
            realms,
            missions: shared,
            index,
        })
    }

    /// Load a catalog from a JSON document with `realms` and `missions` arrays.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or contains duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.realms, file.missions)
    }

    /// Catalog shipped with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset fails to parse.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Look up a mission by id.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NotFound`] when no record matches.
    pub fn get(&self, id: u32) -> Result<Arc<Mission>, MissionError> {
        self.index
            .get(&id)
            .and_then(|position| self.missions.get(*position))
            .cloned()
            .ok_or(MissionError::NotFound { id })
    }

    #[must_use]
    pub fn missions(&self) -> &[Arc<Mission>] {
        &self.missions
    }

    #[must_use]
    pub fn realms(&self) -> &[Realm] {
        &self.realms
    }

    /// Missions whose id encodes the given realm, ordered by id.
    #[must_use]
    pub fn missions_in_realm(&self, realm_id: u32) -> Vec<Arc<Mission>> {
        let mut missions: Vec<Arc<Mission>> = self
            .missions
            .iter()
            .filter(|mission| mission.realm() == realm_id)
            .cloned()
            .collect();
        missions.sort_by_key(|mission| mission.id);
        missions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_CATALOG: &str = r#"{
        "realms": [{ "id": 1, "name": "The Ancient Marketplace" }],
        "missions": [
            {
                "id": 102,
                "title": "Second",
                "simulationType": "quiz"
            },
            {
                "id": 101,
                "title": "First",
                "simulationType": "barter",
                "simulationData": { "traders": [] },
                "reflectionQuestion": "Why did barter break down?"
            }
        ]
    }"#;

    #[test]
    fn catalog_parses_and_defaults_optional_fields() {
        let catalog = MissionCatalog::from_json(SMALL_CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        let second = catalog.get(102).unwrap();
        assert!(second.objectives.is_empty());
        assert!(second.simulation_data.is_null());
        assert_eq!(second.reflection_prompt("default"), "default");
        assert_eq!(second.realm(), 1);
        assert_eq!(second.number(), 2);
    }

    #[test]
    fn missing_mission_reports_not_found() {
        let catalog = MissionCatalog::from_json(SMALL_CATALOG).unwrap();
        assert_eq!(catalog.get(999), Err(MissionError::NotFound { id: 999 }));
    }

    #[test]
    fn realm_listing_is_ordered_by_id() {
        let catalog = MissionCatalog::from_json(SMALL_CATALOG).unwrap();
        let ids: Vec<u32> = catalog
            .missions_in_realm(1)
            .iter()
            .map(|mission| mission.id)
            .collect();
        assert_eq!(ids, vec![101, 102]);
        assert!(catalog.missions_in_realm(7).is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"{ "missions": [
            { "id": 1, "title": "a", "simulationType": "quiz" },
            { "id": 1, "title": "b", "simulationType": "quiz" }
        ] }"#;
        assert!(matches!(
            MissionCatalog::from_json(json),
            Err(CatalogError::DuplicateMission { id: 1 })
        ));
    }

    #[test]
    fn blank_reflection_question_uses_fallback() {
        let mut mission = MissionCatalog::from_json(SMALL_CATALOG)
            .unwrap()
            .get(101)
            .unwrap()
            .as_ref()
            .clone();
        assert!(mission.has_reflection_question());
        mission.reflection_question = Some("   ".to_string());
        assert!(!mission.has_reflection_question());
        assert_eq!(mission.reflection_prompt("fallback"), "fallback");
    }
}
