//! Completed-mission ledger and per-realm summaries.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::data::MissionCatalog;
use crate::numbers::percent_of;

/// Records which missions are finished. Hosts supply their own backing
/// store; the controller only ever calls [`ProgressLedger::mark_complete`].
pub trait ProgressLedger {
    fn mark_complete(&mut self, mission_id: u32);

    fn is_complete(&self, mission_id: u32) -> bool;

    /// Completed ids in ascending order.
    fn completed(&self) -> Vec<u32>;
}

/// In-memory ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryLedger {
    completed: BTreeSet<u32>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

impl ProgressLedger for MemoryLedger {
    fn mark_complete(&mut self, mission_id: u32) {
        self.completed.insert(mission_id);
    }

    fn is_complete(&self, mission_id: u32) -> bool {
        self.completed.contains(&mission_id)
    }

    fn completed(&self) -> Vec<u32> {
        self.completed.iter().copied().collect()
    }
}

impl<L: ProgressLedger + ?Sized> ProgressLedger for &mut L {
    fn mark_complete(&mut self, mission_id: u32) {
        (**self).mark_complete(mission_id);
    }

    fn is_complete(&self, mission_id: u32) -> bool {
        (**self).is_complete(mission_id)
    }

    fn completed(&self) -> Vec<u32> {
        (**self).completed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmProgress {
    pub realm_id: u32,
    pub name: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

/// Completion counts for every realm in the catalog, in catalog order.
#[must_use]
pub fn realm_progress(catalog: &MissionCatalog, ledger: &impl ProgressLedger) -> Vec<RealmProgress> {
    catalog
        .realms()
        .iter()
        .map(|realm| {
            let missions = catalog.missions_in_realm(realm.id);
            let completed = missions
                .iter()
                .filter(|mission| ledger.is_complete(mission.id))
                .count();
            RealmProgress {
                realm_id: realm.id,
                name: realm.name.clone(),
                completed,
                total: missions.len(),
                percent: percent_of(completed, missions.len()),
            }
        })
        .collect()
}
