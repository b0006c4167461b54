use crate::errors::{AppError, AppResult};
use crate::models::{Lead, LeadPatch, Opportunity};
use std::sync::{Arc, Mutex, MutexGuard};

/// Authoritative in-memory lead collection. Handles are cheap clones over the
/// same state; only the mutation orchestrator writes, everything else reads.
#[derive(Clone, Default)]
pub struct LeadStore {
    leads: Arc<Mutex<Vec<Lead>>>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Vec<Lead>>> {
        self.leads
            .lock()
            .map_err(|_| AppError::Internal("lead store mutex poisoned".to_string()))
    }

    /// Installs a loaded snapshot, replacing any previous contents.
    pub fn replace_all(&self, leads: Vec<Lead>) -> AppResult<()> {
        let mut guard = self.lock()?;
        *guard = leads;
        Ok(())
    }

    pub fn list(&self) -> AppResult<Vec<Lead>> {
        Ok(self.lock()?.clone())
    }

    pub fn get(&self, id: &str) -> AppResult<Option<Lead>> {
        Ok(self.lock()?.iter().find(|lead| lead.id == id).cloned())
    }

    /// Applies a partial update to the matching lead, leaving unpatched fields
    /// untouched. An absent id is a reportable condition, not a silent no-op.
    pub fn update(&self, id: &str, patch: &LeadPatch) -> AppResult<Lead> {
        let mut guard = self.lock()?;
        let Some(lead) = guard.iter_mut().find(|lead| lead.id == id) else {
            return Err(AppError::NotFound(format!("No lead with id {id}")));
        };
        if let Some(status) = patch.status {
            lead.status = status;
        }
        if let Some(email) = &patch.email {
            lead.email = email.clone();
        }
        Ok(lead.clone())
    }

    /// Whole-entity replace on matching id; the rollback primitive. The
    /// snapshot wins over whatever the store holds now.
    pub fn restore(&self, snapshot: Lead) -> AppResult<()> {
        let mut guard = self.lock()?;
        match guard.iter_mut().find(|lead| lead.id == snapshot.id) {
            Some(lead) => *lead = snapshot,
            None => {
                tracing::warn!(lead_id = %snapshot.id, "restore target missing from lead store");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}

/// Append-only opportunity collection; `retract` exists solely so a failed
/// conversion can withdraw the entry it optimistically appended.
#[derive(Clone, Default)]
pub struct OpportunityStore {
    opportunities: Arc<Mutex<Vec<Opportunity>>>,
}

impl OpportunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Vec<Opportunity>>> {
        self.opportunities
            .lock()
            .map_err(|_| AppError::Internal("opportunity store mutex poisoned".to_string()))
    }

    pub fn append(&self, opportunity: Opportunity) -> AppResult<()> {
        self.lock()?.push(opportunity);
        Ok(())
    }

    pub fn retract(&self, id: &str) -> AppResult<bool> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|opportunity| opportunity.id != id);
        Ok(guard.len() < before)
    }

    pub fn list(&self) -> AppResult<Vec<Opportunity>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.lock()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::{LeadStore, OpportunityStore};
    use crate::errors::AppError;
    use crate::models::{Lead, LeadPatch, LeadStatus, Opportunity, OpportunityStage};
    use chrono::Utc;

    fn lead(id: &str, email: &str) -> Lead {
        Lead {
            id: id.to_string(),
            name: "Jane Doe".to_string(),
            company: "Acme".to_string(),
            email: email.to_string(),
            source: "Web".to_string(),
            score: 80,
            status: LeadStatus::New,
        }
    }

    #[test]
    fn update_patches_only_given_fields() {
        let store = LeadStore::new();
        store.replace_all(vec![lead("1", "a@b.com")]).expect("seed");

        let updated = store
            .update(
                "1",
                &LeadPatch {
                    status: Some(LeadStatus::Qualified),
                    email: None,
                },
            )
            .expect("update");

        assert_eq!(updated.status, LeadStatus::Qualified);
        assert_eq!(updated.email, "a@b.com");
        assert_eq!(updated.name, "Jane Doe");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let store = LeadStore::new();
        store.replace_all(vec![lead("1", "a@b.com")]).expect("seed");

        let err = store
            .update("missing", &LeadPatch::default())
            .expect_err("must fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn restore_replaces_whole_entity() {
        let store = LeadStore::new();
        let snapshot = lead("1", "a@b.com");
        store.replace_all(vec![snapshot.clone()]).expect("seed");
        store
            .update(
                "1",
                &LeadPatch {
                    status: Some(LeadStatus::Converted),
                    email: Some("c@d.com".to_string()),
                },
            )
            .expect("update");

        store.restore(snapshot.clone()).expect("restore");
        let restored = store.get("1").expect("get").expect("present");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn restore_missing_target_is_a_no_op() {
        let store = LeadStore::new();
        store.replace_all(vec![lead("1", "a@b.com")]).expect("seed");
        store.restore(lead("ghost", "g@h.com")).expect("restore");
        assert_eq!(store.len().expect("len"), 1);
    }

    #[test]
    fn opportunities_append_and_retract() {
        let store = OpportunityStore::new();
        let opportunity = Opportunity {
            id: "opp-1".to_string(),
            name: "Acme - Jane Doe".to_string(),
            stage: OpportunityStage::Prospecting,
            amount: None,
            account_name: "Acme".to_string(),
            created_at: Utc::now(),
        };

        store.append(opportunity.clone()).expect("append");
        assert_eq!(store.len().expect("len"), 1);

        assert!(store.retract("opp-1").expect("retract"));
        assert_eq!(store.len().expect("len"), 0);
        assert!(!store.retract("opp-1").expect("second retract"));
    }
}
