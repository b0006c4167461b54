use crate::errors::{AppError, AppResult};
use crate::models::{EditForm, Lead, LeadPatch, LeadStatus, Opportunity, OpportunityStage};
use crate::notify::Notifier;
use crate::remote::RemoteService;
use crate::store::{LeadStore, OpportunityStore};
use crate::validation::is_valid_email;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Duration;
use uuid::Uuid;

const SAVE_DELAY: Duration = Duration::from_millis(500);
const CONVERT_DELAY: Duration = Duration::from_millis(800);

const EMAIL_ERROR_MESSAGE: &str = "Please enter a valid email address";

#[derive(Debug, Clone)]
struct DetailSession {
    lead_id: String,
    edit: Option<EditForm>,
    email_error: Option<String>,
    saving: bool,
}

impl DetailSession {
    fn new(lead_id: String) -> Self {
        Self {
            lead_id,
            edit: None,
            email_error: None,
            saving: false,
        }
    }
}

/// Lead-detail session controller. Mutations here are optimistic: the store is
/// updated and the session leaves editing mode before the remote call settles,
/// and a failure reverts the store from the snapshot captured at mutation time.
#[derive(Clone)]
pub struct DetailPanel {
    leads: LeadStore,
    opportunities: OpportunityStore,
    remote: Arc<dyn RemoteService>,
    notifier: Notifier,
    session: Arc<Mutex<Option<DetailSession>>>,
}

impl DetailPanel {
    pub fn new(
        leads: LeadStore,
        opportunities: OpportunityStore,
        remote: Arc<dyn RemoteService>,
        notifier: Notifier,
    ) -> Self {
        Self {
            leads,
            opportunities,
            remote,
            notifier,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_session(&self) -> AppResult<MutexGuard<'_, Option<DetailSession>>> {
        self.session
            .lock()
            .map_err(|_| AppError::Internal("detail session mutex poisoned".to_string()))
    }

    pub fn open(&self, lead_id: &str) -> AppResult<Lead> {
        let lead = self
            .leads
            .get(lead_id)?
            .ok_or_else(|| AppError::NotFound(format!("No lead with id {lead_id}")))?;
        let mut guard = self.lock_session()?;
        *guard = Some(DetailSession::new(lead.id.clone()));
        Ok(lead)
    }

    pub fn close(&self) -> AppResult<()> {
        let mut guard = self.lock_session()?;
        *guard = None;
        Ok(())
    }

    pub fn selected_lead(&self) -> AppResult<Option<Lead>> {
        let lead_id = {
            let guard = self.lock_session()?;
            guard.as_ref().map(|session| session.lead_id.clone())
        };
        match lead_id {
            Some(id) => self.leads.get(&id),
            None => Ok(None),
        }
    }

    pub fn is_editing(&self) -> AppResult<bool> {
        Ok(self
            .lock_session()?
            .as_ref()
            .is_some_and(|session| session.edit.is_some()))
    }

    pub fn is_saving(&self) -> AppResult<bool> {
        Ok(self
            .lock_session()?
            .as_ref()
            .is_some_and(|session| session.saving))
    }

    pub fn email_error(&self) -> AppResult<Option<String>> {
        Ok(self
            .lock_session()?
            .as_ref()
            .and_then(|session| session.email_error.clone()))
    }

    /// Enters editing mode on the open lead, capturing a working copy of the
    /// editable fields and clearing any stale validation error. Converted
    /// leads are read-only.
    pub fn begin_edit(&self) -> AppResult<EditForm> {
        let lead = self
            .selected_lead()?
            .ok_or_else(|| AppError::NotFound("No open lead detail session".to_string()))?;
        if lead.status == LeadStatus::Converted {
            return Err(AppError::Validation(
                "Converted leads can no longer be edited".to_string(),
            ));
        }

        let form = EditForm {
            status: lead.status,
            email: lead.email.clone(),
        };
        let mut guard = self.lock_session()?;
        if let Some(session) = guard.as_mut() {
            session.edit = Some(form.clone());
            session.email_error = None;
        }
        Ok(form)
    }

    pub fn cancel_edit(&self) -> AppResult<()> {
        let mut guard = self.lock_session()?;
        if let Some(session) = guard.as_mut() {
            session.edit = None;
            session.email_error = None;
        }
        Ok(())
    }

    /// Optimistic save: validate locally, commit to the store, leave editing
    /// mode, then confirm remotely. A remote failure restores the pre-edit
    /// snapshot and surfaces one notification.
    pub async fn save(&self, patch: LeadPatch) -> AppResult<Lead> {
        let (lead_id, snapshot) = {
            let mut guard = self.lock_session()?;
            let session = guard
                .as_mut()
                .ok_or_else(|| AppError::NotFound("No open lead detail session".to_string()))?;
            if session.saving {
                return Err(AppError::Busy("A save is already in flight".to_string()));
            }
            if session.edit.is_none() {
                return Err(AppError::Validation(
                    "Lead detail is not in editing mode".to_string(),
                ));
            }

            // Local check only; nothing is sent remotely for invalid input.
            if let Some(email) = &patch.email {
                if !is_valid_email(email) {
                    session.email_error = Some(EMAIL_ERROR_MESSAGE.to_string());
                    return Err(AppError::Validation(EMAIL_ERROR_MESSAGE.to_string()));
                }
            }

            let lead_id = session.lead_id.clone();
            let snapshot = self
                .leads
                .get(&lead_id)?
                .ok_or_else(|| AppError::NotFound(format!("No lead with id {lead_id}")))?;
            (lead_id, snapshot)
        };

        let updated = self.leads.update(&lead_id, &patch)?;
        {
            let mut guard = self.lock_session()?;
            if let Some(session) = guard.as_mut() {
                if session.lead_id == lead_id {
                    session.edit = None;
                    session.email_error = None;
                    session.saving = true;
                }
            }
        }

        let outcome = self
            .remote
            .call(serde_json::to_value(&updated)?, SAVE_DELAY)
            .await;
        self.clear_saving(&lead_id)?;

        match outcome {
            Ok(_) => Ok(updated),
            Err(err) => {
                let reason = err.user_message();
                self.rollback_lead(snapshot, &reason)?;
                Err(AppError::RemoteMutation(reason))
            }
        }
    }

    /// Converts the open lead into an opportunity. The append, the status
    /// flip, and the panel close all happen before the remote call; a failure
    /// restores the lead snapshot and retracts the appended opportunity.
    pub async fn convert(&self) -> AppResult<Opportunity> {
        let snapshot = {
            let guard = self.lock_session()?;
            let session = guard
                .as_ref()
                .ok_or_else(|| AppError::NotFound("No open lead detail session".to_string()))?;
            let lead_id = session.lead_id.clone();
            drop(guard);
            self.leads
                .get(&lead_id)?
                .ok_or_else(|| AppError::NotFound(format!("No lead with id {lead_id}")))?
        };
        if snapshot.status == LeadStatus::Converted {
            return Err(AppError::Validation(
                "Lead is already converted".to_string(),
            ));
        }

        let opportunity = Opportunity {
            id: format!("opp-{}", Uuid::new_v4()),
            name: format!("{} - {}", snapshot.company, snapshot.name),
            stage: OpportunityStage::Prospecting,
            amount: None,
            account_name: snapshot.company.clone(),
            created_at: Utc::now(),
        };

        self.opportunities.append(opportunity.clone())?;
        self.leads.update(
            &snapshot.id,
            &LeadPatch {
                status: Some(LeadStatus::Converted),
                email: None,
            },
        )?;
        self.close()?;

        let outcome = self
            .remote
            .call(serde_json::to_value(&opportunity)?, CONVERT_DELAY)
            .await;

        match outcome {
            Ok(_) => Ok(opportunity),
            Err(err) => {
                let reason = err.user_message();
                self.opportunities.retract(&opportunity.id)?;
                self.rollback_lead(snapshot, &reason)?;
                Err(AppError::RemoteMutation(reason))
            }
        }
    }

    // Compensation takes the snapshot explicitly so the rollback contract is
    // independent of whatever the store holds by the time the failure lands.
    fn rollback_lead(&self, snapshot: Lead, reason: &str) -> AppResult<()> {
        tracing::warn!(lead_id = %snapshot.id, reason, "reverting optimistic lead mutation");
        self.leads.restore(snapshot)?;
        self.notifier.push(reason)?;
        Ok(())
    }

    fn clear_saving(&self, lead_id: &str) -> AppResult<()> {
        let mut guard = self.lock_session()?;
        if let Some(session) = guard.as_mut() {
            if session.lead_id == lead_id {
                session.saving = false;
            }
        }
        Ok(())
    }
}
