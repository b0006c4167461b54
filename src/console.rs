use crate::errors::{AppError, AppResult};
use crate::models::{
    EditForm, Lead, LeadPatch, Notification, Opportunity, SortKey, StatusFilter, UiPreferences,
};
use crate::notify::Notifier;
use crate::panel::DetailPanel;
use crate::prefs::PreferenceStore;
use crate::projection::project;
use crate::remote::RemoteService;
use crate::seed;
use crate::store::{LeadStore, OpportunityStore};
use std::path::Path;
use std::sync::Arc;
use tokio::time::Duration;

const LOAD_DELAY: Duration = Duration::from_millis(800);
const PREFS_DB_FILE: &str = "prefs.sqlite";

/// Composition root and app-facing API. A presentation layer calls these
/// methods and renders whatever the stores hold; nothing in here blocks the
/// caller beyond the awaited remote stub.
pub struct ConsoleCore {
    prefs: PreferenceStore,
    leads: LeadStore,
    opportunities: OpportunityStore,
    notifier: Notifier,
    panel: DetailPanel,
    remote: Arc<dyn RemoteService>,
}

impl ConsoleCore {
    pub fn new(data_dir: &Path, remote: Arc<dyn RemoteService>) -> AppResult<Self> {
        let prefs = PreferenceStore::open(&data_dir.join(PREFS_DB_FILE))?;
        let leads = LeadStore::new();
        let opportunities = OpportunityStore::new();
        let notifier = Notifier::new();
        let panel = DetailPanel::new(
            leads.clone(),
            opportunities.clone(),
            remote.clone(),
            notifier.clone(),
        );

        Ok(Self {
            prefs,
            leads,
            opportunities,
            notifier,
            panel,
            remote,
        })
    }

    /// Fetches the lead list through the remote stub. A failure before any
    /// leads exist is fatal-to-view (the UI shows a blocking retry screen and
    /// calls this again); once leads are present a failed refresh only
    /// degrades to a notification.
    pub async fn load_leads(&self) -> AppResult<Vec<Lead>> {
        let payload = serde_json::to_value(seed::seed_leads())?;
        match self.remote.call(payload, LOAD_DELAY).await {
            Ok(value) => {
                let leads: Vec<Lead> = serde_json::from_value(value)?;
                self.leads.replace_all(leads.clone())?;
                tracing::info!(count = leads.len(), "lead list loaded");
                Ok(leads)
            }
            Err(err) => {
                let reason = err.user_message();
                if self.leads.is_empty()? {
                    tracing::warn!(error = %err, "initial lead load failed");
                    Err(AppError::Load(reason))
                } else {
                    tracing::warn!(error = %err, "lead refresh failed; keeping previous list");
                    self.notifier.push(reason)?;
                    self.leads.list()
                }
            }
        }
    }

    /// The filtered, sorted projection for the current preferences.
    pub fn visible_leads(&self) -> AppResult<Vec<Lead>> {
        let prefs = self.prefs.load()?;
        let leads = self.leads.list()?;
        Ok(project(
            &leads,
            &prefs.search_term,
            prefs.status_filter,
            prefs.sort_by,
        ))
    }

    pub fn preferences(&self) -> AppResult<UiPreferences> {
        self.prefs.load()
    }

    pub fn set_search_term(&self, term: &str) -> AppResult<()> {
        self.prefs.set_search_term(term)
    }

    pub fn set_status_filter(&self, filter: StatusFilter) -> AppResult<()> {
        self.prefs.set_status_filter(filter)
    }

    pub fn set_sort_by(&self, sort_by: SortKey) -> AppResult<()> {
        self.prefs.set_sort_by(sort_by)
    }

    /// The sort button flips between the two keys.
    pub fn toggle_sort_by(&self) -> AppResult<SortKey> {
        let next = match self.prefs.load()?.sort_by {
            SortKey::Score => SortKey::Name,
            SortKey::Name => SortKey::Score,
        };
        self.prefs.set_sort_by(next)?;
        Ok(next)
    }

    pub fn lead_count(&self) -> AppResult<usize> {
        self.leads.len()
    }

    pub fn opportunity_count(&self) -> AppResult<usize> {
        self.opportunities.len()
    }

    pub fn opportunities(&self) -> AppResult<Vec<Opportunity>> {
        self.opportunities.list()
    }

    pub fn notifications(&self) -> AppResult<Vec<Notification>> {
        self.notifier.list()
    }

    pub fn dismiss_notification(&self, id: &str) -> AppResult<bool> {
        self.notifier.dismiss(id)
    }

    pub fn open_lead(&self, lead_id: &str) -> AppResult<Lead> {
        self.panel.open(lead_id)
    }

    pub fn close_panel(&self) -> AppResult<()> {
        self.panel.close()
    }

    pub fn selected_lead(&self) -> AppResult<Option<Lead>> {
        self.panel.selected_lead()
    }

    pub fn begin_edit(&self) -> AppResult<EditForm> {
        self.panel.begin_edit()
    }

    pub fn cancel_edit(&self) -> AppResult<()> {
        self.panel.cancel_edit()
    }

    pub fn email_error(&self) -> AppResult<Option<String>> {
        self.panel.email_error()
    }

    pub async fn save_lead(&self, patch: LeadPatch) -> AppResult<Lead> {
        self.panel.save(patch).await
    }

    pub async fn convert_lead(&self) -> AppResult<Opportunity> {
        self.panel.convert().await
    }
}

#[cfg(test)]
mod tests {
    use super::ConsoleCore;
    use crate::errors::{AppError, AppResult};
    use crate::models::{SortKey, StatusFilter};
    use crate::remote::{RemoteFuture, RemoteService, NETWORK_ERROR_MESSAGE};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::Duration;

    /// Settles immediately; flips between failing and succeeding on demand.
    struct SwitchableRemote {
        failing: Arc<AtomicBool>,
    }

    impl RemoteService for SwitchableRemote {
        fn call(&self, payload: serde_json::Value, _delay: Duration) -> RemoteFuture {
            let failing = self.failing.load(Ordering::SeqCst);
            Box::pin(async move {
                if failing {
                    Err(AppError::Network(NETWORK_ERROR_MESSAGE.to_string()))
                } else {
                    Ok(payload)
                }
            })
        }
    }

    fn console(failing: Arc<AtomicBool>) -> AppResult<(ConsoleCore, tempfile::TempDir)> {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = ConsoleCore::new(dir.path(), Arc::new(SwitchableRemote { failing }))?;
        Ok((core, dir))
    }

    #[tokio::test]
    async fn load_populates_the_store() {
        let (core, _dir) = console(Arc::new(AtomicBool::new(false))).expect("console");
        let leads = core.load_leads().await.expect("load");
        assert!(!leads.is_empty());
        assert_eq!(core.lead_count().expect("count"), leads.len());
    }

    #[tokio::test]
    async fn initial_load_failure_is_fatal_until_retried() {
        let failing = Arc::new(AtomicBool::new(true));
        let (core, _dir) = console(failing.clone()).expect("console");

        let err = core.load_leads().await.expect_err("load must fail");
        assert!(matches!(err, AppError::Load(_)));
        assert_eq!(core.lead_count().expect("count"), 0);

        // The retry action is simply another load.
        failing.store(false, Ordering::SeqCst);
        let leads = core.load_leads().await.expect("retry");
        assert!(!leads.is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_previous_leads_and_notifies() {
        let failing = Arc::new(AtomicBool::new(false));
        let (core, _dir) = console(failing.clone()).expect("console");
        let loaded = core.load_leads().await.expect("load");

        failing.store(true, Ordering::SeqCst);
        let kept = core.load_leads().await.expect("degraded refresh");
        assert_eq!(kept, loaded);
        assert_eq!(core.notifications().expect("notifications").len(), 1);
    }

    #[tokio::test]
    async fn visible_leads_follow_persisted_preferences() {
        let (core, _dir) = console(Arc::new(AtomicBool::new(false))).expect("console");
        core.load_leads().await.expect("load");

        core.set_search_term("acme").expect("search");
        let visible = core.visible_leads().expect("project");
        assert!(visible.iter().all(|l| l.company.to_lowercase().contains("acme")
            || l.name.to_lowercase().contains("acme")
            || l.email.to_lowercase().contains("acme")));
        assert!(!visible.is_empty());

        core.set_search_term("").expect("search");
        core.set_status_filter(StatusFilter::Qualified).expect("filter");
        core.set_sort_by(SortKey::Name).expect("sort");
        let qualified = core.visible_leads().expect("project");
        assert!(qualified.len() >= 2);
        let names = qualified.iter().map(|l| l.name.clone()).collect::<Vec<_>>();
        let mut sorted = names.clone();
        sorted.sort_by_key(|n| n.to_lowercase());
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn toggle_flips_between_sort_keys() {
        let (core, _dir) = console(Arc::new(AtomicBool::new(false))).expect("console");
        assert_eq!(core.preferences().expect("prefs").sort_by, SortKey::Score);
        assert_eq!(core.toggle_sort_by().expect("toggle"), SortKey::Name);
        assert_eq!(core.toggle_sort_by().expect("toggle"), SortKey::Score);
    }
}
