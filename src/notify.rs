use crate::errors::{AppError, AppResult};
use crate::models::Notification;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Dismissible, user-visible error notifications. The presentation layer
/// renders these as toasts and dismisses them by id; nothing here blocks.
#[derive(Clone, Default)]
pub struct Notifier {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Vec<Notification>>> {
        self.entries
            .lock()
            .map_err(|_| AppError::Internal("notifier mutex poisoned".to_string()))
    }

    pub fn push(&self, message: impl Into<String>) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            created_at: Utc::now(),
        };
        self.lock()?.push(notification.clone());
        Ok(notification)
    }

    pub fn dismiss(&self, id: &str) -> AppResult<bool> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|entry| entry.id != id);
        Ok(guard.len() < before)
    }

    pub fn list(&self) -> AppResult<Vec<Notification>> {
        Ok(self.lock()?.clone())
    }

    pub fn len(&self) -> AppResult<usize> {
        Ok(self.lock()?.len())
    }
}
