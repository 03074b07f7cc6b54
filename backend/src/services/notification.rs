//! Notification service for the shared pharmacy activity feed
//!
//! Supports:
//! - In-app notification listing and read tracking
//! - Stock level alerts after deductions

use std::sync::Arc;

use chrono::NaiveDate;
use shared::{Drug, InventoryStatus, Notification, NotificationKind};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppResult;
use crate::store::PharmacyStore;

/// Notification service for the activity feed
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn PharmacyStore>,
    stock_alerts_enabled: bool,
}

impl NotificationService {
    pub fn new(store: Arc<dyn PharmacyStore>, config: &Config) -> Self {
        Self {
            store,
            stock_alerts_enabled: config.pharmacy.low_stock_notifications,
        }
    }

    /// Append an entry to the feed
    pub fn notify(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        entity_id: Option<Uuid>,
    ) -> AppResult<Notification> {
        let notification = Notification::new(kind, title, message, entity_id);
        self.store.push_notification(notification.clone())?;
        tracing::debug!(kind = ?notification.kind, title = %notification.title, "notification recorded");
        Ok(notification)
    }

    /// Flag drugs that are now low or out of stock.
    ///
    /// Returns the ids of flagged drugs. Feed entries are only written when
    /// stock alerts are enabled.
    pub fn alert_stock_levels(&self, drugs: &[Drug], today: NaiveDate) -> AppResult<Vec<Uuid>> {
        let mut flagged = Vec::new();

        for drug in drugs {
            let (kind, title) = match drug.status(today) {
                InventoryStatus::OutOfStock => (NotificationKind::OutOfStock, "Out of stock"),
                InventoryStatus::LowStock => (NotificationKind::LowStock, "Low stock"),
                _ => continue,
            };
            flagged.push(drug.id);

            if self.stock_alerts_enabled {
                self.notify(
                    kind,
                    title,
                    format!(
                        "{} has {} units left (reorder level {})",
                        drug.name, drug.quantity, drug.reorder_level
                    ),
                    Some(drug.id),
                )?;
            }
            tracing::info!(drug_id = %drug.id, drug = %drug.name, quantity = drug.quantity, "stock below reorder level");
        }

        Ok(flagged)
    }

    /// List feed entries in the order they were recorded
    pub fn list(&self, unread_only: bool) -> AppResult<Vec<Notification>> {
        let notifications = self.store.notifications()?;
        Ok(notifications
            .into_iter()
            .filter(|n| !unread_only || !n.is_read)
            .collect())
    }

    pub fn unread_count(&self) -> AppResult<usize> {
        Ok(self.list(true)?.len())
    }

    pub fn mark_read(&self, notification_id: Uuid) -> AppResult<Notification> {
        Ok(self.store.mark_notification_read(notification_id)?)
    }

    pub fn mark_all_read(&self) -> AppResult<usize> {
        Ok(self.store.mark_all_notifications_read()?)
    }
}
