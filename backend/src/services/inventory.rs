//! Inventory management service for the drug catalog, stock movements and
//! stock status listings

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    paginate, validate_required, validate_stock_movement, validate_unit_price, Drug, DrugFilter,
    InventoryStatus, NotificationKind, PaginatedResponse, Pagination,
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{today, NotificationService};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{PharmacyStore, StockDeduction, StockReceipt};

/// Inventory service for managing the drug catalog
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn PharmacyStore>,
    config: Arc<Config>,
    notifications: NotificationService,
}

/// Drug with its derived stock status
#[derive(Debug, Clone, Serialize)]
pub struct DrugView {
    #[serde(flatten)]
    pub drug: Drug,
    pub status: InventoryStatus,
}

impl DrugView {
    fn new(drug: Drug, today: NaiveDate) -> Self {
        let status = drug.status(today);
        Self { drug, status }
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    validate_unit_price(*price).map_err(|_| ValidationError::new("unit_price_out_of_range"))
}

/// Input for adding a drug to the catalog
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDrugInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub generic_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(custom = "validate_price")]
    pub unit_price: Decimal,
    pub quantity: u32,
    pub reorder_level: u32,
    pub expiry_date: NaiveDate,
    pub batch_number: Option<String>,
    pub supplier: Option<String>,
}

/// Input for editing a drug; absent fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateDrugInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub generic_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(custom = "validate_price")]
    pub unit_price: Option<Decimal>,
    pub reorder_level: Option<u32>,
    pub expiry_date: Option<NaiveDate>,
    pub batch_number: Option<String>,
    pub supplier: Option<String>,
}

/// Input for receiving stock
#[derive(Debug, Deserialize, Validate)]
pub struct RestockInput {
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub batch_number: Option<String>,
    /// New expiry date for the received batch
    pub expiry_date: Option<NaiveDate>,
}

/// Input for writing stock off (expired, damaged, recalled)
#[derive(Debug, Deserialize, Validate)]
pub struct DisposeInput {
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

/// Counts of catalog entries per stock status
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InventorySummary {
    pub total_drugs: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expired: usize,
    pub expiring_soon: usize,
    /// Value of non-expired stock
    pub stock_value: Decimal,
    pub currency: String,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(store: Arc<dyn PharmacyStore>, config: Arc<Config>) -> Self {
        let notifications = NotificationService::new(store.clone(), &config);
        Self {
            store,
            config,
            notifications,
        }
    }

    /// List drugs matching `filter`, one page at a time
    pub fn list_drugs(
        &self,
        filter: &DrugFilter,
        pagination: &Pagination,
    ) -> AppResult<PaginatedResponse<DrugView>> {
        let today = today();
        let pagination = pagination.normalized(self.config.pharmacy.max_per_page);
        let matching: Vec<DrugView> = self
            .store
            .drugs()?
            .into_iter()
            .filter(|d| filter.matches(d, today))
            .map(|d| DrugView::new(d, today))
            .collect();

        tracing::debug!(matches = matching.len(), ?filter, "listing drugs");
        Ok(paginate(matching, &pagination))
    }

    pub fn get_drug(&self, drug_id: Uuid) -> AppResult<DrugView> {
        Ok(DrugView::new(self.store.drug(drug_id)?, today()))
    }

    /// Add a drug to the catalog
    pub fn add_drug(&self, input: CreateDrugInput) -> AppResult<DrugView> {
        input.validate()?;
        validate_required(&input.name).map_err(|e| AppError::validation("name", e))?;
        validate_required(&input.category).map_err(|e| AppError::validation("category", e))?;

        let now = Utc::now();
        let drug = Drug {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            generic_name: input.generic_name,
            category: input.category.trim().to_string(),
            unit_price: input.unit_price,
            quantity: input.quantity,
            reorder_level: input.reorder_level,
            expiry_date: input.expiry_date,
            batch_number: input.batch_number,
            supplier: input.supplier,
            created_at: now,
            updated_at: now,
        };
        let drug = self.store.insert_drug(drug)?;

        self.notifications.notify(
            NotificationKind::InventoryChange,
            "Drug added",
            format!("{} added with {} units", drug.name, drug.quantity),
            Some(drug.id),
        )?;
        tracing::info!(drug_id = %drug.id, drug = %drug.name, "drug added");

        Ok(DrugView::new(drug, today()))
    }

    /// Edit catalog details. Stock levels change only through restock, dispose and sales.
    pub fn update_drug(&self, drug_id: Uuid, input: UpdateDrugInput) -> AppResult<DrugView> {
        input.validate()?;
        let mut drug = self.store.drug(drug_id)?;

        if let Some(name) = input.name {
            validate_required(&name).map_err(|e| AppError::validation("name", e))?;
            drug.name = name.trim().to_string();
        }
        if let Some(category) = input.category {
            validate_required(&category).map_err(|e| AppError::validation("category", e))?;
            drug.category = category.trim().to_string();
        }
        if input.generic_name.is_some() {
            drug.generic_name = input.generic_name;
        }
        if let Some(price) = input.unit_price {
            drug.unit_price = price;
        }
        if let Some(reorder_level) = input.reorder_level {
            drug.reorder_level = reorder_level;
        }
        if let Some(expiry_date) = input.expiry_date {
            drug.expiry_date = expiry_date;
        }
        if input.batch_number.is_some() {
            drug.batch_number = input.batch_number;
        }
        if input.supplier.is_some() {
            drug.supplier = input.supplier;
        }
        drug.updated_at = Utc::now();

        let drug = self.store.update_drug(drug)?;
        self.notifications.notify(
            NotificationKind::InventoryChange,
            "Drug updated",
            format!("{} details updated", drug.name),
            Some(drug.id),
        )?;

        Ok(DrugView::new(drug, today()))
    }

    pub fn delete_drug(&self, drug_id: Uuid) -> AppResult<()> {
        let drug = self.store.delete_drug(drug_id)?;
        self.notifications.notify(
            NotificationKind::InventoryChange,
            "Drug removed",
            format!("{} removed from inventory", drug.name),
            Some(drug.id),
        )?;
        tracing::info!(drug_id = %drug.id, drug = %drug.name, "drug deleted");
        Ok(())
    }

    /// Receive stock for a drug
    pub fn restock(&self, drug_id: Uuid, input: RestockInput) -> AppResult<DrugView> {
        input.validate()?;
        validate_stock_movement(input.quantity).map_err(|e| AppError::validation("quantity", e))?;

        let receipt = StockReceipt {
            quantity: input.quantity,
            batch_number: input.batch_number,
            expiry_date: input.expiry_date,
        };
        let drug = self.store.restock(drug_id, &receipt)?;
        self.notifications.notify(
            NotificationKind::InventoryChange,
            "Stock received",
            format!("{} restocked by {} (now {})", drug.name, input.quantity, drug.quantity),
            Some(drug.id),
        )?;
        tracing::info!(drug_id = %drug.id, added = input.quantity, quantity = drug.quantity, "drug restocked");

        Ok(DrugView::new(drug, today()))
    }

    /// Write off stock
    pub fn dispose(&self, drug_id: Uuid, input: DisposeInput) -> AppResult<DrugView> {
        input.validate()?;
        validate_required(&input.reason).map_err(|e| AppError::validation("reason", e))?;

        let updated = self.store.deduct_stock(&[StockDeduction {
            drug_id,
            quantity: input.quantity,
        }])?;
        let drug = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Drug".to_string()))?;

        self.notifications.notify(
            NotificationKind::InventoryChange,
            "Stock disposed",
            format!("{} units of {} disposed: {}", input.quantity, drug.name, input.reason.trim()),
            Some(drug.id),
        )?;
        tracing::info!(drug_id = %drug.id, removed = input.quantity, reason = %input.reason, "drug disposed");

        let today = today();
        self.notifications.alert_stock_levels(std::slice::from_ref(&drug), today)?;
        Ok(DrugView::new(drug, today))
    }

    /// Drugs below their reorder threshold, including those out of stock
    pub fn low_stock(&self) -> AppResult<Vec<DrugView>> {
        let today = today();
        Ok(self
            .store
            .drugs()?
            .into_iter()
            .map(|d| DrugView::new(d, today))
            .filter(|v| v.status.needs_reorder())
            .collect())
    }

    pub fn expired(&self) -> AppResult<Vec<DrugView>> {
        let today = today();
        Ok(self
            .store
            .drugs()?
            .into_iter()
            .map(|d| DrugView::new(d, today))
            .filter(|v| v.status == InventoryStatus::Expired)
            .collect())
    }

    /// Drugs expiring within `days` (configured window when `None`), soonest first
    pub fn expiring_within(&self, days: Option<u32>) -> AppResult<Vec<DrugView>> {
        let today = today();
        let days = days.unwrap_or(self.config.pharmacy.expiry_warning_days);
        let mut drugs: Vec<DrugView> = self
            .store
            .drugs()?
            .into_iter()
            .filter(|d| d.expires_within(today, days))
            .map(|d| DrugView::new(d, today))
            .collect();
        drugs.sort_by_key(|v| v.drug.expiry_date);
        Ok(drugs)
    }

    pub fn summary(&self) -> AppResult<InventorySummary> {
        let today = today();
        let drugs = self.store.drugs()?;
        let mut summary = InventorySummary {
            total_drugs: drugs.len(),
            in_stock: 0,
            low_stock: 0,
            out_of_stock: 0,
            expired: 0,
            expiring_soon: 0,
            stock_value: Decimal::ZERO,
            currency: self.config.pharmacy.currency.clone(),
        };

        for drug in &drugs {
            match drug.status(today) {
                InventoryStatus::InStock => summary.in_stock += 1,
                InventoryStatus::LowStock => summary.low_stock += 1,
                InventoryStatus::OutOfStock => summary.out_of_stock += 1,
                InventoryStatus::Expired => {
                    summary.expired += 1;
                    continue;
                }
            }
            if drug.expires_within(today, self.config.pharmacy.expiry_warning_days) {
                summary.expiring_soon += 1;
            }
            summary.stock_value = summary.stock_value.saturating_add(drug.stock_value());
        }

        Ok(summary)
    }
}
