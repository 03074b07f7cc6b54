//! Pharmacy data store
//!
//! Services depend on the [`PharmacyStore`] trait rather than a concrete
//! backend. Multi-entity commands (dispensing, sales, payments) are single
//! trait methods so an implementation can apply them atomically.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, Utc};
use shared::{
    generate_invoice_number, Drug, Invoice, Notification, PaymentMethod, Prescription,
    PrescriptionStatus, TransitionError,
};
use thiserror::Error;
use uuid::Uuid;

/// Store-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: Uuid },

    #[error("Insufficient stock for {drug_name}: {available} available, {requested} requested")]
    InsufficientStock {
        drug_id: Uuid,
        drug_name: String,
        available: u32,
        requested: u32,
    },

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Units to take out of stock for one drug
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDeduction {
    pub drug_id: Uuid,
    pub quantity: u32,
}

/// Stock received for one drug. Batch and expiry, when present, replace the
/// current values in the same commit as the quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReceipt {
    pub quantity: u32,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Outcome of a committed dispensing
#[derive(Debug, Clone)]
pub struct DispenseCommit {
    pub prescription: Prescription,
    pub invoice: Invoice,
    /// Drugs after deduction
    pub drugs: Vec<Drug>,
}

/// Outcome of a committed counter sale
#[derive(Debug, Clone)]
pub struct SaleCommit {
    pub invoice: Invoice,
    pub drugs: Vec<Drug>,
}

/// Repository for all pharmacy entities
pub trait PharmacyStore: Send + Sync {
    // Drugs
    fn drugs(&self) -> StoreResult<Vec<Drug>>;
    fn drug(&self, id: Uuid) -> StoreResult<Drug>;
    fn insert_drug(&self, drug: Drug) -> StoreResult<Drug>;
    /// Replace catalog details. The stored quantity is kept.
    fn update_drug(&self, drug: Drug) -> StoreResult<Drug>;
    fn delete_drug(&self, id: Uuid) -> StoreResult<Drug>;
    fn restock(&self, id: Uuid, receipt: &StockReceipt) -> StoreResult<Drug>;
    /// Apply every deduction or none of them
    fn deduct_stock(&self, deductions: &[StockDeduction]) -> StoreResult<Vec<Drug>>;

    // Prescriptions
    fn prescriptions(&self) -> StoreResult<Vec<Prescription>>;
    fn prescription(&self, id: Uuid) -> StoreResult<Prescription>;
    fn insert_prescription(&self, prescription: Prescription) -> StoreResult<Prescription>;
    fn advance_prescription(&self, id: Uuid, to: PrescriptionStatus) -> StoreResult<Prescription>;

    /// Move a pending prescription to processing, deduct its stock and raise its invoice.
    /// The invoice number is assigned by the store.
    fn commit_dispense(
        &self,
        prescription_id: Uuid,
        deductions: &[StockDeduction],
        invoice: Invoice,
    ) -> StoreResult<DispenseCommit>;

    /// Move a processing prescription to paid and settle its invoice
    fn record_payment(
        &self,
        prescription_id: Uuid,
        method: PaymentMethod,
    ) -> StoreResult<(Prescription, Invoice)>;

    // Counter sales
    fn commit_sale(&self, deductions: &[StockDeduction], invoice: Invoice) -> StoreResult<SaleCommit>;

    // Invoices
    fn invoices(&self) -> StoreResult<Vec<Invoice>>;
    fn invoice(&self, id: Uuid) -> StoreResult<Invoice>;

    // Notifications
    fn push_notification(&self, notification: Notification) -> StoreResult<()>;
    fn notifications(&self) -> StoreResult<Vec<Notification>>;
    fn mark_notification_read(&self, id: Uuid) -> StoreResult<Notification>;
    fn mark_all_notifications_read(&self) -> StoreResult<usize>;
}

#[derive(Default)]
struct StoreState {
    drugs: HashMap<Uuid, Drug>,
    prescriptions: HashMap<Uuid, Prescription>,
    /// Insertion order
    invoices: Vec<Invoice>,
    invoice_sequences: HashMap<NaiveDate, u32>,
    /// Insertion order
    notifications: Vec<Notification>,
}

impl StoreState {
    fn check_deductions(&self, deductions: &[StockDeduction]) -> StoreResult<()> {
        let mut requested: HashMap<Uuid, u32> = HashMap::new();
        for d in deductions {
            let total = requested.entry(d.drug_id).or_insert(0);
            *total = total.saturating_add(d.quantity);
        }

        for (drug_id, quantity) in requested {
            let drug = self.drugs.get(&drug_id).ok_or(StoreError::NotFound {
                entity: "Drug",
                id: drug_id,
            })?;
            if drug.quantity < quantity {
                return Err(StoreError::InsufficientStock {
                    drug_id,
                    drug_name: drug.name.clone(),
                    available: drug.quantity,
                    requested: quantity,
                });
            }
        }
        Ok(())
    }

    /// Callers must run `check_deductions` first
    fn apply_deductions(&mut self, deductions: &[StockDeduction]) -> Vec<Drug> {
        let now = Utc::now();
        let mut touched: Vec<Uuid> = Vec::new();
        for d in deductions {
            if let Some(drug) = self.drugs.get_mut(&d.drug_id) {
                drug.quantity = drug.quantity.saturating_sub(d.quantity);
                drug.updated_at = now;
                if !touched.contains(&d.drug_id) {
                    touched.push(d.drug_id);
                }
            }
        }
        touched
            .into_iter()
            .filter_map(|id| self.drugs.get(&id).cloned())
            .collect()
    }

    fn issue_invoice(&mut self, mut invoice: Invoice) -> Invoice {
        let sequence = self
            .invoice_sequences
            .entry(invoice.issued_on)
            .and_modify(|s| *s += 1)
            .or_insert(1);
        invoice.invoice_number = generate_invoice_number(invoice.issued_on, *sequence);
        self.invoices.push(invoice.clone());
        invoice
    }
}

/// Process-local store backed by maps behind one lock
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

fn drug_not_found(id: Uuid) -> StoreError {
    StoreError::NotFound { entity: "Drug", id }
}

fn prescription_not_found(id: Uuid) -> StoreError {
    StoreError::NotFound {
        entity: "Prescription",
        id,
    }
}

impl PharmacyStore for InMemoryStore {
    fn drugs(&self) -> StoreResult<Vec<Drug>> {
        let state = self.read()?;
        let mut drugs: Vec<Drug> = state.drugs.values().cloned().collect();
        drugs.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(drugs)
    }

    fn drug(&self, id: Uuid) -> StoreResult<Drug> {
        self.read()?.drugs.get(&id).cloned().ok_or(drug_not_found(id))
    }

    fn insert_drug(&self, drug: Drug) -> StoreResult<Drug> {
        let mut state = self.write()?;
        if state.drugs.contains_key(&drug.id) {
            return Err(StoreError::Duplicate {
                entity: "Drug",
                id: drug.id,
            });
        }
        state.drugs.insert(drug.id, drug.clone());
        Ok(drug)
    }

    fn update_drug(&self, drug: Drug) -> StoreResult<Drug> {
        let mut state = self.write()?;
        let slot = state.drugs.get_mut(&drug.id).ok_or(drug_not_found(drug.id))?;
        let quantity = slot.quantity;
        *slot = Drug { quantity, ..drug };
        Ok(slot.clone())
    }

    fn delete_drug(&self, id: Uuid) -> StoreResult<Drug> {
        self.write()?.drugs.remove(&id).ok_or(drug_not_found(id))
    }

    fn restock(&self, id: Uuid, receipt: &StockReceipt) -> StoreResult<Drug> {
        let mut state = self.write()?;
        let drug = state.drugs.get_mut(&id).ok_or(drug_not_found(id))?;
        drug.quantity = drug.quantity.saturating_add(receipt.quantity);
        if let Some(batch_number) = &receipt.batch_number {
            drug.batch_number = Some(batch_number.clone());
        }
        if let Some(expiry_date) = receipt.expiry_date {
            drug.expiry_date = expiry_date;
        }
        drug.updated_at = Utc::now();
        Ok(drug.clone())
    }

    fn deduct_stock(&self, deductions: &[StockDeduction]) -> StoreResult<Vec<Drug>> {
        let mut state = self.write()?;
        state.check_deductions(deductions)?;
        Ok(state.apply_deductions(deductions))
    }

    fn prescriptions(&self) -> StoreResult<Vec<Prescription>> {
        let state = self.read()?;
        let mut prescriptions: Vec<Prescription> = state.prescriptions.values().cloned().collect();
        prescriptions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(prescriptions)
    }

    fn prescription(&self, id: Uuid) -> StoreResult<Prescription> {
        self.read()?
            .prescriptions
            .get(&id)
            .cloned()
            .ok_or(prescription_not_found(id))
    }

    fn insert_prescription(&self, prescription: Prescription) -> StoreResult<Prescription> {
        let mut state = self.write()?;
        if state.prescriptions.contains_key(&prescription.id) {
            return Err(StoreError::Duplicate {
                entity: "Prescription",
                id: prescription.id,
            });
        }
        state.prescriptions.insert(prescription.id, prescription.clone());
        Ok(prescription)
    }

    fn advance_prescription(&self, id: Uuid, to: PrescriptionStatus) -> StoreResult<Prescription> {
        let mut state = self.write()?;
        let prescription = state
            .prescriptions
            .get_mut(&id)
            .ok_or(prescription_not_found(id))?;
        prescription.advance(to)?;
        Ok(prescription.clone())
    }

    fn commit_dispense(
        &self,
        prescription_id: Uuid,
        deductions: &[StockDeduction],
        invoice: Invoice,
    ) -> StoreResult<DispenseCommit> {
        let mut state = self.write()?;

        let current = state
            .prescriptions
            .get(&prescription_id)
            .ok_or(prescription_not_found(prescription_id))?
            .status;
        current.transition(PrescriptionStatus::Processing)?;
        state.check_deductions(deductions)?;

        let drugs = state.apply_deductions(deductions);
        let invoice = state.issue_invoice(invoice);

        let prescription = state
            .prescriptions
            .get_mut(&prescription_id)
            .ok_or(prescription_not_found(prescription_id))?;
        prescription.advance(PrescriptionStatus::Processing)?;
        prescription.invoice_id = Some(invoice.id);

        Ok(DispenseCommit {
            prescription: prescription.clone(),
            invoice,
            drugs,
        })
    }

    fn record_payment(
        &self,
        prescription_id: Uuid,
        method: PaymentMethod,
    ) -> StoreResult<(Prescription, Invoice)> {
        let mut state = self.write()?;

        let prescription = state
            .prescriptions
            .get(&prescription_id)
            .ok_or(prescription_not_found(prescription_id))?;
        prescription.status.transition(PrescriptionStatus::Paid)?;
        let invoice_id = prescription.invoice_id.ok_or(StoreError::NotFound {
            entity: "Invoice",
            id: prescription_id,
        })?;

        let invoice = state
            .invoices
            .iter_mut()
            .find(|i| i.id == invoice_id)
            .ok_or(StoreError::NotFound {
                entity: "Invoice",
                id: invoice_id,
            })?;
        invoice.mark_paid(method);
        let invoice = invoice.clone();

        let prescription = state
            .prescriptions
            .get_mut(&prescription_id)
            .ok_or(prescription_not_found(prescription_id))?;
        prescription.advance(PrescriptionStatus::Paid)?;

        Ok((prescription.clone(), invoice))
    }

    fn commit_sale(&self, deductions: &[StockDeduction], invoice: Invoice) -> StoreResult<SaleCommit> {
        let mut state = self.write()?;
        state.check_deductions(deductions)?;
        let drugs = state.apply_deductions(deductions);
        let invoice = state.issue_invoice(invoice);
        Ok(SaleCommit { invoice, drugs })
    }

    fn invoices(&self) -> StoreResult<Vec<Invoice>> {
        Ok(self.read()?.invoices.clone())
    }

    fn invoice(&self, id: Uuid) -> StoreResult<Invoice> {
        self.read()?
            .invoices
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "Invoice",
                id,
            })
    }

    fn push_notification(&self, notification: Notification) -> StoreResult<()> {
        self.write()?.notifications.push(notification);
        Ok(())
    }

    fn notifications(&self) -> StoreResult<Vec<Notification>> {
        Ok(self.read()?.notifications.clone())
    }

    fn mark_notification_read(&self, id: Uuid) -> StoreResult<Notification> {
        let mut state = self.write()?;
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(StoreError::NotFound {
                entity: "Notification",
                id,
            })?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    fn mark_all_notifications_read(&self) -> StoreResult<usize> {
        let mut state = self.write()?;
        let mut marked = 0;
        for n in state.notifications.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::{InvoiceSource, InvoiceStatus, NotificationKind, PrescribedItem};

    fn drug(name: &str, quantity: u32) -> Drug {
        let now = Utc::now();
        Drug {
            id: Uuid::new_v4(),
            name: name.to_string(),
            generic_name: None,
            category: "General".to_string(),
            unit_price: Decimal::new(100, 2),
            quantity,
            reorder_level: 5,
            expiry_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            batch_number: None,
            supplier: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn prescription(drug_id: Uuid) -> Prescription {
        let now = Utc::now();
        Prescription {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Patient".to_string(),
            prescriber: "Dr. A".to_string(),
            items: vec![PrescribedItem {
                drug_id,
                drug_name: "x".to_string(),
                quantity: 1,
                instructions: None,
            }],
            status: PrescriptionStatus::Pending,
            invoice_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn invoice(source: InvoiceSource) -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            invoice_number: String::new(),
            source,
            customer_name: None,
            lines: vec![],
            subtotal: Decimal::ONE,
            discount_amount: Decimal::ZERO,
            total: Decimal::ONE,
            payment_method: None,
            status: InvoiceStatus::Unpaid,
            issued_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            paid_at: None,
        }
    }

    #[test]
    fn test_deduct_stock_all_or_nothing() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 10)).unwrap();
        let b = store.insert_drug(drug("B", 2)).unwrap();

        let err = store
            .deduct_stock(&[
                StockDeduction {
                    drug_id: a.id,
                    quantity: 5,
                },
                StockDeduction {
                    drug_id: b.id,
                    quantity: 3,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { available: 2, requested: 3, .. }));
        assert_eq!(store.drug(a.id).unwrap().quantity, 10);
        assert_eq!(store.drug(b.id).unwrap().quantity, 2);

        let updated = store
            .deduct_stock(&[StockDeduction {
                drug_id: a.id,
                quantity: 10,
            }])
            .unwrap();
        assert_eq!(updated[0].quantity, 0);
    }

    #[test]
    fn test_deduct_stock_sums_repeated_drug() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 5)).unwrap();
        let d = StockDeduction {
            drug_id: a.id,
            quantity: 3,
        };
        assert!(store.deduct_stock(&[d, d]).is_err());
        assert_eq!(store.drug(a.id).unwrap().quantity, 5);
    }

    #[test]
    fn test_duplicate_drug_rejected() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 5)).unwrap();
        assert!(matches!(
            store.insert_drug(a),
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_commit_dispense_and_payment() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 5)).unwrap();
        let rx = store.insert_prescription(prescription(a.id)).unwrap();

        let commit = store
            .commit_dispense(
                rx.id,
                &[StockDeduction {
                    drug_id: a.id,
                    quantity: 1,
                }],
                invoice(InvoiceSource::Prescription {
                    prescription_id: rx.id,
                }),
            )
            .unwrap();
        assert_eq!(commit.prescription.status, PrescriptionStatus::Processing);
        assert_eq!(commit.prescription.invoice_id, Some(commit.invoice.id));
        assert_eq!(commit.invoice.invoice_number, "INV-20240601-0001");
        assert_eq!(commit.drugs[0].quantity, 4);

        // A second dispense of the same prescription is rejected without touching stock
        let again = store.commit_dispense(
            rx.id,
            &[StockDeduction {
                drug_id: a.id,
                quantity: 1,
            }],
            invoice(InvoiceSource::CounterSale),
        );
        assert!(matches!(again, Err(StoreError::Transition(_))));
        assert_eq!(store.drug(a.id).unwrap().quantity, 4);

        let (paid, invoice) = store.record_payment(rx.id, PaymentMethod::Cash).unwrap();
        assert_eq!(paid.status, PrescriptionStatus::Paid);
        assert!(invoice.is_paid());

        let collected = store
            .advance_prescription(rx.id, PrescriptionStatus::Collected)
            .unwrap();
        assert!(collected.status.is_terminal());
    }

    #[test]
    fn test_restock_updates_batch_and_quantity_together() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 3)).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2100, 6, 30).unwrap();

        let restocked = store
            .restock(
                a.id,
                &StockReceipt {
                    quantity: 7,
                    batch_number: Some("B-7".to_string()),
                    expiry_date: Some(expiry),
                },
            )
            .unwrap();
        assert_eq!(restocked.quantity, 10);
        assert_eq!(restocked.batch_number.as_deref(), Some("B-7"));
        assert_eq!(restocked.expiry_date, expiry);
        assert_eq!(store.drug(a.id).unwrap(), restocked);

        let missing = store.restock(
            Uuid::new_v4(),
            &StockReceipt {
                quantity: 1,
                batch_number: Some("B-8".to_string()),
                expiry_date: None,
            },
        );
        assert!(matches!(missing, Err(StoreError::NotFound { entity: "Drug", .. })));
    }

    #[test]
    fn test_update_drug_keeps_stored_quantity() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 10)).unwrap();
        let stale = a.clone();

        store
            .deduct_stock(&[StockDeduction {
                drug_id: a.id,
                quantity: 4,
            }])
            .unwrap();

        let renamed = store
            .update_drug(Drug {
                name: "A forte".to_string(),
                ..stale
            })
            .unwrap();
        assert_eq!(renamed.name, "A forte");
        assert_eq!(renamed.quantity, 6);
        assert_eq!(store.drug(a.id).unwrap().quantity, 6);
    }

    #[test]
    fn test_repeated_deductions_near_u32_max_are_rejected() {
        let store = InMemoryStore::new();
        let a = store.insert_drug(drug("A", 10)).unwrap();
        let err = store
            .deduct_stock(&[
                StockDeduction {
                    drug_id: a.id,
                    quantity: u32::MAX,
                },
                StockDeduction {
                    drug_id: a.id,
                    quantity: 2,
                },
            ])
            .unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { requested: u32::MAX, .. }));
        assert_eq!(store.drug(a.id).unwrap().quantity, 10);
    }

    #[test]
    fn test_apply_deductions_never_underflows() {
        let mut state = StoreState::default();
        let a = drug("A", 2);
        let id = a.id;
        state.drugs.insert(id, a);

        let touched = state.apply_deductions(&[StockDeduction {
            drug_id: id,
            quantity: 5,
        }]);
        assert_eq!(touched[0].quantity, 0);
    }

    #[test]
    fn test_invoice_numbers_increment_per_day() {
        let store = InMemoryStore::new();
        let first = store.commit_sale(&[], invoice(InvoiceSource::CounterSale)).unwrap();
        let second = store.commit_sale(&[], invoice(InvoiceSource::CounterSale)).unwrap();
        assert_eq!(first.invoice.invoice_number, "INV-20240601-0001");
        assert_eq!(second.invoice.invoice_number, "INV-20240601-0002");
        assert_eq!(store.invoices().unwrap().len(), 2);
    }

    #[test]
    fn test_notifications_keep_insertion_order() {
        let store = InMemoryStore::new();
        for i in 0..3 {
            store
                .push_notification(Notification::new(
                    NotificationKind::InventoryChange,
                    format!("n{i}"),
                    "m",
                    None,
                ))
                .unwrap();
        }
        let titles: Vec<String> = store
            .notifications()
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["n0", "n1", "n2"]);

        assert_eq!(store.mark_all_notifications_read().unwrap(), 3);
        assert_eq!(store.mark_all_notifications_read().unwrap(), 0);
    }
}
