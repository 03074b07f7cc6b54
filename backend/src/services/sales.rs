//! Counter sales service for over-the-counter purchases without a prescription

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    Drug, Invoice, InvoiceLine, InvoiceSource, InvoiceStatus, NotificationKind, PaymentMethod,
    SaleCart, SaleLine, SaleTotals,
};
use uuid::Uuid;
use validator::Validate;

use super::{today, NotificationService};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::store::{PharmacyStore, StockDeduction};

#[derive(Clone)]
pub struct SalesService {
    store: Arc<dyn PharmacyStore>,
    notifications: NotificationService,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub drug_id: Uuid,
    pub quantity: u32,
}

/// Basket submitted at the counter. Repeated drugs are merged.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaleRequest {
    #[validate(length(min = 1, max = 100))]
    pub items: Vec<SaleItemInput>,
    /// Percentage discount, clamped to `[0, 100]`
    pub discount_percent: Option<Decimal>,
    /// Required at checkout, ignored for quotes
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(max = 200))]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleQuote {
    pub lines: Vec<SaleLine>,
    pub totals: SaleTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleReceipt {
    pub invoice: Invoice,
    pub totals: SaleTotals,
    pub low_stock_alerts: Vec<Uuid>,
}

impl SalesService {
    pub fn new(store: Arc<dyn PharmacyStore>, config: Arc<Config>) -> Self {
        let notifications = NotificationService::new(store.clone(), &config);
        Self {
            store,
            notifications,
        }
    }

    fn build_cart(&self, request: &SaleRequest, today: NaiveDate) -> AppResult<SaleCart> {
        request.validate()?;
        let catalog: HashMap<Uuid, Drug> = self
            .store
            .drugs()?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        let mut cart = SaleCart::new();
        for item in &request.items {
            let drug = catalog
                .get(&item.drug_id)
                .ok_or_else(|| AppError::NotFound("Drug".to_string()))?;
            cart.add_item(drug, item.quantity, today)?;
        }
        if let Some(discount) = request.discount_percent {
            cart.set_discount_percent(discount);
        }
        Ok(cart)
    }

    /// Price a basket against live stock without committing anything
    pub fn quote(&self, request: &SaleRequest) -> AppResult<SaleQuote> {
        let cart = self.build_cart(request, today())?;
        let totals = cart.totals();
        Ok(SaleQuote {
            lines: cart.lines,
            totals,
        })
    }

    /// Take payment for a basket and deduct its stock
    pub fn checkout(&self, request: SaleRequest) -> AppResult<SaleReceipt> {
        let today = today();
        let payment_method = request
            .payment_method
            .ok_or_else(|| AppError::validation("payment_method", "Payment method is required"))?;
        let cart = self.build_cart(&request, today)?;
        cart.validate_checkout()?;

        let totals = cart.totals();
        let deductions: Vec<StockDeduction> = cart
            .lines
            .iter()
            .map(|line| StockDeduction {
                drug_id: line.drug_id,
                quantity: line.quantity,
            })
            .collect();

        let mut invoice = Invoice {
            id: Uuid::new_v4(),
            invoice_number: String::new(),
            source: InvoiceSource::CounterSale,
            customer_name: request
                .customer_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            lines: cart
                .lines
                .iter()
                .map(|line| InvoiceLine {
                    drug_id: line.drug_id,
                    drug_name: line.drug_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    subtotal: line.subtotal(),
                })
                .collect(),
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            total: totals.total,
            payment_method: None,
            status: InvoiceStatus::Unpaid,
            issued_on: today,
            paid_at: None,
        };
        invoice.mark_paid(payment_method);

        let commit = self
            .store
            .commit_sale(&deductions, invoice)
            .map_err(|err| {
                tracing::warn!(error = %err, "counter sale commit rejected");
                err
            })?;

        self.notifications.notify(
            NotificationKind::SaleCompleted,
            "Sale completed",
            format!(
                "Invoice {} paid: {} item(s), total {}",
                commit.invoice.invoice_number,
                commit.invoice.lines.len(),
                commit.invoice.total
            ),
            Some(commit.invoice.id),
        )?;
        let low_stock_alerts = self.notifications.alert_stock_levels(&commit.drugs, today)?;

        tracing::info!(
            invoice = %commit.invoice.invoice_number,
            total = %totals.total,
            method = ?payment_method,
            "counter sale completed"
        );

        Ok(SaleReceipt {
            invoice: commit.invoice,
            totals,
            low_stock_alerts,
        })
    }
}
