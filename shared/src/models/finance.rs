//! Invoices and income reporting

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::DateRange;

/// Where an invoice originated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvoiceSource {
    Prescription { prescription_id: Uuid },
    CounterSale,
}

impl InvoiceSource {
    pub fn is_prescription(&self) -> bool {
        matches!(self, InvoiceSource::Prescription { .. })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Insurance,
    MobileMoney,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

/// One billed drug
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceLine {
    pub drug_id: Uuid,
    pub drug_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub id: Uuid,
    /// Human-readable number, e.g. "INV-20240601-0007"
    pub invoice_number: String,
    pub source: InvoiceSource,
    pub customer_name: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub status: InvoiceStatus,
    pub issued_on: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Invoice {
    pub fn mark_paid(&mut self, method: PaymentMethod) {
        self.status = InvoiceStatus::Paid;
        self.payment_method = Some(method);
        self.paid_at = Some(Utc::now());
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// Format an invoice number from the issue date and a running sequence
pub fn generate_invoice_number(issued_on: NaiveDate, sequence: u32) -> String {
    format!("INV-{}-{:04}", issued_on.format("%Y%m%d"), sequence)
}

/// Filter for the invoice list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceFilter {
    pub range: Option<DateRange>,
    pub status: Option<InvoiceStatus>,
    pub payment_method: Option<PaymentMethod>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(range) = &self.range {
            if !range.contains(invoice.issued_on) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if invoice.status != status {
                return false;
            }
        }
        if let Some(method) = self.payment_method {
            if invoice.payment_method != Some(method) {
                return false;
            }
        }
        true
    }
}

/// Income for one payment method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MethodIncome {
    pub payment_method: PaymentMethod,
    pub amount: Decimal,
    pub invoice_count: u32,
}

/// Income for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyIncome {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Income report over a date range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncomeSummary {
    pub range: DateRange,
    /// Sum of paid invoice totals
    pub total_income: Decimal,
    /// Sum of unpaid invoice totals
    pub outstanding: Decimal,
    pub discount_given: Decimal,
    pub invoice_count: u32,
    pub paid_count: u32,
    pub prescription_income: Decimal,
    pub counter_sale_income: Decimal,
    pub by_payment_method: Vec<MethodIncome>,
    /// Paid income per issue date, ascending
    pub daily: Vec<DailyIncome>,
}

/// Summarize invoices issued inside `range`
pub fn summarize_income(invoices: &[Invoice], range: &DateRange) -> IncomeSummary {
    let mut summary = IncomeSummary {
        range: range.clone(),
        total_income: Decimal::ZERO,
        outstanding: Decimal::ZERO,
        discount_given: Decimal::ZERO,
        invoice_count: 0,
        paid_count: 0,
        prescription_income: Decimal::ZERO,
        counter_sale_income: Decimal::ZERO,
        by_payment_method: Vec::new(),
        daily: Vec::new(),
    };

    let mut by_method: BTreeMap<PaymentMethod, (Decimal, u32)> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for invoice in invoices.iter().filter(|i| range.contains(i.issued_on)) {
        summary.invoice_count += 1;

        if !invoice.is_paid() {
            summary.outstanding += invoice.total;
            continue;
        }

        summary.paid_count += 1;
        summary.total_income += invoice.total;
        summary.discount_given += invoice.discount_amount;

        if invoice.source.is_prescription() {
            summary.prescription_income += invoice.total;
        } else {
            summary.counter_sale_income += invoice.total;
        }

        if let Some(method) = invoice.payment_method {
            let entry = by_method.entry(method).or_insert((Decimal::ZERO, 0));
            entry.0 += invoice.total;
            entry.1 += 1;
        }

        *by_day.entry(invoice.issued_on).or_insert(Decimal::ZERO) += invoice.total;
    }

    summary.by_payment_method = by_method
        .into_iter()
        .map(|(payment_method, (amount, invoice_count))| MethodIncome {
            payment_method,
            amount,
            invoice_count,
        })
        .collect();
    summary.daily = by_day
        .into_iter()
        .map(|(date, amount)| DailyIncome { date, amount })
        .collect();

    summary
}
