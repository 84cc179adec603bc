use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use shared::{domain::BillId, protocol::RawBill};
use tracing::{info, warn};

use crate::{
    error::StoreError,
    format::{format_naive_date, format_status, parse_bill_date},
    navigation::{Navigator, Route},
    store::BillStore,
};

/// A stored bill prepared for display.
///
/// `date` holds the formatted date, or the raw value when it could not be
/// parsed. `status` holds the display label, or `None` for unknown codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedBill {
    pub id: BillId,
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    pub vat: String,
    pub amount: Option<f64>,
    pub pct: Option<f64>,
    pub date: String,
    pub commentary: Option<String>,
    pub comment_admin: Option<String>,
    pub status: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    #[serde(skip)]
    pub parsed_date: Option<NaiveDate>,
}

/// Receipt image to show in the preview modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPreview {
    pub bill_id: BillId,
    pub url: String,
    pub file_name: Option<String>,
    pub image_width: u32,
}

/// Formats one record. Date and status fail independently; each failure is
/// logged and replaced by its fallback.
pub fn format_bill(raw: RawBill) -> FormattedBill {
    let (date, parsed_date) = match parse_bill_date(&raw.date) {
        Ok(parsed) => (format_naive_date(parsed), Some(parsed)),
        Err(err) => {
            warn!(bill_id = %raw.id, error = %err, "bills: keeping raw date");
            (raw.date, None)
        }
    };

    let status = match format_status(&raw.status) {
        Ok(label) => Some(label.to_string()),
        Err(err) => {
            warn!(bill_id = %raw.id, error = %err, "bills: dropping status label");
            None
        }
    };

    FormattedBill {
        id: raw.id,
        email: raw.email,
        expense_type: raw.expense_type,
        name: raw.name,
        vat: raw.vat,
        amount: raw.amount,
        pct: raw.pct,
        date,
        commentary: raw.commentary,
        comment_admin: raw.comment_admin,
        status,
        file_url: raw.file_url,
        file_name: raw.file_name,
        parsed_date,
    }
}

pub struct BillsController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
}

impl BillsController {
    pub fn new(store: Option<Arc<dyn BillStore>>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Fetches the bills and formats them, keeping the store's order.
    ///
    /// A failed fetch is returned as is; a corrupt record only degrades its
    /// own fields.
    pub async fn get_bills(&self) -> Result<Vec<FormattedBill>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(Vec::new());
        };

        let bills = store.list().await?;
        info!(count = bills.len(), "bills: formatting");
        Ok(bills.into_iter().map(format_bill).collect())
    }

    pub fn handle_click_new_bill(&self) {
        self.navigator.navigate(Route::NewBill);
    }

    /// Builds the receipt preview for a bill's eye icon. The image takes half
    /// of the modal's width.
    pub fn handle_click_icon_eye(
        &self,
        bill: &FormattedBill,
        modal_width: u32,
    ) -> Option<ReceiptPreview> {
        let url = bill.file_url.as_ref().filter(|url| !url.is_empty())?;
        Some(ReceiptPreview {
            bill_id: bill.id.clone(),
            url: url.clone(),
            file_name: bill.file_name.clone(),
            image_width: modal_width / 2,
        })
    }
}

#[cfg(test)]
#[path = "tests/bills_tests.rs"]
mod tests;
