use crate::{bills::FormattedBill, error::StoreError};

pub const BILLS_PAGE_TITLE: &str = "Mes notes de frais";
pub const ERROR_PAGE_TITLE: &str = "Erreur";

/// What the bills view is given to render.
#[derive(Debug, Clone, PartialEq)]
pub enum BillsPage {
    Loading,
    Loaded(Vec<FormattedBill>),
    Error(String),
}

impl BillsPage {
    pub fn from_result(result: Result<Vec<FormattedBill>, StoreError>) -> Self {
        match result {
            Ok(bills) => BillsPage::Loaded(bills),
            Err(err) => BillsPage::Error(err.to_string()),
        }
    }

    /// Bills in display order: newest first, undated bills last.
    pub fn rows(&self) -> Vec<&FormattedBill> {
        let BillsPage::Loaded(bills) = self else {
            return Vec::new();
        };
        let mut rows: Vec<&FormattedBill> = bills.iter().collect();
        rows.sort_by(|a, b| b.parsed_date.cmp(&a.parsed_date));
        rows
    }

    pub fn render(&self) -> String {
        match self {
            BillsPage::Loading => "Loading...\n".to_string(),
            BillsPage::Error(message) => format!("{ERROR_PAGE_TITLE}\n{message}\n"),
            BillsPage::Loaded(_) => self.render_table(),
        }
    }

    fn render_table(&self) -> String {
        let mut out = format!(
            "{BILLS_PAGE_TITLE}\n{:<24} {:<24} {:<12} {:>10} {:<12} {}\n",
            "Type", "Nom", "Date", "Montant", "Statut", "Justificatif"
        );
        for bill in self.rows() {
            let amount = bill
                .amount
                .map(|amount| format!("{amount} €"))
                .unwrap_or_default();
            out.push_str(&format!(
                "{:<24} {:<24} {:<12} {:>10} {:<12} {}\n",
                bill.expense_type,
                bill.name,
                bill.date,
                amount,
                bill.status.as_deref().unwrap_or(""),
                bill.file_name.as_deref().unwrap_or("-"),
            ));
        }
        out
    }
}
