use std::sync::Arc;

use shared::{
    domain::{BillId, BillStatus},
    protocol::{BillPayload, SessionUser},
};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    navigation::{Navigator, Route},
    store::{BillStore, FileUpload},
};

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const FILE_FORMAT_ERROR_MESSAGE: &str =
    "Seuls les fichiers au format jpg, jpeg ou png sont acceptés.";
const DEFAULT_VAT_PCT: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// State of the file input when its `change` event fires. `value` is the
/// path the browser reports, e.g. `C:\fakepath\photo.png`.
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    pub value: String,
    pub files: Vec<SelectedFile>,
}

impl FileInput {
    pub fn single(file: SelectedFile) -> Self {
        Self {
            value: format!("C:\\fakepath\\{}", file.name),
            files: vec![file],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file: SelectedFile,
    pub file_name: String,
    pub file_url: Option<String>,
    /// Draft bill the store created when the receipt was uploaded.
    pub bill_id: Option<BillId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    /// No store configured.
    Skipped,
    Uploaded { file_url: String },
    /// A newer selection or a submission took the pending upload first.
    Superseded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Empty,
    Rejected { file_name: String },
    Accepted { file_name: String, upload: UploadState },
}

/// Values of the new bill form fields, as typed.
#[derive(Debug, Clone, Default)]
pub struct BillForm {
    pub expense_type: String,
    pub name: String,
    pub amount: String,
    pub date: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

#[derive(Debug)]
pub struct SubmitEvent {
    pub form: BillForm,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(form: BillForm) -> Self {
        Self {
            form,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Skipped,
    Updated(BillId),
    Created(BillId),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub payload: BillPayload,
    pub outcome: PersistOutcome,
}

pub fn is_accepted_file_name(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

/// Last path segment of a file input value.
pub fn file_name_from_input(value: &str) -> &str {
    value.rsplit(['\\', '/']).next().unwrap_or(value)
}

/// Integer prefix of `raw`, the way form inputs are read: `"348.5"` gives
/// 348, `"abc"` gives nothing.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

#[derive(Default)]
struct NewBillState {
    pending_upload: Option<PendingUpload>,
    generation: u64,
    format_error_visible: bool,
}

pub struct NewBillController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    user: SessionUser,
    state: Mutex<NewBillState>,
}

impl NewBillController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        user: SessionUser,
    ) -> Self {
        Self {
            store,
            navigator,
            user,
            state: Mutex::new(NewBillState::default()),
        }
    }

    pub async fn pending_upload(&self) -> Option<PendingUpload> {
        self.state.lock().await.pending_upload.clone()
    }

    pub async fn format_error_visible(&self) -> bool {
        self.state.lock().await.format_error_visible
    }

    pub async fn format_error_message(&self) -> Option<&'static str> {
        self.format_error_visible()
            .await
            .then_some(FILE_FORMAT_ERROR_MESSAGE)
    }

    /// Validates the selected receipt and, when a store is configured,
    /// uploads it right away. A rejected file never reaches the store.
    pub async fn handle_change_file(&self, input: FileInput) -> FileSelection {
        let FileInput { value, files } = input;
        let Some(file) = files.into_iter().next() else {
            return FileSelection::Empty;
        };
        let file_name = match file_name_from_input(&value) {
            "" => file.name.clone(),
            name => name.to_string(),
        };

        if !is_accepted_file_name(&file_name) {
            self.state.lock().await.format_error_visible = true;
            warn!(file_name = %file_name, "new bill: rejected receipt format");
            return FileSelection::Rejected { file_name };
        }

        let generation = {
            let mut state = self.state.lock().await;
            state.format_error_visible = false;
            state.generation += 1;
            state.pending_upload = Some(PendingUpload {
                file: file.clone(),
                file_name: file_name.clone(),
                file_url: None,
                bill_id: None,
            });
            state.generation
        };

        let Some(store) = &self.store else {
            return FileSelection::Accepted {
                file_name,
                upload: UploadState::Skipped,
            };
        };

        let upload = FileUpload {
            file_name: file_name.clone(),
            mime_type: file.mime_type,
            bytes: file.bytes,
            email: self.user.email.clone(),
        };

        let upload = match store.upload_file(upload).await {
            Ok(uploaded) => {
                let mut state = self.state.lock().await;
                let current = state.generation == generation;
                match state.pending_upload.as_mut() {
                    Some(pending) if current => {
                        pending.file_url = Some(uploaded.file_url.clone());
                        pending.bill_id = Some(uploaded.key);
                        UploadState::Uploaded {
                            file_url: uploaded.file_url,
                        }
                    }
                    _ => {
                        info!(file_name = %file_name, "new bill: dropping stale upload result");
                        UploadState::Superseded
                    }
                }
            }
            Err(err) => {
                error!(file_name = %file_name, error = %err, "new bill: receipt upload failed");
                UploadState::Failed
            }
        };

        FileSelection::Accepted { file_name, upload }
    }

    /// Persists the bill and returns to the bills list. A failed persist is
    /// logged and does not keep the user on the form.
    pub async fn handle_submit(&self, event: &mut SubmitEvent) -> Submission {
        event.prevent_default();

        let pending = self.state.lock().await.pending_upload.take();
        let payload = self.build_payload(&event.form, pending.as_ref());

        let outcome = match &self.store {
            None => PersistOutcome::Skipped,
            Some(store) => {
                let draft_id = pending.and_then(|pending| pending.bill_id);
                let result = match &draft_id {
                    Some(id) => store.update(id, &payload).await,
                    None => store.create(&payload).await,
                };
                match (result, draft_id) {
                    (Ok(bill), Some(_)) => {
                        info!(bill_id = %bill.id, "new bill: bill updated");
                        PersistOutcome::Updated(bill.id)
                    }
                    (Ok(bill), None) => {
                        info!(bill_id = %bill.id, "new bill: bill created");
                        PersistOutcome::Created(bill.id)
                    }
                    (Err(err), _) => {
                        error!(error = %err, "new bill: submission failed");
                        PersistOutcome::Failed(err.to_string())
                    }
                }
            }
        };

        self.navigator.navigate(Route::Bills);
        Submission { payload, outcome }
    }

    fn build_payload(&self, form: &BillForm, pending: Option<&PendingUpload>) -> BillPayload {
        BillPayload {
            email: self.user.email.clone(),
            expense_type: form.expense_type.clone(),
            name: form.name.clone(),
            amount: parse_leading_int(&form.amount),
            date: form.date.clone(),
            vat: form.vat.clone(),
            pct: parse_leading_int(&form.pct)
                .filter(|pct| *pct != 0)
                .unwrap_or(DEFAULT_VAT_PCT),
            commentary: form.commentary.clone(),
            file_url: pending.and_then(|pending| pending.file_url.clone()),
            file_name: pending.map(|pending| pending.file_name.clone()),
            status: BillStatus::Pending,
        }
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
