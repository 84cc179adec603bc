use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use shared::{
    domain::BillId,
    protocol::{BillPayload, RawBill, UploadedFile},
};
use tokio::sync::{oneshot, Mutex};
use tracing_subscriber::fmt::MakeWriter;

use crate::{
    error::StoreError,
    store::{BillStore, FileUpload},
};

pub(crate) fn raw_bill(id: &str, name: &str, date: &str, status: &str, amount: f64) -> RawBill {
    RawBill {
        id: id.into(),
        email: "a@a".into(),
        expense_type: "Hôtel et logement".into(),
        name: name.into(),
        vat: "80".into(),
        amount: Some(amount),
        pct: Some(20.0),
        date: date.into(),
        commentary: Some("séminaire billed".into()),
        comment_admin: None,
        status: status.into(),
        file_url: Some(format!("https://localhost:3456/images/{id}.jpg")),
        file_name: Some(format!("{id}.jpg")),
    }
}

pub(crate) fn fixture_bills() -> Vec<RawBill> {
    vec![
        raw_bill("47qAXb6fIm2zOKkLzMro", "encore", "2004-04-04", "pending", 400.0),
        raw_bill("BeKy5Mo4jkmdfPGYpTxZ", "test1", "2001-01-01", "refused", 100.0),
        raw_bill("UIUZtnPQvnbFnB0ozvJh", "test3", "2003-03-03", "accepted", 300.0),
        raw_bill("qcCK3SzECmaZAGRrHjaC", "test2", "2002-02-02", "refused", 200.0),
    ]
}

fn raw_from_payload(id: BillId, payload: &BillPayload) -> RawBill {
    RawBill {
        id,
        email: payload.email.clone(),
        expense_type: payload.expense_type.clone(),
        name: payload.name.clone(),
        vat: payload.vat.clone(),
        amount: payload.amount.map(|amount| amount as f64),
        pct: Some(payload.pct as f64),
        date: payload.date.clone(),
        commentary: Some(payload.commentary.clone()),
        comment_admin: None,
        status: payload.status.as_str().to_string(),
        file_url: payload.file_url.clone(),
        file_name: payload.file_name.clone(),
    }
}

#[derive(Default)]
pub(crate) struct TestBillStore {
    bills: Vec<RawBill>,
    list_error: Option<String>,
    persist_error: Option<String>,
    upload_error: Option<String>,
    upload_gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub list_calls: Arc<AtomicUsize>,
    pub updates: Arc<Mutex<Vec<(BillId, BillPayload)>>>,
    pub creates: Arc<Mutex<Vec<BillPayload>>>,
    pub uploads: Arc<Mutex<Vec<FileUpload>>>,
}

impl TestBillStore {
    pub fn with_bills(bills: Vec<RawBill>) -> Self {
        Self {
            bills,
            ..Self::default()
        }
    }

    pub fn failing_list(err: impl Into<String>) -> Self {
        Self {
            list_error: Some(err.into()),
            ..Self::default()
        }
    }

    pub fn with_persist_error(mut self, err: impl Into<String>) -> Self {
        self.persist_error = Some(err.into());
        self
    }

    pub fn with_upload_error(mut self, err: impl Into<String>) -> Self {
        self.upload_error = Some(err.into());
        self
    }

    /// Holds the next upload until `gate` fires.
    pub fn with_upload_gate(self, gate: oneshot::Receiver<()>) -> Self {
        Self {
            upload_gate: Mutex::new(Some(gate)),
            ..self
        }
    }
}

#[async_trait]
impl BillStore for TestBillStore {
    async fn list(&self) -> Result<Vec<RawBill>, StoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.list_error {
            return Err(StoreError::rejected(err.clone()));
        }
        Ok(self.bills.clone())
    }

    async fn update(&self, id: &BillId, payload: &BillPayload) -> Result<RawBill, StoreError> {
        self.updates
            .lock()
            .await
            .push((id.clone(), payload.clone()));
        if let Some(err) = &self.persist_error {
            return Err(StoreError::rejected(err.clone()));
        }
        Ok(raw_from_payload(id.clone(), payload))
    }

    async fn create(&self, payload: &BillPayload) -> Result<RawBill, StoreError> {
        let mut creates = self.creates.lock().await;
        creates.push(payload.clone());
        if let Some(err) = &self.persist_error {
            return Err(StoreError::rejected(err.clone()));
        }
        let id = BillId(format!("created-{}", creates.len()));
        Ok(raw_from_payload(id, payload))
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<UploadedFile, StoreError> {
        let gate = self.upload_gate.lock().await.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let count = {
            let mut uploads = self.uploads.lock().await;
            uploads.push(upload.clone());
            uploads.len()
        };
        if let Some(err) = &self.upload_error {
            return Err(StoreError::rejected(err.clone()));
        }
        Ok(UploadedFile {
            file_url: format!("https://localhost:3456/images/{}", upload.file_name),
            file_name: upload.file_name,
            key: BillId(format!("draft-{count}")),
        })
    }
}

/// Log sink for asserting on emitted diagnostics.
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|bytes| bytes.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut bytes) = self.0.lock() {
            bytes.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Routes this thread's logs into a buffer until the guard drops.
pub(crate) fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (logs, guard)
}
