//! Bill listing and submission pipeline of the Billed employee client.

pub mod bills;
pub mod error;
pub mod format;
pub mod navigation;
pub mod new_bill;
pub mod session;
pub mod store;
pub mod views;

pub use bills::{BillsController, FormattedBill, ReceiptPreview};
pub use error::{FormatError, StoreError};
pub use navigation::{Navigator, Route, RouteHistory};
pub use new_bill::{
    BillForm, FileInput, FileSelection, NewBillController, PendingUpload, PersistOutcome,
    SelectedFile, SubmitEvent, Submission, UploadState,
};
pub use session::{load_session_user, MemorySessionStore, SessionStore};
pub use store::{BillStore, FileUpload, HttpBillStore};
pub use views::BillsPage;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
