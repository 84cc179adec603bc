use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_session_user, new_bill::FILE_FORMAT_ERROR_MESSAGE, BillForm, BillStore, BillsController,
    BillsPage, FileInput, FileSelection, HttpBillStore, NewBillController, RouteHistory,
    SelectedFile, SubmitEvent,
};
use shared::protocol::SessionUser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_session_file, load_settings, parse_api_url};

#[derive(Parser, Debug)]
#[command(name = "billed", about = "Submit and review expense bills")]
struct Args {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    session: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List submitted bills, newest first.
    Bills,
    /// Submit a new bill with its receipt.
    NewBill(NewBillArgs),
    /// Show the receipt preview of one bill.
    Preview { bill_id: String },
}

#[derive(clap::Args, Debug)]
struct NewBillArgs {
    #[arg(long)]
    file: PathBuf,
    #[arg(long, default_value = "Transports")]
    expense_type: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    amount: String,
    #[arg(long)]
    date: String,
    #[arg(long, default_value = "")]
    vat: String,
    #[arg(long, default_value = "")]
    pct: String,
    #[arg(long, default_value = "")]
    commentary: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(session) = args.session {
        settings.session_path = session;
    }
    let api_url = parse_api_url(&settings.api_url)?;
    info!(api_url = %api_url, "billed: using store");

    let mut store = HttpBillStore::new(api_url.as_str());
    if let Some(token) = &settings.api_token {
        store = store.with_bearer_token(token.clone());
    }
    let store: Arc<dyn BillStore> = Arc::new(store);
    let navigator = Arc::new(RouteHistory::new());

    match args.command {
        Command::Bills => {
            let controller = BillsController::new(Some(store), navigator);
            list_bills(&controller).await
        }
        Command::NewBill(new_bill) => {
            let session = load_session_file(&settings.session_path)?;
            let user = load_session_user(&session).context("no usable user in session file")?;
            submit_new_bill(store, navigator, user, new_bill).await
        }
        Command::Preview { bill_id } => {
            let controller = BillsController::new(Some(store), navigator);
            preview(&controller, &bill_id, settings.modal_width).await
        }
    }
}

async fn list_bills(controller: &BillsController) -> Result<()> {
    match controller.get_bills().await {
        Ok(bills) => {
            print!("{}", BillsPage::Loaded(bills).render());
            Ok(())
        }
        Err(err) => {
            print!("{}", BillsPage::Error(err.to_string()).render());
            Err(err).context("failed to fetch bills")
        }
    }
}

async fn submit_new_bill(
    store: Arc<dyn BillStore>,
    navigator: Arc<RouteHistory>,
    user: SessionUser,
    args: NewBillArgs,
) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read receipt '{}'", args.file.display()))?;
    let name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_guess::from_path(&args.file)
        .first()
        .map(|mime| mime.essence_str().to_string());

    let controller = NewBillController::new(Some(store), navigator.clone(), user);
    let input = FileInput {
        value: args.file.display().to_string(),
        files: vec![SelectedFile {
            name,
            mime_type,
            bytes,
        }],
    };

    match controller.handle_change_file(input).await {
        FileSelection::Accepted { file_name, upload } => {
            println!("receipt {file_name}: {upload:?}");
        }
        FileSelection::Rejected { file_name } => {
            eprintln!("{FILE_FORMAT_ERROR_MESSAGE}");
            bail!("receipt '{file_name}' was rejected");
        }
        FileSelection::Empty => bail!("no receipt selected"),
    }

    let mut event = SubmitEvent::new(BillForm {
        expense_type: args.expense_type,
        name: args.name,
        amount: args.amount,
        date: args.date,
        vat: args.vat,
        pct: args.pct,
        commentary: args.commentary,
    });
    let submission = controller.handle_submit(&mut event).await;
    println!("submission: {:?}", submission.outcome);
    if let Some(route) = navigator.current() {
        println!("next: {route}");
    }
    Ok(())
}

async fn preview(controller: &BillsController, bill_id: &str, modal_width: u32) -> Result<()> {
    let bills = controller
        .get_bills()
        .await
        .context("failed to fetch bills")?;
    let Some(bill) = bills.iter().find(|bill| bill.id.as_str() == bill_id) else {
        bail!("no bill with id '{bill_id}'");
    };

    match controller.handle_click_icon_eye(bill, modal_width) {
        Some(preview) => {
            println!("Justificatif {}", preview.file_name.as_deref().unwrap_or("-"));
            println!("{} (width {}px)", preview.url, preview.image_width);
        }
        None => println!("bill {bill_id} has no receipt"),
    }
    Ok(())
}
