//! Boxtrack CLI - Main entry point

mod render;

use anyhow::{anyhow, bail, Context, Result};
use boxtrack_core::{BoxId, BoxStatus, Config, NewTransaction, TransactionId, TransactionType, TRANSACTION_DATE_FORMAT};
use boxtrack_dashboard::{ActionOutcome, DashboardController, FormOutcome};
use boxtrack_networking::{api, AuthorizedClient, Route, Session};
use boxtrack_persistence::{EntityCache, SqliteCredentialStore};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "boxtrack", version)]
#[command(about = "Track crypto boxes against a Boxtrack backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session tokens
    Login {
        username: String,
        /// Falls back to BOXTRACK_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and forget the stored tokens
    Logout,
    /// Show whether a session is stored
    Status,
    /// Balance, summary and both box lists
    Dashboard,
    /// List open boxes, or closed ones with --closed
    Boxes {
        #[arg(long)]
        closed: bool,
    },
    /// Transactions of one box
    Ledger { box_id: BoxId },
    Deposit { amount: String },
    Withdraw { amount: String },
    /// Close an open box
    Close { box_id: BoxId },
    /// Record a buy or sell
    Add {
        symbol: String,
        kind: TransactionType,
        price: String,
        amount: String,
        #[arg(long)]
        fee: Option<String>,
        /// "YYYY-MM-DD HH:MM", defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// Delete a transaction of a box
    Delete {
        box_id: BoxId,
        transaction_id: TransactionId,
    },
    /// Recorded balance snapshots, newest first
    History,
}

struct App {
    config: Config,
    session: Arc<Session>,
    client: Arc<AuthorizedClient>,
    dashboard: DashboardController,
}

impl App {
    async fn open() -> Result<Self> {
        let config = Config::from_env()?;
        let store = SqliteCredentialStore::open(&config.credentials_db_path())
            .await
            .with_context(|| format!("opening credentials in {}", config.data_dir.display()))?;
        let session = Arc::new(Session::restore(Arc::new(store)).await?);
        let client = Arc::new(AuthorizedClient::from_config(&config, session.clone())?);
        let dashboard = DashboardController::new(client.clone(), Arc::new(EntityCache::new()), config.reload_policy);

        Ok(Self {
            config,
            session,
            client,
            dashboard,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boxtrack=info,boxtrack_networking=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Banner text for library errors, the full chain for everything else
fn failure_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<boxtrack_core::Error>() {
        Some(e) => e.user_message(),
        None => format!("{:#}", err),
    }
}

fn settle(outcome: ActionOutcome) -> Result<()> {
    match outcome {
        ActionOutcome::Completed | ActionOutcome::Ignored => Ok(()),
        ActionOutcome::Rejected(message) => Err(anyhow!(message)),
        ActionOutcome::SignedOut => bail!("Not signed in. Run `boxtrack login <username>` first."),
    }
}

async fn run(command: Command) -> Result<()> {
    let app = App::open().await?;

    match command {
        Command::Login { username, password } => {
            let password = password
                .or_else(|| std::env::var("BOXTRACK_PASSWORD").ok())
                .unwrap_or_default();
            let reply = api::login(&app.client, &username, &password).await?;
            if !reply.success {
                let message = reply
                    .field_errors
                    .first_message()
                    .map(str::to_string)
                    .unwrap_or(reply.message);
                bail!(message);
            }
            println!("Signed in as {}", username);
        }
        Command::Logout => {
            settle(app.dashboard.logout().await)?;
            println!("Signed out");
        }
        Command::Status => {
            let route = app.session.resolve(Route::Dashboard).await?;
            let state = match route {
                Route::Dashboard => "signed in",
                Route::Login => "signed out",
            };
            println!("{} ({})", state, app.config.api_url);
        }
        Command::Dashboard => {
            settle(app.dashboard.mount().await)?;
            let snapshot = app.dashboard.snapshot();
            if let Some(banner) = &snapshot.view.banner {
                eprintln!("{}", banner);
            }
            render::dashboard(&snapshot);
        }
        Command::Boxes { closed } => {
            let status = if closed { BoxStatus::Closed } else { BoxStatus::Open };
            let boxes = api::list_boxes(&app.client, status).await?;
            render::boxes(status, &boxes);
        }
        Command::Ledger { box_id } => {
            let transactions = api::list_transactions(&app.client, box_id).await?;
            render::ledger(box_id, &transactions);
        }
        Command::Deposit { amount } => {
            app.dashboard.begin_deposit();
            change_balance(&app, &amount).await?;
        }
        Command::Withdraw { amount } => {
            app.dashboard.begin_withdraw();
            change_balance(&app, &amount).await?;
        }
        Command::Close { box_id } => {
            settle(app.dashboard.close_box(box_id).await)?;
            println!("Closed box {}", box_id);
        }
        Command::Add {
            symbol,
            kind,
            price,
            amount,
            fee,
            date,
        } => {
            let date = match date {
                Some(raw) => NaiveDateTime::parse_from_str(raw.trim(), TRANSACTION_DATE_FORMAT)
                    .with_context(|| format!("date must look like 2024-05-17 09:45, got '{}'", raw))?,
                None => chrono::Local::now().naive_local(),
            };
            let mut form = NewTransaction::new(symbol, kind, price, amount, date);
            if let Some(fee) = fee {
                form = form.with_fee(fee);
            }

            match app.dashboard.add_transaction(&form).await {
                FormOutcome::Submitted(Some(receipt)) => {
                    println!("Recorded transaction {} ({})", receipt.transaction_id, receipt.coin_name)
                }
                FormOutcome::Submitted(None) => println!("Recorded transaction"),
                FormOutcome::Rejected { message, field_errors } if field_errors.is_empty() => bail!(message),
                FormOutcome::Rejected { message, field_errors } => bail!("{} ({})", message, field_errors),
                FormOutcome::SignedOut => settle(ActionOutcome::SignedOut)?,
            }
        }
        Command::Delete {
            box_id,
            transaction_id,
        } => {
            settle(app.dashboard.delete_transaction(box_id, transaction_id).await)?;
            println!("Deleted transaction {}", transaction_id);
        }
        Command::History => {
            let history = api::balance_history(&app.client).await?;
            render::history(&history);
        }
    }

    Ok(())
}

async fn change_balance(app: &App, amount: &str) -> Result<()> {
    app.dashboard.set_amount(amount);
    settle(app.dashboard.submit_balance().await)?;
    match app.dashboard.snapshot().balance {
        Some(balance) => println!("Balance: {} USDT", balance.total_balance.fixed2()),
        None => println!("Balance updated"),
    }
    Ok(())
}
