use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use classify_client::blob::SelectedFile;
use classify_client::notify::StderrNotifier;
use classify_client::pages::{AppContext, LoginPage, Mount, SignPage, User1Page};
use classify_client::router::History;
use classify_client::session::FileTokenStore;
use classify_client::widgets::SubmitOutcome;
use classify_client::{ApiClient, ClientConfig, Error, ObjectUrlRegistry, Session};

#[derive(Parser, Debug)]
#[command(name = "classify", version, about = "Garbage classification client")]
struct Cli {
    /// Backend origin; overrides CLASSIFY_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Upload an image and save the classified result.
    Classify {
        image: PathBuf,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Forget the stored session token.
    Logout,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    info!("using backend {}", config.base_url);

    let session = Session::new(Arc::new(FileTokenStore::new(&config.token_path)));
    let api = ApiClient::new(&config, session)?;
    let history = History::default();
    let ctx = AppContext::new(
        api,
        ObjectUrlRegistry::default(),
        Arc::new(StderrNotifier),
        Arc::new(history),
    );

    match cli.command {
        Command::Login { username, password } => {
            let mut page = LoginPage::new(ctx);
            page.set_username(username);
            page.set_password(password);
            page.submit().await
        }
        Command::Register {
            username,
            password,
            confirm,
        } => {
            let mut page = SignPage::new(ctx);
            page.set_username(username);
            page.set_password(password);
            page.set_confirm_password(confirm);
            page.submit().await
        }
        Command::Classify { image, output } => classify(ctx, image, output).await,
        Command::Logout => ctx.logout(),
    }
}

async fn classify(ctx: AppContext, image: PathBuf, output: PathBuf) -> Result<(), Error> {
    let page = match User1Page::mount(ctx.clone()) {
        Mount::Ready(page) => page,
        Mount::Redirected(route) => {
            ctx.notifier
                .notify(&format!("{}, run `classify login` first", Error::AuthRequired));
            info!("redirected to {route}");
            return Err(Error::AuthRequired);
        }
    };

    let file = SelectedFile::open(&image).await?;
    page.select_file(Some(file));
    page.open_preview();
    page.confirm_preview()?;

    let result = match page.submit().await {
        SubmitOutcome::Completed(result) => result,
        SubmitOutcome::Failed(err) => return Err(err),
        SubmitOutcome::Skipped(reason) => {
            return Err(Error::invalid_response(format!("upload skipped: {reason:?}")))
        }
    };
    let blob = result
        .resolve()
        .ok_or_else(|| Error::invalid_response("result image was released"))?;
    tokio::fs::write(&output, blob.bytes()).await?;
    info!("wrote {} ({} bytes)", output.display(), blob.len());
    Ok(())
}
