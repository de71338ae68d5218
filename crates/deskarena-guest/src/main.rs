use clap::Parser;
use deskarena_guest::{router, AppState};

#[derive(Parser)]
#[command(name = "deskarena-guest")]
#[command(about = "In-guest HTTP agent server for the deskarena benchmark harness")]
struct Cli {
    #[arg(long, default_value_t = 5000)]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    #[arg(long, default_value_t = 1920)]
    screen_width: u32,

    #[arg(long, default_value_t = 1080)]
    screen_height: u32,

    #[arg(long, default_value = "C:\\deskarena_task_files")]
    task_root: String,

    /// Directory for the non-blocking file appender (§10.2): the guest
    /// server has no attached terminal, so it logs to a rolling file here
    /// instead of stdout.
    #[arg(long, default_value = "C:\\deskarena_task_files\\logs")]
    log_dir: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "deskarena-guest.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let state = AppState::new(std::path::PathBuf::from(&cli.task_root), (cli.screen_width, cli.screen_height));
    let app = router(state);

    let addr = format!("{}:{}", cli.bind, cli.port);
    tracing::info!(%addr, "deskarena-guest listening");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, ?err, "failed to bind guest agent server");
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(?err, "guest agent server exited with an error");
        std::process::exit(1);
    }
}
