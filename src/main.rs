use acne_scan::{
    AppState,
    config::{Cli, Command, Config, ScanArgs},
    provider::ChatModel,
    router,
    ui::{HttpApi, Orchestrator, render},
};
use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,acne_scan=debug".into()),
        )
        .init();

    match Cli::parse().command {
        Command::Serve(config) => serve(config).await,
        Command::Scan(args) => scan(args).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting server with config: {:?}", config);

    let app = router(AppState::from_config(&config), config.max_upload_bytes);

    let listener = TcpListener::bind(&config.server_address())
        .await
        .with_context(|| format!("failed to bind {}", config.server_address()))?;
    tracing::info!("Server running on http://{}", config.server_address());
    tracing::info!("Inference server: {}", config.inference_base_url);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn scan(args: ScanArgs) -> anyhow::Result<()> {
    let model: ChatModel = args.model.parse()?;
    let api = HttpApi::new(reqwest::Client::new(), &args.server);
    let mut orchestrator = Orchestrator::new(api).with_model(model);

    orchestrator.set_confidence_threshold(args.confidence_threshold);
    if orchestrator.select_path(&args.image).await? {
        orchestrator.detect().await;
    }

    print!("{}", render(orchestrator.state()));
    if let Some(error) = &orchestrator.state().error {
        anyhow::bail!("{error}");
    }
    Ok(())
}
