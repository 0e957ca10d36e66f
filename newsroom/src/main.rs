use clap::Parser;
use newsroom::{Config, app, build_state, init_logging};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();
    init_logging(&config.log_level);

    let state = build_state(&config)?;
    let app = app(state);

    info!(
        addr = %config.addr,
        backend = %config.backend,
        story_model = %config.story_model,
        "listening on http://{}",
        config.addr
    );
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
