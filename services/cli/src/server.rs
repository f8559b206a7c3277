use crate::cli::ServeArgs;
use expert_intake::config::AppConfig;
use expert_intake::error::AppError;
use expert_intake::telemetry;
use expert_intake::workflows::expert::{sandbox_router, SandboxBackend};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let app = sandbox_router(SandboxBackend::new());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(?config.environment, %addr, "expert applications sandbox ready");

    axum::serve(listener, app).await?;
    Ok(())
}
