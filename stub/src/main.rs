use classify_stub::{serve, EnvVars, ServerConfig};
use log::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let environment_variables = envy::from_env::<EnvVars>()?;

    let server_config = ServerConfig::new(&environment_variables.jwt_secret)?;

    let listener = tokio::net::TcpListener::bind(&environment_variables.listen_on).await?;
    info!("listening on {}", listener.local_addr()?);
    serve(listener, server_config).await?;

    Ok(())
}
