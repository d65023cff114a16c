use std::sync::Arc;
use std::time::Duration;

use ratna_api::config::Config as ApiConfig;
use ratna_api::mail::SmtpMailClient;
use ratna_api::media::CloudinaryStore;
use ratna_api::payment::RazorpayGateway;
use ratna_api::sea_orm::{ConnectOptions, Database};
use ratna_api::state::State;
use ratna_api::construct_router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod schema;
mod seed;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Ratna marketplace API");

    let config = config::Config::from_env()?;

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8));
    let db = Database::connect(opt).await?;

    schema::ensure_schema(&db).await?;
    seed::seed_demo_accounts(&db).await?;

    let api_config = ApiConfig::new(config.jwt_secret.clone())
        .with_client_origins(config.client_origins.clone());

    let mut state = State::new(api_config, db);
    if let Some(razorpay) = &config.razorpay {
        state = state.with_gateway(Arc::new(RazorpayGateway::new(razorpay)));
    } else {
        tracing::warn!("Razorpay credentials not configured, checkout is disabled");
    }
    if let Some(smtp) = &config.smtp {
        state = state.with_mail_client(Arc::new(SmtpMailClient::new(smtp)?));
    } else {
        tracing::warn!("SMTP not configured, password reset mail is disabled");
    }
    if let Some(cloudinary) = &config.cloudinary {
        state = state.with_image_store(Arc::new(CloudinaryStore::new(cloudinary.clone())));
    } else {
        tracing::warn!("Cloudinary not configured, image uploads are disabled");
    }

    let app = construct_router(Arc::new(state));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
