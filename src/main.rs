use donation_tracker::{config::load_settings, core::Client, errors::Result};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load settings, missing config.toml means defaults
    let settings = load_settings("config.toml")
        .inspect_err(|e| error!("Critical error loading settings: {}", e))?;

    // 4. Connect and make sure the schema exists
    let client = Client::connect(&settings)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    client
        .create_tables()
        .await
        .inspect(|_| info!("Database schema ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Summarize what is stored
    info!("users: {}", client.user().count(Default::default()).await?);
    info!("sessions: {}", client.session().count(Default::default()).await?);
    info!("accounts: {}", client.account().count(Default::default()).await?);
    info!("verifications: {}", client.verification().count(Default::default()).await?);
    info!("programs: {}", client.program().count(Default::default()).await?);
    info!("program periods: {}", client.program_period().count(Default::default()).await?);
    info!("donations: {}", client.donation().count(Default::default()).await?);
    info!("donation proofs: {}", client.donation_proof().count(Default::default()).await?);

    Ok(())
}
