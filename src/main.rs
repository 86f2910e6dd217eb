//! Wiring & DI. Entry point: load config, bootstrap adapters, inject into services, poll.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use storefront_bot::adapters::persistence::{JsonStore, LoadOutcome, SqliteOrderLog};
use storefront_bot::adapters::telegram::{BotApiClient, TelegramPoller};
use storefront_bot::ports::{
    CatalogStorePort, InputPort, MessengerPort, OrderLogPort, PriceStorePort,
};
use storefront_bot::shared::config::AppConfig;
use storefront_bot::usecases::{
    AdminPanel, ConversationEngine, ExportSchedule, ExportService, NotificationDispatcher,
    SessionRegistry,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load_or_default();
    let Some(token) = cfg.bot_token() else {
        anyhow::bail!("Set STOREBOT_BOT_TOKEN (or TELEGRAM_BOT_TOKEN) in env or .env. Get one from @BotFather");
    };

    let admins = cfg.admin_set();
    if admins.is_empty() {
        warn!("no administrators configured (STOREBOT_ADMIN_IDS); admin panel and notifications are disabled");
    } else {
        info!(count = admins.len(), "administrators configured");
    }

    let data_dir = cfg.data_dir_or_default();
    let export_dir = cfg.export_dir_or_default();
    info!(data = %data_dir.display(), exports = %export_dir.display(), "directories");

    // --- Stores ---
    let store = Arc::new(JsonStore::new(
        data_dir.join("store.json"),
        cfg.default_rate_or_default(),
    ));
    match store.load().await {
        LoadOutcome::Loaded => info!(path = %store.path().display(), "store loaded"),
        LoadOutcome::CreatedDefaults => {
            info!(path = %store.path().display(), "store created with defaults")
        }
        LoadOutcome::RecoveredDefaults => {
            warn!(path = %store.path().display(), "store unreadable; running on defaults")
        }
    }
    let prices: Arc<dyn PriceStorePort> = Arc::clone(&store) as Arc<dyn PriceStorePort>;
    let catalog: Arc<dyn CatalogStorePort> = Arc::clone(&store) as Arc<dyn CatalogStorePort>;

    let orders: Arc<dyn OrderLogPort> = Arc::new(
        SqliteOrderLog::connect(&data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    // --- Telegram gateway ---
    let poll_timeout_secs = cfg.poll_timeout_secs_or_default();
    let client = Arc::new(
        BotApiClient::new(
            cfg.api_base_url_or_default(),
            token,
            Duration::from_secs(poll_timeout_secs),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    let messenger: Arc<dyn MessengerPort> = Arc::clone(&client) as Arc<dyn MessengerPort>;

    // --- Services ---
    let notifier = Arc::new(NotificationDispatcher::new(messenger, admins.clone()));

    let offset = cfg.export_offset();
    let exporter = Arc::new(ExportService::new(Arc::clone(&orders), export_dir, offset));
    let schedule = ExportSchedule::new(cfg.export_weekday(), cfg.export_time(), offset);

    let admin = AdminPanel::new(
        admins,
        Arc::clone(&prices),
        Arc::clone(&catalog),
        Arc::clone(&orders),
        Arc::clone(&exporter),
    );
    let idle_timeout = i64::try_from(cfg.session_idle_secs_or_default())
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX);
    let engine = Arc::new(ConversationEngine::new(
        SessionRegistry::new(idle_timeout),
        prices,
        catalog,
        orders,
        Arc::clone(&notifier),
        admin,
    ));

    // --- Weekly export (reads the order log only) ---
    {
        let exporter = Arc::clone(&exporter);
        let notifier = Arc::clone(&notifier);
        tokio::spawn(async move {
            exporter.run_weekly(schedule, notifier).await;
        });
    }

    // --- Run ---
    let input_port: Arc<dyn InputPort> =
        Arc::new(TelegramPoller::new(client, engine, poll_timeout_secs));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
