use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use muraciet_bot::config::BotConfig;
use muraciet_bot::state::AppState;
use muraciet_bot::{background, dispatcher, session};
use muraciet_telegram::BotApi;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muraciet_bot=debug,muraciet_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = BotConfig::from_env();
    tracing::info!(
        executor_chat_id = ?config.executor_chat_id,
        admins = config.admin_user_ids.len(),
        "Loaded configuration"
    );

    // --- Storage ---
    let storage = muraciet_db::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Storage ready");

    // --- Bot identity (also validates the token) ---
    let api = BotApi::new(&config.token);
    let me = api.get_me().await.expect("getMe failed: invalid bot token?");
    let bot_username = me.username.expect("Bot account has no username");
    tracing::info!(username = %bot_username, "Bot authenticated");

    let state = Arc::new(AppState::new(api, storage, config, bot_username));

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sla_handle = tokio::spawn(background::sla::run(Arc::clone(&state), cancel.clone()));
    let janitor_handle = tokio::spawn(session::run_janitor(
        Arc::clone(&state.sessions),
        cancel.clone(),
    ));

    // --- Dispatcher ---
    let dispatcher_handle = tokio::spawn(dispatcher::run(Arc::clone(&state), cancel.clone()));

    tokio::signal::ctrl_c().await.expect("Failed to listen for ctrl-c");
    tracing::info!("Shutting down");
    cancel.cancel();
    let _ = tokio::join!(dispatcher_handle, sla_handle, janitor_handle);
}
