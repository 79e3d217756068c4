//! Shamebot Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use teloxide::{prelude::*, types::{AllowedUpdate, ChatMemberUpdated, Update}};
use teloxide::dispatching::UpdateHandler;
use teloxide::update_listeners::Polling;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use shamebot::{
    config::{Settings, StoreBackend},
    database::{create_pool, health_check, run_migrations, MembershipStore, MemoryStore, PgMembershipStore},
    handlers::{handle_chat_member, handle_group_message, handle_my_chat_member, handle_new_chat_members},
    services::{ServiceFactory, TelegramMessenger},
    utils::{logging, SystemClock},
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging, the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", shamebot::info());

    let store = open_store(&settings).await?;

    // Initialize bot
    let mut bot = Bot::new(&settings.bot.token);
    if let Some(api_url) = &settings.bot.api_url {
        info!(api_url = %api_url, "Using custom Bot API server");
        bot = bot.set_api_url(url::Url::parse(api_url)?);
    }

    // Initialize services
    info!("Initializing services...");
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
    let services = ServiceFactory::new(&settings, store, messenger, Arc::new(SystemClock));

    // Start the scheduler alongside the dispatcher
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = services.scheduler.clone().spawn(shutdown_rx);

    let services_arc = Arc::new(services);

    // Create dispatcher with dependencies registered
    let mut dispatcher = Dispatcher::builder(bot.clone(), create_handler())
        .dependencies(dptree::deps![services_arc])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.kind);
        })
        .enable_ctrlc_handler()
        .build();

    // chat_member updates are only delivered when asked for explicitly
    let listener = Polling::builder(bot)
        .allowed_updates(vec![
            AllowedUpdate::Message,
            AllowedUpdate::MyChatMember,
            AllowedUpdate::ChatMember,
        ])
        .delete_webhook()
        .await
        .build();

    info!("Shamebot is ready, starting polling...");

    dispatcher
        .dispatch_with_listener(listener, LoggingErrorHandler::with_custom_text("Error from the update listener"))
        .await;

    info!("Dispatcher stopped, waiting for the scheduler...");
    if shutdown_tx.send(true).is_err() {
        warn!("Scheduler already stopped");
    }
    if let Err(e) = scheduler_handle.await {
        error!(error = %e, "Scheduler task failed");
    }

    info!("Shamebot has been shut down.");

    Ok(())
}

/// Open the configured membership store
async fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn MembershipStore>> {
    match settings.database.backend {
        StoreBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&settings.database).await?;
            health_check(&pool).await?;

            info!("Running database migrations...");
            run_migrations(&pool).await?;

            Ok(Arc::new(PgMembershipStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, all state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle new chat members
                    dptree::filter(|msg: Message| msg.new_chat_members().is_some())
                        .endpoint(handle_new_members)
                )
                .branch(
                    // Handle regular messages
                    dptree::endpoint(handle_messages)
                )
        )
        .branch(
            // Bot added, promoted, demoted or removed
            Update::filter_my_chat_member()
                .endpoint(handle_my_chat_member_updates)
        )
        .branch(
            // Other users joining, leaving or changing role
            Update::filter_chat_member()
                .endpoint(handle_chat_member_updates)
        )
}

/// Handle regular messages
async fn handle_messages(msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    if let Err(e) = handle_group_message(msg, (*services).clone()).await {
        error!(chat_id = chat_id, error = %e, "Error handling message, event dropped");
        return Err(e.into());
    }

    Ok(())
}

/// Handle new chat members
async fn handle_new_members(msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    if let Err(e) = handle_new_chat_members(msg, (*services).clone()).await {
        error!(chat_id = chat_id, error = %e, "Error handling new chat members, event dropped");
        return Err(e.into());
    }

    Ok(())
}

/// Handle updates of the bot's own membership
async fn handle_my_chat_member_updates(
    update: ChatMemberUpdated,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let chat_id = update.chat.id.0;
    if let Err(e) = handle_my_chat_member(update, (*services).clone()).await {
        error!(chat_id = chat_id, error = %e, "Error handling bot status change");
        return Err(e.into());
    }

    Ok(())
}

/// Handle membership updates of other users
async fn handle_chat_member_updates(
    update: ChatMemberUpdated,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let chat_id = update.chat.id.0;
    if let Err(e) = handle_chat_member(update, (*services).clone()).await {
        error!(chat_id = chat_id, error = %e, "Error handling chat member update");
        return Err(e.into());
    }

    Ok(())
}
