mod config;

use std::sync::Arc;

use innohub_client::{CallableStore, ClientConfig};
use innohub_notifications::{NoticeKind, NotificationSync, Session};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::WatchConfig;

/// Largest unread count shown verbatim in the badge log line.
const BADGE_CAP: u64 = 99;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let watch_config = match WatchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("innohub-notify: {e}");
            std::process::exit(2);
        }
    };

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "innohub_cli=info,innohub_notifications=info".into());
    if watch_config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // --- Configuration ---
    let client_config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid client configuration");
            std::process::exit(2);
        }
    };
    tracing::info!(
        endpoint = %client_config.notifications_endpoint(),
        user_id = %watch_config.user_id,
        interval_secs = watch_config.refresh_interval_secs,
        "Loaded configuration"
    );

    // --- Store and engine ---
    let store = match CallableStore::new(&client_config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let engine = Arc::new(NotificationSync::new(Arc::new(store)));

    // --- Session ---
    let session = Session::new();
    let follower = tokio::spawn(Arc::clone(&engine).follow_session(session.subscribe()));
    let notices = tokio::spawn(log_notices(engine.notices()));
    session.sign_in(watch_config.user_id.clone());

    // --- Watch loop ---
    let mut state_rx = engine.subscribe();
    let mut interval = tokio::time::interval(watch_config.refresh_interval());
    // The session follower performs the initial fetch.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = interval.tick() => {
                spawn_refresh(&engine);
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                tracing::info!(
                    phase = ?state.phase(),
                    items = state.items.len(),
                    unread = state.unread_count,
                    badge = %state.badge_label(BADGE_CAP).unwrap_or_default(),
                    error = state.last_error.as_deref().unwrap_or(""),
                    "Notification state changed"
                );
            }
        }
    }

    // Dropping the session ends the follower; the engine clears its state.
    session.sign_out();
    drop(session);
    if let Err(e) = follower.await {
        tracing::warn!(error = %e, "Session follower ended abnormally");
    }
    notices.abort();
    tracing::info!("innohub-notify stopped");
}

/// Refresh in the background so the watch loop keeps handling shutdown
/// and state changes while the fetch is in flight.
fn spawn_refresh(engine: &Arc<NotificationSync>) -> JoinHandle<()> {
    let engine = Arc::clone(engine);
    tokio::spawn(async move { engine.refresh().await })
}

/// Log every notice the engine broadcasts until the channel closes.
async fn log_notices(mut receiver: broadcast::Receiver<innohub_notifications::SyncNotice>) {
    loop {
        match receiver.recv().await {
            Ok(notice) => match notice.kind {
                NoticeKind::Error => {
                    tracing::warn!(action = notice.action, message = %notice.message, "Sync error")
                }
                NoticeKind::Info => {
                    tracing::info!(action = notice.action, message = %notice.message, "Sync notice")
                }
            },
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Notice log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
