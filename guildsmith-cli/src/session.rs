//! Gateway session — scoped acquire/ready/release around serenity.
//!
//! `connect` blocks until the gateway reports ready, so callers can run
//! their work against live guild state; `close` tears the connection down
//! and is called on success and error paths alike.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Http, Ready, UserId};
use serenity::async_trait;
use serenity::gateway::ShardManager;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// How long to wait for the gateway ready event before giving up.
const READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Hands the ready-time context back to the caller, exactly once.
struct ReadyRelay {
    tx: Mutex<Option<oneshot::Sender<(Arc<Http>, UserId, String)>>>,
}

#[async_trait]
impl EventHandler for ReadyRelay {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(bot = %ready.user.name, "gateway ready");
        if let Some(tx) = self.tx.lock().unwrap().take() {
            let _ = tx.send((ctx.http.clone(), ready.user.id, ready.user.name.to_string()));
        }
    }
}

/// A connected bot session. REST calls go through [`Session::http`]; the
/// gateway task runs in the background until [`Session::close`].
pub struct Session {
    http: Arc<Http>,
    bot_user_id: UserId,
    bot_name: String,
    shard_manager: Arc<ShardManager>,
    gateway: JoinHandle<serenity::Result<()>>,
}

impl Session {
    /// Authenticate and block until guild state is available.
    pub async fn connect(token: &str) -> Result<Session> {
        // Probe the REST API before spinning up the gateway; a bad token
        // fails here with a crisp message instead of a shard retry loop.
        Http::new(token)
            .get_current_user()
            .await
            .context("invalid bot token — check your token and try again")?;

        let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
        let (tx, rx) = oneshot::channel();
        let mut client = Client::builder(token, intents)
            .event_handler(ReadyRelay {
                tx: Mutex::new(Some(tx)),
            })
            .await
            .context("failed to build gateway client")?;

        let shard_manager = client.shard_manager.clone();
        let gateway = tokio::spawn(async move { client.start().await });

        match tokio::time::timeout(READY_TIMEOUT, rx).await {
            Ok(Ok((http, bot_user_id, bot_name))) => Ok(Session {
                http,
                bot_user_id,
                bot_name,
                shard_manager,
                gateway,
            }),
            Ok(Err(_)) => {
                // Sender dropped: the gateway task died before ready.
                match gateway.await {
                    Ok(Err(e)) => Err(e).context("gateway connection failed"),
                    _ => bail!("gateway connection closed before ready"),
                }
            }
            Err(_) => {
                shard_manager.shutdown_all().await;
                bail!("timed out waiting for the gateway ready event");
            }
        }
    }

    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// The service account the session is authenticated as.
    pub fn bot_user_id(&self) -> UserId {
        self.bot_user_id
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Disconnect and wait for the gateway task to finish.
    pub async fn close(self) {
        self.shard_manager.shutdown_all().await;
        let _ = self.gateway.await;
    }
}
