use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client as RedisClient, Cmd};
use tracing::debug;

use super::{session_key, CallSession, SessionError, SessionStore};

/// Sessions as JSON strings under `voicepe:call:<CallSid>` with `EX` expiry.
///
/// Holds one multiplexed connection for the life of the process; each call
/// clones the handle, which shares the underlying socket.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    ttl: Duration,
}

impl RedisSessionStore {
    pub async fn new(client: RedisClient, ttl: Duration) -> Result<Self, SessionError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn, ttl })
    }
}

fn save_command(session: &CallSession, ttl: Duration) -> Result<Cmd, SessionError> {
    let json = serde_json::to_string(session)?;
    let mut cmd = redis::cmd("SET");
    cmd.arg(session_key(&session.call_sid))
        .arg(json)
        .arg("EX")
        .arg(ttl.as_secs().max(1));
    Ok(cmd)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, call_sid: &str) -> Result<Option<CallSession>, SessionError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(session_key(call_sid))
            .query_async(&mut conn)
            .await?;
        raw.map(|json| serde_json::from_str(&json))
            .transpose()
            .map_err(SessionError::from)
    }

    async fn save(&self, session: &CallSession) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        save_command(session, self.ttl)?
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(call_sid = %session.call_sid, stage = ?session.stage, "Session saved");
        Ok(())
    }

    async fn clear(&self, call_sid: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(session_key(call_sid))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}
