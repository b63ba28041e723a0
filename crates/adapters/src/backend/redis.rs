// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis / KeyDB lock backend
//!
//! Each lock is a hash with `owner` and `count` fields whose lease is the
//! key's native TTL, so expiry needs no sweeping. Acquire and release run as
//! Lua scripts to keep the ownership check and the write atomic. A full
//! release publishes on `<key>:notify` for subscribers that want to wake
//! waiters without polling.

use super::{BackendError, LockBackend};
use async_trait::async_trait;
use fred::clients::Pool;
use fred::error::{Error as FredError, ErrorKind};
use fred::interfaces::{ClientLike, KeysInterface, LuaInterface};
use fred::types::config::Config;
use fred::types::Builder;
use std::time::Duration;
use vl_core::{AcquireOutcome, LockOwner, ReleaseOutcome, MAX_HORIZON};

const ACQUIRE_SCRIPT: &str = r#"
    local owner = redis.call('HGET', KEYS[1], 'owner')
    if not owner then
        redis.call('HSET', KEYS[1], 'owner', ARGV[1], 'count', 1)
        redis.call('PEXPIRE', KEYS[1], ARGV[2])
        return 'acquired'
    end
    if owner == ARGV[1] then
        local depth = redis.call('HINCRBY', KEYS[1], 'count', 1)
        if redis.call('PTTL', KEYS[1]) < tonumber(ARGV[2]) then
            redis.call('PEXPIRE', KEYS[1], ARGV[2])
        end
        return 'reentered:' .. depth
    end
    return 'held:' .. owner
"#;

const RELEASE_SCRIPT: &str = r#"
    local owner = redis.call('HGET', KEYS[1], 'owner')
    if not owner then
        return 'not_held'
    end
    if owner ~= ARGV[1] then
        return 'not_owner:' .. owner
    end
    local count = redis.call('HINCRBY', KEYS[1], 'count', -1)
    if count > 0 then
        return 'decremented:' .. count
    end
    redis.call('DEL', KEYS[1])
    redis.call('PUBLISH', KEYS[1] .. ':notify', 'released')
    return 'released'
"#;

const DEFAULT_PREFIX: &str = "versalock:";

/// [`LockBackend`] over a fred connection pool
#[derive(Clone)]
pub struct RedisLockBackend {
    pool: Pool,
    prefix: String,
}

impl RedisLockBackend {
    pub fn new(pool: Pool) -> Self {
        Self {
            pool,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Build, connect and verify a pool for `url` (`redis://host:port`)
    pub async fn connect(url: &str, pool_size: usize) -> Result<Self, BackendError> {
        let config = Config::from_url(url).map_err(map_error)?;
        let pool = Builder::from_config(config)
            .build_pool(pool_size.max(1))
            .map_err(map_error)?;
        pool.init().await.map_err(map_error)?;
        tracing::info!(url, pool_size, "lock backend connected");
        Ok(Self::new(pool))
    }

    /// Namespace every lock key under `prefix`
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl LockBackend for RedisLockBackend {
    async fn acquire(
        &self,
        key: &str,
        owner: &LockOwner,
        lease: Duration,
    ) -> Result<AcquireOutcome, BackendError> {
        let lease_ms = lease_arg(lease);
        let reply: String = self
            .pool
            .eval(
                ACQUIRE_SCRIPT,
                vec![self.key(key)],
                vec![owner.as_str().to_string(), lease_ms],
            )
            .await
            .map_err(map_error)?;
        parse_acquire(&reply)
    }

    async fn release(&self, key: &str, owner: &LockOwner) -> Result<ReleaseOutcome, BackendError> {
        let reply: String = self
            .pool
            .eval(
                RELEASE_SCRIPT,
                vec![self.key(key)],
                vec![owner.as_str().to_string()],
            )
            .await
            .map_err(map_error)?;
        parse_release(&reply)
    }

    async fn force_release(&self, key: &str) -> Result<bool, BackendError> {
        let removed: i64 = self.pool.del(self.key(key)).await.map_err(map_error)?;
        Ok(removed > 0)
    }

    async fn remaining(&self, key: &str) -> Result<Option<Duration>, BackendError> {
        let ttl_ms: i64 = self.pool.pttl(self.key(key)).await.map_err(map_error)?;
        Ok(ttl_from_pttl(ttl_ms))
    }

    async fn purge_expired(&self) -> Result<usize, BackendError> {
        // TTLs expire keys server-side
        Ok(0)
    }
}

fn map_error(err: FredError) -> BackendError {
    match err.kind() {
        ErrorKind::IO | ErrorKind::Timeout | ErrorKind::Canceled => {
            BackendError::Unavailable(err.to_string())
        }
        _ => BackendError::Protocol(err.to_string()),
    }
}

/// PTTL answers -2 for a missing key and -1 for a key without expiry
/// PEXPIRE argument: at least 1ms, clamped so Redis never sees an out-of-range TTL
fn lease_arg(lease: Duration) -> String {
    lease.min(MAX_HORIZON).as_millis().max(1).to_string()
}

fn ttl_from_pttl(ttl_ms: i64) -> Option<Duration> {
    u64::try_from(ttl_ms).ok().map(Duration::from_millis)
}

fn parse_acquire(reply: &str) -> Result<AcquireOutcome, BackendError> {
    let (tag, value) = split_reply(reply);
    match (tag, value) {
        ("acquired", None) => Ok(AcquireOutcome::Acquired),
        ("reentered", Some(depth)) => Ok(AcquireOutcome::Reentered {
            depth: parse_count(depth, reply)?,
        }),
        ("held", Some(owner)) => Ok(AcquireOutcome::Held {
            owner: LockOwner::new(owner),
        }),
        _ => Err(unexpected(reply)),
    }
}

fn parse_release(reply: &str) -> Result<ReleaseOutcome, BackendError> {
    let (tag, value) = split_reply(reply);
    match (tag, value) {
        ("released", None) => Ok(ReleaseOutcome::Released),
        ("not_held", None) => Ok(ReleaseOutcome::NotHeld),
        ("decremented", Some(remaining)) => Ok(ReleaseOutcome::Decremented {
            remaining: parse_count(remaining, reply)?,
        }),
        ("not_owner", Some(owner)) => Ok(ReleaseOutcome::NotOwner {
            owner: LockOwner::new(owner),
        }),
        _ => Err(unexpected(reply)),
    }
}

/// Split `tag:value`; owners may themselves contain colons
fn split_reply(reply: &str) -> (&str, Option<&str>) {
    match reply.split_once(':') {
        Some((tag, value)) => (tag, Some(value)),
        None => (reply, None),
    }
}

fn parse_count(value: &str, reply: &str) -> Result<u32, BackendError> {
    value.parse().map_err(|_| unexpected(reply))
}

fn unexpected(reply: &str) -> BackendError {
    BackendError::Protocol(format!("unexpected script reply: {reply}"))
}

#[cfg(test)]
#[path = "redis_tests.rs"]
mod tests;
