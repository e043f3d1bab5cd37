//! Session gate: credential check and active-role tracking.
//!
//! Two fixed credential pairs switch a client into the staff desk or the public display. This
//! is a mode switch for the ward, not an access-control boundary: the pairs are constants
//! compiled into the binary.
//!
//! Sessions are held in memory, the equivalent of a browser tab session. Each session stores
//! its role and when it was last used. A session expires after sitting idle for the configured
//! TTL, and the registry never holds more than its cap: opening one more evicts the least
//! recently used session.

use crate::constants::{MAX_SESSIONS, SESSION_IDLE_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Access mode of a session.
///
/// Persisted and transmitted as `"STAFF"` or `"DISPLAY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Staff,
    Display,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "STAFF",
            Role::Display => "DISPLAY",
        }
    }

    /// Subtitle of the view this role lands on.
    pub fn view_title(self) -> &'static str {
        match self {
            Role::Staff => "Staff Management",
            Role::Display => "Live Status Board",
        }
    }

    /// Whether this role may change records.
    pub fn can_edit(self) -> bool {
        match self {
            Role::Staff => true,
            Role::Display => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STAFF" => Ok(Role::Staff),
            "DISPLAY" => Ok(Role::Display),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

pub const AUTH_FAILURE_MESSAGE: &str = "Invalid ID or Password. Please contact IT.";

/// The single failure returned for any rejected login.
///
/// It carries no detail about which field was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", AUTH_FAILURE_MESSAGE)]
pub struct AuthFailure;

struct Credential {
    identifier: &'static str,
    secret: &'static str,
    role: Role,
}

const CREDENTIALS: [Credential; 2] = [
    Credential {
        identifier: "staff",
        secret: "staff2026",
        role: Role::Staff,
    },
    Credential {
        identifier: "display",
        secret: "display123",
        role: Role::Display,
    },
];

/// Checks an identifier/secret pair against the fixed credential table.
pub fn authenticate(identifier: &str, secret: &str) -> Result<Role, AuthFailure> {
    CREDENTIALS
        .iter()
        .find(|c| c.identifier == identifier && c.secret == secret)
        .map(|c| c.role)
        .ok_or(AuthFailure)
}

/// An opened session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: Role,
}

struct SessionEntry {
    role: Role,
    last_seen: Instant,
    /// Monotonic use counter; the smallest value is the least recently used session.
    touched: u64,
}

#[derive(Default)]
struct Registry {
    entries: HashMap<String, SessionEntry>,
    clock: u64,
}

impl Registry {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn prune_expired(&mut self, now: Instant, idle_ttl: Duration) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_seen) < idle_ttl);
        let expired = before - self.entries.len();
        if expired > 0 {
            tracing::debug!(expired, "expired idle sessions");
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(token, _)| token.clone());
        if let Some(token) = oldest {
            if let Some(entry) = self.entries.remove(&token) {
                tracing::info!(role = %entry.role, "session evicted");
            }
        }
    }
}

/// In-memory registry of active sessions keyed by opaque token.
#[derive(Clone)]
pub struct SessionGate {
    registry: Arc<Mutex<Registry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::with_limits(Duration::from_secs(SESSION_IDLE_TTL_SECS), MAX_SESSIONS)
    }
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate with an explicit idle TTL and session cap. A cap of zero is treated as one.
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Authenticates and, on success, opens a session holding the matched role.
    pub fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthFailure> {
        let role = match authenticate(identifier, secret) {
            Ok(role) => role,
            Err(e) => {
                tracing::info!("rejected login attempt");
                return Err(e);
            }
        };

        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        {
            let mut registry = self.registry();
            registry.prune_expired(now, self.idle_ttl);
            while registry.entries.len() >= self.max_sessions {
                registry.evict_least_recent();
            }
            let touched = registry.tick();
            registry.entries.insert(
                token.clone(),
                SessionEntry {
                    role,
                    last_seen: now,
                    touched,
                },
            );
        }
        tracing::info!(role = %role, "session opened");

        Ok(Session { token, role })
    }

    /// Role of an active session, `None` when the token is unknown, logged out or expired.
    ///
    /// A successful lookup counts as use and restarts the idle timer.
    pub fn role(&self, token: &str) -> Option<Role> {
        let now = Instant::now();
        let mut registry = self.registry();
        let touched = registry.tick();
        let expired = match registry.entries.get_mut(token) {
            Some(entry) if now.duration_since(entry.last_seen) < self.idle_ttl => {
                entry.last_seen = now;
                entry.touched = touched;
                return Some(entry.role);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            registry.entries.remove(token);
            tracing::debug!("session expired");
        }
        None
    }

    /// Clears a session. Returns whether a session was active for `token`.
    pub fn logout(&self, token: &str) -> bool {
        let removed = self.registry().entries.remove(token);
        if let Some(entry) = &removed {
            tracing::info!(role = %entry.role, "session closed");
        }
        removed.is_some()
    }

    /// Number of sessions that have not expired.
    pub fn active_sessions(&self) -> usize {
        let mut registry = self.registry();
        registry.prune_expired(Instant::now(), self.idle_ttl);
        registry.entries.len()
    }
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGate")
            .field("active_sessions", &self.active_sessions())
            .field("idle_ttl", &self.idle_ttl)
            .field("max_sessions", &self.max_sessions)
            .finish()
    }
}
