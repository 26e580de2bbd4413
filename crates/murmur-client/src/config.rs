//! Transport configuration.

use std::time::Duration;

/// Default server, matching a locally run chat room.
pub const DEFAULT_SERVER: &str = "http://localhost:5000";

/// Bounded retry schedule for a dropped or refused link.
///
/// Delays grow geometrically from `initial_delay` and are capped at
/// `max_delay`. Each delay is spread by `jitter` (a fraction of the delay,
/// both ways) so clients dropped together do not reconnect in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Consecutive failed attempts tolerated before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor between attempts.
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Spread applied to each delay, in `0.0..=1.0`.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(250),
            multiplier: 2,
            max_delay: Duration::from_secs(5),
            jitter: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// Never retry.
    pub fn disabled() -> Self {
        Self { max_attempts: 0, ..Self::default() }
    }

    /// Un-jittered delay before retry number `attempt` (1-based).
    ///
    /// `None` once `attempt` exceeds `max_attempts`.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let factor = self.multiplier.saturating_pow(attempt - 1);
        Some(self.initial_delay.saturating_mul(factor).min(self.max_delay))
    }

    /// Spread `delay` by the jitter fraction. `sample` is uniform in `0.0..1.0`.
    pub fn jittered(&self, delay: Duration, sample: f64) -> Duration {
        let jitter = self.jitter.clamp(0.0, 1.0);
        let spread = delay.mul_f64(jitter);
        delay.saturating_sub(spread).saturating_add(spread.mul_f64(2.0 * sample.clamp(0.0, 1.0)))
    }
}

/// Settings for one connection task.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// Server base URL (`http(s)://` or `ws(s)://`).
    pub server: String,
    /// Retry schedule.
    pub reconnect: ReconnectPolicy,
    /// Time allowed for the WebSocket upgrade plus the Socket.IO handshake.
    pub connect_timeout: Duration,
    /// Capacity of the intent and event channels.
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_owned(),
            reconnect: ReconnectPolicy::default(),
            connect_timeout: Duration::from_secs(10),
            channel_capacity: 64,
        }
    }
}

impl TransportConfig {
    /// Default settings against `server`.
    pub fn new(server: impl Into<String>) -> Self {
        Self { server: server.into(), ..Self::default() }
    }
}
