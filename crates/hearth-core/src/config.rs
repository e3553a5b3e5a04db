// ── Runtime onboarding configuration ──
//
// Timing and policy knobs for discovery, session establishment, and
// inventory sync. The embedding shell constructs an `OnboardingConfig`
// and hands it in -- core never reads config files.

use std::time::Duration;

use hearth_link::DiscoveryConfig;

/// What a background continuation loop does when a page fetch fails.
///
/// The failure itself is never surfaced to the caller; this only
/// controls whether the loop gives the same page another chance before
/// terminating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundRetry {
    /// Log the failure and stop the loop (default).
    #[default]
    Stop,
    /// Retry the same page up to `max_attempts` times, then stop.
    Retry { max_attempts: u32 },
}

/// Configuration for one onboarding stack instance.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Per-device capability probe budget during discovery.
    pub probe_timeout: Duration,
    /// Budget for opening the transport-level connection.
    pub connect_timeout: Duration,
    /// Budget for the whole proof-of-possession handshake.
    pub handshake_timeout: Duration,
    /// Pause between background inventory page fetches, to avoid
    /// request bursts against the cloud API.
    pub page_delay: Duration,
    /// Background page-failure policy.
    pub background_retry: BackgroundRetry,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(15),
            handshake_timeout: Duration::from_secs(30),
            page_delay: Duration::from_millis(300),
            background_retry: BackgroundRetry::default(),
        }
    }
}

impl OnboardingConfig {
    /// Derive the discovery tuning handed to `hearth_link::discover`.
    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            probe_timeout: self.probe_timeout,
        }
    }
}
