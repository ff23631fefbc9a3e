use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    hits: u32,
}

impl Window {
    fn open(now: Instant) -> Self {
        Self { opened: now, hits: 0 }
    }

    /// Count one hit, or return the time left until the window reopens.
    fn admit(&mut self, now: Instant, limit: u32, length: Duration) -> Result<(), Duration> {
        let age = now.duration_since(self.opened);
        if age >= length {
            *self = Self::open(now);
        } else if self.hits >= limit {
            return Err(length - age);
        }
        self.hits += 1;
        Ok(())
    }

    fn is_open(&self, now: Instant, length: Duration) -> bool {
        now.duration_since(self.opened) < length
    }
}

/// Fixed-window throttle for relayed submissions.
///
/// A client gets `per_form` submissions per window for each form type and
/// `per_client` across all form types, so rotating the form type in the URL
/// does not lift the cap. Every attempt counts toward the client total.
pub struct SubmissionRateLimiter {
    per_form: u32,
    per_client: u32,
    window: Duration,
    forms: DashMap<(IpAddr, String), Window>,
    clients: DashMap<IpAddr, Window>,
}

impl SubmissionRateLimiter {
    pub fn new(per_form: u32, per_client: u32, window: Duration) -> Self {
        Self {
            per_form,
            per_client,
            window,
            forms: DashMap::new(),
            clients: DashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.rate_limit,
            config.client_rate_limit,
            Duration::from_secs(config.rate_limit_window_secs.max(1)),
        )
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a submission of `form_type` from `ip`.
    pub fn admit(&self, ip: IpAddr, form_type: &str) -> Result<(), Duration> {
        let now = Instant::now();

        self.clients
            .entry(ip)
            .or_insert_with(|| Window::open(now))
            .admit(now, self.per_client, self.window)?;

        self.forms
            .entry((ip, form_type.to_string()))
            .or_insert_with(|| Window::open(now))
            .admit(now, self.per_form, self.window)
    }

    /// Forget every window that has already closed.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.clients.retain(|_, w| w.is_open(now, self.window));
        self.forms.retain(|_, w| w.is_open(now, self.window));
    }
}
