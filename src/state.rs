use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::SubmissionRateLimiter;
use crate::relay::FormRelay;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub relay: FormRelay,
    pub submission_limiter: SubmissionRateLimiter,
}
