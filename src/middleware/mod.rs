mod error_handler;
mod rate_limit;

pub use error_handler::log_errors;
pub use rate_limit::{
    Clock, Decision, LimitScope, ManualClock, REJECTION_MESSAGE, RateLimitPolicy, RateLimiter,
    SystemClock, rate_limit,
};
