pub mod config_store;
pub mod rate_limiter;

pub use config_store::{create_shared_config_store, ConfigStore, SharedConfigStore};
pub use rate_limiter::{create_shared_rate_limiter, RateLimitDecision, SharedRateLimiter};
