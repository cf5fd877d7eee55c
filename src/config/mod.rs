pub mod serde_compat;
pub mod server;
pub mod settings;

pub use server::{BotConfig, ServerConfig};
pub use settings::Settings;
