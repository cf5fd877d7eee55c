use poise::serenity_prelude::GuildId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::config::{BotConfig, ServerConfig};
use crate::error::{BotError, Result};

/// Per-guild settings mirrored to a JSON file.
///
/// Every write goes through [`ConfigStore::upsert`], which saves before
/// returning, so the file always reflects the last acknowledged change.
/// A save holds `save_lock` from serialization through the rename.
pub struct ConfigStore {
    config: RwLock<BotConfig>,
    save_lock: Mutex<()>,
    path: PathBuf,
}

impl ConfigStore {
    /// Create an empty store that will persist to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            config: RwLock::new(BotConfig::new()),
            save_lock: Mutex::new(()),
            path: path.into(),
        }
    }

    /// Load from a JSON file. A missing file yields an empty store.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let path_str = path.display().to_string();

        let config = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<BotConfig>(&content).map_err(|e| {
                BotError::ConfigParse {
                    path: path_str.clone(),
                    source: e,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {}, starting with an empty config", path_str);
                BotConfig::new()
            }
            Err(e) => {
                return Err(BotError::ConfigLoad {
                    path: path_str,
                    source: e,
                })
            }
        };

        info!("Loaded config for {} guild(s) from {}", config.servers.len(), path_str);

        Ok(Self {
            config: RwLock::new(config),
            save_lock: Mutex::new(()),
            path,
        })
    }

    /// Save to the JSON file atomically
    pub async fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        let content = {
            let config = self.config.read().await;
            serde_json::to_string_pretty(&*config)?
        };

        write_atomic(&self.path, content.as_bytes()).await?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Settings for a guild, `None` if it was never configured
    pub async fn get(&self, guild_id: GuildId) -> Option<ServerConfig> {
        let config = self.config.read().await;
        config.server(guild_id).cloned()
    }

    /// Get-or-create the guild entry, apply `mutate`, then save
    pub async fn upsert<F>(&self, guild_id: GuildId, mutate: F) -> Result<ServerConfig>
    where
        F: FnOnce(&mut ServerConfig),
    {
        let updated = {
            let mut config = self.config.write().await;
            let server = config.server_mut(guild_id);
            mutate(server);
            server.clone()
        };

        self.save().await?;
        Ok(updated)
    }

    /// Copy of the whole map
    #[cfg(test)]
    pub async fn snapshot(&self) -> BotConfig {
        self.config.read().await.clone()
    }
}

/// Write to `<path>.tmp` and rename over `path`, creating parent directories
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let path_str = path.display().to_string();
    let save_err = |e: std::io::Error| BotError::StateSave {
        path: path_str.clone(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(save_err)?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    tokio::fs::write(&temp_path, content).await.map_err(save_err)?;
    tokio::fs::rename(&temp_path, path).await.map_err(save_err)?;

    Ok(())
}

/// Shared config store type
pub type SharedConfigStore = Arc<ConfigStore>;

pub fn create_shared_config_store(store: ConfigStore) -> SharedConfigStore {
    Arc::new(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use poise::serenity_prelude::{ChannelId, RoleId};
    use std::time::Duration;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::load(dir.path().join("config.json")).await.unwrap();

        assert!(store.snapshot().await.servers.is_empty());
        assert!(store.get(GuildId::new(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ConfigStore::load(&path).await;
        assert!(matches!(result, Err(BotError::ConfigParse { .. })));
    }

    #[tokio::test]
    async fn test_upsert_only_touches_one_field() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("config.json"));
        let guild = GuildId::new(10);

        store
            .upsert(guild, |s| {
                s.unverified_role_id = Some(RoleId::new(5));
                s.enable_rate_limit();
            })
            .await
            .unwrap();

        let before = store.get(guild).await.unwrap();
        store
            .upsert(guild, |s| s.member_audit_channel_id = Some(ChannelId::new(6)))
            .await
            .unwrap();
        let after = store.get(guild).await.unwrap();

        assert_eq!(after.member_audit_channel_id, Some(ChannelId::new(6)));
        assert_eq!(
            ServerConfig {
                member_audit_channel_id: before.member_audit_channel_id,
                ..after.clone()
            },
            before
        );
        assert!(store.get(GuildId::new(11)).await.is_none());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = ConfigStore::new(&path);

        store
            .upsert(GuildId::new(1), |s| {
                s.verification_channel_id = Some(ChannelId::new(2));
                s.rate_limit_duration = Duration::from_secs(15 * 60);
            })
            .await
            .unwrap();
        store
            .upsert(GuildId::new(3), |s| s.rate_limit_enabled = true)
            .await
            .unwrap();

        let reloaded = ConfigStore::load(&path).await.unwrap();
        assert_eq!(reloaded.snapshot().await, store.snapshot().await);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"servers\""));
        assert!(!dir.path().join("nested").join("config.json.tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_all_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = Arc::new(ConfigStore::new(&path));

        let handles: Vec<_> = (1..=64u64)
            .map(|guild| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert(GuildId::new(guild), |s| {
                            s.unverified_role_id = Some(RoleId::new(guild))
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = ConfigStore::load(&path).await.unwrap();
        let snapshot = reloaded.snapshot().await;
        assert_eq!(snapshot.servers.len(), 64);
        assert_eq!(snapshot, store.snapshot().await);
    }
}
