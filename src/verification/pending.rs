use chrono::{DateTime, Utc};
use dashmap::DashMap;
use poise::serenity_prelude::{ChannelId, GuildId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{BotError, Result};
use crate::managers::config_store::write_atomic;

/// A verification request waiting for a moderator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub email: String,
    pub audit_channel_id: ChannelId,
    pub audit_message_id: MessageId,
    pub submitted_at: DateTime<Utc>,
}

/// On-disk layout of `pending.json`
#[derive(Debug, Default, Serialize, Deserialize)]
struct PendingFile {
    version: u32,
    /// User ID (snowflake as string) -> request
    reviews: HashMap<String, PendingReview>,
}

const PENDING_FILE_VERSION: u32 = 1;

/// Requests that have been posted to an audit channel but not decided yet.
///
/// The audit message buttons stay authoritative; this store only makes the
/// outstanding requests visible and survives restarts.
pub struct PendingStore {
    reviews: DashMap<UserId, PendingReview>,
    save_lock: Mutex<()>,
    path: PathBuf,
}

impl PendingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            reviews: DashMap::new(),
            save_lock: Mutex::new(()),
            path: path.into(),
        }
    }

    /// Load from a JSON file, or start empty if it does not exist
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        let path_str = store.path.display().to_string();

        let file: PendingFile = match tokio::fs::read_to_string(&store.path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| BotError::ConfigParse {
                path: path_str.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PendingFile::default(),
            Err(e) => {
                return Err(BotError::StateLoad {
                    path: path_str,
                    source: e,
                })
            }
        };

        for review in file.reviews.into_values() {
            store.reviews.insert(review.user_id, review);
        }

        info!("Loaded {} pending verification(s) from {}", store.len(), path_str);
        Ok(store)
    }

    /// Save to the JSON file atomically
    pub async fn save(&self) -> Result<()> {
        let _guard = self.save_lock.lock().await;
        let file = PendingFile {
            version: PENDING_FILE_VERSION,
            reviews: self
                .reviews
                .iter()
                .map(|entry| (entry.key().to_string(), entry.value().clone()))
                .collect(),
        };

        let content = serde_json::to_string_pretty(&file)?;
        write_atomic(&self.path, content.as_bytes()).await
    }

    /// Record a request, replacing any earlier one from the same user
    pub fn insert(&self, review: PendingReview) -> Option<PendingReview> {
        debug!(
            "Pending verification for {} in guild {}",
            review.user_id, review.guild_id
        );
        self.reviews.insert(review.user_id, review)
    }

    #[cfg(test)]
    pub fn get(&self, user_id: UserId) -> Option<PendingReview> {
        self.reviews.get(&user_id).map(|r| r.clone())
    }

    pub fn remove(&self, user_id: UserId) -> Option<PendingReview> {
        self.reviews.remove(&user_id).map(|(_, review)| review)
    }

    #[cfg(test)]
    pub fn is_pending(&self, user_id: UserId) -> bool {
        self.reviews.contains_key(&user_id)
    }

    /// Requests of one guild, oldest first
    pub fn for_guild(&self, guild_id: GuildId) -> Vec<PendingReview> {
        let mut reviews: Vec<PendingReview> = self
            .reviews
            .iter()
            .filter(|entry| entry.guild_id == guild_id)
            .map(|entry| entry.value().clone())
            .collect();
        reviews.sort_by_key(|r| r.submitted_at);
        reviews
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }
}

/// Shared pending store type
pub type SharedPendingStore = Arc<PendingStore>;

pub fn create_shared_pending_store(store: PendingStore) -> SharedPendingStore {
    Arc::new(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn review(user: u64, guild: u64, minutes_ago: i64) -> PendingReview {
        PendingReview {
            user_id: UserId::new(user),
            guild_id: GuildId::new(guild),
            email: format!("user{}@uclan.ac.uk", user),
            audit_channel_id: ChannelId::new(500),
            audit_message_id: MessageId::new(600 + user),
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_insert_replaces_and_filters_by_guild() {
        let store = PendingStore::new("unused.json");
        store.insert(review(1, 10, 5));
        store.insert(review(2, 10, 30));
        store.insert(review(3, 20, 1));

        let replaced = store.insert(review(1, 10, 0));
        assert!(replaced.is_some());
        assert_eq!(store.len(), 3);

        let guild_reviews = store.for_guild(GuildId::new(10));
        let users: Vec<UserId> = guild_reviews.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![UserId::new(2), UserId::new(1)]);

        assert!(store.remove(UserId::new(3)).is_some());
        assert!(!store.is_pending(UserId::new(3)));
    }

    #[tokio::test]
    async fn test_persisted_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");

        let store = PendingStore::load(&path).await.unwrap();
        assert!(store.is_empty());

        let original = review(7, 10, 3);
        store.insert(original.clone());
        store.save().await.unwrap();

        let reloaded = PendingStore::load(&path).await.unwrap();
        assert_eq!(reloaded.get(UserId::new(7)), Some(original));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_file_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pending.json");
        let store = Arc::new(PendingStore::new(&path));

        let handles: Vec<_> = (1..=32u64)
            .map(|user| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.insert(review(user, 10, 0));
                    store.save().await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = PendingStore::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 32);
    }
}
