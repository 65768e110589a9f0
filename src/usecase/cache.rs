use std::collections::BTreeMap;

use tokio::sync::Mutex;

use crate::domain::comment::Comment;
use crate::repository::errors::StoreError;
use crate::usecase::contracts::KeyValueStore;

pub const DEFAULT_CACHE_KEY: &str = "comentarios_guardados";

/// Cached comments keyed by article id (as a string), newest first.
pub type Partitions = BTreeMap<String, Vec<Comment>>;

/// Local durable comment cache: a single key in a [`KeyValueStore`] holding
/// every partition. The value is always read and written as a whole, and
/// every read-modify-write runs under one mutex so concurrent mutations of
/// different partitions cannot drop each other's writes.
///
/// Storage failures never escape: reads degrade to an empty partition and
/// failed writes are logged.
pub struct CommentCache<S>
where
    S: KeyValueStore,
{
    store: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S> CommentCache<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }

    /// Reads every partition. Unlike the other operations this surfaces
    /// storage errors, for callers that need to tell them apart. Records
    /// that no longer deserialize are skipped; only a blob that is not a
    /// map of lists counts as corrupt.
    pub async fn load(&self) -> Result<Partitions, StoreError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Partitions::new());
        };
        let records: BTreeMap<String, Vec<serde_json::Value>> =
            serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(records
            .into_iter()
            .map(|(article, records)| {
                let comments: Vec<Comment> = records
                    .into_iter()
                    .filter_map(|record| match serde_json::from_value(record) {
                        Ok(comment) => Some(comment),
                        Err(e) => {
                            tracing::warn!(error = %e, article = %article, "skipping unreadable cached comment");
                            None
                        }
                    })
                    .collect();
                (article, comments)
            })
            .collect())
    }

    pub async fn partition(&self, article_id: i64) -> Vec<Comment> {
        match self.load().await {
            Ok(mut all) => all.remove(&article_id.to_string()).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, article_id, "failed to read comment cache");
                Vec::new()
            }
        }
    }

    pub async fn replace_partition(&self, article_id: i64, comments: Vec<Comment>) {
        self.update(|all| {
            all.insert(article_id.to_string(), comments);
            true
        })
        .await;
    }

    pub async fn prepend(&self, article_id: i64, comment: Comment) {
        self.update(|all| {
            all.entry(article_id.to_string())
                .or_default()
                .insert(0, comment);
            true
        })
        .await;
    }

    /// Drops the comment from every partition, returning how many copies
    /// were removed.
    pub async fn remove_everywhere(&self, comment_id: i64) -> usize {
        let mut removed = 0;
        self.update(|all| {
            for comments in all.values_mut() {
                let before = comments.len();
                comments.retain(|c| c.id != comment_id);
                removed += before - comments.len();
            }
            removed > 0
        })
        .await;
        removed
    }

    /// Flags the comment as deleted in every partition, keeping it cached.
    pub async fn mark_deleted_everywhere(&self, comment_id: i64) -> usize {
        let mut marked = 0;
        self.update(|all| {
            for comment in all.values_mut().flatten() {
                if comment.id == comment_id {
                    comment.deleted = true;
                    marked += 1;
                }
            }
            marked > 0
        })
        .await;
        marked
    }

    async fn update<F>(&self, apply: F)
    where
        F: FnOnce(&mut Partitions) -> bool,
    {
        let _guard = self.write_lock.lock().await;

        let mut all = match self.load().await {
            Ok(all) => all,
            Err(StoreError::Corrupt(e)) => {
                tracing::error!(error = %e, key = %self.key, "comment cache is corrupt, starting over");
                Partitions::new()
            }
            Err(e) => {
                // an unreadable store may still hold other partitions
                tracing::error!(error = %e, key = %self.key, "comment cache unavailable, write skipped");
                return;
            }
        };

        if !apply(&mut all) {
            return;
        }

        let raw = match serde_json::to_string(&all) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize comment cache");
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw).await {
            tracing::error!(error = %e, key = %self.key, "failed to write comment cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comment::CommentText;
    use crate::repository::local::MemoryKeyValueStore;
    use crate::usecase::contracts::MockKeyValueStore;

    fn comment(id: i64, article_id: i64) -> Comment {
        let text = CommentText::parse(&format!("comment {id}")).unwrap();
        let mut comment = Comment::local(id, article_id, &text, 1);
        comment.pending = false;
        comment
    }

    fn cache() -> CommentCache<MemoryKeyValueStore> {
        CommentCache::new(MemoryKeyValueStore::new(), DEFAULT_CACHE_KEY)
    }

    #[tokio::test]
    async fn test_prepend_keeps_newest_first() {
        let cache = cache();
        cache.prepend(1, comment(10, 1)).await;
        cache.prepend(1, comment(11, 1)).await;

        let ids: Vec<i64> = cache.partition(1).await.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert!(cache.partition(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_partition_overwrites_only_that_article() {
        let cache = cache();
        cache.prepend(1, comment(10, 1)).await;
        cache.prepend(2, comment(20, 2)).await;

        cache.replace_partition(1, vec![comment(12, 1), comment(13, 1)]).await;

        let ids: Vec<i64> = cache.partition(1).await.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![12, 13]);
        assert_eq!(cache.partition(2).await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_everywhere() {
        let cache = cache();
        cache.replace_partition(1, vec![comment(10, 1), comment(11, 1)]).await;
        cache.replace_partition(2, vec![comment(10, 2), comment(20, 2)]).await;

        assert_eq!(cache.remove_everywhere(10).await, 2);
        assert_eq!(cache.remove_everywhere(99).await, 0);

        assert_eq!(cache.partition(1).await.len(), 1);
        assert_eq!(cache.partition(2).await[0].id, 20);
    }

    #[tokio::test]
    async fn test_mark_deleted_keeps_comment() {
        let cache = cache();
        cache.replace_partition(1, vec![comment(10, 1), comment(11, 1)]).await;

        assert_eq!(cache.mark_deleted_everywhere(11).await, 1);

        let comments = cache.partition(1).await;
        assert_eq!(comments.len(), 2);
        assert!(!comments[0].deleted);
        assert!(comments[1].deleted);
    }

    #[tokio::test]
    async fn test_stored_layout() {
        let cache = cache();
        cache.prepend(7, comment(70, 7)).await;

        let raw = cache.store().get(DEFAULT_CACHE_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["7"][0]["id"], 70);
        assert_eq!(value["7"][0]["articleId"], 7);
    }

    #[tokio::test]
    async fn test_corrupt_cache_reads_empty_and_is_rewritten() {
        let store = MemoryKeyValueStore::new();
        store.set(DEFAULT_CACHE_KEY, "{not json").await.unwrap();
        let cache = CommentCache::new(store, DEFAULT_CACHE_KEY);

        assert!(cache.partition(1).await.is_empty());
        assert!(matches!(cache.load().await, Err(StoreError::Corrupt(_))));

        cache.prepend(1, comment(10, 1)).await;
        assert_eq!(cache.partition(1).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_record_does_not_wipe_other_partitions() {
        let store = MemoryKeyValueStore::new();
        store
            .set(
                DEFAULT_CACHE_KEY,
                r#"{"1":[{"text":"sin id"},{"id":10,"text":"ok","author":"A","date":"x","articleId":1}],
                    "2":[{"id":20,"text":"otro","articleId":2}]}"#,
            )
            .await
            .unwrap();
        let cache = CommentCache::new(store, DEFAULT_CACHE_KEY);

        let ids: Vec<i64> = cache.partition(1).await.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10]);

        cache.prepend(1, comment(11, 1)).await;

        let ids: Vec<i64> = cache.partition(1).await.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![11, 10]);
        assert_eq!(cache.partition(2).await[0].id, 20);
    }

    #[tokio::test]
    async fn test_unavailable_store_is_swallowed() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::Io("quota exceeded".to_string())));
        store.expect_set().times(0);
        let cache = CommentCache::new(store, DEFAULT_CACHE_KEY);

        assert!(cache.partition(1).await.is_empty());
        cache.prepend(1, comment(10, 1)).await;
        assert_eq!(cache.remove_everywhere(10).await, 0);
    }

    #[tokio::test]
    async fn test_failed_write_is_swallowed() {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_set()
            .times(1)
            .returning(|_, _| Err(StoreError::Io("disk full".to_string())));
        let cache = CommentCache::new(store, DEFAULT_CACHE_KEY);

        cache.prepend(1, comment(10, 1)).await;
    }
}
