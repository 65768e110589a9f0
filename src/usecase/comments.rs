use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::comment::{ArticleId, Comment, CommentText, NewRemoteComment};
use crate::repository::errors::ApiError;
use crate::usecase::cache::CommentCache;
use crate::usecase::clock::{Clock, SystemClock};
use crate::usecase::contracts::{CommentRepository, KeyValueStore};
use crate::usecase::error::UsecaseError;
use crate::usecase::lock::KeyedLock;

/// Where a [`Synced`] value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Served from the local cache without contacting the remote store.
    Cache,
    /// Confirmed by the remote store.
    Remote,
    /// An optimistic write the remote store rejected or never received;
    /// the value exists only in the local cache.
    Local(ApiError),
    /// The remote store failed; the value is the local degradation.
    Fallback(ApiError),
}

/// A value together with how it was obtained, so callers can tell
/// "nothing there" apart from "remote store unreachable".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synced<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Synced<T> {
    fn new(value: T, origin: Origin) -> Self {
        Self { value, origin }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.origin, Origin::Local(_) | Origin::Fallback(_))
    }
}

/// Pagination forwarded to the remote store; never applied to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

pub struct CommentsUseCase<R, S, C = SystemClock>
where
    R: CommentRepository,
    S: KeyValueStore,
    C: Clock,
{
    comment_repository: R,
    cache: CommentCache<S>,
    clock: C,
    article_locks: KeyedLock,
    last_local_id: AtomicI64,
}

impl<R, S> CommentsUseCase<R, S, SystemClock>
where
    R: CommentRepository,
    S: KeyValueStore,
{
    pub fn new(comment_repository: R, cache: CommentCache<S>) -> Self {
        Self::with_clock(comment_repository, cache, SystemClock)
    }
}

impl<R, S, C> CommentsUseCase<R, S, C>
where
    R: CommentRepository,
    S: KeyValueStore,
    C: Clock,
{
    pub fn with_clock(comment_repository: R, cache: CommentCache<S>, clock: C) -> Self {
        Self {
            comment_repository,
            cache,
            clock,
            article_locks: KeyedLock::new(),
            last_local_id: AtomicI64::new(0),
        }
    }

    pub fn cache(&self) -> &CommentCache<S> {
        &self.cache
    }

    /// Comments of an article. A non-empty cached partition is returned as
    /// is and never refreshed; otherwise the page is fetched and replaces
    /// the partition. Remote failures fall back to whatever is cached.
    #[tracing::instrument(skip(self, page), fields(article_id = %article_id, limit = page.limit, offset = page.offset))]
    pub async fn fetch_comments(&self, article_id: ArticleId, page: Page) -> Synced<Vec<Comment>> {
        let _guard = self.article_locks.acquire(article_id.get()).await;

        let cached = self.cache.partition(article_id.get()).await;
        if !cached.is_empty() {
            tracing::debug!(count = cached.len(), "serving comments from local cache");
            return Synced::new(cached, Origin::Cache);
        }

        match self
            .comment_repository
            .list(article_id.get(), page.limit, page.offset)
            .await
        {
            Ok(remote) => {
                let now = self.clock.now();
                let comments: Vec<Comment> =
                    remote.into_iter().map(|c| c.into_comment(now)).collect();
                self.cache
                    .replace_partition(article_id.get(), comments.clone())
                    .await;

                tracing::debug!(count = comments.len(), "fetched comments from remote store");
                Synced::new(comments, Origin::Remote)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch comments, serving local cache");
                let cached = self.cache.partition(article_id.get()).await;
                Synced::new(cached, Origin::Fallback(e))
            }
        }
    }

    /// Posts a comment and prepends it to the article's partition. When the
    /// remote store fails, a pending local comment with a temporary id is
    /// cached and returned instead.
    #[tracing::instrument(skip(self, text), fields(article_id = %article_id))]
    pub async fn add_comment(
        &self,
        article_id: ArticleId,
        text: &CommentText,
        user_id: i64,
    ) -> Synced<Comment> {
        let _guard = self.article_locks.acquire(article_id.get()).await;

        let request = NewRemoteComment {
            contenido: text.as_str().to_string(),
            noticia_id: article_id.get(),
            usuario_id: user_id,
        };

        let (comment, origin) = match self.comment_repository.create(&request).await {
            Ok(created) => (created.into_comment(self.clock.now()), Origin::Remote),
            Err(e) => {
                let local = Comment::local(self.next_local_id(), article_id.get(), text, user_id);
                tracing::warn!(error = %e, temp_id = local.id, "failed to post comment, keeping it locally");
                (local, Origin::Local(e))
            }
        };

        self.cache.prepend(article_id.get(), comment.clone()).await;

        tracing::info!(comment_id = comment.id, pending = comment.pending, "comment added");
        Synced::new(comment, origin)
    }

    /// Deletes a comment remotely. On success every cached copy is dropped;
    /// on failure every cached copy is flagged deleted and the error is
    /// returned.
    #[tracing::instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: i64, user_id: i64) -> Result<(), UsecaseError> {
        match self.comment_repository.delete(comment_id, user_id).await {
            Ok(()) => {
                let removed = self.cache.remove_everywhere(comment_id).await;
                tracing::info!(removed, "comment deleted");
                Ok(())
            }
            Err(e) => {
                let marked = self.cache.mark_deleted_everywhere(comment_id).await;
                tracing::warn!(error = %e, marked, "failed to delete comment, marked deleted locally");
                Err(e.into())
            }
        }
    }

    /// Remote comment count; zero on any failure. The cache is not
    /// consulted, so this may disagree with the cached partition length.
    #[tracing::instrument(skip(self), fields(article_id = %article_id))]
    pub async fn comments_count(&self, article_id: ArticleId) -> Synced<u64> {
        match self.comment_repository.count(article_id.get()).await {
            Ok(count) => {
                tracing::debug!(count = count.count, "counted comments");
                Synced::new(count.count, Origin::Remote)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to count comments");
                Synced::new(0, Origin::Fallback(e))
            }
        }
    }

    /// Millisecond timestamp, bumped so ids stay unique within the process.
    fn next_local_id(&self) -> i64 {
        let candidate = self.clock.now().timestamp_millis();
        let previous = self
            .last_local_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
                Some(candidate.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        candidate.max(previous + 1)
    }
}
