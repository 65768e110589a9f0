use std::io::Write;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::AppConfig;
use crate::domain::comment::{ArticleId, CommentText};
use crate::repository::http::{ApiClient, HttpCommentRepository, HttpNotificationRepository};
use crate::repository::local::FileKeyValueStore;
use crate::usecase::cache::CommentCache;
use crate::usecase::clock::Clock;
use crate::usecase::comments::{CommentsUseCase, Origin, Page, Synced};
use crate::usecase::contracts::{CommentRepository, KeyValueStore, NotificationRepository};
use crate::usecase::notifications::NotificationsUseCase;

#[derive(Debug, Parser)]
#[command(name = "comments-sync", version, about = "News portal comment cache and sync client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the comments of an article (cache first, then the API)
    List {
        article_id: i64,
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Post a comment; kept locally if the API is unreachable
    Add {
        article_id: i64,
        user_id: i64,
        text: String,
    },
    /// Delete a comment
    Delete { comment_id: i64, user_id: i64 },
    /// Remote comment count of an article
    Count { article_id: i64 },
    /// Print every cached partition
    Cache,
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// Notifications of the signed-in user
    List,
    /// Mark a notification as read
    Read { id: i64 },
    /// Delete a notification
    Delete { id: i64 },
}

pub type HttpCommentsUseCase = CommentsUseCase<HttpCommentRepository, FileKeyValueStore>;
pub type HttpNotificationsUseCase = NotificationsUseCase<HttpNotificationRepository>;

pub fn build_usecases(
    config: &AppConfig,
) -> anyhow::Result<(HttpCommentsUseCase, HttpNotificationsUseCase)> {
    let api = ApiClient::new(
        config.api_base_url.clone(),
        config.request_timeout(),
        config.auth_token.clone(),
    )
    .context("failed to build api client")?;

    let cache = CommentCache::new(
        FileKeyValueStore::new(config.cache_dir.clone()),
        config.cache_key.clone(),
    );

    Ok((
        CommentsUseCase::new(HttpCommentRepository::new(api.clone()), cache),
        NotificationsUseCase::new(HttpNotificationRepository::new(api)),
    ))
}

#[derive(Serialize)]
struct SyncedOutput<'a, T: Serialize> {
    origin: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    value: &'a T,
}

impl<'a, T: Serialize> From<&'a Synced<T>> for SyncedOutput<'a, T> {
    fn from(synced: &'a Synced<T>) -> Self {
        let (origin, warning) = match &synced.origin {
            Origin::Cache => ("cache", None),
            Origin::Remote => ("remote", None),
            Origin::Local(e) => ("local", Some(e.to_string())),
            Origin::Fallback(e) => ("fallback", Some(e.to_string())),
        };
        Self {
            origin,
            warning,
            value: &synced.value,
        }
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Runs one command. Only delete and the notification commands can fail
/// on remote errors; the others print their degraded result instead.
/// Invalid input (a non-positive article id, blank text) fails before any
/// remote or cache work.
pub async fn run<R, S, C, N>(
    command: Command,
    comments: &CommentsUseCase<R, S, C>,
    notifications: &NotificationsUseCase<N>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: CommentRepository,
    S: KeyValueStore,
    C: Clock,
    N: NotificationRepository,
{
    match command {
        Command::List {
            article_id,
            limit,
            offset,
        } => {
            let article_id = ArticleId::new(article_id)?;
            let synced = comments
                .fetch_comments(article_id, Page { limit, offset })
                .await;
            print_json(out, &SyncedOutput::from(&synced))
        }
        Command::Add {
            article_id,
            user_id,
            text,
        } => {
            let article_id = ArticleId::new(article_id)?;
            let text = CommentText::parse(&text)?;
            let synced = comments.add_comment(article_id, &text, user_id).await;
            print_json(out, &SyncedOutput::from(&synced))
        }
        Command::Delete {
            comment_id,
            user_id,
        } => {
            comments.delete_comment(comment_id, user_id).await?;
            print_json(out, &serde_json::json!({ "deleted": comment_id }))
        }
        Command::Count { article_id } => {
            let synced = comments.comments_count(ArticleId::new(article_id)?).await;
            print_json(out, &SyncedOutput::from(&synced))
        }
        Command::Cache => {
            let partitions = comments
                .cache()
                .load()
                .await
                .context("failed to read comment cache")?;
            print_json(out, &partitions)
        }
        Command::Notifications(NotificationsCommand::List) => {
            print_json(out, &notifications.list_notifications().await?)
        }
        Command::Notifications(NotificationsCommand::Read { id }) => {
            print_json(out, &notifications.mark_as_read(id).await?)
        }
        Command::Notifications(NotificationsCommand::Delete { id }) => {
            notifications.delete_notification(id).await?;
            print_json(out, &serde_json::json!({ "deleted": id }))
        }
    }
}
