use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::humanize::{humanize_date, JUST_NOW};

/// Author shown for comments whose write never reached the server.
pub const PLACEHOLDER_AUTHOR: &str = "Usuario";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("article id must be positive, got {0}")]
    NonPositiveArticleId(i64),

    #[error("comment text must not be empty")]
    EmptyText,
}

/// Client-side comment, as cached locally and handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub text: String,
    #[serde(default = "placeholder_author")]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(alias = "noticiaId")]
    pub article_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_photo: Option<String>,
    /// Set when a remote delete failed; the comment stays in the cache.
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,
    /// Set on comments synthesized locally after a failed remote write.
    #[serde(default, skip_serializing_if = "is_false")]
    pub pending: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn placeholder_author() -> String {
    PLACEHOLDER_AUTHOR.to_string()
}

impl Comment {
    /// Optimistic comment kept only in the local cache.
    pub fn local(id: i64, article_id: i64, text: &CommentText, user_id: i64) -> Self {
        Self {
            id,
            text: text.as_str().to_string(),
            author: PLACEHOLDER_AUTHOR.to_string(),
            date: JUST_NOW.to_string(),
            article_id,
            user_id: Some(user_id),
            user_photo: None,
            deleted: false,
            pending: true,
        }
    }
}

/// Positive article identifier; partitions the comment cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(i64);

impl ArticleId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::NonPositiveArticleId(id));
        }
        Ok(Self(id))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Comment body, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentText(String);

impl CommentText {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Author block embedded in remote comment records. The list endpoint
/// emits `nombre: null` when the author relationship is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAuthor {
    pub id: Option<i64>,
    pub nombre: Option<String>,
    #[serde(default)]
    pub correo: Option<String>,
    #[serde(default)]
    pub foto: Option<String>,
}

/// Comment record as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteComment {
    pub id_comentario: i64,
    pub contenido: String,
    pub fecha_creacion: String,
    pub noticia_id: i64,
    pub usuario: RemoteAuthor,
}

impl RemoteComment {
    pub fn into_comment(self, now: DateTime<Utc>) -> Comment {
        let author = self
            .usuario
            .nombre
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_AUTHOR.to_string());

        Comment {
            id: self.id_comentario,
            text: self.contenido,
            author,
            date: humanize_date(&self.fecha_creacion, now),
            article_id: self.noticia_id,
            user_id: self.usuario.id,
            user_photo: self.usuario.foto,
            deleted: false,
            pending: false,
        }
    }
}

/// Body of the create-comment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRemoteComment {
    pub contenido: String,
    pub noticia_id: i64,
    pub usuario_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CommentsCount {
    pub count: u64,
    pub noticia_id: i64,
}
