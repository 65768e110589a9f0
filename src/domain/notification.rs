use serde::{Deserialize, Deserializer, Serialize};

/// Notification addressed to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "id_notificacion")]
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "mensaje")]
    pub message: String,
    #[serde(rename = "fecha_creacion")]
    pub created_at: String,
    #[serde(rename = "leida", default, deserialize_with = "null_as_false")]
    pub read: bool,
    #[serde(rename = "usuario_id")]
    pub user_id: i64,
    #[serde(rename = "noticia_id", default)]
    pub article_id: Option<i64>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Body of the mark-as-read request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NotificationUpdate {
    #[serde(rename = "leida")]
    pub read: bool,
}
