use crate::{
    domain::comment::{CommentsCount, NewRemoteComment, RemoteComment},
    repository::{errors::ApiError, http::ApiClient},
    usecase::contracts::CommentRepository,
};

pub struct HttpCommentRepository {
    api: ApiClient,
}

impl HttpCommentRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

impl CommentRepository for HttpCommentRepository {
    async fn list(
        &self,
        article_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<RemoteComment>, ApiError> {
        let request = self
            .api
            .get(&format!("/api/comentarios/{article_id}"))
            .query(&[("limit", limit), ("offset", offset)]);
        self.api.send_json(request).await
    }

    async fn create(&self, comment: &NewRemoteComment) -> Result<RemoteComment, ApiError> {
        let request = self.api.post("/api/comentarios").json(comment);
        self.api.send_json(request).await
    }

    async fn delete(&self, comment_id: i64, user_id: i64) -> Result<(), ApiError> {
        let request = self
            .api
            .delete(&format!("/api/comentarios/{comment_id}"))
            .query(&[("usuario_id", user_id)]);
        self.api.send(request).await.map(|_| ())
    }

    async fn count(&self, article_id: i64) -> Result<CommentsCount, ApiError> {
        let request = self
            .api
            .get(&format!("/api/noticias/{article_id}/comentarios/count"));
        self.api.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn repository(server: &MockServer, token: Option<&str>) -> HttpCommentRepository {
        let api = ApiClient::new(
            server.uri(),
            Duration::from_secs(2),
            token.map(str::to_string),
        )
        .unwrap();
        HttpCommentRepository::new(api)
    }

    fn remote_json(id: i64) -> serde_json::Value {
        json!({
            "id_comentario": id,
            "contenido": "Muy interesante",
            "fecha_creacion": "2024-03-20T10:00:00.000000",
            "noticia_id": 3,
            "usuario": {"id": 5, "nombre": "Ana", "correo": "ana@example.com", "foto": null},
            "estado": true
        })
    }

    #[tokio::test]
    async fn test_list_passes_pagination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comentarios/3"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([remote_json(1), remote_json(2)])))
            .expect(1)
            .mount(&server)
            .await;

        let comments = repository(&server, None).list(3, 20, 40).await.unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id_comentario, 1);
        assert_eq!(comments[0].usuario.nombre.as_deref(), Some("Ana"));
        assert_eq!(comments[0].usuario.correo.as_deref(), Some("ana@example.com"));
    }

    #[tokio::test]
    async fn test_create_sends_body_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/comentarios"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({"contenido": "Hola", "noticia_id": 3, "usuario_id": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(remote_json(11)))
            .expect(1)
            .mount(&server)
            .await;

        let created = repository(&server, Some("secret"))
            .create(&NewRemoteComment {
                contenido: "Hola".to_string(),
                noticia_id: 3,
                usuario_id: 5,
            })
            .await
            .unwrap();

        assert_eq!(created.id_comentario, 11);
    }

    #[tokio::test]
    async fn test_delete_scopes_by_user() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/comentarios/11"))
            .and(query_param("usuario_id", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Comentario eliminado correctamente"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        repository(&server, None).delete(11, 5).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_forbidden_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/comentarios/11"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                json!({"detail": "No tienes permisos para eliminar este comentario"}),
            ))
            .mount(&server)
            .await;

        let err = repository(&server, None).delete(11, 6).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Rejected {
                status: 403,
                detail: "No tienes permisos para eliminar este comentario".to_string(),
            }
        );
        assert_eq!(err.to_string(), "No tienes permisos para eliminar este comentario");
    }

    #[tokio::test]
    async fn test_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/noticias/3/comentarios/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 4, "noticia_id": 3})))
            .mount(&server)
            .await;

        let count = repository(&server, None).count(3).await.unwrap();
        assert_eq!(count.count, 4);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/noticias/3/comentarios/count"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = repository(&server, None).count(3).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_slow_server_times_out_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/comentarios/3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), Duration::from_millis(100), None).unwrap();
        let err = HttpCommentRepository::new(api)
            .list(3, 50, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Network(_)));
    }
}
