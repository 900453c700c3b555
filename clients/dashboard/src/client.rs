//! HTTP client for the task API

use common::models::{
    AuthResponse, LoginRequest, MessageResponse, NewTask, RegisterRequest, Task, UpdateTask,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ClientError, ClientResult};

/// One method per API endpoint
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let http = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/auth/register`
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        info!("Registering {}", request.email);
        send(self.http.post(self.url("/api/auth/register")).json(request)).await
    }

    /// `POST /api/auth/login`
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        info!("Logging in {}", request.email);
        send(self.http.post(self.url("/api/auth/login")).json(request)).await
    }

    /// `GET /api/tasks`
    pub async fn fetch_tasks(&self, token: &str) -> ClientResult<Vec<Task>> {
        send(self.http.get(self.url("/api/tasks")).bearer_auth(token)).await
    }

    /// `POST /api/tasks`
    pub async fn create_task(&self, token: &str, task: &NewTask) -> ClientResult<Task> {
        send(
            self.http
                .post(self.url("/api/tasks"))
                .bearer_auth(token)
                .json(task),
        )
        .await
    }

    /// `PUT /api/tasks/:id`
    pub async fn update_task(
        &self,
        token: &str,
        id: Uuid,
        changes: &UpdateTask,
    ) -> ClientResult<Task> {
        send(
            self.http
                .put(self.url(&format!("/api/tasks/{}", id)))
                .bearer_auth(token)
                .json(changes),
        )
        .await
    }

    /// `DELETE /api/tasks/:id`
    pub async fn delete_task(&self, token: &str, id: Uuid) -> ClientResult<MessageResponse> {
        send(
            self.http
                .delete(self.url(&format!("/api/tasks/{}", id)))
                .bearer_auth(token),
        )
        .await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<T> {
    let response = request.send().await?;
    parse(response).await
}

/// Decode a success body, or turn an error status into [`ClientError::Api`]
/// carrying the server's `message`.
async fn parse<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<MessageResponse>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    warn!("Request failed with {}: {}", status, message);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/api/tasks"), "http://localhost:5000/api/tasks");
    }
}
