//! Session context: the client's auth and task state
//!
//! One explicit object instead of process-wide globals. It is built by
//! [`SessionContext::hydrate`] from the persisted session and torn down by
//! [`SessionContext::logout`]. Every action replaces local state with what
//! the server returned.

use common::models::{LoginRequest, NewTask, RegisterRequest, Task, UpdateTask, UserProfile};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    client::ApiClient,
    error::{ClientError, ClientResult},
    storage::{SessionStorage, StoredSession},
};

/// Who is signed in
#[derive(Debug, Clone, Default)]
pub struct AuthSlice {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

/// The signed-in user's tasks
#[derive(Debug, Clone, Default)]
pub struct TaskSlice {
    pub list: Vec<Task>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct SessionContext {
    client: ApiClient,
    storage: SessionStorage,
    pub auth: AuthSlice,
    pub tasks: TaskSlice,
}

impl SessionContext {
    /// Restore the persisted session, if any
    ///
    /// An unreadable session file is logged and treated as signed out.
    pub fn hydrate(client: ApiClient, storage: SessionStorage) -> Self {
        let mut auth = AuthSlice::default();

        match storage.load() {
            Ok(Some(session)) => {
                info!("Restored session for {}", session.user.email);
                auth.token = Some(session.token);
                auth.user = Some(session.user);
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Ignoring unreadable session file {}: {}",
                storage.path().display(),
                e
            ),
        }

        Self {
            client,
            storage,
            auth,
            tasks: TaskSlice::default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.token.is_some()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.auth.user.as_ref()
    }

    /// Drop the session from memory and from storage
    pub fn logout(&mut self) {
        if let Some(user) = &self.auth.user {
            info!("Signing out {}", user.email);
        }

        self.auth = AuthSlice::default();
        self.tasks = TaskSlice::default();

        if let Err(e) = self.storage.clear() {
            warn!("Failed to clear session file: {}", e);
        }
    }

    pub async fn login_user(&mut self, email: &str, password: &str) -> ClientResult<UserProfile> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.auth.loading = true;
        self.auth.error = None;
        let result = self.client.login(&request).await;
        self.auth.loading = false;

        let response = settle(&mut self.auth.error, result)?;
        self.sign_in(response.token, response.user.clone());
        Ok(response.user)
    }

    pub async fn register_user(
        &mut self,
        name: Option<&str>,
        email: &str,
        password: &str,
    ) -> ClientResult<UserProfile> {
        let request = RegisterRequest {
            name: name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            email: email.to_string(),
            password: password.to_string(),
        };

        self.auth.loading = true;
        self.auth.error = None;
        let result = self.client.register(&request).await;
        self.auth.loading = false;

        let response = settle(&mut self.auth.error, result)?;
        self.sign_in(response.token, response.user.clone());
        Ok(response.user)
    }

    /// Replace the task list with the server's
    pub async fn fetch_tasks(&mut self) -> ClientResult<()> {
        let token = self.token()?;

        self.tasks.loading = true;
        self.tasks.error = None;
        let result = self.client.fetch_tasks(&token).await;
        self.tasks.loading = false;

        self.tasks.list = settle(&mut self.tasks.error, result)?;
        Ok(())
    }

    pub async fn create_task(&mut self, task: &NewTask) -> ClientResult<Task> {
        let token = self.token()?;

        self.tasks.loading = true;
        self.tasks.error = None;
        let result = self.client.create_task(&token, task).await;
        self.tasks.loading = false;

        let created = settle(&mut self.tasks.error, result)?;
        self.tasks.list.push(created.clone());
        Ok(created)
    }

    pub async fn update_task(&mut self, id: Uuid, changes: &UpdateTask) -> ClientResult<Task> {
        let token = self.token()?;

        self.tasks.loading = true;
        self.tasks.error = None;
        let result = self.client.update_task(&token, id, changes).await;
        self.tasks.loading = false;

        let updated = settle(&mut self.tasks.error, result)?;
        if let Some(slot) = self.tasks.list.iter_mut().find(|task| task.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    pub async fn delete_task(&mut self, id: Uuid) -> ClientResult<()> {
        let token = self.token()?;

        self.tasks.loading = true;
        self.tasks.error = None;
        let result = self.client.delete_task(&token, id).await;
        self.tasks.loading = false;

        settle(&mut self.tasks.error, result)?;
        self.tasks.list.retain(|task| task.id != id);
        Ok(())
    }

    fn token(&self) -> ClientResult<String> {
        self.auth.token.clone().ok_or(ClientError::NotAuthenticated)
    }

    fn sign_in(&mut self, token: String, user: UserProfile) {
        let session = StoredSession {
            token: token.clone(),
            user: user.clone(),
        };
        if let Err(e) = self.storage.save(&session) {
            warn!("Failed to persist session: {}", e);
        }

        self.auth.token = Some(token);
        self.auth.user = Some(user);
    }
}

/// Record a failure in the slice's `error` before handing it back
fn settle<T>(slot: &mut Option<String>, result: ClientResult<T>) -> ClientResult<T> {
    result.inspect_err(|e| *slot = Some(e.to_string()))
}
