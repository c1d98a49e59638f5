use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_store::SessionStore;
use crate::infrastructure::wire::{
    EventPayload, GroupPayload, RangeQuery, TaskPayload, WireEvent, WireGroup, WireTask,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use url::Url;

const EVENTS: &str = "events";
const TASKS: &str = "tasks";
const CALENDARS: &str = "calendars";
const TASK_GROUPS: &str = "task-groups";

#[async_trait]
pub trait AgendaApi: Send + Sync {
    async fn list_events(&self, range: &RangeQuery) -> Result<Vec<WireEvent>, InfraError>;
    async fn create_event(&self, payload: &EventPayload) -> Result<WireEvent, InfraError>;
    async fn update_event(&self, id: &str, payload: &EventPayload)
    -> Result<WireEvent, InfraError>;
    async fn delete_event(&self, id: &str) -> Result<(), InfraError>;

    async fn list_tasks(&self, range: &RangeQuery) -> Result<Vec<WireTask>, InfraError>;
    async fn create_task(&self, payload: &TaskPayload) -> Result<WireTask, InfraError>;
    async fn update_task(&self, id: &str, payload: &TaskPayload) -> Result<WireTask, InfraError>;
    async fn delete_task(&self, id: &str) -> Result<(), InfraError>;

    async fn list_calendars(&self) -> Result<Vec<WireGroup>, InfraError>;
    async fn create_calendar(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError>;
    async fn update_calendar(&self, id: &str, payload: &GroupPayload)
    -> Result<WireGroup, InfraError>;
    async fn delete_calendar(&self, id: &str) -> Result<(), InfraError>;

    async fn list_task_groups(&self) -> Result<Vec<WireGroup>, InfraError>;
    async fn create_task_group(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError>;
    async fn update_task_group(
        &self,
        id: &str,
        payload: &GroupPayload,
    ) -> Result<WireGroup, InfraError>;
    async fn delete_task_group(&self, id: &str) -> Result<(), InfraError>;
}

pub struct ReqwestAgendaApi {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl ReqwestAgendaApi {
    pub fn new(base_url: Url, session: Arc<dyn SessionStore>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    fn ensure_non_empty(value: &str, field: &str) -> Result<(), InfraError> {
        if value.trim().is_empty() {
            return Err(InfraError::Validation(format!("{field} must not be empty")));
        }
        Ok(())
    }

    fn endpoint(&self, resource: &str, id: Option<&str>) -> Result<Url, InfraError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                InfraError::InvalidConfig("backend base URL cannot be a base".to_string())
            })?;
            segments.pop_if_empty();
            segments.push("api");
            segments.push(resource);
            if let Some(id) = id {
                segments.push(id.trim());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, InfraError> {
        let request = self.client.request(method, url);
        Ok(match self.session.load_token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn execute(&self, request: RequestBuilder, action: &str) -> Result<String, InfraError> {
        let response = request
            .send()
            .await
            .map_err(|error| InfraError::Network(format!("{action}: {error}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| InfraError::Network(format!("failed reading {action} response: {error}")))?;

        if !status.is_success() {
            return Err(http_error(status, &body));
        }
        Ok(body)
    }

    async fn list<T>(&self, resource: &str, range: Option<&RangeQuery>) -> Result<Vec<T>, InfraError>
    where
        T: DeserializeOwned + Send,
    {
        let action = format!("list {resource}");
        let mut request = self.request(Method::GET, self.endpoint(resource, None)?)?;
        if let Some(range) = range {
            let pairs = range.pairs();
            if !pairs.is_empty() {
                request = request.query(&pairs);
            }
        }
        let body = self.execute(request, &action).await?;
        decode(&body, &action)
    }

    async fn create<P, T>(&self, resource: &str, payload: &P) -> Result<T, InfraError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        let action = format!("create {resource}");
        let request = self
            .request(Method::POST, self.endpoint(resource, None)?)?
            .json(payload);
        let body = self.execute(request, &action).await?;
        decode(&body, &action)
    }

    async fn update<P, T>(&self, resource: &str, id: &str, payload: &P) -> Result<T, InfraError>
    where
        P: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        Self::ensure_non_empty(id, "id")?;
        let action = format!("update {resource}/{id}");
        let request = self
            .request(Method::PUT, self.endpoint(resource, Some(id))?)?
            .json(payload);
        let body = self.execute(request, &action).await?;
        decode(&body, &action)
    }

    async fn delete(&self, resource: &str, id: &str) -> Result<(), InfraError> {
        Self::ensure_non_empty(id, "id")?;
        let action = format!("delete {resource}/{id}");
        let request = self.request(Method::DELETE, self.endpoint(resource, Some(id))?)?;
        self.execute(request, &action).await?;
        Ok(())
    }
}

/// Builds the error for a non-success response. The message is the body's
/// `message`, then `error`, then the status reason phrase.
pub fn http_error(status: StatusCode, body: &str) -> InfraError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        })
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    InfraError::Http {
        status: status.as_u16(),
        message,
        body: parsed,
    }
}

fn decode<T: DeserializeOwned>(body: &str, action: &str) -> Result<T, InfraError> {
    serde_json::from_str(body)
        .map_err(|error| InfraError::Payload(format!("{action}: {error}; body={body}")))
}

#[async_trait]
impl AgendaApi for ReqwestAgendaApi {
    async fn list_events(&self, range: &RangeQuery) -> Result<Vec<WireEvent>, InfraError> {
        self.list(EVENTS, Some(range)).await
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<WireEvent, InfraError> {
        self.create(EVENTS, payload).await
    }

    async fn update_event(
        &self,
        id: &str,
        payload: &EventPayload,
    ) -> Result<WireEvent, InfraError> {
        self.update(EVENTS, id, payload).await
    }

    async fn delete_event(&self, id: &str) -> Result<(), InfraError> {
        self.delete(EVENTS, id).await
    }

    async fn list_tasks(&self, range: &RangeQuery) -> Result<Vec<WireTask>, InfraError> {
        self.list(TASKS, Some(range)).await
    }

    async fn create_task(&self, payload: &TaskPayload) -> Result<WireTask, InfraError> {
        self.create(TASKS, payload).await
    }

    async fn update_task(&self, id: &str, payload: &TaskPayload) -> Result<WireTask, InfraError> {
        self.update(TASKS, id, payload).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), InfraError> {
        self.delete(TASKS, id).await
    }

    async fn list_calendars(&self) -> Result<Vec<WireGroup>, InfraError> {
        self.list(CALENDARS, None).await
    }

    async fn create_calendar(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.create(CALENDARS, payload).await
    }

    async fn update_calendar(
        &self,
        id: &str,
        payload: &GroupPayload,
    ) -> Result<WireGroup, InfraError> {
        self.update(CALENDARS, id, payload).await
    }

    async fn delete_calendar(&self, id: &str) -> Result<(), InfraError> {
        self.delete(CALENDARS, id).await
    }

    async fn list_task_groups(&self) -> Result<Vec<WireGroup>, InfraError> {
        self.list(TASK_GROUPS, None).await
    }

    async fn create_task_group(&self, payload: &GroupPayload) -> Result<WireGroup, InfraError> {
        self.create(TASK_GROUPS, payload).await
    }

    async fn update_task_group(
        &self,
        id: &str,
        payload: &GroupPayload,
    ) -> Result<WireGroup, InfraError> {
        self.update(TASK_GROUPS, id, payload).await
    }

    async fn delete_task_group(&self, id: &str) -> Result<(), InfraError> {
        self.delete(TASK_GROUPS, id).await
    }
}
