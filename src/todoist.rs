//! Todoist-style `TaskStore` over the batch sync API.
//!
//! Reads go through the sync endpoint with `resource_types`; writes are
//! queued as batch commands and only sent when `commit` flushes the queue.
//! Server-assigned ids for queued creates are not visible until a later
//! read, which is what forces the reconcile engine's re-fetch between
//! passes.

use async_trait::async_trait;
use caltask_core::{CaltaskError, CaltaskResult, Note, Project, Task, TaskStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Mutex;
use uuid::Uuid;

const SYNC_URL: &str = "https://api.todoist.com/sync/v9/sync";

pub struct TodoistStore {
    api_key: String,
    http: reqwest::Client,
    queue: Mutex<Vec<Command>>,
}

#[derive(Debug, Serialize)]
struct Command {
    #[serde(rename = "type")]
    kind: &'static str,
    uuid: Uuid,
    temp_id: Uuid,
    args: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct SyncResponse {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    items: Vec<Task>,
    #[serde(default)]
    notes: Vec<Note>,
}

impl TodoistStore {
    pub fn new(api_key: String) -> Self {
        TodoistStore {
            api_key,
            http: reqwest::Client::new(),
            queue: Mutex::new(Vec::new()),
        }
    }

    fn queue_command(&self, kind: &'static str, args: serde_json::Value) {
        self.queue.lock().unwrap().push(Command {
            kind,
            uuid: Uuid::new_v4(),
            temp_id: Uuid::new_v4(),
            args,
        });
    }

    async fn request(&self, form: &[(&str, String)]) -> CaltaskResult<reqwest::Response> {
        let response = self
            .http
            .post(SYNC_URL)
            .bearer_auth(&self.api_key)
            .form(form)
            .send()
            .await
            .map_err(|e| CaltaskError::Transport(format!("Task tracker request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CaltaskError::Auth(
                "Task tracker rejected the API key (check TODOIST_API_KEY)".to_string(),
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CaltaskError::Transport(format!(
                "Task tracker returned {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    async fn read(&self, resource_types: &[&str]) -> CaltaskResult<SyncResponse> {
        let resource_types = serde_json::to_string(resource_types)
            .map_err(|e| CaltaskError::Serialization(e.to_string()))?;

        let response = self
            .request(&[
                ("sync_token", "*".to_string()),
                ("resource_types", resource_types),
            ])
            .await?;

        response
            .json()
            .await
            .map_err(|e| CaltaskError::Transport(format!("Failed to parse sync response: {}", e)))
    }
}

#[async_trait]
impl TaskStore for TodoistStore {
    async fn list_projects(&self) -> CaltaskResult<Vec<Project>> {
        Ok(self.read(&["projects"]).await?.projects)
    }

    async fn list_tasks(&self, project: &Project) -> CaltaskResult<Vec<Task>> {
        Ok(self
            .read(&["items"])
            .await?
            .items
            .into_iter()
            .filter(|t| t.project_id == project.id)
            .collect())
    }

    async fn list_notes(&self, tasks: &[Task]) -> CaltaskResult<Vec<Note>> {
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();

        Ok(self
            .read(&["notes"])
            .await?
            .notes
            .into_iter()
            .filter(|n| ids.contains(n.item_id.as_str()))
            .collect())
    }

    async fn create_task(
        &self,
        project: &Project,
        content: &str,
        date_string: &str,
    ) -> CaltaskResult<()> {
        self.queue_command(
            "item_add",
            json!({
                "project_id": project.id,
                "content": content,
                "date_string": date_string,
            }),
        );
        Ok(())
    }

    async fn create_note(&self, task: &Task, content: &str) -> CaltaskResult<()> {
        self.queue_command(
            "note_add",
            json!({
                "item_id": task.id,
                "content": content,
            }),
        );
        Ok(())
    }

    async fn commit(&self) -> CaltaskResult<()> {
        // Drain before awaiting so the guard never crosses a suspension point
        let commands = std::mem::take(&mut *self.queue.lock().unwrap());
        if commands.is_empty() {
            return Ok(());
        }

        let commands = serde_json::to_string(&commands)
            .map_err(|e| CaltaskError::Serialization(e.to_string()))?;

        self.request(&[("commands", commands)]).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: "p1".into(),
            name: "Agenda".into(),
        }
    }

    #[tokio::test]
    async fn create_task_queues_an_item_add_command() {
        let store = TodoistStore::new("key".into());

        store
            .create_task(&project(), "Standup", "10 Jan 9:00 AM")
            .await
            .unwrap();

        let queue = store.queue.lock().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].kind, "item_add");
        assert_eq!(queue[0].args["project_id"], "p1");
        assert_eq!(queue[0].args["content"], "Standup");
        assert_eq!(queue[0].args["date_string"], "10 Jan 9:00 AM");
    }

    #[tokio::test]
    async fn create_note_queues_a_note_add_command() {
        let store = TodoistStore::new("key".into());
        let task = Task {
            id: "t1".into(),
            project_id: "p1".into(),
            content: "Standup".into(),
            date_string: "10 Jan 9:00 AM".into(),
        };

        store.create_note(&task, "body").await.unwrap();

        let queue = store.queue.lock().unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].kind, "note_add");
        assert_eq!(queue[0].args["item_id"], "t1");
    }

    #[test]
    fn commands_serialize_with_type_field() {
        let command = Command {
            kind: "item_add",
            uuid: Uuid::new_v4(),
            temp_id: Uuid::new_v4(),
            args: json!({"content": "x"}),
        };

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["type"], "item_add");
        assert!(value["uuid"].is_string());
        assert!(value["temp_id"].is_string());
    }
}
