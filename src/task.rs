//! Tasks
//!
//! Typed wrapper over the `task` resource plus every remote operation the
//! task endpoints offer. Each operation issues exactly one request through the
//! given [`Transport`] and converts the response; transport errors come back
//! unchanged.
//!
//! See <https://developers.podio.com/doc/tasks>.

use crate::error::{Error, MappingError, Result};
use crate::podio::{RequestOptions, Response, Transport};
use crate::resource::declarations::{FILE, TASK, TASK_LABEL, USER};
use crate::resource::{registry, FieldValue, Resource, Schema};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Summary buckets returned by the summary endpoints
const SUMMARY_BUCKETS: [&str; 3] = ["overdue", "today", "other"];

fn schema(name: &str) -> Arc<Schema> {
    registry()
        .schema(name)
        .unwrap_or_else(|e| panic!("Built-in resource missing: {}", e))
}

/// Instance of a related resource carrying only its identifier
fn id_only(target: &str, key: &'static str, id: i64) -> Resource {
    let mut resource = Resource::new(schema(target));
    resource.store(key, FieldValue::Integer(id));
    resource
}

/// A task
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    resource: Resource,
}

impl Default for Task {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Resource> for Task {
    type Error = MappingError;

    fn try_from(resource: Resource) -> std::result::Result<Self, Self::Error> {
        if resource.type_name() != TASK {
            return Err(MappingError::UnknownResource(resource.type_name().to_string()));
        }
        Ok(Self { resource })
    }
}

impl Task {
    /// Empty transient task
    pub fn new() -> Self {
        Self {
            resource: Resource::new(schema(TASK)),
        }
    }

    /// Hydrate a task from its JSON representation
    pub fn from_json(raw: &Value) -> std::result::Result<Self, MappingError> {
        registry().hydrate(TASK, raw).map(|resource| Self { resource })
    }

    /// Hydrate a JSON array of tasks, keeping order
    pub fn listing(raw: &Value) -> std::result::Result<Vec<Self>, MappingError> {
        Ok(registry()
            .listing(TASK, raw)?
            .into_iter()
            .map(|resource| Self { resource })
            .collect())
    }

    pub fn as_resource(&self) -> &Resource {
        &self.resource
    }

    pub fn as_resource_mut(&mut self) -> &mut Resource {
        &mut self.resource
    }

    pub fn into_resource(self) -> Resource {
        self.resource
    }

    /// Attributes for a write request (set fields only)
    pub fn dehydrate(&self) -> Value {
        self.resource.dehydrate()
    }

    pub fn to_json(&self) -> Value {
        self.resource.to_json()
    }

    pub fn is_persisted(&self) -> bool {
        self.resource.is_persisted()
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn id(&self) -> Option<i64> {
        self.resource.integer("task_id")
    }

    pub fn status(&self) -> Option<&str> {
        self.resource.string("status")
    }

    pub fn group(&self) -> Option<&str> {
        self.resource.string("group")
    }

    pub fn text(&self) -> Option<&str> {
        self.resource.string("text")
    }

    pub fn description(&self) -> Option<&str> {
        self.resource.string("description")
    }

    pub fn is_private(&self) -> Option<bool> {
        self.resource.boolean("private")
    }

    pub fn due_on(&self) -> Option<DateTime<Utc>> {
        self.resource.datetime("due_on")
    }

    pub fn due_date(&self) -> Option<&str> {
        self.resource.string("due_date")
    }

    pub fn due_time(&self) -> Option<&str> {
        self.resource.string("due_time")
    }

    pub fn space_id(&self) -> Option<i64> {
        self.resource.integer("space_id")
    }

    pub fn link(&self) -> Option<&str> {
        self.resource.string("link")
    }

    pub fn created_on(&self) -> Option<DateTime<Utc>> {
        self.resource.datetime("created_on")
    }

    pub fn completed_on(&self) -> Option<DateTime<Utc>> {
        self.resource.datetime("completed_on")
    }

    pub fn external_id(&self) -> Option<&str> {
        self.resource.string("external_id")
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Object the task is attached to
    pub fn reference(&self) -> Option<&Resource> {
        self.resource.one("ref")
    }

    pub fn created_by(&self) -> Option<&Resource> {
        self.resource.one("created_by")
    }

    pub fn completed_by(&self) -> Option<&Resource> {
        self.resource.one("completed_by")
    }

    pub fn created_via(&self) -> Option<&Resource> {
        self.resource.one("created_via")
    }

    pub fn deleted_via(&self) -> Option<&Resource> {
        self.resource.one("deleted_via")
    }

    pub fn completed_via(&self) -> Option<&Resource> {
        self.resource.one("completed_via")
    }

    pub fn responsible(&self) -> Option<&Resource> {
        self.resource.one("responsible")
    }

    pub fn reminder(&self) -> Option<&Resource> {
        self.resource.one("reminder")
    }

    pub fn recurrence(&self) -> Option<&Resource> {
        self.resource.one("recurrence")
    }

    pub fn labels(&self) -> Option<&[Resource]> {
        self.resource.many("labels")
    }

    pub fn files(&self) -> Option<&[Resource]> {
        self.resource.many("files")
    }

    pub fn comments(&self) -> Option<&[Resource]> {
        self.resource.many("comments")
    }

    // =========================================================================
    // Setters
    // =========================================================================

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.resource.store("text", FieldValue::String(text.into()));
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.resource.store("description", FieldValue::String(description.into()));
        self
    }

    pub fn set_private(&mut self, private: bool) -> &mut Self {
        self.resource.store("private", FieldValue::Boolean(private));
        self
    }

    pub fn set_due_on(&mut self, due_on: DateTime<Utc>) -> &mut Self {
        self.resource.store("due_on", FieldValue::DateTime(due_on));
        self
    }

    /// `YYYY-MM-DD`
    pub fn set_due_date(&mut self, due_date: impl Into<String>) -> &mut Self {
        self.resource.store("due_date", FieldValue::String(due_date.into()));
        self
    }

    /// `HH:MM:SS`
    pub fn set_due_time(&mut self, due_time: impl Into<String>) -> &mut Self {
        self.resource.store("due_time", FieldValue::String(due_time.into()));
        self
    }

    pub fn set_external_id(&mut self, external_id: impl Into<String>) -> &mut Self {
        self.resource.store("external_id", FieldValue::String(external_id.into()));
        self
    }

    pub fn set_responsible(&mut self, user_id: i64) -> &mut Self {
        let user = id_only(USER, "user_id", user_id);
        self.resource.store("responsible", FieldValue::One(Box::new(user)));
        self
    }

    pub fn set_label_ids(&mut self, label_ids: &[i64]) -> &mut Self {
        let labels = label_ids.iter().map(|id| id_only(TASK_LABEL, "label_id", *id)).collect();
        self.resource.store("labels", FieldValue::Many(labels));
        self
    }

    pub fn set_file_ids(&mut self, file_ids: &[i64]) -> &mut Self {
        let files = file_ids.iter().map(|id| id_only(FILE, "file_id", *id)).collect();
        self.resource.store("files", FieldValue::Many(files));
        self
    }

    // =========================================================================
    // Instance operations
    // =========================================================================

    /// Create or update this task. A transient task is created and takes the
    /// identifier the API assigns; a persisted one is updated in place.
    pub async fn save<T: Transport>(&mut self, transport: &T) -> Result<&mut Self> {
        self.save_with(transport, &RequestOptions::default()).await
    }

    pub async fn save_with<T: Transport>(&mut self, transport: &T, options: &RequestOptions) -> Result<&mut Self> {
        let attributes = self.dehydrate();

        match self.id() {
            Some(task_id) => {
                tracing::debug!("Updating task {}", task_id);
                // Local state wins; an empty 2xx body is a successful update
                let url = transport.url_with_options(&format!("/task/{}", task_id), options);
                transport.put(&url, Some(&attributes)).await?;
            },
            None => {
                let created = Self::create(transport, &attributes, options).await?;
                let Some(task_id) = created.id() else {
                    tracing::warn!("Create response carried no task_id; task stays unsaved");
                    return Err(MappingError::MissingIdentifier {
                        resource: TASK.to_string(),
                    }
                    .into());
                };
                tracing::debug!("Created task {}", task_id);
                self.resource.set("task_id", task_id)?;
            },
        }

        Ok(self)
    }

    /// Mark this task completed
    pub async fn completed<T: Transport>(&self, transport: &T) -> Result<Response> {
        Self::complete(transport, self.require_id()?).await
    }

    /// Reopen this task
    pub async fn incompleted<T: Transport>(&self, transport: &T) -> Result<Response> {
        Self::incomplete(transport, self.require_id()?).await
    }

    /// Delete this task
    pub async fn destroy<T: Transport>(&self, transport: &T) -> Result<Response> {
        Self::delete(transport, self.require_id()?).await
    }

    /// Change the private flag of this task; returns the raw body
    pub async fn update_private<T: Transport>(
        &self,
        transport: &T,
        private_flag: bool,
        options: &RequestOptions,
    ) -> Result<String> {
        let task_id = self.require_id()?;
        let url = transport.url_with_options(&format!("/task/{}/private", task_id), options);
        let body = json!({ "private": private_flag });
        Ok(transport.put(&url, Some(&body)).await?.body)
    }

    fn require_id(&self) -> Result<i64> {
        self.id().ok_or(Error::NotPersisted(TASK))
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    /// POST /task/
    pub async fn create<T: Transport>(transport: &T, attributes: &Value, options: &RequestOptions) -> Result<Task> {
        let url = transport.url_with_options("/task/", options);
        member(transport.post(&url, Some(attributes)).await?)
    }

    /// POST /task/{ref_type}/{ref_id}/
    pub async fn create_for<T: Transport>(
        transport: &T,
        ref_type: &str,
        ref_id: i64,
        attributes: &Value,
        options: &RequestOptions,
    ) -> Result<Task> {
        let url = transport.url_with_options(&format!("/task/{}/{}/", ref_type, ref_id), options);
        member(transport.post(&url, Some(attributes)).await?)
    }

    /// GET /task/{task_id}
    pub async fn get<T: Transport>(transport: &T, task_id: i64) -> Result<Task> {
        member(transport.get(&format!("/task/{}", task_id), &Value::Null).await?)
    }

    /// GET /task/ with filters
    pub async fn get_all<T: Transport>(transport: &T, filters: &Value) -> Result<Vec<Task>> {
        let response = transport.get("/task/", filters).await?;
        Ok(Task::listing(&response.json_body()?)?)
    }

    /// PUT /task/{task_id}
    pub async fn update<T: Transport>(
        transport: &T,
        task_id: i64,
        attributes: &Value,
        options: &RequestOptions,
    ) -> Result<Task> {
        let url = transport.url_with_options(&format!("/task/{}", task_id), options);
        member(transport.put(&url, Some(attributes)).await?)
    }

    /// DELETE /task/{task_id}
    pub async fn delete<T: Transport>(transport: &T, task_id: i64) -> Result<Response> {
        Ok(transport.delete(&format!("/task/{}", task_id)).await?)
    }

    /// DELETE /task/{task_id}/ref
    pub async fn delete_ref<T: Transport>(transport: &T, task_id: i64) -> Result<Response> {
        Ok(transport.delete(&format!("/task/{}/ref", task_id)).await?)
    }

    /// POST /task/{task_id}/assign
    pub async fn assign<T: Transport>(transport: &T, task_id: i64, attributes: &Value) -> Result<Response> {
        Ok(transport.post(&format!("/task/{}/assign", task_id), Some(attributes)).await?)
    }

    /// POST /task/{task_id}/complete
    pub async fn complete<T: Transport>(transport: &T, task_id: i64) -> Result<Response> {
        Ok(transport.post(&format!("/task/{}/complete", task_id), None).await?)
    }

    /// POST /task/{task_id}/incomplete
    pub async fn incomplete<T: Transport>(transport: &T, task_id: i64) -> Result<Response> {
        Ok(transport.post(&format!("/task/{}/incomplete", task_id), None).await?)
    }

    /// POST /task/{task_id}/rank
    pub async fn rank<T: Transport>(transport: &T, task_id: i64, attributes: &Value) -> Result<Response> {
        Ok(transport.post(&format!("/task/{}/rank", task_id), Some(attributes)).await?)
    }

    /// GET /calendar/task/{task_id}/ics/ - iCalendar text, unparsed
    pub async fn ical<T: Transport>(transport: &T, task_id: i64) -> Result<String> {
        let response = transport
            .get(&format!("/calendar/task/{}/ics/", task_id), &Value::Null)
            .await?;
        Ok(response.body)
    }

    /// GET /task/summary
    pub async fn get_summary<T: Transport>(transport: &T, filters: &Value) -> Result<TaskSummary> {
        summary(transport, "/task/summary", filters).await
    }

    /// GET /task/personal/summary
    pub async fn get_summary_personal<T: Transport>(transport: &T, filters: &Value) -> Result<TaskSummary> {
        summary(transport, "/task/personal/summary", filters).await
    }

    /// GET /task/org/{org_id}/summary
    pub async fn get_summary_for_org<T: Transport>(transport: &T, org_id: i64, filters: &Value) -> Result<TaskSummary> {
        summary(transport, &format!("/task/org/{}/summary", org_id), filters).await
    }

    /// GET /task/space/{space_id}/summary
    pub async fn get_summary_for_space<T: Transport>(
        transport: &T,
        space_id: i64,
        filters: &Value,
    ) -> Result<TaskSummary> {
        summary(transport, &format!("/task/space/{}/summary", space_id), filters).await
    }

    /// GET /task/{ref_type}/{ref_id}/summary
    pub async fn get_summary_for<T: Transport>(
        transport: &T,
        ref_type: &str,
        ref_id: i64,
        filters: &Value,
    ) -> Result<TaskSummary> {
        summary(transport, &format!("/task/{}/{}/summary", ref_type, ref_id), filters).await
    }

    /// PUT /task/{task_id}/ref - returns the raw body
    pub async fn update_reference<T: Transport>(transport: &T, task_id: i64, attributes: &Value) -> Result<String> {
        let response = transport
            .put(&format!("/task/{}/ref", task_id), Some(attributes))
            .await?;
        Ok(response.body)
    }

    /// GET /task/{ref_type}/{ref_id}/count
    pub async fn count<T: Transport>(transport: &T, ref_type: &str, ref_id: i64) -> Result<Value> {
        let response = transport
            .get(&format!("/task/{}/{}/count", ref_type, ref_id), &Value::Null)
            .await?;
        Ok(response.json_body()?)
    }
}

fn member(response: Response) -> Result<Task> {
    Ok(Task::from_json(&response.json_body()?)?)
}

async fn summary<T: Transport>(transport: &T, path: &str, filters: &Value) -> Result<TaskSummary> {
    let response = transport.get(path, filters).await?;
    TaskSummary::from_json(response.json_body()?)
}

/// One bucket of a task summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryBucket {
    pub tasks: Vec<Task>,
    /// Remaining keys of the bucket (e.g. `total`), untouched
    pub extra: Map<String, Value>,
}

/// Remove an object bucket from the summary map; anything else stays put
fn take_bucket(map: &mut Map<String, Value>, name: &str) -> Result<SummaryBucket> {
    if !matches!(map.get(name), Some(Value::Object(_))) {
        return Ok(SummaryBucket::default());
    }
    match map.remove(name) {
        Some(Value::Object(bucket)) => SummaryBucket::from_map(bucket),
        _ => Ok(SummaryBucket::default()),
    }
}

impl SummaryBucket {
    fn from_map(mut map: Map<String, Value>) -> Result<Self> {

        let tasks = match map.remove("tasks") {
            Some(raw) => Task::listing(&raw)?,
            None => Vec::new(),
        };

        Ok(Self { tasks, extra: map })
    }

    fn to_json(&self) -> Value {
        let mut map = self.extra.clone();
        map.insert(
            "tasks".to_string(),
            Value::Array(self.tasks.iter().map(Task::to_json).collect()),
        );
        Value::Object(map)
    }
}

/// Tasks grouped into overdue / today / other
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSummary {
    pub overdue: SummaryBucket,
    pub today: SummaryBucket,
    pub other: SummaryBucket,
    /// Remaining top-level keys, untouched
    pub extra: Map<String, Value>,
}

impl TaskSummary {
    /// Convert a summary response; every `tasks` array is hydrated, all other
    /// keys pass through. A missing bucket reads as empty.
    pub fn from_json(raw: Value) -> Result<Self> {
        let Value::Object(mut map) = raw else {
            return Err(MappingError::NotAnObject {
                resource: "task summary".to_string(),
            }
            .into());
        };

        Ok(Self {
            overdue: take_bucket(&mut map, SUMMARY_BUCKETS[0])?,
            today: take_bucket(&mut map, SUMMARY_BUCKETS[1])?,
            other: take_bucket(&mut map, SUMMARY_BUCKETS[2])?,
            extra: map,
        })
    }

    pub fn buckets(&self) -> [(&'static str, &SummaryBucket); 3] {
        [
            (SUMMARY_BUCKETS[0], &self.overdue),
            (SUMMARY_BUCKETS[1], &self.today),
            (SUMMARY_BUCKETS[2], &self.other),
        ]
    }

    /// Same top-level structure as the response, tasks rendered as objects
    pub fn to_json(&self) -> Value {
        let mut map = self.extra.clone();
        for (name, bucket) in self.buckets() {
            // A bucket the server sent as a non-object is kept verbatim in `extra`
            map.entry(name).or_insert_with(|| bucket.to_json());
        }
        Value::Object(map)
    }
}
