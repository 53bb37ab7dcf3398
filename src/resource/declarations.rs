//! Built-in resource declarations
//!
//! Field tables for the task resource and every resource it embeds.

use super::schema::{PropertyKind::*, PropertyOptions, RelationOptions, Schema, SchemaBuilder};
use crate::error::SchemaError;

pub const TASK: &str = "task";
pub const REFERENCE: &str = "reference";
pub const BYLINE: &str = "byline";
pub const VIA: &str = "via";
pub const USER: &str = "user";
pub const REMINDER: &str = "reminder";
pub const RECURRENCE: &str = "recurrence";
pub const TASK_LABEL: &str = "task_label";
pub const FILE: &str = "file";
pub const COMMENT: &str = "comment";

fn plain() -> PropertyOptions {
    PropertyOptions::default()
}

fn id() -> PropertyOptions {
    PropertyOptions::identifier()
}

fn embedded() -> RelationOptions {
    RelationOptions::default()
}

/// Every built-in schema
pub fn all() -> Result<Vec<Schema>, SchemaError> {
    [
        task(),
        reference(),
        byline(),
        via(),
        user(),
        reminder(),
        recurrence(),
        task_label(),
        file(),
        comment(),
    ]
    .into_iter()
    .map(SchemaBuilder::build)
    .collect()
}

fn task() -> SchemaBuilder {
    Schema::builder(TASK)
        .property("task_id", Integer, id())
        .property("status", String, plain())
        .property("group", String, plain())
        .property("text", String, plain())
        .property("description", String, plain())
        .property("private", Boolean, plain())
        .property("due_on", DateTime, plain())
        .property("due_date", String, plain())
        .property("due_time", String, plain())
        .property("space_id", Integer, plain())
        .property("link", String, plain())
        .property("created_on", DateTime, plain())
        .property("completed_on", DateTime, plain())
        .property("external_id", String, plain())
        .has_one("ref", REFERENCE, embedded())
        .has_one("created_by", BYLINE, embedded())
        .has_one("completed_by", BYLINE, embedded())
        .has_one("created_via", VIA, embedded())
        .has_one("deleted_via", VIA, embedded())
        .has_one("completed_via", VIA, embedded())
        .has_one("responsible", USER, RelationOptions::json_value("user_id"))
        .has_one("reminder", REMINDER, embedded())
        .has_one("recurrence", RECURRENCE, embedded())
        .has_many(
            "labels",
            TASK_LABEL,
            RelationOptions::json_value("label_id").json_target("label_ids"),
        )
        .has_many(
            "files",
            FILE,
            RelationOptions::json_value("file_id").json_target("file_ids"),
        )
        .has_many("comments", COMMENT, embedded())
}

fn reference() -> SchemaBuilder {
    Schema::builder(REFERENCE)
        .property("type", String, plain())
        .property("id", Integer, plain())
        .property("title", String, plain())
        .property("link", String, plain())
        .property("data", Json, plain())
        .property("created_on", DateTime, plain())
        .has_one("created_by", BYLINE, embedded())
        .has_one("created_via", VIA, embedded())
}

fn byline() -> SchemaBuilder {
    Schema::builder(BYLINE)
        .property("type", String, plain())
        .property("id", Integer, plain())
        .property("avatar_type", String, plain())
        .property("avatar_id", Integer, plain())
        .property("image", Json, plain())
        .property("name", String, plain())
        .property("url", String, plain())
        .property("avatar", Integer, plain())
        .property("link", String, plain())
        .property("last_seen_on", DateTime, plain())
}

fn via() -> SchemaBuilder {
    Schema::builder(VIA)
        .property("id", Integer, id())
        .property("name", String, plain())
        .property("url", String, plain())
        .property("display", Boolean, plain())
}

fn user() -> SchemaBuilder {
    Schema::builder(USER)
        .property("user_id", Integer, id())
        .property("profile_id", Integer, plain())
        .property("name", String, plain())
        .property("link", String, plain())
        .property("avatar", Integer, plain())
        .property("mail", String, plain())
        .property("status", String, plain())
        .property("locale", String, plain())
        .property("timezone", String, plain())
        .property("type", String, plain())
        .property("created_on", DateTime, plain())
}

fn reminder() -> SchemaBuilder {
    Schema::builder(REMINDER)
        .property("reminder_id", Integer, id())
        .property("remind_delta", Integer, plain())
}

fn recurrence() -> SchemaBuilder {
    Schema::builder(RECURRENCE)
        .property("recurrence_id", Integer, id())
        .property("name", String, plain())
        .property("config", Json, plain())
        .property("step", Integer, plain())
        .property("until", Date, plain())
}

fn task_label() -> SchemaBuilder {
    Schema::builder(TASK_LABEL)
        .property("label_id", Integer, id())
        .property("text", String, plain())
        .property("color", String, plain())
}

fn file() -> SchemaBuilder {
    Schema::builder(FILE)
        .property("file_id", Integer, id())
        .property("link", String, plain())
        .property("perma_link", String, plain())
        .property("thumbnail_link", String, plain())
        .property("hosted_by", String, plain())
        .property("name", String, plain())
        .property("description", String, plain())
        .property("mimetype", String, plain())
        .property("size", Integer, plain())
        .property("context", Json, plain())
        .property("created_on", DateTime, plain())
        .has_one("created_by", BYLINE, embedded())
        .has_one("created_via", VIA, embedded())
        .has_many("replaces", FILE, embedded())
}

fn comment() -> SchemaBuilder {
    Schema::builder(COMMENT)
        .property("comment_id", Integer, id())
        .property("value", String, plain())
        .property("rich_value", String, plain())
        .property("external_id", String, plain())
        .property("space_id", Integer, plain())
        .property("created_on", DateTime, plain())
        .property("like_count", Integer, plain())
        .property("is_liked", Boolean, plain())
        .has_one("created_by", BYLINE, embedded())
        .has_one("created_via", VIA, embedded())
        .has_many("files", FILE, RelationOptions::json_value("file_id").json_target("file_ids"))
}
