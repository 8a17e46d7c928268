//! The server's build queue.

use super::json;
use crate::error::{ParsingError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

/// A single queued item waiting to be built
#[derive(Clone, Debug)]
pub struct QueueItem {
    /// The queue item's id
    pub id: u64,
    /// Why the item is still waiting
    pub why: Option<String>,
    /// Whether the item is blocked by another build
    pub blocked: bool,
    /// Whether the item could be built right now
    pub buildable: bool,
    /// Whether the server considers the item stuck
    pub stuck: bool,
    /// When the item entered the queue
    pub in_queue_since: Option<DateTime<Utc>>,
    /// Name of the job the item belongs to
    pub task_name: Option<String>,
    /// URL of the job the item belongs to
    pub task_url: Option<Url>,
}

impl QueueItem {
    fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let task = object.get("task").and_then(Value::as_object);

        Ok(QueueItem {
            id: json::required(object, "id")?
                .as_u64()
                .ok_or(ParsingError::DataNotCorrectFormat)?,
            why: json::optional_str(object, "why"),
            blocked: json::optional_bool(object, "blocked").unwrap_or(false),
            buildable: json::optional_bool(object, "buildable").unwrap_or(false),
            stuck: json::optional_bool(object, "stuck").unwrap_or(false),
            in_queue_since: json::optional_timestamp(object, "inQueueSince"),
            task_name: task.and_then(|task| json::optional_str(task, "name")),
            task_url: task.and_then(|task| json::optional_url(task, "url")),
        })
    }
}

/// The build queue payload
#[derive(Clone, Debug)]
pub struct BuildQueue {
    /// All queued items
    pub items: Vec<QueueItem>,
}

impl BuildQueue {
    /// Loose-decode a build queue payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let items = json::required(object, "items")?
            .as_array()
            .ok_or(ParsingError::DataNotCorrectFormat)?;
        Ok(BuildQueue {
            items: items
                .iter()
                .map(QueueItem::parse)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
