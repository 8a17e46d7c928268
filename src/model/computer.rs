//! Computers (build nodes) attached to the server.

use super::json;
use crate::error::{ParsingError, Result};
use serde_json::Value;

/// A single build node
#[derive(Clone, Debug)]
pub struct Computer {
    /// The node's display name
    pub display_name: String,
    /// The node's description
    pub description: Option<String>,
    /// Number of executors on the node
    pub num_executors: Option<u64>,
    /// Whether the node is currently offline
    pub offline: bool,
    /// Whether the node is idle
    pub idle: bool,
    /// Available physical memory in bytes, from the node monitor
    pub available_physical_memory: Option<u64>,
    /// Total physical memory in bytes, from the node monitor
    pub total_physical_memory: Option<u64>,
}

impl Computer {
    fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let memory = object
            .get("monitorData")
            .and_then(Value::as_object)
            .and_then(|monitors| monitors.get("hudson.node_monitors.SwapSpaceMonitor"))
            .and_then(Value::as_object);

        Ok(Computer {
            display_name: json::required_str(object, "displayName")?.to_string(),
            description: json::optional_str(object, "description"),
            num_executors: json::optional_u64(object, "numExecutors"),
            offline: json::optional_bool(object, "offline").unwrap_or(false),
            idle: json::optional_bool(object, "idle").unwrap_or(true),
            available_physical_memory: memory
                .and_then(|m| json::optional_u64(m, "availablePhysicalMemory")),
            total_physical_memory: memory
                .and_then(|m| json::optional_u64(m, "totalPhysicalMemory")),
        })
    }
}

/// The computer list payload
#[derive(Clone, Debug)]
pub struct ComputerList {
    /// Executors currently busy across all nodes
    pub busy_executors: Option<u64>,
    /// Total executors across all nodes
    pub total_executors: Option<u64>,
    /// All nodes
    pub computers: Vec<Computer>,
}

impl ComputerList {
    /// Loose-decode a computer list payload.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let computers = json::required(object, "computer")?
            .as_array()
            .ok_or(ParsingError::DataNotCorrectFormat)?;
        Ok(ComputerList {
            busy_executors: json::optional_u64(object, "busyExecutors"),
            total_executors: json::optional_u64(object, "totalExecutors"),
            computers: computers
                .iter()
                .map(Computer::parse)
                .collect::<Result<Vec<_>>>()?,
        })
    }
}
