//! Build parameter definitions and the values chosen for them.

use super::json;
use crate::error::Result;
use serde_json::Value;

/// The type of a build parameter, derived from its definition class name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterType {
    /// Single-line string parameter
    String,
    /// Multi-line text parameter
    Text,
    /// Boolean checkbox parameter
    Boolean,
    /// Choice from a fixed candidate list
    Choice,
    /// Masked password parameter
    Password,
    /// File upload parameter
    File,
    /// Reference to a build of another job
    Run,
    /// Credentials-store reference
    Credentials,
    /// Git-backed parameter whose candidates come from a plugin endpoint
    Git,
    /// Anything this client does not know about
    Unknown,
}

impl ParameterType {
    /// Derive the type from the server's parameter definition class name.
    pub fn from_definition(class_name: &str) -> Self {
        if class_name.contains("GitParameter") {
            return ParameterType::Git;
        }
        match class_name {
            "StringParameterDefinition" => ParameterType::String,
            "TextParameterDefinition" => ParameterType::Text,
            "BooleanParameterDefinition" => ParameterType::Boolean,
            "ChoiceParameterDefinition" => ParameterType::Choice,
            "PasswordParameterDefinition" => ParameterType::Password,
            "FileParameterDefinition" => ParameterType::File,
            "RunParameterDefinition" => ParameterType::Run,
            "CredentialsParameterDefinition" => ParameterType::Credentials,
            _ => ParameterType::Unknown,
        }
    }

    /// Whether the parameter's candidate values come from the git plugin
    pub fn is_git(self) -> bool {
        self == ParameterType::Git
    }

    /// Whether the parameter carries a file upload
    pub fn is_file(self) -> bool {
        self == ParameterType::File
    }
}

/// A parameter definition of a parameterized job
#[derive(Clone, Debug)]
pub struct Parameter {
    /// The parameter's name
    pub name: String,
    /// The parameter's type
    pub kind: ParameterType,
    /// Free-form description
    pub description: Option<String>,
    /// Default value, when the definition carries one
    pub default_value: Option<String>,
    /// Candidate values: the definition's own choices, or for git-backed
    /// parameters the values fetched from the plugin endpoint
    pub choices: Vec<String>,
}

impl Parameter {
    /// Loose-decode a parameter definition.
    pub fn parse(value: &Value) -> Result<Self> {
        let object = json::as_object(value)?;
        let name = json::required_str(object, "name")?.to_string();

        let kind = json::optional_str(object, "type")
            .map(|class_name| ParameterType::from_definition(&class_name))
            .unwrap_or(ParameterType::Unknown);

        let default_value = object
            .get("defaultParameterValue")
            .and_then(Value::as_object)
            .and_then(|default| default.get("value"))
            .and_then(value_to_string);

        let choices = json::array_or_empty(object, "choices")
            .iter()
            .filter_map(|choice| choice.as_str().map(str::to_string))
            .collect();

        Ok(Parameter {
            name,
            kind,
            description: json::optional_str(object, "description"),
            default_value,
            choices,
        })
    }
}

/// A value chosen for a parameter when triggering a build
#[derive(Clone, Debug)]
pub struct ParameterValue {
    /// The parameter the value belongs to
    pub parameter: Parameter,
    /// The chosen value; `None` submits the parameter without a value
    pub value: Option<String>,
}

impl ParameterValue {
    /// Pair a parameter with a chosen value.
    pub fn new(parameter: Parameter, value: impl Into<Option<String>>) -> Self {
        ParameterValue {
            parameter,
            value: value.into(),
        }
    }
}

/// Default values arrive as strings, booleans or numbers.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
