use anyhow::Result;
use backlog_indexer::IndexerError;
use backlog_links::LinkError;
use backlog_protocol::ErrorEnvelope;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandRequest {
    pub action: CommandAction,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandAction {
    Validate,
    ValidateFile,
    Dashboard,
    Blocked,
    AuditLinks,
    SyncBacklinks,
    NextId,
    Velocity,
    Burndown,
    ClearCaches,
    Scope,
    Schema,
}

impl CommandAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::ValidateFile => "validate_file",
            Self::Dashboard => "dashboard",
            Self::Blocked => "blocked",
            Self::AuditLinks => "audit_links",
            Self::SyncBacklinks => "sync_backlinks",
            Self::NextId => "next_id",
            Self::Velocity => "velocity",
            Self::Burndown => "burndown",
            Self::ClearCaches => "clear_caches",
            Self::Scope => "scope",
            Self::Schema => "schema",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
    #[serde(default)]
    pub data: Value,
}

impl CommandResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: None,
            error: None,
            data,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, CommandStatus::Error)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
    Error,
}

/// Request-level failures that are not library errors
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub code: &'static str,
    pub hint: Option<String>,
}

pub struct CommandOutcome {
    pub data: Value,
}

impl CommandOutcome {
    pub fn from_value<T: Serialize>(value: T) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(value)?,
        })
    }
}

pub fn parse_payload<T: DeserializeOwned>(action: CommandAction, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|err| {
        CommandError::InvalidRequest(format!("{} payload: {err}", action.as_str())).into()
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatePayload {
    /// Root-relative document; the whole tree when absent
    pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateFilePayload {
    pub file: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncBacklinksPayload {
    pub dry_run: bool,
}

/// Exactly one of the three selectors
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NextIdPayload {
    pub prefix: Option<String>,
    pub item: bool,
    pub checkpoint: Option<String>,
}

pub enum IdScope {
    Category(String),
    Item,
    Checkpoint(String),
}

impl NextIdPayload {
    pub fn scope(self) -> Result<IdScope> {
        match (self.prefix, self.item, self.checkpoint) {
            (Some(prefix), false, None) => Ok(IdScope::Category(prefix)),
            (None, true, None) => Ok(IdScope::Item),
            (None, false, Some(category)) => Ok(IdScope::Checkpoint(category)),
            _ => Err(CommandError::InvalidRequest(
                "next_id takes exactly one of prefix, item or checkpoint".to_string(),
            )
            .into()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowPayload {
    /// Window length; the configured default when absent
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopePayload {
    pub file: String,
    pub line: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaPayload {
    /// One report name; every schema when absent
    pub report: Option<String>,
}

pub fn classify_error(err: &anyhow::Error, action: Option<CommandAction>) -> ErrorClassification {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<CommandError>() {
            return match err {
                CommandError::InvalidRequest(_) => ErrorClassification {
                    code: "invalid_request",
                    hint: action.map(|a| format!("Check the payload fields accepted by {}.", a.as_str())),
                },
                CommandError::NotFound(_) => ErrorClassification {
                    code: "not_found",
                    hint: Some("Paths are relative to --root; ids are case-sensitive.".to_string()),
                },
            };
        }
        if let Some(err) = cause.downcast_ref::<IndexerError>() {
            return classify_indexer(err);
        }
        if let Some(LinkError::MissingRoot(_)) = cause.downcast_ref::<LinkError>() {
            return missing_root();
        }
    }
    ErrorClassification {
        code: "internal",
        hint: None,
    }
}

fn classify_indexer(err: &IndexerError) -> ErrorClassification {
    match err {
        IndexerError::MissingRoot(_) => missing_root(),
        IndexerError::InvalidConfig(_) => ErrorClassification {
            code: "invalid_config",
            hint: Some("Fix backlog.toml or point --config at a valid file.".to_string()),
        },
        IndexerError::UnknownPrefix(_) => ErrorClassification {
            code: "invalid_request",
            hint: Some("Use one of the configured category_prefixes.".to_string()),
        },
        IndexerError::CategoryNotFound(_) => ErrorClassification {
            code: "not_found",
            hint: Some("Checkpoint ids are derived from an existing category id.".to_string()),
        },
        IndexerError::IdSpaceExhausted(_) => ErrorClassification {
            code: "invalid_request",
            hint: Some("Renumber the highest id in the backlog.".to_string()),
        },
        _ => ErrorClassification {
            code: "internal",
            hint: None,
        },
    }
}

fn missing_root() -> ErrorClassification {
    ErrorClassification {
        code: "missing_root",
        hint: Some("Pass --root pointing at the backlog directory.".to_string()),
    }
}

pub fn error_response(err: anyhow::Error, action: Option<CommandAction>) -> CommandResponse {
    let message = format!("{err:#}");
    let classification = classify_error(&err, action);
    CommandResponse {
        status: CommandStatus::Error,
        message: Some(message.clone()),
        error: Some(ErrorEnvelope {
            code: classification.code.to_string(),
            message,
            hint: classification.hint,
        }),
        data: Value::Null,
    }
}
