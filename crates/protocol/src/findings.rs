use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload shared by every finding
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct FindingDetail {
    pub file: String,
    pub line: usize,
    pub rule: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Entity id or property the finding is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl FindingDetail {
    pub fn new(
        file: impl Into<String>,
        line: usize,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            rule: rule.into(),
            message: message.into(),
            hint: None,
            context: None,
        }
    }

    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A validation finding, tagged by severity.
///
/// Serialized flat: `{"severity": "error", "file": ..., "rule": ...}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "severity", rename_all = "lowercase")]
pub enum Finding {
    Error(FindingDetail),
    Warning(FindingDetail),
    Info(FindingDetail),
}

impl Finding {
    pub fn new(severity: Severity, detail: FindingDetail) -> Self {
        match severity {
            Severity::Error => Finding::Error(detail),
            Severity::Warning => Finding::Warning(detail),
            Severity::Info => Finding::Info(detail),
        }
    }

    pub const fn severity(&self) -> Severity {
        match self {
            Finding::Error(_) => Severity::Error,
            Finding::Warning(_) => Severity::Warning,
            Finding::Info(_) => Severity::Info,
        }
    }

    pub const fn detail(&self) -> &FindingDetail {
        match self {
            Finding::Error(d) | Finding::Warning(d) | Finding::Info(d) => d,
        }
    }

    pub fn rule(&self) -> &str {
        &self.detail().rule
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Finding::Error(_))
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.detail();
        write!(
            f,
            "{}:{}: {} [{}] {}",
            d.file,
            d.line,
            self.severity(),
            d.rule,
            d.message
        )?;
        if let Some(hint) = &d.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
