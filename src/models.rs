use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteVariant {
    DailyAction,
    WeeklyCycle,
}

impl NoteVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DailyAction => "daily-action",
            Self::WeeklyCycle => "weekly-cycle",
        }
    }
}

// Declaration order is canonical order; new-section placement uses the derived Ord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    InitiativeUpdates,
    ProjectUpdates,
    CompletedTasks,
    IssuesTouched,
    AgentTasks,
    CodeHostActivity,
}

impl SectionKind {
    pub const CANONICAL: [SectionKind; 6] = [
        Self::InitiativeUpdates,
        Self::ProjectUpdates,
        Self::CompletedTasks,
        Self::IssuesTouched,
        Self::AgentTasks,
        Self::CodeHostActivity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitiativeUpdates => "initiative-updates",
            Self::ProjectUpdates => "project-updates",
            Self::CompletedTasks => "completed-tasks",
            Self::IssuesTouched => "issues-touched",
            Self::AgentTasks => "agent-tasks",
            Self::CodeHostActivity => "code-host-activity",
        }
    }

    pub fn entry_style(self) -> EntryStyle {
        match self {
            Self::CompletedTasks | Self::CodeHostActivity => EntryStyle::Log,
            Self::InitiativeUpdates | Self::ProjectUpdates | Self::IssuesTouched | Self::AgentTasks => {
                EntryStyle::Keyed
            }
        }
    }

    pub fn dedups_log_entries(self) -> bool {
        matches!(self, Self::CompletedTasks | Self::CodeHostActivity)
    }

    pub fn multi_line_entries(self) -> bool {
        matches!(self, Self::InitiativeUpdates | Self::ProjectUpdates)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStyle {
    Log,
    Keyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockStyle {
    TwentyFourHour,
    TwelveHour,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub time: NaiveTime,
    pub style: ClockStyle,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKey {
    // Matches a managed line containing `(url)`.
    Url(String),
    LeadingToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedEntry {
    pub key: EntryKey,
    pub lines: Vec<String>,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Log(LogEntry),
    Keyed(KeyedEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertAction {
    Inserted,
    Updated,
    Skipped,
}

impl UpsertAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inserted => "inserted",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertOutcome {
    pub action: UpsertAction,
    pub variant: NoteVariant,
    pub section: SectionKind,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "kebab-case")]
pub enum WriteStatus {
    Written(UpsertOutcome),
    Failed(String),
    NotApplicable,
}

impl WriteStatus {
    pub fn action(&self) -> Option<UpsertAction> {
        match self {
            Self::Written(outcome) => Some(outcome.action),
            Self::Failed(_) | Self::NotApplicable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteWriteReport {
    pub daily: WriteStatus,
    pub weekly: WriteStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateScope {
    Initiative,
    Project,
}

impl UpdateScope {
    pub fn section(self) -> SectionKind {
        match self {
            Self::Initiative => SectionKind::InitiativeUpdates,
            Self::Project => SectionKind::ProjectUpdates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub scope: UpdateScope,
    pub url: String,
    pub label: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTouched {
    pub identifier: String,
    #[serde(default)]
    pub project: Option<String>,
    pub title: String,
    pub status: String,
    pub url: String,
    #[serde(default)]
    pub status_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTask {
    pub id: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityKind {
    PullRequest,
    Commit,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeHostActivity {
    pub kind: ActivityKind,
    pub repo: String,
    pub title: String,
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
