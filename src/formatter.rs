use crate::config::LinkRewrite;
use crate::models::{ActivityKind, AgentTask, ClockStyle, CodeHostActivity, IssueTouched, LogEntry};
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

static SECOND_LEVEL_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\s*)\+(\s+)").expect("valid regex"));
static FIRST_LEVEL_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\s*)\*(\s+)").expect("valid regex"));
static STRUCTURAL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#{1,6}\s|---$|\[\d{2}:\d{2})").expect("valid regex"));

const COMMIT_TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    Markdown,
    WikiLink,
}

pub fn clock_tag(time: NaiveTime, style: ClockStyle) -> String {
    match style {
        ClockStyle::TwentyFourHour => time.format("[%H:%M]").to_string(),
        ClockStyle::TwelveHour => time.format("[%I:%M %p]").to_string(),
    }
}

pub fn render_log_entry(entry: &LogEntry) -> String {
    format!("{} {}", clock_tag(entry.time, entry.style), entry.text.trim())
}

pub fn normalize_bullets(body: &str) -> String {
    let second = SECOND_LEVEL_BULLET.replace_all(body, "${1}        -${2}");
    FIRST_LEVEL_BULLET.replace_all(&second, "${1}    -${2}").into_owned()
}

pub fn render_progress_update(time: NaiveTime, label: &str, url: &str, body: &str, style: LinkStyle) -> Vec<String> {
    let tag = clock_tag(time, ClockStyle::TwentyFourHour);
    let header = match style {
        LinkStyle::Markdown => format!("{} - [{}]({}):", tag, label.trim(), url),
        LinkStyle::WikiLink => format!("{} - [[{}]] ([link]({})):", tag, label.trim(), url),
    };

    let normalized = normalize_bullets(body);
    let content_lines: Vec<&str> = normalized
        .trim()
        .split('\n')
        .map(|line| line.trim_end())
        .filter(|line| !line.trim().is_empty())
        .collect();

    match content_lines.as_slice() {
        [] => vec![header],
        [single] if !single.trim_start().starts_with(&['*', '-', '+'][..]) => {
            vec![format!("{} {}", header, single.trim())]
        }
        _ => std::iter::once(header)
            .chain(content_lines.iter().map(|line| escape_structural_line(line)))
            .collect(),
    }
}

// A body line must never classify as a header, separator or log entry.
pub fn escape_structural_line(line: &str) -> String {
    let body = line.trim_start();
    if STRUCTURAL_LINE.is_match(body.trim_end()) {
        let indent = &line[..line.len() - body.len()];
        format!("{}\\{}", indent, body)
    } else {
        line.to_string()
    }
}

pub fn render_status_entry(key: &str, context: Option<&str>, title: &str, status: &str, url: &str) -> String {
    match context.map(str::trim).filter(|value| !value.is_empty()) {
        Some(context) => format!("{} {} - {} ({}) ([link]({}))", key, context, title.trim(), status, url),
        None => format!("{} {} ({}) ([link]({}))", key, title.trim(), status, url),
    }
}

pub fn render_issue_touched(issue: &IssueTouched, rewrite: Option<&LinkRewrite>) -> String {
    let url = match rewrite {
        Some(rewrite) => rewrite.apply(&issue.url),
        None => issue.url.clone(),
    };
    render_status_entry(
        &issue.identifier,
        issue.project.as_deref(),
        &issue.title,
        &issue.status,
        &url,
    )
}

pub fn render_agent_task(task: &AgentTask) -> String {
    format!("- {} ([{}]({}))", task.title.trim(), task.id, task.url)
}

pub fn render_code_host_activity(activity: &CodeHostActivity) -> String {
    let text = match (activity.kind, activity.number, activity.sha.as_deref()) {
        (ActivityKind::PullRequest, Some(number), _) => {
            format!("{}#{}: {}", activity.repo, number, activity.title.trim())
        }
        (ActivityKind::Commit, _, Some(sha)) if !sha.is_empty() => {
            format!("{}: {}", activity.repo, truncate_chars(activity.title.trim(), COMMIT_TITLE_MAX_CHARS))
        }
        _ => format!("{}: {}", activity.repo, activity.title.trim()),
    };
    match activity.url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => format!("[{}]({})", text, url),
        None => text,
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let head: String = value.chars().take(max).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}
