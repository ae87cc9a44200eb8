use crate::errors::{AppError, AppResult};
use crate::models::{EntryKey, EntryStyle, NoteVariant, SectionKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::Bound;

static LOG_ENTRY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\d{2}:\d{2}(?:\s*(?:AM|PM))?\]\s*(.*)$").expect("valid regex"));
static HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").expect("valid regex"));

pub const SEPARATOR: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    LogEntry,
    Separator,
    TemplateBoundary,
    Blank,
    Other,
}

impl LineKind {
    pub fn is_boundary(self) -> bool {
        matches!(self, Self::Header | Self::Separator | Self::TemplateBoundary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedRange {
    pub start: usize,
    pub end: usize,
    pub anchor: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SectionModel {
    variant: NoteVariant,
    headers: Vec<(SectionKind, String)>,
    template_boundary: Option<String>,
}

impl SectionModel {
    pub fn daily_action(template_boundary: impl Into<String>) -> Self {
        let template_boundary = template_boundary.into();
        Self {
            variant: NoteVariant::DailyAction,
            headers: build_headers(NoteVariant::DailyAction),
            template_boundary: Some(template_boundary.trim().to_string()).filter(|value| !value.is_empty()),
        }
    }

    pub fn weekly_cycle() -> Self {
        Self {
            variant: NoteVariant::WeeklyCycle,
            headers: build_headers(NoteVariant::WeeklyCycle),
            template_boundary: None,
        }
    }

    pub fn header(&self, kind: SectionKind) -> Option<&str> {
        self.headers
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, header)| header.as_str())
    }

    pub fn require_header(&self, kind: SectionKind) -> AppResult<&str> {
        self.header(kind).ok_or_else(|| {
            AppError::UnsupportedSection(format!(
                "{} notes have no {} section",
                self.variant.as_str(),
                kind.as_str()
            ))
        })
    }

    pub fn classify(&self, line: &str) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed == SEPARATOR {
            return LineKind::Separator;
        }
        if self.template_boundary.as_deref() == Some(trimmed) {
            return LineKind::TemplateBoundary;
        }
        if HEADER_PATTERN.is_match(trimmed) {
            return LineKind::Header;
        }
        if LOG_ENTRY_PATTERN.is_match(line.trim_end()) {
            return LineKind::LogEntry;
        }
        LineKind::Other
    }

    pub fn find_headers(&self, lines: &[String], start: usize, end: usize) -> BTreeMap<SectionKind, usize> {
        let mut found = BTreeMap::new();
        for (idx, line) in lines.iter().enumerate().take(end).skip(start) {
            let trimmed = line.trim();
            if let Some((kind, _)) = self.headers.iter().find(|(_, header)| header == trimmed) {
                found.entry(*kind).or_insert(idx);
            }
        }
        found
    }

    pub fn section_tail(&self, lines: &[String], kind: SectionKind, header_line: usize, range: &ManagedRange) -> usize {
        let end = range.end.min(lines.len());
        let mut tail = header_line + 1;
        match kind.entry_style() {
            EntryStyle::Log => {
                let mut seen_entry = false;
                for (idx, line) in lines.iter().enumerate().take(end).skip(header_line + 1) {
                    match self.classify(line) {
                        LineKind::LogEntry => {
                            seen_entry = true;
                            tail = idx + 1;
                        }
                        LineKind::Blank if !seen_entry => {}
                        _ => break,
                    }
                }
            }
            EntryStyle::Keyed => {
                for (idx, line) in lines.iter().enumerate().take(end).skip(header_line + 1) {
                    match self.classify(line) {
                        line_kind if line_kind.is_boundary() => break,
                        LineKind::Blank => {}
                        _ => tail = idx + 1,
                    }
                }
            }
        }
        tail
    }

    pub fn insertion_point_for_new_section(&self, lines: &[String], kind: SectionKind, range: &ManagedRange) -> usize {
        let present = self.find_headers(lines, range.start, range.end);
        if let Some((_, line)) = present.range((Bound::Excluded(kind), Bound::Unbounded)).next() {
            return *line;
        }
        if let Some(anchor) = range.anchor {
            return anchor;
        }
        // No later section and no anchor: keep canonical order by landing after the nearest earlier section.
        if let Some((earlier, line)) = present.range(..kind).next_back() {
            return self.section_tail(lines, *earlier, *line, range);
        }
        range.start
    }
}

fn build_headers(variant: NoteVariant) -> Vec<(SectionKind, String)> {
    let prefix = match variant {
        NoteVariant::DailyAction => "###",
        NoteVariant::WeeklyCycle => "#####",
    };
    SectionKind::CANONICAL
        .iter()
        .filter_map(|kind| section_title(variant, *kind).map(|title| (*kind, format!("{} {}", prefix, title))))
        .collect()
}

fn section_title(variant: NoteVariant, kind: SectionKind) -> Option<&'static str> {
    match (variant, kind) {
        (_, SectionKind::InitiativeUpdates) => Some("Initiative Updates:"),
        (_, SectionKind::ProjectUpdates) => Some("Project Updates:"),
        (NoteVariant::DailyAction, SectionKind::CompletedTasks) => Some("Completed Tasks on Todoist:"),
        (NoteVariant::WeeklyCycle, SectionKind::CompletedTasks) => Some("Completed Tasks:"),
        (_, SectionKind::IssuesTouched) => Some("Linear Issues Touched:"),
        (_, SectionKind::AgentTasks) => Some("Manus Tasks:"),
        (NoteVariant::DailyAction, SectionKind::CodeHostActivity) => Some("GitHub Activity:"),
        (NoteVariant::WeeklyCycle, SectionKind::CodeHostActivity) => None,
    }
}

pub fn log_entry_text(line: &str) -> Option<&str> {
    LOG_ENTRY_PATTERN
        .captures(line.trim_end())
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str())
}

pub fn normalize_entry_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn key_matches(line: &str, key: &EntryKey) -> bool {
    match key {
        EntryKey::Url(url) => !url.is_empty() && line.contains(&format!("({})", url)),
        EntryKey::LeadingToken(token) => line
            .strip_prefix(token.as_str())
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(ToString::to_string).collect()
    }

    fn whole(lines: &[String]) -> ManagedRange {
        ManagedRange {
            start: 0,
            end: lines.len(),
            anchor: None,
        }
    }

    #[test]
    fn header_strings_differ_only_by_level_and_variant() {
        let daily = SectionModel::daily_action("Vision Objective 1:");
        let weekly = SectionModel::weekly_cycle();
        assert_eq!(daily.header(SectionKind::InitiativeUpdates), Some("### Initiative Updates:"));
        assert_eq!(weekly.header(SectionKind::InitiativeUpdates), Some("##### Initiative Updates:"));
        assert_eq!(daily.header(SectionKind::CompletedTasks), Some("### Completed Tasks on Todoist:"));
        assert_eq!(weekly.header(SectionKind::CompletedTasks), Some("##### Completed Tasks:"));
        assert_eq!(weekly.header(SectionKind::AgentTasks), Some("##### Manus Tasks:"));
        assert!(weekly.header(SectionKind::CodeHostActivity).is_none());
        let error = weekly
            .require_header(SectionKind::CodeHostActivity)
            .expect_err("weekly has no code host section");
        assert!(error.to_string().contains("UNSUPPORTED_SECTION"));
    }

    #[test]
    fn classifies_both_clock_tag_formats() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        assert_eq!(model.classify("[09:15] Shipped"), LineKind::LogEntry);
        assert_eq!(model.classify("[09:15 AM] Shipped"), LineKind::LogEntry);
        assert_eq!(model.classify("[9:15] Shipped"), LineKind::Other);
        assert_eq!(model.classify("### Project Updates:"), LineKind::Header);
        assert_eq!(model.classify("#tag line"), LineKind::Other);
        assert_eq!(model.classify(" --- "), LineKind::Separator);
        assert_eq!(model.classify("Vision Objective 1:"), LineKind::TemplateBoundary);
        assert_eq!(model.classify("   "), LineKind::Blank);
        assert_eq!(log_entry_text("[10:30 PM]   Buy groceries"), Some("Buy groceries"));
    }

    #[test]
    fn log_tail_stops_at_blank_after_entries() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        let doc = lines("### Completed Tasks on Todoist:\n\n[09:00 AM] a\n[10:00] b\n\nfree text\n[11:00] c");
        assert_eq!(model.section_tail(&doc, SectionKind::CompletedTasks, 0, &whole(&doc)), 4);
    }

    #[test]
    fn log_tail_of_empty_section_is_after_header() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        let doc = lines("### Completed Tasks on Todoist:\n### Linear Issues Touched:");
        assert_eq!(model.section_tail(&doc, SectionKind::CompletedTasks, 0, &whole(&doc)), 1);
    }

    #[test]
    fn keyed_tail_spans_multi_line_blocks() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        let doc = lines(
            "### Project Updates:\n[09:00] - [A](u1):\n    - one\n        - two\n\n[10:00] - [B](u2): short\n\nVision Objective 1:",
        );
        assert_eq!(model.section_tail(&doc, SectionKind::ProjectUpdates, 0, &whole(&doc)), 6);
    }

    #[test]
    fn new_section_goes_before_first_later_header() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        let doc = lines(
            "### Initiative Updates:\n[09:00] - [A](u): x\n\n### Linear Issues Touched:\nGD-1 t (Todo)\n\nVision Objective 1:",
        );
        let range = ManagedRange {
            start: 0,
            end: 6,
            anchor: Some(6),
        };
        assert_eq!(model.insertion_point_for_new_section(&doc, SectionKind::ProjectUpdates, &range), 3);
        assert_eq!(model.insertion_point_for_new_section(&doc, SectionKind::AgentTasks, &range), 6);
    }

    #[test]
    fn new_section_without_anchor_follows_earlier_sections() {
        let model = SectionModel::daily_action("Vision Objective 1:");
        let doc = lines("intro\n### Initiative Updates:\n[09:00] - [A](u): x\n\ntrailing notes");
        let range = whole(&doc);
        assert_eq!(model.insertion_point_for_new_section(&doc, SectionKind::CompletedTasks, &range), 5);

        let empty = lines("intro");
        assert_eq!(
            model.insertion_point_for_new_section(&empty, SectionKind::CompletedTasks, &whole(&empty)),
            0
        );
    }

    #[test]
    fn leading_token_requires_whitespace_after_key() {
        let key = EntryKey::LeadingToken("GD-10".to_string());
        assert!(key_matches("GD-10 Project - Title (Todo)", &key));
        assert!(!key_matches("GD-100 Project - Title (Todo)", &key));
        assert!(!key_matches("  GD-10 indented", &key));
        assert!(!key_matches("anything", &EntryKey::Url(String::new())));
    }

    #[test]
    fn url_key_matches_only_the_whole_link_target() {
        let key = EntryKey::Url("https://x/task-1".to_string());
        assert!(key_matches("- Run ([task-1](https://x/task-1))", &key));
        assert!(key_matches("[08:00] - [Launch](https://x/task-1): On track.", &key));
        assert!(!key_matches("- Run ([task-10](https://x/task-10))", &key));
        assert!(!key_matches("see https://x/task-1 here", &key));
    }
}
