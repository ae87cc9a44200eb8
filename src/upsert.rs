use crate::errors::{AppError, AppResult};
use crate::formatter::render_log_entry;
use crate::models::{EntryKey, EntryStyle, Fact, KeyedEntry, SectionKind, UpsertAction};
use crate::sections::{key_matches, log_entry_text, normalize_entry_text, LineKind, ManagedRange, SectionModel};

pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(ToString::to_string).collect()
}

pub fn join_lines(lines: &[String]) -> String {
    lines.join("\n")
}

pub fn upsert_entry(
    lines: &mut Vec<String>,
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    fact: &Fact,
) -> AppResult<UpsertAction> {
    let header = model.require_header(section)?.to_string();
    let headers = model.find_headers(lines, range.start, range.end);
    let header_line = headers.get(&section).copied();

    let block = match (section.entry_style(), fact) {
        (EntryStyle::Keyed, Fact::Keyed(entry)) => {
            if let Some((start, end)) = find_keyed_block(lines, model, range, section, header_line, &entry.key) {
                return Ok(replace_block(lines, section, start, end, entry));
            }
            entry.lines.clone()
        }
        (EntryStyle::Log, Fact::Log(entry)) => {
            if let Some(header_line) = header_line {
                if section.dedups_log_entries() && has_log_entry(lines, model, range, section, header_line, &entry.text) {
                    return Ok(UpsertAction::Skipped);
                }
            }
            vec![render_log_entry(entry)]
        }
        (style, _) => {
            return Err(AppError::UnsupportedSection(format!(
                "{} holds {:?} entries and cannot take this fact",
                section.as_str(),
                style
            )))
        }
    };

    match header_line {
        Some(header_line) => insert_into_section(lines, model, range, section, header_line, block),
        None => insert_new_section(lines, model, range, section, header, block),
    }
    Ok(UpsertAction::Inserted)
}

pub fn remove_log_entry(
    lines: &mut Vec<String>,
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    text: &str,
) -> AppResult<bool> {
    model.require_header(section)?;
    if section.entry_style() != EntryStyle::Log {
        return Err(AppError::UnsupportedSection(format!(
            "{} does not hold log entries",
            section.as_str()
        )));
    }
    let Some(header_line) = model.find_headers(lines, range.start, range.end).get(&section).copied() else {
        return Ok(false);
    };

    let wanted = normalize_entry_text(text);
    let tail = model.section_tail(lines, section, header_line, range);
    let Some(found) = (header_line + 1..tail).find(|idx| {
        log_entry_text(&lines[*idx]).is_some_and(|existing| normalize_entry_text(existing) == wanted)
    }) else {
        return Ok(false);
    };
    lines.remove(found);

    let shrunk = ManagedRange {
        end: range.end.saturating_sub(1),
        ..*range
    };
    let tail = model.section_tail(lines, section, header_line, &shrunk);
    let remaining = (header_line + 1..tail).any(|idx| model.classify(&lines[idx]) == LineKind::LogEntry);
    if !remaining {
        let mut stop = header_line + 1;
        while stop < shrunk.end.min(lines.len()) && lines[stop].trim().is_empty() {
            stop += 1;
        }
        lines.drain(header_line..stop);
        tracing::debug!(section = section.as_str(), "removed emptied section header");
    }
    Ok(true)
}

fn find_keyed_block(
    lines: &[String],
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    header_line: Option<usize>,
    key: &EntryKey,
) -> Option<(usize, usize)> {
    let (from, to) = match key {
        EntryKey::Url(_) => (range.start, range.end.min(lines.len())),
        EntryKey::LeadingToken(_) => {
            let header_line = header_line?;
            (header_line + 1, model.section_tail(lines, section, header_line, range))
        }
    };
    let start = (from..to).find(|idx| {
        let line = &lines[*idx];
        !model.classify(line).is_boundary() && key_matches(line, key)
    })?;

    let mut end = start + 1;
    if section.multi_line_entries() {
        while end < to && model.classify(&lines[end]) == LineKind::Other {
            end += 1;
        }
    }
    Some((start, end))
}

fn replace_block(lines: &mut Vec<String>, section: SectionKind, start: usize, end: usize, entry: &KeyedEntry) -> UpsertAction {
    if !entry.changed {
        return UpsertAction::Skipped;
    }
    let count = entry.lines.len();
    lines.splice(start..end, entry.lines.iter().cloned());
    let after = start + count;
    if section.multi_line_entries() && lines.get(after).is_some_and(|line| !line.trim().is_empty()) {
        lines.insert(after, String::new());
    }
    UpsertAction::Updated
}

fn has_log_entry(
    lines: &[String],
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    header_line: usize,
    text: &str,
) -> bool {
    let wanted = normalize_entry_text(text);
    let tail = model.section_tail(lines, section, header_line, range);
    lines[header_line + 1..tail]
        .iter()
        .filter_map(|line| log_entry_text(line))
        .any(|existing| normalize_entry_text(existing) == wanted)
}

fn insert_into_section(
    lines: &mut Vec<String>,
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    header_line: usize,
    block: Vec<String>,
) {
    let tail = model.section_tail(lines, section, header_line, range);
    let mut fragment = Vec::with_capacity(block.len() + 2);
    if section.multi_line_entries() && tail > header_line + 1 && !lines[tail - 1].trim().is_empty() {
        fragment.push(String::new());
    }
    fragment.extend(block);
    if lines.get(tail).is_some_and(|line| !line.trim().is_empty()) {
        fragment.push(String::new());
    }
    lines.splice(tail..tail, fragment);
}

fn insert_new_section(
    lines: &mut Vec<String>,
    model: &SectionModel,
    range: &ManagedRange,
    section: SectionKind,
    header: String,
    block: Vec<String>,
) {
    let at = model.insertion_point_for_new_section(lines, section, range);
    let mut fragment = Vec::with_capacity(block.len() + 3);
    if at > 0 && !lines[at - 1].trim().is_empty() {
        fragment.push(String::new());
    }
    fragment.push(header);
    fragment.extend(block);
    if lines.get(at).is_some_and(|line| !line.trim().is_empty()) {
        fragment.push(String::new());
    }
    lines.splice(at..at, fragment);
}
