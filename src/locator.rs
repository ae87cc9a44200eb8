use crate::config::EngineConfig;
use crate::errors::{AppError, AppResult};
use crate::models::CycleBounds;
use crate::sections::{ManagedRange, SEPARATOR};
use crate::store::{join_path, DocumentStore};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_HEADER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^### (Wednesday|Thursday|Friday|Saturday|Sunday|Monday|Tuesday) -").expect("valid regex")
});

pub struct DocumentLocator<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    config: &'a EngineConfig,
}

impl<'a, S: DocumentStore + ?Sized> DocumentLocator<'a, S> {
    pub fn new(store: &'a S, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn daily_action_folder(&self) -> AppResult<String> {
        let daily = self.find_folder("", &self.config.daily_folder_suffix)?;
        self.find_folder(&daily, &self.config.daily_action_folder_suffix)
    }

    pub fn daily_action_path(&self, day: NaiveDate) -> AppResult<String> {
        let folder = self.daily_action_folder()?;
        Ok(join_path(&folder, &daily_file_name(&self.config.daily_file_prefix, day)))
    }

    pub fn weekly_cycles_folder(&self) -> AppResult<String> {
        let cycles = self.find_folder("", &self.config.cycles_folder_suffix)?;
        let weekly = join_path(&cycles, &self.config.weekly_cycles_folder);
        if !self.store.exists(&weekly)? {
            return Err(AppError::DocumentNotFound(format!(
                "'{}' subfolder not found in {}",
                self.config.weekly_cycles_folder, cycles
            )));
        }
        Ok(weekly)
    }

    pub fn weekly_cycle_path(&self, bounds: &CycleBounds) -> AppResult<String> {
        let folder = self.weekly_cycles_folder()?;
        let date_range = cycle_date_range(bounds);
        self.store
            .list(&folder)?
            .into_iter()
            .find(|entry| !entry.is_dir && entry.name.contains(&date_range))
            .map(|entry| entry.path)
            .ok_or_else(|| {
                AppError::DocumentNotFound(format!("Could not find weekly cycle file for date range: {}", date_range))
            })
    }

    fn find_folder(&self, parent: &str, suffix: &str) -> AppResult<String> {
        self.store
            .list(parent)?
            .into_iter()
            .find(|entry| entry.is_dir && entry.name.ends_with(suffix))
            .map(|entry| entry.path)
            .ok_or_else(|| {
                let parent = if parent.is_empty() { "vault root" } else { parent };
                AppError::DocumentNotFound(format!("Could not find folder ending with '{}' in {}", suffix, parent))
            })
    }
}

pub fn daily_file_name(prefix: &str, day: NaiveDate) -> String {
    format!("{}{}.md", prefix, day.format("%Y-%m-%d"))
}

pub fn cycle_date_range(bounds: &CycleBounds) -> String {
    format!(
        "({} - {})",
        bounds.start.format("%b. %d"),
        bounds.end.format("%b. %d, %Y")
    )
}

pub fn front_matter_end(lines: &[String]) -> usize {
    if lines.first().map(String::as_str) != Some(SEPARATOR) {
        return 0;
    }
    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == SEPARATOR)
        .map(|(idx, _)| idx + 1)
        .unwrap_or(0)
}

pub fn daily_action_range(lines: &[String], review_marker: &str, template_boundary: &str) -> ManagedRange {
    let body_start = front_matter_end(lines);
    let template_boundary = template_boundary.trim();
    let boundary = lines
        .iter()
        .enumerate()
        .skip(body_start)
        .find(|(_, line)| !template_boundary.is_empty() && line.trim() == template_boundary)
        .map(|(idx, _)| idx);
    let end = boundary.unwrap_or(lines.len());

    // The review block must sit above the template boundary.
    let review_end = lines[..end]
        .iter()
        .enumerate()
        .skip(body_start)
        .find(|(_, line)| !review_marker.is_empty() && line.contains(review_marker))
        .and_then(|(marker, _)| {
            lines[..end]
                .iter()
                .enumerate()
                .skip(marker + 1)
                .find(|(_, line)| line.trim() == SEPARATOR)
                .map(|(idx, _)| idx + 1)
        });

    ManagedRange {
        start: review_end.unwrap_or(body_start),
        end,
        anchor: boundary,
    }
}

pub fn day_subsection_range(lines: &[String], weekday: &str) -> AppResult<ManagedRange> {
    let header = format!("### {} -", weekday);
    let Some(open) = lines.iter().position(|line| line.trim().starts_with(&header)) else {
        return Err(AppError::SectionBoundaryNotFound(format!(
            "Could not find day section '{}' in weekly cycle file",
            header
        )));
    };

    let mut end = lines.len();
    let mut closed = false;
    for (idx, line) in lines.iter().enumerate().skip(open + 1) {
        let trimmed = line.trim();
        if trimmed == SEPARATOR {
            end = idx;
            closed = true;
            break;
        }
        if DAY_HEADER_PATTERN.is_match(trimmed) {
            end = idx;
            break;
        }
    }

    let anchor = if closed {
        end
    } else {
        let mut anchor = end;
        while anchor > open + 1 && lines[anchor - 1].trim().is_empty() {
            anchor -= 1;
        }
        anchor
    };

    Ok(ManagedRange {
        start: open + 1,
        end,
        anchor: Some(anchor),
    })
}
