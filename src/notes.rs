use crate::config::{DeploymentZone, EngineConfig};
use crate::errors::{AppError, AppResult};
use crate::formatter::{render_agent_task, render_code_host_activity, render_issue_touched, render_progress_update, LinkStyle};
use crate::locator::{daily_action_range, day_subsection_range, DocumentLocator};
use crate::models::{
    AgentTask, ClockStyle, CodeHostActivity, EntryKey, Fact, IssueTouched, KeyedEntry, LogEntry, NoteVariant,
    NoteWriteReport, ProgressUpdate, SectionKind, UpsertAction, UpsertOutcome, WriteStatus,
};
use crate::period::{weekday_name, PeriodResolver};
use crate::sections::{ManagedRange, SectionModel};
use crate::store::DocumentStore;
use crate::upsert::{join_lines, remove_log_entry, split_lines, upsert_entry};
use chrono::{DateTime, FixedOffset, NaiveDate};

pub struct NoteEngine<S: DocumentStore> {
    store: S,
    config: EngineConfig,
    zone: DeploymentZone,
    resolver: PeriodResolver,
    daily_model: SectionModel,
    weekly_model: SectionModel,
}

impl<S: DocumentStore> NoteEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> AppResult<Self> {
        if config.rollover_hour >= 24 {
            return Err(AppError::Configuration(format!(
                "rollover_hour must be between 0 and 23 (got {})",
                config.rollover_hour
            )));
        }
        let zone = config.zone()?;
        Ok(Self {
            resolver: PeriodResolver::new(config.rollover_hour),
            daily_model: SectionModel::daily_action(config.template_boundary.as_str()),
            weekly_model: SectionModel::weekly_cycle(),
            store,
            config,
            zone,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn append_completed_task(&self, text: &str, at: DateTime<FixedOffset>) -> NoteWriteReport {
        let at = self.localize(at);
        let fact = Fact::Log(LogEntry {
            time: at.time(),
            style: ClockStyle::TwelveHour,
            text: text.trim().to_string(),
        });
        self.fan_out(at, SectionKind::CompletedTasks, &fact, &fact)
    }

    pub fn remove_completed_task(&self, text: &str, at: DateTime<FixedOffset>) -> AppResult<bool> {
        let at = self.localize(at);
        let day = self.resolver.effective_date(&at);
        let locator = DocumentLocator::new(&self.store, &self.config);
        let path = match locator.daily_action_path(day) {
            Ok(path) => path,
            Err(AppError::DocumentNotFound(_)) => return Ok(false),
            Err(error) => return Err(error),
        };
        let Some(original) = self.store.read(&path)? else {
            return Ok(false);
        };

        let mut lines = split_lines(&original);
        let range = self.managed_range(NoteVariant::DailyAction, &lines, day)?;
        let removed = remove_log_entry(&mut lines, &self.daily_model, &range, SectionKind::CompletedTasks, text)?;
        if removed {
            self.store.write(&path, &join_lines(&lines))?;
            tracing::info!(path = %path, "completed task removed");
        }
        Ok(removed)
    }

    pub fn upsert_progress_update(&self, update: &ProgressUpdate, at: DateTime<FixedOffset>) -> NoteWriteReport {
        let at = self.localize(at);
        let render = |style| {
            Fact::Keyed(KeyedEntry {
                key: EntryKey::Url(update.url.clone()),
                lines: render_progress_update(at.time(), &update.label, &update.url, &update.body, style),
                changed: true,
            })
        };
        self.fan_out(at, update.scope.section(), &render(LinkStyle::Markdown), &render(LinkStyle::WikiLink))
    }

    pub fn upsert_issue_touched(&self, issue: &IssueTouched, at: DateTime<FixedOffset>) -> NoteWriteReport {
        let at = self.localize(at);
        let fact = Fact::Keyed(KeyedEntry {
            key: EntryKey::LeadingToken(issue.identifier.trim().to_string()),
            lines: vec![render_issue_touched(issue, self.config.issue_link_rewrite.as_ref())],
            changed: issue.status_changed,
        });
        self.fan_out(at, SectionKind::IssuesTouched, &fact, &fact)
    }

    pub fn record_agent_task(&self, task: &AgentTask, at: DateTime<FixedOffset>) -> NoteWriteReport {
        let at = self.localize(at);
        let fact = Fact::Keyed(KeyedEntry {
            key: EntryKey::Url(task.url.clone()),
            lines: vec![render_agent_task(task)],
            changed: false,
        });
        self.fan_out(at, SectionKind::AgentTasks, &fact, &fact)
    }

    pub fn record_code_host_activity(&self, activity: &CodeHostActivity, at: DateTime<FixedOffset>) -> NoteWriteReport {
        let at = self.localize(at);
        let fact = Fact::Log(LogEntry {
            time: at.time(),
            style: ClockStyle::TwelveHour,
            text: render_code_host_activity(activity),
        });
        let section = SectionKind::CodeHostActivity;
        NoteWriteReport {
            daily: self.report(
                NoteVariant::DailyAction,
                section,
                self.upsert_daily_action(at, section, &fact),
            ),
            weekly: WriteStatus::NotApplicable,
        }
    }

    pub fn upsert_daily_action(
        &self,
        at: DateTime<FixedOffset>,
        section: SectionKind,
        fact: &Fact,
    ) -> AppResult<UpsertOutcome> {
        self.upsert_note(NoteVariant::DailyAction, self.localize(at), section, fact)
    }

    pub fn upsert_weekly_cycle(
        &self,
        at: DateTime<FixedOffset>,
        section: SectionKind,
        fact: &Fact,
    ) -> AppResult<UpsertOutcome> {
        self.upsert_note(NoteVariant::WeeklyCycle, self.localize(at), section, fact)
    }

    fn localize(&self, at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        self.zone.localize(at)
    }

    fn model(&self, variant: NoteVariant) -> &SectionModel {
        match variant {
            NoteVariant::DailyAction => &self.daily_model,
            NoteVariant::WeeklyCycle => &self.weekly_model,
        }
    }

    fn managed_range(&self, variant: NoteVariant, lines: &[String], day: NaiveDate) -> AppResult<ManagedRange> {
        match variant {
            NoteVariant::DailyAction => Ok(daily_action_range(
                lines,
                &self.config.daily_review_marker,
                &self.config.template_boundary,
            )),
            NoteVariant::WeeklyCycle => day_subsection_range(lines, &weekday_name(day)),
        }
    }

    fn upsert_note(
        &self,
        variant: NoteVariant,
        at: DateTime<FixedOffset>,
        section: SectionKind,
        fact: &Fact,
    ) -> AppResult<UpsertOutcome> {
        let model = self.model(variant);
        model.require_header(section)?;

        let day = self.resolver.effective_date(&at);
        let locator = DocumentLocator::new(&self.store, &self.config);
        let path = match variant {
            NoteVariant::DailyAction => locator.daily_action_path(day)?,
            NoteVariant::WeeklyCycle => locator.weekly_cycle_path(&self.resolver.cycle_bounds(&at, 0))?,
        };
        let original = self.store.read_required(&path)?;

        let mut lines = split_lines(&original);
        let range = self.managed_range(variant, &lines, day)?;
        let mut action = upsert_entry(&mut lines, model, &range, section, fact)?;
        let updated = join_lines(&lines);
        if action == UpsertAction::Updated && updated == original {
            action = UpsertAction::Skipped;
        }

        if action == UpsertAction::Skipped {
            tracing::debug!(path = %path, section = section.as_str(), "entry unchanged, write skipped");
        } else {
            self.store.write(&path, &updated)?;
            tracing::info!(
                path = %path,
                variant = variant.as_str(),
                section = section.as_str(),
                action = action.as_str(),
                "note entry written"
            );
        }

        Ok(UpsertOutcome {
            action,
            variant,
            section,
            path,
        })
    }

    fn fan_out(&self, at: DateTime<FixedOffset>, section: SectionKind, daily: &Fact, weekly: &Fact) -> NoteWriteReport {
        NoteWriteReport {
            daily: self.report(
                NoteVariant::DailyAction,
                section,
                self.upsert_note(NoteVariant::DailyAction, at, section, daily),
            ),
            weekly: self.report(
                NoteVariant::WeeklyCycle,
                section,
                self.upsert_note(NoteVariant::WeeklyCycle, at, section, weekly),
            ),
        }
    }

    fn report(&self, variant: NoteVariant, section: SectionKind, result: AppResult<UpsertOutcome>) -> WriteStatus {
        match result {
            Ok(outcome) => WriteStatus::Written(outcome),
            Err(error) => {
                tracing::warn!(
                    variant = variant.as_str(),
                    section = section.as_str(),
                    error = %error,
                    "note write failed"
                );
                WriteStatus::Failed(error.to_string())
            }
        }
    }
}
