use chrono::{DateTime, FixedOffset, NaiveTime};
use periodic_notes::models::{
    ClockStyle, EntryKey, Fact, IssueTouched, KeyedEntry, LogEntry, SectionKind, UpsertAction, WriteStatus,
};
use periodic_notes::{DocumentStore, EngineConfig, NoteEngine, VaultStore};
use std::fs;
use std::path::Path;

const DAILY_PATH: &str = "2_Daily/1_Daily-Action/DA 2026-01-08.md";
const WEEKLY_PATH: &str = "3_Cycles/_Weekly-Cycles/Cycle 2 (Jan. 07 - Jan. 13, 2026).md";

const DAILY_BODY: &str = "---\ndate: 2026-01-08\ntags: [daily]\n---\n## Daily Review:\n- Energy: 7\n- Focus: shipping\n---\n\nVision Objective 1:\n- Ship the notes engine\n\nVision Objective 2:\n- Rest\n";

fn weekly_body(days: &[&str]) -> String {
    let mut text = String::from("---\ncycle: 2\n---\n# Cycle 2\n\n");
    for day in days {
        text.push_str(&format!("### {} - notes\n\n---\n", day));
    }
    text
}

fn setup_vault(root: &Path, weekly: &str) {
    let daily = root.join(DAILY_PATH);
    let cycle = root.join(WEEKLY_PATH);
    fs::create_dir_all(daily.parent().expect("daily parent")).expect("create daily folder");
    fs::create_dir_all(cycle.parent().expect("weekly parent")).expect("create weekly folder");
    fs::write(&daily, DAILY_BODY).expect("write daily");
    fs::write(&cycle, weekly).expect("write weekly");
}

fn engine(root: &Path) -> NoteEngine<VaultStore> {
    let config = EngineConfig {
        vault_root: Some(root.to_path_buf()),
        time_zone: "-08:00".to_string(),
        ..EngineConfig::default()
    };
    NoteEngine::new(VaultStore::new(root), config).expect("engine")
}

fn at(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).expect("valid timestamp")
}

fn issue(status: &str, status_changed: bool) -> IssueTouched {
    IssueTouched {
        identifier: "GD-100".to_string(),
        project: Some("Growth".to_string()),
        title: "Onboarding emails".to_string(),
        status: status.to_string(),
        url: "https://linear.app/acme/issue/GD-100".to_string(),
        status_changed,
    }
}

#[test]
fn first_completed_task_in_empty_daily_body() {
    let root = tempfile::tempdir().expect("temp vault");
    setup_vault(root.path(), &weekly_body(&["Wednesday", "Thursday"]));
    let engine = engine(root.path());

    let report = engine.append_completed_task("Send invoice", at("2026-01-08T16:20:00-08:00"));
    assert_eq!(report.daily.action(), Some(UpsertAction::Inserted));

    let daily = fs::read_to_string(root.path().join(DAILY_PATH)).expect("read daily");
    let expected = DAILY_BODY.replace(
        "---\n\nVision Objective 1:",
        "---\n\n### Completed Tasks on Todoist:\n[04:20 PM] Send invoice\n\nVision Objective 1:",
    );
    assert_eq!(daily, expected);
}

#[test]
fn issue_status_change_keeps_one_line_in_place() {
    let root = tempfile::tempdir().expect("temp vault");
    setup_vault(root.path(), &weekly_body(&["Wednesday", "Thursday", "Friday"]));
    let engine = engine(root.path());
    let when = at("2026-01-08T09:00:00-08:00");

    engine.append_completed_task("Warm up", when);
    engine.upsert_issue_touched(&issue("Todo", false), when);
    let before = fs::read_to_string(root.path().join(WEEKLY_PATH)).expect("read weekly");
    let line_before = before.lines().position(|line| line.starts_with("GD-100 ")).expect("issue line");

    let report = engine.upsert_issue_touched(&issue("Done", true), at("2026-01-08T15:00:00-08:00"));
    assert_eq!(report.weekly.action(), Some(UpsertAction::Updated));

    let after = fs::read_to_string(root.path().join(WEEKLY_PATH)).expect("read weekly");
    let matching: Vec<(usize, &str)> = after
        .lines()
        .enumerate()
        .filter(|(_, line)| line.starts_with("GD-100 "))
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].0, line_before);
    assert_eq!(
        matching[0].1,
        "GD-100 Growth - Onboarding emails (Done) ([link](linear://acme/issue/GD-100))"
    );
    assert_eq!(before.lines().count(), after.lines().count());
}

#[test]
fn missing_day_subsection_fails_without_writing() {
    let root = tempfile::tempdir().expect("temp vault");
    let weekly = weekly_body(&["Wednesday", "Thursday", "Friday", "Sunday", "Monday", "Tuesday"]);
    setup_vault(root.path(), &weekly);
    let engine = engine(root.path());

    let fact = Fact::Log(LogEntry {
        time: NaiveTime::from_hms_opt(10, 0, 0).expect("valid time"),
        style: ClockStyle::TwelveHour,
        text: "Weekend chore".to_string(),
    });
    let error = engine
        .upsert_weekly_cycle(at("2026-01-10T10:00:00-08:00"), SectionKind::CompletedTasks, &fact)
        .expect_err("saturday is missing");
    assert!(error.to_string().starts_with("SECTION_BOUNDARY_NOT_FOUND"));
    assert_eq!(fs::read_to_string(root.path().join(WEEKLY_PATH)).expect("read weekly"), weekly);

    let report = engine.append_completed_task("Weekend chore", at("2026-01-10T10:00:00-08:00"));
    assert!(matches!(report.weekly, WriteStatus::Failed(_)));
    assert!(matches!(report.daily, WriteStatus::Failed(_)));
}

#[test]
fn managed_writes_never_touch_review_or_template() {
    let root = tempfile::tempdir().expect("temp vault");
    setup_vault(root.path(), &weekly_body(&["Wednesday", "Thursday"]));
    let engine = engine(root.path());
    let when = at("2026-01-08T11:30:00-08:00");

    engine.append_completed_task("One", when);
    engine.upsert_issue_touched(&issue("In Progress", false), when);
    engine
        .upsert_daily_action(
            when,
            SectionKind::InitiativeUpdates,
            &Fact::Keyed(KeyedEntry {
                key: EntryKey::Url("https://tracker.example/i/1".to_string()),
                lines: vec![
                    "[11:30] - [North Star](https://tracker.example/i/1):".to_string(),
                    "    - hiring plan drafted".to_string(),
                ],
                changed: true,
            }),
        )
        .expect("initiative update");

    let daily = VaultStore::new(root.path()).read_required(DAILY_PATH).expect("daily");
    let head = "---\ndate: 2026-01-08\ntags: [daily]\n---\n## Daily Review:\n- Energy: 7\n- Focus: shipping\n---\n";
    let tail = "Vision Objective 1:\n- Ship the notes engine\n\nVision Objective 2:\n- Rest\n";
    assert!(daily.starts_with(head));
    assert!(daily.ends_with(tail));

    let initiative = daily.find("### Initiative Updates:").expect("initiative");
    let completed = daily.find("### Completed Tasks on Todoist:").expect("completed");
    let issues = daily.find("### Linear Issues Touched:").expect("issues");
    assert!(initiative < completed && completed < issues);
}

#[test]
fn unchanged_keyed_entry_is_byte_identical() {
    let root = tempfile::tempdir().expect("temp vault");
    setup_vault(root.path(), &weekly_body(&["Wednesday", "Thursday"]));
    let engine = engine(root.path());
    let when = at("2026-01-08T09:00:00-08:00");

    engine.upsert_issue_touched(&issue("Todo", false), when);
    let daily = fs::read_to_string(root.path().join(DAILY_PATH)).expect("read daily");
    let weekly = fs::read_to_string(root.path().join(WEEKLY_PATH)).expect("read weekly");

    let report = engine.upsert_issue_touched(&issue("Todo", false), when);
    assert_eq!(report.daily.action(), Some(UpsertAction::Skipped));
    assert_eq!(report.weekly.action(), Some(UpsertAction::Skipped));
    assert_eq!(fs::read_to_string(root.path().join(DAILY_PATH)).expect("read daily"), daily);
    assert_eq!(fs::read_to_string(root.path().join(WEEKLY_PATH)).expect("read weekly"), weekly);
}
