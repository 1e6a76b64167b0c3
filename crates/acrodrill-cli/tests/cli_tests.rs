//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

fn acrodrill() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("acrodrill").unwrap()
}

fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(name)
}

/// A temp directory holding a config that points at the sample data and
/// keeps progress and reports inside the directory.
fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config = format!(
        "catalogue = {:?}\nquestion_bank = {:?}\nstore_dir = {:?}\noutput_dir = {:?}\nseed = 7\n",
        data_file("catalogue.toml"),
        data_file("question_bank.json"),
        dir.path().join("store"),
        dir.path().join("results"),
    );
    let path = dir.path().join("acrodrill.toml");
    std::fs::write(&path, config).unwrap();
    (dir, path)
}

/// Build an answer sheet with the key for every question on a paper.
fn answer_key(paper: &Path) -> Value {
    let content = std::fs::read_to_string(paper).unwrap();
    let paper: Value = serde_json::from_str(&content).unwrap();
    let mut answers = Map::new();
    for q in paper["questions"].as_array().unwrap() {
        let answer = match q["type"].as_str().unwrap() {
            "mcq" => q["correct_answer"].clone(),
            "msq" => q["correct_answers"].clone(),
            "pbq_order" => q["correct_order"].clone(),
            "pbq_drag" => q["correct_mapping"].clone(),
            other => panic!("unexpected question type {other}"),
        };
        answers.insert(q["id"].as_str().unwrap().to_string(), answer);
    }
    Value::Object(answers)
}

fn write_paper(dir: &TempDir, config: &Path) -> PathBuf {
    let paper = dir.path().join("paper.json");
    acrodrill()
        .arg("--config")
        .arg(config)
        .arg("exam")
        .arg("--preset")
        .arg("quick")
        .arg("--output")
        .arg(&paper)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam paper (quick)"))
        .stdout(predicate::str::contains("Paper saved to"));
    paper
}

#[test]
fn validate_sample_data() {
    acrodrill()
        .arg("validate")
        .arg("--catalogue")
        .arg(data_file("catalogue.toml"))
        .arg("--bank")
        .arg(data_file("question_bank.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("40 items"))
        .stdout(predicate::str::contains("SY0-701 (30 questions)"))
        .stdout(predicate::str::contains("All data valid"));
}

#[test]
fn validate_reports_bad_links() {
    let dir = TempDir::new().unwrap();
    let catalogue = dir.path().join("bad.toml");
    std::fs::write(
        &catalogue,
        r#"
[[items]]
id = "AES"
full_name = "Advanced Encryption Standard"
domain = 1
category = "crypto"
difficulty = 1
confused_with = ["DES"]
"#,
    )
    .unwrap();

    acrodrill()
        .arg("validate")
        .arg("--catalogue")
        .arg(&catalogue)
        .arg("--bank")
        .arg(data_file("question_bank.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[AES] WARNING"))
        .stdout(predicate::str::contains("unknown item: DES"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    acrodrill()
        .arg("validate")
        .arg("--catalogue")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    acrodrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created acrodrill.toml"))
        .stdout(predicate::str::contains("Created data/catalogue.toml"))
        .stdout(predicate::str::contains("Created data/question_bank.json"));

    assert!(dir.path().join("acrodrill.toml").exists());
    assert!(dir.path().join("data/catalogue.toml").exists());

    // The scaffolded setup validates as-is.
    acrodrill()
        .current_dir(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("All data valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    acrodrill().current_dir(dir.path()).arg("init").assert().success();

    acrodrill()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn train_plan_only() {
    let (_dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("train")
        .arg("--mode")
        .arg("random")
        .arg("--count")
        .arg("5")
        .arg("--plan-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Training deck (random, 5 cards) for local"));
}

#[test]
fn train_records_swipes() {
    let (dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("train")
        .arg("--count")
        .arg("3")
        .arg("--user")
        .arg("sam")
        .write_stdin("r\nsideways\nl\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown swipe direction"))
        .stdout(predicate::str::contains("Training stopped: 1 confident, 1 practice (of 3)"));

    let progress: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("store/sam/progress.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(progress.as_object().unwrap().len(), 2);
}

#[test]
fn train_rejects_unknown_mode() {
    let (_dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("train")
        .arg("--mode")
        .arg("sideways")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown training mode"));
}

#[test]
fn drill_answers_from_stdin() {
    let (dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("drill")
        .arg("--count")
        .arg("2")
        .arg("--domain")
        .arg("4")
        .write_stdin("1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Drill (normal, 2 questions) for local"))
        .stdout(predicate::str::contains("Score:"))
        .stdout(predicate::str::contains("D4 Operations"));

    assert!(dir.path().join("store/local/progress.json").exists());
}

#[test]
fn drill_stops_at_end_of_input() {
    let (_dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("drill")
        .arg("--mode")
        .arg("hard")
        .arg("--count")
        .arg("5")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 0.0% (0/5 correct, 0 wrong"));
}

#[test]
fn drill_rejects_bad_domain() {
    let (_dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("drill")
        .arg("--domain")
        .arg("9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("domain must be between 1 and 5"));
}

#[test]
fn exam_and_grade_perfect_paper() {
    let (dir, config) = workspace();
    let paper = write_paper(&dir, &config);

    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, answer_key(&paper).to_string()).unwrap();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("grade")
        .arg("--paper")
        .arg(&paper)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 100.0%"))
        .stdout(predicate::str::contains("to spare"))
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = std::fs::read_dir(dir.path().join("results"))
        .unwrap()
        .collect();
    assert_eq!(reports.len(), 1);

    let history: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("store/local/history.json")).unwrap(),
    )
    .unwrap();
    assert!(!history.as_object().unwrap().is_empty());

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mastery for local"))
        .stdout(predicate::str::contains("Exams: 1 attempts, 1 passed"));
}

#[test]
fn grade_empty_sheet_with_summary() {
    let (dir, config) = workspace();
    let paper = write_paper(&dir, &config);

    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, "{}").unwrap();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("grade")
        .arg("--paper")
        .arg(&paper)
        .arg("--answers")
        .arg(&answers)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("Unanswered:"))
        .stdout(predicate::str::contains("## D"));
}

#[test]
fn grade_warns_about_retired_questions() {
    let (dir, config) = workspace();
    let paper = write_paper(&dir, &config);

    let content = std::fs::read_to_string(&paper).unwrap();
    let mut doc: Value = serde_json::from_str(&content).unwrap();
    doc["questions"][0]["id"] = json!("retired-q");
    std::fs::write(&paper, doc.to_string()).unwrap();

    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, r#"{"retired-q": "a"}"#).unwrap();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("grade")
        .arg("--paper")
        .arg(&paper)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "1 paper question(s) are no longer in the question bank",
        ))
        .stdout(predicate::str::contains("Answered 1 of"));
}

#[test]
fn stats_without_reports() {
    let (_dir, config) = workspace();

    acrodrill()
        .arg("--config")
        .arg(&config)
        .arg("stats")
        .arg("--user")
        .arg("newcomer")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mastery for newcomer"))
        .stdout(predicate::str::contains("No exam reports"));
}

fn make_test_report(percentages: &[(u8, f64)]) -> String {
    let mut breakdown = Map::new();
    let mut earned = 0.0;
    for &(domain, pct) in percentages {
        breakdown.insert(
            domain.to_string(),
            json!({ "earned": pct / 10.0, "possible": 10.0, "percentage": pct }),
        );
        earned += pct / 10.0;
    }
    let possible = 10.0 * percentages.len() as f64;
    let percentage = earned / possible * 100.0;
    json!({
        "id": "00000000-0000-0000-0000-000000000000",
        "preset": "quick",
        "total_questions": 45,
        "time_limit_minutes": 45,
        "started_at": "2026-01-01T00:00:00Z",
        "completed_at": "2026-01-01T00:30:00Z",
        "time_used_seconds": 1800,
        "results": {
            "total_points_earned": earned,
            "total_points_possible": possible,
            "percentage": percentage,
            "passed": percentage >= 83.3,
            "domain_breakdown": breakdown
        },
        "answers": []
    })
    .to_string()
}

#[test]
fn compare_reports() {
    let dir = TempDir::new().unwrap();

    let baseline_path = dir.path().join("baseline.json");
    let current_path = dir.path().join("current.json");
    std::fs::write(&baseline_path, make_test_report(&[(1, 90.0), (2, 60.0)])).unwrap();
    std::fs::write(&current_path, make_test_report(&[(1, 70.0), (2, 62.0)])).unwrap();

    acrodrill()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 regressions"))
        .stdout(predicate::str::contains("D1 General 90.0% -> 70.0%"));

    acrodrill()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline_path)
        .arg("--current")
        .arg(&current_path)
        .arg("--format")
        .arg("markdown")
        .arg("--fail-on-regression")
        .assert()
        .failure()
        .stdout(predicate::str::contains("### Regressions"));
}

#[test]
fn compare_nonexistent_report() {
    acrodrill()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    acrodrill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adaptive acronym and exam-question drills"));
}

#[test]
fn version_output() {
    acrodrill()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("acrodrill"));
}
