#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn survey(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("survey").unwrap();
    cmd.current_dir(dir.path())
        .env("SURVEY_ROOT", dir.path())
        .env_remove("SURVEY_SHEETS_TOKEN");
    cmd
}

const CATALOG: &str = "\
ZONE,REGION,DIVISION
Accra,Tema,Community 1
Accra,Tema,Community 2
Accra,Madina,Adenta
Kumasi,Suame,Magazine
";

const CSV_CONFIG: &str = "\
store:
  backend: csv
";

/// A complete three-page form.
fn form_yaml(head_teacher: &str) -> String {
    let levels = [
        "Creche/Nursery", "K.G 1", "K.G 2", "Class 1", "Class 2", "Class 3", "Class 4",
        "Class 5", "Class 6", "JHS 1", "JHS 2", "JHS 3",
    ];
    let mut yaml = format!(
        "school_info:
  zone: Accra
  region: Tema
  division: Community 1
  school_name: deeper life basic
  head_teacher: {head_teacher}
  phone: \"0551234567\"
  whatsapp: \"0241234567\"
financial_data:
  admission_fees: 50
  canteen_fees: 5
  stationary_fees: 20
  head_salary: 2500
  lowest_teacher_salary: 900
  highest_teacher_salary: 1500
teaching_staff:
  count: 7
non_teaching_staff:
  count: 2
committee:
  count: 4
class_data:
"
    );
    for level in levels {
        yaml.push_str(&format!(
            "  \"{level}\":\n    males: 3\n    females: 4\n    tuition: 150\n"
        ));
    }
    yaml
}

fn project(dir: &TempDir) {
    survey(dir).arg("init").assert().success();
    std::fs::write(dir.path().join(".survey/config.yaml"), CSV_CONFIG).unwrap();
    std::fs::write(dir.path().join("zone - Original.csv"), CATALOG).unwrap();
}

// ---------------------------------------------------------------------------
// survey init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_example() {
    let dir = TempDir::new().unwrap();
    survey(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .survey/config.yaml"))
        .stdout(predicate::str::contains("Location catalog not found"));

    assert!(dir.path().join(".survey/config.yaml").exists());
    let example =
        std::fs::read_to_string(dir.path().join(".survey/form.example.yaml")).unwrap();
    assert!(example.contains("school_info"));
    assert!(example.contains("JHS 3"));
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    survey(&dir).arg("init").assert().success();
    survey(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .survey/config.yaml"));
}

// ---------------------------------------------------------------------------
// survey catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_lists_regions_for_zone() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    survey(&dir)
        .args(["catalog", "regions", "--zone", "Accra"])
        .assert()
        .success()
        .stdout("Tema\nMadina\n");
}

#[test]
fn catalog_json_output() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    let out = survey(&dir)
        .args(["--json", "catalog", "divisions", "--region", "Tema"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(
        json["options"],
        serde_json::json!(["Community 1", "Community 2"])
    );
    assert!(json["error"].is_null());
}

#[test]
fn missing_catalog_degrades_with_warning() {
    let dir = TempDir::new().unwrap();
    survey(&dir).arg("init").assert().success();
    survey(&dir)
        .args(["catalog", "zones"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("was not found"));
}

// ---------------------------------------------------------------------------
// survey validate-phone
// ---------------------------------------------------------------------------

#[test]
fn validate_phone_accepts_ten_digits() {
    let dir = TempDir::new().unwrap();
    survey(&dir)
        .args(["validate-phone", "0551234567"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_phone_rejects_nine_digits() {
    let dir = TempDir::new().unwrap();
    survey(&dir)
        .args(["validate-phone", "055123456"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must be 10 digits"));
}

// ---------------------------------------------------------------------------
// survey check
// ---------------------------------------------------------------------------

#[test]
fn check_csv_store_is_active() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    survey(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Network Active!"));
}

#[test]
fn check_http_store_without_token_fails() {
    let dir = TempDir::new().unwrap();
    survey(&dir).arg("init").assert().success();
    survey(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SURVEY_SHEETS_TOKEN"));
}

// ---------------------------------------------------------------------------
// survey flatten / submit
// ---------------------------------------------------------------------------

#[test]
fn flatten_prints_columns_in_order() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    std::fs::write(dir.path().join("form.yaml"), form_yaml("kwame asante")).unwrap();

    let out = survey(&dir)
        .args(["--json", "flatten", "form.yaml"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let columns = json["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 53);
    assert_eq!(columns[0]["column"], "Timestamp");
    assert_eq!(columns[5]["value"], "Kwame Asante");
    assert_eq!(columns[52]["column"], "Committee Member Count");
}

#[test]
fn flatten_two_page_variant_override() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    std::fs::write(dir.path().join("form.yaml"), form_yaml("kwame asante")).unwrap();

    survey(&dir)
        .args(["flatten", "form.yaml", "--variant", "two-page"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Highest Teacher Salary"))
        .stdout(predicate::str::contains("Teaching Staff Count").not());
}

#[test]
fn submit_writes_header_then_rows() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    std::fs::write(dir.path().join("first.yaml"), form_yaml("kwame asante")).unwrap();
    std::fs::write(dir.path().join("second.yaml"), form_yaml("ama mensah")).unwrap();

    survey(&dir)
        .args(["submit", "first.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote header row (53 columns)"));
    survey(&dir)
        .args(["submit", "second.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote header row").not());

    let csv = std::fs::read_to_string(dir.path().join(".survey/submissions.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Timestamp,Zone,Region,Division"));
    assert!(lines[1].contains("Kwame Asante"));
    assert!(lines[2].contains("Ama Mensah"));
}

#[test]
fn submit_rejects_duplicate_school() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    std::fs::write(dir.path().join("form.yaml"), form_yaml("kwame asante")).unwrap();

    survey(&dir).args(["submit", "form.yaml"]).assert().success();
    survey(&dir)
        .args(["submit", "form.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already been submitted"));
}

#[test]
fn submit_reports_every_blank_fee() {
    let dir = TempDir::new().unwrap();
    project(&dir);
    let yaml = form_yaml("kwame asante")
        .replace("admission_fees: 50", "admission_fees: 0")
        .replace("canteen_fees: 5", "canteen_fees: 0");
    std::fs::write(dir.path().join("form.yaml"), yaml).unwrap();

    survey(&dir)
        .args(["submit", "form.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Admission Fees is required"))
        .stderr(predicate::str::contains("Canteen Fees is required"))
        .stderr(predicate::str::contains("2 problem(s) found"));
    assert!(!dir.path().join(".survey/submissions.csv").exists());
}
