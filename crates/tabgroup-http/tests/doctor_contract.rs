#[test]
fn tabgroup_doctor_contract_json_and_bool_flags() {
    let bin = assert_cmd::cargo::cargo_bin!("tabgroup");

    let out = std::process::Command::new(bin)
        .args(["doctor"])
        // Ensure we don't accidentally inherit keys from the environment.
        .env_remove("TABGROUP_GEMINI_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .env_remove("GOOGLE_API_KEY")
        .env_remove("TABGROUP_GEMINI_BASE_URL")
        .env_remove("TABGROUP_GEMINI_MODEL")
        .env_remove("TABGROUP_BIND")
        .output()
        .expect("run tabgroup doctor");

    assert!(out.status.success(), "tabgroup doctor failed");
    let s = String::from_utf8_lossy(&out.stdout);
    let v: serde_json::Value = serde_json::from_str(&s).expect("parse doctor json");

    assert_eq!(v["schema_version"].as_u64(), Some(1));
    assert_eq!(v["name"].as_str(), Some("tabgroup"));
    assert!(!v["version"].as_str().unwrap_or("").is_empty());

    // Config surface should be booleans-only for secrets.
    assert_eq!(v["configured"]["gemini_api_key"].as_bool(), Some(false));
    assert_eq!(v["configured"]["base_url_override"].as_bool(), Some(false));
    assert_eq!(v["model"].as_str(), Some("gemini-2.0-flash"));
    assert_eq!(v["bind"].as_str(), Some("127.0.0.1:8787"));

    let checks = v["checks"].as_array().expect("checks array");
    let key_check = checks
        .iter()
        .find(|c| c["name"].as_str() == Some("gemini_api_key"))
        .expect("gemini_api_key check");
    assert_eq!(key_check["ok"].as_bool(), Some(false));
    assert!(!key_check["hint"].as_str().unwrap_or("").is_empty());
}

#[test]
fn tabgroup_doctor_never_prints_the_key_value() {
    use predicates::prelude::*;

    let bin = assert_cmd::cargo::cargo_bin!("tabgroup");
    assert_cmd::Command::new(bin)
        .args(["doctor", "--output", "text"])
        .env("TABGROUP_GEMINI_API_KEY", "sekrit-value-123")
        .assert()
        .success()
        .stdout(predicate::str::contains("gemini_api_key: ok"))
        .stdout(predicate::str::contains("sekrit-value-123").not());
}
