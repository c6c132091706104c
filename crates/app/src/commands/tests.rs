use super::*;
use stdsync_model::{Standard, StandardId, Tool};
use stdsync_sync::{ApplyOptions, ExtractOptions, PickError, Selector};
use stdsync_test_utils::{
    mixed_remote, Call, FakeRemote, TestFixture, ACME_BASELINE_CONFIG, MIXED_CONFIG,
};

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

fn apply_request(fixture: &TestFixture, config: &str, options: ApplyOptions) -> ApplyRequest {
    ApplyRequest {
        name: "baseline".into(),
        config: fixture.write("config.json", config).unwrap(),
        output: Some(fixture.path("result.json")),
        promote: true,
        options,
    }
}

fn active(id: i64, name: &str, languages: &[&str]) -> Standard {
    let mut standard = Standard::draft(id, name);
    standard.is_draft = false;
    standard.languages = languages.iter().map(|l| l.to_string()).collect();
    standard
}

#[test]
fn describe_standard_lists_languages() {
    let mut standard = active(4, "baseline", &["python", "go"]);
    assert_eq!(
        describe_standard(&standard),
        "baseline (id 4; go, python)"
    );
    standard.is_default = true;
    standard.languages.clear();
    assert_eq!(
        describe_standard(&standard),
        "baseline (id 4, default; no languages)"
    );
}

#[tokio::test]
async fn list_prints_active_standards_in_order() {
    let remote = FakeRemote::new()
        .with_standard(active(3, "strict", &["python"]), Vec::new())
        .with_standard(Standard::draft(5, "wip"), Vec::new())
        .with_standard(active(7, "relaxed", &[]), Vec::new());

    let mut out = Vec::new();
    handle_list_command(&remote, false, &mut out).await.unwrap();

    assert_eq!(
        text(out),
        "  1. strict (id 3; python)\n  2. relaxed (id 7; no languages)\n"
    );
}

#[tokio::test]
async fn list_json_is_parseable() {
    let remote = FakeRemote::new().with_standard(active(3, "strict", &[]), Vec::new());
    let mut out = Vec::new();
    handle_list_command(&remote, true, &mut out).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value[0]["name"], "strict");
}

#[tokio::test]
async fn apply_creates_promotes_and_writes_result() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new().with_catalog_tool("t1", &["p1"]);
    let request = apply_request(&fixture, ACME_BASELINE_CONFIG, ApplyOptions::default());

    let mut out = Vec::new();
    handle_apply_command(&remote, request, &mut out)
        .await
        .unwrap();

    let standard = remote.standard_named("baseline").unwrap();
    assert!(standard.is_active());
    let written = fixture.read_json("result.json").unwrap();
    assert_eq!(written["standard"]["name"], "baseline");
    assert_eq!(written["standard"]["isDraft"], false);
    assert_eq!(written["result"]["success"], true);
    assert_eq!(written["result"]["tools"][0]["action"], "add");
    assert!(text(out).contains("Result written to"));
}

#[tokio::test]
async fn apply_with_failures_writes_result_then_errors_without_promoting() {
    let fixture = TestFixture::new().unwrap();
    let remote = mixed_remote();
    remote.fail_tool("bandit");
    let request = apply_request(&fixture, MIXED_CONFIG, ApplyOptions::default());

    let mut out = Vec::new();
    let err = handle_apply_command(&remote, request, &mut out)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed"));
    let written = fixture.read_json("result.json").unwrap();
    assert_eq!(written["result"]["success"], false);
    assert!(!remote.calls().iter().any(|c| matches!(c, Call::Promote(_))));
    assert!(remote.standard_named("baseline").unwrap().is_draft);
}

#[tokio::test]
async fn apply_rejects_malformed_document_before_any_remote_call() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new();
    let request = apply_request(
        &fixture,
        r#"{"tools": [{"isEnabled": true, "patterns": []}]}"#,
        ApplyOptions::default(),
    );

    let err = handle_apply_command(&remote, request, &mut Vec::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("tools[0]"));
    assert!(remote.calls().is_empty());
    assert!(!fixture.path("result.json").exists());
}

#[tokio::test]
async fn apply_dry_run_against_missing_standard_changes_nothing() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new();
    let request = apply_request(
        &fixture,
        ACME_BASELINE_CONFIG,
        ApplyOptions {
            dry_run: true,
            ..ApplyOptions::default()
        },
    );

    let mut out = Vec::new();
    handle_apply_command(&remote, request, &mut out)
        .await
        .unwrap();

    assert!(text(out).contains("would create it with 1 tool(s) and 1 pattern(s)"));
    assert!(remote.mutations().is_empty());
}

#[tokio::test]
async fn extract_writes_document_to_default_name() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new().with_standard(
        active(2, "Team Baseline", &["python"]),
        vec![Tool::new("t1", true).with_patterns(vec![stdsync_model::Pattern::new("p1", true)])],
    );
    let output = fixture.path(&stdsync_model::default_output_name("Team Baseline", "standard"));

    let mut out = Vec::new();
    let path = handle_extract_command(
        &remote,
        Selector::Id(StandardId(2)),
        Some(output.clone()),
        &ExtractOptions::default(),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(path, output);
    assert!(path.ends_with("team_baseline_standard.json"));
    let document = fixture.read_json("team_baseline_standard.json").unwrap();
    assert_eq!(document["name"], "Team Baseline");
    assert_eq!(document["tools"][0]["patterns"][0]["patternDefinition"]["id"], "p1");
    assert!(text(out).contains("1 enabled, 1 patterns"));
}

#[tokio::test]
async fn extract_failure_writes_nothing() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new().with_standard(
        active(2, "s", &[]),
        vec![Tool::new("t1", true), Tool::new("t2", true)],
    );
    remote.fail_pattern_listing("t2");
    let output = fixture.path("out.json");

    let result = handle_extract_command(
        &remote,
        Selector::Name("s".into()),
        Some(output.clone()),
        &ExtractOptions::default(),
        &mut Vec::new(),
    )
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test]
async fn extract_uses_the_picker_when_no_selector_is_given() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new()
        .with_standard(active(1, "first", &[]), Vec::new())
        .with_standard(active(2, "second", &[]), Vec::new());
    let picker = |standards: &[Standard]| -> Result<usize, PickError> {
        Ok(standards.iter().position(|s| s.name == "second").unwrap_or(0))
    };

    handle_extract_command(
        &remote,
        Selector::Pick(&picker),
        Some(fixture.path("picked.json")),
        &ExtractOptions::default(),
        &mut Vec::new(),
    )
    .await
    .unwrap();

    assert_eq!(fixture.read_json("picked.json").unwrap()["id"], 2);
}

#[tokio::test]
async fn check_passes_after_apply_and_detects_drift() {
    let fixture = TestFixture::new().unwrap();
    let remote = FakeRemote::new().with_catalog_tool("t1", &["p1", "p2"]);
    let config = fixture.write("config.json", ACME_BASELINE_CONFIG).unwrap();
    let request = apply_request(&fixture, ACME_BASELINE_CONFIG, ApplyOptions::default());
    handle_apply_command(&remote, request, &mut Vec::new())
        .await
        .unwrap();
    remote.clear_calls();

    let mut out = Vec::new();
    handle_check_command(
        &remote,
        Selector::Name("baseline".into()),
        &config,
        false,
        &mut out,
    )
    .await
    .unwrap();
    assert!(text(out).ends_with("No drift.\n"));

    let drifted = fixture
        .write(
            "drifted.json",
            r#"{"tools": [{"uuid": "t1", "patterns": [
                {"patternDefinition": {"id": "p1"}},
                {"patternDefinition": {"id": "p2"}}
            ]}]}"#,
        )
        .unwrap();
    let err = handle_check_command(
        &remote,
        Selector::Name("baseline".into()),
        &drifted,
        false,
        &mut Vec::new(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("1 change(s)"));
    assert!(remote.mutations().is_empty());
}
