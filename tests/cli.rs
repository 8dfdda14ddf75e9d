//! Binary-level tests: exit codes, diagnostics and the migrate pipeline.

use assert_cmd::Command;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cmd(cache: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("safelist-sync").unwrap();
    cmd.env("SAFELIST_SYNC_CACHE_DIR", cache.path())
        .env_remove("RUST_LOG");
    cmd
}

fn migrate(cache: &TempDir, args: &[&str], stdin: &str) -> std::process::Output {
    cmd(cache)
        .arg("migrate")
        .args(args)
        .write_stdin(stdin)
        .output()
        .unwrap()
}

#[test]
fn sync_without_sources_fails_silently() {
    let cache = TempDir::new().unwrap();
    let output = cmd(&cache)
        .args(["sync", "-r", "h1:80", "h2:80"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stderr.is_empty());
    assert!(output.stdout.is_empty());
}

#[test]
fn sync_without_sources_explains_in_verbose_mode() {
    let cache = TempDir::new().unwrap();
    let output = cmd(&cache)
        .args(["-v", "sync", "-r", "h1:80", "h2:80"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No sources specified"), "stderr: {stderr}");
}

#[test]
fn sync_with_a_single_system_fails() {
    let cache = TempDir::new().unwrap();
    let output = cmd(&cache)
        .args(["--devel", "sync", "-s", "h1:80"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Not enough systems"), "stderr: {stderr}");
}

async fn appliance(list: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v0/empire/whitelist/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v0/empire/whitelist/import"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    server
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_cache_write_failure_is_silent() {
    let h1 = appliance(json!([{"type": "ip", "name": "a", "hash_key": -99999}])).await;
    let h2 = appliance(json!([{"type": "useragent", "useragent": "b", "hash_key": -99999}])).await;

    let cache = TempDir::new().unwrap();
    let not_a_dir = cache.path().join("cache-file");
    std::fs::write(&not_a_dir, "occupied").unwrap();

    let mut sync = cmd(&cache);
    sync.arg("sync")
        .arg("--once")
        .arg("--cache-dir")
        .arg(&not_a_dir)
        .arg("-s")
        .arg(h1.address().to_string())
        .arg(h2.address().to_string());
    let output = tokio::task::spawn_blocking(move || sync.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success());
    assert!(
        output.stderr.is_empty(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(h1.received_requests().await.unwrap().len(), 2);
}

#[test]
fn migrate_adds_sentinel_hash_keys() {
    let cache = TempDir::new().unwrap();
    let input = json!([
        {"type": "ip", "name": "dns", "comment": "resolver"},
        {"type": "useragent", "useragent": "curl", "hash_key": 42}
    ]);
    let output = migrate(&cache, &[], &input.to_string());

    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out[0]["hash_key"], -99999);
    assert_eq!(out[0]["name"], "dns");
    assert_eq!(out[1]["hash_key"], 42);
}

#[test]
fn migrate_is_idempotent() {
    let cache = TempDir::new().unwrap();
    let input = json!([{"type": "cidr"}, {"Type": "org", "comment": "legacy"}]).to_string();

    let once = migrate(&cache, &[], &input);
    assert!(once.status.success());
    let twice = migrate(&cache, &[], std::str::from_utf8(&once.stdout).unwrap());
    assert!(twice.status.success());

    assert_eq!(once.stdout, twice.stdout);
}

#[test]
fn migrate_rejects_unknown_type_without_output() {
    let cache = TempDir::new().unwrap();
    let input = json!([{"type": "ip"}, {"type": "hostname"}]).to_string();
    let output = migrate(&cache, &[], &input);

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unrecognized type field"), "stderr: {stderr}");
}

#[test]
fn migrate_strict_rejects_legacy_schema() {
    let cache = TempDir::new().unwrap();
    let input = json!([{"Type": "ip"}]).to_string();

    let lenient = migrate(&cache, &[], &input);
    assert!(lenient.status.success());

    let strict = migrate(&cache, &["--strict"], &input);
    assert_eq!(strict.status.code(), Some(4));
    assert!(strict.stdout.is_empty());
}

#[test]
fn migrate_reports_structured_errors() {
    let cache = TempDir::new().unwrap();
    let output = migrate(&cache, &["--json"], r#"{"type": "ip"}"#);

    assert_eq!(output.status.code(), Some(8));
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["code"], "JSON_ERROR");
}

#[test]
fn cache_lists_nothing_on_fresh_install() {
    let cache = TempDir::new().unwrap();
    let output = cmd(&cache).args(["--json", "cache"]).output().unwrap();

    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["snapshots"], json!([]));
}

#[test]
fn version_prints_package_version() {
    let cache = TempDir::new().unwrap();
    let output = cmd(&cache).args(["version", "--json"]).output().unwrap();

    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["version"], env!("CARGO_PKG_VERSION"));
}
