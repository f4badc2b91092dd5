//! Tests for the list command.

use crate::support::*;

fn vault() -> FakeVault {
    FakeVault::start()
        .with_token("s.root", "root")
        .with_secret("secret/foo", "bar")
        .with_secret("secret/foo/bar", "foobar")
        .with_secret("secret/gilbert", "sullivan")
        .with_secret("secret/it/was/the/best/of/times", "it was the worst of times")
}

#[test]
fn test_list_prints_paths_breadth_first() {
    let vault = vault();
    let t = Test::with_config(&token_alias("vault-a", vault.url()));
    t.write("vault-a-token", "s.root\n");

    let output = t.list("vault://vault-a/secret/");
    assert_success(&output);

    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "/secret/foo",
            "/secret/gilbert",
            "/secret/foo/bar",
            "/secret/it/was/the/best/of/times",
        ]
    );
}

#[test]
fn test_list_literal_address_with_env_token() {
    let vault = vault();
    let t = Test::new();

    let output = t
        .cmd()
        .env("VAULT_TOKEN", "s.root")
        .args(["list", &format!("{}/secret/it/", vault.url())])
        .output()
        .unwrap();

    assert_success(&output);
    assert_eq!(stdout(&output).trim(), "/secret/it/was/the/best/of/times");
}

#[test]
fn test_list_without_credentials_fails_non_interactive() {
    let vault = vault();
    let t = Test::with_config(&token_alias("vault-a", vault.url()));

    let output = t.list("vault://vault-a/secret/");
    assert_failure(&output);
    assert_stderr_contains(&output, "non-interactive");
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_config_flag_and_env() {
    let vault = vault();
    let t = Test::new();
    t.write("custom.toml", &token_alias("vault-a", vault.url()));
    t.write("vault-a-token", "s.root");

    assert_success(&t.run(&["--config", "custom.toml", "list", "vault://vault-a/secret/it/"]));

    let output = t
        .cmd()
        .env("SYNCRETS_CONFIG", t.path("custom.toml"))
        .args(["list", "vault://vault-a/secret/it/"])
        .output()
        .unwrap();
    assert_success(&output);
}

#[test]
fn test_json_log_format() {
    let vault = vault();
    let t = Test::with_config(&token_alias("vault-a", vault.url()));
    t.write("vault-a-token", "s.root");

    let output = t.run(&[
        "--verbose",
        "--log-format",
        "json",
        "list",
        "vault://vault-a/secret/it/",
    ]);
    assert_success(&output);
    assert_stdout_contains(&output, "/secret/it/was/the/best/of/times");

    let events: Vec<serde_json::Value> = stderr(&output)
        .lines()
        .filter(|line| line.starts_with('{'))
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert!(!events.is_empty());
    assert!(events.iter().all(|e| e["level"].is_string()));
    assert!(events
        .iter()
        .any(|e| e["fields"]["message"] == "walk started"));
}

#[test]
fn test_json_log_format_from_env() {
    let vault = vault();
    let t = Test::with_config(&token_alias("vault-a", vault.url()));
    t.write("vault-a-token", "s.root");

    let output = t
        .cmd()
        .env("SYNCRETS_LOG_FORMAT", "json")
        .args(["--verbose", "list", "vault://vault-a/secret/it/"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stderr_contains(&output, "\"level\":\"DEBUG\"");
}
