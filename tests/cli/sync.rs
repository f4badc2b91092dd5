//! Tests for the sync command.

use crate::support::*;
use age::x25519;
use syncrets::core::cipher;

fn source() -> FakeVault {
    FakeVault::start()
        .with_token("s.src", "reader")
        .with_secret("secret/citizen", "four")
        .with_secret("secret/citizen/kane", "Rosebud")
        .with_secret("secret/gilbert", "sullivan")
}

#[test]
fn test_sync_to_json_file() {
    let src = source();
    let t = Test::with_config(&token_alias("vault-a", src.url()));
    t.write("vault-a-token", "s.src");

    let output = t.sync("vault://vault-a/secret/", "out.json");
    assert_success(&output);
    assert_stdout_contains(&output, "synced 3 secret(s)");

    assert_eq!(
        t.read("out.json"),
        r#"{"secret":{"citizen":{".":"four","kane":"Rosebud"},"gilbert":"sullivan"}}"#
    );
}

#[test]
fn test_sync_keeps_keys_with_url_reserved_characters() {
    let src = FakeVault::start()
        .with_token("s.src", "reader")
        .with_secret("secret/a", "plain")
        .with_secret("secret/a#b", "hashed")
        .with_secret("secret/what?", "query")
        .with_secret("secret/x%41", "percent");
    let t = Test::with_config(&token_alias("vault-a", src.url()));
    t.write("vault-a-token", "s.src");

    let output = t.sync("vault://vault-a/secret/", "out.json");
    assert_success(&output);
    assert_stdout_contains(&output, "synced 4 secret(s)");

    let document: serde_json::Value = serde_json::from_str(&t.read("out.json")).unwrap();
    assert_eq!(document["secret"]["a"], "plain");
    assert_eq!(document["secret"]["a#b"], "hashed");
    assert_eq!(document["secret"]["what?"], "query");
    assert_eq!(document["secret"]["x%41"], "percent");
}

#[test]
fn test_sync_store_to_store_keeps_reserved_characters() {
    let src = FakeVault::start()
        .with_token("s.src", "reader")
        .with_secret("secret/a", "plain")
        .with_secret("secret/a#b", "hashed");
    let dst = FakeVault::start().with_token("s.dst", "writer");
    let config = format!(
        "{}{}",
        token_alias("vault-a", src.url()),
        token_alias("vault-b", dst.url())
    );
    let t = Test::with_config(&config);
    t.write("vault-a-token", "s.src");
    t.write("vault-b-token", "s.dst");

    let output = t.sync("vault://vault-a/secret/", "vault://vault-b/secret/");
    assert_success(&output);

    assert_eq!(dst.get("secret/a").as_deref(), Some("plain"));
    assert_eq!(dst.get("secret/a#b").as_deref(), Some("hashed"));
    assert_eq!(dst.len(), 2);
}

#[test]
fn test_sync_to_ejson_file() {
    let src = source();
    let identity = x25519::Identity::generate();
    let config = format!(
        "{}[ejson]\npublic_key = \"{}\"\n",
        token_alias("vault-a", src.url()),
        identity.to_public()
    );
    let t = Test::with_config(&config);
    t.write("vault-a-token", "s.src");

    let output = t.sync("vault://vault-a/secret/", "out.ejson");
    assert_success(&output);

    let sealed = t.read("out.ejson");
    assert!(sealed.starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
    assert!(!sealed.contains("Rosebud"));

    let document: serde_json::Value =
        serde_json::from_slice(&cipher::decrypt(&sealed, &identity).unwrap()).unwrap();
    assert_eq!(document["_public_key"], identity.to_public().to_string());
    assert_eq!(document["secret"]["citizen"]["kane"], "Rosebud");
}

#[test]
fn test_sync_store_to_store() {
    let src = source();
    let dst = FakeVault::start().with_token("s.dst", "writer");
    let config = format!(
        "{}{}",
        token_alias("vault-a", src.url()),
        token_alias("vault-b", dst.url())
    );
    let t = Test::with_config(&config);
    t.write("vault-a-token", "s.src");
    t.write("vault-b-token", "s.dst");

    let output = t.sync("vault://vault-a/secret/", "vault://vault-b/secret/");
    assert_success(&output);
    assert_stdout_contains(&output, "/secret/citizen/kane => /secret/citizen/kane");

    assert_eq!(dst.get("secret/citizen").as_deref(), Some("four"));
    assert_eq!(dst.get("secret/citizen/kane").as_deref(), Some("Rosebud"));
    assert_eq!(dst.get("secret/gilbert").as_deref(), Some("sullivan"));
}

#[test]
fn test_sync_failed_write_continues_and_exits_nonzero() {
    let src = source();
    let dst = FakeVault::start()
        .with_token("s.dst", "writer")
        .deny_write("secret/citizen");
    let config = format!(
        "{}{}",
        token_alias("vault-a", src.url()),
        token_alias("vault-b", dst.url())
    );
    let t = Test::with_config(&config);
    t.write("vault-a-token", "s.src");
    t.write("vault-b-token", "s.dst");

    let output = t.sync("vault://vault-a/secret/", "vault://vault-b/secret/");
    assert_failure(&output);
    assert_stderr_contains(&output, "1 of 3 secrets failed");

    assert_eq!(dst.get("secret/citizen"), None);
    assert_eq!(dst.get("secret/gilbert").as_deref(), Some("sullivan"));
    assert_eq!(dst.get("secret/citizen/kane").as_deref(), Some("Rosebud"));
}

#[test]
fn test_sync_destination_auth_failure_writes_nothing() {
    let src = source();
    let dst = FakeVault::start().with_token("s.dst", "writer");
    let config = format!(
        "{}{}",
        token_alias("vault-a", src.url()),
        token_alias("vault-b", dst.url())
    );
    let t = Test::with_config(&config);
    t.write("vault-a-token", "s.src");
    t.write("vault-b-token", "s.wrong");

    let output = t.sync("vault://vault-a/secret/", "vault://vault-b/secret/");
    assert_failure(&output);
    assert_eq!(dst.len(), 0);
}
