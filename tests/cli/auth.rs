//! Tests for the auth command.

use crate::support::*;

#[test]
fn test_auth_with_valid_cached_token() {
    let vault = FakeVault::start().with_token("s.cached", "alice");
    let t = Test::with_config(&token_alias("vault-a", vault.url()));
    t.write("vault-a-token", "s.cached\n");

    let output = t.run(&["auth", "vault://vault-a/"]);
    assert_success(&output);
    assert_stdout_contains(&output, "cached token");
    assert_eq!(t.read("vault-a-token"), "s.cached\n");
}

#[test]
fn test_auth_with_env_token_persists_it() {
    let vault = FakeVault::start().with_token("s.env", "ci");
    let config = format!(
        "[vault.vault-a]\nurl = \"{}\"\n\n[vault.vault-a.token]\nfile = \"cache/vault-a-token\"\n",
        vault.url()
    );
    let t = Test::with_config(&config);

    let output = t
        .cmd()
        .env("VAULT_TOKEN", "s.env")
        .args(["auth", "vault://vault-a/"])
        .output()
        .unwrap();

    assert_success(&output);
    assert_stdout_contains(&output, "authenticated");
    assert_eq!(t.read("cache/vault-a-token"), "s.env");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(t.path("cache/vault-a-token"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[test]
fn test_auth_rejected_env_token_is_not_persisted() {
    let vault = FakeVault::start().with_token("s.good", "ci");
    let config = format!(
        "[vault.vault-a]\nurl = \"{}\"\n\n[vault.vault-a.token]\nfile = \"vault-a-token\"\n",
        vault.url()
    );
    let t = Test::with_config(&config);

    let output = t
        .cmd()
        .env("VAULT_TOKEN", "s.bad")
        .args(["auth", "vault://vault-a/"])
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "rejected");
    assert!(!t.path("vault-a-token").exists());
}

#[test]
fn test_auth_expired_cache_without_terminal_fails() {
    let vault = FakeVault::start().with_user("bob", "pw", "s.fresh");
    let config = format!(
        "[vault.vault-b]\nurl = \"{}\"\n\n[vault.vault-b.auth]\nmethod = \"userpass\"\nusername = \"bob\"\n\n[vault.vault-b.token]\nfile = \"vault-b-token\"\n",
        vault.url()
    );
    let t = Test::with_config(&config);
    t.write("vault-b-token", "s.expired");

    let output = t.run(&["auth", "vault://vault-b/"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "password");
    assert_eq!(t.read("vault-b-token"), "s.expired");
}
