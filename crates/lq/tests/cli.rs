//! CLI integration tests for lq commands.
//!
//! These tests focus on exit codes and the tree or query each command prints.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to run `lq` with HOME isolated and the working directory set to `dir`.
fn lq_in(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("lq").unwrap();
    cmd.env("HOME", dir)
        .env_remove("LQ_LOG")
        .current_dir(dir);
    cmd
}

/// Writes a root `.lq.toml` with the given body.
fn write_config(dir: &Path, body: &str) {
    fs::write(dir.join(".lq.toml"), format!("root = true\n{body}")).unwrap();
}

/// Runs a command and returns its stdout.
fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap()
}

mod parse {
    use super::*;

    #[test]
    fn prints_normalized_tree() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "rust (async | tokio) -deprecated"]));
        assert_eq!(
            out,
            "And\n  Term(\"rust\")\n  Or\n    Term(\"async\")\n    Term(\"tokio\")\n  Not\n    Term(\"deprecated\")\n"
        );
    }

    #[test]
    fn repairs_malformed_input() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "rust | ) -"]));
        assert_eq!(out, "Term(\"rust\")\n");
    }

    #[test]
    fn empty_query() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["parse", "  | & "])
            .assert()
            .success()
            .stdout("(empty query)\n");
    }

    #[test]
    fn raw_keeps_nested_connectives() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "--raw", "a (b c)"]));
        assert!(out.matches("And").count() >= 2, "{out}");

        let out = stdout_of(lq_in(dir.path()).args(["parse", "a (b c)"]));
        assert_eq!(out.matches("And").count(), 1, "{out}");
    }

    #[test]
    fn json_output() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "--json", "a | \"b c\""]));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["or"][0]["term"], "a");
        assert_eq!(value["or"][1]["phrase"][1], "c");
    }

    #[test]
    fn json_empty_query_is_null() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "--json", ""]));
        assert_eq!(out.trim(), "null");
    }

    #[test]
    fn query_starting_with_hyphen_after_separator() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "--", "-draft notes"]));
        assert!(out.starts_with("And\n  Not\n"), "{out}");
    }

    #[test]
    fn config_scopes_are_recognized() {
        let dir = temp_dir();
        write_config(dir.path(), "[parser]\nscopes = [\"title\"]\n");
        let out = stdout_of(lq_in(dir.path()).args(["parse", "TITLE:rust"]));
        assert_eq!(out, "Scope(\"title\")\n  Term(\"rust\")\n");
    }

    #[test]
    fn verbose_flag_emits_parser_trace() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["-vv", "parse", "a ) b"])
            .assert()
            .success()
            .stderr(predicate::str::contains("ignoring stray close parenthesis"));
    }

    #[test]
    fn quiet_by_default() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["parse", "a ) b"])
            .assert()
            .success()
            .stderr(predicate::str::is_empty());
    }
}

mod tokens {
    use super::*;

    #[test]
    fn splits_infix_and_prefix_characters() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["tokens", "(a|b) --c x-y"]));
        let tokens: Vec<&str> = out.lines().collect();
        assert_eq!(tokens, ["(", "a", "|", "b", ")", "-", "-", "c", "x-y"]);
    }

    #[test]
    fn empty_input_prints_nothing() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["tokens", "   "])
            .assert()
            .success()
            .stdout("");
    }
}

mod render {
    use super::*;

    #[test]
    fn generic_uses_canonical_spellings() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["render", "a AND b OR NOT c"]));
        assert_eq!(out, "a b | -c\n");
    }

    #[test]
    fn fts5_subtracts_negations() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["render", "--target", "fts5", "rust -deprecated"]));
        assert_eq!(out, "rust NOT deprecated\n");
    }

    #[test]
    fn fts5_drops_unconstrained_negation() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["render", "-t", "fts5", "a | -b"]));
        assert_eq!(out, "a\n");
    }

    #[test]
    fn fts5_drops_punctuation_terms() {
        let dir = temp_dir();
        let out = stdout_of(lq_in(dir.path()).args(["render", "-t", "fts5", "!! rust"]));
        assert_eq!(out, "rust\n");
    }

    #[test]
    fn fts5_scoped_negation_with_invert_policy() {
        let dir = temp_dir();
        write_config(
            dir.path(),
            "[parser]\nscopes = \"title\"\n[normalizer]\nnot_scope = \"invert\"\n",
        );
        let out = stdout_of(lq_in(dir.path()).args(["render", "-t", "fts5", "rust -title:old"]));
        assert_eq!(out, "rust NOT title : (old)\n");
    }

    #[test]
    fn fts5_negation_under_or_fails_with_hint() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["render", "-t", "fts5", "x (a | -b)"])
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("error: negation"))
            .stderr(predicate::str::contains("hint:"));
    }

    #[test]
    fn empty_result_warns() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["render", "-t", "fts5", "--", "-a"])
            .assert()
            .success()
            .stdout("")
            .stderr(predicate::str::contains("query is empty"));
    }

    #[test]
    fn unknown_target_fails() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["render", "--target", "lucene", "a"])
            .assert()
            .failure();
    }
}

mod config {
    use super::*;

    #[test]
    fn shows_defaults() {
        let dir = temp_dir();
        lq_in(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("[parser]"))
            .stdout(predicate::str::contains("[normalizer]"))
            .stdout(predicate::str::contains("default_operator = \"and\""));
    }

    #[test]
    fn reflects_discovered_file() {
        let dir = temp_dir();
        write_config(dir.path(), "[normalizer]\nnot_scope = \"drop\"\n");
        let sub = dir.path().join("nested/deeper");
        fs::create_dir_all(&sub).unwrap();

        lq_in(dir.path())
            .current_dir(&sub)
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("not_scope = \"drop\""));
    }

    #[test]
    fn explicit_file_skips_discovery() {
        let dir = temp_dir();
        write_config(dir.path(), "[parser]\ndefault_operator = \"or\"\n");
        let other = dir.path().join("other.toml");
        fs::write(&other, "[parser]\nscopes = [\"body\"]\n").unwrap();

        let out = stdout_of(lq_in(dir.path()).arg("-c").arg(&other).arg("config"));
        assert!(out.contains("default_operator = \"and\""), "{out}");
        assert!(out.contains("\"body\""), "{out}");
    }

    #[test]
    fn missing_explicit_file_fails() {
        let dir = temp_dir();
        lq_in(dir.path())
            .args(["--config", "nope.toml", "config"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }

    #[test]
    fn malformed_file_fails() {
        let dir = temp_dir();
        write_config(dir.path(), "[parser]\nunknown_key = 1\n");
        lq_in(dir.path())
            .args(["parse", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("error:"));
    }

    #[test]
    fn invalid_pattern_fails() {
        let dir = temp_dir();
        write_config(dir.path(), "[parser]\nnot = \"r/(/\"\n");
        lq_in(dir.path())
            .args(["parse", "a"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid configuration"));
    }
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = temp_dir();
        lq_in(dir.path()).arg("init").assert().success();

        let contents = fs::read_to_string(dir.path().join(".lq.toml")).unwrap();
        assert!(contents.contains("# [parser]"));
        assert!(contents.contains("# [normalizer]"));
    }

    #[test]
    fn created_file_keeps_defaults() {
        let dir = temp_dir();
        lq_in(dir.path()).arg("init").assert().success();
        let out = stdout_of(lq_in(dir.path()).args(["parse", "a b"]));
        assert!(out.starts_with("And\n"));
    }

    #[test]
    fn fails_if_config_exists() {
        let dir = temp_dir();
        fs::write(dir.path().join(".lq.toml"), "existing").unwrap();

        lq_in(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn force_overwrites_existing() {
        let dir = temp_dir();
        fs::write(dir.path().join(".lq.toml"), "not toml at all [").unwrap();

        lq_in(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".lq.toml")).unwrap();
        assert!(contents.contains("# [parser]"));
    }
}
