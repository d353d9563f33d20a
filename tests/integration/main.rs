//! Integration tests for the fixtures CLI

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn fixtures(root: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("fixtures");
        cmd.env_remove("FIXTURES_CONFIG").arg("-C").arg(root);
        cmd
    }

    fn write_config(root: &Path, body: &str) -> std::path::PathBuf {
        let path = root.join("fixtures.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("fixtures")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("acquire-fixtures"))
            .stdout(predicate::str::contains("clean-test-files"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("fixtures")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("fixtures"));
    }

    #[test]
    fn clean_on_empty_root_succeeds() {
        let temp = TempDir::new().unwrap();
        fixtures(temp.path())
            .arg("clean")
            .assert()
            .success()
            .stdout(predicate::str::contains("not present"));
    }

    #[test]
    fn clean_test_files_removes_tree() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("interchange-tests");
        std::fs::create_dir_all(tree.join("tests")).unwrap();
        std::fs::write(tree.join("tests/a.json"), "{}").unwrap();

        fixtures(temp.path())
            .arg("clean-test-files")
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed"));
        assert!(!tree.exists());
    }

    #[test]
    fn status_reports_missing_archive() {
        let temp = TempDir::new().unwrap();
        fixtures(temp.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "359085be9da6e5e19644977aa45947bcec5d99de",
            ))
            .stdout(predicate::str::contains("not downloaded"));
    }

    #[test]
    fn status_warns_on_stale_tree() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("interchange-tests/tests")).unwrap();

        fixtures(temp.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("(stale)"))
            .stdout(predicate::str::contains("do not match the cached archive"));
    }

    #[test]
    fn acquire_reports_fetch_failure() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            "[source]\nbase_url = \"http://127.0.0.1:9/tarball\"\ntimeout_secs = 5\n",
        );

        fixtures(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("acquire-fixtures")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch"))
            .stderr(predicate::str::contains("fetch"));
        assert!(!temp.path().join("interchange-tests").exists());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "[fixtures]\noutput_dir = \"../outside\"\n");

        fixtures(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn invalid_tag_is_rejected() {
        let temp = TempDir::new().unwrap();
        fixtures(temp.path())
            .args(["status", "--tag", "a/b"])
            .assert()
            .failure();
    }

    #[cfg(unix)]
    #[test]
    fn generate_runs_configured_program() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            r#"
            [generator]
            program = "sh"
            args = ["-c", "mkdir -p \"$1\" && echo '{}' > \"$1/case.json\"", "generator"]
            "#,
        );

        fixtures(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("generate")
            .assert()
            .success();
        assert!(temp.path().join("generated-tests/case.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn generate_with_relative_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("sub")).unwrap();
        let config = write_config(
            temp.path(),
            r#"
            [generator]
            program = "sh"
            args = ["-c", "mkdir -p \"$1\" && echo '{}' > \"$1/case.json\"", "generator"]
            "#,
        );

        cargo_bin_cmd!("fixtures")
            .env_remove("FIXTURES_CONFIG")
            .current_dir(temp.path())
            .args(["-C", "sub", "--config"])
            .arg(&config)
            .arg("generate")
            .assert()
            .success();

        assert!(temp.path().join("sub/generated-tests/case.json").exists());
        assert!(!temp.path().join("sub/sub").exists());

        // A second run clears the same directory it fills
        std::fs::write(temp.path().join("sub/generated-tests/stale.json"), "{}").unwrap();
        cargo_bin_cmd!("fixtures")
            .env_remove("FIXTURES_CONFIG")
            .current_dir(temp.path())
            .args(["-C", "sub", "--config"])
            .arg(&config)
            .arg("generate")
            .assert()
            .success();
        assert!(!temp.path().join("sub/generated-tests/stale.json").exists());
    }

    #[cfg(unix)]
    #[test]
    fn generate_failure_exits_nonzero() {
        let temp = TempDir::new().unwrap();
        let config = write_config(
            temp.path(),
            "[generator]\nprogram = \"sh\"\nargs = [\"-c\", \"exit 4\"]\n",
        );

        fixtures(temp.path())
            .arg("--config")
            .arg(&config)
            .arg("generate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("exit code: 4"));
        assert!(!temp.path().join("generated-tests").exists());
    }
}
