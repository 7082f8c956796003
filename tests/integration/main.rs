//! Integration tests for callwrap

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command pointed at a config file inside `dir` (absent unless written)
    fn callwrap(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("callwrap");
        cmd.env("CALLWRAP_CONFIG", dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compose logging"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("callwrap"));
    }

    #[test]
    fn units_lists_builtins() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .arg("units")
            .assert()
            .success()
            .stdout(predicate::str::contains("fib").and(predicate::str::contains("add")));
    }

    #[test]
    fn run_add_logs_both_records() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "add", "2", "3", "--stack", "log"])
            .assert()
            .success()
            .stdout(
                "add called with args=(2, 3), kwargs={}\n\
                 add returned 5\n\
                 5\n",
            );
    }

    #[test]
    fn run_with_kwargs_logs_them() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "mul", "2", "3", "--kw", "scale=2", "--stack", "log"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"mul called with args=(2, 3), kwargs={"scale":2}"#,
            ))
            .stdout(predicate::str::ends_with("12\n"));
    }

    #[test]
    fn memoized_fib_computes_each_index_once() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["-v", "run", "fib", "10", "--stack", "memoize"])
            .assert()
            .success()
            .stdout("55\n")
            .stderr(predicate::str::contains("11 base computation(s)"));
    }

    #[test]
    fn repeat_hits_the_cache() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["-v", "run", "square", "9", "--stack", "memoize", "--repeat", "3"])
            .assert()
            .success()
            .stdout("81\n")
            .stderr(predicate::str::contains("1 base computation(s) for 3 call(s)"));
    }

    #[test]
    fn forbidden_never_reaches_the_unit() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "add", "2", "3", "--stack", "log,authorize:admin", "--as", "user"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("add called").not())
            .stderr(predicate::str::contains("Forbidden"));
    }

    #[test]
    fn guard_inside_logging_records_entry_only() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "add", "2", "3", "--stack", "authorize:admin,log"])
            .assert()
            .failure()
            .stdout("add called with args=(2, 3), kwargs={}\n")
            .stderr(predicate::str::contains("Forbidden"));
    }

    #[test]
    fn matching_role_runs() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "add", "2", "3", "--stack", "authorize:admin", "--as", "admin"])
            .assert()
            .success()
            .stdout("5\n");
    }

    #[test]
    fn unknown_unit_hints() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "pow", "2"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown unit: pow"))
            .stderr(predicate::str::contains("callwrap units"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"));
    }

    #[test]
    fn configured_role_and_stack_are_used() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["config", "set", "identity.role", "admin"])
            .assert()
            .success();
        callwrap(&dir)
            .args(["config", "set", "stack.behaviors", "authorize:admin"])
            .assert()
            .success();

        callwrap(&dir)
            .args(["run", "add", "1", "1"])
            .assert()
            .success()
            .stdout("2\n");
    }

    #[test]
    fn file_sink_writes_json_lines() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("calls.jsonl");
        std::fs::write(
            dir.path().join("config.toml"),
            format!(
                "[logging]\nsink = \"file\"\npath = {:?}\n",
                log.display().to_string()
            ),
        )
        .unwrap();

        callwrap(&dir)
            .args(["run", "add", "4", "5", "--stack", "log"])
            .assert()
            .success()
            .stdout("9\n");

        let content = std::fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"event\":\"call.started\""));
    }

    #[test]
    fn fib_rejects_huge_index_without_crashing() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "fib", "200000", "--stack", "memoize"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("index must be at most 92"));
    }

    #[test]
    fn zero_repeat_is_rejected() {
        let dir = TempDir::new().unwrap();
        callwrap(&dir)
            .args(["run", "square", "3", "--repeat", "0"])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn config_set_refuses_to_overwrite_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let broken = "[identity]\nrole = 7\n\n[[stack.behaviors]]\nkind = \"authorize\"\nrole = \"ops\"\n";
        std::fs::write(&path, broken).unwrap();

        callwrap(&dir)
            .args(["config", "set", "logging.sink", "file"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);

        callwrap(&dir)
            .args(["config", "init", "--force"])
            .assert()
            .success();
        assert!(std::fs::read_to_string(&path).unwrap().contains("role = \"user\""));
    }

    #[test]
    fn tracing_sink_records_calls_without_verbose() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[logging]\nsink = \"tracing\"\n",
        )
        .unwrap();

        callwrap(&dir)
            .args(["run", "add", "2", "3", "--stack", "log"])
            .assert()
            .success()
            .stdout("5\n")
            .stderr(predicate::str::contains("add called with args=(2, 3), kwargs={}"))
            .stderr(predicate::str::contains("add returned 5"))
            .stderr(predicate::str::contains("base computation").not());
    }
}
