use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

const DECL: &str = r#"{
    "name": "copy",
    "summary": "Copy files",
    "prefixes": ["-", "--"],
    "conventions": { "posix": true, "gnu": true, "posix-groups": true },
    "parameters": [
        { "key": "verbose", "kind": "flag", "names": ["v", "verbose"], "help": "Verbose output" },
        { "key": "out", "kind": "option", "names": ["o", "output"], "help": "Output file",
          "value-name": "FILE", "default": "a.out", "env": "COPY_OUT", "config": "out" },
        { "key": "src", "kind": "argument", "required": true, "help": "Source file" }
    ]
}"#;

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("argmatch-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn write_decl(dir: &Path) -> PathBuf {
    let path = dir.join("decl.json");
    fs::write(&path, DECL).expect("failed to write declaration");
    path
}

fn argmatch() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_argmatch"));
    cmd.env_remove("COPY_OUT");
    cmd
}

fn assert_success(out: &Output, what: &str) {
    assert!(
        out.status.success(),
        "{what} failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
}

fn json_match(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.output().expect("failed to run argmatch match");
    assert_success(&out, "argmatch match");
    serde_json::from_slice(&out.stdout).expect("match output is not JSON")
}

fn row<'a>(report: &'a serde_json::Value, key: &str) -> &'a serde_json::Value {
    report["parameters"]
        .as_array()
        .expect("parameters is an array")
        .iter()
        .find(|p| p["key"] == key)
        .unwrap_or_else(|| panic!("no row for `{key}` in {report}"))
}

#[test]
fn help_works() {
    let out = argmatch()
        .arg("--help")
        .output()
        .expect("failed to run argmatch --help");
    assert_success(&out, "argmatch --help");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("argmatch") && stdout.contains("match") && stdout.contains("usage"),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn match_resolves_command_line_values() {
    let dir = make_temp_dir("match");
    let decl = write_decl(&dir);

    let report = json_match(
        argmatch()
            .arg("match")
            .arg("--decl")
            .arg(&decl)
            .arg("--json")
            .arg("--")
            .args(["-v", "--output=b.out", "in.txt", "extra"]),
    );

    let verbose = row(&report, "verbose");
    assert_eq!(verbose["kind"], "flag");
    assert_eq!(verbose["value"], "true");
    assert_eq!(verbose["set"], true);

    let out = row(&report, "out");
    assert_eq!(out["value"], "b.out");
    assert_eq!(out["origin"], row(&report, "src")["origin"]);

    assert_eq!(row(&report, "src")["value"], "in.txt");
    assert_eq!(report["unmatched"], serde_json::json!(["extra"]));
    assert_eq!(report["missing-required"], serde_json::json!([]));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn match_falls_back_to_config_env_and_default() {
    let dir = make_temp_dir("defaults");
    let decl = write_decl(&dir);

    let report = json_match(
        argmatch()
            .args(["match", "--json", "--decl"])
            .arg(&decl)
            .args(["--", "in.txt"]),
    );
    let out = row(&report, "out");
    assert_eq!(out["value"], "a.out");
    assert_eq!(out["set"], false);

    let config = dir.join("config.json");
    fs::write(&config, r#"{ "out": "cfg.out" }"#).expect("failed to write config");
    let report = json_match(
        argmatch()
            .args(["match", "--json", "--decl"])
            .arg(&decl)
            .arg("--config")
            .arg(&config)
            .args(["--", "in.txt"]),
    );
    assert_eq!(row(&report, "out")["value"], "cfg.out");

    // The environment outranks config unless config is preferred.
    let report = json_match(
        argmatch()
            .env("COPY_OUT", "env.out")
            .args(["match", "--json", "--decl"])
            .arg(&decl)
            .arg("--config")
            .arg(&config)
            .args(["--", "in.txt"]),
    );
    let out = row(&report, "out");
    assert_eq!(out["value"], "env.out");
    assert_ne!(out["origin"], row(&report, "src")["origin"]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn match_reads_env_file() {
    let dir = make_temp_dir("env-file");
    let decl = write_decl(&dir);
    let env_file = dir.join(".env");
    fs::write(&env_file, "COPY_OUT=dotenv.out\n").expect("failed to write env file");

    let report = json_match(
        argmatch()
            .args(["match", "--json", "--decl"])
            .arg(&decl)
            .arg("--env-file")
            .arg(&env_file)
            .args(["--", "in.txt"]),
    );
    assert_eq!(row(&report, "out")["value"], "dotenv.out");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_required_argument_exits_with_status_2() {
    let dir = make_temp_dir("required");
    let decl = write_decl(&dir);

    let out = argmatch()
        .args(["match", "--decl"])
        .arg(&decl)
        .args(["--", "-v"])
        .output()
        .expect("failed to run argmatch match");
    assert_eq!(
        out.status.code(),
        Some(2),
        "expected exit status 2:\nstderr:\n{}",
        String::from_utf8_lossy(&out.stderr),
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("src"), "stderr should name the key:\n{stderr}");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("verbose"), "table still printed:\n{stdout}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_declaration_is_reported() {
    let dir = make_temp_dir("invalid");
    let decl = dir.join("decl.json");
    fs::write(
        &decl,
        r#"{ "name": "x", "parameters": [ { "key": "", "kind": "flag" } ] }"#,
    )
    .expect("failed to write declaration");

    let out = argmatch()
        .args(["usage", "--decl"])
        .arg(&decl)
        .output()
        .expect("failed to run argmatch usage");
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("invalid declaration"),
        "unexpected stderr:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn usage_renders_declared_parameters() {
    let dir = make_temp_dir("usage");
    let decl = write_decl(&dir);

    let out = argmatch()
        .args(["usage", "--decl"])
        .arg(&decl)
        .output()
        .expect("failed to run argmatch usage");
    assert_success(&out, "argmatch usage");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("copy - Copy files\n"), "{stdout}");
    assert!(stdout.contains("Usage: copy [OPTIONS] <SRC>"), "{stdout}");
    assert!(stdout.contains("-v, --verbose"), "{stdout}");
    assert!(stdout.contains("-o, --output <FILE>"), "{stdout}");
    assert!(stdout.contains("[env: COPY_OUT]"), "{stdout}");

    let _ = fs::remove_dir_all(&dir);
}
