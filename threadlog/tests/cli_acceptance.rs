use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");
        let input = base.join("rawlogs");
        let output = base.join("mergedlogs");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        seed_rawlog_fixtures(&input);

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            input,
            output,
        }
    }

    fn dir_args(&self) -> Vec<String> {
        vec![
            "--input".to_string(),
            self.input.display().to_string(),
            "--output".to_string(),
            self.output.display().to_string(),
        ]
    }
}

fn seed_rawlog_fixtures(input: &Path) {
    let source = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../threadlog-core/tests/fixtures/rawlogs");

    fs::create_dir_all(input).expect("failed to create input directory");
    for name in ["process-1001.log", "process-2002.log"] {
        fs::copy(source.join(name), input.join(name)).expect("failed to copy rawlog fixture");
    }
}

fn run_bin(env: &CliTestEnv, args: &[String]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("threadlog"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute threadlog: {e}"))
}

fn assert_success(args: &[String], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "threadlog {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn text_report_answers_all_three_queries() {
    let env = CliTestEnv::new();
    let mut args = env.dir_args();
    args.extend([
        "--t1".to_string(),
        "2020-08-09 18:59:25,460".to_string(),
        "--t2".to_string(),
        "2020-08-09 18:59:26,000".to_string(),
    ]);

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ingested 14 line(s) from 2 file(s)"), "{stdout}");
    assert!(stdout.contains("Thread ID"), "{stdout}");
    assert!(stdout.contains("2002-22.log"), "{stdout}");
    assert!(!stdout.contains("1001-13.log"), "{stdout}");
    assert!(
        stdout.contains("Peak concurrency: 5 thread(s), first reached at 2020-08-09 18:59:25,260"),
        "{stdout}"
    );
    assert!(stdout.contains("avg=254.000 ms stdev=74.726 ms over 5 thread(s)"), "{stdout}");

    for name in ["1001-11.log", "1001-12.log", "1001-13.log", "2002-21.log", "2002-22.log"] {
        assert!(env.output.join(name).exists(), "missing {name}");
    }
    assert!(
        env.xdg_state.join("threadlog").is_dir(),
        "log directory should be created under XDG_STATE_HOME"
    );
}

#[test]
fn json_report_is_machine_readable() {
    let env = CliTestEnv::new();
    let mut args = env.dir_args();
    args.extend(["--format".to_string(), "json".to_string()]);

    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let doc: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(doc["ingest"]["files_processed"], 2);
    assert_eq!(doc["ingest"]["lines_ingested"], 14);
    assert_eq!(doc["report"]["window_start"], "2020-08-09 18:59:25,200");
    assert_eq!(doc["report"]["active"].as_array().map(Vec::len), Some(5));
    assert_eq!(doc["report"]["peak"]["count"], 5);
    assert_eq!(doc["report"]["runtime"]["mean_ms"], 254.0);
}

#[test]
fn failing_file_reports_and_exits_nonzero() {
    let env = CliTestEnv::new();
    fs::write(
        env.input.join("process-3003.log"),
        "3003:31::main 2020-08-09 18:59:25,000 - hello before start\n",
    )
    .expect("failed to write broken fixture");

    let args = env.dir_args();
    let output = run_bin(&env, &args);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Peak concurrency: 5 thread(s)"), "{stdout}");
    assert!(stderr.contains("process-3003.log"), "{stderr}");
    assert!(stderr.contains("invalid start of thread logs"), "{stderr}");
    assert!(stderr.contains("1 of 3 file(s) failed to ingest"), "{stderr}");
}

#[test]
fn unterminated_threads_are_listed() {
    let env = CliTestEnv::new();
    fs::write(
        env.input.join("process-4004.log"),
        "4004:41::main 2020-08-09 18:59:25,000 - **START**\n\
         4004:41::main 2020-08-09 18:59:25,010 - truncated here\n",
    )
    .expect("failed to write truncated fixture");

    let args = env.dir_args();
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Excluded 1 thread(s) without an end marker: 41"),
        "{stdout}"
    );
    assert_eq!(
        fs::read_to_string(env.output.join("4004-41.log"))
            .expect("truncated thread log should be flushed")
            .lines()
            .count(),
        2
    );
}

#[test]
fn malformed_window_is_rejected() {
    let env = CliTestEnv::new();
    let mut args = env.dir_args();
    args.extend(["--t1".to_string(), "2020-08-09T18:59:25".to_string()]);

    let output = run_bin(&env, &args);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected format YYYY-MM-DD HH:MM:SS,mmm"), "{stderr}");
}

#[test]
fn config_file_supplies_directories() {
    let env = CliTestEnv::new();
    let config_path = env.xdg_config.join("custom.toml");
    fs::write(
        &config_path,
        format!(
            "[ingest]\ninput_dir = {:?}\noutput_dir = {:?}\npattern = \"process-1001.*\"\n",
            env.input.display().to_string(),
            env.output.display().to_string()
        ),
    )
    .expect("failed to write config");

    let args = vec!["--config".to_string(), config_path.display().to_string()];
    let output = run_bin(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ingested 9 line(s) from 1 file(s)"), "{stdout}");
    assert!(env.output.join("1001-11.log").exists());
    assert!(!env.output.join("2002-21.log").exists());
}
