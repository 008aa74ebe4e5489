//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use twb_monitor::MonitorConfig;

/// Test fixture for configuration testing
struct ConfigFixture {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("monitor.toml");
        Self { temp_dir, config_path }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }

    /// Command isolated from any config in the user's directories
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("twb-monitor").unwrap();
        cmd.current_dir(self.temp_dir.path())
            .env("HOME", self.temp_dir.path())
            .env("XDG_CONFIG_HOME", self.temp_dir.path());
        for var in ["TWB_HOST", "TWB_PATH", "TWB_SECURE", "TWB_URL", "TWB_RECONNECT_DELAY_MS", "TWB_CONNECT_TIMEOUT_MS", "TWB_LOG_LEVEL", "TWB_LOG_FILE"] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn validate(&self) -> assert_cmd::assert::Assert {
        self.cmd().arg("config").arg("validate").arg("--config").arg(self.path()).assert()
    }

    fn show(&self) -> assert_cmd::assert::Assert {
        self.cmd().arg("config").arg("show").arg("--config").arg(self.path()).assert()
    }
}

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_config_uses_defaults() {
    let fixture = ConfigFixture::new();
    fixture.write_config("");

    fixture.validate().success();
    fixture
        .show()
        .success()
        .stdout(predicate::str::contains("host = \"127.0.0.1:8080\""))
        .stdout(predicate::str::contains("path = \"/ws\""));
}

#[test]
fn test_full_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[endpoint]
host = "bot.lan:8080"
path = "/ws"
secure = true
reconnect_delay_ms = 2500
connect_timeout_ms = 5000

[display]
clear_screen = false
show_timestamp = false

[logging]
level = "debug"
file = "/tmp/twb-monitor.log"
max_file_size_mb = 50
max_files = 3
json_format = true
"#,
    );

    fixture.validate().success();
    fixture
        .show()
        .success()
        .stdout(predicate::str::contains("bot.lan:8080"))
        .stdout(predicate::str::contains("reconnect_delay_ms = 2500"))
        .stdout(predicate::str::contains("clear_screen = false"));
}

#[test]
fn test_url_override_skips_host_checks() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[endpoint]
host = ""
url = "wss://bot.example.com/live"
"#,
    );

    fixture.validate().success();
}

#[test]
fn test_load_through_library() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[endpoint]
host = "10.1.1.5:9000"
secure = true
"#,
    );

    let config = MonitorConfig::from_file(&fixture.config_path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.endpoint.resolve_url().unwrap().as_str(), "wss://10.1.1.5:9000/ws");
    assert_eq!(config.endpoint.reconnect_delay_ms, 1000);
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_host() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nhost = \"  \"\n");

    fixture
        .validate()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("host cannot be empty"));
}

#[test]
fn test_path_without_slash() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\npath = \"ws\"\n");

    fixture.validate().failure().stderr(predicate::str::contains("must start with '/'"));
}

#[test]
fn test_zero_reconnect_delay() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nreconnect_delay_ms = 0\n");

    fixture.validate().failure().stderr(predicate::str::contains("Reconnect delay"));
}

#[test]
fn test_zero_connect_timeout() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nconnect_timeout_ms = 0\n");

    fixture
        .validate()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("Connect timeout must be greater than zero"));
}

#[test]
fn test_watch_startup_failure_is_formatted() {
    let fixture = ConfigFixture::new();
    // A regular file where the log directory should be
    let blocker = fixture.temp_dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();
    let log_file = blocker.join("monitor.log");
    fixture.write_config(&format!("[logging]\nfile = {:?}\n", log_file.to_str().unwrap()));

    fixture
        .cmd()
        .arg("watch")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("Error [E"))
        .stderr(predicate::str::contains("Failed to create log directory"))
        .stderr(predicate::str::contains("Config(").not());
}

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[logging]\nlevel = \"loud\"\n");

    fixture.validate().failure().stderr(predicate::str::contains("Invalid log level"));
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint\nhost = \"x\"\n");

    fixture.validate().failure().code(10);
}

#[test]
fn test_unparseable_url() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nurl = \"::not a url::\"\n");

    fixture.validate().failure().code(30);
}

// ─────────────────────────────────────────────────────────────────
// Config Init Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_creates_valid_file() {
    let fixture = ConfigFixture::new();
    let config_path = fixture.temp_dir.path().join("nested").join("monitor.toml");

    fixture
        .cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(config_path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));

    assert!(config_path.exists());

    fixture
        .cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .assert()
        .success();
}

#[test]
fn test_config_init_refuses_overwrite() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\n");

    fixture
        .cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_init_force_overwrite() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nhost = \"old-host:1\"\n");

    fixture
        .cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(fixture.path())
        .arg("--force")
        .assert()
        .success();

    let content = fs::read_to_string(fixture.path()).unwrap();
    assert!(!content.contains("old-host"));
}

// ─────────────────────────────────────────────────────────────────
// Discovery and Environment Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_found_in_working_directory() {
    let fixture = ConfigFixture::new();
    fs::write(
        fixture.temp_dir.path().join("twb-monitor.toml"),
        "[endpoint]\nhost = \"found-in-cwd:8080\"\n",
    )
    .unwrap();

    fixture
        .cmd()
        .arg("config")
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("found-in-cwd:8080"));
}

#[test]
fn test_env_overrides_file() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[endpoint]\nhost = \"file-host:8080\"\nreconnect_delay_ms = 3000\n");

    fixture
        .cmd()
        .env("TWB_HOST", "env-host:8080")
        .env("TWB_RECONNECT_DELAY_MS", "750")
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("env-host:8080"))
        .stdout(predicate::str::contains("reconnect_delay_ms = 750"))
        .stdout(predicate::str::contains("file-host").not());
}

#[test]
fn test_tilde_expansion_in_log_file() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[logging]\nfile = \"~/logs/monitor.log\"\n");

    let output = fixture.show().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert!(!stdout.contains("file = \"~"));
}
