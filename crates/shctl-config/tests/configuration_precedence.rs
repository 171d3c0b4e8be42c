//! Behavioural tests for layered configuration loading.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::sync::{Mutex, MutexGuard};

use camino::Utf8PathBuf;
use once_cell::sync::Lazy;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

use shctl_config::{Config, OrthoConfig, default_log_filter, default_log_format};

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const ENV_KEYS: &[&str] = &[
    "BASM_RC_FILE",
    "BASM_SUDOERS_PATH",
    "BASM_BACKUP_DIR",
    "BASM_CONFIG_PATH",
];

struct Harness {
    temp_dir: TempDir,
    cli_args: RefCell<Vec<OsString>>,
    env_overrides: RefCell<Vec<(String, Option<OsString>)>>,
    loaded: RefCell<Option<Config>>,
    error: RefCell<Option<String>>,
    _guard: MutexGuard<'static, ()>,
}

impl Harness {
    fn new() -> Self {
        let guard = ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let harness = Self {
            temp_dir: TempDir::new().expect("create temp dir"),
            cli_args: RefCell::new(vec![OsString::from("shctl")]),
            env_overrides: RefCell::new(Vec::new()),
            loaded: RefCell::new(None),
            error: RefCell::new(None),
            _guard: guard,
        };
        for key in ENV_KEYS {
            harness.clear_env(key);
        }
        harness
    }

    fn write_config(&self, rc_file: &str) {
        let path = self.temp_dir.path().join("shctl.toml");
        fs::write(&path, format!("rc_file = \"{rc_file}\"\n")).expect("write configuration");

        let mut args = self.cli_args.borrow_mut();
        args.push(OsString::from("--config-path"));
        args.push(path.into_os_string());
    }

    fn remember(&self, key: &str) {
        let previous = std::env::var_os(key);
        self.env_overrides
            .borrow_mut()
            .push((key.to_owned(), previous));
    }

    fn set_env(&self, key: &str, value: &str) {
        self.remember(key);
        // Environment mutation is `unsafe` under edition 2024. The harness
        // holds `ENV_MUTEX` and restores every override in `Drop`.
        unsafe { std::env::set_var(key, value) };
    }

    fn clear_env(&self, key: &str) {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
    }

    fn push_cli_arg(&self, arg: impl Into<OsString>) {
        self.cli_args.borrow_mut().push(arg.into());
    }

    fn load(&self) {
        if self.loaded.borrow().is_some() || self.error.borrow().is_some() {
            return;
        }

        let args = self.cli_args.borrow().clone();
        match Config::load_from_iter(args) {
            Ok(config) => *self.loaded.borrow_mut() = Some(config),
            Err(error) => *self.error.borrow_mut() = Some(error.to_string()),
        }
    }

    fn loaded_config(&self) -> Config {
        self.load();
        if let Some(error) = self.error.borrow().as_ref() {
            panic!("configuration failed to load: {error}");
        }
        self.loaded
            .borrow()
            .clone()
            .expect("configuration was not loaded")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let mut overrides = self.env_overrides.borrow_mut();
        while let Some((key, value)) = overrides.pop() {
            match value {
                Some(os_value) => unsafe { std::env::set_var(&key, os_value) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[given("a configuration file setting the rc file to \"{path}\"")]
fn given_configuration_file(harness: &Harness, path: String) {
    harness.write_config(&path);
}

#[given("the environment overrides the rc file to \"{path}\"")]
fn given_environment_override(harness: &Harness, path: String) {
    harness.set_env("BASM_RC_FILE", &path);
}

#[when("the CLI sets the rc file to \"{path}\"")]
fn when_cli_override(harness: &Harness, path: String) {
    harness.push_cli_arg("--rc-file");
    harness.push_cli_arg(OsString::from(&path));
}

#[when("the configuration loads without overrides")]
fn when_load_without_overrides(harness: &Harness) {
    harness.load();
}

#[then("loading the configuration resolves the rc file to \"{path}\"")]
fn then_resolved_rc_file(harness: &Harness, path: String) {
    let config = harness.loaded_config();
    assert_eq!(config.rc_file, Some(Utf8PathBuf::from(path)));
}

#[then("loading the configuration applies the built-in defaults")]
fn then_defaults_applied(harness: &Harness) {
    let config = harness.loaded_config();
    assert_eq!(config.log_filter(), default_log_filter());
    assert_eq!(config.log_format(), default_log_format());
    assert_eq!(config.validator_program(), "visudo");
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Built-in defaults apply without overrides"
)]
fn defaults_without_overrides(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Configuration file sets the rc file"
)]
fn file_sets_rc_file(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Environment overrides the configuration file"
)]
fn environment_overrides_file(#[from(harness)] harness: Harness) {
    drop(harness);
}

#[scenario(
    path = "tests/features/configuration_precedence.feature",
    name = "Command line overrides the environment"
)]
fn cli_overrides_environment(#[from(harness)] harness: Harness) {
    drop(harness);
}
