//! Behavioural tests for the mutation engine.

use std::cell::RefCell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use shctl_config::{ResolvedPaths, TargetKind};
use tempfile::TempDir;

use crate::{
    ConfigurableValidator, CopyCommitter, EngineError, LineStore, MutationEngine, base_name,
};

/// State shared across engine steps.
struct EngineWorld {
    _dir: TempDir,
    paths: ResolvedPaths,
    rejection: Option<String>,
    rc_before: Vec<u8>,
    sudoers_before: Vec<u8>,
    result: Option<Result<(), EngineError>>,
    listing: String,
}

impl EngineWorld {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let paths = ResolvedPaths::new(
            dir.path().join(".bashrc"),
            dir.path().join("sudoers"),
            dir.path().join("backups"),
        );
        fs::write(paths.sudoers_file(), "").expect("create sudoers");
        Self {
            _dir: dir,
            paths,
            rejection: None,
            rc_before: Vec::new(),
            sudoers_before: Vec::new(),
            result: None,
            listing: String::new(),
        }
    }

    fn engine(&self) -> MutationEngine {
        let validator = self
            .rejection
            .as_deref()
            .map_or_else(ConfigurableValidator::passing, ConfigurableValidator::failing);
        MutationEngine::new(
            self.paths.clone(),
            Box::new(validator),
            Box::new(CopyCommitter),
        )
    }

    /// Records both files, then runs `operation` and keeps its result.
    fn run<T>(&mut self, operation: impl FnOnce(&MutationEngine) -> Result<T, EngineError>) {
        self.rc_before = fs::read(self.paths.rc_file()).unwrap_or_default();
        self.sudoers_before = fs::read(self.paths.sudoers_file()).unwrap_or_default();
        let engine = self.engine();
        self.result = Some(operation(&engine).map(|_| ()));
    }

    fn append(path: &Path, line: &str) {
        LineStore::new(path).append_line(line).expect("append line");
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).expect("read file")
    }

    fn write_snapshot(target: &Path, dir: &Path, stamp: &str, content: &str, seconds: &str) {
        fs::create_dir_all(dir).expect("create backup dir");
        let name = format!("{}.bak.{}", base_name(target), strip_quotes(stamp));
        let path: PathBuf = dir.join(name);
        fs::write(&path, format!("{}\n", strip_quotes(content))).expect("write snapshot");

        let seconds: u64 = seconds.parse().expect("seconds");
        File::options()
            .write(true)
            .open(&path)
            .and_then(|file| file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)))
            .expect("set snapshot mtime");
    }
}

#[fixture]
fn world() -> RefCell<EngineWorld> {
    RefCell::new(EngineWorld::new())
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

// ---- Given steps ----

#[given("an empty rc file")]
fn given_empty_rc(world: &RefCell<EngineWorld>) {
    let world = world.borrow();
    fs::write(world.paths.rc_file(), "").expect("create rc file");
}

#[given("the rc file contains the line {line}")]
fn given_rc_line(world: &RefCell<EngineWorld>, line: String) {
    EngineWorld::append(world.borrow().paths.rc_file(), strip_quotes(&line));
}

#[given("the sudoers file contains the line {line}")]
fn given_sudoers_line(world: &RefCell<EngineWorld>, line: String) {
    EngineWorld::append(world.borrow().paths.sudoers_file(), strip_quotes(&line));
}

#[given("a validator that rejects with {diagnostic}")]
fn given_rejecting_validator(world: &RefCell<EngineWorld>, diagnostic: String) {
    world.borrow_mut().rejection = Some(strip_quotes(&diagnostic).to_owned());
}

#[given("an rc snapshot {stamp} containing {content} modified at {seconds}")]
fn given_rc_snapshot(world: &RefCell<EngineWorld>, stamp: String, content: String, seconds: String) {
    let world = world.borrow();
    EngineWorld::write_snapshot(
        world.paths.rc_file(),
        world.paths.backup_dir(),
        &stamp,
        &content,
        &seconds,
    );
}

#[given("a sudoers snapshot {stamp} containing {content} modified at {seconds}")]
fn given_sudoers_snapshot(
    world: &RefCell<EngineWorld>,
    stamp: String,
    content: String,
    seconds: String,
) {
    let world = world.borrow();
    EngineWorld::write_snapshot(
        world.paths.sudoers_file(),
        world.paths.backup_dir(),
        &stamp,
        &content,
        &seconds,
    );
}

// ---- When steps ----

#[when("the alias {name} is added for {command}")]
fn when_alias_added(world: &RefCell<EngineWorld>, name: String, command: String) {
    world
        .borrow_mut()
        .run(|engine| engine.add_alias(strip_quotes(&name), strip_quotes(&command)));
}

#[when("the alias {name} is removed")]
fn when_alias_removed(world: &RefCell<EngineWorld>, name: String) {
    world
        .borrow_mut()
        .run(|engine| engine.remove_alias(strip_quotes(&name)));
}

#[when("the aliases are listed")]
fn when_aliases_listed(world: &RefCell<EngineWorld>) {
    let mut out = Vec::new();
    world.borrow_mut().run(|engine| engine.list_aliases(&mut out));
    world.borrow_mut().listing = String::from_utf8(out).expect("utf8 listing");
}

#[when("the privilege entry {entry} is added")]
fn when_privilege_added(world: &RefCell<EngineWorld>, entry: String) {
    world
        .borrow_mut()
        .run(|engine| engine.add_privilege_entry(strip_quotes(&entry)));
}

#[when("privilege entries containing {pattern} are removed")]
fn when_privilege_removed(world: &RefCell<EngineWorld>, pattern: String) {
    world
        .borrow_mut()
        .run(|engine| engine.remove_privilege_entry(strip_quotes(&pattern)));
}

#[when("a backup including the rc file is taken")]
fn when_backup_taken(world: &RefCell<EngineWorld>) {
    world.borrow_mut().run(|engine| engine.backup(true));
}

#[when("the export {name} is removed")]
fn when_export_removed(world: &RefCell<EngineWorld>, name: String) {
    world
        .borrow_mut()
        .run(|engine| engine.remove_export(strip_quotes(&name)));
}

#[when("a backup of the sudoers file alone is taken")]
fn when_sudoers_backup_taken(world: &RefCell<EngineWorld>) {
    world.borrow_mut().run(|engine| engine.backup(false));
}

#[when("the sudoers file is restored")]
fn when_sudoers_restored(world: &RefCell<EngineWorld>) {
    world
        .borrow_mut()
        .run(|engine| engine.restore(TargetKind::Privilege));
}

#[when("the rc file is restored")]
fn when_rc_restored(world: &RefCell<EngineWorld>) {
    world
        .borrow_mut()
        .run(|engine| engine.restore(TargetKind::Rc));
}

// ---- Then steps ----

#[then("the operation succeeds")]
fn then_succeeds(world: &RefCell<EngineWorld>) {
    let world = world.borrow();
    let result = world.result.as_ref().expect("an operation should have run");
    assert!(result.is_ok(), "operation should succeed: {result:?}");
}

#[then("the operation fails validation with {diagnostic}")]
fn then_fails_validation(world: &RefCell<EngineWorld>, diagnostic: String) {
    let world = world.borrow();
    match world.result.as_ref().expect("an operation should have run") {
        Err(EngineError::Validation {
            diagnostic: actual, ..
        }) => assert_eq!(actual, strip_quotes(&diagnostic)),
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[then("the listing is {expected}")]
fn then_listing_is(world: &RefCell<EngineWorld>, expected: String) {
    assert_eq!(
        world.borrow().listing,
        format!("{}\n", strip_quotes(&expected))
    );
}

#[then("nothing is listed")]
fn then_nothing_listed(world: &RefCell<EngineWorld>) {
    assert_eq!(world.borrow().listing, "");
}

#[then("the rc file is unchanged")]
fn then_rc_unchanged(world: &RefCell<EngineWorld>) {
    let world = world.borrow();
    assert_eq!(
        fs::read(world.paths.rc_file()).expect("read rc"),
        world.rc_before
    );
}

#[then("the sudoers file is unchanged")]
fn then_sudoers_unchanged(world: &RefCell<EngineWorld>) {
    let world = world.borrow();
    assert_eq!(
        fs::read(world.paths.sudoers_file()).expect("read sudoers"),
        world.sudoers_before
    );
}

#[then("the sudoers file has {count} lines")]
fn then_sudoers_line_count(world: &RefCell<EngineWorld>, count: String) {
    let content = EngineWorld::read(world.borrow().paths.sudoers_file());
    let expected: usize = count.parse().expect("line count");
    assert_eq!(content.lines().count(), expected, "content: {content:?}");
}

#[then("line {number} of the sudoers file is {text}")]
fn then_sudoers_line_is(world: &RefCell<EngineWorld>, number: String, text: String) {
    let content = EngineWorld::read(world.borrow().paths.sudoers_file());
    let index: usize = number.parse().expect("line number");
    let line = content.lines().nth(index - 1).expect("line should exist");
    assert_eq!(line, strip_quotes(&text));
}

#[then("the sudoers file now reads {text}")]
fn then_sudoers_reads(world: &RefCell<EngineWorld>, text: String) {
    let content = EngineWorld::read(world.borrow().paths.sudoers_file());
    assert_eq!(content, format!("{}\n", strip_quotes(&text)));
}

#[then("the rc file now contains {text}")]
fn then_rc_contains(world: &RefCell<EngineWorld>, text: String) {
    let content = EngineWorld::read(world.borrow().paths.rc_file());
    assert!(
        content.contains(strip_quotes(&text)),
        "expected rc file to contain {text}, got {content:?}"
    );
}

#[then("the rc file does not contain {text}")]
fn then_rc_lacks(world: &RefCell<EngineWorld>, text: String) {
    let content = EngineWorld::read(world.borrow().paths.rc_file());
    assert!(
        !content.contains(strip_quotes(&text)),
        "expected rc file not to contain {text}, got {content:?}"
    );
}

// ---- Scenarios ----

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "Removing an absent alias leaves the rc file untouched"
)]
fn removing_absent_alias(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "An added alias can be listed and removed"
)]
fn alias_round_trip(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "A rejected privilege entry leaves the sudoers file untouched"
)]
fn rejected_privilege_entry(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "Removing privilege entries keeps the other lines in order"
)]
fn privilege_removal_preserves_order(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "A backup of the rc file can be restored"
)]
fn rc_backup_round_trip(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "Restore picks the most recently modified snapshot"
)]
fn restore_picks_latest(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "Removing an absent export leaves the rc file untouched"
)]
fn removing_absent_export(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "Removing privilege entries that match nothing leaves the sudoers file untouched"
)]
fn privilege_removal_without_match(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "A sudoers backup is restored through validation"
)]
fn sudoers_backup_round_trip(world: RefCell<EngineWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/mutation_engine.feature",
    name = "A rejected sudoers snapshot leaves the live file untouched"
)]
fn rejected_sudoers_snapshot(world: RefCell<EngineWorld>) {
    drop(world);
}
