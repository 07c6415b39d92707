//! End-to-end dispatch through `PluginManager` with plugin directories on
//! disk and test plugins registered as built-ins.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use deskpet::menu::{MenuCommand, MenuEntry, MenuSection};
use deskpet::pet::PetWindow;
use deskpet::plugin::{
    ActionOutput, CodeUnit, DiskSource, DispatchError, FailureReason, HostContext, InitPlugin,
    LastingPlugin, LoadError, LocalConfigError, MenuPlugin, Plugin, PluginDescriptor,
    PluginError, PluginInstance, PluginLocalConfig, PluginManager, PluginRegistry, PluginRole,
    PluginSource, PluginState,
};
use log::{Level, LevelFilter, Log, Metadata, Record};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// test plugins

struct Clock;
impl Plugin for Clock {}
impl LastingPlugin for Clock {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        host.set_title("tick");
        Ok(())
    }
}

fn clock(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(Clock)))
}

/// Writes the directory it was created from into the title
struct Tagger(String);
impl Plugin for Tagger {}
impl LastingPlugin for Tagger {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        host.set_title(&self.0);
        Ok(())
    }
}

fn tagger(d: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    let tag = d.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    Ok(PluginInstance::Lasting(Box::new(Tagger(tag))))
}

/// Shifts x one decimal place and appends a digit, recording call order
struct Step(i32);
impl Plugin for Step {}
impl LastingPlugin for Step {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        let (x, y) = host.position();
        host.move_to(x * 10 + self.0, y);
        Ok(())
    }
}

fn step_one(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(Step(1))))
}

fn step_two(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(Step(2))))
}

struct Panicker;
impl Plugin for Panicker {}
impl LastingPlugin for Panicker {
    fn update(&mut self, _host: &mut dyn HostContext) -> Result<(), PluginError> {
        panic!("boom");
    }
}

fn panicker(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(Panicker)))
}

/// Init plugin with a `hello` entry that nudges the window right
struct Greeter;
impl Plugin for Greeter {}
impl InitPlugin for Greeter {
    fn has_entry(&self, entry: &str) -> bool {
        matches!(entry, "hello" | "grumble")
    }

    fn run_entry(&mut self, entry: &str, host: &mut dyn HostContext) -> Result<(), PluginError> {
        match entry {
            "hello" => {
                let (x, y) = host.position();
                host.move_to(x + 1, y);
                host.set_title("greeted");
                Ok(())
            }
            "grumble" => Err(PluginError::Failed("not today".into())),
            other => Err(PluginError::NoSuchAction(other.into())),
        }
    }
}

fn greeter(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Init(Box::new(Greeter)))
}

/// Menu plugin with its own menu hook
struct Custom;
impl Plugin for Custom {}
impl MenuPlugin for Custom {
    fn has_action(&self, function_name: &str) -> bool {
        function_name == "say"
    }

    fn execute(
        &mut self,
        function_name: &str,
        _host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        match function_name {
            "say" => Ok(ActionOutput::Message(parameter.to_string())),
            other => Err(PluginError::NoSuchAction(other.into())),
        }
    }

    fn create_custom_menu(&mut self, _host: &mut dyn HostContext, menu: &mut MenuSection) -> bool {
        menu.action("Custom item", "", "say", "custom");
        true
    }
}

fn custom(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(Custom)))
}

/// Menu plugin relying on `[[menu]]` entries
struct Plain;
impl Plugin for Plain {}
impl MenuPlugin for Plain {
    fn has_action(&self, function_name: &str) -> bool {
        function_name == "say"
    }

    fn execute(
        &mut self,
        _function_name: &str,
        _host: &mut dyn HostContext,
        parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        Ok(ActionOutput::Message(parameter.to_uppercase()))
    }
}

fn plain(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(Plain)))
}

/// Menu plugin whose menu hook panics
struct BrokenMenu;
impl Plugin for BrokenMenu {}
impl MenuPlugin for BrokenMenu {
    fn has_action(&self, _function_name: &str) -> bool {
        false
    }

    fn execute(
        &mut self,
        function_name: &str,
        _host: &mut dyn HostContext,
        _parameter: &str,
    ) -> Result<ActionOutput, PluginError> {
        Err(PluginError::NoSuchAction(function_name.into()))
    }

    fn create_custom_menu(&mut self, _host: &mut dyn HostContext, _menu: &mut MenuSection) -> bool {
        panic!("no menu today");
    }
}

fn broken_menu(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Menu(Box::new(BrokenMenu)))
}

struct Refuser;
impl Plugin for Refuser {
    fn initialize(&mut self) -> bool {
        false
    }
}
impl LastingPlugin for Refuser {
    fn update(&mut self, host: &mut dyn HostContext) -> Result<(), PluginError> {
        host.set_title("refuser ran");
        Ok(())
    }
}

fn refuser(_: &PluginDescriptor, _: &PluginLocalConfig) -> Result<PluginInstance, PluginError> {
    Ok(PluginInstance::Lasting(Box::new(Refuser)))
}

// ---------------------------------------------------------------------------
// fixture

/// Disk source that counts how often code is loaded
struct CountingSource {
    inner: DiskSource,
    loads: Rc<Cell<usize>>,
}

impl PluginSource for CountingSource {
    fn load(&mut self, descriptor: &PluginDescriptor) -> Result<CodeUnit, LoadError> {
        self.loads.set(self.loads.get() + 1);
        self.inner.load(descriptor)
    }

    fn local_config(
        &mut self,
        descriptor: &PluginDescriptor,
    ) -> Result<PluginLocalConfig, LocalConfigError> {
        self.inner.local_config(descriptor)
    }
}

struct Fixture {
    dir: TempDir,
    loads: Rc<Cell<usize>>,
    manager: PluginManager,
    pet: PetWindow,
}

impl Fixture {
    fn new() -> Self {
        let mut registry = PluginRegistry::new();
        registry
            .register("clock", clock)
            .register("dup", tagger)
            .register("one", step_one)
            .register("two", step_two)
            .register("panicker", panicker)
            .register("greeter", greeter)
            .register("custom", custom)
            .register("plain", plain)
            .register("refuser", refuser)
            .register("broken_menu", broken_menu);

        let loads = Rc::new(Cell::new(0));
        let source = CountingSource {
            inner: DiskSource::new(registry).with_search_dirs(Vec::new()),
            loads: loads.clone(),
        };

        Self {
            dir: TempDir::new().unwrap(),
            loads,
            manager: PluginManager::new(source),
            pet: PetWindow::headless(),
        }
    }

    /// Create `<tmp>/<dir>/config.toml` and return the directory
    fn plugin_dir(&self, dir: &str, local: &str) -> PathBuf {
        let path = self.dir.path().join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("config.toml"), local).unwrap();
        path
    }

    fn descriptor(&self, name: &str, role: PluginRole) -> PluginDescriptor {
        PluginDescriptor::new(name, self.plugin_dir(name, "[plugin]\n"), role)
    }
}

// ---------------------------------------------------------------------------
// log capture

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Keeps warnings and errors of the calling thread
struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Warn
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            CAPTURED.with(|c| c.borrow_mut().push(format!("{} {}", record.level(), record.args())));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

fn capture_logs() {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Debug);
    CAPTURED.with(|c| c.borrow_mut().clear());
}

fn captured() -> Vec<String> {
    CAPTURED.with(|c| c.borrow().clone())
}

fn state_of(fx: &Fixture, descriptors: &[PluginDescriptor], index: usize) -> PluginState {
    fx.manager.report(descriptors)[index].state.clone()
}

// ---------------------------------------------------------------------------
// scenarios

#[test]
fn test_lasting_clock_sets_title() {
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("clock", PluginRole::Lasting)];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.title(), "tick");
    assert_eq!(state_of(&fx, &descriptors, 0), PluginState::Ready(PluginRole::Lasting));
}

#[test]
fn test_init_entry_runs_once() {
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("greeter", PluginRole::Init).with_function("hello")];
    fx.pet.move_to(0, 0);

    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.title(), "greeted");
    assert_eq!(fx.pet.position(), (1, 0));

    // second bootstrap pass is a no-op
    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1, 0));
    assert_eq!(fx.loads.get(), 1);
}

#[test]
fn test_prewarm_does_not_run_init_entries() {
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("greeter", PluginRole::Init).with_function("hello"),
        fx.descriptor("clock", PluginRole::Lasting),
    ];
    fx.pet.move_to(0, 0);

    assert_eq!(fx.manager.prewarm(&descriptors), 2);
    assert_eq!(fx.pet.position(), (0, 0));
    assert_eq!(fx.loads.get(), 2);

    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1, 0));
    assert_eq!(fx.loads.get(), 2);
}

#[test]
fn test_duplicate_name_first_wins() {
    let mut fx = Fixture::new();
    let first = PluginDescriptor::new("dup", fx.plugin_dir("first", "[plugin]\n"), PluginRole::Lasting);
    let second = PluginDescriptor::new("dup", fx.plugin_dir("second", "[plugin]\n"), PluginRole::Lasting);
    let descriptors = vec![first, second];

    for _ in 0..3 {
        fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
        assert_eq!(fx.pet.title(), "first");
    }
    assert_eq!(fx.loads.get(), 1);

    let report = fx.manager.report(&descriptors);
    assert_eq!(report[0].state, PluginState::Ready(PluginRole::Lasting));
    assert_eq!(report[1].state, PluginState::Duplicate);
}

#[test]
fn test_unavailable_plugin_resolved_once() {
    let mut fx = Fixture::new();
    let unknown = fx.descriptor("ghost", PluginRole::Lasting);
    let missing_dir = PluginDescriptor::new(
        "clock",
        fx.dir.path().join("not-there"),
        PluginRole::Lasting,
    );
    let descriptors = vec![unknown, missing_dir];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.loads.get(), 2);
    assert_eq!(fx.pet.title(), "DeskPet");

    assert!(matches!(
        fx.manager.failure("ghost"),
        Some(FailureReason::Load(LoadError::NotFound { .. }))
    ));
    assert!(matches!(
        fx.manager.failure("clock"),
        Some(FailureReason::Load(LoadError::MissingDirectory(_)))
    ));
    assert!(matches!(
        state_of(&fx, &descriptors, 0),
        PluginState::Failed { category: "load", .. }
    ));
}

#[test]
fn test_malformed_local_config_is_a_config_failure() {
    let mut fx = Fixture::new();
    let d = PluginDescriptor::new("clock", fx.plugin_dir("clock", "[plugin\n"), PluginRole::Lasting);
    let descriptors = vec![d];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert!(matches!(fx.manager.failure("clock"), Some(FailureReason::Config(_))));
    assert_eq!(fx.pet.title(), "DeskPet");
}

#[test]
fn test_initialize_false_blocks_plugin() {
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("refuser", PluginRole::Lasting)];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.title(), "DeskPet");
    assert_eq!(fx.loads.get(), 1);
    assert!(matches!(fx.manager.failure("refuser"), Some(FailureReason::InitializeRejected)));
}

#[test]
fn test_custom_menu_suppresses_declarative_entries() {
    let mut fx = Fixture::new();
    let entries = r#"
[plugin]
plugin_name = "Menu plugin"
icon = "STAR"

[[menu]]
menu_name = "Declarative item"
menu_parameter = "hi"
function_name = "say"
"#;
    let descriptors = vec![
        PluginDescriptor::new("custom", fx.plugin_dir("custom", entries), PluginRole::Menu),
        PluginDescriptor::new("plain", fx.plugin_dir("plain", entries), PluginRole::Menu),
    ];

    let sections = fx.manager.menu_sections(&descriptors, &mut fx.pet);
    assert_eq!(sections.len(), 2);

    let labels = |section: &MenuSection| -> Vec<String> {
        section
            .entries()
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Item(item) => Some(item.label.clone()),
                _ => None,
            })
            .collect()
    };
    assert_eq!(labels(&sections[0]), vec!["Custom item"]);
    assert_eq!(labels(&sections[1]), vec!["Declarative item"]);
    assert_eq!(sections[1].icon(), "STAR");

    // the declarative item dispatches to its own plugin
    let MenuEntry::Item(item) = &sections[1].entries()[0] else {
        panic!("expected an item");
    };
    let MenuCommand::Plugin { plugin, function, parameter } = &item.command else {
        panic!("expected a plugin command");
    };
    assert_eq!(plugin, "plain");
    let output = fx
        .manager
        .dispatch_menu(&descriptors[1], function, &mut fx.pet, parameter)
        .unwrap();
    assert_eq!(output, ActionOutput::Message("HI".into()));
}

#[test]
fn test_menu_dispatch_errors() {
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("custom", PluginRole::Menu),
        // declared menu, provides lasting
        fx.descriptor("clock", PluginRole::Menu),
    ];

    let err = fx
        .manager
        .dispatch_menu(&descriptors[0], "dance", &mut fx.pet, "")
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoSuchAction { ref function, .. } if function == "dance"));

    let err = fx
        .manager
        .dispatch_menu(&descriptors[1], "say", &mut fx.pet, "")
        .unwrap_err();
    assert!(matches!(err, DispatchError::RoleMismatch(_)));
    assert_eq!(
        state_of(&fx, &descriptors, 1),
        PluginState::RoleMismatch { provided: PluginRole::Lasting }
    );

    let disabled = descriptors[0].clone().disabled();
    assert!(matches!(
        fx.manager.dispatch_menu(&disabled, "say", &mut fx.pet, "x"),
        Err(DispatchError::Disabled(_))
    ));
}

#[test]
fn test_disable_takes_effect_next_dispatch() {
    let mut fx = Fixture::new();
    let mut descriptors = vec![fx.descriptor("one", PluginRole::Lasting)];
    fx.pet.move_to(0, 0);

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1, 0));

    descriptors[0].enabled = false;
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1, 0));
    assert_eq!(state_of(&fx, &descriptors, 0), PluginState::Disabled);

    // re-enabled: the cached instance is used again
    descriptors[0].enabled = true;
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (11, 0));
    assert_eq!(fx.loads.get(), 1);
}

#[test]
fn test_lasting_order_follows_configuration() {
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("one", PluginRole::Lasting),
        fx.descriptor("two", PluginRole::Lasting),
    ];
    fx.pet.move_to(0, 0);

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (12, 0));
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1212, 0));
}

#[test]
fn test_panicking_update_is_quarantined() {
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("panicker", PluginRole::Lasting),
        fx.descriptor("one", PluginRole::Lasting),
    ];
    fx.pet.move_to(0, 0);

    // the plugin after the failing one still runs this frame
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (1, 0));
    assert!(matches!(
        fx.manager.failure("panicker"),
        Some(FailureReason::UpdateFailed(PluginError::Panicked(_)))
    ));

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.position(), (11, 0));
    assert_eq!(fx.loads.get(), 2);
    assert!(matches!(
        state_of(&fx, &descriptors, 0),
        PluginState::Failed { category: "invocation", .. }
    ));
}

#[test]
fn test_init_missing_entry_point() {
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("greeter", PluginRole::Init).with_function("wave"),
    ];

    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    assert!(matches!(
        fx.manager.failure("greeter"),
        Some(FailureReason::MissingEntry(entry)) if entry == "wave"
    ));
    assert_eq!(fx.pet.title(), "DeskPet");
}

#[test]
fn test_failing_init_entry_marks_plugin_failed() {
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("greeter", PluginRole::Init).with_function("grumble")];

    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    assert!(matches!(
        fx.manager.failure("greeter"),
        Some(FailureReason::EntryFailed(PluginError::Failed(_)))
    ));

    fx.manager.dispatch_init(&descriptors, &mut fx.pet);
    assert_eq!(fx.loads.get(), 1);
}

#[test]
fn test_invalid_descriptors_skipped() {
    let mut fx = Fixture::new();
    let mut nameless = fx.descriptor("clock", PluginRole::Lasting);
    nameless.name = String::new();
    let unknown_role = fx.descriptor("one", PluginRole::Unknown);
    let descriptors = vec![nameless, unknown_role, fx.descriptor("clock", PluginRole::Lasting)];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    assert_eq!(fx.pet.title(), "tick");
    assert_eq!(fx.loads.get(), 1);

    let report = fx.manager.report(&descriptors);
    assert!(matches!(report[0].state, PluginState::Invalid(_)));
    assert!(matches!(report[1].state, PluginState::Invalid(_)));
}

#[test]
fn test_load_failure_logged_once() {
    capture_logs();
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("ghost", PluginRole::Lasting)];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    fx.manager.prewarm(&descriptors);

    let lines = captured();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("ghost"));
}

#[test]
fn test_panicking_update_logged_once() {
    capture_logs();
    let mut fx = Fixture::new();
    let descriptors = vec![fx.descriptor("panicker", PluginRole::Lasting)];

    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);
    fx.manager.dispatch_lasting(&descriptors, &mut fx.pet);

    let lines = captured();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].starts_with("ERROR"));
    assert!(lines[0].contains("panicker") && lines[0].contains("boom"));
}

#[test]
fn test_failing_menu_hook_logged_once() {
    capture_logs();
    let mut fx = Fixture::new();
    let descriptors = vec![
        fx.descriptor("broken_menu", PluginRole::Menu),
        fx.descriptor("custom", PluginRole::Menu),
    ];

    for _ in 0..3 {
        let sections = fx.manager.menu_sections(&descriptors, &mut fx.pet);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].plugin(), "custom");
    }

    let lines = captured();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("broken_menu") && lines[0].contains("no menu today"));
}
