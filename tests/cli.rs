use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DEMO: &str = r#"digraph demo {
    // first machine
    S01 [label="(ENTRY)Idle"];
    S02 [label="Busy"];
    S01 -> S02 [label="start"];
    S02 -> S01 [label="stop"];

    /* second machine */
    S03 [label="(ENTRY)Blink"];
    S04 [label="Dark"];
    S03 -> S04 [label="500(T2)"];
    S04 -> S03 [label="500(T2)"];
}
"#;

const OUTPUT: [&str; 12] = [
    "Inc/tinyfsm.hpp",
    "Inc/Events.hpp",
    "Inc/fsm_fifo.hpp",
    "Src/fsm_fifo.cpp",
    "Inc/fsm_driver.hpp",
    "Src/fsm_driver.cpp",
    "Inc/user_states.hpp",
    "Src/user_states.cpp",
    "Inc/FSM1.hpp",
    "Src/FSM1.cpp",
    "Inc/FSM2.hpp",
    "Src/FSM2.cpp",
];

fn dot_fsm() -> Command {
    let mut cmd = Command::cargo_bin("dot-fsm").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("DOT_FSM_FIFO_SIZE");
    cmd
}

fn diagram(dir: &TempDir, text: &str) -> std::path::PathBuf {
    let path = dir.path().join("machine.dot");
    fs::write(&path, text).unwrap();
    path
}

fn read(out: &Path, file: &str) -> String {
    fs::read_to_string(out.join(file)).unwrap()
}

#[test]
fn test_generates_full_tree() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().success();

    for file in OUTPUT {
        assert!(out.join(file).is_file(), "missing {file}");
    }
    let driver = read(&out, "Src/fsm_driver.cpp");
    assert!(driver.contains("using my_fsm = tinyfsm::FsmList<FSM1, FSM2>;"));
    for event in ["START_EVENT", "STOP_EVENT", "TIMER_2_EVENT"] {
        assert!(driver.contains(&format!("my_fsm::dispatch({event}_SINGLETON)")));
    }
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    dot_fsm()
        .arg(dir.path().join("nope.dot"))
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("input file not found"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_arguments_is_usage_error() {
    dot_fsm().assert().code(2);
}

#[test]
fn test_bad_label_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let input = diagram(
        &dir,
        r#"digraph { A [label="(ENTRY)A"]; A -> B [label="ok"]; B -> A [label="@bad"] }"#,
    );
    let out = dir.path().join("out");

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("@bad"));
    assert!(!out.exists());
}

#[test]
fn test_syntax_error_reports_position() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, "digraph {\n  A -> ;\n}\n");

    dot_fsm()
        .arg(&input)
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_overlap_needs_opt_in() {
    let dir = TempDir::new().unwrap();
    let input = diagram(
        &dir,
        r#"digraph {
            A [label="(ENTRY)A"]; B [label="(ENTRY)B"];
            A -> C [label="go"]; B -> C [label="go"];
        }"#,
    );
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().code(1);
    dot_fsm()
        .arg(&input)
        .arg(&out)
        .arg("--allow-overlap")
        .assert()
        .success()
        .stderr(predicate::str::contains("overlap"));
    assert!(read(&out, "Src/FSM1.cpp").contains("class FSM1_C "));
    assert!(read(&out, "Src/FSM2.cpp").contains("class FSM2_C "));
}

#[test]
fn test_stub_mode_has_no_timers() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).arg("--stubs").assert().success();

    for file in OUTPUT.iter().filter(|f| !f.ends_with("tinyfsm.hpp")) {
        let text = read(&out, file);
        assert!(!text.contains("start_timer"), "{file}");
        assert!(!text.contains("stop_timer"), "{file}");
    }
    assert!(read(&out, "Inc/Events.hpp").contains("struct TIMER_2_EVENT : BASE_EVENT {};"));
}

#[test]
fn test_output_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    dot_fsm().arg(&input).arg(&first).assert().success();
    dot_fsm().arg(&input).arg(&second).assert().success();

    for file in OUTPUT {
        assert_eq!(fs::read(first.join(file)).unwrap(), fs::read(second.join(file)).unwrap(), "{file}");
    }
}

#[test]
fn test_no_entries() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, r#"digraph { A -> B [label="go"] }"#);
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().success();

    assert!(read(&out, "Src/fsm_driver.cpp").contains("using my_fsm = tinyfsm::FsmList<>;"));
    assert!(read(&out, "Inc/Events.hpp").contains("struct GO_EVENT : BASE_EVENT {};"));
    assert!(!out.join("Inc/FSM1.hpp").exists());
}

#[test]
fn test_parallel_edges_each_get_a_reaction() {
    let dir = TempDir::new().unwrap();
    let input = diagram(
        &dir,
        r#"digraph { A [label="(ENTRY)A"]; A -> B [label="X"]; A -> B [label="Y"] }"#,
    );
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().success();

    let source = read(&out, "Src/FSM1.cpp");
    assert!(source.contains("void react(X_EVENT const &) override {\n        transit<FSM1_B>();"));
    assert!(source.contains("void react(Y_EVENT const &) override {\n        transit<FSM1_B>();"));
}

#[test]
fn test_timer_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().success();

    let machine = read(&out, "Src/FSM2.cpp");
    assert!(machine.contains("start_timer(TIMER_2, 500);"));
    assert!(machine.contains("void react(TIMER_2_EVENT const &) override {\n        stop_timer(TIMER_2);"));
    assert!(read(&out, "Inc/Events.hpp").contains("    TIMER_2 = 0,\n    NUM_TIMERS = 1\n"));
    assert!(read(&out, "Inc/fsm_fifo.hpp").contains("TIMER_2_EVENT_INDEX"));
}

#[test]
fn test_fifo_options() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let out = dir.path().join("out");

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .arg("--irq-guard")
        .env("DOT_FSM_FIFO_SIZE", "32")
        .assert()
        .success();

    assert!(read(&out, "Inc/fsm_fifo.hpp").contains("#define FIFO_SIZE 32\n"));
    assert!(read(&out, "Src/fsm_fifo.cpp").contains("__disable_irq();"));

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .args(["--fifo-size", "1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("fifo capacity"));
}

#[test]
fn test_preserve_user_source() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let out = dir.path().join("out");

    dot_fsm().arg(&input).arg(&out).assert().success();
    fs::write(out.join("Src/user_states.cpp"), "// hand written\n").unwrap();

    dot_fsm().arg(&input).arg(&out).arg("--preserve-user").assert().success();
    assert_eq!(read(&out, "Src/user_states.cpp"), "// hand written\n");

    dot_fsm().arg(&input).arg(&out).assert().success();
    assert!(read(&out, "Src/user_states.cpp").contains("void state_S01(void) {"));
}

#[test]
fn test_custom_runtime_header() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, DEMO);
    let runtime = dir.path().join("runtime.hpp");
    fs::write(&runtime, "// upstream tinyfsm\n").unwrap();
    let out = dir.path().join("out");

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .arg("--runtime-header")
        .arg(&runtime)
        .assert()
        .success();

    assert_eq!(read(&out, "Inc/tinyfsm.hpp"), "// upstream tinyfsm\n");
}

#[test]
fn test_padded_timer_ids_are_distinct_timers() {
    let dir = TempDir::new().unwrap();
    let input = diagram(
        &dir,
        r#"digraph { A [label="(ENTRY)A"]; A -> B [label="500(T01)"]; A -> C [label="9(T1)"] }"#,
    );
    let out = dir.path().join("out");

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("ambiguous").not());

    let source = read(&out, "Src/FSM1.cpp");
    assert!(source.contains("start_timer(TIMER_01, 500);\n        start_timer(TIMER_1, 9);"));
    assert!(source.contains("void react(TIMER_01_EVENT const &) override {"));
    assert!(source.contains("void react(TIMER_1_EVENT const &) override {"));
    assert!(source.contains("transit<FSM1_C>();"));
    assert!(read(&out, "Inc/Events.hpp").contains("    TIMER_01 = 0,\n    TIMER_1 = 1,\n    NUM_TIMERS = 2\n"));
}

#[test]
fn test_label_clashing_with_base_event_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, r#"digraph { A [label="(ENTRY)A"]; A -> B [label="base"] }"#);
    let out = dir.path().join("out");

    dot_fsm()
        .arg(&input)
        .arg(&out)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid event label `base`"));
    assert!(!out.exists());
}

#[test]
fn test_error_is_reported_once_without_colours() {
    let dir = TempDir::new().unwrap();
    let input = diagram(&dir, r#"digraph { A -> B [label="@bad"] }"#);

    let output = dot_fsm()
        .arg(&input)
        .arg(dir.path().join("out"))
        .output()
        .unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr.matches("@bad").count(), 1, "{stderr}");
    assert!(!stderr.contains('\x1b'), "{stderr}");
}

#[test]
fn test_rerun_with_fewer_machines_removes_old_ones() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let input = diagram(&dir, DEMO);
    dot_fsm().arg(&input).arg(&out).assert().success();
    assert!(out.join("Src/FSM2.cpp").is_file());

    let input = diagram(&dir, r#"digraph { A [label="(ENTRY)A"]; A -> B [label="go"] }"#);
    dot_fsm().arg(&input).arg(&out).assert().success();
    assert!(out.join("Src/FSM1.cpp").is_file());
    assert!(!out.join("Inc/FSM2.hpp").exists());
    assert!(!out.join("Src/FSM2.cpp").exists());
}
