//! Process-termination tests.
//!
//! Each case re-runs this test binary as a child process with the case name
//! in the environment and checks how the child exited.

use dual_core_threads::{HostPlatform, PoolConfig, Thread, WorkerPool};
use std::process::{Command, ExitStatus};

const CASE_VAR: &str = "DUAL_CORE_THREADS_FATAL_CASE";

fn run_case(case: &str) -> ExitStatus {
    let exe = std::env::current_exe().expect("test binary path");
    Command::new(exe)
        .args(["--exact", "child_entry", "--nocapture", "--test-threads=1"])
        .env(CASE_VAR, case)
        .status()
        .expect("failed to run child")
}

#[cfg(unix)]
fn assert_aborted(status: ExitStatus) {
    use std::os::unix::process::ExitStatusExt;
    assert_eq!(status.signal(), Some(6), "expected SIGABRT, got {:?}", status);
}

#[cfg(not(unix))]
fn assert_aborted(status: ExitStatus) {
    assert!(!status.success(), "child survived: {:?}", status);
}

/// Body of the child process. A no-op when run as a normal test.
#[test]
fn child_entry() {
    let Ok(case) = std::env::var(CASE_VAR) else {
        return;
    };

    match case.as_str() {
        "clean" => {
            let mut t = Thread::spawn(|| {});
            t.join().unwrap();
        }
        "drop-joinable" => {
            let _t = Thread::spawn(|| {});
        }
        "task-panics" => {
            let mut t = Thread::spawn(|| panic!("task failure"));
            let _ = t.join();
            t.detach().ok();
        }
        "second-pool-same-core" => {
            static SECOND: WorkerPool<HostPlatform> = WorkerPool::new(PoolConfig::DEFAULT);

            let mut t = Thread::spawn(|| {});
            t.join().unwrap();
            let mut t = Thread::spawn_on(&SECOND, || {});
            let _ = t.join();
            t.detach().ok();
        }
        other => panic!("unknown case {}", other),
    }

    // Only reached if nothing above terminated the process.
    std::process::exit(0);
}

#[test]
fn clean_lifecycle_exits_normally() {
    assert!(run_case("clean").success());
}

#[test]
fn dropping_joinable_handle_aborts() {
    assert_aborted(run_case("drop-joinable"));
}

#[test]
fn panicking_task_aborts() {
    assert_aborted(run_case("task-panics"));
}

#[test]
fn second_pool_on_started_core_aborts() {
    assert_aborted(run_case("second-pool-same-core"));
}
