//! # End-to-End Checks Against a Real Subject
//!
//! File: harness/tests/subject_e2e.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Exercises the library against an installed container CLI. The checks share
//! one subject and sweep it between steps, so they run as a single ordered
//! test. They are ignored by default:
//!
//! ```sh
//! COMMON_TESTS_SUBJECT=nerdctl cargo test --test subject_e2e -- --ignored
//! ```
//!
use common_tests::common::network::{dial_and_read, get_free_port, http_get_and_assert};
use common_tests::common::process::{self, Command};
use common_tests::common::subject::{assertions, LocalImage};
use common_tests::common::{fs, wait};
use common_tests::core::logging::init_test_logging;
use common_tests::Suite;
use std::time::Duration;

const CONTAINER: &str = "common-tests-e2e";
const INTERVAL: Duration = Duration::from_millis(500);

fn containers_run_and_are_swept(suite: &Suite) {
    let o = suite.option();
    let alpine = suite.image(LocalImage::Default);

    process::run(o, ["run", "-d", "--name", CONTAINER, &alpine, "sleep", "infinity"]);
    assertions::container_should_be_running(o, &[CONTAINER]);
    assertions::file_should_not_exist_in_container(o, CONTAINER, "/tmp/marker");
    process::run(o, ["exec", CONTAINER, "sh", "-c", "echo -n hello > /tmp/marker"]);
    assertions::file_should_exist_in_container(o, CONTAINER, "/tmp/marker", "hello");

    suite.remove_all();
    assertions::container_should_not_exist(o, &[CONTAINER]).unwrap();
}

fn published_port_answers(suite: &Suite) {
    let o = suite.option();
    let port = get_free_port();
    let alpine = suite.image(LocalImage::Default);
    let script = "while true; do echo -n ready | nc -l -p 8080; done";

    process::run(
        o,
        ["run", "-d", "-p", &format!("{port}:8080"), &alpine, "sh", "-c", script],
    );
    dial_and_read("tcp", &format!("127.0.0.1:{port}"), "ready", 20, INTERVAL);
    suite.remove_all();
}

fn nginx_serves_http(suite: &Suite) {
    let o = suite.option();
    let port = get_free_port();
    let nginx = suite.image(LocalImage::Nginx);

    Command::new(o, ["run", "-d", "-p", &format!("{port}:80"), &nginx])
        .with_timeout_in_seconds(120)
        .run();
    http_get_and_assert(&format!("http://localhost:{port}"), 200, 20, INTERVAL);
    suite.remove_all();
}

fn followed_logs_stream(suite: &Suite) {
    let o = suite.option();
    let alpine = suite.image(LocalImage::Default);
    let script = "echo first; sleep 1; echo second; sleep infinity";

    process::run(o, ["run", "-d", "--name", CONTAINER, &alpine, "sh", "-c", script]);
    let mut logs = process::run_without_wait(o, ["logs", "-f", CONTAINER]);
    wait::assert_eventually("followed logs", Duration::from_secs(10), INTERVAL, || {
        logs.out_str().contains("second")
    });
    logs.terminate();
    suite.remove_all();
}

fn build_context_produces_image(suite: &Suite) {
    let o = suite.option();
    let dockerfile = assertions::dummy_dockerfile(&suite.image(LocalImage::Default));
    let context = fs::create_build_context(&dockerfile);

    Command::new(o, ["build", "-t", "common-tests-built", &context.to_string_lossy()])
        .with_timeout_in_seconds(120)
        .run();
    assertions::image_should_exist(o, "common-tests-built");
    std::fs::remove_dir_all(&context).unwrap();

    suite.remove_all();
    assertions::image_should_not_exist(o, "common-tests-built");
}

fn failing_command_is_observed(suite: &Suite) {
    let session = process::run_without_successful_exit(suite.option(), ["inspect", "no-such-thing"]);
    assert_ne!(session.exit_code(), Some(0));
    assert!(!session.err_str().is_empty());
}

#[test]
#[ignore = "requires a container CLI subject; run with --ignored"]
fn shared_suite_against_real_subject() {
    init_test_logging();
    let mut suite = Suite::load().expect("Failed to load suite configuration");
    suite.setup();
    suite.remove_all();

    containers_run_and_are_swept(&suite);
    published_port_answers(&suite);
    nginx_serves_http(&suite);
    followed_logs_stream(&suite);
    build_context_produces_image(&suite);
    failing_command_is_observed(&suite);

    suite.teardown();
    assert!(suite.registry().is_none());
}
