use assert_cmd::Command;

// The TUI needs a tty; without one the binary must fail cleanly instead of
// corrupting the terminal. Help and version never need a tty.

#[test]
fn help_prints_without_a_tty() {
    Command::cargo_bin("heliotype")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn version_prints_without_a_tty() {
    Command::cargo_bin("heliotype")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn refuses_to_run_without_a_tty() {
    Command::cargo_bin("heliotype").unwrap().assert().failure();
}
