use std::process::Command;

fn cmdr() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cmdr"))
}

#[test]
fn help_lists_every_flag() {
    let out = cmdr()
        .arg("--help")
        .output()
        .expect("failed to run cmdr --help");
    assert!(
        out.status.success(),
        "cmdr --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    for flag in [
        "-h, --help",
        "-V, --version",
        "-v, --verbose",
        "-r, --required <arg>",
        "-o, --optional [arg]",
    ] {
        assert!(
            stdout.contains(flag),
            "`{flag}` missing from help output:\n{stdout}"
        );
    }
    assert!(
        stdout.contains("Usage: cmdr [options] [ARG1 [ARG2 [ARG3]]]"),
        "unexpected usage line:\n{stdout}"
    );
}

#[test]
fn version_prints_the_package_version() {
    let out = cmdr()
        .arg("--version")
        .output()
        .expect("failed to run cmdr --version");
    assert!(
        out.status.success(),
        "cmdr --version failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim(), env!("CARGO_PKG_VERSION"));
}

#[test]
fn reports_flags_and_positionals() {
    let out = cmdr()
        .args(["-v", "-r", "X", "extra1", "extra2"])
        .output()
        .expect("failed to run cmdr");
    assert!(
        out.status.success(),
        "cmdr failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Additional args:"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("  - 'extra1'"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("  - 'extra2'"), "unexpected output:\n{stdout}");
    assert!(stdout.contains("Required is: X"), "unexpected output:\n{stdout}");
    assert!(
        stdout.contains("Verbose status is enabled"),
        "unexpected output:\n{stdout}"
    );
}

#[test]
fn no_arguments_reports_defaults() {
    let out = cmdr().output().expect("failed to run cmdr");
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("No additional args"), "unexpected output:\n{stdout}");
    assert!(
        stdout.contains("Verbose status is disabled"),
        "unexpected output:\n{stdout}"
    );
}

#[test]
fn optional_callback_reports_both_shapes() {
    let out = cmdr().arg("-o").output().expect("failed to run cmdr -o");
    assert!(
        String::from_utf8_lossy(&out.stdout).contains("Optional: enabled"),
        "unexpected output:\n{}",
        String::from_utf8_lossy(&out.stdout)
    );

    let out = cmdr()
        .args(["-o", "val"])
        .output()
        .expect("failed to run cmdr -o val");
    assert!(
        String::from_utf8_lossy(&out.stdout).contains("Optional: val"),
        "unexpected output:\n{}",
        String::from_utf8_lossy(&out.stdout)
    );
}

#[test]
fn missing_required_value_shows_usage() {
    let out = cmdr().arg("-r").output().expect("failed to run cmdr -r");
    assert!(!out.status.success(), "trailing -r unexpectedly succeeded");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Usage: cmdr"),
        "usage missing from stderr:\n{stderr}"
    );
    assert!(
        stderr.contains("missing value for `-r`"),
        "error missing from stderr:\n{stderr}"
    );
}

#[test]
fn too_many_positionals_trip_the_caller_limit() {
    let out = cmdr()
        .args(["one", "two", "three", "four"])
        .output()
        .expect("failed to run cmdr");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Too many command line arguments were specified"),
        "limit message missing from stderr:\n{stderr}"
    );
    assert!(
        stderr.contains("Usage: cmdr"),
        "usage missing from stderr:\n{stderr}"
    );
}
