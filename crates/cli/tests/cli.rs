use assert_cmd::Command;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env_remove("BOOKSHELF_ENV")
        .env("BOOKSHELF_CONFIG_DIR", std::env::temp_dir().join("bookshelf-cli-no-config"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = bookshelf().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("settings"));
}

#[test]
fn settings_prints_resolved_configuration() {
    let output = bookshelf()
        .arg("settings")
        .env("BOOKSHELF_SERVER__PORT", "9123")
        .output()
        .unwrap();
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["server"]["port"], 9123);
    assert_eq!(settings["telemetry"]["log_format"], "pretty");
}

#[test]
fn unknown_environment_fails() {
    bookshelf()
        .arg("settings")
        .env("BOOKSHELF_ENV", "moon")
        .assert()
        .failure();
}
