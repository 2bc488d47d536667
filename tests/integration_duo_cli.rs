// Drives the compiled binary in --duo mode over plain pipes.

use assert_cmd::Command;

#[test]
fn duo_session_prints_final_stats() {
    let output = Command::cargo_bin("wavequiz")
        .unwrap()
        .args(["--duo", "--seed", "1"])
        .write_stdin("play\n1\nscore\nquit\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("DuoTrivia ready."), "{stdout}");
    assert!(stdout.contains("  1) "), "{stdout}");
    assert!(stdout.contains("Questions: 1"), "{stdout}");
    assert!(stdout.contains("Final stats: Score: "), "{stdout}");
    assert!(stdout.contains("Accuracy trend: "), "{stdout}");
}

#[test]
fn duo_session_without_answers_has_no_trend() {
    let output = Command::cargo_bin("wavequiz")
        .unwrap()
        .arg("--duo")
        .write_stdin("help\nexit\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Final stats: Score: 0 | Streak: 0 | Questions: 0 | Accuracy: 0%"));
    assert!(!stdout.contains("Accuracy trend"));
}

#[test]
fn arena_refuses_piped_stdin() {
    Command::cargo_bin("wavequiz")
        .unwrap()
        .write_stdin("")
        .assert()
        .failure();
}
