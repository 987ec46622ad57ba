use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join("pipeline").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn papermap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("papermap"));
    cmd.current_dir(repo_root())
        .env_remove("PAPERMAP_LOG")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf-8 stdout")
}

#[test]
fn cli_processes_fixture_file() {
    let input = fixture("chatty_fenced.mmd");
    let out = stdout_of(papermap().args([
        "process",
        "--detail",
        "simple",
        input.to_string_lossy().as_ref(),
    ]));
    assert!(out.starts_with("mindmap\n  root((Attention Is All You Need)):::root\n"));
    assert!(!out.contains("RNN limitations"));
    assert!(out.contains("\nclassDef root "));
}

#[test]
fn cli_reads_stdin_and_falls_back_on_empty_input() {
    let out = stdout_of(papermap().arg("process").write_stdin("   \n"));
    assert!(out.starts_with("mindmap\n  root((Document)):::root\n    Overview:::summary\n"));
}

#[test]
fn cli_stats_reports_json() {
    let input = fixture("multiple_roots.mmd");
    let out = stdout_of(papermap().args([
        "process",
        "--stats",
        "--detail",
        "simple",
        input.to_string_lossy().as_ref(),
    ]));
    let value: Value = serde_json::from_str(&out).expect("stats JSON");
    assert_eq!(value["stats"]["detailLevel"], "simple");
    assert_eq!(value["stats"]["maxDepth"], 3);
    assert_eq!(value["stats"]["normalize"]["reattached"], 2);
    assert!(value["text"].as_str().unwrap().starts_with("mindmap\n"));
}

#[test]
fn cli_stats_fails_on_empty_diagram() {
    papermap()
        .args(["process", "--stats"])
        .write_stdin("no diagram here at all?\n")
        .assert()
        .success();
    papermap()
        .args(["process", "--stats"])
        .write_stdin("")
        .assert()
        .code(1);
}

#[test]
fn cli_filter_uses_max_depth() {
    let out = stdout_of(
        papermap()
            .args(["filter", "--max-depth", "2"])
            .write_stdin("mindmap\n  root((R))\n    A\n      B\n"),
    );
    assert_eq!(out, "mindmap\n  root((R))\n    A\n");
}

#[test]
fn cli_normalize_and_colorize_stages() {
    let out = stdout_of(
        papermap()
            .arg("normalize")
            .write_stdin("mindmap\n  root((A))\n  root((B))\n"),
    );
    assert_eq!(out, "mindmap\n  root((A))\n    (B)\n");

    let colored = stdout_of(papermap().arg("colorize").write_stdin(out));
    assert!(colored.contains("  root((A)):::root\n    (B):::summary\n"));
}

#[test]
fn cli_writes_out_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("out.mmd");
    papermap()
        .args([
            "expand",
            "--detail",
            "detailed",
            "--out",
            out.to_string_lossy().as_ref(),
            fixture("crlf.mmd").to_string_lossy().as_ref(),
        ])
        .assert()
        .success()
        .stdout("");
    let text = fs::read_to_string(&out).expect("read out file");
    assert!(text.starts_with("mindmap\n  root((Windows Line Endings))\n"));
}

#[test]
fn cli_inspect_reports_node_count() {
    let out = stdout_of(
        papermap()
            .arg("inspect")
            .write_stdin("```mermaid\nmindmap\n  root((A))\n    B\n    C\n```\n"),
    );
    let value: Value = serde_json::from_str(&out).expect("inspect JSON");
    assert_eq!(value["nodeCount"], 3);
    assert_eq!(value["maxDepth"], 2);
    assert_eq!(value["report"]["headerFound"], true);
    assert_eq!(value["document"]["nodes"][0]["shape"]["descr"], "A");
}

#[test]
fn cli_prompt_uses_config_file() {
    let config = repo_root().join("fixtures").join("config").join("shallow.yaml");
    let out = stdout_of(
        papermap()
            .args([
                "prompt",
                "--detail",
                "advanced",
                "--config",
                config.to_string_lossy().as_ref(),
            ])
            .write_stdin("Transformers replace recurrence with attention."),
    );
    let value: Value = serde_json::from_str(&out).expect("prompt JSON");
    assert!(value["system"].as_str().unwrap().contains("At most 4 levels"));
    assert!(
        value["user"]
            .as_str()
            .unwrap()
            .ends_with("Transformers replace recurrence with attention.")
    );
}

#[test]
fn cli_rejects_invalid_config() {
    let config = repo_root().join("fixtures").join("config").join("invalid.json");
    let assert = papermap()
        .args(["process", "--config", config.to_string_lossy().as_ref()])
        .write_stdin("mindmap\n  root((A))\n")
        .assert()
        .code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("Invalid pipeline config"), "stderr: {stderr}");
}

#[test]
fn cli_usage_errors_exit_with_two() {
    papermap().args(["--detail", "verbose"]).assert().code(2);
    papermap().arg("--help").assert().code(2);
}
