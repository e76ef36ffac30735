use std::fs;
use std::process::Command;

fn clusterforce() -> Command {
    Command::new(env!("CARGO_BIN_EXE_clusterforce"))
}

#[test]
fn lays_out_fixture_and_writes_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("layout.json");

    let status = clusterforce()
        .args([
            "layout",
            "--input",
            "tests/fixtures/two_clusters.json",
            "--output",
            output.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to execute clusterforce");

    assert!(status.success(), "clusterforce exited with error");

    let text = fs::read_to_string(&output).expect("Failed to read layout");
    let layout: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(layout["state"], "stopped");
    assert_eq!(layout["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(layout["clusters"][0]["cluster"], "A");
    assert_eq!(layout["clusters"][1]["size"], 2);
    assert!(layout["ticks"].as_u64().unwrap() > 0);
}

#[test]
fn config_file_changes_the_cooling_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("layout.yaml");

    let status = clusterforce()
        .args([
            "layout",
            "-i",
            "tests/fixtures/linked.yaml",
            "-o",
            output.to_str().unwrap(),
            "--config",
            "tests/fixtures/config.yaml",
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let layout: serde_yaml::Value = serde_yaml::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    // ln(0.001) / ln(0.95) rounded up
    assert_eq!(layout["ticks"].as_u64(), Some(135));
}

#[test]
fn frames_streams_one_line_per_tick() {
    let out = clusterforce()
        .args([
            "frames",
            "-i",
            "tests/fixtures/linked.yaml",
            "--max-ticks",
            "25",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let frames: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(frames.len(), 25);
    assert_eq!(frames[0]["tick"], 1);
    assert_eq!(frames[24]["tick"], 25);
    assert_eq!(frames[0]["links"].as_array().unwrap().len(), 3);
}

#[test]
fn check_rejects_dangling_link() {
    let out = clusterforce()
        .args(["check", "-i", "tests/fixtures/invalid_link.json"])
        .output()
        .unwrap();

    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(
        stderr.contains("link 1 references unknown node '99'"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn check_summarizes_valid_dataset() {
    let out = clusterforce()
        .args(["check", "-i", "tests/fixtures/linked.yaml"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("4 nodes, 3 links, 2 clusters"), "{stdout}");
}

#[test]
fn unsupported_input_format_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("graph.toml");
    fs::write(&input, "nodes = []").unwrap();

    let out = clusterforce()
        .args(["check", "-i", input.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("unsupported format: toml"));
}

#[test]
fn frames_with_zero_max_ticks_writes_nothing() {
    let out = clusterforce()
        .args([
            "frames",
            "-i",
            "tests/fixtures/linked.yaml",
            "--max-ticks",
            "0",
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    assert!(out.stdout.is_empty(), "unexpected frames: {:?}", out.stdout);
}

#[test]
fn check_leaves_noise_out_of_cluster_count() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("noise.yaml");
    fs::write(&config, "cluster:\n  noise_label: Unlabelled\n").unwrap();
    let input = dir.path().join("graph.yaml");
    fs::write(
        &input,
        "nodes:\n  - {id: a, cluster: Unlabelled}\n  - {id: b, cluster: x}\n  - {id: c, cluster: y}\n",
    )
    .unwrap();

    let out = clusterforce()
        .args([
            "check",
            "-i",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("3 nodes, 0 links, 2 clusters"), "{stdout}");
}

#[test]
fn layout_rejects_a_config_that_never_cools() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("frozen.json");
    fs::write(&config, r#"{"simulation": {"alpha_decay": 0}}"#).unwrap();
    let output = dir.path().join("layout.json");

    let out = clusterforce()
        .args([
            "layout",
            "-i",
            "tests/fixtures/two_clusters.json",
            "-o",
            output.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!out.status.success());
    assert!(!output.exists());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("simulation.alpha_decay must be in (0, 1]"), "{stderr}");
}
