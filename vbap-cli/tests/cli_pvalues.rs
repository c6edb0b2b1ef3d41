use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn pvalues_prints_one_exponent_per_frequency() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("vbap"))
        .args(["pvalues", "--dtt", "1", "--freq", "0", "1000", "20000"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let values: Vec<f32> = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(values.len(), 3);
    assert!((values[0] - 1.0).abs() < 1e-6);
    assert!(values.iter().all(|p| (1.0..=2.0).contains(p)));
}

#[test]
fn pvalues_rejects_out_of_range_dtt() {
    Command::new(assert_cmd::cargo::cargo_bin!("vbap"))
        .args(["pvalues", "--dtt", "2", "--freq", "1000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dtt must be within"));
}

#[test]
fn grid_prints_directions() {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("vbap"))
        .args(["grid", "--az-res", "90", "--el-res", "90"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let grid: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(grid["num_azimuths"], 5);
    assert_eq!(grid["directions"].as_array().map(Vec::len), Some(15));
}
