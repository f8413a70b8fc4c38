use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const CONFIG: &str = r#"
[[repos]]
base = "ghcr.io/ffy00"

[[images]]
name = "debian"
version = "12"
template = { name = "debian", data = { has-distutils = true } }

[[images]]
name = "arch"
version = { type = "rolling" }
template = { name = "arch" }
"#;

fn pyenvs() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pyenvs");
    cmd.env_remove("RUST_LOG").env_remove("GITHUB_SHA");
    cmd
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Repository root with a configuration and one template per image.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("environments.toml"), CONFIG);
    write(
        &tmp.path().join("containers/templates/debian/Dockerfile.jinja"),
        "FROM {{ image }}:{{ version }}\n{% if has_distutils %}\nRUN apt-get install python3-distutils\n{% endif %}\n",
    );
    write(
        &tmp.path().join("containers/templates/arch/Dockerfile.jinja"),
        "FROM archlinux:latest\n",
    );
    tmp
}

// ── Help / Version ──

#[test]
fn shows_help() {
    pyenvs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("python-environments container images"));
}

#[test]
fn shows_version() {
    pyenvs()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pyenvs"));
}

// ── Configuration ──

#[test]
fn missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    pyenvs()
        .current_dir(tmp.path())
        .arg("image-list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn explicit_config_path() {
    let tmp = project();
    let config = tmp.path().join("environments.toml");
    let elsewhere = TempDir::new().unwrap();

    pyenvs()
        .current_dir(elsewhere.path())
        .arg("--config")
        .arg(&config)
        .arg("image-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("ghcr.io/ffy00/debian:12"));
}

// ── image-list ──

#[test]
fn image_list_prints_rst_items() {
    let tmp = project();
    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .arg("image-list")
        .assert()
        .success()
        .stdout("- ``ghcr.io/ffy00/arch``\n- ``ghcr.io/ffy00/debian:12``\n");
}

// ── build ──

#[test]
fn build_rejects_unknown_images() {
    let tmp = project();
    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .args(["build", "--images", "debian:11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown image 'debian:11'"));
}

#[test]
fn build_images_conflicts_with_rolling() {
    let tmp = project();
    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .args(["build", "--images", "debian:12", "--rolling"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[cfg(unix)]
#[test]
fn build_renders_sources_and_reports_images() {
    let tmp = project();
    let out = tmp.path().join("out");

    pyenvs()
        .env("DOCKER", "true")
        .arg("--root")
        .arg(tmp.path())
        .args(["build", "--images", "debian:12", "--build-path"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generating sources..."))
        .stdout(predicate::str::contains("- built debian:12"));

    assert_eq!(
        std::fs::read_to_string(out.join("src/debian:12/Dockerfile")).unwrap(),
        "FROM debian:12\nRUN apt-get install python3-distutils\n"
    );
    let log = std::fs::read_to_string(out.join("logs/debian-12.log")).unwrap();
    assert!(log.starts_with("$ true buildx build"));
    assert!(log.contains("--tag=ghcr.io/ffy00/debian:12"));
}

#[cfg(unix)]
#[test]
fn build_then_push_every_tag() {
    let tmp = project();

    pyenvs()
        .env("DOCKER", "true")
        .arg("--root")
        .arg(tmp.path())
        .args(["build", "--images", "debian:12", "--push"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pushing images..."))
        .stdout(predicate::str::contains("- pushed ghcr.io/ffy00/debian:12\n"))
        .stdout(predicate::str::contains("- pushed ghcr.io/ffy00/debian:12-pc"));
}

#[test]
fn failed_build_is_reported_and_skips_push() {
    let tmp = project();

    pyenvs()
        .env("DOCKER", "/nonexistent/docker")
        .arg("--root")
        .arg(tmp.path())
        .args(["build", "--rolling", "--push"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("- failed to build arch:"))
        .stdout(predicate::str::contains("Pushing images...").not())
        .stderr(predicate::str::contains("failed to build images"));
}

#[test]
fn missing_template_fails_before_building() {
    let tmp = project();
    std::fs::remove_dir_all(tmp.path().join("containers/templates/arch")).unwrap();

    pyenvs()
        .env("DOCKER", "/nonexistent/docker")
        .arg("--root")
        .arg(tmp.path())
        .arg("build")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Building images...").not())
        .stderr(predicate::str::contains("template directory not found"));
}

// ── generate-data ──

#[test]
fn generate_data_lists_static_images_only() {
    let tmp = project();
    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .args(["generate-data", "--list-files"])
        .assert()
        .success()
        .stdout("debian:12.json\n");
}

// ── show-data ──

fn data_dir(tmp: &TempDir) -> std::path::PathBuf {
    let dir = tmp.path().join("python/.data");
    write(
        &dir.join("debian:12.json"),
        r#"{"data": {"python": {"version": "3.11"}, "paths": {}}, "metadata": {"manifest": "sha256:feed"}}"#,
    );
    dir
}

#[test]
fn show_data_prints_manifest_and_data() {
    let tmp = project();
    data_dir(&tmp);

    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .args(["show-data", "debian:12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("manifest: sha256:feed"))
        .stdout(predicate::str::contains("\"version\": \"3.11\""));
}

#[test]
fn show_data_single_key() {
    let tmp = project();
    let dir = data_dir(&tmp);

    pyenvs()
        .args(["show-data", "debian:12", "--key", "python", "--datadir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout("{\n  \"version\": \"3.11\"\n}\n");
}

#[test]
fn show_data_unknown_image() {
    let tmp = project();
    data_dir(&tmp);

    pyenvs()
        .arg("--root")
        .arg(tmp.path())
        .args(["show-data", "fedora:40"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no data for image 'fedora:40'"));
}

// ── fetch-data ──

#[test]
fn fetch_data_needs_a_commit() {
    let tmp = TempDir::new().unwrap();
    pyenvs()
        .current_dir(tmp.path())
        .env("GIT_DIR", tmp.path().join("no-git"))
        .arg("fetch-data")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must specify a commit"));
}
