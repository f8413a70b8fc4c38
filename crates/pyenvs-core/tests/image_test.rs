use chrono::NaiveDate;
use pyenvs_core::{Error, Image, ImageKind, ImagesContainer, Repo, TemplateData, TemplateSpec};

fn spec(name: &str) -> TemplateSpec {
    TemplateSpec::new(name, TemplateData::new())
}

fn fixed_instant() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(9, 5, 42)
        .unwrap()
}

// ── Image ──

#[test]
fn static_image_id_and_tags() {
    let image = Image::new_static("debian", "12", spec("debian"));

    assert_eq!(image.id(), "debian:12");
    assert_eq!(
        image.tags("0.3.0-4f1c2a"),
        ["debian:12", "debian:12-pc0.3.0-4f1c2a"]
    );
}

#[test]
fn rolling_image_is_versioned_by_construction_time() {
    let image = Image::rolling_at("debian", spec("debian"), fixed_instant());

    assert_eq!(image.kind(), ImageKind::Rolling);
    assert_eq!(image.version(), "20240307.0905");
    assert_eq!(
        image.tags("0.3.0"),
        [
            "debian:20240307.0905",
            "debian:20240307.0905-pc0.3.0",
            "debian:latest",
        ]
    );
}

#[test]
fn rolling_tags_are_stable_across_reads() {
    let image = Image::rolling("archlinux", spec("archlinux"));
    let first = image.tags("0.3.0");
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(first, image.tags("0.3.0"));
    assert_eq!(first.iter().filter(|t| t.ends_with(":latest")).count(), 1);
    assert_eq!(first.iter().filter(|t| t.contains("-pc")).count(), 1);
}

#[test]
fn image_injects_name_and_version_into_template_data() {
    let image = Image::rolling_at("archlinux", spec("archlinux"), fixed_instant());
    let data = image.template().data();

    assert_eq!(
        data.get("image"),
        Some(&toml::Value::String("archlinux".to_owned()))
    );
    assert_eq!(
        data.get("version"),
        Some(&toml::Value::String("20240307.0905".to_owned()))
    );
}

// ── ImagesContainer ──

fn fleet() -> ImagesContainer {
    ImagesContainer::new([
        Image::new_static("fedora", "40", spec("fedora")),
        Image::rolling_at("archlinux", spec("archlinux"), fixed_instant()),
        Image::new_static("debian", "12", spec("debian")),
        Image::new_static("debian", "11", spec("debian")),
    ])
}

#[test]
fn iteration_is_sorted_by_id() {
    let ids: Vec<String> = fleet().iter().map(Image::id).collect();
    assert_eq!(
        ids,
        [
            "archlinux:20240307.0905",
            "debian:11",
            "debian:12",
            "fedora:40",
        ]
    );
}

#[test]
fn filter_matching_rolling() {
    let rolling = fleet().filter(Some(ImageKind::Rolling), None);
    assert_eq!(rolling.ids(), ["archlinux:20240307.0905"]);
}

#[test]
fn filter_ignoring_rolling() {
    let fixed = fleet().filter(None, Some(ImageKind::Rolling));
    assert_eq!(fixed.ids(), ["debian:11", "debian:12", "fedora:40"]);
    assert!(fixed.iter().all(|i| i.kind() == ImageKind::Static));
}

#[test]
fn filter_without_predicates_is_a_full_copy() {
    let images = fleet();
    assert_eq!(images.filter(None, None), images);
}

#[test]
fn filter_with_contradicting_predicates_is_empty() {
    let images = fleet().filter(Some(ImageKind::Static), Some(ImageKind::Static));
    assert!(images.is_empty());
}

#[test]
fn select_returns_requested_images() {
    let selected = fleet().select(&["fedora:40", "debian:11"]).unwrap();
    assert_eq!(selected.ids(), ["debian:11", "fedora:40"]);
}

#[test]
fn select_collapses_repeated_ids() {
    let selected = fleet().select(&["debian:12", "debian:12", "fedora:40"]).unwrap();
    assert_eq!(selected.len(), 2);
    assert_eq!(selected.ids(), ["debian:12", "fedora:40"]);
}

#[test]
fn select_unknown_id_errors() {
    let result = fleet().select(&["debian:12", "ubuntu:24.04"]);
    match result {
        Err(Error::UnknownImage { id, known }) => {
            assert_eq!(id, "ubuntu:24.04");
            assert_eq!(known.len(), 4);
        }
        other => panic!("expected UnknownImage, got {other:?}"),
    }
}

#[test]
fn get_unknown_id_lists_known_ids() {
    let images = fleet();
    let err = images.get("alpine:3").unwrap_err().to_string();
    assert!(err.contains("alpine:3"), "got: {err}");
    assert!(err.contains("debian:12"), "got: {err}");
}

// ── Repo qualification ──

#[test]
fn repo_tags_qualify_image_tags() {
    let repo = Repo::new("ghcr.io/ffy00/python-environments").unwrap();
    let image = Image::new_static("debian", "12", spec("debian"));

    assert_eq!(
        repo.tags(&image.tags("0.3.0")),
        [
            "ghcr.io/ffy00/python-environments/debian:12",
            "ghcr.io/ffy00/python-environments/debian:12-pc0.3.0",
        ]
    );
}
