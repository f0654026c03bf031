//! End-to-end timeline behavior over a scratch directory
//!
//! Three versions are stored in which `Foo` becomes `Bar` becomes `Baz`,
//! while `Qux` becomes `Quux` and then disappears.

use dextrace::dex::{
    ClassAccessFlags, ClassDescriptor, Image, MethodAccessFlags, MethodDescriptor, PrimitiveType,
    TypeRef,
};
use dextrace::timeline::{parse_version, GapPolicy, Timeline, Version};
use dextrace::Error;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

fn class(index: usize, fullname: &str, method_name: &str) -> ClassDescriptor {
    ClassDescriptor::new(index, fullname, "", ClassAccessFlags::PUBLIC).with_method(
        MethodDescriptor::new(
            method_name,
            vec![TypeRef::Primitive(PrimitiveType::Int)],
            TypeRef::Primitive(PrimitiveType::Void),
            MethodAccessFlags::PUBLIC,
        )
        .with_bytecode(vec![0x54, 0x10]),
    )
}

fn write_artifact(dir: &Path, name: &str, classes: Vec<ClassDescriptor>) -> PathBuf {
    let path = dir.join(name);
    let images = vec![Image { classes }];
    fs::write(&path, serde_json::to_vec(&images).unwrap()).unwrap();
    path
}

fn version(version: &str) -> Version {
    parse_version(version).unwrap()
}

/// Timeline with 1.0.0, 2.0.0 and 3.0.0 inserted (maps left to lazy compute)
fn seeded_timeline(scratch: &Path) -> Timeline {
    let timeline = Timeline::init(scratch.join("app")).unwrap();

    let v1 = write_artifact(
        scratch,
        "v1.json",
        vec![class(0, "Foo", "observe"), class(1, "Qux", "mutate")],
    );
    let v2 = write_artifact(
        scratch,
        "v2.json",
        vec![class(0, "Bar", "observe"), class(1, "Quux", "mutate")],
    );
    let v3 = write_artifact(scratch, "v3.json", vec![class(0, "Baz", "observe")]);

    timeline
        .insert_version(&version("1.0.0"), &v1, false, false)
        .unwrap();
    timeline
        .insert_version(&version("2.0.0"), &v2, false, false)
        .unwrap();
    timeline
        .insert_version(&version("3.0.0"), &v3, false, false)
        .unwrap();
    timeline
}

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn versions_come_back_in_ascending_order() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());
    let versions = timeline.versions().unwrap();
    assert_eq!(
        versions,
        vec![version("1.0.0"), version("2.0.0"), version("3.0.0")]
    );
}

#[test]
fn pairwise_diff_is_computed_lazily_and_persisted_both_ways() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    let forward = timeline
        .pairwise_diff(&version("1.0.0"), &version("2.0.0"))
        .unwrap();
    assert_eq!(forward, table(&[("Foo", "Bar"), ("Qux", "Quux")]));

    // Both directions were published by the single computation
    let diffs = scratch.path().join("app").join("diffs");
    assert!(diffs.join("1.0.0-2.0.0").is_file());
    assert!(diffs.join("2.0.0-1.0.0").is_file());
    assert!(!diffs.join("1.0.0-2.0.0.tmp").exists());

    let backward = timeline
        .pairwise_diff(&version("2.0.0"), &version("1.0.0"))
        .unwrap();
    assert_eq!(backward, table(&[("Bar", "Foo"), ("Quux", "Qux")]));
}

#[test]
fn map_range_composes_pairwise_mappings() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    let composed = timeline
        .map_range(&version("1.0.0"), &version("3.0.0"))
        .unwrap();
    // Foo resolves all the way; Qux fell out at 3.0.0 and retains its
    // 2.0.0-era name
    assert_eq!(composed, table(&[("Foo", "Baz"), ("Qux", "Quux")]));
}

#[test]
fn map_range_can_drop_unresolved_classes() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    let composed = timeline
        .map_range_with(&version("1.0.0"), &version("3.0.0"), GapPolicy::Drop)
        .unwrap();
    assert_eq!(composed, table(&[("Foo", "Baz")]));
}

#[test]
fn map_range_walks_backwards_when_asked() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    let composed = timeline
        .map_range(&version("3.0.0"), &version("1.0.0"))
        .unwrap();
    assert_eq!(composed.get("Baz"), Some(&"Foo".to_string()));
}

#[test]
fn until_walks_forward_while_the_class_survives() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    assert_eq!(
        timeline.until(&version("1.0.0"), "Foo").unwrap(),
        version("3.0.0")
    );
    assert_eq!(
        timeline.until(&version("1.0.0"), "Qux").unwrap(),
        version("2.0.0")
    );
    assert_eq!(
        timeline.until(&version("3.0.0"), "Baz").unwrap(),
        version("3.0.0")
    );
}

#[test]
fn since_walks_backward_while_the_class_survives() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    assert_eq!(
        timeline.since(&version("3.0.0"), "Baz").unwrap(),
        version("1.0.0")
    );
    assert_eq!(
        timeline.since(&version("2.0.0"), "Quux").unwrap(),
        version("1.0.0")
    );
}

#[test]
fn inserting_an_existing_version_requires_force() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());
    let artifact = write_artifact(scratch.path(), "again.json", vec![class(0, "Foo", "observe")]);

    let error = timeline
        .insert_version(&version("2.0.0"), &artifact, false, false)
        .unwrap_err();
    assert!(matches!(error, Error::VersionExists(_)), "got {error:?}");

    timeline
        .insert_version(&version("2.0.0"), &artifact, true, false)
        .unwrap();
}

#[test]
fn version_errors_are_reported_before_diffing() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());

    let same = timeline
        .map_range(&version("1.0.0"), &version("1.0.0"))
        .unwrap_err();
    assert!(matches!(same, Error::SameVersion(_)), "got {same:?}");

    let unknown = timeline
        .pairwise_diff(&version("1.0.0"), &version("9.9.9"))
        .unwrap_err();
    assert!(matches!(unknown, Error::UnknownVersion(_)), "got {unknown:?}");

    let invalid = parse_version("not.a.version").unwrap_err();
    assert!(matches!(invalid, Error::InvalidVersion { .. }), "got {invalid:?}");
}

#[test]
fn open_honors_the_recorded_artifact_format() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = seeded_timeline(scratch.path());
    drop(timeline);
    let root = scratch.path().join("app");

    // The recorded format round-trips through open
    let reopened = Timeline::open(&root).unwrap();
    let forward = reopened
        .pairwise_diff(&version("1.0.0"), &version("2.0.0"))
        .unwrap();
    assert_eq!(forward.get("Foo"), Some(&"Bar".to_string()));

    // A format nothing can load is rejected up front
    fs::write(root.join("timeline"), br#"{"format":"dex"}"#).unwrap();
    let error = Timeline::open(&root).unwrap_err();
    assert!(matches!(error, Error::InvalidFormat(_)), "got {error:?}");
}

#[test]
fn opening_a_plain_directory_is_an_error() {
    let scratch = tempfile::tempdir().unwrap();
    let error = Timeline::open(scratch.path()).unwrap_err();
    assert!(matches!(error, Error::NotATimeline(_)), "got {error:?}");
}

#[test]
fn eager_insert_computes_maps_to_both_neighbors() {
    let scratch = tempfile::tempdir().unwrap();
    let timeline = Timeline::init(scratch.path().join("app")).unwrap();

    let v1 = write_artifact(scratch.path(), "v1.json", vec![class(0, "Foo", "observe")]);
    let v3 = write_artifact(scratch.path(), "v3.json", vec![class(0, "Baz", "observe")]);
    let v2 = write_artifact(scratch.path(), "v2.json", vec![class(0, "Bar", "observe")]);

    timeline
        .insert_version(&version("1.0.0"), &v1, false, false)
        .unwrap();
    timeline
        .insert_version(&version("3.0.0"), &v3, false, false)
        .unwrap();
    timeline
        .insert_version(&version("2.0.0"), &v2, false, true)
        .unwrap();

    let diffs = scratch.path().join("app").join("diffs");
    assert!(diffs.join("1.0.0-2.0.0").is_file());
    assert!(diffs.join("2.0.0-3.0.0").is_file());
}
