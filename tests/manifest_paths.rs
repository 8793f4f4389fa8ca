#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing
)]
//! Integration tests for manifest paths that point outside the home
//! directory.
//!
//! A clone directory that resolves to `$HOME` (or above it) must be rejected
//! while the manifest loads, before any step can remove it.

mod common;

use hyprsetup_cli::config::toml_loader::{load_manifest, parse_manifest};
use hyprsetup_cli::error::{EXIT_FAILURE, SetupError, exit_code_for};

fn manifest_with_clone_dir(dir: &str) -> String {
    format!(
        "[flavor]\nname = \"custom\"\n\n[source]\nurl = \"https://example.com/rice.git\"\nclone_dir = \"{dir}\"\n"
    )
}

#[test]
fn clone_dir_resolving_to_home_or_above_is_a_manifest_error() {
    for dir in ["", ".", "..", "/"] {
        let err = parse_manifest(&manifest_with_clone_dir(dir), "custom.toml")
            .expect_err("clone_dir should be rejected");
        assert!(
            matches!(
                err.downcast_ref::<SetupError>(),
                Some(SetupError::Manifest { .. })
            ),
            "clone_dir '{dir}' should fail as a manifest error, got: {err:#}"
        );
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}

#[test]
fn rejected_manifest_leaves_home_untouched() {
    let home = tempfile::tempdir().unwrap();
    let thesis = common::write_file(home.path(), "Documents/thesis.tex", "\\begin{document}");
    let path = common::write_file(home.path(), "custom.toml", &manifest_with_clone_dir(""));

    let err = load_manifest(&path).unwrap_err();
    assert!(err.to_string().contains("custom.toml"));
    assert!(thesis.is_file());
}

#[test]
fn nested_clone_dir_is_accepted() {
    let manifest =
        parse_manifest(&manifest_with_clone_dir("src/dots"), "custom.toml").unwrap();
    assert_eq!(
        manifest.source.clone_dir.as_path(),
        std::path::Path::new("src/dots")
    );
}
