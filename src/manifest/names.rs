//! Package name normalization

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("separator pattern is valid"));

/// Packages that ship with every environment and are never managed
pub const BOOTSTRAP_PACKAGES: &[&str] = &[
    "setuptools",
    "pip",
    "wheel",
    "six",
    "packaging",
    "pyparsing",
    "appdirs",
];

/// Canonical form of a package name
///
/// Lowercased, with every run of `-`, `_` and `.` collapsed to a single `-`.
/// Two names refer to the same package iff their canonical forms are equal.
pub fn canonical_name(name: &str) -> String {
    SEPARATOR_RUNS
        .replace_all(name.trim(), "-")
        .to_lowercase()
}

/// Whether `name` is one of the [`BOOTSTRAP_PACKAGES`]
pub fn is_bootstrap_package(name: &str) -> bool {
    let name = canonical_name(name);
    BOOTSTRAP_PACKAGES.iter().any(|p| *p == name)
}
