//! Parsing of installer output
//!
//! This module handles:
//! - Mapping downloaded files to the requirement that pulled them in
//! - Version extraction from distribution file names
//! - `hash` and `freeze` output
//! - Cleaning installer output before it is shown to the user
//!
//! Parsing is best-effort. Text that does not match simply yields nothing.

use console::style;
use percent_encoding::percent_decode_str;

use super::heuristics::{HASH_MISMATCH_BANNER, strip_post_release};
use crate::manifest::names::canonical_name;

/// Marker that starts a new package block in installer output
const SECTION_DELIMITER: &str = "Collecting ";

/// Archive suffixes of source distributions, longest first
const SDIST_SUFFIXES: &[&str] = &[".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".zip", ".tar"];

/// A distribution file saved by a download, and the name that requested it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub declared_name: String,
    pub filename: String,
}

/// Lazy iterator over the files named in installer output
///
/// Created by [`parse_install_output`].
pub struct SavedFiles<'a> {
    sections: std::str::Split<'a, &'static str>,
}

impl Iterator for SavedFiles<'_> {
    type Item = SavedFile;

    fn next(&mut self) -> Option<Self::Item> {
        self.sections.by_ref().find_map(parse_section)
    }
}

/// Map the file names reported by `download`/`install` to their declared names
pub fn parse_install_output(output: &str) -> SavedFiles<'_> {
    SavedFiles {
        sections: output.split(SECTION_DELIMITER),
    }
}

/// Parse one package block
///
/// The first line names the package; the first `Saved …` or `Using cached …` line
/// names the file.
pub fn parse_section(section: &str) -> Option<SavedFile> {
    let mut lines = section.lines();
    let declared_name = declared_name(lines.next()?)?;

    lines.find_map(|line| {
        let line = line.trim();
        let file = line
            .strip_prefix("Saved ")
            .or_else(|| line.strip_prefix("Using cached "))?;
        let filename = normalize_filename(file)?;
        Some(SavedFile {
            declared_name: declared_name.clone(),
            filename,
        })
    })
}

/// `requests[socks]>=2.0 (from -r req.txt); python_version < "4"` -> `requests`
fn declared_name(line: &str) -> Option<String> {
    let name = line.split('(').next().unwrap_or_default();
    let name = name.split(';').next().unwrap_or_default();
    let end = name
        .find(|c: char| c.is_whitespace() || "<>=!~[@".contains(c))
        .unwrap_or(name.len());
    let name = name[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(canonical_name(name))
    }
}

/// Reduce a reported path or URL to a decoded file name
fn normalize_filename(reported: &str) -> Option<String> {
    // "Using cached alpha-1.0.whl (12 kB)"
    let reported = reported.split_whitespace().next()?;
    let reported = reported.strip_prefix("./").unwrap_or(reported);
    let name = reported.rsplit(['/', '\\']).next()?;
    let name = percent_decode_str(name).decode_utf8_lossy().into_owned();
    if name.is_empty() { None } else { Some(name) }
}

/// Extract the version from a distribution file name
///
/// Wheels lose their python/abi/platform tags, source archives their suffix. The
/// `<name>-` prefix is removed (matched case- and separator-insensitively) and any
/// post-release segment is dropped.
pub fn parse_version(filename: &str, name: &str) -> String {
    let stem = distribution_stem(filename);

    let version = strip_name_prefix(&stem, name)
        .or_else(|| split_at_version(&stem).map(|(_, version)| version))
        .unwrap_or(&stem);

    strip_post_release(version).to_string()
}

/// Best guess at the canonical project name of a distribution file
pub fn name_from_filename(filename: &str) -> Option<String> {
    distribution_name(filename).map(|name| canonical_name(&name))
}

/// Project name of a distribution file as spelled in the file name
pub fn distribution_name(filename: &str) -> Option<String> {
    let stem = distribution_stem(filename);
    split_at_version(&stem).map(|(name, _)| name.to_string())
}

fn distribution_stem(filename: &str) -> String {
    if let Some(stem) = filename.strip_suffix(".whl") {
        let segments: Vec<&str> = stem.split('-').collect();
        let keep = segments.len().saturating_sub(3).max(1);
        return segments[..keep].join("-");
    }

    let lower = filename.to_ascii_lowercase();
    SDIST_SUFFIXES
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map_or_else(
            || filename.to_string(),
            |suffix| filename[..filename.len() - suffix.len()].to_string(),
        )
}

fn strip_name_prefix<'a>(stem: &'a str, name: &str) -> Option<&'a str> {
    let prefix = stem.get(..name.len())?;
    let rest = stem.get(name.len()..)?;
    if canonical_name(prefix) != canonical_name(name) {
        return None;
    }
    rest.strip_prefix('-')
}

/// Split `name-1.0` at the first dash that is followed by a digit
fn split_at_version(stem: &str) -> Option<(&str, &str)> {
    let bytes = stem.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i - 1] == b'-' && bytes[i].is_ascii_digit())
        .map(|i| (&stem[..i - 1], &stem[i..]))
}

/// Extract `sha256:<hex>` from the output of the installer's `hash` command
pub fn parse_hash_output(output: &str) -> Option<String> {
    let (_, rest) = output.split_once("--hash=")?;
    let hash = rest.split_whitespace().next()?;
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_string())
    }
}

/// A package reported by `freeze`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenPackage {
    pub name: String,
    pub version: Option<String>,
}

/// Parse `freeze` output into installed packages
pub fn parse_freeze_output(output: &str) -> Vec<FrozenPackage> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            if let Some(url) = line.strip_prefix("-e ") {
                let egg = url.split_once("#egg=")?.1;
                let name = egg.split('&').next()?;
                return Some(FrozenPackage {
                    name: name.to_string(),
                    version: None,
                });
            }
            if let Some((name, version)) = line.split_once("==") {
                return Some(FrozenPackage {
                    name: name.trim().to_string(),
                    version: Some(version.trim().to_string()),
                });
            }
            let name = line.split(" @ ").next()?.trim();
            Some(FrozenPackage {
                name: name.to_string(),
                version: None,
            })
        })
        .collect()
}

/// Drop `(from -r <file>)` annotations pointing at temporary requirement files
pub fn format_installer_output(output: &str) -> String {
    output
        .split('\n')
        .map(|line| match line.find("(from -r") {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Highlight the parts of installer errors the user has to act on
pub fn format_installer_error(error: &str) -> String {
    error
        .replace("Expected", &style("Expected").green().bold().to_string())
        .replace("Got", &style("Got").red().bold().to_string())
        .replace(
            HASH_MISMATCH_BANNER,
            &style("THESE PACKAGES DO NOT MATCH THE HASHES FROM Pipfile.lock!")
                .red()
                .bold()
                .to_string(),
        )
        .replace(
            "someone may have tampered with them",
            &style("someone may have tampered with them").red().to_string(),
        )
        .replace("option to pip install", "option to 'pinenv install'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_section_strips_annotation_and_relative_prefix() {
        let saved =
            parse_section("alpha (from beta)\nSaved ./alpha-1.2.3-py3-none-any.whl\n").unwrap();
        assert_eq!(saved.declared_name, "alpha");
        assert_eq!(saved.filename, "alpha-1.2.3-py3-none-any.whl");
    }

    #[test]
    fn test_parse_section_strips_markers_and_specifiers() {
        let saved = parse_section(
            "Requests[socks]>=2.0; python_version < \"4\"\n  Using cached https://files.example/packages/ab/requests-2.31.0-py3-none-any.whl (62 kB)\n",
        )
        .unwrap();
        assert_eq!(saved.declared_name, "requests");
        assert_eq!(saved.filename, "requests-2.31.0-py3-none-any.whl");
    }

    #[test]
    fn test_parse_section_first_match_wins() {
        let saved =
            parse_section("alpha\nSaved ./alpha-1.0.tar.gz\nSaved ./alpha-2.0.tar.gz\n").unwrap();
        assert_eq!(saved.filename, "alpha-1.0.tar.gz");
    }

    #[test]
    fn test_parse_section_without_match_yields_nothing() {
        assert_eq!(parse_section("alpha\n  Downloading alpha-1.0.tar.gz\n"), None);
        assert_eq!(parse_section(""), None);
    }

    #[test]
    fn test_parse_install_output_is_lazy_over_sections() {
        let output = "Looking in indexes: https://pypi.org/simple\n\
                      Collecting alpha (from -r req.txt (line 1))\n  Saved ./alpha-1.0.tar.gz\n\
                      Collecting beta>=1 (from alpha)\n  Downloading beta-2.0-py3-none-any.whl\n\
                      Collecting gamma\n  Using cached gamma%2Bextra-3.0.zip\n\
                      Successfully downloaded alpha gamma\n";

        let mut files = parse_install_output(output);
        assert_eq!(
            files.next(),
            Some(SavedFile {
                declared_name: "alpha".to_string(),
                filename: "alpha-1.0.tar.gz".to_string(),
            })
        );
        let rest: Vec<_> = files.collect();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].declared_name, "gamma");
        assert_eq!(rest[0].filename, "gamma+extra-3.0.zip");
    }

    #[test]
    fn test_normalize_filename_decodes_escapes() {
        assert_eq!(
            normalize_filename("https://files.example/pkg-1.0%2Blocal.tar.gz").as_deref(),
            Some("pkg-1.0+local.tar.gz")
        );
        assert_eq!(normalize_filename("./%41%42-1.0.whl").as_deref(), Some("AB-1.0.whl"));
        assert_eq!(
            normalize_filename("bad%zzescape%-1.0.zip (3 kB)").as_deref(),
            Some("bad%zzescape%-1.0.zip")
        );
    }

    #[test]
    fn test_parse_version_wheel() {
        assert_eq!(parse_version("alpha-1.2.3-py3-none-any.whl", "alpha"), "1.2.3");
    }

    #[test]
    fn test_parse_version_drops_explicit_post_release() {
        assert_eq!(parse_version("alpha-1.2.3.post1.tar.gz", "alpha"), "1.2.3");
    }

    #[test]
    fn test_parse_version_drops_implicit_post_release() {
        assert_eq!(parse_version("alpha-1.2.3-1.tar.gz", "alpha"), "1.2.3");
        assert_eq!(parse_version("alpha-1.2.3-1-py3-none-any.whl", "alpha"), "1.2.3");
    }

    #[test]
    fn test_parse_version_normalized_wheel_name() {
        assert_eq!(
            parse_version("zope_interface-6.0-cp311-cp311-manylinux_x86_64.whl", "zope-interface"),
            "6.0"
        );
        assert_eq!(parse_version("Django-4.2.tar.gz", "django"), "4.2");
    }

    #[test]
    fn test_parse_version_falls_back_to_first_numeric_segment() {
        assert_eq!(parse_version("python-dateutil-2.8.2.tar.gz", "dateutil"), "2.8.2");
    }

    #[test]
    fn test_parse_version_sdist_suffixes() {
        assert_eq!(parse_version("beta-0.9.zip", "beta"), "0.9");
        assert_eq!(parse_version("beta-0.9.tar.bz2", "beta"), "0.9");
        assert_eq!(parse_version("beta-0.9.tgz", "beta"), "0.9");
    }

    #[test]
    fn test_name_from_filename() {
        assert_eq!(
            name_from_filename("typing_extensions-4.8.0-py3-none-any.whl").as_deref(),
            Some("typing-extensions")
        );
        assert_eq!(name_from_filename("noversion.tar.gz"), None);
    }

    #[test]
    fn test_parse_hash_output() {
        let output = "alpha-1.0.tar.gz:\n--hash=sha256:abc123\n";
        assert_eq!(parse_hash_output(output).as_deref(), Some("sha256:abc123"));
        assert_eq!(parse_hash_output("nothing here"), None);
    }

    #[test]
    fn test_parse_freeze_output() {
        let output = "requests==2.31.0\n\
                      -e git+https://github.com/org/tool.git@abc#egg=tool\n\
                      local-pkg @ file:///tmp/local_pkg\n\
                      # comment\n\n";
        let packages = parse_freeze_output(output);
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].name, "requests");
        assert_eq!(packages[0].version.as_deref(), Some("2.31.0"));
        assert_eq!(packages[1].name, "tool");
        assert_eq!(packages[2].name, "local-pkg");
        assert_eq!(packages[2].version, None);
    }

    #[test]
    fn test_format_installer_output_strips_requirement_file_annotations() {
        let output = "Collecting alpha==1.0 (from -r /tmp/pinenv-x-requirement.txt (line 1))\nDone";
        assert_eq!(format_installer_output(output), "Collecting alpha==1.0 \nDone");
    }

    #[test]
    fn test_format_installer_error_rewrites_advice() {
        console::set_colors_enabled(false);
        let error = "Use the --no-deps option to pip install to skip.";
        assert_eq!(
            format_installer_error(error),
            "Use the --no-deps option to 'pinenv install' to skip."
        );
    }
}
