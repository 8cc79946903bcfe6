//! Dependency constraints
//!
//! A [`DependencyConstraint`] is one declared requirement of a dependency group. It is
//! read from a Pipfile entry or from a requirement string given on the command line, and
//! written back to the Pipfile or handed to the installer.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use toml_edit::{Array, InlineTable, Item, Value};

use super::names::canonical_name;
use crate::error::{Result, manifest};
use crate::installer::InstallTarget;

#[allow(clippy::expect_used)]
static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[([^\]]*)\])?\s*([^;]*?)\s*(?:;\s*(.*?)\s*)?$")
        .expect("requirement pattern is valid")
});

/// Version control system of a VCS dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VcsKind {
    Git,
    Hg,
    Svn,
    Bzr,
}

impl VcsKind {
    pub const ALL: [VcsKind; 4] = [VcsKind::Git, VcsKind::Hg, VcsKind::Svn, VcsKind::Bzr];

    /// Pipfile key and installer URL scheme prefix
    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Hg => "hg",
            VcsKind::Svn => "svn",
            VcsKind::Bzr => "bzr",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == prefix)
    }
}

impl fmt::Display for VcsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a VCS dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsSpec {
    pub kind: VcsKind,
    pub url: String,
    pub reference: Option<String>,
}

impl VcsSpec {
    /// Installer URL: `git+https://host/repo.git@ref#egg=name`
    pub fn installer_url(&self, name: &str) -> String {
        let mut url = format!("{}+{}", self.kind, self.url);
        if let Some(reference) = &self.reference {
            url.push('@');
            url.push_str(reference);
        }
        url.push_str("#egg=");
        url.push_str(name);
        url
    }
}

/// One declared requirement inside a dependency group
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DependencyConstraint {
    pub name: String,
    /// Version specifier; `None` means any version (`"*"` in the Pipfile)
    pub version_spec: Option<String>,
    pub extras: BTreeSet<String>,
    pub markers: Option<String>,
    /// Name of the `[[source]]` this package must come from
    pub source_ref: Option<String>,
    pub vcs: Option<VcsSpec>,
    pub editable: bool,
}

impl DependencyConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, spec: impl Into<String>) -> Self {
        self.version_spec = normalize_spec(&spec.into());
        self
    }

    /// Case-insensitive identity of this constraint
    pub fn key(&self) -> String {
        canonical_name(&self.name)
    }

    pub fn is_vcs(&self) -> bool {
        self.vcs.is_some()
    }

    /// Parse a Pipfile entry such as `requests = "*"` or `flask = {version = ">=1.0"}`
    pub fn from_manifest_entry(name: &str, item: &Item) -> Result<Self> {
        if let Some(spec) = item.as_str() {
            return Ok(Self::new(name).with_version(spec));
        }

        let Some(table) = item.as_table_like() else {
            return Err(manifest::parse_failed(
                name,
                "expected a version string or a table",
            ));
        };

        let get_str = |key: &str| -> Result<Option<String>> {
            match table.get(key) {
                None => Ok(None),
                Some(value) => value.as_str().map(|s| Some(s.to_string())).ok_or_else(|| {
                    manifest::parse_failed(name, format!("'{}' must be a string", key))
                }),
            }
        };

        let mut constraint = Self::new(name);
        if let Some(spec) = get_str("version")? {
            constraint.version_spec = normalize_spec(&spec);
        }
        constraint.markers = get_str("markers")?;
        constraint.source_ref = get_str("index")?;

        if let Some(extras) = table.get("extras") {
            let array = extras
                .as_array()
                .ok_or_else(|| manifest::parse_failed(name, "'extras' must be an array"))?;
            for extra in array {
                let extra = extra.as_str().ok_or_else(|| {
                    manifest::parse_failed(name, "'extras' must contain strings")
                })?;
                constraint.extras.insert(extra.trim().to_string());
            }
        }

        if let Some(editable) = table.get("editable") {
            constraint.editable = editable
                .as_bool()
                .ok_or_else(|| manifest::parse_failed(name, "'editable' must be a boolean"))?;
        }

        for kind in VcsKind::ALL {
            if let Some(url) = get_str(kind.as_str())? {
                constraint.vcs = Some(VcsSpec {
                    kind,
                    url,
                    reference: get_str("ref")?,
                });
                break;
            }
        }

        Ok(constraint)
    }

    /// Parse a requirement string as accepted by the installer
    ///
    /// Accepts `name[extras]<specifier>; markers`, `<vcs>+<url>[@ref]#egg=name`, and the
    /// latter prefixed with `-e` for editable installs.
    pub fn from_requirement(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let (editable, rest) = match trimmed.strip_prefix("-e") {
            Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim()),
            _ => (false, trimmed),
        };

        if let Some((prefix, location)) = rest.split_once('+') {
            if let Some(kind) = VcsKind::from_prefix(prefix) {
                return parse_vcs_requirement(input, kind, location, editable);
            }
        }

        if editable {
            return Err(manifest::invalid_requirement(
                input,
                "editable requirements must be VCS URLs",
            ));
        }

        let captures = REQUIREMENT
            .captures(rest)
            .ok_or_else(|| manifest::invalid_requirement(input, "missing package name"))?;

        let mut constraint = Self::new(&captures[1]);
        if let Some(extras) = captures.get(2) {
            constraint.extras = extras
                .as_str()
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(spec) = captures.get(3) {
            constraint.version_spec = normalize_spec(spec.as_str());
        }
        constraint.markers = captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .filter(|m| !m.is_empty());

        Ok(constraint)
    }

    /// Pipfile representation of this constraint
    pub fn to_manifest_item(&self) -> Item {
        let simple = self.extras.is_empty()
            && self.markers.is_none()
            && self.source_ref.is_none()
            && self.vcs.is_none()
            && !self.editable;
        if simple {
            return toml_edit::value(self.version_spec.as_deref().unwrap_or("*"));
        }

        let mut table = InlineTable::new();
        if let Some(spec) = &self.version_spec {
            table.insert("version", Value::from(spec.as_str()));
        }
        if !self.extras.is_empty() {
            let extras: Array = self.extras.iter().map(String::as_str).collect();
            table.insert("extras", Value::Array(extras));
        }
        if let Some(markers) = &self.markers {
            table.insert("markers", Value::from(markers.as_str()));
        }
        if let Some(index) = &self.source_ref {
            table.insert("index", Value::from(index.as_str()));
        }
        if let Some(vcs) = &self.vcs {
            table.insert(vcs.kind.as_str(), Value::from(vcs.url.as_str()));
            if let Some(reference) = &vcs.reference {
                table.insert("ref", Value::from(reference.as_str()));
            }
        }
        if self.editable {
            table.insert("editable", Value::from(true));
        }
        Item::Value(Value::InlineTable(table))
    }

    /// Requirement string in installer syntax, without any `-e` prefix
    pub fn requirement_string(&self) -> String {
        if let Some(vcs) = &self.vcs {
            return vcs.installer_url(&self.name);
        }

        let mut requirement = self.name.clone();
        if !self.extras.is_empty() {
            let extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            requirement.push('[');
            requirement.push_str(&extras.join(","));
            requirement.push(']');
        }
        if let Some(spec) = &self.version_spec {
            requirement.push_str(spec);
        }
        if let Some(markers) = &self.markers {
            requirement.push_str("; ");
            requirement.push_str(markers);
        }
        requirement
    }

    /// Installer argument for this constraint
    pub fn install_target(&self) -> InstallTarget {
        if self.editable && self.vcs.is_some() {
            InstallTarget::Editable(self.requirement_string())
        } else {
            InstallTarget::Requirement(self.requirement_string())
        }
    }
}

impl fmt::Display for DependencyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.editable {
            f.write_str("-e ")?;
        }
        f.write_str(&self.requirement_string())
    }
}

/// `"*"`, empty and parenthesized specifiers collapse to a canonical form
fn normalize_spec(spec: &str) -> Option<String> {
    let spec = spec.trim();
    let spec = spec
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(spec);
    let spec: String = spec.chars().filter(|c| !c.is_whitespace()).collect();
    if spec.is_empty() || spec == "*" {
        None
    } else {
        Some(spec)
    }
}

fn parse_vcs_requirement(
    input: &str,
    kind: VcsKind,
    location: &str,
    editable: bool,
) -> Result<DependencyConstraint> {
    let (url, fragment) = location.split_once('#').ok_or_else(|| {
        manifest::invalid_requirement(input, "VCS requirements need a #egg=<name> fragment")
    })?;

    let name = fragment
        .split('&')
        .find_map(|part| part.strip_prefix("egg="))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            manifest::invalid_requirement(input, "VCS requirements need a #egg=<name> fragment")
        })?;

    // '@' after the last '/' is a ref, anything earlier is user info
    let last_slash = url.rfind('/').unwrap_or(0);
    let (url, reference) = match url.rfind('@') {
        Some(at) if at > last_slash => (&url[..at], Some(url[at + 1..].to_string())),
        _ => (url, None),
    };

    let mut constraint = DependencyConstraint::new(name);
    constraint.editable = editable;
    constraint.vcs = Some(VcsSpec {
        kind,
        url: url.to_string(),
        reference,
    });
    Ok(constraint)
}
