//! Pipfile manifest
//!
//! The manifest declares two dependency groups (`[packages]` and `[dev-packages]`),
//! an ordered list of `[[source]]` tables and a `[requires]` block. It is edited with
//! `toml_edit` so comments and formatting survive every save.

pub mod canonical;
pub mod constraint;
pub mod names;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use toml_edit::{ArrayOfTables, DocumentMut, Item, Table, value};

pub use constraint::{DependencyConstraint, VcsKind, VcsSpec};
pub use names::canonical_name;

use crate::common::fs::{read_to_string, write_atomic};
use crate::error::{Result, manifest};
use crate::installer::sources::Source;

/// Manifest file name
pub const MANIFEST_FILE: &str = "Pipfile";

/// Named partition of constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DependencyGroup {
    Default,
    Develop,
}

impl DependencyGroup {
    pub const ALL: [DependencyGroup; 2] = [DependencyGroup::Default, DependencyGroup::Develop];

    /// Table name in the Pipfile
    pub fn section(self) -> &'static str {
        match self {
            DependencyGroup::Default => "packages",
            DependencyGroup::Develop => "dev-packages",
        }
    }

    /// Key of the group in the lock file
    pub fn lock_key(self) -> &'static str {
        match self {
            DependencyGroup::Default => "default",
            DependencyGroup::Develop => "develop",
        }
    }

    pub fn from_dev_flag(dev: bool) -> Self {
        if dev {
            DependencyGroup::Develop
        } else {
            DependencyGroup::Default
        }
    }
}

impl fmt::Display for DependencyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.section())
    }
}

/// An editable Pipfile document
#[derive(Debug, Clone)]
pub struct Manifest {
    doc: DocumentMut,
}

impl Manifest {
    /// A fresh manifest with the default package index and empty groups
    pub fn new_default() -> Self {
        let mut doc = DocumentMut::new();

        let mut sources = ArrayOfTables::new();
        sources.push(source_table(&Source::pypi()));
        doc.insert("source", Item::ArrayOfTables(sources));

        for group in DependencyGroup::ALL {
            doc.insert(group.section(), Item::Table(Table::new()));
        }

        Self { doc }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let doc = text
            .parse::<DocumentMut>()
            .map_err(|e| manifest::parse_failed(path.display().to_string(), e.to_string()))?;
        Ok(Self { doc })
    }

    /// Declared sources in order, or the default index when none are declared
    pub fn sources(&self) -> Vec<Source> {
        let declared: Vec<Source> = match self.doc.get("source") {
            Some(Item::ArrayOfTables(tables)) => tables.iter().filter_map(parse_source).collect(),
            Some(item) => item
                .as_array()
                .map(|array| {
                    array
                        .iter()
                        .filter_map(|v| v.as_inline_table())
                        .filter_map(|t| {
                            let url = t.get("url")?.as_str()?.to_string();
                            let name = t
                                .get("name")
                                .and_then(|n| n.as_str())
                                .unwrap_or("pypi")
                                .to_string();
                            let verify_ssl =
                                t.get("verify_ssl").and_then(|v| v.as_bool()).unwrap_or(true);
                            Some(Source {
                                name,
                                url,
                                verify_ssl,
                            })
                        })
                        .collect()
                })
                .unwrap_or_default(),
            None => Vec::new(),
        };

        if declared.is_empty() {
            vec![Source::pypi()]
        } else {
            declared
        }
    }

    /// The `[requires]` block
    pub fn requires(&self) -> BTreeMap<String, String> {
        self.doc
            .get("requires")
            .and_then(Item::as_table_like)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.to_string(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Constraints of a group in declaration order
    pub fn constraints(&self, group: DependencyGroup) -> Result<Vec<DependencyConstraint>> {
        let Some(table) = self.section(group) else {
            return Ok(Vec::new());
        };
        table
            .iter()
            .map(|(name, item)| DependencyConstraint::from_manifest_entry(name, item))
            .collect()
    }

    /// Declared keys of a group, exactly as written
    pub fn package_names(&self, group: DependencyGroup) -> Vec<String> {
        self.section(group)
            .map(|table| table.iter().map(|(k, _)| k.to_string()).collect())
            .unwrap_or_default()
    }

    /// Declared key matching `name` case-insensitively
    pub fn find(&self, group: DependencyGroup, name: &str) -> Option<String> {
        let wanted = canonical_name(name);
        self.package_names(group)
            .into_iter()
            .find(|declared| canonical_name(declared) == wanted)
    }

    pub fn contains(&self, group: DependencyGroup, name: &str) -> bool {
        self.find(group, name).is_some()
    }

    /// Add or replace a constraint, matching existing entries case-insensitively
    pub fn add(&mut self, group: DependencyGroup, constraint: &DependencyConstraint) {
        let item = constraint.to_manifest_item();
        let existing = self.find(group, &constraint.name);
        self.with_section(group, |table| match existing {
            Some(key) if key == constraint.name => {
                table.insert(&key, item);
            }
            Some(key) => {
                rename_in_place(table, &key, &constraint.name);
                table.insert(&constraint.name, item);
            }
            None => {
                table.insert(&constraint.name, item);
            }
        });
    }

    /// Remove a package from a group; returns whether it was declared
    pub fn remove(&mut self, group: DependencyGroup, name: &str) -> bool {
        let Some(key) = self.find(group, name) else {
            return false;
        };
        self.with_section(group, |table| table.remove(&key).is_some())
    }

    /// Rename a declared key, keeping its value and position
    pub fn rename(&mut self, group: DependencyGroup, from: &str, to: &str) -> bool {
        let has_key = self
            .section(group)
            .is_some_and(|table| table.contains_key(from));
        if !has_key || from == to {
            return false;
        }
        self.with_section(group, |table| rename_in_place(table, from, to));
        true
    }

    pub fn is_empty(&self, group: DependencyGroup) -> bool {
        self.section(group).is_none_or(|table| table.is_empty())
    }

    fn section(&self, group: DependencyGroup) -> Option<&dyn toml_edit::TableLike> {
        self.doc.get(group.section()).and_then(Item::as_table_like)
    }

    /// Run `f` on a group's section, creating it or converting an inline table first
    fn with_section<R>(&mut self, group: DependencyGroup, f: impl FnOnce(&mut Table) -> R) -> R {
        let entry = self.doc.entry(group.section()).or_insert(Item::None);
        let mut table = std::mem::take(entry).into_table().unwrap_or_default();
        let result = f(&mut table);
        *entry = Item::Table(table);
        result
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.doc)
    }
}

/// Rebuild `table` with `from` renamed to `to` at the same position
fn rename_in_place(table: &mut Table, from: &str, to: &str) {
    let entries: Vec<(String, Item)> = table
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    table.clear();
    for (key, item) in entries {
        if key == from {
            table.insert(to, item);
        } else {
            table.insert(&key, item);
        }
    }
}

fn source_table(source: &Source) -> Table {
    let mut table = Table::new();
    table.insert("name", value(source.name.as_str()));
    table.insert("url", value(source.url.as_str()));
    table.insert("verify_ssl", value(source.verify_ssl));
    table
}

fn parse_source(table: &Table) -> Option<Source> {
    let url = table.get("url")?.as_str()?.to_string();
    Some(Source {
        name: table
            .get("name")
            .and_then(Item::as_str)
            .unwrap_or("pypi")
            .to_string(),
        url,
        verify_ssl: table
            .get("verify_ssl")
            .and_then(Item::as_bool)
            .unwrap_or(true),
    })
}

/// Loads and saves the project manifest
pub trait ManifestStore {
    fn load(&self) -> Result<Manifest>;
    fn save(&self, manifest: &Manifest) -> Result<()>;
    fn exists(&self) -> bool;
    fn path(&self) -> &Path;
}

/// Manifest stored as a TOML file on disk
#[derive(Debug, Clone)]
pub struct FileManifestStore {
    path: PathBuf,
}

impl FileManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ManifestStore for FileManifestStore {
    fn load(&self) -> Result<Manifest> {
        let text = read_to_string(&self.path)?;
        Manifest::parse(&text, &self.path)
    }

    fn save(&self, manifest: &Manifest) -> Result<()> {
        write_atomic(&self.path, manifest.to_string().as_bytes())
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
