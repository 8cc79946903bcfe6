//! Version parsing and specifier matching
//!
//! A practical subset of PEP 440: epochs, release segments, pre/post/dev releases and
//! local labels are parsed; local labels are ignored for ordering. Specifiers support
//! `==`, `!=`, `<=`, `>=`, `<`, `>`, `~=`, `===`, wildcard equality (`==1.2.*`) and
//! comma-separated conjunctions. `*` and the empty string match everything.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PinenvError, Result, manifest};

#[allow(clippy::expect_used)]
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^\s*v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_implicit>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n>\d+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("valid version regex")
});

#[allow(clippy::expect_used)]
static SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<op>~=|===|==|!=|<=|>=|<|>)\s*(?P<version>[^\s,]+)\s*$")
        .expect("valid specifier regex")
});

/// Pre-release phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Candidate,
}

/// A parsed version
#[derive(Debug, Clone)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<String>,
}

impl Version {
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Release segments without trailing zeros, so `1.0` and `1.0.0` compare equal
    fn trimmed_release(&self) -> &[u64] {
        let end = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..end]
    }

    fn release_component(&self, index: usize) -> u64 {
        self.release.get(index).copied().unwrap_or(0)
    }

    fn has_release_prefix(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, &n)| self.release_component(i) == n)
    }

    fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && self.trimmed_release() == other.trimmed_release()
    }

    #[allow(clippy::type_complexity)]
    fn sort_key(&self) -> (u64, &[u64], (u8, u8, u64), (u8, u64), (u8, u64)) {
        let pre = match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => (0, 0, 0),
            (Some((phase, n)), _, _) => (1, phase as u8, n),
            _ => (2, 0, 0),
        };
        let post = self.post.map_or((0, 0), |n| (1, n));
        let dev = self.dev.map_or((1, 0), |n| (0, n));
        (self.epoch, self.trimmed_release(), pre, post, dev)
    }
}

impl FromStr for Version {
    type Err = PinenvError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = VERSION
            .captures(s)
            .ok_or_else(|| manifest::invalid_requirement(s, "not a valid version"))?;

        let number =
            |name: &str| -> Option<u64> { caps.name(name).and_then(|m| m.as_str().parse().ok()) };

        let release = caps["release"]
            .split('.')
            .map(|n| n.parse::<u64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| manifest::invalid_requirement(s, e.to_string()))?;

        let pre = caps.name("pre_l").map(|label| {
            let phase = match label.as_str().to_ascii_lowercase().as_str() {
                "a" | "alpha" => PreRelease::Alpha,
                "b" | "beta" => PreRelease::Beta,
                _ => PreRelease::Candidate,
            };
            (phase, number("pre_n").unwrap_or(0))
        });

        let post = number("post_implicit")
            .or_else(|| caps.name("post_l").map(|_| number("post_n").unwrap_or(0)));
        let dev = caps.name("dev_l").map(|_| number("dev_n").unwrap_or(0));

        Ok(Version {
            epoch: number("epoch").unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_ascii_lowercase()),
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some((phase, n)) = self.pre {
            let label = match phase {
                PreRelease::Alpha => "a",
                PreRelease::Beta => "b",
                PreRelease::Candidate => "rc",
            };
            write!(f, "{}{}", label, n)?;
        }
        if let Some(n) = self.post {
            write!(f, ".post{}", n)?;
        }
        if let Some(n) = self.dev {
            write!(f, ".dev{}", n)?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}

/// Comparison operator of a single specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Arbitrary,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "~=" => Operator::Compatible,
            "===" => Operator::Arbitrary,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            _ => return None,
        })
    }
}

/// One `<op><version>` clause
#[derive(Debug, Clone)]
pub struct Specifier {
    operator: Operator,
    raw: String,
    version: Option<Version>,
    wildcard: Option<Vec<u64>>,
}

impl Specifier {
    fn parse(clause: &str, full: &str) -> Result<Self> {
        let caps = SPECIFIER.captures(clause).ok_or_else(|| {
            manifest::invalid_requirement(full, format!("bad specifier '{}'", clause.trim()))
        })?;
        let operator = Operator::parse(&caps["op"])
            .ok_or_else(|| manifest::invalid_requirement(full, "unknown operator"))?;
        let raw = caps["version"].to_string();

        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                raw,
                version: None,
                wildcard: None,
            });
        }

        if let Some(prefix) = raw.strip_suffix(".*") {
            if !matches!(operator, Operator::Equal | Operator::NotEqual) {
                return Err(manifest::invalid_requirement(
                    full,
                    "wildcards are only allowed with == and !=",
                ));
            }
            let version: Version = prefix.parse()?;
            return Ok(Self {
                operator,
                wildcard: Some(version.release.clone()),
                version: Some(version),
                raw,
            });
        }

        let version: Version = raw.parse()?;
        if operator == Operator::Compatible && version.release.len() < 2 {
            return Err(manifest::invalid_requirement(
                full,
                "~= needs at least two release segments",
            ));
        }
        Ok(Self {
            operator,
            raw,
            version: Some(version),
            wildcard: None,
        })
    }

    /// Whether `candidate` (and its original text, for `===`) satisfies this clause
    pub fn contains(&self, candidate: &Version, candidate_raw: &str) -> bool {
        let Some(spec) = &self.version else {
            return candidate_raw.trim().eq_ignore_ascii_case(self.raw.trim());
        };

        if let Some(prefix) = &self.wildcard {
            let matches = candidate.epoch == spec.epoch && candidate.has_release_prefix(prefix);
            return match self.operator {
                Operator::NotEqual => !matches,
                _ => matches,
            };
        }

        match self.operator {
            Operator::Equal => candidate == spec,
            Operator::NotEqual => candidate != spec,
            Operator::LessEqual => candidate <= spec,
            Operator::GreaterEqual => candidate >= spec,
            Operator::Less => {
                candidate < spec
                    && !(candidate.is_prerelease()
                        && !spec.is_prerelease()
                        && candidate.same_release(spec))
            }
            Operator::Greater => {
                candidate > spec
                    && !(candidate.post.is_some()
                        && spec.post.is_none()
                        && candidate.same_release(spec))
            }
            Operator::Compatible => {
                let prefix = &spec.release[..spec.release.len() - 1];
                candidate >= spec
                    && candidate.epoch == spec.epoch
                    && candidate.has_release_prefix(prefix)
            }
            Operator::Arbitrary => false,
        }
    }
}

/// A conjunction of specifiers
#[derive(Debug, Clone, Default)]
pub struct VersionSpecifiers {
    clauses: Vec<Specifier>,
}

impl VersionSpecifiers {
    /// Parse `>=1.0,<2`; `*` and the empty string match every version
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() || spec == "*" {
            return Ok(Self::default());
        }
        let clauses = spec
            .split(',')
            .filter(|clause| !clause.trim().is_empty())
            .map(|clause| Specifier::parse(clause, spec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    pub fn is_any(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn contains(&self, candidate: &Version, candidate_raw: &str) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.contains(candidate, candidate_raw))
    }

    /// Parse `candidate` and check it; unparseable versions only satisfy `*`
    pub fn contains_str(&self, candidate: &str) -> bool {
        match candidate.parse::<Version>() {
            Ok(version) => self.contains(&version, candidate),
            Err(_) => self.is_any(),
        }
    }
}
