//! npm-style version range parsing and matching
//!
//! Implements the range grammar found in npm manifests on top of
//! [`semver::Version`]:
//! - `1.2.3`, `=1.2.3` - exact version
//! - `>=1.2.0 <2.0.0` - comparators joined by whitespace (all must hold)
//! - `1.x`, `1.2.*`, `*` - X-ranges
//! - `~1.2.3` - patch-level changes
//! - `^1.2.3` - changes that keep the left-most non-zero part
//! - `1.2.3 - 2.3.4` - inclusive hyphen range
//! - `^16 || ^17` - unions
//!
//! A prerelease version only satisfies a comparator set that names a
//! prerelease on the same `major.minor.patch` tuple.

use semver::{Prerelease, Version};
use shdeps_errors::VersionError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a single comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Exact,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

/// A primitive `<op><version>` comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Check if a version satisfies this comparator (build metadata ignored)
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        let ord = precedence(version, &self.version);
        match self.op {
            Op::Exact => ord == Ordering::Equal,
            Op::Less => ord == Ordering::Less,
            Op::LessEq => ord != Ordering::Greater,
            Op::Greater => ord == Ordering::Greater,
            Op::GreaterEq => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Op::Exact => "",
            Op::Less => "<",
            Op::LessEq => "<=",
            Op::Greater => ">",
            Op::GreaterEq => ">=",
        };
        write!(f, "{op}{}", self.version)
    }
}

fn precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Comparators that must all hold
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ComparatorSet {
    comparators: Vec<Comparator>,
}

impl ComparatorSet {
    /// `<0.0.0-0` is satisfied by nothing
    fn never() -> Self {
        Self {
            comparators: vec![Comparator::new(
                Op::Less,
                Version {
                    pre: Prerelease::new("0").unwrap_or_default(),
                    ..Version::new(0, 0, 0)
                },
            )],
        }
    }

    fn matches(&self, version: &Version) -> bool {
        if !self.comparators.iter().all(|c| c.matches(version)) {
            return false;
        }
        if version.pre.is_empty() {
            return true;
        }
        self.comparators.iter().any(|c| {
            !c.version.pre.is_empty()
                && c.version.major == version.major
                && c.version.minor == version.minor
                && c.version.patch == version.patch
        })
    }
}

/// A parsed npm version range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    raw: String,
    sets: Vec<ComparatorSet>,
}

impl VersionRange {
    /// A range matching exactly one version
    #[must_use]
    pub fn exact(version: &Version) -> Self {
        Self {
            raw: version.to_string(),
            sets: vec![ComparatorSet {
                comparators: vec![Comparator::new(Op::Exact, version.clone())],
            }],
        }
    }

    /// Check if a version satisfies any alternative of this range
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.matches(version))
    }

    /// Like [`matches`](Self::matches) for a raw version string; strings that
    /// are not valid semantic versions never match.
    #[must_use]
    pub fn matches_str(&self, version: &str) -> bool {
        Version::parse(version.trim()).is_ok_and(|v| self.matches(&v))
    }

    /// The range as originally written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Desugared comparators, one inner list per `||` alternative
    #[must_use]
    pub fn comparators(&self) -> Vec<&[Comparator]> {
        self.sets.iter().map(|s| s.comparators.as_slice()).collect()
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sets = s
            .split("||")
            .map(|part| parse_set(part, s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: s.trim().to_string(),
            sets,
        })
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A version with possibly missing (wildcard) parts
#[derive(Debug, Clone, Default)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn floor(&self) -> Version {
        Version {
            pre: self.pre.clone(),
            ..Version::new(
                self.major.unwrap_or(0),
                self.minor.unwrap_or(0),
                self.patch.unwrap_or(0),
            )
        }
    }
}

fn invalid(range: &str) -> VersionError {
    VersionError::InvalidRange {
        input: range.trim().to_string(),
    }
}

fn parse_partial(input: &str, range: &str) -> Result<Partial, VersionError> {
    let input = input.trim_start_matches(['v', 'V', '=']);
    if input.is_empty() {
        return Err(invalid(range));
    }

    // Build metadata never takes part in matching
    let input = input.split_once('+').map_or(input, |(core, _)| core);
    let (core, pre) = match input.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (input, None),
    };

    let mut parts = [None; 3];
    let mut wildcard = false;
    let mut count = 0;
    for (idx, part) in core.split('.').enumerate() {
        if idx >= 3 {
            return Err(invalid(range));
        }
        count += 1;
        if matches!(part, "x" | "X" | "*") {
            wildcard = true;
            continue;
        }
        let n = part.parse::<u64>().map_err(|_| invalid(range))?;
        if !wildcard {
            parts[idx] = Some(n);
        }
    }

    let pre = match pre {
        Some(pre) if count == 3 && !wildcard => {
            Prerelease::new(pre).map_err(|_| invalid(range))?
        }
        Some(_) => return Err(invalid(range)),
        None => Prerelease::EMPTY,
    };

    Ok(Partial {
        major: parts[0],
        minor: parts[1],
        patch: parts[2],
        pre,
    })
}

const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

fn split_operator(token: &str) -> (&str, &str) {
    for op in OPERATORS {
        if let Some(rest) = token.strip_prefix(op) {
            return (op, rest);
        }
    }
    ("", token)
}

fn parse_set(input: &str, range: &str) -> Result<ComparatorSet, VersionError> {
    let words: Vec<&str> = input.split_whitespace().collect();

    if words.len() == 3 && words[1] == "-" {
        return Ok(hyphen(
            &parse_partial(words[0], range)?,
            &parse_partial(words[2], range)?,
        ));
    }

    // npm tolerates whitespace between an operator and its version
    let mut tokens = Vec::with_capacity(words.len());
    let mut pending: Option<&str> = None;
    for word in words {
        if OPERATORS.contains(&word) {
            if pending.replace(word).is_some() {
                return Err(invalid(range));
            }
            continue;
        }
        tokens.push(match pending.take() {
            Some(op) => format!("{op}{word}"),
            None => word.to_string(),
        });
    }
    if pending.is_some() {
        return Err(invalid(range));
    }

    let mut set = ComparatorSet::default();
    for token in tokens {
        let (op, rest) = split_operator(&token);
        let partial = parse_partial(rest, range)?;
        match desugar(op, &partial) {
            Some(comparators) => set.comparators.extend(comparators),
            None => return Ok(ComparatorSet::never()),
        }
    }
    Ok(set)
}

fn bump_major(p: &Partial) -> Version {
    Version::new(p.major.unwrap_or(0).saturating_add(1), 0, 0)
}

fn bump_minor(p: &Partial) -> Version {
    Version::new(
        p.major.unwrap_or(0),
        p.minor.unwrap_or(0).saturating_add(1),
        0,
    )
}

/// Expand one token into primitive comparators; `None` means unsatisfiable.
fn desugar(op: &str, p: &Partial) -> Option<Vec<Comparator>> {
    use Op::{Exact, GreaterEq, Less, LessEq};

    if p.major.is_none() {
        return match op {
            ">" | "<" => None,
            _ => Some(Vec::new()),
        };
    }

    let comparators = match op {
        "" | "=" => match (p.minor, p.patch) {
            (None, _) => vec![
                Comparator::new(GreaterEq, p.floor()),
                Comparator::new(Less, bump_major(p)),
            ],
            (Some(_), None) => vec![
                Comparator::new(GreaterEq, p.floor()),
                Comparator::new(Less, bump_minor(p)),
            ],
            (Some(_), Some(_)) => vec![Comparator::new(Exact, p.floor())],
        },
        "~" | "~>" => match p.minor {
            None => vec![
                Comparator::new(GreaterEq, p.floor()),
                Comparator::new(Less, bump_major(p)),
            ],
            Some(_) => vec![
                Comparator::new(GreaterEq, p.floor()),
                Comparator::new(Less, bump_minor(p)),
            ],
        },
        "^" => {
            let upper = match (p.major, p.minor, p.patch) {
                (Some(0), Some(0), Some(patch)) => Version::new(0, 0, patch.saturating_add(1)),
                (Some(0), Some(_), _) => bump_minor(p),
                _ => bump_major(p),
            };
            vec![
                Comparator::new(GreaterEq, p.floor()),
                Comparator::new(Less, upper),
            ]
        }
        ">" => match (p.minor, p.patch) {
            (None, _) => vec![Comparator::new(GreaterEq, bump_major(p))],
            (Some(_), None) => vec![Comparator::new(GreaterEq, bump_minor(p))],
            (Some(_), Some(_)) => vec![Comparator::new(Op::Greater, p.floor())],
        },
        ">=" => vec![Comparator::new(GreaterEq, p.floor())],
        "<" => vec![Comparator::new(Less, p.floor())],
        "<=" => match (p.minor, p.patch) {
            (None, _) => vec![Comparator::new(Less, bump_major(p))],
            (Some(_), None) => vec![Comparator::new(Less, bump_minor(p))],
            (Some(_), Some(_)) => vec![Comparator::new(LessEq, p.floor())],
        },
        _ => unreachable!("split_operator only yields known operators"),
    };
    Some(comparators)
}

fn hyphen(lower: &Partial, upper: &Partial) -> ComparatorSet {
    let mut comparators = Vec::with_capacity(2);
    if lower.major.is_some() {
        comparators.push(Comparator::new(Op::GreaterEq, lower.floor()));
    }
    if upper.major.is_some() {
        comparators.push(match (upper.minor, upper.patch) {
            (None, _) => Comparator::new(Op::Less, bump_major(upper)),
            (Some(_), None) => Comparator::new(Op::Less, bump_minor(upper)),
            (Some(_), Some(_)) => Comparator::new(Op::LessEq, upper.floor()),
        });
    }
    ComparatorSet { comparators }
}
