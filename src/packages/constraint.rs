//! Semantic-version constraint matching for package-table keys.
//!
//! Versions coming from `os-release` are rarely strict semver (`24.04`,
//! `40`, `15.6`), so both versions and constraint operands are normalised
//! before being handed to [`semver`]: a leading `v` is dropped, leading
//! zeros are stripped and missing minor/patch components default to `0`.
use semver::{Version, VersionReq};
use thiserror::Error;

/// Constraint key that applies to every version.
pub const COMMON: &str = "common";

/// Errors raised while parsing versions or constraint expressions.
#[derive(Error, Debug)]
pub enum ConstraintError {
    /// The system version is not a semantic version.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        /// The offending version string.
        version: String,
        /// Underlying parse error.
        source: semver::Error,
    },

    /// The constraint expression could not be parsed.
    #[error("invalid constraint '{constraint}': {reason}")]
    InvalidConstraint {
        /// The offending constraint expression.
        constraint: String,
        /// Human-readable parse failure.
        reason: String,
    },
}

/// One `||` alternative: every comparator must hold and no excluded
/// version may match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    require: VersionReq,
    exclude: Vec<VersionReq>,
}

impl Alternative {
    fn matches(&self, version: &Version) -> bool {
        self.require.matches(version) && !self.exclude.iter().any(|req| req.matches(version))
    }
}

/// A parsed constraint: either [`COMMON`] or a set of OR-ed alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Matches every version.
    Common,
    /// Matches when any of the alternatives matches.
    Range(Vec<Alternative>),
}

impl Constraint {
    /// Parse a constraint expression.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError::InvalidConstraint`] if any comparator is
    /// malformed.
    pub fn parse(expr: &str) -> Result<Self, ConstraintError> {
        let expr = expr.trim();
        if expr == COMMON {
            return Ok(Self::Common);
        }
        let invalid = |reason: String| ConstraintError::InvalidConstraint {
            constraint: expr.to_string(),
            reason,
        };
        if expr.is_empty() {
            return Err(invalid("empty expression".to_string()));
        }

        let mut alternatives = Vec::new();
        for alternative in expr.split("||") {
            let (required, excluded) = comparators(alternative).map_err(&invalid)?;
            let require = if required.is_empty() {
                VersionReq::STAR
            } else {
                VersionReq::parse(&required.join(", ")).map_err(|e| invalid(e.to_string()))?
            };
            let exclude = excluded
                .iter()
                .map(|c| VersionReq::parse(c).map_err(|e| invalid(e.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            alternatives.push(Alternative { require, exclude });
        }
        Ok(Self::Range(alternatives))
    }

    /// Check `version` against this constraint.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Common => true,
            Self::Range(alternatives) => alternatives.iter().any(|req| req.matches(version)),
        }
    }
}

/// Parse a version string leniently into a [`Version`].
///
/// # Errors
///
/// Returns [`ConstraintError::InvalidVersion`] if the normalised string is
/// still not valid semver.
pub fn parse_version(version: &str) -> Result<Version, ConstraintError> {
    Version::parse(&normalize_version(version)).map_err(|source| {
        ConstraintError::InvalidVersion {
            version: version.to_string(),
            source,
        }
    })
}

/// Evaluate `constraint_expr` against `version`.
///
/// # Errors
///
/// Returns an error if `version` is not a semantic version or the
/// expression is malformed.
pub fn matches(constraint_expr: &str, version: &str) -> Result<bool, ConstraintError> {
    let version = parse_version(version)?;
    Ok(Constraint::parse(constraint_expr)?.matches(&version))
}

/// Split one `||` alternative into normalised `semver` comparators, returned
/// as (required, excluded). `!=X` lands in the excluded list as `=X`.
///
/// Handles space- or comma-separated AND, operators detached from their
/// operand (`>= 24.04`) and hyphen ranges (`1.2 - 1.4`).
fn comparators(alternative: &str) -> Result<(Vec<String>, Vec<String>), String> {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("empty alternative".to_string());
    }

    let mut out = Vec::new();
    let mut excluded = Vec::new();
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        let op_len = token
            .find(|c: char| !matches!(c, '=' | '!' | '<' | '>' | '~' | '^'))
            .unwrap_or(token.len());
        let (op, operand) = token.split_at(op_len);

        let operand = if operand.is_empty() {
            iter.next()
                .ok_or_else(|| format!("operator '{op}' has no version"))?
        } else {
            operand
        };

        if op.is_empty() && iter.peek() == Some(&"-") {
            iter.next();
            let upper = iter
                .next()
                .ok_or_else(|| format!("range '{operand} -' has no upper bound"))?;
            out.push(format!(">={}", normalize_operand(operand)));
            out.push(format!("<={}", normalize_operand(upper)));
            continue;
        }

        match op {
            "!=" => excluded.push(format!("={}", normalize_operand(operand))),
            "" if is_wildcard(operand) => out.push("*".to_string()),
            // A bare version means an exact match, unlike cargo's caret default.
            "" => out.push(format!("={}", normalize_operand(operand))),
            _ => out.push(format!("{op}{}", normalize_operand(operand))),
        }
    }
    Ok((out, excluded))
}

fn is_wildcard(s: &str) -> bool {
    matches!(s, "*" | "x" | "X")
}

/// Normalise a constraint operand, keeping partial versions partial so that
/// `semver` range semantics (`=24` meaning `>=24.0.0, <25.0.0`) still apply.
fn normalize_operand(operand: &str) -> String {
    let operand = operand.strip_prefix('v').unwrap_or(operand);
    let (core, rest) = split_core(operand);
    let core: Vec<String> = core
        .split('.')
        .map(|part| {
            if is_wildcard(part) {
                "*".to_string()
            } else {
                strip_leading_zeros(part)
            }
        })
        .collect();
    format!("{}{rest}", core.join("."))
}

/// Normalise a version into strict `MAJOR.MINOR.PATCH[-pre][+build]` form.
fn normalize_version(version: &str) -> String {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let (core, rest) = split_core(version);
    let mut parts: Vec<String> = core.split('.').map(strip_leading_zeros).collect();
    while parts.len() < 3 {
        parts.push("0".to_string());
    }
    format!("{}{rest}", parts.join("."))
}

/// Split `1.2.3-rc.1+build` into (`1.2.3`, `-rc.1+build`).
fn split_core(s: &str) -> (&str, &str) {
    let idx = s.find(['-', '+']).unwrap_or(s.len());
    s.split_at(idx)
}

fn strip_leading_zeros(part: &str) -> String {
    if part.len() > 1 && part.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = part.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        part.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn common_matches_every_version() {
        assert!(matches("common", "24.04").unwrap());
        assert!(matches("common", "0.0.1-alpha").unwrap());
    }

    #[test]
    fn lower_bound_on_ubuntu_versions() {
        assert!(matches(">=24.04", "24.10").unwrap());
        assert!(matches(">=24.04", "24.04").unwrap());
        assert!(!matches(">=24.04", "22.04").unwrap());
    }

    #[test]
    fn upper_bound_excludes() {
        assert!(matches("<24.04", "22.04").unwrap());
        assert!(!matches("<24.04", "24.04").unwrap());
    }

    #[test]
    fn detached_operator_is_accepted() {
        assert!(matches(">= 20.04", "22.04").unwrap());
    }

    #[test]
    fn and_with_comma_and_space() {
        assert!(matches(">=20.04, <24.04", "22.04").unwrap());
        assert!(matches(">=20.04 <24.04", "22.04").unwrap());
        assert!(!matches(">=20.04 <24.04", "24.10").unwrap());
    }

    #[test]
    fn or_alternatives() {
        assert!(matches("<20.04 || >=24.04", "24.04").unwrap());
        assert!(matches("<20.04 || >=24.04", "18.04").unwrap());
        assert!(!matches("<20.04 || >=24.04", "22.04").unwrap());
    }

    #[test]
    fn hyphen_range_is_inclusive() {
        assert!(matches("20.04 - 22.04", "20.04").unwrap());
        assert!(matches("20.04 - 22.04", "22.04").unwrap());
        assert!(!matches("20.04 - 22.04", "22.10").unwrap());
    }

    #[test]
    fn bare_version_is_exact() {
        assert!(matches("24.04", "24.04").unwrap());
        assert!(!matches("24.04", "24.10").unwrap());
    }

    #[test]
    fn single_component_versions() {
        assert!(matches(">=40", "41").unwrap());
        assert!(!matches(">=40", "39").unwrap());
    }

    #[test]
    fn tilde_and_caret() {
        assert!(matches("~15.5", "15.5.2").unwrap());
        assert!(!matches("~15.5", "15.6").unwrap());
        assert!(matches("^3.19", "3.20").unwrap());
    }

    #[test]
    fn wildcard_matches_anything() {
        assert!(matches("*", "3.20").unwrap());
    }

    #[test]
    fn invalid_version_is_an_error_not_false() {
        let err = matches(">=24.04", "rolling").unwrap_err();
        assert!(matches!(err, ConstraintError::InvalidVersion { .. }));
        assert!(err.to_string().contains("rolling"));
    }

    #[test]
    fn empty_version_is_an_error() {
        assert!(matches("common", "").is_err());
    }

    #[test]
    fn malformed_constraint_is_an_error() {
        for expr in [">=", ">=abc", "", "1.0 -", "!=", "!=abc"] {
            let err = Constraint::parse(expr).unwrap_err();
            assert!(
                matches!(err, ConstraintError::InvalidConstraint { .. }),
                "expected invalid constraint for {expr:?}"
            );
        }
    }

    #[test]
    fn not_equal_excludes_one_version() {
        assert!(matches("!=24.04", "24.10").unwrap());
        assert!(matches("!=24.04", "22.04").unwrap());
        assert!(!matches("!=24.04", "24.04").unwrap());
    }

    #[test]
    fn not_equal_combines_with_bounds() {
        assert!(matches(">=22.04, !=23.04", "22.10").unwrap());
        assert!(!matches(">=22.04, !=23.04", "23.04").unwrap());
        assert!(!matches(">=22.04 != 23.04", "20.04").unwrap());
        assert!(matches("!=23.04 || 23.04", "23.04").unwrap());
    }

    #[test]
    fn parse_version_normalises() {
        assert_eq!(parse_version("24.04").unwrap(), Version::new(24, 4, 0));
        assert_eq!(parse_version("v6").unwrap(), Version::new(6, 0, 0));
        assert_eq!(parse_version("6.8.0").unwrap(), Version::new(6, 8, 0));
    }

    #[test]
    fn parse_version_keeps_prerelease() {
        let v = parse_version("6.8.0-31-generic").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (6, 8, 0));
        assert_eq!(v.pre.as_str(), "31-generic");
    }
}
