//! Version constraints.
//!
//! ```text
//! constraint := element (('|' | ';') element)*
//! element    := term (',' term)?
//! term       := relop? version
//! relop      := '<=' | '<' | '>=' | '>'
//! ```
//!
//! Elements are alternatives (OR); the two terms of a range element must both
//! hold (AND). A term without an operator is an exact match. The empty string
//! is the unconstrained constraint.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::semver::SemVer;
use crate::core::version::Version;

/// Errors produced while parsing a constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("invalid version constraint `{input}`: empty alternative")]
    EmptyElement { input: String },

    #[error("invalid version constraint `{input}`: unexpected character `{found}`")]
    UnexpectedCharacter { input: String, found: char },

    #[error("invalid version constraint `{input}`: operator `{op}` is not followed by a version")]
    MissingVersion { input: String, op: Relation },

    #[error("invalid version constraint `{input}`: `{literal}` is not a valid version")]
    InvalidVersion { input: String, literal: String },

    #[error("invalid version constraint `{input}`: `{element}` has more than two terms")]
    TooManyTerms { input: String, element: String },

    #[error("invalid version constraint `{input}`: range `{element}` must use `<`, `<=`, `>` or `>=` on both ends")]
    InvalidRange { input: String, element: String },
}

/// Relation between a candidate version and a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Eq => "",
            Relation::Lt => "<",
            Relation::Le => "<=",
            Relation::Gt => ">",
            Relation::Ge => ">=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Eq => f.write_str("=="),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A relation paired with the version it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub relation: Relation,
    pub version: Version,
}

impl Bound {
    pub fn new(relation: Relation, version: Version) -> Self {
        Bound { relation, version }
    }

    /// Check whether `candidate` stands in this bound's relation to its version.
    pub fn test(&self, candidate: &Version) -> bool {
        match self.relation {
            Relation::Eq => candidate == &self.version,
            Relation::Lt => candidate < &self.version,
            Relation::Le => candidate <= &self.version,
            Relation::Gt => candidate > &self.version,
            Relation::Ge => candidate >= &self.version,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.relation {
            Relation::Eq => write!(f, "{}", self.version),
            rel => write!(f, "{} {}", rel.as_str(), self.version),
        }
    }
}

/// One alternative of a constraint: a bound, or a two-sided range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintElement {
    pub lower: Bound,
    pub upper: Option<Bound>,
}

impl ConstraintElement {
    pub fn test(&self, candidate: &Version) -> bool {
        self.lower.test(candidate) && self.upper.as_ref().map_or(true, |u| u.test(candidate))
    }
}

impl fmt::Display for ConstraintElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lower)?;
        if let Some(ref upper) = self.upper {
            write!(f, ", {}", upper)?;
        }
        Ok(())
    }
}

/// An OR-list of constraint elements. Empty means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionConstraint {
    elements: Vec<ConstraintElement>,
}

impl VersionConstraint {
    /// The constraint every version satisfies.
    pub fn unconstrained() -> Self {
        VersionConstraint::default()
    }

    /// Parse a constraint. Any malformed part invalidates the whole string.
    pub fn parse(input: &str) -> Result<Self, ConstraintError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(VersionConstraint::unconstrained());
        }

        let mut elements = Vec::new();
        for alternative in trimmed.split(['|', ';']) {
            elements.push(parse_element(input, alternative)?);
        }

        Ok(VersionConstraint { elements })
    }

    pub fn elements(&self) -> &[ConstraintElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True for a single exact-match element, e.g. `1.2.3`.
    pub fn is_unique(&self) -> bool {
        matches!(
            self.elements.as_slice(),
            [ConstraintElement { lower: Bound { relation: Relation::Eq, .. }, upper: None }]
        )
    }

    /// True if `version` satisfies any element.
    pub fn test(&self, version: &Version) -> bool {
        self.elements.is_empty() || self.elements.iter().any(|e| e.test(version))
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionConstraint::parse(s)
    }
}

fn parse_element(input: &str, alternative: &str) -> Result<ConstraintElement, ConstraintError> {
    let element = alternative.trim();
    if element.is_empty() {
        return Err(ConstraintError::EmptyElement {
            input: input.to_string(),
        });
    }

    let terms: Vec<&str> = element.split(',').collect();
    match terms.as_slice() {
        [single] => Ok(ConstraintElement {
            lower: parse_term(input, single)?,
            upper: None,
        }),
        [first, second] => {
            let lower = parse_term(input, first)?;
            let upper = parse_term(input, second)?;
            if lower.relation == Relation::Eq || upper.relation == Relation::Eq {
                return Err(ConstraintError::InvalidRange {
                    input: input.to_string(),
                    element: element.to_string(),
                });
            }
            Ok(ConstraintElement {
                lower,
                upper: Some(upper),
            })
        }
        _ => Err(ConstraintError::TooManyTerms {
            input: input.to_string(),
            element: element.to_string(),
        }),
    }
}

fn parse_term(input: &str, term: &str) -> Result<Bound, ConstraintError> {
    let term = term.trim();

    let (relation, rest) = if let Some(rest) = term.strip_prefix("<=") {
        (Relation::Le, rest)
    } else if let Some(rest) = term.strip_prefix(">=") {
        (Relation::Ge, rest)
    } else if let Some(rest) = term.strip_prefix('<') {
        (Relation::Lt, rest)
    } else if let Some(rest) = term.strip_prefix('>') {
        (Relation::Gt, rest)
    } else {
        (Relation::Eq, term)
    };

    let literal = rest.trim();
    let Some(first) = literal.chars().next() else {
        return match relation {
            Relation::Eq => Err(ConstraintError::EmptyElement {
                input: input.to_string(),
            }),
            op => Err(ConstraintError::MissingVersion {
                input: input.to_string(),
                op,
            }),
        };
    };

    if !(first.is_ascii_digit() || first == 'v' || first == 'V') {
        return Err(ConstraintError::UnexpectedCharacter {
            input: input.to_string(),
            found: first,
        });
    }

    if SemVer::parse(literal).is_none() {
        return Err(ConstraintError::InvalidVersion {
            input: input.to_string(),
            literal: literal.to_string(),
        });
    }

    Ok(Bound::new(relation, Version::new(literal)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holds(constraint: &str, version: &str) -> bool {
        VersionConstraint::parse(constraint)
            .unwrap()
            .test(&Version::new(version))
    }

    const GAPPED: &str =
        ">= 2.0.12, < 2.1 | >= 2.1.3, < 2.2 | >= 2.2.3, < 2.3 | >= 2.3.2, < 3 | >= 3.2";

    #[test]
    fn test_parse_single_terms() {
        let vc = VersionConstraint::parse("v2.2.4").unwrap();
        assert_eq!(vc.elements().len(), 1);
        assert_eq!(vc.elements()[0].lower.relation, Relation::Eq);
        assert_eq!(vc.elements()[0].lower.version, Version::new("2.2.4"));
        assert!(vc.elements()[0].upper.is_none());
        assert!(vc.is_unique());

        for (text, rel) in [
            (">2.2.3-rc1", Relation::Gt),
            (">v2.2.3-rc1", Relation::Gt),
            (">=2.2.3-rc1", Relation::Ge),
            ("<2.2.3-rc1", Relation::Lt),
            ("<=2.2.3-rc1", Relation::Le),
        ] {
            let vc = VersionConstraint::parse(text).unwrap();
            assert_eq!(vc.elements()[0].lower.relation, rel, "{}", text);
            assert_eq!(vc.elements()[0].lower.version, Version::new("v2.2.3-rc1"));
            assert!(!vc.is_unique());
        }
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            VersionConstraint::parse("<=d.2.3-rc1"),
            Err(ConstraintError::UnexpectedCharacter { found: 'd', .. })
        ));
        assert!(matches!(
            VersionConstraint::parse("l1.2.3-rc1"),
            Err(ConstraintError::UnexpectedCharacter { found: 'l', .. })
        ));
        assert!(matches!(
            VersionConstraint::parse("<=1.2.3*rc1"),
            Err(ConstraintError::InvalidVersion { .. })
        ));
        assert!(matches!(
            VersionConstraint::parse(">>d.2.3-rc1"),
            Err(ConstraintError::UnexpectedCharacter { found: '>', .. })
        ));
        assert!(matches!(
            VersionConstraint::parse(">="),
            Err(ConstraintError::MissingVersion { op: Relation::Ge, .. })
        ));
        assert!(matches!(
            VersionConstraint::parse("1.0 |"),
            Err(ConstraintError::EmptyElement { .. })
        ));
        assert!(matches!(
            VersionConstraint::parse("> 1, < 2, < 3"),
            Err(ConstraintError::TooManyTerms { .. })
        ));
        assert!(matches!(
            VersionConstraint::parse("1.0, < 2"),
            Err(ConstraintError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_empty_is_unconstrained() {
        let vc = VersionConstraint::parse("   ").unwrap();
        assert!(vc.is_empty());
        assert!(vc.test(&Version::new("999")));
        assert!(vc.test(&Version::new("not-a-version")));
    }

    #[test]
    fn test_exact_and_open_bounds() {
        assert!(holds("1.0.0", "1.0.0"));
        assert!(!holds("1.0.0", "1.0.1"));
        assert!(holds("<= 1.0.0", "1.0.0"));
        assert!(holds(">= 1.0.0", "1.0.0"));
        assert!(!holds("< 1.0.0", "1.0.0"));
        assert!(!holds("> 1.0.0", "1.0.0"));
        assert!(holds("> 2, < 3", "2.1"));
        assert!(!holds(">=2.0", "1.9.0"));
    }

    #[test]
    fn test_alternatives_with_gaps() {
        for inside in ["2.0.12", "2.1.3", "2.2.3", "2.2.99", "2.3.2", "3.2", "3.3"] {
            assert!(holds(GAPPED, inside), "{} should satisfy", inside);
        }
        for outside in ["2.0", "2.1", "2.2", "2.3", "3.0"] {
            assert!(!holds(GAPPED, outside), "{} should not satisfy", outside);
        }
    }

    #[test]
    fn test_semicolon_separates_alternatives() {
        assert!(holds("1.0.0; 2.0.0", "2.0.0"));
        assert!(!holds("1.0.0; 2.0.0", "1.5.0"));
    }

    #[test]
    fn test_display_is_reparseable() {
        let vc = VersionConstraint::parse(">=2.0,<3.0|1.2.3").unwrap();
        assert_eq!(vc.to_string(), ">= 2.0, < 3.0 | 1.2.3");
        assert_eq!(VersionConstraint::parse(&vc.to_string()).unwrap(), vc);
    }
}
