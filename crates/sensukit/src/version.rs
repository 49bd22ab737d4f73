//! Backend version parsing and gating.

use std::fmt;

/// Version reported by the backend's info endpoint.
///
/// Development builds report tags that do not parse as a plain dotted
/// version; those collapse to [`BackendVersion::Unknown`], which is
/// treated as newer than any release when gating features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendVersion {
    /// A regular `major.minor.patch` release.
    Release {
        /// Major component.
        major: u64,
        /// Minor component.
        minor: u64,
        /// Patch component.
        patch: u64,
    },
    /// The version string did not parse as a dotted release version.
    Unknown,
}

impl BackendVersion {
    /// Parse a version string, collapsing anything unparsable to
    /// [`BackendVersion::Unknown`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.trim().splitn(3, '.');
        let triple = (
            parts.next().and_then(|p| p.parse::<u64>().ok()),
            parts.next().and_then(|p| p.parse::<u64>().ok()),
            parts.next().and_then(|p| p.parse::<u64>().ok()),
        );
        match triple {
            (Some(major), Some(minor), Some(patch)) => Self::Release { major, minor, patch },
            _ => Self::Unknown,
        }
    }

    /// Whether this version satisfies a minimum release requirement.
    ///
    /// `Unknown` always satisfies: an unparsable tag is a development
    /// build ahead of every release.
    #[must_use]
    pub fn at_least(&self, major: u64, minor: u64, patch: u64) -> bool {
        match self {
            Self::Unknown => true,
            Self::Release {
                major: own_major,
                minor: own_minor,
                patch: own_patch,
            } => (*own_major, *own_minor, *own_patch) >= (major, minor, patch),
        }
    }
}

impl fmt::Display for BackendVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release { major, minor, patch } => write!(f, "{}.{}.{}", major, minor, patch),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        assert_eq!(
            BackendVersion::parse("6.2.5"),
            BackendVersion::Release { major: 6, minor: 2, patch: 5 }
        );
    }

    #[test]
    fn test_parse_dev_tag_is_unknown() {
        assert_eq!(BackendVersion::parse("6.5.0-dev"), BackendVersion::Unknown);
        assert_eq!(BackendVersion::parse("(devel)"), BackendVersion::Unknown);
        assert_eq!(BackendVersion::parse(""), BackendVersion::Unknown);
        assert_eq!(BackendVersion::parse("6.5"), BackendVersion::Unknown);
    }

    #[test]
    fn test_at_least() {
        let v = BackendVersion::parse("6.5.0");
        assert!(v.at_least(6, 5, 0));
        assert!(v.at_least(5, 21, 3));
        assert!(!v.at_least(6, 6, 0));
    }

    #[test]
    fn test_unknown_passes_every_gate() {
        assert!(BackendVersion::Unknown.at_least(99, 0, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(BackendVersion::parse("6.2.5").to_string(), "6.2.5");
        assert_eq!(BackendVersion::Unknown.to_string(), "unknown");
    }
}
