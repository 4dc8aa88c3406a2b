use std::{fmt, result, str::FromStr};

use crate::{Error, Result};

/// The font containers this crate converts between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// Plain TrueType/OpenType (`00 01 00 00`, `true` or `OTTO`).
    Sfnt,
    Woff,
    Woff2,
}

/// A format name outside `sfnt`, `truetype`, `woff` and `woff2`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown font format '{0}' (expected sfnt, truetype, woff or woff2)")]
pub struct UnknownFormat(pub String);

impl ContainerFormat {
    pub const ALL: [Self; 3] = [Self::Sfnt, Self::Woff, Self::Woff2];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sfnt => "sfnt",
            Self::Woff => "woff",
            Self::Woff2 => "woff2",
        }
    }

    /// Look up a format by name. `truetype` is an alias for `sfnt`; names
    /// are case-sensitive.
    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "sfnt" | "truetype" => Some(Self::Sfnt),
            "woff" => Some(Self::Woff),
            "woff2" => Some(Self::Woff2),
            _ => None,
        }
    }

    pub fn parse_target(name: &str) -> Result<Self> {
        Self::resolve(name).ok_or_else(|| Error::UnsupportedTarget { format: name.to_string() })
    }

    pub fn parse_source(name: &str) -> Result<Self> {
        Self::resolve(name).ok_or_else(|| Error::UnsupportedSource { format: name.to_string() })
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContainerFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> result::Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for format in ContainerFormat::ALL {
            assert_eq!(format.to_string().parse::<ContainerFormat>(), Ok(format));
        }
    }

    #[test]
    fn test_truetype_alias() {
        assert_eq!("truetype".parse(), Ok(ContainerFormat::Sfnt));
        assert_eq!(ContainerFormat::Sfnt.to_string(), "sfnt");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!("WOFF".parse::<ContainerFormat>(), Err(UnknownFormat("WOFF".to_string())));
        assert_eq!(ContainerFormat::resolve("TrueType"), None);
    }

    #[test]
    fn test_boundary_errors() {
        assert!(matches!(
            ContainerFormat::parse_target("footype"),
            Err(Error::UnsupportedTarget { format }) if format == "footype"
        ));
        assert!(matches!(
            ContainerFormat::parse_source("footype"),
            Err(Error::UnsupportedSource { format }) if format == "footype"
        ));
    }
}
