use crate::Er7Error;
use std::fmt;
use std::str::FromStr;

/// HL7 v2 versions with grammar tables.
///
/// Ordering follows release order, so `v >= Version::V2_4` reads as "2.4 or later".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V2_3,
    V2_3_1,
    V2_4,
    V2_5,
    V2_5_1,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V2_3 => "2.3",
            Version::V2_3_1 => "2.3.1",
            Version::V2_4 => "2.4",
            Version::V2_5 => "2.5",
            Version::V2_5_1 => "2.5.1",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = Er7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2.3" => Ok(Version::V2_3),
            "2.3.1" => Ok(Version::V2_3_1),
            "2.4" => Ok(Version::V2_4),
            "2.5" => Ok(Version::V2_5),
            "2.5.1" => Ok(Version::V2_5_1),
            other => Err(Er7Error::UnsupportedVersion(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_versions() {
        assert_eq!("2.3".parse::<Version>().unwrap(), Version::V2_3);
        assert_eq!(" 2.5.1 ".parse::<Version>().unwrap(), Version::V2_5_1);
    }

    #[test]
    fn test_parse_unknown_version() {
        assert_eq!(
            "2.9".parse::<Version>(),
            Err(Er7Error::UnsupportedVersion("2.9".into()))
        );
    }

    #[test]
    fn test_release_ordering() {
        assert!(Version::V2_3 < Version::V2_3_1);
        assert!(Version::V2_5_1 > Version::V2_4);
    }
}
