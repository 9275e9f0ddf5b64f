//! Dataset split identifiers.

use crate::error::IngestError;
use std::fmt;
use std::str::FromStr;

/// A named partition of the corpus. Closed set: anything else is rejected
/// before the pipeline touches the network or the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    /// All splits in canonical processing order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }

    /// Names used for this split in Hub data-file layouts, canonical name first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Split::Train => &["train", "training"],
            Split::Validation => &["validation", "valid", "val", "dev"],
            Split::Test => &["test", "testing", "eval", "evaluation"],
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Split::ALL
            .into_iter()
            .find(|split| split.as_str() == s)
            .ok_or_else(|| IngestError::ConfigInvalidValue {
                key: "split".to_string(),
                message: format!("unknown split '{s}' (expected train, validation or test)"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_catalog_value() {
        assert_eq!(Split::Train.to_string(), "train");
        assert_eq!(Split::Validation.to_string(), "validation");
        assert_eq!(Split::Test.to_string(), "test");
    }

    #[test]
    fn from_str_round_trips_every_split() {
        for split in Split::ALL {
            assert_eq!(split.as_str().parse::<Split>().unwrap(), split);
        }
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert!("dev".parse::<Split>().is_err());
        assert!("Train".parse::<Split>().is_err());
        assert!("".parse::<Split>().is_err());
    }

    #[test]
    fn aliases_start_with_canonical_name() {
        for split in Split::ALL {
            assert_eq!(split.aliases()[0], split.as_str());
        }
    }

    #[test]
    fn all_is_in_processing_order() {
        assert_eq!(Split::ALL, [Split::Train, Split::Validation, Split::Test]);
    }
}
