//! Index selections for slices, time points and channels
//!
//! Configuration documents historically used `-1` to mean "every index".
//! [`IdSelection`] makes that explicit while still accepting the legacy
//! forms when deserializing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which indices along an image-stack axis a stage should process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdSelection {
    /// Every index present in the input
    #[default]
    All,
    /// An explicit list, in the order given
    Specific(Vec<u32>),
}

impl fmt::Display for IdSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdSelection::All => write!(f, "all"),
            IdSelection::Specific(ids) => {
                let parts: Vec<String> = ids.iter().map(u32::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Serialized with the legacy wire convention: `-1` for all, a list otherwise
impl Serialize for IdSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            IdSelection::All => serializer.serialize_i64(-1),
            IdSelection::Specific(ids) => ids.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for IdSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum IdSelectionHelper {
            Single(i64),
            List(Vec<i64>),
            Keyword(String),
        }

        let helper = IdSelectionHelper::deserialize(deserializer)?;
        match helper {
            IdSelectionHelper::Single(-1) => Ok(IdSelection::All),
            IdSelectionHelper::Single(id) => to_id(id)
                .map(|id| IdSelection::Specific(vec![id]))
                .map_err(serde::de::Error::custom),
            IdSelectionHelper::List(ids) => {
                if ids.is_empty() {
                    return Err(serde::de::Error::custom(
                        "id list must not be empty; use -1 or \"all\" to select every index",
                    ));
                }
                ids.into_iter()
                    .map(to_id)
                    .collect::<Result<Vec<_>, _>>()
                    .map(IdSelection::Specific)
                    .map_err(serde::de::Error::custom)
            }
            IdSelectionHelper::Keyword(word) if word.eq_ignore_ascii_case("all") => {
                Ok(IdSelection::All)
            }
            IdSelectionHelper::Keyword(word) => Err(serde::de::Error::custom(format!(
                "invalid id selection '{word}': expected -1, \"all\", an index or a list of indices"
            ))),
        }
    }
}

fn to_id(value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("invalid index {value}: indices must be non-negative"))
}
