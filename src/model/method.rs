//! Enumerations of what is being benchmarked.
//!
//! Names are validated when parsed, so an unknown container or language in a benchmark's
//! output is rejected up front instead of surfacing as a missing table entry later.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A name did not match any known variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{name}'")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

/// Language the benchmark program was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lang {
    #[serde(rename = "cpp")]
    Cpp,
    #[serde(rename = "rs")]
    Rs,
}

/// Map implementation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "BTreeMap")]
    BTreeMap,
    #[serde(rename = "HashMap")]
    HashMap,
    /// C++ `std::map`
    #[serde(rename = "map")]
    Map,
    /// C++ `std::unordered_map`
    #[serde(rename = "unordered_map")]
    UnorderedMap,
}

/// Operation whose timings are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Lookup,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::Cpp, Lang::Rs];

    pub fn name(self) -> &'static str {
        match self {
            Lang::Cpp => "cpp",
            Lang::Rs => "rs",
        }
    }
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::BTreeMap,
        Method::HashMap,
        Method::Map,
        Method::UnorderedMap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Method::BTreeMap => "BTreeMap",
            Method::HashMap => "HashMap",
            Method::Map => "map",
            Method::UnorderedMap => "unordered_map",
        }
    }

    /// Language whose RNG overhead applies to this method.
    pub fn lang(self) -> Lang {
        match self {
            Method::BTreeMap | Method::HashMap => Lang::Rs,
            Method::Map | Method::UnorderedMap => Lang::Cpp,
        }
    }
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::Insert, Operation::Lookup];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Lookup => "lookup",
        }
    }
}

macro_rules! impl_name_traits {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::ALL
                    .into_iter()
                    .find(|value| value.name() == s)
                    .ok_or_else(|| UnknownName {
                        kind: $kind,
                        name: s.to_string(),
                    })
            }
        }
    };
}

impl_name_traits!(Lang, "language");
impl_name_traits!(Method, "method");
impl_name_traits!(Operation, "operation");
