//! Tri-state result for soft-failing lookups.

use serde::{Serialize, Serializer};

/// Outcome of a lookup that must not abort its caller.
///
/// `NotFound` is a confirmed absence; `FetchFailed` is a failure worth
/// retrying. Neither is ever cached by an addon entity except where a
/// terminal state is documented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The value was obtained.
    Computed(T),
    /// The value does not exist.
    NotFound,
    /// The value could not be obtained.
    FetchFailed(String),
}

impl<T> Lookup<T> {
    /// Convert into an `Option`, collapsing both failure kinds.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Computed(v) => Some(v),
            Self::NotFound | Self::FetchFailed(_) => None,
        }
    }

    /// Map the computed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Computed(v) => Lookup::Computed(f(v)),
            Self::NotFound => Lookup::NotFound,
            Self::FetchFailed(reason) => Lookup::FetchFailed(reason),
        }
    }
}

/// Serialized as the value or `null`; transports only see "known or not".
impl<T: Serialize> Serialize for Lookup<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Computed(v) => serializer.serialize_some(v),
            Self::NotFound | Self::FetchFailed(_) => serializer.serialize_none(),
        }
    }
}
