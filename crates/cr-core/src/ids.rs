//! Strongly typed identifiers.
//!
//! Two families live here:
//!
//! - **Dense ids** (`NodeId`, `EdgeId`, `SegmentId`) index the SoA arrays of a
//!   built graph.  They are only meaningful for the graph that issued them.
//! - **Record ids and keys** (`BinId`, `RouteId`, `NodeKey`, `EdgeKey`) come
//!   from the collaborator's source data and are stable across rebuilds.
//!
//! All ids are `Ord + Hash` so they can be map keys and sorted without
//! ceremony.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

/// Generate an owned string key for identifiers that come from source data.
macro_rules! string_key {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id! {
    /// Dense index of a node inside one built graph.
    pub struct NodeId(u32);
}

typed_id! {
    /// Dense index of a directed edge inside one built graph.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index of a source road segment inside one built graph.  An undirected
    /// segment owns two directed `EdgeId`s that share one `SegmentId`.
    pub struct SegmentId(u32);
}

typed_id! {
    /// Waste bin identifier, as assigned by the persistence layer.
    pub struct BinId(u64);
}

typed_id! {
    /// Precomputed walking / safe route identifier.
    pub struct RouteId(u64);
}

string_key! {
    /// External node identity: an explicit ID from source data or a
    /// coordinate-derived key (see [`NodeKey::from_point`]).
    pub struct NodeKey;
}

string_key! {
    /// External road-segment identity.  Blocked-road records reference
    /// segments by this key.
    pub struct EdgeKey;
}

impl NodeKey {
    /// Derive a key from a coordinate, rounded to 7 decimal places (~1 cm).
    /// Two records at the same rounded position get the same key.
    pub fn from_point(p: crate::GeoPoint) -> Self {
        Self(format!("{:.7},{:.7}", p.lat, p.lon))
    }
}
