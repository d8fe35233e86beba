//! StreamName - Cheap-to-clone telemetry stream identifier
//!
//! Uses Arc<str> internally so that composite records and per-stream tables
//! can key by name without reallocating.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Well-known stream names produced by the flight-data loaders.
pub mod well_known {
    pub const IMU: &str = "imu";
    pub const GPS: &str = "gps";
    pub const AIR: &str = "air";
    pub const FILTER: &str = "filter";
    pub const PILOT: &str = "pilot";
    pub const ACT: &str = "act";
    pub const AP: &str = "ap";
    pub const HEALTH: &str = "health";
    pub const EVENT: &str = "event";
}

/// Stream identifier with cheap cloning.
///
/// Cloning only bumps a reference count. Ordering and hashing follow the
/// underlying string, so a `StreamName` key can be looked up with a `&str`.
///
/// # Examples
/// ```
/// use contracts::StreamName;
///
/// let name: StreamName = "gps".into();
/// let copy = name.clone();
/// assert_eq!(name, copy);
/// assert_eq!(name.as_str(), "gps");
/// ```
#[derive(Clone, Default)]
pub struct StreamName(Arc<str>);

impl StreamName {
    /// Create a new StreamName from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for StreamName {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for StreamName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StreamName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StreamName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for StreamName {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&String> for StreamName {
    #[inline]
    fn from(s: &String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamName({:?})", self.0)
    }
}

impl PartialEq for StreamName {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for StreamName {}

impl PartialEq<str> for StreamName {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for StreamName {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialEq<String> for StreamName {
    #[inline]
    fn eq(&self, other: &String) -> bool {
        self.0.as_ref() == other
    }
}

// Must agree with `str` so BTreeMap<StreamName, _> can be queried by &str.
impl Ord for StreamName {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_ref().cmp(other.0.as_ref())
    }
}

impl PartialOrd for StreamName {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for StreamName {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for StreamName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StreamName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
