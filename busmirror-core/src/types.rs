//! Domain types shared by the bus collaborator and the mirror tree.
//!
//! All types are serializable/deserializable via serde so fixtures can be
//! written as plain YAML.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Well-known names
// ---------------------------------------------------------------------------

/// Separator between object path segments. A path equal to it is the root.
pub const PATH_SEPARATOR: &str = "/";

/// Signal emitted by a remote object whenever a watched property changes.
pub const PROPERTIES_CHANGED: &str = "PropertiesChanged";

/// Interface that carries the `Valid` property.
pub const BUS_ITEM_INTERFACE: &str = "com.victronenergy.BusItem";

/// Property names recognized in a change notification.
pub const PROP_VALUE: &str = "Value";
pub const PROP_TEXT: &str = "Text";
pub const PROP_VALID: &str = "Valid";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A hierarchical object path, e.g. `/Settings/System/TimeZone`.
///
/// Paths built through `From` or deserialized carry no trailing separator
/// unless they are the root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct ObjectPath(pub String);

impl ObjectPath {
    /// The root path, a single separator.
    pub fn root() -> Self {
        Self(PATH_SEPARATOR.to_owned())
    }

    pub fn is_root(&self) -> bool {
        self.0 == PATH_SEPARATOR
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the child `name` under this path.
    ///
    /// `/` + `foo` is `/foo`; `/foo` + `bar` is `/foo/bar`. The separator is
    /// never doubled.
    pub fn join(&self, name: &str) -> ObjectPath {
        let mut path = self.0.clone();
        if !path.ends_with(PATH_SEPARATOR) {
            path.push_str(PATH_SEPARATOR);
        }
        path.push_str(name);
        ObjectPath(path)
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ObjectPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(PATH_SEPARATOR) {
            Some(0) => Some(ObjectPath::root()),
            Some(idx) => Some(ObjectPath(self.0[..idx].to_owned())),
            None => None,
        }
    }

    /// Non-empty segments of the path, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR).filter(|s| !s.is_empty())
    }
}

impl Default for ObjectPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ObjectPath {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&str> for ObjectPath {
    fn from(s: &str) -> Self {
        match s.trim_end_matches(PATH_SEPARATOR) {
            "" if s.is_empty() => Self(String::new()),
            "" => Self::root(),
            trimmed => Self(trimmed.to_owned()),
        }
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// A typed value as carried over the bus.
///
/// An empty array is the conventional "invalid" value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variant {
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(String),
    Array(Vec<Variant>),
}

impl Variant {
    /// The empty array used by remote services for "no value".
    pub fn invalid() -> Self {
        Variant::Array(Vec::new())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Truth value used when a variant is read as a validity flag.
    pub fn is_truthy(&self) -> bool {
        match self {
            Variant::Bool(b) => *b,
            Variant::Int(i) => *i != 0,
            Variant::Double(d) => *d != 0.0,
            Variant::Str(s) => !s.is_empty(),
            Variant::Array(items) => !items.is_empty(),
        }
    }

    /// String form sent by `SetValue`.
    ///
    /// Differs from [`Display`](fmt::Display) where remote services expect
    /// their own spelling: `True`/`False`, doubles always carry a fractional
    /// digit (`1.0`), and strings nested in arrays are quoted (`['a', 1]`).
    pub fn to_wire_string(&self) -> String {
        match self {
            Variant::Str(s) => s.clone(),
            other => {
                let mut out = String::new();
                other.write_wire(&mut out, false);
                out
            }
        }
    }

    fn write_wire(&self, out: &mut String, nested: bool) {
        match self {
            Variant::Bool(true) => out.push_str("True"),
            Variant::Bool(false) => out.push_str("False"),
            Variant::Int(i) => out.push_str(&i.to_string()),
            Variant::Double(d) if d.is_nan() => out.push_str("nan"),
            Variant::Double(d) if d.is_finite() && d.fract() == 0.0 && d.abs() < 1e16 => {
                out.push_str(&format!("{d:.1}"))
            }
            Variant::Double(d) => out.push_str(&d.to_string()),
            Variant::Str(s) if nested => {
                out.push('\'');
                out.push_str(s);
                out.push('\'');
            }
            Variant::Str(s) => out.push_str(s),
            Variant::Array(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    item.write_wire(out, true);
                }
                out.push(']');
            }
        }
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::invalid()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bool(b) => write!(f, "{b}"),
            Variant::Int(i) => write!(f, "{i}"),
            Variant::Double(d) => write!(f, "{d}"),
            Variant::Str(s) => f.write_str(s),
            Variant::Array(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Variant {
    fn from(b: bool) -> Self {
        Variant::Bool(b)
    }
}

impl From<i64> for Variant {
    fn from(i: i64) -> Self {
        Variant::Int(i)
    }
}

impl From<i32> for Variant {
    fn from(i: i32) -> Self {
        Variant::Int(i64::from(i))
    }
}

impl From<f64> for Variant {
    fn from(d: f64) -> Self {
        Variant::Double(d)
    }
}

impl From<String> for Variant {
    fn from(s: String) -> Self {
        Variant::Str(s)
    }
}

impl From<&str> for Variant {
    fn from(s: &str) -> Self {
        Variant::Str(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Notifications and administrative calls
// ---------------------------------------------------------------------------

/// Payload of a `PropertiesChanged` notification: property name to new value.
pub type PropertyChanges = BTreeMap<String, Variant>;

/// Arguments of the pass-through `AddSetting` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingSpec {
    pub group: String,
    pub name: String,
    pub default_value: Variant,
    /// Bus type code of the setting, e.g. `i`, `f` or `s`.
    pub item_type: String,
    pub minimum: Variant,
    pub maximum: Variant,
}

impl SettingSpec {
    /// Object path at which a settings service exposes this setting.
    pub fn object_path(&self) -> ObjectPath {
        let mut path = ObjectPath::root();
        for segment in self
            .group
            .split(PATH_SEPARATOR)
            .chain(std::iter::once(self.name.as_str()))
            .filter(|s| !s.is_empty())
        {
            path = path.join(segment);
        }
        path
    }
}

impl fmt::Display for SettingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.group, self.name, self.default_value, self.item_type, self.minimum, self.maximum
        )
    }
}
