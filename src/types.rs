//! Core types for component-builder.
//!
//! Attribute values flow from the state tree into type handlers, which turn
//! them into the component-side types defined here.

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Attribute Values
// =============================================================================

/// A state node attribute value.
///
/// Serialized untagged so JSON documents can use plain literals:
/// `{"width": 40, "text": "Hello", "visible": true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// String content, only for `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view. Floats are truncated, numeric strings are parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Float view. Numeric strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Boolean view. Accepts `true`/`false` strings and 0/1 integers.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(v) => Some(*v != 0),
            Self::Str(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            Self::Float(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// A size along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Size from content.
    #[default]
    Auto,
    /// Absolute size in cells.
    Cells(u16),
    /// Percentage of parent size (0-100).
    Percent(f32),
}

impl Dimension {
    /// Parse an attribute value.
    ///
    /// Integers are cells (0 or negative means auto), strings may be
    /// `"auto"`, `"50%"` or a plain number.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(Self::from(*n)),
            Value::Float(n) => Some(Self::from(*n as i64)),
            Value::Str(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case("auto") {
                    Some(Self::Auto)
                } else if let Some(pct) = s.strip_suffix('%') {
                    pct.trim().parse::<f32>().ok().map(|p| Self::Percent(p.clamp(0.0, 100.0)))
                } else {
                    s.parse::<i64>().ok().map(Self::from)
                }
            }
            Value::Bool(_) => None,
        }
    }
}

impl From<i64> for Dimension {
    fn from(value: i64) -> Self {
        if value <= 0 {
            Self::Auto
        } else {
            Self::Cells(value.min(u16::MAX as i64) as u16)
        }
    }
}

// =============================================================================
// Flex Direction
// =============================================================================

/// Main axis of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FlexDirection {
    #[default]
    Column = 0,
    Row = 1,
    ColumnReverse = 2,
    RowReverse = 3,
}

impl FlexDirection {
    /// Check if this is a row direction (Row or RowReverse).
    pub const fn is_row(&self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Parse `row`, `column`, `row-reverse`, `column-reverse`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "column" => Some(Self::Column),
            "row" => Some(Self::Row),
            "column-reverse" => Some(Self::ColumnReverse),
            "row-reverse" => Some(Self::RowReverse),
            _ => None,
        }
    }
}

// =============================================================================
// Component Types
// =============================================================================

/// What kind of primitive a live component is.
///
/// Components created by custom handlers stay `None` unless the handler says
/// otherwise; layout treats them as plain containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ComponentType {
    #[default]
    None = 0,
    Box = 1,
    Text = 2,
    Image = 3,
}

// =============================================================================
// Component Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Behavioral flags of a live component.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ComponentFlags: u8 {
        const VISIBLE = 1 << 0;
        const ENABLED = 1 << 1;
        const FOCUSABLE = 1 << 2;
    }
}

impl Default for ComponentFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::ENABLED
    }
}

// =============================================================================
// Node Style
// =============================================================================

/// Layout properties of a live component, read by the layout bridge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeStyle {
    pub width: Dimension,
    pub height: Dimension,
    pub direction: FlexDirection,
    pub grow: f32,
    pub padding: u16,
    pub gap: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_views() {
        assert_eq!(Value::from(5).as_i64(), Some(5));
        assert_eq!(Value::from("12").as_i64(), Some(12));
        assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::from("true").as_bool(), Some(true));
        assert_eq!(Value::from(0).as_bool(), Some(false));
        assert_eq!(Value::from("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(true).as_i64(), None);
    }

    #[test]
    fn test_value_json_is_untagged() {
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::Int(42));
        let v: Value = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, Value::Str("x".into()));
        assert_eq!(serde_json::to_string(&Value::Bool(false)).unwrap(), "false");
    }

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(Dimension::from_value(&Value::from(40)), Some(Dimension::Cells(40)));
        assert_eq!(Dimension::from_value(&Value::from(0)), Some(Dimension::Auto));
        assert_eq!(Dimension::from_value(&Value::from("auto")), Some(Dimension::Auto));
        assert_eq!(Dimension::from_value(&Value::from("50%")), Some(Dimension::Percent(50.0)));
        assert_eq!(Dimension::from_value(&Value::from("12")), Some(Dimension::Cells(12)));
        assert_eq!(Dimension::from_value(&Value::from("wide")), None);
    }

    #[test]
    fn test_flex_direction_parse() {
        assert_eq!(FlexDirection::parse("row"), Some(FlexDirection::Row));
        assert!(FlexDirection::parse("row-reverse").unwrap().is_row());
        assert_eq!(FlexDirection::parse("diagonal"), None);
    }

    #[test]
    fn test_default_flags() {
        let flags = ComponentFlags::default();
        assert!(flags.contains(ComponentFlags::VISIBLE));
        assert!(flags.contains(ComponentFlags::ENABLED));
        assert!(!flags.contains(ComponentFlags::FOCUSABLE));
    }
}
