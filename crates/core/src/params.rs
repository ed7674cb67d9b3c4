//! Typed, index-addressable parameter tables.
//!
//! Hosts address plugin parameters by index and learn their names and kinds
//! from static metadata. A [`ParamTable`] pairs a static list of
//! [`ParamSpec`]s with one current [`ParamValue`] per entry, so get/set are
//! checked against the declared kind. The transition plugin currently
//! declares no parameters; the table still defines the boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MixError;

/// Value kinds a host can exchange, numbered as the frei0r ABI numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Bool,
    Double,
    Color,
    Position,
    String,
}

impl ParamKind {
    /// The ABI type code for this kind.
    pub fn code(self) -> i32 {
        match self {
            ParamKind::Bool => 0,
            ParamKind::Double => 1,
            ParamKind::Color => 2,
            ParamKind::Position => 3,
            ParamKind::String => 4,
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Bool => "bool",
            ParamKind::Double => "double",
            ParamKind::Color => "color",
            ParamKind::Position => "position",
            ParamKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A parameter value of one of the [`ParamKind`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Bool(bool),
    Double(f64),
    Color { r: f32, g: f32, b: f32 },
    Position { x: f64, y: f64 },
    String(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Double(_) => ParamKind::Double,
            ParamValue::Color { .. } => ParamKind::Color,
            ParamValue::Position { .. } => ParamKind::Position,
            ParamValue::String(_) => ParamKind::String,
        }
    }
}

/// Static description of one parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub explanation: &'static str,
    pub default: ParamValue,
}

impl ParamSpec {
    pub fn kind(&self) -> ParamKind {
        self.default.kind()
    }
}

/// Current values for a fixed list of parameter specs.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTable {
    specs: &'static [ParamSpec],
    values: Vec<ParamValue>,
}

impl ParamTable {
    /// Creates a table holding each spec's default value.
    pub fn new(specs: &'static [ParamSpec]) -> Self {
        Self {
            specs,
            values: specs.iter().map(|s| s.default.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The spec at `index`, if any.
    pub fn spec(&self, index: usize) -> Option<&'static ParamSpec> {
        self.specs.get(index)
    }

    pub fn get(&self, index: usize) -> Result<&ParamValue, MixError> {
        self.values.get(index).ok_or(MixError::ParamIndex(index))
    }

    /// Replaces the value at `index`, rejecting a value of the wrong kind.
    pub fn set(&mut self, index: usize, value: ParamValue) -> Result<(), MixError> {
        let spec = self.spec(index).ok_or(MixError::ParamIndex(index))?;
        if spec.kind() != value.kind() {
            return Err(MixError::ParamType {
                name: spec.name.to_string(),
                expected: spec.kind(),
                got: value.kind(),
            });
        }
        self.values[index] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SPECS: &[ParamSpec] = &[
        ParamSpec {
            name: "softness",
            explanation: "Edge softness of the wipe",
            default: ParamValue::Double(0.25),
        },
        ParamSpec {
            name: "reverse",
            explanation: "Run the transition backwards",
            default: ParamValue::Bool(false),
        },
        ParamSpec {
            name: "center",
            explanation: "Origin of the effect",
            default: ParamValue::Position { x: 0.5, y: 0.5 },
        },
    ];

    #[test]
    fn new_table_holds_defaults() {
        let table = ParamTable::new(SPECS);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap(), &ParamValue::Double(0.25));
        assert_eq!(table.get(1).unwrap(), &ParamValue::Bool(false));
    }

    #[test]
    fn empty_table_rejects_every_index() {
        static NONE: &[ParamSpec] = &[];
        let mut table = ParamTable::new(NONE);
        assert!(table.is_empty());
        assert!(matches!(table.get(0), Err(MixError::ParamIndex(0))));
        assert!(matches!(
            table.set(0, ParamValue::Double(1.0)),
            Err(MixError::ParamIndex(0))
        ));
    }

    #[test]
    fn set_replaces_value_of_matching_kind() {
        let mut table = ParamTable::new(SPECS);
        table.set(1, ParamValue::Bool(true)).unwrap();
        assert_eq!(table.get(1).unwrap(), &ParamValue::Bool(true));
    }

    #[test]
    fn set_rejects_value_of_wrong_kind() {
        let mut table = ParamTable::new(SPECS);
        let err = table.set(0, ParamValue::Bool(true)).unwrap_err();
        match err {
            MixError::ParamType {
                name,
                expected,
                got,
            } => {
                assert_eq!(name, "softness");
                assert_eq!(expected, ParamKind::Double);
                assert_eq!(got, ParamKind::Bool);
            }
            other => panic!("expected ParamType, got {other:?}"),
        }
        assert_eq!(table.get(0).unwrap(), &ParamValue::Double(0.25));
    }

    #[test]
    fn kind_codes_follow_abi_numbering() {
        assert_eq!(ParamKind::Bool.code(), 0);
        assert_eq!(ParamKind::Double.code(), 1);
        assert_eq!(ParamKind::Color.code(), 2);
        assert_eq!(ParamKind::Position.code(), 3);
        assert_eq!(ParamKind::String.code(), 4);
    }

    #[test]
    fn param_value_serializes_with_kind_tag() {
        let json = serde_json::to_value(ParamValue::Double(0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "double", "value": 0.5}));
    }
}
