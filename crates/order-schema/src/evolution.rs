//! Schema evolution analysis.
//!
//! Compares two versions of a record schema field by field and derives the
//! registry compatibility level a change set requires:
//!
//! - removing a field without a default is only safe for readers on the new
//!   schema (`BACKWARD`)
//! - adding a field without a default is only safe for readers on the old
//!   schema (`FORWARD`)
//! - adding or removing fields that carry defaults is safe under any level

use crate::schema::{FieldDescriptor, RecordSchema};
use crate::types::FieldType;
use std::fmt;
use std::str::FromStr;

/// A field present in only one of the two schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    pub name: String,
    pub field_type: FieldType,
    pub default: Option<serde_json::Value>,
}

impl FieldChange {
    fn from_descriptor(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.clone(),
            default: field.default.clone(),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(
                f,
                "{} ({}) (default: {default})",
                self.name, self.field_type
            ),
            None => write!(f, "{} ({}) (no default)", self.name, self.field_type),
        }
    }
}

/// A field present in both schemas whose declared type changed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModification {
    pub name: String,
    pub old_type: FieldType,
    pub new_type: FieldType,
    pub old_has_default: bool,
    pub new_has_default: bool,
}

impl fmt::Display for FieldModification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.name, self.old_type, self.new_type)
    }
}

/// Field-level differences between an old and a new schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDiff {
    pub added: Vec<FieldChange>,
    pub removed: Vec<FieldChange>,
    pub modified: Vec<FieldModification>,
}

impl SchemaDiff {
    /// Compare `old` against `new`. Each list follows the declaring schema's field order.
    pub fn between(old: &RecordSchema, new: &RecordSchema) -> Self {
        let added = new
            .fields()
            .iter()
            .filter(|f| old.field(&f.name).is_none())
            .map(FieldChange::from_descriptor)
            .collect();

        let removed = old
            .fields()
            .iter()
            .filter(|f| new.field(&f.name).is_none())
            .map(FieldChange::from_descriptor)
            .collect();

        let modified = old
            .fields()
            .iter()
            .filter_map(|old_field| {
                let new_field = new.field(&old_field.name)?;
                (old_field.field_type != new_field.field_type).then(|| FieldModification {
                    name: old_field.name.clone(),
                    old_type: old_field.field_type.clone(),
                    new_type: new_field.field_type.clone(),
                    old_has_default: old_field.has_default(),
                    new_has_default: new_field.has_default(),
                })
            })
            .collect();

        Self {
            added,
            removed,
            modified,
        }
    }

    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0
    }

    fn added_without_default(&self) -> bool {
        self.added.iter().any(|f| !f.has_default())
    }

    fn removed_without_default(&self) -> bool {
        self.removed.iter().any(|f| !f.has_default())
    }

    fn optional_changes(&self) -> bool {
        self.added.iter().chain(&self.removed).any(|f| f.has_default())
    }
}

/// Compatibility level a change set needs from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredCompatibility {
    Backward,
    Forward,
    /// Only defaulted fields changed; any level accepts the change
    Any,
    /// No field additions/removals, or a mix the rules do not cover
    Undetermined,
}

impl RequiredCompatibility {
    pub fn for_diff(diff: &SchemaDiff) -> Self {
        let added_required = diff.added_without_default();
        let removed_required = diff.removed_without_default();

        match (added_required, removed_required) {
            (false, true) => RequiredCompatibility::Backward,
            (true, false) => RequiredCompatibility::Forward,
            (false, false) if diff.optional_changes() => RequiredCompatibility::Any,
            _ => RequiredCompatibility::Undetermined,
        }
    }
}

impl fmt::Display for RequiredCompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredCompatibility::Backward => write!(f, "BACKWARD"),
            RequiredCompatibility::Forward => write!(f, "FORWARD"),
            RequiredCompatibility::Any => write!(f, "ANY"),
            RequiredCompatibility::Undetermined => write!(f, "UNDETERMINED"),
        }
    }
}

/// Compatibility level configured in a schema registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityLevel {
    Backward,
    BackwardTransitive,
    Forward,
    ForwardTransitive,
    Full,
    FullTransitive,
    None,
}

impl CompatibilityLevel {
    /// Registry default when neither subject nor global config is set.
    pub const DEFAULT: CompatibilityLevel = CompatibilityLevel::Backward;

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityLevel::Backward => "BACKWARD",
            CompatibilityLevel::BackwardTransitive => "BACKWARD_TRANSITIVE",
            CompatibilityLevel::Forward => "FORWARD",
            CompatibilityLevel::ForwardTransitive => "FORWARD_TRANSITIVE",
            CompatibilityLevel::Full => "FULL",
            CompatibilityLevel::FullTransitive => "FULL_TRANSITIVE",
            CompatibilityLevel::None => "NONE",
        }
    }

    /// Whether a subject configured at this level accepts a change needing `required`.
    pub fn satisfies(&self, required: RequiredCompatibility) -> bool {
        use CompatibilityLevel::*;
        match required {
            RequiredCompatibility::Backward => {
                matches!(self, Backward | BackwardTransitive | Full | FullTransitive)
            }
            RequiredCompatibility::Forward => {
                matches!(self, Forward | ForwardTransitive | Full | FullTransitive)
            }
            RequiredCompatibility::Any | RequiredCompatibility::Undetermined => true,
        }
    }
}

impl FromStr for CompatibilityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BACKWARD" => Ok(CompatibilityLevel::Backward),
            "BACKWARD_TRANSITIVE" => Ok(CompatibilityLevel::BackwardTransitive),
            "FORWARD" => Ok(CompatibilityLevel::Forward),
            "FORWARD_TRANSITIVE" => Ok(CompatibilityLevel::ForwardTransitive),
            "FULL" => Ok(CompatibilityLevel::Full),
            "FULL_TRANSITIVE" => Ok(CompatibilityLevel::FullTransitive),
            "NONE" => Ok(CompatibilityLevel::None),
            other => Err(format!("Unknown compatibility level: {other}")),
        }
    }
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
