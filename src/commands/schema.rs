//! `schema` subcommands: diff two schema files, check a change against the
//! registry's compatibility level, and report local schema freshness.

use crate::RegistryOpts;
use anyhow::Context;
use order_registry::{check_freshness, Freshness, SchemaRegistry};
use order_schema::{CompatibilityLevel, RecordSchema, RequiredCompatibility, SchemaDiff};
use std::io::{self, Write};
use std::path::Path;

fn load(path: &Path) -> anyhow::Result<RecordSchema> {
    RecordSchema::from_file(path).with_context(|| format!("Failed to load schema from {path:?}"))
}

/// Print added, removed and modified fields followed by a summary.
pub fn print_diff<W: Write>(diff: &SchemaDiff, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== DETECTED CHANGES ===")?;

    if !diff.added.is_empty() {
        writeln!(out, "\n🟢 ADDED FIELDS:")?;
        for field in &diff.added {
            writeln!(out, "  + {field}")?;
        }
    }
    if !diff.removed.is_empty() {
        writeln!(out, "\n🔴 REMOVED FIELDS:")?;
        for field in &diff.removed {
            writeln!(out, "  - {field}")?;
        }
    }
    if !diff.modified.is_empty() {
        writeln!(out, "\n🟠 MODIFIED FIELDS:")?;
        for field in &diff.modified {
            writeln!(out, "  ~ {field}")?;
        }
    }

    writeln!(out, "\n=== SUMMARY ===")?;
    writeln!(out, "Added fields: {}", diff.added.len())?;
    writeln!(out, "Removed fields: {}", diff.removed.len())?;
    writeln!(out, "Modified fields: {}", diff.modified.len())?;
    writeln!(out, "Total changes: {}", diff.total_changes())
}

pub fn run_diff(old: &Path, new: &Path) -> anyhow::Result<()> {
    let diff = SchemaDiff::between(&load(old)?, &load(new)?);
    print_diff(&diff, &mut io::stdout().lock())?;
    Ok(())
}

/// Decide whether `level` accepts the changes in `diff`, printing the reasoning.
pub fn check_compat<W: Write>(
    diff: &SchemaDiff,
    level: CompatibilityLevel,
    out: &mut W,
) -> io::Result<bool> {
    let required = RequiredCompatibility::for_diff(diff);
    writeln!(out, "Configured compatibility: {level}")?;

    let compatible = level.satisfies(required);
    match required {
        RequiredCompatibility::Any => {
            writeln!(out, "✅ Compatible: only optional fields (with defaults) changed")?
        }
        RequiredCompatibility::Undetermined => writeln!(
            out,
            "✓ No significant changes detected or the change set is not covered"
        )?,
        _ if compatible => writeln!(
            out,
            "✅ Compatible: changes require {required} and the compatibility is {level}"
        )?,
        _ => writeln!(
            out,
            "❌ Incompatible: changes require {required} but the compatibility is {level}"
        )?,
    }
    writeln!(out, "Required compatibility: {required}")?;

    Ok(compatible)
}

pub async fn run_check_compat(
    old: &Path,
    new: &Path,
    registry: &RegistryOpts,
    topic: &str,
) -> anyhow::Result<()> {
    let diff = SchemaDiff::between(&load(old)?, &load(new)?);
    let subject = registry.subject_for(topic);
    let level = registry
        .client()?
        .compatibility_level(&subject)
        .await
        .with_context(|| format!("Failed to read compatibility level for '{subject}'"))?;

    if !check_compat(&diff, level, &mut io::stdout().lock())? {
        anyhow::bail!("Schema change is not allowed under {level} compatibility");
    }
    Ok(())
}

/// Compare `schema` with the latest version under `subject`; fails unless up to date.
pub async fn run_status<R: SchemaRegistry + ?Sized>(
    registry: &R,
    subject: &str,
    schema: &RecordSchema,
) -> anyhow::Result<Freshness> {
    let freshness = check_freshness(registry, subject, schema).await;
    println!("{}", freshness.message());
    if !freshness.is_up_to_date() {
        anyhow::bail!("Schema for subject '{subject}' is not up to date");
    }
    Ok(freshness)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &str) -> RecordSchema {
        RecordSchema::parse(&format!(
            r#"{{"type": "record", "name": "Order", "fields": [{fields}]}}"#
        ))
        .unwrap()
    }

    fn output(f: impl FnOnce(&mut Vec<u8>) -> io::Result<bool>) -> (bool, String) {
        let mut out = Vec::new();
        let result = f(&mut out).unwrap();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_print_diff() {
        let old = schema(r#"{"name": "id", "type": "string"}, {"name": "qty", "type": "int"}"#);
        let new = schema(
            r#"{"name": "id", "type": "long"}, {"name": "note", "type": "string", "default": "n/a"}"#,
        );
        let mut out = Vec::new();
        print_diff(&SchemaDiff::between(&old, &new), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\n🟢 ADDED FIELDS:\n  + note (string) (default: \"n/a\")\n"));
        assert!(text.contains("\n🔴 REMOVED FIELDS:\n  - qty (int) (no default)\n"));
        assert!(text.contains("\n🟠 MODIFIED FIELDS:\n  ~ id: string → long\n"));
        assert!(text.ends_with("Total changes: 3\n"));
    }

    #[test]
    fn test_removed_required_field_needs_backward() {
        let old = schema(r#"{"name": "id", "type": "string"}, {"name": "qty", "type": "int"}"#);
        let new = schema(r#"{"name": "id", "type": "string"}"#);
        let diff = SchemaDiff::between(&old, &new);

        let (ok, text) = output(|out| check_compat(&diff, CompatibilityLevel::Full, out));
        assert!(ok);
        assert!(text.contains("Required compatibility: BACKWARD"));

        let (ok, text) = output(|out| check_compat(&diff, CompatibilityLevel::Forward, out));
        assert!(!ok);
        assert!(text.contains("❌ Incompatible"));
    }

    #[test]
    fn test_optional_change_is_always_compatible() {
        let old = schema(r#"{"name": "id", "type": "string"}"#);
        let new = schema(
            r#"{"name": "id", "type": "string"}, {"name": "note", "type": ["null", "string"], "default": null}"#,
        );
        let diff = SchemaDiff::between(&old, &new);

        let (ok, text) = output(|out| check_compat(&diff, CompatibilityLevel::None, out));
        assert!(ok);
        assert!(text.contains("Required compatibility: ANY"));
    }
}
