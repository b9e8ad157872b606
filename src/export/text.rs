use super::{ExportError, PlanDocument};
use std::io::Write;
use std::path::Path;

const DIVIDER: &str = "----------------------------------------";

/// Render a plan document to human-readable text
pub fn export_plan_document<P: AsRef<Path>>(
    document: &PlanDocument,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    write_plan_document(document, &mut file)
}

/// Write the rendered document to any writer
pub fn write_plan_document<W: Write>(
    document: &PlanDocument,
    out: &mut W,
) -> Result<(), ExportError> {
    // Header
    writeln!(out, "========================================")?;
    writeln!(out, "TRAINING PLAN")?;
    writeln!(out, "========================================")?;
    writeln!(out)?;

    // Summary block
    writeln!(out, "Name: {}", document.title)?;
    writeln!(
        out,
        "Date: {}",
        document.created_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out, "Total Duration: {} min", document.total_duration)?;
    writeln!(out, "Drills: {}", document.sections.len())?;
    writeln!(out)?;

    for section in &document.sections {
        writeln!(out, "{}", DIVIDER)?;
        writeln!(
            out,
            "{}. {} ({} min)",
            section.sequence, section.name, section.duration
        )?;
        writeln!(out, "   Category: {}  Level: {}", section.category, section.level)?;
        if !section.description.is_empty() {
            writeln!(out, "   {}", section.description)?;
        }
        if let Some(notes) = &section.notes {
            writeln!(out, "   Coach notes: {}", notes)?;
        }
    }

    if !document.sections.is_empty() {
        writeln!(out, "{}", DIVIDER)?;
    }

    Ok(())
}
