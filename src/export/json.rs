use super::{ExportError, PlanDocument};
use std::io::Write;
use std::path::Path;

/// Export a plan document to pretty-printed JSON
pub fn export_plan_document<P: AsRef<Path>>(
    document: &PlanDocument,
    output_path: P,
) -> Result<(), ExportError> {
    let json_data = serde_json::to_string_pretty(document)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;

    let mut file = std::fs::File::create(output_path)?;
    file.write_all(json_data.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::DrillSection;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_plan_document() {
        let document = PlanDocument {
            title: "Tuesday Practice".to_string(),
            created_at: Utc::now(),
            total_duration: 10,
            sections: vec![DrillSection {
                sequence: 1,
                name: "Quick release".to_string(),
                category: "Passing".to_string(),
                level: "Beginner".to_string(),
                duration: 10,
                description: "Throw on the move".to_string(),
                notes: None,
            }],
            skipped_drill_ids: Vec::new(),
        };

        let temp_file = NamedTempFile::new().unwrap();
        export_plan_document(&document, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"title\": \"Tuesday Practice\""));
        assert!(content.contains("\"total_duration\": 10"));
        assert!(content.contains("\"name\": \"Quick release\""));

        let restored: PlanDocument = serde_json::from_str(&content).unwrap();
        assert_eq!(restored, document);
    }
}
