use crate::error::Result;
use crate::worker::BatchReport;

/// Render a batch report as pretty-printed JSON.
pub fn render(report: &BatchReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Mode;
    use crate::worker::SkippedRule;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn report_serializes_with_lowercase_mode() {
        let now = Utc::now();
        let report = BatchReport {
            run_id: Uuid::new_v4(),
            mode: Mode::Preview,
            started_at: now,
            finished_at: now,
            results: Vec::new(),
            failures: Vec::new(),
            skipped_rules: vec![SkippedRule {
                action: "teleport".into(),
                label: None,
                error: "unknown action: teleport".into(),
            }],
            deleted_count: 0,
            special_count: 0,
            bytes: 0,
        };
        let value: serde_json::Value = serde_json::from_str(&render(&report).unwrap()).unwrap();
        assert_eq!(value["mode"], "preview");
        assert_eq!(value["skipped_rules"][0]["action"], "teleport");
    }
}
