use crate::command::Mode;
use crate::worker::BatchReport;

/// Render a batch report as plain console text, one line per operation.
pub fn render(report: &BatchReport) -> String {
    let mut output = String::new();

    if report.results.is_empty() && report.failures.is_empty() && report.skipped_rules.is_empty()
    {
        output.push_str("\n  Nothing to clean.\n\n");
        return output;
    }

    let verb = match report.mode {
        Mode::Preview => "would be affected",
        Mode::Execute => "affected",
    };
    output.push_str(&format!("\n  {} path(s) {}:\n\n", report.results.len(), verb));

    for result in &report.results {
        let size = result
            .size
            .map(format_bytes)
            .unwrap_or_else(|| "?".into());
        output.push_str(&format!(
            "  {:<20} {:>10}  {}\n",
            result.label, size, result.path
        ));
    }

    if !report.failures.is_empty() {
        output.push_str(&format!("\n  {} failure(s):\n\n", report.failures.len()));
        for failure in &report.failures {
            output.push_str(&format!("  [FAILED]  {}\n", failure.path));
            output.push_str(&format!("            {}\n", failure.error));
        }
    }

    if !report.skipped_rules.is_empty() {
        output.push_str(&format!("\n  {} rule(s) skipped:\n\n", report.skipped_rules.len()));
        for skipped in &report.skipped_rules {
            let name = skipped.label.as_deref().unwrap_or(&skipped.action);
            output.push_str(&format!("  [SKIPPED] {}: {}\n", name, skipped.error));
        }
    }

    output.push_str(&format!(
        "\n  Total: {} deleted, {} special operation(s), {}\n\n",
        report.deleted_count,
        report.special_count,
        format_bytes(report.bytes),
    ));

    output
}

/// Human-readable byte count (binary units).
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
