pub mod layout;
pub mod pdf;
pub mod text;

pub const REPORT_SUFFIX: &str = " BFI Report.pdf";

/// Formats a number the way the reports have always shown it: whole values
/// keep one decimal (`4.0`, `50.0`), everything else uses the shortest exact
/// representation (`3.25`, `83.33`).
pub fn format_score(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else {
        format!("{}", v)
    }
}

/// Replaces path separators and control characters so a display name can be
/// used as a single file-name component.
pub fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed == ".." {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn report_file_name(name: &str) -> String {
    format!("{}{}", sanitize_file_component(name), REPORT_SUFFIX)
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;
