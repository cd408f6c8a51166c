//! # analysis-render
//!
//! Presentation for `token-analytics` analysis documents. The engine
//! emits a typed tree of sections; these renderers turn it into plain
//! text or Markdown without the engine knowing either format exists.

use token_analytics::{Analysis, ItemKind, Severity};

/// Marker prefix for a severity in plain-text output.
const fn plain_marker(severity: Option<Severity>) -> &'static str {
    match severity {
        Some(Severity::Alert) => "[!] ",
        Some(Severity::Warn) => "[~] ",
        _ => "",
    }
}

/// Render an analysis as indented plain text.
pub fn to_plain(analysis: &Analysis) -> String {
    let mut out = String::new();
    for section in &analysis.sections {
        out.push_str(&section.title);
        out.push('\n');
        out.push_str(&"-".repeat(section.title.len()));
        out.push('\n');
        for item in &section.items {
            match item.kind {
                ItemKind::Para => {
                    out.push_str(plain_marker(item.severity));
                    out.push_str(&item.text);
                }
                ItemKind::Bullet => {
                    out.push_str("  * ");
                    out.push_str(plain_marker(item.severity));
                    out.push_str(&item.text);
                }
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Render an analysis as Markdown; warn and alert items are bolded.
pub fn to_markdown(analysis: &Analysis) -> String {
    let mut out = String::new();
    for section in &analysis.sections {
        out.push_str("## ");
        out.push_str(&section.title);
        out.push_str("\n\n");
        for item in &section.items {
            let emphatic = matches!(item.severity, Some(Severity::Warn | Severity::Alert));
            let text = if emphatic {
                format!("**{}**", item.text)
            } else {
                item.text.clone()
            };
            match item.kind {
                ItemKind::Para => {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
                ItemKind::Bullet => {
                    out.push_str("- ");
                    out.push_str(&text);
                    out.push('\n');
                }
            }
        }
        if section
            .items
            .last()
            .is_some_and(|i| i.kind == ItemKind::Bullet)
        {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_analytics::{Item, Section};

    fn sample() -> Analysis {
        let mut analysis = Analysis::default();
        let mut section = Section::new("Unlock schedule");
        section.push(Item::para("Two events stand out."));
        section.push(Item::bullet("Month 7: 20% unlocks").with_severity(Severity::Alert));
        section.push(Item::bullet("Month 12: 6% unlocks").with_severity(Severity::Warn));
        analysis.push_section(section);
        analysis
    }

    #[test]
    fn test_plain_marks_severity() {
        let text = to_plain(&sample());
        assert!(text.starts_with("Unlock schedule\n---------------\n"));
        assert!(text.contains("  * [!] Month 7: 20% unlocks"));
        assert!(text.contains("  * [~] Month 12: 6% unlocks"));
    }

    #[test]
    fn test_markdown_bolds_flagged_items() {
        let md = to_markdown(&sample());
        assert!(md.starts_with("## Unlock schedule\n\n"));
        assert!(md.contains("Two events stand out.\n\n"));
        assert!(md.contains("- **Month 7: 20% unlocks**\n"));
    }

    #[test]
    fn test_empty_analysis_renders_empty() {
        assert_eq!(to_plain(&Analysis::default()), "");
        assert_eq!(to_markdown(&Analysis::default()), "");
    }
}
