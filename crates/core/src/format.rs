use std::time::Duration;

use crate::{batch::BatchStats, types::Analysis};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// Format one video's analysis as human-readable markdown
pub fn format_analysis_readable(title: &str, url: &str, analysis: &Analysis) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", title));
    output.push_str(&format!("{}\n\n", url));

    let result = match analysis {
        Analysis::Completed(result) => result,
        Analysis::Failed(failure) => {
            output.push_str(&format!("**Error:** {}\n", failure.error));
            return output;
        }
    };

    output.push_str("## Summary\n\n");
    output.push_str(&result.summary);
    output.push_str("\n\n");

    if !result.qa.is_empty() {
        output.push_str("## Questions\n\n");
        for (i, entry) in result.qa.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, entry.question));
            output.push_str(&format!("   → {}\n", entry.answer));
            output.push_str(&format!("   > {}\n\n", entry.context));
        }
    }

    output
}

pub fn format_stats(stats: &BatchStats) -> String {
    let mut parts = vec![
        format!("{} processed", stats.processed()),
        format!("{} succeeded", stats.succeeded),
        format!("{} failed", stats.failed),
    ];
    if stats.skipped > 0 {
        parts.push(format!("{} skipped (no URL)", stats.skipped));
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisResult, QaEntry};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_readable_failed_analysis() {
        let text = format_analysis_readable("T", "u", &Analysis::failed("Download failed"));
        assert!(text.contains("**Error:** Download failed"));
        assert!(!text.contains("## Summary"));
    }

    #[test]
    fn test_readable_completed_analysis() {
        let analysis = Analysis::Completed(AnalysisResult {
            summary: "Short.".to_string(),
            qa: vec![QaEntry {
                question: "Q?".to_string(),
                answer: "A.".to_string(),
                context: "C.".to_string(),
            }],
        });
        let text = format_analysis_readable("T", "u", &analysis);

        assert!(text.contains("## Summary\n\nShort."));
        assert!(text.contains("1. Q?\n   → A.\n   > C."));
    }

    #[test]
    fn test_format_stats_mentions_skips_only_when_present() {
        let stats = BatchStats {
            succeeded: 2,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(format_stats(&stats), "3 processed, 2 succeeded, 1 failed");

        let stats = BatchStats { skipped: 2, ..stats };
        assert!(format_stats(&stats).ends_with("2 skipped (no URL)"));
    }
}
