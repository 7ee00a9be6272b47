//! Console rendering of a pipeline run

use owo_colors::{OwoColorize, Stream};
use std::io::{self, Write};
use trio_common::generation::{remediation_checklist, GenerationError};
use trio_common::{Draft, PipelineReport, ReviewOutcome, Stage};

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    let header = format!("=== {} ===", title);
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        header.if_supports_color(Stream::Stdout, |t| t.bold())
    )
}

/// Planner raw text and its normalized Draft
pub fn render_planner<W: Write>(out: &mut W, raw: &str, draft: &Draft) -> io::Result<()> {
    section(out, "Planner Output (raw)")?;
    writeln!(out, "{}", raw.trim())?;

    section(out, "Planner Output (parsed+normalized)")?;
    writeln!(out, "{}", draft.to_pretty_json())
}

pub fn render_reviewer<W: Write>(out: &mut W, review: &ReviewOutcome) -> io::Result<()> {
    section(out, "Reviewer Output (raw)")?;
    writeln!(out, "{}", review.raw.trim())?;

    section(out, "Reviewer Output (parsed+normalized)")?;
    writeln!(out, "{}", review.draft.to_pretty_json())
}

pub fn render_stage<W: Write>(out: &mut W, stage: Stage<'_>) -> io::Result<()> {
    match stage {
        Stage::Planned { raw, draft } => render_planner(out, raw, draft),
        Stage::Reviewed(review) => render_reviewer(out, review),
    }
}

/// Strict JSON, the short answers and the run timestamp
pub fn render_final<W: Write>(
    out: &mut W,
    final_draft: &Draft,
    changed: bool,
    timestamp: &str,
) -> io::Result<()> {
    section(out, "Final Publish JSON (STRICT)")?;
    writeln!(out, "{}", final_draft.to_json())?;

    let tags = serde_json::to_string(final_draft.tags()).unwrap_or_default();
    section(out, "Short Answers Helper")?;
    writeln!(out, "Q1 tags: {}", tags)?;
    writeln!(out, "Q2 summary: {}", final_draft.summary())?;
    writeln!(
        out,
        "Q3 reviewer changed anything?: {}",
        if changed { "yes" } else { "no" }
    )?;

    writeln!(out)?;
    writeln!(out, "(run timestamp: {})", timestamp)
}

/// Print every stage in order, then the short answers and the run timestamp
pub fn render_report<W: Write>(
    out: &mut W,
    report: &PipelineReport,
    timestamp: &str,
) -> io::Result<()> {
    render_planner(out, &report.planner_raw, &report.planner_draft)?;
    render_reviewer(out, &report.review)?;
    render_final(out, &report.final_draft, report.review.changed, timestamp)
}

/// Explain an unreachable generation service
pub fn render_unavailable<W: Write>(
    out: &mut W,
    err: &GenerationError,
    endpoint: &str,
    model: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "{} Could not call the generation service at {}: {}",
        "ERROR:".if_supports_color(Stream::Stderr, |t| t.red()),
        endpoint,
        err
    )?;
    writeln!(out, "Checklist:")?;
    for (i, line) in remediation_checklist(endpoint, model).iter().enumerate() {
        writeln!(out, "{}) {}", i + 1, line)?;
    }
    Ok(())
}

/// Local time, ISO 8601, seconds precision
pub fn run_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trio_common::generation::ScriptedGenerator;
    use trio_common::{Pipeline, PipelineSettings};

    fn sample_report(reviewer: &str) -> PipelineReport {
        let gen = ScriptedGenerator::from_texts(vec![
            "  {\"tags\": [\"a\", \"b\", \"c\"], \"summary\": \"Planner.\"}  ",
            reviewer,
        ]);
        let settings = PipelineSettings {
            retry_delay: std::time::Duration::ZERO,
            ..PipelineSettings::default()
        };
        Pipeline::new(&gen, settings).run("T", "C").unwrap()
    }

    fn rendered(report: &PipelineReport) -> String {
        let mut out = Vec::new();
        render_report(&mut out, report, "2026-10-16T12:00:00").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_sections_in_order() {
        let text = rendered(&sample_report(
            r#"{"tags": ["x", "y", "z"], "summary": "Reviewed."}"#,
        ));

        let order = [
            "Planner Output (raw) ===",
            "Planner Output (parsed+normalized) ===",
            "Reviewer Output (raw) ===",
            "Reviewer Output (parsed+normalized) ===",
            "Final Publish JSON (STRICT) ===",
            "Short Answers Helper ===",
            "(run timestamp: 2026-10-16T12:00:00)",
        ];
        let mut last = 0;
        for marker in order {
            let pos = text[last..]
                .find(marker)
                .unwrap_or_else(|| panic!("missing or out of order: {}", marker));
            last += pos + marker.len();
        }

        assert!(text.contains(r#"{"tags":["x","y","z"],"summary":"Reviewed."}"#));
        assert!(text.contains(r#"Q1 tags: ["x","y","z"]"#));
        assert!(text.contains("Q2 summary: Reviewed."));
        assert!(text.contains("Q3 reviewer changed anything?: yes"));
    }

    #[test]
    fn test_unchanged_review() {
        let text = rendered(&sample_report(
            r#"{"tags": ["a", "b", "c"], "summary": "Planner."}"#,
        ));
        assert!(text.contains("Q3 reviewer changed anything?: no"));
    }

    #[test]
    fn test_raw_output_is_trimmed() {
        let text = rendered(&sample_report(r#"{"tags": ["a"], "summary": "s"}"#));
        assert!(text.contains("\n{\"tags\": [\"a\", \"b\", \"c\"], \"summary\": \"Planner.\"}\n"));
    }

    #[test]
    fn test_stages_compose_into_report() {
        let report = sample_report(r#"{"tags": ["x", "y", "z"], "summary": "Reviewed."}"#);

        let mut staged = Vec::new();
        render_stage(
            &mut staged,
            Stage::Planned {
                raw: &report.planner_raw,
                draft: &report.planner_draft,
            },
        )
        .unwrap();
        render_stage(&mut staged, Stage::Reviewed(&report.review)).unwrap();
        render_final(
            &mut staged,
            &report.final_draft,
            report.review.changed,
            "2026-10-16T12:00:00",
        )
        .unwrap();

        assert_eq!(String::from_utf8(staged).unwrap(), rendered(&report));
    }

    #[test]
    fn test_render_unavailable_checklist() {
        let mut out = Vec::new();
        let err = GenerationError::NotAvailable("connection refused".to_string());
        render_unavailable(
            &mut out,
            &err,
            "http://localhost:11434/api/generate",
            "smollm:1.7b",
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("connection refused"));
        assert!(text.contains("1) Is Ollama running?"));
        assert!(text.contains("2) Have you pulled the model? `ollama pull smollm:1.7b`"));
        assert!(text.contains("3) Can you `curl http://localhost:11434/` ?"));
    }

    #[test]
    fn test_run_timestamp_shape() {
        let ts = run_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S").is_ok());
    }
}
