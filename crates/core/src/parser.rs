//! Extraction of the summary and question/answer/context triples from the
//! free-text reply of the analysis model.
//!
//! The reply is loosely formatted markdown. Extraction is a small scanner over
//! the bold section markers: it never fails, and anything it cannot place is
//! either folded into the summary or dropped.

use crate::types::{AnalysisResult, QaEntry};

pub const SUMMARY_MARKER: &str = "**Summary:**";
pub const QA_MARKER: &str = "**Questions and Answers:**";

const QUESTION_PREFIX: &str = "**Question";
const ANSWER_MARKER: &str = "**Answer:**";
const CONTEXT_MARKER: &str = "**Context:**";

/// Heading variants the model is known to emit, mapped to the canonical form.
const MARKER_ALIASES: &[(&str, &str)] = &[
    ("**Video Summary:**", SUMMARY_MARKER),
    ("**Questions & Answers:**", QA_MARKER),
];

/// Parse a model reply into a summary and an ordered list of Q&A entries.
pub fn parse_analysis(raw: &str) -> AnalysisResult {
    let text = normalize_markers(raw);

    let qa = match text.find(QA_MARKER) {
        Some(index) => parse_qa_segment(&text[index + QA_MARKER.len()..]),
        None => Vec::new(),
    };

    AnalysisResult {
        summary: extract_summary(&text),
        qa,
    }
}

fn normalize_markers(raw: &str) -> String {
    MARKER_ALIASES
        .iter()
        .fold(raw.to_string(), |text, (alias, canonical)| {
            text.replace(alias, canonical)
        })
}

fn extract_summary(text: &str) -> String {
    let Some(index) = text.find(SUMMARY_MARKER) else {
        return text.trim().to_string();
    };

    let body = &text[index + SUMMARY_MARKER.len()..];
    let end = body.find(QA_MARKER).unwrap_or(body.len());
    body[..end].trim().to_string()
}

fn parse_qa_segment(segment: &str) -> Vec<QaEntry> {
    let headers = question_headers(segment);

    headers
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start))| {
            let body_end = headers
                .get(i + 1)
                .map(|&(next_start, _)| next_start)
                .unwrap_or(segment.len());
            parse_triple(&segment[body_start..body_end])
        })
        .collect()
}

/// Byte ranges `(start, end)` of every question header in `segment`.
fn question_headers(segment: &str) -> Vec<(usize, usize)> {
    let mut headers = Vec::new();
    let mut offset = 0;

    while let Some(found) = segment[offset..].find(QUESTION_PREFIX) {
        let start = offset + found;
        let after_prefix = start + QUESTION_PREFIX.len();

        match question_header_tail(&segment[after_prefix..]) {
            Some(tail_len) => {
                headers.push((start, after_prefix + tail_len));
                offset = after_prefix + tail_len;
            }
            None => offset = after_prefix,
        }
    }

    headers
}

/// Length of the optional number plus `:**` that closes a question header.
fn question_header_tail(rest: &str) -> Option<usize> {
    let numbered = rest.trim_start();
    let digits = numbered.len()
        - numbered
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .len();

    let tail = if digits > 0 { &numbered[digits..] } else { rest };
    tail.strip_prefix(":**")
        .map(|after| rest.len() - after.len())
}

/// A question block must carry its own answer and context headers, in order.
fn parse_triple(block: &str) -> Option<QaEntry> {
    let (question, rest) = block.split_once(ANSWER_MARKER)?;
    let (answer, rest) = rest.split_once(CONTEXT_MARKER)?;

    let question = question.trim();
    let answer = answer.trim();
    let context = strip_quotes(context_body(rest.trim_start()).trim());

    if question.is_empty() || answer.is_empty() || context.is_empty() {
        return None;
    }

    Some(QaEntry {
        question: question.to_string(),
        answer: answer.to_string(),
        context: context.to_string(),
    })
}

/// The context runs until a following line opens another bold heading.
fn context_body(rest: &str) -> &str {
    rest.match_indices('\n')
        .find(|(pos, _)| rest[pos + 1..].trim_start().starts_with("**"))
        .map(|(pos, _)| &rest[..pos])
        .unwrap_or(rest)
}

fn strip_quotes(text: &str) -> &str {
    let text = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\u{201c}'))
        .unwrap_or(text);
    let text = text
        .strip_suffix('"')
        .or_else(|| text.strip_suffix('\u{201d}'))
        .unwrap_or(text);
    text.trim()
}
