use crate::models::enums::Section;
use crate::models::{non_empty, ExtractedSections};
use crate::pipeline::normalize::content_lines;

use super::labels::{LabelRules, BLOCK_MAX_CHARS, FINDINGS_FALLBACK_CHARS};

/// Rule-set identifier recorded in provenance for heuristic runs.
pub const HEURISTIC_RULES_VERSION: &str = "label-rules-v2";

/// Locate the four sections in a normalized transcript. Never fails: an
/// empty or unlabeled transcript yields a sparse (possibly empty) result.
pub fn extract_sections(normalized: &str) -> ExtractedSections {
    extract_sections_with(normalized, LabelRules::standard())
}

pub fn extract_sections_with(normalized: &str, rules: &LabelRules) -> ExtractedSections {
    let lines = content_lines(normalized);

    let labeled = |section| labeled_block(&lines, section, rules);
    let mut reason = labeled(Section::Reason);
    let mut findings = labeled(Section::Findings);
    let mut conclusions = labeled(Section::Conclusions);
    let mut recommendations = labeled(Section::Recommendations);

    if recommendations.is_none() {
        recommendations = sentence_fallback(&lines, Section::Recommendations, rules);
    }
    if conclusions.is_none() {
        conclusions = sentence_fallback(&lines, Section::Conclusions, rules);
    }
    if findings.is_none() {
        let head: String = lines.join("\n").chars().take(FINDINGS_FALLBACK_CHARS).collect();
        findings = non_empty(head);
    }
    if reason.is_none() {
        reason = lines.first().and_then(|line| non_empty(line));
    }

    ExtractedSections::from_candidates(reason, findings, conclusions, recommendations)
}

/// Text under the first label line of `section`, up to the next boundary.
fn labeled_block(lines: &[&str], section: Section, rules: &LabelRules) -> Option<String> {
    let (start, inline) = lines.iter().enumerate().find_map(|(i, line)| {
        rules
            .labels_for(section)
            .find_map(|label| label.match_line(line))
            .map(|inline| (i, inline))
    })?;

    let mut parts: Vec<&str> = Vec::new();
    if !inline.is_empty() {
        parts.push(inline);
    }

    let mut block = parts.join("\n");
    for line in &lines[start + 1..] {
        if rules.is_boundary(line) {
            break;
        }
        parts.push(line);
        block = parts.join("\n");
        if block.chars().count() > BLOCK_MAX_CHARS {
            block = block.chars().take(BLOCK_MAX_CHARS).collect();
            break;
        }
    }

    non_empty(block)
}

fn sentence_fallback(lines: &[&str], section: Section, rules: &LabelRules) -> Option<String> {
    let fallback = rules.fallback_for(section)?;
    lines
        .iter()
        .find_map(|line| fallback.match_line(line))
        .and_then(non_empty)
}
