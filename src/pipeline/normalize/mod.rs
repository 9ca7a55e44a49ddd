//! Transcript canonicalization: line endings, invisible characters,
//! whitespace and the domain typo table.
//!
//! Both entry points are pure and idempotent.

pub mod corrections;

pub use corrections::{CorrectionRule, CorrectionTable};

/// Normalize a raw transcript, preserving its line structure.
pub fn normalize_transcript(raw: &str) -> String {
    normalize_transcript_with(raw, CorrectionTable::standard())
}

pub fn normalize_transcript_with(raw: &str, table: &CorrectionTable) -> String {
    let cleaned = remove_invisible_chars(raw);
    let unified = unify_line_endings(&cleaned);
    table.apply(unified.trim()).trim().to_string()
}

/// Normalize free text into a single line: every whitespace run becomes one
/// space. Used for list items and for sections returned by the inference service.
pub fn normalize_single_line(text: &str) -> String {
    normalize_single_line_with(text, CorrectionTable::standard())
}

pub fn normalize_single_line_with(text: &str, table: &CorrectionTable) -> String {
    let cleaned = remove_invisible_chars(text);
    let collapsed = collapse_whitespace(&cleaned);
    table.apply(&collapsed).trim().to_string()
}

/// Non-empty trimmed lines of an already normalized transcript.
pub fn content_lines(normalized: &str) -> Vec<&str> {
    normalized
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn unify_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove zero-width and directional formatting characters that dictation
/// software and copy-paste occasionally inject.
fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'  // Zero-width space
                | '\u{200C}' // Zero-width non-joiner
                | '\u{200D}' // Zero-width joiner
                | '\u{200E}' // Left-to-right mark
                | '\u{200F}' // Right-to-left mark
                | '\u{202A}'..='\u{202E}' // Directional embeddings/overrides
                | '\u{2060}'..='\u{2064}' // Word joiner, invisible operators
                | '\u{FEFF}' // BOM / zero-width no-break space
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn unifies_line_endings_and_trims() {
        let raw = "  \r\nPowód wizyty:\r\nKontrola.\rOpis badania:\n  ";
        assert_eq!(
            normalize_transcript(raw),
            "Powód wizyty:\nKontrola.\nOpis badania:"
        );
    }

    #[test]
    fn applies_corrections_in_multiline_mode() {
        let raw = "Opis badania:\nWatroba nie jednorodna.\nsledziona prawidlowa";
        assert_eq!(
            normalize_transcript(raw),
            "Opis badania:\nWątroba niejednorodna.\nśledziona prawidlowa"
        );
    }

    #[test]
    fn single_line_collapses_all_whitespace() {
        assert_eq!(
            normalize_single_line("  Torbiel\n\n nerki   lewej\t 12 mm "),
            "Torbiel nerki lewej 12 mm"
        );
    }

    #[test]
    fn single_line_joins_words_split_across_lines() {
        assert_eq!(normalize_single_line("nie\njednorodna"), "niejednorodna");
    }

    #[test]
    fn strips_invisible_characters() {
        assert_eq!(normalize_single_line("wąt\u{200B}roba\u{FEFF}"), "wątroba");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_transcript(""), "");
        assert_eq!(normalize_single_line(" \n\t "), "");
        assert!(content_lines("").is_empty());
    }

    #[test]
    fn content_lines_skip_blank_lines() {
        let lines = content_lines("a\n\n  b  \n \nc");
        assert_eq!(lines, ["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn normalize_transcript_is_idempotent(s in "\\PC*") {
            let once = normalize_transcript(&s);
            prop_assert_eq!(normalize_transcript(&once), once);
        }

        #[test]
        fn normalize_transcript_is_idempotent_on_dictation_like_text(
            s in "(watrob[a-z]{0,3}|nie jednorodna|u s g|Powód wizyty:|\r\n|\r|\n| |\t|[a-zA-Ząęśżół]{1,6}){0,40}"
        ) {
            let once = normalize_transcript(&s);
            prop_assert_eq!(normalize_transcript(&once), once);
        }

        #[test]
        fn normalize_single_line_is_idempotent(s in "\\PC*") {
            let once = normalize_single_line(&s);
            prop_assert_eq!(normalize_single_line(&once), once);
        }
    }
}
