//! Text helpers shared across extraction stages.

use unicode_segmentation::UnicodeSegmentation;

/// A sentence slice with its byte offsets in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Split text into trimmed, non-empty sentences using Unicode sentence boundaries.
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    for (offset, raw) in text.split_sentence_bound_indices() {
        let leading = raw.len() - raw.trim_start().len();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let start = offset + leading;
        sentences.push(Sentence {
            text: trimmed,
            start,
            end: start + trimmed.len(),
        });
    }
    sentences
}

/// Lowercase, strip punctuation and collapse whitespace, for duplicate detection.
pub fn normalize_description(description: &str) -> String {
    description
        .unicode_words()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "was", "were", "has", "have", "had", "from",
    "into", "onto", "upon", "its", "their", "his", "her", "are", "been", "being", "which", "who",
    "whom", "will", "shall", "would", "could", "should", "may", "might", "not", "but", "all",
    "any", "our", "out", "than", "then", "there", "these", "those", "such", "also", "after",
    "before", "during", "between", "under", "over", "about",
];

/// Content terms of a text: lowercased words longer than two characters,
/// minus common function words.
pub fn terms(text: &str) -> Vec<String> {
    text.unicode_words()
        .map(|word| word.to_lowercase())
        .filter(|word| word.chars().count() > 2 && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentences_keep_offsets() {
        let text = "Plaintiff filed suit.  The court held a hearing.";
        let sentences = split_sentences(text);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Plaintiff filed suit.");
        assert_eq!(sentences[1].text, "The court held a hearing.");
        assert_eq!(&text[sentences[1].start..sentences[1].end], sentences[1].text);
    }

    #[test]
    fn sentence_boundaries() {
        let text = "Acme filed on 2024-01-05. Smith answered! Was it served?";
        let rendered = split_sentences(text)
            .iter()
            .map(|s| format!("{}..{} {}", s.start, s.end, s.text))
            .collect::<Vec<_>>()
            .join("\n");
        insta::assert_snapshot!(rendered, @r###"
        0..25 Acme filed on 2024-01-05.
        26..41 Smith answered!
        42..56 Was it served?
        "###);
    }

    #[test]
    fn empty_text_has_no_sentences() {
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn descriptions_normalize() {
        assert_eq!(
            normalize_description("The  Court GRANTED the motion!"),
            "the court granted the motion"
        );
    }

    #[test]
    fn terms_drop_stopwords() {
        assert_eq!(
            terms("The motion was granted by the court"),
            vec!["motion", "granted", "court"]
        );
    }

    #[test]
    fn truncation_is_char_safe() {
        assert_eq!(truncate_chars("abcdef", 10), "abcdef");
        assert_eq!(truncate_chars("abc def", 4), "abc…");
    }
}
