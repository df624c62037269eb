//! Sentence/paragraph-aware text chunking (§2 "misc collaborators"), used to
//! break long scene or summary text into size-bounded pieces before sending
//! it to embedding or extraction calls that cap input length.

use once_cell::sync::Lazy;
use regex::Regex;

/// One chunk of the original text, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("static pattern is valid"));

/// Splits `text` into chunks no longer than `max_chunk_size` characters,
/// preferring to break at sentence boundaries and falling back to a hard
/// cut only when a single sentence itself exceeds the budget. Returns an
/// empty vec for empty/whitespace-only input.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<TextChunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.len() <= max_chunk_size {
        return vec![TextChunk { text: text.to_string(), index: 0, start: 0, end: text.len() }];
    }

    let sentences = split_sentences(text);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_start = 0usize;
    let mut cursor = 0usize;

    for (sentence, sentence_start) in sentences {
        if sentence.len() > max_chunk_size {
            if !current.is_empty() {
                chunks.push(finalize_chunk(&current, chunks.len(), current_start, cursor));
                current.clear();
            }
            for piece_start in (0..sentence.len()).step_by(max_chunk_size) {
                let piece_end = (piece_start + max_chunk_size).min(sentence.len());
                let piece = &sentence[piece_start..piece_end];
                chunks.push(finalize_chunk(piece, chunks.len(), sentence_start + piece_start, sentence_start + piece_end));
            }
            current_start = sentence_start + sentence.len();
            cursor = current_start;
            continue;
        }

        if !current.is_empty() && current.len() + sentence.len() > max_chunk_size {
            chunks.push(finalize_chunk(&current, chunks.len(), current_start, cursor));
            current.clear();
            current_start = sentence_start;
        }
        if current.is_empty() {
            current_start = sentence_start;
        }
        current.push_str(sentence);
        cursor = sentence_start + sentence.len();
    }
    if !current.is_empty() {
        chunks.push(finalize_chunk(&current, chunks.len(), current_start, cursor));
    }
    chunks
}

fn finalize_chunk(text: &str, index: usize, start: usize, end: usize) -> TextChunk {
    TextChunk { text: text.trim().to_string(), index, start, end }
}

/// Splits `text` into (sentence, start_offset) pairs, each sentence
/// including its trailing punctuation and whitespace.
fn split_sentences(text: &str) -> Vec<(&str, usize)> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        sentences.push((&text[start..m.end()], start));
        start = m.end();
    }
    if start < text.len() {
        sentences.push((&text[start..], start));
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_text("Mira walked in.", 280);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Mira walked in.");
    }

    #[test]
    fn empty_text_produces_no_chunks() {
        assert!(chunk_text("   ", 280).is_empty());
    }

    #[test]
    fn long_text_splits_on_sentence_boundaries() {
        let text = "Mira walked in. Gareth looked up. \"We need to talk,\" he said. She nodded slowly.";
        let chunks = chunk_text(text, 40);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 40 || !chunk.text.contains(' '));
        }
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        assert!(joined.contains("Mira walked in."));
        assert!(joined.contains("She nodded slowly."));
    }

    #[test]
    fn oversized_single_sentence_is_hard_cut() {
        let long_word = "a".repeat(100);
        let chunks = chunk_text(&long_word, 30);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text.len(), 30);
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let text = "One. Two. Three. Four. Five.";
        let chunks = chunk_text(text, 8);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }
}
