//! Fixed-size overlapping chunker.
//!
//! Long documents are split into windows of at most `chunk_chars`
//! characters with `overlap_chars` of shared trailing context, so that no
//! passage exceeds the embedding model's comfortable input size while
//! boundary-straddling facts still appear in at least one chunk whole.

/// Splits `text` into overlapping chunks.
///
/// Windows are built over whitespace-delimited words; a chunk never splits a
/// word. A document that already fits the budget maps to a single chunk with
/// its original formatting preserved. Callers must keep `overlap_chars`
/// strictly below `chunk_chars` (enforced by
/// [`crate::config::AssistantConfig::validate`]).
pub fn chunk_text(text: &str, chunk_chars: usize, overlap_chars: usize) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.chars().count() <= chunk_chars {
        return vec![trimmed.to_string()];
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < words.len() {
        let mut end = start;
        let mut width = 0usize;
        while end < words.len() {
            let addition = words[end].chars().count() + usize::from(width > 0);
            if width + addition > chunk_chars && end > start {
                break;
            }
            width += addition;
            end += 1;
        }

        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }

        // Step back far enough to carry `overlap_chars` into the next chunk,
        // but always advance by at least one word so the loop terminates.
        let mut back = end;
        let mut carried = 0usize;
        while back > start + 1 && carried < overlap_chars {
            back -= 1;
            carried += words[back].chars().count() + 1;
        }
        start = back;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text(words: usize) -> String {
        (0..words)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let text = "PIM centralises product data.\n\nMDM governs master records.";
        let chunks = chunk_text(text, 1200, 200);
        assert_eq!(chunks, vec![text.to_string()]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("   \n\t ", 100, 10).is_empty());
    }

    #[test]
    fn long_document_respects_the_budget() {
        let text = long_text(400);
        let chunks = chunk_text(&text, 120, 30);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 120,
                "chunk exceeded budget: {} chars",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn consecutive_chunks_share_overlap() {
        let text = long_text(200);
        let chunks = chunk_text(&text, 150, 40);
        for pair in chunks.windows(2) {
            let tail_word = pair[0]
                .split_whitespace()
                .next_back()
                .expect("chunks are non-empty");
            assert!(
                pair[1].split_whitespace().any(|word| word == tail_word),
                "overlap word '{tail_word}' missing from following chunk"
            );
        }
    }

    #[test]
    fn no_content_is_lost() {
        let text = long_text(300);
        let chunks = chunk_text(&text, 100, 20);
        let rejoined: Vec<&str> = chunks
            .iter()
            .flat_map(|chunk| chunk.split_whitespace())
            .collect();
        for word in text.split_whitespace() {
            assert!(rejoined.contains(&word), "word '{word}' dropped");
        }
    }

    #[test]
    fn oversized_single_word_still_chunks() {
        let word = "x".repeat(500);
        let chunks = chunk_text(&word, 100, 10);
        assert_eq!(chunks.len(), 1, "a single word is never split");
    }
}
