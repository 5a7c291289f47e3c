//! Sliding-window text chunking

/// Default chunk size in characters
pub const CHUNK_SIZE: usize = 1000;

/// Default overlap between consecutive chunks in characters
pub const CHUNK_OVERLAP: usize = 100;

/// Split text into overlapping chunks. The window slides by
/// `chunk_size - overlap` characters, so consecutive chunks share
/// `overlap` characters. The final chunk may be shorter than
/// `chunk_size`. Empty input yields no chunks. Offsets are measured
/// in characters, not bytes, so multi-byte text splits cleanly.
pub fn split_text_to_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    assert!(overlap < chunk_size, "overlap must be smaller than chunk size");

    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Per-dimension arithmetic mean across chunk embeddings, used as a
/// coarse document-level summary vector. Empty input yields `None`.
pub fn average_embedding(embeddings: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = embeddings.first()?;
    let dims = first.len();
    let mut sums = vec![0.0f32; dims];

    for embedding in embeddings {
        for (sum, value) in sums.iter_mut().zip(embedding) {
            *sum += value;
        }
    }

    let count = embeddings.len() as f32;
    Some(sums.into_iter().map(|s| s / count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_count(len: usize, chunk_size: usize, overlap: usize) -> usize {
        if len > chunk_size {
            (len - overlap).div_ceil(chunk_size - overlap)
        } else {
            1
        }
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        assert!(split_text_to_chunks("", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
    }

    #[test]
    fn test_short_text_yields_one_chunk() {
        let chunks = split_text_to_chunks("short text", CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks, vec!["short text".to_string()]);
    }

    #[test]
    fn test_exact_chunk_size_yields_one_chunk() {
        let text = "a".repeat(CHUNK_SIZE);
        let chunks = split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunk_count_formula() {
        for len in [1, 999, 1000, 1001, 1900, 1901, 5000, 12345] {
            let text = "x".repeat(len);
            let chunks = split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);
            assert_eq!(
                chunks.len(),
                expected_count(len, CHUNK_SIZE, CHUNK_OVERLAP),
                "unexpected chunk count for len={}",
                len
            );
        }
    }

    #[test]
    fn test_no_chunk_exceeds_chunk_size() {
        let text: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        for chunk in split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP) {
            assert!(chunk.chars().count() <= CHUNK_SIZE);
        }
    }

    #[test]
    fn test_overlap_removal_reconstructs_original() {
        let text: String = (0..4321).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        let mut rebuilt: String = chunks[0].clone();
        for chunk in &chunks[1..] {
            let tail: String = chunk.chars().skip(CHUNK_OVERLAP).collect();
            rebuilt.push_str(&tail);
        }

        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        let text = "y".repeat(2500);
        let chunks = split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        for pair in chunks.windows(2) {
            let prev_tail: String = pair[0].chars().skip(CHUNK_SIZE - CHUNK_OVERLAP).collect();
            let next_head: String = pair[1].chars().take(CHUNK_OVERLAP).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "달".repeat(1500);
        let chunks = split_text_to_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chars().count(), CHUNK_SIZE);
    }

    #[test]
    fn test_average_embedding() {
        let embeddings = vec![vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]];
        assert_eq!(average_embedding(&embeddings), Some(vec![2.0, 3.0, 4.0]));
    }

    #[test]
    fn test_average_embedding_empty() {
        assert_eq!(average_embedding(&[]), None);
    }
}
