//! Property tests for the text splitter's size, overlap, and coverage
//! guarantees.

use proptest::prelude::*;

use ragbooks::chunking::TextSplitter;

fn configs() -> impl Strategy<Value = (usize, usize)> {
    // chunk_size in [8, 200], overlap strictly below chunk_size.
    (8usize..=200).prop_flat_map(|size| (Just(size), 0usize..size))
}

proptest! {
    #[test]
    fn chunks_respect_size_overlap_and_coverage(
        (chunk_size, overlap) in configs(),
        text in "[ -~\n]{0,2000}",
    ) {
        let splitter = TextSplitter::new(chunk_size, overlap).unwrap();
        let chunks = splitter.split(&text, "prop");

        if text.is_empty() {
            prop_assert!(chunks.is_empty());
            return Ok(());
        }

        for chunk in &chunks {
            prop_assert!(chunk.text.chars().count() <= chunk_size);
            prop_assert_eq!(chunk.source_id.as_str(), "prop");
        }
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert_eq!(chunk.seq, i);
        }

        // Exact overlap between consecutive chunks.
        for pair in chunks.windows(2) {
            let first: Vec<char> = pair[0].text.chars().collect();
            let second: Vec<char> = pair[1].text.chars().collect();
            prop_assert!(first.len() >= overlap);
            prop_assert_eq!(&first[first.len() - overlap..], &second[..overlap]);
        }

        // Chunks minus overlaps reproduce the input with no gaps.
        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                rebuilt.push_str(&chunk.text);
            } else {
                rebuilt.extend(chunk.text.chars().skip(overlap));
            }
        }
        prop_assert_eq!(rebuilt, text);
    }

    #[test]
    fn splitting_is_deterministic(
        (chunk_size, overlap) in configs(),
        text in "[ -~\n]{0,800}",
    ) {
        let splitter = TextSplitter::new(chunk_size, overlap).unwrap();
        prop_assert_eq!(
            splitter.split(&text, "prop"),
            splitter.split(&text, "prop")
        );
    }
}
