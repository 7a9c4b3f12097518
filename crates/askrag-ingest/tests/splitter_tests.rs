use askrag_ingest::loader::RawSegment;
use askrag_ingest::splitter::RecursiveSplitter;

fn word_text(words: usize) -> String {
    // "w000 w001 ...", a single-separator input (spaces only)
    (0..words)
        .map(|i| format!("w{i:03}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Longest suffix of `a` that is also a prefix of `b`, in bytes (inputs
/// are ASCII in these tests).
fn shared_overlap(a: &str, b: &str) -> usize {
    let max = a.len().min(b.len());
    (0..=max)
        .rev()
        .find(|&k| a.ends_with(&b[..k]))
        .unwrap_or(0)
}

#[test]
fn short_text_is_one_chunk() {
    let splitter = RecursiveSplitter::new(100, 20);
    let chunks = splitter.split_text("a few words, well under budget");
    assert_eq!(chunks, vec!["a few words, well under budget".to_string()]);
}

#[test]
fn empty_text_yields_no_chunks() {
    let splitter = RecursiveSplitter::new(100, 20);
    assert!(splitter.split_text("").is_empty());
    assert!(splitter.split_text("  \n\n  ").is_empty());
}

#[test]
fn chunks_respect_the_size_budget() {
    let splitter = RecursiveSplitter::new(100, 20);
    for chunk in splitter.split_text(&word_text(300)) {
        assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.len());
    }
}

#[test]
fn words_are_never_split_when_spaces_are_available() {
    let splitter = RecursiveSplitter::new(100, 20);
    for chunk in splitter.split_text(&word_text(300)) {
        for word in chunk.split(' ') {
            // every piece is a complete "wNNN" token
            assert!(word.starts_with('w') && word.len() == 4, "split mid-word: {word:?}");
        }
    }
}

#[test]
fn chunk_count_matches_overlap_formula() {
    let size = 100;
    let overlap = 20;
    let text = word_text(200); // 200 * 4 chars + 199 separators = 999 chars
    let len = text.chars().count();
    let splitter = RecursiveSplitter::new(size, overlap);
    let chunks = splitter.split_text(&text);

    let expected = (len - overlap).div_ceil(size - overlap);
    let got = chunks.len();
    assert!(
        got.abs_diff(expected) <= 1,
        "expected about {expected} chunks for {len} chars, got {got}"
    );
}

#[test]
fn adjacent_chunks_share_the_overlap_region() {
    let size = 100;
    let overlap = 20;
    let splitter = RecursiveSplitter::new(size, overlap);
    let chunks = splitter.split_text(&word_text(200));
    assert!(chunks.len() >= 2);

    for pair in chunks.windows(2) {
        let shared = shared_overlap(&pair[0], &pair[1]);
        // Word granularity makes the tail a little shorter than the exact
        // budget: one word + separator of slack.
        assert!(
            shared >= overlap - 5 && shared <= overlap,
            "overlap {shared} outside [{}..{overlap}]",
            overlap - 5
        );
    }
}

#[test]
fn paragraph_breaks_beat_lower_priority_separators() {
    let para_a = "alpha ".repeat(10).trim().to_string(); // 59 chars
    let para_b = "bravo ".repeat(10).trim().to_string();
    let text = format!("{para_a}\n\n{para_b}");
    let splitter = RecursiveSplitter::new(70, 10);
    let chunks = splitter.split_text(&text);

    // Each paragraph fits on its own but they cannot share a chunk, so the
    // split lands exactly on the paragraph boundary.
    assert_eq!(chunks, vec![para_a, para_b]);
}

#[test]
fn character_fallback_handles_unbroken_text() {
    let text = "x".repeat(250);
    let splitter = RecursiveSplitter::new(100, 20);
    let chunks = splitter.split_text(&text);
    assert!(chunks.len() >= 3);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 100);
        assert!(chunk.chars().all(|c| c == 'x'));
    }
}

#[test]
fn split_segments_preserves_source_metadata_and_order() {
    let splitter = RecursiveSplitter::new(100, 20);
    let segments = vec![
        RawSegment { text: word_text(60), source_path: "a.txt".into() },
        RawSegment { text: "short tail".into(), source_path: "b.txt".into() },
    ];
    let chunks = splitter.split_segments(&segments);
    assert!(chunks.len() > 2);
    let boundary = chunks.iter().position(|c| c.source_path == "b.txt").expect("b.txt chunk");
    assert!(chunks[..boundary].iter().all(|c| c.source_path == "a.txt"));
    assert_eq!(chunks.last().map(|c| c.content.as_str()), Some("short tail"));
}
