// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use support_rag_node::rag::{Chunk, TextSplitter};

const ALPHABET: &[char] = &['a', 'b', ' ', '\n', 'é', '字', '.', 'Z', '🙂'];

fn random_text(rng: &mut StdRng, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn reassemble(chunks: &[Chunk]) -> String {
    chunks.iter().map(Chunk::fresh_text).collect()
}

#[test]
fn test_reconstruction_holds_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let size = rng.gen_range(1..64);
        let overlap = rng.gen_range(0..size);
        let len = rng.gen_range(0..500);
        let text = random_text(&mut rng, len);

        let chunks = TextSplitter::new(size, overlap).unwrap().split(&text);
        assert_eq!(
            reassemble(&chunks),
            text,
            "size={} overlap={}",
            size,
            overlap
        );
    }
}

#[test]
fn test_all_but_last_chunk_are_full() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let size = rng.gen_range(1..40);
        let overlap = rng.gen_range(0..size);
        let len = rng.gen_range(1..400);
        let text = random_text(&mut rng, len);

        let chunks = TextSplitter::new(size, overlap).unwrap().split(&text);
        let (last, rest) = chunks.split_last().unwrap();
        for chunk in rest {
            assert_eq!(chunk.char_len, size);
            assert_eq!(chunk.text.chars().count(), size);
        }
        assert!(last.char_len >= 1 && last.char_len <= size);
    }
}

#[test]
fn test_overlap_repeats_previous_tail() {
    let splitter = TextSplitter::new(10, 3).unwrap();
    let text = "The quick brown fox jumps over the lazy dog";
    let chunks = splitter.split(text);

    for pair in chunks.windows(2) {
        let prev: Vec<char> = pair[0].text.chars().collect();
        let tail: String = prev[prev.len() - 3..].iter().collect();
        assert!(pair[1].text.starts_with(&tail));
        assert_eq!(pair[1].overlap, 3);
    }
    assert_eq!(chunks[0].overlap, 0);
}

#[test]
fn test_indices_are_sequential() {
    let chunks = TextSplitter::default().split(&"support ".repeat(600));
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
    }
    assert_eq!(chunks[1].start, 800);
}
