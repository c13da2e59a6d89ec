use lingproc::{Chunk, chunk_text};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn texts(chunks: &[Chunk]) -> Vec<&str> {
    chunks.iter().map(|c| c.text.as_str()).collect()
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn random_text(rng: &mut StdRng) -> String {
    const WORDS: &[&str] = &[
        "the", "quick", "brown", "fox", "naïve", "café", "日本語", "jumps", "over", "lazy",
        "dog", "podcast", "episode", "résumé", "a",
    ];
    const PUNCT: &[&str] = &["", "", "", "", ".", ",", "!", "?", ";", ":"];
    const SPACES: &[&str] = &[" ", " ", " ", "  ", "\n", "\t "];

    let words = rng.gen_range(0..120);
    let mut out = String::new();
    for i in 0..words {
        if i > 0 {
            out.push_str(SPACES[rng.gen_range(0..SPACES.len())]);
        }
        if rng.gen_ratio(1, 40) {
            out.push_str(&"x".repeat(rng.gen_range(40..90)));
        } else {
            out.push_str(WORDS[rng.gen_range(0..WORDS.len())]);
        }
        out.push_str(PUNCT[rng.gen_range(0..PUNCT.len())]);
    }
    out
}

#[test]
fn short_text_is_a_single_chunk() {
    let chunks = chunk_text("Hello world.", 100);
    assert_eq!(texts(&chunks), vec!["Hello world."]);
    assert_eq!(chunks[0].index, 0);
}

#[test]
fn splits_at_sentence_boundaries() {
    let text = "First sentence. Second sentence. Third sentence.";
    let chunks = chunk_text(text, 30);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.byte_len() <= 30, "chunk exceeds limit: {:?}", chunk);
    }
    assert_eq!(texts(&chunks).join(" "), text);
}

#[test]
fn packs_several_sentences_per_chunk() {
    let chunks = chunk_text("One. Two. Three. Four.", 10);
    assert_eq!(texts(&chunks), vec!["One. Two.", "Three.", "Four."]);
}

#[test]
fn splits_long_sentences_at_clause_boundaries() {
    let text = "This sentence has clauses, separated by commas, and one more: the end.";
    let chunks = chunk_text(text, 40);
    assert_eq!(
        texts(&chunks),
        vec![
            "This sentence has clauses,",
            "separated by commas, and one more:",
            "the end.",
        ]
    );
}

#[test]
fn long_sentence_closes_the_open_chunk() {
    let text = "Hi. alpha beta, gamma delta, epsilon zeta. Bye.";
    let chunks = chunk_text(text, 15);
    assert_eq!(
        texts(&chunks),
        vec!["Hi.", "alpha beta,", "gamma delta,", "epsilon zeta.", "Bye."]
    );
}

#[test]
fn splits_at_word_boundaries_without_punctuation() {
    let text = "word ".repeat(20);
    let chunks = chunk_text(text.trim(), 25);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.byte_len() <= 25, "chunk exceeds limit: {:?}", chunk);
    }
}

#[test]
fn oversized_word_is_emitted_whole() {
    let long = "x".repeat(50);
    let text = format!("tiny {long} end");
    let chunks = chunk_text(&text, 10);
    assert_eq!(texts(&chunks), vec!["tiny", long.as_str(), "end"]);
}

#[test]
fn text_exactly_at_limit_is_unchanged() {
    let text = "x".repeat(100);
    let chunks = chunk_text(&text, 100);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, text);
}

#[test]
fn empty_text_yields_one_empty_chunk() {
    let chunks = chunk_text("", 100);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_empty());
}

#[test]
fn whitespace_only_text_over_the_limit_yields_nothing() {
    assert!(chunk_text("          ", 3).is_empty());
}

#[test]
fn indices_are_dense_and_ordered() {
    let text = "A sentence here. Another one there. And a third one too.";
    let chunks = chunk_text(text, 20);
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
    }
}

#[test]
fn preserves_content_integrity() {
    let text = "First sentence. Second sentence. Third sentence.";
    let reassembled = texts(&chunk_text(text, 25)).join(" ");
    for word in ["First", "Second", "Third", "sentence"] {
        assert!(reassembled.contains(word), "missing word: {word}");
    }
}

#[test]
fn multibyte_characters_count_as_bytes() {
    let text = "日本語のテキスト。 Ça marche. Très bien.";
    for chunk in chunk_text(text, 12) {
        assert!(chunk.byte_len() <= 12 || !chunk.text.contains(char::is_whitespace));
    }
}

#[test]
fn random_texts_respect_limit_and_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..300 {
        let text = random_text(&mut rng);
        let limit = rng.gen_range(1..200);
        let chunks = chunk_text(&text, limit);

        for chunk in &chunks {
            let single_word = !chunk.text.contains(char::is_whitespace);
            assert!(
                chunk.byte_len() <= limit || single_word,
                "chunk of {} bytes over limit {}: {:?}",
                chunk.byte_len(),
                limit,
                chunk.text
            );
        }

        let rejoined = texts(&chunks).join(" ");
        assert_eq!(normalize(&rejoined), normalize(&text));

        assert_eq!(chunk_text(&text, limit), chunks);
    }
}

#[test]
fn chunks_serialize_with_index_and_text() {
    let chunks = chunk_text("Hello.", 10);
    let json = serde_json::to_value(&chunks).unwrap();
    assert_eq!(json, serde_json::json!([{ "index": 0, "text": "Hello." }]));
}
