//! Reading and writing the files the tools exchange.

use std::fs;
use std::path::Path;

use sgns_wne::corpus::read_corpus;
use sgns_wne::lossy::{save_counts, top};
use sgns_wne::vocab::read_vocabulary_words;
use sgns_wne::words::{self, read_boundaries};
use sgns_wne::{
    dot, norm, ExpectedWordCounter, LossyCounter, SkipGram, TrainConfig, Vectors, Vocabulary,
};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn vocabulary_file_limits_entries() {
    let dir = tempfile::tempdir().unwrap();
    let vocab_path = write(dir.path(), "vocab.tsv", "ab\t10\nc\t7\nd\t2\n");
    let words = read_vocabulary_words(&vocab_path, 2).unwrap();
    assert_eq!(words, vec!["ab", "c"]);
    let words = read_vocabulary_words(&vocab_path, 100).unwrap();
    assert_eq!(words.len(), 3);
}

#[test]
fn counts_come_from_ngram_file() {
    let dir = tempfile::tempdir().unwrap();
    let vocab_path = write(dir.path(), "vocab.tsv", "ab\t999\nc\t999\nd\t999\n");
    let ngram_path = write(dir.path(), "ngrams.tsv", "x\t100\nab\t10\nd\t3\n");
    let vocab = Vocabulary::load(&vocab_path, &ngram_path, 3).unwrap();
    assert_eq!(vocab.counts(), &[10, 1, 3]);
    assert_eq!(vocab.total_count(), 14);
    assert_eq!(vocab.lookup_str("ab"), Some(0));
    assert_eq!(vocab.lookup_str("x"), None);
}

#[test]
fn missing_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let vocab_path = write(dir.path(), "vocab.tsv", "a\t1\n");
    let missing = dir.path().join("nope.tsv");

    let err = Vocabulary::load(&missing, &vocab_path, 10).unwrap_err();
    assert!(format!("{err:#}").contains("vocabulary file"), "{err:#}");
    let err = Vocabulary::load(&vocab_path, &missing, 10).unwrap_err();
    assert!(format!("{err:#}").contains("n-gram count file"), "{err:#}");
    assert!(read_corpus(&missing).is_err());
    assert!(Vectors::load(&missing).is_err());
}

#[test]
fn saved_vectors_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let vocab = Vocabulary::from_entries([("a", 5), ("b␣", 3), ("a b", 2)]).unwrap();
    let config = TrainConfig {
        dim: 5,
        n_iteration: 2,
        show_progress: false,
        ..TrainConfig::default()
    };
    let trained = SkipGram::new("aab␣a ba b".chars().collect(), vocab, config)
        .unwrap()
        .train()
        .unwrap();
    let output = dir.path().join("vectors.txt");
    trained.save_vectors(&output).unwrap();

    let vectors = Vectors::load(&output).unwrap();
    assert_eq!(vectors.num_words(), 3);
    assert_eq!(vectors.size(), 5);
    for id in 0..3 {
        let word = trained.vocab().word(id);
        assert_eq!(vectors.lookup_word(word), Some(id));
        let original = trained.word_vector(id);
        let cosine = dot(&original, &vectors[id]) / norm(&original);
        assert!((cosine - 1.0).abs() < 1e-12, "{word:?}: {cosine}");
    }
}

#[test]
fn truncated_vector_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "short.txt", "2 2\na 0.5 0.5\n");
    let err = Vectors::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("ends early"), "{err:#}");
    let path = write(dir.path(), "narrow.txt", "1 3\na 0.5 0.5\n");
    assert!(Vectors::load(&path).is_err());
}

#[test]
fn count_then_train_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_path = write(
        dir.path(),
        "corpus.txt",
        &"the␣cat␣sat␣on␣the␣mat␣".repeat(40),
    );
    let corpus = read_corpus(&corpus_path).unwrap();

    let counter = LossyCounter::new(4, 1e-3, 1e-4, 2).unwrap();
    let counted = counter.count(&corpus).unwrap();
    let all_path = dir.path().join("ngrams.tsv");
    let top_path = dir.path().join("top.tsv");
    save_counts(&counted, &all_path).unwrap();
    save_counts(&top(&counted, 30), &top_path).unwrap();

    let vocab = Vocabulary::load(&top_path, &all_path, 30).unwrap();
    assert_eq!(vocab.len(), 30);
    // every entry was counted, so nothing fell back to the default of 1
    assert!(vocab.counts().iter().all(|&c| c > 1));

    let config = TrainConfig {
        dim: 10,
        n_iteration: 1,
        n_threads: 2,
        show_progress: false,
        ..TrainConfig::default()
    };
    let trained = SkipGram::new(corpus, vocab, config).unwrap().train().unwrap();
    let output = dir.path().join("vectors.txt");
    trained.save_vectors(&output).unwrap();

    let vectors = Vectors::load(&output).unwrap();
    assert_eq!(vectors.num_words(), 30);
    let id = vectors.lookup_word("␣").expect("separator is the most frequent unigram");
    let nearest = vectors.nearest(&vectors[id], &[id], 5);
    assert_eq!(nearest.len(), 5);
    assert!(nearest.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn boundary_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "boundaries.txt", "1\n0.25\n\n0.5\n");
    assert_eq!(read_boundaries(&path).unwrap(), vec![1.0, 0.25, 0.5]);

    let path = write(dir.path(), "bad.txt", "1\nhalf\n");
    let err = read_boundaries(&path).unwrap_err();
    assert!(format!("{err:#}").contains("line 2"), "{err:#}");
}

#[test]
fn word_counts_feed_the_vocabulary() {
    let dir = tempfile::tempdir().unwrap();
    // "cat" and "sat" each start at a sure boundary and end at one.
    let corpus: Vec<char> = "cat␣sat␣".repeat(10).chars().collect();
    let boundaries: Vec<f64> = (0..corpus.len())
        .map(|i| if i % 4 == 0 || i % 4 == 3 { 1.0 } else { 0.0 })
        .collect();
    let counter = ExpectedWordCounter::new(3, 5, 2).unwrap();
    let counted = counter.count(&corpus, &boundaries).unwrap();
    let word_path = dir.path().join("words.tsv");
    words::save_counts(&words::top(&counted, 3), &word_path).unwrap();

    let text = fs::read_to_string(&word_path).unwrap();
    assert_eq!(text, "␣\t20\ncat\t10\nsat\t10\n");

    let ngram_path = write(dir.path(), "ngrams.tsv", "cat\t10\nsat\t10\n␣\t20\n");
    let vocab = Vocabulary::load(&word_path, &ngram_path, 3).unwrap();
    assert_eq!(vocab.words(), &["␣", "cat", "sat"]);
    assert_eq!(vocab.total_count(), 40);
}
