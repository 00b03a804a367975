//! End-to-end behaviour of the trainer.

use sgns_wne::{real, ContextSide, SkipGram, TrainConfig, Trained, Vocabulary};

fn quiet(config: TrainConfig) -> TrainConfig {
    TrainConfig {
        show_progress: false,
        ..config
    }
}

fn snapshot(sg: &SkipGram) -> Vec<Vec<real>> {
    (0..sg.vocab().len())
        .map(|id| sg.embeddings().word_vector(id))
        .collect()
}

fn vector_file(trained: &Trained) -> String {
    let mut out = vec![];
    trained.write_vectors(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn train(corpus: &str, vocab: &Vocabulary, config: TrainConfig) -> Trained {
    SkipGram::new(corpus.chars().collect(), vocab.clone(), quiet(config))
        .unwrap()
        .train()
        .unwrap()
}

#[test]
fn abcabcabc() {
    let vocab = Vocabulary::from_entries([("a", 1), ("b", 1), ("c", 1), ("ab", 1)]).unwrap();
    let config = quiet(TrainConfig {
        dim: 2,
        n_threads: 1,
        n_iteration: 1,
        n_negative: 0,
        sample_rate: 1e9,
        ..TrainConfig::default()
    });
    let sg = SkipGram::new("abcabcabc".chars().collect(), vocab, config).unwrap();
    let before = snapshot(&sg);
    let trained = sg.train().unwrap();

    let text = vector_file(&trained);
    let lines: Vec<&str> = text.lines().collect();
    println!("{text}");
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "4 2");

    for (id, word) in ["a", "b", "c", "ab"].iter().enumerate() {
        let fields: Vec<&str> = lines[id + 1].split(' ').collect();
        assert_eq!(fields.len(), 3, "line {:?}", lines[id + 1]);
        assert_eq!(fields[0], *word);
        let values: Vec<real> = fields[1..].iter().map(|f| f.parse().unwrap()).collect();
        assert_eq!(values, trained.word_vector(id));
        // every entry occurs as a center or a context, so every row moved
        assert_ne!(values, before[id], "vector for {word:?} did not move");
    }
}

#[test]
fn unseen_entries_keep_initial_vectors() {
    let vocab = Vocabulary::new(vec!["a".into(), "b".into(), "c".into(), "ab".into(), "zz".into()])
        .unwrap();
    let config = quiet(TrainConfig {
        dim: 2,
        n_iteration: 1,
        n_negative: 0,
        sample_rate: 1e9,
        ..TrainConfig::default()
    });
    let sg = SkipGram::new("abcabcabc".chars().collect(), vocab, config).unwrap();
    let before = snapshot(&sg);
    let trained = sg.train().unwrap();

    assert_eq!(trained.word_vector(4), before[4]);
    assert_eq!(trained.context_vector(ContextSide::Left, 4), vec![0.0; 2]);
    assert_eq!(trained.context_vector(ContextSide::Right, 4), vec![0.0; 2]);
    assert!(vector_file(&trained).starts_with("5 2\n"));
}

#[test]
fn directional_contexts() {
    let vocab = Vocabulary::new(vec!["a".into(), "b".into()]).unwrap();
    let trained = train(
        "ab",
        &vocab,
        TrainConfig {
            dim: 3,
            n_iteration: 1,
            n_negative: 0,
            sample_rate: 1e9,
            ..TrainConfig::default()
        },
    );
    // the pair (a, b) touches right[b] and left[a] only
    assert_ne!(trained.context_vector(ContextSide::Right, 1), vec![0.0; 3]);
    assert_ne!(trained.context_vector(ContextSide::Left, 0), vec![0.0; 3]);
    assert_eq!(trained.context_vector(ContextSide::Right, 0), vec![0.0; 3]);
    assert_eq!(trained.context_vector(ContextSide::Left, 1), vec![0.0; 3]);
}

#[test]
fn single_thread_is_deterministic() {
    let vocab = Vocabulary::from_entries([
        ("th", 30),
        ("e", 50),
        ("the", 20),
        ("␣", 80),
        ("c", 10),
        ("at", 15),
        ("cat", 5),
    ])
    .unwrap();
    let corpus = "the␣cat␣ate␣the␣other␣cat␣at␣the␣theatre".repeat(5);
    let config = TrainConfig {
        dim: 8,
        seed: 42,
        n_iteration: 3,
        n_negative: 3,
        sample_rate: 0.05,
        ..TrainConfig::default()
    };

    let first = vector_file(&train(&corpus, &vocab, config.clone()));
    let second = vector_file(&train(&corpus, &vocab, config.clone()));
    assert_eq!(first, second);

    let other_seed = vector_file(&train(&corpus, &vocab, TrainConfig { seed: 43, ..config }));
    assert_ne!(first, other_seed);
}

#[test]
fn multi_thread_training_completes() {
    let vocab = Vocabulary::from_entries([("a", 40), ("b", 40), ("ab", 20), ("ba", 19)]).unwrap();
    let corpus = "ab".repeat(2000);
    let config = TrainConfig {
        dim: 16,
        n_iteration: 2,
        n_negative: 2,
        n_threads: 4,
        ..TrainConfig::default()
    };
    let trained = train(&corpus, &vocab, config.clone());
    let single = train(&corpus, &vocab, TrainConfig { n_threads: 1, ..config });

    // Workers race on the shared arena, so the values need not match the
    // single-threaded run (or each other between runs). Only sanity is checked.
    for id in 0..vocab.len() {
        let v = trained.word_vector(id);
        assert_eq!(v.len(), 16);
        assert!(v.iter().all(|x| x.is_finite()));
        assert_eq!(single.word_vector(id).len(), 16);
    }
}

#[test]
fn corpus_remainder_is_not_trained() {
    // 2 threads over 5 characters: slices "ab" and "ab"; the final "z" is dropped.
    let vocab = Vocabulary::new(vec!["a".into(), "b".into(), "z".into()]).unwrap();
    let config = quiet(TrainConfig {
        dim: 4,
        n_threads: 2,
        n_iteration: 2,
        n_negative: 0,
        sample_rate: 1e9,
        ..TrainConfig::default()
    });
    let sg = SkipGram::new("ababz".chars().collect(), vocab, config).unwrap();
    let before = snapshot(&sg);
    let trained = sg.train().unwrap();
    assert_eq!(trained.word_vector(2), before[2]);
    assert_eq!(trained.context_vector(ContextSide::Left, 2), vec![0.0; 4]);
    // the slices do not join across the boundary: "b" is never followed by "a"
    assert_eq!(trained.context_vector(ContextSide::Right, 0), vec![0.0; 4]);
}

#[test]
fn zero_counts_rejected_before_training() {
    let vocab = Vocabulary::from_entries([("a", 0), ("b", 0)]).unwrap();
    let err = SkipGram::new("abab".chars().collect(), vocab, quiet(TrainConfig::default()))
        .err()
        .expect("zero counts must be rejected");
    assert!(format!("{err:#}").contains("sum to zero"), "{err:#}");
}

#[test]
fn invalid_config_rejected() {
    let vocab = Vocabulary::new(vec!["a".into()]).unwrap();
    for config in [
        TrainConfig { dim: 0, ..TrainConfig::default() },
        TrainConfig { seed: 0, ..TrainConfig::default() },
        TrainConfig { learning_rate: 0.0, ..TrainConfig::default() },
        TrainConfig { sample_rate: -1.0, ..TrainConfig::default() },
        TrainConfig { unigram_power: 0.0, ..TrainConfig::default() },
        TrainConfig { n_threads: 0, ..TrainConfig::default() },
    ] {
        assert!(SkipGram::new("aaaa".chars().collect(), vocab.clone(), quiet(config)).is_err());
    }
}
