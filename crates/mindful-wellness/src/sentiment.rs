use std::collections::HashMap;
use std::sync::LazyLock;

use mindful_types::models::Sentiment;
use rust_stemmers::{Algorithm, Stemmer};

/// Scores at or inside this band are neutral.
pub const NEUTRAL_BAND: f64 = 0.1;

/// Words that flip the sign of every scored word after them.
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "none", "nobody", "nothing", "nowhere", "cannot",
];

/// AFINN-165 word list, one `word<TAB>valence` pair per line.
const AFINN_165: &str = include_str!("../data/afinn-165.txt");

/// Entries of a tab-separated lexicon. `#` lines and malformed rows are skipped.
fn lexicon_entries(source: &str) -> impl Iterator<Item = (&str, i32)> {
    source
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (word, valence) = line.split_once('\t')?;
            Some((word.trim(), valence.trim().parse().ok()?))
        })
        .filter(|(word, _)| !word.is_empty())
}

struct Analyzer {
    stemmer: Stemmer,
    vocabulary: HashMap<String, i32>,
}

impl Analyzer {
    fn new() -> Self {
        let stemmer = Stemmer::create(Algorithm::English);
        let mut vocabulary = HashMap::new();
        for (word, polarity) in lexicon_entries(AFINN_165) {
            // Several words collapse onto one stem; the first listed keeps it.
            vocabulary
                .entry(stemmer.stem(word).into_owned())
                .or_insert(polarity);
        }
        Self { stemmer, vocabulary }
    }
}

static ANALYZER: LazyLock<Analyzer> = LazyLock::new(Analyzer::new);

/// Split on anything outside `[A-Za-z0-9_]` and lower-case the pieces.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Mean polarity per token. Zero tokens score zero.
pub fn score(text: &str) -> f64 {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return 0.0;
    }

    let analyzer = &*ANALYZER;
    let mut negator = 1;
    let mut total = 0;
    for token in &tokens {
        if NEGATIONS.contains(&token.as_str()) {
            negator = -1;
            continue;
        }
        let stem = analyzer.stemmer.stem(token);
        if let Some(polarity) = analyzer.vocabulary.get(stem.as_ref()) {
            total += negator * polarity;
        }
    }

    f64::from(total) / tokens.len() as f64
}

pub fn bucket(score: f64) -> Sentiment {
    if score > NEUTRAL_BAND {
        Sentiment::Positive
    } else if score < -NEUTRAL_BAND {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

pub fn analyze(text: &str) -> Sentiment {
    bucket(score(text))
}
