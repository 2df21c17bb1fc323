use crate::SifRankError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const EMPTY_TABLE_PROBABILITY: f64 = 1e-6;

/// # Reference unigram frequencies
///
/// Converts raw word counts from a reference corpus into unigram probabilities
/// (`count / total`). Lookups are case-insensitive; unknown words get the smallest
/// probability observed in the table.
#[derive(Debug, Clone)]
pub struct WordFrequencyTable {
    probabilities: HashMap<String, f64>,
    min_probability: f64,
}

impl WordFrequencyTable {
    /// Build a new `WordFrequencyTable` from `(word, count)` pairs. Counts of words that
    /// only differ by case are summed.
    pub fn new<I, S>(counts: I) -> WordFrequencyTable
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut word_counts: HashMap<String, u64> = HashMap::new();
        for (word, count) in counts {
            *word_counts.entry(word.as_ref().to_lowercase()).or_insert(0) += count;
        }
        let total = word_counts.values().sum::<u64>();
        if total == 0 {
            return WordFrequencyTable {
                probabilities: HashMap::new(),
                min_probability: EMPTY_TABLE_PROBABILITY,
            };
        }

        let probabilities = word_counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(word, count)| (word, count as f64 / total as f64))
            .collect::<HashMap<String, f64>>();
        let min_probability = probabilities
            .values()
            .copied()
            .fold(f64::INFINITY, f64::min);
        WordFrequencyTable {
            probabilities,
            min_probability,
        }
    }

    /// Loads a frequency file with one `word count` pair per line (e.g. `enwiki_vocab_min200.txt`).
    /// Empty lines are ignored.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<WordFrequencyTable, SifRankError> {
        let f = File::open(path.as_ref())?;
        let mut counts = Vec::new();
        for (line_number, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let entry = match (fields.next(), fields.next(), fields.next()) {
                (None, _, _) => continue,
                (Some(word), Some(count), None) => count.parse::<u64>().ok().map(|c| (word, c)),
                _ => None,
            };
            match entry {
                Some((word, count)) => counts.push((word.to_string(), count)),
                None => {
                    return Err(SifRankError::InvalidConfigurationError(format!(
                        "Invalid frequency entry at line {} of {}: expected `word count`, got `{}`",
                        line_number + 1,
                        path.as_ref().display(),
                        line
                    )));
                }
            }
        }
        Ok(WordFrequencyTable::new(counts))
    }

    pub fn probability(&self, word: &str) -> f64 {
        self.probabilities
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(self.min_probability)
    }

    /// Probability assigned to words missing from the table
    pub fn min_probability(&self) -> f64 {
        self.min_probability
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }
}
