//! Inverted index emulating MongoDB `$text` matching for the in-memory store.
//!
//! Text is lower-cased, split on non-alphanumeric characters, stripped of English
//! stop words and reduced with the Snowball English stemmer. A query matches a
//! document when any of its terms match, unless a `-term` negation also matches.

use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;

use rust_stemmers::Algorithm;
use rust_stemmers::Stemmer;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "did", "do", "does", "doing", "down", "during", "each",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here",
    "hers", "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it",
    "its", "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "through", "to", "too", "under", "until", "up", "very", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
    "with", "you", "your", "yours", "yourself", "yourselves",
];

pub struct TextIndex<K> {
    stemmer: Stemmer,
    postings: HashMap<String, HashSet<K>>,
    terms: HashMap<K, HashSet<String>>,
}

impl<K> TextIndex<K>
where
    K: Copy + Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            postings: HashMap::new(),
            terms: HashMap::new(),
        }
    }

    /// Index `text` under `key`, replacing anything previously indexed for it.
    pub fn insert(&mut self, key: K, text: &str) {
        self.remove(&key);

        let terms: HashSet<String> = self.tokenize(text).into_iter().collect();
        for term in &terms {
            self.postings.entry(term.clone()).or_default().insert(key);
        }
        self.terms.insert(key, terms);
    }

    pub fn remove(&mut self, key: &K) {
        let Some(terms) = self.terms.remove(key) else {
            return;
        };

        for term in terms {
            if let Some(keys) = self.postings.get_mut(&term) {
                keys.remove(key);
                if keys.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
    }

    /// Keys whose text matches the query.
    pub fn search(&self, query: &str) -> HashSet<K> {
        let mut wanted = Vec::new();
        let mut excluded = Vec::new();

        for word in query.split_whitespace() {
            match word.strip_prefix('-') {
                Some(negated) => excluded.extend(self.tokenize(negated)),
                None => wanted.extend(self.tokenize(word)),
            }
        }

        let mut matches: HashSet<K> = wanted
            .iter()
            .filter_map(|term| self.postings.get(term))
            .flatten()
            .copied()
            .collect();

        for term in &excluded {
            if let Some(keys) = self.postings.get(term) {
                matches.retain(|key| !keys.contains(key));
            }
        }

        matches
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_lowercase)
            .filter(|word| !STOP_WORDS.contains(&word.as_str()))
            .map(|word| self.stemmer.stem(&word).into_owned())
            .collect()
    }
}

impl<K> Default for TextIndex<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}
