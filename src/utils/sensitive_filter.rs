use crate::utils::error::CustomError;
use log::{error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// How far a match extends once a sensitive word has been found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    /// Stop at the shortest word ending at the current position
    Min,
    /// Keep walking to the longest word sharing the prefix
    Max,
}

/// Replaces sensitive words in user supplied text
pub trait ContentFilter: Send + Sync {
    fn replace_sensitive_word(
        &self,
        text: &str,
        match_type: MatchType,
        mask: char,
    ) -> Result<String, CustomError>;
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    is_end: bool,
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Character trie over a fixed word list. Matching ignores case.
#[derive(Debug, Default)]
pub struct SensitiveFilter {
    root: TrieNode,
    words: usize,
}

impl SensitiveFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = SensitiveFilter::default();
        for word in words {
            filter.add_word(word.as_ref());
        }
        filter
    }

    /// Build from a word list file: one word per line, `#` starts a comment line
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::new(
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        ))
    }

    fn add_word(&mut self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for c in word.chars() {
            node = node.children.entry(fold(c)).or_default();
        }
        if !node.is_end {
            node.is_end = true;
            self.words += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Length in chars of the sensitive word starting at `start`, 0 when none does
    fn match_len(&self, chars: &[char], start: usize, match_type: MatchType) -> usize {
        let mut node = &self.root;
        let mut matched = 0;
        for (offset, c) in chars[start..].iter().enumerate() {
            match node.children.get(&fold(*c)) {
                Some(next) => {
                    node = next;
                    if node.is_end {
                        matched = offset + 1;
                        if match_type == MatchType::Min {
                            break;
                        }
                    }
                }
                None => break,
            }
        }
        matched
    }

    pub fn replace(&self, text: &str, match_type: MatchType, mask: char) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());
        let mut i = 0;
        while i < chars.len() {
            let len = self.match_len(&chars, i, match_type);
            if len > 0 {
                out.extend(std::iter::repeat_n(mask, len));
                i += len;
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }
        out
    }
}

impl ContentFilter for SensitiveFilter {
    fn replace_sensitive_word(
        &self,
        text: &str,
        match_type: MatchType,
        mask: char,
    ) -> Result<String, CustomError> {
        Ok(self.replace(text, match_type, mask))
    }
}

/// Loads its word list from disk on first use and keeps the outcome for the
/// lifetime of the process. A failed load is reported on every call.
pub struct WordListFilter {
    path: PathBuf,
    loaded: OnceLock<Result<SensitiveFilter, String>>,
}

impl WordListFilter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WordListFilter {
            path: path.into(),
            loaded: OnceLock::new(),
        }
    }

    fn filter(&self) -> Result<&SensitiveFilter, CustomError> {
        let loaded = self.loaded.get_or_init(|| {
            match SensitiveFilter::from_path(&self.path) {
                Ok(filter) => {
                    if filter.is_empty() {
                        warn!("Sensitive word list {} is empty", self.path.display());
                    }
                    info!(
                        "Loaded {} sensitive words from {}",
                        filter.len(),
                        self.path.display()
                    );
                    Ok(filter)
                }
                Err(e) => {
                    error!(
                        "Failed to load sensitive words from {}: {}",
                        self.path.display(),
                        e
                    );
                    Err(format!("sensitive word list unavailable: {}", e))
                }
            }
        });

        loaded
            .as_ref()
            .map_err(|msg| CustomError::FilterError(msg.clone()))
    }
}

impl ContentFilter for WordListFilter {
    fn replace_sensitive_word(
        &self,
        text: &str,
        match_type: MatchType,
        mask: char,
    ) -> Result<String, CustomError> {
        Ok(self.filter()?.replace(text, match_type, mask))
    }
}
