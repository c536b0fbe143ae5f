use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

/// 沒有留言時資料集填入的佔位字串
pub const NO_COMMENT: &str = "NoComment";

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't",
    "did", "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each",
    "else", "ever", "few", "for", "from", "further", "get", "had", "hadn't", "has", "hasn't",
    "have", "haven't", "having", "he", "he'd", "he'll", "he's", "hence", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "however", "http",
    "i", "i'd", "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its",
    "itself", "just", "k", "let's", "like", "me", "more", "most", "mustn't", "my", "myself",
    "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise",
    "ought", "our", "ours", "ourselves", "out", "over", "own", "r", "same", "shall",
    "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "since", "so",
    "some", "such", "than", "that", "that's", "the", "their", "theirs", "them",
    "themselves", "then", "there", "there's", "therefore", "these", "they", "they'd",
    "they'll", "they're", "they've", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've", "were",
    "weren't", "what", "what's", "when", "when's", "where", "where's", "which", "while",
    "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't", "www",
    "you", "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w']+").expect("static token pattern is valid"))
}

fn stopwords() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| STOPWORDS.iter().copied().collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
    /// 相對於最常出現字詞的比例 (0, 1]
    pub weight: f64,
}

/// 可以被當作評論文字的留言
pub fn is_meaningful_comment(comment: &str) -> bool {
    let trimmed = comment.trim();
    !trimmed.is_empty() && trimmed != NO_COMMENT
}

/// 同一個字的各種大小寫寫法，依第一次出現的順序
type Spellings = Vec<(String, usize)>;

fn add_spelling(spellings: &mut Spellings, spelling: &str, count: usize) {
    match spellings.iter_mut().find(|(s, _)| s == spelling) {
        Some((_, n)) => *n += count,
        None => spellings.push((spelling.to_string(), count)),
    }
}

/// 單數形也出現時，把結尾 `s` (非 `ss`) 的複數併入單數
fn fold_plurals(counts: &mut BTreeMap<String, Spellings>) {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|k| k.ends_with('s') && !k.ends_with("ss"))
        .filter(|k| counts.contains_key(&k[..k.len() - 1]))
        .cloned()
        .collect();

    for plural in plurals {
        let Some(spellings) = counts.remove(&plural) else {
            continue;
        };
        let Some(singular) = counts.get_mut(&plural[..plural.len() - 1]) else {
            continue;
        };
        for (spelling, count) in spellings {
            let mut chars = spelling.chars();
            chars.next_back();
            add_spelling(singular, chars.as_str(), count);
        }
    }
}

/// 最常見的寫法，同數時取最先出現的
fn display_spelling(spellings: &Spellings) -> Option<(String, usize)> {
    let total = spellings.iter().map(|(_, n)| n).sum();
    let mut best: Option<&(String, usize)> = None;
    for entry in spellings {
        match best {
            Some(b) if entry.1 <= b.1 => {}
            _ => best = Some(entry),
        }
    }
    best.map(|(spelling, _)| (spelling.clone(), total))
}

/// 統計評論中的字詞頻率 (文字雲的資料來源)
pub fn word_frequencies<'a, I>(comments: I, max_words: usize) -> Vec<WordFrequency>
where
    I: IntoIterator<Item = &'a str>,
{
    let stopwords = stopwords();
    let mut counts: BTreeMap<String, Spellings> = BTreeMap::new();

    for comment in comments.into_iter().filter(|c| is_meaningful_comment(c)) {
        for token in token_pattern().find_iter(comment) {
            let mut word = token.as_str();
            if word.to_lowercase().ends_with("'s") {
                word = &word[..word.len() - 2];
            }
            let key = word.to_lowercase();
            if word.chars().count() < 2
                || stopwords.contains(key.as_str())
                || word.chars().all(|c| c.is_numeric())
            {
                continue;
            }
            add_spelling(counts.entry(key).or_default(), word, 1);
        }
    }

    fold_plurals(&mut counts);

    // BTreeMap 依小寫鍵排序，穩定排序後同數者維持字母順序
    let mut sorted: Vec<(String, usize)> = counts
        .values()
        .filter_map(display_spelling)
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    sorted.truncate(max_words);

    let max_count = sorted.first().map(|(_, c)| *c).unwrap_or(1) as f64;
    sorted
        .into_iter()
        .map(|(word, count)| WordFrequency {
            word,
            weight: count as f64 / max_count,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_frequencies_counts_and_weights() {
        let comments = vec![
            "Produto muito bom, chegou rápido",
            "Muito bom! Recomendo",
            "NoComment",
            "",
            "bom",
        ];
        let words = word_frequencies(comments, 100);

        assert_eq!(words[0].word, "bom");
        assert_eq!(words[0].count, 3);
        assert_eq!(words[0].weight, 1.0);
        assert_eq!(words[1].word, "muito");
        assert_eq!(words[1].count, 2);

        let rapido = words.iter().find(|w| w.word == "rápido").unwrap();
        assert_eq!(rapido.count, 1);
        assert!((rapido.weight - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_stopwords_numbers_and_possessives_are_removed() {
        let comments = vec!["The seller's package arrived in 10 days and it was the best"];
        let words: Vec<String> = word_frequencies(comments, 100)
            .into_iter()
            .map(|w| w.word)
            .collect();

        assert_eq!(words, vec!["arrived", "best", "days", "package", "seller"]);
    }

    #[test]
    fn test_plurals_fold_into_singular() {
        let comments = vec!["Product arrived", "products good", "Delivery delivery"];
        let words: Vec<(String, usize)> = word_frequencies(comments, 100)
            .into_iter()
            .map(|w| (w.word, w.count))
            .collect();

        assert_eq!(
            words,
            vec![
                ("Delivery".to_string(), 2),
                ("Product".to_string(), 2),
                ("arrived".to_string(), 1),
                ("good".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_plural_without_singular_and_double_s_are_kept() {
        let comments = vec!["glass glas boxes"];
        let words: Vec<String> = word_frequencies(comments, 100)
            .into_iter()
            .map(|w| w.word)
            .collect();

        assert_eq!(words, vec!["boxes", "glas", "glass"]);
    }

    #[test]
    fn test_most_frequent_spelling_is_displayed() {
        let comments = vec!["great GREAT Great great", "Brazil brazil Brazil"];
        let words = word_frequencies(comments, 100);

        assert_eq!(words[0].word, "great");
        assert_eq!(words[0].count, 4);
        assert_eq!(words[1].word, "Brazil");
        assert_eq!(words[1].count, 3);
    }

    #[test]
    fn test_max_words_limits_result() {
        let comments = vec!["alpha beta gamma delta alpha beta alpha"];
        let words = word_frequencies(comments, 2);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "alpha");
        assert_eq!(words[1].word, "beta");
    }

    #[test]
    fn test_no_comments_yields_nothing() {
        assert!(word_frequencies(vec!["NoComment", "  "], 100).is_empty());
    }
}
