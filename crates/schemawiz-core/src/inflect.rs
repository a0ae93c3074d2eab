//! English inflection and case helpers for table and column naming.
//!
//! Only the last word of a compound name is inflected, so `BlogPost` becomes
//! `BlogPosts` and `blog_posts` becomes `blog_post`.

use convert_case::{Case, Casing};

const UNCOUNTABLE: &[&str] = &[
    "audio",
    "data",
    "deer",
    "equipment",
    "feedback",
    "fish",
    "information",
    "metadata",
    "money",
    "news",
    "rice",
    "series",
    "sheep",
    "species",
    "staff",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("child", "children"),
    ("cookie", "cookies"),
    ("criterion", "criteria"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("knife", "knives"),
    ("life", "lives"),
    ("man", "men"),
    ("mouse", "mice"),
    ("movie", "movies"),
    ("ox", "oxen"),
    ("person", "people"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("woman", "women"),
];

/// Pluralize the last word of `word`.
pub fn plural(word: &str) -> String {
    inflect_tail(word, plural_word)
}

/// Singularize the last word of `word`.
pub fn singular(word: &str) -> String {
    inflect_tail(word, singular_word)
}

/// Convert to snake_case.
pub fn snake(word: &str) -> String {
    word.to_case(Case::Snake)
}

/// Table name for a class: snake_case plural.
pub fn table_name(class: &str) -> String {
    snake(&plural(class))
}

/// Foreign column prefix for a class: snake_case singular.
pub fn foreign_prefix(class: &str) -> String {
    snake(&singular(class))
}

fn inflect_tail(word: &str, f: fn(&str) -> String) -> String {
    let (head, tail) = word.split_at(tail_start(word));
    if tail.is_empty() {
        return word.to_string();
    }

    let mut inflected = f(&tail.to_lowercase());
    if !tail.chars().any(char::is_lowercase) {
        inflected = inflected.to_uppercase();
    } else if tail.chars().next().is_some_and(char::is_uppercase) {
        inflected = capitalize(&inflected);
    }
    format!("{}{}", head, inflected)
}

/// Byte offset where the last word starts: after the last `_` or at the
/// last capitalized word.
fn tail_start(word: &str) -> usize {
    let after_underscore = word.rfind('_').map(|i| i + 1).unwrap_or(0);
    let at_upper = word
        .char_indices()
        .zip(word.chars().skip(1))
        .filter(|((_, c), next)| c.is_uppercase() && next.is_lowercase())
        .map(|((i, _), _)| i)
        .last()
        .unwrap_or(0);
    after_underscore.max(at_upper)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn plural_word(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == word || *p == word) {
        return plural.to_string();
    }

    if let Some(stem) = word.strip_suffix("quiz") {
        return format!("{}quizzes", stem);
    }
    if let Some(stem) = word.strip_suffix("sis") {
        return format!("{}ses", stem);
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{}es", word);
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }
    if let Some(stem) = word.strip_suffix("fe") {
        return format!("{}ves", stem);
    }
    if let Some(stem) = word.strip_suffix("lf") {
        return format!("{}lves", stem);
    }
    format!("{}s", word)
}

fn singular_word(word: &str) -> String {
    if UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = IRREGULAR.iter().find(|(s, p)| *p == word || *s == word) {
        return singular.to_string();
    }

    if let Some(stem) = word.strip_suffix("quizzes") {
        return format!("{}quiz", stem);
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{}y", stem);
        }
    }
    if let Some(stem) = word.strip_suffix("lves") {
        return format!("{}lf", stem);
    }
    if word.ends_with("sses") {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with("ouses") {
        return word[..word.len() - 1].to_string();
    }
    if word.ends_with("uses") {
        return word[..word.len() - 2].to_string();
    }
    if ["xes", "zes", "ches", "shes"].iter().any(|s| word.ends_with(s)) {
        return word[..word.len() - 2].to_string();
    }
    if ["ss", "us", "is"].iter().any(|s| word.ends_with(s)) {
        return word.to_string();
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural("post"), "posts");
        assert_eq!(plural("category"), "categories");
        assert_eq!(plural("day"), "days");
        assert_eq!(plural("box"), "boxes");
        assert_eq!(plural("status"), "statuses");
        assert_eq!(plural("person"), "people");
        assert_eq!(plural("knife"), "knives");
        assert_eq!(plural("taggable"), "taggables");
        assert_eq!(plural("news"), "news");
    }

    #[test]
    fn test_singular() {
        assert_eq!(singular("posts"), "post");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("people"), "person");
        assert_eq!(singular("statuses"), "status");
        assert_eq!(singular("addresses"), "address");
        assert_eq!(singular("boxes"), "box");
        assert_eq!(singular("houses"), "house");
        assert_eq!(singular("status"), "status");
        assert_eq!(singular("user"), "user");
        assert_eq!(singular("series"), "series");
    }

    #[test]
    fn test_compound_words_inflect_last_word() {
        assert_eq!(plural("BlogPost"), "BlogPosts");
        assert_eq!(singular("blog_posts"), "blog_post");
        assert_eq!(plural("Person"), "People");
        assert_eq!(singular("Tags"), "Tag");
        assert_eq!(plural("HTTPRequest"), "HTTPRequests");
        assert_eq!(plural("URL"), "URLS");
    }

    #[test]
    fn test_table_and_prefix() {
        assert_eq!(table_name("User"), "users");
        assert_eq!(table_name("BlogPost"), "blog_posts");
        assert_eq!(table_name("Category"), "categories");
        assert_eq!(foreign_prefix("BlogPost"), "blog_post");
        assert_eq!(foreign_prefix("Tag"), "tag");
    }
}
