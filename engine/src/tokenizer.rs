use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PUNCTUATION: Regex = Regex::new(r"[[:punct:]]").expect("valid regex");
}

/// Tokenize text: strip ASCII punctuation, lowercase, split on whitespace.
///
/// No stemming and no stopword removal. The index side and the query side
/// must both go through this function so that query tokens match index keys,
/// and the punctuation strip is what keeps tokens free of the `=`, `;`, `:`
/// and `,` characters the persisted format reserves.
pub fn tokenize(text: &str) -> Vec<String> {
    let stripped = PUNCTUATION.replace_all(text, "");
    stripped
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
