use anyhow::{bail, Result};
use engine::search::{phrase_search, positional_search};
use engine::tokenizer::tokenize;
use engine::{DocId, PositionalIndex};
use std::io::{BufRead, Write};

/// A parsed user query. Everything malformed is rejected here, before the
/// engine is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `<first> <n> <second>`: the tokens within `n` positions of each other,
    /// in either order.
    Positional {
        first: String,
        second: String,
        max_distance: u32,
    },
    /// `"<text>"`: the quoted text as a contiguous phrase.
    Phrase(Vec<String>),
}

pub fn parse_query(input: &str) -> Result<Query> {
    let input = input.trim();
    if let Some(rest) = input.strip_prefix('"') {
        let Some(text) = rest.strip_suffix('"') else {
            bail!("phrase queries must end with a closing quote");
        };
        let tokens = tokenize(text);
        if tokens.is_empty() {
            bail!("phrase query contains no tokens");
        }
        return Ok(Query::Phrase(tokens));
    }

    // Queries go through the index tokenizer, so `Apple 2, Banana` and
    // `apple 2 banana` are the same query.
    let tokens = tokenize(input);
    match tokens.as_slice() {
        [first, distance, second] => {
            let Ok(max_distance) = distance.parse::<u32>() else {
                bail!("the middle term must be a non-negative distance, got `{distance}`");
            };
            Ok(Query::Positional {
                first: first.clone(),
                second: second.clone(),
                max_distance,
            })
        }
        _ => bail!("expected `<token> <distance> <token>` or a quoted phrase"),
    }
}

pub fn execute(index: &PositionalIndex, query: &Query) -> Vec<DocId> {
    match query {
        Query::Positional {
            first,
            second,
            max_distance,
        } => positional_search(index, first, second, *max_distance, false),
        Query::Phrase(tokens) => phrase_search(index, tokens),
    }
}

/// The interactive query loop. Reads one query per line until `:quit` or end
/// of input; prints matching document ids or a diagnostic for malformed
/// queries.
pub fn run_loop<R: BufRead, W: Write>(
    index: &PositionalIndex,
    mut input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "Enter a query per line; :quit exits.")?;
    loop {
        write!(output, "query> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        match parse_query(line) {
            Ok(query) => {
                let results = execute(index, &query);
                if results.is_empty() {
                    writeln!(output, "No documents matched the query.")?;
                } else {
                    let ids = results
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", ");
                    writeln!(output, "{} documents matched: {}", results.len(), ids)?;
                }
            }
            Err(reason) => {
                writeln!(output, "Invalid query: {reason}")?;
                writeln!(
                    output,
                    "Examples: `apple 2 banana` (positional) or \"apple banana\" (phrase)"
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_queries() {
        let query = parse_query("apple 2 banana").unwrap();
        assert_eq!(
            query,
            Query::Positional {
                first: "apple".into(),
                second: "banana".into(),
                max_distance: 2,
            }
        );
    }

    #[test]
    fn positional_queries_normalize_like_the_index() {
        let query = parse_query("  Apple 0, Banana! ").unwrap();
        assert_eq!(
            query,
            Query::Positional {
                first: "apple".into(),
                second: "banana".into(),
                max_distance: 0,
            }
        );
    }

    #[test]
    fn parses_phrase_queries() {
        let query = parse_query("\"New York Times\"").unwrap();
        assert_eq!(
            query,
            Query::Phrase(vec!["new".into(), "york".into(), "times".into()])
        );
    }

    #[test]
    fn rejects_unterminated_phrases() {
        assert!(parse_query("\"new york").is_err());
        assert!(parse_query("\"\"").is_err());
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(parse_query("apple banana").is_err());
        assert!(parse_query("apple near banana").is_err());
        assert!(parse_query("apple 2 3 banana").is_err());
        assert!(parse_query("").is_err());
    }
}
