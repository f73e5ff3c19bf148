use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use engine::persist::save_index;
use engine::tokenizer::tokenize;
use engine::{DocId, Position, PositionalIndex, TokenPositions};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref NEWID_RE: Regex = Regex::new(r#"NEWID="(\d+)""#).expect("valid regex");
    static ref TEXT_RE: Regex = Regex::new(r"(?s)<TEXT(.+)</TEXT>").expect("valid regex");
    static ref TITLE_RE: Regex = Regex::new(r"(?s)<TITLE>(.+)</TITLE>").expect("valid regex");
    static ref BODY_RE: Regex = Regex::new(r"(?s)<BODY>(.+)</BODY>").expect("valid regex");
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaFile {
    num_docs: u32,
    num_tokens: u64,
    created_at: String,
    version: u32,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a positional inverted index from a Reuters SGML corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of .sgm files
    Build {
        /// Corpus directory
        #[arg(long)]
        input: String,
        /// Output index file
        #[arg(long)]
        output: String,
        /// Print corpus statistics after building
        #[arg(long, default_value_t = false)]
        stats: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stats } => build_index(&input, &output, stats),
    }
}

fn build_index(input: &str, output: &str, stats: bool) -> Result<()> {
    let input_path = Path::new(input);
    if !input_path.is_dir() {
        bail!("dataset path is not a directory: {input}");
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("sgm") {
            files.push(p.to_path_buf());
        }
    }
    files.sort();

    let mut documents: BTreeMap<DocId, TokenPositions> = BTreeMap::new();
    for (i, file) in files.iter().enumerate() {
        let articles = index_sgm_file(file, &mut documents)
            .with_context(|| format!("processing {}", file.display()))?;
        tracing::info!(file = %file.display(), articles, "processed file {}/{}", i + 1, files.len());
    }

    let num_docs = documents.len() as u32;
    let mut index = PositionalIndex::new();
    index.merge(documents);
    let num_tokens: u64 = index
        .postings
        .values()
        .flat_map(|documents| documents.values())
        .map(|positions| positions.len() as u64)
        .sum();
    tracing::info!(num_docs, unique_tokens = index.len(), "ingested documents");

    save_index(output, &index)?;
    let meta = MetaFile {
        num_docs,
        num_tokens,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    save_meta(&PathBuf::from(format!("{output}.meta.json")), &meta)?;

    if stats {
        corpus_statistics(&index);
    }
    tracing::info!(output, "index build complete");
    Ok(())
}

fn save_meta(path: &Path, meta: &MetaFile) -> Result<()> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(path, json)?;
    Ok(())
}

struct Article {
    id: DocId,
    text: String,
}

/// Pulls one article out of a `</REUTERS>`-delimited chunk. Blank chunks
/// (typically the tail of a file) yield `None` silently; articles missing a
/// NEWID or a TEXT block are skipped with a warning.
fn extract_article(chunk: &str) -> Option<Article> {
    // The corpus embeds literal "&#3" end-of-text entities; drop them.
    let article = chunk.trim().replace("&#3", "");
    if article.is_empty() {
        return None;
    }
    let Some(id) = NEWID_RE
        .captures(&article)
        .and_then(|c| c[1].parse::<DocId>().ok())
    else {
        tracing::warn!("skipping article without a NEWID attribute");
        return None;
    };
    let Some(text_part) = TEXT_RE.captures(&article) else {
        tracing::warn!(id, "skipping article without a TEXT block");
        return None;
    };
    let text_part = text_part.get(1).map_or("", |m| m.as_str());

    let mut text = String::new();
    if let Some(title) = TITLE_RE.captures(text_part) {
        text.push_str(title.get(1).map_or("", |m| m.as_str()));
    }
    if let Some(body) = BODY_RE.captures(text_part) {
        text.push(' ');
        text.push_str(body.get(1).map_or("", |m| m.as_str()));
    }
    Some(Article { id, text })
}

fn index_sgm_file(path: &Path, documents: &mut BTreeMap<DocId, TokenPositions>) -> Result<usize> {
    let bytes = fs::read(path)?;
    // Reuters-21578 is Latin-1; each byte maps straight to its code point.
    let content: String = bytes.iter().map(|&b| b as char).collect();

    let mut count = 0;
    for chunk in content.split("</REUTERS>") {
        let Some(article) = extract_article(chunk) else {
            continue;
        };
        documents.insert(article.id, token_positions(&article.text));
        count += 1;
    }
    Ok(count)
}

/// Tokenizes a document and records the zero-based stream position of every
/// occurrence, in encounter order.
fn token_positions(text: &str) -> TokenPositions {
    let mut positions = TokenPositions::new();
    for (position, token) in tokenize(text).into_iter().enumerate() {
        positions.entry(token).or_default().push(position as Position);
    }
    positions
}

fn corpus_statistics(index: &PositionalIndex) {
    let mut frequencies: Vec<(&str, usize)> = index
        .postings
        .iter()
        .map(|(token, documents)| (token.as_str(), documents.values().map(Vec::len).sum()))
        .collect();
    let total: usize = frequencies.iter().map(|(_, count)| count).sum();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));

    for (token, count) in frequencies.iter().take(100) {
        println!("{token}: {count}");
    }
    println!("Unique tokens: {}", index.len());
    println!("Total tokens: {total}");
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<REUTERS TOPICS="YES" NEWID="42">
<DATE>26-FEB-1987</DATE>
<TEXT>
<TITLE>Oil prices rise</TITLE>
<BODY>Crude oil prices rose sharply today. Prices had fallen before.
Reuter
</BODY>
</TEXT>
"#;

    #[test]
    fn extracts_id_and_title_plus_body() {
        let article = extract_article(ARTICLE).unwrap();
        assert_eq!(article.id, 42);
        assert!(article.text.starts_with("Oil prices rise"));
        assert!(article.text.contains("Crude oil prices rose"));
    }

    #[test]
    fn skips_blank_and_incomplete_chunks() {
        assert!(extract_article("\n  \n").is_none());
        assert!(extract_article("<REUTERS NEWID=\"7\"><DATE>x</DATE>").is_none());
        assert!(extract_article("<REUTERS><TEXT><BODY>no id</BODY></TEXT>").is_none());
    }

    #[test]
    fn title_only_articles_still_index() {
        let chunk = r#"<REUTERS NEWID="9"><TEXT><TITLE>Grain exports up</TITLE></TEXT>"#;
        let article = extract_article(chunk).unwrap();
        assert_eq!(token_positions(&article.text)["grain"], vec![0]);
    }

    #[test]
    fn token_positions_record_every_occurrence() {
        let positions = token_positions("Prices rose; prices fell.");
        assert_eq!(positions["prices"], vec![0, 2]);
        assert_eq!(positions["rose"], vec![1]);
        assert_eq!(positions["fell"], vec![3]);
    }
}
