use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::IndexError;
use crate::index::{DocId, Position, PositionalIndex};

/// Writes the index in its line-oriented text form, one token per line:
///
/// ```text
/// <token>=<doc>:<p1>,<p2>,...;<doc>:<p1>,...;
/// ```
///
/// Tokens come out in ascending lexicographic order and documents in
/// ascending id order; every document group ends with `;`. The format has no
/// escaping, which is fine for the alphanumeric tokens the tokenizer emits.
pub fn write_index<W: Write>(writer: &mut W, index: &PositionalIndex) -> Result<(), IndexError> {
    for (token, documents) in &index.postings {
        write!(writer, "{token}=")?;
        for (doc_id, positions) in documents {
            let positions = positions
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(",");
            write!(writer, "{doc_id}:{positions};")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Saves the index to a file, writing to completion or failing outright.
pub fn save_index<P: AsRef<Path>>(path: P, index: &PositionalIndex) -> Result<(), IndexError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_index(&mut writer, index)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), tokens = index.len(), "index saved");
    Ok(())
}

/// Parses the line format back into an index.
///
/// Any grammar violation fails the whole load with
/// [`IndexError::Corrupt`]: a line without `=`, a document group without
/// `:`, or a non-integer document id or position.
pub fn read_index<R: BufRead>(reader: R) -> Result<PositionalIndex, IndexError> {
    let mut index = PositionalIndex::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let number = number + 1;
        let (token, groups) = line.split_once('=').ok_or_else(|| IndexError::Corrupt {
            line: number,
            reason: "missing `=` between token and postings".into(),
        })?;
        let documents = index.postings.entry(token.to_string()).or_default();
        for group in groups.split(';') {
            let group = group.trim();
            if group.is_empty() {
                continue;
            }
            let (doc_id, positions) = group.split_once(':').ok_or_else(|| IndexError::Corrupt {
                line: number,
                reason: "missing `:` between document id and positions".into(),
            })?;
            let doc_id: DocId = doc_id.parse().map_err(|_| IndexError::Corrupt {
                line: number,
                reason: format!("invalid document id `{doc_id}`"),
            })?;
            let positions = positions
                .split(',')
                .map(|p| p.parse::<Position>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| IndexError::Corrupt {
                    line: number,
                    reason: format!("invalid position list `{positions}`"),
                })?;
            documents.insert(doc_id, positions);
        }
    }
    Ok(index)
}

/// Loads a persisted index. A path that cannot be opened is
/// [`IndexError::NotFound`]; content errors are [`IndexError::Corrupt`].
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<PositionalIndex, IndexError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IndexError::NotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let index = read_index(BufReader::new(file))?;
    tracing::info!(path = %path.display(), tokens = index.len(), "index loaded");
    Ok(index)
}
