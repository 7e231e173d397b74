use std::io::{self, Write};

use aozora_engine::{Candidate, ExtractedDocument};

pub fn write_candidate(out: &mut impl Write, candidate: &Candidate) -> io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        candidate.author_id, candidate.title_id, candidate.title, candidate.detail_url
    )
}

/// Header line, then the text, then a blank line.
pub fn write_document(out: &mut impl Write, document: &ExtractedDocument) -> io::Result<()> {
    let entry = &document.entry;
    let author = if entry.author_name.is_empty() {
        "unknown author"
    } else {
        entry.author_name.as_str()
    };
    writeln!(
        out,
        "=== {} / {} [{}/{}] {}",
        entry.title, author, entry.author_id, entry.title_id, entry.archive_url
    )?;
    out.write_all(document.text.as_bytes())?;
    if !document.text.ends_with('\n') {
        writeln!(out)?;
    }
    writeln!(out)
}
