//! Patch file parsing.
//!
//! A patch file is a sequence of blocks of the form:
//!
//! ```text
//! ###NEW_VERSION### Version=1.2
//! free text, ignored
//! ###COMMENT### optional description
//! ###SQL###
//! CREATE TABLE ...
//! GO
//! INSERT INTO ...
//! ###END###
//! ```
//!
//! [`parse_patches`] scans the text anchor by anchor. Each block extends to the
//! next `###NEW_VERSION###` header; a block that does not complete the grammar
//! inside that span is skipped without failing the parse.
//!
//! The version is the full run of digits and dots after `Version=`, and at
//! least one character of prose must follow it before `###COMMENT###` or
//! `###SQL###`. A block such as `Version=12###SQL###...` is skipped; the
//! version is never shortened to make room for the prose.

use crate::error::CoreResult;
use crate::patch::VersionedPatch;
use crate::version::Version;

const HEADER_MARK: &str = "###NEW_VERSION### Version=";
const COMMENT_MARK: &str = "###COMMENT###";
const SQL_MARK: &str = "###SQL###";
const END_MARK: &str = "###END###";

/// Borrowed pieces of a block that matched the grammar.
#[derive(Debug, PartialEq, Eq)]
struct RawBlock<'a> {
    version: &'a str,
    comment: &'a str,
    sql: &'a str,
}

/// Extract every well-formed patch block from `text`, in file order.
///
/// Incomplete blocks (no `###SQL###`, no `###END###`, empty body) produce no
/// record. A complete block whose version is not a dotted list of integers
/// fails with [`crate::CoreError::MalformedVersion`].
pub fn parse_patches(text: &str) -> CoreResult<Vec<VersionedPatch>> {
    let mut patches = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(HEADER_MARK) {
        let block_start = cursor + offset + HEADER_MARK.len();
        let block_end = text[block_start..]
            .find(HEADER_MARK)
            .map_or(text.len(), |next| block_start + next);

        match scan_block(&text[block_start..block_end]) {
            Some(raw) => {
                let version = Version::parse(raw.version)?;
                patches.push(VersionedPatch::new(version, raw.comment, raw.sql));
            }
            None => {
                log::debug!(
                    "Skipping incomplete patch block at byte {}",
                    cursor + offset
                );
            }
        }

        cursor = block_end;
    }

    Ok(patches)
}

/// Match one block body (the text after `Version=`) against the grammar.
fn scan_block(block: &str) -> Option<RawBlock<'_>> {
    let version_len = block
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    let (version, rest) = block.split_at(version_len);

    // At least one character of prose separates the version from the anchors
    let prose_min = next_char_len(rest, 0)?;
    let first_sql = find_from(rest, SQL_MARK, prose_min)?;

    if let Some(comment_at) = find_from(rest, COMMENT_MARK, prose_min) {
        if comment_at < first_sql {
            if let Some((comment, sql)) = scan_commented(rest, comment_at + COMMENT_MARK.len()) {
                return Some(RawBlock {
                    version,
                    comment,
                    sql,
                });
            }
        }
    }

    let sql = scan_body(rest, first_sql + SQL_MARK.len())?;
    Some(RawBlock {
        version,
        comment: "",
        sql,
    })
}

/// `<comment>###SQL###<body>###END###` starting at `comment_start`.
fn scan_commented(rest: &str, comment_start: usize) -> Option<(&str, &str)> {
    let sql_at = find_from(rest, SQL_MARK, comment_start + next_char_len(rest, comment_start)?)?;
    let sql = scan_body(rest, sql_at + SQL_MARK.len())?;
    Some((&rest[comment_start..sql_at], sql))
}

/// `<body>###END###` starting at `body_start`; the body may not be empty.
fn scan_body(rest: &str, body_start: usize) -> Option<&str> {
    let end_at = find_from(rest, END_MARK, body_start + next_char_len(rest, body_start)?)?;
    Some(&rest[body_start..end_at])
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .find(needle)
        .map(|offset| from + offset)
}

fn next_char_len(s: &str, at: usize) -> Option<usize> {
    s.get(at..)?.chars().next().map(char::len_utf8)
}

/// Split a patch body into executable statements.
///
/// A line whose trimmed content equals `separator` (ASCII case-insensitive)
/// ends the current statement. Fragments are trimmed and empty fragments are
/// dropped.
pub fn split_statements(sql: &str, separator: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        if line.trim().eq_ignore_ascii_case(separator) {
            push_statement(&mut statements, &current);
            current.clear();
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }
    push_statement(&mut statements, &current);

    statements
}

fn push_statement(statements: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
