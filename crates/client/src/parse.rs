//! Containment extraction from Turtle documents.
//!
//! A container listing arrives as a Turtle document describing the container
//! resource. podfs only cares about the containment triples: the objects of
//! the `ldp:contains` predicate, in document order. This module extracts
//! them with a small scanner rather than a full RDF parser; prefixed names
//! and full IRI predicates are both recognized, and object lists may use
//! either absolute URIs or references relative to the container.

use std::collections::{HashMap, HashSet};

use podfs_common::PodUri;

use crate::error::ClientError;
use crate::types::{FolderEntry, FolderListing};

const LDP_NS: &str = "http://www.w3.org/ns/ldp#";
const CONTAINS_IRI: &str = "http://www.w3.org/ns/ldp#contains";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// `<...>` IRI reference, brackets stripped.
    Iri(String),
    /// Bare word: keyword, prefixed name, or directive.
    Word(String),
    /// Quoted literal, content discarded.
    Literal,
    /// One of `, ; .`
    Punct(char),
}

/// Extract the containment listing from a Turtle document.
///
/// # Arguments
/// * `base` - The container the document was fetched from; relative
///   references resolve against it
/// * `document` - Turtle body as served by the pod
///
/// # Errors
/// Returns `ClientError::Protocol` when the document cannot be scanned
/// (unterminated IRI or literal). A document without containment triples is
/// a valid empty listing, not an error.
pub fn parse_containment(base: &PodUri, document: &str) -> Result<FolderListing, ClientError> {
    let tokens: Vec<Token> = tokenize(document).map_err(|message| ClientError::Protocol {
        uri: base.to_string(),
        message,
    })?;
    let prefixes: HashMap<String, String> = collect_prefixes(&tokens);

    let mut seen: HashSet<String> = HashSet::new();
    let mut folders: Vec<FolderEntry> = Vec::new();
    let mut files: Vec<FolderEntry> = Vec::new();

    let mut index = 0;
    while index < tokens.len() {
        if !is_contains_predicate(&tokens[index], &prefixes) {
            index += 1;
            continue;
        }
        index += 1;

        // object list: IRIs or prefixed names separated by commas,
        // terminated by `;` or `.`
        while index < tokens.len() {
            let resolved: Option<PodUri> = match &tokens[index] {
                Token::Iri(reference) => base.join(reference).ok(),
                Token::Word(word) => resolve_prefixed(word, &prefixes)
                    .and_then(|absolute| base.join(&absolute).ok()),
                _ => None,
            };
            index += 1;

            if let Some(child) = resolved {
                if child != *base && seen.insert(child.as_str().to_string()) {
                    push_entry(child, &mut folders, &mut files);
                }
            }

            match tokens.get(index) {
                Some(Token::Punct(',')) => index += 1,
                _ => break,
            }
        }
    }

    Ok(FolderListing {
        uri: base.clone(),
        folders,
        files,
    })
}

fn push_entry(uri: PodUri, folders: &mut Vec<FolderEntry>, files: &mut Vec<FolderEntry>) {
    let Some(segment) = uri.last_segment() else {
        tracing::warn!(uri = %uri, "ignoring containment entry without a name");
        return;
    };
    if uri.is_container() {
        folders.push(FolderEntry {
            name: segment.trim_end_matches('/').to_string(),
            uri,
        });
    } else {
        files.push(FolderEntry { name: segment, uri });
    }
}

/// True iff the token is the `ldp:contains` predicate in any spelling.
fn is_contains_predicate(token: &Token, prefixes: &HashMap<String, String>) -> bool {
    match token {
        Token::Iri(iri) => iri == CONTAINS_IRI,
        Token::Word(word) => {
            resolve_prefixed(word, prefixes).is_some_and(|iri| iri == CONTAINS_IRI)
        }
        _ => false,
    }
}

/// Expand `prefix:local` using the declared prefixes.
fn resolve_prefixed(word: &str, prefixes: &HashMap<String, String>) -> Option<String> {
    let (prefix, local) = word.split_once(':')?;
    let namespace = prefixes.get(prefix)?;
    Some(format!("{namespace}{local}"))
}

/// Collect `@prefix` / `PREFIX` declarations into prefix -> namespace.
fn collect_prefixes(tokens: &[Token]) -> HashMap<String, String> {
    let mut prefixes: HashMap<String, String> = HashMap::new();
    for window in tokens.windows(3) {
        let [Token::Word(directive), Token::Word(name), Token::Iri(namespace)] = window else {
            continue;
        };
        if !directive.eq_ignore_ascii_case("@prefix") && !directive.eq_ignore_ascii_case("prefix")
        {
            continue;
        }
        let Some(name) = name.strip_suffix(':') else {
            continue;
        };
        prefixes.insert(name.to_string(), namespace.clone());
    }
    prefixes
}

fn tokenize(document: &str) -> Result<Vec<Token>, String> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut chars = document.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            _ if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                // comment to end of line
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '<' => {
                chars.next();
                let mut iri = String::new();
                loop {
                    match chars.next() {
                        Some('>') => break,
                        Some(c) => iri.push(c),
                        None => return Err("unterminated IRI reference".to_string()),
                    }
                }
                tokens.push(Token::Iri(iri));
            }
            '"' => {
                chars.next();
                let mut escaped = false;
                loop {
                    match chars.next() {
                        Some('\\') if !escaped => escaped = true,
                        Some('"') if !escaped => break,
                        Some(_) => escaped = false,
                        None => return Err("unterminated literal".to_string()),
                    }
                }
                tokens.push(Token::Literal);
            }
            ',' | ';' => {
                chars.next();
                tokens.push(Token::Punct(c));
            }
            '.' => {
                chars.next();
                tokens.push(Token::Punct('.'));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '<' | '"' | ',' | ';') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                // a trailing dot terminates the statement, not the word
                if let Some(stripped) = word.strip_suffix('.') {
                    if !stripped.is_empty() {
                        tokens.push(Token::Word(stripped.to_string()));
                    }
                    tokens.push(Token::Punct('.'));
                } else if !word.is_empty() {
                    tokens.push(Token::Word(word));
                }
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PodUri {
        PodUri::parse("https://alice.example/docs/").unwrap()
    }

    fn names(entries: &[FolderEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn parses_prefixed_containment() {
        let doc = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            @prefix dct: <http://purl.org/dc/terms/>.

            <> a ldp:BasicContainer, ldp:Container;
               dct:modified "2024-05-01T10:00:00Z";
               ldp:contains <notes/>, <readme.txt>, <img/photo.png>.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.folders), ["notes"]);
        assert_eq!(names(&listing.files), ["readme.txt", "photo.png"]);
        assert_eq!(
            listing.folders[0].uri.as_str(),
            "https://alice.example/docs/notes/"
        );
    }

    #[test]
    fn parses_full_iri_predicate_and_absolute_objects() {
        let doc = r#"
            <https://alice.example/docs/>
                <http://www.w3.org/ns/ldp#contains>
                    <https://alice.example/docs/a.txt> ,
                    <https://alice.example/docs/sub/> .
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.folders), ["sub"]);
        assert_eq!(names(&listing.files), ["a.txt"]);
    }

    #[test]
    fn keeps_document_order_within_partitions() {
        let doc = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            <> ldp:contains <b.txt>, <z/>, <a.txt>, <m/>.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.folders), ["z", "m"]);
        assert_eq!(names(&listing.files), ["b.txt", "a.txt"]);
    }

    #[test]
    fn ignores_self_reference_and_duplicates() {
        let doc = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            <> ldp:contains <>, <a.txt>.
            <> ldp:contains <a.txt>.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.files), ["a.txt"]);
        assert!(listing.folders.is_empty());
    }

    #[test]
    fn empty_container_yields_empty_listing() {
        let doc = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            <> a ldp:BasicContainer.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn literals_and_comments_do_not_confuse_the_scanner() {
        let doc = r#"
            # containment below
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            @prefix dct: <http://purl.org/dc/terms/>.
            <> dct:title "not, contains; anything."; ldp:contains <real.txt>.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.files), ["real.txt"]);
    }

    #[test]
    fn unterminated_iri_is_a_protocol_error() {
        let err = parse_containment(&base(), "<unclosed").unwrap_err();
        assert!(matches!(err, ClientError::Protocol { .. }));
    }

    #[test]
    fn percent_encoded_names_decode_in_entries() {
        let doc = r#"
            @prefix ldp: <http://www.w3.org/ns/ldp#>.
            <> ldp:contains <my%20notes.txt>.
        "#;
        let listing = parse_containment(&base(), doc).unwrap();
        assert_eq!(names(&listing.files), ["my notes.txt"]);
    }
}
