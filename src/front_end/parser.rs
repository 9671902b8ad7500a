use crate::{
    error::{Error, Result},
    graph::{Graph, LinkAlphabet, LinkType},
    types::{ELabel, VId},
};
use log::warn;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "front_end/grammar.pest"]
struct IsmagsParser;

/// Parses comma-separated link types such as `A d t t,B u P P`.
///
/// Every entry is a type letter, `d` (directed) or `u` (undirected), and the
/// suffixes of the source and destination vertex names. Returns the alphabet
/// and, per entry, the label it defines; malformed entries are skipped with a
/// warning and get `None`.
pub fn parse_link_types(input: &str) -> Result<(LinkAlphabet, Vec<Option<ELabel>>)> {
    let pairs = IsmagsParser::parse(Rule::link_types, input)
        .map_err(|e| Error::InvalidLinkType(e.to_string()))?;
    let mut alphabet = LinkAlphabet::new();
    let mut entries = Vec::new();
    for pair in pairs {
        match pair.as_rule() {
            Rule::entry => {
                let text = pair.as_str().trim();
                let tokens: Vec<&str> = pair.into_inner().map(|token| token.as_str()).collect();
                let elabel = match parse_entry(&tokens) {
                    Some(link_type) => Some(alphabet.add(link_type)?),
                    None => {
                        warn!("link type `{}` is malformed, ignoring it", text);
                        None
                    }
                };
                entries.push(elabel);
            }
            Rule::EOI => {}
            _ => unreachable!(),
        }
    }
    if alphabet.is_empty() {
        return Err(Error::InvalidLinkType(format!(
            "no valid link type in `{}`",
            input
        )));
    }
    Ok((alphabet, entries))
}

/// Parses a lower-triangular motif description.
///
/// For `n` vertices the description has `n * (n - 1) / 2` characters, read
/// row by row: the character at row `i`, column `j < i` is `0` for no link,
/// an uppercase type letter for a link from `j` to `i`, or a lowercase one for
/// a link from `i` to `j`. The vertices are named `0` to `n - 1`.
pub fn parse_motif(description: &str, alphabet: &LinkAlphabet) -> Result<Graph> {
    let description = description.trim();
    let cells: Vec<char> = IsmagsParser::parse(Rule::motif, description)
        .map_err(|e| Error::InvalidMotif(e.to_string()))?
        .filter(|pair| pair.as_rule() == Rule::cell)
        .filter_map(|pair| pair.as_str().chars().next())
        .collect();
    let num_vertices = triangular_root(cells.len()).ok_or_else(|| {
        Error::InvalidMotif(format!(
            "`{}` has invalid length {}",
            description,
            cells.len()
        ))
    })?;
    let positions = (1..num_vertices).flat_map(|i| (0..i).map(move |j| (i, j)));
    let mut edges: Vec<(String, String, char)> = Vec::new();
    for ((i, j), c) in positions.zip(cells) {
        if c == '0' {
            continue;
        }
        if alphabet.elabel(c).is_none() {
            return Err(Error::InvalidMotif(format!(
                "`{}` uses unknown link type `{}`",
                description, c
            )));
        }
        let (src, dst) = if c.is_ascii_uppercase() { (j, i) } else { (i, j) };
        edges.push((src.to_string(), dst.to_string(), c));
    }
    Graph::load(
        description,
        alphabet,
        (0..num_vertices).map(|v| v.to_string()),
        edges,
    )
}

fn parse_entry(tokens: &[&str]) -> Option<LinkType> {
    let (name, directed, source_suffix, destination_suffix) = match tokens {
        [name, directed, source_suffix, destination_suffix] => {
            (name, directed, source_suffix, destination_suffix)
        }
        _ => return None,
    };
    let mut chars = name.chars();
    let name = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => c,
        _ => return None,
    };
    let directed = match *directed {
        "d" => true,
        "u" => false,
        _ => return None,
    };
    Some(LinkType::with_suffixes(
        name,
        directed,
        source_suffix,
        destination_suffix,
    ))
}

/// Returns `n` such that `n * (n - 1) / 2 == len`.
fn triangular_root(len: usize) -> Option<VId> {
    let mut n: VId = 0;
    while n * n.saturating_sub(1) / 2 < len {
        n += 1;
    }
    if n * n.saturating_sub(1) / 2 == len {
        Some(n)
    } else {
        None
    }
}
