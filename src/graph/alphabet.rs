use crate::{
    error::{Error, Result},
    types::ELabel,
};
use log::warn;

/// A link type of the alphabet, e.g. `A d t t`.
///
/// The suffixes are appended to the source and destination vertex names read
/// from the network file that belongs to this link type, so that vertices of
/// different namespaces never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkType {
    name: char,
    directed: bool,
    source_suffix: String,
    destination_suffix: String,
}

impl LinkType {
    pub fn new(name: char, directed: bool) -> Self {
        Self::with_suffixes(name, directed, "", "")
    }

    pub fn with_suffixes(
        name: char,
        directed: bool,
        source_suffix: &str,
        destination_suffix: &str,
    ) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            directed,
            source_suffix: String::from(source_suffix),
            destination_suffix: String::from(destination_suffix),
        }
    }

    pub fn name(&self) -> char {
        self.name
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn source_suffix(&self) -> &str {
        &self.source_suffix
    }

    pub fn destination_suffix(&self) -> &str {
        &self.destination_suffix
    }
}

/// The link-type alphabet shared by a motif and the networks it is matched in.
///
/// The position of a type in the alphabet is its [`ELabel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkAlphabet {
    types: Vec<LinkType>,
}

impl LinkAlphabet {
    pub fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Adds `link_type` and returns its label.
    ///
    /// A name that is already known keeps its first definition.
    pub fn add(&mut self, link_type: LinkType) -> Result<ELabel> {
        if !link_type.name.is_ascii_alphabetic() {
            return Err(Error::InvalidLinkType(format!(
                "`{}` is not a letter",
                link_type.name
            )));
        }
        if let Some(elabel) = self.elabel(link_type.name) {
            if self.types[elabel as usize] != link_type {
                warn!(
                    "link type `{}` is redefined, keeping the first definition",
                    link_type.name
                );
            }
            return Ok(elabel);
        }
        if self.types.len() > ELabel::MAX as usize {
            return Err(Error::InvalidLinkType(String::from("too many link types")));
        }
        self.types.push(link_type);
        Ok((self.types.len() - 1) as ELabel)
    }

    /// Looks a type up by name; the case of `name` is ignored.
    pub fn elabel(&self, name: char) -> Option<ELabel> {
        let name = name.to_ascii_uppercase();
        self.types
            .iter()
            .position(|t| t.name == name)
            .map(|pos| pos as ELabel)
    }

    pub fn get(&self, elabel: ELabel) -> Option<&LinkType> {
        self.types.get(elabel as usize)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ELabel, &LinkType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(pos, t)| (pos as ELabel, t))
    }
}
