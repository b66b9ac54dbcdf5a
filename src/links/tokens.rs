//! Pull-style XML tokenizer.
//!
//! [`Tokens`] walks a document front to back and yields one [`Token`] per
//! lexical event, without building a tree. Only the current token is held in
//! memory.

use std::iter::FusedIterator;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Malformed XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML at byte {position}")]
    Syntax {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("unexpected end of input with {open} unclosed element(s)")]
    Unclosed { open: usize },

    #[error("character {character:?} not allowed in XML near byte {position}")]
    InvalidChar { position: u64, character: char },

    #[error("invalid name {name:?} near byte {position}")]
    InvalidName { position: u64, name: String },

    #[error("'<' in the value of attribute {name:?} near byte {position}")]
    LtInAttributeValue { position: u64, name: String },
}

/// An attribute of a start element, by local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub local_name: String,
    pub value: String,
}

/// A start element with its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub local_name: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Values of every attribute called `local_name`, duplicates included.
    pub fn attribute_values<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.attributes
            .iter()
            .filter(move |a| a.local_name == local_name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start tag. A self-closing tag yields `Start` followed by `End`.
    Start(Element),
    End { local_name: String },
    /// Character data with entities resolved; CDATA sections included.
    Text(String),
    Comment(String),
    /// Declarations, processing instructions and doctypes.
    Other,
}

/// Lazy token stream over one document.
///
/// Ends after the last token of a well-formed document. On the first error
/// it yields that error once and then ends.
pub struct Tokens<'a> {
    reader: Reader<&'a [u8]>,
    open: usize,
    finished: bool,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut reader = Reader::from_str(text);
        let config = reader.config_mut();
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            open: 0,
            finished: false,
        }
    }

    fn syntax(&self, source: quick_xml::Error) -> XmlError {
        XmlError::Syntax {
            position: self.position(),
            source,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, XmlError> {
        let event = match self.reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(self.syntax(e)),
        };

        let token = match event {
            Event::Start(start) => {
                self.open += 1;
                Token::Start(self.element(&start)?)
            }
            // Not produced while empty elements are expanded.
            Event::Empty(start) => Token::Start(self.element(&start)?),
            Event::End(end) => {
                self.open = self.open.saturating_sub(1);
                Token::End {
                    local_name: lossy(end.local_name().as_ref()),
                }
            }
            Event::Text(text) => {
                let unescaped = text.unescape().map_err(|e| self.syntax(e))?;
                self.check_chars(&unescaped)?;
                Token::Text(unescaped.into_owned())
            }
            Event::CData(data) => Token::Text(self.checked(&data)?),
            Event::Comment(comment) => Token::Comment(self.checked(&comment)?),
            Event::Eof => {
                if self.open > 0 {
                    return Err(XmlError::Unclosed { open: self.open });
                }
                return Ok(None);
            }
            _ => Token::Other,
        };

        Ok(Some(token))
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn check_chars(&self, text: &str) -> Result<(), XmlError> {
        match text.chars().find(|&c| !is_xml_char(c)) {
            Some(character) => Err(XmlError::InvalidChar {
                position: self.position(),
                character,
            }),
            None => Ok(()),
        }
    }

    fn checked(&self, bytes: &[u8]) -> Result<String, XmlError> {
        let text = lossy(bytes);
        self.check_chars(&text)?;
        Ok(text)
    }

    /// Validate a qualified name and return it.
    fn checked_name(&self, bytes: &[u8]) -> Result<String, XmlError> {
        let name = lossy(bytes);
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
        if !valid {
            return Err(XmlError::InvalidName {
                position: self.position(),
                name,
            });
        }
        Ok(name)
    }

    fn element(&self, start: &BytesStart<'_>) -> Result<Element, XmlError> {
        self.checked_name(start.name().as_ref())?;

        let mut attributes = Vec::new();
        let mut attrs = start.attributes();
        // Repeated attributes are kept rather than rejected.
        attrs.with_checks(false);

        for attr in attrs {
            let attr = attr.map_err(|e| self.syntax(e.into()))?;
            let name = self.checked_name(attr.key.as_ref())?;
            if attr.value.contains(&b'<') {
                return Err(XmlError::LtInAttributeValue {
                    position: self.position(),
                    name,
                });
            }
            let value = attr.unescape_value().map_err(|e| self.syntax(e))?;
            self.check_chars(&value)?;
            attributes.push(Attribute {
                local_name: lossy(attr.key.local_name().as_ref()),
                value: value.into_owned(),
            });
        }

        Ok(Element {
            local_name: lossy(start.local_name().as_ref()),
            attributes,
        })
    }
}

// Input is always a &str and names are split at ASCII delimiters, so the
// slices are valid UTF-8 and this never actually replaces anything.
fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// The Char production of XML 1.0. Surrogates cannot occur in a `char`.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c, '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, XmlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}
