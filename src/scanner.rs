use std::fmt;

use crate::Error;

/// Formatting requested by a placeholder: `?`, `?d`, `?f`, `?a` or `?#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    #[default]
    Default,
    Int,
    Float,
    Array,
    Ident,
}

impl Tag {
    /// Tag for the character following `?`, if it is one.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'd' => Some(Self::Int),
            'f' => Some(Self::Float),
            'a' => Some(Self::Array),
            '#' => Some(Self::Ident),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "?",
            Self::Int => "?d",
            Self::Float => "?f",
            Self::Array => "?a",
            Self::Ident => "?#",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Characters that open and close a conditional block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    open: char,
    close: char,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }
}

impl Markers {
    /// # Errors
    /// Returns [`Error::InvalidMarkers`] when both characters are equal or
    /// either one is the placeholder character `?`.
    pub fn new(open: char, close: char) -> Result<Self, Error> {
        if open == close || open == '?' || close == '?' {
            return Err(Error::InvalidMarkers { open, close });
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> char {
        self.open
    }

    pub fn close(&self) -> char {
        self.close
    }
}

/// One lexical event of a template. Offsets are byte positions in the
/// template the token was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    Text(&'t str),
    Placeholder { tag: Tag, offset: usize },
    Open { offset: usize },
    Close { offset: usize },
}

/// Left-to-right tokenizer over a template.
///
/// ```
/// use sqlx_query_template::{Markers, Tag, Token, Tokens};
///
/// let tokens: Vec<_> = Tokens::new("a ?d{b}", Markers::default()).collect();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Text("a "),
///         Token::Placeholder { tag: Tag::Int, offset: 2 },
///         Token::Open { offset: 4 },
///         Token::Text("b"),
///         Token::Close { offset: 6 },
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Tokens<'t> {
    src: &'t str,
    pos: usize,
    markers: Markers,
}

impl<'t> Tokens<'t> {
    pub fn new(src: &'t str, markers: Markers) -> Self {
        Self {
            src,
            pos: 0,
            markers,
        }
    }

    fn is_special(&self, c: char) -> bool {
        c == '?' || c == self.markers.open || c == self.markers.close
    }
}

impl<'t> Iterator for Tokens<'t> {
    type Item = Token<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let src = self.src;
        let rest = &src[self.pos..];
        let mut chars = rest.chars();
        let first = chars.next()?;
        let offset = self.pos;

        if first == '?' {
            let tag = chars.next().and_then(Tag::from_char);
            // every tag character is ASCII
            self.pos += if tag.is_some() { 2 } else { 1 };
            return Some(Token::Placeholder {
                tag: tag.unwrap_or_default(),
                offset,
            });
        }
        if first == self.markers.open {
            self.pos += first.len_utf8();
            return Some(Token::Open { offset });
        }
        if first == self.markers.close {
            self.pos += first.len_utf8();
            return Some(Token::Close { offset });
        }

        let len = rest
            .char_indices()
            .find(|&(_, c)| self.is_special(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        Some(Token::Text(&rest[..len]))
    }
}
