//! A single attribute with the formatting it was written with.
//!
//! An attribute keeps the whitespace before its name, the exact separator
//! (`=`, ` = `, `=  `, ...) and the quote character, so writing it back yields
//! the bytes it was parsed from.

/// Quote character around an attribute value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Quote {
    #[default]
    None,
    Double,
    Single,
}

impl Quote {
    pub fn as_str(self) -> &'static str {
        match self {
            Quote::None => "",
            Quote::Double => "\"",
            Quote::Single => "'",
        }
    }

    /// Anything other than `"` or `'` means "no quotes".
    pub fn from_char(ch: char) -> Self {
        match ch {
            '"' => Quote::Double,
            '\'' => Quote::Single,
            _ => Quote::None,
        }
    }
}

/// Borrowed pieces of one attribute as found in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeParts<'a> {
    pub whitespace: &'a str,
    pub name: &'a str,
    pub separator: Option<&'a str>,
    pub value: Option<&'a str>,
    pub quote: Quote,
}

/// Capability contract for attribute types stored in an
/// [`AttributeList`](crate::AttributeList).
///
/// The list is generic over this trait so callers can swap in their own
/// attribute representation at compile time.
pub trait AttributeNode {
    fn from_parts(parts: AttributeParts<'_>) -> Self;
    fn name(&self) -> &str;
    fn value(&self) -> Option<&str>;
    fn write_html(&self, out: &mut String);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: Option<String>,
    whitespace: String,
    separator: Option<String>,
    quote: Quote,
}

impl Attribute {
    /// Builds an attribute the way it would be written by hand: one leading
    /// space, and `="value"` when a value is given.
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        let has_value = value.is_some();
        Self {
            name: name.into(),
            value: value.map(str::to_string),
            whitespace: " ".to_string(),
            separator: has_value.then(|| "=".to_string()),
            quote: if has_value { Quote::Double } else { Quote::None },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Replaces the value while keeping the surrounding formatting.
    ///
    /// An unquoted value that would no longer survive unquoted is switched to
    /// double quotes, and a valueless attribute gains `=` and double quotes.
    pub fn set_value(&mut self, value: Option<&str>) {
        match value {
            Some(v) => {
                if self.separator.is_none() {
                    self.separator = Some("=".to_string());
                    if self.quote == Quote::None {
                        self.quote = Quote::Double;
                    }
                }
                if self.quote == Quote::None && needs_quotes(v) {
                    self.quote = Quote::Double;
                }
                self.value = Some(v.to_string());
            }
            None => {
                self.value = None;
                self.separator = None;
                self.quote = Quote::None;
            }
        }
    }

    pub fn whitespace(&self) -> &str {
        &self.whitespace
    }

    pub fn set_whitespace(&mut self, whitespace: impl Into<String>) {
        self.whitespace = whitespace.into();
    }

    pub fn separator(&self) -> Option<&str> {
        self.separator.as_deref()
    }

    pub fn set_separator(&mut self, separator: Option<&str>) {
        self.separator = separator.map(str::to_string);
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn set_quote(&mut self, quote: Quote) {
        self.quote = quote;
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }
}

impl AttributeNode for Attribute {
    fn from_parts(parts: AttributeParts<'_>) -> Self {
        Self {
            name: parts.name.to_string(),
            value: parts.value.map(str::to_string),
            whitespace: parts.whitespace.to_string(),
            separator: parts.separator.map(str::to_string),
            quote: parts.quote,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn write_html(&self, out: &mut String) {
        out.push_str(&self.whitespace);
        out.push_str(&self.name);
        match &self.value {
            Some(value) => {
                out.push_str(self.separator.as_deref().unwrap_or("="));
                out.push_str(self.quote.as_str());
                out.push_str(value);
                out.push_str(self.quote.as_str());
            }
            None => {
                if let Some(separator) = &self.separator {
                    out.push_str(separator);
                }
            }
        }
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.bytes().any(|b| {
            b.is_ascii_whitespace() || matches!(b, b'"' | b'\'' | b'=' | b'<' | b'>' | b'`')
        })
}
