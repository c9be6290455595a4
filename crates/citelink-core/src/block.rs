/// The ordered list numbering styles the parser can recover from answer text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListStyle {
    Decimal,
    LowerAlpha,
    UpperAlpha,
}

impl ListStyle {
    /// CSS `list-style-type` keyword for this style.
    pub fn css_keyword(self) -> &'static str {
        match self {
            ListStyle::Decimal => "decimal",
            ListStyle::LowerAlpha => "lower-alpha",
            ListStyle::UpperAlpha => "upper-alpha",
        }
    }

    /// HTML `type` attribute value for an `<ol>`, if the style needs one.
    pub fn type_attr(self) -> Option<&'static str> {
        match self {
            ListStyle::Decimal => None,
            ListStyle::LowerAlpha => Some("a"),
            ListStyle::UpperAlpha => Some("A"),
        }
    }
}

/// One structurally classified unit of an assistant answer.
///
/// Blocks are derived data: they are recomputed from the message content
/// alone and never persisted. List blocks always have at least one item.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerBlock {
    Paragraph {
        text: String,
    },
    UnorderedList {
        items: Vec<String>,
    },
    OrderedList {
        items: Vec<String>,
        start: u32,
        style: ListStyle,
    },
}
