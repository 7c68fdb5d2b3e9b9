//! Outbound reply model.

/// A reply to a single inbound message: the text to show plus optional
/// quick-reply suggestions the front end may render as buttons or
/// hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<String>,
}

impl Reply {
    /// A plain text reply without suggestions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    /// Attaches quick-reply suggestions.
    pub fn with_quick_replies<I, S>(mut self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.quick_replies = replies.into_iter().map(Into::into).collect();
        self
    }
}
