//! Address bar component.

use crate::settings::SearchEngine;

/// Where typed address-bar text leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    /// Nothing to navigate to.
    Empty,
    /// Text taken as an address.
    Url(String),
    /// Text taken as a search query, resolved to the search URL.
    Search(String),
}

impl Destination {
    /// URL to load, if any.
    pub fn url(&self) -> Option<&str> {
        match self {
            Destination::Empty => None,
            Destination::Url(url) | Destination::Search(url) => Some(url),
        }
    }
}

/// Schemes passed through untouched.
const PASSTHROUGH_SCHEMES: [&str; 5] = ["http://", "https://", "about:", "file:", "data:"];

/// Decide whether typed text is an address or a search query.
pub fn classify_input(text: &str, search: &SearchEngine) -> Destination {
    let text = text.trim();
    if text.is_empty() {
        return Destination::Empty;
    }

    let lower = text.to_ascii_lowercase();
    if PASSTHROUGH_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return Destination::Url(text.to_string());
    }

    let has_whitespace = text.chars().any(char::is_whitespace);
    if !has_whitespace && text.contains('.') {
        return Destination::Url(format!("https://{}", text));
    }

    if !has_whitespace && is_localhost(&lower) {
        return Destination::Url(format!("http://{}", text));
    }

    Destination::Search(search.search_url(text))
}

fn is_localhost(lower: &str) -> bool {
    match lower.strip_prefix("localhost") {
        Some(rest) => {
            rest.is_empty()
                || rest.starts_with('/')
                || rest
                    .strip_prefix(':')
                    .map(|port| {
                        let digits = port.split('/').next().unwrap_or_default();
                        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
                    })
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Address bar.
///
/// Holds the URL of the current page and the text being edited. While the
/// bar is focused, page navigation does not clobber the edit.
pub struct AddressBar {
    /// Current URL.
    url: String,
    /// Input text.
    input: String,
    /// Is focused.
    focused: bool,
}

impl AddressBar {
    /// Create a new address bar.
    pub fn new() -> Self {
        Self {
            url: String::new(),
            input: String::new(),
            focused: false,
        }
    }

    /// Get the URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Show a new URL.
    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
        if !self.focused {
            self.input = url.to_string();
        }
    }

    /// Get the input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Start editing.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Replace the edited text, focusing the bar.
    pub fn edit(&mut self, input: &str) {
        self.focused = true;
        self.input = input.to_string();
    }

    /// Drop the edit and show the page URL again.
    pub fn revert(&mut self) {
        self.focused = false;
        self.input = self.url.clone();
    }

    /// Finish editing and classify the typed text.
    pub fn submit(&mut self, search: &SearchEngine) -> Destination {
        let destination = classify_input(&self.input, search);
        self.revert();
        destination
    }

    /// Check if focused.
    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

impl Default for AddressBar {
    fn default() -> Self {
        Self::new()
    }
}
