//! Shell settings.

/// Default home page.
pub const DEFAULT_HOME_PAGE: &str = "https://www.google.com";

/// Shell settings.
#[derive(Clone, Debug)]
pub struct ShellSettings {
    /// Home page URL, also loaded by new tabs.
    pub home_page: String,
    /// Search engine for non-URL input.
    pub search_engine: SearchEngine,
    /// Open a fresh home tab when the last tab closes.
    pub keep_one_tab: bool,
    /// Application name shown in the window title.
    pub app_name: String,
}

impl ShellSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the home page.
    pub fn with_home_page(mut self, home_page: &str) -> Self {
        self.home_page = home_page.to_string();
        self
    }

    /// Set the search engine.
    pub fn with_search_engine(mut self, search_engine: SearchEngine) -> Self {
        self.search_engine = search_engine;
        self
    }

    /// Keep at least one tab open.
    pub fn with_keep_one_tab(mut self, keep: bool) -> Self {
        self.keep_one_tab = keep;
        self
    }
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            home_page: DEFAULT_HOME_PAGE.to_string(),
            search_engine: SearchEngine::default(),
            keep_one_tab: false,
            app_name: "Wayfarer".to_string(),
        }
    }
}

/// Search engine configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchEngine {
    /// Name.
    pub name: String,
    /// Search URL template; `%s` is replaced by the encoded query.
    pub url_template: String,
}

impl SearchEngine {
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }

    /// Build the search URL for `query`.
    pub fn search_url(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query);
        if self.url_template.contains("%s") {
            self.url_template.replace("%s", &encoded)
        } else {
            format!("{}{}", self.url_template, encoded)
        }
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            name: "Google".to_string(),
            url_template: "https://www.google.com/search?q=%s".to_string(),
        }
    }
}
