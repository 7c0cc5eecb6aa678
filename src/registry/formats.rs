use std::collections::BTreeMap;

/// Generic format names that expand to several concrete media types,
/// e.g. `html` → `text/html`, `application/xhtml+xml`.
#[derive(Debug, Clone)]
pub struct FormatAliases {
    aliases: BTreeMap<String, Vec<String>>,
}

impl FormatAliases {
    pub fn empty() -> Self {
        Self {
            aliases: BTreeMap::new(),
        }
    }

    /// Define or replace an alias. An empty list leaves the alias untouched.
    pub fn define<I, S>(&mut self, name: impl Into<String>, media_types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let media_types: Vec<String> = media_types.into_iter().map(Into::into).collect();
        if media_types.is_empty() {
            return;
        }
        self.aliases.insert(name.into(), media_types);
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.aliases.get(name).map(Vec::as_slice)
    }

    /// Concrete media types for `name`; unknown names are literal media types.
    pub fn expand(&self, name: &str) -> Vec<String> {
        match self.aliases.get(name) {
            Some(media_types) => media_types.clone(),
            None => vec![name.to_string()],
        }
    }
}

impl Default for FormatAliases {
    fn default() -> Self {
        let mut aliases = Self::empty();
        aliases.define("text", ["text/plain"]);
        aliases.define("html", ["text/html", "application/xhtml+xml"]);
        aliases.define("json", ["application/json", "text/json"]);
        aliases.define(
            "atom",
            ["application/atom+xml", "application/xml", "text/xml"],
        );
        aliases
    }
}
