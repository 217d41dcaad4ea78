//
// scripts.rs
//
// Copyright (C) 2026 Posit Software, PBC. All rights reserved.
//
//

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_embed::RustEmbed;

use crate::strings::r_path_literal;
use crate::strings::r_string_literal;

/// R sources shipped with the backend and sent to the session verbatim after
/// placeholder substitution.
#[derive(RustEmbed)]
#[folder = "src/modules"]
struct ScriptAsset;

/// Substitution points look like `@name@`.
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new("@([a-z_]+)@").unwrap());

/// An R source template with named substitution points.
///
/// Values only enter a template through `bind_string`/`bind_path`, which quote
/// them as R string literals, so user-controlled names can't alter the code
/// around them.
pub struct ScriptTemplate {
    name: String,
    source: String,
}

impl ScriptTemplate {
    /// Load a template from the embedded `src/modules` assets.
    pub fn asset(file: &str) -> anyhow::Result<Self> {
        let asset = ScriptAsset::get(file).ok_or(anyhow!("can't open asset {file}"))?;
        let source = std::str::from_utf8(&asset.data)?.to_string();
        Ok(Self {
            name: file.to_string(),
            source,
        })
    }

    /// Wrap an inline literal, for one-liners that don't warrant an asset.
    pub fn inline(name: &str, source: &str) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
        }
    }

    pub fn bind(&self) -> ScriptBindings<'_> {
        ScriptBindings {
            template: self,
            values: HashMap::new(),
        }
    }
}

pub struct ScriptBindings<'a> {
    template: &'a ScriptTemplate,
    values: HashMap<String, String>,
}

impl ScriptBindings<'_> {
    /// Bind a placeholder to a quoted R string literal.
    pub fn bind_string(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), r_string_literal(value));
        self
    }

    /// Bind a placeholder to a quoted R path literal (forward slashes).
    pub fn bind_path(mut self, name: &str, path: &Path) -> Self {
        self.values.insert(name.to_string(), r_path_literal(path));
        self
    }

    /// Substitute every placeholder and return the final R source.
    ///
    /// Fails if the template mentions a placeholder with no binding, or if a
    /// binding was provided for a name the template never mentions.
    pub fn finish(self) -> anyhow::Result<String> {
        let source = &self.template.source;
        let mut out = String::with_capacity(source.len());
        let mut used: HashSet<String> = HashSet::new();
        let mut last = 0;

        for caps in PLACEHOLDER_RE.captures_iter(source) {
            let placeholder = caps.get(0).unwrap();
            let name = &caps[1];

            let Some(value) = self.values.get(name) else {
                return Err(anyhow!(
                    "Script '{}': no binding for placeholder '@{name}@'",
                    self.template.name
                ));
            };

            out.push_str(&source[last..placeholder.start()]);
            out.push_str(value);
            used.insert(name.to_string());
            last = placeholder.end();
        }
        out.push_str(&source[last..]);

        for name in self.values.keys() {
            if !used.contains(name) {
                return Err(anyhow!(
                    "Script '{}': binding '{name}' has no placeholder",
                    self.template.name
                ));
            }
        }

        Ok(out)
    }
}

/// The listing script. Writes the available-tutorials JSON to `listing_tmp`,
/// then renames it onto `listing`.
pub fn list_tutorials(listing_tmp: &Path, listing: &Path) -> anyhow::Result<String> {
    ScriptTemplate::asset("list_tutorials.R")?
        .bind()
        .bind_path("listing_tmp", listing_tmp)
        .bind_path("listing", listing)
        .finish()
}

/// The launch script. Starts the named tutorial and captures its URL into
/// `url_file`.
pub fn run_tutorial(url_file: &Path, name: &str, package: &str) -> anyhow::Result<String> {
    ScriptTemplate::asset("run_tutorial.R")?
        .bind()
        .bind_path("url_file", url_file)
        .bind_string("name", name)
        .bind_string("package", package)
        .finish()
}

/// The exercise-insertion script. `kind` is a `make_exercise` argument string.
pub fn insert_exercise(kind: &str) -> anyhow::Result<String> {
    ScriptTemplate::asset("insert_exercise.R")?
        .bind()
        .bind_string("kind", kind)
        .finish()
}

/// A quiet `source()` call for a script previously written to disk.
pub fn source_quietly(script: &Path) -> anyhow::Result<String> {
    ScriptTemplate::inline(
        "source_quietly",
        r#"source(normalizePath(@script@, winslash = "/"), echo = FALSE, print.eval = FALSE)"#,
    )
    .bind()
    .bind_path("script", script)
    .finish()
}
