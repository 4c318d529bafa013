//! Deferred substitution: the emitter writes `{name}` markers into its text
//! buffers instead of values it doesn't know yet (a rule's minimum depth
//! isn't known until the whole grammar has been walked); this table
//! records every marker's eventual value and performs one substitution
//! pass at the end.

use indexmap::IndexMap;

use crate::error::SubstitutionError;

/// Maps a synthetic placeholder name to its final text. Also owns the
/// per-kind monotonic counters used to mint fresh names (`alt_0`, `alt_1`,
/// `cond_0`, ... — each kind counts independently, so `cond_3` and `alt_7`
/// coexisting in one compilation doesn't imply four other `cond_*` or
/// `alt_*` entries were minted and discarded).
#[derive(Debug, Default)]
pub struct PlaceholderTable {
    values: IndexMap<String, String>,
    counters: IndexMap<String, u32>,
}

impl PlaceholderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh, never-before-used name of the form `<kind>_<index>`.
    pub fn fresh(&mut self, kind: &str) -> String {
        let counter = self.counters.entry(kind.to_string()).or_insert(0);
        let name = format!("{kind}_{counter}");
        *counter += 1;
        name
    }

    /// Records (or overwrites) a placeholder's value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Substitutes every `{name}` marker in `text` with its recorded value.
    /// A literal `{{` / `}}` escapes to a single brace, matching the usual
    /// format-string convention so header/body text can still talk about
    /// real braces (e.g. emitted target-language blocks).
    ///
    /// Every marker must resolve — the placeholder alphabet is closed and
    /// generated entirely by this compilation's own emitter, so a missing
    /// key is an internal bug, not user input to tolerate.
    pub fn substitute(&self, text: &str) -> Result<String, SubstitutionError> {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '{' if text[i + 1..].starts_with('{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if text[i + 1..].starts_with('}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let start = i + 1;
                    let end = loop {
                        match chars.next() {
                            Some((j, '}')) => break j,
                            Some(_) => continue,
                            None => {
                                // Unterminated marker: treat the rest as literal text,
                                // matching the "no silent pass-through" rule by still
                                // failing loudly on the name lookup below.
                                break text.len();
                            }
                        }
                    };
                    let name = &text[start..end];
                    match self.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            return Err(SubstitutionError {
                                name: name.to_string(),
                            });
                        }
                    }
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_names_count_per_kind() {
        let mut table = PlaceholderTable::new();
        assert_eq!(table.fresh("alt"), "alt_0");
        assert_eq!(table.fresh("cond"), "cond_0");
        assert_eq!(table.fresh("alt"), "alt_1");
        assert_eq!(table.fresh("cond"), "cond_1");
    }

    #[test]
    fn substitute_replaces_known_markers() {
        let mut table = PlaceholderTable::new();
        table.set("r", "3");
        table.set("lit_0", "'hello'");
        let out = table.substitute("min_depth = {r}\nvalue = {lit_0}").unwrap();
        assert_eq!(out, "min_depth = 3\nvalue = 'hello'");
    }

    #[test]
    fn substitute_keeps_escaped_braces() {
        let table = PlaceholderTable::new();
        let out = table.substitute("def f(): {{\n    pass\n}}").unwrap();
        assert_eq!(out, "def f(): {\n    pass\n}");
    }

    #[test]
    fn substitute_fails_on_unknown_marker() {
        let table = PlaceholderTable::new();
        let err = table.substitute("{missing}").unwrap_err();
        assert_eq!(err.name, "missing");
    }
}
