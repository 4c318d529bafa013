/// Derives the emitted generator class name from a grammar name: strips a
/// trailing `Lexer` or `Parser` suffix, then appends `Generator`.
///
/// # Examples
/// ```
/// use gramfuzz_core::utils::generator_class_name;
/// assert_eq!(generator_class_name("JSON"), "JSONGenerator");
/// assert_eq!(generator_class_name("HTMLLexer"), "HTMLGenerator");
/// assert_eq!(generator_class_name("HTMLParser"), "HTMLGenerator");
/// ```
pub fn generator_class_name(grammar_name: &str) -> String {
    let stem = grammar_name
        .strip_suffix("Lexer")
        .or_else(|| grammar_name.strip_suffix("Parser"))
        .unwrap_or(grammar_name);
    format!("{stem}Generator")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_known_suffixes() {
        assert_eq!(generator_class_name("HTMLLexer"), "HTMLGenerator");
        assert_eq!(generator_class_name("HTMLParser"), "HTMLGenerator");
        assert_eq!(generator_class_name("HTML"), "HTMLGenerator");
    }

    #[test]
    fn leaves_unrelated_suffixes_alone() {
        assert_eq!(generator_class_name("CalcGrammar"), "CalcGrammarGenerator");
    }
}
