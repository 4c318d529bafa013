//! Cosmetic pretty-printer applied to the emitted fuzzer source when
//! `--pep8` is given. The compiler core never does this (see its crate
//! docs): the emitter's placeholder substitution already produces
//! syntactically valid, consistently-indented Python, so this pass is
//! purely whitespace hygiene, not a full formatter.

/// Trims trailing whitespace from every line, collapses runs of three or
/// more blank lines down to one, and ensures the file ends with exactly
/// one trailing newline.
pub fn tidy(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut blank_run = 0;

    for line in source.lines() {
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(trimmed);
        out.push('\n');
    }

    while out.ends_with("\n\n") {
        out.pop();
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_whitespace() {
        assert_eq!(tidy("def f():   \n    pass  \n"), "def f():\n    pass\n");
    }

    #[test]
    fn collapses_long_blank_runs() {
        assert_eq!(tidy("a\n\n\n\n\nb\n"), "a\n\n\nb\n");
    }

    #[test]
    fn ensures_single_trailing_newline() {
        assert_eq!(tidy("a\n\n\n"), "a\n");
        assert_eq!(tidy("a"), "a\n");
    }
}
