//! Maps each compiler error variant to a distinct non-zero process exit
//! code. The compiler core has no notion of an exit status; this is purely
//! a CLI-polish convenience so scripts can distinguish failure modes
//! without scraping stderr.

use gramfuzz_compiler::Error;

pub const SUCCESS: i32 = 0;
pub const INPUT_ERROR: i32 = 2;
pub const PARSE_ERROR: i32 = 3;
pub const ILL_FORMED_GRAMMAR: i32 = 4;
pub const INTERNAL_ASSERTION: i32 = 70;
pub const OUTPUT_ERROR: i32 = 74;

pub fn for_error(err: &Error) -> i32 {
    match err {
        Error::InputError { .. } => INPUT_ERROR,
        Error::ParseError(_) => PARSE_ERROR,
        Error::IllFormedGrammar(_) => ILL_FORMED_GRAMMAR,
        Error::InternalAssertion { .. } => INTERNAL_ASSERTION,
        Error::OutputError { .. } => OUTPUT_ERROR,
    }
}
