//! Thread-local parser pooling.
//!
//! Eliminates redundant parser creation by maintaining a thread-local pool
//! of reusable parsers. Creates a new parser on first use per thread, reuses
//! it for subsequent operations. A migration step parses every matching file
//! in a project, so parser construction cost would otherwise dominate.

use crate::tree::{ParseError, TsParser};
use std::cell::RefCell;

thread_local! {
    static TS_PARSER: RefCell<Option<TsParser>> = const { RefCell::new(None) };
}

/// Execute a function with the pooled TypeScript parser instance.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use uplift::pool::with_parser;
///
/// let result = with_parser(|parser| {
///     parser.parse_with_source("export class AppComponent {}")
/// })?;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, ParseError>
where
    F: FnOnce(&mut TsParser) -> R,
{
    TS_PARSER.with(|cell| {
        let mut opt = cell.borrow_mut();
        if opt.is_none() {
            *opt = Some(TsParser::new()?);
        }
        Ok(f(opt.as_mut().expect("parser was just initialized above")))
    })
}
