use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source text")]
    ParseFailed,

    #[error("malformed source: {count} syntax error(s), first at byte {first_start}..{first_end}")]
    Malformed {
        count: usize,
        first_start: usize,
        first_end: usize,
    },
}
