use crate::edit::EditError;
use crate::tree::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeclError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("structural assumption violated: expected {construct}")]
    MissingConstruct { construct: &'static str },

    #[error(transparent)]
    Edit(#[from] EditError),
}
