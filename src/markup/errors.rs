use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarkupError {
    #[error("unclosed <{tag}> element at byte {offset}")]
    UnclosedElement { tag: String, offset: usize },

    #[error(transparent)]
    Edit(#[from] EditError),
}
