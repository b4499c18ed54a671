use crate::language::Language;

/// Renders every entity as the default comment line naming it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentLanguage;

impl Language for CommentLanguage {
    fn name(&self) -> &str {
        "Comments"
    }

    fn file_extension(&self) -> &str {
        ".txt"
    }
}
