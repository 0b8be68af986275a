//! Splits a raw `db.<collection>.<method>(...)` invocation into its parts

use crate::error::{Result, TranslationError};
use log::{debug, warn};

/// The only method this translator understands
pub const FIND_METHOD: &str = "find";

/// The surface structure of a shell invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInvocation<'a> {
    pub collection: &'a str,
    pub method: &'a str,
    /// The parenthesized argument list, parentheses included
    pub argument_text: &'a str,
}

impl<'a> QueryInvocation<'a> {
    /// Splits `input` into collection, method and argument text.
    ///
    /// `input` is trimmed first. Anything after the closing parenthesis of
    /// the argument list (other than a `;`) is discarded.
    pub fn split(input: &'a str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TranslationError::EmptyQuery);
        }

        let (prefix, rest) = input
            .split_once('.')
            .ok_or_else(|| TranslationError::malformed("expected `db.<collection>.find(...)`"))?;
        if prefix != "db" {
            return Err(TranslationError::malformed(format!(
                "invocation must start with `db.`, found `{}`",
                prefix
            )));
        }

        let (collection, rest) = rest
            .split_once('.')
            .ok_or_else(|| TranslationError::malformed("missing method call"))?;
        if collection.is_empty() {
            return Err(TranslationError::MissingCollectionName);
        }

        let open = rest
            .find('(')
            .ok_or_else(|| TranslationError::malformed("missing method-call parentheses"))?;
        let method = &rest[..open];
        if method != FIND_METHOD {
            return Err(TranslationError::UnsupportedMethod(method.to_string()));
        }

        let close = matching_paren(&rest[open..])
            .map(|offset| open + offset)
            .ok_or(TranslationError::UnbalancedArguments)?;
        let argument_text = &rest[open..=close];

        let trailing = rest[close + 1..].trim_end();
        let trailing = trailing.strip_suffix(';').unwrap_or(trailing);
        if !trailing.trim().is_empty() {
            warn!("Ignoring text after the argument list: {}", trailing.trim());
        }

        let invocation = QueryInvocation { collection, method, argument_text };
        debug!("Split invocation: {:?}", invocation);
        Ok(invocation)
    }

    /// The argument text with the surrounding parentheses removed
    pub fn arguments(&self) -> &'a str {
        &self.argument_text[1..self.argument_text.len() - 1]
    }
}

/// Finds the byte offset of the parenthesis closing the one at offset 0.
/// Parentheses inside quoted strings and `//` / `/* */` comments are ignored.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\'' | '"' => {
                let mut escaped = false;
                for (_, s) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if s == '\\' {
                        escaped = true;
                    } else if s == c {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                chars.find(|&(_, s)| s == '\n');
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut star = false;
                for (_, s) in chars.by_ref() {
                    if star && s == '/' {
                        break;
                    }
                    star = s == '*';
                }
            }
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_find_invocation() {
        let invocation = QueryInvocation::split("db.user.find({_id: 23113},{name: 1});").unwrap();
        assert_eq!(invocation.collection, "user");
        assert_eq!(invocation.method, "find");
        assert_eq!(invocation.argument_text, "({_id: 23113},{name: 1})");
        assert_eq!(invocation.arguments(), "{_id: 23113},{name: 1}");
    }

    #[test]
    fn test_surrounding_whitespace_and_no_semicolon() {
        let invocation = QueryInvocation::split("  db.task.find({title: 'john'})  \n").unwrap();
        assert_eq!(invocation.collection, "task");
        assert_eq!(invocation.arguments(), "{title: 'john'}");
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(QueryInvocation::split("   "), Err(TranslationError::EmptyQuery));
    }

    #[test]
    fn test_wrong_prefix() {
        let result = QueryInvocation::split("foo.user.find({});");
        assert!(matches!(result, Err(TranslationError::MalformedInvocation(_))));
    }

    #[test]
    fn test_missing_dots() {
        assert!(matches!(
            QueryInvocation::split("db"),
            Err(TranslationError::MalformedInvocation(_))
        ));
        assert!(matches!(
            QueryInvocation::split("db.user"),
            Err(TranslationError::MalformedInvocation(_))
        ));
    }

    #[test]
    fn test_missing_collection_name() {
        assert_eq!(
            QueryInvocation::split("db..find({})"),
            Err(TranslationError::MissingCollectionName)
        );
    }

    #[test]
    fn test_missing_parentheses() {
        assert!(matches!(
            QueryInvocation::split("db.user.find"),
            Err(TranslationError::MalformedInvocation(_))
        ));
    }

    #[test]
    fn test_unsupported_method() {
        assert_eq!(
            QueryInvocation::split("db.user.aggregate([])"),
            Err(TranslationError::UnsupportedMethod("aggregate".to_string()))
        );
        assert_eq!(
            QueryInvocation::split("db.user.insertOne({a: 1})"),
            Err(TranslationError::UnsupportedMethod("insertOne".to_string()))
        );
    }

    #[test]
    fn test_unbalanced_arguments() {
        assert_eq!(
            QueryInvocation::split("db.user.find({a: 1}"),
            Err(TranslationError::UnbalancedArguments)
        );
    }

    #[test]
    fn test_parentheses_inside_strings_are_ignored() {
        let invocation = QueryInvocation::split("db.note.find({text: ')('});").unwrap();
        assert_eq!(invocation.arguments(), "{text: ')('}");
    }

    #[test]
    fn test_quotes_and_parentheses_inside_comments_are_ignored() {
        let invocation = QueryInvocation::split("db.u.find({a: 1 /* it's ) */})").unwrap();
        assert_eq!(invocation.arguments(), "{a: 1 /* it's ) */}");

        let invocation = QueryInvocation::split("db.u.find({a: 1 // don't (\n})").unwrap();
        assert_eq!(invocation.arguments(), "{a: 1 // don't (\n}");
    }

    #[test]
    fn test_unterminated_comment_is_unbalanced() {
        assert_eq!(
            QueryInvocation::split("db.u.find({a: 1} /* )"),
            Err(TranslationError::UnbalancedArguments)
        );
    }

    #[test]
    fn test_chained_calls_are_discarded() {
        let invocation = QueryInvocation::split("db.user.find({a: 1}).limit(5);").unwrap();
        assert_eq!(invocation.argument_text, "({a: 1})");
    }
}
