//! Translates MongoDB shell `find` invocations into SQL SELECT statements.
//!
//! ```text
//! db.order.find({$and: [{status: 'placed'}, {total: {$gt: 100}}]}, {_id: 0, customer: 1});
//!   │
//!   ├─ invocation::QueryInvocation::split   collection + argument text
//!   ├─ parser::parse_arguments              filter / projection documents
//!   ├─ decompose::decompose_*               {field, operator, operand} parts
//!   ├─ filter::build_filter                 predicate tree
//!   ├─ projection::extract_projection       SELECT field list
//!   └─ sql_compiler::SqlCompiler::compile
//!
//! SELECT customer FROM order WHERE (status = 'placed' AND total > 100);
//! ```
//!
//! [`try_translate`] returns a typed [`TranslationError`]. [`translate`] logs
//! the error and returns an empty string instead, so callers treat `""` as
//! failure.

pub mod ast;
pub mod config;
pub mod decompose;
pub mod error;
pub mod filter;
pub mod invocation;
pub mod lexer;
pub mod parser;
pub mod projection;
pub mod sql_compiler;
pub mod token;

pub use config::TranslatorConfig;
pub use error::{Result, TranslationError};

use ast::{FindQuery, Identifier};
use decompose::{decompose_filter, decompose_projection};
use filter::build_filter;
use invocation::QueryInvocation;
use log::{debug, error};
use parser::parse_arguments;
use projection::extract_projection;
use serde_json::{Map, Value};
use sql_compiler::SqlCompiler;

/// Translation pipeline. Holds no mutable state, so one instance can be
/// shared freely between callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    compiler: SqlCompiler,
}

impl Translator {
    pub fn new(rename_id: bool) -> Self {
        Self {
            compiler: SqlCompiler::with_rename_id(rename_id),
        }
    }

    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.rename_id)
    }

    pub fn rename_id(&self) -> bool {
        self.compiler.rename_id()
    }

    /// Parses an invocation into its AST without rendering it
    pub fn parse(&self, query: &str) -> Result<FindQuery> {
        let invocation = QueryInvocation::split(query)?;

        let mut arguments = parse_arguments(invocation.arguments())?.into_iter();
        let filter_doc = document(arguments.next(), "filter")?;
        let projection_doc = document(arguments.next(), "projection")?;

        let filter_parts = decompose_filter(&filter_doc);
        debug!("Filter parts: {:?}", filter_parts);
        let filter = build_filter(&filter_parts)?;
        debug!("Predicates: {:?}", filter);

        let projection = extract_projection(&decompose_projection(&projection_doc));

        Ok(FindQuery {
            collection: Identifier(invocation.collection.to_string()),
            projection,
            filter,
        })
    }

    /// Translates an invocation, surfacing the failure cause
    pub fn try_translate(&self, query: &str) -> Result<String> {
        let find = self.parse(query)?;
        Ok(self.compiler.compile(&find))
    }

    /// Translates a dynamically typed query; anything but a JSON string is rejected
    pub fn try_translate_value(&self, query: &Value) -> Result<String> {
        match query {
            Value::String(query) => self.try_translate(query),
            _ => Err(TranslationError::InvalidArgumentType),
        }
    }

    /// Translates an invocation, logging failures and returning `""` for them
    pub fn translate(&self, query: &str) -> String {
        report(self.try_translate(query))
    }

    pub fn translate_value(&self, query: &Value) -> String {
        report(self.try_translate_value(query))
    }
}

/// Translates `query`; returns `""` and logs the error on failure
pub fn translate(query: &str, rename_id: bool) -> String {
    Translator::new(rename_id).translate(query)
}

/// Translates `query`, returning the typed error on failure
pub fn try_translate(query: &str, rename_id: bool) -> Result<String> {
    Translator::new(rename_id).try_translate(query)
}

/// Like [`translate`] for callers holding an untyped JSON value
pub fn translate_value(query: &Value, rename_id: bool) -> String {
    Translator::new(rename_id).translate_value(query)
}

fn report(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        error!("Error: {}", e);
        String::new()
    })
}

/// Missing and `null` arguments are empty documents
fn document(argument: Option<Value>, role: &str) -> Result<Map<String, Value>> {
    match argument {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(TranslationError::malformed(format!(
            "{} must be a document, found {}",
            role, other
        ))),
    }
}
