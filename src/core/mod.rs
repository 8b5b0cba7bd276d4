// Core modules: records, input rules, formatting, and error modeling.
pub mod document;
pub mod error;
pub mod format;
pub mod validate;
