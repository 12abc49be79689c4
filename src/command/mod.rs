//! # Command Module
//!
//! Operator actions and their application to session state: the
//! [`CommandDispatcher`] and the input parsing / placement defaults it
//! relies on.

pub mod dispatcher;
pub mod parse;

pub use dispatcher::{CommandDispatcher, OperatorAction};
