//! Type model shared by the resolver, the taint engine and the descriptor parser.

mod atomic;
pub mod taint;
mod union;

pub use atomic::{ArrayShape, Atomic, NamedObject, Record};
pub use taint::{TaintKind, TaintSet, TaintSource};
pub use union::Union;
