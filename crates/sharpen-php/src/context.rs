//! Call-site inputs: arguments and the calling class context.

use crate::hierarchy::ClassHierarchy;
use crate::types::Union;

/// Opaque handle of an argument expression in the checker's AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// One argument of a call, with its type when the checker resolved it.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArgument {
    pub expr: ExprId,
    pub ty: Option<Union>,
}

impl CallArgument {
    /// An argument with a resolved type.
    pub fn typed(expr: ExprId, ty: Union) -> Self {
        CallArgument { expr, ty: Some(ty) }
    }

    /// An argument the checker could not type.
    pub fn unresolved(expr: ExprId) -> Self {
        CallArgument { expr, ty: None }
    }
}

/// Hierarchy that knows no classes.
struct NoClasses;

impl ClassHierarchy for NoClasses {
    fn class_exists(&self, _name: &str) -> bool {
        false
    }

    fn parent_classes(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// The class the call appears in, plus access to class metadata.
#[derive(Clone, Copy)]
pub struct CallingContext<'a> {
    /// Name of the enclosing class, if any.
    pub self_class: Option<&'a str>,
    pub hierarchy: &'a dyn ClassHierarchy,
}

impl<'a> CallingContext<'a> {
    /// A context outside any class.
    pub fn new(hierarchy: &'a dyn ClassHierarchy) -> Self {
        CallingContext {
            self_class: None,
            hierarchy,
        }
    }

    /// A context with no class and no class metadata.
    pub fn global() -> CallingContext<'static> {
        CallingContext {
            self_class: None,
            hierarchy: &NoClasses,
        }
    }

    /// This context inside class `name`.
    #[must_use]
    pub fn with_self(mut self, name: &'a str) -> Self {
        self.self_class = Some(name);
        self
    }
}

impl std::fmt::Debug for CallingContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallingContext")
            .field("self_class", &self.self_class)
            .finish_non_exhaustive()
    }
}
