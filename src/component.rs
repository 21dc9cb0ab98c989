use std::any::{type_name, Any, TypeId};
use std::rc::Rc;

use crate::table::{AnyComponentTable, TableCell};

/// A component is a plain data record attached to at most one entity per
/// table. Any sized `'static` type qualifies.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Object-safe view of a component value.
///
/// Used by the type-erased attach path: the boxed value knows its own type
/// identity and how to create an empty table for it, so the world registry
/// never has to reflect on runtime types.
pub trait ComponentExt {
    fn type_id(&self) -> TypeId;

    fn type_name(&self) -> &'static str;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Creates an empty table cell for this component type.
    fn create_table(&self) -> Rc<dyn AnyComponentTable>;
}

impl<T: Component> ComponentExt for T {
    fn type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn create_table(&self) -> Rc<dyn AnyComponentTable> {
        Rc::new(TableCell::<T>::default())
    }
}
