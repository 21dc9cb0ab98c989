use std::cell::{Ref, RefMut};
use std::rc::Rc;

use crate::component::Component;
use crate::entity::Entity;
use crate::table::TableCell;

/// Accessor for one entity's component in one table, produced while a view
/// iterates (or by a single-entity lookup).
///
/// The dense position is captured at bind time; every dereference revalidates
/// it and falls back to the sparse index if a swap-removal moved the row in
/// the meantime. Dereferencing after the component has been removed panics.
pub struct Binding<T: Component> {
    table: Rc<TableCell<T>>,
    entity: Entity,
    /// Dense position at bind time. A hint only; revalidated on access.
    pos: usize,
}

impl<T: Component> Binding<T> {
    pub(crate) fn try_new(table: Rc<TableCell<T>>, entity: Entity) -> Option<Self> {
        let pos = table.borrow().index_of(entity)?;
        Some(Self { table, entity, pos })
    }

    pub(crate) fn new(table: Rc<TableCell<T>>, entity: Entity) -> Self {
        Self::try_new(table, entity).expect("binding for an entity absent from the table")
    }

    /// Entity this binding refers to.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Shared access to the component.
    ///
    /// # Panics
    /// Panics if the component has been removed since the binding was made,
    /// or if the table is mutably borrowed elsewhere.
    pub fn get(&self) -> Ref<'_, T> {
        Ref::map(self.table.borrow(), |table| {
            let pos = table.resolve(self.entity, self.pos);
            table.value_at(pos)
        })
    }

    /// Exclusive access to the component.
    ///
    /// The guard must be dropped before structurally mutating the same table
    /// (including destroying this entity).
    ///
    /// # Panics
    /// Panics under the same conditions as [`Binding::get`].
    pub fn get_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.table.borrow_mut(), |table| {
            let pos = table.resolve(self.entity, self.pos);
            table.value_at_mut(pos)
        })
    }
}
