use std::any::{type_name, Any, TypeId};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::component::{Component, ComponentExt};
use crate::entity::Entity;
use crate::error::EcsError;

/// Sparse-array marker for "entity has no row in this table".
const ABSENT: u32 = u32::MAX;

/// Stores one component of type `T` per entity as a sparse set.
///
/// Rows live in dense, order-irrelevant arrays; a sparse array maps an
/// entity's slot index to its dense position. Removal is swap-and-pop, so no
/// ordering is guaranteed across mutations, but insert, lookup, and removal
/// are all O(1).
#[derive(Default)]
pub struct ComponentTable<T> {
    entities: Vec<Entity>,
    data: Vec<T>,
    /// Maps `entity.index()` to a dense position, or [`ABSENT`]. Only ever
    /// grows, to cover the maximum slot index seen.
    sparse: Vec<u32>,
}

impl<T> ComponentTable<T> {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            data: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Number of rows in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Dense entities slice; order changes across removals.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Dense position of an entity's row, if present.
    ///
    /// The stored entity is compared by its full key, which rejects stale
    /// sparse slots left behind by a recycled index.
    pub fn index_of(&self, entity: Entity) -> Option<usize> {
        let pos = *self.sparse.get(entity.index() as usize)? as usize;
        if self.entities.get(pos) == Some(&entity) {
            Some(pos)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.index_of(entity).is_some()
    }

    /// Inserts or overwrites the entity's component.
    ///
    /// An existing row is overwritten in place without reordering; a new row
    /// is appended and the sparse array grown to cover the entity's slot.
    pub fn add(&mut self, entity: Entity, value: T) {
        if let Some(pos) = self.index_of(entity) {
            self.data[pos] = value;
            return;
        }

        let slot = entity.index() as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, ABSENT);
        }
        self.sparse[slot] = self.entities.len() as u32;

        self.entities.push(entity);
        self.data.push(value);
    }

    /// Removes the entity's row by swapping the last row into its place.
    ///
    /// Returns `false` if the entity has no row here.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(pos) = self.index_of(entity) else {
            return false;
        };

        self.sparse[entity.index() as usize] = ABSENT;

        let last = self.entities.len() - 1;
        if pos != last {
            let moved = self.entities[last];
            self.sparse[moved.index() as usize] = pos as u32;
        }
        self.entities.swap_remove(pos);
        self.data.swap_remove(pos);

        true
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index_of(entity).map(|pos| &self.data[pos])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.index_of(entity).map(move |pos| &mut self.data[pos])
    }

    /// Entity occupying a dense position, if the position is in bounds.
    #[inline]
    pub fn entity_at(&self, pos: usize) -> Option<Entity> {
        self.entities.get(pos).copied()
    }

    /// Direct dense access for a row whose position was captured earlier.
    ///
    /// # Panics
    /// Panics if `entity` no longer occupies `pos`, which means the caller
    /// held a row binding across a structural change.
    pub fn reference_at(&mut self, entity: Entity, pos: usize) -> &mut T {
        assert!(
            self.entities.get(pos) == Some(&entity),
            "dereference of a stale row binding for {:?}",
            entity
        );
        &mut self.data[pos]
    }

    /// Drops every row. The sparse array keeps its allocation; only its
    /// logical occupancy is reset.
    pub fn clear(&mut self) {
        for entity in self.entities.drain(..) {
            self.sparse[entity.index() as usize] = ABSENT;
        }
        self.data.clear();
    }

    /// Resolves a row captured at `hint`, falling back to the sparse index if
    /// a swap-removal has moved the row since it was bound.
    ///
    /// # Panics
    /// Panics if the entity has left the table entirely.
    pub(crate) fn resolve(&self, entity: Entity, hint: usize) -> usize {
        if self.entities.get(hint) == Some(&entity) {
            hint
        } else {
            self.index_of(entity)
                .expect("dereference of a stale row binding")
        }
    }

    #[inline]
    pub(crate) fn value_at(&self, pos: usize) -> &T {
        &self.data[pos]
    }

    #[inline]
    pub(crate) fn value_at_mut(&mut self, pos: usize) -> &mut T {
        &mut self.data[pos]
    }
}

/// Shared-ownership wrapper around a [`ComponentTable`], registered in the
/// world keyed by component type.
///
/// The `RefCell` hands out access guards the same way a storage lock would,
/// turning unsupported aliasing (for example holding a component guard while
/// structurally mutating the same table) into an immediate panic instead of
/// silent corruption.
pub struct TableCell<T> {
    inner: RefCell<ComponentTable<T>>,
}

impl<T> Default for TableCell<T> {
    fn default() -> Self {
        Self {
            inner: RefCell::new(ComponentTable::new()),
        }
    }
}

impl<T: Component> TableCell<T> {
    #[inline]
    pub fn borrow(&self) -> Ref<'_, ComponentTable<T>> {
        self.inner.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, ComponentTable<T>> {
        self.inner.borrow_mut()
    }
}

/// Capability surface of a component table with the component type erased.
///
/// The world registry and view predicates operate on tables through this
/// trait; typed access goes through [`TableCell`] after an `Any` downcast.
pub trait AnyComponentTable {
    /// `TypeId` of the component type the table stores.
    fn component_type_id(&self) -> TypeId;

    fn component_type_name(&self) -> &'static str;

    fn len(&self) -> usize;

    fn contains(&self, entity: Entity) -> bool;

    fn remove(&self, entity: Entity) -> bool;

    fn clear(&self);

    /// Entity occupying a dense position, if in bounds.
    fn entity_at(&self, pos: usize) -> Option<Entity>;

    /// Type-erased upsert. Fails with [`EcsError::TypeMismatch`] if the boxed
    /// value is not a `T`.
    fn add_dyn(&self, entity: Entity, value: Box<dyn ComponentExt>) -> Result<(), EcsError>;

    /// Upcast used to recover the typed cell from a registry entry.
    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any>;
}

impl<T: Component> AnyComponentTable for TableCell<T> {
    fn component_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn component_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.inner.borrow().contains(entity)
    }

    fn remove(&self, entity: Entity) -> bool {
        self.inner.borrow_mut().remove(entity)
    }

    fn clear(&self) {
        self.inner.borrow_mut().clear();
    }

    fn entity_at(&self, pos: usize) -> Option<Entity> {
        self.inner.borrow().entity_at(pos)
    }

    fn add_dyn(&self, entity: Entity, value: Box<dyn ComponentExt>) -> Result<(), EcsError> {
        // UFCS so the name comes from the boxed value, not from the box's
        // own blanket `ComponentExt` impl.
        let found = ComponentExt::type_name(value.as_ref());
        match value.into_any().downcast::<T>() {
            Ok(value) => {
                self.inner.borrow_mut().add(entity, *value);
                Ok(())
            }
            Err(_) => Err(EcsError::TypeMismatch {
                expected: type_name::<T>(),
                found,
            }),
        }
    }

    fn into_any_rc(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
