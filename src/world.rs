use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::allocator::EntityAllocator;
use crate::component::{Component, ComponentExt};
use crate::entity::Entity;
use crate::error::EcsError;
use crate::table::{AnyComponentTable, TableCell};
use crate::view::row::Binding;
use crate::view::ViewBuilder;

/// Registry map keyed by component `TypeId`.
type TypeIdMap<V> = FxHashMap<TypeId, V>;

/// Owns the identity allocator and one component table per component type.
///
/// All operations take `&self`: state lives behind `RefCell`, which is what
/// lets the supported destroy-during-iteration pattern work while a view
/// holds handles to the tables. The `Rc` internals make a `World` neither
/// `Send` nor `Sync`; callers on other threads need their own world.
#[derive(Default)]
pub struct World {
    allocator: RefCell<EntityAllocator>,
    tables: RefCell<TypeIdMap<Rc<dyn AnyComponentTable>>>,
}

impl World {
    pub fn new() -> World {
        World::default()
    }

    /// Creates a new entity with no components.
    pub fn create(&self) -> Entity {
        let entity = self.allocator.borrow_mut().allocate();
        log::trace!("created {:?}", entity);
        entity
    }

    /// Creates a new entity and returns a builder for attaching components
    /// to it fluently.
    pub fn spawn(&self) -> EntityBuilder<'_> {
        EntityBuilder {
            entity: self.create(),
            world: self,
        }
    }

    /// Destroys an entity, removing it from every registered table.
    ///
    /// Returns `false`, with no side effects, if the handle is already
    /// invalid.
    pub fn destroy(&self, entity: Entity) -> bool {
        if !self.allocator.borrow_mut().deallocate(entity) {
            return false;
        }

        for table in self.tables.borrow().values() {
            table.remove(entity);
        }

        log::trace!("destroyed {:?}", entity);
        true
    }

    /// Checks whether a handle refers to a live entity.
    #[inline]
    pub fn is_valid(&self, entity: Entity) -> bool {
        self.allocator.borrow().is_valid(entity)
    }

    /// Attaches a component to an entity, overwriting any existing `T`.
    ///
    /// Fails with [`EcsError::InvalidEntity`] before touching any table if
    /// the handle is stale.
    pub fn attach<T: Component>(&self, entity: Entity, value: T) -> Result<(), EcsError> {
        if !self.is_valid(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }

        self.register_cell::<T>().borrow_mut().add(entity, value);
        Ok(())
    }

    /// Type-erased attach: the boxed value picks (and lazily creates) the
    /// table matching its runtime type.
    ///
    /// Fails with [`EcsError::InvalidEntity`] on a stale handle and
    /// [`EcsError::TypeMismatch`] if a registry entry disagrees with the
    /// value's type, which indicates a corrupted registry and not caller
    /// error.
    pub fn attach_dyn(&self, entity: Entity, value: Box<dyn ComponentExt>) -> Result<(), EcsError> {
        if !self.is_valid(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }

        let type_id = ComponentExt::type_id(value.as_ref());
        let existing = self.tables.borrow().get(&type_id).cloned();
        let table = match existing {
            Some(table) => table,
            None => {
                // UFCS through the trait object: `Box<dyn ComponentExt>` is
                // itself `'static` and so carries the blanket impl, which
                // method-call syntax would pick over the boxed value's own.
                let table = ComponentExt::create_table(value.as_ref());
                log::trace!(
                    "registered component table for {}",
                    ComponentExt::type_name(value.as_ref())
                );
                self.tables.borrow_mut().insert(type_id, table.clone());
                table
            }
        };

        table.add_dyn(entity, value)
    }

    /// Removes an entity's `T` component. Returns `false` if the entity does
    /// not carry one (including when the handle is stale).
    pub fn detach<T: Component>(&self, entity: Entity) -> bool {
        match self.cell::<T>() {
            Some(cell) => cell.borrow_mut().remove(entity),
            None => false,
        }
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.cell::<T>()
            .map(|cell| cell.borrow().contains(entity))
            .unwrap_or(false)
    }

    /// Row accessor for an entity's `T` component, or `None` if absent.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<Binding<T>> {
        Binding::try_new(self.cell::<T>()?, entity)
    }

    /// Row accessor for a component that must be present.
    ///
    /// # Panics
    /// Panics if the handle is stale or the entity carries no `T`; both are
    /// caller bugs under the world's contract.
    pub fn component<T: Component>(&self, entity: Entity) -> Binding<T> {
        assert!(
            self.is_valid(entity),
            "component access through invalid handle {:?}",
            entity
        );
        self.get(entity).unwrap_or_else(|| {
            panic!(
                "{:?} has no {} component",
                entity,
                std::any::type_name::<T>()
            )
        })
    }

    /// Type identifiers (and names) of every component attached to an entity.
    pub fn components_on(&self, entity: Entity) -> Vec<(TypeId, &'static str)> {
        self.tables
            .borrow()
            .values()
            .filter(|table| table.contains(entity))
            .map(|table| (table.component_type_id(), table.component_type_name()))
            .collect()
    }

    /// Ensures a table for `T` exists. Tables are otherwise created lazily on
    /// first attach or first use in a view.
    pub fn register<T: Component>(&self) {
        self.register_cell::<T>();
    }

    /// Starts building a view over this world's tables.
    pub fn view(&self) -> ViewBuilder<'_> {
        ViewBuilder::new(self)
    }

    pub(crate) fn register_cell<T: Component>(&self) -> Rc<TableCell<T>> {
        if let Some(cell) = self.cell::<T>() {
            return cell;
        }

        let cell = Rc::new(TableCell::<T>::default());
        log::trace!(
            "registered component table for {}",
            std::any::type_name::<T>()
        );
        self.tables
            .borrow_mut()
            .insert(TypeId::of::<T>(), cell.clone());
        cell
    }

    fn cell<T: Component>(&self) -> Option<Rc<TableCell<T>>> {
        let table = self.tables.borrow().get(&TypeId::of::<T>()).cloned()?;
        Some(
            table
                .into_any_rc()
                .downcast::<TableCell<T>>()
                .expect("mismatched table type in registry"),
        )
    }
}

/// Fluent helper for creating an entity and attaching its initial components.
pub struct EntityBuilder<'w> {
    world: &'w World,
    entity: Entity,
}

impl EntityBuilder<'_> {
    /// Attaches a component to the entity being built.
    pub fn with<T: Component>(self, value: T) -> Self {
        self.world
            .attach(self.entity, value)
            .expect("entity destroyed while being built");
        self
    }

    /// The created entity.
    pub fn entity(&self) -> Entity {
        self.entity
    }
}
