pub mod iter;
pub mod predicate;
pub mod row;

use std::rc::Rc;

use crate::component::Component;
use crate::entity::Entity;
use crate::table::{AnyComponentTable, TableCell};
use crate::view::iter::ViewIter;
use crate::view::predicate::{TableList, ViewPredicate};
use crate::view::row::Binding;
use crate::world::World;

/// A selection of 1 to 3 component types backing a [`View`].
///
/// Implemented for the tuples `(A,)`, `(A, B)` and `(A, B, C)`.
pub trait Select: 'static {
    /// Tuple of table cells the view joins over.
    type Tables: Clone;

    /// Row yielded per matched entity: the entity plus one [`Binding`] per
    /// selected component type.
    type Row;

    fn fetch(world: &World) -> Self::Tables;

    fn contains(tables: &Self::Tables, entity: Entity) -> bool;

    fn smallest(tables: &Self::Tables) -> Rc<dyn AnyComponentTable>;

    fn bind(tables: &Self::Tables, entity: Entity) -> Self::Row;
}

macro_rules! impl_select {
    ($(($ty:ident, $idx:tt)),+) => {
        impl<$($ty: Component),+> Select for ($($ty,)+) {
            type Tables = ($(Rc<TableCell<$ty>>,)+);
            type Row = (Entity, $(Binding<$ty>,)+);

            fn fetch(world: &World) -> Self::Tables {
                ($(world.register_cell::<$ty>(),)+)
            }

            fn contains(tables: &Self::Tables, entity: Entity) -> bool {
                $(tables.$idx.borrow().contains(entity))&&+
            }

            fn smallest(tables: &Self::Tables) -> Rc<dyn AnyComponentTable> {
                let mut best: Rc<dyn AnyComponentTable> = tables.0.clone();
                $(
                    let candidate: Rc<dyn AnyComponentTable> = tables.$idx.clone();
                    if candidate.len() < best.len() {
                        best = candidate;
                    }
                )+
                best
            }

            fn bind(tables: &Self::Tables, entity: Entity) -> Self::Row {
                (entity, $(Binding::new(tables.$idx.clone(), entity),)+)
            }
        }
    };
}

impl_select!((A, 0));
impl_select!((A, 0), (B, 1));
impl_select!((A, 0), (B, 1), (C, 2));

/// A join over 1..3 component tables filtered by a required/excluded
/// predicate.
///
/// Views hold shared handles to their tables and no iteration state: every
/// call to [`View::iter`] re-walks the tables as they are at that moment, so
/// a view built once can be reused across frames.
pub struct View<S: Select> {
    tables: S::Tables,
    predicate: ViewPredicate,
}

impl<S: Select> View<S> {
    /// `true` iff the entity is present in every selected table and allowed
    /// by the predicate.
    pub fn contains(&self, entity: Entity) -> bool {
        self.predicate.is_allowed(entity) && S::contains(&self.tables, entity)
    }

    /// Random-access lookup of a single entity's row.
    pub fn try_get(&self, entity: Entity) -> Option<S::Row> {
        if self.contains(entity) {
            Some(S::bind(&self.tables, entity))
        } else {
            None
        }
    }

    /// Iterates all matching rows.
    ///
    /// Destroying the entity of the row just yielded is supported mid-loop;
    /// any other structural mutation of the joined tables during iteration is
    /// not. Component guards taken from a row must be dropped before the
    /// destroy call.
    pub fn iter(&self) -> ViewIter<'_, S> {
        ViewIter::new(self)
    }

    pub(crate) fn bind_row(&self, entity: Entity) -> S::Row {
        S::bind(&self.tables, entity)
    }

    /// Smallest table among the selection and the predicate's required set;
    /// walking the fewest candidates minimizes per-row membership checks in
    /// the rest of the join.
    pub(crate) fn driving_table(&self) -> Rc<dyn AnyComponentTable> {
        let mut best = S::smallest(&self.tables);
        if let Some(required) = self.predicate.smallest_required() {
            if required.len() < best.len() {
                best = required.clone();
            }
        }
        best
    }
}

impl<'v, S: Select> IntoIterator for &'v View<S> {
    type Item = S::Row;
    type IntoIter = ViewIter<'v, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accumulates required/excluded component types, then builds a [`View`]
/// over the selected component tuple.
pub struct ViewBuilder<'w> {
    world: &'w World,
    required: TableList,
    excluded: TableList,
}

impl<'w> ViewBuilder<'w> {
    pub(crate) fn new(world: &'w World) -> Self {
        Self {
            world,
            required: TableList::new(),
            excluded: TableList::new(),
        }
    }

    /// Matched entities must also carry `T`, without `T` being part of the
    /// selected row.
    pub fn require<T: Component>(mut self) -> Self {
        self.required.push(self.world.register_cell::<T>());
        self
    }

    /// Matched entities must not carry `T`.
    pub fn exclude<T: Component>(mut self) -> Self {
        self.excluded.push(self.world.register_cell::<T>());
        self
    }

    /// Builds the view selecting the component tuple `S`.
    pub fn select<S: Select>(self) -> View<S> {
        View {
            tables: S::fetch(self.world),
            predicate: ViewPredicate::new(self.excluded, self.required),
        }
    }
}
