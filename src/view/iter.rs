use std::rc::Rc;

use crate::entity::Entity;
use crate::table::AnyComponentTable;
use crate::view::{Select, View};

/// Iterator over the rows of a [`View`].
///
/// Walks the driving table in dense order, testing each candidate against the
/// view. No table borrow is held between calls to `next`, which is what makes
/// destroying the entity of the row just yielded safe: swap-removal moves the
/// last row into the vacated dense position, and the iterator notices the slot
/// no longer holds the entity it yielded and re-tests the same position
/// instead of advancing past it.
pub struct ViewIter<'v, S: Select> {
    view: &'v View<S>,
    driving: Rc<dyn AnyComponentTable>,
    index: usize,
    last: Option<Entity>,
}

impl<'v, S: Select> ViewIter<'v, S> {
    pub(crate) fn new(view: &'v View<S>) -> Self {
        Self {
            driving: view.driving_table(),
            view,
            index: 0,
            last: None,
        }
    }
}

impl<S: Select> Iterator for ViewIter<'_, S> {
    type Item = S::Row;

    fn next(&mut self) -> Option<S::Row> {
        // Advance past the slot we just yielded only if it still holds the
        // same entity; otherwise a removal swapped an unvisited row in.
        if let Some(last) = self.last {
            if self.driving.entity_at(self.index) == Some(last) {
                self.index += 1;
            }
        }

        loop {
            let entity = self.driving.entity_at(self.index)?;
            if self.view.contains(entity) {
                self.last = Some(entity);
                return Some(self.view.bind_row(entity));
            }
            self.index += 1;
        }
    }
}
