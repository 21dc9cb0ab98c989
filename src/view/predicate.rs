use std::rc::Rc;

use smallvec::SmallVec;

use crate::entity::Entity;
use crate::table::AnyComponentTable;

pub(crate) type TableList = SmallVec<[Rc<dyn AnyComponentTable>; 4]>;

/// Required/excluded membership test applied to each candidate entity while a
/// view iterates.
///
/// Holds the excluded tables as a prefix of a single list. Built once by the
/// view builder; never mutated afterwards.
pub struct ViewPredicate {
    tables: TableList,
    excluded: usize,
}

impl ViewPredicate {
    pub(crate) fn new(excluded: TableList, required: TableList) -> Self {
        let excluded_count = excluded.len();
        let mut tables = excluded;
        tables.extend(required);
        Self {
            tables,
            excluded: excluded_count,
        }
    }

    /// `true` iff the entity is absent from every excluded table and present
    /// in every required table.
    pub fn is_allowed(&self, entity: Entity) -> bool {
        // Excluded tables first: the cheapest rejection for most query shapes.
        for table in &self.tables[..self.excluded] {
            if table.contains(entity) {
                return false;
            }
        }

        for table in &self.tables[self.excluded..] {
            if !table.contains(entity) {
                return false;
            }
        }

        true
    }

    /// The required table with the fewest rows, used to pick the most
    /// selective driving table for iteration.
    pub(crate) fn smallest_required(&self) -> Option<&Rc<dyn AnyComponentTable>> {
        self.tables[self.excluded..].iter().min_by_key(|t| t.len())
    }
}
