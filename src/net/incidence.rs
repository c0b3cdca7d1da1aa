//! 输入、输出弧的布尔邻接矩阵：行是库所，列是迁移。
//!
//! 依赖网的弧没有权重，同一 (库所, 迁移, 方向) 至多一条，所以只需要布尔矩阵。
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::{Idx, IndexVec};

type SmallRow = SmallVec<[bool; 8]>;

#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidenceBool {
    rows: IndexVec<PlaceId, SmallRow>,
    cols: usize,
}

impl IncidenceBool {
    pub fn new(places: usize, transitions: usize) -> Self {
        let mut rows = IndexVec::new();
        for _ in 0..places {
            rows.push(SmallRow::from_elem(false, transitions));
        }
        Self {
            rows,
            cols: transitions,
        }
    }

    pub fn push_place(&mut self) -> PlaceId {
        let row = SmallRow::from_elem(false, self.cols);
        self.rows.push(row)
    }

    pub fn push_transition(&mut self) -> TransitionId {
        let next = self.cols;
        for row in self.rows.iter_mut() {
            row.push(false);
        }
        self.cols += 1;
        TransitionId::from_usize(next)
    }

    pub fn places(&self) -> usize {
        self.rows.len()
    }

    pub fn transitions(&self) -> usize {
        self.cols
    }

    pub fn get(&self, place: PlaceId, transition: TransitionId) -> bool {
        self.rows[place][transition.index()]
    }

    /// Sets the cell and reports whether it was previously unset.
    pub fn insert(&mut self, place: PlaceId, transition: TransitionId) -> bool {
        let cell = &mut self.rows[place][transition.index()];
        let fresh = !*cell;
        *cell = true;
        fresh
    }

    /// Transitions connected to `place`, in id order.
    pub fn row(&self, place: PlaceId) -> impl Iterator<Item = TransitionId> + '_ {
        self.rows[place]
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(|(idx, _)| TransitionId::from_usize(idx))
    }

    /// Places connected to `transition`, in id order.
    pub fn column(&self, transition: TransitionId) -> impl Iterator<Item = PlaceId> + '_ {
        self.rows
            .iter_enumerated()
            .filter(move |(_, row)| row[transition.index()])
            .map(|(place, _)| place)
    }

    pub fn count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|set| **set).count())
            .sum()
    }
}

impl fmt::Debug for IncidenceBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncidenceBool")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_reports_fresh_cells_only_once() {
        let mut matrix = IncidenceBool::new(2, 0);
        let t = matrix.push_transition();
        let p = PlaceId::new(1);

        assert!(matrix.insert(p, t));
        assert!(!matrix.insert(p, t));
        assert_eq!(matrix.count(), 1);
        assert_eq!(matrix.column(t).collect::<Vec<_>>(), vec![p]);
        assert_eq!(matrix.row(p).collect::<Vec<_>>(), vec![t]);
    }

    #[test]
    fn new_places_get_full_width_rows() {
        let mut matrix = IncidenceBool::new(0, 0);
        let t0 = matrix.push_transition();
        let t1 = matrix.push_transition();
        let p = matrix.push_place();

        assert!(!matrix.get(p, t0));
        matrix.insert(p, t1);
        assert!(matrix.get(p, t1));
        assert_eq!(matrix.places(), 1);
        assert_eq!(matrix.transitions(), 2);
    }
}
