//! Arithmetic sequence cursor
//!
//! Starts at a value and applies `skip` increments (or decrements, for a
//! negative skip) per step, for `count` steps. Nothing is stored; the current
//! value is an accumulator seeded from the start value on `set_to_first`.
//! There is no last position: reaching it would mean replaying every step.

use super::{DynIterator, Item, Shape, Spot, UNPOSITIONED_HASH, hash_item};
use dynval_core::{Cell, DynObject};

#[derive(Debug, Clone)]
pub struct RangeCursor {
    begin: DynObject,
    current: DynObject,
    count: Cell,
    skip: Cell,
    spot: Spot<Cell>,
}

impl RangeCursor {
    /// Cursor positioned at `start` (unpositioned when `count` is not positive)
    pub fn new(start: DynObject, count: Cell, skip: Cell) -> Self {
        let mut cursor = Self {
            begin: start,
            current: DynObject::new(),
            count,
            skip,
            spot: Spot::Detached,
        };
        cursor.set_to_first();
        cursor
    }

    /// Zero-based position in the sequence
    pub fn index(&self) -> Option<Cell> {
        self.spot.at()
    }

    /// Apply one stride; a value without inc/dec becomes empty
    fn stride(&mut self, forward: bool) {
        if self.skip == 0 {
            return;
        }
        let by = if forward {
            i64::from(self.skip)
        } else {
            -i64::from(self.skip)
        };
        self.current = self.current.offset(by).unwrap_or_default();
    }
}

impl DynIterator for RangeCursor {
    fn expired(&self) -> bool {
        false
    }

    fn valid(&self) -> bool {
        self.spot.at().is_some()
    }

    fn move_next(&mut self) -> bool {
        match self.spot {
            Spot::Exhausted => false,
            Spot::Detached => self.set_to_first(),
            Spot::At(i) if i + 1 >= self.count => {
                self.spot = Spot::Exhausted;
                false
            }
            Spot::At(i) => {
                self.stride(true);
                self.spot = Spot::At(i + 1);
                true
            }
        }
    }

    fn move_previous(&mut self) -> bool {
        match self.spot {
            Spot::Exhausted | Spot::Detached => false,
            Spot::At(0) => {
                self.spot = Spot::Exhausted;
                false
            }
            Spot::At(i) => {
                self.stride(false);
                self.spot = Spot::At(i - 1);
                true
            }
        }
    }

    fn set_to_first(&mut self) -> bool {
        if self.count <= 0 {
            self.spot = Spot::Detached;
            return false;
        }
        self.current = self.begin.clone();
        self.spot = Spot::At(0);
        true
    }

    fn set_to_last(&mut self) -> bool {
        false
    }

    fn reset(&mut self) -> bool {
        self.spot = Spot::Detached;
        true
    }

    fn extract(&self, shape: Shape, f: &mut dyn FnMut(Item<'_>)) -> bool {
        let Some(index) = self.spot.at() else {
            return false;
        };
        match shape {
            Shape::Value => f(Item::Value(&self.current)),
            Shape::SharedPair => {
                let key = DynObject::from_int(index);
                f(Item::Pair(&key, &self.current));
            }
            _ => return false,
        }
        true
    }

    fn get_hash(&self) -> u64 {
        match self.spot {
            Spot::At(_) => hash_item(Item::Value(&self.current)),
            _ => UNPOSITIONED_HASH,
        }
    }

    fn type_name(&self) -> &'static str {
        "range"
    }
}

/// Positioned ranges are equal when their current values are
impl PartialEq for RangeCursor {
    fn eq(&self, other: &Self) -> bool {
        match (self.valid(), other.valid()) {
            (true, true) => self.current == other.current,
            (false, false) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(cursor: &RangeCursor) -> Option<Cell> {
        let mut out = None;
        cursor.extract(Shape::Value, &mut |item| out = item.value().get_cell(0).ok());
        out
    }

    fn visit(mut cursor: RangeCursor) -> Vec<Cell> {
        let mut seen = Vec::new();
        if cursor.valid() {
            loop {
                seen.extend(current(&cursor));
                if !cursor.move_next() {
                    break;
                }
            }
        }
        seen
    }

    #[test]
    fn test_forward_range() {
        let cursor = RangeCursor::new(DynObject::from_int(0), 5, 1);
        assert_eq!(visit(cursor), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_negative_skip_walks_backward() {
        let cursor = RangeCursor::new(DynObject::from_int(4), 5, -1);
        assert_eq!(visit(cursor), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_wide_stride() {
        let cursor = RangeCursor::new(DynObject::from_int(10), 3, 5);
        assert_eq!(visit(cursor), vec![10, 15, 20]);
    }

    #[test]
    fn test_extreme_skip_wraps_in_one_step() {
        let cursor = RangeCursor::new(DynObject::from_int(1), 3, Cell::MIN);
        assert_eq!(visit(cursor), vec![1, 1 + Cell::MIN, 1]);

        let mut cursor = RangeCursor::new(DynObject::from_int(0), 2, Cell::MIN);
        assert!(cursor.move_next());
        assert!(cursor.move_previous());
        assert_eq!(current(&cursor), Some(0));
    }

    #[test]
    fn test_zero_count_is_never_positioned() {
        let mut cursor = RangeCursor::new(DynObject::from_int(0), 0, 1);
        assert!(!cursor.valid());
        assert!(!cursor.set_to_first());
        assert!(!cursor.move_next());
        assert!(!cursor.valid());
    }

    #[test]
    fn test_move_previous_retraces() {
        let mut cursor = RangeCursor::new(DynObject::from_int(0), 5, 2);
        cursor.move_next();
        cursor.move_next();
        assert_eq!(current(&cursor), Some(4));
        assert!(cursor.move_previous());
        assert_eq!(current(&cursor), Some(2));
        assert!(cursor.move_previous());
        assert!(!cursor.move_previous());
        assert!(!cursor.valid());
        assert!(!cursor.move_next());
    }

    #[test]
    fn test_exhausted_until_reset() {
        let mut cursor = RangeCursor::new(DynObject::from_int(0), 2, 1);
        assert!(cursor.move_next());
        assert!(!cursor.move_next());
        assert!(!cursor.move_next());
        assert!(cursor.reset());
        assert!(cursor.move_next());
        assert_eq!(current(&cursor), Some(0));
        assert_eq!(cursor, RangeCursor::new(DynObject::from_int(0), 2, 1));
    }

    #[test]
    fn test_synthesized_pair() {
        let mut cursor = RangeCursor::new(DynObject::from_float(0.5), 3, 1);
        cursor.move_next();
        let mut pair = None;
        assert!(cursor.extract(Shape::SharedPair, &mut |item| {
            if let Item::Pair(k, v) = item {
                pair = Some((k.get_cell(0).unwrap(), v.as_float().unwrap()));
            }
        }));
        assert_eq!(pair, Some((1, 1.5)));
        assert!(!cursor.extract(Shape::Pair, &mut |_| {}));
    }

    #[test]
    fn test_last_unsupported() {
        let mut cursor = RangeCursor::new(DynObject::from_int(0), 3, 1);
        assert!(!cursor.set_to_last());
        assert!(cursor.reset());
        assert!(!cursor.move_previous());
        assert!(!cursor.can_insert());
        assert!(!cursor.can_erase());
        assert!(!cursor.erase());
    }

    #[test]
    fn test_equal_ranges_hash_equal() {
        let mut a = RangeCursor::new(DynObject::from_int(3), 4, 1);
        let mut b = RangeCursor::new(DynObject::from_int(3), 4, 1);
        a.move_next();
        b.move_next();
        assert_eq!(a, b);
        assert_eq!(a.get_hash(), b.get_hash());
        a.reset();
        assert_ne!(a, b);
        b.reset();
        assert_eq!(a.get_hash(), b.get_hash());
    }
}
