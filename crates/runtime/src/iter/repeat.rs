//! One value replayed a fixed number of times

use super::{DynIterator, Item, Shape, Spot, UNPOSITIONED_HASH, hash_item};
use dynval_core::{Cell, DynObject};

#[derive(Debug, Clone)]
pub struct RepeatCursor {
    value: DynObject,
    count: Cell,
    spot: Spot<Cell>,
}

impl RepeatCursor {
    /// Cursor positioned at the first repetition (unpositioned when `count` is not positive)
    pub fn new(value: DynObject, count: Cell) -> Self {
        let mut cursor = Self {
            value,
            count,
            spot: Spot::Detached,
        };
        cursor.set_to_first();
        cursor
    }

    pub fn index(&self) -> Option<Cell> {
        self.spot.at()
    }
}

impl DynIterator for RepeatCursor {
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
                self.spot = Spot::At(i + 1);
                true
            }
        }
    }

    fn move_previous(&mut self) -> bool {
        match self.spot {
            Spot::Exhausted => false,
            Spot::Detached => self.set_to_last(),
            Spot::At(0) => {
                self.spot = Spot::Exhausted;
                false
            }
            Spot::At(i) => {
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
        self.spot = Spot::At(0);
        true
    }

    fn set_to_last(&mut self) -> bool {
        if self.count <= 0 {
            self.spot = Spot::Detached;
            return false;
        }
        self.spot = Spot::At(self.count - 1);
        true
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
            Shape::Value => f(Item::Value(&self.value)),
            Shape::SharedPair => {
                let key = DynObject::from_int(index);
                f(Item::Pair(&key, &self.value));
            }
            _ => return false,
        }
        true
    }

    fn get_hash(&self) -> u64 {
        match self.spot {
            Spot::At(_) => hash_item(Item::Value(&self.value)),
            _ => UNPOSITIONED_HASH,
        }
    }

    fn type_name(&self) -> &'static str {
        "repeat"
    }
}

impl PartialEq for RepeatCursor {
    fn eq(&self, other: &Self) -> bool {
        match (self.spot.at(), other.spot.at()) {
            (Some(a), Some(b)) => a == b && self.value == other.value,
            (None, None) => true,
            _ => false,
        }
    }
}
