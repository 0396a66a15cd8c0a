//! Cursor over the single slot of a boxed value
//!
//! The cursor holds a weak reference: it expires as soon as the last strong
//! owner drops the box. Moving from inside the slot always leaves it.

use super::{DynIterator, Item, ItemMut, Shape, Spot, UNPOSITIONED_HASH};
use dynval_core::DynObject;
use std::cell::RefCell;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

#[derive(Debug, Clone)]
pub struct VariantCursor {
    var: Weak<RefCell<DynObject>>,
    spot: Spot<()>,
}

impl VariantCursor {
    /// Cursor inside the slot of `var`
    pub fn new(var: &Rc<RefCell<DynObject>>) -> Self {
        Self {
            var: Rc::downgrade(var),
            spot: Spot::At(()),
        }
    }

    fn inside(&self) -> bool {
        self.spot.at().is_some()
    }

    fn enter(&mut self) -> bool {
        if self.expired() {
            return false;
        }
        self.spot = Spot::At(());
        true
    }
}

impl DynIterator for VariantCursor {
    fn expired(&self) -> bool {
        self.var.strong_count() == 0
    }

    fn valid(&self) -> bool {
        self.inside() && !self.expired()
    }

    fn move_next(&mut self) -> bool {
        match self.spot {
            Spot::Detached => self.enter(),
            Spot::At(()) => {
                self.spot = Spot::Exhausted;
                false
            }
            Spot::Exhausted => false,
        }
    }

    fn move_previous(&mut self) -> bool {
        self.move_next()
    }

    fn set_to_first(&mut self) -> bool {
        self.enter()
    }

    fn set_to_last(&mut self) -> bool {
        self.enter()
    }

    fn reset(&mut self) -> bool {
        if self.expired() {
            return false;
        }
        self.spot = Spot::Detached;
        true
    }

    fn extract(&self, shape: Shape, f: &mut dyn FnMut(Item<'_>)) -> bool {
        if !matches!(
            shape,
            Shape::Value | Shape::SharedValue | Shape::ModifiableValue
        ) || !self.inside()
        {
            return false;
        }
        let Some(var) = self.var.upgrade() else {
            return false;
        };
        let Ok(value) = var.try_borrow() else {
            return false;
        };
        f(Item::Value(&*value));
        true
    }

    /// The box is only reachable through a shared reference, so only the
    /// modifiable shape hands out a mutable value
    fn extract_mut(&mut self, shape: Shape, f: &mut dyn FnMut(ItemMut<'_>)) -> bool {
        if shape != Shape::ModifiableValue || !self.inside() {
            return false;
        }
        let Some(var) = self.var.upgrade() else {
            return false;
        };
        let Ok(mut value) = var.try_borrow_mut() else {
            return false;
        };
        f(ItemMut::Value(&mut *value));
        true
    }

    fn get_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.var.as_ptr().hash(&mut hasher);
        if !self.inside() {
            UNPOSITIONED_HASH.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn type_name(&self) -> &'static str {
        "variant"
    }
}

/// Same box, same side of the slot
impl PartialEq for VariantCursor {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.var, &other.var) && self.inside() == other.inside()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_slot() {
        let var = Rc::new(RefCell::new(DynObject::from_int(5)));
        let mut cursor = VariantCursor::new(&var);
        assert!(cursor.valid());
        assert!(!cursor.move_next());
        assert!(!cursor.valid());
        assert!(!cursor.move_previous());
        assert!(cursor.set_to_last());
        assert!(cursor.valid());
    }

    #[test]
    fn test_reset_then_enter() {
        let var = Rc::new(RefCell::new(DynObject::from_int(5)));
        let mut cursor = VariantCursor::new(&var);
        assert!(cursor.reset());
        assert!(!cursor.valid());
        assert!(cursor.move_next());
        assert_eq!(cursor, VariantCursor::new(&var));
    }

    #[test]
    fn test_mutation_only_through_modifiable_shape() {
        let var = Rc::new(RefCell::new(DynObject::from_int(5)));
        let mut cursor = VariantCursor::new(&var);
        assert!(!cursor.extract_mut(Shape::Value, &mut |_| {}));
        assert!(cursor.extract_mut(Shape::ModifiableValue, &mut |mut item| {
            *item.value_mut() = DynObject::from_int(6);
        }));
        assert_eq!(*var.borrow(), DynObject::from_int(6));
        assert!(cursor.extract(Shape::SharedValue, &mut |_| {}));
    }

    #[test]
    fn test_expires_with_box() {
        let var = Rc::new(RefCell::new(DynObject::from_int(5)));
        let mut cursor = VariantCursor::new(&var);
        drop(var);
        assert!(cursor.expired());
        assert!(!cursor.valid());
        assert!(!cursor.can_reset());
        assert!(!cursor.reset());
        assert!(!cursor.set_to_first());
        assert!(!cursor.extract(Shape::Value, &mut |_| {}));
    }

    #[test]
    fn test_identity_equality() {
        let a = Rc::new(RefCell::new(DynObject::from_int(5)));
        let b = Rc::new(RefCell::new(DynObject::from_int(5)));
        let ca = VariantCursor::new(&a);
        assert_ne!(ca, VariantCursor::new(&b));
        let other = ca.clone();
        assert_eq!(ca, other);
        assert_eq!(ca.get_hash(), other.get_hash());
    }
}
