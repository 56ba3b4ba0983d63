use crate::domain::entities::entity::{EntityRef, FieldValue};
use crate::domain::errors::collection_error::CollectionError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub type EntityCollection = Rc<dyn Selectable>;

/// Equality filter on one text field of the collected rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Criteria {
    pub field: String,
    pub value: String,
}

impl Criteria {
    pub fn eq(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// The to-many side of an association that can be filtered.
pub trait Selectable: fmt::Debug {
    /// Returns the rows whose field equals the criteria value, in collection order.
    ///
    /// # Errors
    ///
    /// Returns a [`CollectionError`] if:
    /// - The backing store fails to produce the rows ([`Storage`](CollectionError::Storage)).
    /// - A row does not expose the filtered field ([`UnknownField`](CollectionError::UnknownField)).
    fn matching(&self, criteria: &Criteria) -> Result<Vec<EntityRef>, CollectionError>;

    fn add(&self, row: EntityRef);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collection fully held in memory.
#[derive(Default)]
pub struct ArrayCollection {
    rows: RefCell<Vec<EntityRef>>,
}

impl ArrayCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(rows: Vec<EntityRef>) -> EntityCollection {
        Rc::new(Self {
            rows: RefCell::new(rows),
        })
    }

    pub fn rows(&self) -> Vec<EntityRef> {
        self.rows.borrow().clone()
    }
}

impl fmt::Debug for ArrayCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayCollection")
            .field("len", &self.rows.borrow().len())
            .finish()
    }
}

impl Selectable for ArrayCollection {
    fn matching(&self, criteria: &Criteria) -> Result<Vec<EntityRef>, CollectionError> {
        let mut found = Vec::new();
        for row in self.rows.borrow().iter() {
            let entity = row.borrow();
            let value = entity
                .read_field(&criteria.field)
                .ok_or_else(|| CollectionError::UnknownField {
                    class: entity.class_name().to_string(),
                    field: criteria.field.clone(),
                })?;
            if matches!(value, FieldValue::Text(ref text) if *text == criteria.value) {
                found.push(Rc::clone(row));
            }
        }
        Ok(found)
    }

    fn add(&self, row: EntityRef) {
        self.rows.borrow_mut().push(row);
    }

    fn len(&self) -> usize {
        self.rows.borrow().len()
    }
}
