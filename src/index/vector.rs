use std::sync::OnceLock;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::{Error, ErrorKind, Result};

/// Sparse numeric vector over term ordinals.
///
/// Elements are `(index, value)` pairs with strictly increasing
/// indices; the wire form is the flat `[i0, v0, i1, v1, ...]` array.
/// The magnitude is memoized and reset by any mutation.
#[derive(Debug, Default)]
pub struct Vector {
    elements: Vec<(u32, f64)>,
    magnitude: OnceLock<f64>,
}

impl Clone for Vector {
    fn clone(&self) -> Self {
        Vector {
            elements: self.elements.clone(),
            magnitude: self.magnitude.clone(),
        }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Vector {
    pub fn new() -> Self {
        Vector::default()
    }

    pub fn from_pairs(elements: Vec<(u32, f64)>) -> Self {
        Vector {
            elements,
            magnitude: OnceLock::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Least-upper-bound position for `index` among the stored pairs.
    pub fn position_for_index(&self, index: u32) -> usize {
        self.elements.partition_point(|&(i, _)| i < index)
    }

    /// Insert a value at a new index; an occupied index is a
    /// structural error.
    pub fn insert(&mut self, index: u32, value: f64) -> Result<()> {
        let position = self.position_for_index(index);
        if self
            .elements
            .get(position)
            .is_some_and(|&(i, _)| i == index)
        {
            return Err(Error::new(
                ErrorKind::DuplicateIndex,
                format!("duplicate index {}", index),
            ));
        }

        self.elements.insert(position, (index, value));
        self.magnitude = OnceLock::new();
        Ok(())
    }

    /// Insert or combine: on collision the stored value becomes
    /// `combine(old, value)`.
    pub fn upsert<F>(&mut self, index: u32, value: f64, combine: F)
    where
        F: FnOnce(f64, f64) -> f64,
    {
        let position = self.position_for_index(index);
        match self.elements.get_mut(position) {
            Some(element) if element.0 == index => {
                element.1 = combine(element.1, value);
            }
            _ => self.elements.insert(position, (index, value)),
        }
        self.magnitude = OnceLock::new();
    }

    pub fn magnitude(&self) -> f64 {
        *self.magnitude.get_or_init(|| {
            self.elements
                .iter()
                .map(|&(_, v)| v * v)
                .sum::<f64>()
                .sqrt()
        })
    }

    /// Dot product via a two-pointer merge over the sorted indices.
    pub fn dot(&self, other: &Vector) -> f64 {
        let mut product = 0.0;
        let (a, b) = (&self.elements, &other.elements);
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    product += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }

        product
    }

    /// Cosine similarity against `other`, using this vector's
    /// magnitude; 0 for an empty vector.
    pub fn similarity(&self, other: &Vector) -> f64 {
        let magnitude = self.magnitude();
        if magnitude == 0.0 {
            return 0.0;
        }
        self.dot(other) / magnitude
    }
}

impl Serialize for Vector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.elements.len() * 2))?;
        for &(index, value) in &self.elements {
            seq.serialize_element(&index)?;
            seq.serialize_element(&value)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Vector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FlatVisitor;

        impl<'de> Visitor<'de> for FlatVisitor {
            type Value = Vector;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a flat [index, value, ...] array")
            }

            fn visit_seq<A: SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> std::result::Result<Vector, A::Error> {
                let mut elements = Vec::new();
                while let Some(index) = seq.next_element::<u32>()? {
                    let value = seq.next_element::<f64>()?.ok_or_else(|| {
                        serde::de::Error::custom("odd number of elements in vector")
                    })?;
                    elements.push((index, value));
                }
                Ok(Vector::from_pairs(elements))
            }
        }

        deserializer.deserialize_seq(FlatVisitor)
    }
}
