use std::sync::Arc;

use nalgebra::DVector;

use super::{CoordinateSubset, Error};

/// Maps an ordered set of distinct subsets onto one flat vector.
///
/// Subsets are laid out contiguously in registration order, so offsets are
/// strictly increasing and the vector width is the sum of the subset sizes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateBroker {
    subsets: Vec<Arc<CoordinateSubset>>,
    offsets: Vec<usize>,
    width: usize,
}

impl CoordinateBroker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a broker from subsets, registered in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSubset`] if a subset appears more than once.
    pub fn from_subsets<I>(subsets: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Arc<CoordinateSubset>>,
    {
        let mut broker = Self::new();
        for subset in subsets {
            broker.add_subset(subset)?;
        }
        Ok(broker)
    }

    /// Registers a subset and returns its offset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateSubset`] if the subset is already registered.
    pub fn add_subset(&mut self, subset: Arc<CoordinateSubset>) -> Result<usize, Error> {
        if self.has_subset(&subset) {
            return Err(Error::DuplicateSubset {
                name: subset.name().to_owned(),
            });
        }

        let offset = self.width;
        self.width += subset.size();
        self.offsets.push(offset);
        self.subsets.push(subset);
        Ok(offset)
    }

    #[must_use]
    pub fn has_subset(&self, subset: &CoordinateSubset) -> bool {
        self.subsets.iter().any(|registered| **registered == *subset)
    }

    /// Returns the offset of `subset` in the flat vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSubset`] if the subset is not registered.
    pub fn offset_of(&self, subset: &CoordinateSubset) -> Result<usize, Error> {
        self.subsets
            .iter()
            .position(|registered| **registered == *subset)
            .map(|index| self.offsets[index])
            .ok_or_else(|| Error::MissingSubset {
                name: subset.name().to_owned(),
            })
    }

    /// Copies the coordinates of `subset` out of `full`.
    ///
    /// # Errors
    ///
    /// Returns an error if `full` does not match the broker width or the
    /// subset is not registered.
    pub fn extract_coordinates(
        &self,
        full: &DVector<f64>,
        subset: &CoordinateSubset,
    ) -> Result<DVector<f64>, Error> {
        self.check_width(full)?;
        let offset = self.offset_of(subset)?;
        Ok(DVector::from_column_slice(
            &full.as_slice()[offset..offset + subset.size()],
        ))
    }

    /// Concatenates the coordinates of several subsets, in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if `full` does not match the broker width or any
    /// subset is not registered.
    pub fn extract_coordinates_many(
        &self,
        full: &DVector<f64>,
        subsets: &[Arc<CoordinateSubset>],
    ) -> Result<DVector<f64>, Error> {
        self.check_width(full)?;
        let mut packed = Vec::with_capacity(subsets.iter().map(|s| s.size()).sum());
        for subset in subsets {
            let offset = self.offset_of(subset)?;
            packed.extend_from_slice(&full.as_slice()[offset..offset + subset.size()]);
        }
        Ok(DVector::from_vec(packed))
    }

    /// Registered subsets, in layout order.
    #[must_use]
    pub fn subsets(&self) -> &[Arc<CoordinateSubset>] {
        &self.subsets
    }

    /// Total width of the flat vector.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of registered subsets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subsets.is_empty()
    }

    fn check_width(&self, full: &DVector<f64>) -> Result<(), Error> {
        if full.len() == self.width {
            Ok(())
        } else {
            Err(Error::WidthMismatch {
                expected: self.width,
                found: full.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subset(name: &str, size: usize) -> Arc<CoordinateSubset> {
        Arc::new(CoordinateSubset::new(name, size).expect("valid subset"))
    }

    #[test]
    fn width_is_sum_of_sizes_and_offsets_increase() {
        let mut broker = CoordinateBroker::new();
        let sizes = [3, 3, 1, 4, 2];

        let mut offsets = Vec::new();
        for (index, size) in sizes.iter().enumerate() {
            let offset = broker
                .add_subset(subset(&format!("S{index}"), *size))
                .expect("distinct");
            offsets.push(offset);
        }

        assert_eq!(broker.width(), sizes.iter().sum::<usize>());
        assert_eq!(broker.len(), sizes.len());
        assert_eq!(offsets, vec![0, 3, 6, 7, 11]);
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut broker = CoordinateBroker::new();
        broker.add_subset(CoordinateSubset::mass()).expect("first");

        let result = broker.add_subset(CoordinateSubset::mass());
        assert!(matches!(result, Err(Error::DuplicateSubset { .. })));
        assert_eq!(broker.width(), 1);
    }

    #[test]
    fn extraction_then_reinsertion_is_identity() {
        let broker = CoordinateBroker::from_subsets([
            subset("A", 2),
            subset("B", 3),
            subset("C", 1),
        ])
        .expect("distinct");
        let full = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let mut rebuilt = DVector::zeros(broker.width());
        for registered in broker.subsets() {
            let offset = broker.offset_of(registered).expect("registered");
            let slice = broker
                .extract_coordinates(&full, registered)
                .expect("registered");
            rebuilt
                .rows_mut(offset, registered.size())
                .copy_from(&slice);
        }

        assert_eq!(rebuilt, full);
    }

    #[test]
    fn extract_many_packs_in_requested_order() {
        let a = subset("A", 2);
        let b = subset("B", 1);
        let broker = CoordinateBroker::from_subsets([a.clone(), b.clone()]).expect("distinct");
        let full = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let packed = broker
            .extract_coordinates_many(&full, &[b, a])
            .expect("registered");

        assert_eq!(packed.as_slice(), &[3.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_subset_and_wrong_width_fail() {
        let broker = CoordinateBroker::from_subsets([subset("A", 2)]).expect("single");

        let missing = broker.extract_coordinates(&DVector::zeros(2), &subset("B", 1));
        assert!(matches!(missing, Err(Error::MissingSubset { .. })));

        let narrow = broker.extract_coordinates(&DVector::zeros(1), &subset("A", 2));
        assert!(matches!(
            narrow,
            Err(Error::WidthMismatch {
                expected: 2,
                found: 1
            })
        ));
    }
}
