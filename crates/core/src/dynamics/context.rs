use std::sync::Arc;

use nalgebra::DVector;

use crate::{CoordinateBroker, CoordinateSubset};

use super::{Dynamics, Error};

/// A contiguous run of coordinates in the full state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    offset: usize,
    len: usize,
}

/// One dynamics bound to a state layout.
///
/// The read and write offsets are resolved once, so each derivative
/// evaluation only copies slices.
#[derive(Debug, Clone)]
pub struct Context {
    dynamics: Arc<dyn Dynamics>,
    read: Vec<Span>,
    write: Vec<Span>,
    read_width: usize,
    write_width: usize,
}

impl Context {
    /// Resolves the footprint of `dynamics` against `broker`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingReadSubset`] or [`Error::MissingWriteSubset`]
    /// if the dynamics touches a subset the broker does not lay out.
    pub fn new(dynamics: Arc<dyn Dynamics>, broker: &CoordinateBroker) -> Result<Self, Error> {
        let read = resolve(&dynamics.read_subsets(), broker).map_err(|subset| {
            Error::MissingReadSubset {
                dynamics: dynamics.name().to_owned(),
                subset,
            }
        })?;
        let write = resolve(&dynamics.write_subsets(), broker).map_err(|subset| {
            Error::MissingWriteSubset {
                dynamics: dynamics.name().to_owned(),
                subset,
            }
        })?;

        let read_width = read.iter().map(|span| span.len).sum();
        let write_width = write.iter().map(|span| span.len).sum();

        Ok(Self {
            dynamics,
            read,
            write,
            read_width,
            write_width,
        })
    }

    #[must_use]
    pub fn dynamics(&self) -> &Arc<dyn Dynamics> {
        &self.dynamics
    }

    /// Width of the packed read vector.
    #[must_use]
    pub fn read_width(&self) -> usize {
        self.read_width
    }

    /// Width of the contribution the dynamics must return.
    #[must_use]
    pub fn write_width(&self) -> usize {
        self.write_width
    }

    /// Packs the read coordinates out of the full vector.
    pub(super) fn gather(&self, full: &DVector<f64>) -> DVector<f64> {
        let mut packed = Vec::with_capacity(self.read_width);
        for span in &self.read {
            packed.extend_from_slice(&full.as_slice()[span.offset..span.offset + span.len]);
        }
        DVector::from_vec(packed)
    }

    /// Adds a packed contribution into the full derivative vector.
    pub(super) fn scatter_add(&self, contribution: &DVector<f64>, derivative: &mut DVector<f64>) {
        let mut cursor = 0;
        for span in &self.write {
            let source = &contribution.as_slice()[cursor..cursor + span.len];
            let target = &mut derivative.as_mut_slice()[span.offset..span.offset + span.len];
            for (out, value) in target.iter_mut().zip(source) {
                *out += value;
            }
            cursor += span.len;
        }
    }
}

/// Maps subsets to spans, or names the first subset the broker lacks.
fn resolve(
    subsets: &[Arc<CoordinateSubset>],
    broker: &CoordinateBroker,
) -> Result<Vec<Span>, String> {
    subsets
        .iter()
        .map(|subset| {
            broker
                .offset_of(subset)
                .map(|offset| Span {
                    offset,
                    len: subset.size(),
                })
                .map_err(|_| subset.name().to_owned())
        })
        .collect()
}
