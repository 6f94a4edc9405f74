//! Z-value sort key for spatial query results.

use std::cmp::Ordering;

/// A borrowed figure paired with the Z-value it had when a range query ran.
///
/// Ordering looks only at the Z-value, so two entries with the same Z compare equal and a
/// stable sort keeps them in the order they were collected.
#[derive(Debug, Clone, Copy)]
pub struct OrderedFigure<'a, F> {
    figure: &'a F,
    z: i64,
}

impl<'a, F> OrderedFigure<'a, F> {
    pub fn new(figure: &'a F, z: i64) -> Self {
        Self { figure, z }
    }

    pub fn figure(&self) -> &'a F {
        self.figure
    }

    pub fn z(&self) -> i64 {
        self.z
    }

    pub fn into_figure(self) -> &'a F {
        self.figure
    }
}

impl<F> PartialEq for OrderedFigure<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.z == other.z
    }
}

impl<F> Eq for OrderedFigure<'_, F> {}

impl<F> PartialOrd for OrderedFigure<'_, F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F> Ord for OrderedFigure<'_, F> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.z.cmp(&other.z)
    }
}
