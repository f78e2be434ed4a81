use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::Order;

/// Ranks two sort values.
///
/// Returning `Ordering::Greater` means that `lhs` ranks first.
/// Comparators never look at doc ids: ties are broken by the caller.
pub trait Comparator<T>: Send + Sync + std::fmt::Debug + Default {
    /// Return the order between two values.
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

/// Largest values rank first. A missing value is lower than any value, so it ranks last.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct NaturalComparator;

macro_rules! natural_comparator_for_ord {
    ($($typ:ty),*) => {
        $(
            impl Comparator<$typ> for NaturalComparator {
                #[inline(always)]
                fn compare(&self, lhs: &$typ, rhs: &$typ) -> Ordering {
                    lhs.cmp(rhs)
                }
            }
        )*
    };
}

natural_comparator_for_ord!(u32, u64, i64, String);

// Floats use the IEEE 754 total order, so that a NaN sort value can never
// break the heap invariant.
impl Comparator<f32> for NaturalComparator {
    #[inline(always)]
    fn compare(&self, lhs: &f32, rhs: &f32) -> Ordering {
        lhs.total_cmp(rhs)
    }
}

impl Comparator<f64> for NaturalComparator {
    #[inline(always)]
    fn compare(&self, lhs: &f64, rhs: &f64) -> Ordering {
        lhs.total_cmp(rhs)
    }
}

impl<T> Comparator<Option<T>> for NaturalComparator
where NaturalComparator: Comparator<T>
{
    #[inline(always)]
    fn compare(&self, lhs: &Option<T>, rhs: &Option<T>) -> Ordering {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => NaturalComparator.compare(lhs, rhs),
            _ => lhs.is_some().cmp(&rhs.is_some()),
        }
    }
}

/// Smallest values rank first.
///
/// Being the exact mirror of [`NaturalComparator`], it ranks missing values first.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize)]
pub struct ReverseComparator;

impl<T> Comparator<T> for ReverseComparator
where NaturalComparator: Comparator<T>
{
    #[inline(always)]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        NaturalComparator.compare(rhs, lhs)
    }
}

/// Smallest values rank first, but missing values still rank last.
///
/// This is what [`Order::Asc`] maps to: sorting products by increasing price lists the
/// products without a price after all of the others.
#[derive(Debug, Copy, Clone, Default)]
pub struct ReverseNoneIsLowerComparator;

impl<T> Comparator<Option<T>> for ReverseNoneIsLowerComparator
where ReverseComparator: Comparator<T>
{
    #[inline(always)]
    fn compare(&self, lhs: &Option<T>, rhs: &Option<T>) -> Ordering {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => ReverseComparator.compare(lhs, rhs),
            _ => lhs.is_some().cmp(&rhs.is_some()),
        }
    }
}

macro_rules! reverse_none_is_lower_for_scalar {
    ($($typ:ty),*) => {
        $(
            impl Comparator<$typ> for ReverseNoneIsLowerComparator {
                #[inline(always)]
                fn compare(&self, lhs: &$typ, rhs: &$typ) -> Ordering {
                    ReverseComparator.compare(lhs, rhs)
                }
            }
        )*
    };
}

reverse_none_is_lower_for_scalar!(u32, u64, i64, f32, f64, String);

/// Comparator picked at runtime, from the [`Order`] of a sort field.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum ComparatorEnum {
    /// See [`NaturalComparator`].
    #[default]
    Natural,
    /// See [`ReverseNoneIsLowerComparator`].
    ReverseNoneLower,
}

impl From<Order> for ComparatorEnum {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => ComparatorEnum::ReverseNoneLower,
            Order::Desc => ComparatorEnum::Natural,
        }
    }
}

impl<T> Comparator<T> for ComparatorEnum
where
    ReverseNoneIsLowerComparator: Comparator<T>,
    NaturalComparator: Comparator<T>,
{
    #[inline(always)]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        match self {
            ComparatorEnum::Natural => NaturalComparator.compare(lhs, rhs),
            ComparatorEnum::ReverseNoneLower => ReverseNoneIsLowerComparator.compare(lhs, rhs),
        }
    }
}
