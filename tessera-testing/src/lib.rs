//! Internal testing utilities for the tessera crates.

use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Run table-driven tests, collecting every failing case before reporting.
///
/// Define a `Debug` struct, conventionally named `Case`, holding the inputs
/// and expected outputs of one check, build a collection of cases and pass
/// the check to [`test_each`](TestCases::test_each):
///
/// ```
/// use tessera_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///     rank: usize,
///     axis: i64,
///     expected: Option<usize>,
/// }
///
/// let cases = [
///     Case { rank: 3, axis: -1, expected: Some(2) },
///     Case { rank: 3, axis: 3, expected: None },
/// ];
///
/// cases.test_each(|case| {
///     let rank = case.rank as i64;
///     let resolved = (case.axis >= -rank && case.axis < rank)
///         .then(|| case.axis.rem_euclid(rank) as usize);
///     assert_eq!(resolved, case.expected);
/// });
/// ```
///
/// A panic inside the check marks the case as failed. Once every case has
/// run, `test_each` panics with the number of failures and their debug
/// representations if any case failed.
///
/// The cases and anything captured by the check must be unwind safe. Shapes,
/// element types and error values in this workspace are plain data, so this
/// holds for the usual test tables.
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call `test` with a reference to each case, catching panics.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Variant of [`test_each`](TestCases::test_each) which passes an owned
    /// clone of each case to `test`.
    fn test_each_clone(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe;
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let test = &test;
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| std::panic::catch_unwind(move || test(case)).is_err())
            .collect();
        report_failures(&failures);
    }

    fn test_each_clone(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe,
    {
        let test = &test;
        let failures: Vec<_> = self
            .into_iter()
            .filter(|case| {
                let owned = case.clone();
                std::panic::catch_unwind(move || test(owned)).is_err()
            })
            .collect();
        report_failures(&failures);
    }
}

fn report_failures<C: Debug>(failures: &[C]) {
    assert!(
        failures.is_empty(),
        "{} test cases failed: {:?}",
        failures.len(),
        failures
    );
}

#[cfg(test)]
mod tests {
    use super::TestCases;

    #[derive(Clone, Debug)]
    struct Case {
        dims: Vec<usize>,
    }

    #[test]
    fn test_all_cases_pass() {
        let cases = [Case { dims: vec![2, 3] }, Case { dims: vec![] }];
        cases.clone().test_each(|case| {
            assert!(case.dims.iter().product::<usize>() > 0);
        });
        cases.test_each_clone(|case| {
            assert!(case.dims.len() <= 2);
        });
    }

    #[test]
    #[should_panic(expected = "1 test cases failed")]
    fn test_failure_is_reported() {
        let cases = [Case { dims: vec![0] }, Case { dims: vec![4] }];
        cases.test_each(|case| {
            assert_ne!(case.dims[0], 0);
        })
    }

    #[test]
    #[should_panic(expected = "2 test cases failed")]
    fn test_clone_failures_are_reported() {
        let cases = [Case { dims: vec![1] }, Case { dims: vec![2] }];
        cases.test_each_clone(|case| {
            panic!("rejected {:?}", case.dims);
        })
    }
}
