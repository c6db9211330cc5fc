use std::fmt;
use std::slice;
use std::vec;

use crate::Error;

/// A collection of errors from a batch operation that attempts every item even when some fail.
///
/// Returned by [`BlockPool::close()`][crate::BlockPool::close] when the operating system failed
/// to release one or more blocks. The errors are kept in the order they occurred and the
/// [`Display`][fmt::Display] form joins their messages with newlines.
///
/// # Examples
///
/// ```
/// use block_pool::BlockPool;
///
/// let mut pool = BlockPool::new(4)?;
///
/// if let Err(errors) = pool.close() {
///     for error in &errors {
///         eprintln!("failed to release block: {error}");
///     }
/// }
/// # Ok::<(), block_pool::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<Error>,
}

impl MultiError {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the error of a failed operation. Successful results are ignored.
    pub(crate) fn add(&mut self, result: Result<(), Error>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    /// Converts the collection into a result that is only an error if anything was recorded.
    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// The number of errors in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether the collection contains no errors. A `MultiError` returned from a failed
    /// operation is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the collected errors in the order they occurred.
    pub fn iter(&self) -> slice::Iter<'_, Error> {
        self.errors.iter()
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }

            write!(f, "{error}")?;
        }

        Ok(())
    }
}

impl std::error::Error for MultiError {}

impl<'a> IntoIterator for &'a MultiError {
    type Item = &'a Error;
    type IntoIter = slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MultiError {
    type Item = Error;
    type IntoIter = vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
