/*!
# Index Arrays

Every encoding in this crate is made of [`IdArray`]s: immutable, reference-counted buffers of
`u32` values holding vertex ids, row offsets or edge ids.

Cloning an [`IdArray`] never copies the elements, it only adds another owner of the same storage.
This is what makes format sharing between aliased and reversed handles cheap, and it is observable
through [`IdArray::same_buffer`].

Each array carries a [`DeviceContext`] tag. The tag is forwarded by every conversion but never
interpreted here; placing the storage on a device is the business of the tensor layer.
*/

use std::{fmt::Debug, ops::Deref, sync::Arc};

use crate::Node;

/// Execution context an array is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceContext {
    /// Host memory
    #[default]
    Cpu,
    /// Memory of an accelerator with the given device id
    Accelerator { device_id: u32 },
}

/// Immutable shared buffer of `u32` indices tagged with a [`DeviceContext`].
///
/// # Examples
/// ```
/// use relgraph::array::IdArray;
///
/// let a = IdArray::from(vec![0u32, 2, 3]);
/// let b = a.clone();
///
/// assert!(a.same_buffer(&b));
/// assert_eq!(&b[..], &[0, 2, 3]);
/// ```
#[derive(Clone)]
pub struct IdArray {
    buffer: Arc<[Node]>,
    ctx: DeviceContext,
}

impl IdArray {
    /// Creates a new array living in `ctx`
    pub fn with_context(values: Vec<Node>, ctx: DeviceContext) -> Self {
        Self {
            buffer: values.into(),
            ctx,
        }
    }

    /// Creates an empty array living in `ctx`
    pub fn empty(ctx: DeviceContext) -> Self {
        Self::with_context(Vec::new(), ctx)
    }

    /// Returns the context tag of the array
    pub fn context(&self) -> DeviceContext {
        self.ctx
    }

    /// Returns the same storage tagged with another context.
    /// No data is copied.
    pub fn retagged(&self, ctx: DeviceContext) -> Self {
        Self {
            buffer: self.buffer.clone(),
            ctx,
        }
    }

    /// Returns *true* if both arrays are backed by the very same storage
    ///
    /// # Examples
    /// ```
    /// use relgraph::array::IdArray;
    ///
    /// let a = IdArray::from(vec![1u32, 2]);
    /// let b = IdArray::from(vec![1u32, 2]);
    ///
    /// assert_eq!(a, b);
    /// assert!(!a.same_buffer(&b));
    /// assert!(a.same_buffer(&a.clone()));
    /// ```
    pub fn same_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    /// Returns the number of owners of the underlying storage
    pub fn owners(&self) -> usize {
        Arc::strong_count(&self.buffer)
    }

    /// Returns the elements as a slice
    pub fn as_slice(&self) -> &[Node] {
        &self.buffer
    }

    /// Returns *true* if the elements are non-decreasing
    pub fn is_non_decreasing(&self) -> bool {
        self.buffer.is_sorted()
    }

    /// Returns the position and value of the first element `>= bound`, if any
    pub(crate) fn first_out_of_bounds(&self, bound: u64) -> Option<(usize, Node)> {
        self.buffer
            .iter()
            .enumerate()
            .find(|(_, x)| **x as u64 >= bound)
            .map(|(i, x)| (i, *x))
    }
}

impl Deref for IdArray {
    type Target = [Node];

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl From<Vec<Node>> for IdArray {
    fn from(values: Vec<Node>) -> Self {
        Self::with_context(values, DeviceContext::Cpu)
    }
}

impl From<&[Node]> for IdArray {
    fn from(values: &[Node]) -> Self {
        Self::from(values.to_vec())
    }
}

impl<const N: usize> From<[Node; N]> for IdArray {
    fn from(values: [Node; N]) -> Self {
        Self::from(values.to_vec())
    }
}

impl FromIterator<Node> for IdArray {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Arrays compare by value and context, not by storage identity
impl PartialEq for IdArray {
    fn eq(&self, other: &Self) -> bool {
        self.ctx == other.ctx && self.buffer == other.buffer
    }
}

impl Eq for IdArray {}

impl Debug for IdArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ctx {
            DeviceContext::Cpu => write!(f, "{:?}", &self.buffer[..]),
            ctx => write!(f, "{:?}@{:?}", &self.buffer[..], ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_storage() {
        let a = IdArray::from(vec![3, 1, 2]);
        assert_eq!(a.owners(), 1);

        let b = a.clone();
        assert!(a.same_buffer(&b));
        assert_eq!(a.owners(), 2);

        drop(b);
        assert_eq!(a.owners(), 1);
    }

    #[test]
    fn retagging_keeps_storage() {
        let a = IdArray::from(vec![0, 1]);
        let gpu = a.retagged(DeviceContext::Accelerator { device_id: 1 });

        assert!(a.same_buffer(&gpu));
        assert_ne!(a, gpu);
        assert_eq!(gpu.context(), DeviceContext::Accelerator { device_id: 1 });
    }

    #[test]
    fn out_of_bounds_search() {
        let a = IdArray::from(vec![0, 4, 1, 7]);
        assert_eq!(a.first_out_of_bounds(8), None);
        assert_eq!(a.first_out_of_bounds(4), Some((1, 4)));
        assert!(!a.is_non_decreasing());
        assert!(IdArray::from(vec![0, 0, 2]).is_non_decreasing());
    }
}
