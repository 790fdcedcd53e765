//! Layout: shape, strides, and offset describing a container's region

use smallvec::SmallVec;
use std::fmt;

/// Stack allocation threshold for dimensions
const STACK_DIMS: usize = 4;

/// Shape type: dimensions of a container
pub type Shape = SmallVec<[usize; STACK_DIMS]>;

/// Strides type: element offsets between consecutive elements along each dimension
///
/// Strides are in ELEMENTS, not bytes.
pub type Strides = SmallVec<[usize; STACK_DIMS]>;

/// Layout describes which elements of a [`Storage`](super::Storage) a
/// container sees
///
/// Address of element at indices [i0, i1, ..., in]:
///   offset + i0 * strides[0] + i1 * strides[1] + ... + in * strides[n]
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Shape,
    strides: Strides,
    offset: usize,
}

impl Layout {
    /// Create a new contiguous (row-major) layout from a shape
    ///
    /// # Example
    /// ```
    /// use densela::tensor::Layout;
    /// let layout = Layout::contiguous(&[2, 3, 4]);
    /// assert_eq!(layout.shape(), &[2, 3, 4]);
    /// assert_eq!(layout.strides(), &[12, 4, 1]);
    /// ```
    pub fn contiguous(shape: &[usize]) -> Self {
        let shape: Shape = shape.iter().copied().collect();
        let strides = Self::compute_contiguous_strides(&shape);
        Self {
            shape,
            strides,
            offset: 0,
        }
    }

    /// Create a layout with explicit shape, strides, and offset
    pub fn new(shape: Shape, strides: Strides, offset: usize) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        Self {
            shape,
            strides,
            offset,
        }
    }

    /// A 1-D layout of `len` elements spaced `stride` apart from `offset`
    pub fn strided_1d(len: usize, stride: usize, offset: usize) -> Self {
        Self {
            shape: smallvec::smallvec![len],
            strides: smallvec::smallvec![stride],
            offset,
        }
    }

    fn compute_contiguous_strides(shape: &[usize]) -> Strides {
        let mut strides: Strides = SmallVec::with_capacity(shape.len());
        let mut stride = 1usize;

        for &dim in shape.iter().rev() {
            strides.push(stride);
            stride *= dim;
        }

        strides.reverse();
        strides
    }

    /// Get the shape
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the strides
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get the offset
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of dimensions (rank)
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements
    #[inline]
    pub fn elem_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check if the elements form one row-major run starting at `offset`
    ///
    /// Dimensions of size 1 are ignored since their stride is never used.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1usize;
        for (&dim, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if dim != 1 && stride != expected {
                return false;
            }
            expected *= dim;
        }
        true
    }

    /// Compute the storage offset for given indices, or None when out of bounds
    pub fn index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.ndim() {
            return None;
        }

        let mut linear = self.offset;
        for ((&idx, &dim), &stride) in indices
            .iter()
            .zip(self.shape.iter())
            .zip(self.strides.iter())
        {
            if idx >= dim {
                return None;
            }
            linear += idx * stride;
        }

        Some(linear)
    }

    /// Layout of the `i`-th sub-array along axis 0 (drops the leading dimension)
    pub fn select_first(&self, i: usize) -> Option<Self> {
        if self.ndim() == 0 || i >= self.shape[0] {
            return None;
        }
        Some(Self {
            shape: self.shape[1..].iter().copied().collect(),
            strides: self.strides[1..].iter().copied().collect(),
            offset: self.offset + i * self.strides[0],
        })
    }

    /// Create a reshaped layout over the same elements (requires contiguity)
    pub fn reshape(&self, new_shape: &[usize]) -> Option<Self> {
        if !self.is_contiguous() {
            return None;
        }
        let new_count: usize = new_shape.iter().product();
        if new_count != self.elem_count() {
            return None;
        }
        let mut layout = Self::contiguous(new_shape);
        layout.offset = self.offset;
        Some(layout)
    }

    /// Storage offsets of every element in row-major logical order
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        let total = self.elem_count();
        let ndim = self.ndim();
        let mut indices: Shape = smallvec::smallvec![0; ndim];
        let mut current = self.offset;
        (0..total).map(move |n| {
            if n > 0 {
                for d in (0..ndim).rev() {
                    indices[d] += 1;
                    current += self.strides[d];
                    if indices[d] < self.shape[d] {
                        break;
                    }
                    current -= indices[d] * self.strides[d];
                    indices[d] = 0;
                }
            }
            current
        })
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("shape", &self.shape.as_slice())
            .field("strides", &self.strides.as_slice())
            .field("offset", &self.offset)
            .finish()
    }
}
