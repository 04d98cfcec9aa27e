//! Launch geometry: how many elements a kernel covers and how they are
//! chunked into blocks.

use crate::error::DeviceError;
use std::ops::Range;

/// Default block size for element-wise launches.
pub const DEFAULT_BLOCK: usize = 256;

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A one-dimensional launch shape.
///
/// A grid covers `elements` indices split into fixed-size blocks; the last
/// block may be partial. Each block becomes one job on the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    elements: usize,
    block: usize,
}

impl Grid {
    /// Grid covering `elements` indices with the default block size.
    pub fn for_elements(elements: usize) -> Self {
        Self {
            elements,
            block: DEFAULT_BLOCK,
        }
    }

    /// Grid with an explicit block size.
    ///
    /// Fails with [`DeviceError::ZeroBlockSize`] when `block` is zero.
    pub fn with_block_size(elements: usize, block: usize) -> Result<Self, DeviceError> {
        if block == 0 {
            return Err(DeviceError::ZeroBlockSize);
        }
        Ok(Self { elements, block })
    }

    /// Total number of elements covered.
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Block size.
    pub fn block_size(&self) -> usize {
        self.block
    }

    /// Number of blocks, rounding up so every element is covered.
    pub fn block_count(&self) -> usize {
        self.elements.div_ceil(self.block)
    }

    /// Iterate over the index range of each block in order.
    pub fn blocks(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let elements = self.elements;
        let block = self.block;
        (0..self.block_count()).map(move |b| {
            let start = b * block;
            let end = (start + block).min(elements);
            start..end
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_default_block() {
        let g = Grid::for_elements(1000);
        assert_eq!(g.elements(), 1000);
        assert_eq!(g.block_size(), DEFAULT_BLOCK);
        assert_eq!(g.block_count(), 4);
    }

    #[test]
    fn grid_exact_multiple() {
        let g = Grid::with_block_size(512, 256).unwrap();
        assert_eq!(g.block_count(), 2);
        let blocks: Vec<_> = g.blocks().collect();
        assert_eq!(blocks, vec![0..256, 256..512]);
    }

    #[test]
    fn grid_partial_last_block() {
        let g = Grid::with_block_size(10, 4).unwrap();
        assert_eq!(g.block_count(), 3);
        let blocks: Vec<_> = g.blocks().collect();
        assert_eq!(blocks, vec![0..4, 4..8, 8..10]);
    }

    #[test]
    fn grid_single_partial_block() {
        let g = Grid::for_elements(100);
        assert_eq!(g.block_count(), 1);
        assert_eq!(g.blocks().next(), Some(0..100));
    }

    #[test]
    fn grid_empty() {
        let g = Grid::for_elements(0);
        assert_eq!(g.block_count(), 0);
        assert_eq!(g.blocks().count(), 0);
    }

    #[test]
    fn grid_zero_block_rejected() {
        assert!(matches!(
            Grid::with_block_size(16, 0),
            Err(DeviceError::ZeroBlockSize)
        ));
    }

    #[test]
    fn grid_blocks_cover_all_elements() {
        let g = Grid::with_block_size(1021, 64).unwrap();
        let covered: usize = g.blocks().map(|r| r.len()).sum();
        assert_eq!(covered, 1021);
        // Contiguous and in order.
        let mut expect = 0;
        for r in g.blocks() {
            assert_eq!(r.start, expect);
            expect = r.end;
        }
        assert_eq!(expect, 1021);
    }
}
