//! Memory layout of a ghosted brick field.

use serde::{Deserialize, Serialize};

use super::error::ExchangeError;

/// A brick of `extent` points padded by `ghost` layers on every side,
/// holding `components` values per point.
///
/// Storage is component-major, then k, then j, with i fastest. Coordinates
/// run over `−ghost .. extent + ghost` on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldLayout {
    pub extent: [usize; 3],
    pub ghost: usize,
    pub components: usize,
}

impl FieldLayout {
    pub fn new(extent: [usize; 3], ghost: usize, components: usize) -> Result<Self, ExchangeError> {
        if extent.iter().any(|&n| n == 0) {
            return Err(ExchangeError::InvalidLayout(format!(
                "extent must be positive on every axis, got {extent:?}"
            )));
        }
        if ghost == 0 || components == 0 {
            return Err(ExchangeError::InvalidLayout(format!(
                "ghost width {ghost} and component count {components} must be positive"
            )));
        }
        Ok(Self {
            extent,
            ghost,
            components,
        })
    }

    /// Allocated points per axis, ghosts included.
    pub fn padded(&self) -> [usize; 3] {
        self.extent.map(|n| n + 2 * self.ghost)
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.padded().iter().product::<usize>() * self.components
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Linear index of component `c` at `(i, j, k)`.
    #[inline]
    pub fn index(&self, c: usize, i: isize, j: isize, k: isize) -> usize {
        let g = self.ghost as isize;
        let [p0, p1, p2] = self.padded();
        debug_assert!(c < self.components);
        debug_assert!((-g..(p0 as isize - g)).contains(&i));
        debug_assert!((-g..(p1 as isize - g)).contains(&j));
        debug_assert!((-g..(p2 as isize - g)).contains(&k));
        let (i, j, k) = ((i + g) as usize, (j + g) as usize, (k + g) as usize);
        i + p0 * (j + p1 * (k + p2 * c))
    }
}
