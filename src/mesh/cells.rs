/// Read a grid value with the row index flipped
///
/// Grid `y` grows northwards while arrays are stored with row 0 at the
/// north edge, so the row read is `count - 1 - y`. Requests past the grid
/// (or past the end of `values`) are absent rather than zero.
pub fn lookup<T: Copy>(values: &[T], count: usize, x: usize, y: usize) -> Option<T> {
    if x >= count || y >= count {
        return None;
    }
    let row = count - 1 - y;
    values.get(row * count + x).copied()
}

/// Which corners of a 2x2 cell take part in its block
///
/// Corners are numbered 1 = (x, y), 2 = (x+1, y), 3 = (x, y+1),
/// 4 = (x+1, y+1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCase {
    /// All four corners: a quadrilateral prism
    Full,
    /// Corners 1, 2, 3
    MissingCorner4,
    /// Corners 1, 2, 4
    MissingCorner3,
    /// Corners 2, 3, 4
    MissingCorner1,
    /// Corners 1, 3, 4
    MissingCorner2,
}

impl CellCase {
    /// Indices (0-based) of the corners used by this case
    pub fn corners(&self) -> &'static [usize] {
        match self {
            CellCase::Full => &[0, 1, 2, 3],
            CellCase::MissingCorner4 => &[0, 1, 2],
            CellCase::MissingCorner3 => &[0, 1, 3],
            CellCase::MissingCorner1 => &[1, 2, 3],
            CellCase::MissingCorner2 => &[0, 2, 3],
        }
    }
}

/// Classify a cell from its four corner elevations
///
/// A corner counts only when it is inside the mask with a non-negative
/// elevation (`Some`). Cells with two or fewer usable corners produce no
/// block.
pub fn classify(corners: &[Option<f64>; 4]) -> Option<CellCase> {
    match corners.map(|c| c.is_some()) {
        [true, true, true, true] => Some(CellCase::Full),
        [true, true, true, false] => Some(CellCase::MissingCorner4),
        [true, true, false, true] => Some(CellCase::MissingCorner3),
        [false, true, true, true] => Some(CellCase::MissingCorner1),
        [true, false, true, true] => Some(CellCase::MissingCorner2),
        _ => None,
    }
}

/// Mask and elevation arrays read through the same flipped indexing
#[derive(Debug, Clone, Copy)]
pub struct CellGrid<'a> {
    count: usize,
    mask: &'a [u8],
    elevation: &'a [f64],
}

impl<'a> CellGrid<'a> {
    pub fn new(count: usize, mask: &'a [u8], elevation: &'a [f64]) -> Self {
        Self {
            count,
            mask,
            elevation,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Elevation of a grid point if it is inside the mask and at or above
    /// zero; NaN samples never qualify
    pub fn usable(&self, x: usize, y: usize) -> Option<f64> {
        let inside = lookup(self.mask, self.count, x, y)? == 1;
        let elevation = lookup(self.elevation, self.count, x, y)?;
        (inside && elevation >= 0.0).then_some(elevation)
    }

    /// Usable elevations at the four corners of the cell whose lower-left
    /// grid point is (x, y)
    pub fn corners(&self, x: usize, y: usize) -> [Option<f64>; 4] {
        [
            self.usable(x, y),
            self.usable(x + 1, y),
            self.usable(x, y + 1),
            self.usable(x + 1, y + 1),
        ]
    }
}
