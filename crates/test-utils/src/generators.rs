//! Synthetic tiling tables with predictable geometry.
//!
//! Tiles are laid out row-major from a south-west origin. Each tile is
//! `cell_deg` wide and tall, then grown by `overlap_deg` on its north and
//! east edges so that neighbours overlap the way UTM tiles do.

/// Id of the tile at `(row, col)`: `R003C012`.
pub fn synthetic_tile_id(row: usize, col: usize) -> String {
    format!("R{:03}C{:03}", row, col)
}

/// Layout parameters for [`create_grid_table`].
#[derive(Debug, Clone, Copy)]
pub struct SyntheticGrid {
    pub rows: usize,
    pub cols: usize,
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub cell_deg: f64,
    pub overlap_deg: f64,
}

impl Default for SyntheticGrid {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 12,
            origin_lat: 10.0,
            origin_lon: -20.0,
            cell_deg: 1.0,
            overlap_deg: 0.1,
        }
    }
}

impl SyntheticGrid {
    /// Bounds of a tile as (min_lat, max_lat, min_lon, max_lon).
    pub fn bounds(&self, row: usize, col: usize) -> (f64, f64, f64, f64) {
        let min_lat = self.origin_lat + row as f64 * self.cell_deg;
        let min_lon = self.origin_lon + col as f64 * self.cell_deg;
        (
            min_lat,
            min_lat + self.cell_deg + self.overlap_deg,
            min_lon,
            min_lon + self.cell_deg + self.overlap_deg,
        )
    }

    /// A point covered by this tile only: the middle of the part of the
    /// tile that no neighbour overlaps.
    pub fn interior_point(&self, row: usize, col: usize) -> (f64, f64) {
        let (min_lat, _, min_lon, _) = self.bounds(row, col);
        let lo = self.overlap_deg;
        let hi = self.cell_deg;
        (min_lat + (lo + hi) / 2.0, min_lon + (lo + hi) / 2.0)
    }

    /// A point in the overlap between `(row, col)` and its eastern neighbour.
    pub fn east_overlap_point(&self, row: usize, col: usize) -> (f64, f64) {
        let (lat, _) = self.interior_point(row, col);
        let (_, _, min_lon, _) = self.bounds(row, col);
        (lat, min_lon + self.cell_deg + self.overlap_deg / 2.0)
    }

    /// Outer bounds of the whole layout as (min_lat, max_lat, min_lon, max_lon).
    pub fn coverage(&self) -> (f64, f64, f64, f64) {
        (
            self.origin_lat,
            self.origin_lat + self.rows as f64 * self.cell_deg + self.overlap_deg,
            self.origin_lon,
            self.origin_lon + self.cols as f64 * self.cell_deg + self.overlap_deg,
        )
    }
}

/// Render the layout in the tiling-system text format.
///
/// # Example
///
/// ```
/// use test_utils::{create_grid_table, SyntheticGrid};
///
/// let table = create_grid_table(&SyntheticGrid { rows: 2, cols: 3, ..Default::default() });
/// assert_eq!(table.lines().count(), 1 + 6);
/// ```
pub fn create_grid_table(grid: &SyntheticGrid) -> String {
    let mut table = String::from("TilID UZ EPSG MinLon MaxLon MinLat MaxLat\n");
    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (min_lat, max_lat, min_lon, max_lon) = grid.bounds(row, col);
            table.push_str(&format!(
                "{} 0 4326 {:.6} {:.6} {:.6} {:.6}\n",
                synthetic_tile_id(row, col),
                min_lon,
                max_lon,
                min_lat,
                max_lat
            ));
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_overlap_neighbours() {
        let grid = SyntheticGrid::default();
        let (_, _, _, max_lon) = grid.bounds(0, 0);
        let (_, _, min_lon_next, _) = grid.bounds(0, 1);
        assert!(max_lon > min_lon_next);
    }

    #[test]
    fn test_interior_point_avoids_overlap() {
        let grid = SyntheticGrid::default();
        let (lat, lon) = grid.interior_point(2, 3);
        let (min_lat, _, min_lon, _) = grid.bounds(2, 3);
        assert!(lat > min_lat + grid.overlap_deg);
        assert!(lon > min_lon + grid.overlap_deg);
        assert!(lat < min_lat + grid.cell_deg);
        assert!(lon < min_lon + grid.cell_deg);
    }
}
