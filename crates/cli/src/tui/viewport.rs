//! Grid geometry: which cells are on screen and where.
//!
//! The grid area has one line of column letters, then one line per row. Each
//! row starts with a right-aligned row-number gutter and a space; each cell
//! is `col_width` columns followed by a one-column separator.

use livegrid_client::CellCoord;
use ratatui::layout::Rect;

const MIN_COL_WIDTH: u16 = 3;
const MAX_COL_WIDTH: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub rows: u32,
    pub cols: u32,
    pub col_width: u16,
    pub scroll_row: u32,
    pub scroll_col: u32,
}

impl Viewport {
    pub fn new(rows: u32, cols: u32, col_width: u16) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            col_width: col_width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH),
            scroll_row: 0,
            scroll_col: 0,
        }
    }

    /// Width of the row-number gutter, excluding the trailing space.
    pub fn gutter_width(&self) -> u16 {
        let digits = self.rows.to_string().len() as u16;
        digits.max(3)
    }

    fn cell_stride(&self) -> u16 {
        self.col_width + 1
    }

    /// Number of columns that fit, starting at `scroll_col`.
    pub fn visible_cols(&self, area: Rect) -> u32 {
        let available = area.width.saturating_sub(self.gutter_width() + 1);
        let fit = (available / self.cell_stride()) as u32;
        fit.max(1).min(self.cols - self.scroll_col.min(self.cols))
    }

    /// Number of rows that fit, starting at `scroll_row`.
    pub fn visible_rows(&self, area: Rect) -> u32 {
        let fit = area.height.saturating_sub(1) as u32;
        fit.min(self.rows - self.scroll_row.min(self.rows))
    }

    /// Clamp a coordinate to the grid.
    pub fn clamp(&self, coord: CellCoord) -> CellCoord {
        CellCoord::new(coord.x.min(self.cols - 1), coord.y.min(self.rows - 1))
    }

    /// Scroll so that `cursor` is on screen.
    pub fn ensure_visible(&mut self, cursor: CellCoord, area: Rect) {
        if cursor.y < self.scroll_row {
            self.scroll_row = cursor.y;
        }
        let rows = (area.height.saturating_sub(1) as u32).max(1);
        if cursor.y >= self.scroll_row + rows {
            self.scroll_row = cursor.y + 1 - rows;
        }

        if cursor.x < self.scroll_col {
            self.scroll_col = cursor.x;
        }
        let available = area.width.saturating_sub(self.gutter_width() + 1);
        let cols = ((available / self.cell_stride()) as u32).max(1);
        if cursor.x >= self.scroll_col + cols {
            self.scroll_col = cursor.x + 1 - cols;
        }
    }

    /// Screen x of the first column of grid column `x`.
    pub fn cell_x(&self, area: Rect, x: u32) -> u16 {
        area.x + self.gutter_width() + 1 + (x - self.scroll_col) as u16 * self.cell_stride()
    }

    /// The cell under a terminal position, if any.
    pub fn hit_test(&self, area: Rect, column: u16, row: u16) -> Option<CellCoord> {
        if row <= area.y || row >= area.y + area.height || column >= area.x + area.width {
            return None;
        }
        let left = area.x + self.gutter_width() + 1;
        if column < left {
            return None;
        }
        let offset = column - left;
        if offset % self.cell_stride() == self.col_width {
            // separator
            return None;
        }

        let x = self.scroll_col + (offset / self.cell_stride()) as u32;
        let y = self.scroll_row + (row - area.y - 1) as u32;
        if x >= self.scroll_col + self.visible_cols(area) || y >= self.rows {
            return None;
        }
        Some(CellCoord::new(x, y))
    }
}
