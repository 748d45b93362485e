//! Cell identity and records.
//!
//! A cell is identified by its grid coordinate alone. `x` is the column and
//! `y` is the row, both 0-based.

/// Grid coordinate of a cell.
///
/// Ordering is row-major on `x` then `y`, which is the canonical iteration
/// order of the cell store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    /// Column index (0-based)
    pub x: u32,
    /// Row index (0-based)
    pub y: u32,
}

impl CellCoord {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Parse an A1-style reference ("A1", "c12", "AA3").
    pub fn parse_a1(reference: &str) -> Option<Self> {
        let reference = reference.trim();
        let split = reference.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            let n = (c.to_ascii_uppercase() as u8 - b'A') as u64 + 1;
            col = col.checked_mul(26)?.checked_add(n)?;
        }
        let row: u64 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Self {
            x: u32::try_from(col - 1).ok()?,
            y: u32::try_from(row - 1).ok()?,
        })
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", col_to_letters(self.x), self.y as u64 + 1)
    }
}

/// Convert 0-based column index to letter(s): 0=A, 25=Z, 26=AA.
pub fn col_to_letters(col: u32) -> String {
    let mut result = String::new();
    let mut n = col as u64;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// One cell record held by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    /// Formula text as last set locally or confirmed by the server.
    /// `None` only for cells materialized by a server push.
    pub expression: Option<String>,
    /// Last computed display value.
    pub value: Option<String>,
    /// Last computed error message, verbatim from the server.
    pub error: Option<String>,
}

impl Cell {
    /// Text shown in the grid when the cell is not being edited.
    ///
    /// A failed cell shows its expression instead of a value.
    pub fn display_text(&self) -> &str {
        if self.error.is_some() {
            self.expression.as_deref().unwrap_or("")
        } else {
            self.value.as_deref().unwrap_or("")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_ordering_is_x_then_y() {
        let mut coords = vec![
            CellCoord::new(1, 0),
            CellCoord::new(0, 5),
            CellCoord::new(0, 1),
            CellCoord::new(1, 1),
        ];
        coords.sort();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 1),
                CellCoord::new(0, 5),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_col_to_letters() {
        assert_eq!(col_to_letters(0), "A");
        assert_eq!(col_to_letters(25), "Z");
        assert_eq!(col_to_letters(26), "AA");
        assert_eq!(col_to_letters(27), "AB");
        assert_eq!(col_to_letters(701), "ZZ");
        assert_eq!(col_to_letters(702), "AAA");
    }

    #[test]
    fn test_display() {
        assert_eq!(CellCoord::new(0, 0).to_string(), "A1");
        assert_eq!(CellCoord::new(2, 9).to_string(), "C10");
    }

    #[test]
    fn test_parse_a1() {
        assert_eq!(CellCoord::parse_a1("A1"), Some(CellCoord::new(0, 0)));
        assert_eq!(CellCoord::parse_a1("c12"), Some(CellCoord::new(2, 11)));
        assert_eq!(CellCoord::parse_a1("AA3"), Some(CellCoord::new(26, 2)));
        assert_eq!(CellCoord::parse_a1(" B2 "), Some(CellCoord::new(1, 1)));
    }

    #[test]
    fn test_parse_a1_rejects_invalid() {
        assert_eq!(CellCoord::parse_a1(""), None);
        assert_eq!(CellCoord::parse_a1("A"), None);
        assert_eq!(CellCoord::parse_a1("12"), None);
        assert_eq!(CellCoord::parse_a1("A0"), None);
        assert_eq!(CellCoord::parse_a1("A1B"), None);
        assert_eq!(CellCoord::parse_a1("1A"), None);
    }

    #[test]
    fn test_parse_roundtrips_display() {
        for coord in [CellCoord::new(0, 0), CellCoord::new(27, 99), CellCoord::new(702, 4)] {
            assert_eq!(CellCoord::parse_a1(&coord.to_string()), Some(coord));
        }
    }

    #[test]
    fn test_display_text_prefers_expression_on_error() {
        let cell = Cell {
            x: 0,
            y: 0,
            expression: Some("=1/0".into()),
            value: Some("stale".into()),
            error: Some("Division by zero".into()),
        };
        assert_eq!(cell.display_text(), "=1/0");

        let ok = Cell { error: None, value: Some("3".into()), ..cell };
        assert_eq!(ok.display_text(), "3");
    }
}
