/// Per-column count of rows still claimed by row-spanning cells placed on an
/// earlier row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanOccupancy {
    remaining: Vec<usize>,
}

impl SpanOccupancy {
    pub fn new(columns: usize) -> SpanOccupancy {
        SpanOccupancy {
            remaining: vec![0; columns],
        }
    }

    pub fn columns(&self) -> usize {
        self.remaining.len()
    }

    /// Rows still reserved in `column` after the current one
    pub fn remaining(&self, column: usize) -> usize {
        self.remaining.get(column).copied().unwrap_or_default()
    }

    /// Move on to the next row, returning which of its columns are taken by
    /// spans from above
    pub fn begin_row(&mut self) -> Vec<bool> {
        self.remaining
            .iter_mut()
            .map(|rows| {
                let reserved = *rows > 0;
                *rows = rows.saturating_sub(1);
                reserved
            })
            .collect()
    }

    /// Claim `rows` rows below the current one for `colspan` columns starting at
    /// `column`
    pub fn reserve(&mut self, column: usize, colspan: usize, rows: usize) {
        for remaining in self.remaining.iter_mut().skip(column).take(colspan) {
            *remaining = rows;
        }
    }

    /// Whether no span reaches past the current row
    pub fn is_clear(&self) -> bool {
        self.remaining.iter().all(|rows| *rows == 0)
    }

    /// The first column whose span still needs more rows, and how many
    pub fn dangling(&self) -> Option<(usize, usize)> {
        self.remaining
            .iter()
            .enumerate()
            .find(|(_, rows)| **rows > 0)
            .map(|(column, rows)| (column, *rows))
    }

    pub fn clear(&mut self) {
        self.remaining.iter_mut().for_each(|rows| *rows = 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_reserve_the_rows_below() {
        let mut occupancy = SpanOccupancy::new(5);
        assert_eq!(occupancy.begin_row(), vec![false; 5]);
        occupancy.reserve(2, 2, 2);
        assert_eq!(occupancy.dangling(), Some((2, 2)));

        assert_eq!(occupancy.begin_row(), vec![false, false, true, true, false]);
        assert!(!occupancy.is_clear());
        assert_eq!(occupancy.begin_row(), vec![false, false, true, true, false]);
        assert!(occupancy.is_clear());
        assert_eq!(occupancy.begin_row(), vec![false; 5]);
    }

    #[test]
    fn clearing_drops_every_claim() {
        let mut occupancy = SpanOccupancy::new(3);
        occupancy.reserve(0, 3, 4);
        assert_eq!(occupancy.remaining(1), 4);
        occupancy.clear();
        assert!(occupancy.is_clear());
        assert_eq!(occupancy.dangling(), None);
    }
}
