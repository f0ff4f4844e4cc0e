/// Whether cell `(row, col)` belongs to the carpet of the given `size`.
///
/// A cell is excluded as soon as its row and column share a middle ternary
/// digit (`1`) at the same position. `size` only bounds how many digits are
/// inspected, so callers pass the side of the grid being built.
pub fn is_in_carpet(mut row: usize, mut col: usize, mut size: usize) -> bool {
    while size > 0 {
        if row % 3 == 1 && col % 3 == 1 {
            return false;
        }
        row /= 3;
        col /= 3;
        size /= 3;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_of_three_by_three_is_removed() {
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(is_in_carpet(row, col, 3), !(row == 1 && col == 1));
            }
        }
    }

    #[test]
    fn nested_centres_are_removed() {
        // whole middle block of a 9x9
        for row in 3..6 {
            for col in 3..6 {
                assert!(!is_in_carpet(row, col, 9));
            }
        }
        // centre of the top-left sub-square
        assert!(!is_in_carpet(1, 1, 9));
        assert!(is_in_carpet(0, 4, 9));
        assert!(is_in_carpet(2, 8, 9));
    }

    #[test]
    fn zero_size_accepts_everything() {
        assert!(is_in_carpet(1, 1, 0));
    }
}
