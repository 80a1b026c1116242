use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::error::{PuzzleError, Result};

use super::theme::Theme;

/// Side length of a square board whose card count is even.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize(usize);

impl GridSize {
    pub fn new(side: usize) -> Result<Self> {
        if side == 0 || (side * side) % 2 != 0 {
            return Err(PuzzleError::InvalidGridSize(side));
        }
        Ok(GridSize(side))
    }

    pub fn side(self) -> usize {
        self.0
    }

    pub fn cell_count(self) -> usize {
        self.0 * self.0
    }

    pub fn total_pairs(self) -> usize {
        self.cell_count() / 2
    }
}

/// A dealt layout, one symbol per cell in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: GridSize,
    symbols: Vec<String>,
}

impl Board {
    /// Deals a shuffled board from `theme`.
    ///
    /// Up to `total_pairs` distinct symbols are drawn without replacement and
    /// doubled. When the theme is too small, extra pairs are drawn with
    /// replacement from that same selection, so a symbol can end up on four
    /// or more cells but always an even number of them.
    pub fn generate<R: Rng + ?Sized>(theme: &Theme, size: GridSize, rng: &mut R) -> Board {
        let cells = size.cell_count();
        let wanted = size.total_pairs().min(theme.symbols().len());
        let selected: Vec<&String> = theme.symbols().choose_multiple(rng, wanted).collect();

        let mut deck: Vec<String> = Vec::with_capacity(cells);
        deck.extend(selected.iter().map(|s| (*s).clone()));
        deck.extend(selected.iter().map(|s| (*s).clone()));
        while deck.len() < cells {
            let Some(extra) = selected.choose(rng) else {
                break;
            };
            deck.push((*extra).clone());
            deck.push((*extra).clone());
        }
        deck.truncate(cells);
        deck.shuffle(rng);

        tracing::debug!(
            theme = theme.name(),
            side = size.side(),
            distinct = selected.len(),
            "dealt board"
        );
        Board {
            size,
            symbols: deck,
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::game::theme::ThemeRegistry;

    fn counts(board: &Board) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for symbol in board.symbols() {
            *counts.entry(symbol.as_str()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn rejects_odd_boards() {
        assert!(GridSize::new(0).is_err());
        assert!(GridSize::new(3).is_err());
        assert_eq!(GridSize::new(4).unwrap().total_pairs(), 8);
    }

    #[test]
    fn every_symbol_is_paired_on_every_size() {
        let registry = ThemeRegistry::default();
        let mut rng = StdRng::seed_from_u64(7);
        for theme in registry.themes() {
            for side in [2, 4, 6, 8, 10] {
                let size = GridSize::new(side).unwrap();
                let board = Board::generate(theme, size, &mut rng);
                assert_eq!(board.len(), side * side, "{} {side}", theme.name());
                for (symbol, count) in counts(&board) {
                    assert_eq!(count % 2, 0, "{symbol} appears {count} times");
                }
            }
        }
    }

    #[test]
    fn two_by_two_uses_both_symbols() {
        let theme = Theme::new("AB", ["A", "B"]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::generate(&theme, GridSize::new(2).unwrap(), &mut rng);
        let counts = counts(&board);
        assert_eq!(counts.get("A"), Some(&2));
        assert_eq!(counts.get("B"), Some(&2));
    }

    #[test]
    fn large_theme_deals_distinct_pairs() {
        let registry = ThemeRegistry::default();
        let emoji = registry.resolve("Emoji");
        let mut rng = StdRng::seed_from_u64(3);
        let board = Board::generate(emoji, GridSize::new(4).unwrap(), &mut rng);
        let counts = counts(&board);
        assert_eq!(counts.len(), 8);
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn short_theme_pads_from_its_own_symbols() {
        let theme = Theme::new("One", ["X"]).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let board = Board::generate(&theme, GridSize::new(4).unwrap(), &mut rng);
        assert_eq!(counts(&board).get("X"), Some(&16));
    }

    #[test]
    fn deals_are_shuffled() {
        let theme = Theme::new("Classic", ["A", "B", "C", "D", "E", "F", "G", "H"]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let size = GridSize::new(4).unwrap();
        let first = Board::generate(&theme, size, &mut rng);
        let differs = (0..8).any(|_| Board::generate(&theme, size, &mut rng) != first);
        assert!(differs);
    }
}
