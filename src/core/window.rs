//! Context window: the fixed-length history of character indices fed to the model.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How a seed shorter than the window is filled on the left.
///
/// The choice is user-visible: the padding is part of the first contexts the
/// model sees, so it shapes the earliest generated characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Padding {
    /// Left-pad with this character. It must belong to the vocabulary.
    Char(char),
    /// Left-pad by repeating the first seed character. An empty seed pads
    /// with index 0.
    RepeatFirst,
}

impl Default for Padding {
    fn default() -> Self {
        Self::Char(' ')
    }
}

/// [`Padding`] resolved against a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PadFill {
    Index(usize),
    RepeatFirst,
}

/// Fixed-capacity FIFO of the most recent indices.
///
/// Its length never changes after construction. Only generator sessions
/// build windows, from an already validated sequence length.
#[derive(Debug, Clone)]
pub(crate) struct ContextWindow {
    indices: VecDeque<usize>,
}

impl ContextWindow {
    /// Build a window from encoded seed indices.
    ///
    /// Seeds at least `capacity` long keep only their last `capacity`
    /// indices; shorter seeds are left-padded according to `fill`.
    /// `capacity` must be positive; `GeneratorConfig::validate` rejects zero.
    pub(crate) fn initialize(seed: &[usize], capacity: usize, fill: PadFill) -> Self {
        debug_assert!(capacity > 0, "context window capacity must be positive");

        let mut indices = VecDeque::with_capacity(capacity);
        if seed.len() >= capacity {
            indices.extend(&seed[seed.len() - capacity..]);
        } else {
            let pad = match fill {
                PadFill::Index(i) => i,
                PadFill::RepeatFirst => seed.first().copied().unwrap_or(0),
            };
            indices.extend(std::iter::repeat(pad).take(capacity - seed.len()));
            indices.extend(seed);
        }

        Self { indices }
    }

    /// Append the newest index and evict the oldest.
    pub(crate) fn push(&mut self, index: usize) {
        self.indices.pop_front();
        self.indices.push_back(index);
    }

    /// Ordered view of the window, oldest first.
    pub(crate) fn snapshot(&mut self) -> &[usize] {
        self.indices.make_contiguous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_seed_is_left_padded_with_pad_index() {
        let mut window = ContextWindow::initialize(&[3, 4], 5, PadFill::Index(0));
        assert_eq!(window.snapshot(), &[0, 0, 0, 3, 4]);
    }

    #[test]
    fn short_seed_repeat_first_padding() {
        let mut window = ContextWindow::initialize(&[3, 4], 4, PadFill::RepeatFirst);
        assert_eq!(window.snapshot(), &[3, 3, 3, 4]);
    }

    #[test]
    fn empty_seed_fills_entire_window() {
        let mut padded = ContextWindow::initialize(&[], 3, PadFill::Index(7));
        assert_eq!(padded.snapshot(), &[7, 7, 7]);

        let mut repeated = ContextWindow::initialize(&[], 3, PadFill::RepeatFirst);
        assert_eq!(repeated.snapshot(), &[0, 0, 0]);
    }

    #[test]
    fn long_seed_keeps_last_indices() {
        let mut window = ContextWindow::initialize(&[1, 2, 3, 4, 5], 3, PadFill::Index(0));
        assert_eq!(window.snapshot(), &[3, 4, 5]);
    }

    #[test]
    fn push_evicts_oldest() {
        let mut window = ContextWindow::initialize(&[1, 2, 3], 3, PadFill::Index(0));
        window.push(9);
        assert_eq!(window.snapshot(), &[2, 3, 9]);
    }

    #[test]
    fn length_is_constant_across_pushes() {
        let mut window = ContextWindow::initialize(&[1], 4, PadFill::Index(0));
        for i in 0..100 {
            window.push(i);
            assert_eq!(window.snapshot().len(), 4);
        }
        assert_eq!(window.snapshot(), &[96, 97, 98, 99]);
    }

    #[test]
    fn default_padding_is_space() {
        assert_eq!(Padding::default(), Padding::Char(' '));
    }
}
