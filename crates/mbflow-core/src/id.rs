//! Strongly-typed identifiers.

use std::fmt;

/// Identifies a grid block within a multi-block simulation.
///
/// Blocks are registered at construction and assigned sequential IDs.
/// `BlockId(n)` corresponds to the n-th solver in the block list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Position of this block in the solver list.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BlockId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_id_displays_raw_value() {
        assert_eq!(BlockId(7).to_string(), "7");
        assert_eq!(BlockId::from(3).index(), 3);
    }

    #[test]
    fn block_ids_order_by_value() {
        let mut ids = vec![BlockId(2), BlockId(0), BlockId(1)];
        ids.sort();
        assert_eq!(ids, vec![BlockId(0), BlockId(1), BlockId(2)]);
    }
}
