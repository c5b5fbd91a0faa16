use crate::models::{Block, BlockType};

/// Displayed ordinal of the numbered block at `index`.
///
/// Non-numbered blocks (and out-of-range indices) report 1. A numbered block counts
/// the unbroken run of numbered blocks directly above it. Nothing is cached, so the
/// result is always correct for the current order.
pub fn get_list_index(blocks: &[Block], index: usize) -> usize {
    match blocks.get(index) {
        Some(block) if block.block_type == BlockType::Numbered => {
            let preceding = blocks[..index]
                .iter()
                .rev()
                .take_while(|b| b.block_type == BlockType::Numbered)
                .count();
            preceding + 1
        }
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::create_block_with_content;

    fn doc(types: &[BlockType]) -> Vec<Block> {
        types
            .iter()
            .map(|t| create_block_with_content(*t, "x"))
            .collect()
    }

    #[test]
    fn interrupted_run_restarts() {
        let blocks = doc(&[
            BlockType::Numbered,
            BlockType::Numbered,
            BlockType::Text,
            BlockType::Numbered,
        ]);
        let indices: Vec<_> = (0..blocks.len())
            .map(|i| get_list_index(&blocks, i))
            .collect();
        assert_eq!(indices, vec![1, 2, 1, 1]);
    }

    #[test]
    fn bullets_do_not_count_towards_numbering() {
        let blocks = doc(&[BlockType::Bullet, BlockType::Numbered, BlockType::Numbered]);
        assert_eq!(get_list_index(&blocks, 2), 2);
    }

    #[test]
    fn out_of_range_is_one() {
        assert_eq!(get_list_index(&[], 3), 1);
    }
}
