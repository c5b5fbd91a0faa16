pub mod block;
pub mod factory;
pub mod node;

pub use block::{Block, BlockPatch, BlockProps, BlockType};
pub use factory::{
    DEFAULT_CODE_LANGUAGE, create_block, create_block_with_content, default_props, new_block_id,
    placeholder,
};
pub use node::{Node, kind};
