// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blockpad_engine::{Block, BlockType, create_block_with_content};

#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with some content.\n\n- Bullet point\n- Another item\n\n- [ ] Open task\n- [x] Done task\n\n1. First\n2. Second\n\n> A quote\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n---\n\n";
    base.repeat(size)
}

/// Alternating runs of numbered blocks and text, the worst case for list reflow.
#[allow(dead_code)]
pub fn generate_numbered_blocks(runs: usize, run_len: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(runs * (run_len + 1));
    for run in 0..runs {
        for item in 0..run_len {
            blocks.push(create_block_with_content(
                BlockType::Numbered,
                format!("item {item} of run {run}"),
            ));
        }
        blocks.push(create_block_with_content(BlockType::Text, "break"));
    }
    blocks
}
