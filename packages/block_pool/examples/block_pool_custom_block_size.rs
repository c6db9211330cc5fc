//! Demonstrates configuring the block size and preallocating blocks.
//!
//! Block sizes that are a multiple of the operating system page size (typically 4 KB) waste
//! the least memory, as memory is always obtained from the operating system in whole pages.

use std::num::NonZero;

use block_pool::{BlockPool, Error};

const BLOCK_SIZE: NonZero<usize> = NonZero::new(8 * 1024 * 1024).unwrap();

fn main() -> Result<(), Error> {
    let pool = BlockPool::builder()
        .max_blocks(2)
        .block_size(BLOCK_SIZE)
        .preallocate(1)
        .build()?;

    println!(
        "preallocated: free {} allocated {}",
        pool.free_count(),
        pool.alloc_count()
    );

    let block = pool.get()?;
    println!("len: {} capacity: {}", block.len(), block.capacity());

    pool.return_block(block)?;

    // Dropping the pool releases all memory. Failures are logged rather than reported.
    drop(pool);

    Ok(())
}
