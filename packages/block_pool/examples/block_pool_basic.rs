//! Basic usage example for `BlockPool`.
//!
//! This example demonstrates taking blocks from a pool with a capacity of one block,
//! observing the pool becoming full and reusing a returned block.

use block_pool::{BlockPool, Error};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    // Create a pool with a capacity of a single block of the default size.
    let mut pool = BlockPool::new(1)?;

    let mut block = pool.get()?;
    println!("len: {} capacity: {}", block.len(), block.capacity());

    let message = b"hello";
    block[..message.len()].copy_from_slice(message);
    println!(
        "wrote {:?} at {:p}",
        String::from_utf8_lossy(&block[..message.len()]),
        block.as_ptr()
    );

    // The block was not returned, so there are no more blocks available.
    match pool.get() {
        Err(Error::PoolFull) => println!("pool is full, as expected"),
        other => panic!("expected the pool to be full but got {other:?}"),
    }

    pool.return_block(block)?;
    println!(
        "after return: free {} allocated {}",
        pool.free_count(),
        pool.alloc_count()
    );

    // The returned block is handed out again.
    let block = pool.get()?;
    println!(
        "reused block at {:p} still contains {:?}",
        block.as_ptr(),
        String::from_utf8_lossy(&block[..message.len()])
    );
    pool.return_block(block)?;

    if let Err(errors) = pool.close() {
        eprintln!("failed to release memory:\n{errors}");
    }

    Ok(())
}
