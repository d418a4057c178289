//! Bounded fan-out over a slow asynchronous step
//!
//! Run with: cargo run --example fan_out

use std::time::{Duration, Instant};

use seqweld::prelude::*;

async fn lookup(id: u32) -> Result<String> {
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(format!("record-{}", id))
}

async fn run(workers: usize) -> Result<()> {
    let started = Instant::now();
    let records = from_iter(0..16u32).then(lookup).parallel(workers);
    let n = count(records).await;
    println!(
        "{} workers: {} records in {:?}",
        workers,
        n,
        started.elapsed()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    for workers in [1, 4, 16] {
        run(workers).await?;
    }

    // Two consumers, each seeing every record
    let (audit, store) = from_iter(0..4u32).then(lookup).split();
    let audit = tokio::spawn(collect(audit));
    let stored = collect(store).await?;
    println!("stored {:?}", stored);
    println!("audited {:?}", audit.await??);
    Ok(())
}
