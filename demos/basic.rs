//! Basic usage of sequences and their combinators
//!
//! Run with: cargo run --example basic

use seqweld::prelude::*;
use seqweld::processors::appliers;
use seqweld::sources::from_results;

/// Example 1: Transform and filter
async fn transform_filter_example() -> Result<()> {
    println!("=== Transform and Filter ===");

    let squares = from_iter(1..21)
        .filter(|x| Ok(x % 3 == 0))
        .map(|x| Ok(x * x));

    for_each(squares, |x| {
        println!("Square: {}", x);
        Ok(())
    })
    .await?;

    println!();
    Ok(())
}

/// Example 2: Failures travel with elements
async fn failure_example() -> Result<()> {
    println!("=== Failures ===");

    let parsed = from_iter(vec!["1", "2", "three", "4"])
        .map(|s: &str| s.parse::<i32>().map_err(Error::function));

    while let Some(element) = parsed.next().await {
        match element.into_result() {
            Ok(n) => println!("Parsed: {}", n),
            Err(e) => println!("Failed: {}", e),
        }
    }

    let total = coalesce_with_report().await?;
    println!("Sum ignoring failures: {}", total);

    println!();
    Ok(())
}

async fn coalesce_with_report() -> Result<i32> {
    let config = SequenceConfig::new()
        .name("numbers")
        .on_error(|e: &Error| eprintln!("skipping: {}", e));
    let seq = from_results(vec![Ok(1), Err(Error::custom("bad input")), Ok(2)]);
    seqweld::sinks::coalesce_with(seq, |acc, x| Ok(acc + x), config).await
}

/// Example 3: Prefetching and running statistics
async fn buffer_example() -> Result<()> {
    println!("=== Buffer and Running Mean ===");

    let means = from_iter(vec![10.0, 20.0, 60.0])
        .buffer(2)
        .apply(appliers::mean::<f64>());
    println!("Running means: {:?}", collect(means).await?);

    println!();
    Ok(())
}

/// Example 4: Concatenation, split and zip
async fn concat_split_zip_example() -> Result<()> {
    println!("=== Concat, Split and Zip ===");

    let letters = concat(vec![from_iter(vec!['a', 'b']), empty(), once('c')]);
    let (left, right) = letters.split();
    let upper = right.map(|c: char| Ok(c.to_ascii_uppercase()));

    for pair in collect(left.zip(upper)).await? {
        println!("{} -> {}", pair.left, pair.right);
    }

    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    transform_filter_example().await?;
    failure_example().await?;
    buffer_example().await?;
    concat_split_zip_example().await?;
    Ok(())
}
