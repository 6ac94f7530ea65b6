use std::path::Path;

use anyhow::Context;
use common::log_setup::setup_logging;
use fanout::{FanConfig, FanOutEngine};
use log::info;

fn load_config(path: Option<&Path>) -> anyhow::Result<FanConfig> {
    match path {
        Some(path) => FanConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(FanConfig::default()),
    }
}

async fn two_producers() -> Vec<i64> {
    FanOutEngine::new(Some(2))
        .run([1_i64, 2], |data| data)
        .collect()
        .await
}

async fn sum_squares(config: FanConfig, numbers: Vec<i64>) -> anyhow::Result<i64> {
    let sum = FanOutEngine::from_config(&config)
        .run(numbers, |num| num * num)
        .drain_within(config.stall_deadline(), 0, |sum, square| sum + square)
        .await?;
    Ok(sum)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging("warn");

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;

    for value in two_producers().await {
        println!("{}", value);
    }

    let numbers = vec![1, 2, 3, 4, 5];
    info!("summing squares of {} numbers", numbers.len());
    let sum = tokio::spawn(sum_squares(config, numbers))
        .await
        .context("sum of squares task failed")??;
    println!("Sum of squares: {}", sum);

    Ok(())
}
