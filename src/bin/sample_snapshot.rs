use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use env_logger::Env;
use threadhub::load_snapshot;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 4 {
        eprintln!("Usage: {} <input.json> <output.json> <sample_percentage>", args[0]);
        eprintln!("Example: sample_snapshot snapshot.json sample.json 10");
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_path = PathBuf::from(&args[2]);
    let sample_percentage: f32 = args[3]
        .parse()
        .map_err(|_| "Sample percentage must be a number")?;

    if sample_percentage <= 0.0 || sample_percentage > 100.0 {
        eprintln!("Sample percentage must be between 0 and 100");
        std::process::exit(1);
    }

    println!(
        "Sampling {}% of messages from {} to {}",
        sample_percentage,
        input_path.display(),
        output_path.display()
    );

    let messages = load_snapshot(&input_path)?;
    let total_messages = messages.len();

    let sample_size = ((total_messages as f32) * (sample_percentage / 100.0)) as usize;
    let step = if sample_size > 0 { total_messages / sample_size } else { 1 };
    let step = step.max(1);
    println!("Taking every {}th message", step);

    // Keeps snapshot order, so the sample is still newest first.
    let sampled: Vec<_> = messages.iter().step_by(step).collect();

    let mut writer = BufWriter::new(File::create(&output_path)?);
    serde_json::to_writer_pretty(&mut writer, &sampled)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    println!("Wrote {} of {} messages to {}", sampled.len(), total_messages, output_path.display());

    Ok(())
}
