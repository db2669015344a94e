//! Prints a summary of a compressed fixture archive.
//!
//! Usage: `fixture_dump <archive.fixture.yaml.gz>`

use std::path::Path;
use std::{env, process};

use cloudtape::fixture::archive;

fn dump(path: &str) -> Result<(), String> {
    let archive = archive::unpack(Path::new(path))?;

    println!("session:     {}", archive.name);
    println!("recorded_at: {}", archive.recorded_at.to_rfc3339());
    println!("calls:       {}", archive.call_count());
    for log in &archive.operations {
        println!("  {:<40} {:>4}", log.operation, log.calls.len());
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: fixture_dump <archive.fixture.yaml.gz>");
        process::exit(2);
    }
    if let Err(e) = dump(&args[1]) {
        eprintln!("{e}");
        process::exit(1);
    }
}
