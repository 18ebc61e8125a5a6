//! microxml CLI - Streaming XML traversal from the command line

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use microxml::{Attributes, Outcome, Stats, Traverser, Visitor};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Minimal streaming, event-driven XML traverser
#[derive(ClapParser)]
#[command(name = "microxml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Internal read buffer size in bytes
    #[arg(long, global = true, default_value = "8192")]
    buffer_size: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the enter/leave/data callbacks of a document
    Events {
        /// Input file
        input: PathBuf,

        /// One JSON object per line, ending with the outcome
        #[arg(short, long)]
        json: bool,
    },

    /// Count elements, attributes and text
    Stats {
        /// Input file
        input: PathBuf,
    },

    /// Benchmark traversal performance
    Bench {
        /// Input file
        input: PathBuf,

        /// Number of iterations
        #[arg(short, long, default_value = "100")]
        iterations: usize,
    },
}

/// Prints callbacks as an indented outline.
struct Outline {
    depth: usize,
}

impl Visitor for Outline {
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool {
        let mut attrs: Vec<_> = attributes.iter().collect();
        attrs.sort();
        print!("{}{}", "  ".repeat(self.depth), name.cyan().bold());
        for (key, value) in attrs {
            print!(" {}={:?}", key.as_str().yellow(), value.as_str());
        }
        println!();
        self.depth += 1;
        true
    }

    fn leave(&mut self, _name: &str) -> bool {
        self.depth = self.depth.saturating_sub(1);
        true
    }

    fn data(&mut self, _name: &str, text: &str) -> bool {
        println!("{}{:?}", "  ".repeat(self.depth), text);
        true
    }

    fn root_data(&mut self, text: &str) -> bool {
        println!("{} {:?}", "(root)".dimmed(), text);
        true
    }
}

/// Prints callbacks as JSON lines.
struct JsonLines;

impl JsonLines {
    fn emit(&self, value: serde_json::Value) -> bool {
        println!("{}", value);
        true
    }
}

impl Visitor for JsonLines {
    fn enter(&mut self, name: &str, attributes: &Attributes) -> bool {
        self.emit(serde_json::json!({ "event": "enter", "name": name, "attributes": attributes }))
    }

    fn leave(&mut self, name: &str) -> bool {
        self.emit(serde_json::json!({ "event": "leave", "name": name }))
    }

    fn data(&mut self, name: &str, text: &str) -> bool {
        self.emit(serde_json::json!({ "event": "data", "name": name, "text": text }))
    }

    fn root_data(&mut self, text: &str) -> bool {
        self.emit(serde_json::json!({ "event": "data", "name": null, "text": text }))
    }
}

fn run<V: Visitor>(traverser: &Traverser, input: &Path, visitor: &mut V) -> Result<Outcome> {
    traverser
        .traverse_file(input, visitor)
        .with_context(|| format!("Failed to traverse {}", input.display()))
}

/// Reports non-completed outcomes; returns whether the document was accepted.
fn report(input: &Path, outcome: &Outcome) -> bool {
    match outcome {
        Outcome::Completed { unclosed: 0 } => true,
        Outcome::Completed { unclosed } => {
            eprintln!(
                "{} {} - {} unclosed tag(s) at end of input",
                "!".yellow().bold(),
                input.display(),
                unclosed
            );
            true
        }
        Outcome::Stopped => true,
        Outcome::Mismatch {
            expected,
            found,
            line,
        } => {
            eprintln!(
                "{} {}:{} - </{}> does not close {}",
                "✗".red().bold(),
                input.display(),
                line,
                found,
                match expected {
                    Some(name) => format!("<{}>", name),
                    None => "anything".to_string(),
                }
            );
            false
        }
        Outcome::Unreadable => {
            eprintln!("{} {} - stream not readable", "✗".red().bold(), input.display());
            false
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let traverser = Traverser::new().with_buffer_capacity(cli.buffer_size);

    let accepted = match cli.command {
        Commands::Events { input, json } => {
            if json {
                let outcome = run(&traverser, &input, &mut JsonLines)?;
                println!("{}", serde_json::to_string(&outcome)?);
                report(&input, &outcome)
            } else {
                let outcome = run(&traverser, &input, &mut Outline { depth: 0 })?;
                report(&input, &outcome)
            }
        }

        Commands::Stats { input } => {
            let start = Instant::now();
            let mut stats = Stats::new();
            let outcome = run(&traverser, &input, &mut stats)?;
            let elapsed = start.elapsed();

            let accepted = report(&input, &outcome);
            if accepted {
                println!("{} {}", "✓".green().bold(), input.display());
            }
            println!("  Elements: {}", stats.elements);
            println!("  Attributes: {}", stats.attributes);
            println!("  Text sections: {}", stats.data_sections);
            println!("  Text bytes: {}", stats.data_bytes);
            println!("  Max depth: {}", stats.max_depth);
            println!("  Time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
            accepted
        }

        Commands::Bench { input, iterations } => {
            let iterations = iterations.max(1);
            let bytes = std::fs::metadata(&input)
                .with_context(|| format!("Failed to stat {}", input.display()))?
                .len();

            // Warmup
            for _ in 0..3 {
                run(&traverser, &input, &mut Stats::new())?;
            }

            let mut times = Vec::with_capacity(iterations);
            let mut elements = 0;

            for _ in 0..iterations {
                let mut stats = Stats::new();
                let start = Instant::now();
                run(&traverser, &input, &mut stats)?;
                times.push(start.elapsed());
                elements = stats.elements;
            }

            times.sort();
            let min = times[0];
            let max = times[times.len() - 1];
            let median = times[times.len() / 2];
            let mean = times.iter().sum::<std::time::Duration>() / times.len() as u32;

            println!("Benchmark Results for {}", input.display());
            println!("  Iterations: {}", iterations);
            println!("  Elements: {}", elements);
            println!("  Buffer: {} bytes", traverser.buffer_capacity());
            println!("  Min:    {:.3}ms", min.as_secs_f64() * 1000.0);
            println!("  Median: {:.3}ms", median.as_secs_f64() * 1000.0);
            println!("  Mean:   {:.3}ms", mean.as_secs_f64() * 1000.0);
            println!("  Max:    {:.3}ms", max.as_secs_f64() * 1000.0);
            println!(
                "  Throughput: {:.1} MB/s",
                bytes as f64 / mean.as_secs_f64() / 1_000_000.0
            );
            true
        }
    };

    if !accepted {
        std::process::exit(1);
    }

    Ok(())
}
