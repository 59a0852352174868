use std::fmt::Display;

use clap::{ArgAction, Parser};
use serde::Serialize;

use crate::{
    cache::{Geometry, SetAssociativeCache, DEFAULT_CAPACITY},
    generator::Pattern,
    sim::Simulation,
    stat::CacheStats,
};

/// Set associative cache simulator with LFU replacement
#[derive(Parser, Debug, Clone)]
#[command(name = "cache-sim", version, about)]
pub struct Cli {
    /// Bytes per cache line, a power of two
    #[arg(long, default_value_t = 128)]
    pub line_size: u32,

    /// Associativity (lines per set)
    #[arg(long, default_value_t = 4)]
    pub ways: u32,

    /// Total cache capacity in bytes
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: u32,

    /// Number of addresses to simulate
    #[arg(short = 'n', long, default_value_t = Simulation::DEFAULT_ITERATIONS)]
    pub iterations: u64,

    /// Address pattern driving the cache
    #[arg(short, long, value_enum, default_value_t = Pattern::Sequential4K)]
    pub pattern: Pattern,

    /// Step width of the strided pattern
    #[arg(long, default_value_t = Pattern::DEFAULT_STRIDE)]
    pub stride: u32,

    /// Print every access with its outcome
    #[arg(long)]
    pub trace: bool,

    /// Print the resident lines after the run
    #[arg(long)]
    pub dump_cache: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// More log output, repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn simulation(&self) -> Simulation {
        Simulation::new(self.iterations)
    }
}

/// End-of-run figures.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub pattern: &'static str,
    pub geometry: Geometry,
    pub iterations: u64,
    pub stats: CacheStats,
    pub hit_ratio: f64,
    pub miss_ratio: f64,
    pub fills: u64,
    pub evictions: u64,
}

impl Summary {
    pub fn new(pattern: Pattern, cache: &SetAssociativeCache, stats: CacheStats) -> Self {
        Self {
            pattern: pattern.name(),
            geometry: *cache.geometry(),
            iterations: stats.total(),
            stats,
            hit_ratio: stats.hit_ratio(),
            miss_ratio: stats.miss_ratio(),
            fills: cache.fills(),
            evictions: cache.evictions(),
        }
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Generator        = {}", self.pattern)?;
        writeln!(f, "Cache            = {}", self.geometry)?;
        writeln!(f, "Accesses         = {}", self.iterations)?;
        writeln!(f, "{}", self.stats)?;
        writeln!(f, "Fills            = {}", self.fills)?;
        write!(f, "Evictions        = {}", self.evictions)
    }
}

pub fn trace_line(address: impl Display, result: impl Display) -> String {
    format!("{address} ({result})")
}

pub fn boxed(title: &str, content: impl Display) -> String {
    let content = format!("{}", content);
    let lines: Vec<_> = content.lines().collect();
    let width = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(4 + title.len());
    let mut buf = String::new();

    let width = width + 1;

    buf += "╭─";
    buf += title;
    for _ in 0..(width - title.len()) {
        buf += "─";
    }
    buf += "╮\n";

    for line in lines {
        buf += "│ ";
        buf += line;
        for _ in 0..(width - line.chars().count()) {
            buf += " ";
        }
        buf += "│\n";
    }
    buf += "╰";
    for _ in 0..=width {
        buf += "─";
    }
    buf += "╯";

    buf
}

pub fn print_box(title: &str, content: impl Display) {
    println!("{}", boxed(title, content));
}
