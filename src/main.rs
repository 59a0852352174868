use std::io::{BufWriter, Write};

use anyhow::Context;
use clap::Parser;

use cache_simulator::{
    cli::{print_box, trace_line, Cli, Summary},
    draw::Draw,
    logging, SetAssociativeCache,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.quiet, cli.verbose);

    let mut cache = SetAssociativeCache::with_capacity(cli.capacity, cli.line_size, cli.ways)
        .with_context(|| {
            format!(
                "invalid cache geometry (capacity {}, line size {}, {} ways)",
                cli.capacity, cli.line_size, cli.ways
            )
        })?;
    let mut source = cli.pattern.source(cli.stride);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut write_error = None;

    let stats = cli.simulation().run(&mut cache, &mut source, |address, result| {
        if cli.trace && write_error.is_none() {
            if let Err(e) = writeln!(out, "{}", trace_line(address, result)) {
                write_error = Some(e);
            }
        }
    });
    if let Some(e) = write_error {
        return Err(e).context("failed to write access trace");
    }
    out.flush()?;
    drop(out);

    if cli.dump_cache {
        print_box("Cache", cache.draw());
    }

    let summary = Summary::new(cli.pattern, &cache, stats);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_box("Stats", &summary);
    }

    Ok(())
}
