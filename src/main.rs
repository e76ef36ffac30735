use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clusterforce::io::{FrameWriter, read_config, read_dataset, write_value};
use clusterforce::{LayoutConfig, LayoutSession, TickEvent, Viewport};

mod cli;

use cli::{Cli, Commands};

fn load_config(path: Option<&Path>) -> anyhow::Result<LayoutConfig> {
    match path {
        Some(path) => read_config(path)
            .with_context(|| format!("failed to read config '{}'", path.display())),
        None => Ok(LayoutConfig::default()),
    }
}

fn open_session(
    input: &Path,
    config: &LayoutConfig,
    viewport: Viewport,
) -> anyhow::Result<LayoutSession> {
    let dataset = read_dataset(input)
        .with_context(|| format!("failed to read dataset '{}'", input.display()))?;
    LayoutSession::new(&dataset, config, viewport)
        .with_context(|| format!("cannot lay out '{}'", input.display()))
}

fn layout(
    session: &mut LayoutSession,
    output: &Path,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let summary = session.run(max_ticks)?;
    let layout = session.layout();
    write_value(output, &layout)
        .with_context(|| format!("failed to write layout '{}'", output.display()))?;
    println!(
        "Laid out {} nodes in {} clusters after {} ticks ({}), written to {}",
        layout.nodes.len(),
        layout.clusters.len(),
        summary.ticks,
        summary.state,
        output.display()
    );
    Ok(())
}

fn frames(
    session: &mut LayoutSession,
    sink: Box<dyn Write>,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let mut writer = FrameWriter::new(BufWriter::new(sink));
    session.start()?;

    let mut ticks = session.ticks();
    while max_ticks.is_none_or(|max| writer.written() < max) {
        match ticks.next() {
            Some(TickEvent::Frame(frame)) => writer.write_frame(&frame)?,
            Some(TickEvent::Fault(err)) => return Err(err.into()),
            None => break,
        }
    }

    tracing::info!(frames = writer.written(), "frame stream finished");
    writer.finish()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let viewport = Viewport::new(cli.width, cli.height);

    match cli.command {
        Commands::Layout { input, output } => {
            let mut session = open_session(&input, &config, viewport)?;
            layout(&mut session, &output, cli.max_ticks)?;
        }
        Commands::Frames { input, output } => {
            let mut session = open_session(&input, &config, viewport)?;
            let sink: Box<dyn Write> = match output {
                Some(path) => Box::new(
                    File::create(&path)
                        .with_context(|| format!("failed to create '{}'", path.display()))?,
                ),
                None => Box::new(std::io::stdout()),
            };
            frames(&mut session, sink, cli.max_ticks)?;
        }
        Commands::Check { input } => {
            let session = open_session(&input, &config, viewport)?;
            println!(
                "{}: {} nodes, {} links, {} clusters",
                input.display(),
                session.simulation().nodes().len(),
                session.simulation().links().len(),
                session.cluster_locations().len()
            );
        }
    }

    Ok(())
}
