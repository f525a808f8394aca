mod cli;
mod emitter;
mod error_handling;
mod grammar;
mod graph;
mod parser;
mod render;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};

use cli::Cli;
use graph::{expander, translator};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(&Cli::parse())
}

fn run(cli: &Cli) -> Result<()> {
    let grammar = match parser::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in &errors {
                eprintln!("{}", error);
            }
            bail!("{} error(s) while reading {}", errors.len(), cli.file.display());
        }
    };
    for diagnostic in parser::verifier::verify_rules(&grammar) {
        warn!("[{}] {}", diagnostic.location, diagnostic.error);
    }

    let start = match &cli.start {
        Some(start) => start.clone(),
        None => grammar
            .first_rule()
            .map(|rule| rule.name.clone())
            .with_context(|| format!("{} has no parser rules; pass --start", cli.file.display()))?,
    };
    if grammar.rule(&start).is_none() {
        warn!("`{}` is not a parser rule of grammar {}", start, grammar.name);
    }

    let graph = translator::translate(&grammar, &cli.translate_options());
    info!(
        "{:?} grammar {}: {} parser rules, {} lexer rules, {} symbols, {} transitions",
        grammar.kind,
        grammar.name,
        grammar.rules.len(),
        grammar.lexer_rules.len(),
        graph.symbol_count(),
        graph.transition_count()
    );

    let expansion = expander::expand(&graph, &start, cli.depth);
    info!(
        "{} edges and {} terminals reachable from `{}` within depth {} ({} rule/symbol pairs expanded)",
        expansion.edges.len(),
        expansion.terminals.len(),
        start,
        cli.depth,
        expansion.visited
    );

    let text = emitter::generate(&graph, &expansion, &cli.dot_style());
    if cli.stdout {
        print!("{}", text);
        return Ok(());
    }

    let stem = render::output_stem(&grammar.name, &start);
    let dot_path = render::write_dot(&cli.out_dir, &stem, &text)?;
    info!("wrote {}", dot_path.display());

    if let Some(format) = &cli.render {
        let image_dir = cli.image_dir.as_deref().unwrap_or(&cli.out_dir);
        let image = render::render_image(&dot_path, image_dir, cli.engine.program(), format)?;
        info!("rendered {}", image.display());
    }

    Ok(())
}
