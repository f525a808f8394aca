use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::emitter::{DotStyle, DEFAULT_NODE_COLOR};
use crate::graph::translator::{TranslateOptions, DEFAULT_SKIPPED};

/// Graphviz layout programs
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    Dot,
    Neato,
    Fdp,
    Sfdp,
    Twopi,
    Circo,
}

impl Engine {
    pub fn program(&self) -> &'static str {
        match self {
            Engine::Dot => "dot",
            Engine::Neato => "neato",
            Engine::Fdp => "fdp",
            Engine::Sfdp => "sfdp",
            Engine::Twopi => "twopi",
            Engine::Circo => "circo",
        }
    }
}

/// Draw how the rules of an ANTLR grammar lead into one another
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// File containing the grammar
    pub file: PathBuf,

    /// Start rule (default: first parser rule in the file)
    #[arg(short, long, value_name = "RULE")]
    pub start: Option<String>,

    /// How many rule bodies deep to expand
    #[arg(short, long, value_name = "DEPTH", default_value_t = 5)]
    pub depth: usize,

    /// Directory for the generated .dot file
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Print the graph instead of writing a file
    #[arg(long, conflicts_with = "render")]
    pub stdout: bool,

    /// Additional element name to leave out of the graph (repeatable)
    #[arg(long, value_name = "NAME")]
    pub skip: Vec<String>,

    /// Keep the default separator names (nls, NL, sep, SEMI) in the graph
    #[arg(long)]
    pub no_default_skip: bool,

    /// Also render an image in this Graphviz format, e.g. png or svg
    #[arg(long, value_name = "FORMAT")]
    pub render: Option<String>,

    /// Graphviz layout program used by --render
    #[arg(long, value_enum, default_value_t = Engine::Dot)]
    pub engine: Engine,

    /// Directory for rendered images (default: the output directory)
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,

    /// Resolution of rendered images
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,

    /// Maximum drawing size in inches, as WIDTH,HEIGHT
    #[arg(long, value_name = "W,H", default_value = "10,10")]
    pub size: String,

    /// Fill color of terminal nodes
    #[arg(long, value_name = "COLOR", default_value = DEFAULT_NODE_COLOR)]
    pub terminal_color: String,

    /// Fill color of the start node
    #[arg(long, value_name = "COLOR", default_value = DEFAULT_NODE_COLOR)]
    pub start_color: String,
}

impl Cli {
    pub fn translate_options(&self) -> TranslateOptions {
        let defaults = if self.no_default_skip { &[][..] } else { &DEFAULT_SKIPPED[..] };
        TranslateOptions {
            skipped: defaults
                .iter()
                .map(|s| s.to_string())
                .chain(self.skip.iter().cloned())
                .collect(),
        }
    }

    pub fn dot_style(&self) -> DotStyle {
        DotStyle {
            size: self.size.clone(),
            dpi: self.dpi,
            terminal_color: self.terminal_color.clone(),
            start_color: self.start_color.clone(),
        }
    }
}
