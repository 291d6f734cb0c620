//! Textsound CLI — sonify a tagged document or raw text.
//!
//! ```text
//! textsound render  --document story.yaml --instructions rules.yaml
//! textsound export  --text "Hello" -o hello.mid
//! textsound play    --document story.yaml --wordnet /usr/share/wordnet
//! textsound ports
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::{info, warn};

use textsound::config::SessionConfig;
use textsound::error::SonifyError;
use textsound::lexicon::{LexicalLookup, MemoryLexicon, WordNetLexicon};
use textsound::midi::{write_midi, Player};
use textsound::nlp::AnnotatedDocument;
use textsound::rules::load_instructions;
use textsound::{Pattern, Session};

/// Turn text into music through its lexical categories
#[derive(Parser)]
#[command(name = "textsound")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pattern as Staccato text
    Render {
        #[command(flatten)]
        input: Input,
    },

    /// Write the pattern to a Standard MIDI File
    Export {
        #[command(flatten)]
        input: Input,

        /// Output file path
        #[arg(short, long, default_value = "textsound.mid")]
        output: PathBuf,
    },

    /// Play the pattern on a MIDI output port
    Play {
        #[command(flatten)]
        input: Input,

        /// Substring of the output port name (first port when omitted)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// List MIDI output ports
    Ports,
}

#[derive(Args)]
struct Input {
    /// Tagged document (YAML or JSON) to sonify word by word
    #[arg(short, long, conflicts_with = "text", required_unless_present = "text")]
    document: Option<PathBuf>,

    /// Raw text, sonified character by character
    #[arg(short, long)]
    text: Option<String>,

    /// Instruction list (YAML or JSON)
    #[arg(short, long)]
    instructions: Option<PathBuf>,

    /// Session configuration (defaults to ~/.textsound/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Lexical-category table (YAML or JSON)
    #[arg(long, conflicts_with = "wordnet")]
    lexicon: Option<PathBuf>,

    /// WordNet dictionary directory
    #[arg(long)]
    wordnet: Option<PathBuf>,
}

impl Input {
    fn lexicon(&self) -> Result<Box<dyn LexicalLookup>, SonifyError> {
        if let Some(dir) = &self.wordnet {
            let wordnet = WordNetLexicon::open(dir)?;
            info!("loaded {} WordNet entries from {}", wordnet.len(), dir.display());
            return Ok(Box::new(wordnet));
        }
        match &self.lexicon {
            Some(path) => Ok(Box::new(MemoryLexicon::from_path(path)?)),
            None => Ok(Box::new(MemoryLexicon::new())),
        }
    }

    fn sonify(&self) -> Result<Pattern, SonifyError> {
        let config = match &self.config {
            Some(path) => SessionConfig::from_path(path)?,
            None => SessionConfig::load().unwrap_or_default(),
        };
        let instructions = match &self.instructions {
            Some(path) => load_instructions(path)?,
            None => Vec::new(),
        };

        match (&self.document, &self.text) {
            (Some(path), _) => {
                let document = AnnotatedDocument::from_path(path)?;
                let mut session = Session::new(config, instructions, self.lexicon()?)?;
                session.sonify_text(&document.text(), &document, &document)
            }
            (None, Some(text)) => {
                let mut session = Session::new(config, instructions, self.lexicon()?)?;
                Ok(session.sonify_characters(text))
            }
            (None, None) => Err(SonifyError::Config(
                "either --document or --text is required".into(),
            )),
        }
    }
}

fn run(cli: Cli) -> Result<(), SonifyError> {
    match cli.command {
        Commands::Render { input } => {
            println!("{}", input.sonify()?);
        }
        Commands::Export { input, output } => {
            let pattern = input.sonify()?;
            write_midi(&pattern, &output)?;
            println!("Wrote {} events to {}", pattern.len(), output.display());
        }
        Commands::Play { input, port } => {
            let pattern = input.sonify()?;
            let player = Player::start(&pattern, port.as_deref())?;
            let handle = player.handle();
            if let Err(e) = ctrlc::set_handler(move || handle.stop()) {
                warn!("cannot install Ctrl+C handler: {e}");
            }
            println!("Playing on '{}'. Press Ctrl+C to stop.", player.port_name());
            player.wait();
        }
        Commands::Ports => {
            let ports = Player::list_ports();
            if ports.is_empty() {
                println!("No MIDI output ports found.");
            }
            for name in ports {
                println!("{name}");
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
