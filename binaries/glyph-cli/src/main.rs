//! Glyph CLI
//!
//! Encode hex text and bitmaps into glyph strings and back.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use glyph_config::GlyphConfig;
use glyph_core::{Codebook, CodecConfig, MatrixCodec, ResiduePolicy, Transcoded};
use glyph_session::keys_for_glyph;
use glyph_session::{DraftStore, InputMode, Mode, Session};

#[derive(Parser)]
#[command(name = "glyph")]
#[command(about = "Reversible hex/bitmap to glyph codec")]
#[command(version)]
struct Cli {
    /// Config file (defaults to <config_dir>/glyph/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode hex text or bitmap rows into glyphs
    Encode {
        /// Text to encode (stdin when neither text nor file is given)
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Print "before → after" counts on stderr
        #[arg(short, long)]
        stats: bool,
    },

    /// Decode glyphs back into text
    Decode {
        /// Glyph text to decode (stdin when neither text nor file is given)
        text: Option<String>,

        /// Read the glyphs from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Print "before → after" counts on stderr
        #[arg(short, long)]
        stats: bool,

        /// Pass unmatched glyphs through instead of rejecting the input
        #[arg(long)]
        lenient: bool,
    },

    /// Show the active codebook
    Codebook {
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Turn keystrokes into glyphs using the two-handed layout
    Keys {
        /// Keys to press, e.g. "wakj"
        keystrokes: String,

        /// Split keys into one row per hand
        #[arg(long)]
        parallel: bool,

        /// Also print the decoded text
        #[arg(long)]
        decode: bool,
    },

    /// Saved drafts
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
}

#[derive(Subcommand)]
enum DraftCommands {
    /// Print the draft and what it converts to
    Show {
        #[arg(short, long, value_enum)]
        mode: ModeArg,
    },

    /// Replace the draft
    Save {
        #[arg(short, long, value_enum)]
        mode: ModeArg,

        /// Draft text (stdin when omitted)
        text: Option<String>,
    },

    /// Delete the draft
    Clear {
        #[arg(short, long, value_enum)]
        mode: ModeArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Encode,
    Decode,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Encode => Mode::Encode,
            ModeArg::Decode => Mode::Decode,
        }
    }
}

/// Loaded config plus the codebook it selects
struct App {
    config: GlyphConfig,
    codebook: Codebook,
}

impl App {
    fn load(path: Option<PathBuf>) -> Result<Self> {
        let config = match path {
            Some(path) => GlyphConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => GlyphConfig::load_default().context("Failed to load config")?,
        };
        let codebook = config.load_codebook().context("Failed to load codebook")?;
        Ok(Self { config, codebook })
    }

    fn codec(&self) -> MatrixCodec<'_> {
        MatrixCodec::with_config(&self.codebook, self.config.codec)
    }

    fn drafts(&self) -> DraftStore {
        DraftStore::at_path(self.config.draft_path())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "glyph=debug" } else { "glyph=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::load(cli.config)?;

    match cli.command {
        Commands::Encode { text, file, stats } => cmd_encode(&app, text, file, stats),
        Commands::Decode { text, file, stats, lenient } => {
            cmd_decode(&app, text, file, stats, lenient)
        }
        Commands::Codebook { json } => cmd_codebook(&app, json),
        Commands::Keys { keystrokes, parallel, decode } => {
            cmd_keys(&app, &keystrokes, parallel, decode)
        }
        Commands::Draft { command } => cmd_draft(&app, command),
    }
}

/// Text from the argument, a file, or stdin, in that order
fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(file) = file {
        return std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    // a piped file usually ends with a newline that is not part of the text
    if buf.ends_with('\n') {
        buf.pop();
    }
    Ok(buf)
}

fn print_result(result: &Transcoded, stats: bool) {
    println!("{}", result.output);
    if stats {
        eprintln!("{}", result.stats());
    }
}

fn cmd_encode(app: &App, text: Option<String>, file: Option<PathBuf>, stats: bool) -> Result<()> {
    let text = read_input(text, file)?;
    print_result(&app.codec().encode(&text), stats);
    Ok(())
}

fn cmd_decode(
    app: &App,
    text: Option<String>,
    file: Option<PathBuf>,
    stats: bool,
    lenient: bool,
) -> Result<()> {
    let text = read_input(text, file)?;
    let mut config = app.config.codec;
    if lenient {
        config = CodecConfig {
            residue: ResiduePolicy::PassThrough,
        };
    }
    let codec = MatrixCodec::with_config(&app.codebook, config);

    match codec.try_decode(&text) {
        Ok(result) => print_result(&result, stats),
        Err(e) => {
            tracing::warn!("Input rejected: {}", e);
            print_result(&codec.decode(&text), stats);
        }
    }
    Ok(())
}

fn cmd_codebook(app: &App, json: bool) -> Result<()> {
    if json {
        let table = app.codebook.to_table();
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("\n  CODEBOOK ({} entries)", app.codebook.len());
    println!("  ====================\n");
    for (symbol, sequence) in app.codebook.entries() {
        let label = match symbol {
            '\n' => "\\n".to_string(),
            c => c.to_string(),
        };
        println!("    {:>3}  {}", label, sequence);
    }

    println!("\n  KEYS");
    println!("  ====\n");
    for glyph in app.codebook.alphabet() {
        let keys: String = keys_for_glyph(glyph).into_iter().collect();
        println!("    {} {:<7} {}", glyph, glyph.name(), keys.to_uppercase());
    }
    println!();
    Ok(())
}

fn cmd_keys(app: &App, keystrokes: &str, parallel: bool, decode: bool) -> Result<()> {
    let codec = app.codec();
    let mut session = Session::new(Mode::Decode);
    if parallel {
        session.set_input_mode(InputMode::Parallel, &codec);
    }

    let mut skipped = 0;
    for key in keystrokes.chars() {
        if !session.press_key(key, &codec)? {
            skipped += 1;
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "keys without a glyph ignored");
    }

    if parallel {
        let [left, right] = session.channels();
        println!("{}", left);
        println!("{}", right);
    } else {
        println!("{}", session.input());
    }
    if decode {
        println!("{}", session.output());
    }
    Ok(())
}

fn cmd_draft(app: &App, command: DraftCommands) -> Result<()> {
    let codec = app.codec();
    let store = app.drafts();

    match command {
        DraftCommands::Show { mode } => {
            let session = Session::with_store(mode.into(), store, &codec)
                .context("Failed to read drafts")?;
            if session.input().is_empty() {
                println!("  (no {} draft)", Mode::from(mode).key());
            } else {
                println!("{}", session.input());
                println!("{}", session.output());
            }
        }
        DraftCommands::Save { mode, text } => {
            let text = read_input(text, None)?;
            let mut session = Session::with_store(mode.into(), store, &codec)
                .context("Failed to read drafts")?;
            session.set_input(&text, &codec).context("Failed to save draft")?;
            println!("{}", session.output());
        }
        DraftCommands::Clear { mode } => {
            let mut session = Session::with_store(mode.into(), store, &codec)
                .context("Failed to read drafts")?;
            session.reset().context("Failed to clear draft")?;
        }
    }
    Ok(())
}
