use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use spendlens_ingest::LineMode;
use spendlens_narrative::{
    COMBINED_LABEL, ChatCompletionsClient, NarrativeError, NarrativeGenerator, render_failure,
};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

mod config;
mod logging;
mod render;
mod session;
mod state;

use config::Config;
use session::{ChartMode, NO_VALID_DOCUMENTS, Session};

type Generator = NarrativeGenerator<ChatCompletionsClient>;

#[derive(Parser, Debug)]
#[command(name = "spendlens", version, about = "Credit card statement expense analyzer")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one or more statements: breakdown, summary, chart and Q&A
    Analyze(AnalyzeArgs),

    /// Print the text extracted from a document
    Extract {
        file: PathBuf,

        /// Collapse line breaks into single spaces
        #[arg(long)]
        flatten: bool,
    },

    /// Summarize one document straight from its extracted text
    Summarize { file: PathBuf },

    /// Manage ~/.spendlens/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Print the active keyword tables as TOML
    Keywords,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Statements (png, jpg, jpeg, pdf, docx, txt)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Chart layout when several statements are valid
    #[arg(long, value_enum, default_value_t = ChartMode::Combined)]
    chart: ChartMode,

    /// Ask one question about the spending
    #[arg(long, conflicts_with = "no_summary")]
    question: Option<String>,

    /// Keep asking questions from stdin until a blank line
    #[arg(long, conflicts_with_all = ["no_summary", "json"])]
    interactive: bool,

    /// Also summarize each statement on its own
    #[arg(long, conflicts_with = "no_summary")]
    per_document: bool,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Write per-document totals to a CSV file
    #[arg(long)]
    csv_out: Option<PathBuf>,

    /// Skip the language-model summary
    #[arg(long)]
    no_summary: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();
    logging::init_logging(cli.verbose)?;

    match cli.command {
        Command::Analyze(args) => analyze(args)?,

        Command::Extract { file, flatten } => {
            let cfg = config::load_config()?;
            let mut extractor = cfg.text_extractor();
            if flatten {
                extractor = extractor.with_line_mode(LineMode::Flatten);
            }
            let text = extractor
                .try_extract(&file)
                .with_context(|| format!("extracting {}", file.display()))?;
            println!("{text}");
        }

        Command::Summarize { file } => {
            let cfg = config::load_config()?;
            let text = cfg.text_extractor().extract(&file);
            if text.is_empty() {
                bail!("No text could be extracted from {}", file.display());
            }
            let generator = narrative_generator(&cfg)?;
            match generator.summarize_from_text(text.as_str()) {
                Ok(summary) => println!("{summary}"),
                Err(e) => println!("{}", render_failure("Failed to generate summary", &e)),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
            ConfigCommand::Path => println!("{}", config::config_path()?.display()),
        },

        Command::Keywords => {
            let tables = config::load_config()?.keyword_tables()?;
            print!("{}", tables.to_toml_string()?);
        }
    }

    Ok(())
}

fn narrative_generator(cfg: &Config) -> Result<Generator, NarrativeError> {
    let client = ChatCompletionsClient::new(cfg.llm_config()?)?;
    Ok(NarrativeGenerator::new(client).with_max_text_chars(cfg.llm.max_text_chars))
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let tables = cfg.keyword_tables()?;
    let mut session = Session::new(cfg.text_extractor(), &tables);

    for file in &args.files {
        if let Err(skipped) = session.add_file(file) {
            eprintln!("{}", skipped.message());
        }
    }

    if session.is_empty() {
        println!("{NO_VALID_DOCUMENTS}");
        return Ok(());
    }

    if let Some(path) = &args.csv_out {
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        render::write_csv(f, session.labels(), session.documents(), &session.combined())?;
    }

    let mut failures = Vec::new();
    let generator = if args.no_summary {
        None
    } else {
        match narrative_generator(&cfg) {
            Ok(g) => Some(g),
            Err(e) => {
                failures.push(render_failure("Failed to generate summary", &e));
                None
            }
        }
    };

    if let Some(g) = &generator {
        if let Err(e) = session.combined_summary(g) {
            failures.push(render_failure("Failed to generate summary", &e));
        }
        if args.per_document {
            for (label, res) in session.document_summaries(g) {
                if let Err(e) = res {
                    failures.push(render_failure(&format!("Failed to summarize {label}"), &e));
                }
            }
        }
    }

    let answer = match (&generator, &args.question) {
        (Some(g), Some(q)) => Some(answer_text(&session, g, q)),
        _ => None,
    };

    let charts = session.charts(args.chart);

    if args.json {
        let report = render::Report {
            documents: session.documents(),
            combined: session.combined(),
            skipped: session.skipped(),
            charts,
            summaries: session.summaries().texts(),
            failures,
            answer,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
        return Ok(());
    }

    println!("## {COMBINED_LABEL}\n");
    match session.summaries().get(COMBINED_LABEL) {
        Some(s) => println!("{}\n", s.text),
        None if args.no_summary => println!("(summary skipped)\n"),
        None => {}
    }
    for f in &failures {
        println!("{f}\n");
    }
    if args.per_document {
        for label in session.labels() {
            if let Some(s) = session.summaries().get(label) {
                println!("### {label}\n\n{}\n", s.text);
            }
        }
    }

    println!("## Expense Breakdown\n");
    print!("{}", render::render_totals(&session.combined()));
    println!();
    for panel in &charts {
        println!("{}", render::render_panel(panel));
    }

    if let Some(a) = answer {
        println!("## Answer\n\n{a}\n");
    }

    if args.interactive {
        match &generator {
            Some(g) => ask_loop(&session, g)?,
            None => println!("Questions need a working language model connection."),
        }
    }

    Ok(())
}

fn answer_text(session: &Session, generator: &Generator, question: &str) -> String {
    session
        .answer(generator, question)
        .unwrap_or_else(|e| render_failure("Failed to answer question", &e))
}

fn ask_loop(session: &Session, generator: &Generator) -> Result<()> {
    println!("Ask a question about your spending (blank line to finish)");
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut s = String::new();
        if io::stdin().read_line(&mut s)? == 0 {
            break;
        }
        let q = s.trim();
        if q.is_empty() {
            break;
        }
        println!("{}\n", answer_text(session, generator, q));
    }
    Ok(())
}
