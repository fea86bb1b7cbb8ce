//! # spinsight
//!
//! spinsight reads the textual artifacts left behind by the
//! [SPIN](https://spinroot.com/) model checker and turns them into structured data:
//!
//! - the verification log written by a `pan` verifier,
//!   giving statistics, enabled checks and the reported failures;
//! - the execution trail of a counterexample;
//! - the transcript of a simulated run,
//!   giving the per-process actions and the message-sequence chart of the run.
//!
//! When an assertion fails, the transcript lines relevant to the failed condition
//! are extracted as a coarse causal slice.

mod config;
mod export;
mod input;
mod report;

use std::path::{Path, PathBuf};

use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use config::{RunConfig, parse_pair};
use input::read_text;
use log::info;
use report::{Analysis, Explanation};
use spinsight_core::{ActionEvent, AnnotatedTransition, ModelSource, spawn_depths};
use spinsight_pan::PanLog;
use spinsight_sim::{extract_block, parse_trail, parse_trail_listing, parse_transcript};

/// Inputs of a complete analysis.
#[derive(Debug, Clone, Args)]
#[deny(missing_docs)]
struct AnalyzeArgs {
    /// Path of the verification log (pan output).
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    log: Option<PathBuf>,
    /// Path of the trail file.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    trail: Option<PathBuf>,
    /// Path of the simulation transcript.
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    transcript: Option<PathBuf>,
    /// Path of the model source, to show the source line of each trail transition.
    #[arg(long, requires = "trail", value_hint = clap::ValueHint::FilePath)]
    model: Option<PathBuf>,
    /// Print the JSON-serialized analysis.
    #[arg(long)]
    json: bool,
}

/// spinsight's available commands.
#[deny(missing_docs)]
#[derive(Subcommand)]
enum Commands {
    /// Report statistics, checks, error lines and verdict of a verification log.
    ///
    /// EXAMPLE: spinsight stats pan.out
    #[clap(verbatim_doc_comment)]
    Stats {
        /// Path of the verification log (pan output).
        #[arg(value_hint = clap::ValueHint::FilePath)]
        log: PathBuf,
        /// Print the JSON-serialized report.
        #[arg(long)]
        json: bool,
    },
    /// List the transitions of a trail.
    ///
    /// EXAMPLE: spinsight trail model.pml.trail --csv trail.csv
    /// EXAMPLE: spinsight trail model.pml.trail --model model.pml
    /// EXAMPLE: spinsight trail guided.txt --listing
    #[clap(verbatim_doc_comment)]
    Trail {
        /// Path of the trail file.
        #[arg(value_hint = clap::ValueHint::FilePath)]
        trail: PathBuf,
        /// Read a guided-simulation listing (`proc N (name):line L "action"`)
        /// instead of a raw `step:process:line` trail.
        #[arg(long)]
        listing: bool,
        /// Path of the model source, to show the source line of each transition.
        #[arg(long, conflicts_with = "listing", value_hint = clap::ValueHint::FilePath)]
        model: Option<PathBuf>,
        /// Also write the transitions to the given CSV file.
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        csv: Option<PathBuf>,
        /// Print the JSON-serialized report.
        #[arg(long)]
        json: bool,
    },
    /// Build the message-sequence chart of a simulation transcript.
    ///
    /// EXAMPLE: spinsight msc sim.txt --csv msc.csv
    #[clap(verbatim_doc_comment)]
    Msc {
        /// Path of the simulation transcript.
        #[arg(value_hint = clap::ValueHint::FilePath)]
        transcript: PathBuf,
        /// Also write one row per event to the given CSV file.
        #[arg(long, value_hint = clap::ValueHint::FilePath)]
        csv: Option<PathBuf>,
        /// Print the JSON-serialized report.
        #[arg(long)]
        json: bool,
    },
    /// Explain the failures of a verification log using a simulation transcript.
    ///
    /// EXAMPLE: spinsight explain pan.out sim.txt
    #[clap(verbatim_doc_comment)]
    Explain {
        /// Path of the verification log (pan output).
        #[arg(value_hint = clap::ValueHint::FilePath)]
        log: PathBuf,
        /// Path of the simulation transcript.
        #[arg(value_hint = clap::ValueHint::FilePath)]
        transcript: PathBuf,
        /// Print the JSON-serialized report.
        #[arg(long)]
        json: bool,
    },
    /// Analyze any combination of log, trail and transcript at once.
    ///
    /// EXAMPLE: spinsight analyze --log pan.out --trail model.pml.trail --transcript sim.txt --json
    #[clap(verbatim_doc_comment)]
    Analyze(AnalyzeArgs),
}

/// Structured analysis of SPIN verification runs.
///
/// spinsight parses the verification log, trail and simulation transcript
/// produced by the SPIN model checker,
/// and reports statistics, failures with their explanation,
/// and the message-sequence chart of the simulated run.
#[derive(Parser)]
#[deny(missing_docs)]
#[command(version, about, long_about)]
pub struct Cli {
    /// JSON run configuration with channel aliases, seed equivalences and ordinal templates.
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,
    /// Rename channel NAME to TARGET before matching communications (repeatable).
    #[arg(long = "alias", global = true, value_name = "NAME=TARGET", value_parser = parse_pair)]
    aliases: Vec<(String, String)>,
    /// Consider channels A and B the same before matching communications (repeatable).
    #[arg(long = "equiv", global = true, value_name = "A=B", value_parser = parse_pair)]
    equivalences: Vec<(String, String)>,
    /// Verbose output
    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity,
    /// Action to execute.
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Executes the requested command.
    pub fn run(self) -> anyhow::Result<()> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        config.extend(self.aliases, self.equivalences);

        match self.command {
            Commands::Stats { log, json } => {
                let mut analysis = Analysis::default();
                add_log(&mut analysis, &log)?;
                analysis.print(json)
            }
            Commands::Trail {
                trail,
                listing,
                model,
                csv,
                json,
            } => {
                let mut analysis = Analysis::default();
                let text = read_text(&trail)?;
                if listing {
                    let steps = parse_trail_listing(&text);
                    if let Some(path) = &csv {
                        export::listing_to_file(path, &steps)?;
                    }
                    analysis.listing = Some(steps);
                } else {
                    let transitions = read_trail(&text, model.as_deref())?;
                    if let Some(path) = &csv {
                        export::transitions_to_file(path, &transitions)?;
                    }
                    analysis.transitions = Some(transitions);
                }
                analysis.print(json)
            }
            Commands::Msc {
                transcript,
                csv,
                json,
            } => {
                let mut analysis = Analysis::default();
                add_transcript(&mut analysis, &transcript, &config)?;
                if let (Some(path), Some(events), Some(chart)) =
                    (&csv, &analysis.events, &analysis.chart)
                {
                    export::chart_to_file(path, events, chart)?;
                }
                analysis.print(json)
            }
            Commands::Explain {
                log,
                transcript,
                json,
            } => {
                let args = AnalyzeArgs {
                    log: Some(log),
                    trail: None,
                    transcript: Some(transcript),
                    model: None,
                    json,
                };
                analyze(&args, &config)?.print(json)
            }
            Commands::Analyze(args) => analyze(&args, &config)?.print(args.json),
        }
    }
}

fn add_log(analysis: &mut Analysis, path: &Path) -> anyhow::Result<()> {
    let log = PanLog::parse(&read_text(path)?);
    analysis.statistics = Some(log.statistics);
    analysis.error_lines = log.error_lines;
    analysis.verdict = Some(log.verdict);
    Ok(())
}

/// Transitions of a raw trail, annotated with their source lines if `model` is given.
fn read_trail(text: &str, model: Option<&Path>) -> anyhow::Result<Vec<AnnotatedTransition>> {
    let transitions = parse_trail(text);
    Ok(match model {
        Some(path) => ModelSource::new(&read_text(path)?).annotate(&transitions),
        None => transitions.into_iter().map(AnnotatedTransition::from).collect(),
    })
}

fn add_transcript(
    analysis: &mut Analysis,
    path: &Path,
    config: &RunConfig,
) -> anyhow::Result<String> {
    let text = read_text(path)?;
    let events: Vec<ActionEvent> = parse_transcript(&text, &config.sim_config())?;
    analysis.spawn_depths = spawn_depths(&events);
    analysis.chart = Some(config.matcher().build(&events));
    analysis.events = Some(events);
    Ok(text)
}

fn analyze(args: &AnalyzeArgs, config: &RunConfig) -> anyhow::Result<Analysis> {
    if args.log.is_none() && args.trail.is_none() && args.transcript.is_none() {
        bail!("nothing to analyze.\n\nHint: pass at least one of --log, --trail or --transcript");
    }
    let time = std::time::Instant::now();
    let mut analysis = Analysis::default();
    if let Some(path) = &args.log {
        add_log(&mut analysis, path)?;
    }
    if let Some(path) = &args.trail {
        analysis.transitions = Some(read_trail(&read_text(path)?, args.model.as_deref())?);
    }
    let transcript = match &args.transcript {
        Some(path) => Some(add_transcript(&mut analysis, path, config)?),
        None => None,
    };
    // The transcript block is known to exist once the events have been parsed.
    let block = transcript.as_deref().map(extract_block).transpose()?;
    if let Some(verdict) = &analysis.verdict {
        analysis.explanations = verdict
            .failures()
            .iter()
            .cloned()
            .map(|failure| Explanation::new(failure, block.as_deref()))
            .collect();
    }
    info!("analysis completed in {:?}", time.elapsed());
    Ok(analysis)
}

// From Clap tutorial <https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing>
#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
