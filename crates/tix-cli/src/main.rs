//! tix - command line driver
//!
//! Runs selector synthesis and tab ordering against an HTML file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tix_core::{EngineConfig, SelectorSynthesizer, StabilityClassifier, TabOrderApplier, Verdict};
use tix_css::ElementQuery;
use tix_dom::Document;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tix", version, about = "Durable selectors and reversible tab order")]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Synthesize a selector for the first element matching --target
    Synthesize {
        file: PathBuf,
        #[arg(long)]
        target: String,
        /// Document URL used for the parsed page
        #[arg(long, default_value = "about:blank")]
        url: String,
    },
    /// Apply an ordered selector list and report the tab indices
    Apply {
        file: PathBuf,
        #[arg(long = "selector", required = true)]
        selectors: Vec<String>,
        /// Restore afterwards and verify the page is unchanged
        #[arg(long)]
        restore: bool,
    },
    /// Classify id/class tokens
    Check {
        #[arg(required = true)]
        tokens: Vec<String>,
        /// Treat tokens as element ids
        #[arg(long)]
        id: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Synthesize { file, target, url } => synthesize(config, &file, &target, &url),
        Command::Apply {
            file,
            selectors,
            restore,
        } => apply(config, &file, &selectors, restore),
        Command::Check { tokens, id } => Ok(if check(&tokens, id) == 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
    }
}

fn load(file: &Path, url: &str) -> Result<Document> {
    let html = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    Ok(tix_html::parse_with_url(&html, url))
}

fn synthesize(config: EngineConfig, file: &Path, target: &str, url: &str) -> Result<ExitCode> {
    let doc = load(file, url)?;
    let tree = doc.tree();
    let Some(node) = tree
        .query_selector(tree.root(), target)
        .with_context(|| format!("invalid --target {target:?}"))?
    else {
        bail!("no element matches {target:?}");
    };

    let synth = SelectorSynthesizer::new(config);
    match synth.synthesize_with_tier(&doc, node) {
        Some(found) => {
            println!("{}", found.selector);
            tracing::info!("{} tier", found.tier);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("no reliable selector");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn apply(config: EngineConfig, file: &Path, selectors: &[String], restore: bool) -> Result<ExitCode> {
    let mut doc = load(file, "about:blank")?;
    let before = tix_html::outer_html(doc.tree(), doc.tree().root());

    let mut applier = TabOrderApplier::new(&config);
    let report = applier.apply_with_report(&mut doc, selectors);
    for (selector, err) in &report.skipped {
        println!("skipped {selector:?}: {err}");
    }

    let tree = doc.tree();
    for (node, entry) in applier.record().iter() {
        let Some(ordinal) = entry.ordinal else { continue };
        println!(
            "{:>3}  <{}> (was {})",
            ordinal,
            tree.tag_name(node).unwrap_or("?"),
            entry.original.as_deref().unwrap_or("absent"),
        );
    }
    println!("applied: {} (normalized {})", report.applied, report.normalized);

    if restore {
        applier.restore(&mut doc);
        let after = tix_html::outer_html(doc.tree(), doc.tree().root());
        if after != before {
            bail!("restore did not reproduce the original document");
        }
        println!("restored: document identical");
    }

    Ok(if report.applied > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Prints a verdict per token and returns the number of unstable ones
fn check(tokens: &[String], as_id: bool) -> usize {
    let classifier = StabilityClassifier::new();
    let mut unstable = 0;
    for token in tokens {
        let verdict = if as_id {
            classifier.classify_id(token)
        } else {
            classifier.classify(token)
        };
        match verdict {
            Verdict::Stable => println!("{token}: stable"),
            Verdict::Unstable(reason) => {
                unstable += 1;
                println!("{token}: unstable ({reason})");
            }
        }
    }
    unstable
}
