//! Churn Explainer - Main Entry Point
//!
//! Usage: churn-explainer <customer-index> [--email <recipient>]
//!
//! Loads the encoded dataset, trains the churn model, explains the
//! requested customer, then logs the result, writes a report artifact,
//! and optionally emails it.

mod logic;
pub mod constants;

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use logic::config::AppConfig;
use logic::mailer::{ReportMailer, SmtpMailer};
use logic::model::{GbdtClassifier, GbdtParams};
use logic::narrative::NarrativeGenerator;
use logic::pipeline::ExplanationPipeline;
use logic::report::{ExplanationLog, ReportWriter};
use logic::store::FeatureStore;

struct CliArgs {
    customer_index: usize,
    email_recipient: Option<String>,
}

fn parse_args() -> Result<CliArgs> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut customer_index = None;
    let mut email_recipient = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--email" {
            match iter.next() {
                Some(recipient) => email_recipient = Some(recipient.clone()),
                None => bail!("--email requires a recipient address"),
            }
        } else if customer_index.is_none() {
            customer_index = Some(
                arg.parse()
                    .with_context(|| format!("invalid customer index '{arg}'"))?,
            );
        } else {
            bail!("unexpected argument '{arg}'");
        }
    }

    match customer_index {
        Some(customer_index) => Ok(CliArgs {
            customer_index,
            email_recipient,
        }),
        None => bail!("usage: churn-explainer <customer-index> [--email <recipient>]"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let default_level = if constants::is_debug_enabled() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::info!(
        "Starting {} v{}",
        constants::APP_NAME,
        constants::APP_VERSION
    );

    let args = parse_args()?;
    let config = AppConfig::from_env();

    let store = Arc::new(
        FeatureStore::load(&config.dataset_path, &config.label_column).with_context(|| {
            format!("failed to load dataset {}", config.dataset_path.display())
        })?,
    );
    log::info!(
        "Dataset: {} customers, {} features",
        store.len(),
        store.schema().len()
    );

    let model = Arc::new(GbdtClassifier::fit(
        store.matrix(),
        store.labels(),
        store.schema().hash(),
        GbdtParams::default(),
        constants::SPLIT_SEED,
    )?);

    let generator = NarrativeGenerator::new(config.chat.clone());
    let pipeline = ExplanationPipeline::new(store, model, generator, config.top_n)?;

    let explanation = pipeline.explain(args.customer_index).await?;

    println!(
        "Customer {}: churn probability {:.2}",
        explanation.customer_index, explanation.risk_score
    );
    println!("\n{}", explanation.text());
    if !explanation.attributions.is_empty() {
        println!("\nTop contributing features:");
        for attribution in &explanation.attributions {
            println!("- {}: {:.3}", attribution.feature, attribution.value);
        }
    }

    let explanation_log = ExplanationLog::open(&config.log_dir)
        .with_context(|| format!("failed to open log dir {}", config.log_dir.display()))?;
    explanation_log.append(&explanation)?;

    let writer = ReportWriter::new(&config.report_dir)
        .with_context(|| format!("failed to create report dir {}", config.report_dir.display()))?;
    let report_path = writer.write(&explanation)?;

    if let Some(recipient) = args.email_recipient {
        match config.email {
            Some(email_config) => {
                let mailer = SmtpMailer::new(email_config);
                if let Err(e) = mailer.send_report(&recipient, &report_path) {
                    log::error!("Failed to email report: {}", e);
                }
            }
            None => {
                log::error!(
                    "Email requested but EMAIL_ADDRESS/EMAIL_PASSWORD are not configured"
                );
            }
        }
    }

    Ok(())
}
