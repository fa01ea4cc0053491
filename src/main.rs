//! report-enhancer - CLI entry point
//!
//! Usage: `report-enhancer <report> [transcript] [reference-doc...]`
//!
//! Reads the report (and optional transcript and reference documents) from
//! disk, runs one enhancement, and prints the resulting report to stdout.

use std::sync::Arc;

use anyhow::Context;
use report_enhancer::{
    agents::EnhancementContext, config::Config, llm::ReferenceDocument, OpenRouterClient,
    Orchestrator,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "report_enhancer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let report_path = args
        .next()
        .context("usage: report-enhancer <report> [transcript] [reference-doc...]")?;
    let transcript_path = args.next();
    let document_paths: Vec<String> = args.collect();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, max_tasks={}",
        config.model, config.max_tasks
    );

    let report = tokio::fs::read_to_string(&report_path)
        .await
        .with_context(|| format!("reading report {}", report_path))?;
    let transcript = match &transcript_path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading transcript {}", path))?,
        None => String::new(),
    };
    let mut documents = Vec::with_capacity(document_paths.len());
    for path in &document_paths {
        let document = ReferenceDocument::from_path(path)
            .await
            .with_context(|| format!("reading reference document {}", path))?;
        documents.push(document);
    }

    let mut client =
        OpenRouterClient::new(config.api_key.clone()).with_timeout(config.request_timeout);
    if let Some(api_url) = &config.api_url {
        client = client.with_api_url(api_url.clone());
    }
    let ctx = EnhancementContext::new(&config, Arc::new(client));

    let outcome = Orchestrator::new(ctx)
        .enhance(&report, &transcript, &documents)
        .await?;
    info!(
        "Run {} finished: {:?}, {} replacements applied",
        outcome.run_id,
        outcome.completion,
        outcome.applied()
    );

    println!("{}", outcome.report);
    Ok(())
}
