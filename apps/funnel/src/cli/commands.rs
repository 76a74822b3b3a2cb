//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::runner::{Runner, VisitReport};
use crate::tracking::AnalyticsMode;
use funnel_core::{
    ElementRef, FunnelConfig, FunnelError, MemoryPage, QuizEngine, QuizStep, Timeline,
    resolve_redirect,
};

// =============================================================================
// REDIRECT COMMAND
// =============================================================================

/// Print the redirect URL for a landing page URL.
pub fn cmd_redirect(config: &FunnelConfig, url: &str, json_mode: bool) -> Result<(), FunnelError> {
    let (redirect, error) =
        resolve_redirect(&config.destination_url, url, &config.allowed_params);
    if let Some(e) = &error {
        tracing::warn!("Falling back to bare destination: {}", e);
    }

    if json_mode {
        let output = serde_json::json!({
            "source": url,
            "redirect": redirect,
            "fallback": error.map(|e| e.to_string()),
        });
        print_json(&output)?;
        return Ok(());
    }

    println!("{}", redirect);
    Ok(())
}

// =============================================================================
// SIMULATE COMMAND
// =============================================================================

/// Inputs for a simulated visit.
#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub url: String,
    pub answers: Vec<(QuizStep, String)>,
    pub without: Vec<ElementRef>,
    pub analytics: AnalyticsMode,
    pub instant: bool,
}

/// Run a visit against an in-memory page and print where it ended up.
pub async fn cmd_simulate(
    config: FunnelConfig,
    options: SimulateOptions,
    json_mode: bool,
) -> Result<(), FunnelError> {
    let report = run_simulation(config, &options, json_mode).await;

    if json_mode {
        print_json(&report)?;
        return Ok(());
    }

    println!("Funnel Visit");
    println!("============");
    println!("Landing:     {}", options.url);
    println!("Final stage: {}", report.stage);
    match &report.navigated_to {
        Some(url) => println!("Redirect:    {}", url),
        None => println!("Redirect:    (none)"),
    }
    println!("Elapsed:     {} ms", report.elapsed_ms);
    if !report.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &report.issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}

/// Run a visit and return its report without printing anything.
///
/// `json_mode` keeps JSON tracking events off stdout.
pub async fn run_simulation(
    config: FunnelConfig,
    options: &SimulateOptions,
    json_mode: bool,
) -> VisitReport {
    let (page, controls) = build_page(options);
    let engine = QuizEngine::new(config, options.analytics.tracker(json_mode));

    tracing::info!(
        "Simulating {} answer(s) on {} ({} clock)",
        options.answers.len(),
        options.url,
        if options.instant { "virtual" } else { "real" }
    );

    if options.instant {
        simulate_instant(engine, page, &options.answers, &controls)
    } else {
        simulate_realtime(engine, page, &options.answers, &controls).await
    }
}

/// The quiz page with one option button per answer, minus removed elements.
fn build_page(options: &SimulateOptions) -> (MemoryPage, Vec<ElementRef>) {
    let mut page = MemoryPage::quiz_layout(options.url.as_str());
    let controls = options
        .answers
        .iter()
        .map(|(step, answer)| page.add_option(step.answer_label(answer)))
        .collect();
    for element in &options.without {
        page.remove(element);
    }
    (page, controls)
}

async fn simulate_realtime(
    engine: QuizEngine,
    page: MemoryPage,
    answers: &[(QuizStep, String)],
    controls: &[ElementRef],
) -> VisitReport {
    let mut runner = Runner::new(engine, page);
    runner.start();

    for ((step, answer), control) in answers.iter().zip(controls) {
        if runner.answer(*step, answer, Some(control)).await.is_err() {
            break;
        }
    }

    runner.report()
}

fn simulate_instant(
    engine: QuizEngine,
    page: MemoryPage,
    answers: &[(QuizStep, String)],
    controls: &[ElementRef],
) -> VisitReport {
    let mut timeline = Timeline::new(engine, page);
    let mut issues: Vec<String> = timeline
        .start()
        .degraded
        .iter()
        .map(|e| e.to_string())
        .collect();

    for ((step, answer), control) in answers.iter().zip(controls) {
        match timeline.answer(*step, answer, Some(control)) {
            Ok(outcome) => issues.extend(outcome.degraded.iter().map(|e| e.to_string())),
            Err(e) => {
                tracing::warn!("Answer {}={} ignored: {}", step, answer, e);
                issues.push(e.to_string());
                break;
            }
        }
        timeline.flush();
    }

    for entry in timeline.entries() {
        issues.extend(entry.degraded.iter().map(|e| e.to_string()));
        if let Err(e) = &entry.result {
            tracing::error!("Transition {:?} abandoned: {}", entry.action, e);
            issues.push(e.to_string());
        }
    }

    VisitReport {
        stage: timeline.stage(),
        navigated_to: timeline.page().last_navigation().map(str::to_string),
        elapsed_ms: timeline.now_ms(),
        issues,
    }
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &FunnelConfig, json_mode: bool) -> Result<(), FunnelError> {
    if json_mode {
        return print_json(config);
    }

    let rendered =
        toml::to_string_pretty(config).map_err(|e| FunnelError::SerializationError(e.to_string()))?;
    print!("{}", rendered);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), FunnelError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| FunnelError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}
