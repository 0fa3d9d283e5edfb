use std::fs;
use std::path::Path;

use clap::Parser;
use tracing::{debug, info};

use portion_optimizer_rs::catalog::{load_catalog, FoodCatalog};
use portion_optimizer_rs::cli::{Cli, Command};
use portion_optimizer_rs::error::Result;
use portion_optimizer_rs::interface::{
    collect_request, display_failure, display_portions, display_search_results, prompt_yes_no,
};
use portion_optimizer_rs::models::{PortionRequest, PortionResponse};
use portion_optimizer_rs::optimizer::{calculate_portions, AugmentedLagrangianSolver, OptimizerConfig};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => OptimizerConfig::load(path)?,
        None => OptimizerConfig::default(),
    };
    debug!(?config, "optimizer configuration");

    match &cli.command {
        Command::Solve { request, json } => cmd_solve(&cli, &config, request, *json),
        Command::Interactive => cmd_interactive(&cli, &config),
        Command::Search { query, limit } => cmd_search(&cli, query, *limit),
    }
}

/// Load the shared catalog and layer user overrides on top.
fn open_catalog(cli: &Cli) -> Result<Option<FoodCatalog>> {
    if !cli.catalog.exists() {
        eprintln!("Food catalog not found: {}", cli.catalog.display());
        eprintln!("Pass --catalog with a JSON or CSV food file.");
        return Ok(None);
    }

    let mut catalog = FoodCatalog::new(load_catalog(&cli.catalog)?);
    if let Some(path) = &cli.user_foods {
        catalog = catalog.with_overrides(load_catalog(path)?);
    }

    info!(foods = catalog.len(), "catalog loaded");
    Ok(Some(catalog))
}

/// Solve a request read from a JSON file.
fn cmd_solve(cli: &Cli, config: &OptimizerConfig, request_path: &Path, json: bool) -> Result<()> {
    let Some(catalog) = open_catalog(cli)? else {
        return Ok(());
    };

    let content = fs::read_to_string(request_path)?;
    let request: PortionRequest = serde_json::from_str(&content)?;

    let solver = AugmentedLagrangianSolver::new(config.solver.clone());
    let result = calculate_portions(&request, &catalog, &solver, config);

    if json {
        let response = PortionResponse::from_result(&result);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match result {
        Ok(portions) => display_portions(&portions, cli.weight),
        Err(e) => display_failure(&e),
    }
    Ok(())
}

/// Collect a request through prompts and solve it, optionally retrying with
/// different inputs.
fn cmd_interactive(cli: &Cli, config: &OptimizerConfig) -> Result<()> {
    let Some(catalog) = open_catalog(cli)? else {
        return Ok(());
    };

    if catalog.is_empty() {
        println!("The food catalog is empty.");
        return Ok(());
    }

    println!("Loaded {} foods", catalog.len());
    println!();

    let solver = AugmentedLagrangianSolver::new(config.solver.clone());

    loop {
        let request = collect_request(&catalog, config.default_tolerance)?;

        match calculate_portions(&request, &catalog, &solver, config) {
            Ok(portions) => display_portions(&portions, cli.weight),
            Err(e) => display_failure(&e),
        }

        if !prompt_yes_no("Calculate another?", false)? {
            break;
        }
    }

    Ok(())
}

/// List catalog codes matching a query.
fn cmd_search(cli: &Cli, query: &str, limit: usize) -> Result<()> {
    let Some(catalog) = open_catalog(cli)? else {
        return Ok(());
    };

    let results = catalog.search(query, limit);
    display_search_results(&results, query);
    Ok(())
}
