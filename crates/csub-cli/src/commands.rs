use std::fs;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use csub_naming::{decode, MergePolicy, NamingStore};
use tracing::{debug, info};

use crate::cli::*;
use crate::plan::MergePlan;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args),
        Command::Get(args) => cmd_get(args),
        Command::List(args) => cmd_list(args, cli.format),
    }
}

/// Read a persisted naming table.
fn load_store(path: &Path) -> anyhow::Result<NamingStore> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    decode(&text).with_context(|| format!("decoding {}", path.display()))
}

/// Combine a plan with command-line arguments. Flags win over plan fields;
/// positional sources are merged after the plan's sources.
fn resolve_plan(args: &MergeArgs) -> anyhow::Result<MergePlan> {
    let mut plan = match &args.plan {
        Some(path) => MergePlan::load(path)?,
        None => MergePlan::default(),
    };
    plan.sources.extend(args.sources.iter().cloned());
    if args.overwrite {
        plan.policy = MergePolicy::Overwrite;
    }
    if args.output.is_some() {
        plan.output = args.output.clone();
    }
    Ok(plan)
}

/// Merge every plan source, then the plan's literal values, then the
/// command-line assignments. The last two always overwrite.
pub fn build_store(plan: &MergePlan, assignments: &[(String, String)]) -> anyhow::Result<NamingStore> {
    let mut store = NamingStore::new();
    for source in &plan.sources {
        let incoming = load_store(source)?;
        let unique = store.merge_all(plan.policy, incoming.iter());
        if !unique {
            info!(source = %source.display(), policy = ?plan.policy, "source repeats existing names");
        }
        debug!(source = %source.display(), names = incoming.len(), "merged source");
    }

    store.insert_all(plan.literal_values());
    store.insert_all(assignments.iter().map(|(name, value)| (name, value)));
    Ok(store)
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let plan = resolve_plan(&args)?;
    let store = build_store(&plan, &args.set)?;
    let text = store.to_json()?;

    match &plan.output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            println!(
                "{} Wrote {} names to {}",
                "✓".green().bold(),
                store.len(),
                path.display().to_string().bold()
            );
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let store = load_store(&args.file)?;
    let value = store.get(&args.name)?;
    println!("{value}");
    Ok(())
}

fn cmd_list(args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = load_store(&args.file)?;
    match format {
        OutputFormat::Json => println!("{}", store.to_json()?),
        OutputFormat::Text => {
            if store.is_empty() {
                println!("No names.");
            }
            for (name, value) in store.iter() {
                println!("{} = {}", name.bold(), value);
            }
        }
    }
    Ok(())
}
