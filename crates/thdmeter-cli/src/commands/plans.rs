//! Test plan management commands.

use clap::{Args, Subcommand};
use std::path::PathBuf;
use thdmeter_config::paths::{
    ensure_user_plans_dir, list_user_plans, plan_name_from_path, user_config_dir, user_plans_dir,
};
use thdmeter_config::{ClipConfig, TestPlan};

#[derive(Args, Debug)]
pub struct PlansArgs {
    #[command(subcommand)]
    command: PlansCommand,
}

#[derive(Subcommand, Debug)]
enum PlansCommand {
    /// List plans in the user plans directory
    List,

    /// Write a starter plan
    Init {
        /// Name for the new plan
        name: String,

        /// Write to this path instead of the user plans directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite if the plan already exists
        #[arg(long)]
        force: bool,
    },

    /// Show plan directories
    Paths,
}

/// Run the plans command.
pub fn run(args: PlansArgs) -> anyhow::Result<()> {
    match args.command {
        PlansCommand::List => list(),
        PlansCommand::Init {
            name,
            output,
            force,
        } => init(&name, output, force),
        PlansCommand::Paths => {
            println!("Config directory: {}", user_config_dir().display());
            println!("Plans directory:  {}", user_plans_dir().display());
            Ok(())
        }
    }
}

fn list() -> anyhow::Result<()> {
    let plans = list_user_plans();
    if plans.is_empty() {
        println!("No plans in {}", user_plans_dir().display());
        println!("Create one with: thdmeter plans init <NAME>");
        return Ok(());
    }

    println!("Test Plans:");
    for path in plans {
        let name = plan_name_from_path(&path).unwrap_or_default();
        match TestPlan::load(&path) {
            Ok(plan) => {
                let desc = plan.description.as_deref().unwrap_or("");
                println!("  {:<20} {:>3} clip(s)  {}", name, plan.clips.len(), desc);
            }
            Err(e) => println!("  {:<20} (unreadable: {})", name, e),
        }
    }

    Ok(())
}

fn init(name: &str, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = match output {
        Some(path) => path,
        None => ensure_user_plans_dir()?.join(format!("{name}.toml")),
    };

    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    let plan = TestPlan::new(name)
        .with_description("Loopback THD checks")
        .with_clip(ClipConfig::new("capture_1k.wav", 1000.0).with_label("1 kHz"));
    plan.save(&path)?;

    println!("Wrote plan to {}", path.display());
    Ok(())
}
