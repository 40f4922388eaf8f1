//! snap-cli - run the bone snapper on a rig description
//!
//! Loads a TOML rig (bones, rest pose, solver settings), solves it and prints
//! the corrected pose.

use anyhow::{Context, Result, bail};
use bone_snapper::{
    GoalContainer, Pose, Rig, RigConfig, RigSolver, Skeleton, TransformDesc, load_rig,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "snap-cli")]
#[command(about = "Bone snapper pose correction tool")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the rest pose of a rig and print the result
    Solve {
        /// Path to the rig description
        rig: PathBuf,

        /// Number of consecutive solves applied to the pose
        #[arg(short, long, default_value_t = 1)]
        frames: u32,

        /// Force in-place root handling
        #[arg(long)]
        in_place: bool,

        /// Override the root snap bone
        #[arg(long)]
        root: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Validate a rig and show depths and snap order
    Check {
        /// Path to the rig description
        rig: PathBuf,
    },
}

/// One bone of a solved pose
#[derive(Serialize)]
struct BoneReport<'a> {
    name: &'a str,
    parent: Option<&'a str>,
    local: TransformDesc,
    global: TransformDesc,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    match cli.command {
        Commands::Solve {
            rig,
            frames,
            in_place,
            root,
            json,
        } => {
            let mut config = load_config(&rig)?;
            if in_place {
                config.solver.in_place = true;
            }
            if root.is_some() {
                config.solver.root_snap_bone = root;
            }
            if frames == 0 {
                bail!("--frames must be at least 1");
            }

            let Rig {
                skeleton,
                rest_pose,
                mut solver,
            } = config.build().context("Invalid rig description")?;

            if let Some(warning) = solver.warning_message() {
                tracing::warn!("{}: {}", solver.nice_name(), warning);
            }

            let goals = GoalContainer::new();
            let mut pose = rest_pose;
            for _ in 0..frames {
                solver.solve(&skeleton, &mut pose, &goals);
            }
            tracing::info!("Solved {} bones over {} frame(s)", skeleton.len(), frames);

            let report = pose_report(&skeleton, &pose);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_table(&report);
            }
        }

        Commands::Check { rig } => {
            let config = load_config(&rig)?;
            let Rig {
                skeleton,
                rest_pose,
                mut solver,
            } = config.build().context("Invalid rig description")?;

            tracing::info!("Rig {:?}: {} bones", rig, skeleton.len());
            for (index, name) in skeleton.bone_names().iter().enumerate() {
                let depth = solver.bone_depths()[index];
                tracing::info!("  [{}] {}{}", index, "  ".repeat(depth), name);
            }

            // One solve sorts the settings into their snap order
            let mut pose = rest_pose;
            solver.solve(&skeleton, &mut pose, &GoalContainer::new());
            for setting in solver.settings() {
                let resolved = skeleton.bone_index(&setting.source_bone).is_some()
                    && skeleton.bone_index(&setting.destination_bone).is_some();
                tracing::info!(
                    "  snap {} -> {} (channels {:03b}){}",
                    setting.source_bone,
                    setting.destination_bone,
                    setting.channels.bits(),
                    if resolved { "" } else { " [unresolved, skipped]" }
                );
            }

            match solver.warning_message() {
                Some(warning) => tracing::warn!("{}", warning),
                None => tracing::info!("Rig is valid!"),
            }
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<RigConfig> {
    load_rig(path).with_context(|| format!("Failed to load rig: {:?}", path))
}

fn pose_report<'a>(skeleton: &'a Skeleton, pose: &Pose) -> Vec<BoneReport<'a>> {
    skeleton
        .bone_names()
        .iter()
        .enumerate()
        .map(|(index, name)| BoneReport {
            name,
            parent: skeleton
                .parent(index)
                .and_then(|parent| skeleton.bone_name(parent)),
            local: pose.local[index].into(),
            global: pose.global[index].into(),
        })
        .collect()
}

fn print_table(report: &[BoneReport<'_>]) {
    println!(
        "{:<16} {:<28} {:<36} {:<22}",
        "bone", "global translation", "global rotation", "global scale"
    );
    for bone in report {
        let [tx, ty, tz] = bone.global.translation;
        let [qx, qy, qz, qw] = bone.global.rotation;
        let [sx, sy, sz] = bone.global.scale;
        println!(
            "{:<16} {:<28} {:<36} {:<22}",
            bone.name,
            format!("({:.3}, {:.3}, {:.3})", tx, ty, tz),
            format!("({:.4}, {:.4}, {:.4}, {:.4})", qx, qy, qz, qw),
            format!("({:.3}, {:.3}, {:.3})", sx, sy, sz),
        );
    }
}
