use anyhow::Context;
use battle_engine::api::{simulate_battle_many, BattleConfig, Strategy};
use battle_engine::content::{builtin_chapter, builtin_chapters, load_chapter};
use battle_engine::{
    create_battle, Battle, ChapterConfig, FixedVariance, Intent, SeededVariance, VarianceSource,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

#[derive(Copy, Clone, ValueEnum)]
enum Act {
    Attack,
    Defend,
    Counter,
    Companion,
}

#[derive(Copy, Clone, ValueEnum)]
enum Plan {
    AlwaysAttack,
    CompanionFirst,
    Cautious,
    Cycle,
}

#[derive(clap::Args)]
struct ChapterArgs {
    /// Built-in chapter id
    #[arg(long, default_value = "sugar_rush")]
    chapter: String,
    /// Chapter JSON/YAML file (overrides --chapter)
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Cmd {
    /// List the built-in chapters
    Chapters,
    /// Play one battle, scripted or driven by a strategy
    Play {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// RNG seed for determinism
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Use a constant damage multiplier instead of the seeded stream
        #[arg(long)]
        fixed_variance: Option<f64>,
        /// Comma-separated intents to play in order
        #[arg(long, value_enum, value_delimiter = ',')]
        intents: Vec<Act>,
        /// Strategy used when no intents are scripted
        #[arg(long, value_enum, default_value_t = Plan::CompanionFirst)]
        strategy: Plan,
        /// Print the final state as JSON instead of the narrative log
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Serialize a fresh battle state to JSON (stdout)
    Dump {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// Emit single-line JSON instead of pretty-printing
        #[arg(long, default_value_t = false)]
        compact: bool,
    },
    /// Run many seeded battles and print win statistics as JSON
    Simulate {
        #[command(flatten)]
        chapter: ChapterArgs,
        /// RNG base seed (battle i uses seed+i)
        #[arg(long, default_value_t = 12345)]
        seed: u64,
        /// Number of battles
        #[arg(long, default_value_t = 1000)]
        samples: u32,
        #[arg(long, value_enum, default_value_t = Plan::CompanionFirst)]
        strategy: Plan,
    },
}

#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Boss battle engine harness")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn to_intent(a: Act) -> Intent {
    match a {
        Act::Attack => Intent::Attack,
        Act::Defend => Intent::Defend,
        Act::Counter => Intent::Counter,
        Act::Companion => Intent::Companion,
    }
}

fn to_strategy(p: Plan) -> Strategy {
    match p {
        Plan::AlwaysAttack => Strategy::AlwaysAttack,
        Plan::CompanionFirst => Strategy::CompanionFirst,
        Plan::Cautious => Strategy::Cautious,
        Plan::Cycle => Strategy::Cycle,
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_chapter(args: &ChapterArgs) -> anyhow::Result<ChapterConfig> {
    match &args.file {
        Some(path) => load_chapter(path),
        None => builtin_chapter(&args.chapter),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Cmd::Chapters => {
            for (id, _) in builtin_chapters() {
                let c = builtin_chapter(id)?;
                println!(
                    "{:<16} level {}  {} vs {} (HP {})",
                    id, c.chapter_level, c.player.name, c.boss.name, c.boss.max_health
                );
            }
        }
        Cmd::Play {
            chapter,
            seed,
            fixed_variance,
            intents,
            strategy,
            json,
        } => {
            let chapter = resolve_chapter(&chapter)?;
            let variance: Box<dyn VarianceSource> = match fixed_variance {
                Some(v) => Box::new(FixedVariance(v)),
                None => Box::new(SeededVariance::from_seed(seed)),
            };
            let script: Vec<Intent> = intents.into_iter().map(to_intent).collect();
            play(&chapter, variance, &script, to_strategy(strategy), json)?;
        }
        Cmd::Dump { chapter, compact } => {
            let chapter = resolve_chapter(&chapter)?;
            let state = create_battle(chapter.chapter_level, &chapter.player, &chapter.boss)?;
            if compact {
                println!("{}", serde_json::to_string(&state)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&state)?);
            }
        }
        Cmd::Simulate {
            chapter,
            seed,
            samples,
            strategy,
        } => {
            let cfg = BattleConfig {
                chapter_id: Some(chapter.chapter),
                chapter_path: chapter.file.map(|p| p.to_string_lossy().into_owned()),
                seed,
                strategy: to_strategy(strategy),
            };
            let stats = simulate_battle_many(cfg, samples)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

fn play(
    chapter: &ChapterConfig,
    variance: Box<dyn VarianceSource>,
    script: &[Intent],
    strategy: Strategy,
    json: bool,
) -> anyhow::Result<()> {
    let mut battle = Battle::from_chapter(chapter, variance)
        .with_context(|| format!("cannot start chapter '{}'", chapter.name))?;
    let player = chapter.player.name.as_str();
    let boss = chapter.boss.name.as_str();
    let mut lines = Vec::new();

    let mut scripted = script.iter().copied();
    while !battle.is_over() {
        let intent = if script.is_empty() {
            strategy.choose(battle.state())
        } else {
            match scripted.next() {
                Some(i) => i,
                None => break,
            }
        };
        match battle.submit(intent) {
            Ok(turn) => lines.extend(turn.describe(player, boss)),
            Err(e) if e.is_recoverable() => lines.push(format!("[SKIP] {}", e)),
            Err(e) => return Err(e.into()),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(battle.state())?);
    } else {
        for line in lines {
            println!("{}", line);
        }
        let state = battle.state();
        println!(
            "[END] status={} turn={} player_hp={} boss_hp={}",
            state.status(),
            state.turn_number(),
            state.player().current_health,
            state.boss().current_health
        );
    }
    Ok(())
}
