use battle_engine::api::{run_battle, Strategy};
use battle_engine::content::{builtin_chapter, is_yaml, parse_chapter};
use battle_engine::{BattleStatus, ChapterConfig};
use clap::Parser;
use encoding_rs::Encoding;
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(name = "simulate-battles")]
#[command(about = "Monte Carlo sim: every strategy vs one chapter")]
struct Args {
    /// Chapter JSON/YAML file (if omitted, uses --chapter)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Built-in chapter id
    #[arg(long, default_value = "sugar_rush")]
    chapter: String,

    /// Number of trials per strategy
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Only run this strategy (default: all)
    #[arg(long)]
    strategy: Option<String>,
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn read_chapter_auto(path: &std::path::Path) -> anyhow::Result<ChapterConfig> {
    let text = read_text_auto(path)?;
    parse_chapter(&text, is_yaml(path))
}

struct Tally {
    wins: u32,
    losses: u32,
    unfinished: u32,
    win_turns: Vec<u32>,
    hp_left_on_win: u64,
}

fn median(sorted: &[u32]) -> u32 {
    if sorted.is_empty() {
        return 0;
    }
    let m = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[m]
    } else {
        (sorted[m - 1] + sorted[m]) / 2
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let chapter = match args.file.as_ref() {
        Some(path) => read_chapter_auto(path)?,
        None => builtin_chapter(&args.chapter)?,
    };
    let strategies: Vec<Strategy> = match args.strategy.as_deref() {
        Some(s) => vec![s.parse()?],
        None => Strategy::ALL.to_vec(),
    };

    println!("simulate-battles results");
    println!("------------------------");
    println!("chapter:            {} (level {})", chapter.name, chapter.chapter_level);
    println!(
        "player:             {} (HP {}, ATK {})",
        chapter.player.name, chapter.player.max_health, chapter.player.base_attack_power
    );
    println!(
        "boss:               {} (HP {}, ATK {})",
        chapter.boss.name, chapter.boss.max_health, chapter.boss.base_attack_power
    );
    println!("trials:             {}", args.trials);

    for strategy in strategies {
        let mut tally = Tally {
            wins: 0,
            losses: 0,
            unfinished: 0,
            win_turns: Vec::with_capacity(args.trials as usize),
            hp_left_on_win: 0,
        };
        for i in 0..args.trials {
            let res = run_battle(&chapter, strategy, args.seed.wrapping_add(u64::from(i)))?;
            match res.status {
                BattleStatus::BossDefeated => {
                    tally.wins += 1;
                    tally.win_turns.push(res.turns);
                    tally.hp_left_on_win += u64::from(res.player_health_end);
                }
                BattleStatus::PlayerDefeated => tally.losses += 1,
                BattleStatus::Ongoing => tally.unfinished += 1,
            }
        }
        tally.win_turns.sort_unstable();

        let trials_f = f64::from(args.trials.max(1));
        let wins_f = f64::from(tally.wins.max(1));
        let avg_turns = tally.win_turns.iter().map(|&t| u64::from(t)).sum::<u64>() as f64 / wins_f;

        println!();
        println!("[{}]", strategy);
        println!("win rate:           {:.1}%", f64::from(tally.wins) / trials_f * 100.0);
        println!("loss rate:          {:.1}%", f64::from(tally.losses) / trials_f * 100.0);
        println!("unfinished:         {}", tally.unfinished);
        println!("avg turns (wins):   {:.2}", avg_turns);
        println!("median turns:       {}", median(&tally.win_turns));
        println!("avg hp left (wins): {:.1}", tally.hp_left_on_win as f64 / wins_f);
    }

    Ok(())
}
