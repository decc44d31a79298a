//! Daevanion Optimizer Headless Harness
//!
//! Validates the board optimizer against its invariants without any data
//! service or UI. Runs entirely in-process — no network, no rendering.
//!
//! Usage:
//!   cargo run -p daevanion-simtest
//!   cargo run -p daevanion-simtest -- --verbose --seed 7 --boards 500
//!   cargo run -p daevanion-simtest -- --snapshot capture.json --config tuned.json
//!
//! Set `RUST_LOG=debug` to see per-board search logs from the optimizer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use daevanion_logic::aggregate::{optimize_all_boards_with, BoardInput};
use daevanion_logic::boards::{board_ids_for_class, board_name, ClassArchetype};
use daevanion_logic::config::{validate_config, OptimizerConfig};
use daevanion_logic::constants::{BOARD_NAMES, GRID_SIZE, OPTIMIZABLE_BOARDS};
use daevanion_logic::node::{neighbor_cells, DaevanionNode, Grade, NodeType};
use daevanion_logic::optimizer::{optimize_board_with, OptimizationResult};
use daevanion_logic::recommend::{recommendation_rows, summarize_board, RecommendationKind};
use daevanion_logic::snapshot::CharacterSnapshot;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

// ── Bundled capture (same shape the data service returns) ───────────────
const SAMPLE_SNAPSHOT_JSON: &str = include_str!("../../../data/sample_snapshot.json");

// ── Command line ────────────────────────────────────────────────────────

struct Options {
    verbose: bool,
    seed: u64,
    boards: usize,
    config_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
}

impl Options {
    fn from_args() -> Result<Self, String> {
        let mut options = Options {
            verbose: false,
            seed: 42,
            boards: 200,
            config_path: None,
            snapshot_path: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--verbose" => options.verbose = true,
                "--seed" => options.seed = parse_value(&arg, args.next())?,
                "--boards" => options.boards = parse_value(&arg, args.next())?,
                "--config" => options.config_path = Some(path_value(&arg, args.next())?),
                "--snapshot" => options.snapshot_path = Some(path_value(&arg, args.next())?),
                other => return Err(format!("unknown argument {other}")),
            }
        }
        Ok(options)
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: invalid value {value}"))
}

fn path_value(flag: &str, value: Option<String>) -> Result<PathBuf, String> {
    value
        .map(PathBuf::from)
        .ok_or_else(|| format!("{flag} needs a path"))
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = match Options::from_args() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: daevanion-simtest [--verbose] [--seed N] [--boards N] [--config PATH] [--snapshot PATH]");
            std::process::exit(2);
        }
    };
    println!("=== Daevanion Optimizer Harness ===\n");

    let mut results = Vec::new();

    // 1. Configuration
    let config = load_config(&options, &mut results);

    // 2. Board naming tables
    results.extend(validate_board_naming(options.verbose));

    // 3. Worked scenarios
    results.extend(validate_scenarios(&config));

    // 4. Seeded synthetic sweep
    results.extend(validate_synthetic_sweep(&config, &options));

    // 5. Captured snapshot
    results.extend(validate_snapshot(&config, &options));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || options.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(options: &Options, results: &mut Vec<TestResult>) -> OptimizerConfig {
    println!("--- Configuration ---");
    let Some(path) = &options.config_path else {
        results.push(TestResult {
            name: "config_default".into(),
            passed: validate_config(&OptimizerConfig::default()).is_empty(),
            detail: "built-in defaults".into(),
        });
        return OptimizerConfig::default();
    };

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<OptimizerConfig>(&text).map_err(|e| e.to_string()));
    let config = match parsed {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "config_load".into(),
                passed: false,
                detail: format!("{}: {}", path.display(), e),
            });
            return OptimizerConfig::default();
        }
    };

    let errors = validate_config(&config);
    results.push(TestResult {
        name: "config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("loaded {}", path.display())
        } else {
            format!("{:?}", errors)
        },
    });
    if errors.is_empty() {
        info!("using optimizer config from {}", path.display());
        config
    } else {
        warn!("config rejected, falling back to defaults");
        OptimizerConfig::default()
    }
}

// ── 2. Board naming ─────────────────────────────────────────────────────

fn validate_board_naming(verbose: bool) -> Vec<TestResult> {
    println!("--- Board Naming ---");
    let mut results = Vec::new();

    let mut eligible_per_class = Vec::new();
    for class in ClassArchetype::all() {
        let names: Vec<String> = class.board_ids().map(board_name).collect();
        let eligible = names
            .iter()
            .filter(|n| OPTIMIZABLE_BOARDS.contains(&n.as_str()))
            .count();
        if verbose {
            println!("  {}: {}", class.display_name(), names.join(", "));
        }
        eligible_per_class.push(eligible);
    }
    results.push(TestResult {
        name: "naming_four_eligible_per_class".into(),
        passed: eligible_per_class.iter().all(|&n| n == 4),
        detail: format!("eligible boards per class: {:?}", eligible_per_class),
    });

    let all_named = ClassArchetype::all()
        .iter()
        .flat_map(|c| c.board_ids())
        .all(|id| BOARD_NAMES.contains(&board_name(id).as_str()));
    results.push(TestResult {
        name: "naming_ranges_resolve".into(),
        passed: all_named,
        detail: "every class board id maps to a canonical name".into(),
    });

    let fallback = board_ids_for_class("알 수 없음");
    results.push(TestResult {
        name: "naming_unknown_class_fallback".into(),
        passed: fallback == (71..=76).collect::<Vec<_>>(),
        detail: format!("unknown class → {:?}", fallback),
    });

    results
}

// ── 3. Worked scenarios ─────────────────────────────────────────────────

fn stat(id: u32, row: u32, col: u32, grade: Grade) -> DaevanionNode {
    DaevanionNode::new(id, row, col, grade, NodeType::Stat)
}

fn validate_scenarios(config: &OptimizerConfig) -> Vec<TestResult> {
    println!("--- Scenarios ---");
    let mut results = Vec::new();

    // Nothing spent: only start stays on.
    let nodes = vec![DaevanionNode::start(1, 8, 8), stat(2, 8, 9, Grade::Common)];
    let r = optimize_board_with(&nodes, "네자칸", &BTreeSet::from([1]), config);
    results.push(TestResult {
        name: "scenario_zero_budget".into(),
        passed: r.activated_node_ids == BTreeSet::from([1])
            && r.improvement == 0
            && r.recommendations.add.is_empty()
            && r.recommendations.remove.is_empty(),
        detail: format!("activated {:?}", r.activated_node_ids),
    });

    // Excluded board.
    let r = optimize_board_with(&nodes, "아리엘", &BTreeSet::from([1, 2]), config);
    results.push(TestResult {
        name: "scenario_excluded_board".into(),
        passed: r.is_empty(),
        detail: "아리엘 → empty result".into(),
    });

    // Legend behind a two-Common route, budget on five scattered Commons.
    let nodes = vec![
        DaevanionNode::start(1, 8, 8),
        stat(2, 8, 9, Grade::Common),
        stat(3, 8, 10, Grade::Common),
        stat(4, 8, 11, Grade::Legend),
        stat(10, 1, 1, Grade::Common),
        stat(11, 1, 3, Grade::Common),
        stat(12, 1, 5, Grade::Common),
        stat(13, 3, 1, Grade::Common),
        stat(14, 3, 3, Grade::Common),
    ];
    let r = optimize_board_with(&nodes, "네자칸", &BTreeSet::from([10, 11, 12, 13, 14]), config);
    results.push(TestResult {
        name: "scenario_no_regression".into(),
        passed: r.optimized_combat_power >= r.current_combat_power,
        detail: format!(
            "current {} → optimized {} (+{})",
            r.current_combat_power, r.optimized_combat_power, r.improvement
        ),
    });

    results
}

// ── 4. Synthetic sweep ──────────────────────────────────────────────────

/// A random board with a start at the centre and an activation grown from it.
/// Some activations also carry stranded nodes, like stale captures do.
fn synthetic_board(rng: &mut StdRng, board_id: u32) -> (Vec<DaevanionNode>, BTreeSet<u32>) {
    let centre = GRID_SIZE / 2 + 1;
    let mut nodes = Vec::new();
    for row in 1..=GRID_SIZE {
        for col in 1..=GRID_SIZE {
            let node_id = board_id * 1000 + (row - 1) * GRID_SIZE + col;
            let node = if (row, col) == (centre, centre) {
                DaevanionNode::start(node_id, row, col)
            } else if rng.gen_bool(0.35) {
                continue;
            } else {
                let grade = match rng.gen_range(0..20) {
                    0..=1 => Grade::None,
                    2..=11 => Grade::Common,
                    12..=15 => Grade::Rare,
                    16..=18 => Grade::Unique,
                    _ => Grade::Legend,
                };
                let node_type = if grade == Grade::None {
                    NodeType::None
                } else if grade == Grade::Legend {
                    NodeType::SkillLevel
                } else {
                    NodeType::Stat
                };
                DaevanionNode::new(node_id, row, col, grade, node_type)
            };
            nodes.push(DaevanionNode { board_id, ..node });
        }
    }

    let by_cell: BTreeMap<(u32, u32), &DaevanionNode> =
        nodes.iter().map(|n| ((n.row, n.col), n)).collect();
    let mut open = BTreeSet::from([board_id * 1000 + (centre - 1) * GRID_SIZE + centre]);
    let mut open_cells = vec![(centre, centre)];
    let steps = rng.gen_range(0..40);
    for _ in 0..steps {
        let (row, col) = open_cells[rng.gen_range(0..open_cells.len())];
        let candidates: Vec<&DaevanionNode> = neighbor_cells(row, col)
            .filter_map(|cell| by_cell.get(&cell).copied())
            .filter(|n| n.is_playable() && !open.contains(&n.node_id))
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let pick = candidates[rng.gen_range(0..candidates.len())];
        open.insert(pick.node_id);
        open_cells.push((pick.row, pick.col));
    }
    if rng.gen_bool(0.25) {
        let stray: Vec<u32> = nodes
            .iter()
            .filter(|n| n.is_playable() && !open.contains(&n.node_id))
            .map(|n| n.node_id)
            .collect();
        if !stray.is_empty() {
            open.insert(stray[rng.gen_range(0..stray.len())]);
        }
    }
    (nodes, open)
}

fn invariant_violation(
    result: &OptimizationResult,
    nodes: &[DaevanionNode],
    current: &BTreeSet<u32>,
    config: &OptimizerConfig,
) -> Option<String> {
    let start_id = nodes.iter().find(|n| n.is_start())?.node_id;
    let spent: u32 = nodes
        .iter()
        .filter(|n| result.activated_node_ids.contains(&n.node_id))
        .map(|n| config.grade_costs.point_cost(n))
        .sum();
    let mut normalized = current.clone();
    normalized.insert(start_id);
    let add: BTreeSet<u32> = result.recommendations.add.iter().copied().collect();
    let remove: BTreeSet<u32> = result.recommendations.remove.iter().copied().collect();
    let rebuilt: BTreeSet<u32> = normalized.difference(&remove).chain(add.iter()).copied().collect();

    if result.optimized_combat_power < result.current_combat_power {
        return Some("optimized power below current".into());
    }
    if spent > result.total_points {
        return Some(format!("spent {} over budget {}", spent, result.total_points));
    }
    if !result.activated_node_ids.contains(&start_id)
        || add.contains(&start_id)
        || remove.contains(&start_id)
    {
        return Some("start node mishandled".into());
    }
    if !add.is_disjoint(&remove) || rebuilt != result.activated_node_ids {
        return Some("add/remove diff inconsistent".into());
    }
    None
}

fn validate_synthetic_sweep(config: &OptimizerConfig, options: &Options) -> Vec<TestResult> {
    println!("--- Synthetic Sweep ---");
    info!("sweeping {} boards with seed {}", options.boards, options.seed);
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut violations = Vec::new();
    let mut reallocated = 0;
    let mut inputs: BTreeMap<String, BoardInput> = BTreeMap::new();
    let mut expected_current = 0;

    for i in 0..options.boards {
        let board_id = 71 + (i % BOARD_NAMES.len()) as u32;
        let name = board_name(board_id);
        let (nodes, current) = synthetic_board(&mut rng, board_id);
        let result = optimize_board_with(&nodes, &name, &current, config);

        if !config.is_optimizable(&name) {
            if !result.is_empty() {
                violations.push(format!("board #{i} ({name}): excluded board produced a result"));
            }
        } else if let Some(v) = invariant_violation(&result, &nodes, &current, config) {
            violations.push(format!("board #{i} ({name}): {v}"));
        } else if !result.recommendations.add.is_empty() {
            reallocated += 1;
        }

        // Keep the last board per name for the aggregation check.
        if i + BOARD_NAMES.len() >= options.boards {
            if config.is_optimizable(&name) {
                expected_current += result.current_combat_power;
            }
            inputs.insert(name, BoardInput { nodes, activated: current });
        }
    }

    results.push(TestResult {
        name: "sweep_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} boards, {} with reallocation advice",
                options.boards, reallocated
            )
        } else {
            violations.join("; ")
        },
    });

    let aggregate = optimize_all_boards_with(&inputs, config);
    let summed: u32 = aggregate
        .board_results
        .values()
        .map(|r| r.optimized_combat_power)
        .sum();
    results.push(TestResult {
        name: "sweep_aggregate_sums".into(),
        passed: aggregate.total_current_power == expected_current
            && aggregate.total_optimized_power == summed
            && aggregate.total_optimized_power >= aggregate.total_current_power,
        detail: format!(
            "current {} / optimized {} across {} boards",
            aggregate.total_current_power,
            aggregate.total_optimized_power,
            aggregate.board_results.len()
        ),
    });

    results
}

// ── 5. Captured snapshot ────────────────────────────────────────────────

fn validate_snapshot(config: &OptimizerConfig, options: &Options) -> Vec<TestResult> {
    println!("--- Snapshot ---");
    let mut results = Vec::new();

    let text = match &options.snapshot_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                results.push(TestResult {
                    name: "snapshot_read".into(),
                    passed: false,
                    detail: format!("{}: {}", path.display(), e),
                });
                return results;
            }
        },
        None => SAMPLE_SNAPSHOT_JSON.to_string(),
    };

    let snapshot = match CharacterSnapshot::from_json(&text) {
        Ok(s) => s,
        Err(e) => {
            results.push(TestResult {
                name: "snapshot_parse".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    info!(
        "snapshot for {} ({}) with {} boards",
        snapshot.character_name,
        snapshot.class_name,
        snapshot.boards.len()
    );

    let inputs = snapshot.board_inputs(config);
    let aggregate = optimize_all_boards_with(&inputs, config);

    let mut violations = Vec::new();
    for (name, result) in &aggregate.board_results {
        let input = &inputs[name];
        if let Some(v) = invariant_violation(result, &input.nodes, &input.activated, config) {
            violations.push(format!("{name}: {v}"));
        }
        if options.verbose {
            print_board_report(name, result, &input.nodes, config);
        }
    }
    results.push(TestResult {
        name: "snapshot_invariants".into(),
        passed: violations.is_empty(),
        detail: if violations.is_empty() {
            format!(
                "{} boards: power {} → {} (+{})",
                aggregate.board_results.len(),
                aggregate.total_current_power,
                aggregate.total_optimized_power,
                aggregate.total_improvement
            )
        } else {
            violations.join("; ")
        },
    });

    let skipped: Vec<String> = snapshot
        .boards
        .keys()
        .map(|&id| board_name(id))
        .filter(|name| !aggregate.board_results.contains_key(name))
        .collect();
    results.push(TestResult {
        name: "snapshot_excluded_boards_skipped".into(),
        passed: skipped.iter().all(|name| !config.is_optimizable(name)),
        detail: format!("skipped {:?}", skipped),
    });

    results
}

fn print_board_report(
    name: &str,
    result: &OptimizationResult,
    nodes: &[DaevanionNode],
    config: &OptimizerConfig,
) {
    let summary = summarize_board(result, nodes, &config.grade_costs);
    println!(
        "  [{}] {}P budget, power {} → {} (+{}), {}P unspent",
        name,
        summary.budget,
        result.current_combat_power,
        result.optimized_combat_power,
        result.improvement,
        summary.unspent_points
    );
    for row in recommendation_rows(result, nodes, &config.grade_costs) {
        let sign = match row.kind {
            RecommendationKind::Add => "+",
            RecommendationKind::Remove => "-",
        };
        println!(
            "      {} {} ({}P → {:+} 전투력){}",
            sign,
            row.name,
            row.point_cost,
            row.power_delta,
            row.headline_effect
                .map(|e| format!(": {e}"))
                .unwrap_or_default()
        );
    }
}
