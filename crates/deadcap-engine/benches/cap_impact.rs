//! Benchmarks for full cap-impact mart recomputation
//!
//! Marts are rebuilt from the whole fact table on every run, so this measures
//! the cost of that rebuild as the fact table grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deadcap_core::{ContractComponent, ContractStatus, SalaryType};
use deadcap_engine::{recompute_cap_impact, team_dead_money_rollup};

const TEAMS: [&str; 8] = ["ARI", "BUF", "DAL", "DEN", "GNB", "KAN", "NWE", "TAM"];

const SALARY_TYPES: [SalaryType; 5] = [
    SalaryType::BaseSalary,
    SalaryType::SigningBonus,
    SalaryType::RosterBonus,
    SalaryType::DeadCap,
    SalaryType::Other,
];

/// Generate a fact table with N players, each with one component per category
/// across three seasons
fn generate_components(num_players: usize) -> Vec<ContractComponent> {
    let mut components = Vec::with_capacity(num_players * 15);

    for i in 0..num_players {
        let team = TEAMS[i % TEAMS.len()];
        for year in 2022..2025 {
            let player_id = format!("PFR_PLAYER{}_{}_{}", i, team, year);
            for (k, salary_type) in SALARY_TYPES.iter().enumerate() {
                components.push(ContractComponent {
                    contract_id: format!("{}_{}", player_id, salary_type),
                    player_id: player_id.clone(),
                    team: team.to_string(),
                    year,
                    salary_type: *salary_type,
                    amount_millions: (i % 17) as f64 * 0.25 + k as f64,
                    designation: None,
                    status: ContractStatus::Active,
                });
            }
        }
    }

    components
}

fn bench_recompute_cap_impact(c: &mut Criterion) {
    let mut group = c.benchmark_group("recompute_cap_impact");

    for num_players in [100, 1000, 5000].iter() {
        let components = generate_components(*num_players);

        group.bench_with_input(
            BenchmarkId::from_parameter(num_players),
            &components,
            |b, components| {
                b.iter(|| black_box(recompute_cap_impact(black_box(components))));
            },
        );
    }

    group.finish();
}

fn bench_team_rollup(c: &mut Criterion) {
    let mut group = c.benchmark_group("team_dead_money_rollup");

    for num_players in [1000, 5000].iter() {
        let impacts = recompute_cap_impact(&generate_components(*num_players));

        group.bench_with_input(
            BenchmarkId::from_parameter(num_players),
            &impacts,
            |b, impacts| {
                b.iter(|| black_box(team_dead_money_rollup(black_box(impacts))));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_recompute_cap_impact, bench_team_rollup);
criterion_main!(benches);
