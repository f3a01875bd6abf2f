use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use medoid_pt::api::SolveReport;
use medoid_pt::solver::ladder::{Ladder, LadderMode};
use medoid_pt::SearchStatus;

fn status_label(status: SearchStatus) -> String {
    match status {
        SearchStatus::Running => "running".to_string(),
        SearchStatus::SuccessFound(id) => format!("target reached (replica {})", id),
        SearchStatus::Stagnated(id) => format!("stagnated (replica {})", id),
        SearchStatus::TimedOut => "time limit".to_string(),
        SearchStatus::RoundLimitReached => "round limit".to_string(),
    }
}

fn join(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn print_solve_report(report: &SolveReport) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Status"),
        Cell::new(status_label(report.status)).fg(if report.solved {
            Color::Green
        } else {
            Color::Yellow
        }),
    ]);
    table.add_row(vec![
        Cell::new("Best cost"),
        Cell::new(format!("{:.6}", report.cost_min)).fg(Color::Cyan),
    ]);
    table.add_row(vec![Cell::new("Rounds"), Cell::new(report.rounds)]);
    table.add_row(vec![
        Cell::new("Run time"),
        Cell::new(format!("{:.3}s", report.run_time)),
    ]);
    table.add_row(vec![
        Cell::new("Items / k"),
        Cell::new(format!("{} / {}", report.num_vars, report.num_k)),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);

    let mut clusters = new_table();
    clusters.set_header(vec![
        Cell::new("Cluster").add_attribute(Attribute::Bold),
        Cell::new("Medoid").add_attribute(Attribute::Bold),
        Cell::new("Size").add_attribute(Attribute::Bold),
    ]);
    for (pos, (&medoid, &size)) in report.medoids.iter().zip(&report.cluster_sizes).enumerate() {
        clusters.add_row(vec![Cell::new(pos), Cell::new(medoid), Cell::new(size)]);
    }
    println!("{}", clusters);

    println!("Medoid indices: {}", join(&report.medoids));
    println!("Cluster assignments (0..k-1): {}", join(&report.assignments));

    if let Some(d) = &report.densities {
        let mut densities = new_table();
        densities.set_header(vec![
            Cell::new("Overall").add_attribute(Attribute::Bold),
            Cell::new("Intra").fg(Color::Green),
            Cell::new("Inter").fg(Color::Red),
        ]);
        densities.add_row(vec![
            Cell::new(format!("{:.4}", d.overall)),
            Cell::new(format!("{:.4}", d.intra)),
            Cell::new(format!("{:.4}", d.inter)),
        ]);
        println!("\nEdge densities\n{}", densities);
    }
}

pub fn print_ladder(mode: LadderMode, ladder: &Ladder) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Temperature").fg(Color::Cyan),
        Cell::new("Beta"),
    ]);
    for (slot, (t, b)) in ladder.temperatures.iter().zip(&ladder.betas).enumerate() {
        table.add_row(vec![
            Cell::new(slot),
            Cell::new(format!("{:.6}", t)),
            Cell::new(format!("{:.6}", b)),
        ]);
    }
    for i in 1..=2 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    println!("Ladder mode: {}\n{}", mode, table);
}
