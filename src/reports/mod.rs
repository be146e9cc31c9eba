use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use msasa::optimizer::AnnealOutcome;
use std::path::PathBuf;

pub fn print_run_summary(outcomes: &[AnnealOutcome], outputs: &[PathBuf]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Run").add_attribute(Attribute::Bold),
        Cell::new("Initial"),
        Cell::new("Final").fg(Color::Cyan),
        Cell::new("Best").fg(Color::Green),
        Cell::new("Cols"),
        Cell::new("Iters"),
        Cell::new("Acc"),
        Cell::new("Rej"),
        Cell::new("Stop"),
        Cell::new("Aln Hit%"),
        Cell::new("Col Hit%"),
        Cell::new("Output"),
    ]);

    for i in 1..=9 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (i, (o, path)) in outcomes.iter().zip(outputs).enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.6}", o.initial_score)),
            Cell::new(format!("{:.6}", o.final_score)).fg(Color::Cyan),
            Cell::new(format!("{:.6}", o.best_score)).fg(Color::Green),
            Cell::new(o.alignment.cols()),
            Cell::new(o.iterations),
            Cell::new(o.total_accepted),
            Cell::new(o.total_rejected),
            Cell::new(o.stop_reason),
            Cell::new(format!("{:.1}", o.cache.alignment_hit_rate() * 100.0)),
            Cell::new(format!("{:.1}", o.cache.column_hit_rate() * 100.0)),
            Cell::new(path.display()),
        ]);
    }

    println!("\n=== 🏆 ALIGNMENT SUMMARY ===");
    println!("{}", table);
}
