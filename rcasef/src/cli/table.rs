use rcasef::mapping::{SwitchPosition, HIGH_PASS_TABLE, LOW_PASS_TABLE};

fn print_table(title: &str, table: &[SwitchPosition]) {
    println!("{title}");
    println!("{:>4}  {:>10}  {:>14}  {:>14}", "pos", "cutoff", "C (F)", "L (H)");
    for (i, entry) in table.iter().enumerate() {
        let cutoff = match entry.cutoff_hz {
            Some(hz) => format!("{hz} Hz"),
            None => "off".to_string(),
        };
        println!(
            "{:>4}  {:>10}  {:>14.4e}  {:>14.4e}",
            i + 1,
            cutoff,
            entry.values.capacitance,
            entry.values.inductance
        );
    }
    println!();
}

pub fn run() {
    print_table("High-pass switch", &HIGH_PASS_TABLE);
    print_table("Low-pass switch", &LOW_PASS_TABLE);
}
