//! `rafflepick parse` — show what a participant list normalizes to.

use rafflepick_core::{MAX_WINNERS, max_winners, normalize, validate_participants};

pub fn run(file: Option<&str>, emails: Option<&str>) {
    let raw = super::load_raw_input(file, emails);
    let candidates = normalize(&raw);

    for c in &candidates {
        println!("{c}");
    }
    println!();
    println!(
        "{} participant{} found",
        candidates.len(),
        if candidates.len() == 1 { "" } else { "s" }
    );

    match validate_participants(&raw) {
        Ok(pool) => println!(
            "Ready to draw: up to {} of {MAX_WINNERS} winners",
            max_winners(pool.len())
        ),
        Err(e) => {
            eprintln!("Not ready: {e}");
            std::process::exit(1);
        }
    }
}
