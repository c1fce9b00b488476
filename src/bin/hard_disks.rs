//! Hard-disk gas driver.
//!
//! Usage: `hard_disks [config.json] [snapshot.json]`
//!
//! Runs the simulation, printing the pressure `PA/NkT` at every unit of simulated time
//! until the configured collision limit, then optionally writes a final snapshot.

use hdsim::{HardDisks, SimConfig};

fn main() -> hdsim::Result<()> {
    let mut args = std::env::args().skip(1);
    let cfg = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let snapshot_path = args.next();

    let mut sim = HardDisks::from_config(&cfg)?;

    println!(
        "Hard disks: N = {}, Lx = {}, Ly = {}",
        sim.num_particles(),
        sim.cell().lx(),
        sim.cell().ly()
    );
    println!(
        "  placement = {}, seed = {}, T = {:.4}, packing fraction = {:.3}",
        cfg.placement,
        sim.seed().map_or_else(|| "-".to_string(), |s| s.to_string()),
        sim.temperature(),
        cfg.packing_fraction()
    );
    println!();
    println!("{:>10} {:>12} {:>12}", "time", "collisions", "PA/NkT");

    let mut time_to_report = 1.0;
    while sim.num_collisions() < cfg.max_collisions {
        match sim.next_collision_time()? {
            Some(t) if t <= time_to_report => {
                sim.step()?;
            }
            _ => {
                sim.advance_to(time_to_report)?;
                println!(
                    "{:>10.2} {:>12} {:>12.5}",
                    sim.time(),
                    sim.num_collisions(),
                    sim.pressure()
                );
                time_to_report += 1.0;
                if sim.next_collision_time()?.is_none() {
                    println!("no further collisions scheduled");
                    break;
                }
            }
        }
    }

    println!();
    println!(
        "final: t = {:.4}, collisions = {}, PA/NkT = {:.5}, mean free time = {}",
        sim.time(),
        sim.num_collisions(),
        sim.pressure(),
        sim.mean_free_time()
            .map_or_else(|| "-".to_string(), |tau| format!("{tau:.5}"))
    );

    if let Some(path) = snapshot_path {
        sim.snapshot().save(&path)?;
        println!("snapshot written to {path}");
    }
    Ok(())
}
