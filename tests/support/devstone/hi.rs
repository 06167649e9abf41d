//! HI family: each level's extra atomics are chained by IC in addition to
//! the EIC every atomic gets directly from the level's input, matching
//! spec §8's `(w-2)(d-1)` (for `w > 2`) internal-coupling count. Adapted
//! from `iscar-ucm-xdevs.rs/src/devstone/hi.rs`.

use super::atomic::DEVStoneAtomic;
use super::seeder::DEVStoneSeeder;
use super::SharedProbe;
use xdevs::modeling::Coupled;

/// Builds a runnable HI(width, depth) model: a seeder wired by IC into the
/// recursive HI structure, so `simulate_inf` alone drives the whole model
/// to completion with no external injection needed.
pub fn create(width: usize, depth: usize, int_delay: u64, ext_delay: u64, probe: SharedProbe) -> Coupled {
    let mut top = Coupled::new("hi_top");
    let seeder = DEVStoneSeeder::new("seeder");
    let inner = build(width, depth, int_delay, ext_delay, probe);
    let inner_name = inner.get_name().to_string();
    top.add_atomic(seeder);
    top.add_coupled(inner);
    top.add_ic("seeder", "output", &inner_name, "input");
    top
}

fn build(width: usize, depth: usize, int_delay: u64, ext_delay: u64, probe: SharedProbe) -> Coupled {
    assert!(width >= 1, "width must be greater than 1");
    assert!(depth >= 1, "depth must be greater than 1");

    let mut coupled = Coupled::new(&format!("hi_{depth}"));
    coupled.add_in_port::<usize>("input");
    coupled.add_out_port::<usize>("output");

    if depth == 1 {
        let atomic = DEVStoneAtomic::new("inner_atomic", int_delay, ext_delay, probe.clone());
        coupled.add_atomic(atomic);
        coupled.add_eic("input", "inner_atomic", "input");
        coupled.add_eoc("inner_atomic", "output", "output");
        probe.lock().expect("probe mutex poisoned").n_atomics += 1;
    } else {
        let sub = build(width, depth - 1, int_delay, ext_delay, probe.clone());
        let sub_name = sub.get_name().to_string();
        coupled.add_coupled(sub);
        coupled.add_eic("input", &sub_name, "input");
        coupled.add_eoc(&sub_name, "output", "output");

        for i in 1..width {
            let name = format!("atomic_{i}");
            let atomic = DEVStoneAtomic::new(&name, int_delay, ext_delay, probe.clone());
            coupled.add_atomic(atomic);
            coupled.add_eic("input", &name, "input");
            if i > 1 {
                let prev = format!("atomic_{}", i - 1);
                coupled.add_ic(&prev, "output", &name, "input");
            }
            probe.lock().expect("probe mutex poisoned").n_atomics += 1;
        }
    }

    let mut p = probe.lock().expect("probe mutex poisoned");
    p.n_eics += coupled.n_eics();
    p.n_ics += coupled.n_ics();
    p.n_eocs += coupled.n_eocs();
    coupled
}
