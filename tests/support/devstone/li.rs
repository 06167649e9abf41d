//! LI family: like HI (see `hi.rs`), but the extra atomics at each level
//! are siblings only through their shared EIC from the level's input —
//! there is no IC chaining between them, so spec §8's IC count is always 0.

use super::atomic::DEVStoneAtomic;
use super::seeder::DEVStoneSeeder;
use super::SharedProbe;
use xdevs::modeling::Coupled;

pub fn create(width: usize, depth: usize, int_delay: u64, ext_delay: u64, probe: SharedProbe) -> Coupled {
    let mut top = Coupled::new("li_top");
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

    let mut coupled = Coupled::new(&format!("li_{depth}"));
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
            probe.lock().expect("probe mutex poisoned").n_atomics += 1;
        }
    }

    let mut p = probe.lock().expect("probe mutex poisoned");
    p.n_eics += coupled.n_eics();
    p.n_ics += coupled.n_ics();
    p.n_eocs += coupled.n_eocs();
    coupled
}
