//! Binary entry point for the crate.
//!
//! The kernel itself has no CLI surface (it is a library); the one job this
//! binary performs is answering the re-exec the process-parallel
//! coordinator (`xdevs::sim::process`, feature `process`) issues on its own
//! executable to spin up a worker. Embedders that want the process-parallel
//! strategy register their atomic constructors in [`worker_builders`] and
//! ship this binary (or one shaped like it) alongside their model
//! definitions; atomic model bodies are outside this crate's scope (see
//! `SPEC_FULL.md`), so the registry here starts empty.

#[cfg(feature = "process")]
fn main() {
    use std::collections::HashMap;
    use xdevs::modeling::Atomic;
    use xdevs::sim::process::{worker_main, WORKER_FLAG};

    type Builder = fn() -> Box<dyn Atomic>;

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some(WORKER_FLAG) {
        let tag = args.get(2).cloned().unwrap_or_default();
        let builders: HashMap<&'static str, Builder> = worker_builders();
        let builder = *builders
            .get(tag.as_str())
            .unwrap_or_else(|| panic!("no worker builder registered for atomic '{tag}'"));
        worker_main(builder);
    } else {
        eprintln!(
            "xdevs is a library; this binary only answers the `--xdevs-worker` re-exec \
             used by the process-parallel coordinator. Depend on the `xdevs` crate directly \
             to build and run simulations."
        );
    }
}

#[cfg(feature = "process")]
fn worker_builders() -> std::collections::HashMap<&'static str, fn() -> Box<dyn xdevs::modeling::Atomic>> {
    std::collections::HashMap::new()
}

#[cfg(not(feature = "process"))]
fn main() {
    eprintln!("xdevs is a library; depend on the `xdevs` crate directly to build and run simulations.");
}
