#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[path = "cli.rs"]
mod cli;

use std::{env, io, process::ExitCode};

fn main() -> ExitCode {
    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let status = cli::run(env::args_os(), &mut stdin, &mut stdout, &mut stderr);
    cli::exit_code_from(status)
}
