use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use trace_debugger::debugger::{StepMode, TraceController};
use trace_debugger::executor::{run_debugger, RunnerOptions};
use trace_debugger::feed::ScriptedFeed;
use trace_debugger::persist;
use trace_debugger::source::SourceCache;

struct Args {
    script: PathBuf,
    breakpoints: Option<PathBuf>,
    log: Option<PathBuf>,
    height: usize,
    auto: bool,
}

fn usage() -> ! {
    eprintln!(
        "Usage: trace-debugger <trace-script> [--breakpoints <file>] [--log <file>] \
         [--height <n>] [--auto]"
    );
    std::process::exit(2);
}

fn parse_args() -> Args {
    let mut script = None;
    let mut breakpoints = None;
    let mut log = None;
    let mut height = 20usize;
    let mut auto = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--breakpoints" => match args.next() {
                Some(path) => breakpoints = Some(PathBuf::from(path)),
                None => usage(),
            },
            "--log" => match args.next() {
                Some(path) => log = Some(PathBuf::from(path)),
                None => usage(),
            },
            "--height" => match args.next().and_then(|n| n.parse().ok()) {
                Some(n) if n > 0 => height = n,
                _ => usage(),
            },
            "--auto" => auto = true,
            "--help" | "-h" => usage(),
            other if script.is_none() && !other.starts_with('-') => {
                script = Some(PathBuf::from(other));
            }
            _ => usage(),
        }
    }

    match script {
        Some(script) => Args {
            script,
            breakpoints,
            log,
            height,
            auto,
        },
        None => usage(),
    }
}

fn main() -> io::Result<()> {
    let args = parse_args();

    let mut log = args.log.as_ref().and_then(|path| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    if let Some(ref mut f) = log {
        writeln!(
            f,
            "\n=== SESSION STARTED at {:?} for {} ===",
            std::time::SystemTime::now(),
            args.script.display()
        )
        .ok();
    }

    let text = fs::read_to_string(&args.script)?;
    let mut feed = match ScriptedFeed::from_script(&text) {
        Ok(feed) => feed,
        Err(e) => {
            eprintln!("❌ {}: {}", args.script.display(), e);
            return Err(io::Error::new(io::ErrorKind::InvalidData, e));
        }
    };

    let mut controller = TraceController::new();
    // Stop on entry: the first line event suspends before anything runs.
    controller.set_mode(StepMode::StepInto);

    if let Some(ref bp_path) = args.breakpoints {
        if bp_path.exists() {
            match persist::load_breakpoints(bp_path) {
                Ok(locations) => {
                    eprintln!("📌 Restored {} breakpoint(s)", locations.len());
                    for location in locations {
                        controller.breakpoints_mut().set(location);
                    }
                }
                Err(e) => eprintln!("⚠️  Cannot load breakpoints: {}", e),
            }
        }
    }

    let mut sources = SourceCache::new();
    let options = RunnerOptions {
        height: args.height,
        auto_continue: args.auto,
    };

    run_debugger(&mut controller, &mut feed, &mut sources, &options)?;

    if let Some(ref bp_path) = args.breakpoints {
        match persist::save_breakpoints(controller.breakpoints(), bp_path) {
            Ok(()) => eprintln!("📌 Saved breakpoints to {}", bp_path.display()),
            Err(e) => eprintln!("⚠️  Cannot save breakpoints: {}", e),
        }
    }

    if let Some(ref mut f) = log {
        writeln!(f, "=== SESSION ENDED ===").ok();
    }

    Ok(())
}
