use crate::debugger::{EventOutcome, ExecutionState, SuspendReason, TraceController};
use crate::errors::DebugError;
use crate::feed::EventSource;
use crate::location::SourceLocation;
use crate::source::SourceCache;
use crate::viewport::Viewport;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct RunnerOptions {
    /// Visible height of the code window, in lines.
    pub height: usize,
    /// Replay mode: never prompt, always continue past stops.
    pub auto_continue: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            height: 20,
            auto_continue: false,
        }
    }
}

/// Pump the event feed through the controller and hand control to the
/// operator prompt whenever execution suspends. Program and operator never
/// run at the same time: the feed is only pumped while the controller is
/// `Running`.
pub fn run_debugger(
    ctl: &mut TraceController,
    feed: &mut dyn EventSource,
    sources: &mut SourceCache,
    options: &RunnerOptions,
) -> io::Result<()> {
    let mut viewport = match Viewport::new(options.height) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("❌ {}", e);
            return Ok(());
        }
    };
    // File currently shown in the code window.
    let mut shown: Option<PathBuf> = None;
    let mut finished = false;

    'run: while let Some(event) = feed.next_event() {
        let outcome = match ctl.handle_event(event) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("❌ Fatal: {} (session closed)", e);
                break 'run;
            }
        };

        let info = match outcome {
            EventOutcome::Resumed => continue 'run,
            EventOutcome::Finished => {
                finished = true;
                break 'run;
            }
            EventOutcome::Suspended(info) => info,
        };

        let reason = match info.reason {
            SuspendReason::Breakpoint => "breakpoint",
            SuspendReason::Step => "step",
        };
        eprintln!(
            "\n🔍 Stopped at {} (depth {}, {})",
            info.location, info.depth, reason
        );

        if options.auto_continue {
            if let Err(e) = ctl.continue_() {
                eprintln!("❌ {}", e);
            }
            continue 'run;
        }

        // Where execution is paused; the ▶ marker in the code window.
        let exec_loc = info.location.clone();

        if let Err(e) = sync_viewport(&exec_loc, &mut viewport, sources, &mut shown) {
            eprintln!("⚠️  Cannot load {}: {}", exec_loc.file.display(), e);
        }
        render_window(ctl, &viewport, sources, &shown, &exec_loc);

        'prompt: loop {
            eprintln!(
                "\nCommands: (s)tep, (n)ext, (o)ut, (c)ontinue, (b)reak [file] [line], \
                 j/k [n], g <line>, up, down, bt, vars, w <height>, (q)uit"
            );
            eprint!("> ");
            io::stderr().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let cmd = input.trim();

            let tokens = match shlex::split(cmd) {
                Some(tokens) => tokens,
                None => {
                    eprintln!("❓ Unbalanced quoting: {}", cmd);
                    continue 'prompt;
                }
            };

            match tokens.first().map(String::as_str) {
                // Empty input steps into, the most common action.
                None | Some("s") | Some("step") => {
                    report(ctl.step_into());
                }
                Some("n") | Some("next") => {
                    report(ctl.step_over());
                }
                Some("o") | Some("out") => {
                    report(ctl.step_out());
                }
                Some("c") | Some("continue") => {
                    report(ctl.continue_());
                }
                Some("q") | Some("quit") => {
                    report(ctl.quit());
                }
                Some("b") | Some("break") => {
                    if let Some(location) = breakpoint_target(&tokens[1..], &shown, &viewport) {
                        toggle_at(ctl, sources, location);
                        render_window(ctl, &viewport, sources, &shown, &exec_loc);
                    }
                }
                Some("j") => {
                    let n = count_arg(&tokens[1..]);
                    viewport.move_cursor(n);
                    render_window(ctl, &viewport, sources, &shown, &exec_loc);
                }
                Some("k") => {
                    let n = count_arg(&tokens[1..]);
                    viewport.move_cursor(-n);
                    render_window(ctl, &viewport, sources, &shown, &exec_loc);
                }
                Some("g") => match tokens.get(1).and_then(|t| t.parse::<usize>().ok()) {
                    Some(line) if line >= 1 => {
                        let cursor = viewport.cursor().unwrap_or(0) as isize;
                        viewport.move_cursor(line as isize - 1 - cursor);
                        render_window(ctl, &viewport, sources, &shown, &exec_loc);
                    }
                    _ => eprintln!("❓ Usage: g <line>"),
                },
                Some("up") | Some("down") => {
                    let delta = if tokens[0] == "up" { -1 } else { 1 };
                    match ctl.navigate_stack(delta) {
                        Ok(frame) => {
                            let target = frame.location.clone();
                            if let Err(e) =
                                sync_viewport(&target, &mut viewport, sources, &mut shown)
                            {
                                eprintln!("⚠️  Cannot load {}: {}", target.file.display(), e);
                            }
                            print_stack(ctl);
                            render_window(ctl, &viewport, sources, &shown, &exec_loc);
                        }
                        Err(e) => eprintln!("❌ {}", e),
                    }
                }
                Some("bt") | Some("stack") => {
                    print_stack(ctl);
                }
                Some("vars") | Some("v") => {
                    print_locals(ctl);
                }
                Some("w") => match tokens.get(1).and_then(|t| t.parse::<usize>().ok()) {
                    Some(height) => match viewport.resize(height) {
                        Ok(_) => render_window(ctl, &viewport, sources, &shown, &exec_loc),
                        Err(e) => eprintln!("⚠️  {}", e),
                    },
                    None => eprintln!("❓ Usage: w <height>"),
                },
                Some(other) => {
                    eprintln!("❓ Unknown command: {}", other);
                }
            }

            // A resuming command (or quit) left the Suspended state.
            if ctl.state() != ExecutionState::Suspended {
                break 'prompt;
            }
        }

        if ctl.state() == ExecutionState::Exited {
            break 'run;
        }
    }

    if finished {
        eprintln!("\n✅ Trace complete");
    } else {
        eprintln!("\n🚪 Session closed");
    }
    print_stack(ctl);
    Ok(())
}

fn report(result: Result<(), DebugError>) {
    if let Err(e) = result {
        eprintln!("❌ {}", e);
    }
}

fn count_arg(args: &[String]) -> isize {
    args.first()
        .and_then(|t| t.parse::<isize>().ok())
        .unwrap_or(1)
        .max(0)
}

/// Resolve the `b` command's arguments to a location: bare `b` toggles at
/// the viewport cursor, `b <line>` in the shown file, `b <file> <line>`
/// anywhere.
fn breakpoint_target(
    args: &[String],
    shown: &Option<PathBuf>,
    viewport: &Viewport,
) -> Option<SourceLocation> {
    match args {
        [] => match (shown, viewport.cursor()) {
            (Some(file), Some(cursor)) => Some(SourceLocation::new(file.clone(), cursor + 1)),
            _ => {
                eprintln!("⚠️  No buffer to set a breakpoint in");
                None
            }
        },
        [line] => match (shown, line.parse::<usize>()) {
            (Some(file), Ok(line)) => Some(SourceLocation::new(file.clone(), line)),
            (None, _) => {
                eprintln!("⚠️  No buffer to set a breakpoint in");
                None
            }
            _ => {
                eprintln!("❓ Usage: b [file] [line]");
                None
            }
        },
        [file, line] => match line.parse::<usize>() {
            Ok(line) => Some(SourceLocation::new(file.as_str(), line)),
            Err(_) => {
                eprintln!("❓ Usage: b [file] [line]");
                None
            }
        },
        _ => {
            eprintln!("❓ Usage: b [file] [line]");
            None
        }
    }
}

fn toggle_at(ctl: &mut TraceController, sources: &mut SourceCache, location: SourceLocation) {
    let known = sources
        .total(&location.file)
        .or_else(|| sources.lines(&location.file).ok().map(<[String]>::len));
    match known {
        Some(total) if location.line >= 1 && location.line <= total => {
            match ctl.toggle_breakpoint(location.clone()) {
                Ok(true) => eprintln!("🔴 Breakpoint set at {}", location),
                Ok(false) => eprintln!("⚪ Breakpoint cleared at {}", location),
                Err(e) => eprintln!("❌ {}", e),
            }
        }
        _ => eprintln!("⚠️  {}", DebugError::InvalidLocation(location)),
    }
}

/// Bring the code window to `target`: a buffer switch reloads and recenters,
/// movement within the shown buffer slides incrementally.
fn sync_viewport(
    target: &SourceLocation,
    viewport: &mut Viewport,
    sources: &mut SourceCache,
    shown: &mut Option<PathBuf>,
) -> io::Result<()> {
    let total = sources.lines(&target.file)?.len();
    let cursor = target.line.saturating_sub(1);
    if shown.as_deref() != Some(target.file.as_path()) {
        *shown = Some(target.file.clone());
        viewport.reload(total, cursor);
    } else {
        match viewport.cursor() {
            Some(cur) => {
                viewport.move_cursor(cursor as isize - cur as isize);
            }
            None => {
                viewport.reload(total, cursor);
            }
        }
    }
    Ok(())
}

/// Plain-text code window: `>` is the navigation cursor, `*` a breakpoint,
/// `▶` marks the line execution is paused on.
fn render_window(
    ctl: &TraceController,
    viewport: &Viewport,
    sources: &mut SourceCache,
    shown: &Option<PathBuf>,
    exec: &SourceLocation,
) {
    let file: &Path = match shown {
        Some(file) => file,
        None => return,
    };
    let lines = match sources.lines(file) {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("⚠️  Cannot load {}: {}", file.display(), e);
            return;
        }
    };

    let (start, end) = viewport.window();
    let width = lines.len().max(1).to_string().len();
    eprintln!("\n── {} ──", file.display());
    if start == end {
        eprintln!("    <empty buffer>");
        return;
    }
    for i in start..end {
        let lineno = i + 1;
        let cursor = if viewport.cursor() == Some(i) { '>' } else { ' ' };
        let bp_mark = if ctl
            .breakpoints()
            .is_set(&SourceLocation::new(file, lineno))
        {
            '*'
        } else {
            ' '
        };
        let sep = if exec.file.as_path() == file && exec.line == lineno {
            '▶'
        } else {
            '│'
        };
        let text = lines.get(i).map(String::as_str).unwrap_or("");
        eprintln!(
            "{}{} {:>width$} {} {}",
            cursor,
            bp_mark,
            lineno,
            sep,
            text,
            width = width
        );
    }
}

fn print_stack(ctl: &TraceController) {
    let stack = ctl.stack();
    if stack.is_empty() {
        eprintln!("\n=== Call Stack: <empty> ===");
        return;
    }
    eprintln!("\n=== Call Stack ({} frames) ===", stack.len());
    let inspected = ctl.context().inspected_index();
    for (i, frame) in stack.iter().enumerate().rev() {
        let marker = if i == inspected { '>' } else { ' ' };
        eprintln!("  {} #{}: {}", marker, i, frame.location);
    }
    eprintln!();
}

fn print_locals(ctl: &TraceController) {
    match ctl.inspected_frame() {
        Some(frame) => {
            if frame.locals.is_empty() {
                eprintln!("\n(no locals captured)");
                return;
            }
            eprintln!(
                "\n=== Locals (frame #{}) ===",
                ctl.context().inspected_index()
            );
            for (name, value) in &frame.locals {
                eprintln!("  {}={}", name, value);
            }
            eprintln!();
        }
        None => eprintln!("\n(no frame)"),
    }
}
