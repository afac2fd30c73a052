use trace_debugger::debugger::{
    Breakpoints, EventOutcome, ExecutionContext, ExecutionState, StepMode, SuspendInfo,
    SuspendReason, TraceController,
};
use trace_debugger::errors::DebugError;
use trace_debugger::feed::{parse_script, EventKind, EventSource, ScriptedFeed, TraceEvent};
use trace_debugger::location::SourceLocation;

fn loc(line: usize) -> SourceLocation {
    SourceLocation::new("prog.py", line)
}

fn ev(kind: EventKind, line: usize) -> TraceEvent {
    TraceEvent::new(kind, loc(line))
}

/// Feed events until the controller suspends. `None` means the trace ran to
/// completion (or the feed ran dry) without suspending.
fn run_until_suspend(ctl: &mut TraceController, feed: &mut ScriptedFeed) -> Option<SuspendInfo> {
    while let Some(event) = feed.next_event() {
        match ctl.handle_event(event).expect("feed contract holds") {
            EventOutcome::Resumed => continue,
            EventOutcome::Suspended(info) => return Some(info),
            EventOutcome::Finished => return None,
        }
    }
    None
}

/// A three-deep program: A (depth 0) calls B (depth 1) calls C (depth 2).
/// A runs at lines 1-3, B at 10-12, C at 20-22.
fn abc_program() -> Vec<TraceEvent> {
    vec![
        ev(EventKind::Call, 1), // enter A
        ev(EventKind::Line, 2),
        ev(EventKind::Call, 10), // enter B
        ev(EventKind::Line, 11),
        ev(EventKind::Call, 20), // enter C
        ev(EventKind::Line, 21),
        ev(EventKind::Line, 22),
        ev(EventKind::Return, 22), // C returns
        ev(EventKind::Line, 12),
        ev(EventKind::Return, 12), // B returns
        ev(EventKind::Line, 3),
        ev(EventKind::Return, 3), // A returns, trace over
    ]
}

#[cfg(test)]
mod breakpoint_tests {
    use super::*;

    #[test]
    fn test_double_toggle_restores_state() {
        let mut bps = Breakpoints::new();

        assert!(!bps.is_set(&loc(5)), "fresh registry has no breakpoints");
        assert!(bps.toggle(loc(5)), "first toggle enables");
        assert!(!bps.toggle(loc(5)), "second toggle disables");
        assert!(!bps.is_set(&loc(5)), "double toggle restored the state");

        assert!(bps.toggle(loc(5)), "third toggle enables again");
        assert!(bps.is_set(&loc(5)));
    }

    #[test]
    fn test_enumeration_keeps_insertion_order() {
        let mut bps = Breakpoints::new();
        bps.toggle(loc(30));
        bps.toggle(loc(10));
        bps.toggle(loc(20));

        // Disabling must not reorder; one entry per location.
        bps.toggle(loc(10));

        let lines: Vec<usize> = bps.all().iter().map(|bp| bp.location.line).collect();
        assert_eq!(lines, vec![30, 10, 20], "insertion order, not sorted");
        assert_eq!(bps.all().len(), 3, "toggling never duplicates");
        assert!(!bps.all()[1].enabled, "middle entry was disabled in place");
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut bps = Breakpoints::new();
        bps.set(loc(7));
        bps.set(loc(7));
        assert!(bps.is_set(&loc(7)));
        assert_eq!(bps.all().len(), 1);
    }
}

#[cfg(test)]
mod controller_tests {
    use super::*;

    #[test]
    fn test_breakpoint_suspends_in_continue_mode() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(2));
        let mut feed = ScriptedFeed::from_events(abc_program());

        let info = run_until_suspend(&mut ctl, &mut feed).expect("breakpoint must suspend");
        assert_eq!(info.location, loc(2));
        assert_eq!(info.depth, 0);
        assert_eq!(info.reason, SuspendReason::Breakpoint);
        assert_eq!(ctl.state(), ExecutionState::Suspended);
    }

    #[test]
    fn test_stop_on_entry_via_step_into() {
        let mut ctl = TraceController::new();
        ctl.set_mode(StepMode::StepInto);
        let mut feed = ScriptedFeed::from_events(abc_program());

        let info = run_until_suspend(&mut ctl, &mut feed).expect("step-into suspends");
        // The call event itself does not suspend; the first line does.
        assert_eq!(info.location, loc(2));
        assert_eq!(info.reason, SuspendReason::Step);
    }

    #[test]
    fn test_step_over_does_not_enter_callee() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(2));
        let mut feed = ScriptedFeed::from_events(abc_program());

        run_until_suspend(&mut ctl, &mut feed).expect("suspend at breakpoint in A");
        ctl.step_into().expect("resume into B");
        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend inside B");
        assert_eq!(info.location, loc(11), "first line of B");
        assert_eq!(info.depth, 1);

        // Step-over at depth 1 must skip all of C (depth 2), including C's
        // return line, and stop at the next depth <= 1 location.
        ctl.step_over().expect("resume over C");
        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend after the call");
        assert_eq!(info.location, loc(12), "next line of B, nothing inside C");
    }

    #[test]
    fn test_step_out_returns_to_caller() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(21));
        let mut feed = ScriptedFeed::from_events(abc_program());

        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend inside C");
        assert_eq!(info.depth, 2);

        ctl.step_out().expect("resume out of C");
        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend after C returned");
        assert_eq!(info.location, loc(12), "back in B");
        assert_eq!(info.depth, 1);
    }

    #[test]
    fn test_step_out_at_depth_zero_behaves_as_continue() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(2));
        let mut feed = ScriptedFeed::from_events(abc_program());

        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend at breakpoint");
        assert_eq!(info.depth, 0);

        ctl.step_out().expect("degenerates to continue");
        assert_eq!(ctl.mode(), StepMode::Continue);
        assert_eq!(
            run_until_suspend(&mut ctl, &mut feed),
            None,
            "no further breakpoints, trace runs to completion"
        );
        assert_eq!(ctl.state(), ExecutionState::Exited);
    }

    #[test]
    fn test_step_over_at_depth_zero_stops_at_sibling_lines() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(2));
        let mut feed = ScriptedFeed::from_events(abc_program());

        run_until_suspend(&mut ctl, &mut feed).expect("suspend at breakpoint");
        ctl.step_over().expect("step over at depth 0");

        // The call pushes past the target depth; the `<=` comparison still
        // catches the next depth-0 line after everything returns.
        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend at sibling line");
        assert_eq!(info.location, loc(3));
        assert_eq!(info.depth, 0);
    }

    #[test]
    fn test_breakpoint_plus_step_suspends_exactly_once() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(2));
        ctl.breakpoints_mut().set(loc(11));
        let mut feed = ScriptedFeed::from_events(abc_program());

        run_until_suspend(&mut ctl, &mut feed).expect("suspend at A's breakpoint");
        // Step-into and the breakpoint both request suspension at line 11;
        // the OR of the two conditions yields a single stop.
        ctl.step_into().expect("resume");
        let info = run_until_suspend(&mut ctl, &mut feed).expect("one suspension at line 11");
        assert_eq!(info.location, loc(11));
        assert_eq!(info.reason, SuspendReason::Breakpoint, "breakpoint wins the tie");

        ctl.continue_().expect("resume past it");
        assert_eq!(
            run_until_suspend(&mut ctl, &mut feed),
            None,
            "line 11 suspended once, not twice"
        );
    }

    #[test]
    fn test_exception_unwinds_two_frames_before_suspending() {
        // C raises at 21, B does not handle at 11, A catches at line 5.
        let events = vec![
            ev(EventKind::Call, 1),
            ev(EventKind::Line, 2),
            ev(EventKind::Call, 10),
            ev(EventKind::Line, 11),
            ev(EventKind::Call, 20),
            ev(EventKind::Line, 21),
            ev(EventKind::Exception, 21),
            ev(EventKind::Exception, 11),
            ev(EventKind::Line, 5),
            ev(EventKind::Return, 6),
        ];
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(5));
        let mut feed = ScriptedFeed::from_events(events);

        let info = run_until_suspend(&mut ctl, &mut feed).expect("suspend in the handler");
        assert_eq!(info.location, loc(5), "no suspension during the unwind");
        assert_eq!(
            ctl.stack().len(),
            1,
            "both unwound frames were popped before the suspend check"
        );
    }

    #[test]
    fn test_commands_rejected_while_running() {
        let mut ctl = TraceController::new();
        assert_eq!(ctl.step_into(), Err(DebugError::NotSuspended));
        assert_eq!(ctl.step_over(), Err(DebugError::NotSuspended));
        assert_eq!(ctl.continue_(), Err(DebugError::NotSuspended));
        assert_eq!(
            ctl.toggle_breakpoint(loc(1)),
            Err(DebugError::NotSuspended)
        );
        assert_eq!(ctl.quit(), Err(DebugError::NotSuspended));
    }

    #[test]
    fn test_commands_rejected_after_quit() {
        let mut ctl = TraceController::new();
        ctl.set_mode(StepMode::StepInto);
        let mut feed = ScriptedFeed::from_events(abc_program());

        run_until_suspend(&mut ctl, &mut feed).expect("suspend at entry");
        ctl.quit().expect("quit from suspended");
        assert_eq!(ctl.state(), ExecutionState::Exited);

        assert_eq!(ctl.step_into(), Err(DebugError::NotSuspended));

        // The host may let the program run to completion; nothing suspends.
        assert_eq!(
            ctl.handle_event(ev(EventKind::Line, 3)),
            Ok(EventOutcome::Resumed),
            "events after quit are ignored"
        );
    }

    #[test]
    fn test_event_while_suspended_is_fatal() {
        let mut ctl = TraceController::new();
        ctl.set_mode(StepMode::StepInto);
        let mut feed = ScriptedFeed::from_events(abc_program());
        run_until_suspend(&mut ctl, &mut feed).expect("suspend at entry");

        let result = ctl.handle_event(ev(EventKind::Line, 3));
        assert!(
            matches!(result, Err(DebugError::StackCorruption(_))),
            "the feed violated the rendezvous contract"
        );
        assert_eq!(ctl.state(), ExecutionState::Exited, "fatal errors end the session");
    }

    #[test]
    fn test_return_on_empty_stack_is_fatal() {
        let mut ctl = TraceController::new();
        let result = ctl.handle_event(ev(EventKind::Return, 1));
        assert_eq!(result, Err(DebugError::EmptyStack));
        assert_eq!(ctl.state(), ExecutionState::Exited);
    }

    #[test]
    fn test_toggle_breakpoint_does_not_resume() {
        let mut ctl = TraceController::new();
        ctl.set_mode(StepMode::StepInto);
        let mut feed = ScriptedFeed::from_events(abc_program());
        run_until_suspend(&mut ctl, &mut feed).expect("suspend at entry");

        assert_eq!(ctl.toggle_breakpoint(loc(40)), Ok(true));
        assert_eq!(ctl.toggle_breakpoint(loc(40)), Ok(false));
        assert_eq!(
            ctl.state(),
            ExecutionState::Suspended,
            "toggling may be issued without resuming"
        );
    }

    #[test]
    fn test_navigate_stack_clamps_to_bounds() {
        let mut ctl = TraceController::new();
        ctl.breakpoints_mut().set(loc(21));
        let mut feed = ScriptedFeed::from_events(abc_program());
        run_until_suspend(&mut ctl, &mut feed).expect("suspend inside C");

        assert_eq!(ctl.context().inspected_index(), 2, "inspection starts at the top");

        let outermost = ctl.navigate_stack(-10).expect("clamped, not wrapped").clone();
        assert_eq!(ctl.context().inspected_index(), 0);
        assert_eq!(outermost.location, loc(2), "A's frame sits at its last line event");

        ctl.navigate_stack(99).expect("clamped to the top");
        assert_eq!(ctl.context().inspected_index(), 2);
    }

    #[test]
    fn test_locals_snapshot_reaches_suspended_frame() {
        let events = vec![
            ev(EventKind::Call, 1),
            ev(EventKind::Line, 2).with_locals(vec![
                ("count".to_string(), "3".to_string()),
                ("name".to_string(), "alice".to_string()),
            ]),
        ];
        let mut ctl = TraceController::new();
        ctl.set_mode(StepMode::StepInto);
        let mut feed = ScriptedFeed::from_events(events);

        run_until_suspend(&mut ctl, &mut feed).expect("suspend at line 2");
        let frame = ctl.inspected_frame().expect("one live frame");
        assert_eq!(frame.locals[0], ("count".to_string(), "3".to_string()));
        assert_eq!(frame.locals[1], ("name".to_string(), "alice".to_string()));
    }
}

#[cfg(test)]
mod context_tests {
    use super::*;

    #[test]
    fn test_update_top_preserves_frame_identity() {
        let mut ctx = ExecutionContext::new();
        let id = ctx.push(loc(1), Vec::new()).expect("first call");

        ctx.update_top(loc(2), vec![("x".to_string(), "1".to_string())])
            .expect("line event");
        let top = ctx.top().expect("frame still live");
        assert_eq!(top.id, id, "line events never replace the frame");
        assert_eq!(top.location, loc(2));

        let inner = ctx.push(loc(10), Vec::new()).expect("nested call");
        assert_ne!(inner, id, "each call gets a fresh identity");
    }

    #[test]
    fn test_caller_ordering_invariant() {
        let mut ctx = ExecutionContext::new();
        ctx.push(loc(1), Vec::new()).expect("A");
        ctx.push(loc(10), Vec::new()).expect("B");
        ctx.push(loc(20), Vec::new()).expect("C");

        // Index 0 is the outermost frame; each frame's caller is the one
        // directly below it.
        let lines: Vec<usize> = ctx.stack().iter().map(|f| f.location.line).collect();
        assert_eq!(lines, vec![1, 10, 20]);

        let popped = ctx.pop().expect("C returns");
        assert_eq!(popped.location, loc(20));
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_push_after_outermost_return_is_corruption() {
        let mut ctx = ExecutionContext::new();
        ctx.push(loc(1), Vec::new()).expect("enter");
        ctx.pop().expect("outermost return");

        assert!(
            matches!(ctx.push(loc(5), Vec::new()), Err(DebugError::StackCorruption(_))),
            "no call can follow the outermost return"
        );
    }

    #[test]
    fn test_pop_empty_is_empty_stack() {
        let mut ctx = ExecutionContext::new();
        assert_eq!(ctx.pop().unwrap_err(), DebugError::EmptyStack);
        assert_eq!(
            ctx.update_top(loc(1), Vec::new()).unwrap_err(),
            DebugError::EmptyStack
        );
    }
}

#[cfg(test)]
mod feed_tests {
    use super::*;

    #[test]
    fn test_parse_script_with_quoting_and_locals() {
        let script = r#"
# a tiny program
call "my prog.py" 1
line "my prog.py" 2 n=1 msg="hello world"
return "my prog.py" 2
"#;
        let events = parse_script(script).expect("script parses");
        assert_eq!(events.len(), 3, "comments and blanks are skipped");
        assert_eq!(events[0].kind, EventKind::Call);
        assert_eq!(events[0].location, SourceLocation::new("my prog.py", 1));
        assert_eq!(
            events[1].locals,
            vec![
                ("n".to_string(), "1".to_string()),
                ("msg".to_string(), "hello world".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_script_rejects_bad_input() {
        let err = parse_script("jump prog.py 1").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unknown event kind"));

        let err = parse_script("call prog.py 0").unwrap_err();
        assert!(err.message.contains("1-based"));

        let err = parse_script("line prog.py 2 oops").unwrap_err();
        assert!(err.message.contains("malformed local binding"));

        let err = parse_script("line prog.py").unwrap_err();
        assert!(err.message.contains("expected"));
    }

    #[test]
    fn test_scripted_feed_replays_in_order() {
        let mut feed =
            ScriptedFeed::from_script("call a.py 1\nline a.py 2\nreturn a.py 2").expect("parses");
        assert_eq!(feed.next_event().map(|e| e.kind), Some(EventKind::Call));
        assert_eq!(feed.next_event().map(|e| e.kind), Some(EventKind::Line));
        assert_eq!(feed.next_event().map(|e| e.kind), Some(EventKind::Return));
        assert_eq!(feed.next_event(), None);
    }
}

#[cfg(test)]
mod persist_tests {
    use super::*;
    use std::fs;
    use trace_debugger::persist::{load_breakpoints, save_breakpoints};

    #[test]
    fn test_breakpoint_roundtrip_keeps_order_and_drops_disabled() {
        let path = std::path::PathBuf::from("test_breakpoints.json");

        let mut bps = Breakpoints::new();
        bps.toggle(loc(30));
        bps.toggle(loc(10));
        bps.toggle(loc(20));
        bps.toggle(loc(10)); // disabled, must not persist

        save_breakpoints(&bps, &path).expect("save");
        let restored = load_breakpoints(&path).expect("load");
        let _ = fs::remove_file(&path);

        assert_eq!(restored, vec![loc(30), loc(20)], "enabled only, insertion order");

        let mut fresh = Breakpoints::new();
        for location in restored {
            fresh.set(location);
        }
        assert!(fresh.is_set(&loc(30)));
        assert!(fresh.is_set(&loc(20)));
        assert!(!fresh.is_set(&loc(10)));
    }
}
