//! Hook registry and dispatch
//!
//! Before-callbacks run in registration order, each seeing the context the
//! previous one returned. The first failing before-callback stops the chain
//! and the command is not run. After-callbacks then run in reverse order for
//! every hook whose before-callback was called, failed one included. The
//! last error seen wins.

use std::sync::Arc;

use tracing::debug;

use crate::command::Cmder;
use crate::context::Context;
use crate::error::{HookError, Result};
use crate::hook::Hook;

#[derive(Clone, Default)]
pub struct Hooks {
    hooks: Vec<Arc<dyn Hook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hook(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run `f` for a single command with every hook around it
    pub fn process<T, F>(&self, ctx: &Context, cmd: &dyn Cmder, f: F) -> Result<T>
    where
        F: FnOnce(&Context) -> Result<T>,
    {
        if self.hooks.is_empty() {
            return f(ctx);
        }

        let mut ctx = ctx.clone();
        let mut ran = 0;
        let mut failed = None;
        for hook in &self.hooks {
            ran += 1;
            match hook.before_process(&ctx, cmd) {
                Ok(next) => ctx = next,
                Err(e) => {
                    debug!(error = %e, "before_process hook failed");
                    failed = Some(e);
                    break;
                }
            }
        }

        let mut result = match failed {
            Some(e) => Err(e),
            None => f(&ctx),
        };

        for hook in self.hooks[..ran].iter().rev() {
            if let Err(e) = hook.after_process(&ctx, cmd) {
                debug!(error = %e, "after_process hook failed");
                result = Err(e);
            }
        }
        result
    }

    /// Run `f` for a pipeline with every hook around it
    pub fn process_pipeline<T, F>(&self, ctx: &Context, cmds: &[&dyn Cmder], f: F) -> Result<T>
    where
        F: FnOnce(&Context) -> Result<T>,
    {
        if self.hooks.is_empty() {
            return f(ctx);
        }

        let mut ctx = ctx.clone();
        let mut ran = 0;
        let mut failed: Option<HookError> = None;
        for hook in &self.hooks {
            ran += 1;
            match hook.before_process_pipeline(&ctx, cmds) {
                Ok(next) => ctx = next,
                Err(e) => {
                    debug!(error = %e, commands = cmds.len(), "before_process_pipeline hook failed");
                    failed = Some(e);
                    break;
                }
            }
        }

        let mut result = match failed {
            Some(e) => Err(e),
            None => f(&ctx),
        };

        for hook in self.hooks[..ran].iter().rev() {
            if let Err(e) = hook.after_process_pipeline(&ctx, cmds) {
                debug!(error = %e, commands = cmds.len(), "after_process_pipeline hook failed");
                result = Err(e);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apm::RecordingTracer;
    use crate::hook::ApmHook;
    use parking_lot::Mutex;

    #[derive(Clone, Copy)]
    struct Mark(&'static str);

    /// Logs every callback and can fail on demand
    struct LoggingHook {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_before: bool,
        fail_after: bool,
    }

    impl LoggingHook {
        fn new(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Self {
            LoggingHook {
                name,
                log: log.clone(),
                fail_before: false,
                fail_after: false,
            }
        }

        fn push(&self, event: &str) {
            self.log.lock().push(format!("{}:{}", self.name, event));
        }
    }

    impl Hook for LoggingHook {
        fn before_process(&self, ctx: &Context, _cmd: &dyn Cmder) -> Result<Context> {
            self.push("before");
            if self.fail_before {
                return Err(HookError::Hook(format!("{} refused", self.name)));
            }
            Ok(ctx.with_value(Mark(self.name)))
        }

        fn after_process(&self, ctx: &Context, _cmd: &dyn Cmder) -> Result<()> {
            let seen = ctx.value::<Mark>().map(|m| m.0).unwrap_or("-");
            self.push(&format!("after({})", seen));
            if self.fail_after {
                return Err(HookError::Hook(format!("{} after failed", self.name)));
            }
            Ok(())
        }

        fn before_process_pipeline(&self, ctx: &Context, cmds: &[&dyn Cmder]) -> Result<Context> {
            self.push(&format!("before_pipeline({})", cmds.len()));
            Ok(ctx.clone())
        }

        fn after_process_pipeline(&self, _ctx: &Context, cmds: &[&dyn Cmder]) -> Result<()> {
            self.push(&format!("after_pipeline({})", cmds.len()));
            Ok(())
        }
    }

    #[test]
    fn test_no_hooks_runs_command() {
        let hooks = Hooks::new();
        let value = hooks
            .process(&Context::background(), &"get", |_| Ok(42))
            .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_order_and_context_threading() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = Hooks::new();
        hooks.add_hook(Arc::new(LoggingHook::new("a", &log)));
        hooks.add_hook(Arc::new(LoggingHook::new("b", &log)));

        let seen = hooks
            .process(&Context::background(), &"get", |ctx| {
                Ok(ctx.value::<Mark>().map(|m| m.0))
            })
            .unwrap();

        assert_eq!(seen, Some("b"));
        assert_eq!(
            *log.lock(),
            vec!["a:before", "b:before", "b:after(b)", "a:after(b)"]
        );
    }

    #[test]
    fn test_failed_before_skips_command() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = LoggingHook::new("b", &log);
        failing.fail_before = true;

        let mut hooks = Hooks::new();
        hooks.add_hook(Arc::new(LoggingHook::new("a", &log)));
        hooks.add_hook(Arc::new(failing));
        hooks.add_hook(Arc::new(LoggingHook::new("c", &log)));

        let mut ran = false;
        let result = hooks.process(&Context::background(), &"get", |_| {
            ran = true;
            Ok(())
        });

        assert!(!ran);
        assert!(matches!(result, Err(HookError::Hook(ref msg)) if msg == "b refused"));
        assert_eq!(
            *log.lock(),
            vec!["a:before", "b:before", "b:after(a)", "a:after(a)"]
        );
    }

    #[test]
    fn test_after_error_overrides_result() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = LoggingHook::new("a", &log);
        failing.fail_after = true;

        let mut hooks = Hooks::new();
        hooks.add_hook(Arc::new(failing));

        let result = hooks.process(&Context::background(), &"get", |_| Ok(1));
        assert!(matches!(result, Err(HookError::Hook(_))));
    }

    #[test]
    fn test_command_error_propagates_and_span_still_ends() {
        let tracer = RecordingTracer::new();
        let mut hooks = Hooks::new();
        hooks.add_hook(Arc::new(ApmHook::new(tracer.clone())));

        let result: Result<()> = hooks.process(&Context::background(), &"get", |_| {
            Err(HookError::Command(redis::RedisError::from((
                redis::ErrorKind::ResponseError,
                "WRONGTYPE",
            ))))
        });

        assert!(matches!(result, Err(HookError::Command(_))));
        assert_eq!(tracer.ended_ids().len(), 1);
        assert!(tracer.open_spans().is_empty());
    }

    #[test]
    fn test_pipeline_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tracer = RecordingTracer::new();
        let mut hooks = Hooks::new();
        hooks.add_hook(Arc::new(LoggingHook::new("a", &log)));
        hooks.add_hook(Arc::new(ApmHook::new(tracer.clone())));

        let cmds: [&dyn Cmder; 2] = [&"incr", &"expire"];
        hooks
            .process_pipeline(&Context::background(), &cmds, |_| Ok(()))
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec!["a:before_pipeline(2)", "a:after_pipeline(2)"]
        );
        assert_eq!(tracer.ended()[0].name, "INCR, EXPIRE");
    }
}
