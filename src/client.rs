//! Hooked redis connection
//!
//! Wraps any `redis::ConnectionLike` so that commands and pipelines sent
//! through it run inside the registered hook chain.

use std::sync::Arc;

use redis::{Cmd, ConnectionLike, FromRedisValue, Pipeline};

use crate::command::Cmder;
use crate::context::Context;
use crate::error::Result;
use crate::hook::Hook;
use crate::hooks::Hooks;

pub struct HookedConnection<C> {
    inner: C,
    hooks: Hooks,
}

impl<C: ConnectionLike> HookedConnection<C> {
    pub fn new(inner: C) -> Self {
        Self::with_hooks(inner, Hooks::new())
    }

    pub fn with_hooks(inner: C, hooks: Hooks) -> Self {
        HookedConnection { inner, hooks }
    }

    pub fn add_hook(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.add_hook(hook);
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Send a single command through the hook chain
    pub fn query<T: FromRedisValue>(&mut self, ctx: &Context, cmd: &Cmd) -> Result<T> {
        let inner = &mut self.inner;
        self.hooks
            .process(ctx, cmd, |_| cmd.query(inner).map_err(Into::into))
    }

    /// Send a pipeline through the hook chain as one unit
    pub fn query_pipeline<T: FromRedisValue>(
        &mut self,
        ctx: &Context,
        pipe: &Pipeline,
    ) -> Result<T> {
        let cmds: Vec<&dyn Cmder> = pipe.cmd_iter().map(|c| c as &dyn Cmder).collect();
        let inner = &mut self.inner;
        self.hooks
            .process_pipeline(ctx, &cmds, |_| pipe.query(inner).map_err(Into::into))
    }
}
