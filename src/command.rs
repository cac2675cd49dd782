//! Command naming
//!
//! The hook only ever needs one thing from a command: its name. `Cmder`
//! captures that, and the helpers here turn raw names into span labels.

use std::borrow::Cow;

use redis::{Arg, Cmd};

/// Label used for a command that carries no name
pub const EMPTY_COMMAND: &str = "(empty command)";

/// Separator between command labels of a pipeline
pub const PIPELINE_SEPARATOR: &str = ", ";

/// A command that can report its raw name
pub trait Cmder {
    fn name(&self) -> Cow<'_, str>;
}

impl Cmder for Cmd {
    /// First argument of the command, lossily decoded
    fn name(&self) -> Cow<'_, str> {
        match self.args_iter().next() {
            Some(Arg::Simple(bytes)) => String::from_utf8_lossy(bytes),
            _ => Cow::Borrowed(""),
        }
    }
}

impl Cmder for str {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl Cmder for String {
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: Cmder + ?Sized> Cmder for &T {
    fn name(&self) -> Cow<'_, str> {
        (**self).name()
    }
}

/// Canonical span label of a single command
#[inline]
pub fn command_name<C: Cmder + ?Sized>(cmd: &C) -> String {
    let name = cmd.name();
    if name.is_empty() {
        EMPTY_COMMAND.to_string()
    } else {
        name.to_uppercase()
    }
}

/// Canonical span label of a pipeline: every command's label, in order
pub fn pipeline_name<C: Cmder>(cmds: &[C]) -> String {
    let mut label = String::new();
    for (i, cmd) in cmds.iter().enumerate() {
        if i != 0 {
            label.push_str(PIPELINE_SEPARATOR);
        }
        label.push_str(&command_name(cmd));
    }
    label
}
