// src/dag/plan.rs

//! Composite task plans and the `sequence` / `parallel` combinators.

use std::fmt;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::engine::TaskName;
use crate::exec::{TaskExecutor, TaskFuture};

/// A tree of tasks.
///
/// - `Task` names a leaf task (or, before resolution, another composite).
/// - `Sequence` runs members strictly in order and stops at the first failure.
/// - `Parallel` starts every member at once and joins on all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Task(TaskName),
    Sequence(Vec<Plan>),
    Parallel(Vec<Plan>),
}

/// `sequence(T1..Tn)`.
pub fn sequence(members: impl IntoIterator<Item = Plan>) -> Plan {
    Plan::Sequence(members.into_iter().collect())
}

/// `parallel(T1..Tn)`.
pub fn parallel(members: impl IntoIterator<Item = Plan>) -> Plan {
    Plan::Parallel(members.into_iter().collect())
}

impl Plan {
    pub fn task(name: impl Into<TaskName>) -> Self {
        Plan::Task(name.into())
    }

    /// Leaf task names in declaration order (duplicates kept).
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Plan::Task(name) => out.push(name),
            Plan::Sequence(members) | Plan::Parallel(members) => {
                for m in members {
                    m.collect_leaves(out);
                }
            }
        }
    }

    /// Execute the plan against `executor`.
    ///
    /// A sequence never starts a member after one has failed and reports that
    /// member's error. A parallel group does not cancel siblings when one
    /// fails: it waits for every member and then reports the first failure in
    /// declaration order.
    pub fn run<'a, E>(&'a self, executor: &'a E) -> TaskFuture<'a>
    where
        E: TaskExecutor + ?Sized,
    {
        Box::pin(async move {
            match self {
                Plan::Task(name) => executor.run_task(name).await,
                Plan::Sequence(members) => {
                    for member in members {
                        member.run(executor).await?;
                    }
                    Ok(())
                }
                Plan::Parallel(members) => {
                    debug!(count = members.len(), "starting parallel group");
                    let results = join_all(members.iter().map(|m| m.run(executor))).await;

                    let mut first_err = None;
                    for result in results {
                        if let Err(err) = result {
                            if first_err.is_none() {
                                first_err = Some(err);
                            } else {
                                warn!(error = %err, "additional failure in parallel group");
                            }
                        }
                    }
                    match first_err {
                        Some(err) => Err(err),
                        None => Ok(()),
                    }
                }
            }
        })
    }

    /// One-line form, e.g. `sequence(clean, parallel(styles, scripts))`.
    pub fn summary(&self) -> String {
        match self {
            Plan::Task(name) => name.clone(),
            Plan::Sequence(members) | Plan::Parallel(members) => {
                let label = if matches!(self, Plan::Sequence(_)) {
                    "sequence"
                } else {
                    "parallel"
                };
                let inner: Vec<String> = members.iter().map(Plan::summary).collect();
                format!("{label}({})", inner.join(", "))
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, prefix: &str, last: bool, top: bool) -> fmt::Result {
        let (branch, child_prefix) = if top {
            (String::new(), String::new())
        } else if last {
            (format!("{prefix}└─ "), format!("{prefix}   "))
        } else {
            (format!("{prefix}├─ "), format!("{prefix}│  "))
        };

        match self {
            Plan::Task(name) => writeln!(f, "{branch}{name}"),
            Plan::Sequence(members) | Plan::Parallel(members) => {
                let label = if matches!(self, Plan::Sequence(_)) {
                    "sequence"
                } else {
                    "parallel"
                };
                writeln!(f, "{branch}{label}")?;
                for (i, m) in members.iter().enumerate() {
                    m.render(f, &child_prefix, i + 1 == members.len(), false)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, "", true, true)
    }
}
