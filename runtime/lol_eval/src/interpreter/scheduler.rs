//! The work scheduler: explicit batches of pending sibling evaluations.
//!
//! Evaluating a node with sub-expressions never recurses on the native call
//! stack. A handler pushes a [`Batch`] of child nodes plus a
//! [`Continuation`] describing what to do with their values, then returns.
//! All in-flight state therefore lives on one LIFO stack owned by the
//! interpreter, which is what makes mid-expression pause and resume
//! possible: suspension points sit between any two [`advance_one`] steps.
//!
//! [`advance_one`]: Interpreter::advance_one

use std::collections::VecDeque;

use lol_ir::NodeId;

use crate::errors::EvalResult;
use crate::scope::{FrameTag, IT, RETURN_SPECIAL};
use crate::value::Value;

use super::Interpreter;

/// How a batch binds results as it accumulates them.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct BatchOptions {
    /// Bind `IT` to each node's value as it completes, before the next
    /// sibling runs.
    pub bind_it: bool,
    /// Complete early once a `return` special appears on the enclosing
    /// function frame, skipping the remaining siblings.
    pub stop_on_return: bool,
}

impl BatchOptions {
    /// The options every statement sequence runs under.
    pub(crate) const STATEMENTS: BatchOptions = BatchOptions {
        bind_it: true,
        stop_on_return: true,
    };
}

/// A group of sibling nodes awaiting evaluation, plus the continuation to
/// run once all of them (or enough of them, under `stop_on_return`) have
/// values.
#[derive(Debug)]
pub(crate) struct Batch {
    pub nodes: VecDeque<NodeId>,
    pub results: Vec<Value>,
    pub cont: Continuation,
    pub options: BatchOptions,
    /// True while one of this batch's nodes is mid-evaluation, possibly deep
    /// in child batches. Guards against completing the batch out from under
    /// its own child.
    pub in_progress: bool,
}

impl Batch {
    pub fn new(nodes: Vec<NodeId>, cont: Continuation, options: BatchOptions) -> Self {
        Batch {
            nodes: nodes.into(),
            results: Vec::new(),
            cont,
            options,
            in_progress: false,
        }
    }
}

/// What to do when a batch's results are complete — the reified form of the
/// "evaluate these, then ..." callback every non-terminal node hangs its
/// second half on.
#[derive(Debug)]
pub(crate) enum Continuation {
    /// Top of the program: the last result is the final value.
    Finish,
    /// Collect element values into a fresh list.
    CollectList,
    /// `[container, index]` evaluated for an indexed read.
    IndexRead,
    /// `[value]` evaluated for a declaration; bind the name.
    Declare { name: String },
    /// `[value]` evaluated for an assignment; resolve the target next.
    Assign { target: NodeId },
    /// `[container, index]` for an indexed write of an already-evaluated
    /// value.
    IndexWrite { value: Value },
    /// Statement sequence finished; deliver the last value.
    FinishBody,
    /// `[condition]` of an `If`; pick a branch.
    IfBranch { node: NodeId },
    /// `[condition]` of the else-if clause at `index`; take it or move on.
    ElseIfBranch { node: NodeId, index: usize },
    /// A conditional branch body finished. Conditionals are statements, so
    /// the result is always null.
    DiscardBranch,
    /// `[args...]` evaluated; resolve the callee and invoke it.
    Invoke { name: String },
    /// Function body finished; read the return signal and pop the frame.
    FinishCall,
    /// `[value]` of a `Return`; record the signal on the function frame.
    RecordReturn,
    /// `[value]` of a `Cast`.
    ApplyCast { target: String },
    /// `[value]` of a `Visible`; stringify and emit.
    Emit,
    /// `[value]` of a loop guard; iterate or leave the loop.
    LoopGuard { node: NodeId },
    /// Loop body finished; apply the counter operation and re-check.
    LoopStep { node: NodeId },
    /// `[value]` of a `LoopCondition`; apply the while/until polarity.
    LoopPolarity { negate: bool },
}

/// Result of running a continuation.
pub(crate) enum ContOutcome {
    Value(Value),
    Pending,
}

/// Result of dispatching one node.
pub(crate) enum Step {
    Value(Value),
    Pending,
}

impl Interpreter {
    /// Defer `cont` until `nodes` have been evaluated, left to right.
    ///
    /// Returns immediately; the caller's stack frame is gone before any
    /// child node runs.
    pub(crate) fn wait_for(&mut self, nodes: Vec<NodeId>, cont: Continuation, options: BatchOptions) {
        self.work.push(Batch::new(nodes, cont, options));
    }

    /// Advance the evaluation by a single node (or batch completion).
    ///
    /// Returns `Ok(true)` when this step finished the whole program.
    pub(crate) fn advance_one(&mut self) -> EvalResult<bool> {
        let (node, batch_done) = match self.work.last_mut() {
            None => return Ok(false),
            Some(top) => match top.nodes.pop_front() {
                Some(node) => {
                    top.in_progress = true;
                    (Some(node), false)
                }
                // a child batch is still delivering into this one
                None if top.in_progress => (None, false),
                // the batch never had nodes (empty body, empty arguments)
                None => (None, true),
            },
        };
        if let Some(node) = node {
            self.current = Some(self.node_span(node));
            return match self.dispatch(node)? {
                Step::Value(value) => self.complete_value(value),
                Step::Pending => Ok(false),
            };
        }
        if batch_done {
            return self.complete_top_batch();
        }
        Ok(false)
    }

    /// Pop the finished top batch and run its continuation.
    fn complete_top_batch(&mut self) -> EvalResult<bool> {
        let Some(batch) = self.work.pop() else {
            return Ok(false);
        };
        match self.run_continuation(batch.cont, batch.results)? {
            ContOutcome::Value(value) => self.complete_value(value),
            ContOutcome::Pending => Ok(false),
        }
    }

    /// Deliver a finished node's value to the batch that issued it,
    /// cascading through every batch this completes.
    ///
    /// Binds `IT` under `bind_it` and short-circuits remaining siblings
    /// under `stop_on_return` — early-return propagation through a
    /// statement sequence without unwinding anything.
    pub(crate) fn complete_value(&mut self, value: Value) -> EvalResult<bool> {
        let mut value = value;
        loop {
            let Some(top) = self.work.last_mut() else {
                return Ok(self.finish_program(value));
            };
            top.in_progress = false;
            if top.options.bind_it {
                self.scope.borrow_mut().set(IT, value.clone());
            }
            top.results.push(value);
            let returning = top.options.stop_on_return
                && self.scope.borrow().get_special(RETURN_SPECIAL).is_some();
            if !top.nodes.is_empty() && !returning {
                // more siblings; the next step dispatches them
                return Ok(false);
            }
            let Some(batch) = self.work.pop() else {
                return Ok(false);
            };
            match self.run_continuation(batch.cont, batch.results)? {
                ContOutcome::Value(next) => value = next,
                ContOutcome::Pending => return Ok(false),
            }
        }
    }

    /// Re-arm the next iteration of a loop: guard first when present, the
    /// body directly otherwise.
    pub(crate) fn arm_loop(&mut self, node: NodeId) -> EvalResult<()> {
        let (body, condition) = self.loop_parts(node)?;
        match condition {
            Some(guard) => self.wait_for(
                vec![guard],
                Continuation::LoopGuard { node },
                BatchOptions::default(),
            ),
            None => self.wait_for(
                vec![body],
                Continuation::LoopStep { node },
                BatchOptions::default(),
            ),
        }
        Ok(())
    }

    /// Leave the loop owning `Loop`-tagged frame and deliver null.
    pub(crate) fn leave_loop(&mut self) -> EvalResult<ContOutcome> {
        self.scope.borrow_mut().pop(FrameTag::Loop)?;
        Ok(ContOutcome::Value(Value::Null))
    }
}
