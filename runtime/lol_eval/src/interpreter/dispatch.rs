//! Per-kind node evaluation and continuation semantics.
//!
//! One handler per node kind, exhaustively matched. Terminal kinds produce
//! a value on the spot; non-terminal kinds push a batch for their children
//! and finish inside [`Interpreter::run_continuation`] once those have
//! values. `ArgList` and `LoopOperation` have no handler of their own —
//! they are consumed structurally by `FunctionCall` and `Loop` — so
//! dispatching one is a tree-shape error.

use std::rc::Rc;

use lol_ir::{Literal, LoopCheck, LoopDirection, NodeId, NodeKind, Program};

use crate::builtins::{add_values, apply_cast};
use crate::errors::{not_a_function, not_implemented, EvalResult};
use crate::scope::{Frame, FrameTag, IT, RETURN_SPECIAL};
use crate::value::{FunctionValue, UserFunction, Value};

use super::call::{index_read, index_write};
use super::scheduler::{BatchOptions, ContOutcome, Continuation, Step};
use super::Interpreter;

fn single(results: Vec<Value>) -> Value {
    results.into_iter().next().unwrap_or(Value::Null)
}

fn pair(results: Vec<Value>) -> (Value, Value) {
    let mut results = results.into_iter();
    let a = results.next().unwrap_or(Value::Null);
    let b = results.next().unwrap_or(Value::Null);
    (a, b)
}

impl Interpreter {
    /// Evaluate a single node, by kind.
    pub(crate) fn dispatch(&mut self, id: NodeId) -> EvalResult<Step> {
        let program = self.program()?;
        let node = &program.arena[id];
        match &node.kind {
            NodeKind::Literal { value } => self.eval_literal(value),
            NodeKind::Identifier { name } => self.eval_identifier(name),
            NodeKind::Declaration { name, init } => self.eval_declaration(name, *init),
            NodeKind::Assignment { target, value } => {
                self.wait_for(
                    vec![*value],
                    Continuation::Assign { target: *target },
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::Body { lines } => {
                self.wait_for(
                    lines.clone(),
                    Continuation::FinishBody,
                    BatchOptions::STATEMENTS,
                );
                Ok(Step::Pending)
            }
            NodeKind::If { condition, .. } => match condition {
                Some(cond) => {
                    self.wait_for(
                        vec![*cond],
                        Continuation::IfBranch { node: id },
                        BatchOptions::default(),
                    );
                    Ok(Step::Pending)
                }
                // a bare conditional tests the previous statement's value
                None => {
                    let it = self.scope.borrow().get(IT)?;
                    match self.pick_if_branch(id, it.is_truthy())? {
                        ContOutcome::Value(value) => Ok(Step::Value(value)),
                        ContOutcome::Pending => Ok(Step::Pending),
                    }
                }
            },
            NodeKind::FunctionCall { name, args } => {
                let values = arg_values(&program, *args)?;
                self.wait_for(
                    values,
                    Continuation::Invoke { name: name.clone() },
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::FunctionDefinition { name, params, body } => {
                let function = Value::Function(FunctionValue::User(Rc::new(UserFunction {
                    name: name.clone(),
                    params: params.clone(),
                    body: *body,
                })));
                self.scope.borrow_mut().set(name, function);
                Ok(Step::Value(Value::Null))
            }
            NodeKind::Return { expression } => match expression {
                Some(expr) => {
                    self.wait_for(
                        vec![*expr],
                        Continuation::RecordReturn,
                        BatchOptions::default(),
                    );
                    Ok(Step::Pending)
                }
                None => {
                    self.scope
                        .borrow_mut()
                        .set_special(RETURN_SPECIAL, Value::Null);
                    Ok(Step::Value(Value::Null))
                }
            },
            NodeKind::Cast { expression, target } => {
                self.wait_for(
                    vec![*expression],
                    Continuation::ApplyCast {
                        target: target.clone(),
                    },
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::Indexer { container, index } => {
                self.wait_for(
                    vec![*container, *index],
                    Continuation::IndexRead,
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::Visible { expression } => {
                self.wait_for(
                    vec![*expression],
                    Continuation::Emit,
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::Gimmeh { variable } => self.eval_gimmeh(variable),
            NodeKind::Loop { op, .. } => self.eval_loop(id, *op),
            NodeKind::LoopCondition { check, expression } => {
                self.wait_for(
                    vec![*expression],
                    Continuation::LoopPolarity {
                        negate: *check == LoopCheck::Until,
                    },
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            NodeKind::Breakpoint => {
                self.pause();
                Ok(Step::Value(Value::Null))
            }
            NodeKind::NoOp => Ok(Step::Value(Value::Null)),
            NodeKind::ArgList { .. } | NodeKind::LoopOperation { .. } => {
                Err(not_implemented(node.kind.name()))
            }
        }
    }

    fn eval_literal(&mut self, literal: &Literal) -> EvalResult<Step> {
        match literal {
            Literal::Null => Ok(Step::Value(Value::Null)),
            Literal::Bool(b) => Ok(Step::Value(Value::Bool(*b))),
            Literal::Number(n) => Ok(Step::Value(Value::Number(*n))),
            Literal::Str(s) => Ok(Step::Value(Value::string(s.clone()))),
            Literal::Seq(elements) => {
                self.wait_for(
                    elements.clone(),
                    Continuation::CollectList,
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
        }
    }

    /// A bare name resolving to a function invokes it with zero arguments;
    /// anything else is just read.
    fn eval_identifier(&mut self, name: &str) -> EvalResult<Step> {
        let value = self.scope.borrow().get(name)?;
        match value {
            Value::Function(function) => self.call_function(function, Vec::new()),
            other => Ok(Step::Value(other)),
        }
    }

    fn eval_declaration(&mut self, name: &str, init: Option<NodeId>) -> EvalResult<Step> {
        match init {
            Some(init) => {
                self.wait_for(
                    vec![init],
                    Continuation::Declare {
                        name: name.to_string(),
                    },
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
            None => {
                self.scope.borrow_mut().set(name, Value::Null);
                Ok(Step::Value(Value::Null))
            }
        }
    }

    fn eval_gimmeh(&mut self, variable: &str) -> EvalResult<Step> {
        let reply = self.io.prompt("").map_or(Value::Null, Value::string);
        self.scope.borrow_mut().set(variable, reply.clone());
        Ok(Step::Value(reply))
    }

    fn eval_loop(&mut self, id: NodeId, op: Option<NodeId>) -> EvalResult<Step> {
        if let Some(op) = op {
            let (_, symbol) = self.loop_op_parts(op)?;
            // an undeclared counter springs into being at zero
            let mut scope = self.scope.borrow_mut();
            if !scope.is_declared(&symbol) {
                scope.set(&symbol, Value::Number(0.0));
            }
        }
        self.scope.borrow_mut().push(Frame::new(FrameTag::Loop));
        self.arm_loop(id)?;
        Ok(Step::Pending)
    }

    /// Run the second half of a node whose children now have values.
    pub(crate) fn run_continuation(
        &mut self,
        cont: Continuation,
        results: Vec<Value>,
    ) -> EvalResult<ContOutcome> {
        match cont {
            Continuation::Finish | Continuation::FinishBody => Ok(ContOutcome::Value(
                results.into_iter().last().unwrap_or(Value::Null),
            )),
            Continuation::CollectList => Ok(ContOutcome::Value(Value::list(results))),
            Continuation::IndexRead => {
                let (container, index) = pair(results);
                Ok(ContOutcome::Value(index_read(&container, &index)?))
            }
            Continuation::Declare { name } => {
                let value = single(results);
                self.scope.borrow_mut().set(&name, value.clone());
                Ok(ContOutcome::Value(value))
            }
            Continuation::Assign { target } => self.assign_target(target, single(results)),
            Continuation::IndexWrite { value } => {
                let (container, index) = pair(results);
                index_write(&container, &index, value.clone())?;
                Ok(ContOutcome::Value(value))
            }
            Continuation::IfBranch { node } => {
                let condition = single(results);
                self.pick_if_branch(node, condition.is_truthy())
            }
            Continuation::ElseIfBranch { node, index } => {
                let condition = single(results);
                if condition.is_truthy() {
                    let clause = self.else_if_clause(node, index)?;
                    self.wait_for(
                        vec![clause.body],
                        Continuation::DiscardBranch,
                        BatchOptions::default(),
                    );
                    Ok(ContOutcome::Pending)
                } else {
                    self.next_if_clause(node, index + 1)
                }
            }
            Continuation::DiscardBranch => Ok(ContOutcome::Value(Value::Null)),
            Continuation::Invoke { name } => {
                let callee = self.scope.borrow().get(&name)?;
                let Value::Function(function) = callee else {
                    return Err(not_a_function(name));
                };
                match self.call_function(function, results)? {
                    Step::Value(value) => Ok(ContOutcome::Value(value)),
                    Step::Pending => Ok(ContOutcome::Pending),
                }
            }
            Continuation::FinishCall => {
                let result = {
                    let scope = self.scope.borrow();
                    match scope.get_special(RETURN_SPECIAL) {
                        Some(value) => value,
                        None => scope.get(IT).unwrap_or(Value::Null),
                    }
                };
                self.scope.borrow_mut().pop(FrameTag::Function)?;
                Ok(ContOutcome::Value(result))
            }
            Continuation::RecordReturn => {
                let value = single(results);
                self.scope
                    .borrow_mut()
                    .set_special(RETURN_SPECIAL, value.clone());
                Ok(ContOutcome::Value(value))
            }
            Continuation::ApplyCast { target } => {
                let value = single(results);
                Ok(ContOutcome::Value(apply_cast(&value, &target)?))
            }
            Continuation::Emit => {
                let value = single(results);
                self.io.visible(&value.to_yarn());
                Ok(ContOutcome::Value(value))
            }
            Continuation::LoopGuard { node } => {
                let guard = single(results);
                if guard.is_truthy() {
                    let (body, _) = self.loop_parts(node)?;
                    self.wait_for(
                        vec![body],
                        Continuation::LoopStep { node },
                        BatchOptions::default(),
                    );
                    Ok(ContOutcome::Pending)
                } else {
                    self.leave_loop()
                }
            }
            Continuation::LoopStep { node } => {
                // a pending return ends the loop as well as the body
                let returning = self.scope.borrow().get_special(RETURN_SPECIAL).is_some();
                if returning {
                    return self.leave_loop();
                }
                self.apply_loop_op(node)?;
                self.arm_loop(node)?;
                Ok(ContOutcome::Pending)
            }
            Continuation::LoopPolarity { negate } => {
                let value = single(results);
                Ok(ContOutcome::Value(if negate {
                    Value::Bool(!value.is_truthy())
                } else {
                    value
                }))
            }
        }
    }

    /// Finish an assignment once its value is known: plain targets bind,
    /// indexed targets evaluate container and index next.
    fn assign_target(&mut self, target: NodeId, value: Value) -> EvalResult<ContOutcome> {
        let program = self.program()?;
        match &program.arena[target].kind {
            NodeKind::Identifier { name } => {
                self.scope.borrow_mut().set(name, value.clone());
                Ok(ContOutcome::Value(value))
            }
            NodeKind::Indexer { container, index } => {
                self.wait_for(
                    vec![*container, *index],
                    Continuation::IndexWrite { value },
                    BatchOptions::default(),
                );
                Ok(ContOutcome::Pending)
            }
            other => Err(not_implemented(other.name())),
        }
    }

    fn pick_if_branch(&mut self, node: NodeId, taken: bool) -> EvalResult<ContOutcome> {
        if taken {
            let program = self.program()?;
            let NodeKind::If { body, .. } = &program.arena[node].kind else {
                return Err(not_implemented(program.arena[node].kind.name()));
            };
            self.wait_for(
                vec![*body],
                Continuation::DiscardBranch,
                BatchOptions::default(),
            );
            Ok(ContOutcome::Pending)
        } else {
            self.next_if_clause(node, 0)
        }
    }

    /// Try the else-if clause at `index`, falling through to the else body
    /// (or null) once the clauses run out.
    fn next_if_clause(&mut self, node: NodeId, index: usize) -> EvalResult<ContOutcome> {
        let program = self.program()?;
        let NodeKind::If {
            else_ifs,
            else_body,
            ..
        } = &program.arena[node].kind
        else {
            return Err(not_implemented(program.arena[node].kind.name()));
        };
        if let Some(clause) = else_ifs.get(index) {
            self.wait_for(
                vec![clause.condition],
                Continuation::ElseIfBranch { node, index },
                BatchOptions::default(),
            );
            Ok(ContOutcome::Pending)
        } else if let Some(else_body) = else_body {
            self.wait_for(
                vec![*else_body],
                Continuation::DiscardBranch,
                BatchOptions::default(),
            );
            Ok(ContOutcome::Pending)
        } else {
            Ok(ContOutcome::Value(Value::Null))
        }
    }

    fn else_if_clause(&self, node: NodeId, index: usize) -> EvalResult<lol_ir::ElseIf> {
        let program = self.program()?;
        let NodeKind::If { else_ifs, .. } = &program.arena[node].kind else {
            return Err(not_implemented(program.arena[node].kind.name()));
        };
        else_ifs
            .get(index)
            .copied()
            .ok_or_else(|| not_implemented("else-if clause"))
    }

    /// Body and optional guard of a `Loop` node.
    pub(crate) fn loop_parts(&self, node: NodeId) -> EvalResult<(NodeId, Option<NodeId>)> {
        let program = self.program()?;
        let NodeKind::Loop {
            body, condition, ..
        } = &program.arena[node].kind
        else {
            return Err(not_implemented(program.arena[node].kind.name()));
        };
        Ok((*body, *condition))
    }

    fn loop_op_parts(&self, op: NodeId) -> EvalResult<(LoopDirection, String)> {
        let program = self.program()?;
        let NodeKind::LoopOperation { direction, symbol } = &program.arena[op].kind else {
            return Err(not_implemented(program.arena[op].kind.name()));
        };
        Ok((*direction, symbol.clone()))
    }

    /// Step the loop counter after an iteration. Incrementing shares the
    /// addition semantics of `SUM OF`, so a text counter concatenates.
    fn apply_loop_op(&mut self, node: NodeId) -> EvalResult<()> {
        let program = self.program()?;
        let NodeKind::Loop { op: Some(op), .. } = &program.arena[node].kind else {
            return Ok(());
        };
        let (direction, symbol) = self.loop_op_parts(*op)?;
        let current = self.scope.borrow().get(&symbol)?;
        let next = match direction {
            LoopDirection::Increment => add_values(&current, &Value::Number(1.0)),
            LoopDirection::Decrement => Value::Number(current.to_number() - 1.0),
        };
        self.scope.borrow_mut().set(&symbol, next);
        Ok(())
    }
}

/// The child expressions of a call's `ArgList` node.
fn arg_values(program: &Program, args: NodeId) -> EvalResult<Vec<NodeId>> {
    match &program.arena[args].kind {
        NodeKind::ArgList { values } => Ok(values.clone()),
        other => Err(not_implemented(other.name())),
    }
}
