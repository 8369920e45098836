//! Function invocation and container indexing.

use crate::errors::{index_out_of_range, not_indexable, EvalResult};
use crate::scope::{Frame, FrameTag};
use crate::value::{FunctionValue, Value};

use super::scheduler::{BatchOptions, Continuation, Step};
use super::Interpreter;

impl Interpreter {
    /// Invoke a callable with already-evaluated arguments.
    ///
    /// Both shapes push a `Function`-tagged frame. Natives run synchronously
    /// and the frame is popped before their value is delivered; user bodies
    /// go through the scheduler, with `FinishCall` reading the return signal
    /// and popping the frame once the body completes.
    pub(crate) fn call_function(
        &mut self,
        function: FunctionValue,
        args: Vec<Value>,
    ) -> EvalResult<Step> {
        self.scope.borrow_mut().push(Frame::new(FrameTag::Function));
        match function {
            FunctionValue::Native(native) => {
                let result = (native.call)(&args)?;
                self.scope.borrow_mut().pop(FrameTag::Function)?;
                Ok(Step::Value(result))
            }
            FunctionValue::User(function) => {
                {
                    let mut scope = self.scope.borrow_mut();
                    for (i, param) in function.params.iter().enumerate() {
                        // missing trailing arguments bind to null
                        scope.define_local(param, args.get(i).cloned().unwrap_or(Value::Null));
                    }
                }
                self.wait_for(
                    vec![function.body],
                    Continuation::FinishCall,
                    BatchOptions::default(),
                );
                Ok(Step::Pending)
            }
        }
    }
}

/// Read `container[index]`.
///
/// Strings index by character, lists by element. Negative indices normalize
/// by repeated length addition; anything still outside the container is an
/// error.
pub(crate) fn index_read(container: &Value, index: &Value) -> EvalResult {
    match container {
        Value::Str(s) => {
            let position = bounded_index(index, s.chars().count())?;
            Ok(s
                .chars()
                .nth(position)
                .map_or(Value::Null, |c| Value::string(c.to_string())))
        }
        Value::List(items) => {
            let items = items.borrow();
            let position = bounded_index(index, items.len())?;
            Ok(items[position].clone())
        }
        other => Err(not_indexable(other.type_name())),
    }
}

/// Write `container[index] = value`.
///
/// Only lists are writable — string contents have no stable identity to
/// mutate in place. Writing past the end pads with null through the target
/// index.
pub(crate) fn index_write(container: &Value, index: &Value, value: Value) -> EvalResult<()> {
    let Value::List(items) = container else {
        return Err(not_indexable(container.type_name()));
    };
    let mut items = items.borrow_mut();
    let position = normalized_index(index, items.len())?;
    if position >= items.len() {
        items.resize(position + 1, Value::Null);
    }
    items[position] = value;
    Ok(())
}

/// Coerce an index to an integral position, normalizing negatives against
/// `len`. The result may still exceed `len` (the write path pads).
fn normalized_index(index: &Value, len: usize) -> EvalResult<usize> {
    let raw = index.to_number();
    if !raw.is_finite() || raw.fract() != 0.0 {
        return Err(index_out_of_range(raw as i64));
    }
    let position = raw as i64;
    if position < 0 {
        if len == 0 {
            return Err(index_out_of_range(position));
        }
        return Ok(position.rem_euclid(len as i64) as usize);
    }
    Ok(position as usize)
}

/// As [`normalized_index`], but the position must land inside the container.
fn bounded_index(index: &Value, len: usize) -> EvalResult<usize> {
    let position = normalized_index(index, len)?;
    if position < len {
        Ok(position)
    } else {
        Err(index_out_of_range(index.to_number() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    fn three() -> Value {
        Value::list(vec![num(10.0), num(20.0), num(30.0)])
    }

    #[test]
    fn list_reads_by_position() {
        assert!(matches!(
            index_read(&three(), &num(0.0)),
            Ok(Value::Number(n)) if n == 10.0
        ));
        assert!(matches!(
            index_read(&three(), &num(2.0)),
            Ok(Value::Number(n)) if n == 30.0
        ));
    }

    #[test]
    fn negative_index_wraps() {
        assert!(matches!(
            index_read(&three(), &num(-1.0)),
            Ok(Value::Number(n)) if n == 30.0
        ));
        assert!(matches!(
            index_read(&three(), &num(-5.0)),
            Ok(Value::Number(n)) if n == 10.0
        ));
    }

    #[test]
    fn read_past_end_fails() {
        let err = index_read(&three(), &num(3.0)).map_err(|e| e.kind);
        assert_eq!(err, Err(EvalErrorKind::IndexOutOfRange { index: 3 }));
    }

    #[test]
    fn strings_read_by_character() {
        let s = Value::string("abc");
        assert!(matches!(
            index_read(&s, &num(1.0)),
            Ok(Value::Str(c)) if &*c == "b"
        ));
        assert!(matches!(
            index_read(&s, &num(-1.0)),
            Ok(Value::Str(c)) if &*c == "c"
        ));
        assert!(index_read(&s, &num(3.0)).is_err());
    }

    #[test]
    fn scalars_are_not_indexable() {
        let err = index_read(&num(5.0), &num(0.0)).map_err(|e| e.kind);
        assert_eq!(
            err,
            Err(EvalErrorKind::NotIndexable {
                type_name: "NUMBR".into()
            })
        );
    }

    #[test]
    fn write_past_end_pads_with_null() {
        let list = three();
        index_write(&list, &num(5.0), num(99.0)).ok();
        assert_eq!(list.to_yarn(), "[10, 20, 30, NOOB, NOOB, 99]");
    }

    #[test]
    fn write_through_is_visible_to_aliases() {
        let list = three();
        let alias = list.clone();
        index_write(&list, &num(0.0), num(7.0)).ok();
        assert_eq!(alias.to_yarn(), "[7, 20, 30]");
    }

    #[test]
    fn strings_are_not_writable() {
        let err = index_write(&Value::string("abc"), &num(0.0), num(1.0)).map_err(|e| e.kind);
        assert_eq!(
            err,
            Err(EvalErrorKind::NotIndexable {
                type_name: "YARN".into()
            })
        );
    }
}
