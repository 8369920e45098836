//! Builtin operations and the cast table.
//!
//! Builtins are plain native functions invoked through the same call path
//! as user-defined functions. Every interpreter instance receives its own
//! copy of the table at reset, so a program that rebinds `SUM OF` corrupts
//! only itself.
//!
//! Operator semantics reproduce the original host's observable behavior:
//! `SUM OF` falls back to string concatenation when an operand is text,
//! `BOTH OF`/`EITHER OF` return an operand rather than a forced boolean,
//! `BOTH SAEM` never coerces, division by zero is infinity.

use rustc_hash::FxHashMap;

use crate::errors::{not_indexable, unknown_cast_type, EvalResult};
use crate::value::{FunctionValue, NativeFn, NativeFunction, Value};

/// Build a fresh builtin symbol table.
pub fn builtin_table() -> FxHashMap<String, Value> {
    let mut table = FxHashMap::default();
    for (name, call) in BUILTINS {
        table.insert(
            (*name).to_string(),
            Value::Function(FunctionValue::Native(NativeFunction { name, call: *call })),
        );
    }
    table
}

const BUILTINS: &[(&str, NativeFn)] = &[
    ("NOT", native_not),
    ("ANY OF", native_any_of),
    ("SUM OF", native_sum_of),
    ("DIFF OF", native_diff_of),
    ("PRODUKT OF", native_produkt_of),
    ("QUOSHUNT OF", native_quoshunt_of),
    ("MOD OF", native_mod_of),
    ("BOTH OF", native_both_of),
    ("EITHER OF", native_either_of),
    ("BOTH SAEM", native_both_saem),
    ("SMOOSH", native_smoosh),
    ("BIGGR THAN", native_biggr_than),
    ("SMALLR THAN", native_smallr_than),
    ("LEN OF", native_len_of),
    ("SMALLR OF", native_smallr_of),
    ("BIGGR OF", native_biggr_of),
];

fn arg(args: &[Value], i: usize) -> Value {
    args.get(i).cloned().unwrap_or(Value::Null)
}

/// Addition with the host's string fallback: if either operand is text the
/// result is the concatenation of both canonical stringifications.
pub(crate) fn add_values(a: &Value, b: &Value) -> Value {
    if matches!(a, Value::Str(_)) || matches!(b, Value::Str(_)) {
        Value::string(format!("{}{}", a.to_yarn(), b.to_yarn()))
    } else {
        Value::Number(a.to_number() + b.to_number())
    }
}

fn native_not(args: &[Value]) -> EvalResult {
    Ok(Value::Bool(!arg(args, 0).is_truthy()))
}

fn native_any_of(args: &[Value]) -> EvalResult {
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn native_sum_of(args: &[Value]) -> EvalResult {
    Ok(add_values(&arg(args, 0), &arg(args, 1)))
}

fn native_diff_of(args: &[Value]) -> EvalResult {
    Ok(Value::Number(arg(args, 0).to_number() - arg(args, 1).to_number()))
}

fn native_produkt_of(args: &[Value]) -> EvalResult {
    Ok(Value::Number(arg(args, 0).to_number() * arg(args, 1).to_number()))
}

fn native_quoshunt_of(args: &[Value]) -> EvalResult {
    Ok(Value::Number(arg(args, 0).to_number() / arg(args, 1).to_number()))
}

fn native_mod_of(args: &[Value]) -> EvalResult {
    Ok(Value::Number(arg(args, 0).to_number() % arg(args, 1).to_number()))
}

fn native_both_of(args: &[Value]) -> EvalResult {
    let a = arg(args, 0);
    Ok(if a.is_truthy() { arg(args, 1) } else { a })
}

fn native_either_of(args: &[Value]) -> EvalResult {
    let a = arg(args, 0);
    Ok(if a.is_truthy() { a } else { arg(args, 1) })
}

fn native_both_saem(args: &[Value]) -> EvalResult {
    Ok(Value::Bool(arg(args, 0).strict_eq(&arg(args, 1))))
}

fn native_smoosh(args: &[Value]) -> EvalResult {
    Ok(Value::string(
        args.iter().map(Value::to_yarn).collect::<String>(),
    ))
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    if let (Value::Str(x), Value::Str(y)) = (a, b) {
        Some(x.cmp(y))
    } else {
        a.to_number().partial_cmp(&b.to_number())
    }
}

fn native_biggr_than(args: &[Value]) -> EvalResult {
    Ok(Value::Bool(matches!(
        compare(&arg(args, 0), &arg(args, 1)),
        Some(std::cmp::Ordering::Greater)
    )))
}

fn native_smallr_than(args: &[Value]) -> EvalResult {
    Ok(Value::Bool(matches!(
        compare(&arg(args, 0), &arg(args, 1)),
        Some(std::cmp::Ordering::Less)
    )))
}

fn native_len_of(args: &[Value]) -> EvalResult {
    match arg(args, 0) {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::List(items) => Ok(Value::Number(items.borrow().len() as f64)),
        other => Err(not_indexable(other.type_name())),
    }
}

fn native_smallr_of(args: &[Value]) -> EvalResult {
    let (a, b) = (arg(args, 0).to_number(), arg(args, 1).to_number());
    Ok(Value::Number(if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }))
}

fn native_biggr_of(args: &[Value]) -> EvalResult {
    let (a, b) = (arg(args, 0).to_number(), arg(args, 1).to_number());
    Ok(Value::Number(if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }))
}

/// Target of a `MAEK` / `IS NOW A` cast.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CastTarget {
    Troof,
    Noob,
    Yarn,
    Numbr,
}

impl CastTarget {
    /// Parse a target type name as written in source. Case-insensitive;
    /// `NUMBR` and `NUMBAR` are both numeric.
    pub fn parse(name: &str) -> Option<CastTarget> {
        match name.to_ascii_uppercase().as_str() {
            "TROOF" => Some(CastTarget::Troof),
            "NOOB" => Some(CastTarget::Noob),
            "YARN" => Some(CastTarget::Yarn),
            "NUMBR" | "NUMBAR" => Some(CastTarget::Numbr),
            _ => None,
        }
    }
}

/// Apply a cast, failing with `UnknownCastType` for names outside the
/// target set.
pub fn apply_cast(value: &Value, target: &str) -> EvalResult {
    let Some(target) = CastTarget::parse(target) else {
        return Err(unknown_cast_type(target));
    };
    Ok(match target {
        CastTarget::Troof => Value::Bool(value.is_truthy()),
        CastTarget::Noob => Value::Null,
        CastTarget::Yarn => Value::string(value.to_yarn()),
        CastTarget::Numbr => Value::Number(value.to_number()),
    })
}
