//! The native library: `clock`, `read`, `print`, `array`, and the builtin
//! methods of array objects.

use std::rc::Rc;

use strum::IntoStaticStr;

use crate::{
    error::{RunResult, RuntimeError},
    heap::{Heap, HeapData, HeapId, LoxArray},
    interp::Interp,
    io::Io,
    token::Token,
    value::Value,
};

/// Built-in functions installed into globals at startup. An enum rather
/// than trait objects: dispatch is a match and the values stay `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum NativeFn {
    Clock,
    Read,
    Print,
    Array,
}

impl NativeFn {
    pub fn arity(self) -> usize {
        match self {
            Self::Clock => 0,
            Self::Read | Self::Print | Self::Array => 1,
        }
    }
}

pub(crate) fn call_native(
    native: NativeFn,
    interp: &mut Interp,
    io: &mut Io<'_>,
    paren: &Token,
    args: &[Value],
) -> RunResult<Value> {
    match native {
        // Seconds since an arbitrary epoch (interpreter start); monotonic.
        NativeFn::Clock => Ok(Value::Number(interp.started.elapsed().as_secs_f64())),
        NativeFn::Print => {
            let text = args[0].stringify(&interp.heap);
            io.print.write_line(&text);
            Ok(Value::Nil)
        }
        NativeFn::Read => {
            let prompt = args[0].stringify(&interp.heap);
            io.print.write_text(&prompt);
            match io.input.read_line() {
                Some(line) => Ok(coerce_input(&line)),
                None => Ok(Value::Nil),
            }
        }
        NativeFn::Array => {
            let Value::Number(size) = args[0] else {
                return Err(RuntimeError::new(paren, "Array size must be a non-negative integer.").into());
            };
            if size.fract() != 0.0 || size < 0.0 {
                return Err(RuntimeError::new(paren, "Array size must be a non-negative integer.").into());
            }
            let array = interp.heap.allocate(HeapData::Array(LoxArray {
                elements: vec![Value::Nil; size as usize],
            }));
            Ok(Value::Ref(array))
        }
    }
}

/// Coercion rule for `read`: `"nil"` is nil; a line that is entirely a Lox
/// number literal (`digits (. digits)?`, no sign or exponent) becomes a
/// number; anything else is the raw string.
pub(crate) fn coerce_input(line: &str) -> Value {
    if line == "nil" {
        return Value::Nil;
    }
    if is_number_literal(line) {
        let value: f64 = line.parse().expect("line matches the number grammar");
        return Value::Number(value);
    }
    Value::Str(Rc::from(line))
}

fn is_number_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return false;
    }
    if i == bytes.len() {
        return true;
    }
    if bytes[i] != b'.' {
        return false;
    }
    i += 1;
    let fraction_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i > fraction_start && i == bytes.len()
}

/// Builtin methods looked up on array objects. Values of this kind carry
/// the array they were accessed on, like a bound method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ArrayMethod {
    Get,
    Set,
    Length,
}

impl ArrayMethod {
    pub fn arity(self) -> usize {
        match self {
            Self::Get => 1,
            Self::Set => 2,
            Self::Length => 0,
        }
    }
}

pub(crate) fn call_array_method(
    method: ArrayMethod,
    array: HeapId,
    heap: &mut Heap,
    paren: &Token,
    args: &[Value],
) -> RunResult<Value> {
    match method {
        ArrayMethod::Get => {
            let index = array_index(paren, &args[0])?;
            let HeapData::Array(data) = heap.get(array) else {
                unreachable!("array method bound to a non-array");
            };
            match data.elements.get(index) {
                Some(element) => Ok(element.clone()),
                None => Err(RuntimeError::new(paren, "Array index out of range.").into()),
            }
        }
        ArrayMethod::Set => {
            // A nil index appends.
            if matches!(args[0], Value::Nil) {
                let HeapData::Array(data) = heap.get_mut(array) else {
                    unreachable!("array method bound to a non-array");
                };
                data.elements.push(args[1].clone());
                return Ok(Value::Nil);
            }
            let index = array_index(paren, &args[0])?;
            let HeapData::Array(data) = heap.get_mut(array) else {
                unreachable!("array method bound to a non-array");
            };
            match data.elements.get_mut(index) {
                Some(slot) => {
                    *slot = args[1].clone();
                    Ok(Value::Nil)
                }
                None => Err(RuntimeError::new(paren, "Array index out of range.").into()),
            }
        }
        ArrayMethod::Length => {
            let HeapData::Array(data) = heap.get(array) else {
                unreachable!("array method bound to a non-array");
            };
            Ok(Value::Number(data.elements.len() as f64))
        }
    }
}

/// Indices must be integer-valued numbers; negative values are out of
/// range rather than Python-style wraparound.
fn array_index(paren: &Token, value: &Value) -> RunResult<usize> {
    let Value::Number(n) = value else {
        return Err(RuntimeError::new(paren, "Array index must be an integer.").into());
    };
    if n.fract() != 0.0 {
        return Err(RuntimeError::new(paren, "Array index must be an integer.").into());
    }
    if *n < 0.0 {
        return Err(RuntimeError::new(paren, "Array index out of range.").into());
    }
    Ok(*n as usize)
}
