//! Unary, binary and comparison operators.
//!
//! Arithmetic never coerces: both operands must have the same runtime type,
//! so `Int` and `Number` values do not mix.

use std::rc::Rc;

use crate::language::VectorType;
use crate::runtime::Value;
use crate::runtime::errors::{ExecResult, RuntimeError};


const EXPECT_NUMBERS: &str = "numbers";
const EXPECT_NUMBERS_OR_STRINGS: &str = "two numbers or two strings";


#[inline]
fn componentwise<const N: usize>(lhs: &[VectorType; N], rhs: &[VectorType; N], op: impl Fn(VectorType, VectorType) -> VectorType) -> [VectorType; N] {
    core::array::from_fn(|idx| op(lhs[idx], rhs[idx]))
}

// applies an arithmetic operator to the types every arithmetic operator shares
macro_rules! eval_arithmetic {
    ( $lhs:expr, $rhs:expr, $expected:expr, $checked_int:ident, $op:tt ) => {
        match ($lhs, $rhs) {
            (Value::Int(a), Value::Int(b)) => a.$checked_int(*b).map(Value::Int)
                .ok_or_else(RuntimeError::overflow_error),
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a $op b)),
            (Value::Vector2(a), Value::Vector2(b)) => Ok(Value::Vector2(componentwise(a, b, |x, y| x $op y))),
            (Value::Vector3(a), Value::Vector3(b)) => Ok(Value::Vector3(componentwise(a, b, |x, y| x $op y))),
            (Value::Vector4(a), Value::Vector4(b)) => Ok(Value::Vector4(componentwise(a, b, |x, y| x $op y))),
            (lhs, rhs) => Err(RuntimeError::invalid_binary_operands($expected, lhs, rhs)),
        }
    };
}


// Unary Operators

#[inline]
pub fn eval_neg(operand: &Value) -> ExecResult<Value> {
    let value = match operand {
        Value::Int(value) => value.checked_neg()
            .map(Value::Int)
            .ok_or_else(RuntimeError::overflow_error)?,
        Value::Number(value) => Value::Number(-value),
        Value::Vector2(v) => Value::Vector2(v.map(|x| -x)),
        Value::Vector3(v) => Value::Vector3(v.map(|x| -x)),
        Value::Vector4(v) => Value::Vector4(v.map(|x| -x)),
        _ => return Err(RuntimeError::invalid_unary_operand(operand)),
    };
    Ok(value)
}

#[inline]
pub fn eval_not(operand: &Value) -> Value {
    Value::Bool(operand.is_falsey())
}


// Binary Operators

pub fn eval_add(lhs: &Value, rhs: &Value) -> ExecResult<Value> {
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        let mut buf = String::with_capacity(a.len() + b.len());
        buf.push_str(a);
        buf.push_str(b);
        return Ok(Value::String(Rc::from(buf)));
    }

    eval_arithmetic!(lhs, rhs, EXPECT_NUMBERS_OR_STRINGS, checked_add, +)
}

pub fn eval_sub(lhs: &Value, rhs: &Value) -> ExecResult<Value> {
    eval_arithmetic!(lhs, rhs, EXPECT_NUMBERS, checked_sub, -)
}

pub fn eval_mul(lhs: &Value, rhs: &Value) -> ExecResult<Value> {
    eval_arithmetic!(lhs, rhs, EXPECT_NUMBERS, checked_mul, *)
}

pub fn eval_div(lhs: &Value, rhs: &Value) -> ExecResult<Value> {
    // float division by zero follows IEEE 754, integer division does not
    if let (Value::Int(_), Value::Int(0)) = (lhs, rhs) {
        return Err(RuntimeError::divide_by_zero());
    }

    eval_arithmetic!(lhs, rhs, EXPECT_NUMBERS, checked_div, /)
}


// Comparisons

pub fn eval_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Vector2(a), Value::Vector2(b)) => a == b,
        (Value::Vector3(a), Value::Vector3(b)) => a == b,
        (Value::Vector4(a), Value::Vector4(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,

        // heap objects compare by identity
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
        (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
        (Value::BoundMethod(a), Value::BoundMethod(b)) => Rc::ptr_eq(a, b),
        (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),

        _ => false,
    }
}

// ordering is only defined between two ints or two numbers, anything else compares false

pub fn eval_lt(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a < b,
        (Value::Number(a), Value::Number(b)) => a < b,
        _ => false,
    }
}

pub fn eval_gt(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a > b,
        (Value::Number(a), Value::Number(b)) => a > b,
        _ => false,
    }
}
