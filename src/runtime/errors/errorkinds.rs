//! Error constructor functions

use crate::runtime::Value;
use crate::runtime::errors::{RuntimeError, ErrorKind};


impl RuntimeError {
    pub fn invalid_unary_operand(operand: &Value) -> Box<RuntimeError> {
        log::debug!("unsupported operand: '{}'", operand.type_name());
        RuntimeError::new(ErrorKind::InvalidUnaryOperand, "Operand must be a number.")
    }

    // `expected` completes "Operands must be ..."
    pub fn invalid_binary_operands(expected: &str, lhs: &Value, rhs: &Value) -> Box<RuntimeError> {
        log::debug!("unsupported operands: '{}' and '{}'", lhs.type_name(), rhs.type_name());
        RuntimeError::new(
            ErrorKind::InvalidBinaryOperands,
            format!("Operands must be {}.", expected),
        )
    }

    pub fn overflow_error() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::OverflowError, "Integer overflow.")
    }

    pub fn divide_by_zero() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::DivideByZero, "Divide by zero.")
    }

    pub fn name_not_defined(name: &str) -> Box<RuntimeError> {
        RuntimeError::new(
            ErrorKind::NameNotDefined,
            format!("Undefined variable '{}'.", name),
        )
    }

    pub fn undefined_property(name: &str) -> Box<RuntimeError> {
        RuntimeError::new(
            ErrorKind::UndefinedProperty,
            format!("Undefined property '{}'.", name),
        )
    }

    pub fn property_on_non_instance() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::InvalidPropertyAccess, "Only instances have properties.")
    }

    pub fn field_on_non_instance() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::InvalidPropertyAccess, "Only instances have fields.")
    }

    pub fn not_callable(callee: &Value) -> Box<RuntimeError> {
        log::debug!("tried to call a value of type '{}'", callee.type_name());
        RuntimeError::new(ErrorKind::NotCallable, "Can only call functions and classes.")
    }

    pub fn arity_mismatch(arity: usize, nargs: usize) -> Box<RuntimeError> {
        RuntimeError::new(
            ErrorKind::ArityMismatch,
            format!("Expected {} arguments but got {}.", arity, nargs),
        )
    }

    pub fn stack_overflow() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::StackOverflow, "Stack overflow.")
    }

    pub fn no_external_dispatch(name: &str) -> Box<RuntimeError> {
        RuntimeError::new(
            ErrorKind::ExternalDispatch,
            format!("No external dispatch available to call '{}'.", name),
        )
    }

    pub fn vm_busy() -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::VMBusy, "Can't interpret while the VM is running; use call_from_host.")
    }

    pub fn invalid_value(message: impl AsRef<str>) -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::InvalidValue, message.as_ref())
    }

    pub fn other(message: impl AsRef<str>) -> Box<RuntimeError> {
        RuntimeError::new(ErrorKind::Unspecified, message.as_ref())
    }
}
