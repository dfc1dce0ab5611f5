use std::time::{SystemTime, UNIX_EPOCH};

use crate::language::{IntType, FloatType, VectorType};
use crate::runtime::{Value, VirtualMachine};
use crate::runtime::errors::{ExecResult, RuntimeError};


fn number_arg(name: &str, value: &Value) -> ExecResult<FloatType> {
    value.as_number().ok_or_else(|| RuntimeError::invalid_value(format!(
        "{}() expects numbers, got '{}'.", name, value.type_name()
    )))
}

// either one value per component, or a single value for every component
fn vector_args<const N: usize>(name: &str, args: &[Value]) -> ExecResult<[VectorType; N]> {
    match args.len() {
        1 => {
            let value = number_arg(name, &args[0])? as VectorType;
            Ok([value; N])
        },
        len if len == N => {
            let mut vector = [0.0; N];
            for (component, arg) in vector.iter_mut().zip(args.iter()) {
                *component = number_arg(name, arg)? as VectorType;
            }
            Ok(vector)
        },
        len => Err(RuntimeError::arity_mismatch(N, len)),
    }
}


/// Register the builtin natives in a VM's globals.
pub fn install_prelude(vm: &mut VirtualMachine) {
    // seconds since the unix epoch
    vm.register_fn("clock", |_, _, _| {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)
            .map_err(|error| RuntimeError::other(error.to_string()))?;
        Ok(Value::Number(elapsed.as_secs_f64()))
    });

    vm.register_fn("vec2", |_, args, _| Ok(Value::Vector2(vector_args("vec2", args)?)));
    vm.register_fn("vec3", |_, args, _| Ok(Value::Vector3(vector_args("vec3", args)?)));
    vm.register_fn("vec4", |_, args, _| Ok(Value::Vector4(vector_args("vec4", args)?)));

    // conversions between script numbers and host integers
    vm.register_fn("int", |_, args, _| {
        match args {
            [ Value::Int(value) ] => Ok(Value::Int(*value)),
            [ Value::Number(value) ] if value.is_finite() => Ok(Value::Int(value.trunc() as IntType)),
            [ value ] => Err(RuntimeError::invalid_value(format!("can't convert '{}' to int.", value.type_name()))),
            _ => Err(RuntimeError::arity_mismatch(1, args.len())),
        }
    });

    vm.register_fn("number", |_, args, _| {
        match args {
            [ value ] => Ok(Value::Number(number_arg("number", value)?)),
            _ => Err(RuntimeError::arity_mismatch(1, args.len())),
        }
    });
}
