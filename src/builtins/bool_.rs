use crate::value::Value;

pub(super) fn call(args: &[Value]) -> Value {
    Value::Bool(args.first().is_some_and(Value::truthy))
}
