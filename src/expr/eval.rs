use super::{
    parser::{BinaryOp, Expr, UnaryOp},
    EvalError, EvalMode, Number, SCIENTIFIC_FUNCTIONS,
};
use std::f64::consts;

pub(crate) fn evaluate(expr: &Expr, mode: EvalMode) -> Result<Number, EvalError> {
    match expr {
        Expr::Number(number) => Ok(*number),
        Expr::Name(name) => resolve_name(name, mode),
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, mode)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Neg => negate(value),
            })
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, mode)?;
            let right = evaluate(right, mode)?;
            apply_binary(*op, left, right)
        }
        Expr::Call(name, args) => {
            if mode == EvalMode::Basic || !SCIENTIFIC_FUNCTIONS.contains(&name.as_str()) {
                if mode == EvalMode::Scientific && constant(name).is_some() {
                    return Err(EvalError::NotCallable(name.clone()));
                }
                return Err(EvalError::UnknownName(name.clone()));
            }
            let values = args
                .iter()
                .map(|arg| evaluate(arg, mode))
                .collect::<Result<Vec<_>, _>>()?;
            call_function(name, &values)
        }
    }
}

fn resolve_name(name: &str, mode: EvalMode) -> Result<Number, EvalError> {
    if mode == EvalMode::Scientific {
        if let Some(value) = constant(name) {
            return Ok(value);
        }
        if SCIENTIFIC_FUNCTIONS.contains(&name) {
            return Err(EvalError::UncalledFunction(name.to_string()));
        }
    }
    Err(EvalError::UnknownName(name.to_string()))
}

fn constant(name: &str) -> Option<Number> {
    match name {
        "pi" => Some(Number::Float(consts::PI)),
        "e" => Some(Number::Float(consts::E)),
        _ => None,
    }
}

fn negate(value: Number) -> Number {
    match value {
        Number::Int(int) => int
            .checked_neg()
            .map(Number::Int)
            .unwrap_or(Number::Float(-(int as f64))),
        Number::Float(float) => Number::Float(-float),
    }
}

fn apply_binary(op: BinaryOp, left: Number, right: Number) -> Result<Number, EvalError> {
    match op {
        BinaryOp::Add => Ok(int_or_float(left, right, i64::checked_add, |a, b| a + b)),
        BinaryOp::Sub => Ok(int_or_float(left, right, i64::checked_sub, |a, b| a - b)),
        BinaryOp::Mul => Ok(int_or_float(left, right, i64::checked_mul, |a, b| a * b)),
        BinaryOp::Div => {
            if right.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Number::Float(left.as_f64() / right.as_f64()))
        }
        BinaryOp::FloorDiv => floor_div(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Pow => power(left, right),
    }
}

fn int_or_float(
    left: Number,
    right: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        if let Some(result) = int_op(a, b) {
            return Number::Int(result);
        }
    }
    Number::Float(float_op(left.as_f64(), right.as_f64()))
}

fn floor_div(left: Number, right: Number) -> Result<Number, EvalError> {
    if right.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        if let Some(quotient) = a.checked_div(b) {
            let adjust = a % b != 0 && ((a < 0) != (b < 0));
            return Ok(Number::Int(if adjust { quotient - 1 } else { quotient }));
        }
    }
    Ok(Number::Float((left.as_f64() / right.as_f64()).floor()))
}

fn modulo(left: Number, right: Number) -> Result<Number, EvalError> {
    if right.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    if let (Number::Int(a), Number::Int(b)) = (left, right) {
        if let Some(rem) = a.checked_rem(b) {
            let rem = if rem != 0 && ((rem < 0) != (b < 0)) {
                rem + b
            } else {
                rem
            };
            return Ok(Number::Int(rem));
        }
    }
    let (a, b) = (left.as_f64(), right.as_f64());
    let mut rem = a % b;
    if rem != 0.0 && ((rem < 0.0) != (b < 0.0)) {
        rem += b;
    }
    Ok(Number::Float(rem))
}

fn power(base: Number, exponent: Number) -> Result<Number, EvalError> {
    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if e >= 0 {
            if let Some(result) = u32::try_from(e).ok().and_then(|e| b.checked_pow(e)) {
                return Ok(Number::Int(result));
            }
        }
    }

    let (b, e) = (base.as_f64(), exponent.as_f64());
    if b == 0.0 && e < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    if b < 0.0 && e.fract() != 0.0 {
        return Err(EvalError::MathDomain);
    }
    let result = b.powf(e);
    if result.is_infinite() && b.is_finite() && e.is_finite() {
        return Err(EvalError::Overflow);
    }
    Ok(Number::Float(result))
}

fn call_function(name: &str, args: &[Number]) -> Result<Number, EvalError> {
    match name {
        "abs" => {
            let [value] = exactly_one(name, args)?;
            Ok(match value {
                Number::Int(int) => int
                    .checked_abs()
                    .map(Number::Int)
                    .unwrap_or(Number::Float((int as f64).abs())),
                Number::Float(float) => Number::Float(float.abs()),
            })
        }
        "round" => round(args),
        "min" | "max" => {
            if args.len() < 2 {
                return Err(EvalError::Arity(format!(
                    "{}() expects at least 2 arguments ({} given)",
                    name,
                    args.len()
                )));
            }
            let pick_max = name == "max";
            let mut best = args[0];
            for candidate in &args[1..] {
                let better = if pick_max {
                    candidate.as_f64() > best.as_f64()
                } else {
                    candidate.as_f64() < best.as_f64()
                };
                if better {
                    best = *candidate;
                }
            }
            Ok(best)
        }
        "sum" => Ok(args.iter().fold(Number::Int(0), |acc, value| {
            int_or_float(acc, *value, i64::checked_add, |a, b| a + b)
        })),
        "pow" => match args {
            [base, exponent] => power(*base, *exponent),
            [base, exponent, modulus] => modular_pow(*base, *exponent, *modulus),
            _ => Err(EvalError::Arity(format!(
                "pow() takes 2 or 3 arguments ({} given)",
                args.len()
            ))),
        },
        "sqrt" => {
            let [value] = exactly_one(name, args)?;
            let x = value.as_f64();
            if x < 0.0 {
                return Err(EvalError::MathDomain);
            }
            Ok(Number::Float(x.sqrt()))
        }
        "sin" => unary_float(name, args, f64::sin),
        "cos" => unary_float(name, args, f64::cos),
        "tan" => unary_float(name, args, f64::tan),
        "exp" => {
            let [value] = exactly_one(name, args)?;
            let result = value.as_f64().exp();
            if result.is_infinite() && value.as_f64().is_finite() {
                return Err(EvalError::Overflow);
            }
            Ok(Number::Float(result))
        }
        "log" => log(args),
        other => Err(EvalError::UnknownName(other.to_string())),
    }
}

fn exactly_one(name: &str, args: &[Number]) -> Result<[Number; 1], EvalError> {
    match args {
        [value] => Ok([*value]),
        _ => Err(EvalError::Arity(format!(
            "{}() takes exactly one argument ({} given)",
            name,
            args.len()
        ))),
    }
}

fn unary_float(name: &str, args: &[Number], f: fn(f64) -> f64) -> Result<Number, EvalError> {
    let [value] = exactly_one(name, args)?;
    let x = value.as_f64();
    if x.is_infinite() {
        return Err(EvalError::MathDomain);
    }
    Ok(Number::Float(f(x)))
}

fn log(args: &[Number]) -> Result<Number, EvalError> {
    let (x, base) = match args {
        [x] => (x.as_f64(), None),
        [x, base] => (x.as_f64(), Some(base.as_f64())),
        _ => {
            return Err(EvalError::Arity(format!(
                "log() takes 1 or 2 arguments ({} given)",
                args.len()
            )))
        }
    };

    if x <= 0.0 {
        return Err(EvalError::MathDomain);
    }

    match base {
        None => Ok(Number::Float(x.ln())),
        Some(base) if base <= 0.0 => Err(EvalError::MathDomain),
        Some(base) if base == 1.0 => Err(EvalError::DivisionByZero),
        Some(base) if base == 2.0 => Ok(Number::Float(x.log2())),
        Some(base) if base == 10.0 => Ok(Number::Float(x.log10())),
        Some(base) => Ok(Number::Float(x.ln() / base.ln())),
    }
}

fn round(args: &[Number]) -> Result<Number, EvalError> {
    match args {
        [Number::Int(int)] => Ok(Number::Int(*int)),
        [Number::Float(float)] => float_to_int(round_half_even(*float)),
        [value, Number::Int(digits)] => {
            let digits = i32::try_from(*digits).unwrap_or(if *digits < 0 { i32::MIN } else { i32::MAX });
            let factor = 10f64.powi(digits.clamp(-308, 308));
            let rounded = round_half_even(value.as_f64() * factor) / factor;
            match value {
                Number::Int(_) => float_to_int(rounded),
                Number::Float(_) => Ok(Number::Float(if rounded.is_finite() {
                    rounded
                } else {
                    value.as_f64()
                })),
            }
        }
        [_, Number::Float(_)] => Err(EvalError::Type(
            "round() digits must be an integer".to_string(),
        )),
        _ => Err(EvalError::Arity(format!(
            "round() takes 1 or 2 arguments ({} given)",
            args.len()
        ))),
    }
}

fn round_half_even(value: f64) -> f64 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 {
        2.0 * (value / 2.0).round()
    } else {
        rounded
    }
}

fn float_to_int(value: f64) -> Result<Number, EvalError> {
    if value.is_nan() {
        return Err(EvalError::MathDomain);
    }
    if value.is_infinite() || value.abs() >= 9.223372036854775e18 {
        return Err(EvalError::Overflow);
    }
    Ok(Number::Int(value as i64))
}

fn modular_pow(base: Number, exponent: Number, modulus: Number) -> Result<Number, EvalError> {
    let (Number::Int(base), Number::Int(exponent), Number::Int(modulus)) =
        (base, exponent, modulus)
    else {
        return Err(EvalError::Type(
            "pow() 3rd argument not allowed unless all arguments are integers".to_string(),
        ));
    };
    if modulus == 0 {
        return Err(EvalError::MathDomain);
    }
    if exponent < 0 {
        return Err(EvalError::Type(
            "pow() negative exponent with a modulus is not supported".to_string(),
        ));
    }

    let m = modulus as i128;
    let mut result: i128 = 1;
    let mut b = (base as i128).rem_euclid(m.abs());
    let mut e = exponent;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m.abs());
        }
        b = (b * b).rem_euclid(m.abs());
        e >>= 1;
    }
    // result takes the sign of the modulus
    if m < 0 && result != 0 {
        result += m;
    }
    Ok(Number::Int(result as i64))
}
