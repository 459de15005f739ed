//! Two-operand arithmetic over free text.
//!
//! The scanner pulls number literals and single-character operators out of
//! the input in order, and only the first three tokens ever matter. There is
//! no precedence, no parentheses, and no chained evaluation: `"2 + 2 + 2"`
//! evaluates `2 + 2` and drops the rest.

const PARSE_FAILURE_MESSAGE: &str = "Sorry, I could not understand the arithmetic expression. \
     Please use the format: number operator number (e.g., 2 + 2).";

const DIVISION_BY_ZERO: &str = "Division by zero is not allowed.";
const UNSUPPORTED_OPERATION: &str = "Unsupported operation.";

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(f64),
    Operator(char),
}

/// A transient two-operand expression. The operator is kept as the raw
/// symbol so evaluation can still report an unsupported operation instead of
/// making the case unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Expression {
    pub lhs: f64,
    pub op: char,
    pub rhs: f64,
}

/// Outcome of [`process`]: a user-facing message plus whether evaluation
/// succeeded. Failures are values, never panics or errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub success: bool,
    pub message: String,
}

/// Scan the text left to right into number and operator tokens.
///
/// A `+` or `-` immediately followed by a digit starts a signed number, so
/// `"2+-3"` scans as `[2, +, -3]` while `"2+2"` scans as `[2, +2]` (two
/// tokens, which later fails extraction). Number literals are
/// `digits[.digits]`; a dot not followed by a digit ends the literal. Every
/// other character is ignored.
fn scan(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let signed_start = (c == '+' || c == '-')
            && chars.get(i + 1).is_some_and(|next| next.is_ascii_digit());

        if c.is_ascii_digit() || signed_start {
            let start = i;
            if signed_start {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()) {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let literal: String = chars[start..i].iter().collect();
            if let Ok(value) = literal.parse::<f64>() {
                tokens.push(Token::Number(value));
            }
            continue;
        }

        if matches!(c, '+' | '-' | '*' | '/') {
            tokens.push(Token::Operator(c));
        }
        i += 1;
    }

    tokens
}

/// True when the whole text is exactly `number operator number`, with
/// optional surrounding and interior whitespace. Used by the intent
/// classifier's tight-shape check.
pub fn is_bare_expression(text: &str) -> bool {
    let rest = text.trim();
    let Some(rest) = eat_number(rest) else {
        return false;
    };
    let rest = rest.trim_start();
    let Some(rest) = eat_operator(rest) else {
        return false;
    };
    let rest = rest.trim_start();
    let Some(rest) = eat_number(rest) else {
        return false;
    };
    rest.trim().is_empty()
}

fn eat_number(text: &str) -> Option<&str> {
    let mut chars = text.char_indices().peekable();
    let mut end = 0;
    let mut seen_digit = false;

    if let Some(&(_, c)) = chars.peek() {
        if c == '+' || c == '-' {
            chars.next();
        }
    }
    while let Some(&(index, c)) = chars.peek() {
        if c.is_ascii_digit() {
            seen_digit = true;
            end = index + c.len_utf8();
            chars.next();
        } else {
            break;
        }
    }
    if !seen_digit {
        return None;
    }
    if let Some(&(dot_index, '.')) = chars.peek() {
        let fraction = &text[dot_index + 1..];
        if fraction.starts_with(|c: char| c.is_ascii_digit()) {
            chars.next();
            while let Some(&(index, c)) = chars.peek() {
                if c.is_ascii_digit() {
                    end = index + c.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
        }
    }
    Some(&text[end..])
}

fn eat_operator(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    matches!(first, '+' | '-' | '*' | '/').then(|| &text[first.len_utf8()..])
}

/// Build an expression from the first three tokens. Anything after them is
/// silently discarded. Returns `None` when the tokens do not line up as
/// `number operator number`.
pub fn extract_expression(text: &str) -> Option<Expression> {
    let tokens = scan(text);
    if tokens.len() < 3 {
        return None;
    }
    match (tokens[0], tokens[1], tokens[2]) {
        (Token::Number(lhs), Token::Operator(op), Token::Number(rhs)) => {
            Some(Expression { lhs, op, rhs })
        }
        _ => None,
    }
}

fn apply(expression: &Expression) -> Result<f64, &'static str> {
    match expression.op {
        '+' => Ok(expression.lhs + expression.rhs),
        '-' => Ok(expression.lhs - expression.rhs),
        '*' => Ok(expression.lhs * expression.rhs),
        '/' if expression.rhs == 0.0 => Err(DIVISION_BY_ZERO),
        '/' => Ok(expression.lhs / expression.rhs),
        _ => Err(UNSUPPORTED_OPERATION),
    }
}

/// Evaluate the arithmetic expression found in `text`.
///
/// Success renders `Result: {a} {op} {b} = {result}` with operands printed
/// from their parsed values. Extraction failures get the "could not
/// understand" message; calculation failures get `Error: {reason}`.
pub fn process(text: &str) -> Evaluation {
    let Some(expression) = extract_expression(text) else {
        return Evaluation { success: false, message: PARSE_FAILURE_MESSAGE.to_string() };
    };

    match apply(&expression) {
        Ok(result) => Evaluation {
            success: true,
            message: format!(
                "Result: {} {} {} = {}",
                render_number(expression.lhs),
                expression.op,
                render_number(expression.rhs),
                render_number(result)
            ),
        },
        Err(reason) => Evaluation { success: false, message: format!("Error: {reason}") },
    }
}

/// Integral values keep a trailing `.0` so `2 + 2` reads `4.0`, matching the
/// operands' parsed-float rendering.
fn render_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
