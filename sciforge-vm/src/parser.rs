//! Recursive-descent parser for the symbolic model language.
//!
//! Grammar, informally:
//!
//! ```text
//! source  := (model | fit)*
//! model   := "model" NAME "{" (param | predict)* "}"
//! param   := "param" NAME "=" ["-"] NUMBER ";"
//! predict := "predict" "(" "x" ")" "=" expr ";"
//! fit     := "fit" NAME "{" (KEY "=" NUMBER ";")* "}"
//! expr    := term (("+" | "-") term)*
//! term    := factor (("*" | "/") factor)*
//! factor  := unary ("^" factor)?            // right associative
//! unary   := "-" unary | primary
//! primary := NUMBER | "(" expr ")" | FUNC "(" args ")" | xN | NAME | pi | e
//! ```

use crate::ast::{BinOp, Expr, Func};
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::scope::{FitSpec, ModelDef, ParamDef};
use sciforge_error::{Error, Result};

/// A top-level item in a source unit
#[derive(Debug, Clone)]
pub enum Item {
    Model(ModelDef),
    Fit(String, FitSpec),
}

/// Parse source text into top-level items
pub fn parse_source(source: &str) -> Result<Vec<Item>> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.parse_items()
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    fn parse_items(&mut self) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        while self.pos < self.tokens.len() {
            let keyword = self.expect_ident("'model' or 'fit'")?;
            match keyword.as_str() {
                "model" => items.push(Item::Model(self.parse_model()?)),
                "fit" => {
                    let (name, spec) = self.parse_fit()?;
                    items.push(Item::Fit(name, spec));
                }
                other => {
                    return Err(self
                        .error(format!("expected 'model' or 'fit', found '{}'", other)));
                }
            }
        }
        Ok(items)
    }

    fn parse_model(&mut self) -> Result<ModelDef> {
        let name = self.expect_ident("model name")?;
        self.expect(Token::LBrace)?;

        let mut params: Vec<ParamDef> = Vec::new();
        let mut predict: Option<Expr> = None;

        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            let keyword = self.expect_ident("'param' or 'predict'")?;
            match keyword.as_str() {
                "param" => {
                    let pname = self.expect_ident("parameter name")?;
                    if is_reserved(&pname) {
                        return Err(self.error(format!(
                            "parameter name '{}' is reserved",
                            pname
                        )));
                    }
                    if params.iter().any(|p| p.name == pname) {
                        return Err(self.error(format!(
                            "parameter '{}' declared twice",
                            pname
                        )));
                    }
                    self.expect(Token::Eq)?;
                    let negative = self.eat(Token::Minus);
                    let mut init = self.expect_number()?;
                    if negative {
                        init = -init;
                    }
                    self.expect(Token::Semi)?;
                    params.push(ParamDef { name: pname, init });
                }
                "predict" => {
                    if predict.is_some() {
                        return Err(self.error("'predict' defined twice".to_string()));
                    }
                    self.expect(Token::LParen)?;
                    let arg = self.expect_ident("'x'")?;
                    if arg != "x" {
                        return Err(self.error(format!(
                            "predict argument must be 'x', found '{}'",
                            arg
                        )));
                    }
                    self.expect(Token::RParen)?;
                    self.expect(Token::Eq)?;
                    let expr = self.parse_expr(&params)?;
                    self.expect(Token::Semi)?;
                    predict = Some(expr);
                }
                other => {
                    return Err(self.error(format!(
                        "expected 'param' or 'predict', found '{}'",
                        other
                    )));
                }
            }
        }

        let predict = predict
            .ok_or_else(|| self.error(format!("model '{}' has no 'predict'", name)))?;
        let arity = predict.feature_arity();

        Ok(ModelDef { name, params, predict, arity })
    }

    fn parse_fit(&mut self) -> Result<(String, FitSpec)> {
        let name = self.expect_ident("model name")?;
        self.expect(Token::LBrace)?;

        let mut spec = FitSpec::default();
        loop {
            if self.eat(Token::RBrace) {
                break;
            }
            let key = self.expect_ident("fit setting")?;
            self.expect(Token::Eq)?;
            let value = self.expect_number()?;
            self.expect(Token::Semi)?;
            match key.as_str() {
                "restarts" => spec.restarts = as_count(&key, value, 1)?,
                "max_iters" => spec.max_iters = as_count(&key, value, 1)?,
                other => {
                    return Err(self.error(format!("unknown fit setting '{}'", other)));
                }
            }
        }

        Ok((name, spec))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self, params: &[ParamDef]) -> Result<Expr> {
        let mut lhs = self.parse_term(params)?;
        loop {
            let op = if self.eat(Token::Plus) {
                BinOp::Add
            } else if self.eat(Token::Minus) {
                BinOp::Sub
            } else {
                break;
            };
            let rhs = self.parse_term(params)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_term(&mut self, params: &[ParamDef]) -> Result<Expr> {
        let mut lhs = self.parse_factor(params)?;
        loop {
            let op = if self.eat(Token::Star) {
                BinOp::Mul
            } else if self.eat(Token::Slash) {
                BinOp::Div
            } else {
                break;
            };
            let rhs = self.parse_factor(params)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self, params: &[ParamDef]) -> Result<Expr> {
        let base = self.parse_unary(params)?;
        if self.eat(Token::Caret) {
            let exp = self.parse_factor(params)?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exp)));
        }
        Ok(base)
    }

    fn parse_unary(&mut self, params: &[ParamDef]) -> Result<Expr> {
        if self.eat(Token::Minus) {
            let inner = self.parse_unary(params)?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.parse_primary(params)
    }

    fn parse_primary(&mut self, params: &[ParamDef]) -> Result<Expr> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr(params)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => self.resolve_ident(name, params),
            Some(other) => Err(self.error(format!("unexpected token '{}'", other))),
            None => Err(self.error("unexpected end of source in expression".to_string())),
        }
    }

    fn resolve_ident(&mut self, name: String, params: &[ParamDef]) -> Result<Expr> {
        // call form
        if self.peek() == Some(&Token::LParen) {
            let (func, arity) = Func::from_name(&name)
                .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
            self.expect(Token::LParen)?;
            let mut args = vec![self.parse_expr(params)?];
            while self.eat(Token::Comma) {
                args.push(self.parse_expr(params)?);
            }
            self.expect(Token::RParen)?;
            if args.len() != arity {
                return Err(self.error(format!(
                    "'{}' takes {} argument(s), got {}",
                    name,
                    arity,
                    args.len()
                )));
            }
            return Ok(Expr::Call(func, args));
        }

        // constants
        match name.as_str() {
            "pi" => return Ok(Expr::Number(std::f64::consts::PI)),
            "e" => return Ok(Expr::Number(std::f64::consts::E)),
            _ => {}
        }

        // feature reference xN
        if let Some(idx) = feature_index(&name) {
            return Ok(Expr::Feature(idx));
        }

        // declared parameter
        if let Some(idx) = params.iter().position(|p| p.name == name) {
            return Ok(Expr::Param(idx));
        }

        Err(self.error(format!("unknown identifier '{}'", name)))
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).map(|t| t.token.clone());
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(t) => Err(self.error(format!("expected '{}', found '{}'", token, t))),
            None => Err(self.error(format!("expected '{}', found end of source", token))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(Token::Ident(s)) => Ok(s),
            Some(t) => Err(self.error(format!("expected {}, found '{}'", what, t))),
            None => Err(self.error(format!("expected {}, found end of source", what))),
        }
    }

    fn expect_number(&mut self) -> Result<f64> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(t) => Err(self.error(format!("expected number, found '{}'", t))),
            None => Err(self.error("expected number, found end of source".to_string())),
        }
    }

    fn error(&self, message: String) -> Error {
        // point at the token just consumed, or the last one on early EOF
        let line = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.line)
            .unwrap_or(1);
        Error::execution_failed(message)
            .with_operation("parser::parse")
            .with_context("line", line.to_string())
    }
}

/// Parse `xN` into a feature column index
fn feature_index(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('x')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn is_reserved(name: &str) -> bool {
    name == "pi" || name == "e" || feature_index(name).is_some() || Func::from_name(name).is_some()
}

fn as_count(key: &str, value: f64, min: usize) -> Result<usize> {
    if value.fract() != 0.0 || value < min as f64 {
        return Err(Error::execution_failed(format!(
            "fit setting '{}' must be an integer >= {}",
            key, min
        )));
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
model Physics {
    param a = 1.0;
    param omega = 0.5;
    predict(x) = a * sin(omega * x0) + x1;
}

fit Physics {
    restarts = 2;
    max_iters = 50;
}
"#;

    #[test]
    fn test_parse_model_and_fit() {
        let items = parse_source(SOURCE).unwrap();
        assert_eq!(items.len(), 2);
        match &items[0] {
            Item::Model(def) => {
                assert_eq!(def.name, "Physics");
                assert_eq!(def.params.len(), 2);
                assert_eq!(def.params[1].name, "omega");
                assert_eq!(def.params[1].init, 0.5);
                assert_eq!(def.arity, 2);
            }
            other => panic!("expected model, got {:?}", other),
        }
        match &items[1] {
            Item::Fit(name, spec) => {
                assert_eq!(name, "Physics");
                assert_eq!(spec.restarts, 2);
                assert_eq!(spec.max_iters, 50);
            }
            other => panic!("expected fit, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let items = parse_source("model M { predict(x) = 1 + 2 * x0 ^ 2; }").unwrap();
        let Item::Model(def) = &items[0] else { panic!() };
        // (1 + (2 * (x0 ^ 2)))
        assert_eq!(def.predict.eval(&[], &[3.0]), 19.0);
    }

    #[test]
    fn test_pow_right_associative() {
        let items = parse_source("model M { predict(x) = 2 ^ 3 ^ 2; }").unwrap();
        let Item::Model(def) = &items[0] else { panic!() };
        assert_eq!(def.predict.eval(&[], &[]), 512.0);
    }

    #[test]
    fn test_unary_minus() {
        let items = parse_source("model M { param a = -2.5; predict(x) = -x0 + a; }").unwrap();
        let Item::Model(def) = &items[0] else { panic!() };
        assert_eq!(def.params[0].init, -2.5);
        assert_eq!(def.predict.eval(&[-2.5], &[1.0]), -3.5);
    }

    #[test]
    fn test_constants_fold() {
        let items = parse_source("model M { predict(x) = 2 * pi; }").unwrap();
        let Item::Model(def) = &items[0] else { panic!() };
        assert!((def.predict.eval(&[], &[]) - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_missing_predict() {
        let err = parse_source("model M { param a = 1; }").unwrap_err();
        assert!(err.message().contains("no 'predict'"));
    }

    #[test]
    fn test_unknown_identifier() {
        let err = parse_source("model M { predict(x) = b * x0; }").unwrap_err();
        assert!(err.message().contains("unknown identifier 'b'"));
    }

    #[test]
    fn test_unknown_function() {
        let err = parse_source("model M { predict(x) = gamma(x0); }").unwrap_err();
        assert!(err.message().contains("unknown function"));
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse_source("model M { predict(x) = sin(x0, x1); }").unwrap_err();
        assert!(err.message().contains("takes 1 argument"));
    }

    #[test]
    fn test_reserved_param_name() {
        let err = parse_source("model M { param x0 = 1; predict(x) = x0; }").unwrap_err();
        assert!(err.message().contains("reserved"));
    }

    #[test]
    fn test_duplicate_param() {
        let err =
            parse_source("model M { param a = 1; param a = 2; predict(x) = a; }").unwrap_err();
        assert!(err.message().contains("declared twice"));
    }
}
