use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use std::rc::Rc;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("SyntaxError: {message} (line {}, column {})", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Parse a whole program in one call
pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}

/// Recursive descent parser for the algorithm language subset
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.body.push(self.parse_statement()?);
        }

        Ok(program)
    }

    /// Parse a statement
    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();
        let location = Some(loc);

        match self.peek() {
            Token::LBrace(_) => {
                self.advance();
                let body = self.parse_block_statements()?;
                Ok(Stmt::Block { body, location })
            }
            Token::Let(_) | Token::Const(_) | Token::Var(_) => {
                let kind = self.parse_decl_kind()?;
                let declarators = self.parse_declarators()?;
                self.consume_semicolon("Expected ';' after declaration")?;
                Ok(Stmt::VarDecl {
                    kind,
                    declarators,
                    location,
                })
            }
            Token::Function(_) => {
                self.advance();
                let func = self.parse_function_rest(true, location)?;
                Ok(Stmt::FunctionDecl {
                    func: Rc::new(func),
                    location,
                })
            }
            Token::Return(_) => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume_semicolon("Expected ';' after return")?;
                Ok(Stmt::Return { value, location })
            }
            Token::If(_) => {
                self.advance();
                self.parse_if_statement(location)
            }
            Token::While(_) => {
                self.advance();
                self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after while condition")?;
                let body = Box::new(self.parse_statement()?);
                Ok(Stmt::While {
                    condition,
                    body,
                    location,
                })
            }
            Token::Do(_) => {
                self.advance();
                let body = Box::new(self.parse_statement()?);
                self.expect_token(&Token::While(loc), "Expected 'while' after do body")?;
                self.expect_token(&Token::LParen(loc), "Expected '(' after 'while'")?;
                let condition = self.parse_expression()?;
                self.expect_token(&Token::RParen(loc), "Expected ')' after do-while condition")?;
                self.match_token(&Token::Semicolon(loc));
                Ok(Stmt::DoWhile {
                    body,
                    condition,
                    location,
                })
            }
            Token::For(_) => {
                self.advance();
                self.parse_for_statement(location)
            }
            Token::Break(_) => {
                self.advance();
                self.consume_semicolon("Expected ';' after 'break'")?;
                Ok(Stmt::Break { location })
            }
            Token::Continue(_) => {
                self.advance();
                self.consume_semicolon("Expected ';' after 'continue'")?;
                Ok(Stmt::Continue { location })
            }
            Token::Throw(_) => {
                self.advance();
                let value = self.parse_expression()?;
                self.consume_semicolon("Expected ';' after throw")?;
                Ok(Stmt::Throw { value, location })
            }
            Token::Try(_) => {
                self.advance();
                self.parse_try_statement(location)
            }
            Token::Semicolon(_) => {
                self.advance();
                Ok(Stmt::Empty { location })
            }
            _ => {
                let expr = self.parse_expression()?;
                self.consume_semicolon("Expected ';' after expression")?;
                Ok(Stmt::Expression { expr, location })
            }
        }
    }

    /// Parse block statements up to and including the closing brace
    fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&Token::RBrace(self.current_location())) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.expect_token(&Token::RBrace(self.current_location()), "Expected '}' after block")?;
        Ok(statements)
    }

    fn parse_decl_kind(&mut self) -> Result<DeclKind, ParseError> {
        let kind = match self.peek() {
            Token::Let(_) => DeclKind::Let,
            Token::Const(_) => DeclKind::Const,
            Token::Var(_) => DeclKind::Var,
            other => {
                return Err(ParseError {
                    message: format!("Expected declaration, found {}", other),
                    location: self.current_location(),
                })
            }
        };
        self.advance();
        Ok(kind)
    }

    /// Parse `a = 1, b, c = 2` after a declaration keyword
    fn parse_declarators(&mut self) -> Result<Vec<Declarator>, ParseError> {
        let mut declarators = Vec::new();
        loop {
            let name = self.expect_identifier()?;
            let init = if self.match_token(&Token::Eq(self.current_location())) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarators.push(Declarator { name, init });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }
        Ok(declarators)
    }

    /// Parse the part of a function after the `function` keyword
    fn parse_function_rest(
        &mut self,
        name_required: bool,
        location: Option<SourceLocation>,
    ) -> Result<Function, ParseError> {
        let name = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Some(name)
        } else if name_required {
            return Err(ParseError {
                message: format!("Expected function name, found {}", self.peek()),
                location: self.current_location(),
            });
        } else {
            None
        };

        self.expect_token(
            &Token::LParen(self.current_location()),
            "Expected '(' before parameters",
        )?;
        let params = self.parse_parameter_list()?;
        self.expect_token(
            &Token::LBrace(self.current_location()),
            "Expected '{' before function body",
        )?;
        let body = self.parse_block_statements()?;

        Ok(Function {
            name,
            params,
            body: FunctionBody::Block(body),
            is_arrow: false,
            location,
        })
    }

    /// Parse parameter list after '(' up to and including ')'
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            let name = self.expect_identifier()?;
            let default = if self.match_token(&Token::Eq(self.current_location())) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            params.push(Param { name, default });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after parameters",
        )?;
        Ok(params)
    }

    fn parse_if_statement(&mut self, location: Option<SourceLocation>) -> Result<Stmt, ParseError> {
        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after if condition",
        )?;

        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.match_token(&Token::Else(self.current_location())) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            consequent,
            alternate,
            location,
        })
    }

    fn parse_for_statement(&mut self, location: Option<SourceLocation>) -> Result<Stmt, ParseError> {
        self.expect_token(&Token::LParen(self.current_location()), "Expected '(' after 'for'")?;

        let init = if self.match_token(&Token::Semicolon(self.current_location())) {
            None
        } else if matches!(self.peek(), Token::Let(_) | Token::Const(_) | Token::Var(_)) {
            let kind = self.parse_decl_kind()?;

            // for (const x of xs)
            if matches!(self.peek_ahead(1), Some(Token::Ident(word, _)) if word == "of") {
                let name = self.expect_identifier()?;
                self.advance(); // consume 'of'
                let iterable = self.parse_expression()?;
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "Expected ')' after for-of iterable",
                )?;
                let body = Box::new(self.parse_statement()?);
                return Ok(Stmt::ForOf {
                    kind,
                    name,
                    iterable,
                    body,
                    location,
                });
            }

            let declarators = self.parse_declarators()?;
            self.expect_token(
                &Token::Semicolon(self.current_location()),
                "Expected ';' after for initializer",
            )?;
            Some(ForInit::Decl { kind, declarators })
        } else {
            let expr = self.parse_expression()?;
            self.expect_token(
                &Token::Semicolon(self.current_location()),
                "Expected ';' after for initializer",
            )?;
            Some(ForInit::Expr(expr))
        };

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            "Expected ';' after for condition",
        )?;

        let update = if self.check(&Token::RParen(self.current_location())) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after for clauses",
        )?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            location,
        })
    }

    fn parse_try_statement(&mut self, location: Option<SourceLocation>) -> Result<Stmt, ParseError> {
        self.expect_token(&Token::LBrace(self.current_location()), "Expected '{' after 'try'")?;
        let block = self.parse_block_statements()?;

        let handler = if self.match_token(&Token::Catch(self.current_location())) {
            let param = if self.match_token(&Token::LParen(self.current_location())) {
                let name = self.expect_identifier()?;
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "Expected ')' after catch parameter",
                )?;
                Some(name)
            } else {
                None
            };
            self.expect_token(&Token::LBrace(self.current_location()), "Expected '{' after 'catch'")?;
            let body = self.parse_block_statements()?;
            Some(CatchClause { param, body })
        } else {
            None
        };

        let finalizer = if self.match_token(&Token::Finally(self.current_location())) {
            self.expect_token(
                &Token::LBrace(self.current_location()),
                "Expected '{' after 'finally'",
            )?;
            Some(self.parse_block_statements()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(ParseError {
                message: "Missing catch or finally after try".to_string(),
                location: self.current_location(),
            });
        }

        Ok(Stmt::Try {
            block,
            handler,
            finalizer,
            location,
        })
    }

    // ===== Expressions =====

    /// Parse an expression (entry point, lowest precedence)
    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment (right-associative), arrow functions included
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        if self.is_arrow_ahead() {
            return self.parse_arrow_function();
        }

        let target = self.parse_conditional()?;

        let loc = self.current_location();
        let op = match self.peek() {
            Token::Eq(_) => AssignOp::Assign,
            Token::PlusEq(_) => AssignOp::AddAssign,
            Token::MinusEq(_) => AssignOp::SubAssign,
            Token::StarEq(_) => AssignOp::MulAssign,
            Token::SlashEq(_) => AssignOp::DivAssign,
            Token::PercentEq(_) => AssignOp::ModAssign,
            _ => return Ok(target),
        };
        self.advance();

        let valid = match &target {
            Expr::Ident(_) | Expr::Index { .. } | Expr::Member { .. } => true,
            Expr::Array(elements) => {
                op == AssignOp::Assign
                    && elements
                        .iter()
                        .all(|e| matches!(e, Expr::Ident(_) | Expr::Index { .. } | Expr::Member { .. }))
            }
            _ => false,
        };
        if !valid {
            return Err(ParseError {
                message: "Invalid left-hand side in assignment".to_string(),
                location: loc,
            });
        }

        let value = self.parse_assignment()?;
        Ok(Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        })
    }

    /// Whether the upcoming tokens start an arrow function
    fn is_arrow_ahead(&self) -> bool {
        match self.peek() {
            Token::Ident(_, _) => matches!(self.peek_ahead(1), Some(Token::FatArrow(_))),
            Token::LParen(_) => {
                let mut depth = 0usize;
                let mut i = self.position;
                while let Some(token) = self.tokens.get(i) {
                    match token {
                        Token::LParen(_) => depth += 1,
                        Token::RParen(_) => {
                            depth -= 1;
                            if depth == 0 {
                                return matches!(self.tokens.get(i + 1), Some(Token::FatArrow(_)));
                            }
                        }
                        Token::Eof(_) => return false,
                        _ => {}
                    }
                    i += 1;
                }
                false
            }
            _ => false,
        }
    }

    fn parse_arrow_function(&mut self) -> Result<Expr, ParseError> {
        let location = Some(self.current_location());

        let params = if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            vec![Param { name, default: None }]
        } else {
            self.advance(); // consume '('
            self.parse_parameter_list()?
        };

        self.expect_token(&Token::FatArrow(self.current_location()), "Expected '=>'")?;

        let body = if self.match_token(&Token::LBrace(self.current_location())) {
            FunctionBody::Block(self.parse_block_statements()?)
        } else {
            FunctionBody::Expr(Box::new(self.parse_assignment()?))
        };

        Ok(Expr::Function(Rc::new(Function {
            name: None,
            params,
            body,
            is_arrow: true,
            location,
        })))
    }

    /// Parse conditional (ternary) operator
    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let test = self.parse_binary(BinOp::Nullish.precedence())?;

        if self.match_token(&Token::Question(self.current_location())) {
            let consequent = self.parse_assignment()?;
            self.expect_token(
                &Token::Colon(self.current_location()),
                "Expected ':' in conditional expression",
            )?;
            let alternate = self.parse_assignment()?;
            return Ok(Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            });
        }

        Ok(test)
    }

    /// Precedence climbing over the left-associative binary operators
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_exponent()?;

        while let Some(op) = self.peek_binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn peek_binary_op(&self) -> Option<BinOp> {
        let op = match self.peek() {
            Token::QuestionQuestion(_) => BinOp::Nullish,
            Token::OrOr(_) => BinOp::Or,
            Token::AndAnd(_) => BinOp::And,
            Token::Pipe(_) => BinOp::BitOr,
            Token::Caret(_) => BinOp::BitXor,
            Token::Amp(_) => BinOp::BitAnd,
            Token::EqEq(_) => BinOp::Eq,
            Token::NotEq(_) => BinOp::Ne,
            Token::EqEqEq(_) => BinOp::StrictEq,
            Token::NotEqEq(_) => BinOp::StrictNe,
            Token::Lt(_) => BinOp::Lt,
            Token::Le(_) => BinOp::Le,
            Token::Gt(_) => BinOp::Gt,
            Token::Ge(_) => BinOp::Ge,
            Token::LtLt(_) => BinOp::Shl,
            Token::GtGt(_) => BinOp::Shr,
            Token::Plus(_) => BinOp::Add,
            Token::Minus(_) => BinOp::Sub,
            Token::Star(_) => BinOp::Mul,
            Token::Slash(_) => BinOp::Div,
            Token::Percent(_) => BinOp::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// Parse exponentiation (right-associative)
    fn parse_exponent(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_unary()?;

        if self.match_token(&Token::StarStar(self.current_location())) {
            let exponent = self.parse_exponent()?;
            return Ok(Expr::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }

        Ok(base)
    }

    /// Parse unary (! ~ - + typeof ++ --)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Token::Bang(_) => Some(UnOp::Not),
            Token::Minus(_) => Some(UnOp::Neg),
            Token::Plus(_) => Some(UnOp::Plus),
            Token::Tilde(_) => Some(UnOp::BitNot),
            Token::Typeof(_) => Some(UnOp::Typeof),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        let update = match self.peek() {
            Token::PlusPlus(_) => Some(UpdateOp::Inc),
            Token::MinusMinus(_) => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = update {
            let loc = self.current_location();
            self.advance();
            let target = self.parse_unary()?;
            Self::check_update_target(&target, loc)?;
            return Ok(Expr::Update {
                op,
                prefix: true,
                target: Box::new(target),
            });
        }

        self.parse_postfix()
    }

    /// Parse postfix ++ / -- (must be on the same line as the operand)
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_call_member()?;

        if self.on_new_line() {
            return Ok(expr);
        }

        let update = match self.peek() {
            Token::PlusPlus(_) => Some(UpdateOp::Inc),
            Token::MinusMinus(_) => Some(UpdateOp::Dec),
            _ => None,
        };
        if let Some(op) = update {
            let loc = self.current_location();
            self.advance();
            Self::check_update_target(&expr, loc)?;
            return Ok(Expr::Update {
                op,
                prefix: false,
                target: Box::new(expr),
            });
        }

        Ok(expr)
    }

    fn check_update_target(target: &Expr, location: SourceLocation) -> Result<(), ParseError> {
        if matches!(target, Expr::Ident(_) | Expr::Index { .. } | Expr::Member { .. }) {
            Ok(())
        } else {
            Err(ParseError {
                message: "Invalid operand for increment/decrement".to_string(),
                location,
            })
        }
    }

    /// Parse calls, indexing and member access chains
    fn parse_call_member(&mut self) -> Result<Expr, ParseError> {
        let mut expr = if self.match_token(&Token::New(self.current_location())) {
            let callee = self.parse_member_only()?;
            let args = if self.match_token(&Token::LParen(self.current_location())) {
                self.parse_argument_list()?
            } else {
                Vec::new()
            };
            Expr::New {
                callee: Box::new(callee),
                args,
            }
        } else {
            self.parse_primary()?
        };

        loop {
            if self.match_token(&Token::Dot(self.current_location())) {
                let property = self.expect_property_name()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.match_token(&Token::LBracket(self.current_location())) {
                let index = self.parse_expression()?;
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after index",
                )?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.match_token(&Token::LParen(self.current_location())) {
                let args = self.parse_argument_list()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Callee of `new`: a primary followed by member accesses, no calls
    fn parse_member_only(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.match_token(&Token::Dot(self.current_location())) {
            let property = self.expect_property_name()?;
            expr = Expr::Member {
                object: Box::new(expr),
                property,
            };
        }
        Ok(expr)
    }

    /// Parse argument list after '(' up to and including ')'
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        while !self.check(&Token::RParen(self.current_location())) {
            args.push(self.parse_element()?);
            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::RParen(self.current_location()),
            "Expected ')' after arguments",
        )?;
        Ok(args)
    }

    /// An array element or call argument, optionally spread
    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.match_token(&Token::Ellipsis(self.current_location())) {
            Ok(Expr::Spread(Box::new(self.parse_assignment()?)))
        } else {
            self.parse_assignment()
        }
    }

    /// Parse primary (literals, identifiers, arrays, function expressions, parens)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        match self.peek_token() {
            Token::Number(n, _) => {
                self.advance();
                Ok(Expr::Number(n))
            }
            Token::Str(s, _) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            Token::True(_) => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            Token::False(_) => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            Token::Null(_) => {
                self.advance();
                Ok(Expr::Null)
            }
            Token::Ident(name, _) => {
                self.advance();
                Ok(Expr::Ident(name))
            }
            Token::Function(_) => {
                self.advance();
                let func = self.parse_function_rest(false, Some(loc))?;
                Ok(Expr::Function(Rc::new(func)))
            }
            Token::LBracket(_) => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&Token::RBracket(self.current_location())) {
                    elements.push(self.parse_element()?);
                    if !self.match_token(&Token::Comma(self.current_location())) {
                        break;
                    }
                }
                self.expect_token(
                    &Token::RBracket(self.current_location()),
                    "Expected ']' after array elements",
                )?;
                Ok(Expr::Array(elements))
            }
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_token(
                    &Token::RParen(self.current_location()),
                    "Expected ')' after expression",
                )?;
                Ok(expr)
            }
            other => Err(ParseError {
                message: format!("Unexpected token: {}", other),
                location: loc,
            }),
        }
    }

    // ===== Helper methods =====

    /// Statement terminator: `;`, or implied by `}`, end of input, or a line break
    fn consume_semicolon(&mut self, message: &str) -> Result<(), ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) || self.at_statement_end() {
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            Token::Semicolon(_) | Token::RBrace(_) | Token::Eof(_)
        ) || self.on_new_line()
    }

    /// Whether the current token starts a new line relative to the previous one
    fn on_new_line(&self) -> bool {
        self.position > 0 && self.current_location().line > self.previous_location().line
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn peek_token(&self) -> Token {
        self.tokens[self.position].clone()
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    fn previous_location(&self) -> SourceLocation {
        self.previous().location()
    }

    fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError {
                message: format!("{}, found {}", message, self.peek()),
                location: self.current_location(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek_token() {
            self.advance();
            Ok(name)
        } else {
            Err(ParseError {
                message: format!("Expected identifier, found {}", self.peek()),
                location: self.current_location(),
            })
        }
    }

    /// Property names after '.' may be keywords (`a.catch`, `x.new`)
    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let token = self.peek_token();
        let name = match token {
            Token::Ident(name, _) => name,
            other => {
                let text = other.to_string();
                let keyword = text.trim_matches('\'');
                if !text.starts_with('\'') || !keyword.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(ParseError {
                        message: format!("Expected property name, found {}", other),
                        location: self.current_location(),
                    });
                }
                keyword.to_string()
            }
        };
        self.advance();
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        parse_program(source).unwrap()
    }

    #[test]
    fn test_parse_function_declaration() {
        let program = parse("function bubbleSort(arr) { return arr; }");

        assert_eq!(program.body.len(), 1);
        match &program.body[0] {
            Stmt::FunctionDecl { func, location } => {
                assert_eq!(func.name.as_deref(), Some("bubbleSort"));
                assert_eq!(func.params.len(), 1);
                assert_eq!(location.map(|l| l.line), Some(1));
                assert!(matches!(&func.body, FunctionBody::Block(body) if body.len() == 1));
            }
            other => panic!("Expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_default_parameters() {
        let program = parse("function quickSort(arr, low = 0, high = arr.length - 1) {}");
        match &program.body[0] {
            Stmt::FunctionDecl { func, .. } => {
                assert!(func.params[0].default.is_none());
                assert_eq!(func.params[1].default, Some(Expr::Number(0.0)));
                assert!(matches!(
                    func.params[2].default,
                    Some(Expr::Binary { op: BinOp::Sub, .. })
                ));
            }
            other => panic!("Expected function declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let program = parse("x = 1 + 2 * 3 < 10 && y;");
        let Stmt::Expression { expr, .. } = &program.body[0] else {
            panic!("Expected expression statement");
        };
        let Expr::Assign { value, .. } = expr else {
            panic!("Expected assignment");
        };
        let Expr::Binary { op, left, .. } = value.as_ref() else {
            panic!("Expected binary");
        };
        assert_eq!(*op, BinOp::And);
        assert!(matches!(left.as_ref(), Expr::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn test_single_statement_branches() {
        let program = parse("function f(a) { if (a > 0) return 1; else return 0; }");
        let Stmt::FunctionDecl { func, .. } = &program.body[0] else {
            panic!("Expected function");
        };
        let FunctionBody::Block(body) = &func.body else {
            panic!("Expected block body");
        };
        match &body[0] {
            Stmt::If {
                consequent,
                alternate,
                ..
            } => {
                assert!(matches!(consequent.as_ref(), Stmt::Return { .. }));
                assert!(matches!(alternate.as_deref(), Some(Stmt::Return { .. })));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_semicolons() {
        let program = parse("let a = 1\nlet b = 2\nfunction f() { return }");
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_return_on_new_line_has_no_value() {
        let program = parse("function f() { return\n1 }");
        let Stmt::FunctionDecl { func, .. } = &program.body[0] else {
            panic!("Expected function");
        };
        let FunctionBody::Block(body) = &func.body else {
            panic!("Expected block body");
        };
        assert!(matches!(body[0], Stmt::Return { value: None, .. }));
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_arrow_functions() {
        let program = parse("const f = (a, b) => a - b; const g = x => { return x; };");
        for stmt in &program.body {
            let Stmt::VarDecl { declarators, .. } = stmt else {
                panic!("Expected declaration");
            };
            assert!(matches!(&declarators[0].init, Some(Expr::Function(f)) if f.is_arrow));
        }
    }

    #[test]
    fn test_for_of_and_destructuring_swap() {
        let program = parse(
            "for (const v of graph[0]) { seen.push(v); }\n[arr[i], arr[j]] = [arr[j], arr[i]];",
        );
        assert!(matches!(program.body[0], Stmt::ForOf { .. }));
        assert!(matches!(
            &program.body[1],
            Stmt::Expression { expr: Expr::Assign { target, .. }, .. } if matches!(target.as_ref(), Expr::Array(_))
        ));
    }

    #[test]
    fn test_try_finally() {
        let program = parse("try { f(); } finally { g(); }");
        assert!(matches!(
            &program.body[0],
            Stmt::Try { handler: None, finalizer: Some(f), .. } if f.len() == 1
        ));
    }

    #[test]
    fn test_syntax_error_location() {
        let err = parse_program("function f( {").unwrap_err();
        assert_eq!(err.location.line, 1);
        assert!(err.to_string().starts_with("SyntaxError"));
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse_program("1 = 2;").unwrap_err();
        assert!(err.message.contains("Invalid left-hand side"));
    }
}
