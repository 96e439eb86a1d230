// AST (Abstract Syntax Tree) definitions for the algorithm language subset

use std::rc::Rc;

/// Source location information for error reporting and line tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Let => "let",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Comparison
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    // Logical (short-circuit)
    And,
    Or,
    Nullish,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNe => "!==",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Nullish => "??",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    /// Binding strength, higher binds tighter
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Nullish => 3,
            BinOp::Or => 4,
            BinOp::And => 5,
            BinOp::BitOr => 6,
            BinOp::BitXor => 7,
            BinOp::BitAnd => 8,
            BinOp::Eq | BinOp::Ne | BinOp::StrictEq | BinOp::StrictNe => 9,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 10,
            BinOp::Shl | BinOp::Shr => 11,
            BinOp::Add | BinOp::Sub => 12,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 13,
            BinOp::Pow => 14,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Lt
                | BinOp::Le
                | BinOp::Gt
                | BinOp::Ge
                | BinOp::Eq
                | BinOp::Ne
                | BinOp::StrictEq
                | BinOp::StrictNe
        )
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    BitNot, // ~x
    Typeof, // typeof x
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::Typeof => "typeof ",
        }
    }
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

/// Assignment operators. `Assign` is plain `=`, the rest are compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }

    /// The binary operator a compound assignment applies
    pub fn binary_op(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
            AssignOp::MulAssign => Some(BinOp::Mul),
            AssignOp::DivAssign => Some(BinOp::Div),
            AssignOp::ModAssign => Some(BinOp::Mod),
        }
    }
}

/// Function parameter with optional default value
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

/// Body of a function: a statement block, or a single expression for arrows
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    Expr(Box<Expr>),
}

/// Function declaration, function expression, or arrow function
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub location: Option<SourceLocation>,
}

/// One `name = init` entry of a declaration statement
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

/// `catch (param) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Vec<Stmt>,
}

/// Initializer slot of a `for` statement
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Decl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
    },
    Expr(Expr),
}

/// Statement nodes. Synthesized statements have no location.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
        location: Option<SourceLocation>,
    },
    FunctionDecl {
        func: Rc<Function>,
        location: Option<SourceLocation>,
    },
    Expression {
        expr: Expr,
        location: Option<SourceLocation>,
    },
    Return {
        value: Option<Expr>,
        location: Option<SourceLocation>,
    },
    If {
        condition: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
        location: Option<SourceLocation>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: Option<SourceLocation>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        location: Option<SourceLocation>,
    },
    For {
        init: Option<ForInit>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        location: Option<SourceLocation>,
    },
    ForOf {
        kind: DeclKind,
        name: String,
        iterable: Expr,
        body: Box<Stmt>,
        location: Option<SourceLocation>,
    },
    Block {
        body: Vec<Stmt>,
        location: Option<SourceLocation>,
    },
    Break {
        location: Option<SourceLocation>,
    },
    Continue {
        location: Option<SourceLocation>,
    },
    Throw {
        value: Expr,
        location: Option<SourceLocation>,
    },
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
        location: Option<SourceLocation>,
    },
    Empty {
        location: Option<SourceLocation>,
    },
}

impl Stmt {
    /// Get the source location of this statement, if it has one
    pub fn location(&self) -> Option<SourceLocation> {
        match self {
            Stmt::VarDecl { location, .. }
            | Stmt::FunctionDecl { location, .. }
            | Stmt::Expression { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForOf { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Throw { location, .. }
            | Stmt::Try { location, .. }
            | Stmt::Empty { location } => *location,
        }
    }

    /// Replace the location of this statement
    pub fn with_location(mut self, new_location: Option<SourceLocation>) -> Self {
        match &mut self {
            Stmt::VarDecl { location, .. }
            | Stmt::FunctionDecl { location, .. }
            | Stmt::Expression { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::ForOf { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Throw { location, .. }
            | Stmt::Try { location, .. }
            | Stmt::Empty { location } => *location = new_location,
        }
        self
    }

    /// Synthesized `callee(args);` statement without a location
    pub fn call(callee: &str, args: Vec<Expr>) -> Self {
        Stmt::Expression {
            expr: Expr::Call {
                callee: Box::new(Expr::Ident(callee.to_string())),
                args,
            },
            location: None,
        }
    }

    /// If this is `callee(args);`, return the callee name and arguments
    pub fn as_call(&self) -> Option<(&str, &[Expr])> {
        match self {
            Stmt::Expression {
                expr: Expr::Call { callee, args },
                ..
            } => match callee.as_ref() {
                Expr::Ident(name) => Some((name.as_str(), args.as_slice())),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    Ident(String),
    Array(Vec<Expr>),
    Spread(Box<Expr>),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        property: String,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Function(Rc<Function>),
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
