use std::rc::Rc;

use crate::{token::Token, value::Value};

/// Identity of an AST node that participates in name resolution.
///
/// Ids are dense and assigned at parse time, so the resolver's output can be
/// stored in id-indexed vectors instead of maps keyed by node pointers. A
/// REPL session keeps one counter across lines; resolutions recorded for a
/// closure created on an earlier line stay valid when it is called later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of function a declaration is; fixed at parse time except that
/// instance methods named `init` become `Initializer` when the enclosing
/// class is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FunctionKind {
    Function,
    Method,
    Initializer,
    /// A method declared without a parameter list; invoked implicitly on
    /// property access.
    GetMethod,
}

impl FunctionKind {
    /// Noun used in parser messages ("Expect function name." etc.).
    pub fn describe(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method | Self::Initializer | Self::GetMethod => "method",
        }
    }
}

/// A function's parameters and body.
///
/// Shared via `Rc`: function values on the heap keep their declaration alive
/// after the statement tree that produced it is dropped (a REPL line's AST
/// does not outlive the line, but closures created from it do).
#[derive(Debug)]
pub(crate) struct FunctionDecl {
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
    pub kind: FunctionKind,
}

#[derive(Debug)]
pub(crate) enum Expr {
    Literal(Value),
    Grouping(Box<Expr>),
    Unary {
        op: Token,
        right: Box<Expr>,
    },
    /// Also carries the comma operator: `op` is then `TokenType::Comma`.
    Binary {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    Logical {
        left: Box<Expr>,
        op: Token,
        right: Box<Expr>,
    },
    /// Ternary `cond ? then : else`. Only the selected branch is evaluated.
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Variable {
        name: Token,
        id: NodeId,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
        id: NodeId,
    },
    Call {
        callee: Box<Expr>,
        /// The closing parenthesis; runtime call errors are attributed to it.
        paren: Token,
        args: Vec<Expr>,
    },
    Get {
        object: Box<Expr>,
        name: Token,
    },
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },
    This {
        keyword: Token,
        id: NodeId,
    },
    Super {
        keyword: Token,
        method: Token,
        id: NodeId,
    },
    /// An anonymous `fun` expression.
    Function(Rc<FunctionDecl>),
}

#[derive(Debug)]
pub(crate) enum Stmt {
    Expression(Expr),
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    Break,
    Function {
        name: Token,
        decl: Rc<FunctionDecl>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Class {
        name: Token,
        /// Superclass name plus the resolution id of its variable use.
        superclass: Option<(Token, NodeId)>,
        methods: Vec<(Token, Rc<FunctionDecl>)>,
        class_methods: Vec<(Token, Rc<FunctionDecl>)>,
        /// Resolution id for the slot the finished class is assigned into.
        id: NodeId,
    },
}

impl Stmt {
    /// Short name used by tracers.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Expression(_) => "expression",
            Self::Var { .. } => "var",
            Self::Block(_) => "block",
            Self::If { .. } => "if",
            Self::While { .. } => "while",
            Self::Break => "break",
            Self::Function { .. } => "fun",
            Self::Return { .. } => "return",
            Self::Class { .. } => "class",
        }
    }
}
