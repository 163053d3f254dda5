use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    ast::{Expr, FunctionDecl, FunctionKind, NodeId, Stmt},
    diag::Diagnostics,
    token::Token,
};

/// Where a resolved name lives: `depth` enclosing-frame hops up, then
/// `slot` within that frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Resolution {
    pub depth: u16,
    pub slot: u16,
}

/// Node-id-indexed resolution table consumed by the evaluator.
///
/// Absence means the name is global. Owned by the interpreter so entries
/// recorded for a closure survive the REPL line that created it.
#[derive(Debug, Default)]
pub(crate) struct Resolutions {
    entries: Vec<Option<Resolution>>,
}

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, depth: u16, slot: u16) {
        if self.entries.len() <= id.index() {
            self.entries.resize(id.index() + 1, None);
        }
        self.entries[id.index()] = Some(Resolution { depth, slot });
    }

    pub fn get(&self, id: NodeId) -> Option<Resolution> {
        self.entries.get(id.index()).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarState {
    Declared,
    Defined,
    Read,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassContext {
    None,
    Class,
    Subclass,
}

/// One name in a scope: its declaring token (for error positions), the slot
/// the evaluator will push it into, and how far its lifecycle has advanced.
#[derive(Debug)]
struct Local {
    token: Token,
    slot: u16,
    state: VarState,
}

/// Single pre-evaluation pass binding every local name use to a
/// `(depth, slot)` pair and enforcing the static rules.
///
/// Scopes are insertion-ordered maps, so a name's map index *is* its slot:
/// the evaluator pushes values in the same declaration order at runtime.
/// Names that fall through every scope resolve to globals at runtime.
/// All errors are reported, never thrown; the pipeline gates on the
/// diagnostics flags afterwards.
pub(crate) struct Resolver<'a> {
    scopes: Vec<IndexMap<Rc<str>, Local>>,
    diag: &'a mut Diagnostics,
    resolutions: &'a mut Resolutions,
    current_function: Option<FunctionKind>,
    current_class: ClassContext,
}

impl<'a> Resolver<'a> {
    pub fn new(diag: &'a mut Diagnostics, resolutions: &'a mut Resolutions) -> Self {
        Self {
            scopes: Vec::new(),
            diag,
            resolutions,
            current_function: None,
            current_class: ClassContext::None,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve(statements);
                self.end_scope();
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Break => {}
            Stmt::Function { name, decl } => {
                self.declare(name);
                self.define(name);
                self.resolve_function(decl, decl.kind);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function.is_none() {
                    self.diag.error_at(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == Some(FunctionKind::Initializer) {
                        self.diag
                            .error_at(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
                id,
            } => self.resolve_class(name, superclass.as_ref(), methods, class_methods, *id),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&(Token, NodeId)>,
        methods: &[(Token, Rc<FunctionDecl>)],
        class_methods: &[(Token, Rc<FunctionDecl>)],
        id: NodeId,
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassContext::Class;

        self.declare(name);
        self.define(name);
        // The finished class object is assigned back into this slot.
        self.resolve_local(id, name, false);

        if let Some((super_name, super_id)) = superclass {
            if super_name.lexeme == name.lexeme {
                self.diag.error_at(super_name, "A class can't inherit from itself.");
            }
            self.current_class = ClassContext::Subclass;
            self.resolve_local(*super_id, super_name, true);
            // Extra scope so every method can reach the superclass at a
            // fixed (depth, slot 0).
            self.begin_scope();
            self.bind_implicit("super", super_name);
        }

        self.begin_scope();
        self.bind_implicit("this", name);

        for (method_name, decl) in methods {
            let kind = if decl.kind == FunctionKind::GetMethod {
                FunctionKind::GetMethod
            } else if &*method_name.lexeme == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(decl, kind);
        }
        for (_, decl) in class_methods {
            let kind = if decl.kind == FunctionKind::GetMethod {
                FunctionKind::GetMethod
            } else {
                FunctionKind::Method
            };
            self.resolve_function(decl, kind);
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }
        self.current_class = enclosing_class;
    }

    fn resolve_expr(&mut self, expression: &Expr) {
        match expression {
            Expr::Literal(_) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(cond);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }
            Expr::Variable { name, id } => {
                if let Some(scope) = self.scopes.last()
                    && let Some(local) = scope.get(&name.lexeme)
                    && local.state == VarState::Declared
                {
                    self.diag
                        .error_at(name, "Can't read local variable in its own initializer.");
                }
                self.resolve_local(*id, name, true);
            }
            Expr::Assign { name, value, id } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name, false);
            }
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { keyword, id } => {
                if self.current_class == ClassContext::None {
                    self.diag.error_at(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, keyword, true);
            }
            Expr::Super { keyword, id, .. } => match self.current_class {
                ClassContext::None => {
                    self.diag.error_at(keyword, "Can't use 'super' outside of a class.");
                }
                ClassContext::Class => {
                    self.diag
                        .error_at(keyword, "Can't use 'super' in a class with no superclass.");
                }
                ClassContext::Subclass => self.resolve_local(*id, keyword, true),
            },
            Expr::Function(decl) => self.resolve_function(decl, FunctionKind::Function),
        }
    }

    /// Body statements share the parameter scope: locals declared in the
    /// body take the slots after the parameters, matching the frame the
    /// evaluator builds at call time.
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) {
        let enclosing_function = self.current_function.replace(kind);
        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&decl.body);
        self.end_scope();
        self.current_function = enclosing_function;
    }

    /// Walks scopes innermost-out; on a hit records `(depth, slot)` for the
    /// node and, for reads, advances the name's state. A miss means the
    /// reference resolves to globals at runtime.
    fn resolve_local(&mut self, id: NodeId, name: &Token, is_read: bool) {
        for (depth, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(local) = scope.get_mut(&name.lexeme) {
                self.resolutions.insert(id, depth as u16, local.slot);
                if is_read {
                    local.state = VarState::Read;
                }
                return;
            }
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(IndexMap::new());
    }

    fn end_scope(&mut self) {
        let scope = self.scopes.pop().expect("scope stack underflow");
        for (_, local) in &scope {
            if local.state != VarState::Read {
                self.diag.error_at(&local.token, "Local variable not used.");
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.diag.error_at(
                name,
                "Variable with this name has already been declared in this scope.",
            );
            return;
        }
        let slot = scope.len() as u16;
        scope.insert(
            Rc::clone(&name.lexeme),
            Local {
                token: name.clone(),
                slot,
                state: VarState::Declared,
            },
        );
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut()
            && let Some(local) = scope.get_mut(&name.lexeme)
        {
            local.state = VarState::Defined;
        }
    }

    /// Binds `this`/`super` into the current scope. Created already read so
    /// the unused-local check never fires for implicit bindings.
    fn bind_implicit(&mut self, name: &'static str, token: &Token) {
        let scope = self.scopes.last_mut().expect("implicit binding requires a scope");
        let slot = scope.len() as u16;
        scope.insert(
            Rc::from(name),
            Local {
                token: token.clone(),
                slot,
                state: VarState::Read,
            },
        );
    }
}
