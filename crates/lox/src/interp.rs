use std::{rc::Rc, time::Instant};

use ahash::AHashMap;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::{
    ast::{Expr, FunctionDecl, FunctionKind, NodeId, Stmt},
    environment::{EnvId, Environments, Globals},
    error::{RunResult, RuntimeError, Unwind},
    heap::{Heap, HeapData, HeapId, LoxClass, LoxFunction, LoxInstance},
    io::Io,
    natives::{self, ArrayMethod, NativeFn},
    resolver::Resolutions,
    resource::ResourceLimits,
    token::{Token, TokenType},
    value::Value,
};

/// Whether the run came from a file or the interactive prompt. In REPL mode
/// an expression statement that is not an assignment echoes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunMode {
    File,
    Repl,
}

/// The evaluator: walks statements and expressions, consuming the
/// resolver's `(depth, slot)` annotations.
///
/// All state a REPL session must keep between lines lives here: the arena
/// heap, the environment arena, globals, and the resolution table. `env` is
/// the innermost frame, or `None` at top level where declarations go to
/// globals.
pub(crate) struct Interp {
    pub heap: Heap,
    pub envs: Environments,
    pub globals: Globals,
    pub resolutions: Resolutions,
    env: Option<EnvId>,
    limits: ResourceLimits,
    call_depth: usize,
    pub started: Instant,
}

impl Interp {
    pub fn new(limits: ResourceLimits) -> Self {
        let mut globals = Globals::new();
        for native in [NativeFn::Clock, NativeFn::Read, NativeFn::Print, NativeFn::Array] {
            let name: &'static str = native.into();
            globals.define(Rc::from(name), Value::Native(native));
        }
        Self {
            heap: Heap::new(),
            envs: Environments::new(),
            globals,
            resolutions: Resolutions::new(),
            env: None,
            limits,
            call_depth: 0,
            started: Instant::now(),
        }
    }

    pub fn limits(&self) -> ResourceLimits {
        self.limits
    }

    /// Runs a list of top-level statements. A runtime error stops execution
    /// immediately; a stray break/return unwind is an interpreter bug and
    /// surfaces as an internal runtime error rather than being swallowed.
    pub fn interpret(&mut self, statements: &[Stmt], mode: RunMode, io: &mut Io<'_>) -> Result<(), RuntimeError> {
        for statement in statements {
            if let Err(unwind) = self.execute_top(statement, mode, io) {
                let error = match unwind {
                    Unwind::Error(error) => error,
                    Unwind::Break => RuntimeError::internal("'break' escaped its enclosing loop."),
                    Unwind::Return(_) => RuntimeError::internal("'return' escaped its function."),
                };
                io.tracer.on_runtime_error(&error.message);
                return Err(error);
            }
        }
        Ok(())
    }

    fn execute_top(&mut self, statement: &Stmt, mode: RunMode, io: &mut Io<'_>) -> RunResult<()> {
        if mode == RunMode::Repl
            && let Stmt::Expression(expr) = statement
            && !matches!(expr, Expr::Assign { .. })
        {
            let value = self.evaluate(expr, io)?;
            let rendered = value.stringify(&self.heap);
            io.print.write_line(&rendered);
            return Ok(());
        }
        self.execute(statement, io)
    }

    fn execute(&mut self, statement: &Stmt, io: &mut Io<'_>) -> RunResult<()> {
        io.tracer.on_statement(statement.kind_name());
        match statement {
            Stmt::Expression(expr) => {
                self.evaluate(expr, io)?;
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(initializer) => self.evaluate(initializer, io)?,
                    None => Value::Undefined,
                };
                self.define_variable(name, value);
                Ok(())
            }
            Stmt::Block(statements) => {
                let frame = self.envs.push_frame(self.env);
                self.execute_block(statements, frame, io)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, io)?.is_truthy() {
                    self.execute(then_branch, io)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, io)
                } else {
                    Ok(())
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, io)?.is_truthy() {
                    match self.execute(body, io) {
                        Err(Unwind::Break) => break,
                        other => other?,
                    }
                }
                Ok(())
            }
            Stmt::Break => Err(Unwind::Break),
            Stmt::Function { name, decl } => {
                let function = self.heap.allocate(HeapData::Function(LoxFunction {
                    name: Some(Rc::clone(&name.lexeme)),
                    decl: Rc::clone(decl),
                    closure: self.env,
                    kind: decl.kind,
                }));
                self.define_variable(name, Value::Ref(function));
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.evaluate(value, io)?,
                    None => Value::Nil,
                };
                Err(Unwind::Return(value))
            }
            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
                id,
            } => self.execute_class(name, superclass.as_ref(), methods, class_methods, *id),
        }
    }

    /// Builds a class object: evaluate the superclass, open the `super`
    /// frame, build both method tables (instance methods on the class,
    /// static methods on a synthesized metaclass), then assign the finished
    /// class into the slot reserved for the declaration.
    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&(Token, NodeId)>,
        methods: &[(Token, Rc<FunctionDecl>)],
        class_methods: &[(Token, Rc<FunctionDecl>)],
        id: NodeId,
    ) -> RunResult<()> {
        // Reserve the declaration's slot before anything else runs so later
        // declarations in the same scope land on their resolved slots.
        let resolution = self.resolutions.get(id);
        if resolution.is_some() {
            let env = self.local_env(name)?;
            self.envs.define(env, Value::Undefined);
        } else {
            self.globals.define(Rc::clone(&name.lexeme), Value::Undefined);
        }

        let superclass_id = match superclass {
            Some((super_name, super_id)) => {
                let value = self.look_up_variable(super_name, *super_id)?;
                match value {
                    Value::Ref(heap_id) if matches!(self.heap.get(heap_id), HeapData::Class(_)) => Some(heap_id),
                    _ => return Err(RuntimeError::new(super_name, "Superclass must be a class.").into()),
                }
            }
            None => None,
        };

        // Methods close over an extra frame holding the superclass, giving
        // `super` a fixed (depth, slot 0) from every method body.
        let mut class_env = self.env;
        if let Some(superclass_id) = superclass_id {
            let frame = self.envs.push_frame(self.env);
            self.envs.define(frame, Value::Ref(superclass_id));
            class_env = Some(frame);
        }

        let mut method_table: IndexMap<Rc<str>, HeapId> = IndexMap::new();
        for (method_name, decl) in methods {
            let kind = if decl.kind == FunctionKind::GetMethod {
                FunctionKind::GetMethod
            } else if &*method_name.lexeme == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            let function = self.heap.allocate(HeapData::Function(LoxFunction {
                name: Some(Rc::clone(&method_name.lexeme)),
                decl: Rc::clone(decl),
                closure: class_env,
                kind,
            }));
            method_table.insert(Rc::clone(&method_name.lexeme), function);
        }

        let mut static_table: IndexMap<Rc<str>, HeapId> = IndexMap::new();
        for (method_name, decl) in class_methods {
            let kind = if decl.kind == FunctionKind::GetMethod {
                FunctionKind::GetMethod
            } else {
                FunctionKind::Method
            };
            let function = self.heap.allocate(HeapData::Function(LoxFunction {
                name: Some(Rc::clone(&method_name.lexeme)),
                decl: Rc::clone(decl),
                closure: class_env,
                kind,
            }));
            static_table.insert(Rc::clone(&method_name.lexeme), function);
        }

        // The metaclass chain mirrors the class chain so static methods are
        // inherited through the same find_method walk.
        let meta_superclass = superclass_id.and_then(|superclass_id| self.heap.class(superclass_id).metaclass);
        let metaclass = self.heap.allocate(HeapData::Class(LoxClass {
            name: Rc::from(format!("{} metaclass", name.lexeme)),
            superclass: meta_superclass,
            methods: static_table,
            metaclass: None,
        }));
        let class = self.heap.allocate(HeapData::Class(LoxClass {
            name: Rc::clone(&name.lexeme),
            superclass: superclass_id,
            methods: method_table,
            metaclass: Some(metaclass),
        }));

        match resolution {
            Some(resolution) => {
                let env = self.local_env(name)?;
                self.envs
                    .assign_at(env, resolution.depth, resolution.slot, Value::Ref(class));
            }
            None => self.globals.define(Rc::clone(&name.lexeme), Value::Ref(class)),
        }
        Ok(())
    }

    /// Runs `statements` with `frame` as the innermost environment,
    /// restoring the previous environment on every exit path.
    fn execute_block(&mut self, statements: &[Stmt], frame: EnvId, io: &mut Io<'_>) -> RunResult<()> {
        let previous = self.env;
        self.env = Some(frame);
        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement, io);
            if result.is_err() {
                break;
            }
        }
        self.env = previous;
        result
    }

    /// Declares a new binding: a slot push inside a frame, a named entry at
    /// top level.
    fn define_variable(&mut self, name: &Token, value: Value) {
        match self.env {
            Some(env) => {
                self.envs.define(env, value);
            }
            None => self.globals.define(Rc::clone(&name.lexeme), value),
        }
    }

    fn evaluate(&mut self, expression: &Expr, io: &mut Io<'_>) -> RunResult<Value> {
        match expression {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner, io),
            Expr::Unary { op, right } => {
                let right = self.evaluate(right, io)?;
                match op.kind {
                    TokenType::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(op, "Operand must be a number.").into()),
                    },
                    TokenType::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(RuntimeError::internal("unary operator is '!' or '-'").into()),
                }
            }
            Expr::Binary { left, op, right } => self.binary(left, op, right, io),
            Expr::Logical { left, op, right } => {
                let left = self.evaluate(left, io)?;
                if op.kind == TokenType::Or {
                    if left.is_truthy() {
                        return Ok(left);
                    }
                } else if !left.is_truthy() {
                    return Ok(left);
                }
                self.evaluate(right, io)
            }
            Expr::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                // Only the selected branch runs.
                if self.evaluate(cond, io)?.is_truthy() {
                    self.evaluate(then_branch, io)
                } else {
                    self.evaluate(else_branch, io)
                }
            }
            Expr::Variable { name, id } => self.look_up_variable(name, *id),
            Expr::Assign { name, value, id } => {
                let value = self.evaluate(value, io)?;
                match self.resolutions.get(*id) {
                    Some(resolution) => {
                        let env = self.local_env(name)?;
                        self.envs
                            .assign_at(env, resolution.depth, resolution.slot, value.clone());
                    }
                    None => {
                        if !self.globals.assign_if_present(&name.lexeme, value.clone()) {
                            let message = format!("Undefined variable '{}'.", name.lexeme);
                            return Err(RuntimeError::new(name, message).into());
                        }
                    }
                }
                Ok(value)
            }
            Expr::Call { callee, paren, args } => {
                let callee = self.evaluate(callee, io)?;
                let mut arg_values: SmallVec<[Value; 8]> = SmallVec::new();
                for arg in args {
                    arg_values.push(self.evaluate(arg, io)?);
                }
                self.call_value(&callee, &arg_values, paren, io)
            }
            Expr::Get { object, name } => {
                let object = self.evaluate(object, io)?;
                self.get_property(&object, name, io)
            }
            Expr::Set { object, name, value } => self.set_property(object, name, value, io),
            Expr::This { keyword, id } => self.look_up_variable(keyword, *id),
            Expr::Super { keyword, method, id } => self.eval_super(keyword, method, *id, io),
            Expr::Function(decl) => {
                let function = self.heap.allocate(HeapData::Function(LoxFunction {
                    name: None,
                    decl: Rc::clone(decl),
                    closure: self.env,
                    kind: decl.kind,
                }));
                Ok(Value::Ref(function))
            }
        }
    }

    fn binary(&mut self, left: &Expr, op: &Token, right: &Expr, io: &mut Io<'_>) -> RunResult<Value> {
        // The comma operator shares the Binary node: evaluate the left for
        // effect, return the right.
        if op.kind == TokenType::Comma {
            self.evaluate(left, io)?;
            return self.evaluate(right, io);
        }

        let left = self.evaluate(left, io)?;
        let right = self.evaluate(right, io)?;
        match op.kind {
            TokenType::Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                _ if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) => {
                    let text = format!("{}{}", left.stringify(&self.heap), right.stringify(&self.heap));
                    Ok(Value::Str(Rc::from(text)))
                }
                _ => Err(RuntimeError::new(op, "Operands must be numbers or strings.").into()),
            },
            TokenType::Minus => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Number(a - b))
            }
            TokenType::Star => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                Ok(Value::Number(a * b))
            }
            TokenType::Slash => {
                let (a, b) = self.number_operands(op, &left, &right)?;
                if b == 0.0 {
                    return Err(RuntimeError::new(op, "Division by zero.").into());
                }
                Ok(Value::Number(a / b))
            }
            TokenType::Greater | TokenType::GreaterEqual | TokenType::Less | TokenType::LessEqual => {
                self.compare(op, &left, &right)
            }
            TokenType::EqualEqual => Ok(Value::Bool(left.equals(&right, &self.heap))),
            TokenType::BangEqual => Ok(Value::Bool(!left.equals(&right, &self.heap))),
            _ => Err(RuntimeError::internal("unhandled binary operator").into()),
        }
    }

    /// Ordering comparisons require operands that are uniformly numbers or
    /// uniformly strings.
    fn compare(&self, op: &Token, left: &Value, right: &Value) -> RunResult<Value> {
        let result = match (left, right) {
            (Value::Number(a), Value::Number(b)) => match op.kind {
                TokenType::Greater => a > b,
                TokenType::GreaterEqual => a >= b,
                TokenType::Less => a < b,
                TokenType::LessEqual => a <= b,
                _ => unreachable!("comparison operator"),
            },
            (Value::Str(a), Value::Str(b)) => match op.kind {
                TokenType::Greater => a > b,
                TokenType::GreaterEqual => a >= b,
                TokenType::Less => a < b,
                TokenType::LessEqual => a <= b,
                _ => unreachable!("comparison operator"),
            },
            _ => return Err(RuntimeError::new(op, "Operands must all be of the same type.").into()),
        };
        Ok(Value::Bool(result))
    }

    fn number_operands(&self, op: &Token, left: &Value, right: &Value) -> RunResult<(f64, f64)> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(RuntimeError::new(op, "Operands must be numbers.").into()),
        }
    }

    /// Resolved variables read their frame slot; everything else falls back
    /// to globals. Reading the uninitialized sentinel is an error either
    /// way.
    fn look_up_variable(&self, name: &Token, id: NodeId) -> RunResult<Value> {
        let value = match self.resolutions.get(id) {
            Some(resolution) => {
                let env = self.local_env(name)?;
                self.envs.get_at(env, resolution.depth, resolution.slot).clone()
            }
            None => match self.globals.get(&name.lexeme) {
                Some(value) => value.clone(),
                None => {
                    let message = format!("Undefined variable '{}'.", name.lexeme);
                    return Err(RuntimeError::new(name, message).into());
                }
            },
        };
        if matches!(value, Value::Undefined) {
            return Err(RuntimeError::new(name, "Variable must be initialized before use.").into());
        }
        Ok(value)
    }

    fn local_env(&self, token: &Token) -> RunResult<EnvId> {
        match self.env {
            Some(env) => Ok(env),
            None => Err(RuntimeError::new(token, "Internal error: resolved name outside any frame.").into()),
        }
    }

    /// The callable protocol: anything callable has an arity; the callee is
    /// checked first, then the argument count, then the call dispatches.
    fn call_value(&mut self, callee: &Value, args: &[Value], paren: &Token, io: &mut Io<'_>) -> RunResult<Value> {
        let arity = match self.callable_arity(callee) {
            Some(arity) => arity,
            None => return Err(RuntimeError::new(paren, "Can only call functions and classes.").into()),
        };
        if args.len() != arity {
            let message = format!("Expected {arity} arguments but got {}.", args.len());
            return Err(RuntimeError::new(paren, message).into());
        }
        match callee {
            Value::Native(native) => natives::call_native(*native, self, io, paren, args),
            Value::ArrayMethod(method, array) => natives::call_array_method(*method, *array, &mut self.heap, paren, args),
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Function(_) => self.call_function(*id, args, paren, io),
                HeapData::Class(_) => self.call_class(*id, args, paren, io),
                _ => Err(RuntimeError::new(paren, "Can only call functions and classes.").into()),
            },
            _ => Err(RuntimeError::new(paren, "Can only call functions and classes.").into()),
        }
    }

    fn callable_arity(&self, callee: &Value) -> Option<usize> {
        match callee {
            Value::Native(native) => Some(native.arity()),
            Value::ArrayMethod(method, _) => Some(method.arity()),
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Function(function) => Some(function.decl.params.len()),
                HeapData::Class(_) => Some(
                    self.heap
                        .find_method(*id, "init")
                        .map_or(0, |init| self.heap.function(init).decl.params.len()),
                ),
                _ => None,
            },
            _ => None,
        }
    }

    /// Invokes a user function: new frame under the captured environment,
    /// arguments pushed in parameter order, *return* caught here. An
    /// initializer always yields `this` (bind put it in the closure's slot
    /// 0), even on bare `return;` or fall-through.
    fn call_function(&mut self, function: HeapId, args: &[Value], paren: &Token, io: &mut Io<'_>) -> RunResult<Value> {
        if self.call_depth >= self.limits.max_recursion_depth {
            return Err(RuntimeError::new(paren, "Maximum recursion depth exceeded.").into());
        }
        self.call_depth += 1;

        let (decl, closure, kind, name) = {
            let f = self.heap.function(function);
            (Rc::clone(&f.decl), f.closure, f.kind, f.name.clone())
        };
        io.tracer
            .on_call(name.as_deref().unwrap_or("<anonymous>"), args.len(), self.call_depth);

        let frame = self.envs.push_frame(closure);
        for arg in args {
            self.envs.define(frame, arg.clone());
        }
        let result = self.execute_block(&decl.body, frame, io);

        self.call_depth -= 1;
        io.tracer.on_return(self.call_depth);

        let initializer_this = |interp: &Self| -> RunResult<Value> {
            let closure = closure.ok_or_else(|| {
                Unwind::Error(RuntimeError::new(paren, "Internal error: unbound initializer."))
            })?;
            Ok(interp.envs.get_at(closure, 0, 0).clone())
        };
        match result {
            Ok(()) => {
                if kind == FunctionKind::Initializer {
                    initializer_this(self)
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(Unwind::Return(value)) => {
                if kind == FunctionKind::Initializer {
                    initializer_this(self)
                } else {
                    Ok(value)
                }
            }
            Err(other) => Err(other),
        }
    }

    /// Calling a class constructs an instance: allocate it, then bind and
    /// run `init` if the class (or an ancestor) defines one.
    fn call_class(&mut self, class: HeapId, args: &[Value], paren: &Token, io: &mut Io<'_>) -> RunResult<Value> {
        let instance = self.heap.allocate(HeapData::Instance(LoxInstance {
            class,
            fields: AHashMap::new(),
        }));
        if let Some(initializer) = self.heap.find_method(class, "init") {
            let bound = self.bind_method(initializer, Value::Ref(instance));
            self.call_function(bound, args, paren, io)?;
        }
        Ok(Value::Ref(instance))
    }

    /// Binds a method to a receiver: a fresh one-slot frame holding the
    /// receiver is spliced between the method's closure and its future call
    /// frames, so `this` resolves at (depth 1, slot 0) from the body.
    fn bind_method(&mut self, method: HeapId, receiver: Value) -> HeapId {
        let (name, decl, closure, kind) = {
            let f = self.heap.function(method);
            (f.name.clone(), Rc::clone(&f.decl), f.closure, f.kind)
        };
        let frame = self.envs.push_frame(closure);
        self.envs.define(frame, receiver);
        self.heap.allocate(HeapData::Function(LoxFunction {
            name,
            decl,
            closure: Some(frame),
            kind,
        }))
    }

    /// Property read. Instances check fields first (fields shadow methods),
    /// then the class chain; classes expose their metaclass's methods
    /// (static methods); arrays expose their builtin methods. Getters are
    /// invoked on the spot.
    fn get_property(&mut self, object: &Value, name: &Token, io: &mut Io<'_>) -> RunResult<Value> {
        let Value::Ref(id) = object else {
            return Err(RuntimeError::new(name, "Only instances have properties.").into());
        };
        let method = match self.heap.get(*id) {
            HeapData::Instance(instance) => {
                if let Some(field) = instance.fields.get(&name.lexeme) {
                    return Ok(field.clone());
                }
                self.heap.find_method(instance.class, &name.lexeme)
            }
            HeapData::Class(class) => class
                .metaclass
                .and_then(|metaclass| self.heap.find_method(metaclass, &name.lexeme)),
            HeapData::Array(_) => {
                return match &*name.lexeme {
                    "get" => Ok(Value::ArrayMethod(ArrayMethod::Get, *id)),
                    "set" => Ok(Value::ArrayMethod(ArrayMethod::Set, *id)),
                    "length" => Ok(Value::ArrayMethod(ArrayMethod::Length, *id)),
                    _ => {
                        let message = format!("Undefined property '{}'.", name.lexeme);
                        Err(RuntimeError::new(name, message).into())
                    }
                };
            }
            HeapData::Function(_) => {
                return Err(RuntimeError::new(name, "Only instances have properties.").into());
            }
        };
        let Some(method) = method else {
            let message = format!("Undefined property '{}'.", name.lexeme);
            return Err(RuntimeError::new(name, message).into());
        };
        let is_getter = self.heap.function(method).kind == FunctionKind::GetMethod;
        let bound = self.bind_method(method, object.clone());
        if is_getter {
            self.call_function(bound, &[], name, io)
        } else {
            Ok(Value::Ref(bound))
        }
    }

    /// Property write. Only instances have fields; arrays reject writes
    /// after the value is evaluated (matching read-evaluate-store order),
    /// anything else rejects before.
    fn set_property(&mut self, object: &Expr, name: &Token, value: &Expr, io: &mut Io<'_>) -> RunResult<Value> {
        let object = self.evaluate(object, io)?;
        match &object {
            Value::Ref(id) => match self.heap.get(*id) {
                HeapData::Instance(_) => {
                    let value = self.evaluate(value, io)?;
                    if let HeapData::Instance(instance) = self.heap.get_mut(*id) {
                        instance.fields.insert(Rc::clone(&name.lexeme), value.clone());
                    }
                    Ok(value)
                }
                HeapData::Array(_) => {
                    self.evaluate(value, io)?;
                    Err(RuntimeError::new(name, "Can't add properties to arrays.").into())
                }
                _ => Err(RuntimeError::new(name, "Only instances have fields.").into()),
            },
            _ => Err(RuntimeError::new(name, "Only instances have fields.").into()),
        }
    }

    /// `super.m`: the superclass sits in the frame the resolver recorded
    /// (slot 0 of the `super` scope), `this` one hop nearer. The method is
    /// looked up on the superclass chain and bound to the current instance.
    fn eval_super(&mut self, keyword: &Token, method: &Token, id: NodeId, io: &mut Io<'_>) -> RunResult<Value> {
        let Some(resolution) = self.resolutions.get(id) else {
            return Err(RuntimeError::new(keyword, "Can't use 'super' outside of a class.").into());
        };
        if resolution.depth == 0 {
            return Err(RuntimeError::new(keyword, "Internal error: 'super' resolved without its scope.").into());
        }
        let env = self.local_env(keyword)?;
        let superclass = match self.envs.get_at(env, resolution.depth, 0) {
            Value::Ref(heap_id) => *heap_id,
            _ => return Err(RuntimeError::new(keyword, "Internal error: 'super' slot is not a class.").into()),
        };
        let this_value = self.envs.get_at(env, resolution.depth - 1, 0).clone();

        let Some(found) = self.heap.find_method(superclass, &method.lexeme) else {
            let message = format!("Undefined property '{}'.", method.lexeme);
            return Err(RuntimeError::new(method, message).into());
        };
        let is_getter = self.heap.function(found).kind == FunctionKind::GetMethod;
        let bound = self.bind_method(found, this_value);
        if is_getter {
            self.call_function(bound, &[], method, io)
        } else {
            Ok(Value::Ref(bound))
        }
    }
}
