use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::{LoxError, Result};
use crate::token::{Token, TokenType};
use crate::value::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction, Value};

/// How a statement finished. `Return` unwinds enclosing blocks until the
/// function call that is running them turns it back into a value.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Return(Value),
}

/// Tree‑walking evaluator.
///
/// Holds the global frame, the frame currently in effect, and the binding
/// distances recorded by the resolver. Globals persist across calls to
/// [`Interpreter::interpret`], which is what an interactive session needs.
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<ExprId, usize>,
    out: Box<dyn Write>,
}

fn clock(_args: &[Value]) -> std::result::Result<Value, String> {
    debug!("Calling native function 'clock'");

    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| format!("Clock error: {}", e))?
        .as_secs_f64();

    Ok(Value::Number(timestamp))
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to stdout, with `clock` defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter printing to `out`.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Called by the resolver: the expression `id` refers to a binding
    /// `depth` frames out from where it is evaluated.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Add a host function to the global scope.
    pub fn define_native(
        &mut self,
        name: &'static str,
        arity: usize,
        func: crate::value::NativeFn,
    ) {
        self.globals.borrow_mut().define(
            name,
            Value::Callable(Callable::Native(Rc::new(NativeFunction { name, arity, func }))),
        );
    }

    /// Run a program, stopping at the first runtime error. Output from
    /// statements that already ran stays emitted.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                self.out.flush()?;
                return Err(e);
            }
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
                Ok(Flow::Normal)
            }

            Stmt::Block(statements) => {
                let frame = Environment::child_of(&self.environment);
                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);
                let function = LoxFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment.borrow_mut().define(
                    &declaration.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                Ok(Flow::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.declare_class(name, superclass.as_ref(), methods),
        }
    }

    /// Run `statements` with `frame` as the current environment, restoring
    /// the previous one however the block ends.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        frame: Rc<RefCell<Environment>>,
    ) -> Result<Flow> {
        let previous = std::mem::replace(&mut self.environment, frame);

        let mut outcome: Result<Flow> = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;
        outcome
    }

    fn declare_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<Flow> {
        debug!("Declaring class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    let token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        // Bound first so methods can refer to their own class.
        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let method_env = match &superclass {
            Some(superclass) => {
                let frame = Environment::child_of(&self.environment);
                frame.borrow_mut().define(
                    "super",
                    Value::Callable(Callable::Class(Rc::clone(superclass))),
                );
                frame
            }
            None => Rc::clone(&self.environment),
        };

        let methods: HashMap<String, Rc<LoxFunction>> = methods
            .iter()
            .map(|method| {
                let function = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&method_env),
                    method.name.lexeme == "init",
                );
                (method.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Callable(Callable::Class(Rc::new(class))))?;

        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────

    /// Evaluate an expression in the current environment.
    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let short_circuits = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    args.push(self.evaluate(arg)?);
                }

                match callee {
                    Value::Callable(callable) => self.call(&callable, args, paren),
                    _ => Err(LoxError::runtime(
                        paren,
                        "Can only call functions and classes.",
                    )),
                }
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.super_method(*id, keyword, method),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// `super.method`: search from the superclass recorded where the method
    /// was declared, then bind the result to the current `this`, which sits
    /// one frame inside the `super` frame.
    fn super_method(&self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = self
            .locals
            .get(&id)
            .copied()
            .ok_or_else(|| LoxError::runtime(keyword, "Unresolved 'super'."))?;

        let Value::Callable(Callable::Class(superclass)) =
            Environment::get_at(&self.environment, distance, keyword)?
        else {
            return Err(LoxError::runtime(keyword, "Superclass must be a class."));
        };

        let this_token = Token::synthetic(TokenType::THIS, "this", keyword.line);
        let Value::Instance(instance) =
            Environment::get_at(&self.environment, distance.saturating_sub(1), &this_token)?
        else {
            return Err(LoxError::runtime(keyword, "Can't use 'super' without 'this'."));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Callable(Callable::Function(Rc::new(
                found.bind(instance),
            )))),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Calls
    // ─────────────────────────────────────────────────────────────────────

    fn call(&mut self, callable: &Callable, args: Vec<Value>, paren: &Token) -> Result<Value> {
        let arity = callable.arity();
        if args.len() != arity {
            return Err(LoxError::runtime(
                paren,
                format!("Expected {} arguments but got {}.", arity, args.len()),
            ));
        }

        match callable {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&args).map_err(|message| LoxError::runtime(paren, message))
            }

            Callable::Function(function) => self.call_function(function, args),

            Callable::Class(class) => {
                debug!("Instantiating class '{}'", class.name);
                let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(class))));

                if let Some(init) = class.find_method("init") {
                    self.call_function(&init.bind(Rc::clone(&instance)), args)?;
                }

                Ok(Value::Instance(instance))
            }
        }
    }

    fn call_function(&mut self, function: &LoxFunction, args: Vec<Value>) -> Result<Value> {
        debug!("Calling user-defined function '{}'", function.name());

        let frame = Environment::child_of(&function.closure);
        {
            let mut frame = frame.borrow_mut();
            for (param, arg) in function.declaration.params.iter().zip(args) {
                frame.define(&param.lexeme, arg);
            }
        }

        let flow = self.execute_block(&function.declaration.body, frame)?;

        if function.is_initializer {
            let this_token = Token::synthetic(TokenType::THIS, "this", function.declaration.name.line);
            return Environment::get_at(&function.closure, 0, &this_token);
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        })
    }
}

/// Apply a binary operator to two already evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    use Value::{Number, String as Str};

    match (&operator.token_type, left, right) {
        (TokenType::EQUAL_EQUAL, l, r) => Ok(Value::Bool(l == r)),
        (TokenType::BANG_EQUAL, l, r) => Ok(Value::Bool(l != r)),

        (TokenType::PLUS, Number(a), Number(b)) => Ok(Number(a + b)),
        (TokenType::PLUS, Str(a), Str(b)) => Ok(Str(a + &b)),
        (TokenType::PLUS, _, _) => Err(LoxError::runtime(
            operator,
            "Operands must be two numbers or two strings.",
        )),

        (TokenType::MINUS, Number(a), Number(b)) => Ok(Number(a - b)),
        (TokenType::STAR, Number(a), Number(b)) => Ok(Number(a * b)),
        (TokenType::SLASH, Number(a), Number(b)) => Ok(Number(a / b)),
        (TokenType::GREATER, Number(a), Number(b)) => Ok(Value::Bool(a > b)),
        (TokenType::GREATER_EQUAL, Number(a), Number(b)) => Ok(Value::Bool(a >= b)),
        (TokenType::LESS, Number(a), Number(b)) => Ok(Value::Bool(a < b)),
        (TokenType::LESS_EQUAL, Number(a), Number(b)) => Ok(Value::Bool(a <= b)),

        (
            TokenType::MINUS
            | TokenType::STAR
            | TokenType::SLASH
            | TokenType::GREATER
            | TokenType::GREATER_EQUAL
            | TokenType::LESS
            | TokenType::LESS_EQUAL,
            _,
            _,
        ) => Err(LoxError::runtime(operator, "Operands must be numbers.")),

        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}
