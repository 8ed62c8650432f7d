//! Expression nodes.
//!
//! Expressions are immutable once built and shared through [`SharedExpr`]
//! so that closures and the tail-call loop can hold on to a function body
//! without borrowing from the tree that defined it.

use std::rc::Rc;

use super::{AssignmentList, BinaryOp, ParameterList, UnaryOp};
use crate::Location;

/// Reference-counted expression handle.
pub type SharedExpr = Rc<Expr>;

/// Literal values that appear directly in source.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Undef,
    Bool(bool),
    Number(f64),
    String(Rc<str>),
}

/// An expression node with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub location: Location,
}

/// Expression kinds.
///
/// The comprehension kinds (`Lc*`) only appear inside vector literals or
/// other comprehension clauses; evaluating one produces an embedded vector
/// that the enclosing vector splices in.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    /// Variable reference.
    Lookup(Rc<str>),
    /// `expr.member`
    MemberLookup {
        expr: SharedExpr,
        member: Rc<str>,
    },
    /// `expr[index]`
    Index {
        expr: SharedExpr,
        index: SharedExpr,
    },
    Unary {
        op: UnaryOp,
        operand: SharedExpr,
    },
    Binary {
        op: BinaryOp,
        left: SharedExpr,
        right: SharedExpr,
    },
    /// `cond ? then_expr : else_expr`
    Ternary {
        cond: SharedExpr,
        then_expr: SharedExpr,
        else_expr: SharedExpr,
    },
    /// `[begin : end]` or `[begin : step : end]`
    Range {
        begin: SharedExpr,
        step: Option<SharedExpr>,
        end: SharedExpr,
    },
    /// `[a, b, ...]`
    Vector(Vec<SharedExpr>),
    /// `callee(args)`
    Call {
        callee: SharedExpr,
        args: AssignmentList,
    },
    /// `function (params) body`
    FunctionLiteral {
        params: ParameterList,
        body: SharedExpr,
    },
    /// `assert(args) body`
    Assert {
        args: AssignmentList,
        body: Option<SharedExpr>,
    },
    /// `echo(args) body`
    Echo {
        args: AssignmentList,
        body: Option<SharedExpr>,
    },
    /// `let(assignments) body`
    Let {
        assignments: AssignmentList,
        body: SharedExpr,
    },
    /// Comprehension `if (cond) then_expr else else_expr`
    LcIf {
        cond: SharedExpr,
        then_expr: SharedExpr,
        else_expr: Option<SharedExpr>,
    },
    /// Comprehension `each expr`
    LcEach(SharedExpr),
    /// Comprehension `for (assignments) body`
    LcFor {
        assignments: AssignmentList,
        body: SharedExpr,
    },
    /// Comprehension `for (init; cond; incr) body`
    LcForC {
        init: AssignmentList,
        cond: SharedExpr,
        incr: AssignmentList,
        body: SharedExpr,
    },
    /// Comprehension `let (assignments) body`
    LcLet {
        assignments: AssignmentList,
        body: SharedExpr,
    },
}

impl Expr {
    pub fn new(kind: ExprKind, location: Location) -> SharedExpr {
        Rc::new(Expr { kind, location })
    }

    fn synth(kind: ExprKind) -> SharedExpr {
        Expr::new(kind, Location::NONE)
    }

    pub fn undef() -> SharedExpr {
        Expr::synth(ExprKind::Literal(Literal::Undef))
    }

    pub fn bool(value: bool) -> SharedExpr {
        Expr::synth(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn number(value: f64) -> SharedExpr {
        Expr::synth(ExprKind::Literal(Literal::Number(value)))
    }

    pub fn string(value: impl Into<Rc<str>>) -> SharedExpr {
        Expr::synth(ExprKind::Literal(Literal::String(value.into())))
    }

    pub fn lookup(name: impl Into<Rc<str>>) -> SharedExpr {
        Expr::synth(ExprKind::Lookup(name.into()))
    }

    pub fn member(expr: SharedExpr, member: impl Into<Rc<str>>) -> SharedExpr {
        Expr::synth(ExprKind::MemberLookup {
            expr,
            member: member.into(),
        })
    }

    pub fn index(expr: SharedExpr, index: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Index { expr, index })
    }

    pub fn unary(op: UnaryOp, operand: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Unary { op, operand })
    }

    pub fn binary(op: BinaryOp, left: SharedExpr, right: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Binary { op, left, right })
    }

    pub fn ternary(cond: SharedExpr, then_expr: SharedExpr, else_expr: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Ternary {
            cond,
            then_expr,
            else_expr,
        })
    }

    pub fn range(begin: SharedExpr, step: Option<SharedExpr>, end: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Range { begin, step, end })
    }

    pub fn vector(elements: Vec<SharedExpr>) -> SharedExpr {
        Expr::synth(ExprKind::Vector(elements))
    }

    pub fn call(callee: SharedExpr, args: AssignmentList) -> SharedExpr {
        Expr::synth(ExprKind::Call { callee, args })
    }

    /// Call of a function resolved by name.
    pub fn call_named(name: impl Into<Rc<str>>, args: AssignmentList) -> SharedExpr {
        Expr::call(Expr::lookup(name), args)
    }

    pub fn function(params: impl Into<ParameterList>, body: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::FunctionLiteral {
            params: params.into(),
            body,
        })
    }

    pub fn assert(args: AssignmentList, body: Option<SharedExpr>) -> SharedExpr {
        Expr::synth(ExprKind::Assert { args, body })
    }

    pub fn echo(args: AssignmentList, body: Option<SharedExpr>) -> SharedExpr {
        Expr::synth(ExprKind::Echo { args, body })
    }

    pub fn let_in(assignments: AssignmentList, body: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::Let { assignments, body })
    }

    pub fn lc_if(cond: SharedExpr, then_expr: SharedExpr, else_expr: Option<SharedExpr>) -> SharedExpr {
        Expr::synth(ExprKind::LcIf {
            cond,
            then_expr,
            else_expr,
        })
    }

    pub fn lc_each(expr: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::LcEach(expr))
    }

    pub fn lc_for(assignments: AssignmentList, body: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::LcFor { assignments, body })
    }

    pub fn lc_for_c(
        init: AssignmentList,
        cond: SharedExpr,
        incr: AssignmentList,
        body: SharedExpr,
    ) -> SharedExpr {
        Expr::synth(ExprKind::LcForC {
            init,
            cond,
            incr,
            body,
        })
    }

    pub fn lc_let(assignments: AssignmentList, body: SharedExpr) -> SharedExpr {
        Expr::synth(ExprKind::LcLet { assignments, body })
    }

    /// Copy of this node placed at `location`.
    #[must_use]
    pub fn at(self: &SharedExpr, location: Location) -> SharedExpr {
        Expr::new(self.kind.clone(), location)
    }

    /// Whether the node is a constant written directly in source.
    ///
    /// Vectors and ranges count when all of their parts are literals.
    pub fn is_literal(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) => true,
            ExprKind::Vector(elements) => elements.iter().all(|e| e.is_literal()),
            ExprKind::Range { begin, step, end } => {
                begin.is_literal() && end.is_literal() && step.as_ref().map_or(true, |s| s.is_literal())
            }
            _ => false,
        }
    }

    /// Whether this is a comprehension clause.
    pub fn is_list_comprehension(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::LcIf { .. }
                | ExprKind::LcEach(_)
                | ExprKind::LcFor { .. }
                | ExprKind::LcForC { .. }
                | ExprKind::LcLet { .. }
        )
    }

    /// Name used for a call in diagnostics: the callee identifier, or the
    /// parenthesized callee expression for anonymous calls.
    pub fn call_name(callee: &Expr) -> String {
        match &callee.kind {
            ExprKind::Lookup(name) => name.to_string(),
            _ => format!("({callee})"),
        }
    }
}
