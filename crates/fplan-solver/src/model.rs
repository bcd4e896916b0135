// Backend-agnostic integer program: variables in a dense arena, linear
// constraints, and a maximization objective.

use std::fmt;

/// Dense index of a variable inside a `Model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Binary,
    Integer,
    Continuous,
}

#[derive(Debug, Clone)]
pub struct VarDef {
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    /// `None` means unbounded above.
    pub upper: Option<f64>,
}

// ---------------------------------------------------------------------------
// Linear expressions
// ---------------------------------------------------------------------------

/// `Σ coef·var + constant`. Terms may repeat a variable; backends and
/// `evaluate` treat repeated terms additively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            terms: Vec::with_capacity(n),
            constant: 0.0,
        }
    }

    pub fn var(v: VarId) -> Self {
        Self {
            terms: vec![(v, 1.0)],
            constant: 0.0,
        }
    }

    /// Sum of the given variables, each with coefficient 1.
    pub fn sum<I: IntoIterator<Item = VarId>>(vars: I) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    pub fn term(mut self, coef: f64, v: VarId) -> Self {
        self.add_term(coef, v);
        self
    }

    pub fn add_term(&mut self, coef: f64, v: VarId) {
        if coef != 0.0 {
            self.terms.push((v, coef));
        }
    }

    pub fn add_expr(&mut self, other: &LinearExpr) {
        self.terms.extend_from_slice(&other.terms);
        self.constant += other.constant;
    }

    pub fn scaled(&self, k: f64) -> LinearExpr {
        LinearExpr {
            terms: self.terms.iter().map(|&(v, c)| (v, c * k)).collect(),
            constant: self.constant * k,
        }
    }

    /// Value of the expression under a full assignment indexed by `VarId`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|&(v, c)| c * values[v.index()])
                .sum::<f64>()
    }

    pub fn leq(self, rhs: f64) -> ConstraintBody {
        ConstraintBody::new(self, Sense::Le, rhs)
    }

    pub fn geq(self, rhs: f64) -> ConstraintBody {
        ConstraintBody::new(self, Sense::Ge, rhs)
    }

    pub fn equals(self, rhs: f64) -> ConstraintBody {
        ConstraintBody::new(self, Sense::Eq, rhs)
    }
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "==",
        })
    }
}

/// `expr (sense) rhs`, with the expression's constant folded into `rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintBody {
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl ConstraintBody {
    fn new(mut expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        let rhs = rhs - expr.constant;
        expr.constant = 0.0;
        Self { expr, sense, rhs }
    }

    /// Whether the assignment satisfies this constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tol,
            Sense::Ge => lhs >= self.rhs - tol,
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Constraint {
    pub name: String,
    pub body: ConstraintBody,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A maximization problem. Each solve builds its own `Model`; nothing here is
/// shared between solves.
#[derive(Debug, Clone, Default)]
pub struct Model {
    vars: Vec<VarDef>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_var(&mut self, name: String, kind: VarKind, lower: f64, upper: Option<f64>) -> VarId {
        let id = VarId(self.vars.len());
        self.vars.push(VarDef {
            name,
            kind,
            lower,
            upper,
        });
        id
    }

    pub fn add_binary(&mut self, name: String) -> VarId {
        self.add_var(name, VarKind::Binary, 0.0, Some(1.0))
    }

    pub fn add_integer(&mut self, name: String, lower: f64, upper: Option<f64>) -> VarId {
        self.add_var(name, VarKind::Integer, lower, upper)
    }

    pub fn add_continuous(&mut self, name: String, lower: f64, upper: Option<f64>) -> VarId {
        self.add_var(name, VarKind::Continuous, lower, upper)
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, body: ConstraintBody) {
        self.constraints.push(Constraint {
            name: name.into(),
            body,
        });
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn vars(&self) -> &[VarDef] {
        &self.vars
    }

    pub fn var(&self, id: VarId) -> &VarDef {
        &self.vars[id.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Names of constraints violated by `values`, for diagnosing backends.
    pub fn violated_constraints(&self, values: &[f64], tol: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.body.is_satisfied(values, tol))
            .map(|c| c.name.as_str())
            .collect()
    }
}
