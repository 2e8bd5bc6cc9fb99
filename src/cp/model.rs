//! Boolean constraint model.
//!
//! Every constraint is a cardinality constraint over literals
//! (`Σ lᵢ ≤ k`, `≥ k`, or `= k`), optionally enforced only when a
//! conjunction of enforcement literals holds. The objective, when present,
//! minimizes the number of true literals in a list.

use std::fmt;
use std::ops::Not;

/// A boolean decision or auxiliary variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVar(usize);

impl BoolVar {
    /// Index into the model's variable table.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// The literal "this variable is true".
    #[inline]
    pub fn lit(self) -> Literal {
        Literal {
            var: self,
            negated: false,
        }
    }
}

impl Not for BoolVar {
    type Output = Literal;

    fn not(self) -> Literal {
        !self.lit()
    }
}

/// A variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    var: BoolVar,
    negated: bool,
}

impl Literal {
    /// Underlying variable.
    #[inline]
    pub fn var(self) -> BoolVar {
        self.var
    }

    /// Whether this literal is the negation of its variable.
    #[inline]
    pub fn is_negated(self) -> bool {
        self.negated
    }

    /// Truth value under a complete assignment.
    #[inline]
    pub fn eval(self, values: &[bool]) -> bool {
        values[self.var.0] != self.negated
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            var: self.var,
            negated: !self.negated,
        }
    }
}

impl From<BoolVar> for Literal {
    fn from(var: BoolVar) -> Self {
        var.lit()
    }
}

/// Relation between the count of true terms and the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    AtMost,
    AtLeast,
    Equal,
}

/// `Σ terms (≤ | ≥ | =) bound`, active when every enforcement literal holds.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Unit-weight terms.
    pub terms: Vec<Literal>,
    /// Comparison against the bound.
    pub comparison: Comparison,
    /// Right-hand side.
    pub bound: usize,
    /// Conjunction that activates the constraint. Empty = always active.
    pub enforcement: Vec<Literal>,
    /// Diagnostic label.
    pub label: String,
}

impl LinearConstraint {
    fn new(terms: Vec<Literal>, comparison: Comparison, bound: usize) -> Self {
        Self {
            terms,
            comparison,
            bound,
            enforcement: Vec::new(),
            label: String::new(),
        }
    }

    /// `Σ terms ≤ bound`.
    pub fn at_most(terms: Vec<Literal>, bound: usize) -> Self {
        Self::new(terms, Comparison::AtMost, bound)
    }

    /// `Σ terms ≥ bound`.
    pub fn at_least(terms: Vec<Literal>, bound: usize) -> Self {
        Self::new(terms, Comparison::AtLeast, bound)
    }

    /// `Σ terms = bound`.
    pub fn equal(terms: Vec<Literal>, bound: usize) -> Self {
        Self::new(terms, Comparison::Equal, bound)
    }

    /// Activates the constraint only when all `literals` hold.
    pub fn only_enforce_if(mut self, literals: Vec<Literal>) -> Self {
        self.enforcement = literals;
        self
    }

    /// Sets the diagnostic label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether the constraint holds under a complete assignment.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        if !self.enforcement.iter().all(|l| l.eval(values)) {
            return true;
        }
        let count = self.terms.iter().filter(|l| l.eval(values)).count();
        match self.comparison {
            Comparison::AtMost => count <= self.bound,
            Comparison::AtLeast => count >= self.bound,
            Comparison::Equal => count == self.bound,
        }
    }
}

impl fmt::Display for LinearConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::AtMost => "<=",
            Comparison::AtLeast => ">=",
            Comparison::Equal => "==",
        };
        let label = if self.label.is_empty() {
            "constraint"
        } else {
            self.label.as_str()
        };
        write!(f, "{label}: {} terms {op} {}", self.terms.len(), self.bound)
    }
}

/// A boolean model: variables, constraints, and an optional objective.
#[derive(Debug, Clone, Default)]
pub struct BoolModel {
    name: String,
    var_names: Vec<String>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<Literal>,
}

impl BoolModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a new variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.var_names.push(name.into());
        BoolVar(self.var_names.len() - 1)
    }

    /// Adds a constraint.
    pub fn add(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Adds `a + b ≤ 1` (not both).
    pub fn add_not_both(&mut self, a: Literal, b: Literal, label: impl Into<String>) {
        self.add(LinearConstraint::at_most(vec![a, b], 1).with_label(label));
    }

    /// Creates `y = OR(literals)` and returns `y`.
    ///
    /// Encoded as `lᵢ ⇒ y` for every term and `y ⇒ Σ lᵢ ≥ 1`.
    pub fn add_or(&mut self, name: impl Into<String>, literals: &[Literal]) -> BoolVar {
        let name = name.into();
        let y = self.new_bool_var(name.clone());
        for &l in literals {
            self.add(LinearConstraint::at_most(vec![l, !y], 1).with_label(format!("{name}>=")));
        }
        let mut clause = Vec::with_capacity(literals.len() + 1);
        clause.push(!y);
        clause.extend_from_slice(literals);
        self.add(LinearConstraint::at_least(clause, 1).with_label(format!("{name}<=")));
        y
    }

    /// Adds literals to the minimization objective.
    pub fn minimize(&mut self, literals: impl IntoIterator<Item = Literal>) {
        self.objective.extend(literals);
    }

    /// Variable name.
    pub fn var_name(&self, var: BoolVar) -> &str {
        &self.var_names[var.0]
    }

    /// All constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective literals (empty = pure satisfaction).
    pub fn objective(&self) -> &[Literal] {
        &self.objective
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value under a complete assignment.
    pub fn objective_value(&self, values: &[bool]) -> usize {
        self.objective.iter().filter(|l| l.eval(values)).count()
    }

    /// Indices of constraints violated by a complete assignment.
    pub fn violated(&self, values: &[bool]) -> Vec<usize> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_satisfied(values))
            .map(|(i, _)| i)
            .collect()
    }
}
