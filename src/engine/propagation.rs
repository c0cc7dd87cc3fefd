use super::Assignments;
use super::Failure;
use super::VarId;

/// The view on the domain store handed to propagators.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    assignments: &'a mut Assignments,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(assignments: &'a mut Assignments) -> Self {
        PropagationContext { assignments }
    }

    pub fn lower_bound(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).lower_bound()
    }

    pub fn upper_bound(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).upper_bound()
    }

    pub fn is_fixed(&self, variable: VarId) -> bool {
        self.assignments.domain(variable).is_fixed()
    }

    pub fn value(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).value()
    }

    pub fn contains(&self, variable: VarId, value: i64) -> bool {
        self.assignments.domain(variable).contains(value)
    }

    pub fn domain_size(&self, variable: VarId) -> i64 {
        self.assignments.domain(variable).size()
    }

    pub fn domain_values(&self, variable: VarId) -> Vec<i64> {
        self.assignments.domain(variable).iter().collect()
    }

    pub fn set_min(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        self.assignments.tighten_lower_bound(variable, value)
    }

    pub fn set_max(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        self.assignments.tighten_upper_bound(variable, value)
    }

    pub fn fix(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        self.assignments.fix(variable, value)
    }

    pub fn remove(&mut self, variable: VarId, value: i64) -> Result<bool, Failure> {
        self.assignments.remove_value(variable, value)
    }
}

/// A posted constraint. Propagation is a bound/membership filtering pass; the solver repeats the
/// pass over all active propagators until a fixpoint is reached.
pub trait Propagator {
    /// Filters the domains; returns whether any domain changed, or [`Failure`] when a domain
    /// became empty.
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure>;
}

// Domains are enumerated for function elements only below this size; beyond it the element
// result keeps its construction-time bounds until the argument is fixed.
const ELEMENT_ENUMERATION_LIMIT: i64 = 4096;

pub(crate) struct GreaterOrEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) bound: i64,
}

impl Propagator for GreaterOrEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        context.set_min(self.variable, self.bound)
    }
}

pub(crate) struct LessOrEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) bound: i64,
}

impl Propagator for LessOrEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        context.set_max(self.variable, self.bound)
    }
}

pub(crate) struct EqualConstant {
    pub(crate) variable: VarId,
    pub(crate) value: i64,
}

impl Propagator for EqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        context.fix(self.variable, self.value)
    }
}

pub(crate) struct NotEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) value: i64,
}

impl Propagator for NotEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        context.remove(self.variable, self.value)
    }
}

/// reification <-> (variable == value)
pub(crate) struct ReifiedEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) value: i64,
    pub(crate) reification: VarId,
}

impl Propagator for ReifiedEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = false;
        if context.is_fixed(self.reification) {
            if context.value(self.reification) == 1 {
                changed |= context.fix(self.variable, self.value)?;
            } else {
                changed |= context.remove(self.variable, self.value)?;
            }
        }
        if !context.contains(self.variable, self.value) {
            changed |= context.fix(self.reification, 0)?;
        } else if context.is_fixed(self.variable) {
            changed |= context.fix(self.reification, 1)?;
        }
        Ok(changed)
    }
}

/// reification <-> (variable != value)
pub(crate) struct ReifiedNotEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) value: i64,
    pub(crate) reification: VarId,
}

impl Propagator for ReifiedNotEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = false;
        if context.is_fixed(self.reification) {
            if context.value(self.reification) == 1 {
                changed |= context.remove(self.variable, self.value)?;
            } else {
                changed |= context.fix(self.variable, self.value)?;
            }
        }
        if !context.contains(self.variable, self.value) {
            changed |= context.fix(self.reification, 1)?;
        } else if context.is_fixed(self.variable) {
            changed |= context.fix(self.reification, 0)?;
        }
        Ok(changed)
    }
}

/// reification <-> (variable >= bound)
pub(crate) struct ReifiedGreaterOrEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) bound: i64,
    pub(crate) reification: VarId,
}

impl Propagator for ReifiedGreaterOrEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = false;
        if context.is_fixed(self.reification) {
            if context.value(self.reification) == 1 {
                changed |= context.set_min(self.variable, self.bound)?;
            } else {
                changed |= context.set_max(self.variable, self.bound.saturating_sub(1))?;
            }
        }
        if context.lower_bound(self.variable) >= self.bound {
            changed |= context.fix(self.reification, 1)?;
        } else if context.upper_bound(self.variable) < self.bound {
            changed |= context.fix(self.reification, 0)?;
        }
        Ok(changed)
    }
}

/// reification <-> (variable <= bound)
pub(crate) struct ReifiedLessOrEqualConstant {
    pub(crate) variable: VarId,
    pub(crate) bound: i64,
    pub(crate) reification: VarId,
}

impl Propagator for ReifiedLessOrEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = false;
        if context.is_fixed(self.reification) {
            if context.value(self.reification) == 1 {
                changed |= context.set_max(self.variable, self.bound)?;
            } else {
                changed |= context.set_min(self.variable, self.bound.saturating_add(1))?;
            }
        }
        if context.upper_bound(self.variable) <= self.bound {
            changed |= context.fix(self.reification, 1)?;
        } else if context.lower_bound(self.variable) > self.bound {
            changed |= context.fix(self.reification, 0)?;
        }
        Ok(changed)
    }
}

/// sum(variables) >= bound
pub(crate) struct SumGreaterOrEqualConstant {
    pub(crate) variables: Vec<VarId>,
    pub(crate) bound: i64,
}

impl Propagator for SumGreaterOrEqualConstant {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let upper_sum = self
            .variables
            .iter()
            .map(|&variable| context.upper_bound(variable))
            .fold(0i64, i64::saturating_add);
        if upper_sum < self.bound {
            return Err(Failure);
        }
        let mut changed = false;
        for &variable in &self.variables {
            let rest = upper_sum.saturating_sub(context.upper_bound(variable));
            changed |= context.set_min(variable, self.bound.saturating_sub(rest))?;
        }
        Ok(changed)
    }
}

/// result == sum(variables)
pub(crate) struct SumEqual {
    pub(crate) variables: Vec<VarId>,
    pub(crate) result: VarId,
}

impl Propagator for SumEqual {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let lower_sum = self
            .variables
            .iter()
            .map(|&variable| context.lower_bound(variable))
            .fold(0i64, i64::saturating_add);
        let upper_sum = self
            .variables
            .iter()
            .map(|&variable| context.upper_bound(variable))
            .fold(0i64, i64::saturating_add);
        let mut changed = context.set_min(self.result, lower_sum)?;
        changed |= context.set_max(self.result, upper_sum)?;
        for &variable in &self.variables {
            let other_lower = lower_sum.saturating_sub(context.lower_bound(variable));
            let other_upper = upper_sum.saturating_sub(context.upper_bound(variable));
            changed |= context.set_min(
                variable,
                context.lower_bound(self.result).saturating_sub(other_upper),
            )?;
            changed |= context.set_max(
                variable,
                context.upper_bound(self.result).saturating_sub(other_lower),
            )?;
        }
        Ok(changed)
    }
}

/// result == constant - variable
pub(crate) struct DifferenceEqual {
    pub(crate) constant: i64,
    pub(crate) variable: VarId,
    pub(crate) result: VarId,
}

impl Propagator for DifferenceEqual {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = context.set_min(
            self.result,
            self.constant
                .saturating_sub(context.upper_bound(self.variable)),
        )?;
        changed |= context.set_max(
            self.result,
            self.constant
                .saturating_sub(context.lower_bound(self.variable)),
        )?;
        changed |= context.set_min(
            self.variable,
            self.constant
                .saturating_sub(context.upper_bound(self.result)),
        )?;
        changed |= context.set_max(
            self.variable,
            self.constant
                .saturating_sub(context.lower_bound(self.result)),
        )?;
        Ok(changed)
    }
}

/// result == min(variables)
pub(crate) struct MinEqual {
    pub(crate) variables: Vec<VarId>,
    pub(crate) result: VarId,
}

impl Propagator for MinEqual {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let lowest_lower = self
            .variables
            .iter()
            .map(|&variable| context.lower_bound(variable))
            .min()
            .ok_or(Failure)?;
        let lowest_upper = self
            .variables
            .iter()
            .map(|&variable| context.upper_bound(variable))
            .min()
            .ok_or(Failure)?;
        let mut changed = context.set_min(self.result, lowest_lower)?;
        changed |= context.set_max(self.result, lowest_upper)?;
        for &variable in &self.variables {
            changed |= context.set_min(variable, context.lower_bound(self.result))?;
        }
        // If a single variable can still reach the minimum it has to provide it.
        let result_upper = context.upper_bound(self.result);
        let reachable = self
            .variables
            .iter()
            .filter(|&&variable| context.lower_bound(variable) <= result_upper)
            .collect::<Vec<_>>();
        if reachable.len() == 1 {
            changed |= context.set_max(*reachable[0], result_upper)?;
        }
        Ok(changed)
    }
}

/// result == max(variables)
pub(crate) struct MaxEqual {
    pub(crate) variables: Vec<VarId>,
    pub(crate) result: VarId,
}

impl Propagator for MaxEqual {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let highest_lower = self
            .variables
            .iter()
            .map(|&variable| context.lower_bound(variable))
            .max()
            .ok_or(Failure)?;
        let highest_upper = self
            .variables
            .iter()
            .map(|&variable| context.upper_bound(variable))
            .max()
            .ok_or(Failure)?;
        let mut changed = context.set_min(self.result, highest_lower)?;
        changed |= context.set_max(self.result, highest_upper)?;
        for &variable in &self.variables {
            changed |= context.set_max(variable, context.upper_bound(self.result))?;
        }
        let result_lower = context.lower_bound(self.result);
        let reachable = self
            .variables
            .iter()
            .filter(|&&variable| context.upper_bound(variable) >= result_lower)
            .collect::<Vec<_>>();
        if reachable.len() == 1 {
            changed |= context.set_min(*reachable[0], result_lower)?;
        }
        Ok(changed)
    }
}

/// left >= right
pub(crate) struct GreaterOrEqualVar {
    pub(crate) left: VarId,
    pub(crate) right: VarId,
}

impl Propagator for GreaterOrEqualVar {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = context.set_min(self.left, context.lower_bound(self.right))?;
        changed |= context.set_max(self.right, context.upper_bound(self.left))?;
        Ok(changed)
    }
}

/// left <= right
pub(crate) struct LessOrEqualVar {
    pub(crate) left: VarId,
    pub(crate) right: VarId,
}

impl Propagator for LessOrEqualVar {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        let mut changed = context.set_max(self.left, context.upper_bound(self.right))?;
        changed |= context.set_min(self.right, context.lower_bound(self.left))?;
        Ok(changed)
    }
}

/// result == evaluator(variable)
pub(crate) struct FunctionElement {
    pub(crate) evaluator: Box<dyn Fn(i64) -> i64>,
    pub(crate) variable: VarId,
    pub(crate) result: VarId,
}

impl Propagator for FunctionElement {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        if context.is_fixed(self.variable) {
            let image = (self.evaluator)(context.value(self.variable));
            return context.fix(self.result, image);
        }
        if context.domain_size(self.variable) > ELEMENT_ENUMERATION_LIMIT {
            return Ok(false);
        }
        let mut lowest = i64::MAX;
        let mut highest = i64::MIN;
        for value in context.domain_values(self.variable) {
            let image = (self.evaluator)(value);
            lowest = lowest.min(image);
            highest = highest.max(image);
        }
        let mut changed = context.set_min(self.result, lowest)?;
        changed |= context.set_max(self.result, highest)?;
        Ok(changed)
    }
}

/// result == evaluator(variable, second)
pub(crate) struct FunctionElementBinary {
    pub(crate) evaluator: Box<dyn Fn(i64, i64) -> i64>,
    pub(crate) variable: VarId,
    pub(crate) second: VarId,
    pub(crate) result: VarId,
}

impl Propagator for FunctionElementBinary {
    fn propagate(&mut self, context: &mut PropagationContext<'_>) -> Result<bool, Failure> {
        if context.is_fixed(self.variable) && context.is_fixed(self.second) {
            let image = (self.evaluator)(context.value(self.variable), context.value(self.second));
            return context.fix(self.result, image);
        }
        let product = context
            .domain_size(self.variable)
            .saturating_mul(context.domain_size(self.second));
        if product > ELEMENT_ENUMERATION_LIMIT {
            return Ok(false);
        }
        let mut lowest = i64::MAX;
        let mut highest = i64::MIN;
        for value in context.domain_values(self.variable) {
            for second_value in context.domain_values(self.second) {
                let image = (self.evaluator)(value, second_value);
                lowest = lowest.min(image);
                highest = highest.max(image);
            }
        }
        let mut changed = context.set_min(self.result, lowest)?;
        changed |= context.set_max(self.result, highest)?;
        Ok(changed)
    }
}
