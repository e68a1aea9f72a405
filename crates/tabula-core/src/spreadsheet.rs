//! The cell store

use std::collections::{BTreeMap, BTreeSet};

use tabula_formula::{DependencyGraph, Expression};

use crate::cell::{Cell, CellContent, CellName, CellValue, NameValidator};
use crate::error::Result;
use crate::recalc;

/// A sheet of named cells
///
/// Every edit goes through [`Spreadsheet::set_content`], which keeps the
/// dependency graph in step with the stored formulas, refuses edits that
/// would create a circular reference, and recomputes every affected value
/// before returning.
///
/// # Example
/// ```rust
/// use tabula_core::{CellValue, EvaluationError, Spreadsheet};
///
/// let mut sheet = Spreadsheet::new();
/// sheet.set_content("A1", "=B1 + 1").unwrap();
/// assert!(sheet.value("A1").unwrap().is_error());
///
/// sheet.set_content("B1", "41").unwrap();
/// assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(42.0));
///
/// assert!(sheet.set_content("B1", "=A1").is_err());
/// assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(41.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Spreadsheet {
    /// Non-empty cells by name
    cells: BTreeMap<CellName, Cell>,
    /// (s, t) means t's formula references s
    graph: DependencyGraph,
    validator: NameValidator,
    changed: bool,
}

impl Spreadsheet {
    /// Create an empty spreadsheet that accepts every well-formed name
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty spreadsheet with an extra rule for cell names
    pub fn with_validator(validator: NameValidator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// The rule cell names must satisfy
    pub fn validator(&self) -> &NameValidator {
        &self.validator
    }

    /// Whether the sheet has been edited since it was created, loaded or saved
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Record that the current state has been persisted
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// Set a cell's content from raw text
    ///
    /// The text is classified as:
    /// - `""`: empty, removing the cell
    /// - a finite number (surrounding whitespace ignored): a number
    /// - a leading `=`: a formula over cell names
    /// - anything else: text, stored verbatim
    ///
    /// Returns the edited cell together with every cell whose value depends on
    /// it, directly or indirectly. Each of them has been recomputed.
    ///
    /// Fails without modifying the sheet if the name is invalid, the formula is
    /// malformed, or the formula would create a circular reference. Formulas
    /// that cannot be evaluated are committed with a [`CellValue::Error`] value.
    pub fn set_content(&mut self, name: &str, text: &str) -> Result<BTreeSet<CellName>> {
        let name = self.normalize_name(name)?;
        let content = self.classify(text)?;

        let order = match &content {
            CellContent::Formula(expr) => {
                // Only the edited cell's incoming edges change
                let previous = self.graph.dependees(name.as_str());
                self.graph.replace_dependees(name.as_str(), expr.variables());
                match recalc::cells_to_recalculate(&self.graph, name.as_str()) {
                    Ok(order) => order,
                    Err(e) => {
                        log::warn!("Rejected formula for {}: {}", name, e);
                        self.graph.replace_dependees(name.as_str(), &previous);
                        return Err(e);
                    }
                }
            }
            _ => {
                self.graph
                    .replace_dependees(name.as_str(), std::iter::empty::<&str>());
                recalc::cells_to_recalculate(&self.graph, name.as_str())?
            }
        };

        log::debug!(
            "Set {} to {} content, {} cell(s) affected",
            name,
            content.type_name(),
            order.len()
        );

        if content.is_empty() {
            self.cells.remove(&name);
        } else {
            match self.cells.get_mut(&name) {
                Some(cell) => cell.content = content,
                None => {
                    self.cells
                        .insert(name.clone(), Cell::new(name.clone(), content));
                }
            }
        }

        let mut affected = BTreeSet::new();
        for cell in order {
            let cell = CellName::new_unchecked(cell);
            self.recompute(&cell);
            affected.insert(cell);
        }

        self.changed = true;
        Ok(affected)
    }

    /// A cell's content (`Empty` if the cell does not exist)
    pub fn content(&self, name: &str) -> Result<CellContent> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.content.clone())
            .unwrap_or_default())
    }

    /// A cell's value (empty text if the cell does not exist)
    pub fn value(&self, name: &str) -> Result<CellValue> {
        let name = self.normalize_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value.clone())
            .unwrap_or_default())
    }

    /// A stored cell
    pub fn cell(&self, name: &str) -> Result<Option<&Cell>> {
        let name = self.normalize_name(name)?;
        Ok(self.cells.get(&name))
    }

    /// Names of all non-empty cells, sorted
    pub fn nonempty_cell_names(&self) -> Vec<CellName> {
        self.cells.keys().cloned().collect()
    }

    /// All non-empty cells, in name order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the sheet has no non-empty cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells whose formulas reference `name` directly
    pub fn direct_dependents(&self, name: &str) -> Result<BTreeSet<CellName>> {
        let name = self.normalize_name(name)?;
        Ok(self
            .graph
            .iter_dependents(name.as_str())
            .map(|d| CellName::new_unchecked(d.to_string()))
            .collect())
    }

    fn normalize_name(&self, name: &str) -> Result<CellName> {
        CellName::parse_with(name, &self.validator)
    }

    fn classify(&self, text: &str) -> Result<CellContent> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }
        if let Ok(n) = text.trim().parse::<f64>() {
            if n.is_finite() {
                return Ok(CellContent::Number(n));
            }
        }
        if let Some(formula) = text.strip_prefix('=') {
            let expr = Expression::parse_with(
                formula,
                |s| s.to_ascii_uppercase(),
                |s| CellName::is_well_formed(s) && self.validator.is_valid(s),
            )?;
            return Ok(CellContent::Formula(expr));
        }
        Ok(CellContent::Text(text.to_string()))
    }

    fn recompute(&mut self, name: &CellName) {
        let value = match self.cells.get(name) {
            Some(cell) => self.evaluate(&cell.content),
            None => return,
        };
        log::trace!("Recomputed {} = {:?}", name, value);
        if let Some(cell) = self.cells.get_mut(name) {
            cell.value = value;
        }
    }

    fn evaluate(&self, content: &CellContent) -> CellValue {
        match content {
            CellContent::Empty => CellValue::empty(),
            CellContent::Text(s) => CellValue::Text(s.clone()),
            CellContent::Number(n) => CellValue::Number(*n),
            CellContent::Formula(expr) => {
                let lookup = |var: &str| self.cells.get(var).and_then(|cell| cell.value.as_number());
                match expr.evaluate(lookup) {
                    Ok(n) => CellValue::Number(n),
                    Err(e) => CellValue::Error(e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use tabula_formula::{EvaluationError, FormulaError};

    fn names(items: &[&str]) -> BTreeSet<CellName> {
        items.iter().map(|s| CellName::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_new_sheet() {
        let sheet = Spreadsheet::new();
        assert!(!sheet.changed());
        assert!(sheet.is_empty());
        assert!(sheet.nonempty_cell_names().is_empty());
        assert_eq!(sheet.content("A1").unwrap(), CellContent::Empty);
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Text(String::new()));
    }

    #[test]
    fn test_classification() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "  3.5 ").unwrap();
        sheet.set_content("A2", "hello").unwrap();
        sheet.set_content("A3", "=a1*2").unwrap();
        sheet.set_content("A4", "1e3").unwrap();
        sheet.set_content("A5", "inf").unwrap();
        sheet.set_content("A6", " ").unwrap();

        assert_eq!(sheet.content("A1").unwrap(), CellContent::Number(3.5));
        assert_eq!(sheet.content("A2").unwrap(), CellContent::Text("hello".into()));
        assert_eq!(sheet.content("A3").unwrap().to_string(), "=A1 * 2");
        assert_eq!(sheet.content("A4").unwrap(), CellContent::Number(1000.0));
        assert_eq!(sheet.content("A5").unwrap(), CellContent::Text("inf".into()));
        assert_eq!(sheet.content("A6").unwrap(), CellContent::Text(" ".into()));

        assert_eq!(sheet.value("A3").unwrap(), CellValue::Number(7.0));
        assert_eq!(sheet.value("A2").unwrap(), CellValue::Text("hello".into()));
    }

    #[test]
    fn test_recalculation_closure() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "1").unwrap();
        sheet.set_content("B1", "=A1*2").unwrap();
        sheet.set_content("C1", "=B1+A1").unwrap();

        let affected = sheet.set_content("A1", "2").unwrap();
        assert_eq!(affected, names(&["A1", "B1", "C1"]));
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(4.0));
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(6.0));

        let affected = sheet.set_content("C1", "=B1*2").unwrap();
        assert_eq!(affected, names(&["C1"]));
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(8.0));
    }

    #[test]
    fn test_cycle_is_rolled_back() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "=B1").unwrap();
        sheet.set_content("B1", "=C1").unwrap();
        sheet.set_content("C1", "5").unwrap();
        sheet.mark_saved();

        let err = sheet.set_content("C1", "=A1").unwrap_err();
        assert!(matches!(err, Error::CircularReference(_)));

        assert!(!sheet.changed());
        assert_eq!(sheet.content("C1").unwrap(), CellContent::Number(5.0));
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(5.0));
        assert!(sheet.direct_dependents("A1").unwrap().is_empty());

        // The graph still works after the rollback
        sheet.set_content("C1", "6").unwrap();
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(6.0));
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut sheet = Spreadsheet::new();
        assert_eq!(
            sheet.set_content("A1", "=a1 + 1"),
            Err(Error::CircularReference("A1".into()))
        );
        assert!(sheet.is_empty());
        assert!(!sheet.changed());
    }

    #[test]
    fn test_division_by_zero_is_a_value() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "0").unwrap();
        sheet.set_content("B1", "=10 / A1").unwrap();
        assert_eq!(
            sheet.value("B1").unwrap(),
            CellValue::Error(EvaluationError::DivisionByZero)
        );

        sheet.set_content("A1", "4").unwrap();
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(2.5));
    }

    #[test]
    fn test_text_and_missing_references_are_errors() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "abc").unwrap();
        sheet.set_content("B1", "=A1 + C1").unwrap();
        assert_eq!(
            sheet.value("B1").unwrap(),
            CellValue::Error(EvaluationError::UndefinedVariable("A1".into()))
        );

        sheet.set_content("A1", "1").unwrap();
        assert_eq!(
            sheet.value("B1").unwrap(),
            CellValue::Error(EvaluationError::UndefinedVariable("C1".into()))
        );

        // Errors propagate as undefined references
        sheet.set_content("C1", "=1/0").unwrap();
        assert_eq!(
            sheet.value("B1").unwrap(),
            CellValue::Error(EvaluationError::UndefinedVariable("C1".into()))
        );
    }

    #[test]
    fn test_name_normalization() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("a1", "5").unwrap();
        assert_eq!(sheet.content("A1").unwrap(), CellContent::Number(5.0));
        sheet.set_content("B1", "7").unwrap();
        assert_eq!(sheet.value("b1").unwrap(), CellValue::Number(7.0));
        let listed: Vec<String> = sheet
            .nonempty_cell_names()
            .into_iter()
            .map(CellName::into_string)
            .collect();
        assert_eq!(listed, vec!["A1", "B1"]);
    }

    #[test]
    fn test_invalid_names() {
        let mut sheet = Spreadsheet::new();
        assert_eq!(sheet.set_content("1A", "5"), Err(Error::InvalidName("1A".into())));
        assert_eq!(sheet.content("A0"), Err(Error::InvalidName("A0".into())));
        assert_eq!(sheet.value(""), Err(Error::InvalidName(String::new())));
        assert!(sheet.direct_dependents("x").is_err());
        assert!(!sheet.changed());
    }

    #[test]
    fn test_validator_applies_to_cells_and_formulas() {
        let validator = NameValidator::pattern_from_str("^[A-B][0-9]+$").unwrap();
        let mut sheet = Spreadsheet::with_validator(validator);

        sheet.set_content("a1", "1").unwrap();
        assert_eq!(sheet.set_content("C1", "1"), Err(Error::InvalidName("C1".into())));
        assert_eq!(
            sheet.set_content("B1", "=A1 + c1"),
            Err(Error::FormulaParse(FormulaError::RejectedVariable("C1".into())))
        );
        assert_eq!(
            sheet.set_content("B1", "=A1 + x"),
            Err(Error::FormulaParse(FormulaError::RejectedVariable("X".into())))
        );
        assert_eq!(sheet.content("B1").unwrap(), CellContent::Empty);
    }

    #[test]
    fn test_malformed_formula_leaves_cell() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "=2").unwrap();
        assert!(matches!(sheet.set_content("A1", "=2 +"), Err(Error::FormulaParse(_))));
        assert!(matches!(sheet.set_content("A1", "="), Err(Error::FormulaParse(FormulaError::Empty))));
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(2.0));
    }

    #[test]
    fn test_empty_content_removes_cell() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "5").unwrap();
        sheet.set_content("B1", "=A1").unwrap();

        let affected = sheet.set_content("A1", "").unwrap();
        assert_eq!(affected, names(&["A1", "B1"]));
        assert_eq!(sheet.nonempty_cell_names(), vec![CellName::parse("B1").unwrap()]);
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Text(String::new()));
        assert!(sheet.value("B1").unwrap().is_error());

        // The edge from A1 to B1 survives the removal
        assert_eq!(sheet.direct_dependents("A1").unwrap(), names(&["B1"]));
    }

    #[test]
    fn test_replacing_formula_drops_old_edges() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("C1", "=A1 + B1").unwrap();
        sheet.set_content("C1", "=B1").unwrap();
        assert!(sheet.direct_dependents("A1").unwrap().is_empty());
        assert_eq!(sheet.direct_dependents("B1").unwrap(), names(&["C1"]));

        sheet.set_content("C1", "text").unwrap();
        assert!(sheet.direct_dependents("B1").unwrap().is_empty());
    }

    #[test]
    fn test_repeated_edits_are_deterministic() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "3").unwrap();
        let first = sheet.set_content("B1", "=A1 * A1").unwrap();
        let value = sheet.value("B1").unwrap();
        let second = sheet.set_content("B1", "=A1 * A1").unwrap();
        assert_eq!(first, second);
        assert_eq!(sheet.value("B1").unwrap(), value);
    }

    #[test]
    fn test_changed_lifecycle() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "1").unwrap();
        assert!(sheet.changed());
        sheet.mark_saved();
        assert!(!sheet.changed());
        let _ = sheet.set_content("A1", "=A1");
        assert!(!sheet.changed());
        sheet.set_content("A1", "").unwrap();
        assert!(sheet.changed());
    }

    #[test]
    fn test_long_running_total_column() {
        let n = 50_000;
        let mut sheet = Spreadsheet::new();
        for i in (1..n).rev() {
            sheet.set_content(&format!("A{}", i), &format!("=A{} + 1", i + 1)).unwrap();
        }

        let affected = sheet.set_content(&format!("A{}", n), "1").unwrap();
        assert_eq!(affected.len(), n);
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(n as f64));

        assert!(matches!(
            sheet.set_content(&format!("A{}", n), "=A1"),
            Err(Error::CircularReference(_))
        ));
        assert_eq!(sheet.content(&format!("A{}", n)).unwrap(), CellContent::Number(1.0));
        assert!(sheet.direct_dependents("A1").unwrap().is_empty());
    }

    #[test]
    fn test_spreadsheet_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Spreadsheet>();
    }
}
