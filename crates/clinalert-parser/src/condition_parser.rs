//! Condition parser
//!
//! Compiles alert rule text into a per-variable [`ConditionMap`].
//!
//! The parser is pattern driven rather than a general expression parser. It
//! scans the token stream for three shapes, in this order:
//!
//! 1. Range with presence: `[v] <> "" and ([v] < 3.5 or [v] > 12)`
//! 2. Absolute difference: `abs([a] - [b]) > 20`, keyed as `"a,b"`
//! 3. Single comparisons: `[v] = 1`, `[v] <> "no"`, `[v] >= 50`, `[v] <> ""`
//!
//! Each token belongs to at most one match. When a key is hit again (by the
//! same or a later pass) the new clause is appended to its condition with
//! `OR`. Tokens left over after all passes are reported as
//! [`ParseError::UnmatchedFragment`] diagnostics; they never fail the
//! compilation.
//!
//! Conditions are stored per variable, so an `and` joining atoms on two
//! different keys cannot be kept. Each such connective is reported as
//! [`ParseError::CrossVariableAnd`]. A presence test `[v] <> ""` guarding
//! another variable is never turned into a trigger of its own; it stays
//! unmatched.

use crate::error::ParseError;
use crate::interval::ReferenceInterval;
use crate::lexer::{Lexer, Token, TokenKind};
use clinalert_core::ast::{
    pair_key, AtomicTest, CompareOp, ConditionMap, ConditionSpec, Literal, NumberLiteral,
};

/// Compilation output: conditions plus non-fatal diagnostics
#[derive(Debug, Default)]
pub struct Compiled {
    pub conditions: ConditionMap,
    /// Lexical errors, cross-variable `and`s and unmatched fragments, in
    /// source order per kind
    pub warnings: Vec<ParseError>,
}

impl Compiled {
    /// Returns true if nothing was dropped while compiling
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Condition parser
pub struct ConditionParser;

impl ConditionParser {
    /// Compile rule text, keeping diagnostics
    pub fn compile(input: &str) -> Compiled {
        let lexed = Lexer::tokenize(input);
        let mut scan = Scan::new(input, lexed.tokens);

        scan.scan_ranges();
        scan.scan_abs_differences();
        scan.scan_comparisons();

        let mut warnings = lexed.errors;
        warnings.extend(scan.cross_variable_ands());
        warnings.extend(scan.unmatched_fragments());

        let mut conditions = scan.conditions;
        for spec in conditions.values_mut() {
            spec.reference_interval = ReferenceInterval::for_condition(spec);
        }

        log::debug!(
            "Compiled condition into {} variable key(s) with {} warning(s)",
            conditions.len(),
            warnings.len()
        );

        Compiled {
            conditions,
            warnings,
        }
    }

    /// Compile rule text, discarding diagnostics
    pub fn parse(input: &str) -> ConditionMap {
        Self::compile(input).conditions
    }
}

/// A matched `[var] OP literal`
struct Comparison {
    var: String,
    test: AtomicTest,
    len: usize,
}

/// Scanner state for one compilation
struct Scan<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    /// Key of the match each token was consumed by
    owner: Vec<Option<String>>,
    conditions: ConditionMap,
}

impl<'a> Scan<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        let owner = vec![None; tokens.len()];
        Self {
            input,
            tokens,
            owner,
            conditions: ConditionMap::new(),
        }
    }

    /// Token kind at `i`, if it exists and is still free
    fn free(&self, i: usize) -> Option<&TokenKind> {
        match self.owner.get(i) {
            Some(None) => self.tokens.get(i).map(|t| &t.kind),
            _ => None,
        }
    }

    fn consume(&mut self, start: usize, len: usize, key: &str) {
        for owner in &mut self.owner[start..start + len] {
            *owner = Some(key.to_string());
        }
    }

    fn append(
        &mut self,
        key: &str,
        tests: Vec<AtomicTest>,
        groups: Vec<Vec<usize>>,
        description: &str,
    ) {
        self.conditions
            .entry(key.to_string())
            .or_insert_with(|| ConditionSpec::new(key))
            .push_clause(tests, groups, description);
    }

    /// Numeric literal at `i`, with an optional leading minus
    fn number_at(&self, i: usize) -> Option<(NumberLiteral, usize)> {
        match self.free(i)? {
            TokenKind::Number(raw) => NumberLiteral::parse(raw).ok().map(|n| (n, 1)),
            TokenKind::Minus => match self.free(i + 1)? {
                TokenKind::Number(raw) => NumberLiteral::parse(&format!("-{}", raw))
                    .ok()
                    .map(|n| (n, 2)),
                _ => None,
            },
            _ => None,
        }
    }

    fn literal_at(&self, i: usize) -> Option<(Literal, usize)> {
        match self.free(i)? {
            TokenKind::Str(s) => Some((Literal::text(s.clone()), 1)),
            _ => self.number_at(i).map(|(n, len)| (Literal::Number(n), len)),
        }
    }

    /// `[var] OP literal` at `i`; `expected` pins the variable name
    fn comparison_at(&self, i: usize, expected: Option<&str>) -> Option<Comparison> {
        let var = match self.free(i)? {
            TokenKind::Var(name) => name,
            _ => return None,
        };
        if expected.is_some_and(|e| e != var.as_str()) {
            return None;
        }

        let op = self
            .free(i + 1)?
            .comparison_symbol()
            .and_then(|symbol| CompareOp::from_symbol(symbol).ok())?;
        let (literal, literal_len) = self.literal_at(i + 2)?;

        // Ordering comparisons are numeric only
        if op.is_bound() && literal.as_number().is_none() {
            return None;
        }

        let is_presence =
            op == CompareOp::Ne && matches!(&literal, Literal::Text(s) if s.is_empty());
        let test = if is_presence {
            AtomicTest::NotEmpty
        } else {
            AtomicTest::compare(op, literal)
        };

        Some(Comparison {
            var: var.clone(),
            test,
            len: 2 + literal_len,
        })
    }

    /// Pass 1: `[v] <> "" and ([v] OP n or [v] OP n ...)` or
    /// `[v] <> "" and [v] OP n`
    fn scan_ranges(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            match self.match_range(i) {
                Some((var, bounds, len, parenthesized)) => {
                    let texts: Vec<String> = bounds.iter().map(ToString::to_string).collect();
                    let description = if parenthesized {
                        format!("not empty AND ({})", texts.join(" OR "))
                    } else {
                        format!("not empty AND {}", texts.join(" OR "))
                    };

                    let groups = (1..=bounds.len()).map(|k| vec![0, k]).collect();
                    let mut tests = Vec::with_capacity(bounds.len() + 1);
                    tests.push(AtomicTest::NotEmpty);
                    tests.extend(bounds);

                    self.consume(i, len, &var);
                    self.append(&var, tests, groups, &description);
                    i += len;
                }
                None => i += 1,
            }
        }
    }

    fn match_range(&self, i: usize) -> Option<(String, Vec<AtomicTest>, usize, bool)> {
        let presence = self.comparison_at(i, None)?;
        if presence.test != AtomicTest::NotEmpty
            || self.free(i + presence.len)? != &TokenKind::And
        {
            return None;
        }

        let var = presence.var;
        let mut j = i + presence.len + 1;
        let mut bounds = Vec::new();

        let parenthesized = self.free(j) == Some(&TokenKind::LParen);
        if parenthesized {
            j += 1;
            loop {
                let cmp = self.comparison_at(j, Some(&var))?;
                if cmp.test == AtomicTest::NotEmpty {
                    return None;
                }
                bounds.push(cmp.test);
                j += cmp.len;

                match self.free(j)? {
                    TokenKind::Or => j += 1,
                    TokenKind::RParen => {
                        j += 1;
                        break;
                    }
                    _ => return None,
                }
            }
        } else {
            let cmp = self.comparison_at(j, Some(&var))?;
            if cmp.test == AtomicTest::NotEmpty {
                return None;
            }
            bounds.push(cmp.test);
            j += cmp.len;
        }

        Some((var, bounds, j - i, parenthesized))
    }

    /// Pass 2: `abs([a] - [b]) > n`
    fn scan_abs_differences(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            match self.match_abs(i) {
                Some((key, test)) => {
                    let description = format!("({})", test);
                    self.consume(i, 8, &key);
                    self.append(&key, vec![test], vec![vec![0]], &description);
                    i += 8;
                }
                None => i += 1,
            }
        }
    }

    fn match_abs(&self, i: usize) -> Option<(String, AtomicTest)> {
        if self.free(i)? != &TokenKind::Abs || self.free(i + 1)? != &TokenKind::LParen {
            return None;
        }
        let left = match self.free(i + 2)? {
            TokenKind::Var(name) => name,
            _ => return None,
        };
        if self.free(i + 3)? != &TokenKind::Minus {
            return None;
        }
        let right = match self.free(i + 4)? {
            TokenKind::Var(name) => name,
            _ => return None,
        };
        if self.free(i + 5)? != &TokenKind::RParen || self.free(i + 6)? != &TokenKind::Gt {
            return None;
        }
        let threshold = match self.free(i + 7)? {
            TokenKind::Number(raw) => NumberLiteral::parse(raw).ok()?,
            _ => return None,
        };

        Some((
            pair_key(left, right),
            AtomicTest::abs_difference(left.clone(), right.clone(), threshold),
        ))
    }

    /// Pass 3: any remaining `[v] OP literal`, except a presence test
    /// followed by `and`
    fn scan_comparisons(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            match self.comparison_at(i, None) {
                Some(cmp)
                    if cmp.test == AtomicTest::NotEmpty
                        && self.tokens.get(i + cmp.len).map(|t| &t.kind)
                            == Some(&TokenKind::And) =>
                {
                    i += cmp.len;
                }
                Some(cmp) => {
                    let description = cmp.test.to_string();
                    self.consume(i, cmp.len, &cmp.var);
                    self.append(&cmp.var, vec![cmp.test], vec![vec![0]], &description);
                    i += cmp.len;
                }
                None => i += 1,
            }
        }
    }

    /// Free `and` tokens whose neighbouring atoms belong to different keys
    fn cross_variable_ands(&self) -> Vec<ParseError> {
        let mut warnings = Vec::new();

        for (i, token) in self.tokens.iter().enumerate() {
            if token.kind != TokenKind::And || self.owner[i].is_some() {
                continue;
            }
            let left = (0..i)
                .rev()
                .find(|&j| self.tokens[j].kind != TokenKind::RParen);
            let right = (i + 1..self.tokens.len())
                .find(|&j| self.tokens[j].kind != TokenKind::LParen);
            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };

            match (self.atom_key(left, true), self.atom_key(right, false)) {
                (Some(l), Some(r)) if l != r => {
                    let position = token.start;
                    let span = self.atom_start(left)..self.atom_end(right);
                    let fragment = self.input[span].to_string();
                    log::warn!(
                        "'and' at position {} joins '{}' and '{}'; only per-variable conditions are kept: {}",
                        position,
                        l,
                        r,
                        fragment
                    );
                    warnings.push(ParseError::CrossVariableAnd { position, fragment });
                }
                _ => {}
            }
        }

        warnings
    }

    /// Key of the atom touching token `i`: the match that consumed it, else
    /// the nearest variable before (`backward`) or after it
    fn atom_key(&self, i: usize, backward: bool) -> Option<String> {
        if let Some(key) = &self.owner[i] {
            return Some(key.clone());
        }
        let var_at = |j: usize| match &self.tokens[j].kind {
            TokenKind::Var(name) => Some(name.clone()),
            _ => None,
        };
        let inside = |j: &usize| !self.tokens[*j].kind.is_structural();
        if backward {
            (0..=i).rev().take_while(inside).find_map(var_at)
        } else {
            (i..self.tokens.len()).take_while(inside).find_map(var_at)
        }
    }

    /// Byte offset where the atom ending at token `i` starts
    fn atom_start(&self, i: usize) -> usize {
        let mut j = i;
        match &self.owner[i] {
            Some(key) => {
                while j > 0 && self.owner[j - 1].as_ref() == Some(key) {
                    j -= 1;
                }
            }
            None => {
                while j > 0 && self.is_leftover(j - 1) {
                    j -= 1;
                }
            }
        }
        self.tokens[j].start
    }

    /// Byte offset where the atom starting at token `i` ends
    fn atom_end(&self, i: usize) -> usize {
        let last = self.tokens.len() - 1;
        let mut j = i;
        match &self.owner[i] {
            Some(key) => {
                while j < last && self.owner[j + 1].as_ref() == Some(key) {
                    j += 1;
                }
            }
            None => {
                while j < last && self.is_leftover(j + 1) {
                    j += 1;
                }
            }
        }
        self.tokens[j].end
    }

    /// Unconsumed token that is not a connective or parenthesis
    fn is_leftover(&self, i: usize) -> bool {
        self.owner[i].is_none() && !self.tokens[i].kind.is_structural()
    }

    /// Runs of leftover tokens between connectives and parentheses
    fn unmatched_fragments(&self) -> Vec<ParseError> {
        let mut fragments = Vec::new();
        let mut run: Option<(usize, usize)> = None;

        for i in 0..self.tokens.len() {
            if self.is_leftover(i) {
                run = Some(match run {
                    Some((start, _)) => (start, i),
                    None => (i, i),
                });
            } else if let Some((start, end)) = run.take() {
                fragments.push(self.fragment(start, end));
            }
        }
        if let Some((start, end)) = run {
            fragments.push(self.fragment(start, end));
        }

        fragments
    }

    fn fragment(&self, start: usize, end: usize) -> ParseError {
        let position = self.tokens[start].start;
        let fragment = self.input[position..self.tokens[end].end].to_string();
        log::warn!(
            "Dropping unrecognized condition fragment at position {}: {}",
            position,
            fragment
        );
        ParseError::UnmatchedFragment { position, fragment }
    }
}
