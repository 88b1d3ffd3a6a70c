//! Rule string parsing.
//!
//! A rule string such as `required,dive,keys,min=3,endkeys,email|numeric`
//! becomes a [`RuleSpec`] tree:
//!
//! - `,` separates items that must all pass;
//! - `|` joins alternatives into one OR-group;
//! - `=` separates a rule name from its parameter;
//! - `dive` applies the rest of the string to each element or map value,
//!   with `keys ... endkeys` right after it holding the rules for map keys.
//!
//! Aliases are expanded item by item before the structure is built, so an
//! alias may carry markers and OR-groups of its own. Rules are resolved
//! against the registry at parse time; a parsed spec is immutable.

use smallvec::SmallVec;

use crate::error::{Error, ParseError, ParseErrorKind};
use crate::registry::{Rule, RuleRegistry, is_marker};

// ============================================================================
// PARSED FORM
// ============================================================================

/// A parsed rule string.
#[derive(Debug, Clone, Default)]
pub struct RuleSpec {
    source: String,
    skip: bool,
    omit_empty: bool,
    struct_only: bool,
    no_struct_level: bool,
    groups: Vec<RuleGroup>,
    dive: Option<Box<Dive>>,
}

impl RuleSpec {
    /// The text this spec was parsed from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// `-`: the field is ignored.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        self.skip
    }

    /// `omitempty`: zero values skip the rest of the chain.
    #[must_use]
    pub fn omit_empty(&self) -> bool {
        self.omit_empty
    }

    /// `structonly`: struct values are not recursed into.
    #[must_use]
    pub fn struct_only(&self) -> bool {
        self.struct_only
    }

    /// `nostructlevel`: the struct's hook is not run.
    #[must_use]
    pub fn no_struct_level(&self) -> bool {
        self.no_struct_level
    }

    /// Rule groups in evaluation order.
    #[must_use]
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Rules applied to elements, if the spec dives.
    #[must_use]
    pub fn dive(&self) -> Option<&Dive> {
        self.dive.as_deref()
    }

    /// Returns `true` if the spec checks nothing and changes no traversal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.skip
            && !self.omit_empty
            && !self.struct_only
            && !self.no_struct_level
            && self.groups.is_empty()
            && self.dive.is_none()
    }
}

/// One comma-separated item: a single rule or an OR-group of alternatives.
#[derive(Debug, Clone)]
pub struct RuleGroup {
    text: String,
    alias: Option<String>,
    alternatives: SmallVec<[RuleInvocation; 1]>,
}

impl RuleGroup {
    /// The item text after alias expansion, e.g. `email|numeric`.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The alias this item was expanded from.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Alternatives; the group passes if any one passes.
    #[must_use]
    pub fn alternatives(&self) -> &[RuleInvocation] {
        &self.alternatives
    }

    /// Returns `true` for groups with more than one alternative.
    #[must_use]
    pub fn is_or(&self) -> bool {
        self.alternatives.len() > 1
    }

    /// Tag reported when the group fails.
    pub(crate) fn failure_tag(&self) -> &str {
        match (&self.alias, self.alternatives.as_slice()) {
            (Some(alias), _) => alias,
            (None, [single]) => single.name(),
            (None, _) => &self.text,
        }
    }

    /// Rule name reported when the group fails.
    pub(crate) fn failure_actual_tag(&self) -> &str {
        match self.alternatives.as_slice() {
            [single] => single.name(),
            _ => &self.text,
        }
    }

    /// Parameter reported when the group fails.
    pub(crate) fn failure_param(&self) -> &str {
        match self.alternatives.as_slice() {
            [single] => single.param(),
            _ => "",
        }
    }
}

/// A resolved rule with its parameter.
#[derive(Debug, Clone)]
pub struct RuleInvocation {
    param: String,
    rule: Rule,
}

impl RuleInvocation {
    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.rule.name()
    }

    /// Parameter with escapes decoded; empty if none.
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// The resolved rule.
    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

/// What `dive` applies to each element.
#[derive(Debug, Clone, Default)]
pub struct Dive {
    keys: Option<RuleSpec>,
    elements: RuleSpec,
}

impl Dive {
    /// Rules for map keys (`keys ... endkeys`).
    #[must_use]
    pub fn keys(&self) -> Option<&RuleSpec> {
        self.keys.as_ref()
    }

    /// Rules for sequence elements or map values.
    #[must_use]
    pub fn elements(&self) -> &RuleSpec {
        &self.elements
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// One comma item after alias expansion.
#[derive(Debug)]
struct Token<'a> {
    text: &'a str,
    alias: Option<&'a str>,
    position: usize,
}

/// Parses a rule string against `registry`.
pub(crate) fn parse(source: &str, registry: &RuleRegistry) -> Result<RuleSpec, Error> {
    if source.is_empty() {
        return Ok(RuleSpec {
            source: source.to_owned(),
            ..RuleSpec::default()
        });
    }

    let mut tokens = Vec::new();
    for (position, item) in source.split(',').enumerate() {
        expand(item, None, position, registry, &mut tokens);
    }

    let parser = Parser { source, registry };
    parser.spec(&tokens)
}

/// Replaces whole-item aliases with their expansion, recursively.
///
/// Aliases are acyclic once registered, so this terminates.
fn expand<'a>(
    item: &'a str,
    alias: Option<&'a str>,
    position: usize,
    registry: &'a RuleRegistry,
    out: &mut Vec<Token<'a>>,
) {
    match registry.alias(item) {
        Some(expansion) => {
            for nested in expansion.split(',') {
                expand(nested, alias.or(Some(item)), position, registry, out);
            }
        }
        None => out.push(Token {
            text: item,
            alias,
            position,
        }),
    }
}

struct Parser<'a> {
    source: &'a str,
    registry: &'a RuleRegistry,
}

impl Parser<'_> {
    fn error(&self, position: usize, kind: ParseErrorKind) -> Error {
        Error::Parse(ParseError::new(self.source, position, kind))
    }

    fn spec(&self, tokens: &[Token<'_>]) -> Result<RuleSpec, Error> {
        let mut spec = RuleSpec {
            source: tokens.iter().map(|t| t.text).collect::<Vec<_>>().join(","),
            ..RuleSpec::default()
        };

        let mut index = 0;
        while let Some(token) = tokens.get(index) {
            match token.text {
                "-" => {
                    if tokens.len() != 1 {
                        return Err(self.error(token.position, ParseErrorKind::SkipNotAlone));
                    }
                    spec.skip = true;
                }
                "omitempty" => {
                    if !spec.groups.is_empty() || spec.omit_empty {
                        return Err(self.misplaced(token));
                    }
                    spec.omit_empty = true;
                }
                "structonly" => spec.struct_only = true,
                "nostructlevel" => spec.no_struct_level = true,
                "keys" => return Err(self.error(token.position, ParseErrorKind::KeysWithoutDive)),
                "endkeys" => {
                    return Err(self.error(token.position, ParseErrorKind::DanglingEndKeys));
                }
                "dive" => {
                    spec.dive = Some(Box::new(self.dive(token, &tokens[index + 1..])?));
                    break;
                }
                "" => return Err(self.error(token.position, ParseErrorKind::EmptyRule)),
                _ => spec.groups.push(self.group(token)?),
            }
            index += 1;
        }
        Ok(spec)
    }

    fn dive(&self, dive: &Token<'_>, rest: &[Token<'_>]) -> Result<Dive, Error> {
        let Some(first) = rest.first().filter(|t| t.text == "keys") else {
            return Ok(Dive {
                keys: None,
                elements: self.spec(rest)?,
            });
        };

        let end = rest
            .iter()
            .position(|t| t.text == "endkeys")
            .ok_or_else(|| self.error(first.position, ParseErrorKind::UnclosedKeys))?;
        if end == 1 {
            return Err(self.error(dive.position, ParseErrorKind::EmptyRule));
        }

        Ok(Dive {
            keys: Some(self.spec(&rest[1..end])?),
            elements: self.spec(&rest[end + 1..])?,
        })
    }

    fn group(&self, token: &Token<'_>) -> Result<RuleGroup, Error> {
        let mut alternatives = SmallVec::new();
        self.alternatives(token, token.text, &mut alternatives)?;
        Ok(RuleGroup {
            text: token.text.to_owned(),
            alias: token.alias.map(str::to_owned),
            alternatives,
        })
    }

    fn alternatives(
        &self,
        token: &Token<'_>,
        text: &str,
        out: &mut SmallVec<[RuleInvocation; 1]>,
    ) -> Result<(), Error> {
        for alternative in text.split('|') {
            if let Some(expansion) = self.registry.alias(alternative) {
                if expansion.contains(',') {
                    return Err(self.error(
                        token.position,
                        ParseErrorKind::AliasInOrGroup {
                            alias: alternative.to_owned(),
                        },
                    ));
                }
                self.alternatives(token, expansion, out)?;
                continue;
            }
            out.push(self.invocation(token, alternative)?);
        }
        Ok(())
    }

    fn invocation(&self, token: &Token<'_>, text: &str) -> Result<RuleInvocation, Error> {
        let (name, param) = match text.split_once('=') {
            Some((name, "")) => {
                return Err(self.error(
                    token.position,
                    ParseErrorKind::MissingParam {
                        rule: name.to_owned(),
                    },
                ));
            }
            Some((name, param)) => (name, unescape(param)),
            None => (text, String::new()),
        };

        if name.is_empty() {
            return Err(self.error(token.position, ParseErrorKind::EmptyRule));
        }
        if is_marker(name) {
            return Err(self.misplaced_name(token, name));
        }

        let rule = self
            .registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRule {
                name: name.to_owned(),
                spec: self.source.to_owned(),
            })?;
        Ok(RuleInvocation { param, rule })
    }

    fn misplaced(&self, token: &Token<'_>) -> Error {
        self.misplaced_name(token, token.text)
    }

    fn misplaced_name(&self, token: &Token<'_>, marker: &str) -> Error {
        self.error(
            token.position,
            ParseErrorKind::MisplacedMarker {
                marker: marker.to_owned(),
            },
        )
    }
}

/// Decodes `0x2C` to `,` and `0x7C` to `|`.
fn unescape(param: &str) -> String {
    param.replace("0x2C", ",").replace("0x7C", "|")
}
