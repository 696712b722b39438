use std::collections::HashSet;

use tracing::{debug, trace};

use super::ast::{CompiledTemplate, PatternNode, Semantic};
use super::error::GrokError;
use super::library::MacroLibrary;
use super::parser;

/// Default bound on nested macro expansion
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Compiles grok templates against a macro library.
///
/// The compiler only reads the library, so one library can back any number
/// of compilers and compilations.
#[derive(Debug, Clone, Copy)]
pub struct GrokCompiler<'a> {
    library: &'a MacroLibrary,
    max_depth: usize,
}

impl<'a> GrokCompiler<'a> {
    pub fn new(library: &'a MacroLibrary) -> Self {
        Self {
            library,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn library(&self) -> &'a MacroLibrary {
        self.library
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Compile a grok template into a regular expression and its schema.
    ///
    /// Structural problems (syntax errors, dangling or duplicate properties,
    /// malformed level rules, recursive or too deeply nested macros) reject
    /// the whole template.
    pub fn compile(&self, grok: &str) -> Result<CompiledTemplate, GrokError> {
        let root = parser::parse(grok, self.library)?;

        let mut composer = Composer {
            compiler: *self,
            regex: String::with_capacity(grok.len() * 4),
            schema: Vec::with_capacity(root.binding_count()),
            properties: HashSet::new(),
            chain: Vec::new(),
        };
        composer.compose(&root, 0)?;

        debug!(
            template = grok,
            regex = composer.regex.as_str(),
            properties = composer.schema.len(),
            "compiled grok template"
        );
        Ok(CompiledTemplate::new(composer.regex, composer.schema))
    }
}

struct Composer<'a> {
    compiler: GrokCompiler<'a>,
    regex: String,
    schema: Vec<Semantic>,
    properties: HashSet<String>,
    /// Macros currently being expanded, outermost first
    chain: Vec<String>,
}

impl Composer<'_> {
    fn compose(&mut self, node: &PatternNode, depth: usize) -> Result<(), GrokError> {
        match node {
            PatternNode::Literal(text) => self.regex.push_str(text),
            PatternNode::Sequence(nodes) => {
                for node in nodes {
                    self.compose(node, depth)?;
                }
            }
            PatternNode::MacroReference { name, binding } => {
                let Some(fragment) = self.compiler.library.get(name) else {
                    self.regex.push_str(&regex::escape(&format!("%{{{name}}}")));
                    return Ok(());
                };

                match binding {
                    Some(semantic) => {
                        if !self.properties.insert(semantic.property.clone()) {
                            return Err(GrokError::DuplicateProperty(semantic.property.clone()));
                        }
                        self.schema.push(semantic.clone());
                        self.regex.push_str("(?<");
                        self.regex.push_str(&semantic.property);
                        self.regex.push('>');
                    }
                    None => self.regex.push_str("(?:"),
                }

                self.expand(name, fragment, depth + 1)?;
                self.regex.push(')');
            }
        }
        Ok(())
    }

    fn expand(&mut self, name: &str, fragment: &str, depth: usize) -> Result<(), GrokError> {
        if self.chain.iter().any(|n| n == name) {
            let mut chain = self.chain.clone();
            chain.push(name.to_string());
            return Err(GrokError::RecursiveMacro {
                name: name.to_string(),
                chain,
            });
        }
        if depth > self.compiler.max_depth {
            return Err(GrokError::RecursionTooDeep {
                name: name.to_string(),
                limit: self.compiler.max_depth,
            });
        }

        trace!(name, depth, "expanding macro");
        let node = parser::parse(fragment, self.compiler.library).map_err(|e| match e {
            GrokError::Syntax { .. } => GrokError::MacroSyntax {
                name: name.to_string(),
                source: Box::new(e),
            },
            other => other,
        })?;

        self.chain.push(name.to_string());
        self.compose(&node, depth)?;
        self.chain.pop();
        Ok(())
    }
}
