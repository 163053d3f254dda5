/// Default cap on interpreter call depth.
///
/// A tree-walking call consumes a large native stack frame, so the limit
/// stays well below where the host stack would overflow.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 200;

/// Default cap on expression nesting in the parser.
pub const DEFAULT_MAX_PARSE_DEPTH: usize = 200;

/// Limits applied to a single run or REPL session.
///
/// Exceeding the recursion limit raises an ordinary runtime error; exceeding
/// the parse limit is a parse error.
#[derive(Debug, Clone, Copy)]
pub struct ResourceLimits {
    pub max_recursion_depth: usize,
    pub max_parse_depth: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_parse_depth: DEFAULT_MAX_PARSE_DEPTH,
        }
    }
}
