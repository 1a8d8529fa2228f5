//! A small tree of contextual error messages, used only by the test
//! suite to pin a failure back to the sub-case that produced it.

/// One node: a message, and the child nodes produced underneath it.
#[derive(Debug, Clone, Default)]
pub struct ErrorNode {
    message: String,
    children: Vec<ErrorNode>,
}

impl ErrorNode {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, node: ErrorNode) -> &mut Self {
        self.children.push(node);
        self
    }

    pub fn add_children(&mut self, nodes: impl IntoIterator<Item = ErrorNode>) -> &mut Self {
        self.children.extend(nodes);
        self
    }

    /// Wrap `nodes` under a new child labeled `context`.
    pub fn add_children_with_context(
        &mut self,
        context: impl Into<String>,
        nodes: impl IntoIterator<Item = ErrorNode>,
    ) -> &mut Self {
        let mut wrapper = ErrorNode::new(context);
        wrapper.add_children(nodes);
        self.children.push(wrapper);
        self
    }

    /// Reduce every root-to-leaf path to a single string, joined by `sep`.
    /// A node with no children contributes one path: itself.
    pub fn reduce(&self, sep: &str) -> Vec<String> {
        if self.children.is_empty() {
            return vec![self.message.clone()];
        }

        self.children
            .iter()
            .flat_map(|child| child.reduce(sep))
            .map(|rest| format!("{}{}{}", self.message, sep, rest))
            .collect()
    }
}

/// A forest of [`ErrorNode`]s, with a convenience reduction across all of
/// them at once.
#[derive(Debug, Clone, Default)]
pub struct ErrorTs {
    roots: Vec<ErrorNode>,
}

impl ErrorTs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mappend(&mut self, context: impl Into<String>, nodes: impl IntoIterator<Item = ErrorNode>) {
        let mut wrapper = ErrorNode::new(context);
        wrapper.add_children(nodes);
        self.roots.push(wrapper);
    }

    pub fn flattened_and_reduced_errors(&self, sep: &str) -> Vec<String> {
        self.roots.iter().flat_map(|n| n.reduce(sep)).collect()
    }
}
