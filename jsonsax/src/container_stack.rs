// SPDX-License-Identifier: Apache-2.0

/// Kind of container currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Container {
    /// Not inside any container (top level).
    #[default]
    None,
    Array,
    Object,
}

/// Returned by [`ContainerStack::pop`] when nothing is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackUnderflow;

impl core::fmt::Display for StackUnderflow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("container stack underflow")
    }
}

impl std::error::Error for StackUnderflow {}

/// Stack of open containers.
///
/// Nesting is tracked here rather than on the call stack, so depth is only
/// limited by memory.
#[derive(Debug, Clone, Default)]
pub struct ContainerStack {
    kinds: Vec<Container>,
}

impl ContainerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: Container) {
        self.kinds.push(kind);
    }

    pub fn pop(&mut self) -> Result<Container, StackUnderflow> {
        self.kinds.pop().ok_or(StackUnderflow)
    }

    /// Innermost open container, [`Container::None`] at top level.
    pub fn top(&self) -> Container {
        self.kinds.last().copied().unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn clear(&mut self) {
        self.kinds.clear();
    }

    pub fn is_array(&self) -> bool {
        self.top() == Container::Array
    }

    pub fn is_object(&self) -> bool {
        self.top() == Container::Object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_top() {
        let mut stack = ContainerStack::new();
        assert_eq!(stack.top(), Container::None);
        stack.push(Container::Object);
        stack.push(Container::Array);
        assert_eq!(stack.depth(), 2);
        assert!(stack.is_array());
        assert_eq!(stack.pop(), Ok(Container::Array));
        assert!(stack.is_object());
        assert_eq!(stack.pop(), Ok(Container::Object));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_underflow_is_an_error() {
        let mut stack = ContainerStack::new();
        assert_eq!(stack.pop(), Err(StackUnderflow));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_deep_nesting() {
        let mut stack = ContainerStack::new();
        for i in 0..100_000 {
            stack.push(if i % 3 == 0 {
                Container::Object
            } else {
                Container::Array
            });
        }
        assert_eq!(stack.depth(), 100_000);
        for i in (0..100_000).rev() {
            let expected = if i % 3 == 0 {
                Container::Object
            } else {
                Container::Array
            };
            assert_eq!(stack.pop(), Ok(expected));
        }
        assert_eq!(stack.top(), Container::None);
    }
}
